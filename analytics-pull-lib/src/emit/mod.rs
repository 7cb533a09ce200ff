//! Record emission
//!
//! The [`Emitter`] is the only place where the pipeline writes to the outside world.
//! It flattens [`OutputRecord`](crate::transform::OutputRecord)s into dotted field
//! names and pushes them onto an [`OutputQueue`].

mod emitter;
mod queue;

pub use emitter::{DEFAULT_EVENT_TYPE, Emitter, to_record};
pub use queue::{ChannelQueue, JsonLinesSink, OutputQueue, Record};
