//! Command dispatch logic for analytics-pull

use super::{InitArgs, PullArgs, ValidateArgs, init_config, pull_reports, validate_config};
use crate::{Host, Result};
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use clap::{Parser, Subcommand};

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "analytics-pull", version, author, long_about = None)]
#[command(about = "Pull daily web-analytics reports and emit them as flat records")]
#[command(styles = CLAP_STYLES)]
struct Cli {
    #[command(subcommand)]
    command: PullSubcommand,
}

#[derive(Subcommand, Debug)]
enum PullSubcommand {
    /// Fetch the configured reports and write one JSON record per line
    Pull(Box<PullArgs>),
    /// Generate a default configuration file
    Init(InitArgs),
    /// Validate a configuration file
    Validate(ValidateArgs),
}

/// Dispatch command-line arguments to the appropriate handler
///
/// # Arguments
///
/// * `args` - An iterator of command-line arguments (typically from `std::env::args()`)
///
/// # Errors
///
/// Returns an error if command parsing fails or if the executed command fails
pub async fn run<I, T, H>(host: &mut H, args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
    H: Host,
{
    match &Cli::parse_from(args).command {
        PullSubcommand::Pull(pull_args) => pull_reports(host, pull_args).await,
        PullSubcommand::Init(init_args) => init_config(host, init_args),
        PullSubcommand::Validate(validate_args) => validate_config(host, validate_args),
    }
}
