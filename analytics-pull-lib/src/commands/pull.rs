use super::Host;
use super::common::{CommonArgs, init_logging};
use super::config::Config;
use crate::Result;
use crate::emit::{ChannelQueue, JsonLinesSink, Record};
use crate::report::{ReportError, StaticTokenProvider};
use crate::scheduler::{RunSummary, Scheduler};
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use futures::future::join_all;
use ohno::{IntoAppError, app_err};
use std::fs::File;
use std::io::{BufWriter, Write};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const LOG_TARGET: &str = "      pull";

/// Records buffered between the schedulers and the writer
const CHANNEL_CAPACITY: usize = 1024;

#[derive(Parser, Debug)]
pub struct PullArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// OAuth access token for the reporting API
    #[arg(long, value_name = "TOKEN", env = "ANALYTICS_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Write records to this file instead of stdout, one JSON object per line
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<Utf8PathBuf>,
}

/// What a pull produced across all inputs.
#[derive(Debug)]
struct PullOutcome {
    records_written: u64,
    runs: Vec<(String, core::result::Result<RunSummary, ReportError>)>,
}

/// Run one scheduler per configured input until they all finish or Ctrl-C is pressed.
pub async fn pull_reports<H: Host>(host: &mut H, args: &PullArgs) -> Result<()> {
    init_logging(args.common.log_level);

    let config = Config::load(Utf8Path::new("."), args.common.config.as_deref())?;
    let access_token = args
        .access_token
        .as_deref()
        .into_app_err("no access token; pass --access-token or set ANALYTICS_ACCESS_TOKEN")?;

    let stop = CancellationToken::new();
    let ctrl_c = tokio::spawn(cancel_on_ctrl_c(stop.clone()));

    let outcome = match &args.output {
        Some(path) => {
            let file = File::create(path).into_app_err_with(|| format!("creating output file '{path}'"))?;
            pull_into(&config, access_token, BufWriter::new(file), stop).await
        }
        None => pull_into(&config, access_token, host.output(), stop).await,
    };

    ctrl_c.abort();
    let outcome = outcome?;

    let mut failed = 0_usize;
    for (view_id, result) in &outcome.runs {
        match result {
            Ok(summary) => log::info!(
                target: LOG_TARGET,
                "{view_id}: {} passes, {} records, {} dates skipped",
                summary.passes,
                summary.records_emitted,
                summary.skipped_dates
            ),
            Err(e) => {
                failed += 1;
                let _ = writeln!(host.error(), "❌ Input {view_id} failed: {e}");
            }
        }
    }

    log::info!(target: LOG_TARGET, "Wrote {} records", outcome.records_written);

    if failed > 0 {
        host.exit(1);
        return Err(app_err!("{failed} of {} inputs failed", outcome.runs.len()));
    }

    Ok(())
}

async fn cancel_on_ctrl_c(stop: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        log::warn!(target: LOG_TARGET, "Interrupted, stopping after in-flight requests complete");
        stop.cancel();
    }
}

async fn pull_into<W: Write>(config: &Config, access_token: &str, writer: W, stop: CancellationToken) -> Result<PullOutcome> {
    let (sender, mut receiver) = mpsc::channel::<Record>(CHANNEL_CAPACITY);

    let mut schedulers = Vec::with_capacity(config.inputs.len());
    for input in &config.inputs {
        let provider = StaticTokenProvider::new(access_token, config.api_base_url.as_str(), config.request_timeout);
        let scheduler = Scheduler::new(input.to_settings(), provider, ChannelQueue::new(sender.clone()), stop.child_token())
            .into_app_err_with(|| format!("configuring input '{}'", input.view_id))?;
        schedulers.push(scheduler);
    }

    // Each scheduler holds the only remaining senders, so the channel closes once they all finish
    drop(sender);

    let runs = join_all(schedulers.into_iter().map(|mut scheduler| async move {
        let view_id = scheduler.settings().view_id.clone();
        let result = scheduler.run().await;
        (view_id, result)
    }));

    let drain = async move {
        let mut sink = JsonLinesSink::new(writer);
        while let Some(record) = receiver.recv().await {
            sink.write(&record)?;
        }
        sink.flush()?;
        Ok::<_, ReportError>(sink.written())
    };

    let (runs, written) = tokio::join!(runs, drain);
    let records_written = written.into_app_err("writing records")?;

    Ok(PullOutcome { records_written, runs })
}
