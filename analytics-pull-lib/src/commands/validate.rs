use super::Host;
use super::config::Config;
use crate::Result;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use std::io::Write;

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file (default is `analytics-pull.toml`)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,
}

pub fn validate_config<H: Host>(host: &mut H, args: &ValidateArgs) -> Result<()> {
    let base_dir = Utf8Path::new(".");
    let config_path = args.config.as_deref();

    match Config::load(base_dir, config_path) {
        Ok(config) => {
            let mut out = host.output();
            let _ = writeln!(out, "Configuration file is valid");
            let _ = writeln!(out, "Config file: {}", Config::path_for(base_dir, config_path));

            for input in &config.inputs {
                let schedule = input.interval.map_or_else(|| "once".to_string(), |i| format!("every {i:?}"));
                let _ = writeln!(
                    out,
                    "  {}: {}..{}, {} metrics, {} dimensions, {schedule}",
                    input.view_id,
                    input.start_date,
                    input.end_date,
                    input.metrics.len(),
                    input.dimensions.len()
                );
            }
            Ok(())
        }
        Err(e) => {
            let _ = writeln!(host.error(), "❌ Configuration validation failed: {e:#}");
            host.exit(1);
            Err(e)
        }
    }
}
