use crate::Result;
use crate::emit::DEFAULT_EVENT_TYPE;
use crate::report::client::{DEFAULT_API_BASE_URL, DEFAULT_REQUEST_TIMEOUT};
use crate::report::{MAX_PAGE_SIZE, SamplingLevel};
use crate::scheduler::{AuthPolicy, DateSpec, ReportSettings};
use crate::transform::{EmissionMode, TransformOptions};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::NaiveDate;
use core::time::Duration;
use ohno::{IntoAppError, app_err};
use serde::Deserialize;
use std::fs;
use std::io;

/// The default configuration TOML content, embedded from `default_config.toml`
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../default_config.toml");

/// File name looked up in the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "analytics-pull.toml";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Endpoint of the reporting API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Timeout applied to every report request
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,

    /// One scheduler is started per `[[input]]` table
    #[serde(default, rename = "input")]
    pub inputs: Vec<InputConfig>,
}

/// A single `[[input]]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputConfig {
    pub view_id: String,
    pub start_date: DateSpec,

    #[serde(default)]
    pub end_date: DateSpec,

    pub metrics: Vec<String>,

    #[serde(default)]
    pub dimensions: Vec<String>,

    #[serde(default)]
    pub filters: Option<String>,

    #[serde(default)]
    pub sort: Option<String>,

    #[serde(default)]
    pub segment: Option<String>,

    #[serde(default)]
    pub sampling_level: Option<SamplingLevel>,

    #[serde(default = "default_true")]
    pub include_empty_rows: bool,

    #[serde(default = "default_true")]
    pub store_query: bool,

    #[serde(default = "default_true")]
    pub store_profile: bool,

    /// Time between the starts of consecutive passes; absent means run once
    #[serde(default, with = "humantime_serde")]
    pub interval: Option<Duration>,

    #[serde(default = "default_start_index")]
    pub start_index: u32,

    #[serde(default = "default_max_results")]
    pub max_results: u32,

    #[serde(default)]
    pub emission_mode: EmissionMode,

    #[serde(default = "default_event_type")]
    pub event_type: String,

    #[serde(default)]
    pub auth_policy: AuthPolicy,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

const fn default_request_timeout() -> Duration {
    DEFAULT_REQUEST_TIMEOUT
}

const fn default_true() -> bool {
    true
}

const fn default_start_index() -> u32 {
    1
}

const fn default_max_results() -> u32 {
    MAX_PAGE_SIZE
}

fn default_event_type() -> String {
    DEFAULT_EVENT_TYPE.to_string()
}

impl InputConfig {
    #[must_use]
    pub fn to_settings(&self) -> ReportSettings {
        ReportSettings {
            view_id: self.view_id.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            metrics: self.metrics.clone(),
            dimensions: self.dimensions.clone(),
            filters: self.filters.clone(),
            sort: self.sort.clone(),
            segment: self.segment.clone(),
            sampling_level: self.sampling_level,
            include_empty_rows: self.include_empty_rows,
            start_index: self.start_index,
            page_size: self.max_results,
            interval: self.interval,
            transform: TransformOptions {
                mode: self.emission_mode,
                store_query: self.store_query,
                store_profile: self.store_profile,
            },
            event_type: self.event_type.clone(),
            auth_policy: self.auth_policy,
        }
    }
}

impl Config {
    /// The file `load` reads for the given arguments.
    #[must_use]
    pub fn path_for(base_dir: &Utf8Path, config_path: Option<&Utf8Path>) -> Utf8PathBuf {
        config_path.map_or_else(|| base_dir.join(DEFAULT_CONFIG_FILE), Utf8Path::to_path_buf)
    }

    /// Load and validate configuration from a file
    ///
    /// Without an explicit path, `analytics-pull.toml` in `base_dir` is used.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or fails validation
    pub fn load(base_dir: &Utf8Path, config_path: Option<&Utf8Path>) -> Result<Self> {
        let path = Self::path_for(base_dir, config_path);

        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound && config_path.is_none() => {
                return Err(app_err!(
                    "no configuration file found at '{path}'; run `analytics-pull init` to create one"
                ));
            }
            Err(e) => return Err(e).into_app_err_with(|| format!("reading analytics-pull configuration file '{path}'")),
        };

        let config = Self::parse(&text).into_app_err_with(|| format!("parsing configuration file '{path}'"))?;
        config.validate(chrono::Local::now().date_naive())?;

        Ok(config)
    }

    fn parse(text: &str) -> core::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Save the default configuration to a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save_default(output_path: &Utf8Path) -> Result<()> {
        fs::write(output_path, DEFAULT_CONFIG_TOML).into_app_err_with(|| format!("writing default configuration to {output_path}"))?;
        Ok(())
    }

    /// Validate configuration values, resolving relative dates against `today`
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid setting
    pub fn validate(&self, today: NaiveDate) -> Result<()> {
        let _ = url::Url::parse(&self.api_base_url).into_app_err_with(|| format!("api_base_url '{}' is not a valid URL", self.api_base_url))?;

        if self.request_timeout.is_zero() {
            return Err(app_err!("request_timeout must be greater than zero"));
        }

        if self.inputs.is_empty() {
            return Err(app_err!("at least one [[input]] section is required"));
        }

        for (index, input) in self.inputs.iter().enumerate() {
            input
                .to_settings()
                .validate(today)
                .into_app_err_with(|| format!("input #{} ({})", index + 1, input.view_id))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn parse(text: &str) -> Config {
        Config::parse(text).unwrap()
    }

    const MINIMAL: &str = r#"
        [[input]]
        view_id = "ga:1234"
        start_date = "2024-01-01"
        metrics = ["ga:sessions"]
    "#;

    #[test]
    fn test_default_config_is_valid() {
        let config = parse(DEFAULT_CONFIG_TOML);
        config.validate(today()).unwrap();
        assert!(!config.inputs.is_empty());
    }

    #[test]
    fn test_minimal_input_defaults() {
        let config = parse(MINIMAL);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);

        let settings = config.inputs[0].to_settings();
        assert_eq!(settings.end_date, DateSpec::Today);
        assert_eq!(settings.start_index, 1);
        assert_eq!(settings.page_size, MAX_PAGE_SIZE);
        assert!(settings.include_empty_rows);
        assert_eq!(settings.transform, TransformOptions::default());
        assert_eq!(settings.interval, None);
        assert_eq!(settings.event_type, DEFAULT_EVENT_TYPE);
        assert_eq!(settings.auth_policy, AuthPolicy::Retry);
        config.validate(today()).unwrap();
    }

    #[test]
    fn test_full_input() {
        let config = parse(
            r#"
            api_base_url = "http://localhost:9999/data"
            request_timeout = "5s"

            [[input]]
            view_id = "ga:1"
            start_date = "3daysAgo"
            end_date = "yesterday"
            metrics = ["ga:sessions", "ga:users"]
            dimensions = ["ga:browser"]
            filters = "ga:country==France"
            sort = "-ga:sessions"
            segment = "gaid::-1"
            sampling_level = "HIGHER_PRECISION"
            include_empty_rows = false
            store_query = false
            store_profile = false
            interval = "15m"
            start_index = 11
            max_results = 500
            emission_mode = "per_row"
            event_type = "googleanalytics"
            auth_policy = "halt"
            "#,
        );
        config.validate(today()).unwrap();
        assert_eq!(config.request_timeout, Duration::from_secs(5));

        let s = config.inputs[0].to_settings();
        assert_eq!(s.start_date, DateSpec::DaysAgo(3));
        assert_eq!(s.end_date, DateSpec::Yesterday);
        assert_eq!(s.sampling_level, Some(SamplingLevel::HigherPrecision));
        assert_eq!(s.interval, Some(Duration::from_secs(15 * 60)));
        assert_eq!(s.start_index, 11);
        assert_eq!(s.page_size, 500);
        assert_eq!(s.transform.mode, EmissionMode::PerRow);
        assert!(!s.transform.store_query);
        assert!(!s.transform.store_profile);
        assert!(!s.include_empty_rows);
        assert_eq!(s.auth_policy, AuthPolicy::Halt);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let text = format!("{MINIMAL}\nfrobnicate = true\n");
        assert!(Config::parse(&text).is_err());
    }

    #[test]
    fn test_validate_rejections() {
        let mut config = parse(MINIMAL);
        config.inputs[0].metrics = (0..11).map(|i| format!("ga:m{i}")).collect();
        assert!(config.validate(today()).is_err());

        let mut config = parse(MINIMAL);
        config.inputs[0].dimensions = (0..8).map(|i| format!("ga:d{i}")).collect();
        assert!(config.validate(today()).is_err());

        let mut config = parse(MINIMAL);
        config.inputs[0].metrics.clear();
        assert!(config.validate(today()).is_err());

        let mut config = parse(MINIMAL);
        config.inputs[0].start_date = DateSpec::Fixed(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
        assert!(config.validate(today()).is_err());

        let mut config = parse(MINIMAL);
        config.inputs[0].max_results = 0;
        assert!(config.validate(today()).is_err());

        let mut config = parse(MINIMAL);
        config.inputs.clear();
        assert!(config.validate(today()).is_err());

        let mut config = parse(MINIMAL);
        config.api_base_url = "not a url".into();
        assert!(config.validate(today()).is_err());
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_save_default_and_load() {
        let tmp = tempfile::tempdir().unwrap();
        let base = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        Config::save_default(&base.join(DEFAULT_CONFIG_FILE)).unwrap();

        let loaded = Config::load(&base, None).unwrap();
        assert!(!loaded.inputs.is_empty());
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_load_missing_config_suggests_init() {
        let tmp = tempfile::tempdir().unwrap();
        let base = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();

        let err = Config::load(&base, None).unwrap_err();
        assert!(err.to_string().contains("init"));
    }
}
