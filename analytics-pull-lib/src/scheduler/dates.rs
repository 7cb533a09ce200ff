use chrono::{Days, NaiveDate};
use core::fmt::{Display, Formatter};
use core::str::FromStr;
use serde::{Deserialize, Serialize};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DAYS_AGO_SUFFIX: &str = "daysAgo";

/// A report date, either absolute or relative to the day a pass starts.
///
/// Accepts `YYYY-MM-DD`, `today`, `yesterday`, and `NdaysAgo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub enum DateSpec {
    Fixed(NaiveDate),
    Today,
    Yesterday,
    DaysAgo(u32),
}

impl DateSpec {
    /// Resolve to a calendar date, relative forms counting back from `today`.
    #[must_use]
    pub fn resolve(self, today: NaiveDate) -> NaiveDate {
        let days_back = match self {
            Self::Fixed(date) => return date,
            Self::Today => 0,
            Self::Yesterday => 1,
            Self::DaysAgo(n) => u64::from(n),
        };

        today.checked_sub_days(Days::new(days_back)).unwrap_or(NaiveDate::MIN)
    }
}

impl Default for DateSpec {
    fn default() -> Self {
        Self::Today
    }
}

impl FromStr for DateSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "today" => return Ok(Self::Today),
            "yesterday" => return Ok(Self::Yesterday),
            _ => {}
        }

        if let Some(n) = s.strip_suffix(DAYS_AGO_SUFFIX) {
            return n
                .parse::<u32>()
                .map(Self::DaysAgo)
                .map_err(|e| format!("invalid relative date '{s}': {e}"));
        }

        NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map(Self::Fixed)
            .map_err(|e| format!("invalid date '{s}' (expected YYYY-MM-DD, today, yesterday, or NdaysAgo): {e}"))
    }
}

impl TryFrom<String> for DateSpec {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DateSpec> for String {
    fn from(value: DateSpec) -> Self {
        value.to_string()
    }
}

impl Display for DateSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Fixed(date) => write!(f, "{}", date.format(DATE_FORMAT)),
            Self::Today => write!(f, "today"),
            Self::Yesterday => write!(f, "yesterday"),
            Self::DaysAgo(n) => write!(f, "{n}{DAYS_AGO_SUFFIX}"),
        }
    }
}
