use std::fmt;

use chrono::{DateTime, Local, NaiveDate, Utc};
use chrono_tz::Tz;

/// Timezone used to turn event timestamps and "now" into calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventTimezone {
    /// Whatever the host process considers local time.
    #[default]
    Local,
    Named(Tz),
}

impl EventTimezone {
    pub fn parse(name: &str) -> Result<Self, String> {
        let name = name.trim();
        if name.is_empty() || name.eq_ignore_ascii_case("local") {
            return Ok(Self::Local);
        }
        name.parse::<Tz>()
            .map(Self::Named)
            .map_err(|err| err.to_string())
    }

    /// Civil date of a unix timestamp, `None` when the timestamp is out of range.
    pub fn date_of_timestamp(&self, seconds: i64) -> Option<NaiveDate> {
        DateTime::<Utc>::from_timestamp(seconds, 0).map(|instant| self.date_of(instant))
    }

    pub fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        match self {
            Self::Local => instant.with_timezone(&Local).date_naive(),
            Self::Named(tz) => instant.with_timezone(tz).date_naive(),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.date_of(Utc::now())
    }
}

impl fmt::Display for EventTimezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Named(tz) => f.write_str(tz.name()),
        }
    }
}
