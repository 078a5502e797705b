//! Leaderboard timeframe

use chrono::{DateTime, Duration, Months, Utc};
use serde::Serialize;

/// Window a leaderboard is ordered by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Timeframe {
    #[default]
    AllTime,
    Weekly,
    Monthly,
}

impl Timeframe {
    /// Parse a query value; anything unrecognized means all-time
    pub fn parse_or_default(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("weekly") => Self::Weekly,
            Some("monthly") => Self::Monthly,
            _ => Self::AllTime,
        }
    }

    /// Start of the window ending at `now`; `None` for all-time
    pub fn window_start(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::AllTime => None,
            Self::Weekly => Some(now - Duration::days(7)),
            Self::Monthly => Some(
                now.checked_sub_months(Months::new(1))
                    .unwrap_or(now - Duration::days(30)),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_unknown_falls_back_to_all_time() {
        assert_eq!(Timeframe::parse_or_default(None), Timeframe::AllTime);
        assert_eq!(Timeframe::parse_or_default(Some("yearly")), Timeframe::AllTime);
        assert_eq!(Timeframe::parse_or_default(Some("weekly")), Timeframe::Weekly);
        assert_eq!(Timeframe::parse_or_default(Some("monthly")), Timeframe::Monthly);
    }

    #[test]
    fn test_window_start() {
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap();
        assert_eq!(Timeframe::AllTime.window_start(now), None);
        assert_eq!(
            Timeframe::Weekly.window_start(now),
            Some(Utc.with_ymd_and_hms(2024, 3, 24, 12, 0, 0).unwrap())
        );
        // month arithmetic clamps to the last day of February
        assert_eq!(
            Timeframe::Monthly.window_start(now),
            Some(Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap())
        );
    }
}
