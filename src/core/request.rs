use bon::Builder;
use chrono::{Days, NaiveDate, TimeZone};

use crate::core::{
    error::PreconditionError,
    interval::Interval,
    zone::{API_TIME_ZONE, BiddingZone},
};

/// What the user asked for: a zone and an inclusive range of calendar days.
#[must_use]
#[derive(Clone, Debug, Builder)]
pub struct FetchRequest {
    pub zone: BiddingZone,

    /// First day, inclusive.
    pub first_day: NaiveDate,

    /// Last day, inclusive.
    pub last_day: NaiveDate,

    /// Production type code to filter on (`B04`, `B14`, …).
    pub psr_type: Option<String>,
}

impl FetchRequest {
    /// Resolve the calendar days into the half-open API interval:
    /// from the first midnight to the midnight following the last day.
    pub fn interval(&self) -> Result<Interval, PreconditionError> {
        let end_day = self.last_day.checked_add_days(Days::new(1)).unwrap_or(self.last_day);
        let start = Self::midnight(self.first_day)?;
        let end = Self::midnight(end_day)?;
        if start >= end {
            return Err(PreconditionError::InvertedRange {
                first_day: self.first_day,
                last_day: self.last_day,
            });
        }
        Ok(Interval::new(start, end))
    }

    /// Reject ranges that reach into the future.
    pub fn check_not_after(&self, today: NaiveDate) -> Result<(), PreconditionError> {
        if self.last_day > today {
            return Err(PreconditionError::FutureDate { last_day: self.last_day, today });
        }
        Ok(())
    }

    fn midnight(day: NaiveDate) -> Result<chrono::DateTime<chrono_tz::Tz>, PreconditionError> {
        day.and_hms_opt(0, 0, 0)
            .and_then(|naive| API_TIME_ZONE.from_local_datetime(&naive).earliest())
            .ok_or(PreconditionError::NonexistentMidnight(day))
    }

    /// Export file name: zone and the inclusive day range, with the given extension.
    #[must_use]
    pub fn file_name(&self, extension: &str) -> String {
        format!(
            "entsoe_generation_hourly_{}_{}_to_{}.{extension}",
            self.zone.file_name_label(),
            self.first_day,
            self.last_day,
        )
    }
}
