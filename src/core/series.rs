use chrono::{DateTime, DurationRound, TimeDelta};
use chrono_tz::Tz;
use itertools::Itertools;

use crate::prelude::*;

/// Running arithmetic mean that skips absent values.
#[derive(Copy, Clone, Default)]
pub struct Mean {
    sum: f64,
    n: u32,
}

impl Mean {
    pub fn push(&mut self, value: Option<f64>) {
        if let Some(value) = value
            && !value.is_nan()
        {
            self.sum += value;
            self.n += 1;
        }
    }

    /// `None` when nothing has been pushed.
    #[must_use]
    pub fn value(self) -> Option<f64> {
        (self.n != 0).then(|| self.sum / f64::from(self.n))
    }
}

/// Assignment of the rows of a timestamp index to clock hours.
#[must_use]
pub struct HourlyBuckets {
    /// Every clock hour from the first row's hour to the last row's hour.
    pub hours: Vec<DateTime<Tz>>,

    /// Position in [`HourlyBuckets::hours`] of each row.
    row_hours: Vec<usize>,
}

impl HourlyBuckets {
    /// Truncate each timestamp to its clock hour.
    ///
    /// The hours are contiguous: hours without any rows are still present,
    /// so that the result has one row per hour of the covered period.
    pub fn try_from_index(index: &[DateTime<Tz>]) -> Result<Self> {
        let one_hour = TimeDelta::hours(1);
        let truncated = index
            .iter()
            .map(|timestamp| {
                timestamp
                    .duration_trunc(one_hour)
                    .with_context(|| format!("failed to truncate `{timestamp}` to the hour"))
            })
            .collect::<Result<Vec<_>>>()?;
        ensure!(
            truncated.iter().tuple_windows().all(|(lhs, rhs)| lhs <= rhs),
            "the index must be sorted",
        );
        let (Some(first), Some(last)) = (truncated.first().copied(), truncated.last().copied())
        else {
            return Ok(Self { hours: Vec::new(), row_hours: Vec::new() });
        };

        let hours = std::iter::successors(Some(first), |hour| Some(*hour + one_hour))
            .take_while(|hour| *hour <= last)
            .collect::<Vec<_>>();
        let row_hours = truncated
            .iter()
            .map(|hour| {
                let n_hours = (*hour - first).num_hours();
                usize::try_from(n_hours).with_context(|| format!("`{hour}` precedes `{first}`"))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { hours, row_hours })
    }

    /// Average the column over each hour.
    #[must_use]
    pub fn mean(&self, values: &[Option<f64>]) -> Vec<Option<f64>> {
        let mut means = vec![Mean::default(); self.hours.len()];
        for (hour, value) in self.row_hours.iter().zip(values) {
            means[*hour].push(*value);
        }
        means.into_iter().map(Mean::value).collect()
    }
}
