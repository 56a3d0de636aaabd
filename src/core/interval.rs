use std::fmt::{Debug, Formatter};

use chrono::{DateTime, TimeDelta};
use chrono_tz::Tz;

#[derive(Copy, Clone, Eq, PartialEq)]
#[must_use]
pub struct Interval {
    /// Inclusive.
    pub start: DateTime<Tz>,

    /// Exclusive.
    pub end: DateTime<Tz>,
}

impl Debug for Interval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}..{:?}", self.start, self.end)
    }
}

impl Interval {
    pub const fn new(start: DateTime<Tz>, end: DateTime<Tz>) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn duration(self) -> TimeDelta {
        self.end - self.start
    }

    #[must_use]
    pub fn contains(self, other: DateTime<Tz>) -> bool {
        (self.start <= other) && (other < self.end)
    }

    /// Split the interval into consecutive sub-intervals no longer than `max_duration`.
    ///
    /// The last chunk may be shorter. An empty interval yields nothing.
    pub fn chunks(self, max_duration: TimeDelta) -> impl Iterator<Item = Self> {
        let mut start = self.start;
        std::iter::from_fn(move || {
            if start >= self.end {
                return None;
            }
            let end = (start + max_duration).min(self.end);
            let chunk = Self::new(start, end);
            start = end;
            Some(chunk)
        })
    }
}
