use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, TimeDelta, Utc};
use chrono_tz::Tz;

use crate::{
    core::{
        error::UpstreamError,
        interval::Interval,
        table::{Column, ColumnKey, GenerationTable, Table},
        zone::BiddingZone,
    },
    prelude::*,
};

/// Maximum span of a single upstream request.
const MAX_CHUNK_DURATION: TimeDelta = TimeDelta::days(1);

/// Power values of a single generation unit, as reported.
#[must_use]
#[derive(Clone, Debug, PartialEq)]
pub struct PlantSeries {
    /// `(plant, fuel type, metric)`.
    pub key: ColumnKey,

    /// Megawatts at each reported instant.
    pub points: Vec<(DateTime<Utc>, f64)>,
}

pub trait GenerationSource {
    /// Actual generation per production unit within the interval.
    ///
    /// The interval is fetched day by day, and the series are joined into a single table
    /// indexed in the zone's own time zone. Nothing is fetched for an empty interval.
    #[instrument(skip_all, fields(zone = %zone, interval = ?interval))]
    fn get_generation(
        &self,
        zone: BiddingZone,
        interval: Interval,
    ) -> Result<GenerationTable, UpstreamError> {
        let mut series = Vec::new();
        for chunk in interval.chunks(MAX_CHUNK_DURATION) {
            series.extend(self.get_generation_chunk(zone, chunk)?);
        }
        debug!(n_series = series.len(), "fetched all chunks");
        assemble(series, zone.time_zone(), interval)
    }

    /// Fetch a single chunk, no longer than a day.
    fn get_generation_chunk(
        &self,
        zone: BiddingZone,
        interval: Interval,
    ) -> Result<Vec<PlantSeries>, UpstreamError>;
}

/// Join the series on their timestamps.
///
/// Series with the same key are merged, the first value winning on a collision.
/// Columns keep the order in which their keys first appear. Rows outside the interval are dropped.
pub fn assemble(
    series: Vec<PlantSeries>,
    time_zone: Tz,
    interval: Interval,
) -> Result<GenerationTable, UpstreamError> {
    let mut keys = Vec::<ColumnKey>::new();
    let mut merged = HashMap::<ColumnKey, BTreeMap<DateTime<Utc>, f64>>::new();
    for PlantSeries { key, points } in series {
        let values = merged.entry(key.clone()).or_insert_with(|| {
            keys.push(key);
            BTreeMap::new()
        });
        for (timestamp, value) in points {
            values.entry(timestamp).or_insert(value);
        }
    }

    let index = merged
        .values()
        .flat_map(BTreeMap::keys)
        .copied()
        .filter(|timestamp| interval.contains(timestamp.with_timezone(&interval.start.timezone())))
        .collect::<BTreeSet<_>>();
    if index.is_empty() {
        return Ok(GenerationTable::empty());
    }

    let columns = keys
        .into_iter()
        .map(|key| {
            let values = &merged[&key];
            let values = index.iter().map(|timestamp| values.get(timestamp).copied()).collect();
            Column { key, values }
        })
        .collect();
    let index = index.into_iter().map(|timestamp| timestamp.with_timezone(&time_zone)).collect();
    Table::try_new_sorted(Vec::new(), index, columns)
        .map_err(|error| UpstreamError::Malformed(format!("{error:#}")))
}
