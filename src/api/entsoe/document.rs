//! XML documents returned by the ENTSO-E Transparency Platform.

use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use quick_xml::{Reader, events::Event};
use serde::{
    Deserialize,
    Deserializer,
    de::{self, IgnoredAny},
};
use serde_with::serde_as;

use crate::{
    api::generation_source::PlantSeries,
    core::{error::UpstreamError, psr_type, table::ColumnKey},
    prelude::*,
};

/// Reason code of the acknowledgement sent instead of an empty document.
const NO_MATCHING_DATA: &str = "999";

/// Curve type of variable-sized blocks: missing positions repeat the previous point.
const VARIABLE_SIZED_BLOCKS: &str = "A03";

pub enum Document {
    Generation(GenerationDocument),
    Acknowledgement(Acknowledgement),
}

impl Document {
    /// Parse the document, dispatching on the root element.
    pub fn parse(xml: &str) -> Result<Self, UpstreamError> {
        let document = match root_name(xml)?.as_str() {
            "GL_MarketDocument" => Self::Generation(quick_xml::de::from_str(xml).map_err(malformed)?),
            "Acknowledgement_MarketDocument" => {
                Self::Acknowledgement(quick_xml::de::from_str(xml).map_err(malformed)?)
            }
            other => {
                return Err(UpstreamError::Malformed(format!("unexpected document `{other}`")));
            }
        };
        Ok(document)
    }
}

fn root_name(xml: &str) -> Result<String, UpstreamError> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event().map_err(malformed)? {
            Event::Start(start) | Event::Empty(start) => {
                return Ok(String::from_utf8_lossy(start.local_name().as_ref()).into_owned());
            }
            Event::Eof => return Err(UpstreamError::Malformed("empty document".to_string())),
            _ => {}
        }
    }
}

fn malformed(error: impl Display) -> UpstreamError {
    UpstreamError::Malformed(error.to_string())
}

#[derive(Deserialize)]
pub struct GenerationDocument {
    #[serde(rename = "TimeSeries", default)]
    pub time_series: Vec<TimeSeries>,
}

#[derive(Deserialize)]
pub struct Acknowledgement {
    #[serde(rename = "Reason", default)]
    pub reasons: Vec<Reason>,
}

impl Acknowledgement {
    #[must_use]
    pub fn is_no_matching_data(&self) -> bool {
        self.reasons.iter().any(|reason| reason.code == NO_MATCHING_DATA)
    }

    /// Reason texts as sent by the API.
    #[must_use]
    pub fn message(&self) -> String {
        self.reasons
            .iter()
            .map(|reason| match &reason.text {
                Some(text) => format!("{} ({})", text, reason.code),
                None => reason.code.clone(),
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Deserialize)]
pub struct Reason {
    pub code: String,
    pub text: Option<String>,
}

#[derive(Deserialize)]
pub struct TimeSeries {
    /// Set for generation.
    #[serde(rename = "inBiddingZone_Domain.mRID")]
    pub in_bidding_zone: Option<IgnoredAny>,

    /// Set for consumption, e.g. pumping.
    #[serde(rename = "outBiddingZone_Domain.mRID")]
    pub out_bidding_zone: Option<IgnoredAny>,

    #[serde(rename = "curveType")]
    pub curve_type: Option<String>,

    #[serde(rename = "MktPSRType")]
    pub psr: Option<MktPsrType>,

    #[serde(rename = "Period", default)]
    pub periods: Vec<Period>,
}

impl TimeSeries {
    /// Label the series as `(plant, fuel type, metric)` and expand its points.
    ///
    /// Without a production type, the fuel type level is missing.
    pub fn into_plant_series(self) -> Result<PlantSeries, UpstreamError> {
        let metric = if self.in_bidding_zone.is_none() && self.out_bidding_zone.is_some() {
            "Actual Consumption"
        } else {
            "Actual Aggregated"
        };
        let psr = self
            .psr
            .ok_or_else(|| UpstreamError::Malformed("time series without `MktPSRType`".into()))?;
        let plant = psr
            .resources
            .and_then(|resources| resources.name)
            .ok_or_else(|| UpstreamError::Malformed("time series without a plant name".into()))?;
        let key = match psr.psr_type {
            Some(code) => ColumnKey::new([plant, psr_type::label_or_code(&code), metric.into()]),
            None => ColumnKey::new([plant, metric.into()]),
        };

        let forward_fill = self.curve_type.as_deref() == Some(VARIABLE_SIZED_BLOCKS);
        let mut points = Vec::new();
        for period in self.periods {
            period.expand_into(forward_fill, &mut points)?;
        }
        Ok(PlantSeries { key, points })
    }
}

#[derive(Deserialize)]
pub struct MktPsrType {
    #[serde(rename = "psrType")]
    pub psr_type: Option<String>,

    #[serde(rename = "PowerSystemResources")]
    pub resources: Option<PowerSystemResources>,
}

#[derive(Deserialize)]
pub struct PowerSystemResources {
    pub name: Option<String>,
}

#[serde_as]
#[derive(Deserialize)]
pub struct Period {
    #[serde(rename = "timeInterval")]
    pub time_interval: TimeInterval,

    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub resolution: Resolution,

    #[serde(rename = "Point", default)]
    pub points: Vec<Point>,
}

impl Period {
    /// Point position `p` is at `start + (p - 1) × resolution`.
    fn expand_into(
        self,
        forward_fill: bool,
        output: &mut Vec<(DateTime<Utc>, f64)>,
    ) -> Result<(), UpstreamError> {
        let step = self.resolution.0;
        let timestamp_of = |position: u32| -> Result<DateTime<Utc>, UpstreamError> {
            let offset = position
                .checked_sub(1)
                .and_then(|offset| i32::try_from(offset).ok())
                .ok_or_else(|| UpstreamError::Malformed(format!("invalid position {position}")))?;
            step.checked_mul(offset)
                .and_then(|delta| self.time_interval.start.checked_add_signed(delta))
                .ok_or_else(|| {
                    UpstreamError::Malformed(format!("position {position} is out of range"))
                })
        };

        if !forward_fill {
            for point in &self.points {
                output.push((timestamp_of(point.position)?, point.quantity));
            }
            return Ok(());
        }

        let mut points = self.points.iter().collect::<Vec<_>>();
        points.sort_by_key(|point| point.position);
        let n_positions = (self.time_interval.end - self.time_interval.start).num_seconds()
            / step.num_seconds();
        let n_positions = u32::try_from(n_positions).map_err(malformed)?;
        let mut points = points.into_iter().peekable();
        let mut last_quantity = None;
        for position in 1..=n_positions {
            while let Some(point) = points.next_if(|point| point.position <= position) {
                last_quantity = Some(point.quantity);
            }
            if let Some(quantity) = last_quantity {
                output.push((timestamp_of(position)?, quantity));
            }
        }
        Ok(())
    }
}

#[derive(Deserialize)]
pub struct TimeInterval {
    #[serde(deserialize_with = "deserialize_instant")]
    pub start: DateTime<Utc>,

    #[serde(deserialize_with = "deserialize_instant")]
    pub end: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct Point {
    pub position: u32,

    /// Megawatts.
    pub quantity: f64,
}

/// The API writes instants as `2024-01-01T23:00Z`, without seconds.
fn deserialize_instant<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let text = String::deserialize(deserializer)?;
    NaiveDateTime::parse_from_str(&text, "%Y-%m-%dT%H:%MZ")
        .map(|naive| naive.and_utc())
        .or_else(|_| DateTime::parse_from_rfc3339(&text).map(|instant| instant.to_utc()))
        .map_err(|_| de::Error::invalid_value(de::Unexpected::Str(&text), &"an ISO 8601 instant"))
}

/// ISO 8601 duration of a period step: `PT15M`, `PT60M`, `PT1H`, `P1D`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Resolution(pub TimeDelta);

impl FromStr for Resolution {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        let time = text.strip_prefix("PT");
        let delta = if let Some(minutes) = time.and_then(|time| time.strip_suffix('M')) {
            TimeDelta::try_minutes(minutes.parse()?)
        } else if let Some(hours) = time.and_then(|time| time.strip_suffix('H')) {
            TimeDelta::try_hours(hours.parse()?)
        } else if let Some(days) = text.strip_prefix('P').and_then(|date| date.strip_suffix('D')) {
            TimeDelta::try_days(days.parse()?)
        } else {
            bail!("unsupported resolution `{text}`");
        };
        let delta = delta.with_context(|| format!("resolution `{text}` is out of range"))?;
        ensure!(delta > TimeDelta::zero(), "resolution `{text}` is not positive");
        Ok(Self(delta))
    }
}
