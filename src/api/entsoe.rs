//! [ENTSO-E Transparency Platform](https://transparency.entsoe.eu) client.

mod document;

use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use ureq::Agent;

use self::document::{Document, TimeSeries};
use crate::{
    api::generation_source::{GenerationSource, PlantSeries},
    core::{error::UpstreamError, interval::Interval, zone::BiddingZone},
    prelude::*,
};

pub const DEFAULT_API_URL: &str = "https://web-api.tp.entsoe.eu/api";

/// Actual generation per generation unit.
const DOCUMENT_TYPE: &str = "A73";

/// Realised.
const PROCESS_TYPE: &str = "A16";

/// Responses are a few megabytes per day at most.
const MAX_BODY_SIZE: u64 = 64 * 1024 * 1024;

pub struct Api {
    client: Agent,
    url: String,
    security_token: String,
    psr_type: Option<String>,
}

impl Api {
    pub fn new(
        url: impl Into<String>,
        security_token: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Self {
        let client = Agent::config_builder()
            .timeout_global(timeout)
            .http_status_as_error(false)
            .build()
            .into();
        Self { client, url: url.into(), security_token: security_token.into(), psr_type: None }
    }

    /// Only fetch the production type, e.g. `B14` for nuclear.
    #[must_use]
    pub fn with_psr_type(mut self, psr_type: Option<String>) -> Self {
        self.psr_type = psr_type;
        self
    }
}

impl GenerationSource for Api {
    #[instrument(skip_all, fields(zone = %zone, start = %interval.start, end = %interval.end))]
    fn get_generation_chunk(
        &self,
        zone: BiddingZone,
        interval: Interval,
    ) -> Result<Vec<PlantSeries>, UpstreamError> {
        info!("Fetching…");
        let mut request = self
            .client
            .get(&self.url)
            .query("securityToken", &self.security_token)
            .query("documentType", DOCUMENT_TYPE)
            .query("processType", PROCESS_TYPE)
            .query("in_Domain", zone.eic())
            .query("periodStart", format_period(interval.start))
            .query("periodEnd", format_period(interval.end));
        if let Some(psr_type) = &self.psr_type {
            request = request.query("psrType", psr_type);
        }
        let mut response = request.call()?;
        let status = response.status().as_u16();
        let body = response.body_mut().with_config().limit(MAX_BODY_SIZE).read_to_string()?;
        let series = parse_response(status, &body)?;
        info!(status, n_series = series.len(), "Fetched");
        Ok(series)
    }
}

/// Interpret the response body.
///
/// An acknowledgement saying there is no matching data means an empty result, not an error.
fn parse_response(status: u16, body: &str) -> Result<Vec<PlantSeries>, UpstreamError> {
    let is_success = (200..300).contains(&status);
    let rejected = || UpstreamError::Rejected { status, message: body.trim().to_string() };
    let document = match Document::parse(body) {
        Ok(document) => document,
        Err(_) if !is_success => return Err(rejected()),
        Err(error) => return Err(error),
    };
    match document {
        Document::Acknowledgement(acknowledgement) if acknowledgement.is_no_matching_data() => {
            debug!(status, reason = acknowledgement.message(), "no matching data");
            Ok(Vec::new())
        }
        Document::Acknowledgement(acknowledgement) => {
            Err(UpstreamError::Rejected { status, message: acknowledgement.message() })
        }
        Document::Generation(_) if !is_success => Err(rejected()),
        Document::Generation(document) => {
            document.time_series.into_iter().map(TimeSeries::into_plant_series).collect()
        }
    }
}

/// The API takes UTC instants as `yyyyMMddHHmm`.
fn format_period(timestamp: DateTime<Tz>) -> String {
    timestamp.with_timezone(&Utc).format("%Y%m%d%H%M").to_string()
}
