use chrono::NaiveDate;

use crate::{
    api::GenerationSource,
    core::{
        error::Warning,
        export,
        request::FetchRequest,
        table::{DisplayTable, HourlyTable},
        transform::{Transformed, transform},
    },
    prelude::*,
};

/// Result of a successful refresh.
#[must_use]
pub struct Report {
    pub request: FetchRequest,
    pub hourly: HourlyTable,
    pub display: DisplayTable,

    /// Number of fetched sub-hourly rows.
    pub n_raw_rows: usize,

    pub warnings: Vec<Warning>,
}

impl Report {
    pub fn csv(&self) -> Result<Vec<u8>> {
        export::to_csv(&self.hourly)
    }

    pub fn xlsx(&self, sheet_name: &str) -> Result<Vec<u8>> {
        export::to_xlsx(&self.hourly, sheet_name)
    }

    #[must_use]
    pub fn file_name(&self, extension: &str) -> String {
        self.request.file_name(extension)
    }
}

#[must_use]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// The report is available via [`Session::report`].
    Ready,

    /// The API has nothing for the request, which is not an error.
    Empty,
}

/// Holds the report of the latest refresh, if that refresh succeeded.
#[derive(Default)]
pub struct Session {
    report: Option<Report>,
}

impl Session {
    /// Fetch and transform, replacing the previous report.
    ///
    /// The previous report is dropped first, so after an error or an empty result
    /// the session is back in its initial state.
    #[instrument(
        skip_all,
        fields(zone = %request.zone, first_day = %request.first_day, last_day = %request.last_day),
    )]
    pub fn refresh(
        &mut self,
        source: &impl GenerationSource,
        request: &FetchRequest,
        today: NaiveDate,
    ) -> Result<Outcome> {
        self.report = None;

        request.check_not_after(today)?;
        let interval = request.interval()?;
        debug!(n_hours = interval.duration().num_hours(), "fetching…");
        let table = source.get_generation(request.zone, interval)?;
        if table.is_empty() {
            warn!("no data for the requested period");
            return Ok(Outcome::Empty);
        }

        let n_raw_rows = table.n_rows();
        let Transformed { hourly, display, warnings } = transform(table)?;
        info!(n_raw_rows, n_hours = hourly.n_rows(), n_columns = hourly.n_columns(), "ready");
        self.report =
            Some(Report { request: request.clone(), hourly, display, n_raw_rows, warnings });
        Ok(Outcome::Ready)
    }

    #[must_use]
    pub const fn report(&self) -> Option<&Report> {
        self.report.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::{
        api::{FakeSource, PlantSeries, quarter_hourly},
        core::{
            error::{PreconditionError, UpstreamError},
            interval::Interval,
            zone::BiddingZone,
        },
    };

    struct FailingSource;

    impl GenerationSource for FailingSource {
        fn get_generation_chunk(
            &self,
            _zone: BiddingZone,
            _interval: Interval,
        ) -> Result<Vec<PlantSeries>, UpstreamError> {
            Err(UpstreamError::Rejected { status: 401, message: "Unauthorized".into() })
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn request() -> FetchRequest {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        FetchRequest::builder().zone(BiddingZone::Cz).first_day(day).last_day(day).build()
    }

    fn source() -> FakeSource {
        let start = Utc.with_ymd_and_hms(2023, 12, 31, 23, 0, 0).unwrap();
        FakeSource {
            series: vec![
                quarter_hourly(["Temelin 1", "Nuclear", "Actual Aggregated"], start, 96, |_| 1000.0),
                quarter_hourly(["Temelin 2", "Nuclear", "Actual Aggregated"], start, 96, |i| {
                    f64::from(u32::try_from(i).unwrap())
                }),
            ],
            ..FakeSource::default()
        }
    }

    #[test]
    fn test_ready() -> Result {
        let mut session = Session::default();
        let outcome = session.refresh(&source(), &request(), today())?;
        assert_eq!(outcome, Outcome::Ready);

        let report = session.report().unwrap();
        assert_eq!(report.n_raw_rows, 96);
        assert_eq!(report.hourly.n_rows(), 24);
        assert_eq!(report.hourly.n_columns(), 2);
        assert_eq!(report.hourly.level_names(), ["Plant", "Fuel type"]);
        assert_eq!(report.hourly.get(0, 1), Some(1.5));
        assert_eq!(report.display.index()[23], "2024-01-01 23:00:00");
        assert!(report.warnings.is_empty());
        assert_eq!(
            report.file_name("xlsx"),
            "entsoe_generation_hourly_Czech_Republic_CZ_2024-01-01_to_2024-01-01.xlsx",
        );
        assert_eq!(report.csv()?, report.csv()?);
        Ok(())
    }

    #[test]
    fn test_empty_clears_report() -> Result {
        let mut session = Session::default();
        assert_eq!(session.refresh(&source(), &request(), today())?, Outcome::Ready);
        let outcome = session.refresh(&FakeSource::default(), &request(), today())?;
        assert_eq!(outcome, Outcome::Empty);
        assert!(session.report().is_none());
        Ok(())
    }

    #[test]
    fn test_error_clears_report() -> Result {
        let mut session = Session::default();
        assert_eq!(session.refresh(&source(), &request(), today())?, Outcome::Ready);
        let error = session.refresh(&FailingSource, &request(), today()).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<UpstreamError>(),
            Some(UpstreamError::Rejected { status: 401, .. }),
        ));
        assert!(session.report().is_none());
        Ok(())
    }

    #[test]
    fn test_precondition_is_checked_before_fetching() -> Result {
        let mut session = Session::default();
        let source = source();
        let day = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let request =
            FetchRequest::builder().zone(BiddingZone::Cz).first_day(day).last_day(day).build();
        let error = session.refresh(&source, &request, today()).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<PreconditionError>(),
            Some(PreconditionError::FutureDate { .. }),
        ));
        assert!(source.requested.borrow().is_empty());
        Ok(())
    }
}
