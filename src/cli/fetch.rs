use std::{fs, path::PathBuf};

use chrono::{Days, Local, NaiveDate};
use clap::Parser;
use itertools::Itertools;

use crate::{
    cli::api::ApiArgs,
    core::{
        export::DEFAULT_SHEET_NAME,
        psr_type,
        request::FetchRequest,
        session::{Outcome, Report, Session},
        zone::BiddingZone,
    },
    prelude::*,
    tables::build_generation_table,
};

#[derive(Parser)]
pub struct FetchArgs {
    #[clap(long, default_value = "CZ")]
    zone: BiddingZone,

    /// First day, inclusive. Defaults to seven days ago.
    #[clap(long)]
    start: Option<NaiveDate>,

    /// Last day, inclusive. Defaults to yesterday.
    #[clap(long)]
    end: Option<NaiveDate>,

    /// Only fetch the production type, for example: `B14` for nuclear.
    #[clap(long, value_parser = psr_type::parse_code)]
    psr_type: Option<String>,

    #[clap(
        long = "format",
        value_delimiter = ',',
        num_args = 1..,
        default_value = "csv,xlsx",
    )]
    formats: Vec<ExportFormat>,

    #[clap(long, env = "ENTSOE_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    #[clap(long, default_value = DEFAULT_SHEET_NAME)]
    sheet_name: String,

    /// Do not print the hourly table.
    #[clap(long)]
    quiet: bool,

    #[clap(flatten)]
    api: ApiArgs,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, clap::ValueEnum)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
        }
    }
}

impl FetchArgs {
    #[instrument(skip_all)]
    pub fn run(&self) -> Result {
        let today = Local::now().date_naive();
        let request = self.request(today);
        let source = self.api.new_client(request.psr_type.clone());

        let mut session = Session::default();
        if session.refresh(&source, &request, today)? == Outcome::Empty {
            warn!(
                zone = %request.zone,
                first_day = %request.first_day,
                last_day = %request.last_day,
                "nothing to export",
            );
            return Ok(());
        }
        let report = session.report().context("the refresh did not produce a report")?;
        info!(
            n_raw_rows = report.n_raw_rows,
            n_hours = report.hourly.n_rows(),
            n_warnings = report.warnings.len(),
            "fetched",
        );

        if !self.quiet {
            println!("{}", build_generation_table(&report.display));
        }
        self.export(report)
    }

    fn request(&self, today: NaiveDate) -> FetchRequest {
        let first_day = self.start.unwrap_or_else(|| today - Days::new(7));
        let last_day = self.end.unwrap_or_else(|| today - Days::new(1));
        FetchRequest::builder()
            .zone(self.zone)
            .first_day(first_day)
            .last_day(last_day)
            .maybe_psr_type(self.psr_type.clone())
            .build()
    }

    fn export(&self, report: &Report) -> Result {
        fs::create_dir_all(&self.output_dir)
            .with_context(|| format!("failed to create `{}`", self.output_dir.display()))?;
        for format in self.formats.iter().copied().unique() {
            let contents = match format {
                ExportFormat::Csv => report.csv()?,
                ExportFormat::Xlsx => report.xlsx(&self.sheet_name)?,
            };
            let path = self.output_dir.join(report.file_name(format.extension()));
            fs::write(&path, &contents)
                .with_context(|| format!("failed to write `{}`", path.display()))?;
            info!(path = %path.display(), n_bytes = contents.len(), "exported");
        }
        Ok(())
    }
}
