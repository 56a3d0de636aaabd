//! CSV and XLSX serialization of the hourly table.

use chrono::{DateTime, NaiveDateTime};
use chrono_tz::Tz;
use rust_xlsxwriter::{DocProperties, ExcelDateTime, Format, Workbook};

use crate::{core::table::HourlyTable, prelude::*};

/// Spreadsheet applications need it to detect UTF-8.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Index format in the CSV, with the UTC offset.
const CSV_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";

const XLSX_TIMESTAMP_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

pub const DEFAULT_SHEET_NAME: &str = "Hourly";

/// Header rows: one per key level, the first cell being the level name.
fn header_rows(table: &HourlyTable) -> impl Iterator<Item = Vec<&str>> {
    (0..table.n_header_rows().max(1)).map(move |level| {
        std::iter::once(table.level_name(level))
            .chain(
                table
                    .columns()
                    .iter()
                    .map(move |column| column.key.get(level).map_or("", String::as_str)),
            )
            .collect()
    })
}

#[instrument(skip_all, fields(n_rows = table.n_rows(), n_columns = table.n_columns()))]
pub fn to_csv(table: &HourlyTable) -> Result<Vec<u8>> {
    let mut buffer = UTF8_BOM.to_vec();
    let mut writer = csv::Writer::from_writer(&mut buffer);
    for header in header_rows(table) {
        writer.write_record(header)?;
    }
    for (row, timestamp) in table.index().iter().enumerate() {
        let cells = (0..table.n_columns()).map(|column| {
            table.get(row, column).map_or_else(String::new, |value| value.to_string())
        });
        writer.write_record(
            std::iter::once(timestamp.format(CSV_TIMESTAMP_FORMAT).to_string()).chain(cells),
        )?;
    }
    writer.flush()?;
    drop(writer);
    debug!(n_bytes = buffer.len(), "serialized");
    Ok(buffer)
}

#[instrument(skip_all, fields(n_rows = table.n_rows(), n_columns = table.n_columns()))]
pub fn to_xlsx(table: &HourlyTable, sheet_name: &str) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();

    // Otherwise the creation time ends up in the file.
    let properties =
        DocProperties::new().set_creation_datetime(&ExcelDateTime::from_ymd(2000, 1, 1)?);
    workbook.set_properties(&properties);

    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(sheet_name)
        .with_context(|| format!("invalid sheet name `{sheet_name}`"))?;

    let bold = Format::new().set_bold();
    let mut row = 0_u32;
    for header in header_rows(table) {
        for (column, text) in header.into_iter().enumerate() {
            worksheet.write_string_with_format(row, u16::try_from(column)?, text, &bold)?;
        }
        row += 1;
    }

    let timestamp_format = Format::new().set_num_format(XLSX_TIMESTAMP_FORMAT);
    for (index_row, timestamp) in table.index().iter().enumerate() {
        worksheet.write_datetime_with_format(row, 0, &wall_clock(*timestamp), &timestamp_format)?;
        for column in 0..table.n_columns() {
            if let Some(value) = table.get(index_row, column) {
                worksheet.write_number(row, u16::try_from(column + 1)?, value)?;
            }
        }
        row += 1;
    }
    worksheet.set_column_width(0, 20)?;

    let buffer = workbook.save_to_buffer()?;
    debug!(n_bytes = buffer.len(), "serialized");
    Ok(buffer)
}

/// Local date and time as shown on the wall clock, without the offset.
#[must_use]
pub fn wall_clock(timestamp: DateTime<Tz>) -> NaiveDateTime {
    timestamp.naive_local()
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeMap, io::Read};

    use approx::assert_abs_diff_eq;
    use chrono::{TimeDelta, TimeZone};
    use chrono_tz::Europe::Prague;
    use quick_xml::{Reader, events::Event};

    use super::*;
    use crate::core::table::{Column, ColumnKey, Table};

    fn hourly_table() -> HourlyTable {
        hourly_table_since(Prague.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
    }

    fn hourly_table_since(start: DateTime<Tz>) -> HourlyTable {
        Table::try_new_sorted(
            vec!["Plant".to_string(), "Fuel type".to_string()],
            vec![start, start + TimeDelta::hours(1)],
            vec![
                Column {
                    key: ColumnKey::new(["Temelin 1", "Nuclear"]),
                    values: vec![Some(1080.25), None],
                },
                Column {
                    key: ColumnKey::new(["Dalesice 1", "Hydro Pumped Storage"]),
                    values: vec![Some(-110.0), Some(0.0)],
                },
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_csv_layout() -> Result {
        let csv = to_csv(&hourly_table())?;
        assert!(csv.starts_with(UTF8_BOM));
        let text = std::str::from_utf8(&csv[UTF8_BOM.len()..])?;
        assert_eq!(
            text,
            "Plant,Temelin 1,Dalesice 1\n\
             Fuel type,Nuclear,Hydro Pumped Storage\n\
             2024-01-01 00:00:00+01:00,1080.25,-110\n\
             2024-01-01 01:00:00+01:00,,0\n",
        );
        Ok(())
    }

    #[test]
    fn test_csv_round_trip() -> Result {
        let table = hourly_table();
        let csv = to_csv(&table)?;
        let mut reader =
            csv::ReaderBuilder::new().has_headers(false).from_reader(&csv[UTF8_BOM.len()..]);
        let records = reader.records().collect::<Result<Vec<_>, _>>()?;
        assert_eq!(records.len(), 2 + table.n_rows());
        for (row, record) in records[2..].iter().enumerate() {
            assert_eq!(record.len(), 1 + table.n_columns());
            for column in 0..table.n_columns() {
                let text = &record[column + 1];
                let value = if text.is_empty() { None } else { Some(text.parse::<f64>()?) };
                assert_eq!(value, table.get(row, column));
            }
        }
        Ok(())
    }

    #[test]
    fn test_exports_are_deterministic() -> Result {
        let table = hourly_table();
        assert_eq!(to_csv(&table)?, to_csv(&table)?);
        let xlsx = to_xlsx(&table, DEFAULT_SHEET_NAME)?;
        assert!(xlsx.starts_with(b"PK"));
        assert_eq!(xlsx, to_xlsx(&table, DEFAULT_SHEET_NAME)?);
        Ok(())
    }

    /// Cells of the first worksheet by reference: style index and raw value.
    fn read_cells(xlsx: &[u8]) -> Result<BTreeMap<String, (Option<String>, String)>> {
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(xlsx))?;
        let mut xml = String::new();
        archive.by_name("xl/worksheets/sheet1.xml")?.read_to_string(&mut xml)?;

        let mut reader = Reader::from_str(&xml);
        let mut cells = BTreeMap::new();
        let mut current = None;
        loop {
            match reader.read_event()? {
                Event::Start(start) if start.local_name().as_ref() == b"c" => {
                    let attribute = |name: &str| -> Result<Option<String>> {
                        match start.try_get_attribute(name)? {
                            Some(attribute) => Ok(Some(attribute.unescape_value()?.into_owned())),
                            None => Ok(None),
                        }
                    };
                    let reference = attribute("r")?.context("cell without a reference")?;
                    current = Some((reference, attribute("s")?));
                }
                Event::Text(text) => {
                    if let Some((reference, style)) = current.take() {
                        cells.insert(reference, (style, text.unescape()?.into_owned()));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(cells)
    }

    #[test]
    fn test_xlsx_cells() -> Result {
        let start = Prague.with_ymd_and_hms(2024, 7, 1, 13, 0, 0).unwrap();
        let cells = read_cells(&to_xlsx(&hourly_table_since(start), DEFAULT_SHEET_NAME)?)?;

        // Wall-clock 13:00, not 11:00 UTC.
        let (style, value) = &cells["A3"];
        assert!(style.is_some());
        assert_abs_diff_eq!(value.parse::<f64>()?, 45474.0 + 13.0 / 24.0, epsilon = 1e-9);

        // Numbers carry no format.
        assert_eq!(cells["B3"], (None, "1080.25".to_string()));
        assert_eq!(cells["C4"], (None, "0".to_string()));

        // Absent value.
        assert!(!cells.contains_key("B4"));
        Ok(())
    }

    #[test]
    fn test_invalid_sheet_name() {
        assert!(to_xlsx(&hourly_table(), "Hourly [MW]").is_err());
    }

    #[test]
    fn test_wall_clock_strips_offset() {
        let winter = Prague.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(wall_clock(winter).to_string(), "2024-01-01 00:00:00");
        let summer = Prague.with_ymd_and_hms(2024, 7, 1, 13, 0, 0).unwrap();
        assert_eq!(wall_clock(summer).to_string(), "2024-07-01 13:00:00");
    }
}
