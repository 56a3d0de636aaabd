use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};
use itertools::Itertools;

use crate::core::{table::DisplayTable, zone::BiddingZone};

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table
}

/// Hourly averages, one header line per key level.
#[must_use]
pub fn build_generation_table(display: &DisplayTable) -> Table {
    let mut table = new_table();
    let n_levels = display.n_header_rows();
    let index_header = (0..n_levels).map(|level| display.level_name(level)).join(" / ");
    table.set_header(
        std::iter::once(Cell::new(index_header).add_attribute(Attribute::Bold)).chain(
            display.columns().iter().map(|column| {
                Cell::new(column.key.join("\n"))
                    .add_attribute(Attribute::Bold)
                    .set_alignment(CellAlignment::Right)
            }),
        ),
    );
    for (row, timestamp) in display.index().iter().enumerate() {
        table.add_row(std::iter::once(Cell::new(timestamp).add_attribute(Attribute::Dim)).chain(
            (0..display.n_columns()).map(|column| match display.get(row, column) {
                Some(value) => Cell::new(format!("{value:.1}")).set_alignment(CellAlignment::Right),
                None => Cell::new(""),
            }),
        ));
    }
    table
}

#[must_use]
pub fn build_zones_table() -> Table {
    let mut table = new_table();
    table.set_header(vec!["Code", "Name", "EIC", "Time zone"]);
    for zone in BiddingZone::ALL {
        table.add_row(vec![
            Cell::new(zone.code()).fg(Color::Green),
            Cell::new(zone.display_name()),
            Cell::new(zone.eic()).add_attribute(Attribute::Dim),
            Cell::new(zone.time_zone().name()),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::table::{Column, ColumnKey},
        prelude::*,
    };

    #[test]
    fn test_generation_table() -> Result {
        let display = DisplayTable::try_new(
            vec!["Plant".to_string(), "Fuel type".to_string()],
            vec!["2024-01-01 00:00:00".to_string()],
            vec![Column {
                key: ColumnKey::new(["Temelin 1", "Nuclear"]),
                values: vec![Some(1080.25)],
            }],
        )?;
        let mut table = build_generation_table(&display);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.row_count(), 1);
        Ok(())
    }

    #[test]
    fn test_zones_table() {
        assert_eq!(build_zones_table().row_count(), BiddingZone::ALL.len());
    }
}
