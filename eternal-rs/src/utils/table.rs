//! Table output for listings and header dumps

use prettytable::format::{Alignment, consts::FORMAT_NO_LINESEP_WITH_TITLE};
use prettytable::{Cell, Row, Table};

/// Start a table with bold column titles
pub fn create_table<'a>(headers: impl IntoIterator<Item = &'a str>) -> Table {
    let mut table = Table::new();
    table.set_format(*FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(Row::new(
        headers
            .into_iter()
            .map(|title| Cell::new(title).style_spec("b"))
            .collect(),
    ));
    table
}

/// Whether a cell holds a plain count, offset or index
fn is_numeric(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

/// Append a row; plain numbers are right-aligned so counts line up
pub fn add_table_row(table: &mut Table, cells: impl IntoIterator<Item = String>) {
    let cells: Vec<Cell> = cells
        .into_iter()
        .map(|text| {
            let align = if is_numeric(&text) {
                Alignment::RIGHT
            } else {
                Alignment::LEFT
            };
            Cell::new_align(&text, align)
        })
        .collect();
    table.add_row(Row::new(cells));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_cells() {
        assert!(is_numeric("65535"));
        assert!(!is_numeric(""));
        assert!(!is_numeric("60/2"));
        assert!(!is_numeric("models/props/crate.lwo"));
    }

    #[test]
    fn test_table_shape() {
        let mut table = create_table(vec!["LOD", "Offset", "Length"]);
        add_table_row(&mut table, vec!["0".into(), "36".into(), "112".into()]);
        add_table_row(&mut table, vec!["1".into(), "36".into(), "112".into()]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get_row(0).map(Row::len), Some(3));
    }
}
