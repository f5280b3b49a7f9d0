//! Table Reconstructor: `table` node → rectangular [`Table`].

use log::debug;

use crate::inline::resolve_runs;
use crate::model::{Table, TableCell};
use crate::tree::SourceNode;

/// Rows of this table only: direct `tr`s and those inside its row groups.
/// Rows of nested tables are left to the cell content.
fn table_rows(table: &SourceNode) -> Vec<&SourceNode> {
    let mut rows = Vec::new();
    for child in table.element_children() {
        match child.tag.as_str() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => {
                rows.extend(child.element_children().filter(|r| r.tag == "tr"));
            }
            _ => {}
        }
    }
    rows
}

fn row_cells<'a>(row: &'a SourceNode) -> impl Iterator<Item = &'a SourceNode> {
    row.element_children()
        .filter(|c| c.tag == "td" || c.tag == "th")
}

/// Builds the grid. The first row's cell count is the column count for the
/// whole table; shorter rows are padded with empty cells and longer ones cut.
/// Returns `None` for a table without rows.
pub fn reconstruct(table: &SourceNode, math_class: &str) -> Option<Table> {
    let rows = table_rows(table);
    let first = rows.first()?;
    let columns = row_cells(first).count();

    let mut grid: Vec<Vec<TableCell>> = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let mut cells: Vec<TableCell> = row_cells(row)
            .take(columns)
            .map(|c| TableCell {
                runs: resolve_runs(c, math_class),
                header: c.tag == "th",
            })
            .collect();
        let found = row_cells(row).count();
        if found != columns {
            debug!("table row {} has {} cells, normalizing to {}", i, found, columns);
        }
        cells.resize_with(columns, TableCell::empty);
        grid.push(cells);
    }

    Some(Table {
        columns,
        rows: grid,
    })
}
