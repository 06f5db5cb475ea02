//! Filter, sort and paginate stages over row indices.
//!
//! Stages work on positions into the caller's row slice, so the rows
//! themselves are only ever read.

use std::cmp::Ordering;
use std::ops::Range;

use crate::grid::{
    contains_ignore_case, CellValue, ColumnDef, GridConfig, GridState, Record, RowId, SortDirection,
    SortKey,
};

/// Identity of the row at `index`.
///
/// Uses the configured id field when it holds a value. A row missing it is
/// keyed `#<position>` so it cannot collide with a real id. Without an id
/// field every row is keyed by its bare position.
pub fn row_id<R: Record>(row: &R, index: usize, config: &GridConfig) -> RowId {
    match &config.row_id_field {
        Some(field) => match row.field(field) {
            CellValue::Null => format!("#{index}"),
            value => value.to_string(),
        },
        None => index.to_string(),
    }
}

pub fn find_column<'a, R>(columns: &'a [ColumnDef<R>], id: &str) -> Option<&'a ColumnDef<R>> {
    columns.iter().find(|c| c.id == id)
}

// == Filter ==
/// Positions of rows passing every column filter and the global filter,
/// in input order.
///
/// Filters naming an unknown or data-less column are ignored.
pub fn filter_rows<R: Record>(
    rows: &[R],
    columns: &[ColumnDef<R>],
    state: &GridState,
    config: &GridConfig,
) -> Vec<usize> {
    let column_filters: Vec<_> = state
        .column_filters
        .iter()
        .filter(|(_, filter)| !filter.is_empty())
        .filter_map(|(id, filter)| {
            find_column(columns, id)
                .filter(|c| c.has_data())
                .map(|c| (c, filter))
        })
        .collect();

    let global = if config.filter_config.enable_global_filter {
        state.global_filter.trim()
    } else {
        ""
    };
    let data_columns: Vec<&ColumnDef<R>> = columns.iter().filter(|c| c.has_data()).collect();

    rows.iter()
        .enumerate()
        .filter(|(_, row)| {
            column_filters
                .iter()
                .all(|(column, filter)| filter.matches(&column.filter_text(row)))
        })
        .filter(|(_, row)| {
            global.is_empty()
                || data_columns
                    .iter()
                    .any(|column| contains_ignore_case(&column.filter_text(row), global))
        })
        .map(|(index, _)| index)
        .collect()
}

// == Sort ==
/// Sorts positions by the sort keys, first key most significant.
///
/// Stable: rows comparing equal on every key keep their incoming order.
/// Nulls come first in both directions. Keys naming an unknown,
/// non-sortable or data-less column are skipped.
pub fn sort_rows<R: Record>(
    rows: &[R],
    columns: &[ColumnDef<R>],
    sorting: &[SortKey],
    indices: &mut Vec<usize>,
) {
    let keys: Vec<(&ColumnDef<R>, SortDirection)> = sorting
        .iter()
        .filter_map(|key| {
            find_column(columns, &key.column_id)
                .filter(|c| c.sortable && c.has_data())
                .map(|c| (c, key.direction))
        })
        .collect();

    if keys.is_empty() {
        return;
    }

    let mut decorated: Vec<(usize, Vec<CellValue>)> = indices
        .iter()
        .map(|&i| (i, keys.iter().map(|(c, _)| c.value(&rows[i])).collect()))
        .collect();

    decorated.sort_by(|(_, a), (_, b)| {
        keys.iter()
            .zip(a.iter().zip(b.iter()))
            .map(|((_, direction), (x, y))| compare_cells(x, y, *direction))
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });

    *indices = decorated.into_iter().map(|(i, _)| i).collect();
}

/// Directional comparison with nulls pinned to the top.
pub fn compare_cells(a: &CellValue, b: &CellValue, direction: SortDirection) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => match direction {
            SortDirection::Asc => a.compare(b),
            SortDirection::Desc => b.compare(a),
        },
    }
}

// == Paginate ==
pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        0
    } else {
        total.div_ceil(page_size)
    }
}

/// Clamps into `[0, max(0, page_count - 1)]`.
pub fn clamp_page_index(page_index: usize, total: usize, page_size: usize) -> usize {
    page_index.min(page_count(total, page_size).saturating_sub(1))
}

/// Range of the sorted, filtered positions shown on the current page.
pub fn page_range(
    total: usize,
    page_index: usize,
    page_size: usize,
    enabled: bool,
) -> Range<usize> {
    if !enabled || page_size == 0 {
        return 0..total;
    }
    let page_index = clamp_page_index(page_index, total, page_size);
    let start = (page_index * page_size).min(total);
    let end = (start + page_size).min(total);
    start..end
}
