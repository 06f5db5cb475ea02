//! Derived view over the grid state.
//!
//! [`compute_view`] is a pure function of rows, schema, state and config;
//! the same inputs always produce the same view.

use serde::Serialize;

use crate::grid::pipeline::{
    clamp_page_index, filter_rows, page_count, page_range, row_id, sort_rows,
};
use crate::grid::{ColumnDef, GridConfig, GridState, Record, RowId};

/// Placeholder text shown when nothing passes the filters.
pub const NO_RESULTS: &str = "No results.";

/// One row on the current page.
#[derive(Debug)]
pub struct ViewRow<'a, R> {
    pub id: RowId,
    /// Position in the caller's row slice
    pub index: usize,
    pub record: &'a R,
    pub selected: bool,
}

// == Grid View ==
#[derive(Debug)]
pub struct GridView<'a, R> {
    /// Rows on the current page, in display order
    pub rows: Vec<ViewRow<'a, R>>,
    /// Visible columns in schema order
    pub columns: Vec<&'a ColumnDef<R>>,
    pub total_count: usize,
    pub filtered_count: usize,
    pub page_index: usize,
    pub page_size: usize,
    pub page_count: usize,
    pub is_filtered: bool,
    pub selected_count: usize,
    /// Every row passing the filters, sorted, as (id, position)
    ordered: Vec<(RowId, usize)>,
    source: &'a [R],
}

/// Whether a column is currently shown.
///
/// Non-hideable columns always use their default; so does everything when
/// visibility toggling is disabled.
pub fn column_visible<R>(column: &ColumnDef<R>, state: &GridState, config: &GridConfig) -> bool {
    if !config.enable_column_visibility || !column.hideable {
        return column.visible_by_default;
    }
    state
        .column_visibility
        .get(&column.id)
        .copied()
        .unwrap_or(column.visible_by_default)
}

/// Derives the view: filter, then sort, then paginate.
pub fn compute_view<'a, R: Record>(
    rows: &'a [R],
    columns: &'a [ColumnDef<R>],
    state: &GridState,
    config: &GridConfig,
) -> GridView<'a, R> {
    let mut indices = filter_rows(rows, columns, state, config);
    if config.enable_sorting {
        sort_rows(rows, columns, &state.sorting, &mut indices);
    }

    let ordered: Vec<(RowId, usize)> = indices
        .into_iter()
        .map(|i| (row_id(&rows[i], i, config), i))
        .collect();

    let filtered_count = ordered.len();
    let enabled = config.pagination.enabled;
    let page_size = if enabled {
        state.pagination.page_size
    } else {
        filtered_count
    };
    let page_index = if enabled {
        clamp_page_index(state.pagination.page_index, filtered_count, page_size)
    } else {
        0
    };

    let page_rows = ordered[page_range(filtered_count, page_index, page_size, enabled)]
        .iter()
        .map(|(id, index)| ViewRow {
            id: id.clone(),
            index: *index,
            record: &rows[*index],
            selected: state.row_selection.contains(id),
        })
        .collect();

    let selected_count = rows
        .iter()
        .enumerate()
        .filter(|(i, row)| state.row_selection.contains(&row_id(*row, *i, config)))
        .count();

    GridView {
        rows: page_rows,
        columns: columns
            .iter()
            .filter(|c| column_visible(c, state, config))
            .collect(),
        total_count: rows.len(),
        filtered_count,
        page_index,
        page_size,
        page_count: if enabled {
            page_count(filtered_count, page_size)
        } else {
            usize::from(filtered_count > 0)
        },
        is_filtered: state.is_filtered(),
        selected_count,
        ordered,
        source: rows,
    }
}

impl<'a, R: Record> GridView<'a, R> {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn can_previous_page(&self) -> bool {
        self.page_index > 0
    }

    pub fn can_next_page(&self) -> bool {
        self.page_index + 1 < self.page_count
    }

    /// Ids of the rows on the current page.
    pub fn page_ids(&self) -> Vec<RowId> {
        self.rows.iter().map(|r| r.id.clone()).collect()
    }

    /// Ids of every row passing the filters, in display order.
    pub fn filtered_ids(&self) -> Vec<RowId> {
        self.ordered.iter().map(|(id, _)| id.clone()).collect()
    }

    /// Every row passing the filters, sorted, ignoring pagination.
    pub fn filtered_rows(&self) -> impl Iterator<Item = (&RowId, &'a R)> + '_ {
        let source = self.source;
        self.ordered.iter().map(move |(id, i)| (id, &source[*i]))
    }

    pub fn all_page_selected(&self) -> bool {
        !self.rows.is_empty() && self.rows.iter().all(|r| r.selected)
    }

    pub fn some_page_selected(&self) -> bool {
        self.rows.iter().any(|r| r.selected) && !self.all_page_selected()
    }

    // == Render ==
    /// Display text for the visible columns of the current page.
    pub fn render(&self) -> RenderedTable {
        let headers = self.columns.iter().map(|c| c.header.clone()).collect();

        let body = if self.rows.is_empty() {
            TableBody::NoResults {
                colspan: self.columns.len().max(1),
                message: NO_RESULTS.to_string(),
            }
        } else {
            TableBody::Rows {
                rows: self
                    .rows
                    .iter()
                    .map(|row| RenderedRow {
                        id: row.id.clone(),
                        selected: row.selected,
                        cells: self
                            .columns
                            .iter()
                            .map(|c| {
                                if c.has_data() {
                                    c.display(row.record)
                                } else {
                                    String::new()
                                }
                            })
                            .collect(),
                    })
                    .collect(),
            }
        };

        RenderedTable { headers, body }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedRow {
    pub id: RowId,
    pub selected: bool,
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TableBody {
    Rows { rows: Vec<RenderedRow> },
    /// Single placeholder row spanning every visible column
    NoResults { colspan: usize, message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedTable {
    pub headers: Vec<String>,
    pub body: TableBody,
}
