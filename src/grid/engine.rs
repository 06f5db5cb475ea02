//! Data Grid Engine
//!
//! Owns the schema, configuration and view state for one grid over a
//! shared, read-only row sequence. Every mutation is a no-op when the
//! relevant feature is disabled or the target does not exist.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use crate::error::ExportError;
use crate::grid::export::{
    encode, encode_html, ExportFormat, ExportOptions, ExportOutput, ExportTable, PrintTarget,
};
use crate::grid::pipeline::{clamp_page_index, filter_rows, find_column, row_id};
use crate::grid::view::{column_visible, compute_view, GridView};
use crate::grid::{
    ColumnDef, FilterValue, GridConfig, GridState, Record, RowId, SortDirection, SortKey,
};

/// Called with the clicked row.
pub type RowClickFn<R> = Box<dyn Fn(&R) + Send + Sync>;
/// Called with every selected row, in input order, after the selection changes.
pub type SelectionChangeFn<R> = Box<dyn Fn(&[&R]) + Send + Sync>;

// == Data Grid ==
pub struct DataGrid<R> {
    rows: Arc<[R]>,
    columns: Vec<ColumnDef<R>>,
    config: GridConfig,
    state: GridState,
    on_row_click: Option<RowClickFn<R>>,
    on_selection_change: Option<SelectionChangeFn<R>>,
}

impl<R: Record> DataGrid<R> {
    /// Creates a grid with default state and the configured page size.
    pub fn new(rows: impl Into<Arc<[R]>>, columns: Vec<ColumnDef<R>>, config: GridConfig) -> Self {
        let mut state = GridState::default();
        state.pagination.page_size = config.pagination.page_size.max(1);
        Self {
            rows: rows.into(),
            columns,
            config,
            state,
            on_row_click: None,
            on_selection_change: None,
        }
    }

    /// Starts from a previously saved state, clamping its page index.
    pub fn with_state(mut self, state: GridState) -> Self {
        self.set_state(state);
        self
    }

    pub fn on_row_click<F>(mut self, f: F) -> Self
    where
        F: Fn(&R) + Send + Sync + 'static,
    {
        self.on_row_click = Some(Box::new(f));
        self
    }

    pub fn on_row_selection_change<F>(mut self, f: F) -> Self
    where
        F: Fn(&[&R]) + Send + Sync + 'static,
    {
        self.on_selection_change = Some(Box::new(f));
        self
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn columns(&self) -> &[ColumnDef<R>] {
        &self.columns
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn state(&self) -> &GridState {
        &self.state
    }

    pub fn set_state(&mut self, mut state: GridState) {
        if state.pagination.page_size == 0 {
            state.pagination.page_size = self.config.pagination.page_size.max(1);
        }
        self.state = state;
        self.clamp_page();
    }

    /// Replaces the row sequence. Selected ids no longer present are dropped.
    pub fn set_rows(&mut self, rows: impl Into<Arc<[R]>>) {
        self.rows = rows.into();
        let known: BTreeSet<RowId> = self.all_ids().into_iter().collect();
        self.update_selection(|selection| selection.retain(|id| known.contains(id)));
        self.clamp_page();
    }

    /// The current derived view.
    pub fn view(&self) -> GridView<'_, R> {
        compute_view(&self.rows, &self.columns, &self.state, &self.config)
    }

    // == Filtering ==
    pub fn set_global_filter(&mut self, text: impl Into<String>) {
        if !self.config.filter_config.enable_global_filter {
            return;
        }
        self.state.global_filter = text.into();
        self.reset_page();
    }

    /// Routes the search box to the configured search column, or to the
    /// global filter when none is configured.
    pub fn set_search(&mut self, text: impl Into<String>) {
        match self.config.filter_config.search_key.clone() {
            Some(column_id) => {
                self.set_column_filter(&column_id, FilterValue::Contains(text.into()))
            }
            None => self.set_global_filter(text),
        }
    }

    /// Sets a column filter; an empty filter removes it.
    pub fn set_column_filter(&mut self, column_id: &str, value: FilterValue) {
        match find_column(&self.columns, column_id) {
            Some(column) if column.has_data() => {}
            _ => return,
        }
        if value.is_empty() {
            self.state.column_filters.remove(column_id);
        } else {
            self.state.column_filters.insert(column_id.to_string(), value);
        }
        self.reset_page();
    }

    pub fn clear_column_filter(&mut self, column_id: &str) {
        if self.state.column_filters.remove(column_id).is_some() {
            self.reset_page();
        }
    }

    pub fn reset_column_filters(&mut self) {
        self.state.column_filters.clear();
        self.reset_page();
    }

    /// True iff at least one column filter is active.
    pub fn is_filtered(&self) -> bool {
        self.state.is_filtered()
    }

    // == Sorting ==
    /// Single-column sort. Without a direction cycles
    /// unsorted, ascending, descending, unsorted.
    pub fn toggle_sort(&mut self, column_id: &str, direction: Option<SortDirection>) {
        if !self.can_sort(column_id) {
            return;
        }
        let current = self.sort_direction(column_id);
        let next = direction.or_else(|| cycle(current));

        self.state.sorting = next
            .map(|d| vec![SortKey::new(column_id, d)])
            .unwrap_or_default();
        self.reset_page();
    }

    /// Multi-column sort. Appends the column as the least significant key,
    /// or cycles it in place when already sorted.
    pub fn toggle_sort_multi(&mut self, column_id: &str, direction: Option<SortDirection>) {
        if !self.can_sort(column_id) {
            return;
        }
        let position = self
            .state
            .sorting
            .iter()
            .position(|k| k.column_id == column_id);

        match (position, direction) {
            (Some(i), Some(d)) => self.state.sorting[i].direction = d,
            (Some(i), None) => match cycle(Some(self.state.sorting[i].direction)) {
                Some(d) => self.state.sorting[i].direction = d,
                None => {
                    self.state.sorting.remove(i);
                }
            },
            (None, d) => self
                .state
                .sorting
                .push(SortKey::new(column_id, d.unwrap_or(SortDirection::Asc))),
        }
        self.reset_page();
    }

    pub fn clear_sorting(&mut self) {
        if !self.state.sorting.is_empty() {
            self.state.sorting.clear();
            self.reset_page();
        }
    }

    pub fn sort_direction(&self, column_id: &str) -> Option<SortDirection> {
        self.state
            .sorting
            .iter()
            .find(|k| k.column_id == column_id)
            .map(|k| k.direction)
    }

    fn can_sort(&self, column_id: &str) -> bool {
        self.config.enable_sorting
            && find_column(&self.columns, column_id).is_some_and(|c| c.sortable && c.has_data())
    }

    // == Column Visibility ==
    pub fn toggle_column_visibility(&mut self, column_id: &str, visible: bool) {
        if !self.config.enable_column_visibility {
            return;
        }
        if find_column(&self.columns, column_id).is_some_and(|c| c.hideable) {
            self.state
                .column_visibility
                .insert(column_id.to_string(), visible);
        }
    }

    pub fn is_column_visible(&self, column_id: &str) -> bool {
        find_column(&self.columns, column_id)
            .is_some_and(|c| column_visible(c, &self.state, &self.config))
    }

    // == Selection ==
    pub fn toggle_row_selection(&mut self, id: &str, selected: bool) {
        if !self.all_ids().iter().any(|known| known == id) {
            return;
        }
        let id = id.to_string();
        self.update_selection(|selection| {
            if selected {
                selection.insert(id);
            } else {
                selection.remove(&id);
            }
        });
    }

    /// Selects or deselects every row on the current page.
    pub fn toggle_all_on_page(&mut self, selected: bool) {
        let ids = self.view().page_ids();
        self.update_selection(|selection| apply_all(selection, ids, selected));
    }

    /// Selects or deselects every row passing the filters, across pages.
    pub fn toggle_all_filtered(&mut self, selected: bool) {
        let ids = self.view().filtered_ids();
        self.update_selection(|selection| apply_all(selection, ids, selected));
    }

    pub fn clear_selection(&mut self) {
        self.update_selection(BTreeSet::clear);
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.state.row_selection.contains(id)
    }

    /// Selected rows in input order, regardless of filters or page.
    pub fn selected_rows(&self) -> Vec<&R> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(i, row)| {
                self.state
                    .row_selection
                    .contains(&row_id(*row, *i, &self.config))
            })
            .map(|(_, row)| row)
            .collect()
    }

    fn update_selection(&mut self, change: impl FnOnce(&mut BTreeSet<RowId>)) {
        if !self.config.enable_row_selection {
            return;
        }
        let before = self.state.row_selection.clone();
        change(&mut self.state.row_selection);
        if self.state.row_selection != before {
            debug!("Row selection changed: {} selected", self.state.row_selection.len());
            if let Some(callback) = &self.on_selection_change {
                callback(&self.selected_rows());
            }
        }
    }

    fn all_ids(&self) -> Vec<RowId> {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| row_id(row, i, &self.config))
            .collect()
    }

    // == Pagination ==
    pub fn set_page_index(&mut self, page_index: usize) {
        self.state.pagination.page_index = page_index;
        self.clamp_page();
    }

    /// Changes the page size keeping the first visible row on screen.
    pub fn set_page_size(&mut self, page_size: usize) {
        if page_size == 0 {
            return;
        }
        let first = self.state.pagination.page_index * self.state.pagination.page_size;
        self.state.pagination.page_size = page_size;
        self.state.pagination.page_index = first / page_size;
        self.clamp_page();
    }

    pub fn next_page(&mut self) {
        self.set_page_index(self.state.pagination.page_index.saturating_add(1));
    }

    pub fn previous_page(&mut self) {
        self.set_page_index(self.state.pagination.page_index.saturating_sub(1));
    }

    pub fn first_page(&mut self) {
        self.set_page_index(0);
    }

    pub fn last_page(&mut self) {
        self.set_page_index(usize::MAX);
    }

    fn reset_page(&mut self) {
        self.state.pagination.page_index = 0;
    }

    fn clamp_page(&mut self) {
        let filtered = filter_rows(&self.rows, &self.columns, &self.state, &self.config).len();
        let pagination = &mut self.state.pagination;
        pagination.page_index = if self.config.pagination.enabled {
            clamp_page_index(pagination.page_index, filtered, pagination.page_size)
        } else {
            0
        };
    }

    // == Row Click ==
    /// Fires the row click callback. Returns false for an unknown id.
    pub fn click_row(&self, id: &str) -> bool {
        let Some(row) = self
            .rows
            .iter()
            .enumerate()
            .find(|(i, row)| row_id(*row, *i, &self.config) == id)
            .map(|(_, row)| row)
        else {
            return false;
        };
        if let Some(callback) = &self.on_row_click {
            callback(row);
        }
        true
    }

    // == Export ==
    /// Rows and columns an export would contain.
    ///
    /// Rows are the filtered, sorted set ignoring pagination, or only the
    /// selected ones among them. Columns are the visible data columns, or
    /// every data column when hidden ones are included.
    pub fn export_table(&self, options: &ExportOptions) -> ExportTable {
        let view = self.view();
        let columns: Vec<&ColumnDef<R>> = self
            .columns
            .iter()
            .filter(|c| c.has_data())
            .filter(|c| {
                options.include_hidden_columns || column_visible(c, &self.state, &self.config)
            })
            .collect();

        let rows = view
            .filtered_rows()
            .filter(|(id, _)| !options.selected_rows_only || self.state.row_selection.contains(*id))
            .map(|(_, row)| columns.iter().map(|c| c.value(row)).collect())
            .collect();

        ExportTable {
            title: options.filename.clone(),
            headers: columns.iter().map(|c| c.header.clone()).collect(),
            rows,
        }
    }

    pub fn export_rows(
        &self,
        format: ExportFormat,
        options: &ExportOptions,
    ) -> Result<ExportOutput, ExportError> {
        if !self.config.enable_export {
            return Err(ExportError::Disabled);
        }
        let table = self.export_table(options);
        debug!("Exporting {} rows as {:?}", table.rows.len(), format);
        encode(&table, format, options)
    }

    /// Renders the printable document and hands it to the print target.
    pub async fn print(
        &self,
        target: &dyn PrintTarget,
        options: &ExportOptions,
    ) -> Result<(), ExportError> {
        if !self.config.enable_export {
            return Err(ExportError::Disabled);
        }
        let table = self.export_table(options);
        let html = encode_html(&table);
        target.print(&table.title, &html).await
    }
}

fn cycle(current: Option<SortDirection>) -> Option<SortDirection> {
    match current {
        None => Some(SortDirection::Asc),
        Some(SortDirection::Asc) => Some(SortDirection::Desc),
        Some(SortDirection::Desc) => None,
    }
}

fn apply_all(selection: &mut BTreeSet<RowId>, ids: Vec<RowId>, selected: bool) {
    for id in ids {
        if selected {
            selection.insert(id);
        } else {
            selection.remove(&id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::CellValue;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    fn columns() -> Vec<ColumnDef<Value>> {
        vec![
            ColumnDef::presentational("select", ""),
            ColumnDef::field("title", "Title"),
            ColumnDef::field("price", "Price"),
            ColumnDef::field("city", "City"),
            ColumnDef::field("agent", "Agent").hidden_by_default(),
            ColumnDef::field("id", "Id").hideable(false).sortable(false),
        ]
    }

    fn listings(n: usize) -> Vec<Value> {
        let cities = ["Austin", "Boston", "Miami"];
        (0..n)
            .map(|i| {
                json!({
                    "id": format!("p{i}"),
                    "title": format!("Listing {i:02}"),
                    "price": (i % 4) * 100,
                    "city": cities[i % 3],
                    "agent": "Sam",
                })
            })
            .collect()
    }

    fn grid(n: usize) -> DataGrid<Value> {
        DataGrid::new(listings(n), columns(), GridConfig::default())
    }

    fn page_titles(grid: &DataGrid<Value>) -> Vec<String> {
        grid.view()
            .rows
            .iter()
            .map(|r| r.record.field("title").to_string())
            .collect()
    }

    #[test]
    fn test_filter_then_sort_then_paginate() {
        let mut grid = grid(30);
        grid.set_global_filter("austin");
        grid.toggle_sort("price", Some(SortDirection::Desc));
        grid.set_page_size(3);
        grid.set_page_index(1);

        // Austin rows are i % 3 == 0; stable desc sort by price
        let mut expected: Vec<usize> = (0..30).filter(|i| i % 3 == 0).collect();
        expected.sort_by_key(|i| std::cmp::Reverse((i % 4) * 100));
        let expected: Vec<String> = expected[3..6]
            .iter()
            .map(|i| format!("Listing {i:02}"))
            .collect();

        assert_eq!(page_titles(&grid), expected);
        assert_eq!(grid.view().filtered_count, 10);
    }

    #[test]
    fn test_sort_is_stable_for_equal_keys() {
        let mut grid = grid(12);
        grid.set_page_size(12);
        grid.toggle_sort("price", None);

        let view = grid.view();
        let zero_priced: Vec<String> = view
            .rows
            .iter()
            .filter(|r| r.record.field("price") == CellValue::Int(0))
            .map(|r| r.id.clone())
            .collect();
        assert_eq!(zero_priced, vec!["p0", "p4", "p8"]);
    }

    #[test]
    fn test_toggle_sort_cycles() {
        let mut grid = grid(3);
        grid.toggle_sort("title", None);
        assert_eq!(grid.sort_direction("title"), Some(SortDirection::Asc));
        grid.toggle_sort("title", None);
        assert_eq!(grid.sort_direction("title"), Some(SortDirection::Desc));
        grid.toggle_sort("title", None);
        assert_eq!(grid.sort_direction("title"), None);
        assert!(grid.state().sorting.is_empty());
    }

    #[test]
    fn test_single_sort_replaces_other_columns() {
        let mut grid = grid(3);
        grid.toggle_sort("title", None);
        grid.toggle_sort("price", None);
        assert_eq!(grid.state().sorting, vec![SortKey::asc("price")]);
    }

    #[test]
    fn test_multi_sort_appends_and_cycles_in_place() {
        let mut grid = grid(3);
        grid.toggle_sort_multi("city", None);
        grid.toggle_sort_multi("price", Some(SortDirection::Desc));
        assert_eq!(
            grid.state().sorting,
            vec![SortKey::asc("city"), SortKey::desc("price")]
        );

        grid.toggle_sort_multi("city", None);
        assert_eq!(grid.state().sorting[0], SortKey::desc("city"));

        grid.toggle_sort_multi("city", None);
        assert_eq!(grid.state().sorting, vec![SortKey::desc("price")]);
    }

    #[test]
    fn test_sort_noops() {
        let mut grid = grid(3);
        grid.toggle_sort("select", None);
        grid.toggle_sort("id", None);
        grid.toggle_sort("missing", None);
        assert!(grid.state().sorting.is_empty());

        let mut disabled = DataGrid::new(
            listings(3),
            columns(),
            GridConfig {
                enable_sorting: false,
                ..GridConfig::default()
            },
        );
        disabled.toggle_sort("title", None);
        assert!(disabled.state().sorting.is_empty());
    }

    #[test]
    fn test_filter_and_sort_changes_reset_page() {
        let mut grid = grid(30);
        grid.set_page_index(2);
        grid.set_column_filter("title", FilterValue::Contains("listing".to_string()));
        assert_eq!(grid.state().pagination.page_index, 0);

        grid.set_page_index(2);
        grid.toggle_sort("title", None);
        assert_eq!(grid.state().pagination.page_index, 0);
    }

    #[test]
    fn test_empty_column_filter_removes_it() {
        let mut grid = grid(5);
        grid.set_column_filter("city", FilterValue::Contains("bos".to_string()));
        assert!(grid.is_filtered());
        assert_eq!(grid.view().filtered_count, 2);

        grid.set_column_filter("city", FilterValue::Contains(String::new()));
        assert!(!grid.is_filtered());
        assert_eq!(grid.view().filtered_count, 5);
    }

    #[test]
    fn test_reset_column_filters() {
        let mut grid = grid(6);
        grid.set_column_filter("city", FilterValue::Contains("miami".to_string()));
        grid.set_column_filter("price", FilterValue::OneOf(vec![CellValue::Int(100)]));
        grid.reset_column_filters();

        assert!(!grid.is_filtered());
        assert_eq!(grid.view().filtered_count, 6);
    }

    #[test]
    fn test_search_key_routes_to_column_filter() {
        let config = GridConfig {
            filter_config: crate::grid::FilterConfig {
                search_key: Some("city".to_string()),
                ..Default::default()
            },
            ..GridConfig::default()
        };
        let mut grid = DataGrid::new(listings(6), columns(), config);
        grid.set_search("bost");

        assert!(grid.is_filtered());
        assert!(grid.state().global_filter.is_empty());
        assert_eq!(grid.view().filtered_count, 2);
    }

    #[test]
    fn test_global_filter_searches_hidden_columns() {
        let mut rows = listings(3);
        rows[1]["agent"] = json!("Priya");
        let mut grid = DataGrid::new(rows, columns(), GridConfig::default());
        grid.set_global_filter("priya");

        assert_eq!(grid.view().filtered_ids(), vec!["p1"]);
    }

    #[test]
    fn test_pagination_clamp() {
        let mut grid = grid(25);
        grid.set_page_index(10);
        assert_eq!(grid.state().pagination.page_index, 2);
        assert_eq!(grid.view().rows.len(), 5);

        grid.next_page();
        assert_eq!(grid.state().pagination.page_index, 2);
        grid.first_page();
        grid.previous_page();
        assert_eq!(grid.state().pagination.page_index, 0);
        grid.last_page();
        assert_eq!(grid.state().pagination.page_index, 2);
    }

    #[test]
    fn test_page_size_keeps_first_visible_row() {
        let mut grid = grid(25);
        grid.set_page_index(2);
        let first = grid.view().rows[0].id.clone();

        grid.set_page_size(5);
        assert_eq!(grid.state().pagination.page_index, 4);
        assert_eq!(grid.view().rows[0].id, first);

        grid.set_page_size(0);
        assert_eq!(grid.state().pagination.page_size, 5);
    }

    #[test]
    fn test_with_state_clamps() {
        let mut state = GridState::default();
        state.pagination.page_index = 99;
        let grid = grid(25).with_state(state);
        assert_eq!(grid.state().pagination.page_index, 2);
    }

    #[test]
    fn test_selection_survives_sort_filter_and_paging() {
        let mut grid = grid(30);
        grid.toggle_row_selection("p7", true);
        grid.toggle_row_selection("p21", true);

        grid.toggle_sort("title", Some(SortDirection::Desc));
        grid.set_global_filter("boston");
        grid.set_page_index(3);
        grid.set_global_filter("");

        let selected: Vec<String> = grid
            .selected_rows()
            .iter()
            .map(|r| r.field("id").to_string())
            .collect();
        assert_eq!(selected, vec!["p7", "p21"]);
        assert!(grid.is_selected("p7"));
    }

    #[test]
    fn test_unknown_row_is_not_selected() {
        let mut grid = grid(3);
        grid.toggle_row_selection("nope", true);
        assert!(grid.state().row_selection.is_empty());
    }

    #[test]
    fn test_row_without_id_does_not_alias_explicit_id() {
        let rows = vec![
            json!({"title": "no id here"}),
            json!({"id": "0", "title": "explicit id 0"}),
        ];
        let mut grid = DataGrid::new(rows, columns(), GridConfig::default());

        grid.toggle_row_selection("0", true);
        let titles: Vec<String> = grid
            .selected_rows()
            .iter()
            .map(|r| r.field("title").to_string())
            .collect();
        assert_eq!(titles, vec!["explicit id 0"]);

        grid.toggle_row_selection("#0", true);
        assert_eq!(grid.selected_rows().len(), 2);
    }

    #[test]
    fn test_toggle_all_on_page_and_filtered() {
        let mut grid = grid(25);
        grid.toggle_all_on_page(true);
        assert_eq!(grid.state().row_selection.len(), 10);
        assert!(grid.view().all_page_selected());

        grid.toggle_all_filtered(true);
        assert_eq!(grid.state().row_selection.len(), 25);

        grid.set_global_filter("miami");
        grid.toggle_all_filtered(false);
        assert_eq!(grid.state().row_selection.len(), 17);
    }

    #[test]
    fn test_selection_disabled_is_noop() {
        let mut grid = DataGrid::new(
            listings(3),
            columns(),
            GridConfig {
                enable_row_selection: false,
                ..GridConfig::default()
            },
        );
        grid.toggle_all_filtered(true);
        assert!(grid.state().row_selection.is_empty());
    }

    #[test]
    fn test_selection_callback_fires_on_change_only() {
        let seen: Arc<Mutex<Vec<usize>>> = Arc::default();
        let sink = Arc::clone(&seen);
        let mut grid = grid(5).on_row_selection_change(move |rows| {
            sink.lock().unwrap().push(rows.len());
        });

        grid.toggle_row_selection("p1", true);
        grid.toggle_row_selection("p1", true);
        grid.toggle_row_selection("p3", true);
        grid.clear_selection();

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 0]);
    }

    #[test]
    fn test_set_rows_prunes_selection() {
        let mut grid = grid(5);
        grid.toggle_row_selection("p4", true);
        grid.toggle_row_selection("p0", true);
        grid.set_rows(listings(3));

        assert_eq!(
            grid.state().row_selection.iter().collect::<Vec<_>>(),
            vec!["p0"]
        );
    }

    #[test]
    fn test_click_row() {
        let clicked: Arc<Mutex<Option<String>>> = Arc::default();
        let sink = Arc::clone(&clicked);
        let grid = grid(3).on_row_click(move |row| {
            *sink.lock().unwrap() = Some(row.field("title").to_string());
        });

        assert!(grid.click_row("p2"));
        assert!(!grid.click_row("p9"));
        assert_eq!(clicked.lock().unwrap().as_deref(), Some("Listing 02"));
    }

    #[test]
    fn test_column_visibility() {
        let mut grid = grid(3);
        assert!(!grid.is_column_visible("agent"));

        grid.toggle_column_visibility("agent", true);
        grid.toggle_column_visibility("id", false);
        grid.toggle_column_visibility("select", false);

        assert!(grid.is_column_visible("agent"));
        assert!(grid.is_column_visible("id"));
        assert!(grid.is_column_visible("select"));
    }

    #[test]
    fn test_export_uses_filtered_sorted_rows_and_visible_data_columns() {
        let mut grid = grid(9);
        grid.set_global_filter("miami");
        grid.toggle_sort("title", Some(SortDirection::Desc));
        grid.set_page_size(1);

        let table = grid.export_table(&ExportOptions::default());

        assert_eq!(table.headers, vec!["Title", "Price", "City", "Id"]);
        let ids: Vec<String> = table.rows.iter().map(|r| r[3].to_string()).collect();
        assert_eq!(ids, vec!["p8", "p5", "p2"]);
    }

    #[test]
    fn test_export_selected_only_and_hidden_columns() {
        let mut grid = grid(9);
        grid.toggle_row_selection("p4", true);
        grid.toggle_row_selection("p1", true);
        grid.set_global_filter("boston");

        let options = ExportOptions {
            selected_rows_only: true,
            include_hidden_columns: true,
            ..ExportOptions::default()
        };
        let table = grid.export_table(&options);

        assert!(table.headers.contains(&"Agent".to_string()));
        assert_eq!(table.rows.len(), 2);
    }

    #[test]
    fn test_export_csv_escapes_quotes() {
        let rows = vec![json!({"id": 1, "title": "He said, \"hi\"", "price": 1, "city": "X"})];
        let grid = DataGrid::new(rows, columns(), GridConfig::default());
        let out = grid
            .export_rows(ExportFormat::Csv, &ExportOptions::default())
            .unwrap();
        let text = String::from_utf8(out.bytes).unwrap();

        assert!(text.contains("\"He said, \"\"hi\"\"\""));
        assert_eq!(out.filename, "export.csv");
    }

    #[test]
    fn test_export_disabled() {
        let grid = DataGrid::new(
            listings(2),
            columns(),
            GridConfig {
                enable_export: false,
                ..GridConfig::default()
            },
        );
        let err = grid
            .export_rows(ExportFormat::Csv, &ExportOptions::default())
            .unwrap_err();
        assert!(matches!(err, ExportError::Disabled));
    }

    struct RecordingPrinter(Mutex<Vec<(String, String)>>);

    #[async_trait]
    impl PrintTarget for RecordingPrinter {
        async fn print(&self, title: &str, html: &str) -> Result<(), ExportError> {
            self.0
                .lock()
                .unwrap()
                .push((title.to_string(), html.to_string()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_print_hands_document_to_target() {
        let grid = grid(2);
        let printer = RecordingPrinter(Mutex::new(Vec::new()));
        let options = ExportOptions {
            filename: "Listings".to_string(),
            ..ExportOptions::default()
        };

        grid.print(&printer, &options).await.unwrap();

        let printed = printer.0.lock().unwrap();
        assert_eq!(printed.len(), 1);
        assert_eq!(printed[0].0, "Listings");
        assert!(printed[0].1.contains("<td>Listing 01</td>"));
    }
}
