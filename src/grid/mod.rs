//! Grid Module
//!
//! Client-side data grid: filter, sort and paginate a caller-owned row
//! sequence through a column schema, with selection by row identity and
//! export of the filtered set.

mod column;
mod engine;
mod export;
mod pipeline;
mod state;
mod value;
mod view;


// Re-export public types
pub use column::{Accessor, ColumnDef, DisplayFormat, ValueFn};
pub use engine::{DataGrid, RowClickFn, SelectionChangeFn};
pub use export::{
    encode, encode_csv, encode_html, ExportFormat, ExportOptions, ExportOutput, ExportTable,
    PrintTarget,
};
#[cfg(feature = "xlsx")]
pub use export::encode_xlsx;
pub use pipeline::{compare_cells, filter_rows, page_count, row_id, sort_rows};
pub use state::{
    contains_ignore_case, FilterConfig, FilterValue, GridConfig, GridState, Pagination,
    PaginationConfig, RowId, SortDirection, SortKey,
};
pub use value::{CellValue, Record};
pub use view::{
    column_visible, compute_view, GridView, RenderedRow, RenderedTable, TableBody, ViewRow,
    NO_RESULTS,
};
