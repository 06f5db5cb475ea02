//! Column descriptors.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::grid::{CellValue, Record};

/// Derives a cell value from a whole row.
pub type ValueFn<R> = Arc<dyn Fn(&R) -> CellValue + Send + Sync>;

// == Accessor ==
/// Where a column's data comes from.
pub enum Accessor<R> {
    /// Read a field through [`Record::field`]
    Field(String),
    /// Compute from the row
    Computed(ValueFn<R>),
    /// No data: selection checkboxes, action menus and the like
    Presentational,
}

impl<R> Clone for Accessor<R> {
    fn clone(&self) -> Self {
        match self {
            Accessor::Field(path) => Accessor::Field(path.clone()),
            Accessor::Computed(f) => Accessor::Computed(Arc::clone(f)),
            Accessor::Presentational => Accessor::Presentational,
        }
    }
}

impl<R> fmt::Debug for Accessor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accessor::Field(path) => f.debug_tuple("Field").field(path).finish(),
            Accessor::Computed(_) => f.write_str("Computed(..)"),
            Accessor::Presentational => f.write_str("Presentational"),
        }
    }
}

// == Display Format ==
/// How a raw value is rendered as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DisplayFormat {
    /// `$1,250,000.00`
    Currency { symbol: String, decimals: u8 },
    Uppercase,
    /// Booleans as `Yes`/`No`
    YesNo,
    /// Cut text after `max` characters and append an ellipsis
    Truncate { max: usize },
}

impl DisplayFormat {
    pub fn apply(&self, value: &CellValue) -> String {
        match self {
            DisplayFormat::Currency { symbol, decimals } => match value.as_f64() {
                Some(amount) => format_currency(symbol, amount, *decimals as usize),
                None => value.to_string(),
            },
            DisplayFormat::Uppercase => value.to_string().to_uppercase(),
            DisplayFormat::YesNo => match value {
                CellValue::Bool(true) => "Yes".to_string(),
                CellValue::Bool(false) => "No".to_string(),
                other => other.to_string(),
            },
            DisplayFormat::Truncate { max } => {
                let text = value.to_string();
                if text.chars().count() <= *max {
                    text
                } else {
                    let mut cut: String = text.chars().take(*max).collect();
                    cut.push('…');
                    cut
                }
            }
        }
    }
}

fn format_currency(symbol: &str, amount: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, amount.abs());
    let (whole, frac) = match fixed.split_once('.') {
        Some((whole, frac)) => (whole, Some(frac)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    match frac {
        Some(frac) => format!("{sign}{symbol}{grouped}.{frac}"),
        None => format!("{sign}{symbol}{grouped}"),
    }
}

// == Column Definition ==
/// One column of the schema.
#[derive(Debug)]
pub struct ColumnDef<R> {
    pub id: String,
    pub header: String,
    pub accessor: Accessor<R>,
    pub sortable: bool,
    pub hideable: bool,
    pub visible_by_default: bool,
    pub format: Option<DisplayFormat>,
    /// Filter against the rendered text instead of the raw value
    pub filter_on_display: bool,
}

impl<R> Clone for ColumnDef<R> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            header: self.header.clone(),
            accessor: self.accessor.clone(),
            sortable: self.sortable,
            hideable: self.hideable,
            visible_by_default: self.visible_by_default,
            format: self.format.clone(),
            filter_on_display: self.filter_on_display,
        }
    }
}

impl<R> ColumnDef<R> {
    fn with_accessor(
        id: impl Into<String>,
        header: impl Into<String>,
        accessor: Accessor<R>,
    ) -> Self {
        let has_data = !matches!(accessor, Accessor::Presentational);
        Self {
            id: id.into(),
            header: header.into(),
            accessor,
            sortable: has_data,
            hideable: has_data,
            visible_by_default: true,
            format: None,
            filter_on_display: false,
        }
    }

    /// Column reading `id` as its field path.
    pub fn field(id: impl Into<String>, header: impl Into<String>) -> Self {
        let id = id.into();
        let path = id.clone();
        Self::with_accessor(id, header, Accessor::Field(path))
    }

    /// Column reading an explicit field path.
    pub fn field_path(
        id: impl Into<String>,
        header: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self::with_accessor(id, header, Accessor::Field(path.into()))
    }

    pub fn computed<F>(id: impl Into<String>, header: impl Into<String>, f: F) -> Self
    where
        F: Fn(&R) -> CellValue + Send + Sync + 'static,
    {
        Self::with_accessor(id, header, Accessor::Computed(Arc::new(f)))
    }

    /// Column without data; never sorted, filtered, hidden or exported.
    pub fn presentational(id: impl Into<String>, header: impl Into<String>) -> Self {
        Self::with_accessor(id, header, Accessor::Presentational)
    }

    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable && self.has_data();
        self
    }

    pub fn hideable(mut self, hideable: bool) -> Self {
        self.hideable = hideable;
        self
    }

    pub fn hidden_by_default(mut self) -> Self {
        self.visible_by_default = false;
        self
    }

    pub fn format(mut self, format: DisplayFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn filter_on_display(mut self) -> Self {
        self.filter_on_display = true;
        self
    }

    pub fn has_data(&self) -> bool {
        !matches!(self.accessor, Accessor::Presentational)
    }
}

impl<R: Record> ColumnDef<R> {
    /// Raw value of this column for a row.
    pub fn value(&self, row: &R) -> CellValue {
        match &self.accessor {
            Accessor::Field(path) => row.field(path),
            Accessor::Computed(f) => f(row),
            Accessor::Presentational => CellValue::Null,
        }
    }

    /// Rendered text of this column for a row.
    pub fn display(&self, row: &R) -> String {
        let value = self.value(row);
        match &self.format {
            Some(format) => format.apply(&value),
            None => value.to_string(),
        }
    }

    /// Text the column filters match against.
    pub fn filter_text(&self, row: &R) -> String {
        if self.filter_on_display {
            self.display(row)
        } else {
            self.value(row).to_string()
        }
    }
}
