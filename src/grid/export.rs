//! Export of grid rows to flat formats.
//!
//! Only columns with a data accessor take part; presentational columns
//! are dropped. Values are exported raw, not display-formatted.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ExportError;
use crate::grid::view::NO_RESULTS;
use crate::grid::CellValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Delimited text
    Csv,
    /// HTML table for printing or PDF conversion
    Print,
    /// Spreadsheet; CSV fallback when the native encoder is compiled out
    Excel,
}

/// Export configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportOptions {
    /// File name without extension
    pub filename: String,
    pub include_headers: bool,
    /// Export only selected rows among those passing the filters
    pub selected_rows_only: bool,
    /// Also export columns currently hidden
    pub include_hidden_columns: bool,
    /// Single-byte field delimiter for delimited text
    pub delimiter: char,
}

impl ExportOptions {
    /// The delimiter as a byte, when it is printable ASCII or a tab and is
    /// neither the quote character nor a line break.
    pub fn csv_delimiter(&self) -> Result<u8, ExportError> {
        match self.delimiter {
            '"' | '\n' | '\r' => Err(ExportError::InvalidDelimiter(self.delimiter)),
            c if c == '\t' || c.is_ascii_graphic() || c == ' ' => Ok(c as u8),
            c => Err(ExportError::InvalidDelimiter(c)),
        }
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            filename: "export".to_string(),
            include_headers: true,
            selected_rows_only: false,
            include_hidden_columns: false,
            delimiter: ',',
        }
    }
}

/// Rows and headers after column selection, ready for an encoder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportTable {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

/// Encoded export ready to hand to the caller.
#[derive(Debug, Clone)]
pub struct ExportOutput {
    /// Requested format
    pub format: ExportFormat,
    /// File name including the extension of the bytes actually produced
    pub filename: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
    /// True when Excel was requested but CSV was produced
    pub fell_back_to_csv: bool,
}

const CSV_MIME: &str = "text/csv";
const HTML_MIME: &str = "text/html";
#[cfg(feature = "xlsx")]
const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

// == Print Target ==
/// Renders an HTML document and shows the print dialog.
#[async_trait]
pub trait PrintTarget: Send + Sync {
    async fn print(&self, title: &str, html: &str) -> Result<(), ExportError>;
}

// == Encode ==
/// Encodes a table into the requested format.
pub fn encode(
    table: &ExportTable,
    format: ExportFormat,
    options: &ExportOptions,
) -> Result<ExportOutput, ExportError> {
    match format {
        ExportFormat::Csv => Ok(ExportOutput {
            format,
            filename: file_name(&options.filename, "csv"),
            mime_type: CSV_MIME,
            bytes: encode_csv(table, options)?,
            fell_back_to_csv: false,
        }),
        ExportFormat::Print => Ok(ExportOutput {
            format,
            filename: file_name(&options.filename, "html"),
            mime_type: HTML_MIME,
            bytes: encode_html(table).into_bytes(),
            fell_back_to_csv: false,
        }),
        ExportFormat::Excel => encode_excel(table, options),
    }
}

#[cfg(feature = "xlsx")]
fn encode_excel(table: &ExportTable, options: &ExportOptions) -> Result<ExportOutput, ExportError> {
    Ok(ExportOutput {
        format: ExportFormat::Excel,
        filename: file_name(&options.filename, "xlsx"),
        mime_type: XLSX_MIME,
        bytes: encode_xlsx(table, options)?,
        fell_back_to_csv: false,
    })
}

#[cfg(not(feature = "xlsx"))]
fn encode_excel(table: &ExportTable, options: &ExportOptions) -> Result<ExportOutput, ExportError> {
    tracing::warn!("Native spreadsheet encoder unavailable, exporting Excel as CSV");
    Ok(ExportOutput {
        format: ExportFormat::Excel,
        filename: file_name(&options.filename, "csv"),
        mime_type: CSV_MIME,
        bytes: encode_csv(table, options)?,
        fell_back_to_csv: true,
    })
}

fn file_name(base: &str, extension: &str) -> String {
    let base = base.trim();
    let base = if base.is_empty() { "export" } else { base };
    let suffix = format!(".{extension}");
    if base.to_lowercase().ends_with(&suffix) {
        base.to_string()
    } else {
        format!("{base}{suffix}")
    }
}

// == CSV ==
/// Delimited text with standard quoting: fields holding the delimiter, a
/// quote or a line break are quoted and inner quotes doubled.
pub fn encode_csv(table: &ExportTable, options: &ExportOptions) -> Result<Vec<u8>, ExportError> {
    let delimiter = options.csv_delimiter()?;
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    if options.include_headers {
        writer.write_record(&table.headers)?;
    }
    for row in &table.rows {
        writer.write_record(row.iter().map(|cell| cell.to_string()))?;
    }

    writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}

// == HTML ==
/// Standalone printable document with one table.
pub fn encode_html(table: &ExportTable) -> String {
    let title = escape_html(&table.title);
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{title}</title>\n"));
    html.push_str(
        "<style>\
         body{font-family:sans-serif;margin:24px}\
         table{border-collapse:collapse;width:100%}\
         th,td{border:1px solid #ccc;padding:6px 8px;text-align:left;font-size:12px}\
         th{background:#f3f4f6}\
         </style>\n",
    );
    html.push_str("</head>\n<body>\n");
    html.push_str(&format!("<h1>{title}</h1>\n<table>\n<thead>\n<tr>"));
    for header in &table.headers {
        html.push_str(&format!("<th>{}</th>", escape_html(header)));
    }
    html.push_str("</tr>\n</thead>\n<tbody>\n");

    if table.rows.is_empty() {
        html.push_str(&format!(
            "<tr><td colspan=\"{}\">{NO_RESULTS}</td></tr>\n",
            table.headers.len().max(1)
        ));
    }
    for row in &table.rows {
        html.push_str("<tr>");
        for cell in row {
            html.push_str(&format!("<td>{}</td>", escape_html(&cell.to_string())));
        }
        html.push_str("</tr>\n");
    }

    html.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    html
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

// == XLSX ==
#[cfg(feature = "xlsx")]
pub fn encode_xlsx(table: &ExportTable, options: &ExportOptions) -> Result<Vec<u8>, ExportError> {
    use rust_xlsxwriter::{Format, Workbook};

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let bold = Format::new().set_bold();

    let mut row_num: u32 = 0;
    if options.include_headers {
        for (col, header) in table.headers.iter().enumerate() {
            worksheet.write_string_with_format(row_num, col as u16, header, &bold)?;
        }
        row_num += 1;
    }

    for row in &table.rows {
        for (col, cell) in row.iter().enumerate() {
            let col = col as u16;
            match cell {
                CellValue::Null => {}
                CellValue::Bool(b) => {
                    worksheet.write_boolean(row_num, col, *b)?;
                }
                CellValue::Int(i) => {
                    worksheet.write_number(row_num, col, *i as f64)?;
                }
                CellValue::Float(f) => {
                    worksheet.write_number(row_num, col, *f)?;
                }
                CellValue::Text(s) => {
                    worksheet.write_string(row_num, col, s)?;
                }
            }
        }
        row_num += 1;
    }

    Ok(workbook.save_to_buffer()?)
}
