use crate::errors::ExportError;
use crate::models::WeeklySummary;
use crate::stats::week_stamp;
use chrono::NaiveDate;
use serde::Serialize;

#[cfg(feature = "pdf")]
mod pdf;

pub const CSV_HEADER: [&str; 5] = ["Macro", "Average", "Min", "Max", "DaysInTarget"];

pub const PDF_ENABLE_HINT: &str =
    "PDF export is unavailable. Build with `--features pdf` and leave MACRO_PDF_EXPORT unset to enable it.";

/// Whether this process can render PDF documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PdfCapability {
    Available,
    Unavailable,
}

impl PdfCapability {
    /// Combines the compiled-in renderer with the runtime switch.
    pub fn detect(enabled: bool) -> Self {
        if enabled && cfg!(feature = "pdf") {
            Self::Available
        } else {
            Self::Unavailable
        }
    }

    pub fn is_available(self) -> bool {
        self == Self::Available
    }
}

#[derive(Debug)]
pub enum PdfExport {
    Document(Vec<u8>),
    Unavailable,
}

pub fn csv_filename(week: NaiveDate) -> String {
    format!("macro_summary_{}.csv", week_stamp(week))
}

pub fn pdf_filename(week: NaiveDate) -> String {
    format!("macro_summary_{}.pdf", week_stamp(week))
}

/// Cell text shared by the PDF table; empty means no data.
pub(crate) fn table_rows(summary: &WeeklySummary) -> Vec<[String; 5]> {
    let cell = |value: Option<f64>| value.map(|v| v.to_string()).unwrap_or_default();
    summary
        .rows
        .iter()
        .map(|row| {
            [
                row.name.label().to_string(),
                cell(row.average),
                cell(row.min),
                cell(row.max),
                row.days_in_target.map(|d| d.to_string()).unwrap_or_default(),
            ]
        })
        .collect()
}

/// What the PDF page shows: a title line over a header row and one row per macro.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryTable {
    pub title: String,
    pub rows: Vec<[String; 5]>,
}

pub fn summary_table(summary: &WeeklySummary, week_label: &str) -> SummaryTable {
    let mut rows = vec![CSV_HEADER.map(str::to_string)];
    rows.extend(table_rows(summary));
    SummaryTable {
        title: format!("Macro Summary: Week of {week_label}"),
        rows,
    }
}

/// UTF-8 CSV of the weekly summary, header first.
pub fn summary_to_csv(summary: &WeeklySummary) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;
    for row in table_rows(summary) {
        writer.write_record(&row)?;
    }
    writer
        .into_inner()
        .map_err(|err| ExportError::Flush(err.error().to_string()))
}

pub fn summary_to_pdf(
    summary: &WeeklySummary,
    week_label: &str,
    capability: PdfCapability,
) -> Result<PdfExport, ExportError> {
    if !capability.is_available() {
        return Ok(PdfExport::Unavailable);
    }
    render_pdf(summary, week_label)
}

#[cfg(feature = "pdf")]
fn render_pdf(summary: &WeeklySummary, week_label: &str) -> Result<PdfExport, ExportError> {
    pdf::render_table(&summary_table(summary, week_label)).map(PdfExport::Document)
}

#[cfg(not(feature = "pdf"))]
fn render_pdf(_summary: &WeeklySummary, _week_label: &str) -> Result<PdfExport, ExportError> {
    Ok(PdfExport::Unavailable)
}
