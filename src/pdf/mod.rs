pub mod layout;
mod render;

use crate::model::AttendanceRecord;
use anyhow::{anyhow, Context};
use std::path::{Path, PathBuf};
use tracing::info;

pub use layout::layout_document;

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub file_name: String,
    pub page_count: usize,
    pub record_count: usize,
}

/// `Laporan_Kehadiran_{title}.pdf`, whitespace runs collapsed to `_` and
/// path separators replaced so the title cannot escape the output dir.
pub fn export_file_name(title: &str) -> String {
    let cleaned: String = title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .map(|c| if c == '/' || c == '\\' { '-' } else { c })
        .collect();
    format!("Laporan_Kehadiran_{}.pdf", cleaned)
}

pub fn render_document(records: &[&AttendanceRecord], title: &str) -> anyhow::Result<(Vec<u8>, usize)> {
    if records.is_empty() {
        return Err(anyhow!("no records to export"));
    }
    let layout = layout_document(records);
    let bytes = render::render_pdf(title, &layout)?;
    Ok((bytes, layout.pages.len()))
}

pub fn export_records(
    records: &[&AttendanceRecord],
    title: &str,
    out_dir: &Path,
) -> anyhow::Result<ExportSummary> {
    let (bytes, page_count) = render_document(records, title)?;

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create directory {}", out_dir.to_string_lossy()))?;
    let file_name = export_file_name(title);
    let path = out_dir.join(&file_name);
    std::fs::write(&path, bytes)
        .with_context(|| format!("failed to write {}", path.to_string_lossy()))?;

    info!(
        path = %path.to_string_lossy(),
        records = records.len(),
        pages = page_count,
        "exported attendance pdf"
    );
    Ok(ExportSummary {
        path,
        file_name,
        page_count,
        record_count: records.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_normalizes_title() {
        assert_eq!(
            export_file_name("Batch  19 Oct\t2026"),
            "Laporan_Kehadiran_Batch_19_Oct_2026.pdf"
        );
        assert_eq!(
            export_file_name("Batch_19/10/2026"),
            "Laporan_Kehadiran_Batch_19-10-2026.pdf"
        );
        assert_eq!(export_file_name("2024-06-01"), "Laporan_Kehadiran_2024-06-01.pdf");
    }

    #[test]
    fn empty_selection_is_refused() {
        assert!(render_document(&[], "x").is_err());
    }
}
