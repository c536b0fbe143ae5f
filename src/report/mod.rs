pub mod markdown;

use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

use crate::domain::model::DashboardOutput;
use crate::domain::ports::{OutputFormat, OutputOptions};
use crate::domain::report::{PageKind, Table};
use crate::utils::error::{DashboardError, Result};

/// 一個待寫出的檔案 (相對於輸出目錄的路徑與內容)
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFile {
    pub path: String,
    pub data: Vec<u8>,
}

impl RenderedFile {
    fn new(path: String, data: impl Into<Vec<u8>>) -> Self {
        Self {
            path,
            data: data.into(),
        }
    }
}

pub fn render_outputs(output: &DashboardOutput, options: &OutputOptions) -> Result<Vec<RenderedFile>> {
    let mut files = Vec::new();

    if options.formats.contains(&OutputFormat::Markdown) {
        files.push(RenderedFile::new(
            "index.md".to_string(),
            markdown::render_index(&output.pages, &output.selection),
        ));
        for page in &output.pages {
            files.push(RenderedFile::new(
                format!("{}.md", page.page.slug()),
                markdown::render_page(page, &output.selection, options.table_row_limit),
            ));
        }
    }

    if options.formats.contains(&OutputFormat::Json) {
        files.push(RenderedFile::new(
            "selection.json".to_string(),
            serde_json::to_vec_pretty(&output.selection)?,
        ));
        for page in &output.pages {
            files.push(RenderedFile::new(
                format!("{}.json", page.page.slug()),
                serde_json::to_vec_pretty(page)?,
            ));
        }
    }

    if options.formats.contains(&OutputFormat::Csv) {
        for page in &output.pages {
            for table in &page.tables {
                files.push(RenderedFile::new(
                    table_file_name(page.page, table),
                    table_to_csv(table)?,
                ));
            }
        }
    }

    tracing::debug!("Rendered {} output files", files.len());
    Ok(files)
}

pub fn table_file_name(page: PageKind, table: &Table) -> String {
    let slug: String = table
        .title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let slug = slug
        .split('_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_");
    format!("{}_{}.csv", page.slug(), slug)
}

pub fn table_to_csv(table: &Table) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| DashboardError::ProcessingError {
            message: format!("Failed to flush CSV table '{}': {}", table.title, e),
        })
}

/// 把所有輸出檔打包成一個 ZIP
pub fn bundle_zip(files: &[RenderedFile]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    for file in files {
        zip.start_file::<_, ()>(file.path.as_str(), FileOptions::default())?;
        zip.write_all(&file.data)?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn late_table() -> Table {
        Table {
            title: "Late Delivery Orders".to_string(),
            columns: vec!["order_id".to_string(), "late_days".to_string()],
            rows: vec![
                vec!["o1".to_string(), "2".to_string()],
                vec!["o,2".to_string(), "5".to_string()],
            ],
        }
    }

    #[test]
    fn test_table_file_name() {
        assert_eq!(
            table_file_name(PageKind::Orders, &late_table()),
            "orders_late_delivery_orders.csv"
        );
    }

    #[test]
    fn test_table_to_csv_quotes_fields() {
        let csv = String::from_utf8(table_to_csv(&late_table()).unwrap()).unwrap();
        assert_eq!(csv, "order_id,late_days\no1,2\n\"o,2\",5\n");
    }

    #[test]
    fn test_bundle_zip_contains_all_files() {
        let files = vec![
            RenderedFile::new("home.md".to_string(), "# Home"),
            RenderedFile::new("home.json".to_string(), "{}"),
        ];
        let data = bundle_zip(&files).unwrap();

        let archive = zip::ZipArchive::new(std::io::Cursor::new(data)).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        assert_eq!(archive.len(), 2);
        assert!(names.contains(&"home.md"));
        assert!(names.contains(&"home.json"));
    }
}
