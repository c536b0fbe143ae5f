use std::sync::Arc;

use crate::core::dataset::Dataset;
use crate::core::session::DashboardSession;
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::model::DashboardOutput;
use crate::report::{bundle_zip, render_outputs};
use crate::utils::error::{DashboardError, Result};

pub struct DashboardPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> DashboardPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    pub fn config(&self) -> &C {
        &self.config
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for DashboardPipeline<S, C> {
    async fn extract(&self) -> Result<Dataset> {
        let data_file = self.config.data_file();
        tracing::debug!("Reading dataset from: {}", data_file);

        let data = self.storage.read_file(data_file).await?;
        tracing::debug!("Read {} bytes", data.len());

        let dataset = Dataset::from_csv_bytes(&data)?;
        if dataset.is_empty() {
            tracing::warn!("⚠️ Dataset '{}' has no rows", data_file);
            return Err(DashboardError::DataNotLoaded);
        }

        Ok(dataset)
    }

    async fn transform(&self, dataset: Dataset) -> Result<DashboardOutput> {
        let selection = self.config.selection()?;
        let pages = self.config.pages()?;

        let mut session = DashboardSession::new(Arc::new(dataset))
            .with_map(self.config.map_config())
            .with_max_words(self.config.max_words());
        session.update_selection(selection);

        tracing::debug!(
            "Building {} pages: {}",
            pages.len(),
            pages
                .iter()
                .map(|p| p.slug())
                .collect::<Vec<_>>()
                .join(", ")
        );

        session.render_all(&pages)
    }

    async fn load(&self, output: DashboardOutput) -> Result<String> {
        let options = self.config.output_options()?;
        let files = render_outputs(&output, &options)?;

        match &options.archive_name {
            Some(archive_name) => {
                tracing::debug!("Creating ZIP file with {} files", files.len());
                let zip_data = bundle_zip(&files)?;

                tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
                self.storage.write_file(archive_name, &zip_data).await?;

                Ok(format!("{}/{}", self.config.output_path(), archive_name))
            }
            None => {
                for file in &files {
                    tracing::debug!("Writing {} ({} bytes)", file.path, file.data.len());
                    self.storage.write_file(&file.path, &file.data).await?;
                }

                Ok(self.config.output_path().to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MapConfig, OutputFormat, OutputOptions, DEFAULT_MAX_WORDS};
    use crate::domain::report::PageKind;
    use crate::domain::selection::FilterSelection;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    const CSV: &str = "\
order_id,customer_unique_id,customer_city,customer_state,order_purchase_timestamp,order_status,payment_value,review_score
o1,c1,sao paulo,SP,2018-01-05 10:00:00,delivered,100.0,5
o2,c2,rio de janeiro,RJ,2018-01-20 12:30:00,canceled,50.0,1
o3,c1,sao paulo,SP,2018-02-02 08:00:00,delivered,30.0,4
";

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn with_file(path: &str, data: &[u8]) -> Self {
            let mut files = HashMap::new();
            files.insert(path.to_string(), data.to_vec());
            Self {
                files: Arc::new(Mutex::new(files)),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                DashboardError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        selection: FilterSelection,
        pages: Vec<PageKind>,
        options: OutputOptions,
    }

    impl MockConfig {
        fn new() -> Self {
            Self {
                selection: FilterSelection::default(),
                pages: vec![PageKind::Home, PageKind::Orders],
                options: OutputOptions::default(),
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn data_file(&self) -> &str {
            "orders.csv"
        }

        fn output_path(&self) -> &str {
            "test_output"
        }

        fn selection(&self) -> Result<FilterSelection> {
            Ok(self.selection.clone())
        }

        fn pages(&self) -> Result<Vec<PageKind>> {
            Ok(self.pages.clone())
        }

        fn output_options(&self) -> Result<OutputOptions> {
            Ok(self.options.clone())
        }

        fn map_config(&self) -> MapConfig {
            MapConfig::default()
        }

        fn max_words(&self) -> usize {
            DEFAULT_MAX_WORDS
        }
    }

    #[tokio::test]
    async fn test_extract_reads_csv_through_storage() {
        let storage = MockStorage::with_file("orders.csv", CSV.as_bytes());
        let pipeline = DashboardPipeline::new(storage, MockConfig::new());

        let dataset = pipeline.extract().await.unwrap();
        assert_eq!(dataset.len(), 3);
    }

    #[tokio::test]
    async fn test_extract_missing_file_is_io_error() {
        let storage = MockStorage::with_file("other.csv", CSV.as_bytes());
        let pipeline = DashboardPipeline::new(storage, MockConfig::new());

        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, DashboardError::IoError(_)));
    }

    #[tokio::test]
    async fn test_extract_header_only_csv_is_not_loaded() {
        let header = CSV.lines().next().unwrap();
        let storage = MockStorage::with_file("orders.csv", header.as_bytes());
        let pipeline = DashboardPipeline::new(storage, MockConfig::new());

        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, DashboardError::DataNotLoaded));
    }

    #[tokio::test]
    async fn test_transform_builds_configured_pages_for_selection() {
        let storage = MockStorage::with_file("orders.csv", CSV.as_bytes());
        let mut config = MockConfig::new();
        config.selection = FilterSelection::default().with_state("SP");
        let pipeline = DashboardPipeline::new(storage, config);

        let dataset = pipeline.extract().await.unwrap();
        let output = pipeline.transform(dataset).await.unwrap();

        assert_eq!(output.pages.len(), 2);
        assert_eq!(output.pages[0].page, PageKind::Home);
        assert_eq!(output.selection.rows_in_date_range, 3);
        assert_eq!(output.selection.rows_selected, 2);
        assert_eq!(
            output.pages[0].metric("Total Orders").unwrap().raw,
            Some(2.0)
        );
    }

    #[tokio::test]
    async fn test_load_writes_individual_files() {
        let storage = MockStorage::with_file("orders.csv", CSV.as_bytes());
        let mut config = MockConfig::new();
        config.options.formats = vec![OutputFormat::Markdown];
        let pipeline = DashboardPipeline::new(storage.clone(), config);

        let dataset = pipeline.extract().await.unwrap();
        let output = pipeline.transform(dataset).await.unwrap();
        let path = pipeline.load(output).await.unwrap();

        assert_eq!(path, "test_output");
        assert!(storage.get_file("index.md").await.is_some());
        assert!(storage.get_file("home.md").await.is_some());
        assert!(storage.get_file("orders.md").await.is_some());
        assert!(storage.get_file("home.json").await.is_none());
    }

    #[tokio::test]
    async fn test_load_bundles_zip_when_archive_configured() {
        let storage = MockStorage::with_file("orders.csv", CSV.as_bytes());
        let mut config = MockConfig::new();
        config.options.archive_name = Some("report.zip".to_string());
        let pipeline = DashboardPipeline::new(storage.clone(), config);

        let dataset = pipeline.extract().await.unwrap();
        let output = pipeline.transform(dataset).await.unwrap();
        let path = pipeline.load(output).await.unwrap();

        assert_eq!(path, "test_output/report.zip");
        assert!(storage.get_file("home.md").await.is_none());

        let zip_data = storage.get_file("report.zip").await.unwrap();
        let archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        assert!(names.contains(&"home.json"));
        assert!(names.contains(&"selection.json"));
        assert!(names.contains(&"orders_late_delivery_orders.csv"));
    }
}
