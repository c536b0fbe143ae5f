use crate::core::dataset::Dataset;
use crate::domain::model::DashboardOutput;
use crate::domain::report::PageKind;
use crate::domain::selection::FilterSelection;
use crate::utils::error::{DashboardError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const DEFAULT_GEOJSON_URL: &str = "https://raw.githubusercontent.com/codeforamerica/click_that_hood/master/public/data/brazil-states.geojson";
pub const DEFAULT_FEATURE_ID_KEY: &str = "properties.sigla";
pub const DEFAULT_MAX_WORDS: usize = 100;
pub const DEFAULT_TABLE_ROW_LIMIT: usize = 50;
pub const DEFAULT_ARCHIVE_NAME: &str = "dashboard_report.zip";

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Markdown,
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(DashboardError::InvalidConfigValueError {
                field: "output.formats".to_string(),
                value: other.to_string(),
                reason: "Unsupported format. Valid formats: markdown, json, csv".to_string(),
            }),
        }
    }
}

/// 地圖圖表使用的 GeoJSON 來源
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    pub geojson_url: String,
    pub feature_id_key: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            geojson_url: DEFAULT_GEOJSON_URL.to_string(),
            feature_id_key: DEFAULT_FEATURE_ID_KEY.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputOptions {
    pub formats: Vec<OutputFormat>,
    pub table_row_limit: usize,
    /// 設定時把所有輸出打包成這個 ZIP 檔
    pub archive_name: Option<String>,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            formats: vec![OutputFormat::Markdown, OutputFormat::Json, OutputFormat::Csv],
            table_row_limit: DEFAULT_TABLE_ROW_LIMIT,
            archive_name: None,
        }
    }
}

pub trait ConfigProvider: Send + Sync {
    fn data_file(&self) -> &str;
    fn output_path(&self) -> &str;
    fn selection(&self) -> Result<FilterSelection>;
    fn pages(&self) -> Result<Vec<PageKind>>;
    fn output_options(&self) -> Result<OutputOptions>;
    fn map_config(&self) -> MapConfig;
    fn max_words(&self) -> usize;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Dataset>;
    async fn transform(&self, dataset: Dataset) -> Result<DashboardOutput>;
    async fn load(&self, output: DashboardOutput) -> Result<String>;
}
