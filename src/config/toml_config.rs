use crate::config::{build_selection, parse_formats};
use crate::core::ConfigProvider;
use crate::domain::ports::{
    MapConfig, OutputOptions, DEFAULT_ARCHIVE_NAME, DEFAULT_FEATURE_ID_KEY, DEFAULT_GEOJSON_URL,
    DEFAULT_MAX_WORDS, DEFAULT_TABLE_ROW_LIMIT,
};
use crate::domain::report::PageKind;
use crate::domain::selection::{FilterSelection, ALL_OPTION};
use crate::utils::error::{DashboardError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub dashboard: DashboardConfig,
    pub source: SourceConfig,
    #[serde(default)]
    pub filters: FiltersConfig,
    #[serde(default)]
    pub pages: PagesConfig,
    #[serde(default)]
    pub map: Option<MapSection>,
    #[serde(default)]
    pub wordcloud: Option<WordCloudConfig>,
    pub output: OutputConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub data_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiltersConfig {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default = "default_location")]
    pub city: String,
    #[serde(default = "default_location")]
    pub state: String,
    pub payment_types: Option<Vec<String>>,
    pub customer_segments: Option<Vec<String>>,
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            start_date: None,
            end_date: None,
            city: default_location(),
            state: default_location(),
            payment_types: None,
            customer_segments: None,
        }
    }
}

fn default_location() -> String {
    ALL_OPTION.to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PagesConfig {
    pub include: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapSection {
    pub geojson_url: Option<String>,
    pub feature_id_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordCloudConfig {
    pub max_words: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub output_path: String,
    pub formats: Vec<String>,
    pub table_row_limit: Option<usize>,
    pub compression: Option<CompressionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DashboardError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| DashboardError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR
            .get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("static env var pattern is valid"));

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("dashboard.name", &self.dashboard.name)?;

        // 驗證資料檔
        validation::validate_non_empty_string("source.data_file", &self.source.data_file)?;
        validation::validate_file_extension("source.data_file", &self.source.data_file, &["csv"])?;

        // 驗證篩選條件與頁面
        self.selection()?;
        self.pages()?;

        // 驗證地圖來源
        if let Some(map) = &self.map {
            if let Some(url) = &map.geojson_url {
                validation::validate_url("map.geojson_url", url)?;
            }
            if let Some(key) = &map.feature_id_key {
                validation::validate_non_empty_string("map.feature_id_key", key)?;
            }
        }

        if let Some(max_words) = self.wordcloud.as_ref().and_then(|w| w.max_words) {
            validation::validate_positive_number("wordcloud.max_words", max_words, 1)?;
        }

        // 驗證輸出
        validation::validate_path("output.output_path", &self.output.output_path)?;
        validation::validate_output_formats("output.formats", &self.output.formats)?;
        if let Some(limit) = self.output.table_row_limit {
            validation::validate_positive_number("output.table_row_limit", limit, 1)?;
        }
        if let Some(name) = self.archive_name() {
            validation::validate_file_extension("output.compression.filename", &name, &["zip"])?;
        }

        Ok(())
    }

    /// 取得監控設定
    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    /// 啟用壓縮時的 ZIP 檔名
    pub fn archive_name(&self) -> Option<String> {
        self.output
            .compression
            .as_ref()
            .filter(|c| c.enabled)
            .map(|c| {
                c.filename
                    .clone()
                    .unwrap_or_else(|| DEFAULT_ARCHIVE_NAME.to_string())
            })
    }
}

impl ConfigProvider for TomlConfig {
    fn data_file(&self) -> &str {
        &self.source.data_file
    }

    fn output_path(&self) -> &str {
        &self.output.output_path
    }

    fn selection(&self) -> Result<FilterSelection> {
        let filters = &self.filters;
        let selection = build_selection(
            ("filters.start_date", filters.start_date.as_deref()),
            ("filters.end_date", filters.end_date.as_deref()),
            &filters.city,
            &filters.state,
        )?;

        Ok(selection
            .with_payment_types(filters.payment_types.clone().unwrap_or_default())
            .with_customer_segments(filters.customer_segments.clone().unwrap_or_default()))
    }

    fn pages(&self) -> Result<Vec<PageKind>> {
        match &self.pages.include {
            Some(include) => PageKind::parse_list(include),
            None => Ok(PageKind::ALL.to_vec()),
        }
    }

    fn output_options(&self) -> Result<OutputOptions> {
        Ok(OutputOptions {
            formats: parse_formats(&self.output.formats)?,
            table_row_limit: self.output.table_row_limit.unwrap_or(DEFAULT_TABLE_ROW_LIMIT),
            archive_name: self.archive_name(),
        })
    }

    fn map_config(&self) -> MapConfig {
        let map = self.map.as_ref();
        MapConfig {
            geojson_url: map
                .and_then(|m| m.geojson_url.clone())
                .unwrap_or_else(|| DEFAULT_GEOJSON_URL.to_string()),
            feature_id_key: map
                .and_then(|m| m.feature_id_key.clone())
                .unwrap_or_else(|| DEFAULT_FEATURE_ID_KEY.to_string()),
        }
    }

    fn max_words(&self) -> usize {
        self.wordcloud
            .as_ref()
            .and_then(|w| w.max_words)
            .unwrap_or(DEFAULT_MAX_WORDS)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
