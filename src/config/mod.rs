pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::domain::ports::{
    MapConfig, OutputFormat, OutputOptions, DEFAULT_ARCHIVE_NAME, DEFAULT_MAX_WORDS,
    DEFAULT_TABLE_ROW_LIMIT,
};
use crate::domain::report::PageKind;
use crate::domain::selection::{DateRange, FilterSelection};
use crate::utils::error::{DashboardError, Result};
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(Parser))]
#[cfg_attr(feature = "cli", command(name = "ecommerce-dashboard"))]
#[cfg_attr(
    feature = "cli",
    command(about = "Brazilian e-commerce dashboard reports from a joined Olist CSV")
)]
pub struct CliConfig {
    #[cfg_attr(feature = "cli", arg(long, default_value = "./data/all_rfm_cust_data.csv"))]
    pub data_file: String,

    /// Start of the purchase date range (YYYY-MM-DD)
    #[cfg_attr(feature = "cli", arg(long))]
    pub start: Option<String>,

    /// End of the purchase date range (YYYY-MM-DD, inclusive)
    #[cfg_attr(feature = "cli", arg(long))]
    pub end: Option<String>,

    #[cfg_attr(feature = "cli", arg(long, default_value = "All"))]
    pub city: String,

    #[cfg_attr(feature = "cli", arg(long, default_value = "All"))]
    pub state: String,

    /// Pages to build, e.g. home,orders (default: all)
    #[cfg_attr(feature = "cli", arg(long, value_delimiter = ','))]
    pub pages: Vec<String>,

    /// Payment methods shown on the payments map (default: all)
    #[cfg_attr(feature = "cli", arg(long, value_delimiter = ','))]
    pub payment_types: Vec<String>,

    /// Customer segments used on the reviews page (default: all)
    #[cfg_attr(feature = "cli", arg(long, value_delimiter = ','))]
    pub segments: Vec<String>,

    #[cfg_attr(feature = "cli", arg(long, default_value = "./output"))]
    pub output_path: String,

    #[cfg_attr(
        feature = "cli",
        arg(long, value_delimiter = ',', default_value = "markdown,json,csv")
    )]
    pub formats: Vec<String>,

    /// Bundle every output file into one ZIP archive
    #[cfg_attr(feature = "cli", arg(long))]
    pub zip: bool,

    /// Print the available filter values and exit
    #[cfg_attr(feature = "cli", arg(long))]
    pub list_filters: bool,

    #[cfg_attr(feature = "cli", arg(long, default_value_t = DEFAULT_TABLE_ROW_LIMIT))]
    pub table_row_limit: usize,

    #[cfg_attr(feature = "cli", arg(long, default_value_t = DEFAULT_MAX_WORDS))]
    pub max_words: usize,

    #[cfg_attr(feature = "cli", arg(long, help = "Enable verbose output"))]
    pub verbose: bool,

    #[cfg_attr(feature = "cli", arg(long, help = "Log CPU and memory usage per phase"))]
    pub monitor: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            data_file: "./data/all_rfm_cust_data.csv".to_string(),
            start: None,
            end: None,
            city: "All".to_string(),
            state: "All".to_string(),
            pages: Vec::new(),
            payment_types: Vec::new(),
            segments: Vec::new(),
            output_path: "./output".to_string(),
            formats: vec!["markdown".to_string(), "json".to_string(), "csv".to_string()],
            zip: false,
            list_filters: false,
            table_row_limit: DEFAULT_TABLE_ROW_LIMIT,
            max_words: DEFAULT_MAX_WORDS,
            verbose: false,
            monitor: false,
        }
    }
}

impl ConfigProvider for CliConfig {
    fn data_file(&self) -> &str {
        &self.data_file
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn selection(&self) -> Result<FilterSelection> {
        build_selection(
            ("start", self.start.as_deref()),
            ("end", self.end.as_deref()),
            &self.city,
            &self.state,
        )
        .map(|selection| {
            selection
                .with_payment_types(self.payment_types.clone())
                .with_customer_segments(self.segments.clone())
        })
    }

    fn pages(&self) -> Result<Vec<PageKind>> {
        PageKind::parse_list(&self.pages)
    }

    fn output_options(&self) -> Result<OutputOptions> {
        Ok(OutputOptions {
            formats: parse_formats(&self.formats)?,
            table_row_limit: self.table_row_limit,
            archive_name: self.zip.then(|| DEFAULT_ARCHIVE_NAME.to_string()),
        })
    }

    fn map_config(&self) -> MapConfig {
        MapConfig::default()
    }

    fn max_words(&self) -> usize {
        self.max_words
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("data_file", &self.data_file)?;
        validation::validate_file_extension("data_file", &self.data_file, &["csv"])?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_output_formats("formats", &self.formats)?;
        validation::validate_positive_number("table_row_limit", self.table_row_limit, 1)?;
        validation::validate_positive_number("max_words", self.max_words, 1)?;
        self.selection()?;
        self.pages()?;
        Ok(())
    }
}

/// 由設定值組出篩選條件；日期區間需要起訖兩端同時提供
pub fn build_selection(
    start: (&str, Option<&str>),
    end: (&str, Option<&str>),
    city: &str,
    state: &str,
) -> Result<FilterSelection> {
    let mut selection = FilterSelection::default().with_city(city).with_state(state);

    match (start.1, end.1) {
        (Some(start_value), Some(end_value)) => {
            let start_date = validation::validate_date(start.0, start_value)?;
            let end_date = validation::validate_date(end.0, end_value)?;
            let range = DateRange::new(start_date, end_date).map_err(|_| {
                DashboardError::ConfigValidationError {
                    field: end.0.to_string(),
                    message: format!(
                        "End date {} is before start date {}",
                        end_date, start_date
                    ),
                }
            })?;
            selection = selection.with_date_range(range);
        }
        (Some(_), None) => {
            return Err(DashboardError::MissingConfigError {
                field: end.0.to_string(),
            })
        }
        (None, Some(_)) => {
            return Err(DashboardError::MissingConfigError {
                field: start.0.to_string(),
            })
        }
        (None, None) => {}
    }

    Ok(selection)
}

pub fn parse_formats(formats: &[String]) -> Result<Vec<OutputFormat>> {
    let mut parsed = Vec::new();
    for format in formats {
        let format: OutputFormat = format.parse()?;
        if !parsed.contains(&format) {
            parsed.push(format);
        }
    }
    Ok(parsed)
}
