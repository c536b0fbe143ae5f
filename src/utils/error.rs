use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Dataset is empty or has not been loaded")]
    DataNotLoaded,

    #[error("Unknown dashboard page: {name}")]
    UnknownPage { name: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Data,
    Storage,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DashboardError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DashboardError::ConfigError { .. }
            | DashboardError::ConfigValidationError { .. }
            | DashboardError::InvalidConfigValueError { .. }
            | DashboardError::MissingConfigError { .. }
            | DashboardError::UnknownPage { .. } => ErrorCategory::Configuration,
            DashboardError::CsvError(_)
            | DashboardError::DataNotLoaded
            | DashboardError::ValidationError { .. } => ErrorCategory::Data,
            DashboardError::IoError(_) | DashboardError::ZipError(_) => ErrorCategory::Storage,
            DashboardError::SerializationError(_) | DashboardError::ProcessingError { .. } => {
                ErrorCategory::Processing
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            DashboardError::ValidationError { .. } => ErrorSeverity::Medium,
            DashboardError::IoError(_) | DashboardError::ZipError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the command line arguments or the TOML configuration file"
            }
            ErrorCategory::Data => {
                "Make sure the data file exists, is a CSV with the expected columns, and is not empty"
            }
            ErrorCategory::Storage => "Check file permissions and available disk space",
            ErrorCategory::Processing => "Re-run with --verbose to see which page failed",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            DashboardError::DataNotLoaded => {
                "No data loaded. Load the dataset before rendering dashboard pages.".to_string()
            }
            DashboardError::CsvError(e) => format!("Could not read the dataset: {}", e),
            DashboardError::UnknownPage { name } => format!(
                "'{}' is not a dashboard page (expected one of: home, orders, customers, sellers, products, payments, reviews)",
                name
            ),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_and_severity() {
        let err = DashboardError::MissingConfigError {
            field: "source.data_file".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);

        let err = DashboardError::IoError(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert_eq!(err.category(), ErrorCategory::Storage);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_user_friendly_message_for_unknown_page() {
        let err = DashboardError::UnknownPage {
            name: "inventory".to_string(),
        };
        assert!(err.user_friendly_message().contains("inventory"));
        assert!(err.user_friendly_message().contains("reviews"));
    }
}
