use thiserror::Error;

#[derive(Error, Debug)]
pub enum RankError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Spreadsheet error: {0}")]
    SpreadsheetError(#[from] umya_spreadsheet::XlsxError),

    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("Search API returned HTTP {status}")]
    HttpStatusError { status: u16 },

    #[error("Sheet '{sheet}' not found")]
    SheetNotFound { sheet: String },

    #[error("Column '{label}' not found")]
    ColumnNotFound { label: String },

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

    #[error("Missing required configuration '{field}'")]
    MissingConfigError { field: String },
}

/// 錯誤分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Network,
    Spreadsheet,
    System,
}

/// 錯誤嚴重程度，決定 CLI 退出碼
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl RankError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            RankError::ConfigError { .. }
            | RankError::ConfigValidationError { .. }
            | RankError::InvalidConfigValueError { .. }
            | RankError::MissingConfigError { .. } => ErrorCategory::Configuration,
            RankError::SheetNotFound { .. } | RankError::ColumnNotFound { .. } => {
                ErrorCategory::Input
            }
            RankError::HttpError(_)
            | RankError::HttpStatusError { .. }
            | RankError::UrlParseError(_) => ErrorCategory::Network,
            RankError::SpreadsheetError(_) => ErrorCategory::Spreadsheet,
            RankError::IoError(_) | RankError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration | ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Spreadsheet => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            RankError::SheetNotFound { sheet } => {
                format!("Check that the workbook contains a sheet named '{}'", sheet)
            }
            RankError::ColumnNotFound { label } => format!(
                "Add a header cell containing '{}' to the header row or the row below it",
                label
            ),
            RankError::MissingConfigError { field } => {
                format!("Set '{}' in the configuration file", field)
            }
            RankError::HttpStatusError { .. } => {
                "Verify the SerpAPI key and remaining search credits".to_string()
            }
            RankError::HttpError(_) => "Check network connectivity and search.base_url".to_string(),
            RankError::SpreadsheetError(_) => {
                "Make sure the file is a valid .xlsx workbook and is not open in another program"
                    .to_string()
            }
            _ => match self.category() {
                ErrorCategory::Configuration => {
                    "Review the TOML configuration file and command-line overrides".to_string()
                }
                _ => "Re-run with --verbose for more details".to_string(),
            },
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Input => format!("Workbook layout problem: {}", self),
            ErrorCategory::Network => format!("Search request failed: {}", self),
            ErrorCategory::Spreadsheet => format!("Could not read or save the workbook: {}", self),
            ErrorCategory::System => format!("Unexpected system error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, RankError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_exit_with_one() {
        let err = RankError::MissingConfigError {
            field: "target.domain".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity().exit_code(), 1);
        assert!(err.recovery_suggestion().contains("target.domain"));
    }

    #[test]
    fn test_column_not_found_is_input_error() {
        let err = RankError::ColumnNotFound {
            label: "Google Places".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Input);
        assert!(err.user_friendly_message().contains("Google Places"));
    }
}
