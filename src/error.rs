use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Input file not found: {0}")]
    InputNotFound(String),
    #[error("Failed to read workbook: {0}")]
    WorkbookError(String),
    #[error("Required column '{0}' not found in the spreadsheet")]
    MissingColumn(String),
    #[error("Failed to generate symbol: {0}")]
    SymbolError(String),
    #[error("Failed to load font: {0}")]
    FontError(String),
    #[error("Failed to create PDF: {0}")]
    PdfError(String),
    #[error("Server error: {0}")]
    ServerError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AppError {
    /// Input errors abort the run before any output exists.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            AppError::InputNotFound(_) | AppError::WorkbookError(_) | AppError::MissingColumn(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_column_names_the_column() {
        let err = AppError::MissingColumn("Ubicaciones".to_string());
        assert!(err.to_string().contains("'Ubicaciones'"));
        assert!(err.is_input_error());
    }

    #[test]
    fn test_symbol_error_is_not_input_error() {
        assert!(!AppError::SymbolError("too long".to_string()).is_input_error());
    }
}
