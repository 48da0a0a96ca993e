//! Resolved run configuration.

use std::path::PathBuf;

use crate::font::DEFAULT_FONT_FILE;
use crate::symbol::Symbology;

/// Workbook read when no input is given
pub const DEFAULT_INPUT_FILE: &str = "ubicaciones.xlsx";
/// PDF written when no output is given
pub const DEFAULT_OUTPUT_FILE: &str = "etiquetas_con_guia_corte.pdf";
/// File name offered for download in interactive mode
pub const DOWNLOAD_FILE_NAME: &str = "etiquetas_ubicacion.pdf";
/// Interactive mode bind address
pub const DEFAULT_SERVER_ADDR: &str = "127.0.0.1:8501";

/// Label generation configuration
#[derive(Debug, Clone)]
pub struct LabelConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub font: PathBuf,
    pub sheet: Option<String>,
    pub symbology: Symbology,
}

impl Default for LabelConfig {
    fn default() -> Self {
        LabelConfig {
            input: PathBuf::from(DEFAULT_INPUT_FILE),
            output: PathBuf::from(DEFAULT_OUTPUT_FILE),
            font: PathBuf::from(DEFAULT_FONT_FILE),
            sheet: None,
            symbology: Symbology::DataMatrix,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_script_mode() {
        let config = LabelConfig::default();
        assert_eq!(config.input, PathBuf::from("ubicaciones.xlsx"));
        assert_eq!(config.output, PathBuf::from("etiquetas_con_guia_corte.pdf"));
        assert_eq!(config.font, PathBuf::from("Arial-Black.ttf"));
        assert!(config.sheet.is_none());
        assert_eq!(config.symbology, Symbology::DataMatrix);
    }
}
