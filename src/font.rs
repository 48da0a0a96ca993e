//! Font used for the location text.
//!
//! An optional TrueType/OpenType file is embedded when present; otherwise the
//! built-in Helvetica-Bold is used.

use std::path::Path;

use owned_ttf_parser::Face;
use printpdf::{BuiltinFont, IndirectFontRef, PdfDocumentReference};
use tracing::{info, warn};

use crate::error::AppError;

/// Default font file looked up in the working directory
pub const DEFAULT_FONT_FILE: &str = "Arial-Black.ttf";

/// Helvetica-Bold advance widths for ASCII 32..=126, in 1/1000 em (AFM).
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    333, 333, 584, 584, 584, 611, 975, // ':'..'@'
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    333, 278, 333, 584, 556, 333, // '['..'`'
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, // 'a'..'m'
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, // 'n'..'z'
    389, 280, 389, 584, // '{'..'~'
];

/// Width used for characters outside the AFM table
const HELVETICA_BOLD_FALLBACK_WIDTH: u16 = 611;

#[derive(Debug, Clone, Default)]
pub enum LabelFont {
    /// Built-in Helvetica-Bold
    #[default]
    Builtin,
    /// Embedded font file
    External { name: String, bytes: Vec<u8> },
}

impl LabelFont {
    /// Load a font file, validating that it parses.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| AppError::FontError(format!("{}: {}", path.display(), e)))?;
        Face::parse(&bytes, 0)
            .map_err(|e| AppError::FontError(format!("{}: {}", path.display(), e)))?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(LabelFont::External { name, bytes })
    }

    /// Load the font at `path` if it exists, falling back to Helvetica-Bold.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("Font {} not found, using Helvetica-Bold", path.display());
            return LabelFont::Builtin;
        }

        match LabelFont::load(path) {
            Ok(font) => {
                info!("Font {} registered", path.display());
                font
            }
            Err(e) => {
                warn!("{}; using Helvetica-Bold", e);
                LabelFont::Builtin
            }
        }
    }

    pub fn name(&self) -> &str {
        match self {
            LabelFont::Builtin => "Helvetica-Bold",
            LabelFont::External { name, .. } => name,
        }
    }

    /// Add the font to a document.
    pub fn register(&self, doc: &PdfDocumentReference) -> Result<IndirectFontRef, AppError> {
        match self {
            LabelFont::Builtin => doc
                .add_builtin_font(BuiltinFont::HelveticaBold)
                .map_err(|e| AppError::PdfError(e.to_string())),
            LabelFont::External { bytes, .. } => doc
                .add_external_font(bytes.as_slice())
                .map_err(|e| AppError::FontError(e.to_string())),
        }
    }

    /// Width of `text` at `size_pt`, in points.
    pub fn text_width(&self, text: &str, size_pt: f32) -> f32 {
        match self {
            LabelFont::Builtin => {
                let units: u32 = text.chars().map(|c| helvetica_bold_width(c) as u32).sum();
                units as f32 * size_pt / 1000.0
            }
            LabelFont::External { bytes, .. } => match Face::parse(bytes, 0) {
                Ok(face) => {
                    let scaling = size_pt / face.units_per_em() as f32;
                    text.chars()
                        .map(|c| {
                            face.glyph_index(c)
                                .or_else(|| face.glyph_index('?'))
                                .and_then(|gid| face.glyph_hor_advance(gid))
                                .unwrap_or_default() as f32
                                * scaling
                        })
                        .sum()
                }
                // Validated in `load`
                Err(_) => 0.0,
            },
        }
    }
}

fn helvetica_bold_width(c: char) -> u16 {
    match c as u32 {
        code @ 32..=126 => HELVETICA_BOLD_WIDTHS[(code - 32) as usize],
        _ => HELVETICA_BOLD_FALLBACK_WIDTH,
    }
}
