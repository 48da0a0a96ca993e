//! 2D symbol generation for label codes.

use ::image::{GrayImage, Luma};
use datamatrix::{DataMatrix, SymbolList};
use qrcode::QrCode;
use serde::Serialize;

use crate::error::AppError;

/// Pixels per symbol module. The image is placed without interpolation, so
/// modules stay sharp at any print size.
const MODULE_PX: u32 = 4;

/// Quiet zone around a Data Matrix symbol, in modules
const DATAMATRIX_QUIET_ZONE: u32 = 2;

/// Anything that can turn a location code into a scannable symbol image.
pub trait SymbolEncoder: Send + Sync {
    fn encode(&self, text: &str) -> Result<GrayImage, AppError>;
}

/// Supported symbologies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Symbology {
    /// ECC200 Data Matrix
    #[default]
    #[value(name = "datamatrix")]
    #[serde(rename = "datamatrix")]
    DataMatrix,
    /// QR code
    Qr,
}

impl SymbolEncoder for Symbology {
    fn encode(&self, text: &str) -> Result<GrayImage, AppError> {
        match self {
            Symbology::DataMatrix => encode_datamatrix(text),
            Symbology::Qr => encode_qr(text),
        }
    }
}

fn encode_datamatrix(text: &str) -> Result<GrayImage, AppError> {
    let code = DataMatrix::encode(text.as_bytes(), SymbolList::default().enforce_square())
        .map_err(|e| AppError::SymbolError(format!("{}: {:?}", text, e)))?;
    let bitmap = code.bitmap();

    let modules = bitmap.width() as u32 + 2 * DATAMATRIX_QUIET_ZONE;
    let mut image = GrayImage::from_pixel(modules * MODULE_PX, modules * MODULE_PX, Luma([255]));

    for (x, y) in bitmap.pixels() {
        let left = (x as u32 + DATAMATRIX_QUIET_ZONE) * MODULE_PX;
        let top = (y as u32 + DATAMATRIX_QUIET_ZONE) * MODULE_PX;
        for dy in 0..MODULE_PX {
            for dx in 0..MODULE_PX {
                image.put_pixel(left + dx, top + dy, Luma([0]));
            }
        }
    }

    Ok(image)
}

fn encode_qr(text: &str) -> Result<GrayImage, AppError> {
    let code = QrCode::new(text.as_bytes())
        .map_err(|e| AppError::SymbolError(format!("{}: {}", text, e)))?;

    Ok(code
        .render::<Luma<u8>>()
        .quiet_zone(true)
        .module_dimensions(MODULE_PX, MODULE_PX)
        .build())
}
