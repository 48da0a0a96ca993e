//! shelf-labels: printable warehouse shelf labels from a spreadsheet of
//! location codes.
//!
//! Each label carries a 2D symbol encoding the code, the code itself in large
//! bold type, and an arrow for the shelf level. Labels are laid out two per
//! A4 landscape page with a dashed cut guide around each one.

pub mod arrow;
pub mod config;
pub mod error;
pub mod font;
pub mod layout;
pub mod level;
pub mod loader;
pub mod render;
pub mod server;
pub mod symbol;

pub use config::LabelConfig;
pub use error::AppError;
pub use font::LabelFont;
pub use layout::LabelSlot;
pub use level::LevelIndicator;
pub use loader::{
    load_locations, load_locations_from_bytes, load_table_from_bytes, LocationRecord, SheetTable,
    REQUIRED_COLUMN,
};
pub use render::{LabelRenderer, LabelSummary, RenderSummary};
pub use symbol::{SymbolEncoder, Symbology};
