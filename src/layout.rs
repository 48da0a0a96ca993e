//! Page geometry and slot assignment.
//!
//! All distances are in millimetres with the origin at the bottom-left corner
//! of the page, matching PDF user space.

use serde::Serialize;

// ============================================================================
// Constants
// ============================================================================

/// A4 landscape dimensions in mm
pub const PAGE_WIDTH_MM: f32 = 297.0;
pub const PAGE_HEIGHT_MM: f32 = 210.0;

/// Label bounding box
pub const LABEL_WIDTH_MM: f32 = 260.0;
pub const LABEL_HEIGHT_MM: f32 = 80.0;

/// Gap between the page top and the first label
pub const TOP_GAP_MM: f32 = 20.0;
/// Extra gap between the first and second label
pub const SLOT_GAP_MM: f32 = 20.0;

pub const LABELS_PER_PAGE: usize = 2;

/// Data Matrix / QR symbol size
pub const SYMBOL_SIZE_MM: f32 = 60.0;

/// Arrow square and its inset from the label's right edge
pub const ARROW_SIZE_MM: f32 = 50.0;
pub const ARROW_INSET_MM: f32 = 10.0;

/// Location text size in points
pub const CODE_FONT_SIZE: f32 = 80.0;
/// Baseline drop below the label centre, as a fraction of the font size
pub const TEXT_CENTER_FACTOR: f32 = 0.35;

/// Cut guide stroke
pub const CUT_GUIDE_DASH_PT: i64 = 4;
pub const CUT_GUIDE_GAP_PT: i64 = 4;
pub const CUT_GUIDE_THICKNESS_PT: f32 = 1.0;
pub const CUT_GUIDE_GRAY: f32 = 0.6;

const MM_PER_PT: f32 = 25.4 / 72.0;

pub fn pt_to_mm(pt: f32) -> f32 {
    pt * MM_PER_PT
}

// ============================================================================
// Slots
// ============================================================================

/// Position of a label in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LabelSlot {
    pub page: usize,
    pub slot: usize,
}

impl LabelSlot {
    /// Slot for the record at 0-based position `index` in the input.
    pub fn for_index(index: usize) -> Self {
        LabelSlot {
            page: index / LABELS_PER_PAGE,
            slot: index % LABELS_PER_PAGE,
        }
    }

    /// Whether drawing this label requires a fresh page.
    pub fn starts_page(&self) -> bool {
        self.slot == 0
    }
}

/// Number of pages needed for `labels` labels.
pub fn page_count(labels: usize) -> usize {
    labels.div_ceil(LABELS_PER_PAGE)
}

// ============================================================================
// Geometry
// ============================================================================

/// Axis-aligned rectangle in mm, anchored at its lower-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y + self.height
    }
}

/// Bounding box of the label drawn in `slot` (0 = top, 1 = bottom).
pub fn label_box(slot: usize) -> Rect {
    let x = (PAGE_WIDTH_MM - LABEL_WIDTH_MM) / 2.0;
    let stacked = LABEL_HEIGHT_MM * (slot + 1) as f32;
    let gap = TOP_GAP_MM + SLOT_GAP_MM * slot as f32;
    Rect {
        x,
        y: PAGE_HEIGHT_MM - stacked - gap,
        width: LABEL_WIDTH_MM,
        height: LABEL_HEIGHT_MM,
    }
}

/// Symbol square: left edge of the label, vertically centred.
pub fn symbol_box(label: &Rect) -> Rect {
    Rect {
        x: label.x,
        y: label.center_y() - SYMBOL_SIZE_MM / 2.0,
        width: SYMBOL_SIZE_MM,
        height: SYMBOL_SIZE_MM,
    }
}

/// Arrow square: inset from the right edge, vertically centred.
pub fn arrow_box(label: &Rect) -> Rect {
    Rect {
        x: label.right() - ARROW_SIZE_MM - ARROW_INSET_MM,
        y: label.center_y() - ARROW_SIZE_MM / 2.0,
        width: ARROW_SIZE_MM,
        height: ARROW_SIZE_MM,
    }
}

/// Baseline for the location text. The fixed drop of 0.35 × font size gives
/// the same visual centring as the reference labels.
pub fn text_baseline(label: &Rect, font_size_pt: f32) -> f32 {
    label.center_y() - pt_to_mm(font_size_pt * TEXT_CENTER_FACTOR)
}
