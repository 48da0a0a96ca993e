//! Label PDF rendering.

use std::io::{BufWriter, Write};

use ::image::{DynamicImage, GrayImage, RgbImage};
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::arrow::{arrow_outline, ArrowDirection};
use crate::error::AppError;
use crate::font::LabelFont;
use crate::layout::{
    self, arrow_box, label_box, page_count, pt_to_mm, symbol_box, text_baseline, LabelSlot,
    CODE_FONT_SIZE, CUT_GUIDE_DASH_PT, CUT_GUIDE_GAP_PT, CUT_GUIDE_GRAY,
    CUT_GUIDE_THICKNESS_PT, PAGE_HEIGHT_MM, PAGE_WIDTH_MM,
};
use crate::level::LevelIndicator;
use crate::loader::LocationRecord;
use crate::symbol::SymbolEncoder;

const DOCUMENT_TITLE: &str = "Shelf Labels";

/// Plain PDF with no ICC output profile or XMP packet embedded
fn label_conformance() -> PdfConformance {
    PdfConformance::Custom(CustomPdfConformance {
        identifier: "shelf-labels".to_string(),
        allows_default_fonts: true,
        ..Default::default()
    })
}

// ============================================================================
// Summary
// ============================================================================

/// What was drawn for one label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelSummary {
    pub code: String,
    pub page: usize,
    pub slot: usize,
    pub level: LevelIndicator,
    pub symbol: bool,
    pub arrow: bool,
}

/// Outcome of a render run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderSummary {
    pub pages: usize,
    pub labels: Vec<LabelSummary>,
    pub symbol_failures: usize,
}

// ============================================================================
// Renderer
// ============================================================================

pub struct LabelRenderer<'a> {
    font: &'a LabelFont,
    encoder: &'a dyn SymbolEncoder,
    font_size: f32,
    title: String,
}

impl<'a> LabelRenderer<'a> {
    pub fn new(font: &'a LabelFont, encoder: &'a dyn SymbolEncoder) -> Self {
        LabelRenderer {
            font,
            encoder,
            font_size: CODE_FONT_SIZE,
            title: DOCUMENT_TITLE.to_string(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Render every record, two labels per landscape page, and write the
    /// finished PDF to `sink`. A failed symbol only drops that symbol.
    pub fn render<W: Write>(
        &self,
        records: &[LocationRecord],
        sink: W,
    ) -> Result<RenderSummary, AppError> {
        let doc = PdfDocument::empty(self.title.as_str()).with_conformance(label_conformance());
        let font_ref = self.font.register(&doc)?;

        let mut summary = RenderSummary::default();
        let mut current_layer: Option<PdfLayerReference> = None;

        for (index, record) in records.iter().enumerate() {
            let code = record.code.as_str();
            let slot = LabelSlot::for_index(index);
            info!("Processing label {}: {}", index + 1, code);

            let layer = match current_layer.take() {
                Some(layer) if !slot.starts_page() => layer,
                _ => {
                    let (page, layer) =
                        doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
                    summary.pages += 1;
                    doc.get_page(page).get_layer(layer)
                }
            };

            let label = label_box(slot.slot);
            debug!("Label {} at page {} slot {}: {:?}", code, slot.page, slot.slot, label);

            draw_cut_guide(&layer, &label);

            let symbol = match self.encoder.encode(code) {
                Ok(image) => {
                    embed_symbol(&layer, &image, &symbol_box(&label));
                    true
                }
                Err(e) => {
                    warn!("Error generating symbol for {}: {}", code, e);
                    summary.symbol_failures += 1;
                    false
                }
            };

            let level = LevelIndicator::from_code(code);
            let arrow = match ArrowDirection::for_level(level) {
                Some(direction) => {
                    draw_arrow(&layer, direction, &arrow_box(&label));
                    true
                }
                None => false,
            };

            let text_width = pt_to_mm(self.font.text_width(code, self.font_size));
            layer.use_text(
                code,
                self.font_size,
                Mm(label.center_x() - text_width / 2.0),
                Mm(text_baseline(&label, self.font_size)),
                &font_ref,
            );

            summary.labels.push(LabelSummary {
                code: code.to_string(),
                page: slot.page,
                slot: slot.slot,
                level,
                symbol,
                arrow,
            });
            current_layer = Some(layer);
        }

        debug_assert_eq!(summary.pages, page_count(records.len()));

        let mut writer = BufWriter::new(sink);
        doc.save(&mut writer)
            .map_err(|e| AppError::PdfError(e.to_string()))?;
        writer.flush()?;

        Ok(summary)
    }

    /// Render into memory, so nothing is written unless rendering succeeds.
    pub fn render_to_bytes(
        &self,
        records: &[LocationRecord],
    ) -> Result<(Vec<u8>, RenderSummary), AppError> {
        let mut bytes = Vec::new();
        let summary = self.render(records, &mut bytes)?;
        Ok((bytes, summary))
    }
}

// ============================================================================
// Drawing
// ============================================================================

/// Dashed, unfilled rectangle on the label outline to guide cutting.
fn draw_cut_guide(layer: &PdfLayerReference, rect: &layout::Rect) {
    layer.save_graphics_state();
    layer.set_line_dash_pattern(LineDashPattern {
        dash_1: Some(CUT_GUIDE_DASH_PT),
        gap_1: Some(CUT_GUIDE_GAP_PT),
        ..Default::default()
    });
    layer.set_outline_thickness(CUT_GUIDE_THICKNESS_PT);
    layer.set_outline_color(Color::Rgb(Rgb::new(
        CUT_GUIDE_GRAY,
        CUT_GUIDE_GRAY,
        CUT_GUIDE_GRAY,
        None,
    )));

    let corners = [
        (rect.x, rect.y),
        (rect.right(), rect.y),
        (rect.right(), rect.top()),
        (rect.x, rect.top()),
    ];
    let line = Line {
        points: corners
            .iter()
            .map(|&(x, y)| (Point::new(Mm(x), Mm(y)), false))
            .collect(),
        is_closed: true,
    };
    layer.add_line(line);
    layer.restore_graphics_state();
}

/// Filled black arrow scaled into `rect`.
fn draw_arrow(layer: &PdfLayerReference, direction: ArrowDirection, rect: &layout::Rect) {
    // Outline y grows downwards, PDF y grows upwards
    let ring = arrow_outline(direction)
        .iter()
        .map(|&(ux, uy)| {
            let x = rect.x + ux * rect.width;
            let y = rect.top() - uy * rect.height;
            (Point::new(Mm(x), Mm(y)), false)
        })
        .collect();

    layer.save_graphics_state();
    layer.set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
    layer.add_polygon(Polygon {
        rings: vec![ring],
        mode: PaintMode::Fill,
        winding_order: WindingOrder::NonZero,
    });
    layer.restore_graphics_state();
}

/// Place a symbol so its width spans `rect`, anchored at its lower-left.
/// Interpolation stays off so modules keep hard edges.
fn embed_symbol(layer: &PdfLayerReference, symbol: &GrayImage, rect: &layout::Rect) {
    let rgb_image: RgbImage = DynamicImage::ImageLuma8(symbol.clone()).to_rgb8();
    let (width, height) = rgb_image.dimensions();

    let image = Image::from(ImageXObject {
        width: Px(width as usize),
        height: Px(height as usize),
        color_space: ColorSpace::Rgb,
        bits_per_component: ColorBits::Bit8,
        interpolate: false,
        image_data: rgb_image.into_raw(),
        image_filter: None,
        clipping_bbox: None,
        smask: None,
    });

    // DPI = pixels / (mm / 25.4)
    let dpi = (width as f32) / (rect.width / 25.4);

    image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(rect.x)),
            translate_y: Some(Mm(rect.y)),
            dpi: Some(dpi),
            ..Default::default()
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::Symbology;

    #[test]
    fn test_render_writes_pdf() {
        let font = LabelFont::Builtin;
        let renderer = LabelRenderer::new(&font, &Symbology::DataMatrix);
        let records = vec![LocationRecord::new("A011-05")];
        let (bytes, summary) = renderer.render_to_bytes(&records).unwrap();

        assert!(bytes.starts_with(b"%PDF"));
        assert_eq!(summary.pages, 1);
        assert_eq!(summary.labels[0].level, LevelIndicator::Down);
        assert!(summary.labels[0].symbol);
        assert!(summary.labels[0].arrow);
    }

    #[test]
    fn test_no_output_profile_is_embedded() {
        let font = LabelFont::Builtin;
        let renderer = LabelRenderer::new(&font, &Symbology::DataMatrix);
        let (bytes, _) = renderer.render_to_bytes(&[]).unwrap();

        let text = String::from_utf8_lossy(&bytes);
        assert!(!text.contains("OutputIntents"));
        assert!(bytes.len() < 20 * 1024, "empty document is {} bytes", bytes.len());
    }
}
