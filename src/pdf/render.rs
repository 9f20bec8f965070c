use super::layout::{Align, Colour, DocumentLayout, Item, Weight, PAGE_HEIGHT_MM, PAGE_WIDTH_MM};
use anyhow::anyhow;
use printpdf::path::PaintMode;
use printpdf::*;
use tracing::trace;

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

fn pdf_colour(c: Colour) -> Color {
    Color::Rgb(Rgb::new(
        c.0 as f32 / 255.0,
        c.1 as f32 / 255.0,
        c.2 as f32 / 255.0,
        None,
    ))
}

fn flip(y_top_mm: f32) -> Mm {
    Mm(PAGE_HEIGHT_MM - y_top_mm)
}

fn draw_item(layer: &PdfLayerReference, fonts: &Fonts, item: &Item) {
    match item {
        Item::Text {
            x,
            y,
            size,
            weight,
            colour,
            align,
            text,
        } => {
            let font = match weight {
                Weight::Regular => &fonts.regular,
                Weight::Bold => &fonts.bold,
            };
            let left = match align {
                Align::Left => *x,
                Align::Center => *x - super::layout::text_width_mm(text, *size, *weight) / 2.0,
            };
            layer.set_fill_color(pdf_colour(*colour));
            layer.use_text(text.as_str(), *size, Mm(left), flip(*y), font);
        }
        Item::Rule { x1, y1, x2, y2 } => {
            layer.set_outline_color(pdf_colour(super::layout::BLACK));
            layer.set_outline_thickness(0.5);
            layer.add_line(Line {
                points: vec![
                    (Point::new(Mm(*x1), flip(*y1)), false),
                    (Point::new(Mm(*x2), flip(*y2)), false),
                ],
                is_closed: false,
            });
        }
        Item::Cell { x, y, w, h, fill } => {
            let (llx, lly, urx, ury) = (Mm(*x), flip(*y + *h), Mm(*x + *w), flip(*y));
            if let Some(c) = fill {
                layer.set_fill_color(pdf_colour(*c));
                layer.add_rect(Rect::new(llx, lly, urx, ury).with_mode(PaintMode::Fill));
            }
            layer.set_outline_color(pdf_colour(Colour(80, 80, 80)));
            layer.set_outline_thickness(0.3);
            layer.add_rect(Rect::new(llx, lly, urx, ury).with_mode(PaintMode::Stroke));
        }
    }
}

/// Writes the laid-out pages as an A4 PDF using the built-in Helvetica faces.
pub fn render_pdf(title: &str, layout: &DocumentLayout) -> anyhow::Result<Vec<u8>> {
    if layout.pages.is_empty() {
        return Err(anyhow!("nothing to render"));
    }

    let (doc, first_page, first_layer) =
        PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| anyhow!("failed to load Helvetica: {e:?}"))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| anyhow!("failed to load Helvetica-Bold: {e:?}"))?,
    };

    for (i, page) in layout.pages.iter().enumerate() {
        let (page_idx, layer_idx) = if i == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), format!("Layer {}", i + 1))
        };
        trace!(record = %page.record_id, kind = ?page.kind, page = i + 1, "rendering page");
        let layer = doc.get_page(page_idx).get_layer(layer_idx);
        for item in &page.items {
            draw_item(&layer, &fonts, item);
        }
    }

    doc.save_to_bytes()
        .map_err(|e| anyhow!("failed to serialize pdf: {e:?}"))
}
