mod canvas;
mod image;
mod layout;
mod table;

pub use canvas::{DrawOp, Frame, Page, Rgb, TextAlign, TextOp};
pub use layout::{TextLine, justify_spacing, wrap_text};
pub use table::ColumnLayout;

use std::time::Instant;

use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, Str};

use crate::assets::DecodedImage;
use crate::config::PageGeometry;
use crate::error::Error;
use crate::fonts::{self, to_winansi_bytes};

pub const PT_PER_MM: f32 = 72.0 / 25.4;
pub const MM_PER_PT: f32 = 25.4 / 72.0;

/// Serialize laid-out pages. `images` is the store the pages' image
/// operations index into. An image that fails to embed is left out with a
/// warning; the rest of the document is still written.
pub fn write_pdf(
    pages: &[Page],
    images: &[DecodedImage],
    geometry: &PageGeometry,
) -> Result<Vec<u8>, Error> {
    if pages.is_empty() {
        return Err(Error::Backend("document has no pages".to_string()));
    }
    let t0 = Instant::now();
    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };

    let catalog_id = alloc();
    let pages_id = alloc();

    let font_refs = fonts::register_fonts(&mut pdf, &mut alloc);

    let mut image_xobjects: Vec<Option<(String, Ref)>> = Vec::with_capacity(images.len());
    for (i, img) in images.iter().enumerate() {
        match image::embed_image(&mut pdf, &mut alloc, img) {
            Ok(xobj_ref) => image_xobjects.push(Some((format!("Im{}", i + 1), xobj_ref))),
            Err(e) => {
                log::warn!("Leaving out image {i}: {e}");
                image_xobjects.push(None);
            }
        }
    }
    let t_images = t0.elapsed();

    let page_w = geometry.width * PT_PER_MM;
    let page_h = geometry.height * PT_PER_MM;
    let n = pages.len();
    let page_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();
    let content_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();

    for (i, page) in pages.iter().enumerate() {
        let raw = page_content(page, page_h, &image_xobjects).finish();
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
        pdf.stream(content_ids[i], &compressed)
            .filter(Filter::FlateDecode);
    }
    let t_content = t0.elapsed();

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(n as i32);

    for i in 0..n {
        let mut page = pdf.page(page_ids[i]);
        page.media_box(Rect::new(0.0, 0.0, page_w, page_h))
            .parent(pages_id)
            .contents(content_ids[i]);
        let mut resources = page.resources();
        {
            let mut fonts = resources.fonts();
            for (style, font_ref) in &font_refs {
                fonts.pair(Name(style.resource_name()), *font_ref);
            }
        }
        if image_xobjects.iter().any(Option::is_some) {
            let mut xobjects = resources.x_objects();
            for (name, xobj_ref) in image_xobjects.iter().flatten() {
                xobjects.pair(Name(name.as_bytes()), *xobj_ref);
            }
        }
    }

    let bytes = pdf.finish();
    log::info!(
        "PDF phases: images={:.1}ms, content={:.1}ms, assembly={:.1}ms ({} pages, {} bytes)",
        t_images.as_secs_f64() * 1000.0,
        (t_content - t_images).as_secs_f64() * 1000.0,
        (t0.elapsed() - t_content).as_secs_f64() * 1000.0,
        n,
        bytes.len(),
    );
    Ok(bytes)
}

/// Translate one display list to a content stream, flipping y to PDF's
/// bottom-left origin.
fn page_content(page: &Page, page_h: f32, image_xobjects: &[Option<(String, Ref)>]) -> Content {
    let mut content = Content::new();
    for op in page.ops() {
        match op {
            DrawOp::FillRect { frame, color } => {
                let (r, g, b) = color.components();
                content.save_state();
                content.set_fill_rgb(r, g, b);
                content
                    .rect(
                        frame.x * PT_PER_MM,
                        page_h - frame.bottom() * PT_PER_MM,
                        frame.width * PT_PER_MM,
                        frame.height * PT_PER_MM,
                    )
                    .fill_nonzero();
                content.restore_state();
            }
            DrawOp::Text(text) => {
                let bytes = to_winansi_bytes(&text.text);
                if bytes.is_empty() {
                    continue;
                }
                let (r, g, b) = text.color.components();
                content.save_state();
                content.set_fill_rgb(r, g, b);
                content.begin_text();
                content.set_font(Name(text.style.resource_name()), text.size);
                if text.word_spacing != 0.0 {
                    content.set_word_spacing(text.word_spacing * PT_PER_MM);
                }
                content.next_line(text.left() * PT_PER_MM, page_h - text.y * PT_PER_MM);
                content.show(Str(&bytes));
                content.end_text();
                content.restore_state();
            }
            DrawOp::Image { frame, image } => {
                let Some(Some((name, _))) = image_xobjects.get(*image) else {
                    continue;
                };
                content.save_state();
                content.transform([
                    frame.width * PT_PER_MM,
                    0.0,
                    0.0,
                    frame.height * PT_PER_MM,
                    frame.x * PT_PER_MM,
                    page_h - frame.bottom() * PT_PER_MM,
                ]);
                content.x_object(Name(name.as_bytes()));
                content.restore_state();
            }
        }
    }
    content
}
