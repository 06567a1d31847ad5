use std::io::Cursor;

use image::ImageDecoder;
use pdf_writer::{Filter, Pdf, Ref};

use crate::assets::{DecodedImage, ImageFormat};
use crate::error::Error;

fn decode_err(img: &DecodedImage, e: impl std::fmt::Display) -> Error {
    Error::ImageDecode {
        label: format!("{} {}x{}", img.format.mime_type(), img.width, img.height),
        reason: e.to_string(),
    }
}

fn jpeg_is_grayscale(img: &DecodedImage) -> Result<bool, Error> {
    let decoder = image::codecs::jpeg::JpegDecoder::new(Cursor::new(&img.bytes))
        .map_err(|e| decode_err(img, e))?;
    Ok(decoder.color_type().channel_count() == 1)
}

/// Write `img` as an image XObject. JPEG data is passed through with
/// DCTDecode; PNG is decoded and stored as Flate RGB with an SMask when any
/// pixel is translucent.
pub(crate) fn embed_image(
    pdf: &mut Pdf,
    alloc: &mut impl FnMut() -> Ref,
    img: &DecodedImage,
) -> Result<Ref, Error> {
    match img.format {
        ImageFormat::Jpeg => {
            let gray = jpeg_is_grayscale(img)?;
            let xobj_ref = alloc();
            let mut xobj = pdf.image_xobject(xobj_ref, &img.bytes);
            xobj.filter(Filter::DctDecode);
            xobj.width(img.width as i32);
            xobj.height(img.height as i32);
            if gray {
                xobj.color_space().device_gray();
            } else {
                xobj.color_space().device_rgb();
            }
            xobj.bits_per_component(8);
            Ok(xobj_ref)
        }
        ImageFormat::Png => {
            let decoded = image::load_from_memory_with_format(&img.bytes, image::ImageFormat::Png)
                .map_err(|e| decode_err(img, e))?;
            let rgba = decoded.to_rgba8();
            let (w, h) = (rgba.width(), rgba.height());
            let has_alpha = rgba.pixels().any(|p| p.0[3] < 255);

            let rgb_data: Vec<u8> = rgba
                .pixels()
                .flat_map(|p| [p.0[0], p.0[1], p.0[2]])
                .collect();
            let compressed_rgb = miniz_oxide::deflate::compress_to_vec_zlib(&rgb_data, 6);

            let smask_ref = if has_alpha {
                let alpha_data: Vec<u8> = rgba.pixels().map(|p| p.0[3]).collect();
                let compressed_alpha = miniz_oxide::deflate::compress_to_vec_zlib(&alpha_data, 6);
                let mask_ref = alloc();
                let mut mask = pdf.image_xobject(mask_ref, &compressed_alpha);
                mask.filter(Filter::FlateDecode);
                mask.width(w as i32);
                mask.height(h as i32);
                mask.color_space().device_gray();
                mask.bits_per_component(8);
                Some(mask_ref)
            } else {
                None
            };

            let xobj_ref = alloc();
            let mut xobj = pdf.image_xobject(xobj_ref, &compressed_rgb);
            xobj.filter(Filter::FlateDecode);
            xobj.width(w as i32);
            xobj.height(h as i32);
            xobj.color_space().device_rgb();
            xobj.bits_per_component(8);
            if let Some(mask_ref) = smask_ref {
                xobj.s_mask(mask_ref);
            }
            Ok(xobj_ref)
        }
    }
}
