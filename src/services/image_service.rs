//! Image <-> PDF conversions.
//!
//! `images_to_pdf` really embeds images: JPEG data is passed through as a
//! DCT-encoded XObject, anything else is decoded to 8-bit RGB and deflated.
//! `page_placeholders` does not render anything; it emits a blank JPEG per
//! page with the page's aspect ratio.

use super::pdf_service::{self, PdfError, PdfResult};
use image::{
    ColorType, DynamicImage, ImageDecoder, ImageFormat, Rgb, RgbImage,
    codecs::jpeg::JpegDecoder,
};
use lopdf::{
    Document, Object, Stream,
    content::{Content, Operation},
    dictionary,
};
use std::io::Cursor;
use tracing::debug;

/// Rasterization density assumed for placeholder page images.
const PLACEHOLDER_DPI: f32 = 150.0;
const PLACEHOLDER_MAX_EDGE: u32 = 1600;

/// Build one page per image, each page exactly the image's pixel size in points.
pub fn images_to_pdf<B: AsRef<[u8]>>(images: &[B]) -> PdfResult<Vec<u8>> {
    if images.is_empty() {
        return Err(PdfError::NoPages);
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids = Vec::with_capacity(images.len());

    for (index, bytes) in images.iter().enumerate() {
        let (xobject, width, height) = image_xobject(bytes.as_ref())?;
        let image_id = doc.add_object(xobject);
        let (w, h) = (width as f32, height as f32);

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![w.into(), 0.into(), 0.into(), h.into(), 0.into(), 0.into()],
                ),
                Operation::new("Do", vec![Object::Name(b"Im1".to_vec())]),
                Operation::new("Q", vec![]),
            ],
        }
        .encode()
        .map_err(|e| PdfError::Encode(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), w.into(), h.into()],
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Im1" => image_id },
            },
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));

        debug!(index, width, height, "embedded image page");
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc.compress();
    pdf_service::save(&mut doc)
}

fn image_xobject(bytes: &[u8]) -> PdfResult<(Stream, u32, u32)> {
    let format = image::guess_format(bytes).map_err(|e| PdfError::Image(e.to_string()))?;

    if format == ImageFormat::Jpeg {
        if let Some(passthrough) = jpeg_passthrough(bytes)? {
            return Ok(passthrough);
        }
    }

    let decoded = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| PdfError::Image(e.to_string()))?;
    let rgb = decoded.to_rgb8();
    let (width, height) = rgb.dimensions();

    let stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        rgb.into_raw(),
    );
    Ok((stream, width, height))
}

/// Embed JPEG bytes untouched when the color model maps onto a PDF device
/// space. Returns `None` for anything that needs decoding first.
fn jpeg_passthrough(bytes: &[u8]) -> PdfResult<Option<(Stream, u32, u32)>> {
    let decoder =
        JpegDecoder::new(Cursor::new(bytes)).map_err(|e| PdfError::Image(e.to_string()))?;
    let (width, height) = decoder.dimensions();
    let color_space = match decoder.color_type() {
        ColorType::L8 => "DeviceGray",
        ColorType::Rgb8 => "DeviceRGB",
        _ => return Ok(None),
    };

    let stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => color_space,
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        bytes.to_vec(),
    )
    .with_compression(false);
    Ok(Some((stream, width, height)))
}

/// One blank JPEG per page, named `{stem}-page-{n}.jpg`.
pub fn page_placeholders(pdf: &[u8], stem: &str) -> PdfResult<Vec<(String, Vec<u8>)>> {
    let doc = pdf_service::load(pdf)?;

    pdf_service::page_sizes(&doc)
        .into_iter()
        .enumerate()
        .map(|(index, (width, height))| {
            let (px_w, px_h) = placeholder_dimensions(width, height);
            let canvas = RgbImage::from_pixel(px_w, px_h, Rgb([255, 255, 255]));

            let mut jpeg = Vec::new();
            DynamicImage::ImageRgb8(canvas)
                .write_to(&mut Cursor::new(&mut jpeg), ImageFormat::Jpeg)
                .map_err(|e| PdfError::Image(e.to_string()))?;

            Ok((format!("{stem}-page-{}.jpg", index + 1), jpeg))
        })
        .collect()
}

/// Pixel size for a page of `width` x `height` points.
fn placeholder_dimensions(width: f32, height: f32) -> (u32, u32) {
    let (mut w, mut h) = (width * PLACEHOLDER_DPI / 72.0, height * PLACEHOLDER_DPI / 72.0);

    let long_edge = w.max(h);
    if long_edge > PLACEHOLDER_MAX_EDGE as f32 {
        let shrink = PLACEHOLDER_MAX_EDGE as f32 / long_edge;
        w *= shrink;
        h *= shrink;
    }
    ((w.round() as u32).max(1), (h.round() as u32).max(1))
}
