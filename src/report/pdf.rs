use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use thiserror::Error;

use crate::report::layout::{Block, PAGE_HEIGHT_MM, PAGE_WIDTH_MM, Rect, ReportLayout};
use crate::report::text::{MM_PER_PT, encode_win_ansi, wrap_text};

pub const FONT_SIZE: f64 = 12.0;
/// Horizontal padding inside a text cell.
pub const CELL_MARGIN_MM: f64 = 1.0;

const FONT_REGULAR: &str = "F1";
const FONT_BOLD: &str = "F2";

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("failed to read image {path}: {source}")]
    Image {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to encode {what}: {message}")]
    Encode { what: String, message: String },
    #[error("failed to write {path}: {message}")]
    Write { path: String, message: String },
}

fn pt(mm: f64) -> Object {
    Object::Real((mm / MM_PER_PT) as f32)
}

/// Top-down millimetres to bottom-up points.
fn pt_y(mm_from_top: f64) -> Object {
    pt(PAGE_HEIGHT_MM - mm_from_top)
}

fn push_line(ops: &mut Vec<Operation>, font: &str, at: Rect, line_top: f64, text: &str) {
    if text.is_empty() {
        return;
    }
    let baseline = line_top + at.h / 2.0 + 0.3 * FONT_SIZE * MM_PER_PT;
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new(
        "Tf",
        vec![font.into(), Object::Real(FONT_SIZE as f32)],
    ));
    ops.push(Operation::new(
        "Td",
        vec![pt(at.x + CELL_MARGIN_MM), pt_y(baseline)],
    ));
    ops.push(Operation::new(
        "Tj",
        vec![Object::string_literal(encode_win_ansi(text))],
    ));
    ops.push(Operation::new("ET", vec![]));
}

fn push_image(ops: &mut Vec<Operation>, name: &str, at: Rect) {
    ops.push(Operation::new("q", vec![]));
    ops.push(Operation::new(
        "cm",
        vec![
            pt(at.w),
            Object::Integer(0),
            Object::Integer(0),
            pt(at.h),
            pt(at.x),
            pt_y(at.y + at.h),
        ],
    ));
    ops.push(Operation::new("Do", vec![name.into()]));
    ops.push(Operation::new("Q", vec![]));
}

fn image_stream(path: &Path) -> Result<Stream, PdfError> {
    let rgb = image::open(path)
        .map_err(|source| PdfError::Image {
            path: path.display().to_string(),
            source,
        })?
        .to_rgb8();
    let (width, height) = rgb.dimensions();

    let encode_err = |e: std::io::Error| PdfError::Encode {
        what: path.display().to_string(),
        message: e.to_string(),
    };
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(rgb.as_raw()).map_err(encode_err)?;
    let data = encoder.finish().map_err(encode_err)?;

    let dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => Object::Integer(i64::from(width)),
        "Height" => Object::Integer(i64::from(height)),
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => Object::Integer(8),
        "Filter" => "FlateDecode",
    };
    Ok(Stream::new(dict, data).with_compression(false))
}

fn font(doc: &mut Document, base: &str) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    })
}

/// Renders every page of `layout` in order. Blocks are drawn exactly where
/// they are placed; nothing reflows.
pub fn render_document(layout: &ReportLayout) -> Result<Document, PdfError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let regular = font(&mut doc, "Helvetica");
    let bold = font(&mut doc, "Helvetica-Bold");

    let mut kids: Vec<Object> = Vec::with_capacity(layout.pages.len());
    for (page_no, page) in layout.pages.iter().enumerate() {
        let mut ops = Vec::new();
        let mut xobjects = Dictionary::new();

        for block in &page.blocks {
            let at = block.at();
            match block {
                Block::Heading { text, .. } => push_line(&mut ops, FONT_BOLD, at, at.y, text),
                Block::Text { text, .. } => {
                    let lines = wrap_text(text, at.w - 2.0 * CELL_MARGIN_MM, FONT_SIZE);
                    for (i, line) in lines.iter().enumerate() {
                        push_line(&mut ops, FONT_REGULAR, at, at.y + i as f64 * at.h, line);
                    }
                }
                Block::Image { path, .. } => {
                    let name = format!("Im{}", xobjects.len() + 1);
                    let id = doc.add_object(image_stream(path)?);
                    xobjects.set(name.clone(), id);
                    push_image(&mut ops, &name, at);
                }
            }
        }

        let content = Content { operations: ops };
        let encoded = content.encode().map_err(|e| PdfError::Encode {
            what: format!("page {}", page_no + 1),
            message: e.to_string(),
        })?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! {
                    FONT_REGULAR => regular,
                    FONT_BOLD => bold,
                },
                "XObject" => xobjects,
            },
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => Object::Integer(count),
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            pt(PAGE_WIDTH_MM),
            pt(PAGE_HEIGHT_MM),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();
    Ok(doc)
}

pub fn write_document(layout: &ReportLayout, path: &Path) -> Result<(), PdfError> {
    let write_err = |message: String| PdfError::Write {
        path: path.display().to_string(),
        message,
    };
    let mut doc = render_document(layout)?;
    let file = File::create(path).map_err(|e| write_err(e.to_string()))?;
    let mut w = BufWriter::new(file);
    doc.save_to(&mut w).map_err(|e| write_err(e.to_string()))?;
    w.flush().map_err(|e| write_err(e.to_string()))?;
    Ok(())
}
