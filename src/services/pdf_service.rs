//! src/services/pdf_service.rs
//!
//! Document transforms over the lopdf object model: merge, split, rotate,
//! compress, enhance and the simulated protect/unlock pair. Every function
//! is a synchronous, stateless map from input bytes to output bytes; the
//! HTTP layer runs them on the blocking pool.
//!
//! Page trees are flattened before pages are moved around: attributes a
//! page inherits from its ancestors (`Resources`, `MediaBox`, `CropBox`,
//! `Rotate`) are copied onto the page itself, so it keeps rendering the
//! same once re-parented under a single `Pages` node.

use crate::models::options::{CompressionLevel, PageRange, Rotation};
use chrono::{DateTime, Utc};
use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat, dictionary};
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

/// Minimum number of characters the simulated unlock accepts.
pub const MIN_UNLOCK_PASSWORD_CHARS: usize = 3;

const PROTECTED_TITLE_PREFIX: &str = "Protected: ";
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];
const MAX_TREE_DEPTH: usize = 64;
/// US Letter, used when a page has no MediaBox anywhere in its ancestry.
const FALLBACK_PAGE_SIZE: (f32, f32) = (612.0, 792.0);

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("failed to load PDF: {0}")]
    Load(String),
    #[error("failed to save PDF: {0}")]
    Save(String),
    #[error("malformed document structure: {0}")]
    Structure(String),
    #[error("document has no pages")]
    NoPages,
    #[error("failed to encode content stream: {0}")]
    Encode(String),
    #[error("unsupported image: {0}")]
    Image(String),
}

pub type PdfResult<T> = Result<T, PdfError>;

impl From<lopdf::Error> for PdfError {
    fn from(err: lopdf::Error) -> Self {
        PdfError::Structure(err.to_string())
    }
}

/// One named file produced by a multi-output operation.
#[derive(Debug, Clone)]
pub struct NamedOutput {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Which pages a split should produce.
#[derive(Debug, Clone)]
pub enum SplitPlan {
    /// One document per page.
    All,
    /// One document per range that fits the page count.
    Ranges(Vec<PageRange>),
    /// A single document holding these pages in the listed order.
    Pages(Vec<u32>),
}

/// Parse `bytes` into a document.
pub fn load(bytes: &[u8]) -> PdfResult<Document> {
    Document::load_mem(bytes).map_err(|e| PdfError::Load(e.to_string()))
}

/// Serialize `doc` into a byte buffer.
pub fn save(doc: &mut Document) -> PdfResult<Vec<u8>> {
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| PdfError::Save(e.to_string()))?;
    Ok(buffer)
}

pub fn page_count(bytes: &[u8]) -> PdfResult<u32> {
    let doc = load(bytes)?;
    Ok(doc.get_pages().len() as u32)
}

/// Concatenate documents: input order first, then page order within each.
pub fn merge<B: AsRef<[u8]>>(inputs: &[B]) -> PdfResult<Vec<u8>> {
    let (first, rest) = inputs.split_first().ok_or(PdfError::NoPages)?;

    let mut merged = load(first.as_ref())?;
    let mut order = flatten_pages(&mut merged)?;

    for input in rest {
        let mut doc = load(input.as_ref())?;
        doc.renumber_objects_with(merged.max_id + 1);
        order.extend(flatten_pages(&mut doc)?);

        // The appended document's catalog and page-tree nodes become
        // unreachable once its pages hang off the merged tree; pruning
        // drops them.
        merged.objects.extend(doc.objects);
        merged.max_id = merged
            .objects
            .keys()
            .map(|(id, _)| *id)
            .max()
            .unwrap_or(merged.max_id);
    }

    if order.is_empty() {
        return Err(PdfError::NoPages);
    }

    rebuild_page_tree(&mut merged, &order)?;
    merged.prune_objects();
    merged.renumber_objects();

    debug!(
        files = inputs.len(),
        pages = order.len(),
        "merged documents"
    );
    save(&mut merged)
}

/// Split a document according to `plan`.
///
/// Ranges that are reversed or fall outside the document produce nothing,
/// as do out-of-range entries of a page list; neither fails the request.
pub fn split(bytes: &[u8], plan: &SplitPlan) -> PdfResult<Vec<NamedOutput>> {
    let source = load(bytes)?;
    let total = source.get_pages().len() as u32;

    let mut outputs = Vec::new();
    match plan {
        SplitPlan::All => {
            for page in 1..=total {
                outputs.push(NamedOutput {
                    filename: format!("page-{page}.pdf"),
                    bytes: extract_pages(&source, &[page])?,
                });
            }
        }
        SplitPlan::Ranges(ranges) => {
            for range in ranges.iter().filter(|r| r.fits(total)) {
                let pages: Vec<u32> = range.pages().collect();
                outputs.push(NamedOutput {
                    filename: format!("pages-{}-to-{}.pdf", range.start, range.end),
                    bytes: extract_pages(&source, &pages)?,
                });
            }
        }
        SplitPlan::Pages(list) => {
            let pages: Vec<u32> = list
                .iter()
                .copied()
                .filter(|p| (1..=total).contains(p))
                .collect();
            if !pages.is_empty() {
                outputs.push(NamedOutput {
                    filename: "selected-pages.pdf".to_string(),
                    bytes: extract_pages(&source, &pages)?,
                });
            }
        }
    }

    debug!(total, outputs = outputs.len(), "split document");
    Ok(outputs)
}

/// Build a standalone document holding `pages` (1-based) of `source` in the
/// given order. A page listed twice appears twice.
///
/// Only objects reachable from the selected pages (and the info dictionary)
/// are copied, so the cost of one output tracks the size of its own pages.
pub fn extract_pages(source: &Document, pages: &[u32]) -> PdfResult<Vec<u8>> {
    let all = source.get_pages();

    let mut selected = Vec::with_capacity(pages.len());
    for number in pages {
        let id = all
            .get(number)
            .copied()
            .ok_or_else(|| PdfError::Structure(format!("page {number} does not exist")))?;
        selected.push(id);
    }
    if selected.is_empty() {
        return Err(PdfError::NoPages);
    }

    let mut doc = Document::with_version(source.version.clone());
    doc.max_id = source.max_id;

    let mut pending = Vec::new();
    for &id in &selected {
        if doc.objects.contains_key(&id) {
            continue;
        }
        let page = detached_page(source, id)?;
        collect_dict_references(&page, &mut pending);
        doc.objects.insert(id, Object::Dictionary(page));
    }

    match source.trailer.get(b"Info") {
        Ok(Object::Reference(info_id)) => {
            pending.push(*info_id);
            doc.trailer.set("Info", Object::Reference(*info_id));
        }
        Ok(Object::Dictionary(info)) => {
            collect_dict_references(info, &mut pending);
            doc.trailer.set("Info", Object::Dictionary(info.clone()));
        }
        _ => {}
    }
    copy_reachable(source, &mut doc, pending);

    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
    });
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    rebuild_page_tree(&mut doc, &selected)?;
    doc.renumber_objects();
    save(&mut doc)
}

/// A copy of a page dictionary with its inherited attributes materialized
/// and its `/Parent` link dropped.
fn detached_page(source: &Document, page_id: ObjectId) -> PdfResult<Dictionary> {
    let mut page = source.get_dictionary(page_id)?.clone();
    for key in INHERITABLE_KEYS {
        if !page.has(key) {
            if let Some(value) = inherited_attribute(source, page_id, key) {
                page.set(key.to_vec(), value);
            }
        }
    }
    page.remove(b"Parent");
    Ok(page)
}

/// Copy every object reachable from `pending` out of `source`, keeping ids.
/// Objects already present in `target` are left alone. `/Parent` links are
/// not followed, so pages reached through annotations come over detached.
fn copy_reachable(source: &Document, target: &mut Document, mut pending: Vec<ObjectId>) {
    while let Some(id) = pending.pop() {
        if target.objects.contains_key(&id) {
            continue;
        }
        let Ok(object) = source.get_object(id) else {
            continue;
        };
        collect_references(object, &mut pending);

        let mut copy = object.clone();
        if let Object::Dictionary(dict) = &mut copy {
            dict.remove(b"Parent");
        }
        target.objects.insert(id, copy);
    }
}

fn collect_references(object: &Object, out: &mut Vec<ObjectId>) {
    match object {
        Object::Reference(id) => out.push(*id),
        Object::Array(items) => items.iter().for_each(|item| collect_references(item, out)),
        Object::Dictionary(dict) => collect_dict_references(dict, out),
        Object::Stream(stream) => collect_dict_references(&stream.dict, out),
        _ => {}
    }
}

fn collect_dict_references(dict: &Dictionary, out: &mut Vec<ObjectId>) {
    for (key, value) in dict.iter() {
        if key.as_slice() != b"Parent" {
            collect_references(value, out);
        }
    }
}

/// Rotate every page by `rotation`, on top of whatever rotation it already has.
pub fn rotate(bytes: &[u8], rotation: Rotation) -> PdfResult<Vec<u8>> {
    let mut doc = load(bytes)?;
    let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();

    for id in &pages {
        let current = inherited_attribute(&doc, *id, b"Rotate")
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(0);
        page_dict_mut(&mut doc, *id)?.set("Rotate", Object::Integer(rotation.apply_to(current)));
    }

    debug!(pages = pages.len(), degrees = rotation.degrees(), "rotated pages");
    save(&mut doc)
}

/// Re-serialize with progressively more aggressive cleanup. Embedded images
/// are never recompressed.
pub fn compress(bytes: &[u8], level: CompressionLevel) -> PdfResult<Vec<u8>> {
    let mut doc = load(bytes)?;
    doc.prune_objects();

    if matches!(level, CompressionLevel::Medium | CompressionLevel::High) {
        doc.delete_zero_length_streams();
        doc.compress();
    }

    if level == CompressionLevel::High {
        let info = info_dict_mut(&mut doc)?;
        for key in ["Title", "Author", "Subject", "Keywords", "Producer", "Creator"] {
            info.set(key, text_string(""));
        }
    }

    let out = save(&mut doc)?;
    debug!(
        level = level.as_str(),
        input_bytes = bytes.len(),
        output_bytes = out.len(),
        "compressed document"
    );
    Ok(out)
}

/// Mark the document as protected in its metadata. No encryption is applied.
pub fn protect(bytes: &[u8], filename: &str) -> PdfResult<Vec<u8>> {
    let mut doc = load(bytes)?;
    let title = info_text(&doc, b"Title")
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| filename.to_string());

    let info = info_dict_mut(&mut doc)?;
    info.set("Title", text_string(&format!("{PROTECTED_TITLE_PREFIX}{title}")));
    info.set("Subject", text_string("Password Protected PDF"));
    save(&mut doc)
}

/// Whether the simulated unlock accepts `password`.
pub fn unlock_password_accepted(password: &str) -> bool {
    password.chars().count() >= MIN_UNLOCK_PASSWORD_CHARS
}

/// Strip the protection marker written by [`protect`].
pub fn unlock(bytes: &[u8], filename: &str) -> PdfResult<Vec<u8>> {
    let mut doc = load(bytes)?;
    let title = info_text(&doc, b"Title")
        .map(|t| t.replacen(PROTECTED_TITLE_PREFIX, "", 1))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| filename.to_string());

    let info = info_dict_mut(&mut doc)?;
    info.set("Title", text_string(&title));
    info.set("Subject", text_string("Unlocked PDF"));
    save(&mut doc)
}

/// Stamp enhancement metadata and deflate uncompressed streams.
pub fn enhance(bytes: &[u8], enhance_type: &str, now: DateTime<Utc>) -> PdfResult<Vec<u8>> {
    let mut doc = load(bytes)?;
    let stamp = pdf_date(now);

    let info = info_dict_mut(&mut doc)?;
    info.set("Title", text_string(&format!("Enhanced PDF - {enhance_type}")));
    info.set(
        "Subject",
        text_string(&format!("PDF enhanced with {enhance_type} optimization")),
    );
    info.set("Creator", text_string("PDF Utility - Enhancement Tool"));
    info.set("Producer", text_string("PDF Utility Enhancement Engine"));
    info.set("CreationDate", text_string(&stamp));
    info.set("ModDate", text_string(&stamp));

    doc.compress();
    save(&mut doc)
}

/// Width and height in points of every page, in page order.
pub fn page_sizes(doc: &Document) -> Vec<(f32, f32)> {
    doc.get_pages()
        .into_values()
        .map(|id| page_size(doc, id))
        .collect()
}

fn page_size(doc: &Document, page_id: ObjectId) -> (f32, f32) {
    let Some(Object::Array(rect)) = inherited_attribute(doc, page_id, b"MediaBox") else {
        return FALLBACK_PAGE_SIZE;
    };
    let coords: Vec<f32> = rect.iter().filter_map(|o| o.as_float().ok()).collect();
    match coords.as_slice() {
        [x0, y0, x1, y1] => ((x1 - x0).abs(), (y1 - y0).abs()),
        _ => FALLBACK_PAGE_SIZE,
    }
}

/// Materialize inherited attributes on every page and return the page ids
/// in order.
fn flatten_pages(doc: &mut Document) -> PdfResult<Vec<ObjectId>> {
    let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
    for id in &pages {
        materialize_inherited(doc, *id)?;
    }
    Ok(pages)
}

/// Look up `key` on the page or the nearest ancestor that defines it.
fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(resolve(doc, value).clone());
        }
        let parent = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
    None
}

fn resolve<'a>(doc: &'a Document, object: &'a Object) -> &'a Object {
    match object {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(object),
        other => other,
    }
}

fn materialize_inherited(doc: &mut Document, page_id: ObjectId) -> PdfResult<()> {
    let missing: Vec<(&[u8], Object)> = {
        let page = doc.get_dictionary(page_id)?;
        INHERITABLE_KEYS
            .iter()
            .filter(|key| !page.has(key))
            .filter_map(|key| inherited_attribute(doc, page_id, key).map(|v| (*key, v)))
            .collect()
    };

    let page = page_dict_mut(doc, page_id)?;
    for (key, value) in missing {
        page.set(key.to_vec(), value);
    }
    Ok(())
}

/// Replace the document's page tree with a single `Pages` node whose kids
/// are `pages` in order. Repeated ids are cloned so each kid is distinct.
fn rebuild_page_tree(doc: &mut Document, pages: &[ObjectId]) -> PdfResult<()> {
    let pages_id = doc
        .catalog()?
        .get(b"Pages")
        .and_then(Object::as_reference)?;

    let mut seen = HashSet::new();
    let mut kids = Vec::with_capacity(pages.len());
    for &id in pages {
        let kid = if seen.insert(id) {
            id
        } else {
            let copy = doc.get_object(id)?.clone();
            doc.add_object(copy)
        };
        page_dict_mut(doc, kid)?.set("Parent", Object::Reference(pages_id));
        kids.push(Object::Reference(kid));
    }

    let tree = doc.get_object_mut(pages_id).and_then(Object::as_dict_mut)?;
    tree.set("Count", Object::Integer(kids.len() as i64));
    tree.set("Kids", Object::Array(kids));
    tree.remove(b"Parent");
    Ok(())
}

fn page_dict_mut(doc: &mut Document, page_id: ObjectId) -> PdfResult<&mut Dictionary> {
    doc.get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| PdfError::Structure(format!("page {page_id:?}: {e}")))
}

/// The document information dictionary, created (and made indirect) if the
/// trailer lacks one.
fn info_dict_mut(doc: &mut Document) -> PdfResult<&mut Dictionary> {
    let existing = doc
        .trailer
        .get(b"Info")
        .and_then(Object::as_reference)
        .ok()
        .filter(|id| doc.objects.contains_key(id));

    let info_id = match existing {
        Some(id) => id,
        None => {
            let inline = doc
                .trailer
                .get(b"Info")
                .and_then(Object::as_dict)
                .cloned()
                .unwrap_or_else(|_| Dictionary::new());
            let id = doc.add_object(inline);
            doc.trailer.set("Info", Object::Reference(id));
            id
        }
    };

    Ok(doc.get_object_mut(info_id).and_then(Object::as_dict_mut)?)
}

fn info_text(doc: &Document, key: &[u8]) -> Option<String> {
    let info = match doc.trailer.get(b"Info").ok()? {
        Object::Reference(id) => doc.get_dictionary(*id).ok()?,
        Object::Dictionary(dict) => dict,
        _ => return None,
    };
    match resolve(doc, info.get(key).ok()?) {
        Object::String(bytes, _) => Some(decode_text_string(bytes)),
        _ => None,
    }
}

/// Encode a PDF text string: Latin-1 when possible, UTF-16BE with BOM otherwise.
pub fn text_string(value: &str) -> Object {
    if value.chars().all(|c| (c as u32) < 0x100) {
        let bytes = value.chars().map(|c| c as u8).collect();
        return Object::String(bytes, StringFormat::Literal);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in value.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

pub fn decode_text_string(bytes: &[u8]) -> String {
    match bytes {
        [0xFE, 0xFF, rest @ ..] => {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        _ => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// `D:YYYYMMDDHHmmSSZ`
pub fn pdf_date(at: DateTime<Utc>) -> String {
    at.format("D:%Y%m%d%H%M%SZ").to_string()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::services::document_builder::{A4, DocumentBuilder, PageCanvas};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    /// A document whose page `n` is `100 + n` points wide, so page identity
    /// survives a round trip through any transform.
    pub(crate) fn numbered_pdf(pages: u32) -> Vec<u8> {
        (1..=pages)
            .fold(DocumentBuilder::new(), |builder, n| {
                builder.page(PageCanvas::new((100.0 + n as f32, 200.0)))
            })
            .info("Title", "Quarterly Report")
            .finish()
            .unwrap()
    }

    /// Page numbers recovered from the widths of `numbered_pdf` pages.
    pub(crate) fn page_numbers(bytes: &[u8]) -> Vec<u32> {
        let doc = load(bytes).unwrap();
        page_sizes(&doc)
            .into_iter()
            .map(|(w, _)| (w - 100.0).round() as u32)
            .collect()
    }

    fn title(bytes: &[u8]) -> Option<String> {
        info_text(&load(bytes).unwrap(), b"Title")
    }

    fn rotations(bytes: &[u8]) -> Vec<i64> {
        let doc = load(bytes).unwrap();
        doc.get_pages()
            .into_values()
            .map(|id| {
                inherited_attribute(&doc, id, b"Rotate")
                    .and_then(|o| o.as_i64().ok())
                    .unwrap_or(0)
            })
            .collect()
    }

    #[test]
    fn merge_concatenates_in_input_order() {
        let merged = merge(&[numbered_pdf(2), numbered_pdf(3)]).unwrap();
        assert_eq!(page_numbers(&merged), vec![1, 2, 1, 2, 3]);
    }

    #[test]
    fn split_all_yields_one_document_per_page() {
        let outputs = split(&numbered_pdf(3), &SplitPlan::All).unwrap();
        let names: Vec<_> = outputs.iter().map(|o| o.filename.as_str()).collect();
        assert_eq!(names, ["page-1.pdf", "page-2.pdf", "page-3.pdf"]);

        let pages: Vec<Vec<u32>> = outputs.iter().map(|o| page_numbers(&o.bytes)).collect();
        assert_eq!(pages, vec![vec![1], vec![2], vec![3]]);
    }

    #[test]
    fn split_all_outputs_carry_only_their_own_page() {
        use crate::services::document_builder::{StandardFont, TextStyle};

        let source = (1..=4)
            .fold(DocumentBuilder::new(), |builder, n| {
                let mut canvas = PageCanvas::new(A4);
                let style = TextStyle::new(StandardFont::Helvetica, 12.0);
                canvas.text(72.0, 720.0, style, &format!("marker-{n}"));
                builder.page(canvas)
            })
            .finish()
            .unwrap();

        let outputs = split(&source, &SplitPlan::All).unwrap();
        assert_eq!(outputs.len(), 4);

        for (index, output) in outputs.iter().enumerate() {
            let doc = load(&output.bytes).unwrap();
            let streams: Vec<String> = doc
                .objects
                .values()
                .filter_map(|o| o.as_stream().ok())
                .map(|s| {
                    let content = s.decompressed_content().unwrap_or_else(|_| s.content.clone());
                    String::from_utf8_lossy(&content).into_owned()
                })
                .collect();
            let page_objects = doc
                .objects
                .values()
                .filter_map(|o| o.as_dict().ok())
                .filter(|d| {
                    d.get(b"Type").and_then(Object::as_name).ok() == Some(b"Page".as_slice())
                })
                .count();

            assert_eq!(streams.len(), 1, "output {index} streams: {streams:?}");
            assert!(streams[0].contains(&format!("marker-{}", index + 1)));
            assert_eq!(page_objects, 1);
            assert_eq!(doc.get_pages().len(), 1);
        }
    }

    #[test]
    fn split_ranges_skips_invalid_ranges() {
        let plan = SplitPlan::Ranges(vec![
            PageRange { start: 1, end: 2 },
            PageRange { start: 4, end: 4 },
            PageRange { start: 10, end: 20 },
            PageRange { start: 3, end: 2 },
        ]);
        let outputs = split(&numbered_pdf(5), &plan).unwrap();

        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[0].filename, "pages-1-to-2.pdf");
        assert_eq!(page_numbers(&outputs[0].bytes), vec![1, 2]);
        assert_eq!(outputs[1].filename, "pages-4-to-4.pdf");
        assert_eq!(page_numbers(&outputs[1].bytes), vec![4]);
    }

    #[test]
    fn split_pages_keeps_listed_order_and_filters_out_of_bounds() {
        let plan = SplitPlan::Pages(vec![4, 9, 1, 0, 4]);
        let outputs = split(&numbered_pdf(5), &plan).unwrap();

        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].filename, "selected-pages.pdf");
        assert_eq!(page_numbers(&outputs[0].bytes), vec![4, 1, 4]);
    }

    #[test]
    fn split_pages_with_nothing_valid_produces_nothing() {
        let outputs = split(&numbered_pdf(2), &SplitPlan::Pages(vec![7, 8])).unwrap();
        assert!(outputs.is_empty());
    }

    #[test]
    fn rotation_is_cumulative() {
        let once = rotate(&numbered_pdf(2), Rotation::new(90).unwrap()).unwrap();
        assert_eq!(rotations(&once), vec![90, 90]);

        let back = rotate(&once, Rotation::new(270).unwrap()).unwrap();
        assert_eq!(rotations(&back), vec![0, 0]);
    }

    #[test]
    fn high_compression_clears_metadata() {
        let source = numbered_pdf(2);
        let high = compress(&source, CompressionLevel::High).unwrap();
        assert_eq!(title(&high).as_deref(), Some(""));
        assert_eq!(page_numbers(&high), vec![1, 2]);

        let low = compress(&source, CompressionLevel::Low).unwrap();
        assert_eq!(title(&low).as_deref(), Some("Quarterly Report"));
    }

    #[test]
    fn protect_then_unlock_round_trips_title() {
        let protected = protect(&numbered_pdf(1), "report.pdf").unwrap();
        assert_eq!(title(&protected).as_deref(), Some("Protected: Quarterly Report"));

        let unlocked = unlock(&protected, "report.pdf").unwrap();
        assert_eq!(title(&unlocked).as_deref(), Some("Quarterly Report"));
    }

    #[test]
    fn unlock_password_length_rule() {
        assert!(!unlock_password_accepted("ab"));
        assert!(unlock_password_accepted("abc"));
        assert!(unlock_password_accepted("\u{e9}\u{e9}\u{e9}"));
    }

    #[test]
    fn enhance_stamps_metadata() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 8, 5, 1).unwrap();
        let out = enhance(&numbered_pdf(1), "quality", now).unwrap();
        let doc = load(&out).unwrap();
        assert_eq!(
            info_text(&doc, b"Title").as_deref(),
            Some("Enhanced PDF - quality")
        );
        assert_eq!(
            info_text(&doc, b"ModDate").as_deref(),
            Some("D:20240309080501Z")
        );
    }

    #[test]
    fn text_strings_round_trip() {
        for value in ["plain", "caf\u{e9}", "\u{4e16}\u{754c}"] {
            let Object::String(bytes, _) = text_string(value) else {
                panic!("expected a string object");
            };
            assert_eq!(decode_text_string(&bytes), value);
        }
    }

    #[test]
    fn garbage_input_is_a_load_error() {
        assert!(matches!(load(b"not a pdf"), Err(PdfError::Load(_))));
        assert!(matches!(merge::<Vec<u8>>(&[]), Err(PdfError::NoPages)));
    }
}
