//! Builds simple text-and-line PDFs from scratch with lopdf.
//!
//! Used by the placeholder conversions. Pages are laid out in PDF user space
//! (origin bottom-left, units in points) with the 14 standard Type 1 fonts,
//! so no font program is embedded.

use super::pdf_service::{PdfError, PdfResult, save};
use lopdf::{
    Dictionary, Document, Object, ObjectId, Stream, StringFormat,
    content::{Content, Operation},
};

/// A4 portrait in points.
pub const A4: (f32, f32) = (595.28, 841.89);

const LINE_SPACING: f32 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    TimesRoman,
    Courier,
    Helvetica,
    HelveticaBold,
}

impl StandardFont {
    const ALL: [StandardFont; 4] = [
        StandardFont::TimesRoman,
        StandardFont::Courier,
        StandardFont::Helvetica,
        StandardFont::HelveticaBold,
    ];

    fn resource_name(self) -> &'static str {
        match self {
            StandardFont::TimesRoman => "F1",
            StandardFont::Courier => "F2",
            StandardFont::Helvetica => "F3",
            StandardFont::HelveticaBold => "F4",
        }
    }

    fn base_font(self) -> &'static str {
        match self {
            StandardFont::TimesRoman => "Times-Roman",
            StandardFont::Courier => "Courier",
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
        }
    }

    /// Average advance width as a fraction of the font size.
    fn average_advance(self) -> f32 {
        match self {
            StandardFont::Courier => 0.6,
            StandardFont::HelveticaBold => 0.56,
            StandardFont::Helvetica => 0.52,
            StandardFont::TimesRoman => 0.47,
        }
    }
}

/// Text placement parameters.
#[derive(Debug, Clone, Copy)]
pub struct TextStyle {
    pub font: StandardFont,
    pub size: f32,
    /// Fill gray level, 0.0 (black) to 1.0 (white).
    pub gray: f32,
}

impl TextStyle {
    pub fn new(font: StandardFont, size: f32) -> Self {
        Self {
            font,
            size,
            gray: 0.0,
        }
    }

    pub fn gray(mut self, gray: f32) -> Self {
        self.gray = gray;
        self
    }
}

/// Drawing operations for a single page.
#[derive(Debug, Clone)]
pub struct PageCanvas {
    width: f32,
    height: f32,
    operations: Vec<Operation>,
}

impl PageCanvas {
    pub fn new((width, height): (f32, f32)) -> Self {
        Self {
            width,
            height,
            operations: Vec::new(),
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Draw a single line of text with its baseline at `(x, y)`.
    pub fn text(&mut self, x: f32, y: f32, style: TextStyle, text: &str) -> &mut Self {
        self.text_lines(x, y, style, &[text.to_string()])
    }

    /// Draw `text` starting at `(x, y)`, honoring embedded newlines and
    /// wrapping words that would run past `max_width`.
    pub fn wrapped_text(
        &mut self,
        x: f32,
        y: f32,
        style: TextStyle,
        text: &str,
        max_width: f32,
    ) -> &mut Self {
        let lines = wrap_text(text, style, max_width);
        self.text_lines(x, y, style, &lines)
    }

    /// Stroke a rectangle outline with a 1pt black line.
    pub fn rectangle(&mut self, x: f32, y: f32, width: f32, height: f32) -> &mut Self {
        self.operations.extend([
            Operation::new("q", vec![]),
            Operation::new("w", vec![1.into()]),
            Operation::new("RG", vec![0.into(), 0.into(), 0.into()]),
            Operation::new("re", vec![x.into(), y.into(), width.into(), height.into()]),
            Operation::new("S", vec![]),
            Operation::new("Q", vec![]),
        ]);
        self
    }

    fn text_lines(&mut self, x: f32, y: f32, style: TextStyle, lines: &[String]) -> &mut Self {
        self.operations.extend([
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![
                    Object::Name(style.font.resource_name().as_bytes().to_vec()),
                    style.size.into(),
                ],
            ),
            Operation::new("TL", vec![(style.size * LINE_SPACING).into()]),
            Operation::new(
                "rg",
                vec![style.gray.into(), style.gray.into(), style.gray.into()],
            ),
            Operation::new("Td", vec![x.into(), y.into()]),
        ]);

        for (index, line) in lines.iter().enumerate() {
            if index > 0 {
                self.operations.push(Operation::new("T*", vec![]));
            }
            self.operations.push(Operation::new(
                "Tj",
                vec![Object::String(encode_win_ansi(line), StringFormat::Literal)],
            ));
        }

        self.operations.push(Operation::new("ET", vec![]));
        self
    }
}

/// Accumulates pages and serializes them into a standalone PDF.
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    pages: Vec<PageCanvas>,
    info: Vec<(&'static str, String)>,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, canvas: PageCanvas) -> Self {
        self.pages.push(canvas);
        self
    }

    /// Add an entry to the document information dictionary.
    pub fn info(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.info.push((key, value.into()));
        self
    }

    /// Build the document tree and serialize it.
    pub fn finish(self) -> PdfResult<Vec<u8>> {
        if self.pages.is_empty() {
            return Err(PdfError::NoPages);
        }

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut fonts = Dictionary::new();
        for font in StandardFont::ALL {
            let mut dict = Dictionary::new();
            dict.set("Type", Object::Name(b"Font".to_vec()));
            dict.set("Subtype", Object::Name(b"Type1".to_vec()));
            dict.set("BaseFont", Object::Name(font.base_font().as_bytes().to_vec()));
            dict.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
            let font_id = doc.add_object(dict);
            fonts.set(font.resource_name(), Object::Reference(font_id));
        }
        let mut resources = Dictionary::new();
        resources.set("Font", Object::Dictionary(fonts));
        let resources_id = doc.add_object(resources);

        let mut kids = Vec::with_capacity(self.pages.len());
        for canvas in self.pages {
            let content = Content {
                operations: canvas.operations,
            }
            .encode()
            .map_err(|e| PdfError::Encode(e.to_string()))?;
            let content_id = doc.add_object(Stream::new(Dictionary::new(), content));

            let mut page = Dictionary::new();
            page.set("Type", Object::Name(b"Page".to_vec()));
            page.set("Parent", Object::Reference(pages_id));
            page.set(
                "MediaBox",
                Object::Array(vec![
                    0.into(),
                    0.into(),
                    canvas.width.into(),
                    canvas.height.into(),
                ]),
            );
            page.set("Resources", Object::Reference(resources_id));
            page.set("Contents", Object::Reference(content_id));
            kids.push(Object::Reference(doc.add_object(page)));
        }

        let mut pages = Dictionary::new();
        pages.set("Type", Object::Name(b"Pages".to_vec()));
        pages.set("Count", Object::Integer(kids.len() as i64));
        pages.set("Kids", Object::Array(kids));
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = add_catalog(&mut doc, pages_id);
        doc.trailer.set("Root", Object::Reference(catalog_id));

        if !self.info.is_empty() {
            let mut info = Dictionary::new();
            for (key, value) in self.info {
                info.set(key, super::pdf_service::text_string(&value));
            }
            let info_id = doc.add_object(info);
            doc.trailer.set("Info", Object::Reference(info_id));
        }

        doc.compress();
        save(&mut doc)
    }
}

fn add_catalog(doc: &mut Document, pages_id: ObjectId) -> ObjectId {
    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    doc.add_object(catalog)
}

/// Greedy word wrap using the font's average advance width.
pub fn wrap_text(text: &str, style: TextStyle, max_width: f32) -> Vec<String> {
    let advance = style.font.average_advance() * style.size;
    let max_chars = ((max_width / advance).floor() as usize).max(1);

    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split(' ') {
            let needed = if current.is_empty() {
                word.chars().count()
            } else {
                current.chars().count() + 1 + word.chars().count()
            };
            if needed > max_chars && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        lines.push(current);
    }
    lines
}

/// Map text onto WinAnsiEncoding, replacing anything unrepresentable with `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{20AC}' => 0x80,
            c if (c as u32) < 0x80 || (0xA0..=0xFF).contains(&(c as u32)) => c as u8,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn wraps_on_word_boundaries_and_newlines() {
        let style = TextStyle::new(StandardFont::Courier, 10.0);
        // Courier at 10pt is 6pt per glyph: 60pt fits ten characters.
        let lines = wrap_text("alpha beta gamma\ndelta", style, 60.0);
        assert_eq!(lines, vec!["alpha beta", "gamma", "delta"]);
    }

    #[test]
    fn keeps_blank_lines() {
        let style = TextStyle::new(StandardFont::Helvetica, 12.0);
        let lines = wrap_text("Title\n\nBody", style, 500.0);
        assert_eq!(lines, vec!["Title", "", "Body"]);
    }

    #[test]
    fn encodes_bullets_and_replaces_unknown_glyphs() {
        assert_eq!(encode_win_ansi("\u{2022} a"), vec![0x95, b' ', b'a']);
        assert_eq!(encode_win_ansi("caf\u{e9}"), b"caf\xe9".to_vec());
        assert_eq!(encode_win_ansi("\u{4e16}"), b"?".to_vec());
    }

    #[test]
    fn builds_loadable_document() {
        let mut first = PageCanvas::new(A4);
        first.text(50.0, 790.0, TextStyle::new(StandardFont::HelveticaBold, 18.0), "Hello");
        let mut second = PageCanvas::new((300.0, 400.0));
        second.rectangle(10.0, 10.0, 100.0, 20.0);

        let bytes = DocumentBuilder::new()
            .page(first)
            .page(second)
            .info("Title", "Fixture")
            .finish()
            .unwrap();

        assert!(bytes.starts_with(b"%PDF-1.5"));
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn empty_builder_is_an_error() {
        assert!(matches!(
            DocumentBuilder::new().finish(),
            Err(PdfError::NoPages)
        ));
    }
}
