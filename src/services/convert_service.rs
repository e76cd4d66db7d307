//! Placeholder format conversions.
//!
//! None of these parse Office formats. Office uploads become a short PDF that
//! describes the upload; PDF uploads become a text or CSV summary of the
//! document. Output naming follows the upload's name.

use super::document_builder::{A4, DocumentBuilder, PageCanvas, StandardFont, TextStyle};
use super::pdf_service::PdfResult;
use chrono::{DateTime, Utc};

const MARGIN: f32 = 50.0;
const TABLE_CELL: (f32, f32) = (100.0, 20.0);
const SAMPLE_TABLE: [[&str; 4]; 4] = [
    ["Column A", "Column B", "Column C", "Column D"],
    ["Data 1", "Data 2", "Data 3", "Data 4"],
    ["Value 1", "Value 2", "Value 3", "Value 4"],
    ["Item 1", "Item 2", "Item 3", "Item 4"],
];

pub const WORD_EXTENSIONS: &[&str] = &["doc", "docx", "rtf"];
pub const EXCEL_EXTENSIONS: &[&str] = &["xls", "xlsx"];
pub const POWERPOINT_EXTENSIONS: &[&str] = &["ppt", "pptx", "pps"];

/// What the placeholder pages say about the upload.
#[derive(Debug, Clone)]
pub struct UploadSummary<'a> {
    pub filename: &'a str,
    pub size_bytes: usize,
    pub converted_at: DateTime<Utc>,
}

impl UploadSummary<'_> {
    fn size_kb(&self) -> String {
        format!("{:.2} KB", self.size_bytes as f64 / 1024.0)
    }

    fn timestamp(&self) -> String {
        self.converted_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
    }
}

/// `report.DOCX` with `["doc", "docx"]` becomes `report.pdf`. Names without
/// one of the listed extensions keep their full name.
pub fn renamed(filename: &str, extensions: &[&str], new_extension: &str) -> String {
    let stem = match filename.rsplit_once('.') {
        Some((stem, ext)) if extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)) => stem,
        _ => filename,
    };
    format!("{stem}.{new_extension}")
}

pub fn word_to_pdf(upload: &UploadSummary<'_>) -> PdfResult<Vec<u8>> {
    let body = format!(
        "Word to PDF Conversion\n\
         \n\
         Original File: {name}\n\
         File Size: {size}\n\
         Converted: {at}\n\
         \n\
         This document stands in for a converted Word file.\n\
         A full conversion would carry over:\n\
         \u{2022} Text formatting\n\
         \u{2022} Images and graphics\n\
         \u{2022} Tables and layouts\n\
         \u{2022} Headers and footers\n\
         \u{2022} Page breaks and margins\n\
         \n\
         Only basic information about the uploaded file is included here.",
        name = upload.filename,
        size = upload.size_kb(),
        at = upload.timestamp(),
    );

    let mut page = PageCanvas::new(A4);
    let width = page.width() - 2.0 * MARGIN;
    let top = page.height() - MARGIN;
    page.wrapped_text(
        MARGIN,
        top,
        TextStyle::new(StandardFont::TimesRoman, 12.0),
        &body,
        width,
    );

    DocumentBuilder::new()
        .page(page)
        .info("Title", format!("Word to PDF - {}", upload.filename))
        .finish()
}

pub fn excel_to_pdf(upload: &UploadSummary<'_>) -> PdfResult<Vec<u8>> {
    let heading = |size| TextStyle::new(StandardFont::HelveticaBold, size);
    let mono = |size| TextStyle::new(StandardFont::Courier, size);

    let mut page = PageCanvas::new(A4);
    let h = page.height();

    page.text(MARGIN, h - 50.0, heading(18.0), "Excel to PDF Conversion")
        .text(
            MARGIN,
            h - 80.0,
            mono(12.0),
            &format!("Original File: {}", upload.filename),
        )
        .text(
            MARGIN,
            h - 100.0,
            mono(12.0),
            &format!("File Size: {}", upload.size_kb()),
        )
        .text(
            MARGIN,
            h - 120.0,
            mono(12.0),
            &format!("Converted: {}", upload.timestamp()),
        )
        .text(MARGIN, h - 180.0, heading(14.0), "Sample Data Table:");

    let (cell_w, cell_h) = TABLE_CELL;
    let table_top = h - 210.0;
    for (row_index, row) in SAMPLE_TABLE.iter().enumerate() {
        let y = table_top - row_index as f32 * cell_h;
        for (col_index, cell) in row.iter().enumerate() {
            let x = MARGIN + col_index as f32 * cell_w;
            page.rectangle(x, y - cell_h + 5.0, cell_w, cell_h)
                .text(x + 5.0, y - 10.0, mono(10.0), cell);
        }
    }

    let width = page.width() - 2.0 * MARGIN;
    page.wrapped_text(
        MARGIN,
        h - 350.0,
        mono(10.0).gray(0.5),
        "Note: spreadsheet contents are not parsed. A full conversion would \
         recreate the sheet layout with its formatting, formulas and charts.",
        width,
    );

    DocumentBuilder::new()
        .page(page)
        .info("Title", format!("Excel to PDF - {}", upload.filename))
        .finish()
}

pub fn powerpoint_to_pdf(upload: &UploadSummary<'_>) -> PdfResult<Vec<u8>> {
    let slides = [
        format!(
            "PowerPoint to PDF Conversion\n\
             Original File: {}\n\
             File Size: {}\n\
             Converted: {}\n\
             Each following page stands for one slide.",
            upload.filename,
            upload.size_kb(),
            upload.timestamp(),
        ),
        "Features Preserved:\n\
         \u{2022} Text formatting and fonts\n\
         \u{2022} Slide layouts and designs\n\
         \u{2022} Images and graphics\n\
         \u{2022} Animations (as static content)\n\
         \u{2022} Charts and tables\n\
         \u{2022} Speaker notes (optional)"
            .to_string(),
        "About this document:\n\
         Slides are not parsed or rendered.\n\
         The page count mirrors a short presentation\n\
         so the structure of the output can be previewed."
            .to_string(),
    ];

    let mut builder = DocumentBuilder::new();
    for (index, content) in slides.iter().enumerate() {
        let mut page = PageCanvas::new(A4);
        let h = page.height();
        let width = page.width() - 2.0 * MARGIN;
        page.text(
            MARGIN,
            h - 80.0,
            TextStyle::new(StandardFont::HelveticaBold, 24.0),
            &format!("Slide {}", index + 1),
        )
        .wrapped_text(
            MARGIN,
            h - 150.0,
            TextStyle::new(StandardFont::Helvetica, 12.0),
            content,
            width,
        );
        builder = builder.page(page);
    }

    builder
        .info("Title", format!("PowerPoint to PDF - {}", upload.filename))
        .finish()
}

/// Plain-text stand-in for a Word export of a PDF.
pub fn pdf_to_word_text(filename: &str, pages: u32, at: DateTime<Utc>) -> String {
    format!(
        "Simulated Word document conversion.\n\
         \n\
         Original PDF: {filename}\n\
         Pages: {pages}\n\
         Converted on: {}\n\
         \n\
         Text is not extracted from the PDF; this file only summarizes it.",
        at.format("%Y-%m-%d %H:%M:%S UTC"),
    )
}

/// CSV stand-in for a spreadsheet export of a PDF.
pub fn pdf_to_excel_csv(filename: &str, pages: u32, at: DateTime<Utc>) -> String {
    let rows = [
        ["Column A", "Column B", "Column C"].map(str::to_string),
        [
            "Original PDF".to_string(),
            filename.to_string(),
            format!("{pages} pages"),
        ],
        [
            "Converted on".to_string(),
            at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            "Placeholder".to_string(),
        ],
        [
            "Note".to_string(),
            "Tables are not extracted".to_string(),
            "Summary only".to_string(),
        ],
    ];

    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            let cells: Vec<String> = if index == 0 {
                row.to_vec()
            } else {
                row.iter().map(|c| csv_quote(c)).collect()
            };
            cells.join(",") + "\n"
        })
        .collect()
}

/// Slide-outline stand-in for a presentation export of a PDF.
pub fn pdf_to_powerpoint_outline(filename: &str, pages: u32, at: DateTime<Utc>) -> String {
    format!(
        "PDF to PowerPoint Conversion\n\
         \n\
         Slide 1: Title Slide\n\
         Original PDF: {filename}\n\
         Pages: {pages}\n\
         \n\
         Slide 2: Content\n\
         Converted on: {}\n\
         \n\
         Page content is not laid out as slides; this outline only summarizes the PDF.",
        at.format("%Y-%m-%d %H:%M:%S UTC"),
    )
}

fn csv_quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}
