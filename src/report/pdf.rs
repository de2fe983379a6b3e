// Minimal single-font-family PDF 1.4 writer
//
// Enough layout for text reports: fixed-height cells, word-wrapped paragraphs,
// centered titles and automatic page breaks on A4. Coordinates are in
// millimetres from the top-left corner, like a typical report layout API.

use std::fmt::Write as _;

const PAGE_WIDTH_MM: f64 = 210.0;
const PAGE_HEIGHT_MM: f64 = 297.0;
const MARGIN_MM: f64 = 10.0;
const BOTTOM_MARGIN_MM: f64 = 20.0;
const CELL_PADDING_MM: f64 = 1.0;
const PT_PER_MM: f64 = 72.0 / 25.4;

/// Average Helvetica glyph width as a fraction of the font size
const AVG_GLYPH_EM: f64 = 0.5;
const AVG_GLYPH_EM_BOLD: f64 = 0.55;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
}

impl FontStyle {
    fn resource(&self) -> &'static str {
        match self {
            FontStyle::Regular => "F1",
            FontStyle::Bold => "F2",
        }
    }

    fn glyph_em(&self) -> f64 {
        match self {
            FontStyle::Regular => AVG_GLYPH_EM,
            FontStyle::Bold => AVG_GLYPH_EM_BOLD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

pub struct PdfWriter {
    title: String,
    pages: Vec<String>,
    y: f64,
    style: FontStyle,
    size_pt: f64,
}

impl PdfWriter {
    pub fn new(title: &str) -> Self {
        PdfWriter {
            title: title.to_string(),
            pages: vec![String::new()],
            y: MARGIN_MM,
            style: FontStyle::Regular,
            size_pt: 12.0,
        }
    }

    pub fn set_font(&mut self, style: FontStyle, size_pt: f64) {
        self.style = style;
        self.size_pt = size_pt;
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Single-line cell spanning the printable width; moves to the next line.
    pub fn cell(&mut self, height_mm: f64, text: &str, align: Align) {
        self.break_if_needed(height_mm);

        let x = match align {
            Align::Left => MARGIN_MM + CELL_PADDING_MM,
            Align::Center => {
                let width = self.text_width_mm(text);
                MARGIN_MM + ((PAGE_WIDTH_MM - 2.0 * MARGIN_MM) - width) / 2.0
            }
        };
        self.put_text(x, height_mm, text);
        self.y += height_mm;
    }

    /// Word-wrapped paragraph, one `height_mm` line per wrapped row.
    pub fn multi_cell(&mut self, height_mm: f64, text: &str) {
        for line in self.wrap(text) {
            self.cell(height_mm, &line, Align::Left);
        }
    }

    /// Vertical gap
    pub fn ln(&mut self, height_mm: f64) {
        self.y += height_mm;
    }

    fn break_if_needed(&mut self, height_mm: f64) {
        if self.y + height_mm > PAGE_HEIGHT_MM - BOTTOM_MARGIN_MM {
            self.pages.push(String::new());
            self.y = MARGIN_MM;
        }
    }

    fn font_size_mm(&self) -> f64 {
        self.size_pt / PT_PER_MM
    }

    fn text_width_mm(&self, text: &str) -> f64 {
        text.chars().count() as f64 * self.font_size_mm() * self.style.glyph_em()
    }

    fn wrap(&self, text: &str) -> Vec<String> {
        let max_width = PAGE_WIDTH_MM - 2.0 * MARGIN_MM - 2.0 * CELL_PADDING_MM;
        let mut lines = Vec::new();
        let mut current = String::new();

        for word in text.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };

            if self.text_width_mm(&candidate) <= max_width || current.is_empty() {
                current = candidate;
            } else {
                lines.push(std::mem::replace(&mut current, word.to_string()));
            }
        }

        if !current.is_empty() || lines.is_empty() {
            lines.push(current);
        }
        lines
    }

    fn put_text(&mut self, x_mm: f64, height_mm: f64, text: &str) {
        // Baseline sits a little below the vertical centre of the cell
        let baseline_mm = self.y + height_mm / 2.0 + 0.3 * self.font_size_mm();
        let x_pt = x_mm * PT_PER_MM;
        let y_pt = (PAGE_HEIGHT_MM - baseline_mm) * PT_PER_MM;

        let resource = self.style.resource();
        let size = self.size_pt;
        let escaped = escape_text(text);
        if let Some(page) = self.pages.last_mut() {
            let _ = writeln!(
                page,
                "BT /{} {:.2} Tf {:.2} {:.2} Td ({}) Tj ET",
                resource, size, x_pt, y_pt, escaped
            );
        }
    }

    /// Serialize the document.
    pub fn finish(self) -> Vec<u8> {
        let mut objects: Vec<String> = Vec::new();
        let page_count = self.pages.len();
        let first_page_obj = 6;

        let kids: Vec<String> = (0..page_count)
            .map(|i| format!("{} 0 R", first_page_obj + i * 2))
            .collect();

        objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
        objects.push(format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            page_count
        ));
        objects.push(
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_string(),
        );
        objects.push(
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>"
                .to_string(),
        );
        objects.push(format!(
            "<< /Title ({}) /Producer (finfit) >>",
            escape_text(&self.title)
        ));

        let media_box = format!(
            "[0 0 {:.2} {:.2}]",
            PAGE_WIDTH_MM * PT_PER_MM,
            PAGE_HEIGHT_MM * PT_PER_MM
        );

        for (i, content) in self.pages.iter().enumerate() {
            let content_obj = first_page_obj + i * 2 + 1;
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox {} /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
                media_box, content_obj
            ));
            objects.push(format!(
                "<< /Length {} >>\nstream\n{}endstream",
                content.len(),
                content
            ));
        }

        let mut out: Vec<u8> = Vec::new();
        out.extend_from_slice(b"%PDF-1.4\n");

        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
        }

        let xref_at = out.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in &offsets {
            let _ = write!(xref, "{:010} 00000 n \n", offset);
        }
        let _ = write!(
            xref,
            "trailer\n<< /Size {} /Root 1 0 R /Info 5 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_at
        );
        out.extend_from_slice(xref.as_bytes());

        out
    }
}

/// Escape a string for a PDF literal. Latin-1 characters are written as
/// octal escapes (WinAnsi); anything else becomes '?'.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' | '(' | ')' => {
                out.push('\\');
                out.push(ch);
            }
            ' '..='~' => out.push(ch),
            '\u{a0}'..='\u{ff}' => {
                let _ = write!(out, "\\{:03o}", ch as u32);
            }
            _ => out.push('?'),
        }
    }
    out
}

// ============================================================================
// TESTS
// ============================================================================
