//! Page layout for attendance sheets.
//!
//! Coordinates are millimetres from the top-left corner of an A4 page.
//! The renderer flips the y axis when it writes the PDF.

use crate::model::AttendanceRecord;
use crate::roster::{self, OFFICIALS};

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
pub const MARGIN_MM: f32 = 14.0;

pub const INSTITUTION: &str = "SK KG KLID/PLAJAU, DALAT";
pub const PROGRAM: &str = "PROGRAM KELAS BIMBINGAN DAN GILAP PERMATA";
pub const PRESENT_LABEL: &str = "HADIR";
pub const ABSENT_LABEL: &str = "TIDAK HADIR";
pub const TABLE_HEAD: [&str; 4] = ["BIL", "NAMA MURID", "TAHUN", "STATUS KEHADIRAN"];

const SIGNATURE_LINE: &str = "__________________________";
const SIGNATURE_NAME_WIDTH_MM: f32 = 50.0;
const ROW_HEIGHT_MM: f32 = 7.0;
const CELL_PADDING_MM: f32 = 2.0;
const TABLE_FONT_PT: f32 = 8.0;
const COLUMN_WIDTHS_MM: [f32; 4] = [10.0, 102.0, 30.0, 40.0];
const PT_TO_MM: f32 = 0.3528;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Colour(pub u8, pub u8, pub u8);

pub const BLACK: Colour = Colour(0, 0, 0);
pub const WHITE: Colour = Colour(255, 255, 255);
pub const PRESENT_GREEN: Colour = Colour(0, 128, 0);
pub const ABSENT_RED: Colour = Colour(200, 0, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weight {
    Regular,
    Bold,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Text {
        x: f32,
        y: f32,
        size: f32,
        weight: Weight,
        colour: Colour,
        align: Align,
        text: String,
    },
    Rule {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
    },
    /// Grid cell with its top-left corner at (x, y); `fill` paints it first.
    Cell {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        fill: Option<Colour>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Record,
    TableContinuation,
    Confirmation,
}

#[derive(Debug, Clone)]
pub struct Page {
    pub record_id: String,
    pub kind: PageKind,
    pub items: Vec<Item>,
}

impl Page {
    fn new(record_id: &str, kind: PageKind) -> Self {
        Self {
            record_id: record_id.to_string(),
            kind,
            items: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.items.iter().filter_map(|i| match i {
            Item::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct DocumentLayout {
    pub pages: Vec<Page>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Present,
    Absent,
}

impl Presence {
    pub fn label(self) -> &'static str {
        match self {
            Presence::Present => PRESENT_LABEL,
            Presence::Absent => ABSENT_LABEL,
        }
    }

    fn colour(self) -> Colour {
        match self {
            Presence::Present => PRESENT_GREEN,
            Presence::Absent => ABSENT_RED,
        }
    }

    fn weight(self) -> Weight {
        match self {
            Presence::Present => Weight::Bold,
            Presence::Absent => Weight::Regular,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    pub number: usize,
    pub name: String,
    pub year_label: String,
    pub status: Presence,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignatureBlock {
    pub caption: &'static str,
    pub name: String,
    pub role: &'static str,
    pub name_bold: bool,
}

/// Everything printed for one record, before positioning.
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceSheet {
    pub record_id: String,
    pub date: String,
    pub subtitle: String,
    pub subject_line: String,
    pub teacher_line: String,
    pub links: Vec<String>,
    pub rows: Vec<SheetRow>,
    pub signatures: [SignatureBlock; 3],
}

/// One row per roster pupil, whatever keys the record's map carries.
pub fn build_sheet(record: &AttendanceRecord) -> AttendanceSheet {
    let rows = roster::all_pupils()
        .iter()
        .enumerate()
        .map(|(i, p)| SheetRow {
            number: i + 1,
            name: p.name.clone(),
            year_label: format!("TAHUN {}", p.year),
            status: if record.is_present(&p.id) {
                Presence::Present
            } else {
                Presence::Absent
            },
        })
        .collect();

    AttendanceSheet {
        record_id: record.id.clone(),
        date: record.date.clone(),
        subtitle: format!("REKOD KEHADIRAN: {} ({})", record.date, record.time),
        subject_line: format!("SUBJEK: {}", record.subject.as_str().to_uppercase()),
        teacher_line: format!("GURU PEMBIMBING: {}", record.teacher.to_uppercase()),
        links: record.teaching_material_links.clone(),
        rows,
        signatures: [
            SignatureBlock {
                caption: "Disediakan oleh,",
                name: record.teacher.clone(),
                role: "Guru Pembimbing",
                name_bold: false,
            },
            SignatureBlock {
                caption: "Disemak oleh,",
                name: OFFICIALS.coordinator.to_string(),
                role: "Penolong Kanan Pentadbiran",
                name_bold: true,
            },
            SignatureBlock {
                caption: "Disahkan oleh,",
                name: OFFICIALS.headmaster.to_string(),
                role: "Guru Besar",
                name_bold: true,
            },
        ],
    }
}

/// Approximate Helvetica advance width; good enough for centring and wrapping.
pub fn text_width_mm(text: &str, size_pt: f32, weight: Weight) -> f32 {
    let em = size_pt * PT_TO_MM;
    let factor = match weight {
        Weight::Regular => 0.5,
        Weight::Bold => 0.55,
    };
    text.chars().count() as f32 * em * factor
}

pub fn wrap_text(text: &str, max_mm: f32, size_pt: f32, weight: Weight) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut cur = String::new();
    for word in text.split_whitespace() {
        let candidate = if cur.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", cur, word)
        };
        if !cur.is_empty() && text_width_mm(&candidate, size_pt, weight) > max_mm {
            lines.push(std::mem::take(&mut cur));
            cur = word.to_string();
        } else {
            cur = candidate;
        }
    }
    if !cur.is_empty() {
        lines.push(cur);
    }
    lines
}

fn fit_text(text: &str, max_mm: f32, size_pt: f32, weight: Weight) -> String {
    if text_width_mm(text, size_pt, weight) <= max_mm {
        return text.to_string();
    }
    let mut out: String = text.chars().collect();
    while !out.is_empty() && text_width_mm(&format!("{}...", out), size_pt, weight) > max_mm {
        out.pop();
    }
    format!("{}...", out)
}

struct Cursor {
    pages: Vec<Page>,
}

impl Cursor {
    fn page(&mut self) -> &mut Page {
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn start(&mut self, record_id: &str, kind: PageKind) {
        self.pages.push(Page::new(record_id, kind));
    }

    #[allow(clippy::too_many_arguments)]
    fn text(&mut self, x: f32, y: f32, size: f32, weight: Weight, colour: Colour, align: Align, text: &str) {
        self.page().items.push(Item::Text {
            x,
            y,
            size,
            weight,
            colour,
            align,
            text: text.to_string(),
        });
    }
}

fn draw_header(c: &mut Cursor, subtitle: &str) {
    let mid = PAGE_WIDTH_MM / 2.0;
    c.text(mid, 15.0, 14.0, Weight::Bold, BLACK, Align::Center, INSTITUTION);
    c.text(mid, 22.0, 11.0, Weight::Bold, BLACK, Align::Center, PROGRAM);
    c.text(mid, 28.0, 10.0, Weight::Regular, BLACK, Align::Center, subtitle);
    c.page().items.push(Item::Rule {
        x1: MARGIN_MM,
        y1: 32.0,
        x2: PAGE_WIDTH_MM - MARGIN_MM,
        y2: 32.0,
    });
}

fn draw_row(c: &mut Cursor, y: f32, cells: [(&str, Colour, Weight); 4], fill: Option<Colour>) {
    let mut x = MARGIN_MM;
    for (col, (text, colour, weight)) in cells.into_iter().enumerate() {
        let w = COLUMN_WIDTHS_MM[col];
        c.page().items.push(Item::Cell {
            x,
            y,
            w,
            h: ROW_HEIGHT_MM,
            fill,
        });
        let baseline = y + ROW_HEIGHT_MM - CELL_PADDING_MM - 0.6;
        if col == 1 {
            let fitted = fit_text(text, w - 2.0 * CELL_PADDING_MM, TABLE_FONT_PT, weight);
            c.text(x + CELL_PADDING_MM, baseline, TABLE_FONT_PT, weight, colour, Align::Left, &fitted);
        } else {
            c.text(x + w / 2.0, baseline, TABLE_FONT_PT, weight, colour, Align::Center, text);
        }
        x += w;
    }
}

fn draw_head_row(c: &mut Cursor, y: f32) {
    let cells = TABLE_HEAD.map(|h| (h, WHITE, Weight::Bold));
    draw_row(c, y, cells, Some(BLACK));
}

fn draw_signatures(c: &mut Cursor, sheet: &AttendanceSheet, sig_y: f32) {
    let columns = [MARGIN_MM, PAGE_WIDTH_MM / 2.0 - 20.0, PAGE_WIDTH_MM - 60.0];
    for (block, x) in sheet.signatures.iter().zip(columns) {
        c.text(x, sig_y, 9.0, Weight::Bold, BLACK, Align::Left, block.caption);
        c.text(x, sig_y + 15.0, 9.0, Weight::Bold, BLACK, Align::Left, SIGNATURE_LINE);

        let weight = if block.name_bold {
            Weight::Bold
        } else {
            Weight::Regular
        };
        let lines = wrap_text(&block.name, SIGNATURE_NAME_WIDTH_MM, 9.0, weight);
        let mut y = sig_y + 20.0;
        for line in &lines {
            c.text(x, y, 9.0, weight, BLACK, Align::Left, line);
            y += 4.0;
        }
        let role_y = (sig_y + 24.0).max(y);
        c.text(x, role_y, 9.0, Weight::Regular, BLACK, Align::Left, block.role);
    }
}

fn layout_sheet(c: &mut Cursor, sheet: &AttendanceSheet) {
    let content_width = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
    c.start(&sheet.record_id, PageKind::Record);
    draw_header(c, &sheet.subtitle);

    let mut y = 40.0;
    c.text(MARGIN_MM, y, 9.0, Weight::Bold, BLACK, Align::Left, &sheet.subject_line);
    c.text(MARGIN_MM, y + 5.0, 9.0, Weight::Bold, BLACK, Align::Left, &sheet.teacher_line);
    y += 12.0;

    if !sheet.links.is_empty() {
        c.text(MARGIN_MM, y, 8.0, Weight::Bold, BLACK, Align::Left, "Pautan Bahan Mengajar:");
        y += 4.0;
        for (i, link) in sheet.links.iter().enumerate() {
            let line = fit_text(&format!("{}. {}", i + 1, link), content_width, 8.0, Weight::Regular);
            c.text(MARGIN_MM, y, 8.0, Weight::Regular, BLACK, Align::Left, &line);
            y += 4.0;
        }
        y += 4.0;
    }

    let table_bottom = PAGE_HEIGHT_MM - MARGIN_MM;
    draw_head_row(c, y);
    y += ROW_HEIGHT_MM;
    for row in &sheet.rows {
        if y + ROW_HEIGHT_MM > table_bottom {
            c.start(&sheet.record_id, PageKind::TableContinuation);
            y = MARGIN_MM;
            draw_head_row(c, y);
            y += ROW_HEIGHT_MM;
        }
        let number = row.number.to_string();
        draw_row(
            c,
            y,
            [
                (number.as_str(), BLACK, Weight::Regular),
                (row.name.as_str(), BLACK, Weight::Regular),
                (row.year_label.as_str(), BLACK, Weight::Regular),
                (row.status.label(), row.status.colour(), row.status.weight()),
            ],
            None,
        );
        y += ROW_HEIGHT_MM;
    }

    let mut sig_y = y + 20.0;
    if sig_y > PAGE_HEIGHT_MM - 50.0 {
        c.start(&sheet.record_id, PageKind::Confirmation);
        draw_header(c, &format!("PENGESAHAN REKOD: {}", sheet.date));
        sig_y = 50.0;
    }
    draw_signatures(c, sheet, sig_y);
}

/// Lays out every record starting on its own page, in the given order.
pub fn layout_document(records: &[&AttendanceRecord]) -> DocumentLayout {
    let mut c = Cursor { pages: Vec::new() };
    for record in records {
        layout_sheet(&mut c, &build_sheet(record));
    }
    DocumentLayout { pages: c.pages }
}
