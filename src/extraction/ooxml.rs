//! Text extraction for Office Open XML packages (DOCX and PPTX).
//!
//! Both formats are zip archives of XML parts; only text runs are read, all
//! formatting is ignored.

use std::collections::HashMap;
use std::io::{Cursor, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::ZipArchive;

use crate::types::{AppError, AppResult};

type Archive<'a> = ZipArchive<Cursor<&'a [u8]>>;

fn open_archive(bytes: &[u8]) -> Result<Archive<'_>, String> {
    ZipArchive::new(Cursor::new(bytes)).map_err(|e| e.to_string())
}

fn read_part(archive: &mut Archive<'_>, name: &str) -> Result<String, String> {
    let mut file = archive
        .by_name(name)
        .map_err(|e| format!("{}: {}", name, e))?;
    let mut xml = String::new();
    file.read_to_string(&mut xml).map_err(|e| e.to_string())?;
    Ok(xml)
}

fn local_name(e: &BytesStart<'_>) -> Vec<u8> {
    e.local_name().as_ref().to_vec()
}

/// Paragraph text followed by table text (cells space-joined, one row per line).
pub fn extract_docx(bytes: &[u8]) -> AppResult<String> {
    docx_text(bytes).map_err(|e| AppError::Extraction(format!("Failed to extract DOCX text: {}", e)))
}

fn docx_text(bytes: &[u8]) -> Result<String, String> {
    let mut archive = open_archive(bytes)?;
    let xml = read_part(&mut archive, "word/document.xml")?;
    let body = parse_docx_body(&xml)?;

    let mut text = String::new();
    for paragraph in &body.paragraphs {
        text.push_str(paragraph);
        text.push('\n');
    }
    for table in &body.tables {
        for row in table {
            for cell in row {
                text.push_str(cell);
                text.push(' ');
            }
            text.push('\n');
        }
    }
    Ok(text)
}

#[derive(Debug, Default)]
struct DocxBody {
    paragraphs: Vec<String>,
    tables: Vec<Vec<Vec<String>>>,
}

/// Where text runs currently land while walking `word/document.xml`.
enum DocxTarget {
    None,
    Paragraph { depth: usize, text: String },
    Table(TableState),
}

/// A top-level table; rows sit at `depth + 1`, cells at `depth + 2` and cell
/// paragraphs at `depth + 3`.
struct TableState {
    depth: usize,
    rows: Vec<Vec<String>>,
    cell_paragraphs: usize,
    in_cell_paragraph: bool,
}

impl TableState {
    fn new(depth: usize) -> Self {
        Self {
            depth,
            rows: Vec::new(),
            cell_paragraphs: 0,
            in_cell_paragraph: false,
        }
    }

    fn open(&mut self, name: &[u8], depth: usize) {
        match name {
            b"tr" if depth == self.depth + 1 => self.rows.push(Vec::new()),
            b"tc" if depth == self.depth + 2 => {
                if let Some(row) = self.rows.last_mut() {
                    row.push(String::new());
                }
                self.cell_paragraphs = 0;
            }
            b"p" if depth == self.depth + 3 => {
                if self.cell_paragraphs > 0 {
                    self.push_raw("\n");
                }
                self.cell_paragraphs += 1;
                self.in_cell_paragraph = true;
            }
            _ => {}
        }
    }

    fn close(&mut self, name: &[u8], depth: usize) {
        if name == b"p" && depth == self.depth + 3 {
            self.in_cell_paragraph = false;
        }
    }

    fn push_text(&mut self, s: &str) {
        // text of nested tables is not part of the enclosing cell
        if self.in_cell_paragraph {
            self.push_raw(s);
        }
    }

    fn push_raw(&mut self, s: &str) {
        if let Some(cell) = self.rows.last_mut().and_then(|row| row.last_mut()) {
            cell.push_str(s);
        }
    }
}

impl DocxTarget {
    fn open(&mut self, name: &[u8], depth: usize, parent_is_body: bool) {
        if let DocxTarget::Table(table) = self {
            table.open(name, depth);
            return;
        }
        if matches!(self, DocxTarget::None) && parent_is_body {
            if name == b"p" {
                *self = DocxTarget::Paragraph {
                    depth,
                    text: String::new(),
                };
            } else if name == b"tbl" {
                *self = DocxTarget::Table(TableState::new(depth));
            }
        }
    }

    fn push_text(&mut self, s: &str) {
        match self {
            DocxTarget::Paragraph { text, .. } => text.push_str(s),
            DocxTarget::Table(table) => table.push_text(s),
            DocxTarget::None => {}
        }
    }

    /// Closes the element at `depth`; returns the finished block, if any.
    fn close(&mut self, name: &[u8], depth: usize) -> Option<DocxTarget> {
        let finished = match self {
            DocxTarget::Paragraph { depth: d, .. } => *d == depth,
            DocxTarget::Table(table) => {
                table.close(name, depth);
                table.depth == depth
            }
            DocxTarget::None => false,
        };
        finished.then(|| std::mem::replace(self, DocxTarget::None))
    }
}

fn parent_is(stack: &[Vec<u8>], name: &[u8]) -> bool {
    stack.last().map(|p| p.as_slice()) == Some(name)
}

fn parse_docx_body(xml: &str) -> Result<DocxBody, String> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut target = DocxTarget::None;
    let mut body = DocxBody::default();

    loop {
        match reader.read_event().map_err(|e| e.to_string())? {
            Event::Start(e) => {
                let parent_is_body = parent_is(&stack, b"body");
                stack.push(local_name(&e));
                let depth = stack.len();
                target.open(&stack[depth - 1], depth, parent_is_body);
            }
            Event::Empty(e) => match e.local_name().as_ref() {
                b"tab" => target.push_text("\t"),
                b"br" | b"cr" => target.push_text("\n"),
                b"p" => {
                    // self-closing paragraph: open and close in one step
                    let parent_is_body = parent_is(&stack, b"body");
                    let depth = stack.len() + 1;
                    target.open(b"p", depth, parent_is_body);
                    if let Some(block) = target.close(b"p", depth) {
                        body.finish(block);
                    }
                }
                _ => {}
            },
            Event::Text(t) => {
                if parent_is(&stack, b"t") {
                    let s = t.unescape().map_err(|e| e.to_string())?;
                    target.push_text(&s);
                }
            }
            Event::End(_) => {
                let depth = stack.len();
                let name = stack.pop().unwrap_or_default();
                if let Some(block) = target.close(&name, depth) {
                    body.finish(block);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(body)
}

impl DocxBody {
    fn finish(&mut self, block: DocxTarget) {
        match block {
            DocxTarget::Paragraph { text, .. } => self.paragraphs.push(text),
            DocxTarget::Table(table) => self.tables.push(table.rows),
            DocxTarget::None => {}
        }
    }
}

/// Slide marker per slide followed by the text of each top-level text shape.
/// Returns the text and the slide count.
pub fn extract_pptx(bytes: &[u8]) -> AppResult<(String, usize)> {
    pptx_text(bytes).map_err(|e| AppError::Extraction(format!("Failed to extract PPTX text: {}", e)))
}

fn pptx_text(bytes: &[u8]) -> Result<(String, usize), String> {
    let mut archive = open_archive(bytes)?;
    let slides = slide_parts(&mut archive)?;

    let mut text = String::new();
    for (index, part) in slides.iter().enumerate() {
        text.push_str(&format!("\n--- Slide {} ---\n", index + 1));
        let xml = read_part(&mut archive, part)?;
        for shape in parse_slide_shapes(&xml)? {
            text.push_str(&shape);
            text.push('\n');
        }
    }
    Ok((text, slides.len()))
}

/// Slide part names in presentation order (`p:sldIdLst` resolved via the
/// presentation relationships).
fn slide_parts(archive: &mut Archive<'_>) -> Result<Vec<String>, String> {
    let presentation = read_part(archive, "ppt/presentation.xml")?;
    let rels = read_part(archive, "ppt/_rels/presentation.xml.rels")?;

    let mut targets: HashMap<String, String> = HashMap::new();
    let mut reader = Reader::from_str(&rels);
    loop {
        match reader.read_event().map_err(|e| e.to_string())? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                let id = attribute(&e, b"Id", false)?;
                let target = attribute(&e, b"Target", false)?;
                if let (Some(id), Some(target)) = (id, target) {
                    targets.insert(id, target);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let mut parts = Vec::new();
    let mut reader = Reader::from_str(&presentation);
    loop {
        match reader.read_event().map_err(|e| e.to_string())? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sldId" => {
                let rel_id = attribute(&e, b"id", true)?
                    .ok_or_else(|| "slide without relationship id".to_string())?;
                let target = targets
                    .get(&rel_id)
                    .ok_or_else(|| format!("missing relationship {}", rel_id))?;
                parts.push(match target.strip_prefix('/') {
                    Some(absolute) => absolute.to_string(),
                    None => format!("ppt/{}", target),
                });
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(parts)
}

/// Attribute value by local name; `prefixed` selects namespaced (`r:id`)
/// over bare (`id`) keys.
fn attribute(e: &BytesStart<'_>, name: &[u8], prefixed: bool) -> Result<Option<String>, String> {
    for attr in e.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        if attr.key.local_name().as_ref() == name && attr.key.prefix().is_some() == prefixed {
            let value = attr.unescape_value().map_err(|e| e.to_string())?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Text of each `p:sp` directly under the slide's shape tree, paragraphs
/// joined by newlines. Group shapes, pictures and graphic frames are skipped.
fn parse_slide_shapes(xml: &str) -> Result<Vec<String>, String> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut shapes = Vec::new();
    // (depth of the p:sp element, paragraphs collected so far)
    let mut current: Option<(usize, Vec<String>)> = None;

    loop {
        match reader.read_event().map_err(|e| e.to_string())? {
            Event::Start(e) => {
                let name = local_name(&e);
                let parent_is_tree = parent_is(&stack, b"spTree");
                if current.is_none() && parent_is_tree && name == b"sp" {
                    current = Some((stack.len() + 1, Vec::new()));
                } else if let Some((_, paragraphs)) = current.as_mut() {
                    if name == b"p" {
                        paragraphs.push(String::new());
                    }
                }
                stack.push(name);
            }
            Event::Empty(e) => {
                let name = e.local_name();
                let parent_is_tree = parent_is(&stack, b"spTree");
                if current.is_none() && parent_is_tree && name.as_ref() == b"sp" {
                    shapes.push(String::new());
                } else if let Some((_, paragraphs)) = current.as_mut() {
                    match name.as_ref() {
                        b"p" => paragraphs.push(String::new()),
                        b"br" => {
                            if let Some(last) = paragraphs.last_mut() {
                                last.push('\n');
                            }
                        }
                        _ => {}
                    }
                }
            }
            Event::Text(t) => {
                if let Some((_, paragraphs)) = current.as_mut() {
                    if parent_is(&stack, b"t") {
                        let s = t.unescape().map_err(|e| e.to_string())?;
                        if let Some(last) = paragraphs.last_mut() {
                            last.push_str(&s);
                        }
                    }
                }
            }
            Event::End(_) => {
                let closes_shape = matches!(&current, Some((depth, _)) if *depth == stack.len());
                if closes_shape {
                    if let Some((_, paragraphs)) = current.take() {
                        shapes.push(paragraphs.join("\n"));
                    }
                }
                stack.pop();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(shapes)
}
