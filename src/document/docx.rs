/*!
 * `.docx` documents edited in place.
 *
 * A `.docx` file is a zip package; all visible body text lives in
 * `word/document.xml`. The part is kept as a flat list of XML events so that
 * replacing text touches only the text events involved, and every other
 * byte of markup is written back exactly as read. Other package entries are
 * copied raw when saving.
 */

use log::debug;
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesStart, BytesText, Event};
use std::io::{Cursor, Read, Write};
use std::path::Path;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::errors::DocumentError;
use super::{FragmentLocation, TextDocument};

/// Package entry holding the main document body
pub const DOCUMENT_PART: &str = "word/document.xml";

const BODY: &[u8] = b"w:body";
const TABLE: &[u8] = b"w:tbl";
const ROW: &[u8] = b"w:tr";
const CELL: &[u8] = b"w:tc";
const RUN: &[u8] = b"w:r";

/// One text event inside a `w:t` element
#[derive(Debug, Clone)]
struct TextSlot {
    /// Index of the enclosing `w:t` start event
    start: usize,
    /// Index of the text event
    event: usize,
    /// Unescaped text
    text: String,
}

/// A piece of paragraph content in document order
#[derive(Debug, Clone)]
enum Piece {
    Text(TextSlot),
    /// `w:br`, `w:cr` or `w:tab` inside a run, read as `\n` or `\t`
    Separator { event: usize, ch: char },
}

#[derive(Debug, Clone, Default)]
struct Paragraph {
    pieces: Vec<Piece>,
}

impl Paragraph {
    fn text(&self) -> String {
        self.pieces
            .iter()
            .map(|piece| match piece {
                Piece::Text(slot) => slot.text.clone(),
                Piece::Separator { ch, .. } => ch.to_string(),
            })
            .collect()
    }

    fn has_slot(&self) -> bool {
        self.pieces.iter().any(|piece| matches!(piece, Piece::Text(_)))
    }

    fn separators(&self) -> Vec<char> {
        self.pieces
            .iter()
            .filter_map(|piece| match piece {
                Piece::Separator { ch, .. } => Some(*ch),
                Piece::Text(_) => None,
            })
            .collect()
    }

    /// New text per piece when `text` has the same separators in the same
    /// order and every non-empty segment has a run to land in
    fn distribute(&self, text: &str) -> Option<Vec<String>> {
        let mut segments = vec![String::new()];
        let mut separators = Vec::new();
        for ch in text.chars() {
            if ch == '\n' || ch == '\t' {
                separators.push(ch);
                segments.push(String::new());
            } else if let Some(last) = segments.last_mut() {
                last.push(ch);
            }
        }
        if separators != self.separators() {
            return None;
        }

        let mut values = vec![String::new(); self.pieces.len()];
        let mut group = 0;
        let mut filled = false;
        for (i, piece) in self.pieces.iter().enumerate() {
            match piece {
                Piece::Separator { .. } => {
                    if !filled && !segments[group].is_empty() {
                        return None;
                    }
                    group += 1;
                    filled = false;
                }
                Piece::Text(_) if !filled => {
                    values[i] = std::mem::take(&mut segments[group]);
                    filled = true;
                }
                Piece::Text(_) => {}
            }
        }
        if !filled && !segments[group].is_empty() {
            return None;
        }
        Some(values)
    }
}

/// Tracked paragraphs and where they sit
#[derive(Debug, Default)]
struct Layout {
    paragraphs: Vec<Paragraph>,
    /// Body-level paragraph ids in order
    body: Vec<usize>,
    /// Tables, rows, cells, paragraph ids
    tables: Vec<Vec<Vec<Vec<usize>>>>,
}

impl Layout {
    /// Track a `w:p` opened at `path`, returning its id when it is a body or cell paragraph
    fn register_paragraph(&mut self, path: &[Vec<u8>]) -> Option<usize> {
        let id = self.paragraphs.len();

        if ends_with(path, &[BODY]) {
            self.body.push(id);
        } else if ends_with(path, &[BODY, TABLE, ROW, CELL]) {
            self.tables.last_mut()?.last_mut()?.last_mut()?.push(id);
        } else {
            return None;
        }

        self.paragraphs.push(Paragraph::default());
        Some(id)
    }

    fn register_container(&mut self, name: &[u8], path: &[Vec<u8>]) {
        if name == TABLE && ends_with(path, &[BODY]) {
            self.tables.push(Vec::new());
        } else if name == ROW && ends_with(path, &[BODY, TABLE]) {
            if let Some(table) = self.tables.last_mut() {
                table.push(Vec::new());
            }
        } else if name == CELL && ends_with(path, &[BODY, TABLE, ROW]) {
            if let Some(row) = self.tables.last_mut().and_then(|t| t.last_mut()) {
                row.push(Vec::new());
            }
        }
    }
}

fn ends_with(path: &[Vec<u8>], tail: &[&[u8]]) -> bool {
    path.len() >= tail.len()
        && path[path.len() - tail.len()..]
            .iter()
            .zip(tail)
            .all(|(open, expected)| open.as_slice() == *expected)
}

/// An open `w:t` element while parsing
struct OpenRun {
    start: usize,
    owner: Option<usize>,
    has_text: bool,
}

/// Read `word/document.xml` into owned events plus the paragraph layout
fn parse_document(xml: &str) -> Result<(Vec<Event<'static>>, Layout), DocumentError> {
    let mut reader = Reader::from_str(xml);
    let mut events: Vec<Event<'static>> = Vec::new();
    let mut layout = Layout::default();
    let mut path: Vec<Vec<u8>> = Vec::new();
    // Nearest open w:p last; None for paragraphs that are not tracked
    let mut open_paragraphs: Vec<Option<usize>> = Vec::new();
    let mut open_run: Option<OpenRun> = None;

    loop {
        let event = reader.read_event()?;
        match &event {
            Event::Eof => break,
            Event::Start(start) => {
                let name = start.name().as_ref().to_vec();
                match name.as_slice() {
                    b"w:p" => open_paragraphs.push(layout.register_paragraph(&path)),
                    b"w:t" => {
                        open_run = Some(OpenRun {
                            start: events.len(),
                            owner: open_paragraphs.last().copied().flatten(),
                            has_text: false,
                        })
                    }
                    other => layout.register_container(other, &path),
                }
                path.push(name);
            }
            Event::Empty(start) if start.name().as_ref() == b"w:p" => {
                layout.register_paragraph(&path);
            }
            Event::Empty(start) if ends_with(&path, &[RUN]) => {
                if let (Some(ch), Some(Some(owner))) = (separator_char(start), open_paragraphs.last()) {
                    layout.paragraphs[*owner].pieces.push(Piece::Separator {
                        event: events.len(),
                        ch,
                    });
                }
            }
            Event::Text(text) => {
                if let Some(run) = open_run.as_mut() {
                    run.has_text = true;
                    if let Some(owner) = run.owner {
                        layout.paragraphs[owner].pieces.push(Piece::Text(TextSlot {
                            start: run.start,
                            event: events.len(),
                            text: text.unescape()?.into_owned(),
                        }));
                    }
                }
            }
            Event::End(end) => {
                match end.name().as_ref() {
                    b"w:t" => {
                        // Give empty runs a text event so they can receive text later
                        if let Some(run) = open_run.take() {
                            if let (false, Some(owner)) = (run.has_text, run.owner) {
                                layout.paragraphs[owner].pieces.push(Piece::Text(TextSlot {
                                    start: run.start,
                                    event: events.len(),
                                    text: String::new(),
                                }));
                                events.push(Event::Text(BytesText::new("")));
                            }
                        }
                    }
                    b"w:p" => {
                        open_paragraphs.pop();
                    }
                    _ => {}
                }
                path.pop();
            }
            _ => {}
        }
        events.push(event.into_owned());
    }

    Ok((events, layout))
}

/// Text a run-level empty element stands for; page and column breaks add none
fn separator_char(element: &BytesStart) -> Option<char> {
    match element.name().as_ref() {
        b"w:tab" => Some('\t'),
        b"w:cr" => Some('\n'),
        b"w:br" => {
            let text_wrapping = element
                .attributes()
                .flatten()
                .find(|attr| attr.key.as_ref() == b"w:type")
                .is_none_or(|attr| attr.value.as_ref() == b"textWrapping");
            text_wrapping.then_some('\n')
        }
        _ => None,
    }
}

/// Make sure a `w:t` start event carries `xml:space="preserve"`
fn ensure_space_preserve(event: &mut Event<'static>) {
    let Event::Start(start) = event else {
        return;
    };

    let preserved = start
        .attributes()
        .flatten()
        .any(|attr| attr.key.as_ref() == b"xml:space" && attr.value.as_ref() == b"preserve");
    if preserved {
        return;
    }

    let mut updated = BytesStart::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attr in start.attributes().flatten() {
        if attr.key.as_ref() != b"xml:space" {
            updated.push_attribute(attr);
        }
    }
    updated.push_attribute(("xml:space", "preserve"));
    *start = updated;
}

/// A `.docx` package whose paragraphs and table cells can be rewritten
#[derive(Debug)]
pub struct DocxDocument {
    /// Package bytes as read
    source: Vec<u8>,
    /// Events of `word/document.xml`
    events: Vec<Event<'static>>,
    layout: Layout,
    /// Whether any text event was replaced
    dirty: bool,
}

impl DocxDocument {
    /// Open a `.docx` file from disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DocumentError> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_bytes(bytes)
    }

    /// Read a `.docx` package from memory
    pub fn from_bytes(source: Vec<u8>) -> Result<Self, DocumentError> {
        let xml = {
            let mut archive = ZipArchive::new(Cursor::new(source.as_slice()))?;
            let mut part = match archive.by_name(DOCUMENT_PART) {
                Ok(part) => part,
                Err(ZipError::FileNotFound) => {
                    return Err(DocumentError::MissingPart(DOCUMENT_PART.to_string()));
                }
                Err(e) => return Err(e.into()),
            };
            let mut xml = String::new();
            part.read_to_string(&mut xml)?;
            xml
        };

        let (events, layout) = parse_document(&xml)?;
        debug!(
            "Indexed {} paragraphs and {} tables in {}",
            layout.body.len(),
            layout.tables.len(),
            DOCUMENT_PART
        );

        Ok(Self {
            source,
            events,
            layout,
            dirty: false,
        })
    }

    /// Whether any text has been replaced since loading
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Serialise the current `word/document.xml`
    pub fn document_xml(&self) -> Result<String, DocumentError> {
        let mut writer = Writer::new(Vec::new());
        for event in &self.events {
            writer.write_event(event)?;
        }
        String::from_utf8(writer.into_inner())
            .map_err(|e| DocumentError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
    }

    /// Build the package bytes, rewriting only the document part
    pub fn to_bytes(&self) -> Result<Vec<u8>, DocumentError> {
        if !self.dirty {
            return Ok(self.source.clone());
        }

        let document_xml = self.document_xml()?;
        let mut archive = ZipArchive::new(Cursor::new(self.source.as_slice()))?;
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for i in 0..archive.len() {
            let entry = archive.by_index_raw(i)?;
            if entry.name() == DOCUMENT_PART {
                drop(entry);
                writer.start_file(DOCUMENT_PART, options)?;
                writer.write_all(document_xml.as_bytes())?;
            } else {
                writer.raw_copy_file(entry)?;
            }
        }

        Ok(writer.finish()?.into_inner())
    }

    /// Write the package to `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), DocumentError> {
        std::fs::write(path.as_ref(), self.to_bytes()?)?;
        Ok(())
    }

    fn body_paragraph(&self, index: usize) -> Result<usize, DocumentError> {
        self.layout
            .body
            .get(index)
            .copied()
            .ok_or_else(|| DocumentError::InvalidLocation(FragmentLocation::Paragraph { index }.to_string()))
    }

    fn row(&self, table: usize, row: usize) -> Result<&Vec<Vec<usize>>, DocumentError> {
        self.layout
            .tables
            .get(table)
            .and_then(|t| t.get(row))
            .ok_or_else(|| DocumentError::InvalidLocation(format!("table {} row {}", table, row)))
    }

    fn cell_paragraphs(&self, table: usize, row: usize, cell: usize) -> Result<Vec<usize>, DocumentError> {
        self.row(table, row)?.get(cell).cloned().ok_or_else(|| {
            DocumentError::InvalidLocation(FragmentLocation::TableCell { table, row, cell }.to_string())
        })
    }

    /// Replace a paragraph's text
    ///
    /// When `text` keeps the paragraph's breaks and tabs, each segment goes
    /// into the first run between them. Otherwise the separators are removed
    /// and the whole text, with breaks and tabs turned into spaces, goes into
    /// the first run.
    fn write_paragraph(&mut self, id: usize, text: &str, location: FragmentLocation) -> Result<(), DocumentError> {
        let paragraph = &self.layout.paragraphs[id];
        if paragraph.text() == text {
            return Ok(());
        }
        if !paragraph.has_slot() {
            if text.is_empty() {
                return Ok(());
            }
            return Err(DocumentError::NoTextRun(location.to_string()));
        }

        let (values, keep_separators) = match paragraph.distribute(text) {
            Some(values) => (values, true),
            None => {
                let flattened = text.replace(['\n', '\t'], " ");
                let mut values = vec![String::new(); paragraph.pieces.len()];
                if let Some(first) = paragraph.pieces.iter().position(|p| matches!(p, Piece::Text(_))) {
                    values[first] = flattened;
                }
                (values, false)
            }
        };

        let pieces = std::mem::take(&mut self.layout.paragraphs[id].pieces);
        let mut kept = Vec::with_capacity(pieces.len());
        for (piece, value) in pieces.into_iter().zip(values) {
            match piece {
                Piece::Text(mut slot) => {
                    if slot.text != value {
                        self.events[slot.event] = Event::Text(BytesText::new(&value).into_owned());
                        if !value.is_empty() {
                            ensure_space_preserve(&mut self.events[slot.start]);
                        }
                        slot.text = value;
                    }
                    kept.push(Piece::Text(slot));
                }
                Piece::Separator { event, .. } if !keep_separators => {
                    self.events[event] = Event::Text(BytesText::new("").into_owned());
                }
                separator => kept.push(separator),
            }
        }
        self.layout.paragraphs[id].pieces = kept;

        self.dirty = true;
        Ok(())
    }
}

impl TextDocument for DocxDocument {
    fn paragraph_count(&self) -> usize {
        self.layout.body.len()
    }

    fn paragraph_text(&self, index: usize) -> Result<String, DocumentError> {
        let id = self.body_paragraph(index)?;
        Ok(self.layout.paragraphs[id].text())
    }

    fn set_paragraph_text(&mut self, index: usize, text: &str) -> Result<(), DocumentError> {
        let id = self.body_paragraph(index)?;
        self.write_paragraph(id, text, FragmentLocation::Paragraph { index })
    }

    fn table_count(&self) -> usize {
        self.layout.tables.len()
    }

    fn row_count(&self, table: usize) -> Result<usize, DocumentError> {
        self.layout
            .tables
            .get(table)
            .map(Vec::len)
            .ok_or_else(|| DocumentError::InvalidLocation(format!("table {}", table)))
    }

    fn cell_count(&self, table: usize, row: usize) -> Result<usize, DocumentError> {
        Ok(self.row(table, row)?.len())
    }

    fn cell_text(&self, table: usize, row: usize, cell: usize) -> Result<String, DocumentError> {
        let texts: Vec<String> = self
            .cell_paragraphs(table, row, cell)?
            .into_iter()
            .map(|id| self.layout.paragraphs[id].text())
            .collect();
        Ok(texts.join("\n"))
    }

    /// Lines map onto paragraphs one to one when the counts agree and each
    /// line has a run to land in; otherwise the first paragraph able to hold
    /// text receives all of it.
    fn set_cell_text(
        &mut self,
        table: usize,
        row: usize,
        cell: usize,
        text: &str,
    ) -> Result<(), DocumentError> {
        if self.cell_text(table, row, cell)? == text {
            return Ok(());
        }

        let location = FragmentLocation::TableCell { table, row, cell };
        let paragraphs = self.cell_paragraphs(table, row, cell)?;
        let lines: Vec<&str> = text.split('\n').collect();

        // Every line must have somewhere to go before anything is written
        let lines_fit = lines.len() == paragraphs.len()
            && paragraphs.iter().zip(&lines).all(|(id, line)| {
                let paragraph = &self.layout.paragraphs[*id];
                line.is_empty() || paragraph.has_slot() || paragraph.text() == *line
            });

        if lines_fit {
            for (id, line) in paragraphs.into_iter().zip(lines) {
                self.write_paragraph(id, line, location)?;
            }
            return Ok(());
        }

        let Some(target) = paragraphs
            .iter()
            .copied()
            .find(|id| self.layout.paragraphs[*id].has_slot())
        else {
            return Err(DocumentError::NoTextRun(location.to_string()));
        };

        for id in paragraphs {
            let value = if id == target { text } else { "" };
            self.write_paragraph(id, value, location)?;
        }
        Ok(())
    }
}
