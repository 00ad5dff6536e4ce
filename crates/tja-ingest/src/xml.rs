//! Pull-based XML source.
//!
//! Attributes, comments, processing instructions and declarations are
//! ignored. Text, CDATA and entity references between two tags are joined
//! into a single trimmed text event; whitespace-only text is dropped.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::trace;

use crate::error::IngestError;
use crate::tree::{TreeCursor, TreeEvent};

pub struct XmlCursor<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    pending: VecDeque<TreeEvent>,
    text: String,
    finished: bool,
}

enum RawEvent {
    Open(String),
    Close(String),
    Empty(String),
    Text(String),
    Eof,
    Skip,
}

impl XmlCursor<BufReader<File>> {
    pub fn from_path(path: &Path) -> Result<Self, IngestError> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<'a> XmlCursor<&'a [u8]> {
    pub fn from_xml_str(source: &'a str) -> Self {
        Self::new(source.as_bytes())
    }
}

impl<R: BufRead> XmlCursor<R> {
    pub fn new(source: R) -> Self {
        Self {
            reader: Reader::from_reader(source),
            buf: Vec::new(),
            pending: VecDeque::new(),
            text: String::new(),
            finished: false,
        }
    }

    fn read_raw(&mut self) -> Result<RawEvent, IngestError> {
        self.buf.clear();
        let event = match self.reader.read_event_into(&mut self.buf) {
            Ok(event) => event,
            Err(error) => {
                return Err(IngestError::Xml {
                    position: self.reader.error_position() as u64,
                    message: error.to_string(),
                });
            }
        };
        let raw = match event {
            Event::Start(start) => RawEvent::Open(decode_name(start.name().as_ref())),
            Event::End(end) => RawEvent::Close(decode_name(end.name().as_ref())),
            Event::Empty(start) => RawEvent::Empty(decode_name(start.name().as_ref())),
            Event::Text(text) => RawEvent::Text(String::from_utf8_lossy(&text).into_owned()),
            Event::CData(data) => RawEvent::Text(String::from_utf8_lossy(&data).into_owned()),
            Event::GeneralRef(reference) => {
                let name = String::from_utf8_lossy(&reference).into_owned();
                match resolve_reference(&name) {
                    Some(ch) => RawEvent::Text(ch.to_string()),
                    None => {
                        return Err(IngestError::Xml {
                            position: self.reader.buffer_position() as u64,
                            message: format!("unknown entity reference &{name};"),
                        });
                    }
                }
            }
            Event::Eof => RawEvent::Eof,
            _ => RawEvent::Skip,
        };
        Ok(raw)
    }

    fn flush_text(&mut self) {
        let text = std::mem::take(&mut self.text);
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            self.pending.push_back(TreeEvent::Text(trimmed.to_string()));
        }
    }

    fn fill_pending(&mut self) -> Result<(), IngestError> {
        while self.pending.is_empty() && !self.finished {
            match self.read_raw()? {
                RawEvent::Open(name) => {
                    self.flush_text();
                    self.pending.push_back(TreeEvent::Start(name));
                }
                RawEvent::Close(name) => {
                    self.flush_text();
                    self.pending.push_back(TreeEvent::End(name));
                }
                RawEvent::Empty(name) => {
                    self.flush_text();
                    self.pending.push_back(TreeEvent::Start(name.clone()));
                    self.pending.push_back(TreeEvent::End(name));
                }
                RawEvent::Text(text) => self.text.push_str(&text),
                RawEvent::Eof => {
                    self.flush_text();
                    self.finished = true;
                }
                RawEvent::Skip => {}
            }
        }
        Ok(())
    }
}

impl<R: BufRead> TreeCursor for XmlCursor<R> {
    fn next_event(&mut self) -> tja_model::Result<Option<TreeEvent>> {
        self.fill_pending()?;
        let event = self.pending.pop_front();
        if let Some(event) = &event {
            trace!(%event, "xml event");
        }
        Ok(event)
    }
}

fn decode_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

/// Resolves predefined and numeric character references.
fn resolve_reference(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let numeric = name.strip_prefix('#')?;
            let code = match numeric.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => numeric.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}
