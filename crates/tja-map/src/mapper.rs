//! Maps a document's entities into the `Boards` table.
//!
//! The document is consumed as a forward-only event stream with an explicit
//! frame stack, so nesting depth never touches the call stack. Leaf fields
//! become columns named after their element; repeated fields concatenate;
//! fields with children write `"null"` and their leaves become columns of the
//! same row. Section elements are handed to their reader wherever they appear.

use tracing::{debug, info, trace, warn};

use tja_ingest::{TreeCursor, TreeEvent};
use tja_model::{
    AnalyzerConfig, AnalyzerError, BOARDS_TABLE, INDEX_COLUMN, NAME_COLUMN, NULL_MARKER, Result,
    Table, append_list_value,
};

use crate::sections::{SectionReaders, SectionRegistry};

/// Entity table plus one table per registered section.
#[derive(Debug, Clone)]
pub struct MappedTables {
    pub boards: Table,
    pub sections: Vec<Table>,
}

enum Frame {
    Root,
    /// A root child declared before the base entity.
    Skipped(String),
    Entity {
        name: String,
    },
    Field {
        name: String,
        row: usize,
        nested: bool,
    },
}

impl Frame {
    fn name<'a>(&'a self, root: &'a str) -> &'a str {
        match self {
            Self::Root => root,
            Self::Skipped(name) | Self::Entity { name } | Self::Field { name, .. } => name,
        }
    }
}

pub fn map_document(cursor: &mut dyn TreeCursor, config: &AnalyzerConfig) -> Result<MappedTables> {
    let registry = SectionRegistry::from_config(config);
    map_document_with(cursor, config, &registry)
}

/// Maps a document using a caller-supplied section registry.
pub fn map_document_with(
    cursor: &mut dyn TreeCursor,
    config: &AnalyzerConfig,
    registry: &SectionRegistry,
) -> Result<MappedTables> {
    let mut mapper = BoardMapper::new(config, registry);
    while let Some(event) = cursor.next_event()? {
        match event {
            TreeEvent::Start(name) => mapper.start(cursor, name)?,
            TreeEvent::Text(text) => mapper.text(&text),
            TreeEvent::End(name) => mapper.end(&name)?,
        }
    }
    mapper.finish()
}

struct BoardMapper<'c> {
    config: &'c AnalyzerConfig,
    boards: Table,
    sections: SectionReaders<'c>,
    frames: Vec<Frame>,
    /// Set once the base entity has been seen.
    started: bool,
    /// Owner of sections found outside any entity once mapping has started.
    last_entity: Option<String>,
    root_closed: bool,
    entity_count: usize,
}

impl<'c> BoardMapper<'c> {
    fn new(config: &'c AnalyzerConfig, registry: &'c SectionRegistry) -> Self {
        Self {
            config,
            boards: Table::with_columns(BOARDS_TABLE, &[INDEX_COLUMN, NAME_COLUMN]),
            sections: SectionReaders::new(registry),
            frames: Vec::new(),
            started: false,
            last_entity: None,
            root_closed: false,
            entity_count: 0,
        }
    }

    fn start(&mut self, cursor: &mut dyn TreeCursor, name: String) -> Result<()> {
        if self.frames.is_empty() {
            return self.open_root(name);
        }
        if self.sections.contains(&name) {
            let owner = self
                .current_entity()
                .or(self.last_entity.as_deref())
                .unwrap_or(self.config.base_entity.as_str())
                .to_string();
            debug!(section = %name, %owner, "reading section");
            return self.sections.read(cursor, &name, &owner);
        }
        match self.frames.last() {
            Some(Frame::Root) if !self.started && name != self.config.base_entity => {
                debug!(element = %name, "skipping element declared before the base entity");
                self.frames.push(Frame::Skipped(name));
            }
            Some(Frame::Root) => self.open_entity(name),
            Some(Frame::Skipped(_)) => self.frames.push(Frame::Skipped(name)),
            Some(&Frame::Entity { .. }) => {
                let row = self.entity_count - 1;
                self.open_field(row, name)?;
            }
            Some(&Frame::Field { row, .. }) => {
                self.mark_parent_nested();
                self.open_field(row, name)?;
            }
            None => {}
        }
        Ok(())
    }

    fn open_root(&mut self, name: String) -> Result<()> {
        if self.root_closed {
            return Err(AnalyzerError::malformed(format!(
                "unexpected <{name}> after the root element"
            )));
        }
        if name != self.config.root_element {
            return Err(AnalyzerError::malformed(format!(
                "expected root element <{}>, found <{name}>",
                self.config.root_element
            )));
        }
        self.frames.push(Frame::Root);
        Ok(())
    }

    fn open_entity(&mut self, name: String) {
        self.started = true;
        if self.boards.find_row(NAME_COLUMN, &name).is_some() {
            warn!(entity = %name, "entity declared more than once");
        }
        self.entity_count += 1;
        let row = self.boards.push_row();
        self.boards
            .set_by_name(row, INDEX_COLUMN, self.entity_count.to_string());
        self.boards.set_by_name(row, NAME_COLUMN, name.as_str());
        trace!(entity = %name, index = self.entity_count, "mapping entity");
        self.last_entity = Some(name.clone());
        self.frames.push(Frame::Entity { name });
    }

    /// `Inx` and `BoardName` belong to the mapper; a field with either name
    /// would overwrite the entity's identity.
    fn open_field(&mut self, row: usize, name: String) -> Result<()> {
        if name == INDEX_COLUMN || name == NAME_COLUMN {
            return Err(AnalyzerError::malformed(format!(
                "entity '{}' declares reserved field <{name}>",
                self.current_entity().unwrap_or_default()
            )));
        }
        self.boards.ensure_column(&name);
        self.frames.push(Frame::Field {
            name,
            row,
            nested: false,
        });
        Ok(())
    }

    fn mark_parent_nested(&mut self) {
        if let Some(Frame::Field { name, row, nested }) = self.frames.last_mut()
            && !*nested
        {
            *nested = true;
            self.boards.set_by_name(*row, name, NULL_MARKER);
        }
    }

    fn current_entity(&self) -> Option<&str> {
        self.frames.iter().rev().find_map(|frame| match frame {
            Frame::Entity { name } => Some(name.as_str()),
            _ => None,
        })
    }

    fn text(&mut self, text: &str) {
        match self.frames.last() {
            Some(Frame::Field { name, row, .. }) => {
                let column = self.boards.ensure_column(name);
                let merged = append_list_value(self.boards.value(*row, column), text);
                self.boards.set(*row, column, merged);
            }
            Some(frame) => {
                trace!(element = %frame.name(&self.config.root_element), "ignoring text outside a field");
            }
            None => {}
        }
    }

    fn end(&mut self, name: &str) -> Result<()> {
        let Some(frame) = self.frames.pop() else {
            return Err(AnalyzerError::malformed(format!(
                "unexpected </{name}> outside the root element"
            )));
        };
        let expected = frame.name(&self.config.root_element);
        if expected != name {
            return Err(AnalyzerError::malformed(format!(
                "expected </{expected}>, found </{name}>"
            )));
        }
        if matches!(frame, Frame::Root) {
            self.root_closed = true;
        }
        Ok(())
    }

    fn finish(self) -> Result<MappedTables> {
        if let Some(frame) = self.frames.last() {
            return Err(AnalyzerError::malformed(format!(
                "document ended with <{}> still open",
                frame.name(&self.config.root_element)
            )));
        }
        if !self.root_closed {
            return Err(AnalyzerError::malformed("document has no root element"));
        }
        if !self.started {
            warn!(
                base_entity = %self.config.base_entity,
                "base entity not found, no entities mapped"
            );
        }
        info!(
            entity_count = self.entity_count,
            column_count = self.boards.column_count(),
            "mapped entities"
        );
        Ok(MappedTables {
            boards: self.boards,
            sections: self.sections.finish(),
        })
    }
}
