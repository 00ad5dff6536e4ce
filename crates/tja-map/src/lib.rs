//! Document → relational table mapping.

pub mod mapper;
pub mod sections;

pub use mapper::{MappedTables, map_document, map_document_with};
pub use sections::{
    KeyValueReader, SectionFactory, SectionReader, SectionReaders, SectionRegistry,
    StructuredReader, factory_for,
};
