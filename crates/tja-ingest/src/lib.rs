//! Document sources for the target inheritance analyzer.
//!
//! Both JSON and XML inputs are exposed through [`TreeCursor`], a
//! forward-only stream of element start, text and element end events.

pub mod error;
pub mod json;
pub mod tree;
pub mod xml;

pub use error::{IngestError, Result};
pub use json::{load_json_file, load_json_str};
pub use tree::{DocumentTree, Element, TreeCursor, TreeEvent, TreeEventCursor};
pub use xml::XmlCursor;
