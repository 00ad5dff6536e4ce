//! JSON → document tree conversion.
//!
//! Object members become child elements in declaration order, arrays become
//! repeated sibling elements named after their member, and scalars become
//! element text. An empty array or JSON `null` becomes the text `"null"` so
//! that an explicitly emptied list stays distinguishable from an absent one.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use tja_model::NULL_MARKER;

use crate::error::{IngestError, Result};
use crate::tree::{DocumentTree, Element};

/// Parses a JSON document whose top-level object becomes `root_name`.
pub fn load_json_str(source: &str, root_name: &str) -> Result<DocumentTree> {
    let value: Value = serde_json::from_str(source)?;
    let Value::Object(members) = value else {
        return Err(IngestError::Malformed(
            "top-level JSON value must be an object".to_string(),
        ));
    };
    let mut root = Element::new(root_name);
    for (name, member) in &members {
        push_member(&mut root.children, name, member);
    }
    debug!(
        root = root_name,
        entity_count = root.children.len(),
        "loaded json document"
    );
    Ok(DocumentTree::new(root))
}

pub fn load_json_file(path: &Path, root_name: &str) -> Result<DocumentTree> {
    let source = fs::read_to_string(path)?;
    if source.trim().is_empty() {
        return Err(IngestError::Malformed(format!(
            "{} is empty",
            path.display()
        )));
    }
    load_json_str(&source, root_name)
}

// serde_json caps nesting at 128 levels, which bounds this recursion.
fn push_member(out: &mut Vec<Element>, name: &str, value: &Value) {
    match value {
        Value::Null => out.push(Element::leaf(name, NULL_MARKER)),
        Value::Array(items) if items.is_empty() => out.push(Element::leaf(name, NULL_MARKER)),
        Value::Array(items) => {
            for item in items {
                push_member(out, name, item);
            }
        }
        Value::Object(members) => {
            let mut element = Element::new(name);
            for (child_name, child) in members {
                push_member(&mut element.children, child_name, child);
            }
            out.push(element);
        }
        Value::String(text) if text.is_empty() => out.push(Element::new(name)),
        Value::String(text) => out.push(Element::leaf(name, text.as_str())),
        Value::Bool(flag) => out.push(Element::leaf(name, flag.to_string())),
        Value::Number(number) => out.push(Element::leaf(name, number.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn members_keep_declaration_order() {
        let tree = load_json_str(
            r#"{ "Target": { "core": null }, "Zeta": {}, "Alpha": { "public": false } }"#,
            "RootObject",
        )
        .expect("load json");
        let names: Vec<&str> = tree.root.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Target", "Zeta", "Alpha"]);
        assert_eq!(tree.root.children[2].children[0].text.as_deref(), Some("false"));
    }

    #[test]
    fn arrays_become_repeated_siblings() {
        let tree = load_json_str(
            r#"{ "Target": { "device_has": ["SERIAL", "I2C"], "extra_labels": [] } }"#,
            "RootObject",
        )
        .expect("load json");
        let target = &tree.root.children[0];
        let fields: Vec<(&str, Option<&str>)> = target
            .children
            .iter()
            .map(|c| (c.name.as_str(), c.text.as_deref()))
            .collect();
        assert_eq!(
            fields,
            vec![
                ("device_has", Some("SERIAL")),
                ("device_has", Some("I2C")),
                ("extra_labels", Some("null")),
            ]
        );
    }

    #[test]
    fn non_object_documents_are_rejected() {
        let error = load_json_str("[1, 2]", "RootObject").unwrap_err();
        assert!(matches!(error, IngestError::Malformed(_)));
    }

    #[test]
    fn empty_files_are_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("targets.json");
        fs::write(&path, "  \n").expect("write file");
        let error = load_json_file(&path, "RootObject").unwrap_err();
        assert!(error.to_string().contains("is empty"));
    }
}
