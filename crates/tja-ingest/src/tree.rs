//! In-memory document tree and the forward-only cursor the mapper consumes.

use std::fmt;

/// One step of a depth-first walk over a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEvent {
    Start(String),
    Text(String),
    End(String),
}

impl fmt::Display for TreeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start(name) => write!(f, "<{name}>"),
            Self::Text(value) => write!(f, "text {value:?}"),
            Self::End(name) => write!(f, "</{name}>"),
        }
    }
}

/// Forward-only access to a document: no random access, no rewinding.
pub trait TreeCursor {
    /// Advances to the next event, `None` once the document is exhausted.
    fn next_event(&mut self) -> tja_model::Result<Option<TreeEvent>>;
}

/// A named node with optional text and ordered children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Leaf element holding `text`.
    pub fn leaf(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: Some(text.into()),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn with_leaf(self, name: &str, text: &str) -> Self {
        self.with_child(Element::leaf(name, text))
    }
}

/// A fully loaded document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentTree {
    pub root: Element,
}

impl DocumentTree {
    pub fn new(root: Element) -> Self {
        Self { root }
    }

    pub fn cursor(&self) -> TreeEventCursor<'_> {
        TreeEventCursor {
            pending_root: Some(&self.root),
            stack: Vec::new(),
        }
    }
}

/// Cursor over a [`DocumentTree`], walking it with an explicit stack.
pub struct TreeEventCursor<'a> {
    pending_root: Option<&'a Element>,
    stack: Vec<OpenElement<'a>>,
}

struct OpenElement<'a> {
    element: &'a Element,
    text_emitted: bool,
    next_child: usize,
}

impl<'a> OpenElement<'a> {
    fn new(element: &'a Element) -> Self {
        Self {
            element,
            text_emitted: false,
            next_child: 0,
        }
    }
}

impl TreeCursor for TreeEventCursor<'_> {
    fn next_event(&mut self) -> tja_model::Result<Option<TreeEvent>> {
        if let Some(root) = self.pending_root.take() {
            self.stack.push(OpenElement::new(root));
            return Ok(Some(TreeEvent::Start(root.name.clone())));
        }
        let Some(open) = self.stack.last_mut() else {
            return Ok(None);
        };
        let element = open.element;
        if !open.text_emitted {
            open.text_emitted = true;
            if let Some(text) = &element.text {
                return Ok(Some(TreeEvent::Text(text.clone())));
            }
        }
        if let Some(child) = element.children.get(open.next_child) {
            open.next_child += 1;
            self.stack.push(OpenElement::new(child));
            return Ok(Some(TreeEvent::Start(child.name.clone())));
        }
        self.stack.pop();
        Ok(Some(TreeEvent::End(element.name.clone())))
    }
}

/// Drains a cursor into a vector of events.
#[cfg(test)]
pub(crate) fn collect_events(cursor: &mut dyn TreeCursor) -> tja_model::Result<Vec<TreeEvent>> {
    let mut events = Vec::new();
    while let Some(event) = cursor.next_event()? {
        events.push(event);
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(name: &str) -> TreeEvent {
        TreeEvent::Start(name.to_string())
    }

    fn end(name: &str) -> TreeEvent {
        TreeEvent::End(name.to_string())
    }

    #[test]
    fn cursor_walks_depth_first() {
        let tree = DocumentTree::new(
            Element::new("RootObject")
                .with_child(Element::new("Target").with_leaf("core", "Cortex-M0"))
                .with_child(Element::new("Board1")),
        );
        let events = collect_events(&mut tree.cursor()).expect("walk tree");
        assert_eq!(
            events,
            vec![
                start("RootObject"),
                start("Target"),
                start("core"),
                TreeEvent::Text("Cortex-M0".to_string()),
                end("core"),
                end("Target"),
                start("Board1"),
                end("Board1"),
                end("RootObject"),
            ]
        );
    }

    #[test]
    fn deep_trees_do_not_recurse() {
        let mut element = Element::leaf("leaf", "x");
        for depth in 0..10_000 {
            element = Element::new(format!("n{depth}")).with_child(element);
        }
        let tree = DocumentTree::new(element);
        let events = collect_events(&mut tree.cursor()).expect("walk tree");
        assert_eq!(events.len(), 2 * 10_001 + 1);
        // Release iteratively, the derived drop glue recurses once per level.
        let mut node = tree.root;
        while let Some(child) = node.children.pop() {
            node = child;
        }
    }
}
