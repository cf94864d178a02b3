//! Typed accessor over parsed object-definition XML
//!
//! Wraps `roxmltree` nodes so the catalog normalizer can ask for "first
//! child with this tag", "attribute by name" and "text content" and get an
//! `Option` back instead of walking raw node lists.

use std::iter::FilterMap;

use roxmltree::{Children, Document, Node};

/// Element children of a node, in document order.
pub type ElementChildren<'a, 'input> =
    FilterMap<Children<'a, 'input>, fn(Node<'a, 'input>) -> Option<Element<'a, 'input>>>;

fn as_element<'a, 'input>(node: Node<'a, 'input>) -> Option<Element<'a, 'input>> {
    node.is_element().then_some(Element { node })
}

/// A view of one XML element.
#[derive(Debug, Clone, Copy)]
pub struct Element<'a, 'input> {
    node: Node<'a, 'input>,
}

impl<'a, 'input> Element<'a, 'input> {
    /// The root element of a parsed document.
    pub fn root(doc: &'a Document<'input>) -> Self {
        Self { node: doc.root_element() }
    }

    /// Tag name without namespace.
    pub fn tag(&self) -> &'a str {
        self.node.tag_name().name()
    }

    /// Value of the named attribute.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.node.attribute(name)
    }

    /// Direct text content, `None` when the element has no text node or
    /// only whitespace.
    pub fn text(&self) -> Option<&'a str> {
        self.node.text().map(str::trim).filter(|t| !t.is_empty())
    }

    /// Element children in document order (text and comments skipped).
    pub fn children(&self) -> ElementChildren<'a, 'input> {
        let to_element: fn(Node<'a, 'input>) -> Option<Element<'a, 'input>> = as_element;
        self.node.children().filter_map(to_element)
    }

    /// First element child with the given tag.
    pub fn child(&self, tag: &str) -> Option<Element<'a, 'input>> {
        self.children().find(|c| c.tag() == tag)
    }

    /// The `n`th element child regardless of tag.
    pub fn nth_child(&self, n: usize) -> Option<Element<'a, 'input>> {
        self.children().nth(n)
    }

    /// Whether the element has at least one element child.
    pub fn has_children(&self) -> bool {
        self.children().next().is_some()
    }

    /// 1-based line of the element's start tag, for error messages.
    pub fn line(&self) -> u32 {
        self.node.document().text_pos_at(self.node.range().start).row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<Objects>
  <Object id="Coin">
    <!-- comment -->
    <DisplayId>Gold Coin</DisplayId>
    <Texture><File>misc</File><Index>0x1f</Index></Texture>
    <Empty>   </Empty>
  </Object>
</Objects>"#;

    #[test]
    fn test_child_and_attr() {
        let doc = Document::parse(DOC).unwrap();
        let root = Element::root(&doc);
        assert_eq!(root.tag(), "Objects");

        let object = root.child("Object").unwrap();
        assert_eq!(object.attr("id"), Some("Coin"));
        assert_eq!(object.attr("type"), None);
        assert_eq!(object.child("DisplayId").and_then(|d| d.text()), Some("Gold Coin"));
        assert!(object.child("AnimatedTexture").is_none());
    }

    #[test]
    fn test_nth_child_skips_text_nodes() {
        let doc = Document::parse(DOC).unwrap();
        let texture = Element::root(&doc).child("Object").unwrap().child("Texture").unwrap();
        assert_eq!(texture.nth_child(0).and_then(|c| c.text()), Some("misc"));
        assert_eq!(texture.nth_child(1).and_then(|c| c.text()), Some("0x1f"));
        assert!(texture.nth_child(2).is_none());
        assert!(texture.has_children());
    }

    #[test]
    fn test_whitespace_text_is_absent() {
        let doc = Document::parse(DOC).unwrap();
        let empty = Element::root(&doc).child("Object").unwrap().child("Empty").unwrap();
        assert_eq!(empty.text(), None);
        assert!(!empty.has_children());
    }

    #[test]
    fn test_line_numbers() {
        let doc = Document::parse(DOC).unwrap();
        let object = Element::root(&doc).child("Object").unwrap();
        assert_eq!(object.line(), 2);
    }
}
