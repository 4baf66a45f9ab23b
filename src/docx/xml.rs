//! Owned, mutable XML tree used for WordprocessingML parts.
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. Handles stay valid
//! for the life of the tree, including across insertions, which is what lets
//! the applier hold paragraph handles while it adds new paragraphs.

use std::borrow::Cow;
use std::io::Write;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::{Error, Result};

/// Handle to a node in an [`XmlTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// An element's qualified name and attributes, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
}

impl Element {
    /// Local part of the qualified name (`w:p` -> `p`).
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    /// Look up an attribute by its local name.
    pub fn attribute(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| local_name(k) == local)
            .map(|(_, v)| v.as_str())
    }

    /// Set or replace an attribute by qualified name.
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        match self.attributes.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self
                .attributes
                .push((name.to_string(), value.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
enum NodeData {
    Element(Element),
    Text(String),
    /// Declarations, comments, processing instructions and CDATA, kept verbatim
    Raw(Event<'static>),
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An XML document held as an arena of nodes.
#[derive(Debug, Clone)]
pub struct XmlTree {
    nodes: Vec<Node>,
    /// Top-level nodes (prolog, root element, trailing comments)
    top: Vec<NodeId>,
}

impl XmlTree {
    /// Parse an XML part.
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.trim_text(false);

        let mut tree = Self {
            nodes: Vec::new(),
            top: Vec::new(),
        };
        let mut stack: Vec<NodeId> = Vec::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let id = tree.push(NodeData::Element(element_from(&e)?), stack.last().copied());
                    stack.push(id);
                }
                Event::End(_) => {
                    if stack.pop().is_none() {
                        return Err(Error::Docx("Unbalanced closing tag".to_string()));
                    }
                }
                Event::Empty(e) => {
                    tree.push(NodeData::Element(element_from(&e)?), stack.last().copied());
                }
                Event::Text(e) => {
                    let text = e.unescape()?.into_owned();
                    tree.push(NodeData::Text(text), stack.last().copied());
                }
                Event::Eof => break,
                other => {
                    tree.push(NodeData::Raw(other.into_owned()), stack.last().copied());
                }
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(Error::Docx("Unclosed element at end of part".to_string()));
        }
        if tree.root().is_none() {
            return Err(Error::Docx("Part has no root element".to_string()));
        }
        Ok(tree)
    }

    fn push(&mut self, data: NodeData, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data,
            parent,
            children: Vec::new(),
        });
        match parent {
            Some(p) => self.nodes[p.0].children.push(id),
            None => self.top.push(id),
        }
        id
    }

    /// The document element.
    pub fn root(&self) -> Option<NodeId> {
        self.top
            .iter()
            .copied()
            .find(|id| matches!(self.nodes[id.0].data, NodeData::Element(_)))
    }

    /// Element data of a node, if it is an element.
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id.0].data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Mutable element data of a node.
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[id.0].data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Text content of a text node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].data {
            NodeData::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Check if a node is an element with the given local name.
    pub fn is(&self, id: NodeId, local: &str) -> bool {
        self.element(id).is_some_and(|e| e.local_name() == local)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Element children with the given local name.
    pub fn children_named<'a>(
        &'a self,
        id: NodeId,
        local: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.children(id)
            .iter()
            .copied()
            .filter(move |c| self.is(*c, local))
    }

    /// First element child with the given local name.
    pub fn first_child_named(&self, id: NodeId, local: &str) -> Option<NodeId> {
        self.children(id).iter().copied().find(|c| self.is(*c, local))
    }

    /// Find the first element with the given local name, depth first.
    pub fn find_descendant(&self, id: NodeId, local: &str) -> Option<NodeId> {
        for &child in self.children(id) {
            if self.is(child, local) {
                return Some(child);
            }
            if let Some(found) = self.find_descendant(child, local) {
                return Some(found);
            }
        }
        None
    }

    /// Create a detached element.
    pub fn create_element(&mut self, name: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data: NodeData::Element(Element {
                name: name.to_string(),
                attributes: Vec::new(),
            }),
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data: NodeData::Text(text.to_string()),
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Append a detached node as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Place `node` immediately after `anchor` under the same parent.
    pub fn insert_after(&mut self, anchor: NodeId, node: NodeId) -> Result<()> {
        let parent = self
            .parent(anchor)
            .ok_or_else(|| Error::Docx("Cannot insert next to a top-level node".to_string()))?;
        self.detach(node);
        let siblings = &mut self.nodes[parent.0].children;
        let pos = siblings
            .iter()
            .position(|c| *c == anchor)
            .ok_or_else(|| Error::Docx("Anchor is not a child of its parent".to_string()))?;
        siblings.insert(pos + 1, node);
        self.nodes[node.0].parent = Some(parent);
        Ok(())
    }

    /// Remove a node from its parent. The node stays in the arena, unreachable.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != id);
        }
    }

    /// Copy a subtree. The copy is detached.
    pub fn deep_copy(&mut self, id: NodeId) -> NodeId {
        let data = self.nodes[id.0].data.clone();
        let copy = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data,
            parent: None,
            children: Vec::new(),
        });
        let children = self.nodes[id.0].children.clone();
        for child in children {
            let child_copy = self.deep_copy(child);
            self.nodes[child_copy.0].parent = Some(copy);
            self.nodes[copy.0].children.push(child_copy);
        }
        copy
    }

    /// Serialize the tree back to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        for &id in &self.top {
            self.write_node(&mut writer, id)?;
        }
        Ok(writer.into_inner())
    }

    fn write_node<W: Write>(&self, writer: &mut Writer<W>, id: NodeId) -> Result<()> {
        let node = &self.nodes[id.0];
        match &node.data {
            NodeData::Element(e) => {
                let mut start = BytesStart::new(e.name.as_str());
                for (k, v) in &e.attributes {
                    start.push_attribute((k.as_str(), v.as_str()));
                }
                if node.children.is_empty() {
                    writer.write_event(Event::Empty(start))?;
                } else {
                    writer.write_event(Event::Start(start))?;
                    for &child in &node.children {
                        self.write_node(writer, child)?;
                    }
                    writer.write_event(Event::End(BytesEnd::new(e.name.as_str())))?;
                }
            }
            NodeData::Text(t) => {
                writer.write_event(Event::Text(BytesText::new(t)))?;
            }
            NodeData::Raw(event) => {
                writer.write_event(event.borrow())?;
            }
        }
        Ok(())
    }
}

/// Local part of a qualified name.
pub fn local_name(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

fn element_from(start: &BytesStart<'_>) -> Result<Element> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value: Cow<'_, str> = attr.unescape_value()?;
        attributes.push((key, value.into_owned()));
    }
    Ok(Element { name, attributes })
}
