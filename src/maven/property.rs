use crate::xml::XmlNode;
use std::fmt;

/// A single entry of a descriptor's `<properties>` section, backed 1:1 by
/// its element: the name is the local tag, the value is the node text, and
/// writing the value mutates the document.
#[derive(Debug, Clone)]
pub struct Property {
    node: XmlNode,
}

impl Property {
    pub fn new(node: XmlNode) -> Self {
        Self { node }
    }

    pub fn name(&self) -> String {
        self.node.name()
    }

    pub fn value(&self) -> String {
        self.node.text().unwrap_or_default()
    }

    pub fn set_value(&self, value: &str) {
        self.node.set_text(value);
    }

    pub fn node(&self) -> &XmlNode {
        &self.node
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = '{}'", self.name(), self.value())
    }
}
