use crate::xml::XmlNode;
use std::fmt;

/// A group/artifact/version triple backed by the text nodes of the
/// descriptor it was read from.
///
/// The version node may hold a literal value or a `${...}` property
/// placeholder; writing through [`set_version`](Self::set_version) always
/// targets the node itself, property resolution happens at the project
/// level. Two identifiers address the same module when group and artifact
/// match, the version is deliberately not part of the key.
#[derive(Debug, Clone)]
pub struct ModuleIdentifier {
    group_node: XmlNode,
    artifact_node: XmlNode,
    version_node: XmlNode,
}

impl ModuleIdentifier {
    pub fn new(group_node: XmlNode, artifact_node: XmlNode, version_node: XmlNode) -> Self {
        Self {
            group_node,
            artifact_node,
            version_node,
        }
    }

    pub fn group_id(&self) -> String {
        self.group_node.text().unwrap_or_default()
    }

    pub fn artifact_id(&self) -> String {
        self.artifact_node.text().unwrap_or_default()
    }

    /// Raw version text, which may be a property placeholder.
    pub fn version(&self) -> String {
        self.version_node.text().unwrap_or_default()
    }

    pub fn set_version(&self, version: &str) {
        self.version_node.set_text(version);
    }

    pub fn group_node(&self) -> &XmlNode {
        &self.group_node
    }

    pub fn version_node(&self) -> &XmlNode {
        &self.version_node
    }

    /// Registry key of the module this identifier addresses.
    pub fn key(&self) -> String {
        format!("{}:{}", self.group_id(), self.artifact_id())
    }
}

impl fmt::Display for ModuleIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id(), self.artifact_id(), self.version())
    }
}
