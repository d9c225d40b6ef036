use crate::maven::{ModuleIdentifier, Property};
use crate::xml::XmlDocument;
use std::fmt;
use std::path::{Path, PathBuf};

/// One buildable unit described by one `pom.xml`, together with the parsed
/// document it came from so version updates can be written back.
#[derive(Debug)]
pub struct Module {
    document: XmlDocument,
    pom_file: PathBuf,
    identifier: ModuleIdentifier,
    parent_identifier: Option<ModuleIdentifier>,
    properties: Vec<Property>,
    dependencies: Vec<ModuleIdentifier>,
    plugins: Vec<ModuleIdentifier>,
}

impl Module {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        document: XmlDocument,
        pom_file: PathBuf,
        identifier: ModuleIdentifier,
        parent_identifier: Option<ModuleIdentifier>,
        properties: Vec<Property>,
        dependencies: Vec<ModuleIdentifier>,
        plugins: Vec<ModuleIdentifier>,
    ) -> Self {
        Self {
            document,
            pom_file,
            identifier,
            parent_identifier,
            properties,
            dependencies,
            plugins,
        }
    }

    pub fn document(&self) -> &XmlDocument {
        &self.document
    }

    pub fn pom_file(&self) -> &Path {
        &self.pom_file
    }

    pub fn identifier(&self) -> &ModuleIdentifier {
        &self.identifier
    }

    pub fn parent_identifier(&self) -> Option<&ModuleIdentifier> {
        self.parent_identifier.as_ref()
    }

    /// Properties in document order.
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Direct dependencies followed by dependency-management entries, each
    /// group in document order.
    pub fn dependencies(&self) -> &[ModuleIdentifier] {
        &self.dependencies
    }

    pub fn plugins(&self) -> &[ModuleIdentifier] {
        &self.plugins
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier)
    }
}
