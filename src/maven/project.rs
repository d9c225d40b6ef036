use crate::error::MavenError;
use crate::maven::{BumpType, Module, ModuleIdentifier, SemanticVersion};
use crate::xml::XmlNode;
use anyhow::{Context, Result};
use indexmap::IndexMap;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::{debug, info};

/// The registry of every module reachable from the root descriptors,
/// keyed by `group:artifact`, plus the version resolution and rewrite
/// logic operating on it.
///
/// Resolution always ends at the one text node that is the authoritative
/// source for a version: a literal value is its own node, a `${...}`
/// placeholder is chased through the owning module's property table and,
/// when absent there, up the chain of registered parent modules. Writes go
/// through the same resolution, so a single property edit updates every
/// reference sharing it.
#[derive(Debug, Default)]
pub struct Project {
    modules: IndexMap<String, Module>,
}

fn property_reference(value: &str) -> Option<String> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern =
        PATTERN.get_or_init(|| Regex::new(r"^\$\{(?P<name>[^}]+)}$").unwrap());

    pattern
        .captures(value)
        .map(|captures| captures["name"].to_string())
}

impl Project {
    pub fn new() -> Self {
        Self {
            modules: IndexMap::new(),
        }
    }

    /// Register modules by key. The first registration wins; duplicates are
    /// ignored, which covers the same module being rediscovered through a
    /// second root descriptor.
    pub fn add_modules<I>(&mut self, modules: I)
    where
        I: IntoIterator<Item = Module>,
    {
        for module in modules {
            let key = module.identifier().key();
            if self.modules.contains_key(&key) {
                debug!("Module '{}' is already registered, keeping the first instance", key);
                continue;
            }
            self.modules.insert(key, module);
        }
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Resolved current version per module key, in registration order.
    pub fn module_versions(&self) -> Result<IndexMap<String, String>> {
        let mut versions = IndexMap::new();
        for (key, module) in &self.modules {
            let node = self.resolve_version_node(module, module.identifier())?;
            versions.insert(key.clone(), node.text().unwrap_or_default());
        }

        Ok(versions)
    }

    /// Compute a new version for every registered module and write it back
    /// to each location referencing one of them.
    ///
    /// A non-empty `custom_version` overrides the bump arithmetic; each
    /// module still keeps its own prefix/suffix decorations. With
    /// `assert_uniform_version` the current versions must all be equal.
    /// With `write_modules` every registered document is saved afterwards,
    /// whether or not it changed, so serialization normalization is applied
    /// uniformly.
    pub fn bump_version(
        &self,
        bump_type: BumpType,
        custom_version: &str,
        assert_uniform_version: bool,
        write_modules: bool,
    ) -> Result<()> {
        let current_versions = self.module_versions()?;

        if assert_uniform_version {
            let distinct: HashSet<&String> = current_versions.values().collect();
            if distinct.len() != 1 {
                let mut versions: Vec<String> = distinct.into_iter().cloned().collect();
                versions.sort();
                return Err(MavenError::NonUniformVersions { versions }.into());
            }
        }

        let updated_versions = Self::bump_versions(&current_versions, bump_type, custom_version)?;

        for module in self.modules.values() {
            self.apply_updated_versions(module, &updated_versions, write_modules)?;
        }

        info!("Bumped {} modules ({})", self.modules.len(), bump_type);
        Ok(())
    }

    fn bump_versions(
        versions: &IndexMap<String, String>,
        bump_type: BumpType,
        custom_version: &str,
    ) -> Result<IndexMap<String, String>> {
        let custom = if custom_version.is_empty() {
            None
        } else {
            Some(SemanticVersion::parse(custom_version).ok_or_else(|| {
                MavenError::InvalidCustomVersion {
                    version: custom_version.to_string(),
                }
            })?)
        };

        let mut result = IndexMap::new();
        for (key, value) in versions {
            let mut version =
                SemanticVersion::parse(value).ok_or_else(|| MavenError::InvalidVersion {
                    module: key.clone(),
                    version: value.clone(),
                })?;

            match &custom {
                Some(custom) => version.override_numbers(custom),
                None => version.bump(bump_type),
            }

            result.insert(key.clone(), version.to_string());
        }

        Ok(result)
    }

    /// Write the updated versions into one module: its parent reference,
    /// its own identifier, and each dependency, whenever the referenced
    /// key is part of the update. Keys outside the registry (third-party
    /// dependencies) are left untouched.
    fn apply_updated_versions(
        &self,
        module: &Module,
        updated_versions: &IndexMap<String, String>,
        write_module: bool,
    ) -> Result<()> {
        if let Some(parent_identifier) = module.parent_identifier() {
            if let Some(version) = updated_versions.get(&parent_identifier.key()) {
                self.resolve_version_node(module, parent_identifier)?
                    .set_text(version);
            }
        }

        if let Some(version) = updated_versions.get(&module.identifier().key()) {
            self.resolve_version_node(module, module.identifier())?
                .set_text(version);
        }

        for dependency in module.dependencies() {
            let Some(version) = updated_versions.get(&dependency.key()) else {
                continue;
            };
            self.resolve_version_node(module, dependency)?.set_text(version);
        }

        if write_module {
            module
                .document()
                .save(module.pom_file())
                .with_context(|| {
                    format!("Failed to write module descriptor to {:?}", module.pom_file())
                })?;
            info!("Updated module descriptor {:?}", module.pom_file());
        }

        Ok(())
    }

    /// The authoritative text node behind an identifier's version.
    pub fn resolve_version_node(
        &self,
        module: &Module,
        identifier: &ModuleIdentifier,
    ) -> Result<XmlNode> {
        self.resolve_property_node(module, identifier.version_node())
    }

    /// A literal value resolves to the node itself; a `${name}` placeholder
    /// resolves to the backing node of the property `name`.
    fn resolve_property_node(&self, module: &Module, node: &XmlNode) -> Result<XmlNode> {
        let raw = node.text().unwrap_or_default();
        match property_reference(&raw) {
            None => Ok(node.clone()),
            Some(name) => self.find_property_node(module, &name),
        }
    }

    /// Search the module's own property table, then walk up the chain of
    /// registered parent modules under the same property name. A repeated
    /// module key means the parent graph is cyclic and resolution stops
    /// with an error rather than looping.
    fn find_property_node(&self, module: &Module, property_name: &str) -> Result<XmlNode> {
        let mut current = module;
        let mut visited: HashSet<String> = HashSet::new();

        loop {
            if let Some(property) = current
                .properties()
                .iter()
                .find(|property| property.name() == property_name)
            {
                return Ok(property.node().clone());
            }

            let Some(parent_identifier) = current.parent_identifier() else {
                return Err(MavenError::UnresolvedProperty {
                    property: property_name.to_string(),
                    module: current.identifier().to_string(),
                }
                .into());
            };

            if !visited.insert(current.identifier().key()) {
                return Err(MavenError::ParentCycle {
                    property: property_name.to_string(),
                    module: current.identifier().to_string(),
                }
                .into());
            }

            let parent_key = parent_identifier.key();
            current = self.modules.get(&parent_key).ok_or_else(|| {
                MavenError::MissingParentModule {
                    parent: parent_key.clone(),
                    module: current.identifier().to_string(),
                }
            })?;
        }
    }
}
