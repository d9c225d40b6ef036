use crate::error::MavenError;
use crate::maven::{Module, ModuleIdentifier, Property};
use crate::xml::{XmlDocument, XmlNode};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Parses `pom.xml` descriptors into [`Module`] records and walks declared
/// sub-modules recursively. Reading never mutates anything on disk.
#[derive(Debug, Default)]
pub struct ModuleReader;

impl ModuleReader {
    pub fn new() -> Self {
        Self
    }

    /// Parse a single descriptor file.
    pub fn read(&self, pom: &Path) -> Result<Module> {
        let document = self.load_document(pom)?;
        self.read_module(document, pom)
    }

    /// Parse a descriptor and every sub-module it declares, depth-first:
    /// the module at `pom` first, then each declared sub-module in
    /// declaration order. A failure in any file aborts the walk.
    pub fn read_recursive(&self, pom: &Path) -> Result<Vec<Module>> {
        let document = self.load_document(pom)?;
        let sub_module_poms = Self::read_sub_module_poms(&document, pom);

        let mut result = vec![self.read_module(document, pom)?];
        for sub_module_pom in sub_module_poms {
            result.extend(self.read_recursive(&sub_module_pom)?);
        }

        Ok(result)
    }

    fn load_document(&self, pom: &Path) -> Result<XmlDocument> {
        debug!("Loading module descriptor from {:?}", pom);

        let content = std::fs::read_to_string(pom)
            .with_context(|| format!("Failed to read module descriptor from {:?}", pom))?;

        XmlDocument::parse(&content)
            .with_context(|| format!("Failed to parse module descriptor from {:?}", pom))
    }

    fn read_module(&self, document: XmlDocument, pom: &Path) -> Result<Module> {
        let properties = Self::read_properties(&document);
        let parent_identifier = Self::read_parent_identifier(&document, pom)?;
        let identifier = Self::read_identifier(&document, parent_identifier.as_ref(), pom)?;
        let dependencies = Self::read_dependencies(&document);
        let plugins = Self::read_plugins(&document);

        debug!(
            "Read module '{}' with {} properties, {} dependencies, and {} plugins",
            identifier,
            properties.len(),
            dependencies.len(),
            plugins.len()
        );

        Ok(Module::new(
            document,
            pom.to_path_buf(),
            identifier,
            parent_identifier,
            properties,
            dependencies,
            plugins,
        ))
    }

    fn read_properties(document: &XmlDocument) -> Vec<Property> {
        let Some(root) = document.find_first_node(&["project", "properties"]) else {
            return Vec::new();
        };

        root.nodes().into_iter().map(Property::new).collect()
    }

    fn read_parent_identifier(
        document: &XmlDocument,
        pom: &Path,
    ) -> Result<Option<ModuleIdentifier>> {
        let Some(root) = document.find_first_node(&["project", "parent"]) else {
            return Ok(None);
        };

        let group = root.find_first_node(&["groupId"]);
        let artifact = root.find_first_node(&["artifactId"]);
        let version = root.find_first_node(&["version"]);

        match (group, artifact, version) {
            (Some(group), Some(artifact), Some(version)) => {
                Ok(Some(ModuleIdentifier::new(group, artifact, version)))
            }
            _ => Err(MavenError::MissingParentIdentifier {
                path: pom.to_path_buf(),
            }
            .into()),
        }
    }

    fn read_identifier(
        document: &XmlDocument,
        parent_identifier: Option<&ModuleIdentifier>,
        pom: &Path,
    ) -> Result<ModuleIdentifier> {
        // Group and version may be inherited from the parent block's nodes;
        // the artifact id is always local.
        let group = document
            .find_first_node(&["project", "groupId"])
            .or_else(|| parent_identifier.map(|parent| parent.group_node().clone()));
        let artifact = document.find_first_node(&["project", "artifactId"]);
        let version = document
            .find_first_node(&["project", "version"])
            .or_else(|| parent_identifier.map(|parent| parent.version_node().clone()));

        match (group, artifact, version) {
            (Some(group), Some(artifact), Some(version)) => {
                Ok(ModuleIdentifier::new(group, artifact, version))
            }
            _ => Err(MavenError::MissingModuleIdentifier {
                path: pom.to_path_buf(),
            }
            .into()),
        }
    }

    fn read_dependencies(document: &XmlDocument) -> Vec<ModuleIdentifier> {
        let mut dependencies = Vec::new();

        if let Some(root) = document.find_first_node(&["project", "dependencies"]) {
            Self::read_references(&root, &mut dependencies);
        }
        if let Some(root) =
            document.find_first_node(&["project", "dependencyManagement", "dependencies"])
        {
            Self::read_references(&root, &mut dependencies);
        }

        dependencies
    }

    fn read_plugins(document: &XmlDocument) -> Vec<ModuleIdentifier> {
        let mut plugins = Vec::new();

        let Some(build) = document.find_first_node(&["project", "build"]) else {
            return plugins;
        };

        if let Some(root) = build.find_first_node(&["plugins"]) {
            Self::read_references(&root, &mut plugins);
        }
        if let Some(root) = build.find_first_node(&["pluginManagement", "plugins"]) {
            Self::read_references(&root, &mut plugins);
        }

        plugins
    }

    /// Record every child carrying a full GAV. Entries without an explicit
    /// version node (e.g. versions managed by an imported BOM) have nothing
    /// to rewrite and are skipped without raising an error.
    fn read_references(root: &XmlNode, result: &mut Vec<ModuleIdentifier>) {
        for node in root.nodes() {
            let group = node.find_first_node(&["groupId"]);
            let artifact = node.find_first_node(&["artifactId"]);
            let version = node.find_first_node(&["version"]);

            match (group, artifact, version) {
                (Some(group), Some(artifact), Some(version)) => {
                    result.push(ModuleIdentifier::new(group, artifact, version));
                }
                _ => debug!("Skipping reference without a full GAV in '{}'", root.name()),
            }
        }
    }

    fn read_sub_module_poms(document: &XmlDocument, pom: &Path) -> Vec<PathBuf> {
        let Some(root) = document.find_first_node(&["project", "modules"]) else {
            return Vec::new();
        };

        let parent_dir = pom.parent().unwrap_or_else(|| Path::new(""));
        root.nodes()
            .into_iter()
            .filter_map(|node| node.text())
            .map(|name| parent_dir.join(name).join("pom.xml"))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SINGLE_MODULE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
    <modelVersion>4.0.0</modelVersion>
    <parent>
        <groupId>com.example</groupId>
        <artifactId>parent</artifactId>
        <version>1.1.1</version>
    </parent>
    <groupId>com.example</groupId>
    <artifactId>application</artifactId>
    <version>13.3.7</version>
    <properties>
        <java.version>17</java.version>
    </properties>
    <dependencies>
        <dependency>
            <groupId>com.example</groupId>
            <artifactId>library</artifactId>
            <version>0.1.0</version>
        </dependency>
        <dependency>
            <groupId>org.junit.jupiter</groupId>
            <artifactId>junit-jupiter</artifactId>
            <scope>test</scope>
        </dependency>
        <dependency>
            <groupId>com.example</groupId>
            <artifactId>other-library</artifactId>
            <version>2.0.0</version>
        </dependency>
    </dependencies>
    <build>
        <plugins>
            <plugin>
                <groupId>org.apache.maven.plugins</groupId>
                <artifactId>maven-compiler-plugin</artifactId>
                <version>3.11.0</version>
            </plugin>
        </plugins>
        <pluginManagement>
            <plugins>
                <plugin>
                    <groupId>org.apache.maven.plugins</groupId>
                    <artifactId>maven-surefire-plugin</artifactId>
                    <version>3.1.2</version>
                </plugin>
            </plugins>
        </pluginManagement>
    </build>
</project>
"#;

    const MULTI_MODULE_ROOT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
    <parent>
        <groupId>com.example</groupId>
        <artifactId>parent</artifactId>
        <version>1.1.1</version>
    </parent>
    <groupId>com.example</groupId>
    <artifactId>application</artifactId>
    <version>13.3.7</version>
    <modules>
        <module>sub-module</module>
    </modules>
</project>
"#;

    const MULTI_MODULE_CHILD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
    <parent>
        <groupId>com.example</groupId>
        <artifactId>application</artifactId>
        <version>1.33.7</version>
    </parent>
    <artifactId>sub-module</artifactId>
    <dependencies>
        <dependency>
            <groupId>com.example</groupId>
            <artifactId>library</artifactId>
            <version>0.1.0</version>
        </dependency>
    </dependencies>
</project>
"#;

    fn write_pom(dir: &Path, content: &str) -> PathBuf {
        std::fs::create_dir_all(dir).unwrap();
        let pom = dir.join("pom.xml");
        std::fs::write(&pom, content).unwrap();
        pom
    }

    #[test]
    fn test_read_single_module() {
        let temp_dir = TempDir::new().unwrap();
        let pom = write_pom(temp_dir.path(), SINGLE_MODULE);

        let module = ModuleReader::new().read(&pom).unwrap();

        assert_eq!(module.identifier().group_id(), "com.example");
        assert_eq!(module.identifier().artifact_id(), "application");
        assert_eq!(module.identifier().version(), "13.3.7");
        assert_eq!(module.properties().len(), 1);
        assert_eq!(module.properties()[0].name(), "java.version");

        let parent = module.parent_identifier().unwrap();
        assert_eq!(parent.group_id(), "com.example");
        assert_eq!(parent.artifact_id(), "parent");
        assert_eq!(parent.version(), "1.1.1");

        // The entry without a version node is skipped.
        assert_eq!(module.dependencies().len(), 2);
        assert_eq!(module.dependencies()[0].artifact_id(), "library");
        assert_eq!(module.dependencies()[1].artifact_id(), "other-library");

        assert_eq!(module.plugins().len(), 2);
        assert_eq!(module.plugins()[0].artifact_id(), "maven-compiler-plugin");
        assert_eq!(module.plugins()[1].artifact_id(), "maven-surefire-plugin");
    }

    #[test]
    fn test_read_multi_module_recursively() {
        let temp_dir = TempDir::new().unwrap();
        let root_pom = write_pom(temp_dir.path(), MULTI_MODULE_ROOT);
        write_pom(&temp_dir.path().join("sub-module"), MULTI_MODULE_CHILD);

        let modules = ModuleReader::new().read_recursive(&root_pom).unwrap();

        assert_eq!(modules.len(), 2);

        let parent = &modules[0];
        assert_eq!(parent.identifier().artifact_id(), "application");
        assert_eq!(parent.identifier().version(), "13.3.7");

        let child = &modules[1];
        assert_eq!(child.identifier().group_id(), "com.example");
        assert_eq!(child.identifier().artifact_id(), "sub-module");
        assert_eq!(child.identifier().version(), "1.33.7");

        // Group and version are inherited as the parent block's own nodes.
        let child_parent = child.parent_identifier().unwrap();
        assert_eq!(child_parent.artifact_id(), "application");
        assert_eq!(child.identifier().version_node(), child_parent.version_node());
        assert_eq!(child.identifier().group_node(), child_parent.group_node());
    }

    #[test]
    fn test_incomplete_parent_block_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let pom = write_pom(
            temp_dir.path(),
            r#"<project>
    <parent>
        <groupId>com.example</groupId>
        <artifactId>parent</artifactId>
    </parent>
    <artifactId>application</artifactId>
</project>"#,
        );

        let error = ModuleReader::new().read(&pom).unwrap_err();

        assert!(error.to_string().contains("unable to determine parent module"));
        assert!(error.to_string().contains("pom.xml"));
    }

    #[test]
    fn test_missing_artifact_id_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let pom = write_pom(
            temp_dir.path(),
            r#"<project>
    <groupId>com.example</groupId>
    <version>1.0.0</version>
</project>"#,
        );

        let error = ModuleReader::new().read(&pom).unwrap_err();

        assert!(error
            .to_string()
            .contains("unable to determine module identifier"));
    }

    #[test]
    fn test_missing_identifier_without_parent_fallback_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let pom = write_pom(
            temp_dir.path(),
            "<project><artifactId>application</artifactId></project>",
        );

        let error = ModuleReader::new().read(&pom).unwrap_err();

        assert!(error
            .to_string()
            .contains("unable to determine module identifier"));
    }

    #[test]
    fn test_recursion_stops_at_a_failing_sub_module() {
        let temp_dir = TempDir::new().unwrap();
        let root_pom = write_pom(temp_dir.path(), MULTI_MODULE_ROOT);
        // The declared sub-module directory does not exist.

        let error = ModuleReader::new().read_recursive(&root_pom).unwrap_err();

        assert!(error.to_string().contains("Failed to read module descriptor"));
    }

    #[test]
    fn test_dependency_order_is_direct_then_management() {
        let temp_dir = TempDir::new().unwrap();
        let pom = write_pom(
            temp_dir.path(),
            r#"<project>
    <groupId>com.example</groupId>
    <artifactId>application</artifactId>
    <version>1.0.0</version>
    <dependencyManagement>
        <dependencies>
            <dependency>
                <groupId>com.example</groupId>
                <artifactId>managed</artifactId>
                <version>2.0.0</version>
            </dependency>
        </dependencies>
    </dependencyManagement>
    <dependencies>
        <dependency>
            <groupId>com.example</groupId>
            <artifactId>direct</artifactId>
            <version>1.0.0</version>
        </dependency>
    </dependencies>
</project>"#,
        );

        let module = ModuleReader::new().read(&pom).unwrap();

        let artifacts: Vec<String> = module
            .dependencies()
            .iter()
            .map(|dependency| dependency.artifact_id())
            .collect();
        assert_eq!(artifacts, vec!["direct", "managed"]);
    }
}
