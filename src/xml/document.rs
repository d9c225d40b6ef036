use crate::xml::XmlNode;
use anyhow::{Context, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;
use std::path::Path;
use tracing::debug;

/// A parsed XML document owning its element tree.
///
/// Entities elsewhere in the crate hold [`XmlNode`] handles into this tree;
/// the document is the only place the tree is created and serialized.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    root: XmlNode,
    leading_comments: Vec<String>,
}

impl XmlDocument {
    /// Parse a document from its textual form.
    ///
    /// Whitespace, comments, and attributes are retained so that a
    /// subsequent [`save`](Self::save) reproduces the input layout.
    /// Namespace declarations on the root are dropped and re-inferred on
    /// serialization as the single default namespace.
    pub fn parse(content: &str) -> Result<Self> {
        let mut reader = NsReader::from_str(content);
        let mut stack: Vec<XmlNode> = Vec::new();
        let mut root: Option<XmlNode> = None;
        let mut leading_comments: Vec<String> = Vec::new();

        loop {
            match reader.read_event().context("Failed to parse XML document")? {
                Event::Start(event) => {
                    let node = element_from_event(&reader, &event)?;
                    attach_element(&stack, &mut root, &node);
                    stack.push(node);
                }
                Event::Empty(event) => {
                    let node = element_from_event(&reader, &event)?;
                    attach_element(&stack, &mut root, &node);
                }
                Event::End(_) => {
                    stack.pop();
                }
                Event::Text(event) => {
                    let text = event.unescape().context("Failed to decode XML text")?;
                    if let Some(current) = stack.last() {
                        current.append_character_data(&text);
                    }
                }
                Event::CData(event) => {
                    let text = String::from_utf8_lossy(&event.into_inner()).into_owned();
                    if let Some(current) = stack.last() {
                        current.append_character_data(&text);
                    }
                }
                Event::Comment(event) => {
                    let text = event.unescape().context("Failed to decode XML comment")?;
                    if let Some(current) = stack.last() {
                        current.push_comment(text.into_owned());
                    } else if root.is_none() {
                        leading_comments.push(text.into_owned());
                    }
                }
                Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
                Event::Eof => break,
            }
        }

        let root = root.context("XML document has no root element")?;
        Ok(Self {
            root,
            leading_comments,
        })
    }

    pub fn root(&self) -> XmlNode {
        self.root.clone()
    }

    /// Look up a single node by path. The first segment must name the root
    /// element; the remaining segments walk down through child elements.
    pub fn find_first_node(&self, path: &[&str]) -> Option<XmlNode> {
        if path.is_empty() || self.root.name() != path[0] {
            return None;
        }

        self.root.find_first_node(&path[1..])
    }

    /// Look up every node matching the path, in document order.
    pub fn find_all_nodes(&self, path: &[&str]) -> Vec<XmlNode> {
        if path.is_empty() || self.root.name() != path[0] {
            return Vec::new();
        }

        self.root.find_all_nodes(&path[1..])
    }

    /// Serialize the document with an explicit declaration and a single
    /// default namespace inferred from the root element.
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        for comment in &self.leading_comments {
            out.push_str("<!--");
            out.push_str(comment);
            out.push_str("-->\n");
        }

        self.root.write_xml(&mut out, &self.root.namespace(), true);
        out.push('\n');
        out
    }

    /// Write the serialized document to disk, normalizing quoting so the
    /// output only carries double-quoted delimiters outside comments.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = normalize_quotes(&self.to_xml());
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write XML document to {:?}", path))?;

        debug!("Saved XML document to {:?}", path);
        Ok(())
    }
}

fn element_from_event(reader: &NsReader<&[u8]>, event: &BytesStart<'_>) -> Result<XmlNode> {
    let (resolve, local) = reader.resolve_element(event.name());
    let name = String::from_utf8_lossy(local.into_inner()).into_owned();
    let namespace = match resolve {
        ResolveResult::Bound(ns) => String::from_utf8_lossy(ns.into_inner()).into_owned(),
        _ => String::new(),
    };

    let mut attributes = Vec::new();
    for attribute in event.attributes() {
        let attribute = attribute.context("Failed to parse XML attribute")?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        // The default namespace is re-inferred on save; prefix declarations
        // are kept so prefixed attributes stay resolvable.
        if key == "xmlns" {
            continue;
        }
        let value = attribute
            .unescape_value()
            .context("Failed to decode XML attribute value")?
            .into_owned();
        attributes.push((key, value));
    }

    Ok(XmlNode::element(name, namespace, attributes))
}

fn attach_element(stack: &[XmlNode], root: &mut Option<XmlNode>, node: &XmlNode) {
    if let Some(parent) = stack.last() {
        parent.push_child(node.clone());
    } else if root.is_none() {
        *root = Some(node.clone());
    }
}

/// Rewrite single-quoted delimiters to double quotes, leaving comment lines
/// untouched.
fn normalize_quotes(content: &str) -> String {
    let mut result: String = content
        .lines()
        .map(|line| {
            if line.trim_start().starts_with("<!--") {
                line.to_string()
            } else {
                line.replace('\'', "\"")
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    if content.ends_with('\n') {
        result.push('\n');
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
    <groupId>com.example</groupId>
    <artifactId>application</artifactId>
    <!-- managed by the release tooling -->
    <version>13.3.7</version>
</project>
"#;

    #[test]
    fn test_find_root_node() {
        let document = XmlDocument::parse(DOCUMENT).unwrap();

        let root = document.find_first_node(&["project"]).unwrap();

        assert_eq!(root.name(), "project");
        assert_eq!(root.namespace(), "http://maven.apache.org/POM/4.0.0");
    }

    #[test]
    fn test_find_nested_node() {
        let document = XmlDocument::parse(DOCUMENT).unwrap();

        let version = document.find_first_node(&["project", "version"]).unwrap();

        assert_eq!(version.text(), Some("13.3.7".to_string()));
    }

    #[test]
    fn test_find_first_node_requires_matching_root() {
        let document = XmlDocument::parse(DOCUMENT).unwrap();

        assert!(document.find_first_node(&["not-project"]).is_none());
        assert!(document.find_first_node(&[]).is_none());
    }

    #[test]
    fn test_find_all_nodes() {
        let content = r#"<project>
    <dependencies>
        <dependency><artifactId>a</artifactId></dependency>
        <dependency><artifactId>b</artifactId></dependency>
    </dependencies>
</project>"#;
        let document = XmlDocument::parse(content).unwrap();

        let found = document.find_all_nodes(&["project", "dependencies", "dependency", "artifactId"]);

        let texts: Vec<String> = found.iter().filter_map(|node| node.text()).collect();
        assert_eq!(texts, vec!["a", "b"]);
    }

    #[test]
    fn test_mutation_is_visible_on_serialization() {
        let document = XmlDocument::parse(DOCUMENT).unwrap();

        let version = document.find_first_node(&["project", "version"]).unwrap();
        version.set_text("13.3.8");

        assert!(document.to_xml().contains("<version>13.3.8</version>"));
    }

    #[test]
    fn test_serialization_keeps_layout_and_comments() {
        let document = XmlDocument::parse(DOCUMENT).unwrap();

        let serialized = document.to_xml();

        assert!(serialized.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(serialized.contains("xmlns=\"http://maven.apache.org/POM/4.0.0\""));
        assert!(serialized.contains("    <groupId>com.example</groupId>"));
        assert!(serialized.contains("<!-- managed by the release tooling -->"));
    }

    #[test]
    fn test_save_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("pom.xml");

        let document = XmlDocument::parse(DOCUMENT).unwrap();
        document.save(&path).unwrap();

        let reloaded = XmlDocument::parse(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let version = reloaded.find_first_node(&["project", "version"]).unwrap();
        assert_eq!(version.text(), Some("13.3.7".to_string()));
    }

    #[test]
    fn test_escaped_text_round_trip() {
        let content = "<project><name>fast &amp; small</name></project>";
        let document = XmlDocument::parse(content).unwrap();

        let name = document.find_first_node(&["project", "name"]).unwrap();
        assert_eq!(name.text(), Some("fast & small".to_string()));
        assert!(document.to_xml().contains("fast &amp; small"));
    }

    #[test]
    fn test_normalize_quotes_skips_comment_lines() {
        let content = "<?xml version='1.0'?>\n<!-- don't touch this -->\n<project attr='x' />\n";

        let normalized = normalize_quotes(content);

        assert!(normalized.contains("<?xml version=\"1.0\"?>"));
        assert!(normalized.contains("<!-- don't touch this -->"));
        assert!(normalized.contains("attr=\"x\""));
        assert!(normalized.ends_with('\n'));
    }
}
