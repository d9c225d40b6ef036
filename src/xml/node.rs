use std::cell::RefCell;
use std::rc::Rc;

/// A single element inside a parsed XML document.
///
/// Nodes are shared handles into the tree owned by the enclosing
/// [`XmlDocument`](crate::xml::XmlDocument): cloning a node clones the
/// handle, not the element, so a value written through one handle is
/// observed by every other handle to the same element. Equality compares
/// handle identity, not content.
#[derive(Debug, Clone)]
pub struct XmlNode(Rc<RefCell<NodeData>>);

#[derive(Debug)]
struct NodeData {
    name: String,
    namespace: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    tail: Option<String>,
    children: Vec<XmlChild>,
}

/// Ordered content of an element: child elements interleaved with comments.
/// Comments carry their trailing whitespace so documents serialize back
/// with their original formatting.
#[derive(Debug)]
enum XmlChild {
    Element(XmlNode),
    Comment { text: String, tail: Option<String> },
}

impl XmlNode {
    pub(crate) fn element(name: String, namespace: String, attributes: Vec<(String, String)>) -> Self {
        Self(Rc::new(RefCell::new(NodeData {
            name,
            namespace,
            attributes,
            text: None,
            tail: None,
            children: Vec::new(),
        })))
    }

    /// Local tag name, without any namespace qualifier.
    pub fn name(&self) -> String {
        self.0.borrow().name.clone()
    }

    /// Namespace URI of the element, or an empty string when unbound.
    pub fn namespace(&self) -> String {
        self.0.borrow().namespace.clone()
    }

    /// Character data immediately following the start tag.
    pub fn text(&self) -> Option<String> {
        self.0.borrow().text.clone()
    }

    /// Replace the element's character data, mutating the owning document.
    pub fn set_text(&self, text: impl Into<String>) {
        self.0.borrow_mut().text = Some(text.into());
    }

    /// Child elements in document order. Comments are not included.
    pub fn nodes(&self) -> Vec<XmlNode> {
        self.0
            .borrow()
            .children
            .iter()
            .filter_map(|child| match child {
                XmlChild::Element(node) => Some(node.clone()),
                XmlChild::Comment { .. } => None,
            })
            .collect()
    }

    /// Walk down the tree matching children by local name.
    ///
    /// An empty path returns the node itself. At every level the first
    /// matching child is followed; there is no backtracking into later
    /// siblings.
    pub fn find_first_node(&self, path: &[&str]) -> Option<XmlNode> {
        if path.is_empty() {
            return Some(self.clone());
        }

        let next = self.nodes().into_iter().find(|node| node.name() == path[0])?;
        next.find_first_node(&path[1..])
    }

    /// Collect every node reachable through the path, in document order.
    pub fn find_all_nodes(&self, path: &[&str]) -> Vec<XmlNode> {
        if path.is_empty() {
            return vec![self.clone()];
        }

        let mut result = Vec::new();
        for child in self.nodes().into_iter().filter(|node| node.name() == path[0]) {
            result.extend(child.find_all_nodes(&path[1..]));
        }

        result
    }

    pub(crate) fn push_child(&self, child: XmlNode) {
        self.0.borrow_mut().children.push(XmlChild::Element(child));
    }

    pub(crate) fn push_comment(&self, text: String) {
        self.0
            .borrow_mut()
            .children
            .push(XmlChild::Comment { text, tail: None });
    }

    /// Attach character data the way a document builder sees it: text
    /// before the first child belongs to the element, text after a child
    /// belongs to that child's tail.
    pub(crate) fn append_character_data(&self, value: &str) {
        let mut data = self.0.borrow_mut();
        if data.children.is_empty() {
            data.text.get_or_insert_with(String::new).push_str(value);
            return;
        }

        match data.children.last_mut() {
            Some(XmlChild::Element(node)) => {
                node.0
                    .borrow_mut()
                    .tail
                    .get_or_insert_with(String::new)
                    .push_str(value);
            }
            Some(XmlChild::Comment { tail, .. }) => {
                tail.get_or_insert_with(String::new).push_str(value);
            }
            None => {}
        }
    }

    /// Serialize the element and everything below it.
    ///
    /// The root element carries the single default namespace declaration;
    /// descendants are written with bare local names and inherit it.
    pub(crate) fn write_xml(&self, out: &mut String, default_namespace: &str, is_root: bool) {
        let data = self.0.borrow();

        out.push('<');
        out.push_str(&data.name);
        if is_root && !default_namespace.is_empty() {
            out.push_str(" xmlns=\"");
            out.push_str(&escape_attribute(default_namespace));
            out.push('"');
        }
        for (key, value) in &data.attributes {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape_attribute(value));
            out.push('"');
        }

        if data.text.is_none() && data.children.is_empty() {
            out.push_str(" />");
        } else {
            out.push('>');
            if let Some(text) = &data.text {
                out.push_str(&escape_text(text));
            }
            for child in &data.children {
                match child {
                    XmlChild::Element(node) => node.write_xml(out, default_namespace, false),
                    XmlChild::Comment { text, tail } => {
                        out.push_str("<!--");
                        out.push_str(text);
                        out.push_str("-->");
                        if let Some(tail) = tail {
                            out.push_str(&escape_text(tail));
                        }
                    }
                }
            }
            out.push_str("</");
            out.push_str(&data.name);
            out.push('>');
        }

        if !is_root {
            if let Some(tail) = &data.tail {
                out.push_str(&escape_text(tail));
            }
        }
    }
}

impl PartialEq for XmlNode {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for XmlNode {}

fn escape_text(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(name: &str, namespace: &str) -> XmlNode {
        XmlNode::element(name.to_string(), namespace.to_string(), Vec::new())
    }

    #[test]
    fn test_name_and_namespace() {
        let node = element("artifactId", "http://maven.apache.org/POM/4.0.0");

        assert_eq!(node.name(), "artifactId");
        assert_eq!(node.namespace(), "http://maven.apache.org/POM/4.0.0");
    }

    #[test]
    fn test_set_text_is_visible_through_every_handle() {
        let node = element("version", "");
        node.set_text("1.0.0");

        let alias = node.clone();
        alias.set_text("2.0.0");

        assert_eq!(node.text(), Some("2.0.0".to_string()));
        assert_eq!(node, alias);
    }

    #[test]
    fn test_find_first_node_with_empty_path_returns_self() {
        let node = element("project", "");

        let found = node.find_first_node(&[]).unwrap();

        assert_eq!(found, node);
    }

    #[test]
    fn test_find_first_node_follows_first_match() {
        let root = element("project", "");
        let first = element("dependency", "");
        first.set_text("first");
        let second = element("dependency", "");
        second.set_text("second");
        root.push_child(first.clone());
        root.push_child(second);

        let found = root.find_first_node(&["dependency"]).unwrap();

        assert_eq!(found, first);
    }

    #[test]
    fn test_find_all_nodes_preserves_document_order() {
        let root = element("dependencies", "");
        for name in ["a", "b", "c"] {
            let child = element("dependency", "");
            child.set_text(name);
            root.push_child(child);
        }

        let found = root.find_all_nodes(&["dependency"]);

        let texts: Vec<String> = found.iter().filter_map(|node| node.text()).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_nodes_skips_comments() {
        let root = element("properties", "");
        root.push_comment(" release configuration ".to_string());
        root.push_child(element("this.version", ""));

        assert_eq!(root.nodes().len(), 1);
    }

    #[test]
    fn test_matching_ignores_namespace() {
        let root = element("project", "http://maven.apache.org/POM/4.0.0");
        let child = element("version", "urn:example:other");
        root.push_child(child.clone());

        assert_eq!(root.find_first_node(&["version"]), Some(child));
    }
}
