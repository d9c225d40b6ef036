pub mod document;
pub mod node;

pub use document::XmlDocument;
pub use node::XmlNode;
