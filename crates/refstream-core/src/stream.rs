//! The hierarchical stream event contract.
//!
//! Every physical encoding implements these two traits; the marshalling
//! strategies program against them and never see the transport.

use crate::StreamError;

/// System attribute carrying a node's runtime-type hint on backends that have
/// no native hint slot.
pub const CLASS_ATTRIBUTE: &str = "class";

/// Writer side of the event contract.
///
/// Calls must nest: every `start_node` is closed by a matching `end_node`.
/// Attributes are only valid while the node is fresh, before its value or its
/// first child. The canonical backends treat a text value and child nodes as
/// mutually exclusive and reject the mixed case.
pub trait StreamWriter {
    /// Opens a node. The optional type hint names the runtime type of the
    /// object the node carries, for polymorphic dispatch on the reading side.
    fn start_node(&mut self, name: &str, type_hint: Option<&str>) -> Result<(), StreamError>;

    /// Adds a (name, text) attribute to the currently open node.
    fn add_attribute(&mut self, name: &str, value: &str) -> Result<(), StreamError>;

    /// Sets the text value of the currently open node.
    fn set_value(&mut self, text: &str) -> Result<(), StreamError>;

    /// Closes the most recently opened node.
    fn end_node(&mut self) -> Result<(), StreamError>;
}

/// Reader side of the event contract.
///
/// A reader is positioned on the document root at construction. `move_down`
/// and `move_up` must nest exactly like `start_node`/`end_node` on the writer
/// side; calling `move_up` without a matching `move_down` is a programming
/// error and panics.
pub trait StreamReader {
    /// Returns `true` while the current node has unvisited children.
    fn has_more_children(&mut self) -> Result<bool, StreamError>;

    /// Moves to the next child of the current node.
    fn move_down(&mut self) -> Result<(), StreamError>;

    /// Returns to the parent node, skipping any unvisited content.
    fn move_up(&mut self) -> Result<(), StreamError>;

    /// Name of the current node.
    fn node_name(&self) -> &str;

    /// Runtime-type hint of the current node, if any.
    fn type_hint(&self) -> Option<&str>;

    /// Text value of the current node, if it has one.
    fn value(&mut self) -> Result<Option<String>, StreamError>;

    /// Looks up an attribute of the current node by name.
    fn attribute(&self, name: &str) -> Option<&str>;

    /// Attribute names of the current node, in stream order.
    fn attribute_names(&self) -> Vec<&str>;
}
