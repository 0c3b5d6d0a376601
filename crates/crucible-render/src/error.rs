//! Error types for the rendering engine

use crate::node::NodeId;
use thiserror::Error;

/// Element kinds accepted by `create_instance`.
pub const SUPPORTED_ELEMENT_TYPES: &[&str] = &["box", "text", "static"];

/// Rendering engine error type
#[derive(Error, Debug)]
pub enum RenderError {
    /// The driver asked for an element kind this engine does not know.
    ///
    /// This is a configuration error between the driver and the engine and is
    /// never recovered from.
    #[error(
        "unknown element type `{kind}`; supported types are: box, text, static. \
         Common causes: nodes from a different UI tree kind were mixed into this one, \
         or the root container was wrapped twice"
    )]
    UnknownElementType { kind: String },

    /// A child was placed under a parent that cannot hold it
    #[error("`{child}` cannot be nested inside `{parent}`")]
    InvalidNesting {
        parent: &'static str,
        child: &'static str,
    },

    /// Inserting the child would make it its own ancestor
    #[error("inserting {child} under {parent} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },

    /// The id does not refer to a live node
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// The operation requires an element but got a raw text node
    #[error("node {0} is not an element")]
    NotAnElement(NodeId),

    /// The operation requires a raw text node but got an element
    #[error("node {0} is not a text node")]
    NotRawText(NodeId),

    /// A dimension string was not `auto`, a cell count or a percentage
    #[error("invalid dimension `{0}`; expected `auto`, a cell count or `N%`")]
    InvalidDimension(String),

    /// Underlying layout engine failure
    #[error("layout error: {0}")]
    Layout(#[from] taffy::TaffyError),

    /// Terminal sink failure
    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be parsed
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;
