//! Host-driven terminal rendering engine
//!
//! An external driver builds and mutates a tree of boxes and text through the
//! [`HostConfig`] protocol. The [`Runtime`] lays the tree out with flexbox in
//! terminal cells and writes it to a [`TerminalSink`]:
//!
//! - **Dynamic region**: redrawn in place on every render
//! - **Static region**: children of a `static` element are written once and
//!   scroll away with the terminal's own history
//! - **Throttled**: bursts of commits collapse into one trailing render
//!
//! # Architecture
//!
//! ```text
//! driver -> HostConfig -> Document (arena) -> LayoutEngine (taffy)
//!                              |
//!                          on_commit
//!                              v
//!            Runtime -> render (static + dynamic) -> OutputBuffer -> sink
//! ```

pub mod ansi;
pub mod cell_grid;
pub mod config;
pub mod error;
pub mod host;
pub mod layout;
pub mod node;
pub mod output;
pub mod render;
pub mod runtime;
pub mod style;
pub mod terminal;
pub mod testing;
pub mod text;
pub mod tree;
pub mod work_queue;

pub use config::{ExitMode, RenderConfig};
pub use error::{RenderError, RenderResult, SUPPORTED_ELEMENT_TYPES};
pub use host::{Container, Host, HostConfig};
pub use layout::{LayoutEngine, LayoutNodeId, LayoutRect, TextMeasure};
pub use node::{Element, ElementKind, Node, NodeId, Props, RawText};
pub use render::{extract_static, render_absolute, render_sequential, StaticExtraction};
pub use runtime::{Clock, Runtime, SystemClock};
pub use style::{
    AlignItems, BackgroundMode, Color, Dimension, Edges, FlexDirection, FlexWrap, JustifyContent,
    LayoutStyle, Style, TextWrap,
};
pub use terminal::{StdoutSink, TerminalSink};
pub use tree::Document;
pub use work_queue::WorkQueue;
