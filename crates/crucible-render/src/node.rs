//! Scene graph node types.
//!
//! Nodes live in the [`Document`](crate::tree::Document) arena and are
//! addressed by [`NodeId`]. An element owns its children and exactly one
//! layout node; raw text is a leaf without layout.

use crate::error::{RenderError, RenderResult};
use crate::layout::LayoutNodeId;
use crate::style::{
    AlignItems, BackgroundMode, Color, Dimension, Edges, FlexDirection, JustifyContent,
    LayoutStyle, Style, TextWrap,
};
use std::fmt;

/// Handle into the node arena. The generation makes stale handles detectable
/// after a slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Box,
    Text,
    Static,
}

impl ElementKind {
    /// Resolves a host element type name, including the `ink-` aliases.
    pub fn parse(kind: &str) -> RenderResult<Self> {
        match kind {
            "box" | "ink-box" => Ok(ElementKind::Box),
            "text" | "ink-text" => Ok(ElementKind::Text),
            "static" => Ok(ElementKind::Static),
            other => Err(RenderError::UnknownElementType {
                kind: other.to_string(),
            }),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ElementKind::Box => "box",
            ElementKind::Text => "text",
            ElementKind::Static => "static",
        }
    }
}

/// Attributes for every element kind. Kinds ignore what does not apply to
/// them (a box has no wrap mode).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Props {
    pub layout: LayoutStyle,
    pub style: Style,
    pub href: Option<String>,
    pub wrap: TextWrap,
    pub background: BackgroundMode,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row() -> Self {
        Self::new().direction(FlexDirection::Row)
    }

    pub fn column() -> Self {
        Self::new().direction(FlexDirection::Column)
    }

    pub fn direction(mut self, direction: FlexDirection) -> Self {
        self.layout.flex_direction = Some(direction);
        self
    }

    pub fn width(mut self, width: impl Into<Dimension>) -> Self {
        self.layout.width = Some(width.into());
        self
    }

    pub fn height(mut self, height: impl Into<Dimension>) -> Self {
        self.layout.height = Some(height.into());
        self
    }

    pub fn flex_grow(mut self, grow: f32) -> Self {
        self.layout.flex_grow = Some(grow);
        self
    }

    pub fn flex_shrink(mut self, shrink: f32) -> Self {
        self.layout.flex_shrink = Some(shrink);
        self
    }

    pub fn padding(mut self, padding: Edges) -> Self {
        self.layout.padding = padding;
        self
    }

    pub fn margin(mut self, margin: Edges) -> Self {
        self.layout.margin = margin;
        self
    }

    pub fn gap(mut self, gap: u16) -> Self {
        self.layout.column_gap = Some(gap);
        self.layout.row_gap = Some(gap);
        self
    }

    pub fn align_items(mut self, align: AlignItems) -> Self {
        self.layout.align_items = Some(align);
        self
    }

    pub fn justify_content(mut self, justify: JustifyContent) -> Self {
        self.layout.justify_content = Some(justify);
        self
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn fg(mut self, color: Color) -> Self {
        self.style.fg = Some(color);
        self
    }

    pub fn bg(mut self, color: Color) -> Self {
        self.style.bg = Some(color);
        self
    }

    pub fn bold(mut self) -> Self {
        self.style.bold = true;
        self
    }

    pub fn dim(mut self) -> Self {
        self.style.dim = true;
        self
    }

    pub fn href(mut self, url: impl Into<String>) -> Self {
        self.href = Some(url.into());
        self
    }

    pub fn wrap(mut self, wrap: TextWrap) -> Self {
        self.wrap = wrap;
        self
    }

    pub fn background(mut self, mode: BackgroundMode) -> Self {
        self.background = mode;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Element {
    pub kind: ElementKind,
    pub props: Props,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
    pub layout: LayoutNodeId,
    /// Children of a `Static` already written to scrollback.
    pub committed_count: usize,
}

#[derive(Debug, Clone)]
pub struct RawText {
    pub text: String,
    pub parent: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    RawText(RawText),
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        match self {
            Node::Element(el) => el.parent,
            Node::RawText(text) => text.parent,
        }
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        match self {
            Node::Element(el) => el.parent = parent,
            Node::RawText(text) => text.parent = parent,
        }
    }

    pub fn children(&self) -> &[NodeId] {
        match self {
            Node::Element(el) => &el.children,
            Node::RawText(_) => &[],
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::RawText(_) => None,
        }
    }

    /// Kind name used in nesting diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Element(el) => el.kind.name(),
            Node::RawText(_) => "raw text",
        }
    }
}
