//! Flexbox layout in terminal cells, backed by taffy.
//!
//! The engine mirrors the element tree: every element owns one layout node
//! and layout children follow element children in order. Text elements carry
//! a [`TextMeasure`] context so taffy can ask how tall wrapped content is.

use crate::error::RenderResult;
use crate::style::{self, Dimension, LayoutStyle, TextWrap};
use crate::text;
use taffy::prelude::*;

pub type LayoutNodeId = taffy::NodeId;

/// Measure context for text leaves.
#[derive(Debug, Clone, PartialEq)]
pub struct TextMeasure {
    pub content: String,
    pub wrap: TextWrap,
}

impl TextMeasure {
    fn measure(&self, known: Size<Option<f32>>, available: Size<AvailableSpace>) -> Size<f32> {
        if let Size {
            width: Some(width),
            height: Some(height),
        } = known
        {
            return Size { width, height };
        }

        let limit = known.width.map(|w| w.max(0.0) as usize).or(match available.width {
            AvailableSpace::Definite(w) => Some(w.max(0.0) as usize),
            AvailableSpace::MinContent => Some(self.min_content_width()),
            AvailableSpace::MaxContent => None,
        });
        let (width, height) = text::measure(&self.content, self.wrap, limit);

        Size {
            width: known.width.unwrap_or(width as f32),
            height: known.height.unwrap_or(height as f32),
        }
    }

    fn min_content_width(&self) -> usize {
        match self.wrap {
            TextWrap::Wrap => self
                .content
                .split_whitespace()
                .map(crate::ansi::visible_width)
                .max()
                .unwrap_or(0)
                .max(1),
            _ => 1,
        }
    }
}

/// Resolved position and size in cells. `left`/`top` are relative to the
/// parent's origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutRect {
    pub left: u16,
    pub top: u16,
    pub width: u16,
    pub height: u16,
}

pub struct LayoutEngine {
    tree: TaffyTree<TextMeasure>,
    computed_width: Option<u16>,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self {
            tree: TaffyTree::new(),
            computed_width: None,
        }
    }

    pub fn create_node(&mut self) -> RenderResult<LayoutNodeId> {
        Ok(self.tree.new_leaf(Style::default())?)
    }

    /// Writes the set attributes of `layout` onto the node; unset attributes
    /// keep their prior values.
    pub fn apply_style(&mut self, node: LayoutNodeId, layout: &LayoutStyle) -> RenderResult<()> {
        let mut style = self.tree.style(node)?.clone();

        if let Some(direction) = layout.flex_direction {
            style.flex_direction = match direction {
                style::FlexDirection::Row => FlexDirection::Row,
                style::FlexDirection::Column => FlexDirection::Column,
                style::FlexDirection::RowReverse => FlexDirection::RowReverse,
                style::FlexDirection::ColumnReverse => FlexDirection::ColumnReverse,
            };
        }
        if let Some(wrap) = layout.flex_wrap {
            style.flex_wrap = match wrap {
                style::FlexWrap::NoWrap => FlexWrap::NoWrap,
                style::FlexWrap::Wrap => FlexWrap::Wrap,
                style::FlexWrap::WrapReverse => FlexWrap::WrapReverse,
            };
        }
        if let Some(grow) = layout.flex_grow {
            style.flex_grow = grow;
        }
        if let Some(shrink) = layout.flex_shrink {
            style.flex_shrink = shrink;
        }
        if let Some(basis) = layout.flex_basis {
            style.flex_basis = dimension(basis);
        }
        if let Some(align) = layout.align_items {
            style.align_items = Some(align_items(align));
        }
        if let Some(align) = layout.align_self {
            style.align_self = Some(align_items(align));
        }
        if let Some(justify) = layout.justify_content {
            style.justify_content = Some(match justify {
                style::JustifyContent::Start => JustifyContent::Start,
                style::JustifyContent::End => JustifyContent::End,
                style::JustifyContent::Center => JustifyContent::Center,
                style::JustifyContent::SpaceBetween => JustifyContent::SpaceBetween,
                style::JustifyContent::SpaceAround => JustifyContent::SpaceAround,
                style::JustifyContent::SpaceEvenly => JustifyContent::SpaceEvenly,
            });
        }

        let edges = &layout.padding;
        for (value, slot) in [
            (edges.top, &mut style.padding.top),
            (edges.right, &mut style.padding.right),
            (edges.bottom, &mut style.padding.bottom),
            (edges.left, &mut style.padding.left),
        ] {
            if let Some(v) = value {
                *slot = length(v as f32);
            }
        }
        let edges = &layout.margin;
        for (value, slot) in [
            (edges.top, &mut style.margin.top),
            (edges.right, &mut style.margin.right),
            (edges.bottom, &mut style.margin.bottom),
            (edges.left, &mut style.margin.left),
        ] {
            if let Some(v) = value {
                *slot = length(v as f32);
            }
        }

        if let Some(gap) = layout.column_gap {
            style.gap.width = length(gap as f32);
        }
        if let Some(gap) = layout.row_gap {
            style.gap.height = length(gap as f32);
        }

        for (value, slot) in [
            (layout.width, &mut style.size.width),
            (layout.height, &mut style.size.height),
            (layout.min_width, &mut style.min_size.width),
            (layout.min_height, &mut style.min_size.height),
            (layout.max_width, &mut style.max_size.width),
            (layout.max_height, &mut style.max_size.height),
        ] {
            if let Some(d) = value {
                *slot = dimension(d);
            }
        }

        self.tree.set_style(node, style)?;
        Ok(())
    }

    pub fn set_text_measure(
        &mut self,
        node: LayoutNodeId,
        measure: Option<TextMeasure>,
    ) -> RenderResult<()> {
        self.tree.set_node_context(node, measure)?;
        Ok(())
    }

    /// Places `child` at `index` under `parent`, detaching it from any
    /// previous layout parent first.
    pub fn insert_child(
        &mut self,
        parent: LayoutNodeId,
        child: LayoutNodeId,
        index: usize,
    ) -> RenderResult<()> {
        if let Some(previous) = self.tree.parent(child) {
            self.tree.remove_child(previous, child)?;
        }
        let index = index.min(self.tree.child_count(parent));
        self.tree.insert_child_at_index(parent, index, child)?;
        Ok(())
    }

    pub fn remove_child(&mut self, parent: LayoutNodeId, child: LayoutNodeId) -> RenderResult<()> {
        self.tree.remove_child(parent, child)?;
        Ok(())
    }

    pub fn children(&self, node: LayoutNodeId) -> RenderResult<Vec<LayoutNodeId>> {
        Ok(self.tree.children(node)?)
    }

    /// Releases `node` and every layout descendant.
    pub fn free(&mut self, node: LayoutNodeId) -> RenderResult<()> {
        for child in self.tree.children(node)? {
            self.free(child)?;
        }
        self.tree.remove(node)?;
        Ok(())
    }

    /// Full layout pass. The root's width is pinned to `container_width`;
    /// height follows content.
    pub fn compute_layout(&mut self, root: LayoutNodeId, container_width: u16) -> RenderResult<()> {
        let width = container_width as f32;
        let mut style = self.tree.style(root)?.clone();
        style.size.width = length(width);
        self.tree.set_style(root, style)?;

        let available = Size {
            width: AvailableSpace::Definite(width),
            height: AvailableSpace::MaxContent,
        };
        self.tree.compute_layout_with_measure(
            root,
            available,
            |known, available, _node, context: Option<&mut TextMeasure>, _style| match context {
                Some(measure) => measure.measure(known, available),
                None => Size::ZERO,
            },
        )?;

        self.computed_width = Some(container_width);
        Ok(())
    }

    pub fn layout(&self, node: LayoutNodeId) -> RenderResult<LayoutRect> {
        let layout = self.tree.layout(node)?;
        Ok(LayoutRect {
            left: to_cells(layout.location.x),
            top: to_cells(layout.location.y),
            width: to_cells(layout.size.width),
            height: to_cells(layout.size.height),
        })
    }

    /// Container width of the last layout pass, `None` before the first one.
    pub fn computed_width(&self) -> Option<u16> {
        self.computed_width
    }

    pub fn total_node_count(&self) -> usize {
        self.tree.total_node_count()
    }
}

fn to_cells(value: f32) -> u16 {
    value.round().clamp(0.0, u16::MAX as f32) as u16
}

fn dimension(d: Dimension) -> taffy::Dimension {
    match d {
        Dimension::Auto => auto(),
        Dimension::Cells(n) => length(n as f32),
        Dimension::Percent(p) => percent(p / 100.0),
    }
}

fn align_items(align: style::AlignItems) -> AlignItems {
    match align {
        style::AlignItems::Start => AlignItems::Start,
        style::AlignItems::End => AlignItems::End,
        style::AlignItems::Center => AlignItems::Center,
        style::AlignItems::Stretch => AlignItems::Stretch,
        style::AlignItems::Baseline => AlignItems::Baseline,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Edges;

    fn column() -> LayoutStyle {
        LayoutStyle {
            flex_direction: Some(style::FlexDirection::Column),
            ..Default::default()
        }
    }

    fn text_leaf(engine: &mut LayoutEngine, content: &str) -> LayoutNodeId {
        let node = engine.create_node().unwrap();
        engine
            .set_text_measure(
                node,
                Some(TextMeasure {
                    content: content.to_string(),
                    wrap: TextWrap::Wrap,
                }),
            )
            .unwrap();
        node
    }

    #[test]
    fn computed_width_is_none_before_first_pass() {
        let engine = LayoutEngine::new();
        assert_eq!(engine.computed_width(), None);
    }

    #[test]
    fn root_width_is_pinned_to_container() {
        let mut engine = LayoutEngine::new();
        let root = engine.create_node().unwrap();
        engine
            .apply_style(root, &LayoutStyle {
                width: Some(Dimension::Cells(5)),
                ..Default::default()
            })
            .unwrap();

        engine.compute_layout(root, 40).unwrap();

        assert_eq!(engine.layout(root).unwrap().width, 40);
        assert_eq!(engine.computed_width(), Some(40));
    }

    #[test]
    fn percent_resolves_against_parent_width() {
        let mut engine = LayoutEngine::new();
        let root = engine.create_node().unwrap();
        let child = engine.create_node().unwrap();
        engine.apply_style(root, &column()).unwrap();
        engine
            .apply_style(child, &LayoutStyle {
                width: Some("50%".parse().unwrap()),
                ..Default::default()
            })
            .unwrap();
        engine.insert_child(root, child, 0).unwrap();

        engine.compute_layout(root, 30).unwrap();

        assert_eq!(engine.layout(child).unwrap().width, 15);
    }

    #[test]
    fn text_measure_drives_height() {
        let mut engine = LayoutEngine::new();
        let root = engine.create_node().unwrap();
        engine.apply_style(root, &column()).unwrap();
        let text = text_leaf(&mut engine, "one two three");
        engine.insert_child(root, text, 0).unwrap();

        engine.compute_layout(root, 9).unwrap();

        let rect = engine.layout(text).unwrap();
        assert_eq!(rect.height, 2);
        assert_eq!(engine.layout(root).unwrap().height, 2);
    }

    #[test]
    fn column_children_stack_with_padding_and_gap() {
        let mut engine = LayoutEngine::new();
        let root = engine.create_node().unwrap();
        engine
            .apply_style(root, &LayoutStyle {
                padding: Edges::all(1),
                row_gap: Some(1),
                ..column()
            })
            .unwrap();
        let a = text_leaf(&mut engine, "a");
        let b = text_leaf(&mut engine, "b");
        engine.insert_child(root, a, 0).unwrap();
        engine.insert_child(root, b, 1).unwrap();

        engine.compute_layout(root, 10).unwrap();

        let a_rect = engine.layout(a).unwrap();
        let b_rect = engine.layout(b).unwrap();
        assert_eq!((a_rect.left, a_rect.top), (1, 1));
        assert_eq!(b_rect.top, 3);
        assert_eq!(engine.layout(root).unwrap().height, 5);
    }

    #[test]
    fn apply_style_is_a_merge() {
        let mut engine = LayoutEngine::new();
        let root = engine.create_node().unwrap();
        let child = engine.create_node().unwrap();
        engine.apply_style(root, &column()).unwrap();
        engine
            .apply_style(child, &LayoutStyle {
                width: Some(Dimension::Cells(4)),
                height: Some(Dimension::Cells(2)),
                ..Default::default()
            })
            .unwrap();
        engine
            .apply_style(child, &LayoutStyle {
                height: Some(Dimension::Cells(3)),
                ..Default::default()
            })
            .unwrap();
        engine.insert_child(root, child, 0).unwrap();

        engine.compute_layout(root, 10).unwrap();

        let rect = engine.layout(child).unwrap();
        assert_eq!((rect.width, rect.height), (4, 3));
    }

    #[test]
    fn reinserting_moves_between_parents() {
        let mut engine = LayoutEngine::new();
        let a = engine.create_node().unwrap();
        let b = engine.create_node().unwrap();
        let child = engine.create_node().unwrap();

        engine.insert_child(a, child, 0).unwrap();
        engine.insert_child(b, child, 0).unwrap();

        assert!(engine.children(a).unwrap().is_empty());
        assert_eq!(engine.children(b).unwrap(), vec![child]);
    }

    #[test]
    fn free_releases_descendants() {
        let mut engine = LayoutEngine::new();
        let root = engine.create_node().unwrap();
        let mid = engine.create_node().unwrap();
        let leaf = engine.create_node().unwrap();
        engine.insert_child(root, mid, 0).unwrap();
        engine.insert_child(mid, leaf, 0).unwrap();

        engine.free(mid).unwrap();

        assert_eq!(engine.total_node_count(), 1);
        assert!(engine.children(root).unwrap().is_empty());
    }
}
