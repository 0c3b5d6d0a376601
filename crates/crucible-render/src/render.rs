//! Turns a laid-out element tree into terminal lines.
//!
//! Two strategies are provided. [`render_sequential`] walks the tree and lets
//! text decide its own height, which is what the runtime uses for both the
//! dynamic region and static extraction. [`render_absolute`] paints every
//! text at its computed position into a [`CellGrid`] and trusts layout
//! heights completely.

use crate::ansi::{clear_until_newline, hyperlink, visible_width};
use crate::cell_grid::CellGrid;
use crate::error::RenderResult;
use crate::node::{Element, ElementKind, Node, NodeId, Props};
use crate::style::{reset, BackgroundMode, Dimension, FlexDirection, LayoutStyle, TextWrap};
use crate::text::{layout_text, measure};
use crate::tree::Document;

/// Newly extracted static output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticExtraction {
    /// Lines for children past the element's `committed_count`.
    pub lines: Vec<String>,
    /// The static element found, if any.
    pub element: Option<NodeId>,
    /// Child count of the static element; the new `committed_count` once
    /// `lines` have been written.
    pub total: usize,
}

/// Renders `node` without relying on measured text heights.
///
/// Row boxes lay their text children side by side and then stack nested box
/// children below; column boxes stack every child. `Static` elements are
/// skipped.
pub fn render_sequential(doc: &Document, node: NodeId, width: u16) -> RenderResult<Vec<String>> {
    Sequential::new(doc).node(node, width as usize)
}

/// Renders the first `Static` element's uncommitted children.
///
/// The children are assembled with the static element's own direction, gap
/// and horizontal padding, so a batch extracted later lines up with what was
/// written before it. Pure: `committed_count` is not advanced, so repeated
/// calls return the same lines until the caller records `total`.
pub fn extract_static(
    doc: &Document,
    root: NodeId,
    width: u16,
) -> RenderResult<StaticExtraction> {
    let Some(element) = doc.find_static(root) else {
        return Ok(StaticExtraction::default());
    };

    let el = doc.element(element)?;
    let total = el.children.len();
    let start = el.committed_count.min(total);
    let layout = &el.props.layout;
    let renderer = Sequential::new(doc);

    let inner = box_width(layout, width as usize)
        .saturating_sub(layout.padding.horizontal() as usize);
    let pending = &el.children[start..];
    let mut lines = Vec::new();
    // Statics stack their children unless a direction was set explicitly.
    if layout.flex_direction.is_some_and(FlexDirection::is_row) {
        lines.extend(renderer.row(layout, pending, inner)?);
    } else {
        let body = renderer.column(layout, pending, inner)?;
        if start > 0 && !body.is_empty() {
            lines.extend(blank_lines(layout.row_gap.unwrap_or(0) as usize));
        }
        lines.extend(body);
    }
    let indent_by = layout.margin.left_or_zero() + layout.padding.left_or_zero();
    let lines = lines.into_iter().map(|line| indent(line, indent_by)).collect();

    Ok(StaticExtraction {
        lines,
        element: Some(element),
        total,
    })
}

/// Paints every text at its computed position. Requires a layout pass.
pub fn render_absolute(doc: &Document, root: NodeId) -> RenderResult<Vec<String>> {
    if doc.computed_width().is_none() {
        return Ok(Vec::new());
    }
    let rect = doc.layout_rect(root)?;
    let mut grid = CellGrid::new(rect.width as usize, rect.height as usize);
    paint(doc, root, 0, 0, &mut grid)?;
    Ok(grid.to_lines())
}

fn paint(
    doc: &Document,
    id: NodeId,
    origin_x: usize,
    origin_y: usize,
    grid: &mut CellGrid,
) -> RenderResult<()> {
    let Node::Element(el) = doc.get(id)? else {
        return Ok(());
    };
    let rect = doc.layout_rect(id)?;
    let x = origin_x + rect.left as usize;
    let y = origin_y + rect.top as usize;

    match el.kind {
        ElementKind::Text => {
            let pad = &el.props.layout.padding;
            let inner = (rect.width as usize).saturating_sub(pad.horizontal() as usize);
            let content = doc.text_content(id)?;
            let mut lines: Vec<String> = layout_text(&content, Some(inner), el.props.wrap)
                .iter()
                .map(|line| decorate(line, &el.props))
                .collect();
            lines.truncate(rect.height as usize);
            let left = x + pad.left_or_zero() as usize;
            grid.write_lines(left, y + pad.top_or_zero() as usize, &lines);
        }
        ElementKind::Box | ElementKind::Static => {
            for &child in &el.children {
                paint(doc, child, x, y, grid)?;
            }
        }
    }
    Ok(())
}

/// Applies text style and hyperlink to one laid-out line.
pub fn decorate(line: &str, props: &Props) -> String {
    if line.is_empty() {
        return String::new();
    }
    let painted = props.style.paint(line);
    match &props.href {
        Some(url) => hyperlink(&painted, url),
        None => painted,
    }
}

struct Sequential<'a> {
    doc: &'a Document,
    laid_out: bool,
}

impl<'a> Sequential<'a> {
    fn new(doc: &'a Document) -> Self {
        Self {
            doc,
            laid_out: doc.computed_width().is_some(),
        }
    }

    fn node(&self, id: NodeId, width: usize) -> RenderResult<Vec<String>> {
        match self.doc.get(id)? {
            Node::RawText(raw) => Ok(layout_text(&raw.text, Some(width), TextWrap::Wrap)),
            Node::Element(el) => match el.kind {
                ElementKind::Static => Ok(Vec::new()),
                ElementKind::Text => self.text(id, el, width),
                ElementKind::Box => self.boxed(id, el, width),
            },
        }
    }

    fn text(&self, id: NodeId, el: &Element, width: usize) -> RenderResult<Vec<String>> {
        let layout = &el.props.layout;
        let inner = box_width(layout, width).saturating_sub(layout.padding.horizontal() as usize);
        let content = self.doc.text_content(id)?;
        let body = layout_text(&content, Some(inner), el.props.wrap)
            .iter()
            .map(|line| decorate(line, &el.props))
            .collect();
        Ok(surround(body, layout))
    }

    fn boxed(&self, id: NodeId, el: &Element, width: usize) -> RenderResult<Vec<String>> {
        let layout = &el.props.layout;
        let pad = &layout.padding;
        let outer = box_width(layout, width);
        let inner = outer.saturating_sub(pad.horizontal() as usize);

        let children = self.ordered_children(el);
        let body = if layout.direction().is_row() {
            self.row(layout, &children, inner)?
        } else {
            self.column(layout, &children, inner)?
        };

        let mut lines = Vec::with_capacity(body.len() + 2);
        lines.extend(blank_lines(pad.top_or_zero() as usize));
        lines.extend(body.into_iter().map(|line| indent(line, pad.left_or_zero())));
        lines.extend(blank_lines(pad.bottom_or_zero() as usize));

        if !layout.direction().is_row() && self.laid_out && has_height_constraint(&el.props) {
            let height = self.doc.layout_rect(id)?.height as usize;
            lines.truncate(height);
        }

        if let Some(bg) = el.props.style.bg {
            let open = bg.bg_sequence();
            lines = lines
                .into_iter()
                .map(|line| fill_background(&line, &open, el.props.background, outer))
                .collect();
        }

        Ok(with_margin(lines, layout))
    }

    fn ordered_children(&self, el: &Element) -> Vec<NodeId> {
        let mut children = el.children.clone();
        if matches!(
            el.props.layout.direction(),
            FlexDirection::RowReverse | FlexDirection::ColumnReverse
        ) {
            children.reverse();
        }
        children
    }

    fn column(
        &self,
        layout: &LayoutStyle,
        children: &[NodeId],
        width: usize,
    ) -> RenderResult<Vec<String>> {
        let gap = layout.row_gap.unwrap_or(0) as usize;
        let mut lines = Vec::new();
        let mut first = true;

        for &child in children {
            if self.doc.kind(child)? == Some(ElementKind::Static) {
                continue;
            }
            let child_lines = self.node(child, width)?;
            if !first {
                lines.extend(blank_lines(gap));
            }
            first = false;
            lines.extend(child_lines);
        }
        Ok(lines)
    }

    fn row(
        &self,
        layout: &LayoutStyle,
        children: &[NodeId],
        width: usize,
    ) -> RenderResult<Vec<String>> {
        let gap = layout.column_gap.unwrap_or(0) as usize;

        let mut texts = Vec::new();
        let mut boxes = Vec::new();
        for &child in children {
            match self.doc.kind(child)? {
                Some(ElementKind::Text) => texts.push(child),
                Some(ElementKind::Box) => boxes.push(child),
                Some(ElementKind::Static) | None => {}
            }
        }

        let mut blocks: Vec<(Vec<String>, usize)> = Vec::with_capacity(texts.len());
        let mut remaining = width;
        for (i, &text) in texts.iter().enumerate() {
            // Texts past the right edge are dropped rather than overflowing.
            if remaining == 0 {
                break;
            }
            let text_el = self.doc.element(text)?;
            let spacing = &text_el.props.layout;
            let chrome = (spacing.padding.horizontal() + spacing.margin.horizontal()) as usize;
            let last = i + 1 == texts.len();
            let wanted = if self.laid_out {
                self.doc.layout_rect(text)?.width as usize + spacing.margin.horizontal() as usize
            } else if last {
                remaining
            } else {
                let content = self.doc.text_content(text)?;
                measure(&content, text_el.props.wrap, None).0 + chrome
            };
            let allotted = wanted.min(remaining);
            let lines = self.text(text, text_el, allotted)?;
            let right = (spacing.padding.right_or_zero() + spacing.margin.right_or_zero()) as usize;
            let block_width = match lines.iter().map(|l| visible_width(l)).max() {
                Some(widest) => (widest + right).min(allotted),
                None => 0,
            };
            remaining = remaining.saturating_sub(block_width + gap);
            blocks.push((lines, block_width));
        }

        let height = blocks.iter().map(|(lines, _)| lines.len()).max().unwrap_or(0);
        let mut lines = Vec::with_capacity(height);
        for row in 0..height {
            let mut line = String::new();
            for (j, (block, block_width)) in blocks.iter().enumerate() {
                if j > 0 {
                    line.push_str(&" ".repeat(gap));
                }
                let segment = block.get(row).map(String::as_str).unwrap_or("");
                line.push_str(segment);
                if j + 1 < blocks.len() {
                    let fill = block_width.saturating_sub(visible_width(segment));
                    line.push_str(&" ".repeat(fill));
                }
            }
            lines.push(line.trim_end_matches(' ').to_string());
        }

        for child in boxes {
            lines.extend(self.node(child, width)?);
        }
        Ok(lines)
    }
}

/// Width of an element's border box within `width` cells, after margins.
fn box_width(layout: &LayoutStyle, width: usize) -> usize {
    let available = width.saturating_sub(layout.margin.horizontal() as usize);
    match layout.width {
        Some(Dimension::Cells(n)) => (n as usize).min(available),
        Some(Dimension::Percent(p)) => {
            ((available as f32 * p / 100.0).round() as usize).min(available)
        }
        _ => available,
    }
}

/// Adds padding then margin around already laid-out content lines.
fn surround(body: Vec<String>, layout: &LayoutStyle) -> Vec<String> {
    if body.is_empty() {
        return body;
    }
    let pad = &layout.padding;
    let mut lines = Vec::with_capacity(body.len() + 2);
    lines.extend(blank_lines(pad.top_or_zero() as usize));
    lines.extend(body.into_iter().map(|line| indent(line, pad.left_or_zero())));
    lines.extend(blank_lines(pad.bottom_or_zero() as usize));
    with_margin(lines, layout)
}

fn with_margin(lines: Vec<String>, layout: &LayoutStyle) -> Vec<String> {
    let margin = &layout.margin;
    let mut out = Vec::with_capacity(lines.len() + 2);
    out.extend(blank_lines(margin.top_or_zero() as usize));
    out.extend(lines.into_iter().map(|line| indent(line, margin.left_or_zero())));
    out.extend(blank_lines(margin.bottom_or_zero() as usize));
    out
}

fn has_height_constraint(props: &Props) -> bool {
    let constrained =
        |d: Option<Dimension>| matches!(d, Some(Dimension::Cells(_) | Dimension::Percent(_)));
    constrained(props.layout.height) || constrained(props.layout.max_height)
}

fn blank_lines(count: usize) -> impl Iterator<Item = String> {
    std::iter::repeat_with(String::new).take(count)
}

/// Shifts a line right. Lines with nothing visible are left alone.
fn indent(line: String, by: u16) -> String {
    if by == 0 || visible_width(&line) == 0 {
        return line;
    }
    format!("{}{}", " ".repeat(by as usize), line)
}

/// Colors a line's background. Nested resets would end the background
/// early, so it is reopened after each one.
fn fill_background(line: &str, open: &str, mode: BackgroundMode, width: usize) -> String {
    let reset = reset();
    let reopened = line.replace(&reset, &format!("{reset}{open}"));
    match mode {
        BackgroundMode::Inline if line.is_empty() => String::new(),
        BackgroundMode::Inline => format!("{open}{reopened}{reset}"),
        BackgroundMode::Extend => {
            let fill = width.saturating_sub(visible_width(line));
            format!(
                "{open}{reopened}{}{}{reset}",
                " ".repeat(fill),
                clear_until_newline()
            )
        }
    }
}
