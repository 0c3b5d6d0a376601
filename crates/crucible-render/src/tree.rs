//! Arena-backed scene graph.
//!
//! Children are held by id, parents are a lookup-only back reference, and
//! every structural change is mirrored into the [`LayoutEngine`] so layout
//! children always follow element children in order.

use crate::error::{RenderError, RenderResult};
use crate::layout::{LayoutEngine, LayoutRect, TextMeasure};
use crate::node::{Element, ElementKind, Node, NodeId, Props, RawText};
use crate::style::{FlexDirection, LayoutStyle};

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

pub struct Document {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
    layout: LayoutEngine,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
            layout: LayoutEngine::new(),
        }
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.generation = slot.generation.wrapping_add(1);
            slot.node = Some(node);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            index,
            generation: 0,
        }
    }

    pub fn create_element(&mut self, kind: ElementKind, props: Props) -> RenderResult<NodeId> {
        let layout = self.layout.create_node()?;
        let mut style = LayoutStyle::default();
        if kind == ElementKind::Static {
            // Static children stack like log lines unless told otherwise.
            style.flex_direction = Some(FlexDirection::Column);
        }
        style.merge(&props.layout);
        self.layout.apply_style(layout, &style)?;
        if kind == ElementKind::Text {
            self.layout.set_text_measure(
                layout,
                Some(TextMeasure {
                    content: String::new(),
                    wrap: props.wrap,
                }),
            )?;
        }

        Ok(self.alloc(Node::Element(Element {
            kind,
            props,
            children: Vec::new(),
            parent: None,
            layout,
            committed_count: 0,
        })))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(Node::RawText(RawText {
            text: text.into(),
            parent: None,
        }))
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_ok()
    }

    pub fn get(&self, id: NodeId) -> RenderResult<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
            .ok_or(RenderError::NodeNotFound(id))
    }

    fn get_mut(&mut self, id: NodeId) -> RenderResult<&mut Node> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
            .ok_or(RenderError::NodeNotFound(id))
    }

    pub fn element(&self, id: NodeId) -> RenderResult<&Element> {
        match self.get(id)? {
            Node::Element(el) => Ok(el),
            Node::RawText(_) => Err(RenderError::NotAnElement(id)),
        }
    }

    fn element_mut(&mut self, id: NodeId) -> RenderResult<&mut Element> {
        match self.get_mut(id)? {
            Node::Element(el) => Ok(el),
            Node::RawText(_) => Err(RenderError::NotAnElement(id)),
        }
    }

    /// Element kind, or `None` for raw text.
    pub fn kind(&self, id: NodeId) -> RenderResult<Option<ElementKind>> {
        Ok(self.get(id)?.as_element().map(|el| el.kind))
    }

    pub fn children(&self, id: NodeId) -> RenderResult<&[NodeId]> {
        Ok(self.get(id)?.children())
    }

    pub fn parent(&self, id: NodeId) -> RenderResult<Option<NodeId>> {
        Ok(self.get(id)?.parent())
    }

    /// True when `ancestor` lies on the parent chain of `node`.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.get(node).ok().and_then(Node::parent);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.get(id).ok().and_then(Node::parent);
        }
        false
    }

    pub fn append(&mut self, parent: NodeId, child: NodeId) -> RenderResult<()> {
        self.insert(parent, child, None)
    }

    /// Inserts `child` before `before`; appends when `before` is not a
    /// current child of `parent`.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        before: NodeId,
    ) -> RenderResult<()> {
        self.insert(parent, child, Some(before))
    }

    fn insert(
        &mut self,
        parent: NodeId,
        child: NodeId,
        before: Option<NodeId>,
    ) -> RenderResult<()> {
        self.check_insert(parent, child)?;
        self.detach(child)?;

        let children = &self.element(parent)?.children;
        let position = before
            .and_then(|b| children.iter().position(|&c| c == b))
            .unwrap_or(children.len());

        let child_layout = self.get(child)?.as_element().map(|el| el.layout);
        if let Some(child_layout) = child_layout {
            let parent_el = self.element(parent)?;
            let layout_index = parent_el.children[..position]
                .iter()
                .filter(|&&c| matches!(self.get(c), Ok(Node::Element(_))))
                .count();
            let parent_layout = parent_el.layout;
            self.layout
                .insert_child(parent_layout, child_layout, layout_index)?;
        }

        self.element_mut(parent)?.children.insert(position, child);
        self.get_mut(child)?.set_parent(Some(parent));

        if self.kind(parent)? == Some(ElementKind::Text) {
            self.refresh_measure(parent)?;
        }
        Ok(())
    }

    fn check_insert(&self, parent: NodeId, child: NodeId) -> RenderResult<()> {
        let parent_node = self.get(parent)?;
        let child_node = self.get(child)?;
        let Node::Element(parent_el) = parent_node else {
            return Err(RenderError::NotAnElement(parent));
        };

        if child == parent || self.is_ancestor(child, parent) {
            return Err(RenderError::Cycle { parent, child });
        }

        let invalid = match (parent_el.kind, child_node) {
            (ElementKind::Text, Node::Element(_)) => true,
            (ElementKind::Text, Node::RawText(_)) => false,
            (_, Node::RawText(_)) => true,
            (_, Node::Element(_)) => false,
        };
        if invalid {
            return Err(RenderError::InvalidNesting {
                parent: parent_node.kind_name(),
                child: child_node.kind_name(),
            });
        }
        Ok(())
    }

    /// Removes `child` from `parent` without destroying it. Does nothing when
    /// `child` is not currently a child of `parent`.
    pub fn remove(&mut self, parent: NodeId, child: NodeId) -> RenderResult<()> {
        let Some(position) = self
            .element(parent)?
            .children
            .iter()
            .position(|&c| c == child)
        else {
            return Ok(());
        };

        self.element_mut(parent)?.children.remove(position);
        self.get_mut(child)?.set_parent(None);

        if let Some(child_layout) = self.get(child)?.as_element().map(|el| el.layout) {
            let parent_layout = self.element(parent)?.layout;
            self.layout.remove_child(parent_layout, child_layout)?;
        }
        if self.kind(parent)? == Some(ElementKind::Text) {
            self.refresh_measure(parent)?;
        }
        Ok(())
    }

    fn detach(&mut self, child: NodeId) -> RenderResult<()> {
        match self.get(child)?.parent() {
            Some(parent) => self.remove(parent, child),
            None => Ok(()),
        }
    }

    /// Detaches `id` and frees it together with every descendant and their
    /// layout nodes.
    pub fn destroy(&mut self, id: NodeId) -> RenderResult<()> {
        self.detach(id)?;
        let layout = self.get(id)?.as_element().map(|el| el.layout);
        if let Some(layout) = layout {
            self.layout.free(layout)?;
        }

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let slot = &mut self.slots[current.index as usize];
            if let Some(node) = slot.node.take() {
                stack.extend_from_slice(node.children());
                self.free.push(current.index);
                self.live -= 1;
            }
        }
        Ok(())
    }

    /// Replaces the props of an element and reapplies layout-affecting ones.
    pub fn set_props(&mut self, id: NodeId, props: Props) -> RenderResult<()> {
        let layout_style = props.layout;
        let el = self.element_mut(id)?;
        let layout = el.layout;
        let is_text = el.kind == ElementKind::Text;
        el.props = props;

        self.layout.apply_style(layout, &layout_style)?;
        if is_text {
            self.refresh_measure(id)?;
        }
        Ok(())
    }

    /// Replaces raw text in place and refreshes the owning text's measure.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> RenderResult<()> {
        let parent = match self.get_mut(id)? {
            Node::RawText(raw) => {
                raw.text = text.into();
                raw.parent
            }
            Node::Element(_) => return Err(RenderError::NotRawText(id)),
        };
        if let Some(parent) = parent {
            self.refresh_measure(parent)?;
        }
        Ok(())
    }

    pub fn raw_text(&self, id: NodeId) -> RenderResult<&str> {
        match self.get(id)? {
            Node::RawText(raw) => Ok(&raw.text),
            Node::Element(_) => Err(RenderError::NotRawText(id)),
        }
    }

    /// Concatenated raw text beneath a text element.
    pub fn text_content(&self, id: NodeId) -> RenderResult<String> {
        let mut out = String::new();
        for &child in self.children(id)? {
            if let Node::RawText(raw) = self.get(child)? {
                out.push_str(&raw.text);
            }
        }
        Ok(out)
    }

    fn refresh_measure(&mut self, text_el: NodeId) -> RenderResult<()> {
        let content = self.text_content(text_el)?;
        let el = self.element(text_el)?;
        let measure = TextMeasure {
            content,
            wrap: el.props.wrap,
        };
        let layout = el.layout;
        self.layout.set_text_measure(layout, Some(measure))
    }

    /// First `Static` element in pre-order beneath (and including) `root`.
    pub fn find_static(&self, root: NodeId) -> Option<NodeId> {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Ok(Node::Element(el)) = self.get(id) else {
                continue;
            };
            if el.kind == ElementKind::Static {
                return Some(id);
            }
            stack.extend(el.children.iter().rev());
        }
        None
    }

    pub fn committed_count(&self, id: NodeId) -> RenderResult<usize> {
        Ok(self.element(id)?.committed_count)
    }

    pub fn set_committed_count(&mut self, id: NodeId, count: usize) -> RenderResult<()> {
        self.element_mut(id)?.committed_count = count;
        Ok(())
    }

    /// Resets `committed_count` on every static element beneath `root`.
    pub fn reset_committed(&mut self, root: NodeId) -> RenderResult<()> {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if let Node::Element(el) = self.get_mut(id)? {
                el.committed_count = 0;
                stack.extend(el.children.iter().copied());
            }
        }
        Ok(())
    }

    pub fn compute_layout(&mut self, root: NodeId, width: u16) -> RenderResult<()> {
        let layout = self.element(root)?.layout;
        self.layout.compute_layout(layout, width)
    }

    pub fn layout_rect(&self, id: NodeId) -> RenderResult<LayoutRect> {
        self.layout.layout(self.element(id)?.layout)
    }

    pub fn layout_engine(&self) -> &LayoutEngine {
        &self.layout
    }

    pub fn computed_width(&self) -> Option<u16> {
        self.layout.computed_width()
    }
}
