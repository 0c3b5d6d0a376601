//! The mutation protocol an external tree driver speaks.
//!
//! A driver creates instances, wires them together, updates props and text,
//! and finally calls [`HostConfig::on_commit`] once per batch. None of these
//! calls touch the terminal; rendering is the runtime's business.

use crate::error::RenderResult;
use crate::node::{ElementKind, NodeId, Props};
use crate::tree::Document;
use std::fmt;
use tracing::trace;

pub trait HostConfig {
    /// Creates an element of a named kind (`box`, `text`, `static`).
    fn create_instance(&mut self, kind: &str, props: Props) -> RenderResult<NodeId>;

    fn create_text_instance(&mut self, text: &str) -> NodeId;

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> RenderResult<()>;

    fn insert_before(&mut self, parent: NodeId, child: NodeId, before: NodeId) -> RenderResult<()>;

    /// Removes and destroys `child` with its whole subtree.
    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> RenderResult<()>;

    fn append_child_to_container(&mut self, child: NodeId) -> RenderResult<()>;

    fn remove_child_from_container(&mut self, child: NodeId) -> RenderResult<()>;

    fn commit_update(&mut self, instance: NodeId, props: Props) -> RenderResult<()>;

    fn commit_text_update(&mut self, node: NodeId, text: &str) -> RenderResult<()>;

    /// End of a mutation batch.
    fn on_commit(&mut self) -> RenderResult<()>;
}

/// Holds the root element and an optional post-commit hook.
#[derive(Default)]
pub struct Container {
    root: Option<NodeId>,
    on_commit: Option<Box<dyn FnMut()>>,
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("root", &self.root)
            .field("on_commit", &self.on_commit.is_some())
            .finish()
    }
}

impl Container {
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }
}

/// A document plus container, driven through [`HostConfig`].
#[derive(Default)]
pub struct Host {
    document: Document,
    container: Container,
}

impl Host {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn root(&self) -> Option<NodeId> {
        self.container.root
    }

    /// Installs a hook run after every committed batch.
    pub fn set_commit_callback(&mut self, callback: impl FnMut() + 'static) {
        self.container.on_commit = Some(Box::new(callback));
    }
}

impl HostConfig for Host {
    fn create_instance(&mut self, kind: &str, props: Props) -> RenderResult<NodeId> {
        let kind = ElementKind::parse(kind)?;
        let id = self.document.create_element(kind, props)?;
        trace!(%id, kind = kind.name(), "created instance");
        Ok(id)
    }

    fn create_text_instance(&mut self, text: &str) -> NodeId {
        self.document.create_text(text)
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> RenderResult<()> {
        self.document.append(parent, child)
    }

    fn insert_before(&mut self, parent: NodeId, child: NodeId, before: NodeId) -> RenderResult<()> {
        self.document.insert_before(parent, child, before)
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> RenderResult<()> {
        self.document.remove(parent, child)?;
        self.document.destroy(child)
    }

    fn append_child_to_container(&mut self, child: NodeId) -> RenderResult<()> {
        if self.document.kind(child)?.is_none() {
            return Ok(());
        }
        if let Some(parent) = self.document.parent(child)? {
            self.document.remove(parent, child)?;
        }
        // The replaced root is unreachable from here on.
        match self.container.root.replace(child) {
            Some(old) if old != child && self.document.contains(old) => self.document.destroy(old),
            _ => Ok(()),
        }
    }

    fn remove_child_from_container(&mut self, child: NodeId) -> RenderResult<()> {
        if self.container.root != Some(child) {
            return Ok(());
        }
        self.container.root = None;
        self.document.destroy(child)
    }

    fn commit_update(&mut self, instance: NodeId, props: Props) -> RenderResult<()> {
        self.document.set_props(instance, props)
    }

    fn commit_text_update(&mut self, node: NodeId, text: &str) -> RenderResult<()> {
        self.document.set_text(node, text)
    }

    fn on_commit(&mut self) -> RenderResult<()> {
        if let Some(callback) = self.container.on_commit.as_mut() {
            callback();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn unknown_kind_is_fatal() {
        let mut host = Host::new();
        let err = host.create_instance("div", Props::new()).unwrap_err();
        assert!(matches!(err, RenderError::UnknownElementType { .. }));
        assert!(err.to_string().contains("box, text, static"));
    }

    #[test]
    fn container_ignores_raw_text() {
        let mut host = Host::new();
        let raw = host.create_text_instance("stray");

        host.append_child_to_container(raw).unwrap();

        assert_eq!(host.root(), None);
    }

    #[test]
    fn container_root_round_trip() {
        let mut host = Host::new();
        let root = host.create_instance("box", Props::column()).unwrap();

        host.append_child_to_container(root).unwrap();
        assert_eq!(host.root(), Some(root));

        host.remove_child_from_container(root).unwrap();
        assert_eq!(host.root(), None);
        assert!(host.document().is_empty());
    }

    #[test]
    fn remove_child_destroys_subtree() {
        let mut host = Host::new();
        let root = host.create_instance("box", Props::column()).unwrap();
        let text = host.create_instance("text", Props::new()).unwrap();
        let raw = host.create_text_instance("bye");
        host.append_child(text, raw).unwrap();
        host.append_child(root, text).unwrap();

        host.remove_child(root, text).unwrap();

        assert_eq!(host.document().len(), 1);
        assert!(!host.document().contains(raw));
    }

    #[test]
    fn commit_text_update_replaces_in_place() {
        let mut host = Host::new();
        let text = host.create_instance("ink-text", Props::new()).unwrap();
        let raw = host.create_text_instance("before");
        host.append_child(text, raw).unwrap();

        host.commit_text_update(raw, "after").unwrap();

        assert_eq!(host.document().text_content(text).unwrap(), "after");
    }

    #[test]
    fn commit_update_replaces_props() {
        let mut host = Host::new();
        let el = host.create_instance("box", Props::row()).unwrap();

        host.commit_update(el, Props::column().width(10)).unwrap();

        let props = &host.document().element(el).unwrap().props;
        assert_eq!(props, &Props::column().width(10));
    }

    #[test]
    fn on_commit_runs_callback() {
        let mut host = Host::new();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        host.set_commit_callback(move || counter.set(counter.get() + 1));

        host.on_commit().unwrap();
        host.on_commit().unwrap();

        assert_eq!(hits.get(), 2);
    }
}
