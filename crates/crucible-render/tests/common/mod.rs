#![allow(dead_code)]

use crucible_render::{HostConfig, NodeId, Props};

/// Creates a `text` element holding `content`; returns (element, raw text).
pub fn text(host: &mut impl HostConfig, props: Props, content: &str) -> (NodeId, NodeId) {
    let el = host.create_instance("text", props).unwrap();
    let raw = host.create_text_instance(content);
    host.append_child(el, raw).unwrap();
    (el, raw)
}

/// Creates a `box` with the given children.
pub fn boxed(host: &mut impl HostConfig, props: Props, children: &[NodeId]) -> NodeId {
    let el = host.create_instance("box", props).unwrap();
    for &child in children {
        host.append_child(el, child).unwrap();
    }
    el
}

/// Creates a `static` element with one text child per item.
pub fn static_log(host: &mut impl HostConfig, items: &[&str]) -> NodeId {
    let el = host.create_instance("static", Props::new()).unwrap();
    for item in items {
        let (t, _) = text(host, Props::new(), item);
        host.append_child(el, t).unwrap();
    }
    el
}

/// Splits one frame write into its lines.
pub fn frame_lines(write: &str) -> Vec<String> {
    write.split("\r\n").map(String::from).collect()
}
