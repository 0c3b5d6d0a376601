use crucible_render::ansi::visible_width;
use crucible_render::{render_sequential, Document, Edges, ElementKind, NodeId, Props, TextWrap};
use proptest::prelude::*;

const POOL: usize = 7;

#[derive(Debug, Clone)]
enum Op {
    Append(usize, usize),
    InsertBefore(usize, usize, usize),
    Remove(usize, usize),
    Destroy(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..POOL, 0..POOL).prop_map(|(p, c)| Op::Append(p, c)),
        3 => (0..POOL, 0..POOL, 0..POOL).prop_map(|(p, c, b)| Op::InsertBefore(p, c, b)),
        2 => (0..POOL, 0..POOL).prop_map(|(p, c)| Op::Remove(p, c)),
        1 => (1..POOL).prop_map(Op::Destroy),
    ]
}

fn apply(doc: &mut Document, pool: &[NodeId], op: &Op) {
    // Invalid operations are rejected before any state changes, so errors
    // are expected and ignored here.
    let _ = match *op {
        Op::Append(p, c) => doc.append(pool[p], pool[c]),
        Op::InsertBefore(p, c, b) => doc.insert_before(pool[p], pool[c], pool[b]),
        Op::Remove(p, c) => doc.remove(pool[p], pool[c]),
        Op::Destroy(c) => doc.destroy(pool[c]),
    };
}

fn check_consistent(doc: &Document, pool: &[NodeId]) -> Result<(), TestCaseError> {
    let live: Vec<NodeId> = pool.iter().copied().filter(|&id| doc.contains(id)).collect();
    prop_assert_eq!(doc.len(), live.len());
    prop_assert_eq!(doc.layout_engine().total_node_count(), live.len());

    for &id in &live {
        let el = doc.element(id).unwrap();

        for &child in &el.children {
            prop_assert!(doc.contains(child), "dangling child {} under {}", child, id);
            prop_assert_eq!(doc.parent(child).unwrap(), Some(id));
            let occurrences = el.children.iter().filter(|&&c| c == child).count();
            prop_assert_eq!(occurrences, 1);
        }

        if let Some(parent) = el.parent {
            prop_assert!(doc.contains(parent));
            let holders = live
                .iter()
                .filter(|&&p| doc.children(p).unwrap().contains(&id))
                .count();
            prop_assert_eq!(holders, 1);
            prop_assert!(doc.children(parent).unwrap().contains(&id));
        }

        let mut hops = 0;
        let mut current = el.parent;
        while let Some(p) = current {
            prop_assert_ne!(p, id, "cycle through {}", id);
            hops += 1;
            prop_assert!(hops <= POOL);
            current = doc.parent(p).unwrap();
        }

        let expected: Vec<_> = el
            .children
            .iter()
            .map(|&c| doc.element(c).unwrap().layout)
            .collect();
        prop_assert_eq!(doc.layout_engine().children(el.layout).unwrap(), expected);
    }
    Ok(())
}

proptest! {
    #[test]
    fn random_mutations_keep_tree_and_layout_in_sync(
        ops in prop::collection::vec(op_strategy(), 0..60)
    ) {
        let mut doc = Document::new();
        let pool: Vec<NodeId> = (0..POOL)
            .map(|_| doc.create_element(ElementKind::Box, Props::column()).unwrap())
            .collect();

        for op in &ops {
            apply(&mut doc, &pool, op);
            check_consistent(&doc, &pool)?;
        }
    }

    #[test]
    fn rendered_lines_fit_the_width(
        texts in prop::collection::vec("[a-z]{0,14}( [a-z]{1,14}){0,6}", 1..6),
        width in 1u16..60,
        padding in 0u16..=8,
        text_padding in 0u16..=3,
        row in any::<bool>(),
        wrap in prop_oneof![
            Just(TextWrap::Wrap),
            Just(TextWrap::TruncateEnd),
            Just(TextWrap::TruncateMiddle),
            Just(TextWrap::TruncateStart),
        ],
        laid_out in any::<bool>(),
    ) {
        let mut doc = Document::new();
        let props = if row { Props::row().gap(1) } else { Props::column() };
        let root = doc
            .create_element(ElementKind::Box, props.padding(Edges::all(padding)))
            .unwrap();
        for content in &texts {
            let text_props = Props::new().wrap(wrap).padding(Edges::xy(text_padding, 0));
            let el = doc.create_element(ElementKind::Text, text_props).unwrap();
            let raw = doc.create_text(content.as_str());
            doc.append(el, raw).unwrap();
            doc.append(root, el).unwrap();
        }
        if laid_out {
            doc.compute_layout(root, width).unwrap();
        }

        for line in render_sequential(&doc, root, width).unwrap() {
            prop_assert!(
                visible_width(&line) <= width as usize,
                "{:?} is wider than {}",
                line,
                width
            );
        }
    }
}
