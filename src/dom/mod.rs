//! Keyed list rendering for plain DOM containers.
//!
//! Collection pages paint their lists through [`render_list`] instead of
//! rebuilding markup on every refresh: each item node is tagged with a
//! stable key, and subsequent renders reuse, move, or drop nodes so that
//! unchanged items keep their DOM identity (focus, media playback state,
//! CSS transitions).

use leptos::prelude::window;
use std::collections::{HashMap, HashSet};

pub(crate) const KEY_ATTR: &str = "data-key";

/// An ordered, mutable child sequence with a per-child key attribute.
///
/// The production implementation is [`ElementContainer`]; tests use an
/// in-memory container so the algorithm runs under native `cargo test`.
pub(crate) trait ListContainer {
    type Node: Clone;

    fn children(&self) -> Vec<Self::Node>;
    fn node_key(&self, node: &Self::Node) -> Option<String>;
    fn set_node_key(&mut self, node: &Self::Node, key: &str);
    fn append(&mut self, node: &Self::Node);

    /// Insert `node` immediately after `reference`; `None` prepends. A node
    /// that is already a child is moved, not duplicated.
    fn insert_after(&mut self, node: &Self::Node, reference: Option<&Self::Node>);

    fn remove(&mut self, node: &Self::Node);
    fn clear(&mut self);
}

/// Reconcile `container` against `items`.
///
/// Nodes are matched to items by `key_of`; a matched node is reused as-is
/// (its payload is NOT re-rendered), an unmatched item gets a fresh node
/// from `render_of`, and nodes whose key vanished are removed. The final
/// child order always equals the item order, with in-place children left
/// untouched.
///
/// An empty `items` short-circuits to a full replace with `empty_of()`;
/// prior node identity is intentionally lost on that path.
///
/// Panics on duplicate keys: key uniqueness is a caller contract, and
/// silently collapsing duplicates would break the one-node-per-key
/// invariant.
pub(crate) fn render_list<C, T>(
    container: &mut C,
    items: &[T],
    key_of: impl Fn(&T) -> String,
    render_of: impl Fn(&T) -> C::Node,
    empty_of: impl FnOnce() -> C::Node,
) where
    C: ListContainer,
{
    if items.is_empty() {
        container.clear();
        let placeholder = empty_of();
        container.append(&placeholder);
        return;
    }

    // Index current children by key. Unkeyed children (including a previous
    // empty-state placeholder) were not rendered by this algorithm; drop
    // them. A stray key collision keeps the last node, as elsewhere.
    let mut existing: HashMap<String, C::Node> = HashMap::new();
    for child in container.children() {
        match container.node_key(&child) {
            Some(key) => {
                if let Some(stale) = existing.insert(key, child) {
                    container.remove(&stale);
                }
            }
            None => container.remove(&child),
        }
    }

    let mut used: HashSet<String> = HashSet::with_capacity(items.len());
    let mut ordered: Vec<C::Node> = Vec::with_capacity(items.len());

    for item in items {
        let key = key_of(item);
        assert!(
            used.insert(key.clone()),
            "render_list: duplicate key {key:?} in item list"
        );

        if let Some(node) = existing.get(&key) {
            ordered.push(node.clone());
        } else {
            let node = render_of(item);
            container.set_node_key(&node, &key);
            ordered.push(node);
        }
    }

    for (key, node) in &existing {
        if !used.contains(key) {
            container.remove(node);
        }
    }

    // Ordering pass: walk target order and current children together and
    // relocate only out-of-place nodes (insert-after-previous, prepend if
    // first). New nodes attach here too.
    let mut prev: Option<C::Node> = None;
    for (index, node) in ordered.iter().enumerate() {
        let in_place = container
            .children()
            .get(index)
            .is_some_and(|current| container.node_key(current) == container.node_key(node));

        if !in_place {
            container.insert_after(node, prev.as_ref());
        }
        prev = Some(node.clone());
    }
}

/// [`ListContainer`] over a live DOM element; keys ride in `data-key`.
pub(crate) struct ElementContainer {
    el: web_sys::Element,
}

impl ElementContainer {
    pub fn new(el: web_sys::Element) -> Self {
        Self { el }
    }
}

impl ListContainer for ElementContainer {
    type Node = web_sys::Element;

    fn children(&self) -> Vec<web_sys::Element> {
        let children = self.el.children();
        (0..children.length()).filter_map(|i| children.item(i)).collect()
    }

    fn node_key(&self, node: &web_sys::Element) -> Option<String> {
        node.get_attribute(KEY_ATTR)
    }

    fn set_node_key(&mut self, node: &web_sys::Element, key: &str) {
        let _ = node.set_attribute(KEY_ATTR, key);
    }

    fn append(&mut self, node: &web_sys::Element) {
        let _ = self.el.append_child(node);
    }

    fn insert_after(&mut self, node: &web_sys::Element, reference: Option<&web_sys::Element>) {
        // `insert_before` relocates nodes that are already attached.
        let before = match reference {
            Some(r) => r.next_sibling(),
            None => self.el.first_child(),
        };
        let _ = self.el.insert_before(node, before.as_ref());
    }

    fn remove(&mut self, node: &web_sys::Element) {
        let _ = self.el.remove_child(node);
    }

    fn clear(&mut self) {
        self.el.set_inner_html("");
    }
}

/// Escape text destined for `inner_html` markup (element content or
/// double-quoted attribute values).
pub(crate) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Build a single-root item node from markup. Tag validity is a caller
/// contract; an invalid tag is a programming error and panics.
pub(crate) fn item_element(tag: &str, class: &str, inner_html: &str) -> web_sys::Element {
    let document = window()
        .document()
        .expect("browser runtime always has a document");
    let el = document
        .create_element(tag)
        .unwrap_or_else(|_| panic!("item_element: invalid tag {tag:?}"));
    if !class.is_empty() {
        el.set_class_name(class);
    }
    el.set_inner_html(inner_html);
    el
}
