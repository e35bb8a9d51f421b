//! DOM queries: scoped selector matching, id lookup, generic predicates.

use crate::css::selector::SelectorGroup;

use super::node::{NodeData, NodeId};
use super::traits::DomTree;
use super::tree::Dom;

impl Dom {
    /// First element below `root` (in document order) matching `group`.
    ///
    /// `root` itself is never returned and acts as the matching boundary:
    /// combinators cannot reach above it.
    pub fn query_selector(&self, root: NodeId, group: &SelectorGroup) -> Option<NodeId> {
        self.scoped(root)
            .find(|&node| group.test(self, Some(root), node))
    }

    /// All elements below `root` matching `group`, in document order.
    pub fn query_selector_all(&self, root: NodeId, group: &SelectorGroup) -> Vec<NodeId> {
        self.scoped(root)
            .filter(|&node| group.test(self, Some(root), node))
            .collect()
    }

    /// Whether `node` matches `group`, with no boundary.
    pub fn matches(&self, node: NodeId, group: &SelectorGroup) -> bool {
        group.test(self, None, node)
    }

    /// Find the first attached element whose `id` attribute equals `id`.
    pub fn query_by_id(&self, id: &str) -> Option<NodeId> {
        let root = self.root()?;
        self.walk_depth_first(root)
            .into_iter()
            .find(|&node| self.element_id(node) == Some(id))
    }

    /// Find all nodes matching an arbitrary predicate.
    ///
    /// Iterates the whole arena in slotmap order, detached nodes included.
    pub fn query_all(&self, predicate: impl Fn(&NodeData) -> bool) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|(_, data)| predicate(data))
            .map(|(node_id, _)| node_id)
            .collect()
    }

    /// Elements strictly below `root`, pre-order.
    fn scoped(&self, root: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.walk_depth_first(root)
            .into_iter()
            .skip(1)
            .filter(|&node| DomTree::is_element(self, node))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::css::model::{Combinator, ComplexSelector, CompoundSelector, SelectorList};
    use crate::css::selector::compile_group;
    use crate::dom::node::NodeData;
    use crate::dom::tree::Dom;

    use super::*;

    /// Build a test tree for queries:
    /// ```text
    ///       root (div #root)
    ///      /    \
    ///    a       b
    ///  (section  (section
    ///   #sidebar  #main
    ///   .nav)     .content)
    ///   / \         \
    ///  c   d         e
    /// (button  (button  (button
    ///  #save    #cancel  #ok
    ///  .btn)    .btn)    .btn)
    /// ```
    fn build_query_tree() -> (Dom, NodeId, NodeId) {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::element("div").with_id("root"));
        let a = dom
            .insert_child(
                root,
                NodeData::element("section").with_id("sidebar").with_class("nav"),
            )
            .unwrap();
        let b = dom
            .insert_child(
                root,
                NodeData::element("section").with_id("main").with_class("content"),
            )
            .unwrap();
        for (parent, id) in [(a, "save"), (a, "cancel"), (b, "ok")] {
            dom.insert_child(parent, NodeData::element("button").with_id(id).with_class("btn"))
                .unwrap();
        }
        (dom, root, a)
    }

    fn group(list: SelectorList) -> SelectorGroup {
        let (group, errors) = compile_group(&list);
        assert!(errors.is_empty(), "{errors}");
        group
    }

    fn ids(dom: &Dom, nodes: &[NodeId]) -> Vec<String> {
        nodes
            .iter()
            .filter_map(|&n| dom.get(n).and_then(NodeData::id).map(str::to_owned))
            .collect()
    }

    #[test]
    fn query_selector_all_in_document_order() {
        let (dom, root, _) = build_query_tree();
        let btn = group(SelectorList::single(CompoundSelector::new().class("btn")));
        let found = dom.query_selector_all(root, &btn);
        assert_eq!(ids(&dom, &found), vec!["save", "cancel", "ok"]);
    }

    #[test]
    fn query_selector_first_match() {
        let (dom, root, _) = build_query_tree();
        let section = group(SelectorList::single(CompoundSelector::new().tag("section")));
        let found = dom.query_selector(root, &section);
        assert_eq!(found, dom.query_by_id("sidebar"));
    }

    #[test]
    fn query_excludes_root_and_respects_boundary() {
        let (dom, _root, a) = build_query_tree();
        // `div button` needs an ancestor above the boundary `a`.
        let selector = ComplexSelector::compound(CompoundSelector::new().tag("div"))
            .then(Combinator::Descendant, CompoundSelector::new().tag("button"));
        let g = group(SelectorList::single(selector));
        assert!(dom.query_selector_all(a, &g).is_empty());

        // Without a boundary the same element matches.
        let save = dom.query_by_id("save").unwrap();
        assert!(dom.matches(save, &g));

        let sections = group(SelectorList::single(CompoundSelector::new().tag("section")));
        assert!(dom.query_selector(a, &sections).is_none());
    }

    #[test]
    fn query_by_id_found() {
        let (dom, _, a) = build_query_tree();
        assert_eq!(dom.query_by_id("sidebar"), Some(a));
        assert!(dom.query_by_id("nonexistent").is_none());
    }

    #[test]
    fn query_all_custom_predicate() {
        let (dom, ..) = build_query_tree();
        // Find all nodes that have an id starting with "s".
        let results = dom.query_all(|data| data.id().is_some_and(|id| id.starts_with('s')));
        // "sidebar" and "save"
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn query_on_empty_dom() {
        let dom = Dom::new();
        assert!(dom.query_by_id("x").is_none());
        assert!(dom.query_all(|_| true).is_empty());
    }
}
