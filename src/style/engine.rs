//! StyleEngine: stylesheet registration, style-tree maintenance driven by DOM
//! events, incremental recompute and change notification.
//!
//! Everything runs synchronously on the caller's thread. An event is fully
//! applied (style tree updated, affected subtree recomputed, subscribers
//! notified) before [`StyleEngine::handle_event`] returns.

use std::fmt::{self, Debug};
use std::hash::Hash;
use std::mem;

use slotmap::{new_key_type, SlotMap};

use crate::css::property::PropertyId;
use crate::css::property_set::PropertySet;
use crate::css::specificity::Spec;
use crate::css::stylesheet::{Rule, Stylesheet};
use crate::dom::event::DomEvent;
use crate::dom::node::NodeId;
use crate::dom::traits::DomTree;

use super::cascade::Cascade;
use super::computed::ComputedStyle;
use super::config::EngineConfig;
use super::inline::{InlineStyle, InlineStyleParser};
use super::tree::{StyleKey, StyleNode, StyleTree, StyleTreeError};

new_key_type! {
    /// Handle of a registered stylesheet.
    pub struct SheetId;

    /// Handle of a change subscriber.
    pub struct SubscriptionId;
}

/// One node's style change within a recompute pass.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleUpdate<N = NodeId> {
    pub node: N,
    /// Number of properties added, removed or changed.
    pub change_count: usize,
    /// The properties counted by `change_count`, in registry order.
    pub changed: Vec<PropertyId>,
    pub previous: PropertySet,
    pub current: PropertySet,
}

type Subscriber<N> = Box<dyn FnMut(&StyleUpdate<N>)>;

struct RegisteredSheet {
    sheet: Stylesheet,
    /// Registration sequence; a replaced sheet keeps its predecessor's.
    order: u64,
}

/// Position of one rule in the global cascade order.
#[derive(Debug, Clone, Copy)]
struct RuleRef {
    spec: Spec,
    sheet_order: u64,
    source_order: usize,
    sheet: SheetId,
    index: usize,
}

// ---------------------------------------------------------------------------
// StyleEngine
// ---------------------------------------------------------------------------

/// Owns the style tree and the registered rules for one document.
pub struct StyleEngine<N = NodeId> {
    config: EngineConfig,
    tree: StyleTree<N>,
    sheets: SlotMap<SheetId, RegisteredSheet>,
    next_order: u64,
    /// Every registered rule, ascending in cascade order.
    ordered: Vec<RuleRef>,
    /// Some registered or default-sheet rule depends on sibling state.
    sibling_sensitive: bool,
    default_sheet: Option<Stylesheet>,
    parser: Option<Box<dyn InlineStyleParser>>,
    subscribers: SlotMap<SubscriptionId, Subscriber<N>>,
}

impl<N: Copy + Eq + Hash + Debug> StyleEngine<N> {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            tree: StyleTree::new(),
            sheets: SlotMap::with_key(),
            next_order: 0,
            ordered: Vec::new(),
            sibling_sensitive: false,
            default_sheet: None,
            parser: None,
            subscribers: SlotMap::with_key(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The style tree, read-only.
    pub fn tree(&self) -> &StyleTree<N> {
        &self.tree
    }

    /// The style node for `node`, if tracked.
    pub fn style_node(&self, node: N) -> Option<&StyleNode<N>> {
        self.tree.node(node)
    }

    pub fn is_tracked(&self, node: N) -> bool {
        self.tree.key(node).is_some()
    }

    /// Install the collaborator that turns style attribute text into
    /// declarations.
    pub fn set_inline_parser(&mut self, parser: impl InlineStyleParser + 'static) {
        self.parser = Some(Box::new(parser));
    }

    // -----------------------------------------------------------------------
    // Stylesheets
    // -----------------------------------------------------------------------

    /// Register a stylesheet after all current ones and restyle the tree.
    pub fn add_stylesheet<D: DomTree<Node = N>>(&mut self, dom: &D, sheet: Stylesheet) -> SheetId {
        let order = self.next_order;
        self.next_order += 1;
        tracing::debug!(
            source = self.config.source(),
            sheet = sheet.name().unwrap_or("<anonymous>"),
            rules = sheet.len(),
            "adding stylesheet"
        );
        let id = self.sheets.insert(RegisteredSheet { sheet, order });
        self.rules_changed(dom);
        id
    }

    /// Unregister a stylesheet and restyle the tree.
    pub fn remove_stylesheet<D: DomTree<Node = N>>(
        &mut self,
        dom: &D,
        id: SheetId,
    ) -> Option<Stylesheet> {
        let removed = self.sheets.remove(id)?;
        tracing::debug!(
            source = self.config.source(),
            sheet = removed.sheet.name().unwrap_or("<anonymous>"),
            "removed stylesheet"
        );
        self.rules_changed(dom);
        Some(removed.sheet)
    }

    /// Swap the sheet registered under `id` for `sheet`, keeping its place
    /// in the cascade. Returns the old sheet, or `None` (and changes nothing)
    /// if `id` is not registered.
    pub fn replace_stylesheet<D: DomTree<Node = N>>(
        &mut self,
        dom: &D,
        id: SheetId,
        sheet: Stylesheet,
    ) -> Option<Stylesheet> {
        let slot = self.sheets.get_mut(id)?;
        let old = mem::replace(&mut slot.sheet, sheet);
        tracing::debug!(
            source = self.config.source(),
            old = old.name().unwrap_or("<anonymous>"),
            new = slot.sheet.name().unwrap_or("<anonymous>"),
            "replaced stylesheet"
        );
        self.rules_changed(dom);
        Some(old)
    }

    pub fn stylesheet(&self, id: SheetId) -> Option<&Stylesheet> {
        self.sheets.get(id).map(|slot| &slot.sheet)
    }

    /// Registered sheets in registration order.
    pub fn stylesheets(&self) -> Vec<(SheetId, &Stylesheet)> {
        let mut sheets: Vec<_> = self.sheets.iter().collect();
        sheets.sort_by_key(|(_, slot)| slot.order);
        sheets
            .into_iter()
            .map(|(id, slot)| (id, &slot.sheet))
            .collect()
    }

    /// Set the sheet `initial` values are looked up in, and restyle.
    ///
    /// The sheet is not added to the cascade; register it with
    /// [`StyleEngine::add_stylesheet`] as well if its rules should apply.
    pub fn set_default_stylesheet<D: DomTree<Node = N>>(
        &mut self,
        dom: &D,
        sheet: Option<Stylesheet>,
    ) {
        self.default_sheet = sheet;
        self.refresh_sibling_sensitivity();
        self.restyle_all(dom);
    }

    pub fn default_stylesheet(&self) -> Option<&Stylesheet> {
        self.default_sheet.as_ref()
    }

    /// Every registered rule, ascending in cascade order.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> + '_ {
        self.ordered.iter().filter_map(|r| {
            self.sheets
                .get(r.sheet)
                .and_then(|slot| slot.sheet.rules().get(r.index))
        })
    }

    fn rules_changed<D: DomTree<Node = N>>(&mut self, dom: &D) {
        let mut ordered = Vec::new();
        for (sheet, slot) in &self.sheets {
            for (index, rule) in slot.sheet.rules().iter().enumerate() {
                ordered.push(RuleRef {
                    spec: rule.spec(),
                    sheet_order: slot.order,
                    source_order: rule.source_order(),
                    sheet,
                    index,
                });
            }
        }
        ordered.sort_by_key(|r| (r.spec, r.sheet_order, r.source_order));
        self.ordered = ordered;
        self.refresh_sibling_sensitivity();
        self.restyle_all(dom);
    }

    /// `initial` lookups read the default sheet, so its rules count too.
    fn refresh_sibling_sensitivity(&mut self) {
        self.sibling_sensitive = self
            .sheets
            .values()
            .map(|slot| &slot.sheet)
            .chain(self.default_sheet.as_ref())
            .any(Stylesheet::depends_on_siblings);
    }

    // -----------------------------------------------------------------------
    // Subscribers
    // -----------------------------------------------------------------------

    /// Call `callback` for every node whose resolved style changes.
    pub fn subscribe(&mut self, callback: impl FnMut(&StyleUpdate<N>) + 'static) -> SubscriptionId {
        self.subscribers.insert(Box::new(callback))
    }

    /// Drop a subscriber. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id).is_some()
    }

    fn notify(&mut self, updates: &[StyleUpdate<N>]) {
        for update in updates {
            for subscriber in self.subscribers.values_mut() {
                subscriber(update);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// The resolved style of `node`, building its style node on first use.
    pub fn resolved_style<D: DomTree<Node = N>>(
        &mut self,
        dom: &D,
        node: N,
    ) -> Result<&PropertySet, StyleTreeError<N>> {
        let key = self.require(dom, node)?;
        self.tree
            .get(key)
            .map(StyleNode::style_set)
            .ok_or(StyleTreeError::NotTracked(node))
    }

    /// The resolved style of `node` as a typed snapshot.
    pub fn computed_style<D: DomTree<Node = N>>(
        &mut self,
        dom: &D,
        node: N,
    ) -> Result<ComputedStyle, StyleTreeError<N>> {
        self.resolved_style(dom, node).map(ComputedStyle::from_set)
    }

    /// The element's current inline declarations.
    pub fn inline_set(&self, element: N) -> Result<&PropertySet, StyleTreeError<N>> {
        let node = self
            .tree
            .node(element)
            .ok_or(StyleTreeError::NotTracked(element))?;
        node.element()
            .map(|block| block.inline_set())
            .ok_or(StyleTreeError::NotAnElement(element))
    }

    // -----------------------------------------------------------------------
    // Inline styles
    // -----------------------------------------------------------------------

    /// A handle for editing the element's inline declarations. The element
    /// is restyled when the handle is committed or dropped.
    pub fn inline_style<'a, D: DomTree<Node = N>>(
        &'a mut self,
        dom: &'a D,
        element: N,
    ) -> Result<InlineStyle<'a, D>, StyleTreeError<N>> {
        self.require(dom, element)?;
        let set = self.inline_set(element)?.clone();
        Ok(InlineStyle::new(self, dom, element, set))
    }

    /// Replace the element's inline declarations and restyle it.
    pub fn set_inline<D: DomTree<Node = N>>(
        &mut self,
        dom: &D,
        element: N,
        set: PropertySet,
    ) -> Result<(), StyleTreeError<N>> {
        let key = self.require(dom, element)?;
        let block = self
            .tree
            .get_mut(key)
            .and_then(|node| node.element.as_mut())
            .ok_or(StyleTreeError::NotAnElement(element))?;
        block.inline_set = set;
        self.invalidate(dom, element);
        Ok(())
    }

    /// Stop (or resume) parsing the element's style attribute on change.
    /// Returns the previous setting.
    pub fn set_suppress_inline_updates(
        &mut self,
        element: N,
        suppress: bool,
    ) -> Result<bool, StyleTreeError<N>> {
        let key = self
            .tree
            .key(element)
            .ok_or(StyleTreeError::NotTracked(element))?;
        let block = self
            .tree
            .get_mut(key)
            .and_then(|node| node.element.as_mut())
            .ok_or(StyleTreeError::NotAnElement(element))?;
        Ok(mem::replace(&mut block.suppressing_inline_updates, suppress))
    }

    fn parse_inline(&self, text: &str) -> PropertySet {
        if text.trim().is_empty() {
            return PropertySet::new();
        }
        match &self.parser {
            Some(parser) => parser.parse(text),
            None => {
                tracing::warn!(
                    source = self.config.source(),
                    text,
                    "no inline style parser installed; ignoring style attribute"
                );
                PropertySet::new()
            }
        }
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    /// Apply one DOM event.
    ///
    /// Events must be delivered in the order the DOM produced them, each one
    /// before the tree is navigated in a way that depends on it.
    pub fn handle_event<D: DomTree<Node = N>>(
        &mut self,
        dom: &D,
        event: &DomEvent<N>,
    ) -> Result<(), StyleTreeError<N>> {
        match event {
            DomEvent::AppendChild {
                parent: None, node, ..
            } => self.on_root(dom, *node),
            DomEvent::AppendChild {
                parent: Some(parent),
                node,
                index,
            } => self.on_append(dom, *parent, *node, *index),
            DomEvent::RemoveChild { parent, node } => self.on_remove(dom, *parent, *node),
            DomEvent::AttributeModified {
                element, key, new, ..
            } => {
                self.on_attribute(dom, *element, key, new.as_deref());
                Ok(())
            }
            DomEvent::Interaction { element, kind } => {
                tracing::trace!(node = ?element, ?kind, "interaction");
                self.invalidate(dom, *element);
                Ok(())
            }
        }
    }

    /// Recompute the whole tree, building it first if nothing is tracked.
    pub fn update_from_root<D: DomTree<Node = N>>(
        &mut self,
        dom: &D,
    ) -> Result<(), StyleTreeError<N>> {
        match (self.tree.root(), dom.root()) {
            (Some(root), _) => self.recompute_key(dom, root),
            (None, Some(dom_root)) => {
                self.require(dom, dom_root)?;
            }
            (None, None) => {}
        }
        Ok(())
    }

    /// Recompute `node` and its subtree.
    pub fn recompute<D: DomTree<Node = N>>(
        &mut self,
        dom: &D,
        node: N,
    ) -> Result<(), StyleTreeError<N>> {
        let key = self.require(dom, node)?;
        self.recompute_key(dom, key);
        Ok(())
    }

    fn on_root<D: DomTree<Node = N>>(&mut self, dom: &D, node: N) -> Result<(), StyleTreeError<N>> {
        if self.is_tracked(node) {
            return Ok(());
        }
        let old_root = self
            .tree
            .root()
            .and_then(|k| self.tree.get(k))
            .map(StyleNode::dom_node);
        if let Some(old) = old_root {
            tracing::debug!(
                source = self.config.source(),
                ?old,
                new = ?node,
                "replacing style root"
            );
            self.tree.remove(old)?;
        }
        let key = self.track_subtree(dom, None, node, 0)?;
        self.recompute_key(dom, key);
        Ok(())
    }

    fn on_append<D: DomTree<Node = N>>(
        &mut self,
        dom: &D,
        parent: N,
        node: N,
        index: usize,
    ) -> Result<(), StyleTreeError<N>> {
        if self.is_tracked(node) {
            // Already built together with an ancestor.
            return Ok(());
        }
        if !self.is_tracked(parent) {
            // Either nothing is built yet or the parent is outside the document.
            self.ensure_tracked(dom, node)?;
            return Ok(());
        }
        let key = self.track_subtree(dom, Some(parent), node, index)?;
        if self.sibling_invalidation_active() {
            self.invalidate(dom, node);
        } else {
            self.recompute_key(dom, key);
        }
        Ok(())
    }

    fn on_remove<D: DomTree<Node = N>>(
        &mut self,
        dom: &D,
        parent: Option<N>,
        node: N,
    ) -> Result<(), StyleTreeError<N>> {
        let parent_key = parent.and_then(|p| self.tree.key(p));
        if !self.is_tracked(node) {
            // Only a tracked parent means the trees disagree.
            return match parent_key {
                Some(_) => Err(StyleTreeError::NotTracked(node)),
                None => Ok(()),
            };
        }

        let removed = self.tree.remove(node)?;
        tracing::debug!(
            source = self.config.source(),
            node = ?node,
            count = removed.len(),
            "detached style subtree"
        );
        if let (true, Some(parent_key)) = (self.sibling_invalidation_active(), parent_key) {
            self.recompute_key(dom, parent_key);
        }
        Ok(())
    }

    fn on_attribute<D: DomTree<Node = N>>(
        &mut self,
        dom: &D,
        element: N,
        key: &str,
        new: Option<&str>,
    ) {
        let Some(style_key) = self.tree.key(element) else {
            return;
        };
        if key == self.config.style_attribute {
            let suppressed = self
                .tree
                .get(style_key)
                .and_then(StyleNode::element)
                .map_or(true, |block| block.is_suppressing_inline_updates());
            if !suppressed {
                let set = self.parse_inline(new.unwrap_or_default());
                if let Some(block) = self.tree.get_mut(style_key).and_then(|n| n.element.as_mut()) {
                    block.inline_set = set;
                }
            }
        }
        self.invalidate(dom, element);
    }

    // -----------------------------------------------------------------------
    // Tree maintenance
    // -----------------------------------------------------------------------

    /// The key for `node`, building it lazily; `NotTracked` if the node is not
    /// part of the document.
    fn require<D: DomTree<Node = N>>(
        &mut self,
        dom: &D,
        node: N,
    ) -> Result<StyleKey, StyleTreeError<N>> {
        self.ensure_tracked(dom, node)?
            .ok_or(StyleTreeError::NotTracked(node))
    }

    /// Track `node` if it is connected to the document root, building the
    /// missing part of the style tree above it. Returns `None` for nodes
    /// outside the document.
    fn ensure_tracked<D: DomTree<Node = N>>(
        &mut self,
        dom: &D,
        node: N,
    ) -> Result<Option<StyleKey>, StyleTreeError<N>> {
        if let Some(key) = self.tree.key(node) {
            return Ok(Some(key));
        }
        let Some(dom_root) = dom.root() else {
            return Ok(None);
        };

        // `chain` runs from `node` up to the top of its tree.
        let mut chain = vec![node];
        while let Some(parent) = chain.last().and_then(|&n| dom.parent(n)) {
            chain.push(parent);
        }
        if chain.last() != Some(&dom_root) {
            return Ok(None);
        }

        match chain.iter().position(|&n| self.is_tracked(n)) {
            None => {
                // Nothing on the chain is tracked: the root itself is not.
                self.on_root(dom, dom_root)?;
            }
            Some(0) => {}
            Some(i) => {
                let parent = chain[i];
                let child = chain[i - 1];
                let index = dom
                    .children(parent)
                    .iter()
                    .take_while(|&&c| c != child)
                    .filter(|&&c| self.is_tracked(c))
                    .count();
                let key = self.track_subtree(dom, Some(parent), child, index)?;
                self.recompute_key(dom, key);
            }
        }
        Ok(self.tree.key(node))
    }

    /// Create style nodes for `node` and all its DOM descendants and attach
    /// `node` under `parent` (or as the root).
    fn track_subtree<D: DomTree<Node = N>>(
        &mut self,
        dom: &D,
        parent: Option<N>,
        node: N,
        index: usize,
    ) -> Result<StyleKey, StyleTreeError<N>> {
        let key = self.create_node(dom, node);
        match parent {
            Some(parent) => self.tree.attach(parent, node, index)?,
            None => {
                self.tree.set_root(node)?;
            }
        }

        let mut count = 1;
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            for (i, &child) in dom.children(current).iter().enumerate() {
                self.create_node(dom, child);
                self.tree.attach(current, child, i)?;
                stack.push(child);
                count += 1;
            }
        }
        tracing::debug!(
            source = self.config.source(),
            node = ?node,
            parent = ?parent,
            count,
            "attached style subtree"
        );
        Ok(key)
    }

    fn create_node<D: DomTree<Node = N>>(&mut self, dom: &D, node: N) -> StyleKey {
        let is_element = dom.is_element(node);
        let key = self.tree.create(node, is_element);
        if is_element {
            if let Some(text) = dom.attribute(node, &self.config.style_attribute) {
                let set = self.parse_inline(text);
                if let Some(block) = self.tree.get_mut(key).and_then(|n| n.element.as_mut()) {
                    block.inline_set = set;
                }
            }
        }
        key
    }

    // -----------------------------------------------------------------------
    // Recompute
    // -----------------------------------------------------------------------

    fn sibling_invalidation_active(&self) -> bool {
        self.config.sibling_invalidation && self.sibling_sensitive
    }

    /// Restyle after a change on `node`: its subtree, or its parent's when
    /// sibling-dependent rules are registered.
    fn invalidate<D: DomTree<Node = N>>(&mut self, dom: &D, node: N) {
        let Some(key) = self.tree.key(node) else {
            return;
        };
        let target = if self.sibling_invalidation_active() {
            self.tree
                .get(key)
                .and_then(StyleNode::parent)
                .unwrap_or(key)
        } else {
            key
        };
        self.recompute_key(dom, target);
    }

    fn restyle_all<D: DomTree<Node = N>>(&mut self, dom: &D) {
        if let Some(root) = self.tree.root() {
            self.recompute_key(dom, root);
        }
    }

    /// Recompute `key` and everything below it, parents first, then notify.
    fn recompute_key<D: DomTree<Node = N>>(&mut self, dom: &D, key: StyleKey) {
        let mut updates = Vec::new();
        for current in self.tree.subtree(key) {
            if let Some(update) = self.recompute_one(dom, current) {
                updates.push(update);
            }
        }
        tracing::trace!(
            source = self.config.source(),
            changed_nodes = updates.len(),
            "recompute pass"
        );
        self.notify(&updates);
    }

    fn recompute_one<D: DomTree<Node = N>>(
        &mut self,
        dom: &D,
        key: StyleKey,
    ) -> Option<StyleUpdate<N>> {
        let next = {
            let node = self.tree.get(key)?;
            let parent = node
                .parent()
                .and_then(|p| self.tree.get(p))
                .map(StyleNode::style_set);
            let cascade = Cascade::new(dom, self.default_sheet.as_ref());
            match node.element() {
                Some(block) => cascade.element(
                    node.dom_node(),
                    parent,
                    self.rules(),
                    Some(block.inline_set()),
                ),
                None => cascade.text(parent),
            }
        };

        let node = self.tree.get_mut(key)?;
        let change_count = node.style_set.set_all(&next);
        if change_count == 0 {
            return None;
        }
        let changed = node.computed.diff(&next);
        let previous = mem::replace(&mut node.computed, next.clone());
        tracing::trace!(
            node = ?node.dom_node(),
            change_count,
            current = %next.to_inline_string(),
            "style changed"
        );
        Some(StyleUpdate {
            node: node.dom_node(),
            change_count,
            changed,
            previous,
            current: next,
        })
    }
}

impl<N: Copy + Eq + Hash + Debug> Default for StyleEngine<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Debug> fmt::Debug for StyleEngine<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleEngine")
            .field("config", &self.config)
            .field("tree", &self.tree)
            .field("sheets", &self.sheets.len())
            .field("rules", &self.ordered.len())
            .field("default_sheet", &self.default_sheet.is_some())
            .field("parser", &self.parser.is_some())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::css::model::{
        Combinator, ComplexSelector, CompoundSelector, RuleSet, SelectorList, StyleSheet,
    };
    use crate::css::property::{BACKGROUND_COLOR, BOLD, TEXT_COLOR, WIDTH};
    use crate::css::scalar::Scalar;
    use crate::css::value::{Color, Value};
    use crate::dom::{Dom, NodeData};
    use pretty_assertions::assert_eq;

    fn sheet(rules: Vec<(ComplexSelector, PropertySet)>) -> Stylesheet {
        let parsed = rules
            .into_iter()
            .fold(StyleSheet::new(), |sheet, (selector, props)| {
                sheet.rule(RuleSet::new(SelectorList::single(selector), props))
            });
        let (sheet, errors) = Stylesheet::compile(&parsed);
        assert!(errors.is_empty(), "{errors}");
        sheet
    }

    fn color(c: Color) -> PropertySet {
        let mut set = PropertySet::new();
        set.set(&TEXT_COLOR, Value::explicit(c));
        set
    }

    fn class(name: &str) -> ComplexSelector {
        CompoundSelector::new().class(name).into()
    }

    fn sync(engine: &mut StyleEngine, dom: &mut Dom) {
        for event in dom.drain_events() {
            engine.handle_event(dom, &event).unwrap();
        }
    }

    fn text_color(engine: &mut StyleEngine, dom: &Dom, node: NodeId) -> Option<Color> {
        engine.resolved_style(dom, node).unwrap().explicit(&TEXT_COLOR)
    }

    /// ```text
    /// div.root
    /// ├── p.a
    /// │   └── "text"
    /// └── p.b
    /// ```
    fn build() -> (Dom, NodeId, NodeId, NodeId, NodeId) {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::element("div").with_class("root"));
        let a = dom.insert_child(root, NodeData::element("p").with_class("a")).unwrap();
        let text = dom.insert_child(a, NodeData::text("text")).unwrap();
        let b = dom.insert_child(root, NodeData::element("p").with_class("b")).unwrap();
        (dom, root, a, text, b)
    }

    #[test]
    fn lazy_build_on_first_query() {
        let (mut dom, root, a, text, b) = build();
        dom.drain_events();
        let mut engine = StyleEngine::new();
        engine.add_stylesheet(&dom, sheet(vec![(class("a"), color(Color::RED))]));
        assert!(engine.tree().is_empty());

        assert_eq!(text_color(&mut engine, &dom, a), Some(Color::RED));
        assert_eq!(engine.tree().len(), 4);
        assert_eq!(text_color(&mut engine, &dom, text), Some(Color::RED));
        assert_eq!(text_color(&mut engine, &dom, b), None);
        assert_eq!(text_color(&mut engine, &dom, root), None);
    }

    #[test]
    fn detached_node_is_not_tracked() {
        let (mut dom, ..) = build();
        let loose = dom.create(NodeData::element("span"));
        let mut engine = StyleEngine::new();
        assert_eq!(
            engine.resolved_style(&dom, loose).unwrap_err(),
            StyleTreeError::NotTracked(loose)
        );
    }

    #[test]
    fn events_keep_tree_in_lockstep() {
        let mut dom = Dom::new();
        let mut engine = StyleEngine::new();
        engine.add_stylesheet(&dom, sheet(vec![(class("a"), color(Color::RED))]));

        let root = dom.insert(NodeData::element("div"));
        sync(&mut engine, &mut dom);
        assert!(engine.is_tracked(root));

        let a = dom.insert_child(root, NodeData::element("p").with_class("a")).unwrap();
        let inner = dom.insert_child(a, NodeData::element("span")).unwrap();
        sync(&mut engine, &mut dom);
        assert!(engine.is_tracked(inner));
        assert_eq!(
            engine.style_node(inner).unwrap().style_set().explicit(&TEXT_COLOR),
            Some(Color::RED)
        );

        dom.remove(a);
        sync(&mut engine, &mut dom);
        assert!(!engine.is_tracked(a));
        assert!(!engine.is_tracked(inner));
        assert_eq!(engine.tree().len(), 1);
    }

    #[test]
    fn appending_detached_subtree_tracks_all_of_it() {
        let (mut dom, root, ..) = build();
        let mut engine = StyleEngine::new();
        sync(&mut engine, &mut dom);

        let branch = dom.create(NodeData::element("section"));
        let leaf = dom.insert_child(branch, NodeData::element("p").with_class("a")).unwrap();
        sync(&mut engine, &mut dom);
        assert!(!engine.is_tracked(branch));

        dom.append_child(root, branch).unwrap();
        sync(&mut engine, &mut dom);
        assert!(engine.is_tracked(leaf));
        assert_eq!(engine.tree().len(), 6);
    }

    #[test]
    fn remove_of_untracked_child_under_tracked_parent_is_an_error() {
        let (mut dom, root, ..) = build();
        let mut engine = StyleEngine::new();
        sync(&mut engine, &mut dom);
        let ghost = dom.create(NodeData::element("p"));
        let event = DomEvent::RemoveChild {
            parent: Some(root),
            node: ghost,
        };
        assert_eq!(
            engine.handle_event(&dom, &event),
            Err(StyleTreeError::NotTracked(ghost))
        );
    }

    #[test]
    fn class_change_restyles() {
        let (mut dom, _root, a, ..) = build();
        let mut engine = StyleEngine::new();
        engine.add_stylesheet(
            &dom,
            sheet(vec![
                (class("a"), color(Color::RED)),
                (
                    CompoundSelector::new().class("a").class("hot").into(),
                    color(Color::BLUE),
                ),
            ]),
        );
        sync(&mut engine, &mut dom);
        assert_eq!(text_color(&mut engine, &dom, a), Some(Color::RED));

        dom.add_class(a, "hot").unwrap();
        sync(&mut engine, &mut dom);
        assert_eq!(text_color(&mut engine, &dom, a), Some(Color::BLUE));
    }

    #[test]
    fn subscribers_see_each_changed_node_once() {
        let (mut dom, root, a, text, _b) = build();
        let mut engine = StyleEngine::new();
        sync(&mut engine, &mut dom);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let id = engine.subscribe(move |update| {
            sink.borrow_mut().push((update.node, update.change_count, update.changed.clone()));
        });

        engine.add_stylesheet(&dom, sheet(vec![(class("root"), color(Color::GREEN))]));
        let seen_now = seen.borrow().clone();
        // Root plus everything inheriting the cascading color.
        assert_eq!(seen_now.len(), 4);
        assert_eq!(seen_now[0], (root, 1, vec![TEXT_COLOR.id()]));
        assert!(seen_now.iter().any(|(node, ..)| *node == text));
        assert!(seen_now.iter().any(|(node, ..)| *node == a));

        assert!(engine.unsubscribe(id));
        assert!(!engine.unsubscribe(id));
        engine.add_stylesheet(&dom, sheet(vec![(class("root"), color(Color::RED))]));
        assert_eq!(seen.borrow().len(), 4);
    }

    #[test]
    fn update_carries_previous_and_current() {
        let (mut dom, _root, a, ..) = build();
        let mut engine = StyleEngine::new();
        let first = engine.add_stylesheet(&dom, sheet(vec![(class("a"), color(Color::RED))]));
        sync(&mut engine, &mut dom);

        let last = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&last);
        engine.subscribe(move |update| {
            if update.node == a {
                *sink.borrow_mut() = Some(update.clone());
            }
        });
        engine.replace_stylesheet(&dom, first, sheet(vec![(class("a"), color(Color::BLUE))]));

        let update = last.borrow().clone().unwrap();
        assert_eq!(update.previous.explicit(&TEXT_COLOR), Some(Color::RED));
        assert_eq!(update.current.explicit(&TEXT_COLOR), Some(Color::BLUE));
        assert_eq!(engine.style_node(a).unwrap().computed(), &update.current);
    }

    #[test]
    fn registration_order_breaks_specificity_ties() {
        let (mut dom, _root, a, ..) = build();
        let mut engine = StyleEngine::new();
        let red = engine.add_stylesheet(&dom, sheet(vec![(class("a"), color(Color::RED))]));
        engine.add_stylesheet(&dom, sheet(vec![(class("a"), color(Color::BLUE))]));
        sync(&mut engine, &mut dom);
        assert_eq!(text_color(&mut engine, &dom, a), Some(Color::BLUE));

        // The replacement keeps the first sheet's place, so blue still wins.
        let old = engine
            .replace_stylesheet(&dom, red, sheet(vec![(class("a"), color(Color::GREEN))]))
            .unwrap();
        assert_eq!(old.len(), 1);
        assert_eq!(text_color(&mut engine, &dom, a), Some(Color::BLUE));
        assert_eq!(engine.stylesheets().len(), 2);

        let removed = engine.stylesheets()[1].0;
        engine.remove_stylesheet(&dom, removed).unwrap();
        assert_eq!(text_color(&mut engine, &dom, a), Some(Color::GREEN));
        assert!(engine.remove_stylesheet(&dom, removed).is_none());
    }

    #[test]
    fn rules_are_in_cascade_order() {
        let dom = Dom::new();
        let mut engine: StyleEngine = StyleEngine::new();
        engine.add_stylesheet(
            &dom,
            sheet(vec![
                (CompoundSelector::new().id("x").into(), color(Color::RED)),
                (class("a"), color(Color::RED)),
            ]),
        );
        engine.add_stylesheet(
            &dom,
            sheet(vec![(CompoundSelector::new().tag("p").into(), color(Color::RED))]),
        );
        let specs: Vec<String> = engine.rules().map(|r| r.spec().to_string()).collect();
        assert_eq!(specs, vec!["(0, 0, 1)", "(0, 1, 0)", "(1, 0, 0)"]);
    }

    #[test]
    fn sibling_rules_restyle_following_siblings() {
        let (mut dom, _root, a, _text, b) = build();
        let adjacent = ComplexSelector::compound(CompoundSelector::new().class("x"))
            .then(Combinator::AdjacentSibling, CompoundSelector::new().tag("p"));
        let mut engine = StyleEngine::new();
        engine.add_stylesheet(&dom, sheet(vec![(adjacent.clone(), color(Color::RED))]));
        sync(&mut engine, &mut dom);
        assert_eq!(text_color(&mut engine, &dom, b), None);

        dom.add_class(a, "x").unwrap();
        sync(&mut engine, &mut dom);
        assert_eq!(text_color(&mut engine, &dom, b), Some(Color::RED));

        // Without sibling invalidation only `a`'s subtree is recomputed.
        let (mut dom, _root, a, _text, b) = build();
        let mut engine =
            StyleEngine::with_config(EngineConfig::new().with_sibling_invalidation(false));
        engine.add_stylesheet(&dom, sheet(vec![(adjacent, color(Color::RED))]));
        sync(&mut engine, &mut dom);
        dom.add_class(a, "x").unwrap();
        sync(&mut engine, &mut dom);
        assert_eq!(text_color(&mut engine, &dom, b), None);
        engine.update_from_root(&dom).unwrap();
        assert_eq!(text_color(&mut engine, &dom, b), Some(Color::RED));
    }

    #[test]
    fn hover_restyles() {
        let (mut dom, _root, a, ..) = build();
        let mut engine = StyleEngine::new();
        engine.add_stylesheet(
            &dom,
            sheet(vec![(
                CompoundSelector::new().tag("p").pseudo_class("hover").into(),
                color(Color::YELLOW),
            )]),
        );
        sync(&mut engine, &mut dom);
        dom.set_hovered(a, true).unwrap();
        sync(&mut engine, &mut dom);
        assert_eq!(text_color(&mut engine, &dom, a), Some(Color::YELLOW));
        dom.set_hovered(a, false).unwrap();
        sync(&mut engine, &mut dom);
        assert_eq!(text_color(&mut engine, &dom, a), None);
    }

    fn bold_parser(text: &str) -> PropertySet {
        let mut set = PropertySet::new();
        if text.contains("bold") {
            set.set(&BOLD, Value::explicit(true));
        }
        set
    }

    #[test]
    fn style_attribute_is_parsed() {
        let (mut dom, _root, a, ..) = build();
        let mut engine = StyleEngine::new();
        engine.set_inline_parser(bold_parser);
        dom.set_attribute(a, "style", "bold: true").unwrap();
        sync(&mut engine, &mut dom);
        assert_eq!(engine.inline_set(a).unwrap().explicit(&BOLD), Some(true));
        assert_eq!(engine.resolved_style(&dom, a).unwrap().explicit(&BOLD), Some(true));

        dom.remove_attribute(a, "style").unwrap();
        sync(&mut engine, &mut dom);
        assert!(engine.inline_set(a).unwrap().is_empty());
        assert!(!engine.resolved_style(&dom, a).unwrap().has(BOLD.id()));
    }

    #[test]
    fn suppressed_style_attribute_is_not_parsed() {
        let (mut dom, _root, a, ..) = build();
        let mut engine = StyleEngine::new();
        engine.set_inline_parser(bold_parser);
        sync(&mut engine, &mut dom);

        assert!(!engine.set_suppress_inline_updates(a, true).unwrap());
        dom.set_attribute(a, "style", "bold: true").unwrap();
        sync(&mut engine, &mut dom);
        assert!(engine.inline_set(a).unwrap().is_empty());
        assert!(engine.set_suppress_inline_updates(a, false).unwrap());
    }

    #[test]
    fn inline_style_handle_restyles_on_drop() {
        let (mut dom, _root, a, text, _b) = build();
        let mut engine = StyleEngine::new();
        sync(&mut engine, &mut dom);
        {
            let mut inline = engine.inline_style(&dom, a).unwrap();
            inline.set(&TEXT_COLOR, Value::explicit(Color::GREEN));
            inline.set(&WIDTH, Value::explicit(Scalar::px(4.0)));
        }
        assert_eq!(text_color(&mut engine, &dom, a), Some(Color::GREEN));
        assert_eq!(text_color(&mut engine, &dom, text), Some(Color::GREEN));

        let mut inline = engine.inline_style(&dom, a).unwrap();
        inline.remove(TEXT_COLOR.id());
        inline.commit().unwrap();
        assert_eq!(text_color(&mut engine, &dom, a), None);
        assert_eq!(engine.computed_style(&dom, a).unwrap().width, Scalar::px(4.0));

        assert_eq!(
            engine.inline_style(&dom, text).err(),
            Some(StyleTreeError::NotAnElement(text))
        );
    }

    #[test]
    fn initial_uses_default_sheet() {
        let (mut dom, _root, a, ..) = build();
        let mut engine = StyleEngine::new();
        let mut initial = PropertySet::new();
        initial.set(&BACKGROUND_COLOR, Value::initial());
        engine.add_stylesheet(&dom, sheet(vec![(class("a"), initial)]));
        sync(&mut engine, &mut dom);
        assert!(!engine.resolved_style(&dom, a).unwrap().has(BACKGROUND_COLOR.id()));

        let mut defaults = PropertySet::new();
        defaults.set(&BACKGROUND_COLOR, Value::explicit(Color::GRAY));
        engine.set_default_stylesheet(
            &dom,
            Some(sheet(vec![(CompoundSelector::new().tag("p").into(), defaults)])),
        );
        assert_eq!(
            engine.resolved_style(&dom, a).unwrap().explicit(&BACKGROUND_COLOR),
            Some(Color::GRAY)
        );
    }

    #[test]
    fn default_sheet_sibling_rules_invalidate_siblings() {
        let (mut dom, root, a, ..) = build();
        let mut engine = StyleEngine::new();
        let mut initial = PropertySet::new();
        initial.set(&WIDTH, Value::initial());
        engine.add_stylesheet(
            &dom,
            sheet(vec![(CompoundSelector::new().tag("p").into(), initial)]),
        );

        let mut first = PropertySet::new();
        first.set(&WIDTH, Value::explicit(Scalar::px(5.0)));
        let mut rest = PropertySet::new();
        rest.set(&WIDTH, Value::explicit(Scalar::px(9.0)));
        engine.set_default_stylesheet(
            &dom,
            Some(sheet(vec![
                (CompoundSelector::new().tag("p").pseudo_class("first-child").into(), first),
                (CompoundSelector::new().tag("p").into(), rest),
            ])),
        );
        sync(&mut engine, &mut dom);
        let width = |engine: &mut StyleEngine, dom: &Dom, node: NodeId| {
            engine.resolved_style(dom, node).unwrap().explicit(&WIDTH)
        };
        assert_eq!(width(&mut engine, &dom, a), Some(Scalar::px(5.0)));

        let front = dom.create(NodeData::element("p"));
        dom.insert_at(root, 0, front).unwrap();
        sync(&mut engine, &mut dom);
        assert_eq!(width(&mut engine, &dom, front), Some(Scalar::px(5.0)));
        assert_eq!(width(&mut engine, &dom, a), Some(Scalar::px(9.0)));
    }

    #[test]
    fn recompute_matches_fresh_engine() {
        let (mut dom, root, ..) = build();
        let rules = || {
            sheet(vec![
                (class("root"), color(Color::GREEN)),
                (
                    ComplexSelector::compound(CompoundSelector::new().class("root"))
                        .then(Combinator::Child, CompoundSelector::new().tag("p")),
                    color(Color::BLUE),
                ),
            ])
        };
        let mut incremental = StyleEngine::new();
        incremental.add_stylesheet(&dom, rules());
        sync(&mut incremental, &mut dom);

        let mut added = Vec::new();
        for _ in 0..3 {
            added.push(dom.insert_child(root, NodeData::element("p")).unwrap());
        }
        sync(&mut incremental, &mut dom);

        let mut fresh = StyleEngine::new();
        fresh.add_stylesheet(&dom, rules());
        for node in dom.walk_depth_first(root) {
            assert_eq!(
                incremental.resolved_style(&dom, node).unwrap().clone(),
                fresh.resolved_style(&dom, node).unwrap().clone()
            );
        }
        assert_eq!(text_color(&mut incremental, &dom, added[2]), Some(Color::BLUE));
    }
}
