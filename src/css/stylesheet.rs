//! Compiled stylesheets: Rule, Stylesheet, StylesheetBuilder.
//!
//! Compiles a parsed [`StyleSheet`] into rules ready for matching against DOM
//! nodes. Each branch of a comma-separated selector list becomes its own
//! [`Rule`] with its own specificity; the branches share one property set.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::css::model::{RuleSet, StyleSheet};
use crate::css::property_set::PropertySet;
use crate::css::selector::{CompileContext, CompileErrors, Selector, SelectorGroup};
use crate::css::specificity::Spec;
use crate::dom::traits::DomTree;

// ---------------------------------------------------------------------------
// Rule
// ---------------------------------------------------------------------------

/// A single compiled selector with the properties it applies.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    selector: Selector,
    properties: Arc<PropertySet>,
    /// Position of the rule within its stylesheet.
    source_order: usize,
}

impl Rule {
    pub fn new(selector: Selector, properties: Arc<PropertySet>, source_order: usize) -> Self {
        Self {
            selector,
            properties,
            source_order,
        }
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn properties(&self) -> &PropertySet {
        &self.properties
    }

    /// The selector's specificity.
    pub fn spec(&self) -> Spec {
        self.selector.spec()
    }

    pub fn source_order(&self) -> usize {
        self.source_order
    }

    /// Whether the rule applies to `el`.
    pub fn matches<D: DomTree>(&self, dom: &D, el: D::Node) -> bool {
        self.selector.test(dom, None, el)
    }

    /// Cascade order within one stylesheet: specificity, then source order.
    pub fn cascade_cmp(&self, other: &Rule) -> Ordering {
        self.spec()
            .cmp(&other.spec())
            .then(self.source_order.cmp(&other.source_order))
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{ {} }}", self.selector, self.properties.to_inline_string())
    }
}

// ---------------------------------------------------------------------------
// Stylesheet
// ---------------------------------------------------------------------------

/// A compiled stylesheet: its rules in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stylesheet {
    name: Option<String>,
    rules: Vec<Rule>,
}

impl Stylesheet {
    /// Compile a parsed stylesheet.
    ///
    /// Never fails: problems are returned alongside the best-effort result.
    pub fn compile(sheet: &StyleSheet) -> (Self, CompileErrors) {
        StylesheetBuilder::new().rules(&sheet.rules).build()
    }

    /// Compile a parsed stylesheet under a name used in diagnostics.
    pub fn compile_named(name: impl Into<String>, sheet: &StyleSheet) -> (Self, CompileErrors) {
        StylesheetBuilder::named(name).rules(&sheet.rules).build()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Rules in source order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether any rule can change result when an element's siblings change.
    pub fn depends_on_siblings(&self) -> bool {
        self.rules
            .iter()
            .any(|rule| rule.selector.depends_on_siblings())
    }
}

impl fmt::Display for Stylesheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, rule) in self.rules.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{rule}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// StylesheetBuilder
// ---------------------------------------------------------------------------

/// Incrementally compiles rule sets into a [`Stylesheet`].
#[derive(Debug, Default)]
pub struct StylesheetBuilder {
    name: Option<String>,
    rules: Vec<Rule>,
    errors: CompileErrors,
}

impl StylesheetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder whose compile errors carry `name`.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            errors: CompileErrors::new(Some(name.clone())),
            name: Some(name),
            rules: Vec::new(),
        }
    }

    /// Compile and append one rule set, including its nested rules.
    pub fn add_rule_set(&mut self, rule: &RuleSet) {
        self.add_scoped(rule, None);
    }

    /// Append a rule set (builder).
    pub fn rule(mut self, rule: &RuleSet) -> Self {
        self.add_rule_set(rule);
        self
    }

    /// Append several rule sets in order (builder).
    pub fn rules<'r>(mut self, rules: impl IntoIterator<Item = &'r RuleSet>) -> Self {
        for rule in rules {
            self.add_rule_set(rule);
        }
        self
    }

    /// Append an already compiled selector.
    pub fn add_compiled(&mut self, selector: Selector, properties: PropertySet) {
        let order = self.rules.len();
        self.rules
            .push(Rule::new(selector, Arc::new(properties), order));
    }

    /// Finish, returning the stylesheet and every error found on the way.
    pub fn build(self) -> (Stylesheet, CompileErrors) {
        let sheet = Stylesheet {
            name: self.name,
            rules: self.rules,
        };
        tracing::debug!(
            name = sheet.name().unwrap_or("<anonymous>"),
            rules = sheet.len(),
            errors = self.errors.len(),
            "compiled stylesheet"
        );
        (sheet, self.errors)
    }

    fn add_scoped(&mut self, rule: &RuleSet, scope: Option<Arc<SelectorGroup>>) {
        let group = match scope {
            Some(scope) => {
                CompileContext::nested(&mut self.errors, scope).compile_group(&rule.selectors)
            }
            None => CompileContext::new(&mut self.errors).compile_group(&rule.selectors),
        };

        let properties = Arc::new(rule.properties.clone());
        for selector in group.selectors() {
            let order = self.rules.len();
            self.rules
                .push(Rule::new(selector.clone(), Arc::clone(&properties), order));
        }

        if rule.nested.is_empty() {
            return;
        }
        let group = Arc::new(group);
        for nested in &rule.nested {
            self.add_scoped(nested, Some(Arc::clone(&group)));
        }
    }
}
