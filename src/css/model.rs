//! Stylesheet AST: ComplexSelector, SelectorList, RuleSet, StyleSheet.
//!
//! This is the structured form handed over by the stylesheet parser. Property
//! values are already evaluated, so a rule carries a [`PropertySet`] rather than
//! raw declaration tokens.

use crate::css::property_set::PropertySet;

/// Attribute selector operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeOperator {
    /// `[a]`
    Has,
    /// `[a=v]`
    Equals,
    /// `[a~=v]`: whitespace-separated word list contains `v`.
    ContainsWord,
    /// `[a|=v]`: exactly `v`, or starts with `v-`.
    DashPrefixed,
    /// `[a^=v]`
    StartsWith,
    /// `[a$=v]`
    EndsWith,
    /// `[a*=v]`
    ContainsSubstring,
}

impl AttributeOperator {
    /// The operator as written between name and value (`""` for [`AttributeOperator::Has`]).
    pub fn symbol(self) -> &'static str {
        match self {
            AttributeOperator::Has => "",
            AttributeOperator::Equals => "=",
            AttributeOperator::ContainsWord => "~=",
            AttributeOperator::DashPrefixed => "|=",
            AttributeOperator::StartsWith => "^=",
            AttributeOperator::EndsWith => "$=",
            AttributeOperator::ContainsSubstring => "*=",
        }
    }
}

/// The argument of an `nth-*` pseudo-function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexExpr {
    /// `An+B`
    AnB { a: i32, b: i32 },
    /// `even`
    Even,
    /// `odd`
    Odd,
}

/// A single simple selector.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorComponent {
    /// `*`
    Universal,
    /// Tag name selector, e.g. `div`.
    Type(String),
    /// `.classname`
    Class(String),
    /// `#id`
    Id(String),
    /// `[name op value]`
    Attribute {
        name: String,
        op: AttributeOperator,
        value: String,
    },
    /// `:hover`, `:first-child`, ...
    PseudoClass(String),
    /// `::placeholder`
    PseudoElement(String),
    /// `:nth-child(2n+1 of .a)`, `:is(...)`, `:not(...)`.
    PseudoFunction {
        name: String,
        index: Option<IndexExpr>,
        selectors: Option<SelectorList>,
    },
    /// `&`: the selector of the enclosing rule.
    Nesting,
}

/// A combinator between compound selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Whitespace: `A B`.
    Descendant,
    /// `A > B`
    Child,
    /// `A + B`
    AdjacentSibling,
    /// `A ~ B`
    GeneralSibling,
}

/// A sequence of simple selectors without combinators.
///
/// For example, `div.primary:hover` is one `CompoundSelector` with three
/// components: `Type("div")`, `Class("primary")`, `PseudoClass("hover")`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompoundSelector {
    pub components: Vec<SelectorComponent>,
}

impl CompoundSelector {
    /// Create an empty compound selector.
    pub fn new() -> Self {
        Self {
            components: Vec::new(),
        }
    }

    /// Append a component to this compound selector.
    pub fn push(&mut self, component: SelectorComponent) {
        self.components.push(component);
    }

    /// Add a component (builder).
    pub fn with(mut self, component: SelectorComponent) -> Self {
        self.push(component);
        self
    }

    /// `*` (builder).
    pub fn universal(self) -> Self {
        self.with(SelectorComponent::Universal)
    }

    /// Tag name (builder).
    pub fn tag(self, name: impl Into<String>) -> Self {
        self.with(SelectorComponent::Type(name.into()))
    }

    /// `.class` (builder).
    pub fn class(self, name: impl Into<String>) -> Self {
        self.with(SelectorComponent::Class(name.into()))
    }

    /// `#id` (builder).
    pub fn id(self, name: impl Into<String>) -> Self {
        self.with(SelectorComponent::Id(name.into()))
    }

    /// `[name op value]` (builder).
    pub fn attribute(
        self,
        name: impl Into<String>,
        op: AttributeOperator,
        value: impl Into<String>,
    ) -> Self {
        self.with(SelectorComponent::Attribute {
            name: name.into(),
            op,
            value: value.into(),
        })
    }

    /// `:name` (builder).
    pub fn pseudo_class(self, name: impl Into<String>) -> Self {
        self.with(SelectorComponent::PseudoClass(name.into()))
    }

    /// `::name` (builder).
    pub fn pseudo_element(self, name: impl Into<String>) -> Self {
        self.with(SelectorComponent::PseudoElement(name.into()))
    }

    /// `:name(index [of selectors])` (builder).
    pub fn nth(
        self,
        name: impl Into<String>,
        index: IndexExpr,
        of: Option<SelectorList>,
    ) -> Self {
        self.with(SelectorComponent::PseudoFunction {
            name: name.into(),
            index: Some(index),
            selectors: of,
        })
    }

    /// `:name(selectors)` for `is` / `not` (builder).
    pub fn function(self, name: impl Into<String>, selectors: SelectorList) -> Self {
        self.with(SelectorComponent::PseudoFunction {
            name: name.into(),
            index: None,
            selectors: Some(selectors),
        })
    }

    /// `&` (builder).
    pub fn nesting(self) -> Self {
        self.with(SelectorComponent::Nesting)
    }

    /// Returns `true` if this selector is the universal selector `*` alone.
    pub fn is_universal(&self) -> bool {
        matches!(self.components.as_slice(), [SelectorComponent::Universal])
    }

    /// Returns `true` if this compound references the enclosing rule with `&`.
    pub fn has_nesting(&self) -> bool {
        self.components
            .iter()
            .any(|c| matches!(c, SelectorComponent::Nesting))
    }
}

/// One element in a selector chain: either a compound selector or a combinator.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorPart {
    Compound(CompoundSelector),
    Combinator(Combinator),
}

/// A full selector: chain of compound selectors joined by combinators.
///
/// For example, `ul > li.active` has parts
/// `[Compound(ul), Combinator(Child), Compound(li.active)]`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComplexSelector {
    /// Alternating compound selectors and combinators.
    /// Always starts and ends with a `SelectorPart::Compound`.
    pub parts: Vec<SelectorPart>,
}

impl ComplexSelector {
    /// Create an empty selector.
    pub fn new() -> Self {
        Self { parts: Vec::new() }
    }

    /// A selector made of one compound.
    pub fn compound(compound: CompoundSelector) -> Self {
        Self {
            parts: vec![SelectorPart::Compound(compound)],
        }
    }

    /// Append `combinator compound` to the chain (builder).
    pub fn then(mut self, combinator: Combinator, compound: CompoundSelector) -> Self {
        self.parts.push(SelectorPart::Combinator(combinator));
        self.parts.push(SelectorPart::Compound(compound));
        self
    }

    /// The compound selectors of the chain, left to right.
    pub fn compounds(&self) -> impl Iterator<Item = &CompoundSelector> {
        self.parts.iter().filter_map(|part| match part {
            SelectorPart::Compound(c) => Some(c),
            SelectorPart::Combinator(_) => None,
        })
    }
}

impl From<CompoundSelector> for ComplexSelector {
    fn from(compound: CompoundSelector) -> Self {
        Self::compound(compound)
    }
}

/// A comma-separated selector list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectorList {
    pub selectors: Vec<ComplexSelector>,
}

impl SelectorList {
    pub fn new(selectors: Vec<ComplexSelector>) -> Self {
        Self { selectors }
    }

    /// A list with a single selector.
    pub fn single(selector: impl Into<ComplexSelector>) -> Self {
        Self {
            selectors: vec![selector.into()],
        }
    }
}

/// A rule: a selector list, its evaluated properties and any nested rules.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    pub selectors: SelectorList,
    pub properties: PropertySet,
    /// Rules written inside this rule's block; they may reference it with `&`.
    pub nested: Vec<RuleSet>,
}

impl RuleSet {
    pub fn new(selectors: SelectorList, properties: PropertySet) -> Self {
        Self {
            selectors,
            properties,
            nested: Vec::new(),
        }
    }

    /// Add a nested rule (builder).
    pub fn with_nested(mut self, rule: RuleSet) -> Self {
        self.nested.push(rule);
        self
    }
}

/// A parsed stylesheet: a list of rule sets in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleSheet {
    pub rules: Vec<RuleSet>,
}

impl StyleSheet {
    /// Create an empty stylesheet.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule (builder).
    pub fn rule(mut self, rule: RuleSet) -> Self {
        self.rules.push(rule);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compound_selector_new() {
        let cs = CompoundSelector::new();
        assert!(cs.components.is_empty());
        assert!(!cs.is_universal());
    }

    #[test]
    fn test_compound_selector_builder() {
        let cs = CompoundSelector::new().tag("div").class("primary").pseudo_class("hover");
        assert_eq!(
            cs.components,
            vec![
                SelectorComponent::Type("div".into()),
                SelectorComponent::Class("primary".into()),
                SelectorComponent::PseudoClass("hover".into()),
            ]
        );
    }

    #[test]
    fn test_compound_selector_is_universal() {
        assert!(CompoundSelector::new().universal().is_universal());
        assert!(!CompoundSelector::new().universal().class("foo").is_universal());
    }

    #[test]
    fn test_compound_selector_has_nesting() {
        assert!(CompoundSelector::new().nesting().class("a").has_nesting());
        assert!(!CompoundSelector::new().class("a").has_nesting());
    }

    #[test]
    fn test_complex_selector_chain() {
        let selector = ComplexSelector::compound(CompoundSelector::new().tag("ul"))
            .then(Combinator::Child, CompoundSelector::new().tag("li").class("active"));

        assert_eq!(selector.parts.len(), 3);
        assert!(matches!(&selector.parts[1], SelectorPart::Combinator(Combinator::Child)));
        assert_eq!(selector.compounds().count(), 2);
    }

    #[test]
    fn test_attribute_operator_symbols() {
        assert_eq!(AttributeOperator::Has.symbol(), "");
        assert_eq!(AttributeOperator::DashPrefixed.symbol(), "|=");
        assert_eq!(AttributeOperator::ContainsSubstring.symbol(), "*=");
    }

    #[test]
    fn test_stylesheet_builder() {
        let sheet = StyleSheet::new().rule(
            RuleSet::new(
                SelectorList::single(CompoundSelector::new().class("a")),
                PropertySet::new(),
            )
            .with_nested(RuleSet::new(
                SelectorList::single(CompoundSelector::new().nesting().pseudo_class("hover")),
                PropertySet::new(),
            )),
        );
        assert_eq!(sheet.rules.len(), 1);
        assert_eq!(sheet.rules[0].nested.len(), 1);
    }
}
