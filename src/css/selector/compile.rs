//! Selector compilation: AST -> [`Selector`] / [`SelectorGroup`].
//!
//! Compilation never fails. Problems are collected as [`CompileError`]s and the
//! offending matcher degrades to [`Matcher::Never`] (or is left out), so one
//! bad selector cannot take the rest of a stylesheet down with it.

use std::fmt;
use std::sync::Arc;

use crate::css::model::{
    ComplexSelector, CompoundSelector, IndexExpr, SelectorComponent, SelectorList, SelectorPart,
};
use crate::css::selector::anb::{AnB, IndexSelector};
use crate::css::selector::combinator::Combinator;
use crate::css::selector::matching::{PseudoClass, PseudoElement};
use crate::css::selector::{Matcher, Selector, SelectorGroup, SelectorNode};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A problem found while compiling a selector.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error("unknown pseudo-class ':{0}'")]
    UnknownPseudoClass(String),

    #[error("unknown pseudo-element '::{0}'")]
    UnknownPseudoElement(String),

    #[error("unknown pseudo-function ':{0}()'")]
    UnknownPseudoFunction(String),

    #[error("':{0}()' requires a selector argument")]
    MissingSelectorArgument(String),

    #[error("':{0}()' requires an index argument")]
    MissingIndex(String),

    #[error("index '{anb}' in ':{function}()' can never match")]
    InvalidIndex { function: String, anb: AnB },

    #[error("':{0}()' does not accept an 'of' selector")]
    OfSelectorNotAllowed(String),

    #[error("'&' used outside a nested rule")]
    NestingOutsideRule,

    #[error("empty selector")]
    EmptySelector,
}

/// Compile errors collected over a selector or a whole stylesheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompileErrors {
    source_name: Option<String>,
    errors: Vec<CompileError>,
}

impl CompileErrors {
    pub fn new(source_name: Option<String>) -> Self {
        Self {
            source_name,
            errors: Vec::new(),
        }
    }

    /// Name of the stylesheet the errors came from, if known.
    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    /// Record an error. Every error is also logged at `warn` level.
    pub fn push(&mut self, error: CompileError) {
        tracing::warn!(
            source = self.source_name.as_deref().unwrap_or("<anonymous>"),
            %error,
            "selector compile error"
        );
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompileError> {
        self.errors.iter()
    }

    pub fn into_vec(self) -> Vec<CompileError> {
        self.errors
    }
}

impl fmt::Display for CompileErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = self.source_name.as_deref().unwrap_or("<anonymous>");
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{source}: {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for CompileErrors {}

// ---------------------------------------------------------------------------
// CompileContext
// ---------------------------------------------------------------------------

/// Compilation state: the error sink and the selector `&` refers to.
#[derive(Debug)]
pub struct CompileContext<'a> {
    errors: &'a mut CompileErrors,
    scope: Option<Arc<SelectorGroup>>,
}

impl<'a> CompileContext<'a> {
    /// A context for top-level selectors, where `&` is an error.
    pub fn new(errors: &'a mut CompileErrors) -> Self {
        Self {
            errors,
            scope: None,
        }
    }

    /// A context for selectors nested inside a rule whose selector is `scope`.
    pub fn nested(errors: &'a mut CompileErrors, scope: Arc<SelectorGroup>) -> Self {
        Self {
            errors,
            scope: Some(scope),
        }
    }

    pub fn compile_group(&mut self, list: &SelectorList) -> SelectorGroup {
        SelectorGroup::new(
            list.selectors
                .iter()
                .map(|selector| self.compile_selector(selector))
                .collect(),
        )
    }

    pub fn compile_selector(&mut self, selector: &ComplexSelector) -> Selector {
        let mut nodes: Vec<SelectorNode> = Vec::new();
        let mut pending: Option<Combinator> = None;
        let mut references_scope = false;

        for part in &selector.parts {
            let compound = match part {
                SelectorPart::Combinator(combinator) => {
                    pending = Some((*combinator).into());
                    continue;
                }
                SelectorPart::Compound(compound) => compound,
            };

            let link = if nodes.is_empty() {
                None
            } else {
                Some(pending.take().unwrap_or(Combinator::Descendant))
            };
            let (nesting, matchers) = self.compile_compound(compound);

            match (&self.scope, nesting) {
                (Some(scope), true) => {
                    references_scope = true;
                    nodes.push(SelectorNode::new(
                        link,
                        vec![Matcher::Scope(Arc::clone(scope))],
                    ));
                    if !matchers.is_empty() {
                        nodes.push(SelectorNode::new(Some(Combinator::Nest), matchers));
                    }
                }
                (None, true) => {
                    self.errors.push(CompileError::NestingOutsideRule);
                    // A lone `&` must not turn into `*`.
                    let matchers = if matchers.is_empty() {
                        vec![Matcher::Never("&".into())]
                    } else {
                        matchers
                    };
                    nodes.push(SelectorNode::new(link, matchers));
                }
                (_, false) => nodes.push(SelectorNode::new(link, matchers)),
            }
        }

        if nodes.is_empty() {
            self.errors.push(CompileError::EmptySelector);
            return Selector::new(vec![SelectorNode::new(
                None,
                vec![Matcher::Never(String::new())],
            )]);
        }

        // A nested selector without `&` is a descendant of its parent rule.
        if let (Some(scope), false) = (&self.scope, references_scope) {
            nodes[0].combinator = Some(Combinator::Descendant);
            nodes.insert(
                0,
                SelectorNode::new(None, vec![Matcher::Scope(Arc::clone(scope))]),
            );
        }

        Selector::new(nodes)
    }

    /// Compile one compound. Returns whether it contained `&`, plus the
    /// remaining matchers.
    fn compile_compound(&mut self, compound: &CompoundSelector) -> (bool, Vec<Matcher>) {
        let mut nesting = false;
        let mut matchers = Vec::with_capacity(compound.components.len());

        for component in &compound.components {
            let matcher = match component {
                SelectorComponent::Universal => continue,
                SelectorComponent::Nesting => {
                    nesting = true;
                    continue;
                }
                SelectorComponent::Type(name) => Matcher::Tag(name.to_ascii_lowercase()),
                SelectorComponent::Class(name) => Matcher::Class(name.clone()),
                SelectorComponent::Id(name) => Matcher::Id(name.clone()),
                SelectorComponent::Attribute { name, op, value } => Matcher::Attribute {
                    name: name.clone(),
                    op: *op,
                    value: value.clone(),
                },
                SelectorComponent::PseudoClass(name) => match PseudoClass::from_name(name) {
                    Some(pseudo) => Matcher::PseudoClass(pseudo),
                    None => {
                        self.errors
                            .push(CompileError::UnknownPseudoClass(name.clone()));
                        Matcher::Never(format!(":{name}"))
                    }
                },
                SelectorComponent::PseudoElement(name) => match PseudoElement::from_name(name) {
                    Some(pseudo) => Matcher::PseudoElement(pseudo),
                    None => {
                        self.errors
                            .push(CompileError::UnknownPseudoElement(name.clone()));
                        Matcher::Never(format!("::{name}"))
                    }
                },
                SelectorComponent::PseudoFunction {
                    name,
                    index,
                    selectors,
                } => self.compile_function(name, *index, selectors.as_ref()),
            };
            matchers.push(matcher);
        }

        (nesting, matchers)
    }

    fn compile_function(
        &mut self,
        name: &str,
        index: Option<IndexExpr>,
        selectors: Option<&SelectorList>,
    ) -> Matcher {
        let function = name.to_ascii_lowercase();
        let never = || Matcher::Never(format!(":{function}()"));

        match function.as_str() {
            "is" | "not" => {
                let Some(list) = selectors else {
                    self.errors
                        .push(CompileError::MissingSelectorArgument(function.clone()));
                    return never();
                };
                let group = self.compile_group(list);
                if function == "is" {
                    Matcher::Is(group)
                } else {
                    Matcher::Not(group)
                }
            }
            "nth-child" | "nth-last-child" => {
                let Some(anb) = self.compile_index(&function, index) else {
                    return never();
                };
                let index = match selectors {
                    Some(list) => IndexSelector::Grouped(anb, self.compile_group(list)),
                    None => IndexSelector::Simple(anb),
                };
                Matcher::NthChild {
                    from_end: function == "nth-last-child",
                    index,
                }
            }
            "nth-of-type" | "nth-last-of-type" => {
                let Some(anb) = self.compile_index(&function, index) else {
                    return never();
                };
                if selectors.is_some() {
                    self.errors
                        .push(CompileError::OfSelectorNotAllowed(function.clone()));
                }
                Matcher::NthOfType {
                    from_end: function == "nth-last-of-type",
                    anb,
                }
            }
            _ => {
                self.errors
                    .push(CompileError::UnknownPseudoFunction(function.clone()));
                never()
            }
        }
    }

    /// Resolve the index argument. A pattern that can never match is reported
    /// but still returned.
    fn compile_index(&mut self, function: &str, index: Option<IndexExpr>) -> Option<AnB> {
        let anb = match index {
            Some(IndexExpr::AnB { a, b }) => AnB::new(a, b),
            Some(IndexExpr::Even) => AnB::EVEN,
            Some(IndexExpr::Odd) => AnB::ODD,
            None => {
                self.errors
                    .push(CompileError::MissingIndex(function.to_owned()));
                return None;
            }
        };
        if !anb.can_match() {
            self.errors.push(CompileError::InvalidIndex {
                function: function.to_owned(),
                anb,
            });
        }
        Some(anb)
    }
}

/// Compile a standalone selector list (no enclosing rule).
pub fn compile_group(list: &SelectorList) -> (SelectorGroup, CompileErrors) {
    let mut errors = CompileErrors::default();
    let group = CompileContext::new(&mut errors).compile_group(list);
    (group, errors)
}

/// Compile a standalone complex selector (no enclosing rule).
pub fn compile_selector(selector: &ComplexSelector) -> (Selector, CompileErrors) {
    let mut errors = CompileErrors::default();
    let compiled = CompileContext::new(&mut errors).compile_selector(selector);
    (compiled, errors)
}
