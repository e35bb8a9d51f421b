//! PropertySet: a sparse, `!important`-aware map from property to value.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::mem;

use crate::css::property::{PropertyId, PropertyType, PropertyValue, RectProperty, Property};
use crate::css::scalar::ScalarBox;
use crate::css::value::{Value, ValueKind};

/// A sparse set of declared or resolved property values.
///
/// Keys are ordered by [`PropertyId`], so iteration order is the registry
/// order and is stable across runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertySet {
    values: BTreeMap<PropertyId, Value<PropertyValue>>,
}

impl PropertySet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of properties present.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Remove every property.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Whether a value is present for `id`.
    pub fn has(&self, id: PropertyId) -> bool {
        self.values.contains_key(&id)
    }

    /// Whether a value is present for a typed property.
    pub fn contains<T: PropertyType + Copy>(&self, property: &Property<T>) -> bool {
        self.has(property.id())
    }

    /// The type-erased value for `id`.
    pub fn value(&self, id: PropertyId) -> Option<&Value<PropertyValue>> {
        self.values.get(&id)
    }

    /// The typed value for `property`.
    pub fn get<T: PropertyType + Copy>(&self, property: &Property<T>) -> Option<Value<T>> {
        self.values
            .get(&property.id())
            .cloned()
            .and_then(|value| value.try_map(|raw| T::from_value(&raw)))
    }

    /// The explicit payload for `property`, ignoring keyword values.
    pub fn explicit<T: PropertyType + Copy>(&self, property: &Property<T>) -> Option<T> {
        self.values
            .get(&property.id())
            .and_then(Value::explicit_value)
            .and_then(T::from_value)
    }

    /// Set a typed value, replacing whatever was there.
    pub fn set<T: PropertyType + Copy>(&mut self, property: &Property<T>, value: Value<T>) {
        self.values
            .insert(property.id(), value.map(PropertyType::into_value));
    }

    /// Set a type-erased value.
    ///
    /// Returns `false` (and leaves the set untouched) when an explicit payload
    /// does not have the property's declared type.
    pub fn set_value(&mut self, id: PropertyId, value: Value<PropertyValue>) -> bool {
        if let ValueKind::Explicit(raw) = value.kind() {
            let expected = &id.info().default;
            if mem::discriminant(raw) != mem::discriminant(expected) {
                tracing::warn!(
                    property = id.key(),
                    value = %raw,
                    "value type does not match property type"
                );
                return false;
            }
        }
        self.values.insert(id, value);
        true
    }

    /// Set all four longhands of a rectangle shorthand.
    pub fn set_rect(&mut self, rect: &RectProperty, value: Value<ScalarBox>) {
        self.set(&rect.top, value.clone().map(|b| b.top));
        self.set(&rect.right, value.clone().map(|b| b.right));
        self.set(&rect.bottom, value.clone().map(|b| b.bottom));
        self.set(&rect.left, value.map(|b| b.left));
    }

    /// Remove a value, returning it.
    pub fn remove(&mut self, id: PropertyId) -> Option<Value<PropertyValue>> {
        self.values.remove(&id)
    }

    /// Iterate `(id, value)` pairs in registry order.
    pub fn iter(&self) -> impl Iterator<Item = (PropertyId, &Value<PropertyValue>)> {
        self.values.iter().map(|(id, value)| (*id, value))
    }

    /// Important-aware insert.
    ///
    /// The new value replaces an existing one unless the existing value is
    /// `!important` and the new one is not. Returns whether the set changed
    /// hands for this property.
    pub fn try_set(&mut self, id: PropertyId, value: Value<PropertyValue>) -> bool {
        if let Some(existing) = self.values.get(&id) {
            if existing.is_important() && !value.is_important() {
                return false;
            }
        }
        self.set_value(id, value)
    }

    /// Merge every value of `source` into this set with [`PropertySet::try_set`].
    pub fn merge_from(&mut self, source: &PropertySet) {
        for (id, value) in source.iter() {
            self.try_set(id, value.clone());
        }
    }

    /// Ids whose value differs between `self` and `other`, including ids
    /// present in only one of them.
    pub fn diff(&self, other: &PropertySet) -> Vec<PropertyId> {
        let mut changed: Vec<PropertyId> = self
            .values
            .iter()
            .filter(|(id, value)| other.values.get(id) != Some(*value))
            .map(|(id, _)| *id)
            .collect();

        changed.extend(
            other
                .values
                .keys()
                .filter(|id| !self.values.contains_key(id))
                .copied(),
        );
        changed.sort_unstable();
        changed
    }

    /// Replace the contents with `other`'s and return how many properties
    /// changed value (added, removed or different).
    pub fn set_all(&mut self, other: &PropertySet) -> usize {
        let changes = self.diff(other).len();
        if changes != 0 {
            self.values.clone_from(&other.values);
        }
        changes
    }

    /// Render as inline declarations: `color: #ff0000; bold: true !important`.
    pub fn to_inline_string(&self) -> String {
        let mut out = String::new();
        for (i, (id, value)) in self.iter().enumerate() {
            if i > 0 {
                out.push_str("; ");
            }
            // Writing into a String cannot fail.
            let _ = write!(out, "{}: {}", id.key(), value);
        }
        out
    }
}

impl<'a> IntoIterator for &'a PropertySet {
    type Item = (&'a PropertyId, &'a Value<PropertyValue>);
    type IntoIter = std::collections::btree_map::Iter<'a, PropertyId, Value<PropertyValue>>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::property::{self, BOLD, MARGIN, MARGIN_LEFT, MARGIN_TOP, TEXT_COLOR, Z_INDEX};
    use crate::css::scalar::Scalar;
    use crate::css::value::Color;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_set_and_get_typed() {
        let mut set = PropertySet::new();
        set.set(&TEXT_COLOR, Value::explicit(Color::RED));
        assert!(set.contains(&TEXT_COLOR));
        assert_eq!(set.get(&TEXT_COLOR), Some(Value::explicit(Color::RED)));
        assert_eq!(set.explicit(&TEXT_COLOR), Some(Color::RED));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_explicit_ignores_keywords() {
        let mut set = PropertySet::new();
        set.set(&Z_INDEX, Value::inherit());
        assert_eq!(set.explicit(&Z_INDEX), None);
        assert_eq!(set.get(&Z_INDEX), Some(Value::inherit()));
    }

    #[test]
    fn test_set_value_rejects_wrong_type() {
        let mut set = PropertySet::new();
        let accepted = set.set_value(TEXT_COLOR.id(), Value::explicit(PropertyValue::Bool(true)));
        assert!(!accepted);
        assert!(set.is_empty());

        assert!(set.set_value(TEXT_COLOR.id(), Value::inherit()));
    }

    #[test]
    fn test_try_set_later_normal_value_wins() {
        let mut set = PropertySet::new();
        set.try_set(TEXT_COLOR.id(), Value::explicit(Color::RED.into_value()));
        set.try_set(TEXT_COLOR.id(), Value::explicit(Color::BLUE.into_value()));
        assert_eq!(set.explicit(&TEXT_COLOR), Some(Color::BLUE));
    }

    #[test]
    fn test_try_set_normal_loses_to_important() {
        let mut set = PropertySet::new();
        set.try_set(TEXT_COLOR.id(), Value::explicit(Color::RED.into_value()).important());
        let changed = set.try_set(TEXT_COLOR.id(), Value::explicit(Color::BLUE.into_value()));
        assert!(!changed);
        assert_eq!(set.explicit(&TEXT_COLOR), Some(Color::RED));
    }

    #[test]
    fn test_try_set_important_beats_important() {
        let mut set = PropertySet::new();
        set.try_set(TEXT_COLOR.id(), Value::explicit(Color::RED.into_value()).important());
        set.try_set(TEXT_COLOR.id(), Value::explicit(Color::BLUE.into_value()).important());
        assert_eq!(set.explicit(&TEXT_COLOR), Some(Color::BLUE));
    }

    #[test]
    fn test_diff_and_set_all() {
        let mut old = PropertySet::new();
        old.set(&TEXT_COLOR, Value::explicit(Color::RED));
        old.set(&BOLD, Value::explicit(true));

        let mut new = PropertySet::new();
        new.set(&TEXT_COLOR, Value::explicit(Color::RED));
        new.set(&BOLD, Value::explicit(false));
        new.set(&Z_INDEX, Value::explicit(3));

        assert_eq!(old.diff(&new), vec![BOLD.id(), Z_INDEX.id()]);
        assert_eq!(old.set_all(&new), 2);
        assert_eq!(old, new);
        assert_eq!(old.set_all(&new), 0);
    }

    #[test]
    fn test_set_all_counts_removals() {
        let mut old = PropertySet::new();
        old.set(&TEXT_COLOR, Value::explicit(Color::RED));
        assert_eq!(old.set_all(&PropertySet::new()), 1);
        assert!(old.is_empty());
    }

    #[test]
    fn test_importance_change_counts_as_change() {
        let mut a = PropertySet::new();
        a.set(&BOLD, Value::explicit(true));
        let mut b = PropertySet::new();
        b.set(&BOLD, Value::explicit(true).important());
        assert_eq!(a.diff(&b), vec![BOLD.id()]);
    }

    #[test]
    fn test_set_rect_expands_longhands() {
        let mut set = PropertySet::new();
        set.set_rect(
            &MARGIN,
            Value::explicit(ScalarBox::symmetric(Scalar::px(1.0), Scalar::px(2.0))).important(),
        );
        assert_eq!(set.len(), 4);
        assert_eq!(set.explicit(&MARGIN_TOP), Some(Scalar::px(1.0)));
        assert_eq!(set.explicit(&MARGIN_LEFT), Some(Scalar::px(2.0)));
        assert!(set.get(&MARGIN_LEFT).is_some_and(|v| v.is_important()));
    }

    #[test]
    fn test_iteration_follows_registry_order() {
        let mut set = PropertySet::new();
        set.set(&Z_INDEX, Value::explicit(1));
        set.set(&TEXT_COLOR, Value::explicit(Color::WHITE));
        let keys: Vec<_> = set.iter().map(|(id, _)| id.key()).collect();
        assert_eq!(keys, vec!["color", "z-index"]);
        assert!(property::by_key("z-index").is_some());
    }

    #[test]
    fn test_to_inline_string() {
        let mut set = PropertySet::new();
        set.set(&TEXT_COLOR, Value::explicit(Color::RED));
        set.set(&BOLD, Value::explicit(true).important());
        set.set(&Z_INDEX, Value::inherit());
        insta::assert_snapshot!(
            set.to_inline_string(),
            @"color: #ff0000; bold: true !important; z-index: inherit"
        );
    }
}
