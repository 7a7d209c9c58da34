//! Field bindings captured while matching, and their unification.
//!
//! Bindings are persistent: every operation that adds values returns a new
//! `Bindings` and leaves its inputs untouched, so an abandoned candidate never
//! needs to be rolled back.

use std::collections::BTreeMap;

use baf_data::Fields;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings(BTreeMap<String, String>);

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Bind `name` to `value`, or `None` if it is already bound to something else.
    pub fn bind(&self, name: &str, value: &str) -> Option<Bindings> {
        match self.get(name) {
            Some(existing) if existing != value => None,
            Some(_) => Some(self.clone()),
            None => {
                let mut next = self.clone();
                next.0.insert(name.to_string(), value.to_string());
                Some(next)
            },
        }
    }

    /// Merge two binding sets, or `None` if any name carries two different values.
    pub fn unify(&self, other: &Bindings) -> Option<Bindings> {
        let conflict = other
            .iter()
            .any(|(name, value)| self.get(name).is_some_and(|existing| existing != value));
        if conflict {
            return None;
        }
        let mut merged = self.0.clone();
        merged.extend(other.0.iter().map(|(k, v)| (k.clone(), v.clone())));
        Some(Bindings(merged))
    }

    /// Layer `fields` over these bindings; values from `fields` win.
    pub fn overlay(&self, fields: &Bindings) -> Bindings {
        let mut merged = self.0.clone();
        merged.extend(fields.0.iter().map(|(k, v)| (k.clone(), v.clone())));
        Bindings(merged)
    }

    pub fn into_fields(self) -> Fields {
        self.0
    }
}

impl From<Fields> for Bindings {
    fn from(fields: Fields) -> Self {
        Bindings(fields)
    }
}

impl From<&Fields> for Bindings {
    fn from(fields: &Fields) -> Self {
        Bindings(fields.clone())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Bindings(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_accepts_same_value_and_rejects_different_value() {
        let b = Bindings::new().bind("X", "1").unwrap();
        assert_eq!(b.bind("X", "1"), Some(b.clone()));
        assert_eq!(b.bind("X", "2"), None);
        assert_eq!(b.get("X"), Some("1"));
    }

    #[test]
    fn unify_merges_disjoint_and_agreeing_sets() {
        let left: Bindings = [("X", "1"), ("Y", "2")].into_iter().collect();
        let right: Bindings = [("Y", "2"), ("Z", "3")].into_iter().collect();
        let merged = left.unify(&right).expect("no conflict");
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.get("Z"), Some("3"));
        // inputs untouched
        assert_eq!(left.len(), 2);
        assert_eq!(right.len(), 2);
    }

    #[test]
    fn unify_rejects_conflicting_values() {
        let left: Bindings = [("X", "1")].into_iter().collect();
        let right: Bindings = [("X", "2")].into_iter().collect();
        assert!(left.unify(&right).is_none());
    }

    #[test]
    fn overlay_prefers_the_overlaid_values() {
        let base: Bindings = [("X", "1"), ("Y", "2")].into_iter().collect();
        let top: Bindings = [("X", "9")].into_iter().collect();
        let merged = base.overlay(&top);
        assert_eq!(merged.get("X"), Some("9"));
        assert_eq!(merged.get("Y"), Some("2"));
    }
}
