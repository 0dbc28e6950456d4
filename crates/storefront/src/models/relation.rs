//! Eager-loaded relation slots.
//!
//! A relation that the store was never asked to load is `NotLoaded`, which is
//! distinct from a loaded relation that happens to be empty (`Loaded(vec![])`)
//! or absent (`Loaded(None)`).

use serde::{Deserialize, Deserializer};

/// A relation field on a catalog entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relation<T> {
    /// The fetch spec did not include this relation.
    NotLoaded,
    /// The relation was eager-loaded with the lookup.
    Loaded(T),
}

impl<T> Relation<T> {
    /// Whether the relation was eager-loaded.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    /// Borrow the loaded value, if any.
    #[must_use]
    pub const fn get(&self) -> Option<&T> {
        match self {
            Self::Loaded(value) => Some(value),
            Self::NotLoaded => None,
        }
    }

    /// Mutably borrow the loaded value, if any.
    pub fn get_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Loaded(value) => Some(value),
            Self::NotLoaded => None,
        }
    }
}

// Manual impl so `T` does not need to be `Default`.
impl<T> Default for Relation<T> {
    fn default() -> Self {
        Self::NotLoaded
    }
}

impl<T> From<T> for Relation<T> {
    fn from(value: T) -> Self {
        Self::Loaded(value)
    }
}

/// A present key always means the relation was loaded; pair with
/// `#[serde(default)]` so a missing key becomes `NotLoaded`.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for Relation<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Self::Loaded)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(default)]
        many: Relation<Vec<i32>>,
        #[serde(default)]
        one: Relation<Option<i32>>,
    }

    #[test]
    fn test_missing_key_is_not_loaded() {
        let holder: Holder = serde_json::from_str("{}").unwrap();
        assert_eq!(holder.many, Relation::NotLoaded);
        assert_eq!(holder.one, Relation::NotLoaded);
    }

    #[test]
    fn test_empty_and_null_are_loaded() {
        let holder: Holder = serde_json::from_str(r#"{"many": [], "one": null}"#).unwrap();
        assert_eq!(holder.many, Relation::Loaded(vec![]));
        assert_eq!(holder.one, Relation::Loaded(None));
        assert!(holder.many.is_loaded());
    }

    #[test]
    fn test_get() {
        let mut relation = Relation::from(vec![1, 2]);
        relation.get_mut().unwrap().push(3);
        assert_eq!(relation.get(), Some(&vec![1, 2, 3]));
        assert_eq!(Relation::<Vec<i32>>::default().get(), None);
    }
}
