use std::collections::HashMap;

/// Partial bijection from old class fullnames to new class fullnames
///
/// The forward and backward tables are kept mutually inverse: every insert
/// records both directions. One of these is built fresh per diff pass and
/// superseded wholesale by the next pass; once returned it is never mutated
/// again.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenameMapping {
    forward: HashMap<String, String>,
    backward: HashMap<String, String>,
}

impl RenameMapping {
    pub fn new() -> RenameMapping {
        RenameMapping::default()
    }

    /// Rebuild a mapping from its persisted forward table
    pub fn from_forward(forward: HashMap<String, String>) -> RenameMapping {
        let backward = forward
            .iter()
            .map(|(old, new)| (new.clone(), old.clone()))
            .collect();
        RenameMapping { forward, backward }
    }

    /// Record `old` renaming to `new` in both directions
    ///
    /// Either name may already be present from an earlier insert; the stale
    /// partner entries are unlinked so the two tables stay mutual inverses.
    pub fn insert(&mut self, old: String, new: String) {
        if let Some(previous_new) = self.forward.remove(&old) {
            self.backward.remove(&previous_new);
        }
        if let Some(previous_old) = self.backward.remove(&new) {
            self.forward.remove(&previous_old);
        }
        self.backward.insert(new.clone(), old.clone());
        self.forward.insert(old, new);
    }

    /// New name of an old class, if matched
    pub fn get(&self, old: &str) -> Option<&str> {
        self.forward.get(old).map(String::as_str)
    }

    /// Old name of a new class, if matched
    pub fn get_reverse(&self, new: &str) -> Option<&str> {
        self.backward.get(new).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// The old name to new name table
    pub fn forward(&self) -> &HashMap<String, String> {
        &self.forward
    }

    /// The new name to old name table
    pub fn backward(&self) -> &HashMap<String, String> {
        &self.backward
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn forward_and_backward_are_mutual_inverses() {
        let mut mapping = RenameMapping::new();
        mapping.insert("a".to_owned(), "x".to_owned());
        mapping.insert("b".to_owned(), "y".to_owned());

        for (old, new) in mapping.forward() {
            assert_eq!(mapping.get_reverse(new), Some(old.as_str()));
        }
        for (new, old) in mapping.backward() {
            assert_eq!(mapping.get(old), Some(new.as_str()));
        }
    }

    #[test]
    fn colliding_inserts_unlink_the_stale_entries() {
        let mut mapping = RenameMapping::new();
        mapping.insert("a".to_owned(), "x".to_owned());
        mapping.insert("b".to_owned(), "x".to_owned());

        // "a" lost its partner; "x" now pairs with "b" in both directions
        assert_eq!(mapping.get("a"), None);
        assert_eq!(mapping.get("b"), Some("x"));
        assert_eq!(mapping.get_reverse("x"), Some("b"));
        assert_eq!(mapping.len(), 1);

        mapping.insert("b".to_owned(), "y".to_owned());
        assert_eq!(mapping.get("b"), Some("y"));
        assert_eq!(mapping.get_reverse("x"), None);
        assert_eq!(mapping.get_reverse("y"), Some("b"));
        assert_eq!(mapping.len(), 1);
    }

    #[test]
    fn from_forward_rebuilds_the_backward_table() {
        let forward: HashMap<String, String> =
            [("a".to_owned(), "x".to_owned())].into_iter().collect();
        let mapping = RenameMapping::from_forward(forward);
        assert_eq!(mapping.get_reverse("x"), Some("a"));
        assert_eq!(mapping.len(), 1);
    }
}
