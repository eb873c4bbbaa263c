//! Ordered append log with upsert-by-key
//!
//! Dimension and fact tables keep insertion order. Writing a record whose key
//! already exists removes the earlier record and appends the new one, which is
//! "keep last" deduplication made explicit.

use std::collections::HashMap;
use std::hash::Hash;

/// Records with a natural key
pub trait Keyed {
    type Key: Eq + Hash + Clone;

    fn key(&self) -> Self::Key;
}

impl Keyed for crate::model::Player {
    type Key = String;

    fn key(&self) -> String {
        self.player_id.clone()
    }
}

impl Keyed for crate::model::ContractComponent {
    type Key = String;

    fn key(&self) -> String {
        self.contract_id.clone()
    }
}

/// Append log where the last write for a key wins
#[derive(Debug, Clone)]
pub struct UpsertLog<T: Keyed> {
    slots: Vec<Option<T>>,
    index: HashMap<T::Key, usize>,
}

impl<T: Keyed> Default for UpsertLog<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Keyed> UpsertLog<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a log from records in order, applying keep-last semantics
    pub fn from_records(records: impl IntoIterator<Item = T>) -> Self {
        let mut log = Self::new();
        for record in records {
            log.upsert(record);
        }
        log
    }

    /// Insert or replace by key. Returns the replaced record, if any.
    pub fn upsert(&mut self, record: T) -> Option<T> {
        let key = record.key();
        let previous = self
            .index
            .get(&key)
            .and_then(|&slot| self.slots[slot].take());

        self.index.insert(key, self.slots.len());
        self.slots.push(Some(record));
        previous
    }

    pub fn get(&self, key: &T::Key) -> Option<&T> {
        self.index
            .get(key)
            .and_then(|&slot| self.slots[slot].as_ref())
    }

    pub fn contains_key(&self, key: &T::Key) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Live records in log order
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    /// Consume the log into live records in log order
    pub fn into_records(self) -> Vec<T> {
        self.slots.into_iter().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Player;
    use pretty_assertions::assert_eq;

    #[test]
    fn last_write_wins_and_moves_to_end() {
        let mut log = UpsertLog::new();
        log.upsert(Player::new("a", "Alpha", "QB"));
        log.upsert(Player::new("b", "Bravo", "WR"));
        let replaced = log.upsert(Player::new("a", "Alpha Prime", "QB"));

        assert_eq!(replaced.map(|p| p.player_name), Some("Alpha".to_string()));
        assert_eq!(log.len(), 2);

        let names: Vec<_> = log.iter().map(|p| p.player_name.clone()).collect();
        assert_eq!(names, vec!["Bravo".to_string(), "Alpha Prime".to_string()]);
    }

    #[test]
    fn from_records_dedupes() {
        let log = UpsertLog::from_records(vec![
            Player::new("x", "One", "K"),
            Player::new("x", "Two", "K"),
            Player::new("x", "Three", "K"),
        ]);

        assert_eq!(log.len(), 1);
        assert_eq!(log.get(&"x".to_string()).map(|p| p.player_name.as_str()), Some("Three"));
        assert_eq!(log.into_records().len(), 1);
    }
}
