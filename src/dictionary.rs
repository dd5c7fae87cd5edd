//! Streaming key dictionary (field name → compact id).
//!
//! Ids are assigned on first sight, starting at 1, in encounter order. An id
//! is never reused or renumbered, so the same input sequence always yields the
//! same assignment.
//!
//! Lifecycle: one dictionary per encoding session. It grows monotonically
//! while records are processed and is serialized once at end-of-stream.
//! Not synchronized: only the single sequential encoding path may touch it.

use log::debug;

use crate::{Error, FastIndexMap, Result};

/// Dictionary id. The 16-bit range bounds the number of distinct keys.
pub type KeyId = u16;

/// First id handed out.
pub const FIRST_KEY_ID: KeyId = 1;

/// Field-name dictionary with insertion-ordered iteration.
#[derive(Debug, Clone, Default)]
pub struct KeyDictionary {
    /// Index i haelt den Key mit id i+1.
    entries: FastIndexMap<String, KeyId>,
}

impl KeyDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id of `key`, assigning the next sequential id if the key is new.
    ///
    /// Fails with `DictionaryFull` once all 65535 ids are taken.
    pub fn resolve(&mut self, key: &str) -> Result<KeyId> {
        if let Some(&id) = self.entries.get(key) {
            return Ok(id);
        }
        let next = self.entries.len() + usize::from(FIRST_KEY_ID);
        let id = KeyId::try_from(next).map_err(|_| Error::DictionaryFull)?;
        debug!("dictionary: new key {key:?} -> {id}");
        self.entries.insert(key.to_owned(), id);
        Ok(id)
    }

    /// Lookup without assignment.
    #[inline]
    pub fn get(&self, key: &str) -> Option<KeyId> {
        self.entries.get(key).copied()
    }

    /// Reverse lookup: key for a given id.
    pub fn key(&self, id: KeyId) -> Option<&str> {
        let index = usize::from(id).checked_sub(usize::from(FIRST_KEY_ID))?;
        self.entries.get_index(index).map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All mappings in first-assigned order. Does not mutate; calling it twice
    /// without an intervening `resolve` returns the same sequence.
    pub fn flush(&self) -> Vec<(&str, KeyId)> {
        self.iter().collect()
    }

    /// Iterates mappings in first-assigned order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, KeyId)> + '_ {
        self.entries.iter().map(|(k, &id)| (k.as_str(), id))
    }

    /// Rebuilds a dictionary from a decoded trailing block.
    ///
    /// Entries must carry the ids 1, 2, 3, … in order and every key must be distinct.
    pub fn from_entries<I, K>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, KeyId)>,
        K: Into<String>,
    {
        let mut dict = Self::new();
        for (key, id) in entries {
            let key = key.into();
            let expected = dict.entries.len() + usize::from(FIRST_KEY_ID);
            if usize::from(id) != expected {
                return Err(Error::InvalidDictionary(format!(
                    "key {key:?} has id {id}, expected {expected}"
                )));
            }
            if dict.entries.contains_key(&key) {
                return Err(Error::InvalidDictionary(format!("duplicate key {key:?}")));
            }
            dict.entries.insert(key, id);
        }
        Ok(dict)
    }
}
