//! Reference hash table and nearest-neighbour lookup.
//!
//! The table keeps species keys and their hashes in parallel arrays sorted by
//! key. Lookups scan linearly and keep the first strict minimum, so when two
//! entries sit at the same distance the lexicographically smaller key wins
//! regardless of the order the payload listed them in.

pub mod build;
mod loader;

pub use loader::{TableLoader, TableSource, DEFAULT_TABLE_FILE};

use crate::hash::DHash;
use crate::util::{IconScanError, IconScanResult};
use std::collections::BTreeMap;

/// Closest reference entry for a query hash.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Nearest<'a> {
    /// Species key of the closest entry.
    pub key: &'a str,
    /// Position of the entry in table order.
    pub index: usize,
    /// Hamming distance between the query and the entry.
    pub distance: u32,
}

/// Immutable mapping from species key to reference hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReferenceTable {
    keys: Vec<String>,
    hashes: Vec<DHash>,
}

impl ReferenceTable {
    /// Builds a table from `(key, hash)` pairs.
    ///
    /// Duplicate keys keep the last hash supplied. Fails with
    /// [`IconScanError::EmptyTable`] when no entries are given.
    pub fn from_entries<I, K>(entries: I) -> IconScanResult<Self>
    where
        I: IntoIterator<Item = (K, DHash)>,
        K: Into<String>,
    {
        let sorted: BTreeMap<String, DHash> = entries
            .into_iter()
            .map(|(key, hash)| (key.into(), hash))
            .collect();
        if sorted.is_empty() {
            return Err(IconScanError::EmptyTable);
        }
        let (keys, hashes) = sorted.into_iter().unzip();
        Ok(Self { keys, hashes })
    }

    /// Parses a JSON object mapping species keys to hex-encoded hashes.
    pub fn from_json_str(text: &str) -> IconScanResult<Self> {
        let raw: BTreeMap<String, String> =
            serde_json::from_str(text).map_err(|err| IconScanError::MalformedTable {
                reason: err.to_string(),
            })?;
        let mut entries = Vec::with_capacity(raw.len());
        for (key, value) in raw {
            let hash = DHash::from_hex(&value).ok_or_else(|| IconScanError::MalformedHash {
                key: key.clone(),
                value: value.clone(),
            })?;
            entries.push((key, hash));
        }
        Self::from_entries(entries)
    }

    /// Serializes the table as a pretty-printed JSON object with sorted keys.
    pub fn to_json_string(&self) -> IconScanResult<String> {
        let map: BTreeMap<&str, String> = self.iter().map(|(key, hash)| (key, hash.to_hex())).collect();
        serde_json::to_string_pretty(&map).map_err(|err| IconScanError::MalformedTable {
            reason: err.to_string(),
        })
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true when the table has no entries (never true once constructed).
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns species keys in table order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Returns hashes in table order, parallel to [`Self::keys`].
    pub fn hashes(&self) -> &[DHash] {
        &self.hashes
    }

    /// Returns the key at `index`.
    pub fn key(&self, index: usize) -> Option<&str> {
        self.keys.get(index).map(String::as_str)
    }

    /// Looks up the hash stored for `key`.
    pub fn get(&self, key: &str) -> Option<DHash> {
        self.keys
            .binary_search_by(|probe| probe.as_str().cmp(key))
            .ok()
            .map(|idx| self.hashes[idx])
    }

    /// Iterates `(key, hash)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, DHash)> + '_ {
        self.keys
            .iter()
            .map(String::as_str)
            .zip(self.hashes.iter().copied())
    }

    /// Finds the entry with the smallest Hamming distance to `query`.
    ///
    /// Stops early on an exact match.
    pub fn nearest(&self, query: DHash) -> Nearest<'_> {
        let mut best_idx = 0usize;
        let mut best_dist = u32::MAX;
        for (idx, hash) in self.hashes.iter().enumerate() {
            let dist = query.distance(*hash);
            if dist < best_dist {
                best_dist = dist;
                best_idx = idx;
                if dist == 0 {
                    break;
                }
            }
        }
        Nearest {
            key: &self.keys[best_idx],
            index: best_idx,
            distance: best_dist,
        }
    }
}
