//! Datatype label/code decoding.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::DtypeCode;

/// Bidirectional map between datatype labels and their integer codes.
///
/// Both labels and codes are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatatypeMap {
    by_label: BTreeMap<String, DtypeCode>,
    by_code: BTreeMap<DtypeCode, String>,
}

impl DatatypeMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a label/code pair.
    ///
    /// Returns `false` and leaves the map untouched if either the label or
    /// the code is already taken.
    pub fn insert(&mut self, label: impl Into<String>, code: DtypeCode) -> bool {
        let label = label.into();
        if self.by_label.contains_key(&label) || self.by_code.contains_key(&code) {
            return false;
        }
        self.by_code.insert(code, label.clone());
        self.by_label.insert(label, code);
        true
    }

    /// Code for a label.
    #[must_use]
    pub fn code(&self, label: &str) -> Option<DtypeCode> {
        self.by_label.get(label).copied()
    }

    /// Label for a code.
    #[must_use]
    pub fn label(&self, code: DtypeCode) -> Option<&str> {
        self.by_code.get(&code).map(String::as_str)
    }

    /// Whether a code is still free.
    #[must_use]
    pub fn is_code_available(&self, code: DtypeCode) -> bool {
        !self.by_code.contains_key(&code)
    }

    /// Remove a label, returning its code.
    pub fn remove(&mut self, label: &str) -> Option<DtypeCode> {
        let code = self.by_label.remove(label)?;
        self.by_code.remove(&code);
        Some(code)
    }

    /// Number of datatypes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_label.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_label.is_empty()
    }

    /// Iterate over `(label, code)` pairs in label order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, DtypeCode)> {
        self.by_label.iter().map(|(l, c)| (l.as_str(), *c))
    }
}
