//! Symptom tokens and insertion-ordered symptom sets

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// An opaque symptom identifier from a fixed vocabulary
///
/// Equality is exact token match; no normalization is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symptom(String);

impl Symptom {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human-readable label (`"high_fever"` -> `"high fever"`)
    pub fn label(&self) -> String {
        self.0.replace('_', " ")
    }
}

impl fmt::Display for Symptom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symptom {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symptom {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A deduplicated set of symptoms that remembers insertion order
///
/// Order is irrelevant for classification but preserved for display and
/// history.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct SymptomSet {
    items: Vec<Symptom>,
}

impl SymptomSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a symptom, returning `false` if it was already present
    pub fn insert(&mut self, symptom: Symptom) -> bool {
        if self.contains(&symptom) {
            return false;
        }
        self.items.push(symptom);
        true
    }

    pub fn contains(&self, symptom: &Symptom) -> bool {
        self.items.iter().any(|s| s == symptom)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symptom> {
        self.items.iter()
    }

    /// True if every member of `other` is in `self`
    pub fn is_superset(&self, other: &SymptomSet) -> bool {
        other.iter().all(|s| self.contains(s))
    }

    /// Members of `self` that are not in `other`, in insertion order
    pub fn difference(&self, other: &SymptomSet) -> SymptomSet {
        self.iter().filter(|s| !other.contains(s)).cloned().collect()
    }

    pub fn as_slice(&self) -> &[Symptom] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<Symptom> {
        self.items
    }
}

impl PartialEq for SymptomSet {
    /// Set equality: insertion order does not matter
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.is_superset(other)
    }
}

impl Eq for SymptomSet {}

impl FromIterator<Symptom> for SymptomSet {
    fn from_iter<I: IntoIterator<Item = Symptom>>(iter: I) -> Self {
        let mut set = SymptomSet::new();
        for symptom in iter {
            set.insert(symptom);
        }
        set
    }
}

impl<'a> FromIterator<&'a str> for SymptomSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(Symptom::from).collect()
    }
}

impl IntoIterator for SymptomSet {
    type Item = Symptom;
    type IntoIter = std::vec::IntoIter<Symptom>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a SymptomSet {
    type Item = &'a Symptom;
    type IntoIter = std::slice::Iter<'a, Symptom>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<'de> Deserialize<'de> for SymptomSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = Vec::<Symptom>::deserialize(deserializer)?;
        Ok(items.into_iter().collect())
    }
}

/// The fixed vocabulary of symptoms a classifier understands
#[derive(Debug, Clone, Default)]
pub struct SymptomVocabulary {
    known: HashSet<Symptom>,
    ordered: Vec<Symptom>,
}

impl SymptomVocabulary {
    pub fn new(symptoms: impl IntoIterator<Item = Symptom>) -> Self {
        let mut known = HashSet::new();
        let mut ordered = Vec::new();
        for symptom in symptoms {
            if known.insert(symptom.clone()) {
                ordered.push(symptom);
            }
        }
        Self { known, ordered }
    }

    pub fn contains(&self, symptom: &Symptom) -> bool {
        self.known.contains(symptom)
    }

    pub fn symptoms(&self) -> &[Symptom] {
        &self.ordered
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Keep only known tokens, preserving submission order
    ///
    /// Unknown tokens are dropped and logged.
    pub fn filter<I, S>(&self, submitted: I) -> SymptomSet
    where
        I: IntoIterator<Item = S>,
        S: Into<Symptom>,
    {
        submitted
            .into_iter()
            .map(Into::into)
            .filter(|symptom| {
                let known = self.contains(symptom);
                if !known {
                    tracing::warn!(symptom = %symptom, "Dropping symptom not in vocabulary");
                }
                known
            })
            .collect()
    }
}
