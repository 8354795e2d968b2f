//! Mood label taxonomy
//!
//! The taxonomy is the closed, configured set of mood labels the pipeline
//! operates over. Declaration order is significant: it is the priority order
//! used by the text heuristic and by vote resolution. Any value outside the
//! set is rewritten to the designated default label before it can reach a
//! caller.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One value from the closed, configured set of emotion categories.
///
/// Labels are stored lower-cased and trimmed so that `"Happy "` and
/// `"happy"` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoodLabel(String);

impl MoodLabel {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MoodLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MoodLabel {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Closed set of mood labels with a designated default and per-label
/// synonym sets.
///
/// Immutable after construction; shared read-only across the pipeline.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    /// Labels in priority order (used for heuristic scans and tie-breaks)
    labels: Vec<MoodLabel>,
    /// Default label returned on ambiguity; always a member of `labels`
    default: MoodLabel,
    /// Keyword synonyms per label (e.g. "mad" for angry)
    synonyms: HashMap<MoodLabel, Vec<String>>,
}

impl Taxonomy {
    /// Build a validated taxonomy.
    ///
    /// # Errors
    /// Returns `Error::Config` if the label list is empty, contains
    /// duplicates, the default is not a member, or a synonym set is keyed
    /// to a label outside the set.
    pub fn new(
        labels: &[&str],
        default: &str,
        synonyms: HashMap<String, Vec<String>>,
    ) -> Result<Self> {
        if labels.is_empty() {
            return Err(Error::Config("taxonomy must have at least one label".to_string()));
        }

        let labels: Vec<MoodLabel> = labels.iter().map(|l| MoodLabel::new(l)).collect();
        for (i, label) in labels.iter().enumerate() {
            if label.as_str().is_empty() {
                return Err(Error::Config("taxonomy labels must be non-empty".to_string()));
            }
            if labels[..i].contains(label) {
                return Err(Error::Config(format!("duplicate taxonomy label: {}", label)));
            }
        }

        let default = MoodLabel::new(default);
        if !labels.contains(&default) {
            return Err(Error::Config(format!(
                "default label '{}' is not in the taxonomy",
                default
            )));
        }

        let mut canonical_synonyms = HashMap::new();
        for (key, words) in synonyms {
            let key = MoodLabel::new(&key);
            if !labels.contains(&key) {
                return Err(Error::Config(format!(
                    "synonym set keyed to unknown label: {}",
                    key
                )));
            }
            let words = words.iter().map(|w| w.trim().to_lowercase()).collect();
            canonical_synonyms.insert(key, words);
        }

        Ok(Self {
            labels,
            default,
            synonyms: canonical_synonyms,
        })
    }

    /// The 4-label taxonomy: happy, sad, angry, neutral (default neutral).
    pub fn basic() -> Self {
        let labels = ["happy", "sad", "angry", "neutral"];
        Self::new(&labels, "neutral", synonyms_for_labels(&labels))
            .expect("built-in taxonomy is valid")
    }

    /// The 6-label taxonomy: happy, sad, angry, neutral, excited, stressed.
    pub fn extended() -> Self {
        let labels = ["happy", "sad", "angry", "neutral", "excited", "stressed"];
        Self::new(&labels, "neutral", synonyms_for_labels(&labels))
            .expect("built-in taxonomy is valid")
    }

    /// Labels in priority order.
    pub fn labels(&self) -> &[MoodLabel] {
        &self.labels
    }

    pub fn default_label(&self) -> &MoodLabel {
        &self.default
    }

    pub fn contains(&self, label: &MoodLabel) -> bool {
        self.labels.contains(label)
    }

    /// Rewrite a raw value into a taxonomy member.
    ///
    /// Lower-cases and trims; any value not in the set becomes the default.
    pub fn canonicalize(&self, raw: &str) -> MoodLabel {
        let label = MoodLabel::new(raw);
        if self.contains(&label) {
            label
        } else {
            self.default.clone()
        }
    }

    /// Synonym keywords for a label (empty slice when none configured).
    pub fn synonyms_for(&self, label: &MoodLabel) -> &[String] {
        self.synonyms
            .get(label)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// True when `text` (already lower-cased) mentions the label by name or
    /// by one of its synonyms.
    pub fn mentions(&self, text: &str, label: &MoodLabel) -> bool {
        if text.contains(label.as_str()) {
            return true;
        }
        self.synonyms_for(label).iter().any(|w| text.contains(w.as_str()))
    }
}

/// Built-in synonym sets, taken from the keyword rules the heuristics use.
pub fn default_synonyms() -> HashMap<String, Vec<String>> {
    let mut synonyms = HashMap::new();
    synonyms.insert(
        "happy".to_string(),
        vec!["great", "joy", "excited", "awesome"]
            .into_iter()
            .map(String::from)
            .collect(),
    );
    synonyms.insert(
        "sad".to_string(),
        vec!["down", "unhappy", "depressed", "lonely"]
            .into_iter()
            .map(String::from)
            .collect(),
    );
    synonyms.insert(
        "angry".to_string(),
        vec!["mad", "furious", "annoyed"]
            .into_iter()
            .map(String::from)
            .collect(),
    );
    synonyms.insert(
        "stressed".to_string(),
        vec!["stress", "anxious", "nervous"]
            .into_iter()
            .map(String::from)
            .collect(),
    );
    synonyms
}

/// Built-in synonym sets restricted to the given label list.
pub fn synonyms_for_labels(labels: &[&str]) -> HashMap<String, Vec<String>> {
    default_synonyms()
        .into_iter()
        .filter(|(key, _)| labels.contains(&key.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_member() {
        let taxonomy = Taxonomy::basic();
        assert_eq!(taxonomy.canonicalize("Happy "), MoodLabel::new("happy"));
    }

    #[test]
    fn test_canonicalize_non_member_rewrites_to_default() {
        let taxonomy = Taxonomy::basic();
        assert_eq!(taxonomy.canonicalize("confused"), MoodLabel::new("neutral"));
        assert_eq!(taxonomy.canonicalize(""), MoodLabel::new("neutral"));
    }

    #[test]
    fn test_priority_order_is_declaration_order() {
        let taxonomy = Taxonomy::extended();
        let order: Vec<&str> = taxonomy.labels().iter().map(|l| l.as_str()).collect();
        assert_eq!(
            order,
            vec!["happy", "sad", "angry", "neutral", "excited", "stressed"]
        );
    }

    #[test]
    fn test_default_must_be_member() {
        let result = Taxonomy::new(&["happy", "sad"], "neutral", HashMap::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_labels_rejected() {
        let result = Taxonomy::new(&["happy", "Happy"], "happy", HashMap::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_synonym_key_must_be_member() {
        let mut synonyms = HashMap::new();
        synonyms.insert("bored".to_string(), vec!["meh".to_string()]);
        let result = Taxonomy::new(&["happy", "neutral"], "neutral", synonyms);
        assert!(result.is_err());
    }

    #[test]
    fn test_mentions_by_synonym() {
        let taxonomy = Taxonomy::basic();
        let angry = MoodLabel::new("angry");
        assert!(taxonomy.mentions("i am so mad right now", &angry));
        assert!(!taxonomy.mentions("everything is fine", &angry));
    }

    #[test]
    fn test_both_taxonomies_share_one_design() {
        let basic = Taxonomy::basic();
        let extended = Taxonomy::extended();
        assert_eq!(basic.labels().len(), 4);
        assert_eq!(extended.labels().len(), 6);
        assert_eq!(basic.default_label(), extended.default_label());
        // The stressed synonym set only exists where stressed is a member
        assert!(basic.synonyms_for(&MoodLabel::new("stressed")).is_empty());
        assert!(!extended.synonyms_for(&MoodLabel::new("stressed")).is_empty());
    }
}
