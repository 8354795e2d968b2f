//! Pipeline configuration
//!
//! TOML-loadable configuration for the taxonomy, confidence threshold,
//! default vote count and the playlist map. All of it is read-only after
//! startup; the pipeline components are built from it once.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::gate::DEFAULT_CONFIDENCE_THRESHOLD;
use crate::resources::ResourceMap;
use crate::taxonomy::{self, MoodLabel, Taxonomy};

/// Vote count used when a request does not specify one
pub const DEFAULT_VOTES: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Taxonomy labels in priority order
    pub labels: Vec<String>,
    /// Default label returned on ambiguity; must be one of `labels`
    pub default_label: String,
    /// Keyword synonyms per label, merged over the built-in sets
    pub synonyms: HashMap<String, Vec<String>>,
    /// Confidence gate threshold on the 0-100 scale
    pub confidence_threshold: f32,
    /// Vote count for requests that do not specify one
    pub default_votes: usize,
    /// Playlist URL per label; labels without an entry use the default
    pub playlists: HashMap<String, String>,
    /// Resource used for labels without a playlist entry; when unset, the
    /// default label's playlist answers
    pub default_playlist: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            labels: ["happy", "sad", "angry", "neutral"]
                .into_iter()
                .map(String::from)
                .collect(),
            default_label: "neutral".to_string(),
            synonyms: HashMap::new(),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            default_votes: DEFAULT_VOTES,
            playlists: HashMap::new(),
            default_playlist: None,
        }
    }
}

impl PipelineConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse pipeline config failed: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.confidence_threshold < 0.0 || self.confidence_threshold > 100.0 {
            return Err(Error::Config(format!(
                "confidence_threshold out of range: {}",
                self.confidence_threshold
            )));
        }
        if self.default_votes == 0 {
            return Err(Error::Config("default_votes must be at least 1".to_string()));
        }
        // Taxonomy construction validates labels/default/synonyms
        self.taxonomy().map(|_| ())
    }

    /// Build the configured taxonomy. Configured synonyms are merged over
    /// the built-in sets (configuration wins per label).
    pub fn taxonomy(&self) -> Result<Taxonomy> {
        let labels: Vec<&str> = self.labels.iter().map(String::as_str).collect();
        let mut synonyms = taxonomy::synonyms_for_labels(&labels);
        for (key, words) in &self.synonyms {
            synonyms.insert(key.clone(), words.clone());
        }
        Taxonomy::new(&labels, &self.default_label, synonyms)
    }

    /// Build the resource map: built-in playlists, overlaid with configured
    /// entries, restricted to the taxonomy.
    pub fn resource_map(&self, taxonomy: &Taxonomy) -> Result<ResourceMap> {
        let builtin = ResourceMap::builtin();
        let mut entries = HashMap::new();
        for label in taxonomy.labels() {
            let url = self
                .playlists
                .get(label.as_str())
                .cloned()
                .unwrap_or_else(|| builtin.resource_for(label).to_string());
            entries.insert(label.clone(), url);
        }
        for key in self.playlists.keys() {
            if !taxonomy.contains(&MoodLabel::new(key)) {
                return Err(Error::Config(format!(
                    "playlist keyed to unknown label: {}",
                    key
                )));
            }
        }

        let default_resource = match &self.default_playlist {
            Some(url) => url.clone(),
            None => entries
                .get(taxonomy.default_label())
                .cloned()
                .unwrap_or_else(|| builtin.default_resource().to_string()),
        };
        Ok(ResourceMap::new(entries, default_resource))
    }
}
