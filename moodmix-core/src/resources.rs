//! Mood -> playlist resource mapping
//!
//! Total function from a mood label to an opaque playback resource
//! identifier (a playlist URL here, but the pipeline treats it as an
//! opaque string). Loaded once, immutable for the process lifetime.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::taxonomy::MoodLabel;

/// Built-in playlist URLs for the basic taxonomy
static BUILTIN_PLAYLISTS: Lazy<HashMap<MoodLabel, String>> = Lazy::new(|| {
    [
        ("happy", "https://www.youtube.com/watch?v=gKgCSFZALkE"),
        ("sad", "https://www.youtube.com/watch?v=Z3zUcAwOs1A"),
        ("angry", "https://www.youtube.com/watch?v=iBuTEywEQ6U"),
        ("neutral", "https://www.youtube.com/watch?v=RUVohRXP8v0"),
    ]
    .into_iter()
    .map(|(label, url)| (MoodLabel::new(label), url.to_string()))
    .collect()
});

/// Total mapping from mood label to resource identifier.
#[derive(Debug, Clone)]
pub struct ResourceMap {
    entries: HashMap<MoodLabel, String>,
    default_resource: String,
}

impl ResourceMap {
    /// Build from explicit entries; `default_resource` answers for any
    /// label without an entry (or outside the taxonomy entirely).
    pub fn new(entries: HashMap<MoodLabel, String>, default_resource: String) -> Self {
        Self {
            entries,
            default_resource,
        }
    }

    /// Built-in map carrying the stock playlists, defaulting to the
    /// neutral playlist.
    pub fn builtin() -> Self {
        let entries = BUILTIN_PLAYLISTS.clone();
        let default_resource = entries
            .get(&MoodLabel::new("neutral"))
            .cloned()
            .unwrap_or_default();
        Self::new(entries, default_resource)
    }

    /// Resolve a label to its resource identifier. Total and pure: unknown
    /// labels resolve to the default entry.
    pub fn resource_for(&self, label: &MoodLabel) -> &str {
        self.entries
            .get(label)
            .map(String::as_str)
            .unwrap_or(&self.default_resource)
    }

    pub fn default_resource(&self) -> &str {
        &self.default_resource
    }
}
