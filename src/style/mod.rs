//! Style Registry
//!
//! Tracks style resources injected by hot-updated modules. A stylesheet is
//! created on the first update for an id and patched in place afterwards,
//! so the host never sees a detach/reattach for a content change.
//!
//! # Example
//! ```text
//! import { updateStyle, removeStyle } from '/@hmr';
//!
//! updateStyle('/src/app.css', '.app { color: red }');
//! updateStyle('/src/app.css', '.app { color: blue }'); // same sheet, new content
//! removeStyle('/src/app.css');
//! ```

use rustc_hash::FxHashMap as HashMap;
use std::time::Instant;

/// An injected stylesheet
#[derive(Debug, Clone)]
pub struct StyleSheet {
    pub id: String,
    content: String,
    /// Incremented on every in-place content change
    revision: u64,
    attached_at: Instant,
}

impl StyleSheet {
    fn new(id: &str, content: &str) -> Self {
        Self {
            id: id.to_string(),
            content: content.to_string(),
            revision: 1,
            attached_at: Instant::now(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// When the sheet was first attached
    pub fn attached_at(&self) -> Instant {
        self.attached_at
    }

    fn replace_content(&mut self, content: &str) {
        self.content.clear();
        self.content.push_str(content);
        self.revision += 1;
    }
}

/// Process-wide table of injected stylesheets, keyed by id
#[derive(Debug, Default)]
pub struct StyleRegistry {
    sheets: HashMap<String, StyleSheet>,
}

impl StyleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the sheet for `id` or replace its content in place
    pub fn update_style(&mut self, id: &str, content: &str) {
        match self.sheets.get_mut(id) {
            Some(sheet) => {
                sheet.replace_content(content);
                tracing::debug!(id, revision = sheet.revision, "style updated");
            }
            None => {
                self.sheets.insert(id.to_string(), StyleSheet::new(id, content));
                tracing::debug!(id, "style attached");
            }
        }
    }

    /// Detach and release the sheet for `id`, if any
    pub fn remove_style(&mut self, id: &str) -> Option<StyleSheet> {
        let removed = self.sheets.remove(id);
        if removed.is_some() {
            tracing::debug!(id, "style detached");
        }
        removed
    }

    pub fn get(&self, id: &str) -> Option<&StyleSheet> {
        self.sheets.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sheets.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.sheets.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}
