use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

/// Prompt text overrides keyed by prompt name.
///
/// Writes replace unconditionally; a read racing a concurrent write sees
/// either the old or the new text.
#[derive(Clone, Default)]
pub struct PromptOverrideCache {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl PromptOverrideCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_override(&self, name: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(name)
            .cloned()
    }

    pub fn set_override(&self, name: &str, text: &str) {
        self.entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(name.to_string(), text.to_string());
    }

    /// Returns whether an override was present.
    pub fn clear_override(&self, name: &str) -> bool {
        self.entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(name)
            .is_some()
    }

    pub fn clear_all_overrides(&self) {
        self.entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }

    /// Sorted copy of every override, for export.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .map(|(name, text)| (name.clone(), text.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_replaces_and_clear_removes() {
        let cache = PromptOverrideCache::new();
        assert_eq!(cache.get_override("sys/basic-example"), None);

        cache.set_override("sys/basic-example", "first");
        cache.set_override("sys/basic-example", "second");
        assert_eq!(
            cache.get_override("sys/basic-example").as_deref(),
            Some("second")
        );

        assert!(cache.clear_override("sys/basic-example"));
        assert!(!cache.clear_override("sys/basic-example"));
        assert_eq!(cache.get_override("sys/basic-example"), None);
    }

    #[test]
    fn clear_all_empties_the_mapping() {
        let cache = PromptOverrideCache::new();
        cache.set_override("b", "2");
        cache.set_override("a", "1");

        let snapshot = cache.snapshot();
        assert_eq!(snapshot.keys().collect::<Vec<_>>(), vec!["a", "b"]);

        cache.clear_all_overrides();
        assert!(cache.snapshot().is_empty());
    }

    #[test]
    fn clones_share_state() {
        let cache = PromptOverrideCache::new();
        let other = cache.clone();
        other.set_override("ctx/grade", "strict");
        assert_eq!(cache.get_override("ctx/grade").as_deref(), Some("strict"));
    }
}
