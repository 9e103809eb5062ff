//! Prompt batch parsing.
//!
//! A [`PromptBatch`] is rebuilt from the call inputs on every iteration:
//! the ordered prompt list plus the parallel filename and suffix lists
//! used by the naming modes. Only non-empty trimmed entries count.

use serde::{Deserialize, Serialize};

/// The parsed per-call item batch.
///
/// Holds the usable prompts together with the auxiliary filename and
/// suffix lists. Entries are trimmed; blank entries are dropped during
/// construction, so indices here are already compacted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptBatch {
    prompts: Vec<String>,
    filenames: Vec<String>,
    suffixes: Vec<String>,
}

impl PromptBatch {
    /// Build a batch from raw call inputs.
    ///
    /// Each entry is trimmed and empty entries are discarded, for the
    /// prompt list and both auxiliary lists alike.
    pub fn new(prompts: &[String], filenames: &[String], suffixes: &[String]) -> Self {
        Self {
            prompts: clean(prompts),
            filenames: clean(filenames),
            suffixes: clean(suffixes),
        }
    }

    /// Number of usable prompts.
    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    /// Whether the batch has no usable prompts.
    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    /// The prompt at `index`.
    ///
    /// Callers are expected to pass an index produced by the selection
    /// policy, which is always in range for a non-empty batch.
    pub fn prompt(&self, index: usize) -> &str {
        &self.prompts[index]
    }

    /// The explicit filename entry at `index`, if one was supplied.
    pub fn filename(&self, index: usize) -> Option<&str> {
        self.filenames.get(index).map(String::as_str)
    }

    /// The suffix entry at `index`, if one was supplied.
    pub fn suffix(&self, index: usize) -> Option<&str> {
        self.suffixes.get(index).map(String::as_str)
    }

    /// Whether any suffix entries were supplied at all.
    pub fn has_suffixes(&self) -> bool {
        !self.suffixes.is_empty()
    }
}

fn clean(entries: &[String]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| entry.trim())
        .filter(|entry| !entry.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(entries: &[&str]) -> Vec<String> {
        entries.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_new_trims_and_drops_blank_entries() {
        let batch = PromptBatch::new(
            &strings(&["  portrait  ", "", "   ", "landscape"]),
            &[],
            &[],
        );
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.prompt(0), "portrait");
        assert_eq!(batch.prompt(1), "landscape");
    }

    #[test]
    fn test_empty_batch() {
        let batch = PromptBatch::new(&strings(&["", "   "]), &[], &[]);
        assert!(batch.is_empty());
        assert_eq!(batch.len(), 0);
    }

    #[test]
    fn test_auxiliary_lists_are_cleaned_independently() {
        let batch = PromptBatch::new(
            &strings(&["a", "b"]),
            &strings(&[" hero.png ", ""]),
            &strings(&["_front", "  ", "_left"]),
        );
        assert_eq!(batch.filename(0), Some("hero.png"));
        assert_eq!(batch.filename(1), None);
        assert_eq!(batch.suffix(0), Some("_front"));
        assert_eq!(batch.suffix(1), Some("_left"));
        assert!(batch.has_suffixes());
    }

    #[test]
    fn test_out_of_range_auxiliary_lookups_return_none() {
        let batch = PromptBatch::new(&strings(&["a", "b", "c"]), &strings(&["only.png"]), &[]);
        assert_eq!(batch.filename(2), None);
        assert_eq!(batch.suffix(0), None);
        assert!(!batch.has_suffixes());
    }
}
