//! Filename derivation.
//!
//! Pure functions of (index, base, naming mode, auxiliary lists): no
//! state is read or mutated here. Missing or out-of-range auxiliary
//! entries degrade to the indexed fallback instead of failing.

use serde::{Deserialize, Serialize};

use crate::batch::PromptBatch;
use crate::template::FilenameTemplate;

/// Policy deriving the output filename for a call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingMode {
    /// `{base}_{index:03}`
    #[default]
    AutoIndex,
    /// Entry from an explicit filename list, indexed fallback otherwise
    FilenameList,
    /// Base plus the suffix entry verbatim (suffixes carry their own delimiter)
    SuffixList,
    /// Caller-supplied template over base/index/suffix
    Template,
}

impl NamingMode {
    /// Stable string form, matching the serialized representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            NamingMode::AutoIndex => "auto_index",
            NamingMode::FilenameList => "filename_list",
            NamingMode::SuffixList => "suffix_list",
            NamingMode::Template => "template",
        }
    }
}

/// Derive the filename for `index`.
///
/// `template` is only consulted in template mode; the caller parses it
/// up front so template faults surface before any state mutation.
pub(crate) fn derive_filename(
    mode: NamingMode,
    index: usize,
    base: &str,
    batch: &PromptBatch,
    template: Option<&FilenameTemplate>,
) -> String {
    match mode {
        NamingMode::AutoIndex => auto_indexed(base, index),
        NamingMode::FilenameList => batch
            .filename(index)
            .map(String::from)
            .unwrap_or_else(|| auto_indexed(base, index)),
        NamingMode::SuffixList => {
            if !batch.has_suffixes() {
                return auto_indexed(base, index);
            }
            match batch.suffix(index) {
                Some(suffix) => format!("{base}{suffix}"),
                None => format!("{base}_{index:03}"),
            }
        }
        NamingMode::Template => {
            let suffix = batch.suffix(index).unwrap_or("");
            let suffix = suffix.strip_prefix('_').unwrap_or(suffix);
            match template {
                Some(template) => template.render(base, index, suffix),
                None => auto_indexed(base, index),
            }
        }
    }
}

fn auto_indexed(base: &str, index: usize) -> String {
    format!("{base}_{index:03}")
}
