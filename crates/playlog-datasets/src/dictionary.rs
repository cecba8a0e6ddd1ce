//! Word-data dictionaries (`words3.json` .. `words7.json`).
//!
//! Each file maps an uppercase word to its definition/etymology record,
//! using the original compact key names (`d`, `e`). Derived words carry the
//! base word's definition prefixed with the relation, so the games never
//! need to chase a second lookup.

use crate::error::Result;
use crate::wordforms::{BaseForm, WordFormExpander};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Word lengths the games use.
pub const WORD_LENGTHS: std::ops::RangeInclusive<u32> = 3..=7;

/// Definitions longer than this are considered real (not placeholders).
const MIN_REAL_DEFINITION: usize = 5;

const RELATION_PREFIXES: &[&str] = &[
    "Plural of",
    "Past tense of",
    "Present participle of",
    "Comparative form of",
    "Superlative form of",
];

/// One dictionary record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WordEntry {
    /// Definition text.
    #[serde(rename = "d", default)]
    pub definition: String,
    /// Etymology text.
    #[serde(rename = "e", default)]
    pub etymology: String,
    /// Base word when this entry is a derived form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    /// Relation to the base word (e.g. "Plural of").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<String>,
}

impl WordEntry {
    /// Whether the definition looks real rather than a placeholder.
    pub fn has_real_definition(&self) -> bool {
        self.definition.len() > MIN_REAL_DEFINITION
    }

    fn already_expanded(&self) -> bool {
        self.base.is_some()
            && RELATION_PREFIXES
                .iter()
                .any(|prefix| self.definition.starts_with(prefix))
    }
}

/// A full dictionary file, keyed by uppercase word. Sorted for stable output.
pub type WordList = BTreeMap<String, WordEntry>;

pub fn word_file_name(length: u32) -> String {
    format!("words{}.json", length)
}

/// Load a dictionary file; missing files are an empty list.
pub fn load_word_list(dir: &Path, length: u32) -> Result<WordList> {
    let path = dir.join(word_file_name(length));
    if !path.exists() {
        return Ok(WordList::new());
    }
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

/// Save a dictionary file (compact JSON, keys sorted).
pub fn save_word_list(dir: &Path, length: u32, words: &WordList) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(word_file_name(length));
    let json = serde_json::to_string(words)?;
    std::fs::write(&path, json)?;
    tracing::info!("saved {} words to {:?}", words.len(), path);
    Ok(())
}

/// Counts from one length's expansion pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpandOutcome {
    pub added: usize,
    pub derived_with_definition: usize,
    pub derived_without_definition: usize,
}

/// Expand the dictionaries under `dir` with derived forms of `all_words`.
///
/// For each length, words from the master list that are missing get added:
/// derived forms point at their base and inherit its definition when the
/// base has a real one; everything else gets an empty record for a later
/// definition fetch. Existing derived entries with placeholder definitions
/// are upgraded the same way.
pub fn expand_word_lists(
    dir: &Path,
    all_words: &BTreeSet<String>,
) -> Result<BTreeMap<u32, ExpandOutcome>> {
    let expander = WordFormExpander::new();

    let mut dictionaries: BTreeMap<u32, WordList> = BTreeMap::new();
    for length in WORD_LENGTHS {
        dictionaries.insert(length, load_word_list(dir, length)?);
    }

    let mut outcomes = BTreeMap::new();
    for length in WORD_LENGTHS {
        let mut data = dictionaries[&length].clone();
        let mut outcome = ExpandOutcome::default();

        for word in all_words {
            if word.len() != length as usize {
                continue;
            }

            if let Some(info) = data.get(word) {
                if info.already_expanded() {
                    continue;
                }
                // Upgrade placeholder definitions on known derived forms.
                if info.definition.len() < 10 {
                    if let Some(form) = expander.find_base(word, all_words) {
                        if let Some(base_info) = lookup_base_info(&dictionaries, &form.base) {
                            let entry = derived_entry(&form, Some(base_info));
                            data.insert(word.clone(), entry);
                            outcome.derived_with_definition += 1;
                        }
                    }
                }
                continue;
            }

            let entry = match expander.find_base(word, all_words) {
                Some(form) => {
                    let base_info = lookup_base_info(&dictionaries, &form.base);
                    if base_info.is_some() {
                        outcome.derived_with_definition += 1;
                    } else {
                        outcome.derived_without_definition += 1;
                    }
                    derived_entry(&form, base_info)
                }
                None => WordEntry::default(),
            };
            data.insert(word.clone(), entry);
            outcome.added += 1;
        }

        tracing::info!(
            length,
            added = outcome.added,
            with_definition = outcome.derived_with_definition,
            without_definition = outcome.derived_without_definition,
            "expanded dictionary"
        );

        save_word_list(dir, length, &data)?;
        dictionaries.insert(length, data);
        outcomes.insert(length, outcome);
    }

    Ok(outcomes)
}

/// Find usable base-word info across all dictionaries: a real definition on
/// an entry that is not itself derived.
fn lookup_base_info<'a>(
    dictionaries: &'a BTreeMap<u32, WordList>,
    base: &str,
) -> Option<&'a WordEntry> {
    dictionaries
        .values()
        .filter_map(|data| data.get(base))
        .find(|info| info.has_real_definition() && info.base.is_none())
}

fn derived_entry(form: &BaseForm, base_info: Option<&WordEntry>) -> WordEntry {
    match base_info {
        Some(info) => WordEntry {
            definition: format!("{} {}: {}", form.relation, form.base, info.definition),
            etymology: info.etymology.clone(),
            base: Some(form.base.clone()),
            relation: Some(form.relation.clone()),
        },
        None => WordEntry {
            definition: format!("{} {}.", form.relation, form.base),
            etymology: String::new(),
            base: Some(form.base.clone()),
            relation: Some(form.relation.clone()),
        },
    }
}
