//! Derived word-form resolution (plurals, past tense, participles).
//!
//! Rule sets are ordered most-specific-first and deliberately conservative:
//! a candidate base is only accepted when it appears in the known word set
//! and is strictly shorter than the derived form.

use regex::Regex;
use std::collections::BTreeSet;

/// How a rule rewrites a derived word into its base candidate.
enum RuleKind {
    /// Capture-group substitution, e.g. `^(.+)ies$` -> `${1}y`.
    Rewrite(&'static str),
    /// Strip the suffix and collapse a doubled final consonant
    /// (stopped -> stop). The pattern captures stem + both consonants; the
    /// rule only fires when the two consonants are equal.
    DoubledConsonant,
}

struct FormRule {
    pattern: Regex,
    kind: RuleKind,
}

impl FormRule {
    fn base_candidate(&self, word: &str) -> Option<String> {
        match &self.kind {
            RuleKind::Rewrite(replacement) => {
                if self.pattern.is_match(word) {
                    Some(self.pattern.replace(word, *replacement).into_owned())
                } else {
                    None
                }
            }
            RuleKind::DoubledConsonant => {
                let caps = self.pattern.captures(word)?;
                if caps[2] == caps[3] {
                    Some(format!("{}{}", &caps[1], &caps[2]))
                } else {
                    None
                }
            }
        }
    }
}

/// A resolved base word and the relation label connecting it to the derived
/// form, e.g. ("BABY", "Plural of") for "BABIES".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseForm {
    pub base: String,
    pub relation: String,
}

type RuleSpec = (&'static str, RuleKind);

fn plural_rules() -> Vec<RuleSpec> {
    vec![
        (r"^(.+)ies$", RuleKind::Rewrite("${1}y")), // babies -> baby
        (r"^(.+)ves$", RuleKind::Rewrite("${1}f")), // wolves -> wolf
        (r"^(.+)ves$", RuleKind::Rewrite("${1}fe")), // wives -> wife
        (r"^(.+[sxz])es$", RuleKind::Rewrite("${1}")), // boxes -> box
        (r"^(.+[cs]h)es$", RuleKind::Rewrite("${1}")), // churches -> church
        (r"^(.+)s$", RuleKind::Rewrite("${1}")),    // cats -> cat
    ]
}

fn past_tense_rules() -> Vec<RuleSpec> {
    vec![
        (r"^(.+)ied$", RuleKind::Rewrite("${1}y")), // carried -> carry
        (r"^(.+)([^aeiou])([^aeiou])ed$", RuleKind::DoubledConsonant), // stopped -> stop
        (r"^(.+[^e])ed$", RuleKind::Rewrite("${1}e")), // loved -> love
        (r"^(.+)ed$", RuleKind::Rewrite("${1}")),   // walked -> walk
    ]
}

fn present_participle_rules() -> Vec<RuleSpec> {
    vec![
        (r"^(.+)ying$", RuleKind::Rewrite("${1}y")), // carrying -> carry
        (r"^(.+)([^aeiou])([^aeiou])ing$", RuleKind::DoubledConsonant), // stopping -> stop
        (r"^(.+)ing$", RuleKind::Rewrite("${1}e")),  // loving -> love
        (r"^(.+)ing$", RuleKind::Rewrite("${1}")),   // walking -> walk
    ]
}

// Many words ending in -er/-est are not comparatives; only the
// unambiguous shapes are handled.
fn comparative_rules() -> Vec<RuleSpec> {
    vec![
        (r"^(.+)ier$", RuleKind::Rewrite("${1}y")), // happier -> happy
        (r"^(.+)([^aeiou])([^aeiou])er$", RuleKind::DoubledConsonant), // bigger -> big
    ]
}

fn superlative_rules() -> Vec<RuleSpec> {
    vec![
        (r"^(.+)iest$", RuleKind::Rewrite("${1}y")), // happiest -> happy
        (r"^(.+)([^aeiou])([^aeiou])est$", RuleKind::DoubledConsonant), // biggest -> big
    ]
}

/// Resolves derived word forms to their base words.
pub struct WordFormExpander {
    rule_sets: Vec<(String, Vec<FormRule>)>,
}

impl WordFormExpander {
    pub fn new() -> Self {
        let specs: Vec<(&str, Vec<RuleSpec>)> = vec![
            ("Plural of", plural_rules()),
            ("Past tense of", past_tense_rules()),
            ("Present participle of", present_participle_rules()),
            ("Comparative form of", comparative_rules()),
            ("Superlative form of", superlative_rules()),
        ];

        let rule_sets = specs
            .into_iter()
            .map(|(relation, rules)| {
                let compiled = rules
                    .into_iter()
                    .filter_map(|(pattern, kind)| {
                        Regex::new(pattern).ok().map(|pattern| FormRule { pattern, kind })
                    })
                    .collect();
                (relation.to_string(), compiled)
            })
            .collect();

        Self { rule_sets }
    }

    /// Find the base word for a derived form, trying each relation's rules
    /// in order. The base must exist in `known` and be shorter than `word`.
    pub fn find_base(&self, word: &str, known: &BTreeSet<String>) -> Option<BaseForm> {
        let lower = word.to_lowercase();
        for (relation, rules) in &self.rule_sets {
            for rule in rules {
                if let Some(candidate) = rule.base_candidate(&lower) {
                    let base = candidate.to_uppercase();
                    if base.len() < word.len() && known.contains(&base) {
                        return Some(BaseForm {
                            base,
                            relation: relation.clone(),
                        });
                    }
                }
            }
        }
        None
    }
}

impl Default for WordFormExpander {
    fn default() -> Self {
        Self::new()
    }
}
