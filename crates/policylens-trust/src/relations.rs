//! Relation statement extraction
//!
//! Finds subject–predicate–object statements in an answer with a fixed set of
//! verb patterns. Each pattern matches within one clause: the subject is the
//! shortest non-empty text before the verb, the object runs to the end of the
//! clause.

use policylens_domain::RelationCode;
use regex::Regex;
use std::sync::LazyLock;

/// A statement found in an answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationTriple {
    /// Text before the verb
    pub subject: String,
    /// Canonical relation for the verb
    pub predicate: RelationCode,
    /// Text after the verb
    pub object: String,
}

struct RelationPattern {
    regex: Regex,
    code: RelationCode,
}

fn clause_pattern(verb: &str, code: RelationCode) -> RelationPattern {
    let pattern = format!(r"([^，。！？；\n]+?){verb}([^，。！？；\n]+)");
    RelationPattern {
        regex: Regex::new(&pattern).expect("relation pattern is a valid regex"),
        code,
    }
}

fn english_pattern(verb: &str, code: RelationCode) -> RelationPattern {
    let pattern = format!(r"(?i)([^,.;!?\n]+?)\s+{verb}\s+([^,.;!?\n]+)");
    RelationPattern {
        regex: Regex::new(&pattern).expect("relation pattern is a valid regex"),
        code,
    }
}

static PATTERNS: LazyLock<Vec<RelationPattern>> = LazyLock::new(|| {
    vec![
        clause_pattern("负责", RelationCode::ResponsibleFor),
        clause_pattern("管理", RelationCode::Manages),
        clause_pattern("审批", RelationCode::Approves),
        clause_pattern("发布", RelationCode::Publishes),
        clause_pattern("适用于", RelationCode::AppliesTo),
        clause_pattern("要求", RelationCode::Requires),
        english_pattern("is responsible for", RelationCode::ResponsibleFor),
        english_pattern("manages", RelationCode::Manages),
        english_pattern("approves", RelationCode::Approves),
        english_pattern("(?:publishes|issues)", RelationCode::Publishes),
        english_pattern("applies to", RelationCode::AppliesTo),
        english_pattern("requires", RelationCode::Requires),
    ]
});

/// Extract relation statements, pattern by pattern
///
/// # Examples
///
/// ```
/// use policylens_trust::extract_relations;
/// use policylens_domain::RelationCode;
///
/// let triples = extract_relations("试验区管委会管理华侨经济文化合作试验区。");
/// assert_eq!(triples.len(), 1);
/// assert_eq!(triples[0].subject, "试验区管委会");
/// assert_eq!(triples[0].predicate, RelationCode::Manages);
/// assert_eq!(triples[0].object, "华侨经济文化合作试验区");
/// ```
pub fn extract_relations(text: &str) -> Vec<RelationTriple> {
    let mut triples = Vec::new();
    for pattern in PATTERNS.iter() {
        for captures in pattern.regex.captures_iter(text) {
            let subject = captures.get(1).map_or("", |m| m.as_str()).trim();
            let object = captures.get(2).map_or("", |m| m.as_str()).trim();
            if !subject.is_empty() && !object.is_empty() {
                triples.push(RelationTriple {
                    subject: subject.to_string(),
                    predicate: pattern.code,
                    object: object.to_string(),
                });
            }
        }
    }
    triples
}
