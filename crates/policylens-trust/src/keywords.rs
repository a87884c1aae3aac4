//! Keyword extraction for lexical dimensions
//!
//! ASCII words are lower-cased and kept whole. Runs of CJK characters have no
//! word boundaries, so they are split into overlapping character bigrams.
//! Single-character tokens, pure numbers, and stop words are dropped.

use std::collections::BTreeSet;

const STOP_WORDS: &[&str] = &[
    // Chinese function words that survive bigram splitting
    "以及", "或者", "并且", "而且", "我们", "你们", "他们", "这个", "那个", "这些", "那些",
    "什么", "可以", "进行", "其中", "以上", "以下", "一个",
    // English
    "the", "and", "for", "are", "was", "were", "with", "that", "this", "these", "those",
    "from", "into", "has", "have", "had", "been", "its", "not", "but", "can", "will",
    "shall", "may", "any", "all", "which", "what", "who", "how", "when", "where", "there",
    "their", "they", "them", "our", "you", "your",
];

fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{20000}'..='\u{2A6DF}')
}

fn keep(token: &str) -> bool {
    token.chars().count() > 1
        && !token.chars().all(|c| c.is_ascii_digit())
        && !STOP_WORDS.contains(&token)
}

fn flush_word(word: &mut String, keywords: &mut BTreeSet<String>) {
    if !word.is_empty() {
        let token = word.to_ascii_lowercase();
        if keep(&token) {
            keywords.insert(token);
        }
        word.clear();
    }
}

fn flush_cjk(run: &mut Vec<char>, keywords: &mut BTreeSet<String>) {
    for pair in run.windows(2) {
        let token: String = pair.iter().collect();
        if keep(&token) {
            keywords.insert(token);
        }
    }
    run.clear();
}

/// Extract the keyword set of a text
///
/// # Examples
///
/// ```
/// use policylens_trust::extract_keywords;
///
/// let keywords = extract_keywords("试验区管委会 manages the Zone");
/// assert!(keywords.contains("管委"));
/// assert!(keywords.contains("manages"));
/// assert!(keywords.contains("zone"));
/// assert!(!keywords.contains("the"));
/// ```
pub fn extract_keywords(text: &str) -> BTreeSet<String> {
    let mut keywords = BTreeSet::new();
    let mut word = String::new();
    let mut run: Vec<char> = Vec::new();

    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            flush_cjk(&mut run, &mut keywords);
            word.push(c);
        } else if is_cjk(c) {
            flush_word(&mut word, &mut keywords);
            run.push(c);
        } else {
            flush_word(&mut word, &mut keywords);
            flush_cjk(&mut run, &mut keywords);
        }
    }
    flush_word(&mut word, &mut keywords);
    flush_cjk(&mut run, &mut keywords);

    keywords
}
