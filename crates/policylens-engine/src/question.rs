//! Question validation

use crate::error::EngineError;

/// Longest accepted question, in characters
pub const MAX_QUESTION_CHARS: usize = 1000;

/// Clean a user question and reject unusable ones
///
/// Control characters are dropped and whitespace runs collapse to one
/// space. The length limit applies to the cleaned text.
///
/// # Examples
///
/// ```
/// use policylens_engine::validate_question;
///
/// let question = validate_question("  What   does\tthe zone\u{7} regulate?\n").unwrap();
/// assert_eq!(question, "What does the zone regulate?");
/// assert!(validate_question(" \n ").is_err());
/// ```
pub fn validate_question(raw: &str) -> Result<String, EngineError> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_whitespace() || !c.is_control())
        .collect();
    let question = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

    if question.is_empty() {
        return Err(EngineError::ValidationFailure(
            "Question must not be empty".to_string(),
        ));
    }

    let chars = question.chars().count();
    if chars > MAX_QUESTION_CHARS {
        return Err(EngineError::ValidationFailure(format!(
            "Question is too long ({} characters, at most {})",
            chars, MAX_QUESTION_CHARS
        )));
    }

    Ok(question)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_counts_characters_not_bytes() {
        let at_limit = "规".repeat(MAX_QUESTION_CHARS);
        assert_eq!(validate_question(&at_limit).unwrap().chars().count(), MAX_QUESTION_CHARS);

        let over = "规".repeat(MAX_QUESTION_CHARS + 1);
        assert!(matches!(
            validate_question(&over),
            Err(EngineError::ValidationFailure(_))
        ));
    }

    #[test]
    fn test_control_only_input_is_empty() {
        assert!(validate_question("\u{0}\u{1b}\u{7f}").is_err());
    }

    #[test]
    fn test_chinese_question_passes_unchanged() {
        let question = "华侨经济文化合作试验区的管理机构是什么？";
        assert_eq!(validate_question(question).unwrap(), question);
    }
}
