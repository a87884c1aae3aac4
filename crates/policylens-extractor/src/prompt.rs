//! LLM prompt engineering for entity extraction

use policylens_domain::SourceRole;

/// Builds role-specific prompts asking the LLM for an entity list
pub struct PromptBuilder<'a> {
    text: &'a str,
    role: SourceRole,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder; `text` should already be truncated
    pub fn new(text: &'a str, role: SourceRole) -> Self {
        Self { text, role }
    }

    /// Build the complete extraction prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(EXTRACTION_INSTRUCTIONS);
        prompt.push_str("\n\n");

        prompt.push_str(&format!("Text role: {}\n", self.role));
        prompt.push_str(self.role_focus());
        prompt.push_str("\n\n");

        prompt.push_str("Text to analyze:\n");
        prompt.push_str("---\n");
        prompt.push_str(self.text);
        prompt.push_str("\n---\n\n");

        prompt.push_str(OUTPUT_FORMAT_REMINDER);
        prompt
    }

    fn role_focus(&self) -> &'static str {
        match self.role {
            SourceRole::Question => {
                "Focus: the policies, bodies, places, and terms the user is asking about. \
                 Return only what the question itself names."
            }
            SourceRole::Answer => {
                "Focus: every policy-domain entity the answer asserts something about, \
                 including agencies, dates, amounts, and clauses."
            }
            SourceRole::Passage => {
                "Focus: the key entities of these retrieved policy passages that could \
                 support an answer."
            }
        }
    }
}

const EXTRACTION_INSTRUCTIONS: &str = r#"You are an expert analyst of government policy and regulatory documents. Extract the key policy entities from the text below.

Entity types (use the code as the label):
- POLICY: names of policies, plans, measures
- ORG: government bodies, companies, institutions
- LOCATION: countries, provinces, cities, zones
- REGULATION: laws, articles, clauses
- INDUSTRY: industries and sectors
- PERSON: positions, roles, categories of people
- TIME: dates, deadlines, periods
- AMOUNT: amounts, rates, quotas
- TERM: domain-specific business terms
- CONCEPT: abstract policy concepts

Keep every entity text exactly as written in the source text, in its original language."#;

const OUTPUT_FORMAT_REMINDER: &str = r#"Output a JSON array only, with no explanation. Each element is either a string or an object:
[{"text": "entity text", "label": "ORG", "confidence": 0.9}]
Output [] if the text contains no entities."#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_role_and_text() {
        let prompt = PromptBuilder::new("试验区管委会负责审批", SourceRole::Answer).build();
        assert!(prompt.contains("Text role: answer"));
        assert!(prompt.contains("试验区管委会负责审批"));
        assert!(prompt.contains("JSON array"));
    }

    #[test]
    fn test_prompts_differ_by_role() {
        let question = PromptBuilder::new("text", SourceRole::Question).build();
        let passage = PromptBuilder::new("text", SourceRole::Passage).build();
        assert_ne!(question, passage);
        assert!(question.contains("Text role: question"));
        assert!(passage.contains("Text role: passage"));
    }
}
