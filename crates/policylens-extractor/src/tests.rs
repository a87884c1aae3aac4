//! Integration tests for the Extractor

#[cfg(test)]
mod tests {
    use crate::{Extractor, ExtractorConfig, ExtractorError};
    use policylens_domain::{EntitySet, EntityType, SourceRole};
    use policylens_llm::MockProvider;
    use std::time::Duration;

    #[tokio::test]
    async fn test_full_extraction_flow() {
        let mut llm = MockProvider::new("[]");
        llm.add_response(
            "Text role: question",
            r#"```json
[{"text": "华侨经济文化合作试验区", "label": "地理位置", "confidence": 0.95}]
```"#,
        );
        llm.add_response(
            "Text role: answer",
            r#"["试验区管委会", "华侨经济文化合作试验区"]"#,
        );
        let extractor = Extractor::new(llm.clone(), ExtractorConfig::default());

        let question = extractor
            .extract("华侨经济文化合作试验区的管理机构是什么？", SourceRole::Question)
            .await;
        assert_eq!(question.len(), 1);
        assert_eq!(question[0].entity_type(), EntityType::Location);
        assert_eq!(question[0].source(), SourceRole::Question);

        let answer: EntitySet = extractor
            .extract_set("由试验区管委会负责管理。", SourceRole::Answer)
            .await;
        assert_eq!(answer.len(), 2);
        assert!(answer.contains_name("华侨经济文化合作试验区"));

        assert_eq!(llm.call_count(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_names_collapse() {
        let llm = MockProvider::new(r#"["Trade Zone", "trade  zone", "Customs"]"#);
        let extractor = Extractor::new(llm, ExtractorConfig::default());
        let entities = extractor.extract("text", SourceRole::Passage).await;
        assert_eq!(entities.len(), 2);
    }

    #[tokio::test]
    async fn test_extraction_timeout() {
        let llm = MockProvider::new("[\"slow\"]").with_delay(Duration::from_millis(1500));
        let config = ExtractorConfig {
            extraction_timeout_secs: 1,
            ..ExtractorConfig::default()
        };
        let extractor = Extractor::new(llm, config);

        let result = extractor.try_extract("text", SourceRole::Answer).await;
        assert!(matches!(result, Err(ExtractorError::Timeout)));
    }

    #[tokio::test]
    async fn test_bare_strings_get_default_confidence() {
        let llm = MockProvider::new(r#"["财政补贴"]"#);
        let extractor = Extractor::new(llm, ExtractorConfig::default());
        let entities = extractor.extract("text", SourceRole::Answer).await;
        assert_eq!(entities[0].confidence(), 0.5);
        assert_eq!(entities[0].entity_type(), EntityType::Unclassified);
    }
}
