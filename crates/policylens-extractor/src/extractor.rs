//! Core Extractor implementation

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::parser::parse_entity_response;
use crate::prompt::PromptBuilder;
use crate::types::ExtractionReport;
use policylens_domain::{Entity, EntitySet, GenerationOptions, LlmProvider, SourceRole};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// The Extractor turns free text into typed entities
pub struct Extractor<L>
where
    L: LlmProvider,
{
    llm_provider: Arc<L>,
    config: ExtractorConfig,
}

impl<L> Clone for Extractor<L>
where
    L: LlmProvider,
{
    fn clone(&self) -> Self {
        Self {
            llm_provider: Arc::clone(&self.llm_provider),
            config: self.config.clone(),
        }
    }
}

impl<L> Extractor<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: std::fmt::Display,
{
    /// Create a new Extractor
    pub fn new(llm_provider: L, config: ExtractorConfig) -> Self {
        Self::from_shared(Arc::new(llm_provider), config)
    }

    /// Create an Extractor over a provider shared with other components
    pub fn from_shared(llm_provider: Arc<L>, config: ExtractorConfig) -> Self {
        Self {
            llm_provider,
            config,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract entities, keeping failures explicit
    ///
    /// Empty text yields an empty list, or the placeholder entity for the
    /// question role, without calling the model.
    pub async fn try_extract(
        &self,
        text: &str,
        role: SourceRole,
    ) -> Result<ExtractionReport, ExtractorError> {
        let start_time = Instant::now();

        let trimmed = text.trim();
        if trimmed.is_empty() {
            debug!("Empty {} text, skipping model call", role);
            return Ok(ExtractionReport {
                entities: Self::empty_result(role),
                ..ExtractionReport::default()
            });
        }

        let truncated: String = trimmed.chars().take(self.config.max_text_length).collect();
        let prompt = PromptBuilder::new(&truncated, role).build();
        debug!("Prompt length: {} chars", prompt.chars().count());

        let llm_response = timeout(self.config.extraction_timeout(), self.call_llm(prompt))
            .await
            .map_err(|_| ExtractorError::Timeout)??;
        debug!("LLM response length: {} chars", llm_response.chars().count());

        let candidates = parse_entity_response(&llm_response)?;

        let mut entities: Vec<Entity> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut below_threshold = 0;
        for candidate in candidates {
            if candidate.name.chars().count() <= self.config.min_name_chars {
                continue;
            }
            let entity = candidate.into_entity(role, self.config.default_confidence);
            if entity.confidence() < self.config.confidence_threshold {
                below_threshold += 1;
                continue;
            }
            let key = entity.key();
            if key.is_empty() {
                continue;
            }
            // Repeated identities merge into the first-seen slot
            match positions.get(&key) {
                Some(&index) => entities[index] = entities[index].merged(&entity),
                None => {
                    positions.insert(key, entities.len());
                    entities.push(entity);
                }
            }
        }

        let truncated_count = entities.len().saturating_sub(self.config.max_entities);
        entities.truncate(self.config.max_entities);

        info!(
            "Extracted {} {} entities ({} below threshold, {} over cap)",
            entities.len(),
            role,
            below_threshold,
            truncated_count
        );

        Ok(ExtractionReport {
            entities,
            below_threshold,
            truncated: truncated_count,
            processing_time_ms: start_time.elapsed().as_millis() as u64,
        })
    }

    /// Extract entities, degrading to an empty result on any failure
    ///
    /// For the question role the degraded result is the placeholder entity,
    /// so coverage ratios stay defined. Never fails.
    pub async fn extract(&self, text: &str, role: SourceRole) -> Vec<Entity> {
        match self.try_extract(text, role).await {
            Ok(report) => report.entities,
            Err(e) => {
                warn!("Entity extraction for {} failed: {}", role, e);
                Self::empty_result(role)
            }
        }
    }

    /// Extract into a deduplicated set
    pub async fn extract_set(&self, text: &str, role: SourceRole) -> EntitySet {
        self.extract(text, role).await.into_iter().collect()
    }

    fn empty_result(role: SourceRole) -> Vec<Entity> {
        match role {
            SourceRole::Question => vec![Entity::question_placeholder()],
            _ => Vec::new(),
        }
    }

    /// Call the LLM provider
    async fn call_llm(&self, prompt: String) -> Result<String, ExtractorError> {
        let llm = Arc::clone(&self.llm_provider);
        let options = GenerationOptions::with_temperature(self.config.temperature);

        // Call in a blocking context since LlmProvider is not async
        tokio::task::spawn_blocking(move || {
            llm.generate(&prompt, &options)
                .map_err(|e| ExtractorError::Llm(e.to_string()))
        })
        .await
        .map_err(|e| ExtractorError::Llm(format!("Task join error: {}", e)))?
    }
}
