use crate::domain::model::{GenerationRequest, KeywordSet, KEYWORD_COUNT};
use crate::domain::ports::AiClient;
use crate::domain::schema::ResponseSchema;
use crate::utils::error::{GenError, Result};
use std::sync::Arc;

/// Asks the model for long-tail, purchase-intent keyword phrases.
pub struct KeywordGenerator<C: AiClient> {
    client: Arc<C>,
    strict_count: bool,
}

impl<C: AiClient> KeywordGenerator<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self {
            client,
            strict_count: false,
        }
    }

    /// Reject replies that are not exactly `KEYWORD_COUNT` non-blank phrases.
    pub fn with_strict_count(mut self, strict: bool) -> Self {
        self.strict_count = strict;
        self
    }

    pub fn build_prompt(request: &GenerationRequest) -> String {
        let mut prompt = format!(
            "You are an SEO specialist. Generate exactly {} long-tail keyword phrases \
             with clear purchase intent for the product \"{}\".",
            KEYWORD_COUNT,
            request.subject_name.trim()
        );
        if let Some(description) = request.description() {
            prompt.push_str(&format!(" Product description: {}.", description));
        }
        prompt.push_str(
            " Each phrase should be something a shopper who is ready to buy would type \
             into a search engine. Respond with a JSON array of strings only.",
        );
        prompt
    }

    pub async fn generate(&self, request: &GenerationRequest) -> Result<KeywordSet> {
        request.ensure_subject()?;

        let prompt = Self::build_prompt(request);
        let raw = self
            .client
            .send(&prompt, &ResponseSchema::StringArray)
            .await?;

        let keywords = self.parse(&raw)?;
        tracing::info!(
            "Generated {} keywords for '{}'",
            keywords.len(),
            request.subject_name
        );
        Ok(keywords)
    }

    fn parse(&self, raw: &str) -> Result<KeywordSet> {
        let keywords: Vec<String> = serde_json::from_str(raw)
            .map_err(|e| GenError::malformed(format!("keyword list is not a JSON string array: {}", e)))?;

        let well_formed =
            keywords.len() == KEYWORD_COUNT && keywords.iter().all(|k| !k.trim().is_empty());

        if !well_formed {
            if self.strict_count {
                return Err(GenError::malformed(format!(
                    "expected {} non-empty keywords, got {:?}",
                    KEYWORD_COUNT, keywords
                )));
            }
            // 寬鬆模式：照單全收，只記錄警告
            tracing::warn!(
                "Model returned {} keywords (requested {}); accepting as-is",
                keywords.len(),
                KEYWORD_COUNT
            );
        }

        Ok(KeywordSet::new(keywords))
    }
}
