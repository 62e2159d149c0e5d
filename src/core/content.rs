use crate::domain::model::{BlogPost, GenerationRequest, KeywordSet};
use crate::domain::ports::AiClient;
use crate::domain::schema::ResponseSchema;
use crate::utils::error::{GenError, Result};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct PostReply {
    title: String,
    body: String,
}

/// Writes a short promotional post that works every keyword in.
pub struct ContentGenerator<C: AiClient> {
    client: Arc<C>,
    min_words: u32,
    max_words: u32,
}

impl<C: AiClient> ContentGenerator<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self {
            client,
            min_words: 150,
            max_words: 200,
        }
    }

    pub fn with_word_range(mut self, min_words: u32, max_words: u32) -> Self {
        self.min_words = min_words;
        self.max_words = max_words;
        self
    }

    pub fn schema() -> ResponseSchema {
        ResponseSchema::object(["title", "body"])
    }

    pub fn build_prompt(&self, request: &GenerationRequest, keywords: &KeywordSet) -> String {
        let keyword_list = keywords
            .iter()
            .map(|k| format!("\"{}\"", k))
            .collect::<Vec<_>>()
            .join(", ");

        let mut prompt = format!(
            "Write an enthusiastic, persuasive blog post of about {}-{} words promoting \
             the product \"{}\".",
            self.min_words,
            self.max_words,
            request.subject_name.trim()
        );
        if let Some(description) = request.description() {
            prompt.push_str(&format!(" Product description: {}.", description));
        }
        prompt.push_str(&format!(
            " Naturally incorporate every one of these SEO keywords: {}. \
             Give the post a catchy title. Separate paragraphs in the body with a blank \
             line (two newline characters). Respond with a JSON object with string fields \
             \"title\" and \"body\".",
            keyword_list
        ));
        prompt
    }

    pub async fn generate(
        &self,
        request: &GenerationRequest,
        keywords: &KeywordSet,
    ) -> Result<BlogPost> {
        if keywords.is_empty() {
            return Err(GenError::invalid_input(
                "keywords must be generated before content",
            ));
        }
        request.ensure_subject()?;

        let prompt = self.build_prompt(request, keywords);
        let raw = self.client.send(&prompt, &Self::schema()).await?;

        let post = parse_post(&raw)?;
        tracing::info!(
            "Generated post '{}' ({} paragraphs)",
            post.title,
            post.paragraphs().len()
        );
        Ok(post)
    }
}

fn parse_post(raw: &str) -> Result<BlogPost> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| GenError::malformed(format!("post is not valid JSON: {}", e)))?;

    // serde 也接受 ["t","b"] 這種序列形式，這裡只收物件
    if !value.is_object() {
        return Err(GenError::malformed(format!(
            "post must be a {{title, body}} object, got {}",
            json_type_name(&value)
        )));
    }
    let reply: PostReply = serde_json::from_value(value)
        .map_err(|e| GenError::malformed(format!("post is not a {{title, body}} object: {}", e)))?;

    if reply.title.trim().is_empty() {
        return Err(GenError::malformed("post title is empty"));
    }
    if reply.body.trim().is_empty() {
        return Err(GenError::malformed("post body is empty"));
    }

    Ok(BlogPost {
        title: reply.title,
        body: reply.body,
    })
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
