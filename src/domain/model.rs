use crate::utils::error::{ErrorKind, GenError, Result};
use serde::{Deserialize, Serialize};

/// Number of keyword phrases requested from the model.
pub const KEYWORD_COUNT: usize = 4;

/// Paragraph separator inside `BlogPost::body`.
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub subject_name: String,
    pub subject_description: Option<String>,
}

impl GenerationRequest {
    pub fn new(subject_name: impl Into<String>) -> Self {
        Self {
            subject_name: subject_name.into(),
            subject_description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.subject_description = if description.trim().is_empty() {
            None
        } else {
            Some(description)
        };
        self
    }

    /// 產品名稱不可為空白
    pub fn ensure_subject(&self) -> Result<()> {
        if self.subject_name.trim().is_empty() {
            return Err(GenError::invalid_input("product name cannot be empty"));
        }
        Ok(())
    }

    pub fn description(&self) -> Option<&str> {
        self.subject_description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}

/// Ordered keyword phrases returned by the keyword stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeywordSet(Vec<String>);

impl KeywordSet {
    pub fn new(keywords: Vec<String>) -> Self {
        Self(keywords)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl<'a> IntoIterator for &'a KeywordSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPost {
    pub title: String,
    pub body: String,
}

impl BlogPost {
    pub fn paragraphs(&self) -> Vec<&str> {
        self.body.split(PARAGRAPH_SEPARATOR).collect()
    }

    /// Title followed by the body, as copied to the clipboard.
    pub fn to_plain_text(&self) -> String {
        format!("{}{}{}", self.title, PARAGRAPH_SEPARATOR, self.body)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    Keywords,
    Content,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Keywords => write!(f, "keywords"),
            Stage::Content => write!(f, "content"),
        }
    }
}

/// Last failed attempt, as observed by a presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineError {
    pub stage: Stage,
    pub kind: ErrorKind,
    pub message: String,
}

impl PipelineError {
    pub fn from_error(stage: Stage, error: &GenError) -> Self {
        Self {
            stage,
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} generation failed: {}", self.stage, self.message)
    }
}
