pub mod content;
pub mod engine;
pub mod export;
pub mod keywords;
pub mod session;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;

pub use crate::domain::model::{BlogPost, GenerationRequest, KeywordSet, PipelineError, Stage};
pub use crate::domain::ports::{AiClient, Clipboard, Storage};
pub use crate::utils::error::Result;
