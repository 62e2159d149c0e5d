pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;

pub use crate::adapters::{GeminiClient, LocalStorage};
pub use crate::config::GeneratorConfig;
pub use crate::core::{
    engine::{GenerationEngine, GenerationReport},
    session::GenerationSession,
    state::{CommandOutcome, Phase, PipelineSnapshot, PipelineState},
};
pub use crate::domain::model::{BlogPost, GenerationRequest, KeywordSet, PipelineError, Stage};
pub use crate::utils::error::{GenError, Result};
