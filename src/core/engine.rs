use crate::core::session::GenerationSession;
use crate::core::state::CommandOutcome;
use crate::domain::model::{BlogPost, KeywordSet};
use crate::domain::ports::AiClient;
use crate::utils::error::{GenError, Result};
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub keywords: KeywordSet,
    pub post: BlogPost,
}

/// Runs keywords then content to completion, for non-interactive callers.
pub struct GenerationEngine<C: AiClient> {
    session: GenerationSession<C>,
}

impl<C: AiClient> GenerationEngine<C> {
    pub fn new(session: GenerationSession<C>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &GenerationSession<C> {
        &self.session
    }

    pub async fn run(&self) -> Result<GenerationReport> {
        tracing::info!("🚀 Starting generation");

        let started = Instant::now();
        ensure_committed(self.session.generate_keywords().await?)?;
        tracing::info!("🔑 Keywords ready in {:?}", started.elapsed());

        let started = Instant::now();
        ensure_committed(self.session.generate_content().await?)?;
        tracing::info!("📝 Post ready in {:?}", started.elapsed());

        let snapshot = self.session.snapshot().await;
        let post = snapshot.post.ok_or(GenError::Superseded)?;

        Ok(GenerationReport {
            keywords: snapshot.keywords,
            post,
        })
    }
}

fn ensure_committed(outcome: CommandOutcome) -> Result<()> {
    match outcome {
        CommandOutcome::Committed => Ok(()),
        CommandOutcome::Failed(error) => Err(GenError::StageFailed(error)),
        CommandOutcome::Discarded => Err(GenError::Superseded),
    }
}
