use crate::config::toml_config::GeneratorConfig;
use crate::core::content::ContentGenerator;
use crate::core::keywords::KeywordGenerator;
use crate::core::state::{CommandOutcome, PipelineSnapshot, PipelineState, Ticket};
use crate::domain::model::GenerationRequest;
use crate::domain::ports::AiClient;
use crate::utils::error::Result;
use std::sync::{Arc, Mutex, MutexGuard};

/// One workflow session: owns the pipeline state and the two generators.
///
/// Commands take `&self`, so a caller may issue a second command while the
/// first is awaiting the network; the state machine rejects it. The lock is
/// never held across a network call, so a plain `std::sync::Mutex` suffices.
/// Dropping a command future mid-call releases its slot.
pub struct GenerationSession<C: AiClient> {
    keywords: KeywordGenerator<C>,
    content: ContentGenerator<C>,
    state: Mutex<PipelineState>,
}

impl<C: AiClient> GenerationSession<C> {
    pub fn new(client: Arc<C>, request: GenerationRequest) -> Self {
        Self {
            keywords: KeywordGenerator::new(client.clone()),
            content: ContentGenerator::new(client),
            state: Mutex::new(PipelineState::new(request)),
        }
    }

    pub fn with_config(client: Arc<C>, request: GenerationRequest, config: &GeneratorConfig) -> Self {
        Self {
            keywords: KeywordGenerator::new(client.clone())
                .with_strict_count(config.generation.strict_keyword_count),
            content: ContentGenerator::new(client)
                .with_word_range(config.generation.min_words, config.generation.max_words),
            state: Mutex::new(PipelineState::new(request)),
        }
    }

    pub async fn set_request(&self, request: GenerationRequest) {
        lock_state(&self.state).set_request(request);
    }

    pub async fn reset(&self) {
        lock_state(&self.state).reset();
    }

    pub async fn snapshot(&self) -> PipelineSnapshot {
        lock_state(&self.state).snapshot()
    }

    /// `Err` only for synchronous rejections (invalid input, command in flight);
    /// attempt failures are stored in the state and reported as `Failed`.
    pub async fn generate_keywords(&self) -> Result<CommandOutcome> {
        let job = lock_state(&self.state).begin_keywords()?;
        tracing::info!("Generating keywords for '{}'", job.request.subject_name);

        let guard = InFlightGuard::new(&self.state, job.ticket);
        let result = self.keywords.generate(&job.request).await;
        guard.disarm();

        let outcome = lock_state(&self.state).complete_keywords(job.ticket, result);
        log_outcome(&outcome);
        Ok(outcome)
    }

    pub async fn generate_content(&self) -> Result<CommandOutcome> {
        let job = lock_state(&self.state).begin_content()?;
        tracing::info!(
            "Generating content for '{}' with {} keywords",
            job.request.subject_name,
            job.keywords.len()
        );

        let guard = InFlightGuard::new(&self.state, job.ticket);
        let result = self.content.generate(&job.request, &job.keywords).await;
        guard.disarm();

        let outcome = lock_state(&self.state).complete_content(job.ticket, result);
        log_outcome(&outcome);
        Ok(outcome)
    }
}

// 狀態轉換都是同步的，鎖中毒時狀態仍一致
fn lock_state(state: &Mutex<PipelineState>) -> MutexGuard<'_, PipelineState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Abandons the ticket if the command future is dropped before it completes.
struct InFlightGuard<'a> {
    state: &'a Mutex<PipelineState>,
    ticket: Option<Ticket>,
}

impl<'a> InFlightGuard<'a> {
    fn new(state: &'a Mutex<PipelineState>, ticket: Ticket) -> Self {
        Self {
            state,
            ticket: Some(ticket),
        }
    }

    fn disarm(mut self) {
        self.ticket = None;
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            lock_state(self.state).abandon(ticket);
        }
    }
}

fn log_outcome(outcome: &CommandOutcome) {
    match outcome {
        CommandOutcome::Committed => {}
        CommandOutcome::Failed(error) => tracing::warn!("{}", error),
        CommandOutcome::Discarded => tracing::info!("Result discarded; the session moved on"),
    }
}
