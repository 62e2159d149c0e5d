//! Synchronous state machine gating the two generation commands.
//!
//! ```text
//! Idle ──generate_keywords──▶ KeywordsPending ──ok──▶ KeywordsReady ──generate_content──▶ ContentPending ──ok──▶ ContentReady
//!   ▲                              │ err                   ▲                                   │ err
//!   └──────────────────────────────┘                       └───────────────────────────────────┘
//! ```
//!
//! Each `begin_*` call hands out a [`Ticket`]. Completions carrying a ticket
//! that is no longer current are discarded without touching the state.

use crate::domain::model::{BlogPost, GenerationRequest, KeywordSet, PipelineError, Stage};
use crate::utils::error::{GenError, Result};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Idle,
    KeywordsPending,
    KeywordsReady,
    ContentPending,
    ContentReady,
}

/// Identifies one launched command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    stage: Stage,
    epoch: u64,
}

impl Ticket {
    pub fn stage(&self) -> Stage {
        self.stage
    }
}

/// Inputs captured when a keyword command starts.
#[derive(Debug, Clone)]
pub struct KeywordJob {
    pub ticket: Ticket,
    pub request: GenerationRequest,
}

/// Inputs captured when a content command starts.
#[derive(Debug, Clone)]
pub struct ContentJob {
    pub ticket: Ticket,
    pub request: GenerationRequest,
    pub keywords: KeywordSet,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Committed,
    Failed(PipelineError),
    /// The pipeline moved on while the call was in flight.
    Discarded,
}

/// Owned copy of everything a presentation layer renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineSnapshot {
    pub phase: Phase,
    pub request: GenerationRequest,
    pub keywords: KeywordSet,
    pub post: Option<BlogPost>,
    pub last_error: Option<PipelineError>,
    pub busy: bool,
}

#[derive(Debug, Clone)]
pub struct PipelineState {
    request: GenerationRequest,
    phase: Phase,
    keywords: KeywordSet,
    post: Option<BlogPost>,
    last_error: Option<PipelineError>,
    in_flight: Option<Ticket>,
    epoch: u64,
}

impl Default for PipelineState {
    fn default() -> Self {
        Self::new(GenerationRequest::default())
    }
}

impl PipelineState {
    pub fn new(request: GenerationRequest) -> Self {
        Self {
            request,
            phase: Phase::Idle,
            keywords: KeywordSet::default(),
            post: None,
            last_error: None,
            in_flight: None,
            epoch: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn request(&self) -> &GenerationRequest {
        &self.request
    }

    pub fn keywords(&self) -> &KeywordSet {
        &self.keywords
    }

    pub fn post(&self) -> Option<&BlogPost> {
        self.post.as_ref()
    }

    pub fn last_error(&self) -> Option<&PipelineError> {
        self.last_error.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn snapshot(&self) -> PipelineSnapshot {
        PipelineSnapshot {
            phase: self.phase,
            request: self.request.clone(),
            keywords: self.keywords.clone(),
            post: self.post.clone(),
            last_error: self.last_error.clone(),
            busy: self.is_busy(),
        }
    }

    /// Replace the request. Existing keywords and post no longer describe it,
    /// so both are dropped and any in-flight command becomes stale.
    pub fn set_request(&mut self, request: GenerationRequest) {
        self.request = request;
        self.invalidate();
    }

    /// Back to a fresh Idle session for the current request.
    pub fn reset(&mut self) {
        self.invalidate();
        self.last_error = None;
    }

    fn invalidate(&mut self) {
        if let Some(ticket) = self.in_flight.take() {
            tracing::debug!("Abandoning in-flight {} command", ticket.stage);
        }
        self.epoch += 1;
        self.keywords.clear();
        self.post = None;
        self.phase = Phase::Idle;
    }

    /// Release the slot held by a command whose future was dropped before it
    /// completed. The pending phase falls back to where the command started.
    /// Returns `false` when the ticket is no longer current.
    pub fn abandon(&mut self, ticket: Ticket) -> bool {
        if !self.is_current(&ticket) {
            return false;
        }
        self.in_flight = None;
        self.phase = match ticket.stage {
            Stage::Keywords => Phase::Idle,
            Stage::Content => Phase::KeywordsReady,
        };
        tracing::debug!("{} command dropped before completing", ticket.stage);
        true
    }

    fn launch(&mut self, stage: Stage) -> Ticket {
        self.epoch += 1;
        let ticket = Ticket {
            stage,
            epoch: self.epoch,
        };
        self.in_flight = Some(ticket);
        ticket
    }

    fn is_current(&self, ticket: &Ticket) -> bool {
        self.in_flight.as_ref() == Some(ticket)
    }

    pub fn begin_keywords(&mut self) -> Result<KeywordJob> {
        if self.in_flight.is_some() {
            return Err(GenError::CommandInFlight);
        }
        self.request.ensure_subject()?;

        // 重新產生關鍵字時，舊的文章與關鍵字一併清除
        self.last_error = None;
        self.post = None;
        self.keywords.clear();
        self.phase = Phase::KeywordsPending;

        Ok(KeywordJob {
            ticket: self.launch(Stage::Keywords),
            request: self.request.clone(),
        })
    }

    pub fn complete_keywords(
        &mut self,
        ticket: Ticket,
        result: Result<KeywordSet>,
    ) -> CommandOutcome {
        if ticket.stage != Stage::Keywords || !self.is_current(&ticket) {
            tracing::debug!("Discarding stale keyword result");
            return CommandOutcome::Discarded;
        }
        self.in_flight = None;

        match result {
            Ok(keywords) => {
                self.keywords = keywords;
                self.phase = Phase::KeywordsReady;
                CommandOutcome::Committed
            }
            Err(e) => {
                let error = PipelineError::from_error(Stage::Keywords, &e);
                self.last_error = Some(error.clone());
                self.phase = Phase::Idle;
                CommandOutcome::Failed(error)
            }
        }
    }

    pub fn begin_content(&mut self) -> Result<ContentJob> {
        if self.in_flight.is_some() {
            return Err(GenError::CommandInFlight);
        }
        let ready = matches!(self.phase, Phase::KeywordsReady | Phase::ContentReady);
        if !ready || self.keywords.is_empty() {
            return Err(GenError::invalid_input(
                "keywords must be generated before content",
            ));
        }

        self.last_error = None;
        self.post = None;
        self.phase = Phase::ContentPending;

        Ok(ContentJob {
            ticket: self.launch(Stage::Content),
            request: self.request.clone(),
            keywords: self.keywords.clone(),
        })
    }

    pub fn complete_content(&mut self, ticket: Ticket, result: Result<BlogPost>) -> CommandOutcome {
        if ticket.stage != Stage::Content || !self.is_current(&ticket) {
            tracing::debug!("Discarding stale content result");
            return CommandOutcome::Discarded;
        }
        self.in_flight = None;

        match result {
            Ok(post) => {
                self.post = Some(post);
                self.phase = Phase::ContentReady;
                CommandOutcome::Committed
            }
            Err(e) => {
                let error = PipelineError::from_error(Stage::Content, &e);
                self.last_error = Some(error.clone());
                self.phase = Phase::KeywordsReady;
                CommandOutcome::Failed(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ErrorKind;

    fn keywords() -> KeywordSet {
        KeywordSet::new(vec!["a".into(), "b".into(), "c".into(), "d".into()])
    }

    fn post() -> BlogPost {
        BlogPost {
            title: "T".into(),
            body: "P1\n\nP2".into(),
        }
    }

    fn ready_state() -> PipelineState {
        let mut state = PipelineState::new(GenerationRequest::new("Lamp"));
        let job = state.begin_keywords().unwrap();
        state.complete_keywords(job.ticket, Ok(keywords()));
        let job = state.begin_content().unwrap();
        state.complete_content(job.ticket, Ok(post()));
        state
    }

    #[test]
    fn test_happy_path_transitions() {
        let mut state = PipelineState::new(GenerationRequest::new("Lamp"));
        assert_eq!(state.phase(), Phase::Idle);

        let job = state.begin_keywords().unwrap();
        assert_eq!(state.phase(), Phase::KeywordsPending);
        assert!(state.is_busy());
        assert_eq!(job.request.subject_name, "Lamp");

        assert_eq!(
            state.complete_keywords(job.ticket, Ok(keywords())),
            CommandOutcome::Committed
        );
        assert_eq!(state.phase(), Phase::KeywordsReady);
        assert!(state.post().is_none());

        let job = state.begin_content().unwrap();
        assert_eq!(state.phase(), Phase::ContentPending);
        assert_eq!(job.keywords, keywords());

        assert_eq!(
            state.complete_content(job.ticket, Ok(post())),
            CommandOutcome::Committed
        );
        assert_eq!(state.phase(), Phase::ContentReady);
        assert_eq!(state.post(), Some(&post()));
        assert!(!state.is_busy());
    }

    #[test]
    fn test_empty_name_rejected_without_state_change() {
        let mut state = PipelineState::new(GenerationRequest::new(""));
        let before = state.snapshot();

        let err = state.begin_keywords().unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(state.snapshot(), before);
    }

    #[test]
    fn test_content_requires_keywords() {
        let mut state = PipelineState::new(GenerationRequest::new("Lamp"));
        let err = state.begin_content().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(state.phase(), Phase::Idle);

        // 模型回傳空陣列時同樣不能進入內容階段
        let job = state.begin_keywords().unwrap();
        state.complete_keywords(job.ticket, Ok(KeywordSet::default()));
        assert!(state.begin_content().is_err());
    }

    #[test]
    fn test_keyword_failure_returns_to_idle_with_error() {
        let mut state = PipelineState::new(GenerationRequest::new("Lamp"));
        let job = state.begin_keywords().unwrap();

        let outcome = state.complete_keywords(
            job.ticket,
            Err(GenError::ApiRejected {
                status: 429,
                message: "rate limited".into(),
            }),
        );

        assert_eq!(state.phase(), Phase::Idle);
        let error = state.last_error().unwrap();
        assert_eq!(error.stage, Stage::Keywords);
        assert_eq!(error.message, "rate limited");
        assert_eq!(outcome, CommandOutcome::Failed(error.clone()));
    }

    #[test]
    fn test_content_failure_keeps_keywords() {
        let mut state = PipelineState::new(GenerationRequest::new("Lamp"));
        let job = state.begin_keywords().unwrap();
        state.complete_keywords(job.ticket, Ok(keywords()));
        let job = state.begin_content().unwrap();

        state.complete_content(job.ticket, Err(GenError::SafetyBlocked));

        assert_eq!(state.phase(), Phase::KeywordsReady);
        assert_eq!(state.keywords(), &keywords());
        assert_eq!(state.last_error().unwrap().stage, Stage::Content);
        assert_eq!(state.last_error().unwrap().kind, ErrorKind::SafetyBlocked);
    }

    #[test]
    fn test_new_attempt_clears_previous_error() {
        let mut state = PipelineState::new(GenerationRequest::new("Lamp"));
        let job = state.begin_keywords().unwrap();
        state.complete_keywords(job.ticket, Err(GenError::EmptyResponse));
        assert!(state.last_error().is_some());

        state.begin_keywords().unwrap();
        assert!(state.last_error().is_none());
    }

    #[test]
    fn test_regenerating_keywords_clears_post_immediately() {
        let mut state = ready_state();

        state.begin_keywords().unwrap();

        assert_eq!(state.phase(), Phase::KeywordsPending);
        assert!(state.post().is_none());
        assert!(state.keywords().is_empty());
    }

    #[test]
    fn test_content_regeneration_from_content_ready() {
        let mut state = ready_state();

        state.begin_content().unwrap();

        assert_eq!(state.phase(), Phase::ContentPending);
        assert!(state.post().is_none());
        assert_eq!(state.keywords(), &keywords());
    }

    #[test]
    fn test_second_command_rejected_while_pending() {
        let mut state = PipelineState::new(GenerationRequest::new("Lamp"));
        state.begin_keywords().unwrap();

        assert!(matches!(
            state.begin_keywords(),
            Err(GenError::CommandInFlight)
        ));
        assert!(matches!(
            state.begin_content(),
            Err(GenError::CommandInFlight)
        ));
        assert_eq!(state.phase(), Phase::KeywordsPending);
    }

    #[test]
    fn test_stale_completion_discarded_after_request_change() {
        let mut state = PipelineState::new(GenerationRequest::new("Lamp"));
        let job = state.begin_keywords().unwrap();

        state.set_request(GenerationRequest::new("Chair"));
        let outcome = state.complete_keywords(job.ticket, Ok(keywords()));

        assert_eq!(outcome, CommandOutcome::Discarded);
        assert_eq!(state.phase(), Phase::Idle);
        assert!(state.keywords().is_empty());
        assert!(!state.is_busy());
    }

    #[test]
    fn test_ticket_from_earlier_command_cannot_commit() {
        let mut state = PipelineState::new(GenerationRequest::new("Lamp"));
        let first = state.begin_keywords().unwrap();
        state.complete_keywords(first.ticket, Ok(keywords()));

        let second = state.begin_keywords().unwrap();
        assert_eq!(
            state.complete_keywords(first.ticket, Ok(KeywordSet::default())),
            CommandOutcome::Discarded
        );
        assert_eq!(state.phase(), Phase::KeywordsPending);

        state.complete_keywords(second.ticket, Ok(keywords()));
        assert_eq!(state.phase(), Phase::KeywordsReady);
    }

    #[test]
    fn test_abandon_frees_slot_and_restores_phase() {
        let mut state = PipelineState::new(GenerationRequest::new("Lamp"));
        let job = state.begin_keywords().unwrap();

        assert!(state.abandon(job.ticket));
        assert_eq!(state.phase(), Phase::Idle);
        assert!(!state.is_busy());
        // 放棄後遲到的結果不能再提交
        assert_eq!(
            state.complete_keywords(job.ticket, Ok(keywords())),
            CommandOutcome::Discarded
        );

        let job = state.begin_keywords().unwrap();
        state.complete_keywords(job.ticket, Ok(keywords()));
        let job = state.begin_content().unwrap();
        assert!(state.abandon(job.ticket));
        assert_eq!(state.phase(), Phase::KeywordsReady);
        assert_eq!(state.keywords(), &keywords());
        assert!(state.begin_content().is_ok());
    }

    #[test]
    fn test_abandon_ignores_stale_ticket() {
        let mut state = PipelineState::new(GenerationRequest::new("Lamp"));
        let first = state.begin_keywords().unwrap();
        state.complete_keywords(first.ticket, Ok(keywords()));
        state.begin_content().unwrap();

        assert!(!state.abandon(first.ticket));
        assert_eq!(state.phase(), Phase::ContentPending);
        assert!(state.is_busy());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut state = ready_state();
        state.reset();

        let snapshot = state.snapshot();
        assert_eq!(snapshot.phase, Phase::Idle);
        assert!(snapshot.keywords.is_empty());
        assert!(snapshot.post.is_none());
        assert!(snapshot.last_error.is_none());
        assert_eq!(snapshot.request.subject_name, "Lamp");
    }
}
