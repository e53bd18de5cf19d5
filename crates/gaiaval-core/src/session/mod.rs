//! Interactive validation of one benchmark item.
//!
//! A [`ValidationSession`] owns the per-item state for one user: the
//! attempts made so far, whether any of them missed, and the terminal
//! resolution. Each operation takes `&mut self`, so a second invocation
//! can never start while one is outstanding.

mod state;

pub use state::SessionState;

use std::sync::Arc;

use chrono::Utc;
use gaiaval_state::{
    ArtifactStore, BenchmarkItem, ItemCatalog, ResultLedger, ResultRecord, StorageError,
};
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

use crate::classifier::{self, Verdict};
use crate::config::ValidationConfig;
use crate::domain::{Attempt, InvocationError, Outcome, SessionError};
use crate::invoker::{InvocationRequest, ModelInvoker};
use crate::obs;

/// Collaborators a session talks to.
#[derive(Clone)]
pub struct SessionDeps {
    pub invoker: Arc<dyn ModelInvoker>,
    pub ledger: Arc<dyn ResultLedger>,
    pub artifacts: Arc<dyn ArtifactStore>,
}

/// Whether a terminal result reached the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    Saved,
    NotSaved { reason: String },
}

impl SaveStatus {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveStatus::Saved)
    }
}

/// Terminal outcome of a session, with the record written for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub outcome: Outcome,
    /// The attempt that produced the outcome.
    pub attempt: Attempt,
    pub record: ResultRecord,
    pub save: SaveStatus,
}

/// What the caller should do next.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionStep {
    /// The attempt missed and a retry with edited steps is allowed.
    AwaitingEdit { attempt: Attempt },
    Resolved(Resolution),
}

pub struct ValidationSession {
    session_id: String,
    item: BenchmarkItem,
    model: String,
    config: ValidationConfig,
    deps: SessionDeps,
    state: SessionState,
    attempts: Vec<Attempt>,
    had_prior_non_match: bool,
    resolution: Option<Resolution>,
}

impl ValidationSession {
    pub fn new(
        item: BenchmarkItem,
        model: impl Into<String>,
        config: ValidationConfig,
        deps: SessionDeps,
    ) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            item,
            model: model.into(),
            config,
            deps,
            state: SessionState::Idle,
            attempts: Vec::new(),
            had_prior_non_match: false,
            resolution: None,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn item(&self) -> &BenchmarkItem {
        &self.item
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn attempts(&self) -> &[Attempt] {
        &self.attempts
    }

    pub fn resolution(&self) -> Option<&Resolution> {
        self.resolution.as_ref()
    }

    /// Edited-steps retries still available.
    pub fn retries_left(&self) -> u32 {
        let used = self.attempts.len().saturating_sub(1) as u32;
        self.config.max_retries.saturating_sub(used)
    }

    /// Ask the model the plain question.
    pub async fn submit(&mut self) -> Result<SessionStep, SessionError> {
        self.ensure_state(SessionState::Idle, "submit")?;
        classifier::check_predefined(&self.item.final_answer)?;

        obs::emit_session_submitted(&self.session_id, &self.item.task_id, &self.model);
        let span = obs::session_span(&self.session_id, &self.item.task_id);
        self.run_attempt(Vec::new(), false).instrument(span).await
    }

    /// Retry with user-edited validation steps.
    pub async fn submit_edited_steps(
        &mut self,
        steps: Vec<String>,
    ) -> Result<SessionStep, SessionError> {
        self.ensure_state(SessionState::AwaitingEdit, "submit edited steps")?;

        let span = obs::session_span(&self.session_id, &self.item.task_id);
        self.run_attempt(steps, true).instrument(span).await
    }

    /// The user chose not to edit: the last miss becomes a wrong answer.
    pub async fn decline_edit(&mut self) -> Result<Resolution, SessionError> {
        self.ensure_state(SessionState::AwaitingEdit, "decline edit")?;
        let attempt = self
            .attempts
            .last()
            .cloned()
            .ok_or(SessionError::InvalidTransition {
                from: self.state,
                action: "decline edit",
            })?;

        let span = obs::session_span(&self.session_id, &self.item.task_id);
        Ok(self
            .resolve(Outcome::WrongAnswer, attempt)
            .instrument(span)
            .await)
    }

    /// Write a resolved-but-unsaved record again.
    pub async fn retry_persist(&mut self) -> Result<Resolution, SessionError> {
        let record = match &self.resolution {
            Some(resolution) if !resolution.save.is_saved() => resolution.record.clone(),
            _ => return Err(SessionError::NothingToPersist),
        };

        let save = self.persist(&record).await;
        let resolution = self
            .resolution
            .as_mut()
            .ok_or(SessionError::NothingToPersist)?;
        resolution.save = save;
        Ok(resolution.clone())
    }

    /// Start over on the same item under a fresh session id.
    pub fn reset(&mut self) {
        let previous = std::mem::replace(&mut self.session_id, Uuid::new_v4().to_string());
        info!(
            previous_session = %previous,
            session_id = %self.session_id,
            item_id = %self.item.task_id,
            "session reset"
        );
        self.state = SessionState::Idle;
        self.attempts.clear();
        self.had_prior_non_match = false;
        self.resolution = None;
    }

    fn ensure_state(&self, expected: SessionState, action: &'static str) -> Result<(), SessionError> {
        if self.state == expected {
            return Ok(());
        }
        if self.state.is_terminal() {
            return Err(SessionError::AlreadyResolved {
                task_id: self.item.task_id.clone(),
            });
        }
        Err(SessionError::InvalidTransition {
            from: self.state,
            action,
        })
    }

    async fn run_attempt(
        &mut self,
        steps: Vec<String>,
        edited: bool,
    ) -> Result<SessionStep, SessionError> {
        debug_assert!(self.state.can_invoke());
        let resume_state = self.state;
        let number = self.attempts.len() as u32 + 1;
        let mut attempt = Attempt::new(number, steps, edited);

        self.state = SessionState::Invoking;
        obs::emit_attempt_invoked(&self.session_id, number, edited, attempt.steps.len());

        let request = InvocationRequest {
            task_id: self.item.task_id.clone(),
            question: self.item.question.clone(),
            steps: attempt.steps.clone(),
            model: self.model.clone(),
        };
        let invocation = self.deps.invoker.invoke(&request);
        let result = match tokio::time::timeout(self.config.invocation_timeout(), invocation).await
        {
            Ok(result) => result,
            Err(_) => Err(InvocationError::Timeout {
                secs: self.config.invocation_timeout_secs,
            }),
        };

        let reply = match result {
            Ok(reply) => reply,
            Err(err) => {
                warn!(attempt = number, error = %err, "model invocation failed");
                self.attempts.push(attempt.clone());
                let log = format!(
                    "task: {}\nattempt: {}\nmodel: {}\nerror: {}\n",
                    request.task_id, number, request.model, err
                );
                self.store_artifact(number, log.as_bytes()).await;
                let outcome = Outcome::Errored {
                    reason: err.to_string(),
                };
                return Ok(SessionStep::Resolved(self.resolve(outcome, attempt).await));
            }
        };

        attempt.answer = Some(reply.answer.clone());
        self.attempts.push(attempt.clone());
        self.store_artifact(number, reply.transcript.as_bytes()).await;

        self.state = SessionState::Classifying;
        let verdict = match classifier::classify(
            &reply.answer,
            &self.item.final_answer,
            edited,
            self.had_prior_non_match,
            self.config.match_policy(),
        ) {
            Ok(verdict) => verdict,
            Err(err) => {
                self.state = resume_state;
                return Err(err.into());
            }
        };
        obs::emit_attempt_classified(&self.session_id, number, verdict.as_str());

        let outcome = match verdict {
            Verdict::CorrectAsIs => Outcome::CorrectAsIs,
            Verdict::CorrectAfterSteps => Outcome::CorrectAfterSteps,
            Verdict::NoMatch => {
                self.had_prior_non_match = true;
                let retries_left = self.retries_left();
                if retries_left > 0 {
                    self.state = SessionState::AwaitingEdit;
                    obs::emit_awaiting_edit(&self.session_id, number, retries_left);
                    return Ok(SessionStep::AwaitingEdit { attempt });
                }
                Outcome::WrongAnswer
            }
        };

        Ok(SessionStep::Resolved(self.resolve(outcome, attempt).await))
    }

    async fn resolve(&mut self, outcome: Outcome, attempt: Attempt) -> Resolution {
        let error = match &outcome {
            Outcome::Errored { reason } => Some(reason.clone()),
            _ => None,
        };
        let record = ResultRecord {
            session_id: self.session_id.clone(),
            task_id: self.item.task_id.clone(),
            attempt_number: attempt.number,
            model: self.model.clone(),
            answer: attempt.answer.clone().unwrap_or_default(),
            category: outcome.category(),
            error,
            recorded_at: Utc::now(),
        };

        self.state = SessionState::Resolved;
        obs::emit_session_resolved(
            &self.session_id,
            &self.item.task_id,
            attempt.number,
            record.category.as_str(),
        );

        let save = self.persist(&record).await;
        let resolution = Resolution {
            outcome,
            attempt,
            record,
            save,
        };
        self.resolution = Some(resolution.clone());
        resolution
    }

    async fn persist(&self, record: &ResultRecord) -> SaveStatus {
        match self.deps.ledger.append(record).await {
            Ok(()) => {
                obs::emit_result_persisted(&self.session_id, &record.task_id, record.attempt_number);
                SaveStatus::Saved
            }
            // An earlier write landed even though it reported failure.
            Err(StorageError::DuplicateRecord { .. }) => {
                debug!(attempt = record.attempt_number, "result already in ledger");
                SaveStatus::Saved
            }
            Err(err) => {
                obs::emit_result_persist_failed(&self.session_id, &record.task_id, &err);
                SaveStatus::NotSaved {
                    reason: err.to_string(),
                }
            }
        }
    }

    async fn store_artifact(&self, attempt_number: u32, blob: &[u8]) {
        match self
            .deps
            .artifacts
            .append_artifact(&self.item.task_id, attempt_number, blob)
            .await
        {
            Ok(artifact) => debug!(
                attempt = attempt_number,
                digest = %artifact.digest.short(),
                "stored attempt transcript"
            ),
            Err(err) => obs::emit_artifact_persist_failed(&self.item.task_id, attempt_number, &err),
        }
    }
}

/// Look up `task_id` in `catalog` and open a session on it.
pub async fn load_session(
    catalog: &dyn ItemCatalog,
    task_id: &str,
    model: impl Into<String>,
    config: ValidationConfig,
    deps: SessionDeps,
) -> Result<ValidationSession, SessionError> {
    let items = catalog.load_items().await.map_err(|err| match err {
        StorageError::DataUnavailable(msg) => SessionError::DataUnavailable(msg),
        other => SessionError::DataUnavailable(other.to_string()),
    })?;

    let item = items
        .into_iter()
        .find(|item| item.task_id == task_id)
        .ok_or_else(|| SessionError::ItemNotFound {
            task_id: task_id.to_string(),
        })?;

    Ok(ValidationSession::new(item, model, config, deps))
}
