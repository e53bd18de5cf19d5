//! GAIA Validator Core Library
//!
//! Answer classification and the interactive validation session, plus
//! configuration and tracing setup shared by the binaries.

pub mod catalog;
pub mod classifier;
pub mod config;
pub mod domain;
pub mod invoker;
pub mod obs;
pub mod session;
pub mod telemetry;

pub use catalog::{available_extensions, available_levels, filter_items, find_item, ItemFilter};
pub use classifier::{classify, normalize, MatchPolicy, Verdict};
pub use config::ValidationConfig;
pub use domain::{Attempt, ClassifyError, ConfigError, InvocationError, Outcome, SessionError};
pub use invoker::{InvocationRequest, ModelInvoker, ModelReply};
pub use obs::{
    emit_artifact_persist_failed, emit_attempt_classified, emit_attempt_invoked,
    emit_awaiting_edit, emit_result_persist_failed, emit_result_persisted, emit_session_resolved,
    emit_session_submitted, session_span,
};
pub use session::{
    load_session, Resolution, SaveStatus, SessionDeps, SessionState, SessionStep,
    ValidationSession,
};
pub use telemetry::init_tracing;

pub use gaiaval_state::{BenchmarkItem, ResponseCategory, ResultRecord};
