//! Domain models for the validation workflow.
//!
//! - `Attempt`: one model invocation for an item
//! - `Outcome`: terminal classification of an item
//! - error taxonomy shared by the classifier, invoker and session

pub mod attempt;
pub mod error;

pub use attempt::{Attempt, Outcome};
pub use error::{ClassifyError, ConfigError, InvocationError, SessionError};
