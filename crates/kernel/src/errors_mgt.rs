//! Handling of errors returned by scheduled tasks.
//!
//! Tasks run from the timer interrupt, so nobody is there to receive their errors. Each error
//! is passed to the [`ErrorsManager`] owned by the task table, which logs it and keeps track of
//! the worst severity seen so far.
//!
//! # Behavior per severity
//! - **Fatal**: recorded, then the system panics. Only tasks raise it, through
//!   [`KernelError::TaskError`].
//! - **Critical** and **Error**: recorded and logged, dispatch continues with the next task.

use crate::KernelErrorLevel::{Critical, Error, Fatal};
use crate::{KernelError, KernelErrorLevel, error};

#[derive(Debug, Default)]
pub struct ErrorsManager {
    /// Highest-severity error observed so far (if any).
    has_error: Option<KernelErrorLevel>,
    /// Number of errors handled.
    error_count: u32,
}

impl ErrorsManager {
    pub const fn new() -> ErrorsManager {
        ErrorsManager {
            has_error: None,
            error_count: 0,
        }
    }

    /// Handle a `KernelError` by severity.
    ///
    /// Does not return for `Fatal` errors.
    pub fn error_handler(&mut self, p_err: &KernelError) {
        self.error_count = self.error_count.saturating_add(1);
        let l_level = p_err.severity();
        if self.has_error.is_none_or(|l_worst| l_level > l_worst) {
            self.has_error = Some(l_level);
        }

        match l_level {
            Fatal => panic!("{}", p_err.to_string()),
            Critical | Error => {
                error!("{}", p_err.to_string().as_str());
            }
        }
    }

    /// Highest severity handled so far, `None` if no error occurred.
    pub fn highest_severity(&self) -> Option<KernelErrorLevel> {
        self.has_error
    }

    pub fn error_count(&self) -> u32 {
        self.error_count
    }
}
