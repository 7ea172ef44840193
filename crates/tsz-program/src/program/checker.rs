//! The seam between a program and the type checker that runs over it.
//!
//! Type checking is not part of this crate. A [`CheckerFactory`] attached to
//! a program creates the checker the first time semantic diagnostics are
//! requested; the checker is dropped again if a request is canceled.

use super::Program;
use crate::source_file::SourceFile;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use tsz_common::Diagnostic;

/// Returned when a cancellation token fires during a request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OperationCanceled;

impl fmt::Display for OperationCanceled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("operation was canceled")
    }
}

impl std::error::Error for OperationCanceled {}

pub trait CancellationToken {
    fn is_cancellation_requested(&self) -> bool;

    fn throw_if_cancellation_requested(&self) -> Result<(), OperationCanceled> {
        if self.is_cancellation_requested() {
            Err(OperationCanceled)
        } else {
            Ok(())
        }
    }
}

impl CancellationToken for AtomicBool {
    fn is_cancellation_requested(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

pub trait TypeChecker {
    /// Diagnostics of one file. Long-running checkers poll the token.
    fn get_diagnostics(
        &mut self,
        source_file: &SourceFile,
        cancellation_token: Option<&dyn CancellationToken>,
    ) -> Result<Vec<Diagnostic>, OperationCanceled>;

    fn get_global_diagnostics(&mut self) -> Vec<Diagnostic>;
}

pub trait CheckerFactory {
    /// Called at most once per checker lifetime. The program's checker slot
    /// is borrowed for the duration of the call, so the factory must not ask
    /// the program for semantic or global diagnostics.
    fn create_type_checker(&self, program: &Program) -> Box<dyn TypeChecker>;
}
