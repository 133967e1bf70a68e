//! Exit codes for failed commands
//!
//! Timeouts and cancellation leave the remote operation in an unknown state,
//! so they get their own codes.

use std::process::ExitCode;

use stratus_core::{ErrorKind, WaitError};

pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_TIMEOUT: u8 = 124;
pub const EXIT_CANCELLED: u8 = 130;

pub(crate) fn code_for(report: &eyre::Report) -> u8 {
    match report.downcast_ref::<WaitError>().map(WaitError::kind) {
        Some(ErrorKind::DeadlineExceeded) => EXIT_TIMEOUT,
        Some(ErrorKind::Cancelled) => EXIT_CANCELLED,
        _ => EXIT_FAILURE,
    }
}

#[must_use]
pub fn exit_code(report: &eyre::Report) -> ExitCode {
    ExitCode::from(code_for(report))
}
