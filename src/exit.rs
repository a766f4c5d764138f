// src/exit.rs
//! Standardized process exit codes for `ux-enhancer`.
//!
//! Provides a stable contract for scripts and CI gates.

use std::process::Termination;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum UxExit {
    /// Every component analyzed; no gate tripped.
    Success = 0,
    /// Generic error (IO, config, worker pool).
    Error = 1,
    /// Input validation failed (missing component file, unknown dimension or state, bad trace).
    InvalidInput = 2,
    /// A component scored below `--fail-under`, or a baseline regressed.
    CheckFailed = 6,
}

impl UxExit {
    #[must_use]
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn exit(self) -> ! {
        std::process::exit(self.code())
    }
}

impl Termination for UxExit {
    fn report(self) -> std::process::ExitCode {
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        std::process::ExitCode::from(self.code() as u8)
    }
}

impl From<anyhow::Result<()>> for UxExit {
    fn from(res: anyhow::Result<()>) -> Self {
        match res {
            Ok(()) => Self::Success,
            Err(e) => {
                eprintln!("Error: {e}");
                Self::Error
            }
        }
    }
}
