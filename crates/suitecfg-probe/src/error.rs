//! Probe errors.
//!
//! A capability that is merely absent is never an error: probes report it as
//! `Ok(false)` or a missing map key. These variants cover tooling that did not
//! behave the way probing assumes.

/// Error raised while running or interpreting a probe.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("command `{command}` exited with status {status}")]
    CommandFailed { command: String, status: i32 },

    #[error("expected a `#define` line in compiler macro dump, got `{line}`")]
    MalformedMacroLine { line: String },

    #[error("expanding {expected} command(s) produced {got}")]
    Expansion { expected: usize, got: usize },

    #[error("feature-test macro {name} has non-integer value `{value}`")]
    InvalidMacroValue { name: String, value: String },
}

pub type Result<T, E = ProbeError> = std::result::Result<T, E>;
