//! Errors that can occur while scanning.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
    /// The report sink asked the scan to stop.
    #[error("scan halted by report sink")]
    Halted,

    /// The pre-filter reported a literal the program has no entry for.
    #[error("unknown literal id {0}")]
    UnknownLiteral(u32),

    /// A match arrived after the scan was finished.
    #[error("scan already finished")]
    Finished,
}
