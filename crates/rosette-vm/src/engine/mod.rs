//! Runtime engine for executing role programs.
//!
//! The scanner receives candidate literal matches, the VM runs the matching
//! program entries against scan-local state, and reports flow to a sink.

mod bitset;
mod error;
mod queue;
mod scanner;
mod sink;
mod state;
mod stream;
mod trace;
mod vm;

#[cfg(test)]
mod trace_tests;

pub use bitset::DynamicBitSet;
pub use error::RuntimeError;
pub use queue::{EventQueue, NoEngines, QueueEvent, QueueTable, SubEngines};
pub use scanner::{DedupScope, LiteralMatch, ScanConfig, Scanner, ScannerBuilder};
pub use sink::{Flow, LoggedMatch, Match, MatchLog, MatchPath, ReportSink};
pub use state::{Delayed, ScanState};
pub use stream::{ByteAt, Stream};
pub use trace::{NoopTracer, PrintTracer, Tracer, Verbosity};
pub use vm::{MatchSource, ScanContext, VM};
