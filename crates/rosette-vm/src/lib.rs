//! Runtime for executing Rosette role programs.
//!
//! This crate provides the interpreter that runs a role program for every
//! candidate literal match, the scan-local state those programs read and
//! write, and the scan driver that owns the pre-filter callback loop.

#![allow(clippy::comparison_chain)]

pub mod engine;

// Re-export commonly used items at crate root
pub use engine::{
    DedupScope, Delayed, DynamicBitSet, EventQueue, Flow, LiteralMatch, LoggedMatch, Match,
    MatchLog, MatchPath, MatchSource, NoEngines, NoopTracer, PrintTracer, QueueEvent, QueueTable,
    ReportSink, RuntimeError, ScanConfig, ScanContext, ScanState, Scanner, ScannerBuilder,
    Stream, SubEngines, Tracer, VM, Verbosity,
};
