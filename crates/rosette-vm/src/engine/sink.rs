//! Report sink: where user-visible matches go.

use rosette_bytecode::ReportId;
use serde::Serialize;

/// A match handed to the report sink.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub struct Match {
    pub report: ReportId,
    /// Absolute exclusive end offset.
    pub end: u64,
    /// Start of match, when one was established.
    pub som: Option<u64>,
}

/// Sink verdict after a report.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Flow {
    #[default]
    Continue,
    Halt,
}

/// Receiver of matches.
///
/// Returning [`Flow::Halt`] stops the current program and every later
/// callback of the scan.
pub trait ReportSink {
    /// Ordinary report.
    fn report(&mut self, m: Match) -> Flow;

    /// Report destined for a downstream aggregator.
    fn report_chain(&mut self, m: Match) -> Flow {
        self.report(m)
    }

    /// Report flushed at end of data.
    fn report_eod(&mut self, m: Match) -> Flow {
        self.report(m)
    }
}

/// Which sink method delivered a match.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPath {
    Direct,
    Chain,
    Eod,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub struct LoggedMatch {
    pub path: MatchPath,
    #[serde(flatten)]
    pub m: Match,
}

/// Sink that records every match, optionally halting after a fixed count.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(transparent)]
pub struct MatchLog {
    entries: Vec<LoggedMatch>,
    #[serde(skip)]
    halt_after: Option<usize>,
}

impl MatchLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Halt the scan once `count` matches have been logged.
    pub fn halt_after(mut self, count: usize) -> Self {
        self.halt_after = Some(count);
        self
    }

    pub fn entries(&self) -> &[LoggedMatch] {
        &self.entries
    }

    /// Matches in arrival order, without their paths.
    pub fn matches(&self) -> Vec<Match> {
        self.entries.iter().map(|e| e.m).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, path: MatchPath, m: Match) -> Flow {
        self.entries.push(LoggedMatch { path, m });
        match self.halt_after {
            Some(limit) if self.entries.len() >= limit => Flow::Halt,
            _ => Flow::Continue,
        }
    }
}

impl ReportSink for MatchLog {
    fn report(&mut self, m: Match) -> Flow {
        self.push(MatchPath::Direct, m)
    }

    fn report_chain(&mut self, m: Match) -> Flow {
        self.push(MatchPath::Chain, m)
    }

    fn report_eod(&mut self, m: Match) -> Flow {
        self.push(MatchPath::Eod, m)
    }
}
