//! Notice pipeline.
//!
//! - [`parse`] - HTML fragment → [`Notice`](crate::Notice) records
//! - [`ingest`] - Fetch → parse → persist, with soft storage failures
//! - [`diagnose`] - Probe reports for fetches that yield nothing

pub mod diagnose;
pub mod ingest;
pub mod parse;

pub use diagnose::{
    detect_login_like, probe_parse, run_probe, snippet, AttemptReport, FailedAttempt,
    LoginDetection, ProbeAttempt, ProbeMethods, ProbeOptions, ProbeParse, ProbeReport,
    DEFAULT_SNIPPET_CHARS, LOGIN_KEYWORDS, SNIPPET_NOTE,
};
pub use ingest::{fetch_notices, ingest, persist_notices, IngestOutcome, PersistOutcome};

#[cfg(feature = "sqlite")]
pub use ingest::{ingest_into, persist_at};
pub use parse::{parse_notices, parse_notices_at, NoticeParser};
