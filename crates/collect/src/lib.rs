//! Static file collect pass with hash-based change detection.
//!
//! The collect pass copies every static file from one or more source
//! directories into a bucket. By default a file is re-uploaded unless the
//! remote copy is at least as new as the local one. With fast collect enabled
//! the [`ChangeDetector`] compares content digests against the bucket's
//! entity tags instead, which survives deploys that reset modification times.
//!
//! # Pipeline
//!
//! 1. **Scan**: enumerate each source, honoring ignore patterns
//! 2. **Decide**: ask the detector whether the remote copy is current
//! 3. **Copy**: upload changed files (or pretend to, on a dry run)
//! 4. **Summarize**: report copied, unmodified and failed files

pub mod collector;
pub mod detector;
pub mod error;
pub mod ignore;
pub mod policy;
pub mod scanner;
pub mod types;

pub use collector::Collector;
pub use detector::ChangeDetector;
pub use error::{CollectError, ComparisonError, LocalFailure, LookupFailure};
pub use ignore::{DEFAULT_IGNORE_PATTERNS, IgnorePatterns};
pub use policy::TimestampPolicy;
pub use scanner::scan_source;
pub use types::{
    CandidateFile, CollectOptions, CollectResult, DetectorConfig, FailedCopy, StaticSource,
};
