#![doc = include_str!("../README.md")]
//!
//! # Module Structure
//!
//! - [`error`]: Domain error types (`ScannerError`)
//! - [`config`]: Scanner configuration (`ScannerConfig`, builder)
//! - [`types`]: Domain types (`ScanTarget`, `FileDigest`, `Fingerprint`, `MatchResult`, `ReportFormat`)
//! - [`walker`]: Depth-first scan target enumeration (`TargetWalker`)
//! - [`store`]: Key-value store schema and backends (`StoreSchema`, `KvStore`, `LdbStore`, `MemoryStore`)
//! - [`wfp`]: Fingerprint sources (`Winnower`, `.wfp` parser, `FingerprintSource`)
//! - [`matcher`]: Fixed-capacity match accumulator and ranking (`MatchMap`, `Matcher`)
//! - [`session`]: Per-target scan session lifecycle (`ScanSession`, `SessionResults`)
//! - [`filter`]: SBOM inclusion / blacklist exclusion (`MatchFilters`)
//! - [`report`]: Streaming report emitter (`ReportEmitter`, plain / SPDX / SPDX-XML / CycloneDX)
//! - [`scanner`]: Main orchestrator (`Scanner`, `ScanSummary`)
//! - [`benchmark`]: Built-in matcher throughput benchmark
//!
//! # Architecture
//!
//! ```text
//! root --> TargetWalker --> FingerprintSource --> ScanSession
//!                                                     |
//!                                 KvStore <-- Matcher (MatchMap)
//!                                                     |
//!                                               MatchFilters
//!                                                     |
//!                                     ReportEmitter --> writer
//! ```

pub mod benchmark;
pub mod config;
pub mod error;
pub mod filter;
pub mod matcher;
pub mod report;
pub mod scanner;
pub mod session;
pub mod store;
pub mod types;
pub mod walker;
pub mod wfp;

// --- Public API Re-exports ---

// Scanner (main orchestrator)
pub use scanner::{ScanSummary, Scanner};

// Configuration
pub use config::{ScannerConfig, ScannerConfigBuilder};

// Error
pub use error::ScannerError;

// Types
pub use types::{
    ComponentInfo, FileDigest, FileId, Fingerprint, LineRange, MatchResult, ReportFormat,
    ScanTarget,
};

// Walker
pub use walker::TargetWalker;

// Store
pub use store::{KvStore, LdbStore, MemoryStore, StoreSchema, TableDescriptor};

// Fingerprints
pub use wfp::{FingerprintMode, FingerprintSource, WfpEntry, parse_wfp};

// Matcher / session
pub use matcher::{MatchMap, Matcher};
pub use session::{ScanSession, SessionResults};

// Filters
pub use filter::{ComponentFilter, MatchFilters};

// Report
pub use report::{EmitterState, ReportEmitter};

// Benchmark
pub use benchmark::{BenchmarkParams, BenchmarkReport};
