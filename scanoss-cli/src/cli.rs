//! CLI argument parsing using clap derive API
//!
//! Single-letter flags followed by exactly one target path.
//! Purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::Parser;

use scanoss_scanner::ReportFormat;

/// scanoss -- fingerprint a codebase and report open-source component matches.
///
/// Scans TARGET (a file or a directory) against the local fingerprint store.
/// Files ending in `.wfp` are read as precomputed fingerprints.
#[derive(Parser, Debug)]
#[command(name = "scanoss", about, long_about = None, disable_version_flag = true)]
pub struct Cli {
    /// Report format: plain, spdx, cyclonedx, spdx_xml.
    #[arg(short = 'f', value_name = "FORMAT")]
    pub format: Option<ReportFormat>,

    /// Only report components listed in this SBOM file.
    #[arg(short = 's', value_name = "SBOM")]
    pub sbom: Option<PathBuf>,

    /// Drop components listed in this blacklist file.
    #[arg(short = 'b', value_name = "BLACKLIST")]
    pub blacklist: Option<PathBuf>,

    /// Path to a scanoss.toml configuration file.
    #[arg(short = 'c', value_name = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Treat TARGET as a precomputed fingerprint (.wfp) file.
    #[arg(short = 'w')]
    pub force_wfp: bool,

    /// Run the built-in matcher benchmark and exit.
    #[arg(short = 't')]
    pub benchmark: bool,

    /// Print version and exit.
    #[arg(short = 'v')]
    pub version: bool,

    /// Rank candidates whose file extension matches the target first.
    #[arg(short = 'e')]
    pub match_extensions: bool,

    /// Write debug diagnostics to stderr.
    #[arg(short = 'd')]
    pub debug: bool,

    /// Diagnostics only: write debug diagnostics and suppress the report.
    #[arg(short = 'q')]
    pub quiet: bool,

    /// File or directory to scan.
    #[arg(value_name = "TARGET")]
    pub target: Option<PathBuf>,
}

impl Cli {
    /// Whether debug diagnostics were requested.
    pub fn verbose(&self) -> bool {
        self.debug || self.quiet
    }
}
