//! scanoss -- command-line entry point
//!
//! Loads configuration (defaults, optional `-c` file, `SCANOSS_*` env),
//! applies the command-line flags on top, and runs one scan whose report
//! is streamed to stdout.

mod cli;
mod error;
mod logging;

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use clap::Parser;

use scanoss_core::config::ScanossConfig;
use scanoss_scanner::benchmark::{self, BenchmarkParams};
use scanoss_scanner::{LdbStore, Scanner, ScannerConfig, ScannerConfigBuilder};

use cli::Cli;
use error::CliError;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.version {
        println!("scanoss-{}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let core = match &cli.config {
        Some(path) => ScanossConfig::load(path)?,
        None => ScanossConfig::from_env()?,
    };

    logging::init_tracing(&core.general, cli.verbose())
        .map_err(|e| CliError::Config(e.to_string()))?;
    scanoss_core::metrics::describe_all();

    let config = scanner_config(&cli, &core)?;
    tracing::debug!(
        store = %config.store_root.display(),
        format = %config.format,
        max_targets = config.max_targets,
        "configuration loaded"
    );

    if cli.benchmark {
        let report = benchmark::run(&config, &BenchmarkParams::default())?;
        println!("{report}");
        return Ok(());
    }

    let Some(target) = cli.target.as_deref() else {
        return Err(CliError::Usage("Missing parameters. Please use -h".to_owned()));
    };

    let store = LdbStore::new(&config.store_root);
    let scanner = Scanner::new(&config, &store)?;

    let summary = if cli.quiet || core.report.quiet {
        scanner.run(target, io::sink())?.0
    } else {
        let stdout = io::stdout();
        let (summary, mut out) = scanner.run(target, BufWriter::new(stdout.lock()))?;
        out.flush()?;
        summary
    };

    tracing::info!(
        sessions = summary.sessions,
        failed = summary.targets_failed,
        matches = summary.matches,
        "scan finished"
    );
    Ok(())
}

/// core 설정에 명령줄 플래그를 덮어써 스캐너 설정을 만듭니다.
fn scanner_config(cli: &Cli, core: &ScanossConfig) -> Result<ScannerConfig, CliError> {
    let mut builder = ScannerConfigBuilder::from_config(ScannerConfig::from_core(core)?);
    if let Some(format) = cli.format {
        builder = builder.format(format);
    }
    if let Some(sbom) = &cli.sbom {
        builder = builder.sbom(sbom);
    }
    if let Some(blacklist) = &cli.blacklist {
        builder = builder.blacklist(blacklist);
    }
    if cli.force_wfp {
        builder = builder.force_wfp(true);
    }
    if cli.match_extensions {
        builder = builder.match_extensions(true);
    }
    Ok(builder.build()?)
}
