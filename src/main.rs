//! solc-check CLI
//!
//! Entry point for the `solc-check` command-line tool.

use clap::Parser;
use solc_check::{run_check, CheckError, ConfigFile, EffectiveConfig};
use solc_version::Version;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "solc-check")]
#[command(about = "Check which contracts compile with the local solc binaries", version)]
struct Cli {
    /// Directory contract paths are resolved against (default: current directory)
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Manifest file (default: <root>/main.json)
    #[arg(long, short = 'm')]
    manifest: Option<PathBuf>,

    /// Directory scanned for solc binaries (default: <root>)
    #[arg(long)]
    compilers_dir: Option<PathBuf>,

    /// Report file (default: <root>/compile_check_result.json)
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Per-compile timeout in seconds (default: 10)
    #[arg(long)]
    timeout: Option<u64>,

    /// Version assumed for a bare `solc` binary (default: 0.8.19)
    #[arg(long)]
    default_version: Option<Version>,

    /// Path to config file (default: <root>/solc-check.toml if present)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Print the report JSON instead of progress and summary
    #[arg(long)]
    json: bool,

    /// Log each compiler attempt to stderr
    #[arg(long, short = 'v')]
    verbose: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigFile {
        ConfigFile {
            manifest: self.manifest.clone(),
            output: self.output.clone(),
            compilers_dir: self.compilers_dir.clone(),
            timeout_seconds: self.timeout,
            default_version: self.default_version.clone(),
            ..Default::default()
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match EffectiveConfig::build(&cli.root, cli.config.as_deref(), cli.overrides()) {
        Ok(c) => c,
        Err(e) => fail(CheckError::Config(e)),
    };
    tracing::debug!(sources = ?config.sources, "configuration resolved");

    if cli.json {
        match run_check(&config, &mut io::sink()) {
            Ok(run) => match run.report.to_json() {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("Error serializing output: {}", e);
                    process::exit(1);
                }
            },
            Err(e) => fail(e),
        }
        return;
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = run_check(&config, &mut out) {
        let _ = out.flush();
        fail(e);
    }
}

fn fail(err: CheckError) -> ! {
    eprintln!("❌ {}", err);
    process::exit(err.exit_code());
}
