// # route53-ddns - Route 53 dynamic DNS updater
//
// A one-shot batch job, meant to be run by cron or a systemd timer:
// resolve the public IPv4 address, then make every A record listed in the
// hosts document point at it.
//
// This binary is a THIN integration layer. It:
// 1. Parses the command line and loads the configuration
// 2. Initializes logging
// 3. Wires the HTTP IP lookup, Route 53 provider, file cache and mail
//    notifier into `r53_ddns_core::Updater`
// 4. Maps the outcome onto a process exit code
//
// All reconciliation logic lives in r53-ddns-core.
//
// ## Example
//
// ```bash
// cat /etc/route53-ddns/config.env
// EMAIL=ops@example.com
// ENABLE_EMAIL_NOTIFICATIONS=true
// AWS_PROFILE=ddns
//
// route53-ddns --config /etc/route53-ddns/config.env
// ```

mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use r53_ddns_core::engine::{RunReport, Updater};
use r53_ddns_core::notify::MailCommandNotifier;
use r53_ddns_core::state::FileIpCache;
use r53_ddns_core::{Config, LoadedConfig};
use r53_ddns_ip_http::HttpIpLookup;
use r53_ddns_route53::Route53Provider;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};

const DEFAULT_CONFIG_PATH: &str = "/etc/route53-ddns/config.env";

/// Exit codes for the batch run
///
/// - 0: Run completed (including "nothing to do" and per-record failures)
/// - 1: Configuration or hosts document error
/// - 2: Runtime precondition failed (no public IP, initialization failure)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DdnsExitCode {
    /// Run completed
    Success = 0,
    /// Configuration or hosts document error
    ConfigError = 1,
    /// Runtime precondition failed
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Point Route 53 A records at this host's public IPv4 address
#[derive(Debug, Parser)]
#[command(name = "route53-ddns", version, about)]
struct Args {
    /// Configuration override file (KEY=VALUE lines); missing means defaults
    #[arg(short, long, env = "R53_DDNS_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Read records but only log the changes that would be submitted
    #[arg(long)]
    dry_run: bool,

    /// Print the merged configuration as JSON and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Load configuration
    let loaded = match Config::load(&args.config) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let mut config = loaded.config.clone();
    if args.dry_run {
        config.dry_run = true;
    }

    if args.print_config {
        return match serde_json::to_string_pretty(&config) {
            Ok(json) => {
                println!("{}", json);
                DdnsExitCode::Success.into()
            }
            Err(e) => {
                eprintln!("Failed to render configuration: {}", e);
                DdnsExitCode::RuntimeError.into()
            }
        };
    }

    // Initialize tracing
    match logging::init(&config.logging) {
        Ok(Some(file_warning)) => warn!("{}", file_warning),
        Ok(None) => {}
        Err(e) => {
            eprintln!("Failed to set tracing subscriber: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    }

    report_config(&args, &loaded, &config);

    // Single-threaded: the run is strictly sequential
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    let code = match rt.block_on(run(&config)) {
        Ok(report) => {
            let counts = report.counts();
            if counts.failed > 0 {
                warn!("{} record(s) could not be updated", counts.failed);
            }
            DdnsExitCode::Success
        }
        Err(e) => {
            error!("Run aborted: {:#}", e);
            exit_code_for(&e)
        }
    };

    code.into()
}

fn report_config(args: &Args, loaded: &LoadedConfig, config: &Config) {
    match &loaded.source {
        Some(path) => info!("Loaded configuration from {}", path.display()),
        None => info!(
            "No configuration file at {}; using defaults",
            args.config.display()
        ),
    }

    for key in &loaded.unknown_keys {
        warn!("Ignoring unknown configuration key {}", key);
    }

    if config.dry_run {
        info!("Dry-run mode: Route 53 changes will be logged, not submitted");
    }
}

/// Run one update pass with the production implementations
async fn run(config: &Config) -> Result<RunReport> {
    let lookup =
        HttpIpLookup::new(config.ip_lookup.timeout()).context("Failed to initialize IP lookup")?;
    let provider = Route53Provider::from_config(&config.aws, config.dry_run)
        .await
        .context("Failed to initialize Route 53 client")?;

    let updater = Updater::new(
        config,
        Box::new(lookup),
        Box::new(provider),
        Box::new(FileIpCache::new(&config.paths.ip_cache_file)),
        Box::new(MailCommandNotifier::new(config.notify.mail_command.clone())),
    );

    Ok(updater.run_once().await?)
}

fn exit_code_for(error: &anyhow::Error) -> DdnsExitCode {
    match error.downcast_ref::<r53_ddns_core::Error>() {
        Some(e) if e.is_input_error() => DdnsExitCode::ConfigError,
        _ => DdnsExitCode::RuntimeError,
    }
}
