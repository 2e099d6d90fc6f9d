//! wg-provision - main entry point.

use anyhow::Context;
use clap::Parser;
use provider_client::{ProviderClient, ServerDirectory};
use secrecy::SecretString;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use wg_provision::cli::{Cli, Mode};
use wg_provision::config::Settings;
use wg_provision::error::{AppError, AppResult};
use wg_provision::probe::Prober;
use wg_provision::run::Provisioner;
use wg_provision::select::SelectionMode;

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    // Load the environment layer; flags override it below.
    let settings = Settings::load().context("Failed to load configuration")?;

    let level = if cli.verbose {
        "debug"
    } else {
        &settings.log.level
    };
    init_logging(level);

    // Credential resolution chain: flag first, then environment.
    let username = cli
        .username
        .or(settings.provider.username)
        .ok_or_else(|| AppError::Setup("no username configured".into()))?;
    let password = cli
        .password
        .or(settings.provider.password)
        .map(SecretString::new)
        .ok_or_else(|| AppError::Setup("no password configured".into()))?;

    let ca_cert = cli
        .ca_cert
        .or(settings.provider.ca_cert)
        .ok_or_else(|| AppError::Setup("no trust anchor (--ca-cert) configured".into()))?;
    let trust_anchor = std::fs::read(&ca_cert)
        .map_err(|e| AppError::Setup(format!("cannot read {}: {}", ca_cert.display(), e)))?;

    if !cli.output.is_dir() {
        return Err(AppError::Setup(format!(
            "output directory {} does not exist",
            cli.output.display()
        )));
    }

    let api_url = cli.api_url.unwrap_or(settings.provider.api_url);
    let client = ProviderClient::new(api_url.clone(), settings.provider.timeout)?
        .with_trust_anchor(trust_anchor);

    info!("Authenticating against {}", api_url);
    let token = client.login(&username, &password).await?;

    let directory = client.fetch_directory(&token).await?;
    info!(
        regions = directory.regions().len(),
        endpoints = directory.endpoint_count(),
        "Server directory loaded"
    );

    let region_ids: Vec<String> = if cli.region.is_empty() {
        directory.regions().iter().map(|r| r.id.clone()).collect()
    } else {
        cli.region
    };

    let mode = match cli.mode {
        Mode::Manual if cli.select.is_empty() => {
            // Nothing to provision yet; show the operator what to pick from.
            print_candidates(&directory, &region_ids);
            std::process::exit(2);
        }
        Mode::Manual => SelectionMode::Manual {
            indexes: cli.select,
        },
        Mode::First => SelectionMode::FirstResponsive,
        Mode::Latency => SelectionMode::LowestLatency,
    };

    let prober = Prober::new(settings.probe.timeout, settings.probe.concurrency);
    let provisioner = Provisioner::new(client, prober, mode, cli.output);

    let summary = provisioner.run(&directory, &region_ids, &token).await;

    for path in &summary.provisioned {
        info!("Provisioned {}", path.display());
    }
    if !summary.is_success() {
        warn!("Nothing provisioned; see skip reasons above");
        return Err(AppError::NothingProvisioned);
    }

    Ok(())
}

/// Print the enumerated candidate list manual mode indexes refer to.
fn print_candidates(directory: &ServerDirectory, region_ids: &[String]) {
    for region_id in region_ids {
        let name = directory
            .region(region_id)
            .map(|r| r.display_name.as_str())
            .unwrap_or("unknown region");
        println!("{} ({})", region_id, name);

        match directory.endpoints(region_id) {
            Some(endpoints) if !endpoints.is_empty() => {
                for (i, endpoint) in endpoints.iter().enumerate() {
                    println!("  {}. {}", i + 1, endpoint);
                }
            }
            _ => println!("  no WireGuard candidates"),
        }
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
