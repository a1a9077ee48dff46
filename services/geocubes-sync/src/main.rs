//! GeoCubes catalog updater.
//!
//! Publishes rasters added to the GeoCubes archive since the last run as
//! STAC items:
//! - Reads the dataset registry and lists every year directory
//! - Compares against the items already in each downstream collection
//! - Publishes only missing items, then refreshes the collection extent

mod cog;
mod config;
mod publisher;
mod registry;
mod stac_api;

use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use catalog_sync::{ReconciliationEngine, RunReport, SyncContext, TranslationTable};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cog::HttpCogReader;
use config::{load_credentials, Endpoints, SyncConfig};
use publisher::OseoPublisher;
use registry::HtmlListing;
use stac_api::StacApiReader;

#[derive(Parser, Debug)]
#[command(name = "geocubes-sync")]
#[command(about = "Publish new GeoCubes rasters to the STAC catalog")]
struct Args {
    /// Catalog host, e.g. https://paituli.csc.fi
    #[arg(long)]
    host: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let config = SyncConfig::load()?;
    let credentials = load_credentials(&config)?;

    let started = Instant::now();
    let endpoints = Endpoints::from_host(&args.host);
    println!("Updating STAC Catalog at {}", args.host);
    info!(read_api = %endpoints.read_api, write_api = %endpoints.write_api, "Starting catalog update");

    let translations = TranslationTable::load(&config.translation_table).with_context(|| {
        format!(
            "Failed to load translation table: {}",
            config.translation_table.display()
        )
    })?;

    let client = config.http_client()?;
    let datasets =
        registry::fetch_datasets(&client, &config.registry_url, &config.upstream_base_url)
            .await
            .context("Failed to fetch dataset registry")?;

    let engine = ReconciliationEngine::new(SyncContext {
        listing: Arc::new(HtmlListing::new(client.clone(), &config.raster_extension)),
        headers: Arc::new(HttpCogReader::new(client.clone())),
        reader: Arc::new(StacApiReader::new(client.clone(), endpoints.read_api)),
        publisher: Arc::new(OseoPublisher::new(client, endpoints.write_api, credentials)),
        translations,
        options: config.sync_options(),
    });

    let report = engine
        .run(&datasets)
        .await
        .context("Catalog update failed")?;
    write_report(&mut std::io::stdout().lock(), &report)?;

    info!(
        datasets = report.datasets.len(),
        items_added = report.items_added(),
        "Catalog update complete"
    );
    println!("Script took {:.1} seconds", started.elapsed().as_secs_f64());

    Ok(())
}

/// Per-collection progress and the new-dataset report.
fn write_report(out: &mut impl Write, report: &RunReport) -> std::io::Result<()> {
    for dataset in &report.datasets {
        writeln!(
            out,
            "Checking new items for {}: {}/{}",
            dataset.collection_id, dataset.baseline_items, dataset.upstream_items
        )?;
        if dataset.collection_updated {
            writeln!(out, " + Number of items added: {}", dataset.added.len())?;
            writeln!(out, " + Updated Collection Extents.")?;
        } else {
            writeln!(out, " * All items present.")?;
        }
    }
    for dataset in &report.new_datasets {
        writeln!(out, "New dataset in GeoCubes: {}", dataset.name)?;
        writeln!(out, "Folder: {}", dataset.folder)?;
        writeln!(out, "Metadata: {}", dataset.metadata_url)?;
    }
    for (dataset, display_name) in &report.unmatched {
        warn!(dataset = %dataset, display_name = %display_name, "Dataset has no STAC collection");
    }
    Ok(())
}
