//! # Dashboard Subcommands
//!
//! Read-only listings for the current facility:
//!
//! - `facilities`: every facility visible to the user.
//! - `compliance`: score and level, or open alerts with `--alerts`.
//! - `inventory`: stocked items, filterable by category and search text.

use anyhow::{Context, Result};
use clap::Args;
use cultivate_client::compliance::AlertFilter;
use cultivate_client::inventory::InventoryFilter;
use cultivate_client::CultivateClient;
use cultivate_core::ProductCategory;

use crate::{print_json, EXIT_OK};

/// Arguments for `cultivate compliance`.
#[derive(Args, Debug)]
pub struct ComplianceArgs {
    /// List open alerts instead of the compliance score.
    #[arg(long)]
    pub alerts: bool,
}

/// Arguments for `cultivate inventory`.
#[derive(Args, Debug)]
pub struct InventoryArgs {
    /// Product category, e.g. `flower`, `pre_roll`, `edible`.
    #[arg(long)]
    pub category: Option<ProductCategory>,

    /// Case-insensitive match on name or SKU.
    #[arg(long)]
    pub search: Option<String>,
}

pub async fn run_facilities(client: &CultivateClient) -> Result<u8> {
    let facilities = client
        .facilities()
        .list()
        .await
        .context("failed to list facilities")?;
    print_json(&facilities)?;
    Ok(EXIT_OK)
}

pub async fn run_compliance(args: &ComplianceArgs, client: &CultivateClient) -> Result<u8> {
    if args.alerts {
        let alerts = client
            .compliance()
            .alerts(&AlertFilter::open())
            .await
            .context("failed to list compliance alerts")?;
        print_json(&alerts)?;
    } else {
        let status = client
            .compliance()
            .status()
            .await
            .context("failed to fetch compliance status")?;
        tracing::info!(score = status.score, level = ?status.level, "compliance status");
        print_json(&status)?;
    }
    Ok(EXIT_OK)
}

pub async fn run_inventory(args: &InventoryArgs, client: &CultivateClient) -> Result<u8> {
    let filter = InventoryFilter {
        category: args.category,
        search: args.search.clone(),
    };
    let items = client
        .inventory()
        .list(&filter)
        .await
        .context("failed to list inventory")?;
    print_json(&items)?;
    Ok(EXIT_OK)
}
