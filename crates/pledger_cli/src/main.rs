//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `pledger_core` linkage.
//! - Walk one campaign through create/donate/refuse against an in-memory
//!   store for quick local sanity checks.

use pledger_core::{
    open_store_in_memory, CampaignRepository, CampaignService, CreateCampaignRequest, Principal,
    SqliteCampaignStore, SystemClock,
};
use std::error::Error;

fn main() {
    println!("pledger_core ping={}", pledger_core::ping());
    println!("pledger_core version={}", pledger_core::core_version());

    if let Err(err) = run_smoke() {
        eprintln!("smoke run failed: {err}");
        std::process::exit(1);
    }
}

fn run_smoke() -> Result<(), Box<dyn Error>> {
    let conn = open_store_in_memory()?;
    let store = SqliteCampaignStore::try_new(conn)?;
    let service = CampaignService::new(CampaignRepository::new(store, SystemClock));

    let campaign = service.create_campaign(&CreateCampaignRequest {
        proposer: Principal::new("smoke-proposer"),
        title: "Smoke campaign".to_string(),
        description: "In-memory ledger wiring check".to_string(),
        goal: 100,
        deadline_days: 30,
    })?;
    println!("created campaign id={} goal={}", campaign.id, campaign.goal);

    let donor = Principal::new("smoke-donor");
    let campaign = service.donate(&donor, campaign.id, 60)?;
    println!(
        "donation accepted total={} of {}",
        campaign.total_donations, campaign.goal
    );

    match service.donate(&donor, campaign.id, 50) {
        Err(err) => println!("over-goal donation refused: {err}"),
        Ok(_) => return Err("over-goal donation was accepted".into()),
    }

    let campaign = service.donate(&donor, campaign.id, 40)?;
    println!(
        "donation accepted total={} of {}",
        campaign.total_donations, campaign.goal
    );

    println!("deadline={}", service.get_deadline(campaign.id)?);

    Ok(())
}
