//! Core domain logic for the Pledger crowdfunding ledger.
//! This crate is the single source of truth for campaign invariants.

pub mod clock;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use clock::{deadline_after_days, Clock, ManualClock, SystemClock, Timestamp, NANOS_PER_DAY};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::campaign::{Campaign, CampaignId, CampaignValidationError, Donor, Principal};
pub use repo::campaign_repo::{
    CampaignRepository, CreateCampaignRequest, ErrorKind, RepoError, RepoResult, UpdatePolicy,
};
pub use service::campaign_service::CampaignService;
pub use store::{
    open_store, open_store_in_memory, CampaignStore, MemoryCampaignStore, SqliteCampaignStore,
    StoreError, StoreResult,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
