//! Campaign use-case service.
//!
//! # Responsibility
//! - Provide stable ledger entry points for transport hosts.
//! - Emit one structured log event per operation outcome.
//!
//! # Invariants
//! - Service APIs never bypass repository validation or business rules.
//! - Log events carry the error kind as `error_code`, never raw state.

use crate::clock::{Clock, Timestamp};
use crate::model::campaign::{Campaign, CampaignId, Principal};
use crate::repo::campaign_repo::{
    CampaignRepository, CreateCampaignRequest, ErrorKind, RepoError, RepoResult,
};
use crate::store::CampaignStore;
use log::{error, info};
use std::time::Instant;

/// Use-case facade over the campaign repository.
///
/// Mirrors the ledger operations one-to-one; owns no business logic.
/// Transport hosts hold one service per process over the shared store.
pub struct CampaignService<S, C> {
    repo: CampaignRepository<S, C>,
}

impl<S: CampaignStore, C: Clock> CampaignService<S, C> {
    /// Creates a service owning the provided repository.
    pub fn new(repo: CampaignRepository<S, C>) -> Self {
        Self { repo }
    }

    /// Opens a new campaign.
    pub fn create_campaign(&self, request: &CreateCampaignRequest) -> RepoResult<Campaign> {
        self.observe("campaign_create", || self.repo.create_campaign(request))
    }

    /// Replaces a campaign's title and description.
    pub fn update_campaign_metadata(
        &self,
        caller: &Principal,
        id: CampaignId,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> RepoResult<Campaign> {
        self.observe("campaign_update_metadata", || {
            self.repo
                .update_campaign_metadata(caller, id, title, description)
        })
    }

    /// Records one donation against a campaign.
    pub fn donate(&self, donor: &Principal, id: CampaignId, amount: u64) -> RepoResult<Campaign> {
        self.observe("campaign_donate", || self.repo.donate(donor, id, amount))
    }

    /// Returns the campaign stored under `id`.
    pub fn get_campaign(&self, id: CampaignId) -> RepoResult<Campaign> {
        self.observe("campaign_get", || self.repo.get_campaign(id))
    }

    /// Returns the donation deadline of the campaign stored under `id`.
    pub fn get_deadline(&self, id: CampaignId) -> RepoResult<Timestamp> {
        self.observe("campaign_get_deadline", || self.repo.get_deadline(id))
    }

    /// Removes the campaign stored under `id` and returns its final record.
    pub fn delete_campaign(&self, id: CampaignId) -> RepoResult<Campaign> {
        self.observe("campaign_delete", || self.repo.delete_campaign(id))
    }

    fn observe<T>(&self, op: &'static str, call: impl FnOnce() -> RepoResult<T>) -> RepoResult<T> {
        let started_at = Instant::now();
        info!("event={op} module=service status=start");

        match call() {
            Ok(value) => {
                info!(
                    "event={op} module=service status=ok duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(value)
            }
            Err(err) => {
                error!(
                    "event={op} module=service status=error duration_ms={} error_code={} error={err}",
                    started_at.elapsed().as_millis(),
                    error_code(&err),
                );
                Err(err)
            }
        }
    }
}

fn error_code(err: &RepoError) -> &'static str {
    match err.kind() {
        ErrorKind::InvalidInput => "invalid_input",
        ErrorKind::NotFound => "not_found",
        ErrorKind::BusinessRuleViolation => "business_rule_violation",
        ErrorKind::StorageFailure => "storage_failure",
    }
}
