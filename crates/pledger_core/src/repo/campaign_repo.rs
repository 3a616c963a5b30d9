//! Campaign repository: ledger operations over an injected store.
//!
//! # Responsibility
//! - Own the full life cycle of campaign records (create, update metadata,
//!   donate, read, delete).
//! - Enforce creation preconditions and donation business rules.
//!
//! # Invariants
//! - Write paths validate the record before any store mutation.
//! - `total_donations` never exceeds `goal`; rejected operations leave the
//!   stored record untouched.
//! - Read-modify-write cycles on one campaign are serialized by a
//!   per-campaign guard.

use crate::clock::{deadline_after_days, Clock, Timestamp};
use crate::model::campaign::{Campaign, CampaignId, CampaignValidationError, Donor, Principal};
use crate::store::{CampaignStore, StoreError};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// Attempts at drawing an unused id before the ledger gives up.
const MAX_ID_ATTEMPTS: u32 = 8;

pub type RepoResult<T> = Result<T, RepoError>;

/// Coarse classification of repository failures.
///
/// Stable across error message changes; hosts branch on this, not on
/// `Display` output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller-supplied arguments failed a precondition.
    InvalidInput,
    /// No campaign lives under the requested id.
    NotFound,
    /// Arguments were well-formed but a ledger rule refused the operation.
    BusinessRuleViolation,
    /// The store or id allocation failed beneath the ledger.
    StorageFailure,
}

/// Errors from campaign ledger operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(CampaignValidationError),
    NotFound(CampaignId),
    SelfDonation {
        id: CampaignId,
        donor: Principal,
    },
    CampaignEnded {
        id: CampaignId,
        deadline: Timestamp,
        now: Timestamp,
    },
    GoalExceeded {
        id: CampaignId,
        goal: u64,
        total_donations: u64,
        amount: u64,
    },
    NotProposer {
        id: CampaignId,
        caller: Principal,
    },
    IdsExhausted {
        attempts: u32,
    },
    Storage(StoreError),
}

impl RepoError {
    /// Maps the error onto its coarse classification.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::InvalidInput,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::SelfDonation { .. }
            | Self::CampaignEnded { .. }
            | Self::GoalExceeded { .. }
            | Self::NotProposer { .. } => ErrorKind::BusinessRuleViolation,
            Self::IdsExhausted { .. } | Self::Storage(_) => ErrorKind::StorageFailure,
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "campaign not found: {id}"),
            Self::SelfDonation { id, donor } => {
                write!(f, "donor {donor} is the proposer of campaign {id}")
            }
            Self::CampaignEnded { id, deadline, now } => write!(
                f,
                "campaign {id} ended at {deadline}, donation arrived at {now}"
            ),
            Self::GoalExceeded {
                id,
                goal,
                total_donations,
                amount,
            } => write!(
                f,
                "donation of {amount} to campaign {id} would exceed goal {goal}, \
                 already donated {total_donations}"
            ),
            Self::NotProposer { id, caller } => {
                write!(f, "caller {caller} is not the proposer of campaign {id}")
            }
            Self::IdsExhausted { attempts } => {
                write!(f, "no unused campaign id after {attempts} attempts")
            }
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CampaignValidationError> for RepoError {
    fn from(value: CampaignValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Storage(value)
    }
}

/// Who may replace campaign metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UpdatePolicy {
    /// Any caller may edit any campaign. Historical ledger behavior.
    #[default]
    Open,
    /// Only the recorded proposer may edit their campaign.
    ProposerOnly,
}

/// Arguments for opening a new campaign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCampaignRequest {
    pub proposer: Principal,
    pub title: String,
    pub description: String,
    /// Funding goal in minor units.
    pub goal: u64,
    /// Donation window length in whole days from now.
    pub deadline_days: u32,
}

/// Campaign ledger over an injected store and clock.
///
/// One repository instance per process owns all writes to its store.
/// Mutating operations on an existing campaign serialize on that
/// campaign's guard, so two concurrent donations cannot both read the
/// same pre-donation total and jointly overshoot the goal.
pub struct CampaignRepository<S, C> {
    store: S,
    clock: C,
    policy: UpdatePolicy,
    guards: Mutex<HashMap<CampaignId, Arc<Mutex<()>>>>,
}

impl<S: CampaignStore, C: Clock> CampaignRepository<S, C> {
    /// Builds a repository with the default open update policy.
    pub fn new(store: S, clock: C) -> Self {
        Self::with_policy(store, clock, UpdatePolicy::default())
    }

    pub fn with_policy(store: S, clock: C, policy: UpdatePolicy) -> Self {
        Self {
            store,
            clock,
            policy,
            guards: Mutex::new(HashMap::new()),
        }
    }

    /// Update policy this repository enforces.
    pub fn policy(&self) -> UpdatePolicy {
        self.policy
    }

    /// Opens a new campaign with a fresh id and an empty donor list.
    ///
    /// Precondition checks run in argument order and the first failure
    /// wins: proposer, title, description, goal, deadline days. Two
    /// identical requests create two distinct campaigns.
    pub fn create_campaign(&self, request: &CreateCampaignRequest) -> RepoResult<Campaign> {
        if request.proposer.is_blank() {
            return Err(CampaignValidationError::EmptyProposer.into());
        }
        if request.title.trim().is_empty() {
            return Err(CampaignValidationError::EmptyTitle.into());
        }
        if request.description.trim().is_empty() {
            return Err(CampaignValidationError::EmptyDescription.into());
        }
        if request.goal == 0 {
            return Err(CampaignValidationError::ZeroGoal.into());
        }
        if request.deadline_days == 0 {
            return Err(CampaignValidationError::ZeroDeadlineDays.into());
        }

        let now = self.clock.now();
        let deadline = deadline_after_days(now, request.deadline_days).ok_or(
            RepoError::Validation(CampaignValidationError::DeadlineOutOfRange {
                days: request.deadline_days,
            }),
        )?;

        let id = self.allocate_id()?;
        let campaign = Campaign::new(
            id,
            request.proposer.clone(),
            request.title.clone(),
            request.description.clone(),
            request.goal,
            deadline,
        );
        campaign.validate()?;
        self.store.insert(id, &campaign)?;

        Ok(campaign)
    }

    /// Replaces a campaign's title and description.
    ///
    /// Under [`UpdatePolicy::Open`] any caller may edit any campaign and
    /// the new content is accepted verbatim, empty strings included. Under
    /// [`UpdatePolicy::ProposerOnly`] the caller must be the recorded
    /// proposer.
    pub fn update_campaign_metadata(
        &self,
        caller: &Principal,
        id: CampaignId,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> RepoResult<Campaign> {
        let guard = self.guard_for(id);
        let _held = lock_plain(&guard);

        let mut campaign = match self.store.get(&id)? {
            Some(record) => record,
            None => {
                self.drop_guard(id);
                return Err(RepoError::NotFound(id));
            }
        };

        if self.policy == UpdatePolicy::ProposerOnly && *caller != campaign.proposer {
            return Err(RepoError::NotProposer {
                id,
                caller: caller.clone(),
            });
        }

        campaign.title = title.into();
        campaign.description = description.into();
        campaign.validate()?;
        self.store.insert(id, &campaign)?;

        Ok(campaign)
    }

    /// Records one donation against a campaign.
    ///
    /// Every check runs before any mutation; a rejected donation leaves
    /// the stored record exactly as it was. A donation arriving at the
    /// deadline instant itself is still accepted.
    pub fn donate(&self, donor: &Principal, id: CampaignId, amount: u64) -> RepoResult<Campaign> {
        if donor.is_blank() {
            return Err(CampaignValidationError::EmptyDonorId.into());
        }
        if amount == 0 {
            return Err(CampaignValidationError::ZeroDonationAmount.into());
        }

        let guard = self.guard_for(id);
        let _held = lock_plain(&guard);

        let mut campaign = match self.store.get(&id)? {
            Some(record) => record,
            None => {
                self.drop_guard(id);
                return Err(RepoError::NotFound(id));
            }
        };

        if *donor == campaign.proposer {
            return Err(RepoError::SelfDonation {
                id,
                donor: donor.clone(),
            });
        }

        let now = self.clock.now();
        if campaign.has_ended(now) {
            return Err(RepoError::CampaignEnded {
                id,
                deadline: campaign.deadline,
                now,
            });
        }

        let new_total = match campaign.total_donations.checked_add(amount) {
            Some(total) if total <= campaign.goal => total,
            _ => {
                return Err(RepoError::GoalExceeded {
                    id,
                    goal: campaign.goal,
                    total_donations: campaign.total_donations,
                    amount,
                })
            }
        };

        campaign.donors.push(Donor {
            id: donor.clone(),
            amount,
        });
        campaign.total_donations = new_total;
        campaign.validate()?;
        self.store.insert(id, &campaign)?;

        Ok(campaign)
    }

    /// Returns the campaign stored under `id`.
    pub fn get_campaign(&self, id: CampaignId) -> RepoResult<Campaign> {
        self.store.get(&id)?.ok_or(RepoError::NotFound(id))
    }

    /// Returns the donation deadline of the campaign stored under `id`.
    pub fn get_deadline(&self, id: CampaignId) -> RepoResult<Timestamp> {
        Ok(self.get_campaign(id)?.deadline)
    }

    /// Removes the campaign stored under `id` and returns its final record.
    ///
    /// Hard delete: the id is never reused and the record is gone for good.
    pub fn delete_campaign(&self, id: CampaignId) -> RepoResult<Campaign> {
        let guard = self.guard_for(id);
        let _held = lock_plain(&guard);

        let removed = self.store.remove(&id)?;
        self.drop_guard(id);

        removed.ok_or(RepoError::NotFound(id))
    }

    fn allocate_id(&self) -> RepoResult<CampaignId> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = Uuid::new_v4();
            if self.store.get(&id)?.is_none() {
                return Ok(id);
            }
        }

        Err(RepoError::IdsExhausted {
            attempts: MAX_ID_ATTEMPTS,
        })
    }

    fn guard_for(&self, id: CampaignId) -> Arc<Mutex<()>> {
        let mut guards = self.guards.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(guards.entry(id).or_default())
    }

    /// Forgets the guard of an absent campaign. Ids are never reallocated,
    /// so the map would otherwise keep one entry for every deleted or
    /// probed missing id. Threads still holding the same `Arc` go on
    /// serializing with each other, and a record that is gone cannot be
    /// raced.
    fn drop_guard(&self, id: CampaignId) {
        let mut guards = self.guards.lock().unwrap_or_else(PoisonError::into_inner);
        guards.remove(&id);
    }
}

fn lock_plain(guard: &Mutex<()>) -> MutexGuard<'_, ()> {
    guard.lock().unwrap_or_else(PoisonError::into_inner)
}
