//! Campaign domain model.
//!
//! # Responsibility
//! - Define the canonical campaign and donor records kept in the ledger.
//! - Enforce record-level accounting invariants before persistence.
//!
//! # Invariants
//! - `id` is stable and never reused for another campaign.
//! - `total_donations` always equals the sum of recorded donor amounts.
//! - `total_donations` never exceeds `goal`; `goal` is strictly positive.
//! - `donors` only grows; individual donations are never removed.

use crate::clock::Timestamp;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for one campaign record.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type CampaignId = Uuid;

/// Opaque caller identity issued by the external authentication boundary.
///
/// The ledger never interprets the token; it stores it for proposer/donor
/// attribution and compares it for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    /// Wraps a raw identity token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns whether the token is empty after trimming whitespace.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Display for Principal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Principal {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Principal {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One accepted contribution.
///
/// Immutable once appended; owned exclusively by the campaign it funds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Donor {
    /// Identity of the contributor. Attribution metadata, never a key.
    pub id: Principal,
    /// Contributed amount in minor units. Always positive.
    pub amount: u64,
}

/// Validation failures for campaign arguments and records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CampaignValidationError {
    /// Proposer identity is blank.
    EmptyProposer,
    /// Title is empty after trimming whitespace.
    EmptyTitle,
    /// Description is empty after trimming whitespace.
    EmptyDescription,
    /// Donor identity is blank.
    EmptyDonorId,
    /// Funding goal is zero.
    ZeroGoal,
    /// Deadline day count is zero.
    ZeroDeadlineDays,
    /// Deadline lies beyond the representable timestamp range.
    DeadlineOutOfRange { days: u32 },
    /// A donation amount is zero.
    ZeroDonationAmount,
    /// Recorded donations exceed the funding goal.
    DonationsExceedGoal { goal: u64, total_donations: u64 },
    /// Recorded running total disagrees with the donor list.
    DonationTotalMismatch { total_donations: u64, donor_sum: u128 },
}

impl Display for CampaignValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyProposer => write!(f, "proposer identity must not be empty"),
            Self::EmptyTitle => write!(f, "title must not be empty"),
            Self::EmptyDescription => write!(f, "description must not be empty"),
            Self::EmptyDonorId => write!(f, "donor identity must not be empty"),
            Self::ZeroGoal => write!(f, "goal must be greater than 0"),
            Self::ZeroDeadlineDays => write!(f, "deadline day count must be greater than 0"),
            Self::DeadlineOutOfRange { days } => {
                write!(f, "deadline {days} days ahead is out of timestamp range")
            }
            Self::ZeroDonationAmount => write!(f, "donation amount must be greater than 0"),
            Self::DonationsExceedGoal {
                goal,
                total_donations,
            } => write!(f, "total donations {total_donations} exceed goal {goal}"),
            Self::DonationTotalMismatch {
                total_donations,
                donor_sum,
            } => write!(
                f,
                "recorded total {total_donations} does not match donor sum {donor_sum}"
            ),
        }
    }
}

impl Error for CampaignValidationError {}

/// Canonical ledger record for one crowdfunding campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    /// Stable global ID used as the store key and for auditing.
    pub id: CampaignId,
    /// Identity of the creator. Immutable after creation.
    pub proposer: Principal,
    /// Free-text headline. Mutable metadata.
    pub title: String,
    /// Free-text pitch. Mutable metadata.
    pub description: String,
    /// Maximum total amount the campaign accepts. Immutable after creation.
    pub goal: u64,
    /// Running sum of accepted donations. Monotonically non-decreasing.
    pub total_donations: u64,
    /// Nanosecond instant after which donations are refused. Immutable.
    pub deadline: Timestamp,
    /// Accepted contributions in donation order. Append-only.
    pub donors: Vec<Donor>,
}

impl Campaign {
    /// Creates a fresh campaign record with no donations.
    ///
    /// # Invariants
    /// - `total_donations` starts at 0.
    /// - `donors` starts empty.
    pub fn new(
        id: CampaignId,
        proposer: Principal,
        title: impl Into<String>,
        description: impl Into<String>,
        goal: u64,
        deadline: Timestamp,
    ) -> Self {
        Self {
            id,
            proposer,
            title: title.into(),
            description: description.into(),
            goal,
            total_donations: 0,
            deadline,
            donors: Vec::new(),
        }
    }

    /// Checks the record-level accounting invariants.
    ///
    /// Field emptiness for proposer/title/description is a creation
    /// precondition, not a record invariant, and is deliberately not
    /// re-checked here: metadata updates stay as permissive as the
    /// ledger's historical behavior.
    pub fn validate(&self) -> Result<(), CampaignValidationError> {
        if self.goal == 0 {
            return Err(CampaignValidationError::ZeroGoal);
        }

        let mut donor_sum: u128 = 0;
        for donor in &self.donors {
            if donor.amount == 0 {
                return Err(CampaignValidationError::ZeroDonationAmount);
            }
            donor_sum += u128::from(donor.amount);
        }

        if donor_sum != u128::from(self.total_donations) {
            return Err(CampaignValidationError::DonationTotalMismatch {
                total_donations: self.total_donations,
                donor_sum,
            });
        }

        if self.total_donations > self.goal {
            return Err(CampaignValidationError::DonationsExceedGoal {
                goal: self.goal,
                total_donations: self.total_donations,
            });
        }

        Ok(())
    }

    /// Returns the amount still accepted before the goal is reached.
    pub fn remaining(&self) -> u64 {
        self.goal.saturating_sub(self.total_donations)
    }

    /// Returns whether the donation window has closed at `now`.
    ///
    /// A donation exactly at the deadline instant is still accepted.
    pub fn has_ended(&self, now: Timestamp) -> bool {
        now > self.deadline
    }
}
