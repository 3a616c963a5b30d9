//! Domain model for the campaign ledger.
//!
//! # Responsibility
//! - Define canonical data structures used by core accounting logic.
//! - Keep one campaign-centric record shape for storage and callers alike.
//!
//! # Invariants
//! - Every record is identified by a stable `CampaignId`.
//! - Deletion is a hard remove of the whole record; there are no
//!   tombstones and no per-donation removal.

pub mod campaign;
