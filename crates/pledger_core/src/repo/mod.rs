//! Repository layer for campaign ledger operations.
//!
//! # Responsibility
//! - Define the use-case oriented campaign ledger contract.
//! - Isolate store access details from service orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `Campaign::validate()` before
//!   persistence.
//! - Repository APIs return semantic errors (`NotFound`, business rule
//!   refusals) in addition to storage transport errors.

pub mod campaign_repo;
