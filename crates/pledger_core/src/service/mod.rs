//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Give transport hosts an observable entry surface decoupled from
//!   storage details.

pub mod campaign_service;
