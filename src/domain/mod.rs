//! Domain layer containing payment types and signature rules.
//!
//! # Module Organization
//!
//! - `payment` - Provider kinds, orders, events, errors and money handling
//! - `signature` - Webhook and request signing for each provider

pub mod payment;
pub mod signature;
