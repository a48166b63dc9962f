//! Paybridge - Multi-provider payment gateway
//!
//! Creates card, crypto and wallet payment orders through one uniform
//! interface and verifies the providers' webhook notifications.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
