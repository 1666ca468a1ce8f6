//! Homebase Core - Shared types library.
//!
//! This crate provides common types used across all Homebase components:
//! - `bills` - Server-rendered bill tracker
//! - `planner` - Local-storage personal planner
//! - `cli` - Command-line tools for migrations, seeding and the planner
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money, usernames, roles and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
