//! Business logic services for the bill tracker.
//!
//! # Services
//!
//! - `auth` - Registration and password login
//! - `summary` - Dashboard statistics over a set of bills

pub mod auth;
pub mod summary;
