//! JSON API route handlers.

pub mod bills;
