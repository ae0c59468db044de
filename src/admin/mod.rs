//! Administration module for eforice.
//!
//! Currently holds the startup seeding of the administrator account.

mod seed;

pub use seed::{seed_admin, SeedOutcome};
