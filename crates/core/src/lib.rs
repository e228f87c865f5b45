//! Pure domain logic for the wardrobe configurator.
//!
//! Everything in this crate is synchronous and free of I/O: catalogs, rule
//! sets and customer records are loaded by the service layer and handed in.

pub mod cut_list;
pub mod error;
pub mod material;
pub mod pricing;
pub mod rule_context;
pub mod rules;
pub mod snapshot;
pub mod types;
