//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods
//! that accept `&PgPool` as the first argument.

pub mod customer_repo;
pub mod material_repo;
pub mod order_repo;
pub mod pricing_rule_repo;
pub mod wardrobe_repo;

pub use customer_repo::CustomerRepo;
pub use material_repo::MaterialRepo;
pub use order_repo::OrderRepo;
pub use pricing_rule_repo::PricingRuleRepo;
pub use wardrobe_repo::WardrobeRepo;
