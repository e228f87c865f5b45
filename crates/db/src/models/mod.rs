//! Database row structs and the DTOs used to write them.

pub mod customer;
pub mod material;
pub mod order;
pub mod pricing_rule;
pub mod wardrobe;
