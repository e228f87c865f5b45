pub mod orders;
pub mod pricing;
pub mod wardrobes;
