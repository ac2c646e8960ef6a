//! Domain layer: records, value objects and the pure pricing rules.
//!
//! Nothing in here performs I/O. Storage is reached through the traits in
//! [`ports`].

pub mod category;
pub mod collection;
pub mod location;
pub mod machine;
pub mod money;
pub mod ports;
pub mod pricing;
pub mod record;
pub mod split;
