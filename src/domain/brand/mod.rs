//! Brand domain: the tenant root that documents, teams and agents hang off

mod entity;

pub use entity::{Brand, BrandId};
