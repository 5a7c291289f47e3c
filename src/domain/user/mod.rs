//! User domain: platform accounts that own brands, teams and agents

mod entity;

pub use entity::{User, UserId};
