//! Team domain: groups of agents attached to a brand

mod entity;

pub use entity::{Team, TeamId};
