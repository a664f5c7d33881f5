//! Scene hierarchy storage.
//!
//! Callers hold [`SceneKey`](crate::SceneKey) / [`ContainerKey`] handles; the
//! structure itself lives in the private `core` module.

mod arena;
mod container;
mod core;

pub use self::arena::{Arena, ArenaKey};
pub use self::container::{BackStackEntry, Container, ContainerKey};
pub use self::core::SceneTree;
