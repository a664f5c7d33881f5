//! Scene nodes and the value types attached to them.

mod core;

pub use self::core::{AnimationKind, Scene, SceneBuilder, SceneId, SceneKey, SceneKind, SceneResult};
