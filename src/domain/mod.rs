//! Domain layer: scene nodes, the arena holding them, and the tree builder
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod display;
pub mod error;
pub mod scene;

pub use arena::{AttachOutcome, DetachOutcome, SceneArena, SceneNode};
pub use builder::{FlushEntry, FlushReport, Resolution, TreeBuilder};
pub use display::TreeDisplay;
pub use error::{DomainError, DomainResult};
pub use scene::{Object3D, SceneObject};

pub use generational_arena::Index;
