//! Parent/child bookkeeping that mirrors a declared component tree onto a
//! scene graph.
//!
//! Components [`register`](domain::TreeBuilder::register) themselves with an
//! identifier, an optional parent identifier and an optional scene object.
//! Once all of them are in, a single [`flush`](domain::TreeBuilder::flush)
//! attaches every node to its parent, or to the root when it has none, and
//! mirrors each link into the scene objects through [`domain::SceneObject`].

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
