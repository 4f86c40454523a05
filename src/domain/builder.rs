//! Two-phase tree builder: register declared nodes, then flush once to attach them.

use std::collections::HashMap;
use std::fmt;

use generational_arena::Index;
use tracing::{debug, error, instrument};

use crate::domain::arena::{AttachOutcome, SceneArena, SceneNode};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::scene::SceneObject;

/// What happened to one queued node during [`TreeBuilder::flush`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    AttachedToRoot,
    Attached { parent: String },
    /// The parent already had a child with this identifier.
    DuplicateChild { parent: String },
    /// The node names itself as parent.
    SelfParent,
    /// The parent identifier was never registered; the node stays orphaned.
    MissingParent { parent: String },
    /// The parent was registered but its node no longer resolves.
    UnresolvedParent { parent: String },
}

impl Resolution {
    pub fn is_attached(&self) -> bool {
        matches!(self, Resolution::AttachedToRoot | Resolution::Attached { .. })
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::AttachedToRoot => write!(f, "attached to root"),
            Resolution::Attached { parent } => write!(f, "attached to {parent}"),
            Resolution::DuplicateChild { parent } => write!(f, "already a child of {parent}"),
            Resolution::SelfParent => write!(f, "names itself as parent"),
            Resolution::MissingParent { parent } => write!(f, "parent {parent} is not processed"),
            Resolution::UnresolvedParent { parent } => write!(f, "parent {parent} is undefined"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlushEntry {
    pub id: String,
    pub resolution: Resolution,
}

/// Per-node outcomes of one flush, in queue order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub entries: Vec<FlushEntry>,
}

impl FlushReport {
    pub fn attached(&self) -> impl Iterator<Item = &FlushEntry> {
        self.entries.iter().filter(|e| e.resolution.is_attached())
    }

    /// Entries that did not end up with a new parent link.
    pub fn skipped(&self) -> impl Iterator<Item = &FlushEntry> {
        self.entries.iter().filter(|e| !e.resolution.is_attached())
    }

    pub fn resolution(&self, id: &str) -> Option<&Resolution> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| &e.resolution)
    }

    pub fn is_clean(&self) -> bool {
        self.entries.iter().all(|e| e.resolution.is_attached())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Collects declared nodes and attaches them to their parents in one pass.
///
/// Lifecycle: construct with a root, [`register`](Self::register) every
/// node, [`flush`](Self::flush) once, then drop or [`reset`](Self::reset).
/// The root is not part of the lookup table; nodes without a parent
/// identifier attach to it.
#[derive(Debug)]
pub struct TreeBuilder<O> {
    arena: SceneArena<O>,
    /// Every node registered this cycle, by identifier. Append-only.
    processed: HashMap<String, Index>,
    /// Nodes awaiting attachment, in registration order.
    queue: Vec<Index>,
}

impl<O: SceneObject> TreeBuilder<O> {
    pub fn new(root: SceneNode<O>) -> Self {
        Self {
            arena: SceneArena::new(root),
            processed: HashMap::new(),
            queue: Vec::new(),
        }
    }

    /// Builder whose root carries `object`, e.g. the rendering library's scene.
    pub fn with_root_object(root_id: impl Into<String>, object: Option<O>) -> Self {
        Self::new(SceneNode::new(root_id, None, object))
    }

    /// Register a node for the next flush.
    ///
    /// Fails when `id` was already registered in this cycle; the first
    /// node is kept and nothing is queued.
    #[instrument(level = "debug", skip(self, object))]
    pub fn register(
        &mut self,
        id: &str,
        object: Option<O>,
        parent_id: Option<&str>,
    ) -> DomainResult<Index> {
        if self.processed.contains_key(id) {
            error!("\"{}\" already processed.", id);
            return Err(DomainError::DuplicateIdentifier(id.to_string()));
        }

        let node = SceneNode::new(id, parent_id.map(str::to_string), object);
        let idx = self.arena.insert(node);
        self.processed.insert(id.to_string(), idx);
        self.queue.push(idx);
        Ok(idx)
    }

    /// Attach every queued node to its parent, or to the root when it has none.
    ///
    /// Parents are looked up in the table, so queue order is irrelevant as
    /// long as every parent was registered before this call. Nodes whose
    /// parent cannot be resolved are skipped and never retried. The queue is
    /// drained.
    #[instrument(level = "debug", skip(self))]
    pub fn flush(&mut self) -> FlushReport {
        let queue = std::mem::take(&mut self.queue);
        let mut report = FlushReport::default();

        for idx in queue {
            let Some(node) = self.arena.get_node(idx) else {
                continue;
            };
            let id = node.id().to_string();
            let parent_id = node.parent_id().map(str::to_string);

            let resolution = match parent_id {
                None => self.attach(self.arena.root(), idx, None),
                Some(parent_id) => match self.processed.get(&parent_id).copied() {
                    None => {
                        error!("PID {} is not processed", parent_id);
                        Resolution::MissingParent { parent: parent_id }
                    }
                    Some(parent_idx) if self.arena.get_node(parent_idx).is_none() => {
                        error!("PID {} is undefined but specified by UID {}", parent_id, id);
                        Resolution::UnresolvedParent { parent: parent_id }
                    }
                    Some(parent_idx) => self.attach(parent_idx, idx, Some(parent_id)),
                },
            };

            debug!("{}: {}", id, resolution);
            report.entries.push(FlushEntry { id, resolution });
        }

        report
    }

    fn attach(&mut self, parent: Index, child: Index, parent_id: Option<String>) -> Resolution {
        match (self.arena.add_child(parent, child), parent_id) {
            (Ok(AttachOutcome::Attached), None) => Resolution::AttachedToRoot,
            (Ok(AttachOutcome::Attached), Some(parent)) => Resolution::Attached { parent },
            (Ok(AttachOutcome::DuplicateChild), parent) => Resolution::DuplicateChild {
                parent: parent.unwrap_or_else(|| self.root_id()),
            },
            (Ok(AttachOutcome::SelfParent), _) => Resolution::SelfParent,
            (Err(e), parent) => {
                let parent = parent.unwrap_or_else(|| self.root_id());
                error!("cannot attach to {}: {}", parent, e);
                Resolution::UnresolvedParent { parent }
            }
        }
    }

    /// Start a new cycle: detach the root's children (mirrored into the root
    /// object), drop every registered node and clear table and queue.
    #[instrument(level = "debug", skip(self))]
    pub fn reset(&mut self) {
        // The root handle always resolves, so detaching cannot fail.
        if let Err(e) = self.arena.detach_all(self.arena.root()) {
            error!("reset: {}", e);
        }
        self.arena.clear_except_root();
        self.processed.clear();
        self.queue.clear();
    }
}

impl<O> TreeBuilder<O> {
    pub fn root(&self) -> Index {
        self.arena.root()
    }

    pub fn root_id(&self) -> String {
        self.arena
            .get_node(self.arena.root())
            .map(|n| n.id().to_string())
            .unwrap_or_default()
    }

    pub fn arena(&self) -> &SceneArena<O> {
        &self.arena
    }

    pub fn lookup(&self, id: &str) -> Option<Index> {
        self.processed.get(id).copied()
    }

    pub fn node(&self, id: &str) -> Option<&SceneNode<O>> {
        self.lookup(id).and_then(|idx| self.arena.get_node(idx))
    }

    /// Number of nodes waiting for the next flush.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Number of nodes registered this cycle.
    pub fn registered(&self) -> usize {
        self.processed.len()
    }
}
