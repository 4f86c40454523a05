use std::collections::HashMap;
use std::fmt;

use generational_arena::{Arena, Index};
use tracing::{info, instrument, warn};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::scene::SceneObject;

/// Tree node mirroring one declared component.
///
/// Identifier, parent identifier and object handle are fixed at
/// construction; only the child map changes afterwards. The object itself
/// may be mutated in place through [`SceneNode::object_mut`].
#[derive(Debug)]
pub struct SceneNode<O> {
    id: String,
    parent_id: Option<String>,
    object: Option<O>,
    /// Child identifier -> child handle. Keys always equal the child's `id`.
    children: HashMap<String, Index>,
}

impl<O> SceneNode<O> {
    pub fn new(id: impl Into<String>, parent_id: Option<String>, object: Option<O>) -> Self {
        Self {
            id: id.into(),
            parent_id,
            object,
            children: HashMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    pub fn object(&self) -> Option<&O> {
        self.object.as_ref()
    }

    pub fn object_mut(&mut self) -> Option<&mut O> {
        self.object.as_mut()
    }

    pub fn child(&self, id: &str) -> Option<Index> {
        self.children.get(id).copied()
    }

    pub fn has_child(&self, id: &str) -> bool {
        self.children.contains_key(id)
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Identifiers of the current children, in no particular order.
    pub fn child_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.children.keys().map(String::as_str)
    }
}

impl<O> fmt::Display for SceneNode<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// Result of linking a child under a parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachOutcome {
    Attached,
    /// A child with the same identifier was already present; nothing changed.
    DuplicateChild,
    /// Parent and child are the same node; nothing changed.
    SelfParent,
}

/// Result of unlinking a child from a parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetachOutcome {
    Detached,
    NotAChild,
}

/// Arena-backed scene tree.
///
/// A node may be referenced from several places (the builder's lookup table
/// and its parent's child map); all of them hold the same arena [`Index`].
#[derive(Debug)]
pub struct SceneArena<O> {
    arena: Arena<SceneNode<O>>,
    root: Index,
}

impl<O> SceneArena<O> {
    pub fn new(root: SceneNode<O>) -> Self {
        let mut arena = Arena::new();
        let root = arena.insert(root);
        Self { arena, root }
    }

    pub fn insert(&mut self, node: SceneNode<O>) -> Index {
        self.arena.insert(node)
    }

    pub fn get_node(&self, idx: Index) -> Option<&SceneNode<O>> {
        self.arena.get(idx)
    }

    pub fn get_node_mut(&mut self, idx: Index) -> Option<&mut SceneNode<O>> {
        self.arena.get_mut(idx)
    }

    pub fn root(&self) -> Index {
        self.root
    }

    /// Number of nodes in the arena, root included.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Never true while the root is alive.
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Current children of `parent`. Each call yields a fresh view.
    pub fn children(&self, parent: Index) -> impl Iterator<Item = (Index, &SceneNode<O>)> + '_ {
        self.arena.get(parent).into_iter().flat_map(move |node| {
            node.children
                .values()
                .filter_map(move |&idx| self.arena.get(idx).map(|child| (idx, child)))
        })
    }

    /// Pre-order traversal starting at the root.
    pub fn iter(&self) -> TreeIterator<'_, O> {
        TreeIterator::new(self)
    }

    /// Number of levels from the root down to the deepest leaf.
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(self.root, 1)];
        while let Some((idx, depth)) = stack.pop() {
            if let Some(node) = self.get_node(idx) {
                max_depth = max_depth.max(depth);
                stack.extend(node.children.values().map(|&child| (child, depth + 1)));
            }
        }
        max_depth
    }

    /// Identifiers of all leaves reachable from the root, sorted.
    pub fn leaf_ids(&self) -> Vec<String> {
        let mut leaves: Vec<String> = self
            .iter()
            .filter(|(_, node)| node.children.is_empty())
            .map(|(_, node)| node.id.clone())
            .collect();
        leaves.sort();
        leaves
    }

    /// Drop every node except the root and clear the root's child map.
    /// Does not touch scene objects; detach first to mirror removal.
    pub(crate) fn clear_except_root(&mut self) {
        let root = self.root;
        self.arena.retain(|idx, _| idx == root);
        if let Some(node) = self.arena.get_mut(root) {
            node.children.clear();
        }
    }
}

impl<O: SceneObject> SceneArena<O> {
    /// Link `child` under `parent`, mirroring into the scene objects when
    /// both nodes carry one.
    #[instrument(level = "trace", skip(self))]
    pub fn add_child(&mut self, parent: Index, child: Index) -> DomainResult<AttachOutcome> {
        if parent == child {
            let node = self.get_node(child).ok_or(DomainError::NodeNotFound(child))?;
            warn!("refusing to attach {} to itself", node.id);
            return Ok(AttachOutcome::SelfParent);
        }

        let (parent_node, child_node) = self.arena.get2_mut(parent, child);
        let parent_node = parent_node.ok_or(DomainError::NodeNotFound(parent))?;
        let child_node = child_node.ok_or(DomainError::NodeNotFound(child))?;

        if parent_node.children.contains_key(&child_node.id) {
            info!("{} already has {}", parent_node.id, child_node.id);
            return Ok(AttachOutcome::DuplicateChild);
        }
        parent_node.children.insert(child_node.id.clone(), child);

        // Structural link is kept even when one side has no object.
        if let (Some(parent_obj), Some(child_obj)) =
            (parent_node.object.as_mut(), child_node.object.as_ref())
        {
            parent_obj.add(child_obj);
        }
        Ok(AttachOutcome::Attached)
    }

    /// Unlink `child` from `parent`, mirroring into the scene objects when
    /// both nodes carry one.
    #[instrument(level = "trace", skip(self))]
    pub fn remove_child(&mut self, parent: Index, child: Index) -> DomainResult<DetachOutcome> {
        if parent == child {
            return Ok(DetachOutcome::NotAChild);
        }

        let (parent_node, child_node) = self.arena.get2_mut(parent, child);
        let parent_node = parent_node.ok_or(DomainError::NodeNotFound(parent))?;
        let child_node = child_node.ok_or(DomainError::NodeNotFound(child))?;

        if parent_node.children.remove(&child_node.id).is_none() {
            return Ok(DetachOutcome::NotAChild);
        }

        if let (Some(parent_obj), Some(child_obj)) =
            (parent_node.object.as_mut(), child_node.object.as_ref())
        {
            parent_obj.remove(child_obj);
        }
        Ok(DetachOutcome::Detached)
    }

    /// Detach every current child of `parent`. Returns how many were removed.
    pub fn detach_all(&mut self, parent: Index) -> DomainResult<usize> {
        let children: Vec<Index> = self.children(parent).map(|(idx, _)| idx).collect();
        let mut removed = 0;
        for child in children {
            if self.remove_child(parent, child)? == DetachOutcome::Detached {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

pub struct TreeIterator<'a, O> {
    arena: &'a SceneArena<O>,
    stack: Vec<Index>,
}

impl<'a, O> TreeIterator<'a, O> {
    fn new(arena: &'a SceneArena<O>) -> Self {
        Self {
            arena,
            stack: vec![arena.root()],
        }
    }
}

impl<'a, O> Iterator for TreeIterator<'a, O> {
    type Item = (Index, &'a SceneNode<O>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                self.stack.extend(node.children.values().copied());
                return Some((current_idx, node));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::scene::Object3D;

    fn arena_with_objects() -> (SceneArena<Object3D>, Object3D) {
        let scene = Object3D::new("scene");
        let arena = SceneArena::new(SceneNode::new("scene", None, Some(scene.clone())));
        (arena, scene)
    }

    #[test]
    fn given_new_node_when_constructed_then_has_no_children() {
        let node: SceneNode<Object3D> = SceneNode::new("a", Some("p".into()), None);

        assert_eq!(node.id(), "a");
        assert_eq!(node.parent_id(), Some("p"));
        assert!(node.object().is_none());
        assert_eq!(node.child_count(), 0);
    }

    #[test]
    fn given_child_with_object_when_adding_then_mirrors_into_parent_object() {
        let (mut arena, scene) = arena_with_objects();
        let mesh = Object3D::new("mesh");
        let child = arena.insert(SceneNode::new("a", None, Some(mesh.clone())));

        let outcome = arena.add_child(arena.root(), child).unwrap();

        assert_eq!(outcome, AttachOutcome::Attached);
        assert!(scene.contains(&mesh));
        assert_eq!(arena.get_node(arena.root()).unwrap().child("a"), Some(child));
    }

    #[test]
    fn given_child_without_object_when_adding_then_links_structurally_only() {
        let (mut arena, scene) = arena_with_objects();
        let child = arena.insert(SceneNode::new("group", None, None));

        arena.add_child(arena.root(), child).unwrap();

        assert!(arena.get_node(arena.root()).unwrap().has_child("group"));
        assert_eq!(scene.child_count(), 0);
    }

    #[test]
    fn given_same_child_twice_when_adding_then_second_is_noop() {
        let (mut arena, scene) = arena_with_objects();
        let child = arena.insert(SceneNode::new("a", None, Some(Object3D::new("a"))));

        arena.add_child(arena.root(), child).unwrap();
        let second = arena.add_child(arena.root(), child).unwrap();

        assert_eq!(second, AttachOutcome::DuplicateChild);
        assert_eq!(arena.get_node(arena.root()).unwrap().child_count(), 1);
        assert_eq!(scene.child_count(), 1);
    }

    #[test]
    fn given_node_when_adding_to_itself_then_refuses() {
        let (mut arena, _) = arena_with_objects();
        let node = arena.insert(SceneNode::new("a", Some("a".into()), None));

        assert_eq!(arena.add_child(node, node).unwrap(), AttachOutcome::SelfParent);
        assert_eq!(arena.get_node(node).unwrap().child_count(), 0);
    }

    #[test]
    fn given_attached_child_when_removing_then_detaches_and_mirrors() {
        let (mut arena, scene) = arena_with_objects();
        let mesh = Object3D::new("mesh");
        let child = arena.insert(SceneNode::new("a", None, Some(mesh.clone())));
        arena.add_child(arena.root(), child).unwrap();

        let outcome = arena.remove_child(arena.root(), child).unwrap();

        assert_eq!(outcome, DetachOutcome::Detached);
        assert!(!arena.get_node(arena.root()).unwrap().has_child("a"));
        assert!(!scene.contains(&mesh));
    }

    #[test]
    fn given_unattached_child_when_removing_then_not_a_child() {
        let (mut arena, _) = arena_with_objects();
        let child = arena.insert(SceneNode::new("a", None, None));

        let outcome = arena.remove_child(arena.root(), child).unwrap();

        assert_eq!(outcome, DetachOutcome::NotAChild);
    }

    #[test]
    fn given_object_on_parent_only_when_removing_then_unlinks_without_touching_native_list() {
        let (mut arena, scene) = arena_with_objects();
        let mesh = Object3D::new("mesh");
        let mirrored = arena.insert(SceneNode::new("mesh", None, Some(mesh.clone())));
        let group = arena.insert(SceneNode::new("group", None, None));
        arena.add_child(arena.root(), mirrored).unwrap();
        arena.add_child(arena.root(), group).unwrap();

        let outcome = arena.remove_child(arena.root(), group).unwrap();

        assert_eq!(outcome, DetachOutcome::Detached);
        assert!(!arena.get_node(arena.root()).unwrap().has_child("group"));
        assert_eq!(scene.child_count(), 1);
        assert!(scene.contains(&mesh));
    }

    #[test]
    fn given_object_on_child_only_when_removing_then_unlinks_structurally() {
        let mut arena: SceneArena<Object3D> = SceneArena::new(SceneNode::new("root", None, None));
        let group = arena.insert(SceneNode::new("group", None, None));
        let mesh = Object3D::new("mesh");
        let child = arena.insert(SceneNode::new("mesh", None, Some(mesh.clone())));
        arena.add_child(group, child).unwrap();

        let outcome = arena.remove_child(group, child).unwrap();

        assert_eq!(outcome, DetachOutcome::Detached);
        assert_eq!(arena.get_node(group).unwrap().child_count(), 0);
        assert_eq!(mesh.child_count(), 0);
    }

    #[test]
    fn given_node_when_fetching_mutably_then_object_is_changed_in_place() {
        let (mut arena, scene) = arena_with_objects();
        let mesh = Object3D::new("mesh");
        let root = arena.root();

        arena
            .get_node_mut(root)
            .and_then(SceneNode::object_mut)
            .unwrap()
            .add(&mesh);

        assert!(scene.contains(&mesh));
        assert_eq!(arena.get_node(root).unwrap().child_count(), 0);
    }

    #[test]
    fn given_inserted_nodes_when_counting_then_len_includes_root() {
        let (mut arena, _) = arena_with_objects();
        assert_eq!(arena.len(), 1);
        assert!(!arena.is_empty());

        arena.insert(SceneNode::new("a", None, None));

        assert_eq!(arena.len(), 2);
        assert!(arena.get_node_mut(Index::from_raw_parts(99, 0)).is_none());
    }

    #[test]
    fn given_two_level_tree_when_measuring_then_depth_and_leaves_match() {
        let (mut arena, _) = arena_with_objects();
        let a = arena.insert(SceneNode::new("a", None, None));
        let b = arena.insert(SceneNode::new("b", Some("a".into()), None));
        let c = arena.insert(SceneNode::new("c", None, None));
        arena.add_child(arena.root(), a).unwrap();
        arena.add_child(a, b).unwrap();
        arena.add_child(arena.root(), c).unwrap();

        assert_eq!(arena.depth(), 3);
        assert_eq!(arena.leaf_ids(), vec!["b".to_string(), "c".to_string()]);
        assert_eq!(arena.iter().count(), 4);
    }

    #[test]
    fn given_children_when_enumerating_twice_then_each_call_sees_current_state() {
        let (mut arena, _) = arena_with_objects();
        let a = arena.insert(SceneNode::new("a", None, None));
        let b = arena.insert(SceneNode::new("b", None, None));
        arena.add_child(arena.root(), a).unwrap();

        assert_eq!(arena.children(arena.root()).count(), 1);
        arena.add_child(arena.root(), b).unwrap();
        assert_eq!(arena.children(arena.root()).count(), 2);
    }
}
