use std::collections::HashSet;

use termtree::Tree;

use crate::domain::arena::SceneArena;
use crate::domain::scene::Object3D;

/// Render a hierarchy as a printable text tree.
pub trait TreeDisplay {
    fn to_tree_string(&self) -> Tree<String>;
}

impl<O> TreeDisplay for SceneArena<O> {
    /// Node identifiers from the root; siblings sorted by identifier.
    fn to_tree_string(&self) -> Tree<String> {
        let mut visits = Vec::new();
        let mut stack = vec![(self.root(), None)];
        while let Some((idx, parent)) = stack.pop() {
            let Some(node) = self.get_node(idx) else {
                continue;
            };
            let pos = visits.len();
            visits.push((node.id().to_string(), parent));
            let mut children: Vec<_> = self.children(idx).collect();
            children.sort_by(|(_, a), (_, b)| b.id().cmp(a.id()));
            stack.extend(children.into_iter().map(|(child, _)| (child, Some(pos))));
        }
        assemble(visits)
    }
}

impl TreeDisplay for Object3D {
    /// Object names in native child order. An object reached a second time
    /// (shared or cyclic) is not expanded again.
    fn to_tree_string(&self) -> Tree<String> {
        let mut seen = HashSet::new();
        let mut visits = Vec::new();
        let mut stack = vec![(self.clone(), None)];
        while let Some((object, parent)) = stack.pop() {
            let pos = visits.len();
            visits.push((object.name(), parent));
            if seen.insert(object.key()) {
                let children = object.children();
                stack.extend(children.into_iter().rev().map(|child| (child, Some(pos))));
            }
        }
        assemble(visits)
    }
}

/// Build the tree bottom-up from a pre-order list of `(label, parent position)`.
fn assemble(visits: Vec<(String, Option<usize>)>) -> Tree<String> {
    let mut built: Vec<Option<Tree<String>>> = visits
        .iter()
        .map(|(label, _)| Some(Tree::new(label.clone())))
        .collect();
    // Children always sit after their parent, so walking backwards finishes
    // every subtree before it is moved into its parent.
    for pos in (1..visits.len()).rev() {
        let Some(parent) = visits[pos].1 else {
            continue;
        };
        let Some(mut tree) = built[pos].take() else {
            continue;
        };
        tree.leaves.reverse();
        if let Some(parent_tree) = built[parent].as_mut() {
            parent_tree.leaves.push(tree);
        }
    }
    let mut root = built
        .first_mut()
        .and_then(Option::take)
        .unwrap_or_else(|| Tree::new(String::new()));
    root.leaves.reverse();
    root
}
