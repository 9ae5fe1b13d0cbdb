//! Transform System
//!
//! Propagates local transforms down the node hierarchy. Decoupled from the
//! model so it only borrows the [`NodeTree`].

use glam::Mat4;

use crate::scene::NodeHandle;
use crate::scene::tree::NodeTree;

/// Recomputes every node's combined transform in one top-down pass.
///
/// Iterative; parents are always visited before their children.
pub fn update_combined(tree: &mut NodeTree) {
    // Work stack: (node handle, parent combined matrix)
    let mut stack: Vec<(NodeHandle, Mat4)> = Vec::with_capacity(64);
    stack.push((tree.root(), Mat4::IDENTITY));

    while let Some((handle, parent_combined)) = stack.pop() {
        let Some(node) = tree.get_mut(handle) else {
            continue;
        };

        let combined = if node.parent.is_some() {
            parent_combined * node.local_transform
        } else {
            node.local_transform
        };
        node.combined_transform = combined;

        for &child in node.children.iter().rev() {
            stack.push((child, combined));
        }
    }
}

/// Recomputes combined transforms for the subtree rooted at `start` only.
///
/// The parent of `start` must already hold a valid combined transform.
pub fn update_subtree(tree: &mut NodeTree, start: NodeHandle) {
    let parent_combined = tree
        .get(start)
        .and_then(|n| n.parent)
        .and_then(|p| tree.get(p))
        .map(|p| p.combined_transform);

    let mut stack: Vec<(NodeHandle, Option<Mat4>)> = vec![(start, parent_combined)];

    while let Some((handle, parent_combined)) = stack.pop() {
        let Some(node) = tree.get_mut(handle) else {
            continue;
        };

        let combined = match parent_combined {
            Some(parent) => parent * node.local_transform,
            None => node.local_transform,
        };
        node.combined_transform = combined;

        for &child in node.children.iter().rev() {
            stack.push((child, Some(combined)));
        }
    }
}
