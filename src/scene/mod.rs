//! Node hierarchy of an imported model
//!
//! - Node: named node with local / combined transforms and bone links
//! - NodeTree: slotmap arena holding the hierarchy
//! - TransformSystem: top-down combined transform propagation

pub mod node;
pub mod tree;
pub mod transform_system;

pub use node::{MeshBoneRef, Node};
pub use tree::NodeTree;

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeHandle;
}
