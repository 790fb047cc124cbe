//! Mutation records
//!
//! The host reports tree changes as batches of records; consumers decide
//! whether a batch is worth a recomputation.

use crate::NodeId;

/// A single observed tree change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationRecord {
    /// An attribute was set or removed on `target`
    Attributes {
        target: NodeId,
        attribute_name: String,
        old_value: Option<String>,
    },
    /// Children were added to or removed from `target`
    ChildList {
        target: NodeId,
        added_nodes: Vec<NodeId>,
        removed_nodes: Vec<NodeId>,
    },
    /// Text content changed
    CharacterData { target: NodeId },
}

impl MutationRecord {
    /// Node the mutation was reported on
    pub fn target(&self) -> NodeId {
        match self {
            Self::Attributes { target, .. }
            | Self::ChildList { target, .. }
            | Self::CharacterData { target } => *target,
        }
    }
}
