//! Serialized tree templates.
//!
//! An asset lists every node flat, with children referenced by guid:
//!
//! ```yaml
//! name: patrol
//! root: 6f1c2a9e-0000-4000-8000-000000000001
//! blackboard:
//!   - name: Delay
//!     value: !Float 0.5
//! nodes:
//!   - guid: 6f1c2a9e-0000-4000-8000-000000000001
//!     type: Root
//!     children: [6f1c2a9e-0000-4000-8000-000000000002]
//!   - guid: 6f1c2a9e-0000-4000-8000-000000000002
//!     type: Wait
//!     properties:
//!       duration: !key Delay
//! ```

use std::collections::HashMap;

use arbor_core::{BlackboardError, BlackboardKey, BlackboardScope, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::arena::NodeId;
use crate::error::{StructuralError, TreeError};
use crate::library::TreeLibrary;
use crate::registry::{NodeArgs, NodeProperties, NodeRegistry};
use crate::tree::Tree;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("invalid JSON tree asset: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML tree asset: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Tree(#[from] TreeError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeAsset {
    pub name: String,
    /// Guid of the root node. Its entry in `nodes`, if present, must be a `Root`.
    pub root: Uuid,
    #[serde(default)]
    pub nodes: Vec<NodeAsset>,
    /// Local blackboard keys with their initial values.
    #[serde(default)]
    pub blackboard: Vec<BlackboardKey>,
    /// Name of the library's shared blackboard to attach.
    #[serde(default)]
    pub shared_blackboard: Option<String>,
    /// Keys this tree expects on its shared blackboard; added when missing.
    #[serde(default)]
    pub shared_keys: Vec<BlackboardKey>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeAsset {
    pub guid: Uuid,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub position: [f32; 2],
    #[serde(default)]
    pub children: Vec<Uuid>,
    #[serde(default)]
    pub properties: NodeProperties,
}

impl TreeAsset {
    pub fn from_json(text: &str) -> Result<Self, AssetError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_yaml(text: &str) -> Result<Self, AssetError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, AssetError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_yaml(&self) -> Result<String, AssetError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Build the template this asset describes. The result is not bound.
    ///
    /// Sub-tree nodes look their templates up in `library`; a named shared
    /// blackboard must already be registered there.
    pub fn build(&self, registry: &NodeRegistry, library: &TreeLibrary) -> Result<Tree, AssetError> {
        let mut tree = Tree::with_root_guid(&self.name, self.root);

        if let Some(name) = &self.shared_blackboard {
            let shared = library
                .shared(name)
                .ok_or_else(|| TreeError::UnknownSharedBlackboard(name.clone()))?;
            for key in &self.shared_keys {
                let mut board = shared.write();
                match board.find(&key.name).map(BlackboardKey::key_type) {
                    Some(stored) if stored != key.key_type() => {
                        return Err(TreeError::from(BlackboardError::KeyTypeMismatch {
                            name: key.name.clone(),
                            stored,
                            requested: key.key_type(),
                        })
                        .into());
                    }
                    Some(_) => {}
                    None => board
                        .insert(key.name.clone(), key.value.clone())
                        .map_err(TreeError::from)?,
                }
            }
            tree.set_shared_blackboard(Some(shared))?;
        }

        for key in &self.blackboard {
            tree.insert_blackboard_key(key.name.clone(), key.value.clone(), BlackboardScope::Local)?;
        }

        let mut ids: HashMap<Uuid, NodeId> = HashMap::with_capacity(self.nodes.len());
        ids.insert(self.root, tree.root());
        for node in &self.nodes {
            let position = Vec2::new(node.position[0], node.position[1]);
            if node.guid == self.root {
                if node.node_type != "Root" {
                    return Err(TreeError::from(StructuralError::MissingRoot).into());
                }
                continue;
            }
            let args = NodeArgs::new(&node.properties, library);
            let behaviour = registry.create(&node.node_type, &args)?;
            let id = tree.insert_node(node.guid, behaviour, position)?;
            ids.insert(node.guid, id);
        }

        for node in &self.nodes {
            let Some(&parent) = ids.get(&node.guid) else {
                continue;
            };
            if let Some(kind) = tree.node(parent).map(|n| n.kind()) {
                if kind.max_children().is_some_and(|max| node.children.len() > max) {
                    return Err(TreeError::from(StructuralError::InvalidChildCount {
                        node: node.guid,
                        kind,
                        count: node.children.len(),
                    })
                    .into());
                }
            }
            for child in &node.children {
                let child = *ids
                    .get(child)
                    .ok_or(StructuralError::DanglingChild { parent: node.guid })
                    .map_err(TreeError::from)?;
                tree.add_child(parent, child)?;
            }
        }

        tracing::debug!(tree = %self.name, nodes = tree.len(), "built tree from asset");
        Ok(tree)
    }
}
