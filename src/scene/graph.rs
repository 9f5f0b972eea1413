//! Scene graph storage and queries

use ahash::AHashMap;
use glam::{Quat, Vec3};

use super::pose::Pose;
use crate::core::error::{ForgeError, Result};
use crate::core::types::{IdAllocator, NodeId};

#[derive(Debug, Clone)]
struct SceneNode {
    label: String,
    local: Pose,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    active: bool,
}

/// Arena of pose nodes linked into a forest
#[derive(Debug, Clone)]
pub struct SceneGraph {
    nodes: AHashMap<NodeId, SceneNode>,
    ids: IdAllocator,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            nodes: AHashMap::new(),
            ids: IdAllocator::new(),
        }
    }

    /// Create a node with a pose local to `parent` (world pose for roots)
    pub fn create_node(
        &mut self,
        label: impl Into<String>,
        local: Pose,
        parent: Option<NodeId>,
    ) -> Result<NodeId> {
        if let Some(parent) = parent {
            if !self.nodes.contains_key(&parent) {
                return Err(ForgeError::NodeNotFound(parent));
            }
        }

        let id = NodeId(self.ids.next_raw());
        self.nodes.insert(
            id,
            SceneNode {
                label: label.into(),
                local,
                parent,
                children: Vec::new(),
                active: true,
            },
        );
        if let Some(parent) = parent {
            self.node_mut(parent)?.children.push(id);
        }
        Ok(id)
    }

    fn node(&self, id: NodeId) -> Result<&SceneNode> {
        self.nodes.get(&id).ok_or(ForgeError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut SceneNode> {
        self.nodes.get_mut(&id).ok_or(ForgeError::NodeNotFound(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn label(&self, id: NodeId) -> Result<&str> {
        Ok(&self.node(id)?.label)
    }

    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    pub fn children(&self, id: NodeId) -> Result<&[NodeId]> {
        Ok(&self.node(id)?.children)
    }

    pub fn local_pose(&self, id: NodeId) -> Result<Pose> {
        Ok(self.node(id)?.local)
    }

    pub fn set_local_pose(&mut self, id: NodeId, local: Pose) -> Result<()> {
        self.node_mut(id)?.local = local;
        Ok(())
    }

    /// Pose in world space, composed up the parent chain
    pub fn world_pose(&self, id: NodeId) -> Result<Pose> {
        let node = self.node(id)?;
        match node.parent {
            Some(parent) => Ok(self.world_pose(parent)?.mul_pose(&node.local)),
            None => Ok(node.local),
        }
    }

    /// Move a node so its world pose becomes `world`; descendants follow
    pub fn set_world_pose(&mut self, id: NodeId, world: Pose) -> Result<()> {
        let local = match self.node(id)?.parent {
            Some(parent) => self.world_pose(parent)?.relative(&world),
            None => world,
        };
        self.set_local_pose(id, local)
    }

    pub fn set_world_rotation(&mut self, id: NodeId, rotation: Quat) -> Result<()> {
        let current = self.world_pose(id)?;
        self.set_world_pose(id, Pose::new(current.position, rotation))
    }

    pub fn set_world_position(&mut self, id: NodeId, position: Vec3) -> Result<()> {
        let current = self.world_pose(id)?;
        self.set_world_pose(id, Pose::new(position, current.rotation))
    }

    /// Reparent a node while keeping its world pose
    pub fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) -> Result<()> {
        let world = self.world_pose(id)?;

        if let Some(new_parent) = parent {
            self.node(new_parent)?;
            if new_parent == id || self.is_ancestor(id, new_parent)? {
                return Err(ForgeError::InvalidHierarchy(id));
            }
        }

        if let Some(old_parent) = self.node(id)?.parent {
            self.node_mut(old_parent)?.children.retain(|c| *c != id);
        }

        self.node_mut(id)?.parent = parent;
        if let Some(new_parent) = parent {
            self.node_mut(new_parent)?.children.push(id);
        }

        self.set_world_pose(id, world)
    }

    /// True when `ancestor` is somewhere above `id`
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> Result<bool> {
        let mut cursor = self.node(id)?.parent;
        while let Some(current) = cursor {
            if current == ancestor {
                return Ok(true);
            }
            cursor = self.node(current)?.parent;
        }
        Ok(false)
    }

    /// Turn every child into a root, keeping world poses
    pub fn detach_children(&mut self, id: NodeId) -> Result<()> {
        let children = self.node(id)?.children.clone();
        for child in children {
            self.set_parent(child, None)?;
        }
        Ok(())
    }

    /// Remove a node and everything below it
    pub fn remove(&mut self, id: NodeId) -> Result<()> {
        if let Some(parent) = self.node(id)?.parent {
            if let Some(parent) = self.nodes.get_mut(&parent) {
                parent.children.retain(|c| *c != id);
            }
        }

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                stack.extend(node.children);
            }
        }
        Ok(())
    }

    pub fn set_active(&mut self, id: NodeId, active: bool) -> Result<()> {
        self.node_mut(id)?.active = active;
        Ok(())
    }

    /// Active only when this node and all its ancestors are active
    pub fn is_active(&self, id: NodeId) -> Result<bool> {
        let node = self.node(id)?;
        if !node.active {
            return Ok(false);
        }
        match node.parent {
            Some(parent) => self.is_active(parent),
            None => Ok(true),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}
