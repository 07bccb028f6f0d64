//! Generational node arena standing in for the host scene graph.

use glam::Vec2;

use crate::api::error::{FxError, FxResult};
use crate::api::types::NodeId;
use crate::components::node::Node;

struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Node storage standing in for the host scene graph.
///
/// A generational arena: despawned slots are recycled, and the bumped
/// generation keeps old [`NodeId`]s from reaching the new occupant.
pub struct Scene {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
    viewport: Vec2,
    closed: bool,
}

impl Scene {
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Create a scene with room for `capacity` nodes before reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            len: 0,
            viewport: Vec2::ZERO,
            closed: false,
        }
    }

    /// Add a node, ignoring whether the scene is closed.
    pub fn spawn(&mut self, node: Node) -> NodeId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            self.len += 1;
            return NodeId { index, generation: slot.generation };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot { generation: 0, node: Some(node) });
        self.len += 1;
        NodeId { index, generation: 0 }
    }

    /// Add a node, failing if the renderer behind this scene is gone.
    pub fn try_spawn(&mut self, node: Node) -> FxResult<NodeId> {
        if self.closed {
            return Err(FxError::ResourceUnavailable("scene is closed"));
        }
        Ok(self.spawn(node))
    }

    /// Remove a node. Returns it if the id was still live.
    pub fn despawn(&mut self, id: NodeId) -> Option<Node> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        Some(node)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.node.as_ref())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.node.as_mut())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Iterate over live nodes in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.slots.iter().enumerate().filter_map(|(i, s)| {
            s.node.as_ref().map(|n| {
                (NodeId { index: i as u32, generation: s.generation }, n)
            })
        })
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Remove every node. Outstanding ids become stale.
    pub fn clear(&mut self) {
        self.free.clear();
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.node.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
            self.free.push(i as u32);
        }
        self.len = 0;
    }

    /// Size of the drawable area in scene units.
    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width, height);
    }

    /// Mark the renderer as gone. The scene stays readable.
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
