//! Rendering surfaces and the transient overlay nodes placed on them.
//!
//! A surface is the container the host designates for previews (the grid
//! panel, a fullscreen overlay). Overlay nodes are the short-lived visuals
//! an effect adds to it: payline paths, symbol highlight boxes, title
//! cards. Each node records its owning effect and a hard removal deadline.

use glam::Vec2;

use super::grid::{Cell, Rect};
use crate::api::types::EffectHandle;
use crate::effects::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

/// What an overlay node shows.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Stroke of one payline; geometry lives in the owning payline run.
    PaylinePath { line: usize },
    /// Bordered box over a winning symbol.
    SymbolHighlight { cell: Cell, color: Color, border: f32 },
    /// Win title card; animation lives in the owning celebration.
    WinTitle { text: String },
}

#[derive(Debug, Clone)]
pub struct OverlayNode {
    pub id: NodeId,
    pub owner: EffectHandle,
    pub kind: NodeKind,
    pub rect: Rect,
    pub created_at: f32,
    /// Removed by [`Stage::sweep`] once the clock passes this.
    pub deadline: f32,
}

/// A host-designated container.
#[derive(Debug, Clone)]
pub struct Surface {
    pub tag: String,
    pub bounds: Rect,
    /// Container translation, e.g. the anticipation shake.
    pub offset: Vec2,
    nodes: Vec<OverlayNode>,
}

impl Surface {
    pub fn nodes(&self) -> &[OverlayNode] {
        &self.nodes
    }

    pub fn nodes_owned_by(&self, owner: EffectHandle) -> impl Iterator<Item = &OverlayNode> {
        self.nodes.iter().filter(move |n| n.owner == owner)
    }
}

/// Flat list of surfaces, looked up by tag.
#[derive(Debug, Default)]
pub struct Stage {
    surfaces: Vec<Surface>,
    next_node: u32,
}

impl Stage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a surface, replacing any previous one with the same tag.
    pub fn add_surface(&mut self, tag: impl Into<String>, bounds: Rect) {
        let tag = tag.into();
        self.surfaces.retain(|s| s.tag != tag);
        self.surfaces.push(Surface { tag, bounds, offset: Vec2::ZERO, nodes: Vec::new() });
    }

    /// Unregister a surface and everything on it.
    pub fn remove_surface(&mut self, tag: &str) -> bool {
        let before = self.surfaces.len();
        self.surfaces.retain(|s| s.tag != tag);
        self.surfaces.len() != before
    }

    pub fn surface(&self, tag: &str) -> Option<&Surface> {
        self.surfaces.iter().find(|s| s.tag == tag)
    }

    pub fn surface_mut(&mut self, tag: &str) -> Option<&mut Surface> {
        self.surfaces.iter_mut().find(|s| s.tag == tag)
    }

    pub fn surfaces(&self) -> impl Iterator<Item = &Surface> {
        self.surfaces.iter()
    }

    /// Add a node to the tagged surface. `None` if the surface is gone.
    pub fn add_node(
        &mut self,
        tag: &str,
        owner: EffectHandle,
        kind: NodeKind,
        rect: Rect,
        now: f32,
        deadline: f32,
    ) -> Option<NodeId> {
        let id = NodeId(self.next_node);
        let surface = self.surfaces.iter_mut().find(|s| s.tag == tag)?;
        self.next_node = self.next_node.wrapping_add(1);
        surface.nodes.push(OverlayNode { id, owner, kind, rect, created_at: now, deadline });
        Some(id)
    }

    /// Remove every node owned by `owner`. Returns how many were removed.
    pub fn remove_owned(&mut self, owner: EffectHandle) -> usize {
        let mut removed = 0;
        for surface in &mut self.surfaces {
            let before = surface.nodes.len();
            surface.nodes.retain(|n| n.owner != owner);
            removed += before - surface.nodes.len();
        }
        removed
    }

    /// Drop nodes whose deadline has passed.
    pub fn sweep(&mut self, now: f32) -> usize {
        let mut removed = 0;
        for surface in &mut self.surfaces {
            let before = surface.nodes.len();
            surface.nodes.retain(|n| n.deadline > now);
            removed += before - surface.nodes.len();
        }
        removed
    }

    pub fn node_count(&self) -> usize {
        self.surfaces.iter().map(|s| s.nodes.len()).sum()
    }

    /// Reset container offsets and drop all nodes; surfaces stay registered.
    pub fn clear_nodes(&mut self) {
        for surface in &mut self.surfaces {
            surface.nodes.clear();
            surface.offset = Vec2::ZERO;
        }
    }
}
