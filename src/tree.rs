//! Arena-backed branch tree produced by the turtle interpreter.
//!
//! Nodes are stored in creation order and refer to each other through
//! [`BranchId`] handles, so a parent always precedes its children in
//! [`PlantTree::nodes`]. After interpretation the topology is frozen; the only
//! per-node state that changes afterwards is the sway rotation written by
//! [`crate::wind::WindAnimator`].

use bevy::prelude::*;

/// Handle to a node inside one [`PlantTree`]. Ids are dense and restart at
/// zero for every build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BranchId(pub(crate) u32);

impl BranchId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One grown segment: a pivot, the turtle orientation at the pivot and the
/// distance grown along the local up axis.
#[derive(Debug, Clone)]
pub struct BranchNode {
    id: BranchId,
    pivot: Vec3,
    orientation: Quat,
    length: f32,
    depth: u32,
    parent: Option<BranchId>,
    children: Vec<BranchId>,
    pub(crate) sway: Quat,
}

impl BranchNode {
    pub fn id(&self) -> BranchId {
        self.id
    }

    pub fn pivot(&self) -> Vec3 {
        self.pivot
    }

    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    /// Number of ancestors; base nodes are depth 0.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn parent(&self) -> Option<BranchId> {
        self.parent
    }

    /// Children in creation order.
    pub fn children(&self) -> &[BranchId] {
        &self.children
    }

    pub fn is_terminal(&self) -> bool {
        self.children.is_empty()
    }

    /// End point of the segment, where leaves and flowers anchor.
    pub fn tip(&self) -> Vec3 {
        self.pivot + self.orientation * Vec3::Y * self.length
    }

    /// Local rotation offset currently applied at the pivot by wind.
    pub fn sway(&self) -> Quat {
        self.sway
    }

    pub fn segment(&self) -> BranchSegment {
        BranchSegment::new(self.pivot, self.tip())
    }
}

/// Rest geometry of a segment for renderers and colliders.
#[derive(Debug, Clone, Copy)]
pub struct BranchSegment {
    pub start: Vec3,
    pub end: Vec3,
    pub length: f32,
    /// Centered on the segment midpoint, local Y along the segment.
    pub transform: Transform,
}

impl BranchSegment {
    pub fn new(start: Vec3, end: Vec3) -> Self {
        let segment_vec = end - start;
        let length = segment_vec.length();
        let center = (start + end) * 0.5;

        // Degenerate segments keep the default up axis
        let rotation = if length < 0.0001 {
            Quat::IDENTITY
        } else {
            Quat::from_rotation_arc(Vec3::Y, segment_vec / length)
        };

        Self {
            start,
            end,
            length,
            transform: Transform::from_translation(center).with_rotation(rotation),
        }
    }

    pub fn center(&self) -> Vec3 {
        self.transform.translation
    }
}

/// The branching structure of one plant.
#[derive(Debug, Clone, Default)]
pub struct PlantTree {
    nodes: Vec<BranchNode>,
}

impl PlantTree {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    /// Appends a node under `parent` (or at the base when `None`) and returns
    /// its id.
    pub(crate) fn grow(
        &mut self,
        parent: Option<BranchId>,
        pivot: Vec3,
        orientation: Quat,
        length: f32,
    ) -> BranchId {
        let id = BranchId(self.nodes.len() as u32);
        let depth = match parent {
            Some(p) => {
                let parent_node = &mut self.nodes[p.index()];
                parent_node.children.push(id);
                parent_node.depth + 1
            }
            None => 0,
        };
        self.nodes.push(BranchNode {
            id,
            pivot,
            orientation,
            length,
            depth,
            parent,
            children: Vec::new(),
            sway: Quat::IDENTITY,
        });
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in creation order.
    pub fn nodes(&self) -> &[BranchNode] {
        &self.nodes
    }

    pub fn get(&self, id: BranchId) -> Option<&BranchNode> {
        self.nodes.get(id.index())
    }

    /// The first node grown. Wind sway is applied here.
    pub fn trunk(&self) -> Option<BranchId> {
        self.nodes.first().map(|n| n.id)
    }

    /// Nodes without a parent. The trunk is always the first; further entries
    /// appear when a popped branch state resumes growth from the origin.
    pub fn base_nodes(&self) -> impl Iterator<Item = BranchId> + '_ {
        self.nodes
            .iter()
            .filter(|n| n.parent.is_none())
            .map(|n| n.id)
    }

    pub fn parent(&self, id: BranchId) -> Option<BranchId> {
        self.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: BranchId) -> &[BranchId] {
        self.get(id).map(|n| n.children()).unwrap_or(&[])
    }

    pub fn depth(&self, id: BranchId) -> Option<u32> {
        self.get(id).map(|n| n.depth)
    }

    /// Unknown ids are never terminal.
    pub fn is_terminal(&self, id: BranchId) -> bool {
        self.get(id).is_some_and(BranchNode::is_terminal)
    }

    /// Nodes with no children, in creation order.
    pub fn terminals(&self) -> Vec<BranchId> {
        self.nodes
            .iter()
            .filter(|n| n.is_terminal())
            .map(|n| n.id)
            .collect()
    }

    /// Highest tip of any segment, or `None` for an empty tree.
    pub fn max_height(&self) -> Option<f32> {
        self.nodes.iter().map(|n| n.tip().y).reduce(f32::max)
    }

    /// Terminal node whose tip is closest to `point`.
    pub fn nearest_terminal(&self, point: Vec3) -> Option<BranchId> {
        self.nodes
            .iter()
            .filter(|n| n.is_terminal())
            .min_by(|a, b| {
                a.tip()
                    .distance_squared(point)
                    .total_cmp(&b.tip().distance_squared(point))
            })
            .map(|n| n.id)
    }

    pub(crate) fn set_sway(&mut self, id: BranchId, sway: Quat) {
        if let Some(node) = self.nodes.get_mut(id.index()) {
            node.sway = sway;
        }
    }

    /// Current transform of every node's pivot, indexed by [`BranchId::index`].
    ///
    /// Each node keeps its rest offset relative to its parent's frame, and
    /// its sway rotates the node and every descendant about its pivot. With
    /// all sway at identity this reproduces the rest geometry.
    pub fn pose(&self) -> Vec<Transform> {
        let mut posed: Vec<Transform> = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let transform = match node.parent {
                Some(p) => {
                    let rest_parent = &self.nodes[p.index()];
                    let frame = posed[p.index()];
                    let inverse = rest_parent.orientation.inverse();
                    let local_offset = inverse * (node.pivot - rest_parent.pivot);
                    let local_rotation = inverse * node.orientation;
                    Transform::from_translation(frame.translation + frame.rotation * local_offset)
                        .with_rotation((frame.rotation * local_rotation * node.sway).normalize())
                }
                None => Transform::from_translation(node.pivot)
                    .with_rotation((node.orientation * node.sway).normalize()),
            };
            posed.push(transform);
        }
        posed
    }
}
