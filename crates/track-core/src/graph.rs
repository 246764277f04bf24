//! Bounded-degree directed multigraph with mirrored multiplicity links.
//!
//! # Overview
//!
//! [`NodeGraph`] is the atom of every track category: an ordered collection
//! of nodes whose array order is semantically significant (it is the
//! serialization order and the index space for cross-references), plus a
//! link relation where each edge carries a multiplicity count. The course
//! format allows a group to be listed as "next" by several other groups, so
//! parallel connections between the same pair of nodes collapse into one
//! link with a count.
//!
//! # Invariants
//!
//! - A link sits in a node's outgoing set if and only if the mirror link
//!   sits in the target's incoming set, with equal multiplicity. All link
//!   mutation goes through [`NodeGraph::try_link`] / [`NodeGraph::unlink`];
//!   the link lists are never exposed mutably.
//! - Total outgoing multiplicity per node never exceeds `limits.max_next`,
//!   and incoming never exceeds `limits.max_prev`. [`NodeGraph::try_link`]
//!   rejects the violating call instead of truncating.
//! - Node identity is a generational handle, stable across unrelated
//!   insertions and removals. A handle whose slot was recycled is detected
//!   as stale rather than silently aliasing the new occupant.

use crate::error::EditError;

/// Stable reference to a node in a [`NodeGraph`].
///
/// Slot index plus generation; removing a node bumps its slot's generation,
/// so handles to removed nodes stop resolving instead of dangling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

/// One directed connection and its multiplicity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    /// The node on the other end.
    pub target: NodeId,
    /// Number of parallel connections collapsed into this link. Always ≥ 1.
    pub count: u32,
}

/// Degree and capacity bounds for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphLimits {
    /// Maximum node count (the format's record-count field width).
    pub max_nodes: usize,
    /// Maximum total outgoing multiplicity per node.
    pub max_next: usize,
    /// Maximum total incoming multiplicity per node.
    pub max_prev: usize,
}

/// A node: category payload plus its mirrored link lists.
#[derive(Debug, Clone)]
pub struct Node<T> {
    /// Category-specific payload (position, settings, flags).
    pub data: T,
    next: Vec<Link>,
    prev: Vec<Link>,
}

impl<T> Node<T> {
    fn new(data: T) -> Self {
        Self {
            data,
            next: Vec::new(),
            prev: Vec::new(),
        }
    }

    /// Outgoing links, in insertion order.
    pub fn next(&self) -> &[Link] {
        &self.next
    }

    /// Incoming links, in insertion order.
    pub fn prev(&self) -> &[Link] {
        &self.prev
    }

    /// Total outgoing multiplicity (sum of link counts).
    pub fn out_degree(&self) -> usize {
        self.next.iter().map(|l| l.count as usize).sum()
    }

    /// Total incoming multiplicity (sum of link counts).
    pub fn in_degree(&self) -> usize {
        self.prev.iter().map(|l| l.count as usize).sum()
    }
}

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    node: Option<Node<T>>,
}

/// Ordered, bounded-degree directed multigraph.
///
/// Cloning the graph deep-copies every node and link; handles issued before
/// the clone resolve identically in both copies, which is what lets undo
/// frames restore a document while selections keep their meaning.
#[derive(Debug, Clone)]
pub struct NodeGraph<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    order: Vec<NodeId>,
    limits: GraphLimits,
}

impl<T> NodeGraph<T> {
    /// Create an empty graph with the given category bounds.
    pub fn new(limits: GraphLimits) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            order: Vec::new(),
            limits,
        }
    }

    /// The category bounds this graph enforces.
    pub fn limits(&self) -> GraphLimits {
        self.limits
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when the graph holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// True when `id` still resolves to a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Node handles in semantic (serialization) order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.order.iter().copied()
    }

    /// Nodes with their handles, in semantic order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node<T>)> + '_ {
        self.order.iter().map(move |&id| {
            let node = self.node(id).expect("order holds only live handles");
            (id, node)
        })
    }

    /// Resolve a handle to its node.
    pub fn node(&self, id: NodeId) -> Option<&Node<T>> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    /// Resolve a handle to its node, mutably. Link lists stay private; this
    /// grants access to the payload only (via `Node::data`).
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node<T>> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_mut()
    }

    /// Position of `id` in the semantic order, if live.
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        if !self.contains(id) {
            return None;
        }
        self.order.iter().position(|&other| other == id)
    }

    /// Handle at the given semantic position.
    pub fn at(&self, index: usize) -> Option<NodeId> {
        self.order.get(index).copied()
    }

    /// Append a node, rejecting the call when the category is full.
    pub fn try_add(&mut self, data: T) -> Result<NodeId, EditError> {
        if self.order.len() >= self.limits.max_nodes {
            return Err(EditError::NodeCapacity {
                limit: self.limits.max_nodes,
            });
        }
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.node = Some(Node::new(data));
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(Node::new(data)),
                });
                NodeId {
                    index,
                    generation: 0,
                }
            }
        };
        self.order.push(id);
        Ok(id)
    }

    /// Append a copy of `id`'s payload as a fresh unlinked node.
    pub fn try_clone_node(&mut self, id: NodeId) -> Result<NodeId, EditError>
    where
        T: Clone,
    {
        let data = self.node(id).ok_or(EditError::StaleNode)?.data.clone();
        self.try_add(data)
    }

    /// Remove a node, severing all of its links. Each neighbour's mirror
    /// entry is dropped outright (the whole multiplicity goes away with the
    /// node). Returns the payload, or `None` for a stale handle.
    pub fn remove(&mut self, id: NodeId) -> Option<T> {
        self.node(id)?;

        let node = {
            let slot = &mut self.slots[id.index as usize];
            slot.generation = slot.generation.wrapping_add(1);
            slot.node.take().expect("checked live above")
        };

        for link in &node.next {
            if link.target == id {
                continue; // self link died with the node
            }
            if let Some(neighbour) = self.node_mut_unchecked(link.target) {
                neighbour.prev.retain(|l| l.target != id);
            }
        }
        for link in &node.prev {
            if link.target == id {
                continue;
            }
            if let Some(neighbour) = self.node_mut_unchecked(link.target) {
                neighbour.next.retain(|l| l.target != id);
            }
        }

        self.order.retain(|&other| other != id);
        self.free.push(id.index);
        Some(node.data)
    }

    /// Add one connection `from → to`.
    ///
    /// An existing link's multiplicity is incremented; otherwise a new link
    /// with count 1 is inserted. Both directions are updated together. The
    /// call is rejected when it would push either endpoint past its degree
    /// bound, since every unit of multiplicity occupies one slot in the
    /// serialized prev/next arrays.
    pub fn try_link(&mut self, from: NodeId, to: NodeId) -> Result<(), EditError> {
        let out = self.node(from).ok_or(EditError::StaleNode)?.out_degree();
        let inc = self.node(to).ok_or(EditError::StaleNode)?.in_degree();
        if out + 1 > self.limits.max_next {
            return Err(EditError::OutgoingLinks {
                limit: self.limits.max_next,
            });
        }
        if inc + 1 > self.limits.max_prev {
            return Err(EditError::IncomingLinks {
                limit: self.limits.max_prev,
            });
        }

        let from_node = self.node_mut_unchecked(from).expect("checked live above");
        match from_node.next.iter_mut().find(|l| l.target == to) {
            Some(link) => link.count += 1,
            None => from_node.next.push(Link {
                target: to,
                count: 1,
            }),
        }
        let to_node = self.node_mut_unchecked(to).expect("checked live above");
        match to_node.prev.iter_mut().find(|l| l.target == from) {
            Some(link) => link.count += 1,
            None => to_node.prev.push(Link {
                target: from,
                count: 1,
            }),
        }
        Ok(())
    }

    /// Remove one connection `from → to`: the mirrored multiplicities are
    /// decremented, and the link entries drop out when they reach zero.
    /// Returns `false` when no such link exists (or a handle is stale).
    pub fn unlink(&mut self, from: NodeId, to: NodeId) -> bool {
        if !self.contains(from) || !self.contains(to) {
            return false;
        }
        let from_node = self.node_mut_unchecked(from).expect("checked live above");
        let Some(pos) = from_node.next.iter().position(|l| l.target == to) else {
            return false;
        };
        if from_node.next[pos].count > 1 {
            from_node.next[pos].count -= 1;
        } else {
            from_node.next.remove(pos);
        }

        let to_node = self.node_mut_unchecked(to).expect("mirror of a live link");
        let pos = to_node
            .prev
            .iter()
            .position(|l| l.target == from)
            .expect("mirror entry must exist");
        if to_node.prev[pos].count > 1 {
            to_node.prev[pos].count -= 1;
        } else {
            to_node.prev.remove(pos);
        }
        true
    }

    /// Duplicate a selection: append payload copies of `ids` (in the given
    /// order) and replicate every link whose both endpoints are inside the
    /// selection, with its multiplicity. Links crossing the selection
    /// boundary are not copied. Capacity is checked up front so a rejected
    /// call leaves the graph untouched.
    pub fn try_duplicate(&mut self, ids: &[NodeId]) -> Result<Vec<NodeId>, EditError>
    where
        T: Clone,
    {
        if self.order.len() + ids.len() > self.limits.max_nodes {
            return Err(EditError::NodeCapacity {
                limit: self.limits.max_nodes,
            });
        }
        for &id in ids {
            if !self.contains(id) {
                return Err(EditError::StaleNode);
            }
        }

        let mut copies = Vec::with_capacity(ids.len());
        for &id in ids {
            let data = self.node(id).expect("checked live above").data.clone();
            copies.push(self.try_add(data).expect("capacity checked above"));
        }
        for (i, &id) in ids.iter().enumerate() {
            let links: Vec<Link> = self.node(id).expect("checked live above").next().to_vec();
            for link in links {
                if let Some(j) = ids.iter().position(|&other| other == link.target) {
                    for _ in 0..link.count {
                        // Copies mirror degrees the originals already satisfied.
                        self.try_link(copies[i], copies[j])
                            .expect("original links satisfied the degree bounds");
                    }
                }
            }
        }
        Ok(copies)
    }

    // Slot access without the generation check repeated at every call site;
    // only used after the handle has already been validated this call.
    fn node_mut_unchecked(&mut self, id: NodeId) -> Option<&mut Node<T>> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMITS: GraphLimits = GraphLimits {
        max_nodes: 8,
        max_next: 2,
        max_prev: 2,
    };

    fn graph() -> NodeGraph<u32> {
        NodeGraph::new(LIMITS)
    }

    #[test]
    fn link_mirrors_and_multiplicity() {
        let mut g = graph();
        let a = g.try_add(0).unwrap();
        let b = g.try_add(1).unwrap();

        g.try_link(a, b).unwrap();
        g.try_link(a, b).unwrap();

        let a_node = g.node(a).unwrap();
        let b_node = g.node(b).unwrap();
        assert_eq!(a_node.next(), &[Link { target: b, count: 2 }]);
        assert_eq!(b_node.prev(), &[Link { target: a, count: 2 }]);
        assert_eq!(a_node.out_degree(), 2);
        assert_eq!(b_node.in_degree(), 2);
    }

    #[test]
    fn unlink_restores_prior_link_set() {
        let mut g = graph();
        let a = g.try_add(0).unwrap();
        let b = g.try_add(1).unwrap();

        g.try_link(a, b).unwrap();
        let before_next = g.node(a).unwrap().next().to_vec();

        g.try_link(a, b).unwrap();
        assert!(g.unlink(a, b));

        assert_eq!(g.node(a).unwrap().next(), before_next.as_slice());
        assert!(g.unlink(a, b));
        assert!(g.node(a).unwrap().next().is_empty());
        assert!(g.node(b).unwrap().prev().is_empty());
        assert!(!g.unlink(a, b));
    }

    #[test]
    fn degree_bound_rejected_not_truncated() {
        let mut g = graph();
        let a = g.try_add(0).unwrap();
        let b = g.try_add(1).unwrap();
        let c = g.try_add(2).unwrap();
        let d = g.try_add(3).unwrap();

        g.try_link(a, b).unwrap();
        g.try_link(a, c).unwrap();
        assert_eq!(
            g.try_link(a, d),
            Err(EditError::OutgoingLinks { limit: 2 })
        );
        // The rejected call must not have left a half-written mirror.
        assert_eq!(g.node(a).unwrap().out_degree(), 2);
        assert!(g.node(d).unwrap().prev().is_empty());
    }

    #[test]
    fn node_capacity_rejected() {
        let mut g = graph();
        for i in 0..8 {
            g.try_add(i).unwrap();
        }
        assert_eq!(g.try_add(9), Err(EditError::NodeCapacity { limit: 8 }));
        assert_eq!(g.len(), 8);
    }

    #[test]
    fn remove_severs_links_and_invalidates_handle() {
        let mut g = graph();
        let a = g.try_add(0).unwrap();
        let b = g.try_add(1).unwrap();
        let c = g.try_add(2).unwrap();
        g.try_link(a, b).unwrap();
        g.try_link(b, c).unwrap();

        assert_eq!(g.remove(b), Some(1));
        assert!(!g.contains(b));
        assert!(g.node(a).unwrap().next().is_empty());
        assert!(g.node(c).unwrap().prev().is_empty());

        // The recycled slot must not resurrect the old handle.
        let e = g.try_add(4).unwrap();
        assert!(g.contains(e));
        assert!(!g.contains(b));
        assert!(g.node(b).is_none());
    }

    #[test]
    fn self_link_round_trip() {
        let mut g = graph();
        let a = g.try_add(0).unwrap();
        g.try_link(a, a).unwrap();
        let node = g.node(a).unwrap();
        assert_eq!(node.next(), &[Link { target: a, count: 1 }]);
        assert_eq!(node.prev(), &[Link { target: a, count: 1 }]);

        assert!(g.unlink(a, a));
        let node = g.node(a).unwrap();
        assert!(node.next().is_empty() && node.prev().is_empty());
    }

    #[test]
    fn order_is_insertion_order_after_removal() {
        let mut g = graph();
        let a = g.try_add(10).unwrap();
        let b = g.try_add(11).unwrap();
        let c = g.try_add(12).unwrap();
        g.remove(b);
        let order: Vec<_> = g.ids().collect();
        assert_eq!(order, vec![a, c]);
        assert_eq!(g.index_of(c), Some(1));
    }

    #[test]
    fn clone_preserves_handles() {
        let mut g = graph();
        let a = g.try_add(1).unwrap();
        let b = g.try_add(2).unwrap();
        g.try_link(a, b).unwrap();

        let copy = g.clone();
        assert_eq!(copy.node(a).unwrap().data, 1);
        assert_eq!(copy.node(a).unwrap().next(), g.node(a).unwrap().next());

        // Mutating the clone must not touch the original.
        let mut copy = copy;
        copy.node_mut(a).unwrap().data = 99;
        assert_eq!(g.node(a).unwrap().data, 1);
    }
}
