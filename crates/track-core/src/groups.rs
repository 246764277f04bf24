//! Group segmentation codec for the path categories.
//!
//! # Overview
//!
//! The editing model is an arbitrary bounded-degree point graph; the file
//! format stores only *linear runs* of points per group plus fixed six-slot
//! arrays of previous/next group indices. This module converts between the
//! two representations:
//!
//! - [`encode_groups`] partitions a graph into the minimum set of maximal
//!   unbranched runs, assigns contiguous flat-array indices group by group,
//!   and computes each group's prev/next index arrays.
//! - [`decode_groups`] rebuilds the point graph from group records, applying
//!   only the "next" direction of each record (the prev arrays are derivable
//!   and applying both would double link multiplicities).
//!
//! # Determinism
//!
//! Group discovery follows node array order, so repeated saves of an
//! unmodified document are byte-identical. This is a required property of
//! the encoder, not an optimization.

use std::collections::HashMap;

use crate::entities::UNUSED;
use crate::graph::{GraphLimits, NodeGraph, NodeId};

/// Capacity of the serialized prev/next group arrays.
pub const MAX_GROUP_LINKS: usize = 6;

/// One group record: a `(start, len)` run in the flat point array plus its
/// neighbour groups. Unused slots hold the [`UNUSED`] sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupRecord {
    /// Index of the run's first point in the flat array.
    pub start: u8,
    /// Number of points in the run (≥ 1 in any valid record).
    pub len: u8,
    /// Indices of groups whose last point links into this group's start.
    pub prev: [u8; MAX_GROUP_LINKS],
    /// Indices of groups whose start the last point of this group links to.
    pub next: [u8; MAX_GROUP_LINKS],
}

impl GroupRecord {
    /// A record with empty neighbour arrays.
    pub fn new(start: u8, len: u8) -> Self {
        Self {
            start,
            len,
            prev: [UNUSED; MAX_GROUP_LINKS],
            next: [UNUSED; MAX_GROUP_LINKS],
        }
    }

    /// Populated entries of the prev array.
    pub fn prev_entries(&self) -> impl Iterator<Item = u8> + '_ {
        self.prev.iter().copied().filter(|&g| g != UNUSED)
    }

    /// Populated entries of the next array.
    pub fn next_entries(&self) -> impl Iterator<Item = u8> + '_ {
        self.next.iter().copied().filter(|&g| g != UNUSED)
    }
}

/// Result of [`encode_groups`]: the flat serialization order plus records.
#[derive(Debug, Clone)]
pub struct GroupLayout {
    /// Every node of the graph, concatenated run by run. The position of a
    /// node in this vector is its flat-array index in the file.
    pub order: Vec<NodeId>,
    /// One record per group, in discovery order.
    pub groups: Vec<GroupRecord>,
}

impl GroupLayout {
    /// Flat index of the group's first point.
    pub fn group_start(&self, group: usize) -> usize {
        self.groups[group].start as usize
    }
}

/// True when a node begins a group: the single-predecessor/single-successor
/// chain is broken on its incoming side. Degree counts sum multiplicities,
/// since every parallel connection occupies one serialized slot.
fn is_group_start<T>(graph: &NodeGraph<T>, id: NodeId) -> bool {
    let node = graph.node(id).expect("live handle");
    let in_degree = node.in_degree();
    if in_degree != 1 {
        return true;
    }
    let pred = node.prev()[0].target;
    graph.node(pred).expect("mirror of live link").out_degree() > 1
}

/// Walk a maximal unbranched run beginning at `start`, marking nodes seen.
fn walk_run<T>(
    graph: &NodeGraph<T>,
    start: NodeId,
    visited: &mut HashMap<NodeId, usize>,
    group: usize,
) -> Vec<NodeId> {
    let mut run = vec![start];
    visited.insert(start, group);

    let mut current = start;
    loop {
        let node = graph.node(current).expect("live handle");
        if node.out_degree() != 1 {
            break;
        }
        let target = node.next()[0].target;
        let target_node = graph.node(target).expect("mirror of live link");
        if target_node.in_degree() != 1 || visited.contains_key(&target) {
            break;
        }
        run.push(target);
        visited.insert(target, group);
        current = target;
    }
    run
}

/// Partition a point graph into maximal simple runs and compute the group
/// records (§ encode direction).
///
/// Two passes over the node order: the first walks from every node whose
/// incoming side breaks the chain rule; the second claims whatever is left,
/// which can only be branch-free cycles, starting each at its lowest-index
/// node. The back-edge of a cycle becomes an ordinary next/prev entry (a
/// single-group cycle lists itself).
pub fn encode_groups<T>(graph: &NodeGraph<T>) -> GroupLayout {
    // node -> group index, doubling as the visited set
    let mut visited: HashMap<NodeId, usize> = HashMap::with_capacity(graph.len());
    let mut runs: Vec<Vec<NodeId>> = Vec::new();

    for id in graph.ids() {
        if !visited.contains_key(&id) && is_group_start(graph, id) {
            let group = runs.len();
            runs.push(walk_run(graph, id, &mut visited, group));
        }
    }
    for id in graph.ids() {
        if !visited.contains_key(&id) {
            let group = runs.len();
            runs.push(walk_run(graph, id, &mut visited, group));
        }
    }

    let mut order = Vec::with_capacity(graph.len());
    let mut groups = Vec::with_capacity(runs.len());
    for run in &runs {
        let start = order.len() as u8;
        order.extend_from_slice(run);
        groups.push(GroupRecord::new(start, run.len() as u8));
    }

    // Next arrays from the last point's outgoing links (one slot per unit of
    // multiplicity); prev arrays derived from them so both sides agree.
    for (g, run) in runs.iter().enumerate() {
        let last = *run.last().expect("runs are never empty");
        let node = graph.node(last).expect("live handle");
        let mut slot = 0;
        for link in node.next() {
            let target_group = visited[&link.target];
            for _ in 0..link.count {
                groups[g].next[slot] = target_group as u8;
                slot += 1;
            }
        }
    }
    for g in 0..groups.len() {
        let successors: Vec<u8> = groups[g].next_entries().collect();
        for h in successors {
            let prev = &mut groups[h as usize].prev;
            let slot = prev
                .iter()
                .position(|&p| p == UNUSED)
                .expect("in-degree bound keeps prev within six slots");
            prev[slot] = g as u8;
        }
    }

    GroupLayout { order, groups }
}

/// Rebuild a point graph from group records and the flat point payloads
/// (§ decode direction).
///
/// Corrupt records are skipped, not fatal: a group whose run falls outside
/// the point array, or a next entry referencing a missing group, produces a
/// `(record index, message)` issue and the rest of the section still loads.
pub fn decode_groups<T>(
    records: &[GroupRecord],
    points: Vec<T>,
    limits: GraphLimits,
) -> (NodeGraph<T>, Vec<(usize, String)>) {
    let mut issues = Vec::new();
    let mut graph = NodeGraph::new(limits);

    let mut ids = Vec::with_capacity(points.len());
    for (i, point) in points.into_iter().enumerate() {
        match graph.try_add(point) {
            Ok(id) => ids.push(id),
            Err(err) => {
                issues.push((i, format!("point dropped: {err}")));
            }
        }
    }

    // Validate runs first so every record's usability is known before any
    // cross-group link is applied.
    let usable: Vec<bool> = records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let start = record.start as usize;
            let len = record.len as usize;
            if len == 0 {
                issues.push((i, "empty group".to_string()));
                return false;
            }
            if start + len > ids.len() {
                issues.push((
                    i,
                    format!(
                        "group run {}..{} exceeds the {}-point array",
                        start,
                        start + len,
                        ids.len()
                    ),
                ));
                return false;
            }
            true
        })
        .collect();

    for (i, record) in records.iter().enumerate() {
        if !usable[i] {
            continue;
        }
        let start = record.start as usize;
        let len = record.len as usize;
        for w in ids[start..start + len].windows(2) {
            if let Err(err) = graph.try_link(w[0], w[1]) {
                issues.push((i, format!("run link rejected: {err}")));
            }
        }
    }

    for (i, record) in records.iter().enumerate() {
        if !usable[i] {
            continue;
        }
        let last = ids[record.start as usize + record.len as usize - 1];
        for h in record.next_entries() {
            let h = h as usize;
            if h >= records.len() || !usable[h] {
                issues.push((i, format!("next entry references missing group {h}")));
                continue;
            }
            let first = ids[records[h].start as usize];
            if let Err(err) = graph.try_link(last, first) {
                issues.push((i, format!("group link rejected: {err}")));
            }
        }
        // The prev arrays are the mirror of the next direction and are left
        // as a derivable consistency property; applying them as well would
        // double every link multiplicity.
    }

    (graph, issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::PATH_LIMITS;

    fn chain(n: usize) -> (NodeGraph<u32>, Vec<NodeId>) {
        let mut g = NodeGraph::new(PATH_LIMITS);
        let ids: Vec<_> = (0..n).map(|i| g.try_add(i as u32).unwrap()).collect();
        for w in ids.windows(2) {
            g.try_link(w[0], w[1]).unwrap();
        }
        (g, ids)
    }

    #[test]
    fn simple_chain_is_one_group() {
        let (g, ids) = chain(6);
        let layout = encode_groups(&g);
        assert_eq!(layout.order, ids);
        assert_eq!(layout.groups.len(), 1);
        let record = layout.groups[0];
        assert_eq!((record.start, record.len), (0, 6));
        assert!(record.prev_entries().next().is_none());
        assert!(record.next_entries().next().is_none());
    }

    #[test]
    fn branch_splits_groups() {
        // A -> B -> C, plus B -> D: branch at B ends the first group.
        let mut g = NodeGraph::new(PATH_LIMITS);
        let a = g.try_add(0).unwrap();
        let b = g.try_add(1).unwrap();
        let c = g.try_add(2).unwrap();
        let d = g.try_add(3).unwrap();
        g.try_link(a, b).unwrap();
        g.try_link(b, c).unwrap();
        g.try_link(b, d).unwrap();

        let layout = encode_groups(&g);
        assert_eq!(layout.groups.len(), 3);
        assert_eq!(layout.order, vec![a, b, c, d]);

        let ab = layout.groups[0];
        assert_eq!((ab.start, ab.len), (0, 2));
        let next: Vec<_> = ab.next_entries().collect();
        assert_eq!(next, vec![1, 2]);

        let c_group = layout.groups[1];
        assert_eq!((c_group.start, c_group.len), (2, 1));
        assert_eq!(c_group.prev_entries().collect::<Vec<_>>(), vec![0]);
        let d_group = layout.groups[2];
        assert_eq!((d_group.start, d_group.len), (3, 1));
        assert_eq!(d_group.prev_entries().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn merge_starts_a_group() {
        // A -> C and B -> C: C has two incoming links, so it starts a group.
        let mut g = NodeGraph::new(PATH_LIMITS);
        let a = g.try_add(0).unwrap();
        let b = g.try_add(1).unwrap();
        let c = g.try_add(2).unwrap();
        g.try_link(a, c).unwrap();
        g.try_link(b, c).unwrap();

        let layout = encode_groups(&g);
        assert_eq!(layout.groups.len(), 3);
        let c_group = layout
            .groups
            .iter()
            .position(|r| layout.order[r.start as usize] == c)
            .unwrap();
        let prev: Vec<_> = layout.groups[c_group].prev_entries().collect();
        assert_eq!(prev.len(), 2);
    }

    #[test]
    fn isolated_node_is_its_own_group() {
        let mut g = NodeGraph::new(PATH_LIMITS);
        g.try_add(7u32).unwrap();
        let layout = encode_groups(&g);
        assert_eq!(layout.groups.len(), 1);
        assert_eq!((layout.groups[0].start, layout.groups[0].len), (0, 1));
    }

    #[test]
    fn branch_free_cycle_links_to_itself() {
        let (mut g, ids) = chain(4);
        g.try_link(ids[3], ids[0]).unwrap();

        let layout = encode_groups(&g);
        assert_eq!(layout.groups.len(), 1);
        let record = layout.groups[0];
        assert_eq!((record.start, record.len), (0, 4));
        assert_eq!(record.next_entries().collect::<Vec<_>>(), vec![0]);
        assert_eq!(record.prev_entries().collect::<Vec<_>>(), vec![0]);
        // Deterministic start: lowest node array index.
        assert_eq!(layout.order[0], ids[0]);
    }

    #[test]
    fn parallel_links_occupy_one_slot_each() {
        let mut g = NodeGraph::new(PATH_LIMITS);
        let a = g.try_add(0).unwrap();
        let b = g.try_add(1).unwrap();
        g.try_link(a, b).unwrap();
        g.try_link(a, b).unwrap();

        // Multiplicity two forces a group boundary between A and B.
        let layout = encode_groups(&g);
        assert_eq!(layout.groups.len(), 2);
        assert_eq!(layout.groups[0].next_entries().collect::<Vec<_>>(), vec![1, 1]);
        assert_eq!(layout.groups[1].prev_entries().collect::<Vec<_>>(), vec![0, 0]);
    }

    #[test]
    fn groups_are_maximal() {
        // No two adjacent groups may be mergeable: every boundary must be
        // forced by a branch, merge, or cycle closure.
        let mut g = NodeGraph::new(PATH_LIMITS);
        let ids: Vec<_> = (0..8).map(|i| g.try_add(i as u32).unwrap()).collect();
        for w in ids.windows(2) {
            g.try_link(w[0], w[1]).unwrap();
        }
        g.try_link(ids[3], ids[6]).unwrap(); // shortcut creates branch + merge

        let layout = encode_groups(&g);
        for record in &layout.groups {
            let first = layout.order[record.start as usize];
            let node = g.node(first).unwrap();
            let mergeable_with_prev = node.in_degree() == 1
                && g.node(node.prev()[0].target).unwrap().out_degree() == 1
                && node.prev()[0].target != layout.order[record.start as usize + record.len as usize - 1];
            assert!(!mergeable_with_prev, "group at {} could merge", record.start);
        }
    }

    #[test]
    fn decode_rebuilds_links() {
        let records = vec![
            {
                let mut r = GroupRecord::new(0, 2);
                r.next[0] = 1;
                r.next[1] = 2;
                r
            },
            {
                let mut r = GroupRecord::new(2, 1);
                r.prev[0] = 0;
                r
            },
            {
                let mut r = GroupRecord::new(3, 1);
                r.prev[0] = 0;
                r
            },
        ];
        let (g, issues) = decode_groups(&records, vec![0u32, 1, 2, 3], PATH_LIMITS);
        assert!(issues.is_empty());

        let ids: Vec<_> = g.ids().collect();
        assert_eq!(g.node(ids[0]).unwrap().out_degree(), 1);
        assert_eq!(g.node(ids[1]).unwrap().out_degree(), 2);
        assert_eq!(g.node(ids[2]).unwrap().in_degree(), 1);
        assert_eq!(g.node(ids[3]).unwrap().in_degree(), 1);
    }

    #[test]
    fn decode_skips_corrupt_records() {
        let records = vec![
            GroupRecord::new(0, 2),
            GroupRecord::new(1, 9), // run exceeds point array
            {
                let mut r = GroupRecord::new(2, 1);
                r.next[0] = 17; // dangling group reference
                r
            },
        ];
        let (g, issues) = decode_groups(&records, vec![0u32, 1, 2], PATH_LIMITS);
        assert_eq!(g.len(), 3);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].0, 1);
        assert_eq!(issues[1].0, 2);
    }

    #[test]
    fn encode_decode_round_trip_structure() {
        let mut g = NodeGraph::new(PATH_LIMITS);
        let ids: Vec<_> = (0..7).map(|i| g.try_add(i as u32).unwrap()).collect();
        for w in ids.windows(2) {
            g.try_link(w[0], w[1]).unwrap();
        }
        g.try_link(ids[2], ids[5]).unwrap();
        g.try_link(ids[6], ids[0]).unwrap();

        let layout = encode_groups(&g);
        let points: Vec<u32> = layout
            .order
            .iter()
            .map(|&id| g.node(id).unwrap().data)
            .collect();
        let (decoded, issues) = decode_groups(&layout.groups, points, PATH_LIMITS);
        assert!(issues.is_empty());

        // Structural equality of the link relation on payloads.
        let edge_set = |graph: &NodeGraph<u32>| {
            let mut edges: Vec<(u32, u32, u32)> = Vec::new();
            for (_, node) in graph.iter() {
                for link in node.next() {
                    let to = graph.node(link.target).unwrap().data;
                    edges.push((node.data, to, link.count));
                }
            }
            edges.sort_unstable();
            edges
        };
        assert_eq!(edge_set(&g), edge_set(&decoded));
    }
}
