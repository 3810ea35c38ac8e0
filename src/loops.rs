//! Partitioning of an unordered set of boundary edges into connected loops.
//!
//! The grouping is a greedy walk: an unvisited edge seeds a loop and the loop
//! grows by the first unvisited edge (in input order) that shares a vertex with
//! the most recently added edge, until no such edge is left. This assumes every
//! vertex has at most two incident edges, as is the case for the boundary of a
//! clean cross-section. Vertices with three or more incident edges are reported
//! in [`LoopGrouping::branching_vertices`] and the loops through them may be
//! truncated, the walk does not backtrack.
//!
//! The output only depends on the order of the input edges, so callers must
//! supply the edges in a stable order.

use std::collections::{HashMap, HashSet};

use crate::mesh::Edge;

#[derive(Debug,Clone,PartialEq)]
pub struct EdgeLoop{
    /// Edges in walk order
    pub edges: Vec<Edge>,
    /// The walk ended where it started
    pub closed: bool,
    /// The loop touches a vertex with more than two incident boundary edges
    pub branching: bool,
}

impl EdgeLoop {
    pub fn len(&self) -> usize {
        self.edges.len()
    }
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
    /// A loop that can be capped: closed and free of branching vertices.
    pub fn is_simple(&self) -> bool {
        self.closed && !self.branching
    }
    /// The vertex chain of the walk, None if consecutive edges do not form a path.
    pub fn vertices(&self) -> Option<Vec<usize>> {
        vertex_chain(&self.edges)
    }
}

#[derive(Debug,Clone,Default,PartialEq)]
pub struct LoopGrouping{
    /// Loops in discovery order
    pub loops: Vec<EdgeLoop>,
    /// Vertices with more than two incident edges, in order of first appearance
    pub branching_vertices: Vec<usize>,
}

impl LoopGrouping {
    /// True if the degree precondition was violated and loops may be incomplete.
    pub fn is_truncated(&self) -> bool {
        !self.branching_vertices.is_empty()
    }
    pub fn all_simple(&self) -> bool {
        self.loops.iter().all(|l| l.is_simple())
    }
}

/// Groups `edges` into loops of edges connected by shared vertices.
///
/// Produces the same result as scanning the remaining edges in input order for
/// a neighbour of the last added edge, but looks neighbours up in a
/// vertex to incident edge index instead.
pub fn group_into_loops(edges:&[Edge]) -> LoopGrouping {
    // repeated edges are the same edge
    let mut seen = HashSet::with_capacity(edges.len());
    let edges:Vec<Edge> = edges.iter().copied().filter(|e| seen.insert(*e)).collect();

    let mut incident:HashMap<usize,Vec<usize>> = HashMap::with_capacity(edges.len());
    let mut branching_vertices = Vec::new();
    for (i,edge) in edges.iter().enumerate() {
        for v in [edge.0,edge.1] {
            let list = incident.entry(v).or_insert_with(Vec::new);
            list.push(i);
            if list.len() == 3 { branching_vertices.push(v) }
        }
    }
    let branching:HashSet<usize> = branching_vertices.iter().copied().collect();

    let mut visited = vec![false; edges.len()];
    let mut loops = Vec::new();
    for seed in 0..edges.len() {
        if visited[seed] { continue }
        visited[seed] = true;
        let mut walk = vec![seed];
        let mut last = seed;

        loop {
            let edge = edges[last];
            let next = incident[&edge.0].iter()
                .chain(incident[&edge.1].iter())
                .copied()
                .filter(|i| !visited[*i])
                .min();
            match next {
                Some(i) => {
                    visited[i] = true;
                    walk.push(i);
                    last = i;
                },
                None => break,
            }
        }

        let loop_edges:Vec<Edge> = walk.into_iter().map(|i| edges[i]).collect();
        let closed = is_closed_chain(&loop_edges);
        let touches_branch = loop_edges.iter().any(|e| branching.contains(&e.0) || branching.contains(&e.1));
        loops.push(EdgeLoop{ edges:loop_edges, closed, branching:touches_branch });
    }

    LoopGrouping{ loops, branching_vertices }
}

/// The vertices visited by walking the edges in order.
/// A closed chain repeats its first vertex at the end.
fn vertex_chain(edges:&[Edge]) -> Option<Vec<usize>> {
    let first = edges.first()?;
    let start = match edges.get(1) {
        Some(second) if second.contains(first.1) => first.0,
        Some(second) if second.contains(first.0) => first.1,
        Some(_) => return None,
        None => first.0,
    };
    let mut chain = vec![start];
    let mut current = start;
    for edge in edges {
        current = edge.other(current)?;
        chain.push(current);
    }
    Some(chain)
}

fn is_closed_chain(edges:&[Edge]) -> bool {
    if edges.len() < 3 { return false }
    match vertex_chain(edges) {
        Some(chain) => chain.first() == chain.last(),
        None => false,
    }
}

#[cfg(test)]
fn cycle(vertices:&[usize]) -> Vec<Edge> {
    vertices.iter()
        .zip(vertices.iter().cycle().skip(1))
        .map(|(a,b)| Edge::new(*a,*b))
        .collect()
}

#[test]
fn single_cycle_is_one_loop_in_walk_order_test(){
    let edges = cycle(&[0,1,2,3,4,5]);
    let grouping = group_into_loops(&edges);
    assert_eq!(grouping.loops.len(),1);
    let edge_loop = &grouping.loops[0];
    assert_eq!(edge_loop.len(),6);
    assert!(edge_loop.is_simple());
    assert_eq!(edge_loop.vertices().unwrap(), vec![0,1,2,3,4,5,0]);
    assert!(!grouping.is_truncated());
}

#[test]
fn shuffled_cycle_is_walked_in_connectivity_order_test(){
    let edges = vec![Edge::new(2,3),Edge::new(0,1),Edge::new(3,0),Edge::new(1,2)];
    let grouping = group_into_loops(&edges);
    assert_eq!(grouping.loops.len(),1);
    let walked = &grouping.loops[0].edges;
    assert_eq!(walked, &vec![Edge::new(2,3),Edge::new(3,0),Edge::new(0,1),Edge::new(1,2)]);
    for pair in walked.windows(2) {
        assert!(pair[0].shares_vertex(&pair[1]));
    }
    assert!(grouping.loops[0].closed);
}

#[test]
fn disjoint_cycles_are_separate_loops_test(){
    let square = cycle(&[0,1,2,3]);
    let triangle = cycle(&[10,11,12]);
    // interleave the two boundaries
    let mut edges = Vec::new();
    for i in 0..4 {
        edges.push(square[i]);
        if i < 3 { edges.push(triangle[i]) }
    }
    let grouping = group_into_loops(&edges);
    assert_eq!(grouping.loops.len(),2);
    assert_eq!(grouping.loops[0].len(),4);
    assert_eq!(grouping.loops[1].len(),3);
    assert!(grouping.loops[0].edges.iter().all(|e| e.0 < 10 && e.1 < 10));
    assert!(grouping.loops[1].edges.iter().all(|e| e.0 >= 10 && e.1 >= 10));
    assert!(grouping.all_simple());
}

#[test]
fn coincident_vertices_are_not_merged_test(){
    // two triangles sharing a position but not a vertex index
    let mut edges = cycle(&[0,1,2]);
    edges.extend(cycle(&[3,4,5]));
    let grouping = group_into_loops(&edges);
    assert_eq!(grouping.loops.len(),2);
}

#[test]
fn branching_vertex_is_flagged_test(){
    // theta shape: vertices 0 and 2 have three incident edges
    let edges = vec![
        Edge::new(0,1),Edge::new(1,2),
        Edge::new(2,3),Edge::new(3,0),
        Edge::new(0,2),
    ];
    let grouping = group_into_loops(&edges);
    assert!(grouping.is_truncated());
    assert_eq!(grouping.branching_vertices, vec![0,2]);
    let total:usize = grouping.loops.iter().map(|l| l.len()).sum();
    assert_eq!(total,edges.len());
    assert!(grouping.loops.iter().all(|l| l.branching));
    assert!(!grouping.all_simple());
}

#[test]
fn open_chain_is_not_closed_test(){
    let edges = vec![Edge::new(0,1),Edge::new(1,2),Edge::new(2,3)];
    let grouping = group_into_loops(&edges);
    assert_eq!(grouping.loops.len(),1);
    assert!(!grouping.loops[0].closed);
    assert_eq!(grouping.loops[0].vertices().unwrap(), vec![0,1,2,3]);
}

#[test]
fn empty_input_test(){
    assert_eq!(group_into_loops(&[]), LoopGrouping::default());
}
