use std::collections::BTreeSet;
use std::iter;

use fnv::FnvHashMap;

use crate::bridge::{BridgeSet, Edge};
use crate::contig::ContigId;

/// The edges of one connected component of the bridge graph
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct SubGraph {
    edges: Vec<Edge>,
}

impl SubGraph {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn from_edges(edges: Vec<Edge>) -> Self {
        SubGraph { edges }
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn into_edges(self) -> Vec<Edge> {
        self.edges
    }

    pub fn add_edge(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    /// The IDs of every contig touched by an edge
    pub fn contigs(&self) -> BTreeSet<ContigId> {
        self.edges
            .iter()
            .flat_map(|e| iter::once(e.contig_a.id).chain(iter::once(e.contig_b.id)))
            .collect()
    }

    pub fn contains(&self, id: ContigId) -> bool {
        self.edges.iter().any(|e| e.touches(id))
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    fn sort(&mut self) {
        self.edges.sort_by_key(|e| (e.contig_a.id, e.contig_b.id, e.junction));
    }
}

/// Splits the qualifying edges of a bridge set into connected
/// components.
///
/// Components live in an arena. Each contig maps to the arena slot of
/// the component that first claimed it, and slots are joined by a
/// union-find with path compression and union by size. The edges of
/// the smaller component move into the larger on every merge.
#[derive(Default, Debug, Clone)]
pub struct GraphExtractor {
    owner: FnvHashMap<ContigId, usize>,
    parent: Vec<usize>,
    graphs: Vec<SubGraph>,
}

impl GraphExtractor {
    /// Partition the edges with at least `min_bridges` support
    pub fn new(bridges: &BridgeSet, min_bridges: usize) -> Self {
        Self::from_edges(bridges.edges(min_bridges))
    }

    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = Edge>,
    {
        let mut extractor = GraphExtractor::default();
        for edge in edges {
            extractor.add_edge(edge);
        }

        for ix in 0..extractor.parent.len() {
            let root = extractor.find(ix);
            extractor.parent[ix] = root;
        }
        extractor.graphs.iter_mut().for_each(SubGraph::sort);

        extractor
    }

    fn find(&mut self, ix: usize) -> usize {
        let mut root = ix;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        let mut cur = ix;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }

        root
    }

    fn new_graph(&mut self) -> usize {
        let ix = self.graphs.len();
        self.graphs.push(SubGraph::new());
        self.parent.push(ix);
        ix
    }

    fn union(&mut self, x: usize, y: usize) -> usize {
        let (x, y) = (self.find(x), self.find(y));
        if x == y {
            return x;
        }

        let (large, small) = if self.graphs[x].len() >= self.graphs[y].len() {
            (x, y)
        } else {
            (y, x)
        };

        let moved = std::mem::take(&mut self.graphs[small].edges);
        self.graphs[large].edges.extend(moved);
        self.parent[small] = large;
        large
    }

    fn add_edge(&mut self, edge: Edge) {
        let a = edge.contig_a.id;
        let b = edge.contig_b.id;

        let owner_a = self.owner.get(&a).copied();
        let owner_b = self.owner.get(&b).copied();

        let ix = match (owner_a, owner_b) {
            (Some(x), Some(y)) => self.union(x, y),
            (Some(x), None) => {
                let root = self.find(x);
                self.owner.insert(b, root);
                root
            }
            (None, Some(y)) => {
                let root = self.find(y);
                self.owner.insert(a, root);
                root
            }
            (None, None) => {
                let ix = self.new_graph();
                self.owner.insert(a, ix);
                self.owner.insert(b, ix);
                ix
            }
        };

        self.graphs[ix].add_edge(edge);
    }

    fn root(&self, id: ContigId) -> Option<usize> {
        let mut ix = *self.owner.get(&id)?;
        while self.parent[ix] != ix {
            ix = self.parent[ix];
        }
        Some(ix)
    }

    /// The component containing `seed`, empty if the seed has no
    /// qualifying edge
    pub fn extract(&self, seed: ContigId) -> SubGraph {
        self.root(seed)
            .map(|ix| self.graphs[ix].clone())
            .unwrap_or_default()
    }

    /// Every non-empty component, ordered by its lowest contig ID
    pub fn subgraphs(&self) -> Vec<SubGraph> {
        let mut graphs: Vec<(ContigId, SubGraph)> = self
            .parent
            .iter()
            .enumerate()
            .filter(|&(ix, &p)| ix == p)
            .filter_map(|(ix, _)| {
                let graph = &self.graphs[ix];
                let first = graph.contigs().into_iter().next()?;
                Some((first, graph.clone()))
            })
            .collect();
        graphs.sort_by_key(|(first, _)| *first);
        graphs.into_iter().map(|(_, g)| g).collect()
    }

    /// Number of contigs with at least one qualifying edge
    pub fn contig_count(&self) -> usize {
        self.owner.len()
    }
}
