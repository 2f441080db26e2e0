use fnv::FnvHashMap;
use log::{debug, warn};

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use crate::bridge::Edge;
use crate::contig::*;
use crate::gap::GapRange;
use crate::subgraph::SubGraph;
use crate::writer;

/// Inclusive span of scaffold coordinates, with `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct Range {
    start: i64,
    end: i64,
}

impl Range {
    /// The bounds may be given in either order
    pub fn new(a: i64, b: i64) -> Self {
        Range {
            start: a.min(b),
            end: a.max(b),
        }
    }

    #[inline]
    pub fn start(&self) -> i64 {
        self.start
    }

    #[inline]
    pub fn end(&self) -> i64 {
        self.end
    }

    #[inline]
    pub fn len(&self) -> i64 {
        1 + self.end - self.start
    }

    #[inline]
    pub fn overlaps(&self, other: &Range) -> bool {
        !(self.start > other.end || self.end < other.start)
    }

    #[inline]
    pub fn shift(self, offset: i64) -> Self {
        Range {
            start: self.start + offset,
            end: self.end + offset,
        }
    }
}

/// Occupied ranges on each row of a layout in progress
#[derive(Default, Debug, Clone)]
pub struct RowRanges {
    rows: Vec<Vec<Range>>,
}

impl RowRanges {
    pub fn new() -> Self {
        Default::default()
    }

    /// Put the range in the first row where it overlaps nothing,
    /// opening a new row if there is none, and return the row index
    pub fn add_range(&mut self, range: Range) -> usize {
        for (ix, row) in self.rows.iter_mut().enumerate() {
            if !row.iter().any(|r| r.overlaps(&range)) {
                row.push(range);
                return ix;
            }
        }
        self.rows.push(vec![range]);
        self.rows.len() - 1
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Where and in which sense a contig lies in the scaffold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct Placement {
    pub contig: Contig,
    pub row: usize,
    pub range: Range,
    pub orientation: Orientation,
}

impl Placement {
    /// Lay out `other` against this placement across the given edge,
    /// where this placement holds the edge's contig A.
    fn place_across(
        &self,
        other: Contig,
        junction: Junction,
        gap: i64,
        rows: &mut RowRanges,
    ) -> Placement {
        let start_a = self.range.start();
        let end_a = start_a + self.contig.length;

        let range = if junction.places_right(self.orientation) {
            let start_b = end_a + gap;
            Range::new(start_b, start_b + other.length - 1)
        } else {
            let end_b = start_a - gap;
            Range::new(end_b - other.length + 1, end_b)
        };

        Placement {
            contig: other,
            row: rows.add_range(range),
            range,
            orientation: junction.orientation_b(self.orientation),
        }
    }
}

impl std::fmt::Display for Placement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writer::write_placement(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub enum InconsistencyKind {
    /// Both contigs of the edge were already laid out
    BothPlaced,
    /// No laid out contig is touched by the remaining edges
    Unreachable,
}

/// An edge the layout could not honour. It was dropped without
/// moving any placement.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct Inconsistency {
    pub kind: InconsistencyKind,
    pub contig_a: ContigId,
    pub contig_b: ContigId,
    pub junction: Junction,
    pub support: usize,
    pub gap: GapRange,
}

impl Inconsistency {
    fn new(kind: InconsistencyKind, edge: &Edge) -> Self {
        Inconsistency {
            kind,
            contig_a: edge.contig_a.id,
            contig_b: edge.contig_b.id,
            junction: edge.junction,
            support: edge.support,
            gap: edge.gap,
        }
    }
}

impl std::fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writer::write_inconsistency(self, f)
    }
}

/// The placements of one sub-graph, in the order they were made,
/// together with every edge that had to be dropped.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct Layout {
    pub placements: Vec<Placement>,
    pub inconsistencies: Vec<Inconsistency>,
}

impl Layout {
    pub fn get(&self, id: ContigId) -> Option<&Placement> {
        self.placements.iter().find(|p| p.contig.id == id)
    }

    /// Placements ordered by start, then end, then row
    pub fn sorted(&self) -> Vec<Placement> {
        let mut sorted = self.placements.clone();
        sorted.sort_by_key(|p| (p.range.start(), p.range.end(), p.row));
        sorted
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Number of rows used
    pub fn rows(&self) -> usize {
        self.placements
            .iter()
            .map(|p| p.row + 1)
            .max()
            .unwrap_or(0)
    }

    /// Distance from the leftmost start to the rightmost end
    pub fn span(&self) -> i64 {
        let start = self.placements.iter().map(|p| p.range.start()).min();
        let end = self.placements.iter().map(|p| p.range.end()).max();
        match (start, end) {
            (Some(s), Some(e)) => 1 + e - s,
            _ => 0,
        }
    }

    /// Shift every range so that the leftmost start is 0, if any
    /// range starts below 0
    pub fn normalize(&mut self) {
        let xmin = self
            .placements
            .iter()
            .map(|p| p.range.start())
            .min()
            .unwrap_or(0);

        if xmin < 0 {
            for p in self.placements.iter_mut() {
                p.range = p.range.shift(-xmin);
            }
        }
    }

    /// Save the layout to a JSON file.
    #[cfg(feature = "serde1")]
    pub fn save_json<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> std::io::Result<()> {
        use std::{fs::File, io::BufWriter};
        let file = File::create(path.as_ref())?;
        let writer = BufWriter::new(file);
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    /// Load a layout from a JSON file.
    #[cfg(feature = "serde1")]
    pub fn load_json<P: AsRef<std::path::Path>>(
        path: P,
    ) -> std::io::Result<Self> {
        use std::{fs::File, io::BufReader};
        let file = File::open(path.as_ref())?;
        let reader = BufReader::new(file);
        let layout = serde_json::from_reader(reader)?;
        Ok(layout)
    }
}

impl std::fmt::Display for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writer::write_layout(self, f)
    }
}

/// Which contigs of a pending edge are already laid out, with the
/// index of the placement to grow from
enum Anchor {
    Both,
    ContigA(usize),
    ContigB(usize),
}

/// Greedy layout of a sub-graph: the strongest edges are honoured
/// first and every contig is placed exactly once.
#[derive(Default, Debug, Clone, Copy)]
pub struct LayoutEngine;

impl LayoutEngine {
    pub fn new() -> Self {
        LayoutEngine
    }

    pub fn layout(&self, graph: &SubGraph) -> Layout {
        let mut pending: Vec<&Edge> = graph.edges().iter().collect();
        pending.sort_by_key(|e| e.support_order());

        let mut layout = Layout::default();
        let mut placed: FnvHashMap<ContigId, usize> = FnvHashMap::default();
        let mut rows = RowRanges::new();

        if pending.is_empty() {
            return layout;
        }

        let first = pending.remove(0);
        let anchor_range = Range::new(0, first.contig_a.length - 1);
        let anchor = Placement {
            contig: first.contig_a,
            row: rows.add_range(anchor_range),
            range: anchor_range,
            orientation: Orientation::Forward,
        };
        let other = anchor.place_across(
            first.contig_b,
            first.junction,
            first.gap.min().unwrap_or(0),
            &mut rows,
        );

        debug!("Laid out contig {} at {}", anchor.contig.id, anchor);
        debug!("Laid out contig {} at {}", other.contig.id, other);

        for p in [anchor, other].iter() {
            placed.insert(p.contig.id, layout.placements.len());
            layout.placements.push(*p);
        }

        while !pending.is_empty() {
            let next = pending.iter().enumerate().find_map(|(ix, e)| {
                let anchor = match (placed.get(&e.contig_a.id), placed.get(&e.contig_b.id)) {
                    (Some(_), Some(_)) => Anchor::Both,
                    (Some(&a), None) => Anchor::ContigA(a),
                    (None, Some(&b)) => Anchor::ContigB(b),
                    (None, None) => return None,
                };
                Some((ix, anchor))
            });

            let (ix, anchor) = match next {
                Some(next) => next,
                None => {
                    for edge in pending.drain(..) {
                        let inc = Inconsistency::new(InconsistencyKind::Unreachable, edge);
                        warn!("{}", inc);
                        layout.inconsistencies.push(inc);
                    }
                    break;
                }
            };

            let edge = pending.remove(ix);
            let gap = edge.gap.min().unwrap_or(0);

            let new = match anchor {
                Anchor::Both => {
                    let inc = Inconsistency::new(InconsistencyKind::BothPlaced, edge);
                    warn!("{}", inc);
                    layout.inconsistencies.push(inc);
                    continue;
                }
                Anchor::ContigA(a) => layout.placements[a].place_across(
                    edge.contig_b,
                    edge.junction,
                    gap,
                    &mut rows,
                ),
                Anchor::ContigB(b) => layout.placements[b].place_across(
                    edge.contig_a,
                    edge.junction.swap(),
                    gap,
                    &mut rows,
                ),
            };

            debug!("Laid out contig {} at {}", new.contig.id, new);
            placed.insert(new.contig.id, layout.placements.len());
            layout.placements.push(new);
        }

        layout.normalize();
        layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Junction::*;
    use Orientation::*;

    fn contig(id: ContigId, length: i64) -> Contig {
        Contig::new(id, length).unwrap()
    }

    fn edge(a: Contig, b: Contig, junction: Junction, support: usize, gap: i64) -> Edge {
        Edge {
            contig_a: a,
            contig_b: b,
            junction,
            support,
            gap: GapRange::from_gap(gap),
            templates: (0..support as u32).collect(),
        }
    }

    fn span(layout: &Layout, id: ContigId) -> (usize, i64, i64, Orientation) {
        let p = layout.get(id).unwrap();
        (p.row, p.range.start(), p.range.end(), p.orientation)
    }

    #[test]
    fn ranges_and_rows() {
        let r = Range::new(20, 10);
        assert_eq!((10, 20), (r.start(), r.end()));
        assert_eq!(11, r.len());
        assert!(r.overlaps(&Range::new(20, 30)));
        assert!(!r.overlaps(&Range::new(21, 30)));
        assert_eq!(Range::new(0, 10), r.shift(-10));

        let mut rows = RowRanges::new();
        assert_eq!(0, rows.add_range(Range::new(0, 99)));
        assert_eq!(0, rows.add_range(Range::new(100, 199)));
        assert_eq!(1, rows.add_range(Range::new(50, 149)));
        assert_eq!(1, rows.add_range(Range::new(150, 160)));
        assert_eq!(2, rows.add_range(Range::new(140, 155)));
        assert_eq!(0, rows.add_range(Range::new(-10, -1)));
        assert_eq!(3, rows.row_count());
    }

    #[test]
    fn two_contig_example() {
        let graph = SubGraph::from_edges(vec![edge(
            contig(1, 1000),
            contig(2, 500),
            RightFlip,
            1,
            1450,
        )]);

        let layout = LayoutEngine::new().layout(&graph);

        assert_eq!(2, layout.len());
        assert_eq!((0, 0, 999, Forward), span(&layout, 1));
        assert_eq!((0, 2450, 2949, Reverse), span(&layout, 2));
        assert!(layout.inconsistencies.is_empty());
    }

    #[test]
    fn placement_from_contig_b_swaps_roles() {
        // strongest edge places 1 and 2; the next edge is recorded
        // from contig 3 towards contig 2 and must be read backwards
        let graph = SubGraph::from_edges(vec![
            edge(contig(1, 1000), contig(2, 500), RightSame, 5, 100),
            edge(contig(3, 300), contig(2, 500), RightSame, 2, 50),
        ]);

        let layout = LayoutEngine::new().layout(&graph);

        assert_eq!((0, 0, 999, Forward), span(&layout, 1));
        assert_eq!((0, 1100, 1599, Forward), span(&layout, 2));
        // seen from 2 the edge is LeftSame, so 3 goes left of 2 and
        // collides with 1 on the first row
        assert_eq!((1, 751, 1050, Forward), span(&layout, 3));
    }

    #[test]
    fn leftward_placements_are_normalized() {
        let graph = SubGraph::from_edges(vec![edge(
            contig(1, 1000),
            contig(2, 500),
            LeftSame,
            3,
            200,
        )]);

        let layout = LayoutEngine::new().layout(&graph);

        // before normalizing, 2 lies at [-699, -200]
        assert_eq!((0, 0, 499, Forward), span(&layout, 2));
        assert_eq!((0, 699, 1698, Forward), span(&layout, 1));
        assert_eq!(0, layout.placements.iter().map(|p| p.range.start()).min().unwrap());
        assert_eq!(1699, layout.span());
    }

    #[test]
    fn every_edge_is_placed_or_reported() {
        let (c1, c2, c3, c4) = (contig(1, 1000), contig(2, 500), contig(3, 800), contig(4, 300));
        let graph = SubGraph::from_edges(vec![
            edge(c1, c2, RightSame, 5, 100),
            edge(c2, c3, RightSame, 4, 100),
            edge(c1, c3, RightFlip, 3, 100),
            edge(contig(7, 100), contig(8, 100), RightSame, 2, 10),
            edge(c4, c3, RightSame, 1, 20),
        ]);

        let layout = LayoutEngine::new().layout(&graph);

        let ids: Vec<_> = layout.placements.iter().map(|p| p.contig.id).collect();
        assert_eq!(vec![1, 2, 3, 4], ids);
        let kinds: Vec<_> = layout.inconsistencies.iter().map(|i| i.kind).collect();
        assert_eq!(
            vec![InconsistencyKind::BothPlaced, InconsistencyKind::Unreachable],
            kinds
        );
        assert_eq!(graph.len() + 1, layout.len() + layout.inconsistencies.len());
    }

    #[test]
    fn cycles_record_inconsistencies() {
        let c1 = contig(1, 1000);
        let c2 = contig(2, 500);
        let c3 = contig(3, 800);
        let graph = SubGraph::from_edges(vec![
            edge(c1, c2, RightSame, 4, 100),
            edge(c2, c3, RightSame, 3, 100),
            edge(c1, c3, RightFlip, 2, 100),
        ]);

        let layout = LayoutEngine::new().layout(&graph);

        assert_eq!(3, layout.len());
        assert_eq!((0, 1700, 2499, Forward), span(&layout, 3));
        assert_eq!(1, layout.inconsistencies.len());

        let inc = &layout.inconsistencies[0];
        assert_eq!(InconsistencyKind::BothPlaced, inc.kind);
        assert_eq!((1, 3, RightFlip, 2), (inc.contig_a, inc.contig_b, inc.junction, inc.support));
    }

    #[test]
    fn disconnected_edges_are_unreachable() {
        let graph = SubGraph::from_edges(vec![
            edge(contig(1, 100), contig(2, 100), RightSame, 3, 10),
            edge(contig(5, 100), contig(6, 100), RightSame, 2, 10),
        ]);

        let layout = LayoutEngine::new().layout(&graph);

        assert_eq!(2, layout.len());
        assert!(layout.get(5).is_none());
        assert_eq!(1, layout.inconsistencies.len());
        assert_eq!(InconsistencyKind::Unreachable, layout.inconsistencies[0].kind);
    }

    #[test]
    fn rows_never_overlap() {
        // a star around contig 1: every neighbour is placed at the
        // same offset to the right
        let hub = contig(1, 1000);
        let edges = (2..8)
            .map(|id| edge(hub, contig(id, 400), RightSame, 10 - id as usize, 100))
            .collect();

        let layout = LayoutEngine::new().layout(&SubGraph::from_edges(edges));
        assert_eq!(7, layout.len());
        assert_eq!(6, layout.rows());

        for a in layout.placements.iter() {
            for b in layout.placements.iter() {
                if a.contig != b.contig && a.row == b.row {
                    assert!(!a.range.overlaps(&b.range));
                }
            }
        }
    }

    #[test]
    fn strongest_edge_anchors_the_layout() {
        let graph = SubGraph::from_edges(vec![
            edge(contig(1, 100), contig(2, 100), RightSame, 1, 10),
            edge(contig(2, 100), contig(3, 100), RightSame, 9, 10),
        ]);

        let layout = LayoutEngine::new().layout(&graph);
        assert_eq!(2, layout.placements[0].contig.id);
        assert_eq!((0, 0, 99, Forward), span(&layout, 1));
        assert_eq!((0, 109, 208, Forward), span(&layout, 2));
        assert_eq!((0, 219, 318, Forward), span(&layout, 3));

        let sorted: Vec<_> = layout.sorted().iter().map(|p| p.contig.id).collect();
        assert_eq!(vec![1, 2, 3], sorted);
    }

    #[test]
    fn empty_graph_gives_empty_layout() {
        let layout = LayoutEngine::new().layout(&SubGraph::new());
        assert!(layout.is_empty());
        assert!(layout.inconsistencies.is_empty());
        assert_eq!(0, layout.rows());
    }

    #[cfg(feature = "serde1")]
    #[test]
    fn layout_json_round_trip() {
        let graph = SubGraph::from_edges(vec![edge(
            contig(1, 1000),
            contig(2, 500),
            RightFlip,
            1,
            1450,
        )]);
        let layout = LayoutEngine::new().layout(&graph);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.json");
        layout.save_json(&path).unwrap();
        assert_eq!(layout, Layout::load_json(&path).unwrap());
    }
}
