use crate::bridge::Edge;
use crate::layout::{Inconsistency, InconsistencyKind, Layout, Placement};
use crate::subgraph::SubGraph;
use std::fmt::Write;

// Write edge, as a bridge dump line
pub fn write_edge<T: Write>(edge: &Edge, stream: &mut T) -> std::fmt::Result {
    write!(
        stream,
        "{} {} {} {} {} {} {}",
        edge.contig_a.id,
        edge.contig_a.length,
        edge.contig_b.id,
        edge.contig_b.length,
        edge.junction,
        edge.support,
        edge.gap
    )
}

pub fn edge_string(edge: &Edge) -> String {
    let mut result = String::new();
    let _ = write_edge(edge, &mut result);
    result
}

// Write placement
pub fn write_placement<T: Write>(
    placement: &Placement,
    stream: &mut T,
) -> std::fmt::Result {
    write!(
        stream,
        "Contig {} : row {} from {} to {} in {:#} sense",
        placement.contig.id,
        placement.row,
        placement.range.start(),
        placement.range.end(),
        placement.orientation
    )
}

pub fn placement_string(placement: &Placement) -> String {
    let mut result = String::new();
    let _ = write_placement(placement, &mut result);
    result
}

pub fn write_inconsistency<T: Write>(
    inc: &Inconsistency,
    stream: &mut T,
) -> std::fmt::Result {
    let what = match inc.kind {
        InconsistencyKind::BothPlaced => "have both been laid out already",
        InconsistencyKind::Unreachable => "have not been laid out yet",
    };
    write!(
        stream,
        "INCONSISTENCY : contigs {} and {} {} (junction {}, {} templates, gap {})",
        inc.contig_a, inc.contig_b, what, inc.junction, inc.support, inc.gap
    )
}

pub fn inconsistency_string(inc: &Inconsistency) -> String {
    let mut result = String::new();
    let _ = write_inconsistency(inc, &mut result);
    result
}

/// One dump line per edge, each terminated by a newline
pub fn write_subgraph<T: Write>(graph: &SubGraph, stream: &mut T) -> std::fmt::Result {
    for edge in graph.edges() {
        write_edge(edge, stream)?;
        writeln!(stream)?;
    }
    Ok(())
}

pub fn subgraph_string(graph: &SubGraph) -> String {
    let mut result = String::new();
    let _ = write_subgraph(graph, &mut result);
    result
}

/// Placements sorted by start, end and row, followed by any
/// inconsistencies, one per line
pub fn write_layout<T: Write>(layout: &Layout, stream: &mut T) -> std::fmt::Result {
    for placement in layout.sorted() {
        write_placement(&placement, stream)?;
        writeln!(stream)?;
    }
    for inc in layout.inconsistencies.iter() {
        write_inconsistency(inc, stream)?;
        writeln!(stream)?;
    }
    Ok(())
}

pub fn layout_string(layout: &Layout) -> String {
    let mut result = String::new();
    let _ = write_layout(layout, &mut result);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contig::{Contig, Junction};
    use crate::gap::GapRange;
    use crate::layout::LayoutEngine;

    fn example_edge() -> Edge {
        Edge {
            contig_a: Contig::new(1, 1000).unwrap(),
            contig_b: Contig::new(2, 500).unwrap(),
            junction: Junction::RightFlip,
            support: 1,
            gap: GapRange::from_gap(1450),
            templates: vec![10],
        }
    }

    #[test]
    fn print_edge() {
        let edge = example_edge();
        assert_eq!("1 1000 2 500 1 1 1450:1450", edge_string(&edge));
        assert_eq!(edge_string(&edge), edge.to_string());
    }

    #[test]
    fn print_layout() {
        let graph = SubGraph::from_edges(vec![example_edge()]);
        assert_eq!("1 1000 2 500 1 1 1450:1450\n", subgraph_string(&graph));

        let layout = LayoutEngine::new().layout(&graph);
        let lines: Vec<String> = layout.sorted().iter().map(placement_string).collect();
        assert_eq!(
            vec![
                "Contig 1 : row 0 from 0 to 999 in forward sense",
                "Contig 2 : row 0 from 2450 to 2949 in reverse sense",
            ],
            lines
        );

        let expected = format!("{}\n{}\n", lines[0], lines[1]);
        assert_eq!(expected, layout_string(&layout));
        assert_eq!(expected, layout.to_string());
    }

    #[test]
    fn print_inconsistency() {
        let inc = Inconsistency {
            kind: InconsistencyKind::BothPlaced,
            contig_a: 1,
            contig_b: 3,
            junction: Junction::LeftSame,
            support: 2,
            gap: GapRange::from_gap(80),
        };
        assert_eq!(
            "INCONSISTENCY : contigs 1 and 3 have both been laid out already \
             (junction 3, 2 templates, gap 80:80)",
            inconsistency_string(&inc)
        );
    }
}
