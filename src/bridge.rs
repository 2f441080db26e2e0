use std::collections::{BTreeMap, BTreeSet};

use fnv::FnvHashMap;

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use crate::contig::*;
use crate::evidence::Link;
use crate::gap::GapRange;
use crate::writer;

/// All the read pairs of one template that link the same contig
/// ends in the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bridge {
    pub contig_a: ContigId,
    pub contig_b: ContigId,
    pub junction: Junction,
    pub template: TemplateId,
    pub read_pairs: BTreeSet<(ReadId, ReadId)>,
    pub gap: GapRange,
}

impl Bridge {
    fn new(
        contig_a: ContigId,
        contig_b: ContigId,
        junction: Junction,
        template: TemplateId,
    ) -> Self {
        Bridge {
            contig_a,
            contig_b,
            junction,
            template,
            read_pairs: BTreeSet::new(),
            gap: GapRange::new(),
        }
    }
}

/// Aggregate of every bridge between one pair of contig ends. The
/// support is the number of independent templates.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct Edge {
    pub contig_a: Contig,
    pub contig_b: Contig,
    pub junction: Junction,
    pub support: usize,
    pub gap: GapRange,
    pub templates: Vec<TemplateId>,
}

impl Edge {
    #[inline]
    pub fn touches(&self, id: ContigId) -> bool {
        self.contig_a.id == id || self.contig_b.id == id
    }

    /// Sort key: strongest support first, then by contig pair and
    /// junction code
    #[inline]
    pub fn support_order(&self) -> (std::cmp::Reverse<usize>, ContigId, ContigId, u8) {
        (
            std::cmp::Reverse(self.support),
            self.contig_a.id,
            self.contig_b.id,
            self.junction.code(),
        )
    }
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writer::write_edge(self, f)
    }
}

type ByTemplate = FnvHashMap<TemplateId, Bridge>;
type ByJunction = FnvHashMap<Junction, ByTemplate>;
type ByContigB = FnvHashMap<ContigId, ByJunction>;

/// Puts a contig pair in (lower ID, higher ID) order, swapping the
/// junction when the pair is reversed.
#[inline]
fn canonical(
    a: ContigId,
    b: ContigId,
    junction: Junction,
) -> (ContigId, ContigId, Junction, bool) {
    if b < a {
        (b, a, junction.swap(), true)
    } else {
        (a, b, junction, false)
    }
}

/// Bridges keyed by contig A, contig B, junction and template, with
/// `id(A) < id(B)`. Evidence seen from either contig of a pair lands
/// in the same bridge.
#[derive(Default, Debug, Clone)]
pub struct BridgeSet {
    by_contig_a: FnvHashMap<ContigId, ByContigB>,
    contigs: FnvHashMap<ContigId, Contig>,
}

impl BridgeSet {
    pub fn new() -> Self {
        Default::default()
    }

    /// Fold one link into its bridge. Self-links are ignored.
    pub fn add_bridge(&mut self, link: &Link) {
        if link.contig_a.id == link.contig_b.id {
            return;
        }

        self.contigs.insert(link.contig_a.id, link.contig_a);
        self.contigs.insert(link.contig_b.id, link.contig_b);

        let (a, b, junction, swapped) =
            canonical(link.contig_a.id, link.contig_b.id, link.junction);
        let reads = if swapped {
            (link.read_b, link.read_a)
        } else {
            (link.read_a, link.read_b)
        };

        let bridge = self
            .by_contig_a
            .entry(a)
            .or_default()
            .entry(b)
            .or_default()
            .entry(junction)
            .or_default()
            .entry(link.template)
            .or_insert_with(|| Bridge::new(a, b, junction, link.template));

        bridge.read_pairs.insert(reads);
        bridge.gap.add(link.gap);
    }

    fn by_template(
        &self,
        a: ContigId,
        b: ContigId,
        junction: Junction,
    ) -> Option<&ByTemplate> {
        let (a, b, junction, _) = canonical(a, b, junction);
        self.by_contig_a.get(&a)?.get(&b)?.get(&junction)
    }

    /// Number of distinct templates bridging (A, B, junction), in
    /// either direction
    pub fn support_count(&self, a: ContigId, b: ContigId, junction: Junction) -> usize {
        self.by_template(a, b, junction).map_or(0, |t| t.len())
    }

    pub fn bridge(
        &self,
        a: ContigId,
        b: ContigId,
        junction: Junction,
        template: TemplateId,
    ) -> Option<&Bridge> {
        self.by_template(a, b, junction)?.get(&template)
    }

    /// A contig seen in any recorded link
    pub fn contig(&self, id: ContigId) -> Option<&Contig> {
        self.contigs.get(&id)
    }

    pub fn bridges(&self) -> impl Iterator<Item = &Bridge> {
        self.by_contig_a
            .values()
            .flat_map(|by_b| by_b.values())
            .flat_map(|by_j| by_j.values())
            .flat_map(|by_t| by_t.values())
    }

    pub fn len(&self) -> usize {
        self.bridges().count()
    }

    pub fn is_empty(&self) -> bool {
        self.by_contig_a.is_empty()
    }

    /// The aggregated edges with at least `min_bridges` supporting
    /// templates, one per (A, B, junction), ordered by contig pair and
    /// junction.
    pub fn edges(&self, min_bridges: usize) -> Vec<Edge> {
        let mut sorted: BTreeMap<(ContigId, ContigId, Junction), &ByTemplate> =
            BTreeMap::new();

        for (&a, by_b) in self.by_contig_a.iter() {
            for (&b, by_j) in by_b.iter() {
                for (&j, by_t) in by_j.iter() {
                    if by_t.len() >= min_bridges && !by_t.is_empty() {
                        sorted.insert((a, b, j), by_t);
                    }
                }
            }
        }

        sorted
            .into_iter()
            .filter_map(|((a, b, junction), by_t)| {
                let contig_a = *self.contigs.get(&a)?;
                let contig_b = *self.contigs.get(&b)?;

                let mut gap = GapRange::new();
                let mut templates: Vec<_> = by_t.keys().copied().collect();
                templates.sort_unstable();
                by_t.values().for_each(|br| gap.merge(&br.gap));

                Some(Edge {
                    contig_a,
                    contig_b,
                    junction,
                    support: by_t.len(),
                    gap,
                    templates,
                })
            })
            .collect()
    }

    /// Write one line per edge with at least `min_bridges` support,
    /// in the format `idA lenA idB lenB junction support min:max`
    pub fn dump<W: std::fmt::Write>(
        &self,
        stream: &mut W,
        min_bridges: usize,
    ) -> std::fmt::Result {
        for edge in self.edges(min_bridges) {
            writer::write_edge(&edge, stream)?;
            writeln!(stream)?;
        }
        Ok(())
    }

    pub fn dump_string(&self, min_bridges: usize) -> String {
        let mut result = String::new();
        // writing to a String cannot fail
        let _ = self.dump(&mut result, min_bridges);
        result
    }
}
