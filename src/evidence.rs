use anyhow::Result;
use log::debug;

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use crate::contig::*;
use crate::repository::Repository;

/// One paired-read observation linking an end of contig A to
/// contig B. The gap is the estimated distance between the two
/// contigs implied by the template's maximum insert size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct Link {
    pub contig_a: Contig,
    pub contig_b: Contig,
    pub junction: Junction,
    pub template: TemplateId,
    pub read_a: ReadId,
    pub read_b: ReadId,
    pub gap: i64,
}

/// Gathers the raw links leaving either end of a contig. Evidence is
/// best-effort: reads with no template or insert size data are
/// skipped, and untrustworthy observations are dropped silently.
pub struct EvidenceCollector<'a, R> {
    repo: &'a R,
    puc_limit: i64,
}

impl<'a, R: Repository> EvidenceCollector<'a, R> {
    pub fn new(repo: &'a R, puc_limit: i64) -> Self {
        EvidenceCollector { repo, puc_limit }
    }

    pub fn puc_limit(&self) -> i64 {
        self.puc_limit
    }

    /// All links leaving the given end of the contig
    pub fn collect(&self, contig: &Contig, end: ContigEnd) -> Result<Vec<Link>> {
        let window = ReadWindow::at_end(contig, end, self.puc_limit);
        let reads = self.repo.end_reads(contig.id, window, end.outward())?;

        let mut links = Vec::new();

        for read in reads {
            self.collect_read(contig, end, &read, &mut links)?;
        }

        debug!(
            "Contig {} {} end: {} links",
            contig.id,
            end.as_char(),
            links.len()
        );

        Ok(links)
    }

    /// Links from both ends of the contig, right end first
    pub fn collect_both(&self, contig: &Contig) -> Result<Vec<Link>> {
        let mut links = self.collect(contig, ContigEnd::Right)?;
        links.extend(self.collect(contig, ContigEnd::Left)?);
        Ok(links)
    }

    fn collect_read(
        &self,
        contig: &Contig,
        end: ContigEnd,
        read: &EndRead,
        links: &mut Vec<Link>,
    ) -> Result<()> {
        let (template, strand) = match self.repo.read_template(read.read)? {
            Some(t) => t,
            None => return Ok(()),
        };

        let insert = match self.repo.insert_size(template)? {
            Some(s) => s,
            None => return Ok(()),
        };

        if insert.high > self.puc_limit {
            return Ok(());
        }

        // offsets come from the repository unchecked, so out of range
        // arithmetic skips the read
        let overhang = match end {
            ContigEnd::Right => read
                .start
                .checked_add(insert.high)
                .and_then(|o| o.checked_sub(contig.length)),
            ContigEnd::Left => insert.high.checked_sub(read.finish),
        };

        let overhang = match overhang {
            Some(o) if o >= 1 => o,
            _ => return Ok(()),
        };

        for mate in self.repo.mates(template, strand)? {
            for mapping in self.repo.current_mappings(mate)? {
                if mapping.contig == contig.id {
                    continue;
                }

                let link_contig = match self.repo.contig(mapping.contig)? {
                    Some(c) => c,
                    None => continue,
                };

                let gap = if mapping.orientation.is_forward() {
                    link_contig
                        .length
                        .checked_sub(mapping.start)
                        .and_then(|tail| overhang.checked_sub(tail))
                } else {
                    overhang.checked_sub(mapping.finish)
                };

                let gap = match gap {
                    Some(g) if g > 0 => g,
                    _ => continue,
                };

                links.push(Link {
                    contig_a: *contig,
                    contig_b: link_contig,
                    junction: Junction::new(end, mapping.orientation),
                    template,
                    read_a: read.read,
                    read_b: mate,
                    gap,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::tests::mapping;
    use crate::repository::MemoryRepository;
    use Orientation::*;

    // contig 1 (1000 bp), contig 2 (500 bp), one template [0, 2000]
    // with a forward read at 950 on contig 1 and its mate forward at
    // the start of contig 2
    fn example_repo() -> MemoryRepository {
        let mut repo = MemoryRepository::new();
        repo.add_contig(1, 1000, true).unwrap();
        repo.add_contig(2, 500, true).unwrap();
        repo.add_template(10, 0, 2000).unwrap();
        repo.add_read(100, 10, Strand::Forward);
        repo.add_read(101, 10, Strand::Reverse);
        repo.add_mapping(100, mapping(1, 950, 999, Forward));
        repo.add_mapping(101, mapping(2, 0, 99, Forward));
        repo
    }

    fn contig(repo: &MemoryRepository, id: ContigId) -> Contig {
        use crate::repository::ContigRepository;
        repo.contig(id).unwrap().unwrap()
    }

    #[test]
    fn right_end_example() {
        let repo = example_repo();
        let collector = EvidenceCollector::new(&repo, 8000);

        let links = collector.collect(&contig(&repo, 1), ContigEnd::Right).unwrap();
        assert_eq!(1, links.len());

        let link = links[0];
        assert_eq!(1, link.contig_a.id);
        assert_eq!(2, link.contig_b.id);
        assert_eq!(Junction::RightFlip, link.junction);
        assert_eq!(10, link.template);
        assert_eq!((100, 101), (link.read_a, link.read_b));
        // overhang 950 + 2000 - 1000 = 1950, gap 1950 - (500 - 0)
        assert_eq!(1450, link.gap);

        let left = collector.collect(&contig(&repo, 1), ContigEnd::Left).unwrap();
        assert!(left.is_empty());
    }

    #[test]
    fn mate_side_sees_the_symmetric_link() {
        let repo = example_repo();
        let collector = EvidenceCollector::new(&repo, 8000);

        let links = collector.collect_both(&contig(&repo, 2)).unwrap();
        assert_eq!(1, links.len());
        assert_eq!(2, links[0].contig_a.id);
        assert_eq!(1, links[0].contig_b.id);
        assert_eq!(Junction::RightFlip, links[0].junction);
        // overhang 0 + 2000 - 500 = 1500, gap 1500 - (1000 - 950)
        assert_eq!(1450, links[0].gap);
    }

    #[test]
    fn left_end_with_reverse_mate() {
        let mut repo = MemoryRepository::new();
        repo.add_contig(1, 5000, true).unwrap();
        repo.add_contig(2, 3000, true).unwrap();
        repo.add_template(20, 1000, 3000).unwrap();
        repo.add_read(200, 20, Strand::Forward);
        repo.add_read(201, 20, Strand::Reverse);
        repo.add_mapping(200, mapping(1, 0, 400, Reverse));
        repo.add_mapping(201, mapping(2, 0, 599, Reverse));

        let collector = EvidenceCollector::new(&repo, 8000);
        let links = collector.collect(&contig(&repo, 1), ContigEnd::Left).unwrap();

        assert_eq!(1, links.len());
        assert_eq!(Junction::LeftFlip, links[0].junction);
        // overhang 3000 - 400 = 2600, gap 2600 - 599
        assert_eq!(2001, links[0].gap);

        assert!(collector
            .collect(&contig(&repo, 1), ContigEnd::Right)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn untrusted_libraries_are_ignored() {
        let repo = example_repo();
        let collector = EvidenceCollector::new(&repo, 1999);
        let links = collector.collect_both(&contig(&repo, 1)).unwrap();
        assert!(links.is_empty());
    }

    #[test]
    fn short_overhang_and_negative_gaps_are_rejected() {
        let mut repo = example_repo();
        // template too short to leave contig 1
        repo.add_template(11, 0, 40).unwrap();
        repo.add_read(110, 11, Strand::Forward);
        repo.add_read(111, 11, Strand::Reverse);
        repo.add_mapping(110, mapping(1, 955, 999, Forward));
        repo.add_mapping(111, mapping(2, 0, 20, Forward));

        // overhang 960 + 520 - 1000 = 480 does not reach past the
        // 500 bp of contig 2
        repo.add_template(12, 0, 520).unwrap();
        repo.add_read(120, 12, Strand::Forward);
        repo.add_read(121, 12, Strand::Reverse);
        repo.add_mapping(120, mapping(1, 960, 999, Forward));
        repo.add_mapping(121, mapping(2, 0, 20, Forward));

        let collector = EvidenceCollector::new(&repo, 8000);
        let links = collector.collect(&contig(&repo, 1), ContigEnd::Right).unwrap();

        assert_eq!(vec![10], links.iter().map(|l| l.template).collect::<Vec<_>>());
    }

    #[test]
    fn self_links_and_missing_data_are_skipped() {
        let mut repo = example_repo();
        // mate maps back onto contig 1
        repo.add_template(13, 0, 3000).unwrap();
        repo.add_read(130, 13, Strand::Forward);
        repo.add_read(131, 13, Strand::Reverse);
        repo.add_mapping(130, mapping(1, 900, 999, Forward));
        repo.add_mapping(131, mapping(1, 0, 99, Forward));

        // read without a template
        repo.add_mapping(140, mapping(1, 970, 999, Forward));

        // template without an insert size
        repo.add_read(150, 15, Strand::Forward);
        repo.add_read(151, 15, Strand::Reverse);
        repo.add_mapping(150, mapping(1, 980, 999, Forward));
        repo.add_mapping(151, mapping(2, 0, 99, Forward));

        let collector = EvidenceCollector::new(&repo, 8000);
        let links = collector.collect_both(&contig(&repo, 1)).unwrap();

        assert_eq!(1, links.len());
        assert!(links.iter().all(|l| l.contig_a.id != l.contig_b.id));
    }

    #[test]
    fn extreme_offsets_are_skipped() {
        let mut repo = example_repo();
        // read start so large the overhang overflows
        repo.add_template(16, 0, 2000).unwrap();
        repo.add_read(160, 16, Strand::Forward);
        repo.add_read(161, 16, Strand::Reverse);
        repo.add_mapping(160, mapping(1, i64::MAX - 10, i64::MAX, Forward));
        repo.add_mapping(161, mapping(2, 0, 99, Forward));

        // mate start so small the gap overflows
        repo.add_template(17, 0, 2000).unwrap();
        repo.add_read(170, 17, Strand::Forward);
        repo.add_read(171, 17, Strand::Reverse);
        repo.add_mapping(170, mapping(1, 960, 999, Forward));
        repo.add_mapping(171, mapping(2, i64::MIN, 99, Forward));

        let collector = EvidenceCollector::new(&repo, 8000);
        let links = collector.collect(&contig(&repo, 1), ContigEnd::Right).unwrap();
        assert_eq!(vec![10], links.iter().map(|l| l.template).collect::<Vec<_>>());

        let collector = EvidenceCollector::new(&repo, i64::MIN);
        assert!(collector.collect_both(&contig(&repo, 1)).unwrap().is_empty());
    }

    #[test]
    fn every_current_mapping_of_a_mate_is_linked() {
        let mut repo = example_repo();
        repo.add_contig(3, 800, true).unwrap();
        repo.add_contig(4, 600, false).unwrap();
        // the mate of 100 also maps to current contig 3 and to the
        // superseded contig 4
        repo.add_mapping(101, mapping(3, 200, 299, Reverse));
        repo.add_mapping(101, mapping(4, 0, 99, Forward));

        let collector = EvidenceCollector::new(&repo, 8000);
        let links = collector.collect(&contig(&repo, 1), ContigEnd::Right).unwrap();

        let found: Vec<_> = links
            .iter()
            .map(|l| (l.contig_b.id, l.junction, l.read_b, l.gap))
            .collect();
        // overhang 1950: 1950 - (500 - 0) on contig 2, 1950 - 299 on 3
        assert_eq!(
            vec![
                (2, Junction::RightFlip, 101, 1450),
                (3, Junction::RightSame, 101, 1651),
            ],
            found
        );
    }
}
