use std::collections::{BTreeSet, VecDeque};

use anyhow::Result;
use log::{debug, info, warn};

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use crate::bridge::BridgeSet;
use crate::contig::*;
use crate::evidence::EvidenceCollector;
use crate::repository::Repository;

/// Parameters of one scaffolding run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(default))]
pub struct ScaffoldConfig {
    /// Contigs shorter than this are never expanded
    pub min_length: i64,
    /// Largest insert size still trusted as a pUC template
    pub puc_limit: i64,
    /// Templates needed before an edge is followed or extracted
    pub min_bridges: usize,
    /// Upper bound on the number of contigs the explorer visits
    pub max_contigs: Option<usize>,
}

impl Default for ScaffoldConfig {
    fn default() -> Self {
        ScaffoldConfig {
            min_length: 0,
            puc_limit: 8000,
            min_bridges: 2,
            max_contigs: None,
        }
    }
}

impl ScaffoldConfig {
    pub const MIN_LENGTH_VAR: &'static str = "SCAFFOLD_MINLEN";
    pub const PUC_LIMIT_VAR: &'static str = "SCAFFOLD_PUCLIMIT";
    pub const MIN_BRIDGES_VAR: &'static str = "SCAFFOLD_MINBRIDGES";
    pub const MAX_CONTIGS_VAR: &'static str = "SCAFFOLD_MAX_CONTIGS";

    /// The defaults, overridden by any of the `SCAFFOLD_*`
    /// environment variables that are set
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// The defaults, overridden by the values `lookup` returns.
    /// Values that don't parse are logged and ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parse_var<T, F>(lookup: &F, key: &str, default: T) -> T
        where
            T: std::str::FromStr + std::fmt::Display,
            F: Fn(&str) -> Option<String>,
        {
            match lookup(key) {
                None => default,
                Some(value) => match value.trim().parse() {
                    Ok(v) => v,
                    Err(_) => {
                        warn!(
                            "Could not parse {}={:?}, using the default {}",
                            key, value, default
                        );
                        default
                    }
                },
            }
        }

        let default = Self::default();

        let max_contigs = match lookup(Self::MAX_CONTIGS_VAR) {
            None => default.max_contigs,
            Some(value) => match value.trim().parse() {
                Ok(n) => Some(n),
                Err(_) => {
                    warn!(
                        "Could not parse {}={:?}, leaving the contig count unbounded",
                        Self::MAX_CONTIGS_VAR,
                        value
                    );
                    default.max_contigs
                }
            },
        };

        ScaffoldConfig {
            min_length: parse_var(&lookup, Self::MIN_LENGTH_VAR, default.min_length),
            puc_limit: parse_var(&lookup, Self::PUC_LIMIT_VAR, default.puc_limit),
            min_bridges: parse_var(&lookup, Self::MIN_BRIDGES_VAR, default.min_bridges),
            max_contigs,
        }
    }

    /// Load a config from a JSON file. Missing fields keep their
    /// defaults.
    #[cfg(feature = "serde1")]
    pub fn load_json<P: AsRef<std::path::Path>>(
        path: P,
    ) -> std::io::Result<Self> {
        use std::{fs::File, io::BufReader};
        let file = File::open(path.as_ref())?;
        let reader = BufReader::new(file);
        let config = serde_json::from_reader(reader)?;
        Ok(config)
    }
}

/// Progress notifications of a scaffolding run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScaffoldEvent {
    Start,
    /// Number of contigs waiting in the exploration queue
    ContigSetSize(usize),
    BeginContig(ContigId),
    /// Number of links found around the current contig
    LinksExamined(usize),
    /// Number of contigs visited so far
    ContigsExamined(usize),
    FindingSubgraph,
    Finish,
}

pub trait ScaffoldListener {
    fn scaffold_update(&mut self, event: ScaffoldEvent);
}

impl ScaffoldListener for () {
    fn scaffold_update(&mut self, _event: ScaffoldEvent) {}
}

impl ScaffoldListener for Vec<ScaffoldEvent> {
    fn scaffold_update(&mut self, event: ScaffoldEvent) {
        self.push(event);
    }
}

/// The bridges gathered by an exploration and every contig it
/// visited, expanded or not
#[derive(Default, Debug, Clone)]
pub struct Exploration {
    pub bridges: BridgeSet,
    pub visited: BTreeSet<ContigId>,
}

/// Breadth-first expansion of a contig set: each qualifying contig
/// contributes its links, and every neighbour with enough support
/// joins the queue.
pub struct ContigSetExplorer<'a, R> {
    repo: &'a R,
    config: ScaffoldConfig,
}

impl<'a, R: Repository> ContigSetExplorer<'a, R> {
    pub fn new(repo: &'a R, config: ScaffoldConfig) -> Self {
        ContigSetExplorer { repo, config }
    }

    pub fn config(&self) -> &ScaffoldConfig {
        &self.config
    }

    fn qualifies(&self, id: ContigId) -> Result<Option<Contig>> {
        let contig = match self.repo.contig(id)? {
            Some(c) => c,
            None => return Ok(None),
        };
        if contig.length < self.config.min_length || !self.repo.is_current(id)? {
            return Ok(None);
        }
        Ok(Some(contig))
    }

    pub fn explore<L>(&self, seeds: &[ContigId], listener: &mut L) -> Result<Exploration>
    where
        L: ScaffoldListener + ?Sized,
    {
        let collector = EvidenceCollector::new(self.repo, self.config.puc_limit);

        let mut result = Exploration::default();
        let mut queue: VecDeque<ContigId> = seeds.iter().copied().collect();

        while let Some(id) = queue.pop_front() {
            listener.scaffold_update(ScaffoldEvent::ContigSetSize(queue.len() + 1));

            if result.visited.contains(&id) {
                continue;
            }

            if let Some(max) = self.config.max_contigs {
                if result.visited.len() >= max {
                    info!(
                        "Stopping after {} contigs, {} left in the queue",
                        max,
                        queue.len() + 1
                    );
                    break;
                }
            }

            result.visited.insert(id);

            let contig = match self.qualifies(id)? {
                Some(c) => c,
                None => {
                    debug!("Skipping contig {}", id);
                    continue;
                }
            };

            listener.scaffold_update(ScaffoldEvent::BeginContig(id));

            let links = collector.collect_both(&contig)?;
            let mut linked = BTreeSet::new();
            for link in links.iter() {
                result.bridges.add_bridge(link);
                linked.insert(link.contig_b.id);
            }

            listener.scaffold_update(ScaffoldEvent::LinksExamined(links.len()));

            for b in linked {
                if result.visited.contains(&b) {
                    continue;
                }
                let supported = Junction::ALL.iter().any(|&j| {
                    result.bridges.support_count(id, b, j) >= self.config.min_bridges
                });
                if supported {
                    queue.push_back(b);
                }
            }

            listener
                .scaffold_update(ScaffoldEvent::ContigsExamined(result.visited.len()));
        }

        info!(
            "Explored {} contigs, {} bridges",
            result.visited.len(),
            result.bridges.len()
        );

        Ok(result)
    }
}
