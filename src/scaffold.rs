use anyhow::Result;
use log::info;

use crate::bridge::BridgeSet;
use crate::contig::ContigId;
use crate::explorer::{ContigSetExplorer, ScaffoldConfig, ScaffoldEvent, ScaffoldListener};
use crate::layout::{Layout, LayoutEngine};
use crate::repository::{CachedRepository, Repository};
use crate::subgraph::{GraphExtractor, SubGraph};

/// The connected component grown from one seed, and its layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scaffold {
    pub seed: ContigId,
    pub subgraph: SubGraph,
    pub layout: Layout,
}

impl Scaffold {
    pub fn is_empty(&self) -> bool {
        self.subgraph.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ScaffoldRun {
    pub bridges: BridgeSet,
    pub scaffolds: Vec<Scaffold>,
}

/// Runs evidence collection, exploration, extraction and layout
/// against one repository. Repository lookups are memoized for the
/// length of a run.
pub struct Scaffolder<R> {
    repo: CachedRepository<R>,
    config: ScaffoldConfig,
}

impl<R: Repository> Scaffolder<R> {
    pub fn new(repo: R, config: ScaffoldConfig) -> Self {
        Scaffolder {
            repo: CachedRepository::new(repo),
            config,
        }
    }

    pub fn config(&self) -> &ScaffoldConfig {
        &self.config
    }

    pub fn repository(&self) -> &R {
        self.repo.inner()
    }

    /// Explore from all the seeds at once, then extract and lay out
    /// the component of each seed. A seed whose component was already
    /// laid out for an earlier seed is skipped; a seed without
    /// qualifying edges gives an empty scaffold.
    pub fn run<L>(&self, seeds: &[ContigId], listener: &mut L) -> Result<ScaffoldRun>
    where
        L: ScaffoldListener + ?Sized,
    {
        self.repo.clear();
        listener.scaffold_update(ScaffoldEvent::Start);

        let explorer = ContigSetExplorer::new(&self.repo, self.config);
        let exploration = explorer.explore(seeds, listener)?;

        listener.scaffold_update(ScaffoldEvent::FindingSubgraph);

        let extractor = GraphExtractor::new(&exploration.bridges, self.config.min_bridges);
        let engine = LayoutEngine::new();

        let mut scaffolds: Vec<Scaffold> = Vec::with_capacity(seeds.len());

        for &seed in seeds {
            if scaffolds.iter().any(|s| s.seed == seed || s.subgraph.contains(seed)) {
                continue;
            }

            let subgraph = extractor.extract(seed);
            let layout = engine.layout(&subgraph);

            info!(
                "Seed {}: {} edges, {} contigs in {} rows, {} inconsistencies",
                seed,
                subgraph.len(),
                layout.len(),
                layout.rows(),
                layout.inconsistencies.len()
            );

            scaffolds.push(Scaffold {
                seed,
                subgraph,
                layout,
            });
        }

        listener.scaffold_update(ScaffoldEvent::Finish);

        Ok(ScaffoldRun {
            bridges: exploration.bridges,
            scaffolds,
        })
    }
}
