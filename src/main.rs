use anyhow::{bail, Context, Result};
use log::debug;

use scaffold::contig::ContigId;
use scaffold::explorer::{ScaffoldConfig, ScaffoldEvent, ScaffoldListener};
use scaffold::parser::RepoParser;
use scaffold::repository::ContigRepository;
use scaffold::scaffold::Scaffolder;
use scaffold::writer;

struct LogListener;

impl ScaffoldListener for LogListener {
    fn scaffold_update(&mut self, event: ScaffoldEvent) {
        debug!("{:?}", event);
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<_> = std::env::args().collect();
    if args.len() < 2 {
        bail!("Usage: {} <repository file> [contig ID]...", args[0]);
    }

    let config = ScaffoldConfig::from_env();

    let repo = RepoParser::new()
        .parse_file(&args[1])
        .with_context(|| format!("Could not load repository {}", args[1]))?;

    let seeds: Vec<ContigId> = if args.len() > 2 {
        args[2..]
            .iter()
            .map(|s| {
                s.parse()
                    .with_context(|| format!("Invalid contig ID {}", s))
            })
            .collect::<Result<_>>()?
    } else {
        repo.current_contigs()?
    };

    let scaffolder = Scaffolder::new(repo, config);
    let run = scaffolder.run(&seeds, &mut LogListener)?;

    println!("BRIDGES");
    print!("{}", run.bridges.dump_string(config.min_bridges));

    for scaffold in run.scaffolds.iter().filter(|s| !s.is_empty()) {
        println!();
        println!("SUBGRAPH {}", scaffold.seed);
        print!("{}", writer::subgraph_string(&scaffold.subgraph));
        println!();
        println!("LAYOUT {}", scaffold.seed);
        print!("{}", scaffold.layout);
    }

    Ok(())
}
