pub mod bridge;
pub mod contig;
pub mod evidence;
pub mod explorer;
pub mod gap;
pub mod layout;
pub mod parser;
pub mod repository;
pub mod scaffold;
pub mod subgraph;
pub mod writer;
