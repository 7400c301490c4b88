mod graph;
mod source;

pub use graph::load_graph;
pub use source::FsSourceLookup;
