use crate::command::domain::CommandRequest;
use crate::command::infra::load_graph;
use anyhow::{Context, Result};
use callquest_curriculum::GenerationConfig;
use callquest_graph::CallGraph;

/// Graph and validated tunables shared by every service call
pub struct CommandContext {
    pub graph: CallGraph,
    pub config: GenerationConfig,
}

impl CommandContext {
    pub fn resolve(request: &CommandRequest) -> Result<Self> {
        let config = match &request.config {
            Some(path) => GenerationConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => GenerationConfig::default(),
        };
        let graph = load_graph(&request.graph)?;
        Ok(Self { graph, config })
    }
}
