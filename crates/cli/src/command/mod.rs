mod context;
pub mod domain;
pub mod infra;
mod services;

pub use domain::{
    ChainsPayload, CommandAction, CommandOutput, CommandRequest, GeneratePayload, GraphSource,
};

use anyhow::Result;
use services::Services;

#[derive(Default)]
pub struct CommandHandler {
    services: Services,
}

impl CommandHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn execute(&self, request: CommandRequest) -> Result<CommandOutput> {
        let ctx = context::CommandContext::resolve(&request)?;
        self.services.route(request.action, ctx)
    }
}

pub fn execute(request: CommandRequest) -> Result<CommandOutput> {
    CommandHandler::new().execute(request)
}
