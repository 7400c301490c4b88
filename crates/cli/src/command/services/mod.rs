mod generate;
mod inspect;

use crate::command::context::CommandContext;
use crate::command::domain::{CommandAction, CommandOutput};
use anyhow::Result;
use generate::GenerateService;
use inspect::InspectService;

#[derive(Default)]
pub struct Services {
    generate: GenerateService,
    inspect: InspectService,
}

impl Services {
    pub fn route(&self, action: CommandAction, ctx: CommandContext) -> Result<CommandOutput> {
        match action {
            CommandAction::Generate(payload) => self.generate.run(payload, ctx),
            CommandAction::Chains(payload) => self.inspect.chains(payload, &ctx),
            CommandAction::Stats => self.inspect.stats(&ctx),
            CommandAction::Dot => Ok(self.inspect.dot(&ctx)),
        }
    }
}
