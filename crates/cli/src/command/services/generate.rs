use crate::command::context::CommandContext;
use crate::command::domain::{CommandOutput, GenerateOutput, GeneratePayload};
use crate::command::infra::FsSourceLookup;
use anyhow::{Context, Result};
use callquest_curriculum::{to_records, LevelGenerator};

#[derive(Default)]
pub struct GenerateService;

impl GenerateService {
    pub fn run(&self, payload: GeneratePayload, ctx: CommandContext) -> Result<CommandOutput> {
        let mut config = ctx.config;
        if let Some(max_levels) = payload.max_levels {
            config = config.with_max_levels(max_levels);
        }

        let lookup = payload.source_root.as_deref().map(FsSourceLookup::new);
        let mut generator =
            LevelGenerator::new(&ctx.graph, config).context("Invalid generation settings")?;
        if let Some(lookup) = &lookup {
            generator = generator.with_source(lookup);
        }

        let curriculum = generator
            .generate_curriculum()
            .context("Level generation failed")?;
        log::info!(
            "{} levels, {} gaps, {} dropped chains",
            curriculum.levels.len(),
            curriculum.gaps.len(),
            curriculum.dropped.len()
        );

        CommandOutput::json(&GenerateOutput {
            levels: to_records(&curriculum.levels, !payload.redact_answers)?,
            gaps: curriculum.gaps,
            dropped: curriculum.dropped,
        })
    }
}
