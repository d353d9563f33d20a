//! Generate command - rebuild fixtures with the local generator

use crate::error::FixturesResult;
use crate::lifecycle::LifecycleController;
use crate::ui::{self, UiContext};

/// Execute the generate command
pub async fn execute(lifecycle: &LifecycleController, ctx: &UiContext) -> FixturesResult<()> {
    ui::step_info(ctx, &format!("Running {}", lifecycle.generator_description()));

    let dir = lifecycle.generate().await?;

    ui::step_ok(ctx, &format!("Generated fixtures in {}", dir.display()));
    Ok(())
}
