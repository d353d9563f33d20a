//! Acquire command - fetch and extract the fixture archive

use crate::error::FixturesResult;
use crate::lifecycle::LifecycleController;
use crate::ui::{self, UiContext};

/// Execute the acquire-fixtures command
pub async fn execute(lifecycle: &LifecycleController, ctx: &UiContext) -> FixturesResult<()> {
    ui::header(ctx, &format!("Fixtures {}", lifecycle.tag()));

    let report = lifecycle.acquire().await?;

    if report.fetched {
        ui::step_ok(ctx, &format!("Downloaded {}", report.archive.display()));
    } else {
        ui::step_skip(ctx, &format!("Archive cached at {}", report.archive.display()));
    }

    if report.extracted {
        ui::step_ok(ctx, &format!("Extracted to {}", report.output_dir.display()));
    } else {
        ui::step_skip(ctx, &format!("{} is up to date", report.output_dir.display()));
    }

    Ok(())
}
