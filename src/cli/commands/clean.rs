//! Clean commands - remove extracted fixtures and cached archives

use crate::error::FixturesResult;
use crate::lifecycle::LifecycleController;
use crate::ui::{self, UiContext};

/// Execute the clean-test-files command
pub async fn clean_test_files(lifecycle: &LifecycleController, ctx: &UiContext) -> FixturesResult<()> {
    let dir = lifecycle.extracted_dir();
    if lifecycle.clean_extracted().await? {
        ui::step_ok(ctx, &format!("Removed {}", dir.display()));
    } else {
        ui::step_skip(ctx, &format!("{} not present", dir.display()));
    }
    Ok(())
}

/// Execute the clean-archives command
pub async fn clean_archives(lifecycle: &LifecycleController, ctx: &UiContext) -> FixturesResult<()> {
    let archive = lifecycle.archive_path();
    if lifecycle.clean_archives().await? {
        ui::step_ok(ctx, &format!("Removed {}", archive.display()));
    } else {
        ui::step_skip(ctx, &format!("{} not present", archive.display()));
    }
    Ok(())
}

/// Execute the clean command: extracted fixtures first, then the archive
pub async fn clean_all(lifecycle: &LifecycleController, ctx: &UiContext) -> FixturesResult<()> {
    clean_test_files(lifecycle, ctx).await?;
    clean_archives(lifecycle, ctx).await
}
