//! Status command - report cached archive and fixture trees

use crate::error::FixturesResult;
use crate::lifecycle::{LifecycleController, TreeState};
use crate::ui::{self, UiContext};

/// Execute the status command
pub async fn execute(lifecycle: &LifecycleController, ctx: &UiContext) -> FixturesResult<()> {
    let status = lifecycle.status().await?;

    ui::header(ctx, "Fixture Status");
    println!();
    ui::key_value(ctx, "Version tag", status.tag.as_str());
    ui::key_value(ctx, "Source", &status.url);

    match &status.archive {
        Some(info) => {
            ui::key_value_status(
                ctx,
                "Archive",
                &format!("{} ({} bytes)", info.path.display(), info.size_bytes),
                true,
            );
            ui::key_value(ctx, "SHA-256", &info.sha256);
        }
        None => ui::key_value_status(
            ctx,
            "Archive",
            &format!("{} (not downloaded)", status.archive_path.display()),
            false,
        ),
    }

    let (state, ok) = match status.extracted {
        TreeState::Current => ("up to date", true),
        TreeState::Stale => ("stale", false),
        TreeState::Missing => ("missing", false),
    };
    ui::key_value_status(
        ctx,
        "Extracted",
        &format!("{} ({})", status.output_dir.display(), state),
        ok,
    );

    let generated = if status.generated { "present" } else { "missing" };
    ui::key_value_status(
        ctx,
        "Generated",
        &format!("{} ({})", status.generate_dir.display(), generated),
        status.generated,
    );

    match status.extracted {
        TreeState::Current => {}
        TreeState::Stale => {
            println!();
            ui::step_warn(
                ctx,
                "Extracted fixtures do not match the cached archive for this tag",
            );
            ui::step_info(ctx, "Run: fixtures acquire-fixtures");
        }
        TreeState::Missing => {
            println!();
            ui::step_info(ctx, "Run: fixtures acquire-fixtures");
        }
    }

    Ok(())
}
