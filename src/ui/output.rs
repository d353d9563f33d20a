//! Output functions for consistent CLI formatting

use super::context::UiContext;
use console::{style, Emoji, Style};

static CHECK: Emoji<'_, '_> = Emoji("✓", "[OK]");
static SKIP: Emoji<'_, '_> = Emoji("·", "[SKIP]");
static INFO: Emoji<'_, '_> = Emoji("›", "[INFO]");
static WARN: Emoji<'_, '_> = Emoji("⚠", "[WARN]");

/// Display a bold section header
pub fn header(ctx: &UiContext, title: &str) {
    if ctx.use_fancy_output() {
        println!("{}", style(title).cyan().bold());
    } else {
        println!("{}", title);
    }
}

/// Display a success step
pub fn step_ok(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        println!("  {} {}", style(CHECK).green(), message);
    } else {
        println!("  [OK] {}", message);
    }
}

/// Display a step that was already up to date
pub fn step_skip(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        println!("  {} {}", style(SKIP).dim(), style(message).dim());
    } else {
        println!("  [SKIP] {}", message);
    }
}

/// Display an info step
pub fn step_info(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        println!("  {} {}", style(INFO).cyan(), message);
    } else {
        println!("  [INFO] {}", message);
    }
}

/// Display a warning step
pub fn step_warn(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        println!("  {} {}", style(WARN).yellow(), message);
    } else {
        println!("  [WARN] {}", message);
    }
}

/// Print styled key-value pair
pub fn key_value(ctx: &UiContext, key: &str, value: &str) {
    if ctx.use_fancy_output() {
        println!("  {}: {}", style(key).dim(), value);
    } else {
        println!("  {}: {}", key, value);
    }
}

/// Print styled key-value with status color
pub fn key_value_status(ctx: &UiContext, key: &str, value: &str, ok: bool) {
    let value_style = if ok {
        Style::new().green()
    } else {
        Style::new().yellow()
    };

    if ctx.use_fancy_output() {
        println!("  {}: {}", style(key).dim(), value_style.apply_to(value));
    } else {
        let prefix = if ok { "[OK]" } else { "[WARN]" };
        println!("  {} {}: {}", prefix, key, value);
    }
}
