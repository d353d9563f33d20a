//! Terminal detection for choosing between fancy and plain output

use std::io::IsTerminal;

/// Environment variables set by common CI providers
const CI_VARS: &[&str] = &[
    "CI",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "CIRCLECI",
    "BUILDKITE",
    "JENKINS_URL",
    "TF_BUILD",
];

/// Forces plain output when set to anything but `0`
const PLAIN_VAR: &str = "FIXTURES_PLAIN";

/// How command output should be rendered
#[derive(Debug, Clone, Copy)]
pub struct UiContext {
    fancy: bool,
}

impl UiContext {
    /// Inspect the terminal and environment
    pub fn detect() -> Self {
        Self {
            fancy: stdio_is_terminal() && !plain_requested(|var| std::env::var(var).ok()),
        }
    }

    /// Plain output regardless of environment
    pub fn non_interactive() -> Self {
        Self { fancy: false }
    }

    /// Whether glyphs, colors and download progress bars are shown
    pub fn use_fancy_output(&self) -> bool {
        self.fancy
    }
}

fn stdio_is_terminal() -> bool {
    // Progress bars draw on stderr, step lines go to stdout
    std::io::stdout().is_terminal() && std::io::stderr().is_terminal()
}

fn plain_requested(lookup: impl Fn(&str) -> Option<String>) -> bool {
    if lookup(PLAIN_VAR).is_some_and(|v| v != "0") {
        return true;
    }
    CI_VARS.iter().any(|var| lookup(var).is_some())
}
