//! Invocation parsing and validation
//!
//! The single command-line argument is a JSON object naming a command
//! and its parameters. Validation happens here, before any provider or
//! browser work; the error strings are part of the output contract.

use serde::Deserialize;

/// Raw parameter bag parsed from argv[1]
#[derive(Debug, Clone, Deserialize)]
pub struct Invocation {
    pub command: String,
    #[serde(default)]
    pub url: Option<String>,
    /// Comma-separated free-text steps inserted after navigation.
    #[serde(default)]
    pub steps: Option<String>,
    #[serde(default)]
    pub full_page: bool,
    #[serde(default)]
    pub script: Option<String>,
}

/// Supported commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Screenshot,
    GetHtml,
    ExecuteJs,
    GetConsoleLogs,
}

impl Command {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "screenshot" => Some(Self::Screenshot),
            "get_html" => Some(Self::GetHtml),
            "execute_js" => Some(Self::ExecuteJs),
            "get_console_logs" => Some(Self::GetConsoleLogs),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Screenshot => "screenshot",
            Self::GetHtml => "get_html",
            Self::ExecuteJs => "execute_js",
            Self::GetConsoleLogs => "get_console_logs",
        }
    }
}

/// A validated command with its required parameters present
#[derive(Debug, Clone)]
pub struct CommandRequest {
    pub command: Command,
    pub url: String,
    pub steps: Option<String>,
    pub full_page: bool,
    pub script: Option<String>,
}

impl CommandRequest {
    /// Validate an invocation. Error strings are the structured
    /// failure messages emitted verbatim in the result envelope.
    pub fn validate(inv: Invocation) -> Result<Self, String> {
        let Some(command) = Command::parse(&inv.command) else {
            return Err(format!("Unknown command: {}", inv.command));
        };

        let url = match inv.url.filter(|u| !u.is_empty()) {
            Some(url) => url,
            None => {
                return Err(format!("URL is required for {} command", command.as_str()));
            }
        };

        let script = inv.script.filter(|s| !s.is_empty());
        if command == Command::ExecuteJs && script.is_none() {
            return Err("URL and script are required for execute_js command".to_string());
        }

        Ok(Self {
            command,
            url,
            steps: inv.steps.filter(|s| !s.trim().is_empty()),
            full_page: inv.full_page,
            script,
        })
    }
}
