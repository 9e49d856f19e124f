//! Automation engine boundary
//!
//! The command runner only sees this narrow surface: run a task, read
//! an artifact, close. The Chrome implementation binds the agent loop
//! to a live [`BrowserSession`]; tests substitute a recording stub.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;
use wa_core::{ChatClient, ImageSource, ToolExecution};

use crate::console::LogEntry;
use crate::session::{BrowserConfig, BrowserSession};
use crate::tools;

/// Narrow capability surface over the delegated automation runtime.
#[async_trait]
pub trait Automation: Send + Sync {
    /// Hand a task description to the agent; the outcome is opaque.
    async fn run_task(&self, task: &str) -> wa_core::Result<()>;

    /// Capture a PNG of the current page.
    fn screenshot(&self, full_page: bool) -> wa_core::Result<Vec<u8>>;

    /// Read the full page markup.
    fn page_html(&self) -> wa_core::Result<String>;

    /// Run a script in the page and return its value.
    fn run_script(&self, script: &str) -> wa_core::Result<Value>;

    /// Read the buffered console entries.
    fn console_logs(&self) -> wa_core::Result<Vec<LogEntry>>;

    /// Release the session and the browser. Safe to call once per run;
    /// later calls are no-ops.
    fn close(&self) -> wa_core::Result<()>;
}

/// Agent run parameters
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Model round-trip cap for one task.
    pub max_iterations: usize,
    /// Feed viewport screenshots back after each action.
    pub vision: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            vision: false,
        }
    }
}

const SYSTEM_PROMPT: &str = "You are a browser automation agent operating a real browser \
     through tools. You are given a numbered task. Carry out the steps in order, one tool \
     call at a time, and keep your replies short. When every step is complete, call the \
     done tool.";

/// Chrome-backed automation engine
pub struct ChromeAutomation {
    session: Mutex<Option<BrowserSession>>,
    client: ChatClient,
    agent: AgentConfig,
}

impl ChromeAutomation {
    /// Launch a browser session and bind it to a chat client.
    pub fn launch(
        config: BrowserConfig,
        client: ChatClient,
        agent: AgentConfig,
    ) -> wa_core::Result<Self> {
        let session = BrowserSession::with_config(config)?;
        Ok(Self {
            session: Mutex::new(Some(session)),
            client,
            agent,
        })
    }

    fn with_session<T>(
        &self,
        f: impl FnOnce(&BrowserSession) -> wa_core::Result<T>,
    ) -> wa_core::Result<T> {
        let guard = self
            .session
            .lock()
            .map_err(|e| wa_core::Error::Browser(format!("Session lock poisoned: {}", e)))?;
        match guard.as_ref() {
            Some(session) => f(session),
            None => Err(wa_core::Error::Browser(
                "Browser session already closed".to_string(),
            )),
        }
    }

    fn viewport_snapshot(&self) -> Option<ImageSource> {
        self.with_session(|s| Ok(s.screenshot(false)?))
            .ok()
            .map(|png| ImageSource::png(&png))
    }
}

#[async_trait]
impl Automation for ChromeAutomation {
    async fn run_task(&self, task: &str) -> wa_core::Result<()> {
        info!("Running agent for task:\n{}", task);

        let definitions = tools::definitions();
        let executor = |name: &str, args: &Value| -> wa_core::Result<ToolExecution> {
            let output = self.with_session(|session| tools::execute(session, name, args))?;
            let image = if self.agent.vision && name != "done" {
                self.viewport_snapshot()
            } else {
                None
            };
            Ok(ToolExecution::success(output).with_image(image))
        };

        let result = self
            .client
            .run_agent_loop(
                SYSTEM_PROMPT,
                task,
                &definitions,
                self.agent.max_iterations,
                executor,
            )
            .await?;

        info!("Agent run completed after {} iterations", result.iterations);
        Ok(())
    }

    fn screenshot(&self, full_page: bool) -> wa_core::Result<Vec<u8>> {
        self.with_session(|session| Ok(session.screenshot(full_page)?))
    }

    fn page_html(&self) -> wa_core::Result<String> {
        self.with_session(|session| Ok(session.page_source()?))
    }

    fn run_script(&self, script: &str) -> wa_core::Result<Value> {
        self.with_session(|session| Ok(session.evaluate(script)?))
    }

    fn console_logs(&self) -> wa_core::Result<Vec<LogEntry>> {
        self.with_session(|session| Ok(session.console_logs()?))
    }

    fn close(&self) -> wa_core::Result<()> {
        let session = self
            .session
            .lock()
            .map_err(|e| wa_core::Error::Browser(format!("Session lock poisoned: {}", e)))?
            .take();
        if let Some(session) = session {
            session.close();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_config_default() {
        let config = AgentConfig::default();
        assert_eq!(config.max_iterations, 10);
        assert!(!config.vision);
    }

    #[test]
    fn test_system_prompt_mentions_done_tool() {
        assert!(SYSTEM_PROMPT.contains("done tool"));
    }
}
