//! Command execution pipeline
//!
//! Validation → provider resolution → browser launch → agent run →
//! direct artifact extraction → release. Every outcome, success or
//! failure, is normalized into the `{"success": ...}` envelope; the
//! engine is closed on every path once it exists.

use serde_json::{Value, json};
use tracing::warn;

use wa_browser::{AgentConfig, Automation, BrowserConfig, ChromeAutomation, ScreenshotStore};
use wa_core::{ChatClient, Env, ResolvedProvider, Settings};

use crate::invocation::{Command, CommandRequest, Invocation};
use crate::task;

/// Delay before the console buffer is read back, giving asynchronous
/// log delivery a chance to land.
const CONSOLE_FLUSH_WAIT: std::time::Duration = std::time::Duration::from_secs(1);

/// Success envelope with a command-specific payload.
pub fn ok(payload: Value) -> Value {
    let mut envelope = json!({ "success": true });
    if let (Value::Object(envelope), Value::Object(payload)) = (&mut envelope, payload) {
        envelope.extend(payload);
    }
    envelope
}

/// Failure envelope.
pub fn fail(message: impl Into<String>) -> Value {
    json!({ "success": false, "error": message.into() })
}

/// Run one invocation end to end. Never fails: every error becomes a
/// failure envelope.
pub async fn run(input: &str, env: &Env) -> Value {
    match execute(input, env).await {
        Ok(value) => value,
        Err(e) => fail(e.to_string()),
    }
}

async fn execute(input: &str, env: &Env) -> wa_core::Result<Value> {
    let invocation: Invocation = serde_json::from_str(input)?;

    // Short-circuit before any provider or browser work.
    let request = match CommandRequest::validate(invocation) {
        Ok(request) => request,
        Err(message) => return Ok(fail(message)),
    };

    let settings = Settings::from_env(env);

    let provider = match ResolvedProvider::resolve(env) {
        Ok(provider) => provider,
        Err(e) => return Ok(fail(e.to_string())),
    };
    let client = ChatClient::new(provider)?;

    let browser_config = BrowserConfig::builder()
        .headless(!settings.under_xvfb)
        .executable(settings.chrome_path.clone())
        .capture_console(request.command == Command::GetConsoleLogs)
        .cookies_file(Some(settings.cookies_file.clone()))
        .build();
    let agent = AgentConfig {
        vision: settings.use_vision,
        ..Default::default()
    };
    let engine = ChromeAutomation::launch(browser_config, client, agent)?;

    Ok(drive(&engine, &request, &settings).await)
}

/// Run the agent and extract the artifact against a live engine.
pub async fn drive<E: Automation>(
    engine: &E,
    request: &CommandRequest,
    settings: &Settings,
) -> Value {
    let outcome = perform(engine, request, settings).await;

    // Best-effort release; a failure here does not mask the outcome.
    if let Err(e) = engine.close() {
        warn!("Failed to close browser session: {}", e);
    }

    match outcome {
        Ok(value) => value,
        Err(e) => fail(e.to_string()),
    }
}

async fn perform<E: Automation>(
    engine: &E,
    request: &CommandRequest,
    settings: &Settings,
) -> wa_core::Result<Value> {
    let task = task::compile(request);
    engine.run_task(&task).await?;

    // The agent's run does not surface the artifact; re-query the
    // session directly.
    match request.command {
        Command::Screenshot => {
            let png = engine.screenshot(request.full_page)?;
            let saved = ScreenshotStore::new(&settings.screenshot_dir).save(&png)?;
            Ok(ok(json!({
                "screenshot": saved.encoded,
                "filepath": saved.filepath.to_string_lossy(),
            })))
        }
        Command::GetHtml => Ok(ok(json!({ "html": engine.page_html()? }))),
        Command::ExecuteJs => {
            let script = request.script.as_deref().unwrap_or_default();
            Ok(ok(json!({ "result": engine.run_script(script)? })))
        }
        Command::GetConsoleLogs => {
            tokio::time::sleep(CONSOLE_FLUSH_WAIT).await;
            Ok(ok(json!({ "logs": engine.console_logs()? })))
        }
    }
}
