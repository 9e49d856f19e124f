//! Session-bound browser tools
//!
//! Tool definitions advertised to the model during the agent run, and
//! the dispatcher that executes a requested call against the live
//! session. Execution is synchronous; the driver blocks on CDP.

use serde_json::{Value, json};
use wa_core::ToolDefinition;

use crate::error::BrowserError;
use crate::session::BrowserSession;

/// Tool definitions for the agent run.
pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            "navigate",
            "Navigate the browser to a URL and wait for the page to load",
            json!({
                "type": "object",
                "properties": {
                    "url": { "type": "string", "description": "The URL to navigate to" }
                },
                "required": ["url"]
            }),
        ),
        ToolDefinition::new(
            "click",
            "Click an element using a CSS selector",
            json!({
                "type": "object",
                "properties": {
                    "selector": { "type": "string", "description": "CSS selector for the element to click" }
                },
                "required": ["selector"]
            }),
        ),
        ToolDefinition::new(
            "type_text",
            "Type text into an input field using a CSS selector",
            json!({
                "type": "object",
                "properties": {
                    "selector": { "type": "string", "description": "CSS selector for the input field" },
                    "text": { "type": "string", "description": "Text to type into the field" }
                },
                "required": ["selector", "text"]
            }),
        ),
        ToolDefinition::new(
            "scroll",
            "Scroll the page vertically by a pixel amount (negative scrolls up)",
            json!({
                "type": "object",
                "properties": {
                    "pixels": { "type": "integer", "description": "Pixels to scroll by (default 500)" }
                }
            }),
        ),
        ToolDefinition::new(
            "read_text",
            "Read the visible text of an element, or of the whole page body",
            json!({
                "type": "object",
                "properties": {
                    "selector": { "type": "string", "description": "CSS selector to read (defaults to body)" }
                }
            }),
        ),
        ToolDefinition::new(
            "run_js",
            "Run JavaScript in the page and return its result",
            json!({
                "type": "object",
                "properties": {
                    "script": { "type": "string", "description": "JavaScript to evaluate" }
                },
                "required": ["script"]
            }),
        ),
        ToolDefinition::new(
            "wait",
            "Wait for a number of milliseconds (for delayed content)",
            json!({
                "type": "object",
                "properties": {
                    "ms": { "type": "integer", "description": "Milliseconds to wait" }
                },
                "required": ["ms"]
            }),
        ),
        ToolDefinition::new(
            "done",
            "Signal that every step of the task has been carried out",
            json!({
                "type": "object",
                "properties": {
                    "summary": { "type": "string", "description": "Short summary of what was done" }
                }
            }),
        ),
    ]
}

/// Longest tool output fed back to the model.
const MAX_READ_CHARS: usize = 5_000;

fn str_arg<'a>(input: &'a Value, key: &str, tool: &str) -> Result<&'a str, BrowserError> {
    input[key]
        .as_str()
        .ok_or_else(|| BrowserError::Interaction(format!("{} requires '{}'", tool, key)))
}

/// Execute one tool call against the session.
pub fn execute(session: &BrowserSession, name: &str, input: &Value) -> wa_core::Result<String> {
    let output = match name {
        "navigate" => {
            let url = str_arg(input, "url", "navigate")?;
            let title = session.navigate(url)?;
            format!("Navigated to {} (title: {})", url, title)
        }
        "click" => {
            let selector = str_arg(input, "selector", "click")?;
            session.click(selector)?;
            format!("Clicked '{}'", selector)
        }
        "type_text" => {
            let selector = str_arg(input, "selector", "type_text")?;
            let text = str_arg(input, "text", "type_text")?;
            session.type_text(selector, text)?;
            format!("Typed into '{}'", selector)
        }
        "scroll" => {
            let pixels = input["pixels"].as_i64().unwrap_or(500);
            session.scroll_by(pixels)?;
            format!("Scrolled by {} pixels", pixels)
        }
        "read_text" => {
            let selector = input["selector"].as_str().unwrap_or("body");
            let text = session.extract_text(selector)?;
            clip(&text)
        }
        "run_js" => {
            let script = str_arg(input, "script", "run_js")?;
            let value = session.evaluate(script)?;
            clip(&value.to_string())
        }
        "wait" => {
            let ms = input["ms"].as_u64().unwrap_or(1000).min(30_000);
            std::thread::sleep(std::time::Duration::from_millis(ms));
            format!("Waited {}ms", ms)
        }
        "done" => {
            let summary = input["summary"].as_str().unwrap_or("");
            format!("Done. {}", summary)
        }
        other => {
            return Err(wa_core::Error::Agent(format!("Unknown tool: {}", other)));
        }
    };
    Ok(output)
}

fn clip(text: &str) -> String {
    if text.chars().count() > MAX_READ_CHARS {
        let clipped: String = text.chars().take(MAX_READ_CHARS).collect();
        format!("{}... (truncated)", clipped)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definitions_cover_navigation_and_completion() {
        let defs = definitions();
        let names: Vec<&str> = defs.iter().map(|d| d.name.as_str()).collect();
        assert!(names.contains(&"navigate"));
        assert!(names.contains(&"click"));
        assert!(names.contains(&"type_text"));
        assert!(names.contains(&"run_js"));
        assert!(names.contains(&"done"));
    }

    #[test]
    fn test_definitions_schemas_declare_required_fields() {
        let defs = definitions();
        let navigate = defs.iter().find(|d| d.name == "navigate").unwrap();
        assert_eq!(navigate.parameters["required"][0], "url");

        let type_text = defs.iter().find(|d| d.name == "type_text").unwrap();
        let required = type_text.parameters["required"].as_array().unwrap();
        assert_eq!(required.len(), 2);
    }

    #[test]
    fn test_clip_truncates() {
        let long = "x".repeat(MAX_READ_CHARS + 10);
        let out = clip(&long);
        assert!(out.ends_with("... (truncated)"));
        assert_eq!(clip("short"), "short");
    }
}
