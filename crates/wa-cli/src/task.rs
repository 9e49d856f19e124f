//! Task compilation
//!
//! Turns a validated command into the numbered natural-language step
//! list the agent receives: navigate, optional user-supplied steps,
//! then the command's terminal action. The agent treats the text as
//! opaque; nothing here is kept after handoff.

use crate::invocation::{Command, CommandRequest};

/// Build the numbered task description for a validated request.
pub fn compile(request: &CommandRequest) -> String {
    let mut lines = vec![format!("1. Go to {}", request.url)];

    if let Some(steps) = &request.steps {
        for step in steps.split(',') {
            let step = step.trim();
            if !step.is_empty() {
                lines.push(format!("{}. {}", lines.len() + 1, step));
            }
        }
    }

    let terminal = match request.command {
        Command::Screenshot => {
            if request.full_page {
                "Take a screenshot of the full page".to_string()
            } else {
                "Take a screenshot".to_string()
            }
        }
        Command::GetHtml => "Get the page HTML".to_string(),
        Command::ExecuteJs => format!(
            "Execute JavaScript: {}",
            request.script.as_deref().unwrap_or_default()
        ),
        Command::GetConsoleLogs => "Get the console logs".to_string(),
    };
    lines.push(format!("{}. {}", lines.len() + 1, terminal));

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(command: Command) -> CommandRequest {
        CommandRequest {
            command,
            url: "https://example.com".to_string(),
            steps: None,
            full_page: false,
            script: None,
        }
    }

    #[test]
    fn test_compile_without_steps() {
        let task = compile(&request(Command::GetHtml));
        assert_eq!(task, "1. Go to https://example.com\n2. Get the page HTML");
    }

    #[test]
    fn test_compile_renumbers_inserted_steps() {
        let mut req = request(Command::Screenshot);
        req.steps = Some("accept the cookie banner, scroll to the pricing table".to_string());
        let task = compile(&req);
        assert_eq!(
            task,
            "1. Go to https://example.com\n\
             2. accept the cookie banner\n\
             3. scroll to the pricing table\n\
             4. Take a screenshot"
        );
    }

    #[test]
    fn test_compile_full_page_suffix() {
        let mut req = request(Command::Screenshot);
        req.full_page = true;
        assert!(compile(&req).ends_with("2. Take a screenshot of the full page"));

        req.full_page = false;
        assert!(compile(&req).ends_with("2. Take a screenshot"));
    }

    #[test]
    fn test_compile_execute_js_embeds_script() {
        let mut req = request(Command::ExecuteJs);
        req.script = Some("document.title".to_string());
        assert!(compile(&req).ends_with("2. Execute JavaScript: document.title"));
    }

    #[test]
    fn test_compile_console_logs_terminal() {
        let task = compile(&request(Command::GetConsoleLogs));
        assert!(task.ends_with("2. Get the console logs"));
    }

    #[test]
    fn test_compile_skips_empty_step_segments() {
        let mut req = request(Command::GetHtml);
        req.steps = Some("click login, , submit form".to_string());
        let task = compile(&req);
        assert_eq!(
            task,
            "1. Go to https://example.com\n2. click login\n3. submit form\n4. Get the page HTML"
        );
    }
}
