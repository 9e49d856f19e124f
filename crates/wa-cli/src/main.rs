//! wa-cli: browser command adapter binary
//!
//! Accepts one JSON instruction as the sole positional argument, runs
//! it through an LLM-driven browser agent, and prints exactly one JSON
//! result line to stdout. Diagnostics go to stderr.
//!
//! Usage:
//!   wa-cli '{"command":"get_html","url":"https://example.com"}'
//!   wa-cli --help

mod invocation;
mod runner;
mod task;

use tracing_subscriber::EnvFilter;
use wa_core::Env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Stdout is reserved for the result envelope.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    // Load .env file
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("--help" | "-h") => {
            print_help();
            return Ok(());
        }
        Some("--version" | "-v") => {
            println!("wa-cli {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        _ => {}
    }

    let result = match args.get(1) {
        Some(input) => {
            let env = Env::from_process();
            runner::run(input, &env).await
        }
        None => runner::fail("No command argument provided. Run with --help for usage."),
    };

    println!("{}", result);
    Ok(())
}

/// Print help message
fn print_help() {
    println!("wa-cli - browser command adapter");
    println!();
    println!("Usage:");
    println!("  wa-cli '<json>'      Run one command described by a JSON object");
    println!("  wa-cli --help        Show this help message");
    println!("  wa-cli --version     Show version");
    println!();
    println!("Commands (the \"command\" field of the JSON object):");
    println!("  screenshot           Take a screenshot of a page (url, steps?, full_page?)");
    println!("  get_html             Get the HTML of a page (url, steps?)");
    println!("  execute_js           Run JavaScript on a page (url, script, steps?)");
    println!("  get_console_logs     Collect console output of a page (url, steps?)");
    println!();
    println!("Environment Variables:");
    println!("  OLLAMA_API_KEY, GLHF_API_KEY, GROQ_API_KEY, OPENAI_API_KEY,");
    println!("  OPENROUTER_API_KEY, GITHUB_API_KEY, DEEPSEEK_API_KEY, GEMINI_API_KEY");
    println!("                       Model credentials, probed in this order");
    println!("  MODEL                Override the selected backend's default model");
    println!("  BASE_URL             Override the endpoint (endpoint-based backends only)");
    println!("  USE_VISION           Feed page screenshots back to the model (default: false)");
    println!("  RUNNING_UNDER_XVFB   Run a visible browser on a virtual display");
    println!();
    println!("Output: one JSON line on stdout, {{\"success\": bool, ...}}");
}
