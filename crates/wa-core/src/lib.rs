//! wa-core: webagent core library
//!
//! Provider credential resolution, the chat client for the supported
//! model backends, and the tool-calling loop that drives a browser
//! session from model output.

pub mod config;
pub mod error;
pub mod llm;
pub mod provider;

pub use config::{Env, Settings};
pub use error::{Error, Result};
pub use llm::{
    AgentLoopResult, ChatClient, ChatMessage, ContentPart, ImageSource, ToolCall, ToolDefinition,
    ToolExecution,
};
pub use provider::{PROVIDERS, ProviderKind, ProviderSpec, ResolvedProvider};
