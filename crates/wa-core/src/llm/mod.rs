//! Chat model client and agent loop

pub mod client;
pub mod types;

pub use client::{AgentLoopResult, ChatClient, ToolExecution};
pub use types::{ChatMessage, ChatTurn, ContentPart, ImageSource, StopKind, ToolCall, ToolDefinition};
