//! MCP (Model Context Protocol) server for query-agent.
//!
//! Exposes the question-answering agent to MCP clients.
//!
//! # Feature Gate
//!
//! This module requires the `mcp` feature flag:
//! ```toml
//! [dependencies]
//! query-agent = { version = "...", features = ["mcp"] }
//! ```
//!
//! # Architecture
//!
//! ```text
//! MCP Client
//!   ↓ ask(query, max_iterations?)
//! QueryAgentMcpServer
//!   ↓
//! Orchestrator::ask_with() → agentic_loop
//!   ↓
//! AgentResult JSON → MCP Client
//! ```

pub mod params;
pub mod server;
pub mod transport;

pub use params::AskParams;
pub use server::QueryAgentMcpServer;
pub use transport::{serve_http, serve_stdio};
