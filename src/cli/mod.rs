//! CLI module for the agent platform
//!
//! Provides the `serve` subcommand that runs the HTTP API server.

pub mod serve;

use clap::{Parser, Subcommand};

/// Agent platform - multi-tenant AI agents, workflows and RAG pipelines
#[derive(Parser)]
#[command(name = "agent-platform")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,
}
