//! Orderly CLI Application
//!
//! Command-line interface and MCP server for versioned order tracking.

mod args;
mod cli;
mod mcp;
mod renderer;
mod session;

use std::process::ExitCode;

use anyhow::{Context, Result};
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use log::info;
use mcp::{run_stdio_server, OrderlyMcpServer};
use orderly_core::{params::ListOrders, OperationStatus, OrderlyError};
use renderer::TerminalRenderer;
use session::Session;
use Commands::*;

async fn run(args: Args) -> Result<()> {
    let Args {
        state_file,
        no_color,
        command,
    } = args;

    let session = Session::open(state_file)?;
    let renderer = TerminalRenderer::new(!no_color);

    info!("Orderly started with state file {}", session.state_file().display());

    match command {
        Some(Order { command }) => Cli::new(session, renderer).handle_order_command(command),
        Some(Task { command }) => Cli::new(session, renderer).handle_task_command(command),
        Some(Sitrep { command }) => Cli::new(session, renderer).handle_sitrep_command(command),
        Some(User { command }) => Cli::new(session, renderer).handle_user_command(command),
        Some(Serve) => {
            info!("Starting Orderly MCP server");
            run_stdio_server(OrderlyMcpServer::new(session))
                .await
                .context("MCP server failed")
        }
        None => Cli::new(session, renderer).list_orders(&ListOrders::default()),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    match run(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<OrderlyError>() {
                Some(err) => eprint!("{}", OperationStatus::from(err)),
                None => eprintln!("Error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}
