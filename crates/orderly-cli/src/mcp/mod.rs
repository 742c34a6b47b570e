//! MCP server implementation for Orderly
//!
//! Exposes every service operation as an MCP tool over stdio. Tool
//! parameters are the core request types; results are the same markdown the
//! CLI prints. The state file is saved after each mutating tool call.

use std::{future::Future, sync::Arc};

use anyhow::Result;
use log::{debug, error, info};
use rmcp::{
    handler::server::{router::tool::ToolRouter, tool::Parameters},
    model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ServerHandler,
};
use tokio::{
    signal::unix::{signal, SignalKind},
    sync::Mutex,
};

use crate::session::Session;

pub mod errors;
pub mod handlers;

pub use handlers::{
    ById, DelegatedTasks, Delete, DeleteDelegatedTasks, DeleteSitReps, ListOrders, ListUsers,
    McpResult, OrderRequest, SitReps, Subordinates, UserRequest,
};

/// MCP server for Orderly
#[derive(Clone)]
pub struct OrderlyMcpServer {
    session: Arc<Mutex<Session>>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl OrderlyMcpServer {
    pub fn new(session: Session) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            tool_router: Self::tool_router(),
        }
    }

    fn handlers(&self) -> handlers::McpHandlers {
        handlers::McpHandlers::new(self.session.clone())
    }

    #[tool(
        name = "create_order",
        description = "Create a new order at version 1. Provide task.accountable (e-mail), task.objective and task.deadline (RFC 3339); task.state defaults to NotStarted. Optional parent_order_id links it under another order, and delegated_tasks and sitreps may be included. Do not supply any IDs; they are generated."
    )]
    async fn create_order(&self, params: Parameters<OrderRequest>) -> McpResult {
        self.handlers().create_order(params).await
    }

    #[tool(
        name = "get_order",
        description = "Show the latest version of an order: primary task, delegated tasks, sitreps and version metadata."
    )]
    async fn get_order(&self, params: Parameters<ById>) -> McpResult {
        self.handlers().get_order(params).await
    }

    #[tool(
        name = "list_orders",
        description = "List live orders. Optional filters: parent_order_id (orders delegated from that order) and accountable (e-mail on the primary task)."
    )]
    async fn list_orders(&self, params: Parameters<ListOrders>) -> McpResult {
        self.handlers().list_orders(params).await
    }

    #[tool(
        name = "order_versions",
        description = "Show every stored version of an order, oldest first, including a soft-delete tombstone."
    )]
    async fn order_versions(&self, params: Parameters<ById>) -> McpResult {
        self.handlers().order_versions(params).await
    }

    #[tool(
        name = "order_children",
        description = "List the orders whose parent_order_id is the given order."
    )]
    async fn order_children(&self, params: Parameters<ById>) -> McpResult {
        self.handlers().order_children(params).await
    }

    #[tool(
        name = "patch_order",
        description = "Patch an order. task.id selects the order. Only fields that are present and differ are changed; delegated_tasks and sitreps entries are matched by id and unknown ids are ignored. A patch that changes nothing keeps the current version, otherwise exactly one new version is written. Fails with a conflict if another writer updated the order first; re-read and retry."
    )]
    async fn patch_order(&self, params: Parameters<OrderRequest>) -> McpResult {
        self.handlers().patch_order(params).await
    }

    #[tool(
        name = "delete_order",
        description = "Delete an order. By default a tombstone version is written and the history stays readable through order_versions; set hard=true to purge the history."
    )]
    async fn delete_order(&self, params: Parameters<Delete>) -> McpResult {
        self.handlers().delete_order(params).await
    }

    #[tool(
        name = "put_delegated_tasks",
        description = "Append delegated tasks to an order. Each task needs accountable, objective and deadline and must not carry an id. All tasks are added in one new version."
    )]
    async fn put_delegated_tasks(&self, params: Parameters<DelegatedTasks>) -> McpResult {
        self.handlers().put_delegated_tasks(params).await
    }

    #[tool(
        name = "patch_delegated_tasks",
        description = "Patch delegated tasks of an order, matched by id. Unknown ids are ignored."
    )]
    async fn patch_delegated_tasks(&self, params: Parameters<DelegatedTasks>) -> McpResult {
        self.handlers().patch_delegated_tasks(params).await
    }

    #[tool(
        name = "delete_delegated_tasks",
        description = "Remove delegated tasks from an order by id. Unknown ids are ignored; if none match the order keeps its version."
    )]
    async fn delete_delegated_tasks(&self, params: Parameters<DeleteDelegatedTasks>) -> McpResult {
        self.handlers().delete_delegated_tasks(params).await
    }

    #[tool(
        name = "put_sitreps",
        description = "File situation reports against an order. Each needs datetime, by (e-mail) and at least one of situation, actions, tbd or issues; ping lists e-mails to notify."
    )]
    async fn put_sitreps(&self, params: Parameters<SitReps>) -> McpResult {
        self.handlers().put_sitreps(params).await
    }

    #[tool(
        name = "patch_sitreps",
        description = "Patch situation reports of an order, matched by id. Ping lists compare without regard to order. Unknown ids are ignored."
    )]
    async fn patch_sitreps(&self, params: Parameters<SitReps>) -> McpResult {
        self.handlers().patch_sitreps(params).await
    }

    #[tool(
        name = "delete_sitreps",
        description = "Remove situation reports from an order by id. Unknown ids are ignored; if none match the order keeps its version."
    )]
    async fn delete_sitreps(&self, params: Parameters<DeleteSitReps>) -> McpResult {
        self.handlers().delete_sitreps(params).await
    }

    #[tool(
        name = "create_user",
        description = "Create a user with name, email and supervisor (e-mail). Do not supply an id."
    )]
    async fn create_user(&self, params: Parameters<UserRequest>) -> McpResult {
        self.handlers().create_user(params).await
    }

    #[tool(name = "get_user", description = "Show the latest version of a user.")]
    async fn get_user(&self, params: Parameters<ById>) -> McpResult {
        self.handlers().get_user(params).await
    }

    #[tool(
        name = "list_users",
        description = "List live users. Optional filters: emails (any of) and supervisor (e-mail)."
    )]
    async fn list_users(&self, params: Parameters<ListUsers>) -> McpResult {
        self.handlers().list_users(params).await
    }

    #[tool(
        name = "user_versions",
        description = "Show every stored version of a user, oldest first."
    )]
    async fn user_versions(&self, params: Parameters<ById>) -> McpResult {
        self.handlers().user_versions(params).await
    }

    #[tool(
        name = "user_subordinates",
        description = "List the users reporting to a user. Set transitive=true to walk the whole reporting tree."
    )]
    async fn user_subordinates(&self, params: Parameters<Subordinates>) -> McpResult {
        self.handlers().user_subordinates(params).await
    }

    #[tool(
        name = "patch_user",
        description = "Patch a user selected by id. Changing the email re-points the user's direct reports to the new address."
    )]
    async fn patch_user(&self, params: Parameters<UserRequest>) -> McpResult {
        self.handlers().patch_user(params).await
    }

    #[tool(
        name = "delete_user",
        description = "Delete a user (tombstone by default, hard=true purges). The user's direct reports move to the deleted user's supervisor."
    )]
    async fn delete_user(&self, params: Parameters<Delete>) -> McpResult {
        self.handlers().delete_user(params).await
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for OrderlyMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "orderly".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(r#"Orderly tracks orders: hierarchical work items with full version history.

## Core Concepts
- **Order**: a primary task, delegated tasks and situation reports (sitreps). Orders form a tree through parent_order_id under a single root order.
- **Task**: state (NotStarted, InProgress, HavingIssues, Blocked, Completed), accountable e-mail, objective and deadline.
- **Sitrep**: a timestamped report by a user with situation, actions, tbd and issues.
- **User**: name, e-mail and supervisor e-mail.

## Versioning
Every change writes a new immutable version. Patches only change the fields you send; a patch that changes nothing keeps the current version. Use order_versions or user_versions to see history.

## Workflow
1. `list_orders` to find the root order, then `create_order` with parent_order_id to delegate under it
2. `put_delegated_tasks` and `put_sitreps` to add work items and reports
3. `patch_order`, `patch_delegated_tasks` and `patch_sitreps` as work progresses

## Conflicts
If a patch fails with [409], another writer changed the entity first. Re-read it and retry."#.to_string()),
        }
    }
}

/// Run the MCP server with stdio transport
pub async fn run_stdio_server(server: OrderlyMcpServer) -> Result<()> {
    use rmcp::{transport::stdio, ServiceExt};

    info!("Starting Orderly MCP server on stdio");
    debug!(
        "Server created with {} tools",
        server.tool_router.list_all().len()
    );

    let service = server.serve(stdio()).await.inspect_err(|e| {
        error!("serving error: {e:?}");
    })?;

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        result = service.waiting() => {
            match result {
                Ok(_) => info!("MCP server stopped normally"),
                Err(e) => error!("MCP server error: {e:?}"),
            }
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down gracefully...");
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down gracefully...");
        }
    }

    info!("MCP server shutdown complete");
    Ok(())
}
