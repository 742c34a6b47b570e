//! MCP tool handlers implementation

use std::{fmt::Display, sync::Arc};

use log::debug;
use orderly_core::{
    display::{CreateResult, Orders, Users, Versions},
    params as core, Service,
};
use rmcp::{
    handler::server::tool::Parameters,
    model::{CallToolResult, Content},
    ErrorData,
};
use schemars::JsonSchema;
use serde::Deserialize;
use tokio::sync::Mutex;

use super::errors::{to_internal_error, to_mcp_error};
use crate::session::Session;

// ============================================================================
// Generic Parameter Wrapper Implementation
// ============================================================================
//
// Core request types stay free of MCP concerns. This transparent wrapper
// passes deserialization straight through and reuses the core type's schema.

/// Generic MCP wrapper for core parameter types with serde integration
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct McpParams<T>(T)
where
    T: JsonSchema;

impl<T> JsonSchema for McpParams<T>
where
    T: JsonSchema,
{
    fn schema_name() -> std::borrow::Cow<'static, str> {
        T::schema_name()
    }

    fn json_schema(g: &mut schemars::SchemaGenerator) -> schemars::Schema {
        T::json_schema(g)
    }
}

impl<T> AsRef<T> for McpParams<T>
where
    T: JsonSchema,
{
    fn as_ref(&self) -> &T {
        &self.0
    }
}

// Type aliases for cleaner usage in function signatures
pub type ById = McpParams<core::ById>;
pub type Delete = McpParams<core::Delete>;
pub type OrderRequest = McpParams<core::OrderRequest>;
pub type ListOrders = McpParams<core::ListOrders>;
pub type DelegatedTasks = McpParams<core::DelegatedTasks>;
pub type DeleteDelegatedTasks = McpParams<core::DeleteDelegatedTasks>;
pub type SitReps = McpParams<core::SitReps>;
pub type DeleteSitReps = McpParams<core::DeleteSitReps>;
pub type UserRequest = McpParams<core::UserRequest>;
pub type ListUsers = McpParams<core::ListUsers>;
pub type Subordinates = McpParams<core::Subordinates>;

pub type McpResult = Result<CallToolResult, ErrorData>;

fn markdown(output: impl Display) -> CallToolResult {
    CallToolResult::success(vec![Content::text(output.to_string())])
}

/// Handler implementations for the MCP server
pub struct McpHandlers {
    session: Arc<Mutex<Session>>,
}

impl McpHandlers {
    pub fn new(session: Arc<Mutex<Session>>) -> Self {
        Self { session }
    }

    /// Run a read-only service call.
    async fn query<R: Display>(
        &self,
        failure: &str,
        call: impl FnOnce(&Service) -> orderly_core::Result<R>,
    ) -> McpResult {
        let session = self.session.lock().await;
        let output = call(session.service()).map_err(|e| to_mcp_error(failure, &e))?;
        Ok(markdown(output))
    }

    /// Run a mutating service call and save the state file.
    async fn mutate<R: Display>(
        &self,
        failure: &str,
        call: impl FnOnce(&Service) -> orderly_core::Result<R>,
    ) -> McpResult {
        let session = self.session.lock().await;
        let output = call(session.service()).map_err(|e| to_mcp_error(failure, &e))?;
        session
            .save()
            .map_err(|e| to_internal_error("Failed to save state", &e))?;
        Ok(markdown(output))
    }

    // Orders

    pub async fn create_order(&self, Parameters(params): Parameters<OrderRequest>) -> McpResult {
        debug!("create_order: {params:?}");
        self.mutate("Failed to create order", |s| {
            s.create_order(params.as_ref()).map(CreateResult::new)
        })
        .await
    }

    pub async fn get_order(&self, Parameters(params): Parameters<ById>) -> McpResult {
        debug!("get_order: {params:?}");
        self.query("Failed to get order", |s| s.get_order(params.as_ref()))
            .await
    }

    pub async fn list_orders(&self, Parameters(params): Parameters<ListOrders>) -> McpResult {
        debug!("list_orders: {params:?}");
        self.query("Failed to list orders", |s| {
            s.list_orders(params.as_ref()).map(Orders)
        })
        .await
    }

    pub async fn order_versions(&self, Parameters(params): Parameters<ById>) -> McpResult {
        debug!("order_versions: {params:?}");
        self.query("Failed to read order versions", |s| {
            s.order_versions(params.as_ref()).map(Versions)
        })
        .await
    }

    pub async fn order_children(&self, Parameters(params): Parameters<ById>) -> McpResult {
        debug!("order_children: {params:?}");
        self.query("Failed to list child orders", |s| {
            s.order_children(params.as_ref()).map(Orders)
        })
        .await
    }

    pub async fn patch_order(&self, Parameters(params): Parameters<OrderRequest>) -> McpResult {
        debug!("patch_order: {params:?}");
        self.mutate("Failed to patch order", |s| s.patch_order(params.as_ref()))
            .await
    }

    pub async fn delete_order(&self, Parameters(params): Parameters<Delete>) -> McpResult {
        debug!("delete_order: {params:?}");
        self.mutate("Failed to delete order", |s| s.delete_order(params.as_ref()))
            .await
    }

    // Delegated tasks

    pub async fn put_delegated_tasks(
        &self,
        Parameters(params): Parameters<DelegatedTasks>,
    ) -> McpResult {
        debug!("put_delegated_tasks: {params:?}");
        self.mutate("Failed to add delegated tasks", |s| {
            s.put_delegated_tasks(params.as_ref())
        })
        .await
    }

    pub async fn patch_delegated_tasks(
        &self,
        Parameters(params): Parameters<DelegatedTasks>,
    ) -> McpResult {
        debug!("patch_delegated_tasks: {params:?}");
        self.mutate("Failed to patch delegated tasks", |s| {
            s.patch_delegated_tasks(params.as_ref())
        })
        .await
    }

    pub async fn delete_delegated_tasks(
        &self,
        Parameters(params): Parameters<DeleteDelegatedTasks>,
    ) -> McpResult {
        debug!("delete_delegated_tasks: {params:?}");
        self.mutate("Failed to remove delegated tasks", |s| {
            s.delete_delegated_tasks(params.as_ref())
        })
        .await
    }

    // Sitreps

    pub async fn put_sitreps(&self, Parameters(params): Parameters<SitReps>) -> McpResult {
        debug!("put_sitreps: {params:?}");
        self.mutate("Failed to add sitreps", |s| s.put_sitreps(params.as_ref()))
            .await
    }

    pub async fn patch_sitreps(&self, Parameters(params): Parameters<SitReps>) -> McpResult {
        debug!("patch_sitreps: {params:?}");
        self.mutate("Failed to patch sitreps", |s| s.patch_sitreps(params.as_ref()))
            .await
    }

    pub async fn delete_sitreps(&self, Parameters(params): Parameters<DeleteSitReps>) -> McpResult {
        debug!("delete_sitreps: {params:?}");
        self.mutate("Failed to remove sitreps", |s| {
            s.delete_sitreps(params.as_ref())
        })
        .await
    }

    // Users

    pub async fn create_user(&self, Parameters(params): Parameters<UserRequest>) -> McpResult {
        debug!("create_user: {params:?}");
        self.mutate("Failed to create user", |s| {
            s.create_user(params.as_ref()).map(CreateResult::new)
        })
        .await
    }

    pub async fn get_user(&self, Parameters(params): Parameters<ById>) -> McpResult {
        debug!("get_user: {params:?}");
        self.query("Failed to get user", |s| s.get_user(params.as_ref()))
            .await
    }

    pub async fn list_users(&self, Parameters(params): Parameters<ListUsers>) -> McpResult {
        debug!("list_users: {params:?}");
        self.query("Failed to list users", |s| s.list_users(params.as_ref()).map(Users))
            .await
    }

    pub async fn user_versions(&self, Parameters(params): Parameters<ById>) -> McpResult {
        debug!("user_versions: {params:?}");
        self.query("Failed to read user versions", |s| {
            s.user_versions(params.as_ref()).map(Versions)
        })
        .await
    }

    pub async fn user_subordinates(
        &self,
        Parameters(params): Parameters<Subordinates>,
    ) -> McpResult {
        debug!("user_subordinates: {params:?}");
        self.query("Failed to list subordinates", |s| {
            s.user_subordinates(params.as_ref()).map(Users)
        })
        .await
    }

    pub async fn patch_user(&self, Parameters(params): Parameters<UserRequest>) -> McpResult {
        debug!("patch_user: {params:?}");
        self.mutate("Failed to patch user", |s| s.patch_user(params.as_ref()))
            .await
    }

    pub async fn delete_user(&self, Parameters(params): Parameters<Delete>) -> McpResult {
        debug!("delete_user: {params:?}");
        self.mutate("Failed to delete user", |s| s.delete_user(params.as_ref()))
            .await
    }
}
