//! Command-line interface definitions and handlers
//!
//! Argument structs carry the clap attributes; each one converts into a core
//! request type from `orderly_core::params`, so the core stays free of CLI
//! concerns:
//!
//! ```text
//! User Input → CLI Args (clap) → Core Params → Service
//! ```
//!
//! [`Cli`] runs a parsed command against the session's service, renders the
//! markdown result and saves the state file after every mutation.

use std::fmt::Display;

use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};
use jiff::Timestamp;
use orderly_core::{
    display::{CreateResult, Orders, UpdateResult, Users, Versions},
    params::{
        ById, DelegatedTasks, Delete, DeleteDelegatedTasks, DeleteSitReps, ListOrders, ListUsers,
        OrderRequest, SitRepRequest, SitReps, Subordinates, TaskRequest, UserRequest,
    },
    Email, Id, TaskState,
};

use crate::{renderer::TerminalRenderer, session::Session};

fn emails(values: Vec<String>) -> Vec<Email> {
    values.into_iter().map(Email::from).collect()
}

fn ids(values: Vec<String>) -> Vec<Id> {
    values.into_iter().map(Id::from).collect()
}

/// Command-line representation of task states.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum TaskStateArg {
    NotStarted,
    InProgress,
    HavingIssues,
    Blocked,
    Completed,
}

impl From<TaskStateArg> for TaskState {
    fn from(val: TaskStateArg) -> Self {
        match val {
            TaskStateArg::NotStarted => TaskState::NotStarted,
            TaskStateArg::InProgress => TaskState::InProgress,
            TaskStateArg::HavingIssues => TaskState::HavingIssues,
            TaskStateArg::Blocked => TaskState::Blocked,
            TaskStateArg::Completed => TaskState::Completed,
        }
    }
}

// ============================================================================
// Shared arguments
// ============================================================================

/// Identify a single order or user
#[derive(Args)]
pub struct IdArgs {
    #[arg(help = "Unique identifier of the order or user")]
    pub id: String,
}

impl From<IdArgs> for ById {
    fn from(val: IdArgs) -> Self {
        ById {
            id: Id::from(val.id),
        }
    }
}

/// Delete an order or user
///
/// By default a tombstone version is written: the entity disappears from
/// reads but its history stays available through `versions`. With `--hard`
/// the whole history is purged.
#[derive(Args)]
pub struct DeleteArgs {
    #[arg(help = "Unique identifier of the order or user to delete")]
    pub id: String,
    /// Purge the whole history instead of writing a tombstone
    #[arg(long)]
    pub hard: bool,
}

impl From<DeleteArgs> for Delete {
    fn from(val: DeleteArgs) -> Self {
        Delete {
            id: Id::from(val.id),
            hard: val.hard,
        }
    }
}

// ============================================================================
// Orders
// ============================================================================

/// Create a new order
#[derive(Args)]
pub struct CreateOrderArgs {
    /// What the order must achieve
    pub objective: String,
    #[arg(short, long, help = "E-mail of the person accountable for the order")]
    pub accountable: String,
    #[arg(short, long, help = "Deadline as an RFC 3339 timestamp, e.g. 2030-01-01T00:00:00Z")]
    pub deadline: Timestamp,
    #[arg(short, long, value_enum, help = "Initial state (defaults to not-started)")]
    pub state: Option<TaskStateArg>,
    #[arg(short, long, help = "ID of the order this one is delegated from")]
    pub parent: Option<String>,
}

impl From<CreateOrderArgs> for OrderRequest {
    fn from(val: CreateOrderArgs) -> Self {
        OrderRequest {
            task: Some(TaskRequest {
                id: None,
                state: val.state.map(TaskState::from),
                accountable: Some(Email::from(val.accountable)),
                objective: Some(val.objective),
                deadline: Some(val.deadline),
            }),
            parent_order_id: val.parent.map(Id::from),
            ..Default::default()
        }
    }
}

/// List orders
#[derive(Args)]
pub struct ListOrdersArgs {
    #[arg(short, long, help = "Only orders delegated from this order")]
    pub parent: Option<String>,
    #[arg(short, long, help = "Only orders whose primary task has this accountable")]
    pub accountable: Option<String>,
}

impl From<ListOrdersArgs> for ListOrders {
    fn from(val: ListOrdersArgs) -> Self {
        ListOrders {
            parent_order_id: val.parent.map(Id::from),
            accountable: val.accountable.map(Email::from),
        }
    }
}

/// Patch the primary task or parent of an order
///
/// Only the given fields change. A patch that changes nothing leaves the
/// order at its current version.
#[derive(Args)]
pub struct PatchOrderArgs {
    #[arg(help = "Unique identifier of the order to patch")]
    pub id: String,
    #[arg(short, long, help = "New objective")]
    pub objective: Option<String>,
    #[arg(short, long, help = "New accountable e-mail")]
    pub accountable: Option<String>,
    #[arg(short, long, help = "New deadline as an RFC 3339 timestamp")]
    pub deadline: Option<Timestamp>,
    #[arg(short, long, value_enum, help = "New state")]
    pub state: Option<TaskStateArg>,
    #[arg(short, long, help = "New parent order ID")]
    pub parent: Option<String>,
}

impl From<PatchOrderArgs> for OrderRequest {
    fn from(val: PatchOrderArgs) -> Self {
        OrderRequest {
            task: Some(TaskRequest {
                id: Some(Id::from(val.id)),
                state: val.state.map(TaskState::from),
                accountable: val.accountable.map(Email::from),
                objective: val.objective,
                deadline: val.deadline,
            }),
            parent_order_id: val.parent.map(Id::from),
            ..Default::default()
        }
    }
}

#[derive(Subcommand)]
pub enum OrderCommands {
    /// Create a new order
    #[command(alias = "c")]
    Create(CreateOrderArgs),
    /// Show the latest version of an order
    #[command(alias = "s")]
    Show(IdArgs),
    /// List orders
    #[command(aliases = ["l", "ls"])]
    List(ListOrdersArgs),
    /// Show every version of an order
    #[command(alias = "v")]
    Versions(IdArgs),
    /// List the orders delegated from an order
    Children(IdArgs),
    /// Patch the primary task or parent of an order
    #[command(alias = "p")]
    Patch(PatchOrderArgs),
    /// Delete an order
    #[command(aliases = ["d", "rm"])]
    Delete(DeleteArgs),
}

// ============================================================================
// Delegated tasks
// ============================================================================

/// Delegate a new task from an order
#[derive(Args)]
pub struct AddTaskArgs {
    #[arg(help = "Unique identifier of the order to add the task to")]
    pub order_id: String,
    /// What the task must achieve
    pub objective: String,
    #[arg(short, long, help = "E-mail of the person accountable for the task")]
    pub accountable: String,
    #[arg(short, long, help = "Deadline as an RFC 3339 timestamp")]
    pub deadline: Timestamp,
    #[arg(short, long, value_enum, help = "Initial state (defaults to not-started)")]
    pub state: Option<TaskStateArg>,
}

impl From<AddTaskArgs> for DelegatedTasks {
    fn from(val: AddTaskArgs) -> Self {
        DelegatedTasks {
            order_id: Id::from(val.order_id),
            tasks: vec![TaskRequest {
                id: None,
                state: val.state.map(TaskState::from),
                accountable: Some(Email::from(val.accountable)),
                objective: Some(val.objective),
                deadline: Some(val.deadline),
            }],
        }
    }
}

/// Patch a delegated task
#[derive(Args)]
pub struct PatchTaskArgs {
    #[arg(help = "Unique identifier of the order holding the task")]
    pub order_id: String,
    #[arg(help = "Unique identifier of the delegated task")]
    pub task_id: String,
    #[arg(short, long, help = "New objective")]
    pub objective: Option<String>,
    #[arg(short, long, help = "New accountable e-mail")]
    pub accountable: Option<String>,
    #[arg(short, long, help = "New deadline as an RFC 3339 timestamp")]
    pub deadline: Option<Timestamp>,
    #[arg(short, long, value_enum, help = "New state")]
    pub state: Option<TaskStateArg>,
}

impl From<PatchTaskArgs> for DelegatedTasks {
    fn from(val: PatchTaskArgs) -> Self {
        DelegatedTasks {
            order_id: Id::from(val.order_id),
            tasks: vec![TaskRequest {
                id: Some(Id::from(val.task_id)),
                state: val.state.map(TaskState::from),
                accountable: val.accountable.map(Email::from),
                objective: val.objective,
                deadline: val.deadline,
            }],
        }
    }
}

/// Remove delegated tasks from an order
///
/// Unknown task IDs are ignored. If none match, the order keeps its version.
#[derive(Args)]
pub struct RemoveTasksArgs {
    #[arg(help = "Unique identifier of the order holding the tasks")]
    pub order_id: String,
    #[arg(required = true, help = "Identifiers of the delegated tasks to remove")]
    pub task_ids: Vec<String>,
}

impl From<RemoveTasksArgs> for DeleteDelegatedTasks {
    fn from(val: RemoveTasksArgs) -> Self {
        DeleteDelegatedTasks {
            order_id: Id::from(val.order_id),
            delegated_task_ids: ids(val.task_ids),
        }
    }
}

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Delegate a new task from an order
    #[command(alias = "a")]
    Add(AddTaskArgs),
    /// Patch a delegated task
    #[command(alias = "p")]
    Patch(PatchTaskArgs),
    /// Remove delegated tasks
    #[command(aliases = ["r", "rm"])]
    Remove(RemoveTasksArgs),
}

// ============================================================================
// Sitreps
// ============================================================================

/// File a situation report against an order
///
/// At least one of situation, actions, tbd or issues must be given.
#[derive(Args)]
pub struct AddSitrepArgs {
    #[arg(help = "Unique identifier of the order to report on")]
    pub order_id: String,
    #[arg(short, long, help = "E-mail of the reporter")]
    pub by: String,
    #[arg(long, help = "When the situation was observed (defaults to now)")]
    pub datetime: Option<Timestamp>,
    #[arg(short, long, value_delimiter = ',', help = "E-mails to notify as comma-separated list")]
    pub ping: Vec<String>,
    #[arg(short, long, help = "Current situation")]
    pub situation: Option<String>,
    #[arg(long, help = "Actions taken")]
    pub actions: Option<String>,
    #[arg(long, help = "Open points to be decided")]
    pub tbd: Option<String>,
    #[arg(short, long, help = "Issues encountered")]
    pub issues: Option<String>,
}

impl From<AddSitrepArgs> for SitReps {
    fn from(val: AddSitrepArgs) -> Self {
        SitReps {
            order_id: Id::from(val.order_id),
            sitreps: vec![SitRepRequest {
                id: None,
                datetime: Some(val.datetime.unwrap_or_else(Timestamp::now)),
                by: Some(Email::from(val.by)),
                ping: Some(emails(val.ping)),
                situation: val.situation,
                actions: val.actions,
                tbd: val.tbd,
                issues: val.issues,
            }],
        }
    }
}

/// Patch a situation report
#[derive(Args)]
pub struct PatchSitrepArgs {
    #[arg(help = "Unique identifier of the order holding the sitrep")]
    pub order_id: String,
    #[arg(help = "Unique identifier of the sitrep")]
    pub sitrep_id: String,
    #[arg(short, long, help = "New reporter e-mail")]
    pub by: Option<String>,
    #[arg(long, help = "New observation time")]
    pub datetime: Option<Timestamp>,
    #[arg(short, long, value_delimiter = ',', help = "Replacement ping list as comma-separated list")]
    pub ping: Option<Vec<String>>,
    #[arg(short, long)]
    pub situation: Option<String>,
    #[arg(long)]
    pub actions: Option<String>,
    #[arg(long)]
    pub tbd: Option<String>,
    #[arg(short, long)]
    pub issues: Option<String>,
}

impl From<PatchSitrepArgs> for SitReps {
    fn from(val: PatchSitrepArgs) -> Self {
        SitReps {
            order_id: Id::from(val.order_id),
            sitreps: vec![SitRepRequest {
                id: Some(Id::from(val.sitrep_id)),
                datetime: val.datetime,
                by: val.by.map(Email::from),
                ping: val.ping.map(emails),
                situation: val.situation,
                actions: val.actions,
                tbd: val.tbd,
                issues: val.issues,
            }],
        }
    }
}

/// Remove situation reports from an order
#[derive(Args)]
pub struct RemoveSitrepsArgs {
    #[arg(help = "Unique identifier of the order holding the sitreps")]
    pub order_id: String,
    #[arg(required = true, help = "Identifiers of the sitreps to remove")]
    pub sitrep_ids: Vec<String>,
}

impl From<RemoveSitrepsArgs> for DeleteSitReps {
    fn from(val: RemoveSitrepsArgs) -> Self {
        DeleteSitReps {
            order_id: Id::from(val.order_id),
            sitrep_ids: ids(val.sitrep_ids),
        }
    }
}

#[derive(Subcommand)]
pub enum SitrepCommands {
    /// File a situation report
    #[command(alias = "a")]
    Add(AddSitrepArgs),
    /// Patch a situation report
    #[command(alias = "p")]
    Patch(PatchSitrepArgs),
    /// Remove situation reports
    #[command(aliases = ["r", "rm"])]
    Remove(RemoveSitrepsArgs),
}

// ============================================================================
// Users
// ============================================================================

/// Create a new user
#[derive(Args)]
pub struct CreateUserArgs {
    /// Display name
    pub name: String,
    #[arg(short, long, help = "E-mail address of the user")]
    pub email: String,
    #[arg(short, long, help = "E-mail address of the user's supervisor")]
    pub supervisor: String,
}

impl From<CreateUserArgs> for UserRequest {
    fn from(val: CreateUserArgs) -> Self {
        UserRequest {
            name: Some(val.name),
            email: Some(Email::from(val.email)),
            supervisor: Some(Email::from(val.supervisor)),
            ..Default::default()
        }
    }
}

/// List users
#[derive(Args)]
pub struct ListUsersArgs {
    #[arg(short, long, value_delimiter = ',', help = "Only these e-mails, comma-separated")]
    pub email: Vec<String>,
    #[arg(short, long, help = "Only users reporting to this e-mail")]
    pub supervisor: Option<String>,
}

impl From<ListUsersArgs> for ListUsers {
    fn from(val: ListUsersArgs) -> Self {
        ListUsers {
            emails: emails(val.email),
            supervisor: val.supervisor.map(Email::from),
        }
    }
}

/// List the users reporting to a user
#[derive(Args)]
pub struct SubordinatesArgs {
    #[arg(help = "Unique identifier of the supervising user")]
    pub id: String,
    /// Include indirect reports
    #[arg(short, long)]
    pub transitive: bool,
}

impl From<SubordinatesArgs> for Subordinates {
    fn from(val: SubordinatesArgs) -> Self {
        Subordinates {
            id: Id::from(val.id),
            transitive: val.transitive,
        }
    }
}

/// Patch a user
///
/// Changing the e-mail re-points the user's direct reports to the new
/// address.
#[derive(Args)]
pub struct PatchUserArgs {
    #[arg(help = "Unique identifier of the user to patch")]
    pub id: String,
    #[arg(short, long, help = "New display name")]
    pub name: Option<String>,
    #[arg(short, long, help = "New e-mail address")]
    pub email: Option<String>,
    #[arg(short, long, help = "New supervisor e-mail")]
    pub supervisor: Option<String>,
}

impl From<PatchUserArgs> for UserRequest {
    fn from(val: PatchUserArgs) -> Self {
        UserRequest {
            id: Some(Id::from(val.id)),
            name: val.name,
            email: val.email.map(Email::from),
            supervisor: val.supervisor.map(Email::from),
            meta: None,
        }
    }
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Create a new user
    #[command(alias = "c")]
    Create(CreateUserArgs),
    /// Show the latest version of a user
    #[command(alias = "s")]
    Show(IdArgs),
    /// List users
    #[command(aliases = ["l", "ls"])]
    List(ListUsersArgs),
    /// Show every version of a user
    #[command(alias = "v")]
    Versions(IdArgs),
    /// List the users reporting to a user
    Subordinates(SubordinatesArgs),
    /// Patch a user
    #[command(alias = "p")]
    Patch(PatchUserArgs),
    /// Delete a user; their reports move to their supervisor
    #[command(aliases = ["d", "rm"])]
    Delete(DeleteArgs),
}

// ============================================================================
// Command handlers
// ============================================================================

/// Runs parsed commands against a session and renders the results.
pub struct Cli {
    session: Session,
    renderer: TerminalRenderer,
}

impl Cli {
    pub fn new(session: Session, renderer: TerminalRenderer) -> Self {
        Self { session, renderer }
    }

    fn render(&self, output: impl Display) -> Result<()> {
        self.renderer.render(&output.to_string())
    }

    /// Save the state file, then render.
    fn commit(&self, output: impl Display) -> Result<()> {
        self.session.save()?;
        self.render(output)
    }

    fn commit_update<T>(&self, result: UpdateResult<T>) -> Result<()>
    where
        UpdateResult<T>: Display,
    {
        if result.is_noop() {
            self.render(result)
        } else {
            self.commit(result)
        }
    }

    pub fn list_orders(&self, params: &ListOrders) -> Result<()> {
        let orders = self.session.service().list_orders(params)?;
        self.render(Orders(orders))
    }

    pub fn handle_order_command(&self, command: OrderCommands) -> Result<()> {
        let service = self.session.service();
        match command {
            OrderCommands::Create(args) => {
                let order = service.create_order(&args.into())?;
                self.commit(CreateResult::new(order))
            }
            OrderCommands::Show(args) => self.render(service.get_order(&args.into())?),
            OrderCommands::List(args) => self.list_orders(&args.into()),
            OrderCommands::Versions(args) => {
                self.render(Versions(service.order_versions(&args.into())?))
            }
            OrderCommands::Children(args) => {
                self.render(Orders(service.order_children(&args.into())?))
            }
            OrderCommands::Patch(args) => self.commit_update(service.patch_order(&args.into())?),
            OrderCommands::Delete(args) => self.commit(service.delete_order(&args.into())?),
        }
    }

    pub fn handle_task_command(&self, command: TaskCommands) -> Result<()> {
        let service = self.session.service();
        let result = match command {
            TaskCommands::Add(args) => service.put_delegated_tasks(&args.into())?,
            TaskCommands::Patch(args) => service.patch_delegated_tasks(&args.into())?,
            TaskCommands::Remove(args) => service.delete_delegated_tasks(&args.into())?,
        };
        self.commit_update(result)
    }

    pub fn handle_sitrep_command(&self, command: SitrepCommands) -> Result<()> {
        let service = self.session.service();
        let result = match command {
            SitrepCommands::Add(args) => service.put_sitreps(&args.into())?,
            SitrepCommands::Patch(args) => service.patch_sitreps(&args.into())?,
            SitrepCommands::Remove(args) => service.delete_sitreps(&args.into())?,
        };
        self.commit_update(result)
    }

    pub fn handle_user_command(&self, command: UserCommands) -> Result<()> {
        let service = self.session.service();
        match command {
            UserCommands::Create(args) => {
                let user = service.create_user(&args.into())?;
                self.commit(CreateResult::new(user))
            }
            UserCommands::Show(args) => self.render(service.get_user(&args.into())?),
            UserCommands::List(args) => self.render(Users(service.list_users(&args.into())?)),
            UserCommands::Versions(args) => {
                self.render(Versions(service.user_versions(&args.into())?))
            }
            UserCommands::Subordinates(args) => {
                self.render(Users(service.user_subordinates(&args.into())?))
            }
            UserCommands::Patch(args) => self.commit_update(service.patch_user(&args.into())?),
            UserCommands::Delete(args) => self.commit(service.delete_user(&args.into())?),
        }
    }
}
