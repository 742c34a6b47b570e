use orderly_core::{
    params::{OrderRequest, SitRepRequest, TaskRequest, UserRequest},
    Service, ServiceBuilder, Snapshot,
};
use tempfile::TempDir;

pub const ROOT_EMAIL: &str = "root@root.com";

/// Helper function to create a test service with a root order
pub fn create_test_service() -> Service {
    ServiceBuilder::new()
        .with_root_order(ROOT_EMAIL)
        .build()
        .expect("Failed to create service")
}

/// Helper function to reopen a service from a saved snapshot
pub fn reopen(path: &std::path::Path) -> Service {
    let snapshot = Snapshot::load(path).expect("Failed to load snapshot");
    ServiceBuilder::new()
        .with_snapshot(snapshot)
        .with_root_order(ROOT_EMAIL)
        .build()
        .expect("Failed to reopen service")
}

/// Helper function to create a temporary directory for state files
pub fn create_test_environment() -> (TempDir, std::path::PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let path = temp_dir.path().join("state.json");
    (temp_dir, path)
}

pub fn task(objective: &str, accountable: &str) -> TaskRequest {
    TaskRequest {
        accountable: Some(accountable.into()),
        objective: Some(objective.to_string()),
        deadline: Some("2030-06-01T12:00:00Z".parse().expect("Failed to parse deadline")),
        ..Default::default()
    }
}

pub fn sitrep(by: &str, situation: &str) -> SitRepRequest {
    SitRepRequest {
        datetime: Some("2030-05-01T08:00:00Z".parse().expect("Failed to parse datetime")),
        by: Some(by.into()),
        situation: Some(situation.to_string()),
        ..Default::default()
    }
}

pub fn order(objective: &str, accountable: &str) -> OrderRequest {
    OrderRequest {
        task: Some(task(objective, accountable)),
        ..Default::default()
    }
}

pub fn user(name: &str, email: &str, supervisor: &str) -> UserRequest {
    UserRequest {
        name: Some(name.to_string()),
        email: Some(email.into()),
        supervisor: Some(supervisor.into()),
        ..Default::default()
    }
}
