//! Tests for the service module.

use std::sync::atomic::{AtomicUsize, Ordering};

use jiff::Timestamp;

use super::*;
use crate::{
    error::{OrderlyError, Result},
    models::{Email, Id, TaskState},
    params::{
        ById, DelegatedTasks, Delete, DeleteDelegatedTasks, DeleteSitReps, ListOrders, ListUsers,
        OrderRequest, SitRepRequest, SitReps, Subordinates, TaskRequest, UserRequest,
    },
    store::{Expect, MemoryStore, Repository},
};

/// Helper function to create a test service
fn create_test_service() -> Service {
    ServiceBuilder::new()
        .build()
        .expect("Failed to create service")
}

fn deadline() -> Timestamp {
    "2030-01-01T00:00:00Z".parse().expect("Failed to parse deadline")
}

fn task(objective: &str, accountable: &str) -> TaskRequest {
    TaskRequest {
        state: Some(TaskState::NotStarted),
        accountable: Some(accountable.into()),
        objective: Some(objective.to_string()),
        deadline: Some(deadline()),
        ..Default::default()
    }
}

fn sitrep(situation: &str) -> SitRepRequest {
    SitRepRequest {
        datetime: Some(deadline()),
        by: Some("lead@unit.org".into()),
        ping: Some(vec!["a@unit.org".into(), "b@unit.org".into()]),
        situation: Some(situation.to_string()),
        ..Default::default()
    }
}

fn create_order(service: &Service, objective: &str) -> Order {
    service
        .create_order(&OrderRequest {
            task: Some(task(objective, "lead@unit.org")),
            delegated_tasks: Some(vec![
                task("Scout north", "a@unit.org"),
                task("Scout south", "b@unit.org"),
            ]),
            sitreps: Some(vec![sitrep("Quiet")]),
            ..Default::default()
        })
        .expect("Failed to create order")
}

fn create_user(service: &Service, name: &str, email: &str, supervisor: &str) -> User {
    service
        .create_user(&UserRequest {
            name: Some(name.to_string()),
            email: Some(email.into()),
            supervisor: Some(supervisor.into()),
            ..Default::default()
        })
        .expect("Failed to create user")
}

#[test]
fn test_create_and_get_order() {
    let service = create_test_service();
    let order = create_order(&service, "Hold the ridge");

    assert_eq!(order.meta.version, 1);
    assert!(!order.id().is_empty());
    assert_eq!(order.delegated_tasks.len(), 2);
    assert_ne!(order.delegated_tasks[0].id, order.delegated_tasks[1].id);
    assert_eq!(order.sitreps.len(), 1);

    let fetched = service
        .get_order(&ById {
            id: order.id().clone(),
        })
        .expect("Failed to get order");
    assert_eq!(fetched, order);
}

#[test]
fn test_create_order_rejects_ids() {
    let service = create_test_service();
    let mut request = task("Hold the ridge", "lead@unit.org");
    request.id = Some(Id::new());

    let result = service.create_order(&OrderRequest {
        task: Some(request),
        ..Default::default()
    });

    match result.unwrap_err() {
        OrderlyError::InvalidArgument { field, reason } => {
            assert_eq!(field, "order.task.id");
            assert_eq!(reason, "disallowed");
        }
        _ => panic!("Expected InvalidArgument error"),
    }
    assert!(service.list_orders(&ListOrders::default()).unwrap().is_empty());
}

#[test]
fn test_identical_patch_writes_nothing() {
    let service = create_test_service();
    let order = create_order(&service, "Hold the ridge");

    let result = service
        .patch_order(&OrderRequest {
            task: Some(TaskRequest::from(&order.task)),
            delegated_tasks: Some(order.delegated_tasks.iter().map(TaskRequest::from).collect()),
            ..Default::default()
        })
        .expect("Failed to patch order");

    assert!(result.is_noop());
    assert_eq!(result.resource, order);
    let versions = service
        .order_versions(&ById {
            id: order.id().clone(),
        })
        .unwrap();
    assert_eq!(versions.len(), 1);
}

#[test]
fn test_patch_delegated_task_objective() {
    let service = create_test_service();
    let order = create_order(&service, "Hold the ridge");
    let target = order.delegated_tasks[0].id.clone();

    let result = service
        .patch_delegated_tasks(&DelegatedTasks {
            order_id: order.id().clone(),
            tasks: vec![TaskRequest {
                id: Some(target.clone()),
                objective: Some("Scout the north ridge".to_string()),
                ..Default::default()
            }],
        })
        .expect("Failed to patch delegated task");

    let updated = result.resource;
    assert_eq!(updated.meta.version, 2);
    assert_eq!(
        result.changes,
        vec![format!("delegated_tasks.{target}.objective")]
    );
    assert_eq!(updated.delegated_tasks[0].objective, "Scout the north ridge");
    assert_eq!(updated.delegated_tasks[0].accountable, order.delegated_tasks[0].accountable);
    assert_eq!(updated.delegated_tasks[1], order.delegated_tasks[1]);
    assert_eq!(updated.task, order.task);
    assert_eq!(updated.sitreps, order.sitreps);
}

#[test]
fn test_every_changing_patch_adds_one_version() {
    let service = create_test_service();
    let order = create_order(&service, "Hold the ridge");

    for (i, state) in [TaskState::InProgress, TaskState::Blocked, TaskState::Completed]
        .into_iter()
        .enumerate()
    {
        let result = service
            .patch_order(&OrderRequest {
                task: Some(TaskRequest {
                    id: Some(order.id().clone()),
                    state: Some(state),
                    ..Default::default()
                }),
                ..Default::default()
            })
            .expect("Failed to patch order");
        assert_eq!(result.resource.meta.version, i as u64 + 2);
    }

    let versions = service
        .order_versions(&ById {
            id: order.id().clone(),
        })
        .unwrap();
    let numbers: Vec<u64> = versions.iter().map(|o| o.meta.version).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4]);
    assert_eq!(versions[0], order);
}

#[test]
fn test_patch_unknown_order_is_not_found() {
    let service = create_test_service();

    let result = service.patch_order(&OrderRequest {
        task: Some(TaskRequest {
            id: Some(Id::new()),
            objective: Some("Anything".to_string()),
            ..Default::default()
        }),
        ..Default::default()
    });

    assert!(matches!(result, Err(OrderlyError::NotFound { kind: "order", .. })));
}

#[test]
fn test_put_delegated_tasks_bumps_once() {
    let service = create_test_service();
    let order = create_order(&service, "Hold the ridge");

    let result = service
        .put_delegated_tasks(&DelegatedTasks {
            order_id: order.id().clone(),
            tasks: vec![task("Dig in", "c@unit.org"), task("Resupply", "d@unit.org")],
        })
        .expect("Failed to add delegated tasks");

    let updated = result.resource;
    assert_eq!(updated.meta.version, 2);
    assert_eq!(updated.delegated_tasks.len(), 4);
    assert_eq!(result.changes.len(), 2);
    assert!(result.changes.iter().all(|c| c.ends_with(" added")));
    updated.check_invariants().expect("Duplicate delegated task IDs");
}

#[test]
fn test_put_rejects_supplied_ids() {
    let service = create_test_service();
    let order = create_order(&service, "Hold the ridge");
    let mut request = task("Dig in", "c@unit.org");
    request.id = Some(order.delegated_tasks[0].id.clone());

    let result = service.put_delegated_tasks(&DelegatedTasks {
        order_id: order.id().clone(),
        tasks: vec![request],
    });

    assert_eq!(result.unwrap_err().to_string(), "tasks.0.id disallowed");
}

#[test]
fn test_delete_unknown_sitreps_is_noop() {
    let service = create_test_service();
    let order = service
        .create_order(&OrderRequest {
            task: Some(task("Hold the ridge", "lead@unit.org")),
            sitreps: Some(vec![sitrep("Quiet"), sitrep("Contact east")]),
            ..Default::default()
        })
        .expect("Failed to create order");
    assert_eq!(order.sitreps.len(), 2);

    let result = service
        .delete_sitreps(&DeleteSitReps {
            order_id: order.id().clone(),
            sitrep_ids: vec![Id::new(), Id::new(), Id::new()],
        })
        .expect("Failed to delete sitreps");

    assert!(result.is_noop());
    assert_eq!(result.resource.meta.version, 1);
    assert_eq!(result.resource.sitreps, order.sitreps);

    let reread = service
        .get_order(&ById {
            id: order.id().clone(),
        })
        .expect("Failed to get order");
    assert_eq!(reread, order);
}

#[test]
fn test_delete_delegated_tasks_removes_matches() {
    let service = create_test_service();
    let order = create_order(&service, "Hold the ridge");
    let keep = order.delegated_tasks[1].clone();

    let result = service
        .delete_delegated_tasks(&DeleteDelegatedTasks {
            order_id: order.id().clone(),
            delegated_task_ids: vec![order.delegated_tasks[0].id.clone(), Id::new()],
        })
        .expect("Failed to delete delegated tasks");

    assert_eq!(result.resource.meta.version, 2);
    assert_eq!(result.resource.delegated_tasks, vec![keep]);
}

#[test]
fn test_patch_sitrep_by_id() {
    let service = create_test_service();
    let order = create_order(&service, "Hold the ridge");
    let id = order.sitreps[0].id.clone();

    // Same pings in a different order change nothing.
    let noop = service
        .patch_sitreps(&SitReps {
            order_id: order.id().clone(),
            sitreps: vec![SitRepRequest {
                id: Some(id.clone()),
                ping: Some(vec!["b@unit.org".into(), "a@unit.org".into()]),
                ..Default::default()
            }],
        })
        .expect("Failed to patch sitrep");
    assert!(noop.is_noop());

    let result = service
        .patch_sitreps(&SitReps {
            order_id: order.id().clone(),
            sitreps: vec![
                SitRepRequest {
                    id: Some(id.clone()),
                    issues: Some("Radio down".to_string()),
                    ..Default::default()
                },
                SitRepRequest {
                    id: Some(Id::new()),
                    issues: Some("Ignored".to_string()),
                    ..Default::default()
                },
            ],
        })
        .expect("Failed to patch sitrep");

    assert_eq!(result.resource.meta.version, 2);
    assert_eq!(result.resource.sitreps.len(), 1);
    assert_eq!(result.resource.sitreps[0].issues, "Radio down");
    assert_eq!(result.resource.sitreps[0].situation, "Quiet");
}

#[test]
fn test_put_sitreps_requires_content() {
    let service = create_test_service();
    let order = create_order(&service, "Hold the ridge");

    let result = service.put_sitreps(&SitReps {
        order_id: order.id().clone(),
        sitreps: vec![SitRepRequest {
            datetime: Some(deadline()),
            by: Some("lead@unit.org".into()),
            ..Default::default()
        }],
    });

    assert_eq!(result.unwrap_err().to_string(), "sitreps.0 empty sitrep");
}

#[test]
fn test_stale_write_rejected_by_default() {
    let service = create_test_service();
    let order = create_order(&service, "Hold the ridge");
    let stale = order.clone();

    service
        .patch_order(&OrderRequest {
            task: Some(TaskRequest {
                id: Some(order.id().clone()),
                objective: Some("First writer".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        })
        .expect("Failed to patch order");

    let mut late = stale;
    late.task.objective = "Second writer".to_string();
    late.meta.bump(Timestamp::now());
    let result = service
        .orders
        .write(late, service.conflict_policy().expect(order.meta.version));

    match result.unwrap_err() {
        OrderlyError::Conflict { reason, .. } => {
            assert_eq!(reason, "expected version 1, found 2");
        }
        _ => panic!("Expected Conflict error"),
    }
    let current = service
        .get_order(&ById {
            id: order.id().clone(),
        })
        .unwrap();
    assert_eq!(current.task.objective, "First writer");
}

#[test]
fn test_stale_write_lands_with_last_write_wins() {
    let service = ServiceBuilder::new()
        .with_conflict_policy(ConflictPolicy::LastWriteWins)
        .build()
        .expect("Failed to create service");
    let order = create_order(&service, "Hold the ridge");

    let mut late = order.clone();
    late.task.objective = "Second writer".to_string();
    late.meta.bump(Timestamp::now());
    service
        .orders
        .write(late, service.conflict_policy().expect(0))
        .expect("Last write should win");

    let current = service
        .get_order(&ById {
            id: order.id().clone(),
        })
        .unwrap();
    assert_eq!(current.task.objective, "Second writer");
}

#[test]
fn test_soft_then_hard_delete_order() {
    let service = create_test_service();
    let order = create_order(&service, "Hold the ridge");
    let id = order.id().clone();

    let deleted = service
        .delete_order(&Delete {
            id: id.clone(),
            hard: false,
        })
        .expect("Failed to delete order");
    assert_eq!(deleted.mode, DeleteMode::Soft);
    assert!(deleted.resource.meta.deleted);
    assert_eq!(deleted.resource.meta.version, 2);

    assert!(service.get_order(&ById { id: id.clone() }).is_err());
    let versions = service.order_versions(&ById { id: id.clone() }).unwrap();
    assert_eq!(versions.len(), 2);
    assert!(versions[1].meta.deleted);

    service
        .delete_order(&Delete {
            id: id.clone(),
            hard: true,
        })
        .expect("Failed to purge order");
    assert!(matches!(
        service.order_versions(&ById { id }),
        Err(OrderlyError::NotFound { .. })
    ));
}

#[test]
fn test_order_children_and_filters() {
    let service = ServiceBuilder::new()
        .with_root_order("root@root.com")
        .build()
        .expect("Failed to create service");
    let root = service.root_order().unwrap().expect("Root order missing");

    let child = service
        .create_order(&OrderRequest {
            task: Some(task("Take the hill", "lead@unit.org")),
            parent_order_id: Some(root.id().clone()),
            ..Default::default()
        })
        .expect("Failed to create child order");
    create_order(&service, "Unrelated");

    let children = service
        .order_children(&ById {
            id: root.id().clone(),
        })
        .unwrap();
    assert_eq!(children, vec![child.clone()]);

    let listed = service
        .list_orders(&ListOrders {
            parent_order_id: Some(root.id().clone()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(listed.len(), 1);

    let by_root = service
        .list_orders(&ListOrders {
            accountable: Some("root@root.com".into()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(by_root, vec![root]);
    assert_eq!(service.list_orders(&ListOrders::default()).unwrap().len(), 3);

    assert!(matches!(
        service.order_children(&ById { id: Id::new() }),
        Err(OrderlyError::NotFound { .. })
    ));
}

#[test]
fn test_user_patch_and_noop() {
    let service = create_test_service();
    let user = create_user(&service, "Ann", "ann@unit.org", "root@root.com");
    assert_eq!(user.meta.version, 1);

    let noop = service
        .patch_user(&UserRequest {
            id: Some(user.id.clone()),
            name: Some("Ann".to_string()),
            ..Default::default()
        })
        .expect("Failed to patch user");
    assert!(noop.is_noop());
    assert_eq!(noop.resource.meta.version, 1);

    let renamed = service
        .patch_user(&UserRequest {
            id: Some(user.id.clone()),
            name: Some("Ann Lee".to_string()),
            ..Default::default()
        })
        .expect("Failed to patch user");
    assert_eq!(renamed.changes, vec!["name".to_string()]);
    assert_eq!(renamed.resource.meta.version, 2);
    assert_eq!(renamed.resource.email, user.email);
}

#[test]
fn test_email_change_moves_subordinates() {
    let service = create_test_service();
    let boss = create_user(&service, "Ann", "ann@unit.org", "root@root.com");
    let report = create_user(&service, "Bob", "bob@unit.org", "ann@unit.org");

    let result = service
        .patch_user(&UserRequest {
            id: Some(boss.id.clone()),
            email: Some("ann.lee@unit.org".into()),
            ..Default::default()
        })
        .expect("Failed to patch user");
    assert_eq!(result.changes.len(), 2);

    let report = service.get_user(&ById { id: report.id }).unwrap();
    assert_eq!(report.supervisor.as_str(), "ann.lee@unit.org");
    assert_eq!(report.meta.version, 2);
}

#[test]
fn test_delete_user_reassigns_to_supervisor() {
    let service = create_test_service();
    let boss = create_user(&service, "Ann", "ann@unit.org", "root@root.com");
    let report = create_user(&service, "Bob", "bob@unit.org", "ann@unit.org");

    let result = service
        .delete_user(&Delete {
            id: boss.id.clone(),
            hard: false,
        })
        .expect("Failed to delete user");
    assert_eq!(result.notes.len(), 1);

    let report = service.get_user(&ById { id: report.id }).unwrap();
    assert_eq!(report.supervisor.as_str(), "root@root.com");

    let remaining = service
        .list_users(&ListUsers {
            supervisor: Some("ann@unit.org".into()),
            ..Default::default()
        })
        .unwrap();
    assert!(remaining.is_empty());
}

#[test]
fn test_subordinates_direct_and_transitive() {
    let service = create_test_service();
    let ann = create_user(&service, "Ann", "ann@unit.org", "root@root.com");
    create_user(&service, "Bob", "bob@unit.org", "ann@unit.org");
    create_user(&service, "Cid", "cid@unit.org", "bob@unit.org");

    let direct = service
        .user_subordinates(&Subordinates {
            id: ann.id.clone(),
            transitive: false,
        })
        .unwrap();
    assert_eq!(direct.len(), 1);
    assert_eq!(direct[0].name, "Bob");

    let all = service
        .user_subordinates(&Subordinates {
            id: ann.id,
            transitive: true,
        })
        .unwrap();
    let names: Vec<&str> = all.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, vec!["Bob", "Cid"]);
}

#[test]
fn test_subordinates_survive_cycles() {
    let service = create_test_service();
    let ann = create_user(&service, "Ann", "ann@unit.org", "bob@unit.org");
    create_user(&service, "Bob", "bob@unit.org", "ann@unit.org");

    let all = service
        .user_subordinates(&Subordinates {
            id: ann.id,
            transitive: true,
        })
        .unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "Bob");
}

#[test]
fn test_list_users_by_email() {
    let service = create_test_service();
    create_user(&service, "Ann", "ann@unit.org", "root@root.com");
    create_user(&service, "Bob", "bob@unit.org", "root@root.com");

    let found = service
        .list_users(&ListUsers {
            emails: vec!["bob@unit.org".into(), "nobody@unit.org".into()],
            ..Default::default()
        })
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Bob");
}

/// User repository that rejects updates to one address a set number of times.
struct ContendedUsers {
    inner: MemoryStore<User>,
    email: Email,
    failures: AtomicUsize,
}

impl ContendedUsers {
    fn new(email: &str, failures: usize) -> Self {
        Self {
            inner: MemoryStore::new(),
            email: email.into(),
            failures: AtomicUsize::new(failures),
        }
    }
}

impl Repository<User> for ContendedUsers {
    fn read_by_id(&self, id: &Id) -> Result<User> {
        self.inner.read_by_id(id)
    }

    fn read_versions(&self, id: &Id) -> Result<Vec<User>> {
        self.inner.read_versions(id)
    }

    fn read_all(&self) -> Result<Vec<User>> {
        self.inner.read_all()
    }

    fn read_children(&self, parent_key: &str) -> Result<Vec<User>> {
        self.inner.read_children(parent_key)
    }

    fn write(&self, entity: User, expect: Expect) -> Result<User> {
        let contended = entity.email == self.email && entity.meta.version > 1;
        if contended
            && self
                .failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
        {
            return Err(OrderlyError::conflict(
                "user",
                entity.id.as_str(),
                "expected version 1, found 2",
            ));
        }
        self.inner.write(entity, expect)
    }

    fn delete(&self, id: &Id) -> Result<User> {
        self.inner.delete(id)
    }

    fn export(&self) -> Result<Vec<Vec<User>>> {
        self.inner.export()
    }

    fn import(&self, histories: Vec<Vec<User>>) -> Result<()> {
        self.inner.import(histories)
    }
}

fn create_contended_service(email: &str, failures: usize) -> Service {
    ServiceBuilder::new()
        .with_user_repository(Box::new(ContendedUsers::new(email, failures)))
        .build()
        .expect("Failed to create service")
}

#[test]
fn test_delete_user_retries_contended_subordinate() {
    let service = create_contended_service("b@unit.org", 1);
    let boss = create_user(&service, "Boss", "boss@unit.org", "top@unit.org");
    let a = create_user(&service, "A", "a@unit.org", "boss@unit.org");
    let b = create_user(&service, "B", "b@unit.org", "boss@unit.org");

    let result = service
        .delete_user(&Delete {
            id: boss.id.clone(),
            hard: false,
        })
        .expect("Delete must succeed once the tombstone is written");
    assert_eq!(result.notes, vec!["2 subordinate(s) now report to top@unit.org"]);

    for id in [a.id, b.id] {
        let user = service.get_user(&ById { id }).unwrap();
        assert_eq!(user.supervisor.as_str(), "top@unit.org");
        assert_eq!(user.meta.version, 2);
    }
}

#[test]
fn test_delete_user_survives_stuck_subordinate() {
    let service = create_contended_service("b@unit.org", usize::MAX);
    let boss = create_user(&service, "Boss", "boss@unit.org", "top@unit.org");
    let a = create_user(&service, "A", "a@unit.org", "boss@unit.org");
    let b = create_user(&service, "B", "b@unit.org", "boss@unit.org");

    let result = service
        .delete_user(&Delete {
            id: boss.id.clone(),
            hard: false,
        })
        .expect("Delete must succeed once the tombstone is written");
    assert_eq!(result.notes.len(), 2);
    assert_eq!(result.notes[0], "1 subordinate(s) now report to top@unit.org");
    assert!(result.notes[1].contains(&format!("user {} not reassigned", b.id)));

    match service.get_user(&ById { id: boss.id }).unwrap_err() {
        OrderlyError::NotFound { .. } => {}
        other => panic!("Expected NotFound error, got {other:?}"),
    }
    let a = service.get_user(&ById { id: a.id }).unwrap();
    assert_eq!(a.supervisor.as_str(), "top@unit.org");
    let b = service.get_user(&ById { id: b.id }).unwrap();
    assert_eq!(b.supervisor.as_str(), "boss@unit.org");
}

#[test]
fn test_email_change_survives_stuck_subordinate() {
    let service = create_contended_service("b@unit.org", usize::MAX);
    let boss = create_user(&service, "Boss", "boss@unit.org", "top@unit.org");
    create_user(&service, "B", "b@unit.org", "boss@unit.org");

    let result = service
        .patch_user(&UserRequest {
            id: Some(boss.id.clone()),
            email: Some("chief@unit.org".into()),
            ..Default::default()
        })
        .expect("Patch must succeed once the user is written");

    assert_eq!(result.resource.email.as_str(), "chief@unit.org");
    assert_eq!(result.resource.meta.version, 2);
    assert_eq!(result.changes[0], "email");
    assert!(result.changes[1].contains("not reassigned"));
}

#[test]
fn test_delete_user_in_cycle_does_not_self_supervise() {
    let service = create_test_service();
    let ann = create_user(&service, "Ann", "ann@unit.org", "bob@unit.org");
    let bob = create_user(&service, "Bob", "bob@unit.org", "ann@unit.org");

    let result = service
        .delete_user(&Delete {
            id: ann.id,
            hard: false,
        })
        .expect("Failed to delete user");
    assert!(result.notes.is_empty());

    let bob = service.get_user(&ById { id: bob.id }).unwrap();
    assert_ne!(bob.supervisor, bob.email);
    assert_eq!(bob.meta.version, 1);
}
