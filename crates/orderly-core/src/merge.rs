//! Merge engine: applies partial requests onto complete aggregates.
//!
//! Scalars follow one rule everywhere: a present value that differs from the
//! current one replaces it and is recorded in [`Changes`]; anything else is
//! left alone. Collection items are matched by ID and never created by a
//! patch. The caller decides on versioning from the returned [`Changes`]:
//! empty means no-op, anything else means exactly one new version.

use std::{collections::HashSet, fmt};

use jiff::Timestamp;

use crate::{
    models::{sitrep::same_pings, Id, Order, SitRep, Task, User, Versioned},
    params::{OrderRequest, Present, SitRepRequest, TaskRequest, UserRequest},
};

/// Ordered list of field paths a request changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changes(Vec<String>);

impl Changes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, path: impl Into<String>) {
        self.0.push(path.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl fmt::Display for Changes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

fn apply<T: PartialEq + Clone>(
    slot: &mut T,
    incoming: Option<&T>,
    path: &str,
    changes: &mut Changes,
) {
    if let Some(value) = incoming {
        if slot != value {
            *slot = value.clone();
            changes.record(path);
        }
    }
}

/// Merge task fields. The ID is never touched.
pub fn merge_task(task: &mut Task, patch: &TaskRequest, path: &str, changes: &mut Changes) {
    apply(&mut task.state, patch.state.present(), &format!("{path}.state"), changes);
    apply(
        &mut task.accountable,
        patch.accountable.present(),
        &format!("{path}.accountable"),
        changes,
    );
    apply(
        &mut task.objective,
        patch.objective.present(),
        &format!("{path}.objective"),
        changes,
    );
    apply(
        &mut task.deadline,
        patch.deadline.present(),
        &format!("{path}.deadline"),
        changes,
    );
}

/// Merge sitrep fields. Ping lists compare as multisets.
pub fn merge_sitrep(sitrep: &mut SitRep, patch: &SitRepRequest, path: &str, changes: &mut Changes) {
    apply(
        &mut sitrep.datetime,
        patch.datetime.present(),
        &format!("{path}.datetime"),
        changes,
    );
    apply(&mut sitrep.by, patch.by.present(), &format!("{path}.by"), changes);
    if let Some(ping) = patch.ping.present() {
        if !same_pings(&sitrep.ping, ping) {
            sitrep.ping = ping.clone();
            changes.record(format!("{path}.ping"));
        }
    }
    apply(
        &mut sitrep.situation,
        patch.situation.present(),
        &format!("{path}.situation"),
        changes,
    );
    apply(
        &mut sitrep.actions,
        patch.actions.present(),
        &format!("{path}.actions"),
        changes,
    );
    apply(&mut sitrep.tbd, patch.tbd.present(), &format!("{path}.tbd"), changes);
    apply(
        &mut sitrep.issues,
        patch.issues.present(),
        &format!("{path}.issues"),
        changes,
    );
}

/// Merge delegated-task patches into `order`, matching by ID.
///
/// Patches whose ID matches no delegated task are skipped.
pub fn merge_delegated_tasks(order: &mut Order, patches: &[TaskRequest], changes: &mut Changes) {
    for patch in patches {
        let Some(id) = patch.id.present() else {
            continue;
        };
        if let Some(task) = order.delegated_tasks.iter_mut().find(|t| &t.id == id) {
            merge_task(task, patch, &format!("delegated_tasks.{id}"), changes);
        }
    }
}

/// Merge sitrep patches into `order`, matching by ID.
///
/// Patches whose ID matches no sitrep are skipped.
pub fn merge_sitreps(order: &mut Order, patches: &[SitRepRequest], changes: &mut Changes) {
    for patch in patches {
        let Some(id) = patch.id.present() else {
            continue;
        };
        if let Some(sitrep) = order.sitreps.iter_mut().find(|s| &s.id == id) {
            merge_sitrep(sitrep, patch, &format!("sitreps.{id}"), changes);
        }
    }
}

/// Merge an order-level patch: primary task, parent, delegated tasks and
/// sitreps.
pub fn merge_order(order: &mut Order, patch: &OrderRequest) -> Changes {
    let mut changes = Changes::new();

    if let Some(task) = &patch.task {
        merge_task(&mut order.task, task, "task", &mut changes);
    }
    if let Some(parent) = patch.parent_order_id.present() {
        if order.parent_order_id.as_ref() != Some(parent) {
            order.parent_order_id = Some(parent.clone());
            changes.record("parent_order_id");
        }
    }
    if let Some(tasks) = &patch.delegated_tasks {
        merge_delegated_tasks(order, tasks, &mut changes);
    }
    if let Some(sitreps) = &patch.sitreps {
        merge_sitreps(order, sitreps, &mut changes);
    }

    changes
}

/// Merge a user patch. The ID is never touched.
pub fn merge_user(user: &mut User, patch: &UserRequest) -> Changes {
    let mut changes = Changes::new();
    apply(&mut user.name, patch.name.present(), "name", &mut changes);
    apply(&mut user.email, patch.email.present(), "email", &mut changes);
    apply(
        &mut user.supervisor,
        patch.supervisor.present(),
        "supervisor",
        &mut changes,
    );
    changes
}

fn fresh_id(taken: &HashSet<Id>) -> Id {
    loop {
        let id = Id::new();
        if !taken.contains(&id) {
            return id;
        }
    }
}

/// Append new delegated tasks, each under a fresh ID.
pub fn append_delegated_tasks(order: &mut Order, tasks: &[TaskRequest]) -> Changes {
    let mut changes = Changes::new();
    let mut taken: HashSet<Id> = order.delegated_tasks.iter().map(|t| t.id.clone()).collect();
    for request in tasks {
        let id = fresh_id(&taken);
        taken.insert(id.clone());
        changes.record(format!("delegated_tasks.{id} added"));
        order.delegated_tasks.push(request.to_task(id));
    }
    changes
}

/// Append new sitreps, each under a fresh ID.
pub fn append_sitreps(order: &mut Order, sitreps: &[SitRepRequest]) -> Changes {
    let mut changes = Changes::new();
    let mut taken: HashSet<Id> = order.sitreps.iter().map(|s| s.id.clone()).collect();
    for request in sitreps {
        let id = fresh_id(&taken);
        taken.insert(id.clone());
        changes.record(format!("sitreps.{id} added"));
        order.sitreps.push(request.to_sitrep(id));
    }
    changes
}

/// Remove delegated tasks by ID. Unknown IDs are ignored.
pub fn remove_delegated_tasks(order: &mut Order, ids: &[Id]) -> Changes {
    let mut changes = Changes::new();
    order.delegated_tasks.retain(|task| {
        let removed = ids.contains(&task.id);
        if removed {
            changes.record(format!("delegated_tasks.{} removed", task.id));
        }
        !removed
    });
    changes
}

/// Remove sitreps by ID. Unknown IDs are ignored.
pub fn remove_sitreps(order: &mut Order, ids: &[Id]) -> Changes {
    let mut changes = Changes::new();
    order.sitreps.retain(|sitrep| {
        let removed = ids.contains(&sitrep.id);
        if removed {
            changes.record(format!("sitreps.{} removed", sitrep.id));
        }
        !removed
    });
    changes
}

/// Bump the entity's version once when `changes` is non-empty.
///
/// Returns whether a new version is due.
pub fn stamp<T: Versioned>(entity: &mut T, changes: &Changes, now: Timestamp) -> bool {
    if changes.is_empty() {
        return false;
    }
    entity.meta_mut().bump(now);
    true
}
