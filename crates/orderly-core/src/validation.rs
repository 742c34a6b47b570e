//! Request-shape validation.
//!
//! Every check runs before the repository is touched and names the offending
//! field path in its error, e.g. `order.delegated_tasks.1.id disallowed`.
//! Create requests must not carry IDs and must be complete; patch requests
//! must carry the IDs that select what they patch.

use crate::{
    error::{OrderlyError, Result},
    models::{Email, Id},
    params::{
        ById, DelegatedTasks, Delete, DeleteDelegatedTasks, DeleteSitReps, ListOrders, ListUsers,
        OrderRequest, Present, SitRepRequest, SitReps, Subordinates, TaskRequest, UserRequest,
    },
};

/// Whether a request creates entities or patches existing ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Create,
    Patch,
}

fn check_id_slot(id: &Option<Id>, path: &str, mode: Mode) -> Result<()> {
    match (mode, id.present()) {
        (Mode::Create, Some(_)) => Err(OrderlyError::invalid(format!("{path}.id")).disallowed()),
        (Mode::Create, None) => Ok(()),
        (Mode::Patch, Some(id)) => id.validate(&format!("{path}.id")),
        (Mode::Patch, None) => Err(OrderlyError::invalid(format!("{path}.id")).required()),
    }
}

fn check_email(email: &Option<Email>, field: &str, required: bool) -> Result<()> {
    match email.present() {
        Some(email) => email.validate(field),
        None if required => Err(OrderlyError::invalid(field).required()),
        None => Ok(()),
    }
}

fn check_text(text: &Option<String>, field: &str, required: bool) -> Result<()> {
    match text.present() {
        Some(text) if text.trim().is_empty() => {
            Err(OrderlyError::invalid(field).with_reason("must not be blank"))
        }
        Some(_) => Ok(()),
        None if required => Err(OrderlyError::invalid(field).required()),
        None => Ok(()),
    }
}

impl TaskRequest {
    /// Validate a task found at `path` within a request.
    ///
    /// # Errors
    ///
    /// Returns `OrderlyError::InvalidArgument` naming the first bad field.
    pub fn validate_at(&self, path: &str, mode: Mode) -> Result<()> {
        let complete = mode == Mode::Create;
        check_id_slot(&self.id, path, mode)?;
        check_email(&self.accountable, &format!("{path}.accountable"), complete)?;
        check_text(&self.objective, &format!("{path}.objective"), complete)?;
        if complete && self.deadline.is_none() {
            return Err(OrderlyError::invalid(format!("{path}.deadline")).required());
        }
        Ok(())
    }
}

impl SitRepRequest {
    /// Validate a sitrep found at `path` within a request.
    ///
    /// # Errors
    ///
    /// Returns `OrderlyError::InvalidArgument` naming the first bad field.
    pub fn validate_at(&self, path: &str, mode: Mode) -> Result<()> {
        let complete = mode == Mode::Create;
        check_id_slot(&self.id, path, mode)?;
        if complete && self.datetime.is_none() {
            return Err(OrderlyError::invalid(format!("{path}.datetime")).required());
        }
        check_email(&self.by, &format!("{path}.by"), complete)?;
        if let Some(ping) = self.ping.present() {
            for (i, email) in ping.iter().enumerate() {
                email.validate(&format!("{path}.ping.{i}"))?;
            }
        }
        check_text(&self.situation, &format!("{path}.situation"), false)?;
        check_text(&self.actions, &format!("{path}.actions"), false)?;
        check_text(&self.tbd, &format!("{path}.tbd"), false)?;
        check_text(&self.issues, &format!("{path}.issues"), false)?;
        if complete && !self.has_content() {
            return Err(OrderlyError::invalid(path).with_reason("empty sitrep"));
        }
        Ok(())
    }
}

impl OrderRequest {
    /// Validate a create-order request.
    ///
    /// # Errors
    ///
    /// Returns `OrderlyError::InvalidArgument` when any ID is supplied, the
    /// primary task is missing or incomplete, or a nested item is invalid.
    pub fn validate_create(&self) -> Result<()> {
        self.validate(Mode::Create)
    }

    /// Validate a patch-order request.
    ///
    /// # Errors
    ///
    /// Returns `OrderlyError::InvalidArgument` when `order.task.id` or a
    /// nested item ID is missing or malformed, or a present field is invalid.
    pub fn validate_patch(&self) -> Result<()> {
        self.validate(Mode::Patch)
    }

    fn validate(&self, mode: Mode) -> Result<()> {
        let Some(task) = &self.task else {
            return Err(OrderlyError::invalid("order.task").required());
        };
        task.validate_at("order.task", mode)?;

        if let Some(parent) = self.parent_order_id.present() {
            parent.validate("order.parent_order_id")?;
        }
        if let Some(tasks) = &self.delegated_tasks {
            for (i, task) in tasks.iter().enumerate() {
                task.validate_at(&format!("order.delegated_tasks.{i}"), mode)?;
            }
        }
        if let Some(sitreps) = &self.sitreps {
            for (i, sitrep) in sitreps.iter().enumerate() {
                sitrep.validate_at(&format!("order.sitreps.{i}"), mode)?;
            }
        }
        Ok(())
    }
}

impl DelegatedTasks {
    /// Validate a delegated-task PUT (`Mode::Create`) or PATCH.
    ///
    /// # Errors
    ///
    /// Returns `OrderlyError::InvalidArgument` for a bad order ID, an empty
    /// task list, or an invalid task.
    pub fn validate(&self, mode: Mode) -> Result<()> {
        self.order_id.validate("order_id")?;
        if self.tasks.is_empty() {
            return Err(OrderlyError::invalid("tasks").with_reason("empty"));
        }
        for (i, task) in self.tasks.iter().enumerate() {
            task.validate_at(&format!("tasks.{i}"), mode)?;
        }
        Ok(())
    }
}

impl SitReps {
    /// Validate a sitrep PUT (`Mode::Create`) or PATCH.
    ///
    /// # Errors
    ///
    /// Returns `OrderlyError::InvalidArgument` for a bad order ID, an empty
    /// sitrep list, or an invalid sitrep.
    pub fn validate(&self, mode: Mode) -> Result<()> {
        self.order_id.validate("order_id")?;
        if self.sitreps.is_empty() {
            return Err(OrderlyError::invalid("sitreps").with_reason("empty"));
        }
        for (i, sitrep) in self.sitreps.iter().enumerate() {
            sitrep.validate_at(&format!("sitreps.{i}"), mode)?;
        }
        Ok(())
    }
}

fn check_id_list(order_id: &Id, ids: &[Id], field: &str) -> Result<()> {
    order_id.validate("order_id")?;
    if ids.is_empty() {
        return Err(OrderlyError::invalid(field).with_reason("empty"));
    }
    for (i, id) in ids.iter().enumerate() {
        id.validate(&format!("{field}.{i}"))?;
    }
    Ok(())
}

impl DeleteDelegatedTasks {
    /// # Errors
    ///
    /// Returns `OrderlyError::InvalidArgument` for a bad order ID or an
    /// empty or malformed ID list.
    pub fn validate(&self) -> Result<()> {
        check_id_list(&self.order_id, &self.delegated_task_ids, "delegated_task_ids")
    }
}

impl DeleteSitReps {
    /// # Errors
    ///
    /// Returns `OrderlyError::InvalidArgument` for a bad order ID or an
    /// empty or malformed ID list.
    pub fn validate(&self) -> Result<()> {
        check_id_list(&self.order_id, &self.sitrep_ids, "sitrep_ids")
    }
}

impl UserRequest {
    /// Validate a create-user request.
    ///
    /// # Errors
    ///
    /// Returns `OrderlyError::InvalidArgument` when an ID is supplied or
    /// name, email or supervisor is missing or invalid.
    pub fn validate_create(&self) -> Result<()> {
        self.validate(Mode::Create)
    }

    /// Validate a patch-user request.
    ///
    /// # Errors
    ///
    /// Returns `OrderlyError::InvalidArgument` when `user.id` is missing or
    /// malformed, or a present field is invalid.
    pub fn validate_patch(&self) -> Result<()> {
        self.validate(Mode::Patch)
    }

    fn validate(&self, mode: Mode) -> Result<()> {
        let complete = mode == Mode::Create;
        check_id_slot(&self.id, "user", mode)?;
        check_text(&self.name, "user.name", complete)?;
        check_email(&self.email, "user.email", complete)?;
        check_email(&self.supervisor, "user.supervisor", complete)?;
        Ok(())
    }
}

impl ById {
    /// # Errors
    ///
    /// Returns `OrderlyError::InvalidArgument` for a malformed ID.
    pub fn validate(&self) -> Result<()> {
        self.id.validate("id")
    }
}

impl Delete {
    /// # Errors
    ///
    /// Returns `OrderlyError::InvalidArgument` for a malformed ID.
    pub fn validate(&self) -> Result<()> {
        self.id.validate("id")
    }
}

impl Subordinates {
    /// # Errors
    ///
    /// Returns `OrderlyError::InvalidArgument` for a malformed ID.
    pub fn validate(&self) -> Result<()> {
        self.id.validate("id")
    }
}

impl ListOrders {
    /// # Errors
    ///
    /// Returns `OrderlyError::InvalidArgument` for a malformed filter value.
    pub fn validate(&self) -> Result<()> {
        if let Some(parent) = self.parent_order_id.present() {
            parent.validate("parent_order_id")?;
        }
        check_email(&self.accountable, "accountable", false)
    }
}

impl ListUsers {
    /// # Errors
    ///
    /// Returns `OrderlyError::InvalidArgument` for a malformed filter value.
    pub fn validate(&self) -> Result<()> {
        for (i, email) in self.emails.iter().enumerate() {
            email.validate(&format!("emails.{i}"))?;
        }
        check_email(&self.supervisor, "supervisor", false)
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;
    use crate::models::TaskState;

    fn complete_task() -> TaskRequest {
        TaskRequest {
            state: Some(TaskState::NotStarted),
            accountable: Some("lead@unit.org".into()),
            objective: Some("secure the bridge".to_string()),
            deadline: Some(Timestamp::from_second(1_900_000_000).unwrap()),
            ..Default::default()
        }
    }

    fn complete_sitrep() -> SitRepRequest {
        SitRepRequest {
            datetime: Some(Timestamp::from_second(1_800_000_000).unwrap()),
            by: Some("lead@unit.org".into()),
            situation: Some("bridge held".to_string()),
            ..Default::default()
        }
    }

    fn expect_invalid(result: Result<()>, expected: &str) {
        match result {
            Err(err @ OrderlyError::InvalidArgument { .. }) => {
                assert_eq!(err.to_string(), expected);
            }
            other => panic!("Expected InvalidArgument error, got {other:?}"),
        }
    }

    #[test]
    fn test_create_order_accepts_complete_request() {
        let request = OrderRequest {
            task: Some(complete_task()),
            delegated_tasks: Some(vec![complete_task()]),
            sitreps: Some(vec![complete_sitrep()]),
            ..Default::default()
        };
        assert!(request.validate_create().is_ok());
    }

    #[test]
    fn test_create_order_rejects_ids() {
        let mut request = OrderRequest {
            task: Some(TaskRequest {
                id: Some(Id::new()),
                ..complete_task()
            }),
            ..Default::default()
        };
        expect_invalid(request.validate_create(), "order.task.id disallowed");

        request.task = Some(complete_task());
        request.delegated_tasks = Some(vec![
            complete_task(),
            TaskRequest {
                id: Some(Id::new()),
                ..complete_task()
            },
        ]);
        expect_invalid(
            request.validate_create(),
            "order.delegated_tasks.1.id disallowed",
        );

        request.delegated_tasks = None;
        request.sitreps = Some(vec![SitRepRequest {
            id: Some(Id::new()),
            ..complete_sitrep()
        }]);
        expect_invalid(request.validate_create(), "order.sitreps.0.id disallowed");
    }

    #[test]
    fn test_create_order_requires_task_fields() {
        let request = OrderRequest {
            task: Some(TaskRequest {
                objective: Some(String::new()),
                ..complete_task()
            }),
            ..Default::default()
        };
        expect_invalid(request.validate_create(), "order.task.objective required");

        let request = OrderRequest::default();
        expect_invalid(request.validate_create(), "order.task required");
    }

    #[test]
    fn test_create_order_rejects_bad_accountable() {
        let request = OrderRequest {
            task: Some(TaskRequest {
                accountable: Some("not-an-email".into()),
                ..complete_task()
            }),
            ..Default::default()
        };
        expect_invalid(
            request.validate_create(),
            "order.task.accountable invalid email",
        );
    }

    #[test]
    fn test_create_sitrep_requires_content() {
        let request = OrderRequest {
            task: Some(complete_task()),
            sitreps: Some(vec![SitRepRequest {
                situation: None,
                ..complete_sitrep()
            }]),
            ..Default::default()
        };
        expect_invalid(request.validate_create(), "order.sitreps.0 empty sitrep");
    }

    #[test]
    fn test_sitrep_content_must_not_be_blank() {
        let request = OrderRequest {
            task: Some(complete_task()),
            sitreps: Some(vec![SitRepRequest {
                situation: Some("   ".to_string()),
                ..complete_sitrep()
            }]),
            ..Default::default()
        };
        expect_invalid(
            request.validate_create(),
            "order.sitreps.0.situation must not be blank",
        );

        let patch = SitReps {
            order_id: Id::new(),
            sitreps: vec![SitRepRequest {
                id: Some(Id::new()),
                issues: Some("\t".to_string()),
                ..Default::default()
            }],
        };
        expect_invalid(patch.validate(Mode::Patch), "sitreps.0.issues must not be blank");
    }

    #[test]
    fn test_patch_order_requires_ids() {
        let request = OrderRequest {
            task: Some(TaskRequest::default()),
            ..Default::default()
        };
        expect_invalid(request.validate_patch(), "order.task.id required");

        let request = OrderRequest {
            task: Some(TaskRequest {
                id: Some(Id::new()),
                ..Default::default()
            }),
            delegated_tasks: Some(vec![TaskRequest {
                objective: Some("x".to_string()),
                ..Default::default()
            }]),
            ..Default::default()
        };
        expect_invalid(
            request.validate_patch(),
            "order.delegated_tasks.0.id required",
        );
    }

    #[test]
    fn test_patch_order_accepts_sparse_request() {
        let request = OrderRequest {
            task: Some(TaskRequest {
                id: Some(Id::new()),
                objective: Some("new objective".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(request.validate_patch().is_ok());
    }

    #[test]
    fn test_patch_order_rejects_bad_id() {
        let request = OrderRequest {
            task: Some(TaskRequest {
                id: Some(Id::from("abc")),
                ..Default::default()
            }),
            ..Default::default()
        };
        expect_invalid(request.validate_patch(), "order.task.id invalid id length");
    }

    #[test]
    fn test_sub_collection_lists_must_not_be_empty() {
        let put = DelegatedTasks {
            order_id: Id::new(),
            tasks: vec![],
        };
        expect_invalid(put.validate(Mode::Create), "tasks empty");

        let put = SitReps {
            order_id: Id::new(),
            sitreps: vec![],
        };
        expect_invalid(put.validate(Mode::Patch), "sitreps empty");

        let delete = DeleteSitReps {
            order_id: Id::new(),
            sitrep_ids: vec![],
        };
        expect_invalid(delete.validate(), "sitrep_ids empty");
    }

    #[test]
    fn test_delete_ids_must_be_valid() {
        let delete = DeleteDelegatedTasks {
            order_id: Id::new(),
            delegated_task_ids: vec![Id::new(), Id::from("bad")],
        };
        expect_invalid(delete.validate(), "delegated_task_ids.1 invalid id length");
    }

    #[test]
    fn test_user_validation() {
        let request = UserRequest {
            name: Some("Ann".to_string()),
            email: Some("ann@unit.org".into()),
            supervisor: Some("root@root.com".into()),
            ..Default::default()
        };
        assert!(request.validate_create().is_ok());

        let with_id = UserRequest {
            id: Some(Id::new()),
            ..request.clone()
        };
        expect_invalid(with_id.validate_create(), "user.id disallowed");

        let no_name = UserRequest {
            name: None,
            ..request.clone()
        };
        expect_invalid(no_name.validate_create(), "user.name required");

        expect_invalid(request.validate_patch(), "user.id required");
    }

    #[test]
    fn test_list_filters_validated() {
        let list = ListUsers {
            emails: vec!["ok@unit.org".into(), "broken".into()],
            supervisor: None,
        };
        expect_invalid(list.validate(), "emails.1 invalid email");

        let list = ListOrders {
            parent_order_id: Some(Id::from("short")),
            accountable: None,
        };
        expect_invalid(list.validate(), "parent_order_id invalid id length");
    }
}
