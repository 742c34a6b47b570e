//! User operations for the Service.

use std::collections::{HashSet, VecDeque};

use jiff::Timestamp;
use log::{info, warn};

use super::{DeleteMode, Service};
use crate::{
    display::{DeleteResult, UpdateResult},
    error::{OrderlyError, Result},
    merge,
    models::{Email, Id, Meta, User, Versioned},
    params::{ById, Delete, ListUsers, Present, Subordinates, UserRequest},
    store::Expect,
    trace::Trace,
};

/// Writes tried per subordinate before it is left for a later fix-up.
const REASSIGN_ATTEMPTS: usize = 3;

impl Service {
    /// Creates a new user at version 1.
    ///
    /// # Errors
    ///
    /// Returns `OrderlyError::InvalidArgument` if the request carries an ID
    /// or lacks name, email or supervisor.
    pub fn create_user(&self, params: &UserRequest) -> Result<User> {
        self.traced("create_user", |trace| {
            {
                let _span = trace.span("validate");
                params.validate_create()?;
            }
            let user = params.to_user(Id::new(), Meta::new(Timestamp::now()));

            let _span = trace.span("write");
            let user = self.users.write(user, Expect::Absent)?;
            info!("created user {} <{}>", user.id, user.email);
            Ok(user)
        })
    }

    /// Retrieves the latest live version of a user.
    ///
    /// # Errors
    ///
    /// Returns `OrderlyError::NotFound` for unknown or soft-deleted users.
    pub fn get_user(&self, params: &ById) -> Result<User> {
        self.traced("get_user", |trace| {
            params.validate()?;
            let _span = trace.span("read");
            self.users.read_by_id(&params.id)
        })
    }

    /// Lists live users, optionally filtered by e-mail set and supervisor.
    ///
    /// # Errors
    ///
    /// Returns `OrderlyError::InvalidArgument` for malformed filter values.
    pub fn list_users(&self, params: &ListUsers) -> Result<Vec<User>> {
        self.traced("list_users", |trace| {
            params.validate()?;
            let _span = trace.span("read");
            let users = match params.supervisor.present() {
                Some(supervisor) => self.users.read_children(supervisor.as_str())?,
                None => self.users.read_all()?,
            };

            if params.emails.is_empty() {
                return Ok(users);
            }
            let wanted: HashSet<&Email> = params.emails.iter().collect();
            Ok(users
                .into_iter()
                .filter(|u| wanted.contains(&u.email))
                .collect())
        })
    }

    /// Returns every stored version of a user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderlyError::NotFound` when the user never existed or was
    /// hard-deleted.
    pub fn user_versions(&self, params: &ById) -> Result<Vec<User>> {
        self.traced("user_versions", |trace| {
            params.validate()?;
            let _span = trace.span("read");
            self.users.read_versions(&params.id)
        })
    }

    /// Returns the users reporting to the given user.
    ///
    /// With `transitive` set the whole reporting tree is walked breadth-first;
    /// each user appears once even if the supervisor relation has a cycle.
    ///
    /// # Errors
    ///
    /// Returns `OrderlyError::NotFound` for unknown users.
    pub fn user_subordinates(&self, params: &Subordinates) -> Result<Vec<User>> {
        self.traced("user_subordinates", |trace| {
            params.validate()?;
            let _span = trace.span("read");
            let root = self.users.read_by_id(&params.id)?;

            let mut visited: HashSet<Id> = HashSet::from([root.id.clone()]);
            let mut queue = VecDeque::from([root.email]);
            let mut found = Vec::new();
            while let Some(email) = queue.pop_front() {
                for user in self.users.read_children(email.as_str())? {
                    if !visited.insert(user.id.clone()) {
                        continue;
                    }
                    if params.transitive {
                        queue.push_back(user.email.clone());
                    }
                    found.push(user);
                }
            }
            Ok(found)
        })
    }

    /// Patches a user. Changing the e-mail re-points direct subordinates to
    /// the new address; subordinates that cannot be moved are listed in the
    /// changes instead of failing the patch.
    ///
    /// # Errors
    ///
    /// Returns `OrderlyError::InvalidArgument` for malformed requests,
    /// `OrderlyError::NotFound` for unknown users and
    /// `OrderlyError::Conflict` when another writer updated the user first.
    pub fn patch_user(&self, params: &UserRequest) -> Result<UpdateResult<User>> {
        self.traced("patch_user", |trace| {
            {
                let _span = trace.span("validate");
                params.validate_patch()?;
            }
            let id = params
                .id
                .present()
                .ok_or_else(|| OrderlyError::invalid("user.id").required())?;
            let current = {
                let _span = trace.span("read");
                self.users.read_by_id(id)?
            };

            let mut next = current.clone();
            let changes = merge::merge_user(&mut next, params);
            if !merge::stamp(&mut next, &changes, Timestamp::now()) {
                return Ok(UpdateResult::new(current));
            }

            let written = {
                let _span = trace.span("write");
                self.users
                    .write(next, self.policy.expect(current.meta.version))?
            };
            let mut changes = changes.into_vec();
            if written.email != current.email {
                let outcome =
                    self.reassign_subordinates(trace, &current.email, &written.email, &written.id);
                changes.extend(outcome.notes(&written.email));
            }
            Ok(UpdateResult::with_changes(written, changes))
        })
    }

    /// Deletes a user and hands their direct subordinates to the deleted
    /// user's supervisor. Subordinates that cannot be moved are named in the
    /// result notes.
    ///
    /// # Errors
    ///
    /// Returns `OrderlyError::NotFound` when there is nothing to delete.
    pub fn delete_user(&self, params: &Delete) -> Result<DeleteResult<User>> {
        self.traced("delete_user", |trace| {
            params.validate()?;
            let mode = DeleteMode::from(params.hard);
            let last = self.remove(trace, self.users.as_ref(), &params.id, mode)?;

            let outcome = self.reassign_subordinates(trace, &last.email, &last.supervisor, &last.id);
            let notes = outcome.notes(&last.supervisor);
            Ok(notes
                .into_iter()
                .fold(DeleteResult::new(last, mode), |result, note| result.with_note(note)))
        })
    }

    /// Re-point every live user supervised by `from` to `to`, skipping
    /// `except` and the user whose own address is `to`.
    ///
    /// Runs after the user change has been committed, so failures are
    /// reported in the outcome instead of failing the operation.
    fn reassign_subordinates(
        &self,
        trace: &Trace,
        from: &Email,
        to: &Email,
        except: &Id,
    ) -> Reassignment {
        let _span = trace.span("reassign");
        let mut outcome = Reassignment::default();
        let subordinates = match self.users.read_children(from.as_str()) {
            Ok(users) => users,
            Err(e) => {
                warn!("could not read subordinates of {from}: {e}");
                outcome
                    .skipped
                    .push(format!("subordinates of {from} not reassigned: {e}"));
                return outcome;
            }
        };

        for user in subordinates {
            if &user.id == except || &user.supervisor == to || &user.email == to {
                continue;
            }
            let id = user.id.clone();
            match self.repoint(user, from, to) {
                Ok(true) => outcome.moved += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!("user {id} still reports to {from}: {e}");
                    outcome.skipped.push(format!("user {id} not reassigned: {e}"));
                }
            }
        }
        if outcome.moved > 0 {
            info!("moved {} user(s) from {from} to {to}", outcome.moved);
        }
        outcome
    }

    /// Move one user from `from` to `to`, re-reading on version conflicts.
    /// Returns false when the user no longer reports to `from`.
    fn repoint(&self, mut user: User, from: &Email, to: &Email) -> Result<bool> {
        let id = user.id.clone();
        for _ in 0..REASSIGN_ATTEMPTS {
            let read = user.meta.version;
            user.supervisor = to.clone();
            user.meta.bump(Timestamp::now());
            match self.users.write(user, self.policy.expect(read)) {
                Ok(_) => return Ok(true),
                Err(OrderlyError::Conflict { .. }) => {}
                Err(e) => return Err(e),
            }

            user = match self.users.read_by_id(&id) {
                Ok(fresh) => fresh,
                Err(OrderlyError::NotFound { .. }) => return Ok(false),
                Err(e) => return Err(e),
            };
            if &user.supervisor != from {
                return Ok(false);
            }
        }
        Err(OrderlyError::conflict(
            User::KIND,
            id.as_str(),
            format!("still contended after {REASSIGN_ATTEMPTS} attempts"),
        ))
    }
}

/// Result of moving subordinates after a user was renamed or deleted.
#[derive(Debug, Default)]
struct Reassignment {
    moved: usize,
    skipped: Vec<String>,
}

impl Reassignment {
    fn notes(&self, to: &Email) -> Vec<String> {
        let mut notes = Vec::new();
        if self.moved > 0 {
            notes.push(format!("{} subordinate(s) now report to {to}", self.moved));
        }
        notes.extend(self.skipped.iter().cloned());
        notes
    }
}
