//! In-memory versioned store.

use std::{
    collections::{BTreeSet, HashMap},
    sync::RwLock,
};

use log::debug;

use super::{Expect, Repository};
use crate::{
    error::{LockResultExt, OrderlyError, Result},
    models::{Id, Versioned},
};

struct Inner<T> {
    histories: HashMap<Id, Vec<T>>,
    /// parent key -> IDs whose latest version hangs under it
    children: HashMap<String, BTreeSet<Id>>,
}

impl<T> Default for Inner<T> {
    fn default() -> Self {
        Self {
            histories: HashMap::new(),
            children: HashMap::new(),
        }
    }
}

impl<T: Versioned> Inner<T> {
    fn latest(&self, id: &Id) -> Option<&T> {
        self.histories.get(id).and_then(|h| h.last())
    }

    fn unindex(&mut self, id: &Id) {
        let Some(key) = self.latest(id).and_then(Versioned::parent_key) else {
            return;
        };
        if let Some(ids) = self.children.get_mut(&key) {
            ids.remove(id);
            if ids.is_empty() {
                self.children.remove(&key);
            }
        }
    }

    fn index(&mut self, entity: &T) {
        if let Some(key) = entity.parent_key() {
            self.children
                .entry(key)
                .or_default()
                .insert(entity.id().clone());
        }
    }
}

/// Thread-safe in-memory [`Repository`] keeping every version of every key.
pub struct MemoryStore<T> {
    inner: RwLock<Inner<T>>,
}

impl<T> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn live<T: Versioned>(entity: &T) -> bool {
    !entity.meta().deleted
}

fn by_creation<T: Versioned>(items: &mut [T]) {
    items.sort_by(|a, b| {
        a.meta()
            .created
            .cmp(&b.meta().created)
            .then_with(|| a.id().cmp(b.id()))
    });
}

impl<T: Versioned> Repository<T> for MemoryStore<T> {
    fn read_by_id(&self, id: &Id) -> Result<T> {
        let inner = self.inner.read().or_poisoned(T::KIND)?;
        inner
            .latest(id)
            .filter(|e| live(*e))
            .cloned()
            .ok_or_else(|| OrderlyError::not_found(T::KIND, id.as_str()))
    }

    fn read_versions(&self, id: &Id) -> Result<Vec<T>> {
        let inner = self.inner.read().or_poisoned(T::KIND)?;
        inner
            .histories
            .get(id)
            .filter(|h| !h.is_empty())
            .cloned()
            .ok_or_else(|| OrderlyError::not_found(T::KIND, id.as_str()))
    }

    fn read_all(&self) -> Result<Vec<T>> {
        let inner = self.inner.read().or_poisoned(T::KIND)?;
        let mut all: Vec<T> = inner
            .histories
            .values()
            .filter_map(|h| h.last())
            .filter(|e| live(*e))
            .cloned()
            .collect();
        by_creation(&mut all);
        Ok(all)
    }

    fn read_children(&self, parent_key: &str) -> Result<Vec<T>> {
        let inner = self.inner.read().or_poisoned(T::KIND)?;
        let mut children: Vec<T> = inner
            .children
            .get(parent_key)
            .into_iter()
            .flatten()
            .filter_map(|id| inner.latest(id))
            .filter(|e| live(*e))
            .cloned()
            .collect();
        by_creation(&mut children);
        Ok(children)
    }

    fn write(&self, entity: T, expect: Expect) -> Result<T> {
        let mut inner = self.inner.write().or_poisoned(T::KIND)?;
        let id = entity.id().clone();
        let current = inner.latest(&id).map(|e| e.meta().version);

        match (expect, current) {
            (Expect::Absent, Some(_)) => {
                return Err(OrderlyError::conflict(T::KIND, id.as_str(), "already exists"));
            }
            (Expect::Version(_), None) => {
                return Err(OrderlyError::not_found(T::KIND, id.as_str()));
            }
            (Expect::Version(expected), Some(actual)) if expected != actual => {
                return Err(OrderlyError::conflict(
                    T::KIND,
                    id.as_str(),
                    format!("expected version {expected}, found {actual}"),
                ));
            }
            _ => {}
        }

        debug!(
            "{} {} -> version {}",
            T::KIND,
            id,
            entity.meta().version
        );
        inner.unindex(&id);
        inner.index(&entity);
        inner
            .histories
            .entry(id)
            .or_default()
            .push(entity.clone());
        Ok(entity)
    }

    fn delete(&self, id: &Id) -> Result<T> {
        let mut inner = self.inner.write().or_poisoned(T::KIND)?;
        inner.unindex(id);
        inner
            .histories
            .remove(id)
            .and_then(|mut h| h.pop())
            .ok_or_else(|| OrderlyError::not_found(T::KIND, id.as_str()))
    }

    fn export(&self) -> Result<Vec<Vec<T>>> {
        let inner = self.inner.read().or_poisoned(T::KIND)?;
        let mut histories: Vec<Vec<T>> = inner.histories.values().cloned().collect();
        histories.sort_by(|a, b| {
            let key = |h: &Vec<T>| h.first().map(|e| (e.meta().created, e.id().clone()));
            key(a).cmp(&key(b))
        });
        Ok(histories)
    }

    fn import(&self, histories: Vec<Vec<T>>) -> Result<()> {
        let mut fresh = Inner::default();
        for history in histories {
            let Some(last) = history.last() else {
                return Err(OrderlyError::internal(format!(
                    "empty {} history in snapshot",
                    T::KIND
                )));
            };
            let id = last.id().clone();
            if history.iter().any(|e| e.id() != &id) {
                return Err(OrderlyError::internal(format!(
                    "{} history {id} mixes identifiers",
                    T::KIND
                )));
            }
            fresh.index(last);
            fresh.histories.insert(id, history);
        }

        let mut inner = self.inner.write().or_poisoned(T::KIND)?;
        *inner = fresh;
        Ok(())
    }
}
