//! User model.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{Email, Id, Meta, Versioned};

/// A person orders are assigned to. Supervisors are referenced by e-mail.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct User {
    pub id: Id,
    pub name: String,
    pub email: Email,
    pub supervisor: Email,
    #[serde(default)]
    pub meta: Meta,
}

impl Versioned for User {
    const KIND: &'static str = "user";

    fn id(&self) -> &Id {
        &self.id
    }

    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }

    fn parent_key(&self) -> Option<String> {
        (!self.supervisor.is_empty()).then(|| self.supervisor.to_string())
    }
}
