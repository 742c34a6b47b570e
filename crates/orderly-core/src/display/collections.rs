//! Collection wrapper types for displaying groups of domain objects.
//!
//! This module provides wrapper types that format collections of domain objects
//! with consistent structure and empty collection handling.

use std::fmt;

use super::datetime::LocalDateTime;
use crate::models::{Order, User, Versioned};

/// Newtype wrapper for displaying a list of orders in compact form.
///
/// # Examples
///
/// ```rust
/// use orderly_core::display::Orders;
///
/// let orders = Orders(vec![]);
/// assert_eq!(orders.to_string(), "No orders found.\n");
/// ```
pub struct Orders(pub Vec<Order>);

impl Orders {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Order> {
        self.0.iter()
    }
}

impl IntoIterator for Orders {
    type Item = Order;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for Orders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No orders found.");
        }
        for order in &self.0 {
            order.fmt_summary(f)?;
        }
        Ok(())
    }
}

/// Newtype wrapper for displaying a list of users in compact form.
pub struct Users(pub Vec<User>);

impl Users {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, User> {
        self.0.iter()
    }
}

impl IntoIterator for Users {
    type Item = User;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for Users {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No users found.");
        }
        for user in &self.0 {
            user.fmt_summary(f)?;
        }
        Ok(())
    }
}

/// Version history of a single entity, oldest first.
pub struct Versions<T>(pub Vec<T>);

impl<T> Versions<T> {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T: Versioned + fmt::Display> fmt::Display for Versions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No versions found.");
        }
        for entity in &self.0 {
            let meta = entity.meta();
            write!(
                f,
                "## Version {} ({})",
                meta.version,
                LocalDateTime(&meta.updated)
            )?;
            if meta.deleted {
                write!(f, " [deleted]")?;
            }
            writeln!(f)?;
            writeln!(f)?;
            // Demote the entity's headings one level under the version heading.
            for line in entity.to_string().lines() {
                if line.starts_with('#') {
                    writeln!(f, "#{line}")?;
                } else {
                    writeln!(f, "{line}")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
