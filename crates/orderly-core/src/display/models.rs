//! Display implementations for domain models.
//!
//! All output is markdown so the CLI renderer and MCP clients can present it
//! richly. Standalone displays show every field; the `fmt_summary` helpers
//! give the compact form used in lists.

use std::fmt;

use super::datetime::{LocalDate, LocalDateTime};
use crate::models::{Meta, Order, SitRep, Task, User};

impl Meta {
    fn fmt_meta(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "- Version: {}", self.version)?;
        writeln!(f, "- Created: {}", LocalDateTime(&self.created))?;
        writeln!(f, "- Updated: {}", LocalDateTime(&self.updated))?;
        if self.deleted {
            writeln!(f, "- Deleted: yes")?;
        }
        Ok(())
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "### {} ({})", self.objective, self.state.with_icon())?;
        writeln!(f)?;
        writeln!(f, "- ID: {}", self.id)?;
        writeln!(f, "- Accountable: {}", self.accountable)?;
        writeln!(f, "- Deadline: {}", LocalDate(&self.deadline))?;
        writeln!(f)
    }
}

impl fmt::Display for SitRep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "### {} by {}", LocalDateTime(&self.datetime), self.by)?;
        writeln!(f)?;
        writeln!(f, "- ID: {}", self.id)?;
        if !self.ping.is_empty() {
            let ping: Vec<&str> = self.ping.iter().map(|e| e.as_str()).collect();
            writeln!(f, "- Ping: {}", ping.join(", "))?;
        }
        writeln!(f)?;

        for (title, body) in [
            ("Situation", &self.situation),
            ("Actions", &self.actions),
            ("TBD", &self.tbd),
            ("Issues", &self.issues),
        ] {
            if !body.is_empty() {
                writeln!(f, "#### {title}")?;
                writeln!(f)?;
                writeln!(f, "{body}")?;
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

impl Order {
    /// Compact form for lists.
    pub(crate) fn fmt_summary(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## {} (ID: {})", self.task.objective, self.id())?;
        writeln!(f)?;
        writeln!(f, "- **State**: {}", self.task.state.with_icon())?;
        writeln!(f, "- **Accountable**: {}", self.task.accountable)?;
        writeln!(f, "- **Deadline**: {}", LocalDate(&self.task.deadline))?;
        writeln!(
            f,
            "- **Contents**: {} delegated task(s), {} sitrep(s)",
            self.delegated_tasks.len(),
            self.sitreps.len()
        )?;
        writeln!(f, "- **Version**: {}", self.meta.version)?;
        writeln!(f)
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {} (ID: {})", self.task.objective, self.id())?;
        writeln!(f)?;

        writeln!(f, "- State: {}", self.task.state.with_icon())?;
        writeln!(f, "- Accountable: {}", self.task.accountable)?;
        writeln!(f, "- Deadline: {}", LocalDate(&self.task.deadline))?;
        match &self.parent_order_id {
            Some(parent) if parent == self.id() => writeln!(f, "- Parent: (root)")?,
            Some(parent) => writeln!(f, "- Parent: {parent}")?,
            None => {}
        }
        self.meta.fmt_meta(f)?;

        if self.delegated_tasks.is_empty() {
            writeln!(f, "\nNo delegated tasks.")?;
        } else {
            writeln!(f, "\n## Delegated Tasks")?;
            writeln!(f)?;
            for task in &self.delegated_tasks {
                write!(f, "{task}")?;
            }
        }

        if self.sitreps.is_empty() {
            writeln!(f, "\nNo sitreps.")?;
        } else {
            writeln!(f, "\n## Sitreps")?;
            writeln!(f)?;
            for sitrep in &self.sitreps {
                write!(f, "{sitrep}")?;
            }
        }
        Ok(())
    }
}

impl User {
    /// Compact form for lists.
    pub(crate) fn fmt_summary(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## {} (ID: {})", self.name, self.id)?;
        writeln!(f)?;
        writeln!(f, "- **Email**: {}", self.email)?;
        writeln!(f, "- **Supervisor**: {}", self.supervisor)?;
        writeln!(f)
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {} (ID: {})", self.name, self.id)?;
        writeln!(f)?;
        writeln!(f, "- Email: {}", self.email)?;
        writeln!(f, "- Supervisor: {}", self.supervisor)?;
        self.meta.fmt_meta(f)
    }
}
