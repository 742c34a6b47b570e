//! Task state enumeration.

use std::{fmt, str::FromStr};

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{de, Deserialize, Deserializer, Serialize};

/// Type-safe enumeration of task states.
///
/// Serialized as the variant name. Deserialization also accepts the ordinal
/// `0..=4`, which older clients send.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub enum TaskState {
    #[default]
    NotStarted,
    InProgress,
    HavingIssues,
    Blocked,
    Completed,
}

impl TaskState {
    pub const ALL: [TaskState; 5] = [
        TaskState::NotStarted,
        TaskState::InProgress,
        TaskState::HavingIssues,
        TaskState::Blocked,
        TaskState::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::NotStarted => "NotStarted",
            TaskState::InProgress => "InProgress",
            TaskState::HavingIssues => "HavingIssues",
            TaskState::Blocked => "Blocked",
            TaskState::Completed => "Completed",
        }
    }

    /// Get state with consistent icon formatting for display.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use orderly_core::models::TaskState;
    ///
    /// assert_eq!(TaskState::Completed.with_icon(), "✓ Completed");
    /// assert_eq!(TaskState::Blocked.with_icon(), "✗ Blocked");
    /// ```
    pub fn with_icon(&self) -> &'static str {
        match self {
            TaskState::NotStarted => "○ Not Started",
            TaskState::InProgress => "➤ In Progress",
            TaskState::HavingIssues => "⚠ Having Issues",
            TaskState::Blocked => "✗ Blocked",
            TaskState::Completed => "✓ Completed",
        }
    }
}

impl FromStr for TaskState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['_', '-', ' '], "").as_str() {
            "notstarted" => Ok(TaskState::NotStarted),
            "inprogress" => Ok(TaskState::InProgress),
            "havingissues" => Ok(TaskState::HavingIssues),
            "blocked" => Ok(TaskState::Blocked),
            "completed" | "done" => Ok(TaskState::Completed),
            _ => Err(format!("invalid task state: {s}")),
        }
    }
}

impl TryFrom<i64> for TaskState {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        usize::try_from(value)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or_else(|| format!("invalid task state: {value}"))
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TaskState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Ordinal(i64),
            Name(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Ordinal(n) => TaskState::try_from(n).map_err(de::Error::custom),
            Raw::Name(name) => name.parse().map_err(de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_from_name_and_ordinal() {
        let by_name: TaskState = serde_json::from_str("\"HavingIssues\"").unwrap();
        let by_ordinal: TaskState = serde_json::from_str("2").unwrap();
        assert_eq!(by_name, TaskState::HavingIssues);
        assert_eq!(by_ordinal, TaskState::HavingIssues);
    }

    #[test]
    fn test_out_of_range_ordinal_rejected() {
        assert!(serde_json::from_str::<TaskState>("5").is_err());
        assert!(serde_json::from_str::<TaskState>("-1").is_err());
    }

    #[test]
    fn test_serializes_as_name() {
        assert_eq!(
            serde_json::to_string(&TaskState::InProgress).unwrap(),
            "\"InProgress\""
        );
    }

    #[test]
    fn test_from_str_is_lenient() {
        assert_eq!("in_progress".parse::<TaskState>(), Ok(TaskState::InProgress));
        assert_eq!("Not Started".parse::<TaskState>(), Ok(TaskState::NotStarted));
        assert!("sleeping".parse::<TaskState>().is_err());
    }
}
