//! Stack status triage.
//!
//! The deployment collaborator owns the CloudFormation API calls; the
//! decisions it acts on live here as pure functions. Status strings map to
//! one of four dispositions, and orphan detection is a set comparison
//! between owners that still have resources and owners that still have
//! deployed stacks.

use serde::{Deserialize, Serialize};

/// What the deployment loop should do with a stack in a given status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StackDisposition {
    /// Terminal success; nothing left to do.
    Complete,
    /// Still moving; poll again.
    InProgress,
    /// Terminal failure needing a human.
    Error,
    /// Unrecoverable without a delete; delete and recreate.
    NeedsDelete,
}

/// Statuses that are done with no further action.
const COMPLETE: &[&str] = &["CREATE_COMPLETE", "UPDATE_COMPLETE", "DELETE_COMPLETE"];

/// Statuses still in flight.
const IN_PROGRESS: &[&str] = &[
    "CREATE_IN_PROGRESS",
    "UPDATE_IN_PROGRESS",
    "ROLLBACK_IN_PROGRESS",
    "DELETE_IN_PROGRESS",
    "UPDATE_COMPLETE_CLEANUP_IN_PROGRESS",
    "UPDATE_ROLLBACK_IN_PROGRESS",
    "REVIEW_IN_PROGRESS",
    "UPDATE_ROLLBACK_COMPLETE_CLEANUP_IN_PROGRESS",
];

/// Statuses that need intervention to recover from.
const ERROR: &[&str] = &[
    "DELETE_FAILED",
    "CREATE_FAILED",
    "ROLLBACK_FAILED",
    "UPDATE_ROLLBACK_FAILED",
    "UPDATE_ROLLBACK_COMPLETE",
];

/// Statuses where only a delete-and-recreate moves forward.
const NEEDS_DELETE: &[&str] = &["ROLLBACK_COMPLETE"];

impl StackDisposition {
    /// Classify a CloudFormation stack status string.
    ///
    /// Statuses outside the known lists classify as [`Self::Error`]:
    /// an unknown state is a state nobody decided how to handle.
    #[must_use]
    pub fn classify(status: &str) -> Self {
        match status {
            s if COMPLETE.contains(&s) => Self::Complete,
            s if IN_PROGRESS.contains(&s) => Self::InProgress,
            s if NEEDS_DELETE.contains(&s) => Self::NeedsDelete,
            s if ERROR.contains(&s) => Self::Error,
            _ => Self::Error,
        }
    }
}

/// A stack currently deployed, as reported by the deployment collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployedStack {
    /// Owner from the stack's owner tag.
    pub owner: String,
    pub stack_name: String,
}

/// Deployed stacks whose owner no longer has any live resource.
///
/// Owner comparison is case-insensitive on both sides. Orphaned stacks
/// will never receive another update, so the caller deletes them.
#[must_use]
pub fn orphaned_stacks<'a>(
    resource_owners: impl IntoIterator<Item = &'a str>,
    stacks: &'a [DeployedStack],
) -> Vec<&'a DeployedStack> {
    let live: std::collections::BTreeSet<String> = resource_owners
        .into_iter()
        .map(str::to_lowercase)
        .collect();

    stacks
        .iter()
        .filter(|stack| !live.contains(&stack.owner.to_lowercase()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_known_status_classifies() {
        for status in COMPLETE {
            assert_eq!(StackDisposition::classify(status), StackDisposition::Complete);
        }
        for status in IN_PROGRESS {
            assert_eq!(
                StackDisposition::classify(status),
                StackDisposition::InProgress
            );
        }
        for status in ERROR {
            assert_eq!(StackDisposition::classify(status), StackDisposition::Error);
        }
        for status in NEEDS_DELETE {
            assert_eq!(
                StackDisposition::classify(status),
                StackDisposition::NeedsDelete
            );
        }
    }

    #[test]
    fn unknown_statuses_are_errors() {
        assert_eq!(
            StackDisposition::classify("IMPORT_IN_PROGRESS_MAYBE"),
            StackDisposition::Error
        );
        assert_eq!(StackDisposition::classify(""), StackDisposition::Error);
    }

    #[test]
    fn rollback_complete_triggers_delete_not_error() {
        assert_eq!(
            StackDisposition::classify("ROLLBACK_COMPLETE"),
            StackDisposition::NeedsDelete
        );
    }

    fn stack(owner: &str, name: &str) -> DeployedStack {
        DeployedStack {
            owner: owner.to_string(),
            stack_name: name.to_string(),
        }
    }

    #[test]
    fn stacks_without_live_owners_are_orphaned() {
        let stacks = vec![
            stack("team-x", "cloudwedge-autogen-team-x-alarms-stack"),
            stack("team-gone", "cloudwedge-autogen-team-gone-alarms-stack"),
        ];

        let orphans = orphaned_stacks(["team-x"], &stacks);

        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].owner, "team-gone");
    }

    #[test]
    fn owner_comparison_ignores_case() {
        let stacks = vec![stack("Team-X", "cloudwedge-autogen-team-x-alarms-stack")];
        assert!(orphaned_stacks(["team-x"], &stacks).is_empty());
        assert!(orphaned_stacks(["TEAM-X"], &stacks).is_empty());
    }

    #[test]
    fn no_live_owners_orphans_everything() {
        let stacks = vec![stack("team-x", "a"), stack("team-y", "b")];
        assert_eq!(orphaned_stacks([], &stacks).len(), 2);
    }
}
