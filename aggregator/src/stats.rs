use serde::{Deserialize, Serialize};

/// Consolidated infrastructure snapshot computed by the control-plane
/// backend. Counts are unsigned, so negative values in a payload are
/// rejected while decoding, before `validate` ever runs.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct DashboardStats {
    pub nodes: NodeStats,
    pub users: UserStats,
    pub tasks: TaskStats,
    pub inbounds: InboundStats,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct NodeStats {
    pub total: u64,
    pub online: u64,
    pub offline: u64,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct UserStats {
    pub total: u64,
    pub active: u64,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct TaskStats {
    pub total: u64,
    pub running: u64,
    pub completed: u64,
    pub failed: u64,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct InboundStats {
    pub total: u64,
    pub active: u64,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("node counts do not add up: {online} online + {offline} offline != {total} total")]
    NodeSplitMismatch { online: u64, offline: u64, total: u64 },
    #[error("{field} exceeds its total: {count} > {total}")]
    CountExceedsTotal {
        field: &'static str,
        count: u64,
        total: u64,
    },
}

impl DashboardStats {
    /// Checks the subtotal invariants. A payload that fails here is treated
    /// like any other fetch failure, so a stale snapshot outlives corrupt
    /// data.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let nodes = &self.nodes;
        if nodes.online.checked_add(nodes.offline) != Some(nodes.total) {
            return Err(ValidationError::NodeSplitMismatch {
                online: nodes.online,
                offline: nodes.offline,
                total: nodes.total,
            });
        }

        if self.users.active > self.users.total {
            return Err(ValidationError::CountExceedsTotal {
                field: "users.active",
                count: self.users.active,
                total: self.users.total,
            });
        }

        let tasks = &self.tasks;
        let accounted = tasks
            .running
            .saturating_add(tasks.completed)
            .saturating_add(tasks.failed);
        if accounted > tasks.total {
            return Err(ValidationError::CountExceedsTotal {
                field: "tasks",
                count: accounted,
                total: tasks.total,
            });
        }

        if self.inbounds.active > self.inbounds.total {
            return Err(ValidationError::CountExceedsTotal {
                field: "inbounds.active",
                count: self.inbounds.active,
                total: self.inbounds.total,
            });
        }

        Ok(())
    }
}
