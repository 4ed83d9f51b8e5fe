//! Role registry: the fixed set of workflow roles, their delegation graph,
//! and the forward-routing decision table.

use super::{ParseRoleError, WorkflowDomainError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A fixed workflow stage a task can be owned by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Receives new work, scopes it, and closes it out.
    Intake,
    /// Investigates open questions before design.
    Research,
    /// Produces the technical design.
    Architecture,
    /// Builds the designed solution.
    Implementation,
    /// Verifies the built solution.
    Review,
}

/// Immutable display metadata for a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleProfile {
    /// Human-readable role label.
    pub label: &'static str,
    /// Icon shown next to the role in presentation layers.
    pub icon: &'static str,
    /// One-line summary of the role's responsibility.
    pub summary: &'static str,
}

const INTAKE_PROFILE: RoleProfile = RoleProfile {
    label: "Intake",
    icon: "📥",
    summary: "receives, scopes, and closes out work items",
};

const RESEARCH_PROFILE: RoleProfile = RoleProfile {
    label: "Research",
    icon: "🔍",
    summary: "investigates open questions before design",
};

const ARCHITECTURE_PROFILE: RoleProfile = RoleProfile {
    label: "Architecture",
    icon: "📐",
    summary: "produces the technical design",
};

const IMPLEMENTATION_PROFILE: RoleProfile = RoleProfile {
    label: "Implementation",
    icon: "🛠️",
    summary: "builds the designed solution",
};

const REVIEW_PROFILE: RoleProfile = RoleProfile {
    label: "Review",
    icon: "✅",
    summary: "verifies the built solution",
};

impl Role {
    /// Canonical forward stage order of the pipeline.
    pub const PIPELINE: [Self; 5] = [
        Self::Intake,
        Self::Research,
        Self::Architecture,
        Self::Implementation,
        Self::Review,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Intake => "intake",
            Self::Research => "research",
            Self::Architecture => "architecture",
            Self::Implementation => "implementation",
            Self::Review => "review",
        }
    }

    /// Returns the role's position in the canonical pipeline.
    #[must_use]
    pub const fn stage_index(self) -> usize {
        match self {
            Self::Intake => 0,
            Self::Research => 1,
            Self::Architecture => 2,
            Self::Implementation => 3,
            Self::Review => 4,
        }
    }

    /// Returns the immutable display metadata for this role.
    #[must_use]
    pub const fn profile(self) -> &'static RoleProfile {
        match self {
            Self::Intake => &INTAKE_PROFILE,
            Self::Research => &RESEARCH_PROFILE,
            Self::Architecture => &ARCHITECTURE_PROFILE,
            Self::Implementation => &IMPLEMENTATION_PROFILE,
            Self::Review => &REVIEW_PROFILE,
        }
    }

    /// Returns whether a forward delegation to `target` is in the graph.
    ///
    /// Rejections travel backward through the chain unwind and are not
    /// constrained by this graph.
    #[must_use]
    pub const fn can_delegate_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Intake, Self::Research | Self::Architecture)
                | (Self::Research, Self::Architecture)
                | (Self::Architecture, Self::Implementation)
                | (Self::Implementation, Self::Review)
                | (Self::Review, Self::Architecture)
        )
    }

    /// Validates that a forward delegation to `target` is in the graph.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::InvalidTransition`] when the edge is
    /// not in the graph.
    pub const fn ensure_can_delegate_to(self, target: Self) -> Result<(), WorkflowDomainError> {
        if self.can_delegate_to(target) {
            return Ok(());
        }
        Err(WorkflowDomainError::InvalidTransition {
            from: self,
            to: target,
        })
    }

    /// Computes the default forward role for the given routing context.
    ///
    /// Returns `None` when the role is the end of the forward pipeline;
    /// completion unwinds the delegation chain instead of advancing.
    #[must_use]
    pub const fn next_role(self, context: RoutingContext) -> Option<Self> {
        match self {
            Self::Intake => {
                if context.needs_research {
                    Some(Self::Research)
                } else {
                    Some(Self::Architecture)
                }
            }
            Self::Research => Some(Self::Architecture),
            Self::Architecture => Some(Self::Implementation),
            Self::Implementation => Some(Self::Review),
            Self::Review => {
                if context.review_rejected {
                    Some(Self::Architecture)
                } else {
                    None
                }
            }
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Role {
    type Error = ParseRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "intake" => Ok(Self::Intake),
            "research" => Ok(Self::Research),
            "architecture" => Ok(Self::Architecture),
            "implementation" => Ok(Self::Implementation),
            "review" => Ok(Self::Review),
            _ => Err(ParseRoleError(value.to_owned())),
        }
    }
}

/// Contextual flags feeding the forward-routing decision table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoutingContext {
    /// The work item has open questions requiring research.
    pub needs_research: bool,
    /// The review stage rejected the work and it needs redesign.
    pub review_rejected: bool,
}

impl RoutingContext {
    /// Creates a context with no flags set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            needs_research: false,
            review_rejected: false,
        }
    }

    /// Flags the work item as requiring research.
    #[must_use]
    pub const fn with_needs_research(mut self) -> Self {
        self.needs_research = true;
        self
    }

    /// Flags the work item as rejected by review.
    #[must_use]
    pub const fn with_review_rejected(mut self) -> Self {
        self.review_rejected = true;
        self
    }
}
