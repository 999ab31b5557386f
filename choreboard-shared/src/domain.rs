//! Workflow states and the rules for moving between them.
//!
//! Storage persists these as lowercase text; every transition the server
//! performs goes through the functions here so the allowed edges live in one
//! place.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!(concat!("unknown ", stringify!($name), ": {}"), other)),
                }
            }
        }
    };
}

text_enum!(
    /// Lifecycle of a task assigned to a child.
    TaskStatus {
        Assigned => "assigned",
        Submitted => "submitted",
        Approved => "approved",
        Rejected => "rejected",
    }
);

text_enum!(
    /// Review state shared by submissions and reward redemptions.
    ReviewStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
);

text_enum!(
    /// A parent's verdict on a submission or redemption.
    Decision {
        Approve => "approve",
        Reject => "reject",
    }
);

text_enum!(
    NotificationKind {
        SubmissionSubmitted => "submission_submitted",
        SubmissionApproved => "submission_approved",
        SubmissionRejected => "submission_rejected",
        RedemptionRequested => "redemption_requested",
        RedemptionApproved => "redemption_approved",
        RedemptionRejected => "redemption_rejected",
    }
);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("task is {0} and cannot be submitted")]
    NotSubmittable(TaskStatus),
    #[error("task is {0} and not awaiting review")]
    NotUnderReview(TaskStatus),
    #[error("already {0}")]
    AlreadyDecided(ReviewStatus),
}

impl TaskStatus {
    /// A child may submit a fresh task or retry a rejected one.
    pub fn submit(self) -> Result<TaskStatus, TransitionError> {
        match self {
            TaskStatus::Assigned | TaskStatus::Rejected => Ok(TaskStatus::Submitted),
            other => Err(TransitionError::NotSubmittable(other)),
        }
    }

    pub fn decide(self, decision: Decision) -> Result<TaskStatus, TransitionError> {
        match (self, decision) {
            (TaskStatus::Submitted, Decision::Approve) => Ok(TaskStatus::Approved),
            (TaskStatus::Submitted, Decision::Reject) => Ok(TaskStatus::Rejected),
            (other, _) => Err(TransitionError::NotUnderReview(other)),
        }
    }
}

impl ReviewStatus {
    pub fn decide(self, decision: Decision) -> Result<ReviewStatus, TransitionError> {
        match (self, decision) {
            (ReviewStatus::Pending, Decision::Approve) => Ok(ReviewStatus::Approved),
            (ReviewStatus::Pending, Decision::Reject) => Ok(ReviewStatus::Rejected),
            (other, _) => Err(TransitionError::AlreadyDecided(other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("insufficient points: have {balance}, need {cost}")]
pub struct InsufficientPoints {
    pub balance: i32,
    pub cost: i32,
}

/// Balance after spending `cost`; balances never go below zero.
pub fn debit(balance: i32, cost: i32) -> Result<i32, InsufficientPoints> {
    if cost > balance {
        return Err(InsufficientPoints { balance, cost });
    }
    Ok(balance - cost)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("balance overflow: have {balance}, adding {amount}")]
pub struct BalanceOverflow {
    pub balance: i32,
    pub amount: i32,
}

/// Balance after earning `amount`; refuses to wrap past `i32::MAX`.
pub fn credit(balance: i32, amount: i32) -> Result<i32, BalanceOverflow> {
    balance
        .checked_add(amount)
        .ok_or(BalanceOverflow { balance, amount })
}

/// Invite codes are matched case-insensitively and ignore surrounding blanks.
pub fn normalize_invite_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}
