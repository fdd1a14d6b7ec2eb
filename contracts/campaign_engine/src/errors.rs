//! Engine-wide error types.
//!
//! Every operation returns [`Result`]. A returned error means the operation was
//! rejected and nothing was mutated.

use thiserror::Error;

use crate::types::{Amount, CampaignId, Identity, MilestoneId, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("Caller {caller} is not authorized for this operation")]
    NotAuthorized { caller: Identity },

    #[error("Invalid state: {0}")]
    InvalidState(&'static str),

    #[error("Campaign {0} is closed")]
    CampaignClosed(CampaignId),

    #[error("Campaign {0} has already reached its funding goal")]
    CampaignAlreadyFunded(CampaignId),

    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: Amount, available: Amount },

    #[error("Invalid amount: {0}")]
    InvalidAmount(&'static str),

    #[error("Percentages must sum to 10000 basis points, got {0}")]
    InvalidPercentages(u64),

    #[error("Nothing to claim")]
    NothingToClaim,

    #[error("Campaign {0} not found")]
    CampaignNotFound(CampaignId),

    #[error("Milestone {0} not found")]
    MilestoneNotFound(MilestoneId),

    #[error("Deadline {deadline} is not after current time {now}")]
    InvalidDeadline { deadline: Timestamp, now: Timestamp },

    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
