//! # Types
//!
//! Shared data structures used across all modules of the campaign engine.
//!
//! ## Config / State split
//!
//! A [`Campaign`] keeps its immutable setup in [`CampaignConfig`] (written once
//! by `create_campaign`, never mutated) next to the mutable ledger counters.
//! Callers outside the crate only get read access; every mutation goes through
//! a [`crate::CampaignEngine`] entry point while the campaign lock is held.
//!
//! ## Status as a Finite-State Machine
//!
//! [`CampaignStatus`] is exclusive and forward-only:
//!
//! ```text
//! Active ──► Funded ──► Completed
//!    └──► Failed
//! ```
//!
//! [`MilestoneStatus`] likewise only moves `Pending ──► Completed ──► Released`.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::distributor::RevenueSplit;
use crate::vesting::VestingPool;

/// Sequential campaign identifier, starting at 0.
pub type CampaignId = u64;

/// Per-campaign sequential milestone identifier, starting at 0.
pub type MilestoneId = u32;

/// Currency or token amount in its smallest unit.
pub type Amount = u128;

/// Seconds since the Unix epoch, always supplied by the caller.
pub type Timestamp = u64;

/// An already-authenticated caller identity (wallet address or similar).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Identity {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Lifecycle status of a campaign.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    /// Accepting investments.
    Active,
    /// Funding goal reached; milestones being delivered.
    Funded,
    /// Deadline passed below goal; escrow open for refunds.
    Failed,
    /// Every milestone released.
    Completed,
}

/// Lifecycle status of a milestone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneStatus {
    Pending,
    Completed,
    Released,
}

/// Input for `add_milestone`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneDraft {
    pub title: String,
    pub description: String,
    /// Claim on raised funds released when the milestone is paid out.
    pub amount: Amount,
    /// Earliest moment the funds may be released.
    pub deadline: Timestamp,
    /// Link to the delivery proof (e.g. an IPFS URI).
    pub proof_url: String,
}

/// A creator-declared work unit gating a partial fund release.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: MilestoneId,
    pub title: String,
    pub description: String,
    pub amount: Amount,
    pub deadline: Timestamp,
    pub proof_url: String,
    pub status: MilestoneStatus,
    pub released_at: Option<Timestamp>,
}

/// Per-investor ledger entry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestorPosition {
    /// Total amount contributed across all investments.
    pub contributed: Amount,
    /// Campaign tokens currently held.
    pub tokens: Amount,
    /// Amount paid back after the campaign failed.
    pub refunded: Amount,
}

/// Input for `create_campaign`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignParams {
    pub title: String,
    pub description: String,
    pub category: String,
    pub funding_goal: Amount,
    pub deadline: Timestamp,
    /// Creator share of milestone releases and revenue, in basis points.
    pub creator_bps: u32,
    /// Overrides the engine's default token supply when set.
    pub token_supply: Option<Amount>,
}

/// Immutable campaign configuration, written once at creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignConfig {
    pub id: CampaignId,
    pub creator: Identity,
    pub title: String,
    pub description: String,
    pub category: String,
    pub funding_goal: Amount,
    pub deadline: Timestamp,
    pub total_supply: Amount,
    pub split: RevenueSplit,
    pub created_at: Timestamp,
}

/// One campaign's full ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    pub(crate) config: CampaignConfig,
    pub(crate) status: CampaignStatus,
    pub(crate) total_raised: Amount,
    pub(crate) total_disbursed: Amount,
    pub(crate) total_refunded: Amount,
    pub(crate) platform_fees_collected: Amount,
    pub(crate) creator_paid_out: Amount,
    pub(crate) creator_balance: Amount,
    pub(crate) positions: BTreeMap<Identity, InvestorPosition>,
    pub(crate) milestones: Vec<Milestone>,
    pub(crate) vesting: VestingPool,
    pub(crate) operators: BTreeSet<Identity>,
}

impl Campaign {
    pub fn id(&self) -> CampaignId {
        self.config.id
    }

    pub fn creator(&self) -> &Identity {
        &self.config.creator
    }

    pub fn config(&self) -> &CampaignConfig {
        &self.config
    }

    pub fn status(&self) -> CampaignStatus {
        self.status
    }

    pub fn total_raised(&self) -> Amount {
        self.total_raised
    }

    pub fn total_disbursed(&self) -> Amount {
        self.total_disbursed
    }

    pub fn total_refunded(&self) -> Amount {
        self.total_refunded
    }

    pub fn platform_fees_collected(&self) -> Amount {
        self.platform_fees_collected
    }

    /// Funds paid straight to the creator on release, excluding vesting claims.
    pub fn creator_paid_out(&self) -> Amount {
        self.creator_paid_out
    }

    /// Raised funds not yet disbursed through a milestone release.
    pub fn escrow_balance(&self) -> Amount {
        self.total_raised - self.total_disbursed
    }

    /// Status as seen at `now`. An active campaign whose deadline has passed
    /// below goal is already failed, whether or not `close_expired` has
    /// recorded it yet.
    pub fn effective_status(&self, now: Timestamp) -> CampaignStatus {
        if self.status == CampaignStatus::Active && now >= self.config.deadline {
            return CampaignStatus::Failed;
        }
        self.status
    }

    /// Still accepting investments at `now`.
    pub fn is_active_at(&self, now: Timestamp) -> bool {
        self.effective_status(now) == CampaignStatus::Active
    }

    /// True once the goal has been reached; stays true for the rest of the
    /// campaign's life, including after completion.
    pub fn is_funded(&self) -> bool {
        self.total_raised >= self.config.funding_goal
    }

    pub fn is_failed(&self) -> bool {
        self.status == CampaignStatus::Failed
    }

    pub fn is_completed(&self) -> bool {
        self.status == CampaignStatus::Completed
    }

    /// Token balance of `holder`; the creator holds every token not issued
    /// to an investor.
    pub fn token_balance(&self, holder: &Identity) -> Amount {
        if holder == &self.config.creator {
            return self.creator_balance;
        }
        self.positions.get(holder).map(|p| p.tokens).unwrap_or(0)
    }

    pub fn position(&self, investor: &Identity) -> Option<&InvestorPosition> {
        self.positions.get(investor)
    }

    pub fn investor_count(&self) -> usize {
        self.positions.len()
    }

    pub fn milestones(&self) -> &[Milestone] {
        &self.milestones
    }

    pub fn milestone(&self, id: MilestoneId) -> Option<&Milestone> {
        self.milestones.get(id as usize)
    }

    pub fn vesting(&self) -> &VestingPool {
        &self.vesting
    }

    pub fn is_operator(&self, who: &Identity) -> bool {
        self.operators.contains(who)
    }

    /// Token balances of every non-creator holder, in identity order.
    pub fn investor_holdings(&self) -> BTreeMap<Identity, Amount> {
        self.positions
            .iter()
            .filter(|(_, p)| p.tokens > 0)
            .map(|(who, p)| (who.clone(), p.tokens))
            .collect()
    }

    pub fn summary(&self, now: Timestamp) -> CampaignSummary {
        CampaignSummary {
            id: self.config.id,
            title: self.config.title.clone(),
            creator: self.config.creator.clone(),
            funding_goal: self.config.funding_goal,
            total_raised: self.total_raised,
            deadline: self.config.deadline,
            is_active: self.is_active_at(now),
            status: self.effective_status(now),
            investor_count: self.positions.len(),
            total_disbursed: self.total_disbursed,
        }
    }
}

/// Read-side view of a campaign for listings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignSummary {
    pub id: CampaignId,
    pub title: String,
    pub creator: Identity,
    pub funding_goal: Amount,
    pub total_raised: Amount,
    pub deadline: Timestamp,
    pub is_active: bool,
    pub status: CampaignStatus,
    pub investor_count: usize,
    pub total_disbursed: Amount,
}
