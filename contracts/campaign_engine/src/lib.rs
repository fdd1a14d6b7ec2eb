// contracts/campaign_engine/src/lib.rs

//! # CreativeFi Campaign Engine
//!
//! Off-chain funding and settlement engine for CreativeFi campaigns. It
//! exposes the single [`CampaignEngine`] whose entry points cover the full
//! campaign lifecycle:
//!
//! | Phase        | Entry Point(s)                                                   |
//! |--------------|------------------------------------------------------------------|
//! | Registration | [`CampaignEngine::create_campaign`]                              |
//! | Access       | `grant_operator`, `revoke_operator`                              |
//! | Funding      | [`CampaignEngine::invest`], `close_expired`, `refund`            |
//! | Escrow       | `add_milestone`, `complete_milestone`, `release_milestone_funds` |
//! | Vesting      | `available_vested_amount`, `claim_vested`                        |
//! | Revenue      | [`CampaignEngine::distribute_revenue`]                           |
//! | Closing      | `complete_campaign`                                              |
//! | Queries      | `campaign`, `snapshot`, `milestone`, `token_balance`, `campaign_count` |
//!
//! ## Architecture
//!
//! Authorization is delegated to [`rbac`], locking to [`storage`], and the
//! rules themselves to [`ledger`], [`escrow`], [`vesting`] and
//! [`distributor`]. This file only holds the public entry points, logging and
//! event emission.
//!
//! Every mutating entry point runs under its campaign's mutex and takes the
//! current time as an explicit `now`; the engine never reads a clock.

use std::sync::Arc;

use tracing::info;

pub mod config;
pub mod distributor;
pub mod errors;
pub mod escrow;
pub mod events;
pub mod ledger;
mod math;
pub mod rbac;
pub mod storage;
pub mod types;
pub mod vesting;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_distributor;
#[cfg(test)]
mod test_events;

pub use config::EngineConfig;
pub use distributor::{RevenueDistribution, RevenueShares, RevenueSplit, BPS_DENOMINATOR};
pub use errors::{Error, Result};
pub use escrow::MilestoneRelease;
pub use events::{CampaignEvent, ChannelSink, EventSink, NoopSink, RecordedEvent, TracingSink};
pub use types::{
    Amount, Campaign, CampaignId, CampaignParams, CampaignStatus, CampaignSummary, Identity,
    Milestone, MilestoneDraft, MilestoneId, MilestoneStatus, Timestamp,
};
pub use vesting::VestingPool;

use storage::{lock, CampaignStore};

pub struct CampaignEngine {
    config: EngineConfig,
    store: CampaignStore,
    sink: Arc<dyn EventSink>,
}

impl CampaignEngine {
    /// Create an engine that logs its events through `tracing`.
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::with_sink(config, Arc::new(TracingSink))
    }

    pub fn with_sink(config: EngineConfig, sink: Arc<dyn EventSink>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            store: CampaignStore::new(),
            sink,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn platform_fee_bps(&self) -> u32 {
        self.config.platform_fee_bps
    }

    fn emit(&self, now: Timestamp, event: CampaignEvent) {
        self.sink.publish(&RecordedEvent {
            timestamp: now,
            event,
        });
    }

    // ─────────────────────────────────────────────────────────
    // Registration
    // ─────────────────────────────────────────────────────────

    /// Register a new campaign owned by `creator`.
    ///
    /// The creator receives the whole token supply. Fails with
    /// `InvalidPercentages` when the creator share plus the platform fee
    /// exceeds 100%.
    pub fn create_campaign(
        &self,
        creator: Identity,
        params: CampaignParams,
        now: Timestamp,
    ) -> Result<CampaignId> {
        let funding_goal = params.funding_goal;
        let deadline = params.deadline;
        let id = self.store.insert_with(|id| {
            Campaign::open(id, creator.clone(), params, &self.config, now)
        })?;

        info!(campaign_id = id, %creator, funding_goal, deadline, "campaign created");
        self.emit(
            now,
            CampaignEvent::CampaignCreated {
                campaign_id: id,
                creator,
                funding_goal,
                deadline,
            },
        );
        Ok(id)
    }

    /// Number of campaigns ever created.
    pub fn campaign_count(&self) -> u64 {
        self.store.count()
    }

    // ─────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────

    /// Summary of a campaign with its status as seen at `now`.
    pub fn campaign(&self, id: CampaignId, now: Timestamp) -> Result<CampaignSummary> {
        let handle = self.store.load(id)?;
        let campaign = lock(&handle);
        Ok(campaign.summary(now))
    }

    /// Consistent copy of the full campaign ledger.
    pub fn snapshot(&self, id: CampaignId) -> Result<Campaign> {
        let handle = self.store.load(id)?;
        let campaign = lock(&handle);
        Ok(campaign.clone())
    }

    pub fn milestone(&self, id: CampaignId, milestone_id: MilestoneId) -> Result<Milestone> {
        let handle = self.store.load(id)?;
        let campaign = lock(&handle);
        campaign
            .milestone(milestone_id)
            .cloned()
            .ok_or(Error::MilestoneNotFound(milestone_id))
    }

    pub fn token_balance(&self, id: CampaignId, holder: &Identity) -> Result<Amount> {
        let handle = self.store.load(id)?;
        let campaign = lock(&handle);
        Ok(campaign.token_balance(holder))
    }

    // ─────────────────────────────────────────────────────────
    // Access
    // ─────────────────────────────────────────────────────────

    /// Allow `operator` to manage milestones and revenue. Creator only.
    pub fn grant_operator(
        &self,
        id: CampaignId,
        caller: &Identity,
        operator: &Identity,
        now: Timestamp,
    ) -> Result<()> {
        let handle = self.store.load(id)?;
        let mut campaign = lock(&handle);
        if campaign.grant_operator(caller, operator)? {
            info!(campaign_id = id, %operator, "operator granted");
            self.emit(
                now,
                CampaignEvent::OperatorGranted {
                    campaign_id: id,
                    operator: operator.clone(),
                },
            );
        }
        Ok(())
    }

    /// Revoke `operator`. Revoking a non-operator is a silent no-op.
    pub fn revoke_operator(
        &self,
        id: CampaignId,
        caller: &Identity,
        operator: &Identity,
        now: Timestamp,
    ) -> Result<()> {
        let handle = self.store.load(id)?;
        let mut campaign = lock(&handle);
        if campaign.revoke_operator(caller, operator)? {
            info!(campaign_id = id, %operator, "operator revoked");
            self.emit(
                now,
                CampaignEvent::OperatorRevoked {
                    campaign_id: id,
                    operator: operator.clone(),
                },
            );
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Funding
    // ─────────────────────────────────────────────────────────

    /// Invest `amount` and return the tokens transferred to `investor`.
    pub fn invest(
        &self,
        id: CampaignId,
        investor: &Identity,
        amount: Amount,
        now: Timestamp,
    ) -> Result<Amount> {
        let handle = self.store.load(id)?;
        let mut campaign = lock(&handle);
        let token_amount = campaign.invest(investor, amount, now)?;

        info!(
            campaign_id = id,
            %investor,
            amount,
            token_amount,
            total_raised = campaign.total_raised(),
            funded = campaign.is_funded(),
            "investment recorded"
        );
        self.emit(
            now,
            CampaignEvent::InvestmentRecorded {
                campaign_id: id,
                investor: investor.clone(),
                amount,
                token_amount,
            },
        );
        Ok(token_amount)
    }

    /// Mark a campaign failed once its deadline has passed below goal.
    /// Callable by anyone.
    pub fn close_expired(&self, id: CampaignId, now: Timestamp) -> Result<()> {
        let handle = self.store.load(id)?;
        let mut campaign = lock(&handle);
        campaign.close_expired(now)?;

        let total_raised = campaign.total_raised();
        info!(campaign_id = id, total_raised, "campaign failed");
        self.emit(
            now,
            CampaignEvent::CampaignFailed {
                campaign_id: id,
                total_raised,
            },
        );
        Ok(())
    }

    /// Refund `investor` from a failed campaign's undisbursed escrow.
    pub fn refund(&self, id: CampaignId, investor: &Identity, now: Timestamp) -> Result<Amount> {
        let handle = self.store.load(id)?;
        let mut campaign = lock(&handle);
        let amount = campaign.refund(investor)?;

        info!(campaign_id = id, %investor, amount, "refund issued");
        self.emit(
            now,
            CampaignEvent::RefundIssued {
                campaign_id: id,
                investor: investor.clone(),
                amount,
            },
        );
        Ok(amount)
    }

    // ─────────────────────────────────────────────────────────
    // Milestone escrow
    // ─────────────────────────────────────────────────────────

    pub fn add_milestone(
        &self,
        id: CampaignId,
        caller: &Identity,
        draft: MilestoneDraft,
        now: Timestamp,
    ) -> Result<MilestoneId> {
        let handle = self.store.load(id)?;
        let mut campaign = lock(&handle);
        let amount = draft.amount;
        let deadline = draft.deadline;
        let milestone_id = campaign.add_milestone(caller, draft, now)?;

        info!(campaign_id = id, milestone_id, amount, deadline, "milestone added");
        self.emit(
            now,
            CampaignEvent::MilestoneAdded {
                campaign_id: id,
                milestone_id,
                amount,
                deadline,
            },
        );
        Ok(milestone_id)
    }

    pub fn complete_milestone(
        &self,
        id: CampaignId,
        caller: &Identity,
        milestone_id: MilestoneId,
        now: Timestamp,
    ) -> Result<()> {
        let handle = self.store.load(id)?;
        let mut campaign = lock(&handle);
        campaign.complete_milestone(caller, milestone_id)?;

        info!(campaign_id = id, milestone_id, "milestone completed");
        self.emit(
            now,
            CampaignEvent::MilestoneCompleted {
                campaign_id: id,
                milestone_id,
            },
        );
        Ok(())
    }

    /// Release a completed milestone's funds once its deadline has passed and
    /// the escrow covers it.
    pub fn release_milestone_funds(
        &self,
        id: CampaignId,
        caller: &Identity,
        milestone_id: MilestoneId,
        now: Timestamp,
    ) -> Result<MilestoneRelease> {
        let handle = self.store.load(id)?;
        let mut campaign = lock(&handle);
        let release = campaign.release_milestone_funds(caller, milestone_id, now)?;

        info!(
            campaign_id = id,
            milestone_id,
            amount = release.amount,
            total_disbursed = campaign.total_disbursed(),
            "milestone funds released"
        );
        self.emit(
            now,
            CampaignEvent::MilestoneReleased {
                campaign_id: id,
                milestone_id,
                amount: release.amount,
            },
        );
        Ok(release)
    }

    // ─────────────────────────────────────────────────────────
    // Vesting
    // ─────────────────────────────────────────────────────────

    pub fn available_vested_amount(&self, id: CampaignId, now: Timestamp) -> Result<Amount> {
        let handle = self.store.load(id)?;
        let campaign = lock(&handle);
        Ok(campaign.vesting().available(now))
    }

    /// Claim the creator's vested funds. A repeated claim at the same `now`
    /// returns `0`.
    pub fn claim_vested(&self, id: CampaignId, caller: &Identity, now: Timestamp) -> Result<Amount> {
        let handle = self.store.load(id)?;
        let mut campaign = lock(&handle);
        let amount = campaign.claim_vested(caller, now)?;

        if amount > 0 {
            info!(
                campaign_id = id,
                amount,
                total_claimed = campaign.vesting().total_claimed(),
                "vested funds claimed"
            );
            self.emit(
                now,
                CampaignEvent::VestedClaimed {
                    campaign_id: id,
                    amount,
                },
            );
        }
        Ok(amount)
    }

    // ─────────────────────────────────────────────────────────
    // Revenue
    // ─────────────────────────────────────────────────────────

    pub fn distribute_revenue(
        &self,
        id: CampaignId,
        caller: &Identity,
        amount: Amount,
        now: Timestamp,
    ) -> Result<RevenueDistribution> {
        let handle = self.store.load(id)?;
        let campaign = lock(&handle);
        let distribution = campaign.distribute_revenue(caller, amount, now)?;

        info!(
            campaign_id = id,
            amount,
            platform = distribution.shares.platform,
            creator = distribution.shares.creator,
            investor = distribution.shares.investor,
            holders = distribution.investor_allocations.len(),
            "revenue distributed"
        );
        self.emit(
            now,
            CampaignEvent::RevenueDistributed {
                campaign_id: id,
                shares: distribution.shares,
            },
        );
        Ok(distribution)
    }

    // ─────────────────────────────────────────────────────────
    // Closing
    // ─────────────────────────────────────────────────────────

    /// Close a funded campaign whose milestones have all been released.
    pub fn complete_campaign(&self, id: CampaignId, caller: &Identity, now: Timestamp) -> Result<()> {
        let handle = self.store.load(id)?;
        let mut campaign = lock(&handle);
        campaign.complete(caller)?;

        info!(campaign_id = id, "campaign completed");
        self.emit(now, CampaignEvent::CampaignCompleted { campaign_id: id });
        Ok(())
    }
}
