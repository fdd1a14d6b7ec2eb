//! # Campaign Ledger & Token Issuance
//!
//! Campaign creation, investments and the funding-side lifecycle
//! (`Active → Funded | Failed`, `Funded → Completed`, refunds).
//!
//! ## Token issuance
//!
//! The creator receives the whole `total_supply` at creation. An investment
//! of `amount` moves `floor(amount * total_supply / funding_goal)` tokens from
//! the creator to the investor; supply never changes. The investment that
//! crosses the goal is accepted in full, but its token allocation is capped at
//! whatever the creator still holds.
//!
//! Every operation validates and computes first, then commits; an `Err`
//! leaves the campaign untouched.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::config::EngineConfig;
use crate::distributor::RevenueSplit;
use crate::errors::{Error, Result};
use crate::math::mul_div_floor;
use crate::rbac::require_creator;
use crate::types::{
    Amount, Campaign, CampaignConfig, CampaignId, CampaignParams, CampaignStatus, Identity,
    MilestoneStatus, Timestamp,
};
use crate::vesting::VestingPool;

impl Campaign {
    /// Validate `params` and open a new campaign owned by `creator`.
    pub(crate) fn open(
        id: CampaignId,
        creator: Identity,
        params: CampaignParams,
        config: &EngineConfig,
        now: Timestamp,
    ) -> Result<Self> {
        if params.funding_goal == 0 {
            return Err(Error::InvalidAmount("funding goal must be greater than zero"));
        }
        if params.deadline <= now {
            return Err(Error::InvalidDeadline {
                deadline: params.deadline,
                now,
            });
        }
        let total_supply = params.token_supply.unwrap_or(config.default_token_supply);
        if total_supply == 0 {
            return Err(Error::InvalidAmount("token supply must be greater than zero"));
        }
        let split = RevenueSplit::with_investor_remainder(config.platform_fee_bps, params.creator_bps)?;

        Ok(Campaign {
            config: CampaignConfig {
                id,
                creator,
                title: params.title,
                description: params.description,
                category: params.category,
                funding_goal: params.funding_goal,
                deadline: params.deadline,
                total_supply,
                split,
                created_at: now,
            },
            status: CampaignStatus::Active,
            total_raised: 0,
            total_disbursed: 0,
            total_refunded: 0,
            platform_fees_collected: 0,
            creator_paid_out: 0,
            creator_balance: total_supply,
            positions: BTreeMap::new(),
            milestones: Vec::new(),
            vesting: VestingPool::new(config.cliff_duration_secs, config.vesting_duration_secs),
            operators: BTreeSet::new(),
        })
    }

    /// Tokens issued for `amount` before the creator-balance cap.
    pub fn tokens_for(&self, amount: Amount) -> Result<Amount> {
        let scaled = amount
            .checked_mul(self.config.total_supply)
            .ok_or(Error::Overflow)?;
        Ok(scaled / self.config.funding_goal)
    }

    /// Record an investment and return the tokens transferred to `investor`.
    pub(crate) fn invest(
        &mut self,
        investor: &Identity,
        amount: Amount,
        now: Timestamp,
    ) -> Result<Amount> {
        if amount == 0 {
            return Err(Error::InvalidAmount("investment must be greater than zero"));
        }
        match self.status {
            CampaignStatus::Active => {}
            CampaignStatus::Funded => return Err(Error::CampaignAlreadyFunded(self.id())),
            CampaignStatus::Failed | CampaignStatus::Completed => {
                return Err(Error::CampaignClosed(self.id()))
            }
        }
        if now >= self.config.deadline {
            return Err(Error::CampaignClosed(self.id()));
        }
        if investor == self.creator() {
            return Err(Error::NotAuthorized {
                caller: investor.clone(),
            });
        }

        let token_amount = self.tokens_for(amount)?.min(self.creator_balance);
        let total_raised = self
            .total_raised
            .checked_add(amount)
            .ok_or(Error::Overflow)?;
        let previous = self.positions.get(investor).cloned().unwrap_or_default();
        let contributed = previous
            .contributed
            .checked_add(amount)
            .ok_or(Error::Overflow)?;

        let position = self.positions.entry(investor.clone()).or_default();
        position.contributed = contributed;
        position.tokens = previous.tokens + token_amount;
        self.creator_balance -= token_amount;
        self.total_raised = total_raised;
        if self.total_raised >= self.config.funding_goal {
            self.status = CampaignStatus::Funded;
        }

        debug!(
            campaign_id = self.id(),
            %investor,
            amount,
            token_amount,
            total_raised,
            "investment applied"
        );
        Ok(token_amount)
    }

    /// Mark an active campaign past its deadline and below goal as failed.
    pub(crate) fn close_expired(&mut self, now: Timestamp) -> Result<()> {
        if self.status != CampaignStatus::Active {
            return Err(Error::InvalidState("only active campaigns can expire"));
        }
        if now < self.config.deadline {
            return Err(Error::InvalidState("campaign deadline has not passed"));
        }
        self.status = CampaignStatus::Failed;
        Ok(())
    }

    /// Pay `investor` its pro-rata share of the undisbursed escrow of a
    /// failed campaign and hand its tokens back to the creator.
    pub(crate) fn refund(&mut self, investor: &Identity) -> Result<Amount> {
        if self.status != CampaignStatus::Failed {
            return Err(Error::InvalidState(
                "refunds are only available for failed campaigns",
            ));
        }
        let position = match self.positions.get(investor) {
            Some(p) if p.contributed > 0 && p.refunded == 0 => p.clone(),
            _ => return Err(Error::NothingToClaim),
        };

        // Escrow is frozen from the deadline on, so every refund sees the same ratio.
        let refundable = self.total_raised - self.total_disbursed;
        let amount = mul_div_floor(refundable, position.contributed, self.total_raised)
            .ok_or(Error::Overflow)?;
        if amount == 0 {
            return Err(Error::NothingToClaim);
        }

        if let Some(p) = self.positions.get_mut(investor) {
            p.refunded = amount;
            p.tokens = 0;
        }
        self.creator_balance += position.tokens;
        self.total_refunded += amount;
        Ok(amount)
    }

    /// Close a funded campaign once every milestone has been released.
    pub(crate) fn complete(&mut self, caller: &Identity) -> Result<()> {
        require_creator(self, caller)?;
        if self.status != CampaignStatus::Funded {
            return Err(Error::InvalidState("only funded campaigns can be completed"));
        }
        if self.milestones.is_empty() {
            return Err(Error::InvalidState("campaign has no milestones"));
        }
        if self
            .milestones
            .iter()
            .any(|m| m.status != MilestoneStatus::Released)
        {
            return Err(Error::InvalidState("not every milestone has been released"));
        }
        self.status = CampaignStatus::Completed;
        Ok(())
    }
}
