//! # Milestone Escrow
//!
//! Each milestone holds a claim on raised funds and moves strictly forward:
//!
//! ```text
//! Pending ──complete──► Completed ──release──► Released
//! ```
//!
//! A release needs a `Completed` milestone whose deadline has been reached,
//! and enough undisbursed escrow to cover its amount. Escrow freezes as soon
//! as the campaign deadline passes below goal, before `close_expired` records
//! the failure. The released amount is split with the campaign's
//! [`RevenueSplit`]:
//!
//! | Bucket   | Destination                          |
//! |----------|--------------------------------------|
//! | platform | paid out directly                    |
//! | creator  | campaign vesting pool                |
//! | investor | paid to the creator as working capital |
//!
//! [`RevenueSplit`]: crate::distributor::RevenueSplit

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{Error, Result};
use crate::rbac::require_manager;
use crate::types::{
    Amount, Campaign, CampaignStatus, Identity, Milestone, MilestoneDraft, MilestoneId,
    MilestoneStatus, Timestamp,
};

/// Breakdown of a successful milestone release.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneRelease {
    pub milestone_id: MilestoneId,
    pub amount: Amount,
    pub platform_fee: Amount,
    pub vested: Amount,
    pub paid_to_creator: Amount,
}

impl Campaign {
    pub(crate) fn add_milestone(
        &mut self,
        caller: &Identity,
        draft: MilestoneDraft,
        now: Timestamp,
    ) -> Result<MilestoneId> {
        require_manager(self, caller)?;
        if draft.amount == 0 {
            return Err(Error::InvalidAmount("milestone amount must be greater than zero"));
        }
        if matches!(
            self.effective_status(now),
            CampaignStatus::Failed | CampaignStatus::Completed
        ) {
            return Err(Error::InvalidState("campaign no longer accepts milestones"));
        }
        let id = MilestoneId::try_from(self.milestones.len()).map_err(|_| Error::Overflow)?;

        self.milestones.push(Milestone {
            id,
            title: draft.title,
            description: draft.description,
            amount: draft.amount,
            deadline: draft.deadline,
            proof_url: draft.proof_url,
            status: MilestoneStatus::Pending,
            released_at: None,
        });
        Ok(id)
    }

    pub(crate) fn complete_milestone(
        &mut self,
        caller: &Identity,
        milestone_id: MilestoneId,
    ) -> Result<()> {
        require_manager(self, caller)?;
        let milestone = self
            .milestones
            .get_mut(milestone_id as usize)
            .ok_or(Error::MilestoneNotFound(milestone_id))?;
        if milestone.status != MilestoneStatus::Pending {
            return Err(Error::InvalidState("milestone is not pending"));
        }
        milestone.status = MilestoneStatus::Completed;
        Ok(())
    }

    pub(crate) fn release_milestone_funds(
        &mut self,
        caller: &Identity,
        milestone_id: MilestoneId,
        now: Timestamp,
    ) -> Result<MilestoneRelease> {
        require_manager(self, caller)?;
        let milestone = self
            .milestone(milestone_id)
            .ok_or(Error::MilestoneNotFound(milestone_id))?;
        if self.effective_status(now) == CampaignStatus::Failed {
            return Err(Error::InvalidState("escrow of a failed campaign is frozen"));
        }
        if milestone.status != MilestoneStatus::Completed {
            return Err(Error::InvalidState("milestone is not completed"));
        }
        if now < milestone.deadline {
            return Err(Error::InvalidState("milestone deadline has not been reached"));
        }
        let amount = milestone.amount;
        let available = self.escrow_balance();
        if amount > available {
            return Err(Error::InsufficientFunds {
                requested: amount,
                available,
            });
        }

        let shares = self.config.split.distribute(amount);
        if shares.creator > 0 {
            self.vesting.add(shares.creator, now)?;
        }
        self.total_disbursed += amount;
        self.platform_fees_collected += shares.platform;
        self.creator_paid_out += shares.investor;
        if let Some(m) = self.milestones.get_mut(milestone_id as usize) {
            m.status = MilestoneStatus::Released;
            m.released_at = Some(now);
        }

        debug!(
            campaign_id = self.id(),
            milestone_id,
            amount,
            platform_fee = shares.platform,
            vested = shares.creator,
            "milestone funds released"
        );
        Ok(MilestoneRelease {
            milestone_id,
            amount,
            platform_fee: shares.platform,
            vested: shares.creator,
            paid_to_creator: shares.investor,
        })
    }
}
