//! Events published by the engine for off-chain mirroring.
//!
//! Every committed state change produces one [`RecordedEvent`], handed to the
//! configured [`EventSink`] while the campaign lock is still held, so each
//! campaign's events arrive in the order the changes were applied.
//!
//! Delivery is fire-and-forget. A sink must never block and its failures
//! never reach the caller of the engine operation.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{info, warn};

use crate::distributor::RevenueShares;
use crate::types::{Amount, CampaignId, Identity, MilestoneId, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignEvent {
    CampaignCreated {
        campaign_id: CampaignId,
        creator: Identity,
        funding_goal: Amount,
        deadline: Timestamp,
    },
    InvestmentRecorded {
        campaign_id: CampaignId,
        investor: Identity,
        amount: Amount,
        token_amount: Amount,
    },
    MilestoneAdded {
        campaign_id: CampaignId,
        milestone_id: MilestoneId,
        amount: Amount,
        deadline: Timestamp,
    },
    MilestoneCompleted {
        campaign_id: CampaignId,
        milestone_id: MilestoneId,
    },
    MilestoneReleased {
        campaign_id: CampaignId,
        milestone_id: MilestoneId,
        amount: Amount,
    },
    VestedClaimed {
        campaign_id: CampaignId,
        amount: Amount,
    },
    RevenueDistributed {
        campaign_id: CampaignId,
        shares: RevenueShares,
    },
    RefundIssued {
        campaign_id: CampaignId,
        investor: Identity,
        amount: Amount,
    },
    CampaignFailed {
        campaign_id: CampaignId,
        total_raised: Amount,
    },
    CampaignCompleted {
        campaign_id: CampaignId,
    },
    OperatorGranted {
        campaign_id: CampaignId,
        operator: Identity,
    },
    OperatorRevoked {
        campaign_id: CampaignId,
        operator: Identity,
    },
}

impl CampaignEvent {
    /// Short identifier string suitable for storage by an indexer.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CampaignCreated { .. } => "campaign_created",
            Self::InvestmentRecorded { .. } => "investment_recorded",
            Self::MilestoneAdded { .. } => "milestone_added",
            Self::MilestoneCompleted { .. } => "milestone_completed",
            Self::MilestoneReleased { .. } => "milestone_released",
            Self::VestedClaimed { .. } => "vested_claimed",
            Self::RevenueDistributed { .. } => "revenue_distributed",
            Self::RefundIssued { .. } => "refund_issued",
            Self::CampaignFailed { .. } => "campaign_failed",
            Self::CampaignCompleted { .. } => "campaign_completed",
            Self::OperatorGranted { .. } => "operator_granted",
            Self::OperatorRevoked { .. } => "operator_revoked",
        }
    }

    pub fn campaign_id(&self) -> CampaignId {
        match self {
            Self::CampaignCreated { campaign_id, .. }
            | Self::InvestmentRecorded { campaign_id, .. }
            | Self::MilestoneAdded { campaign_id, .. }
            | Self::MilestoneCompleted { campaign_id, .. }
            | Self::MilestoneReleased { campaign_id, .. }
            | Self::VestedClaimed { campaign_id, .. }
            | Self::RevenueDistributed { campaign_id, .. }
            | Self::RefundIssued { campaign_id, .. }
            | Self::CampaignFailed { campaign_id, .. }
            | Self::CampaignCompleted { campaign_id }
            | Self::OperatorGranted { campaign_id, .. }
            | Self::OperatorRevoked { campaign_id, .. } => *campaign_id,
        }
    }
}

/// An event together with the caller-supplied time of the change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedEvent {
    pub timestamp: Timestamp,
    pub event: CampaignEvent,
}

impl RecordedEvent {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Receiver of engine events.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: &RecordedEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn publish(&self, _event: &RecordedEvent) {}
}

/// Logs every event as a JSON payload at `info` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn publish(&self, event: &RecordedEvent) {
        match event.to_json() {
            Ok(payload) => info!(
                kind = event.event.kind(),
                campaign_id = event.event.campaign_id(),
                %payload,
                "campaign event"
            ),
            Err(e) => warn!(kind = event.event.kind(), "failed to encode event: {e}"),
        }
    }
}

/// Forwards events into an unbounded tokio channel, typically drained by an
/// indexer task.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: UnboundedSender<RecordedEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, UnboundedReceiver<RecordedEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn publish(&self, event: &RecordedEvent) {
        if self.tx.send(event.clone()).is_err() {
            warn!(
                kind = event.event.kind(),
                campaign_id = event.event.campaign_id(),
                "event receiver dropped; event discarded"
            );
        }
    }
}
