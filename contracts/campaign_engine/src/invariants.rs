use crate::distributor::RevenueShares;
use crate::types::{Campaign, CampaignStatus, MilestoneStatus};
use crate::vesting::VestingPool;
use crate::Timestamp;

/// INV-1: investor tokens plus the creator balance equal the fixed supply.
pub fn assert_token_conservation(campaign: &Campaign) {
    let issued: u128 = campaign.positions.values().map(|p| p.tokens).sum();
    assert_eq!(
        issued + campaign.creator_balance,
        campaign.config.total_supply,
        "INV-1 violated: campaign {} issued {} + creator {} != supply {}",
        campaign.id(),
        issued,
        campaign.creator_balance,
        campaign.config.total_supply
    );
}

/// INV-2: total raised equals the sum of every investor's contribution.
pub fn assert_raised_matches_positions(campaign: &Campaign) {
    let contributed: u128 = campaign.positions.values().map(|p| p.contributed).sum();
    assert_eq!(
        contributed,
        campaign.total_raised(),
        "INV-2 violated: campaign {} contributions {} != raised {}",
        campaign.id(),
        contributed,
        campaign.total_raised()
    );
}

/// INV-3: disbursed funds never exceed raised funds and match released
/// milestones.
pub fn assert_disbursement_bounded(campaign: &Campaign) {
    assert!(
        campaign.total_disbursed() <= campaign.total_raised(),
        "INV-3 violated: campaign {} disbursed {} > raised {}",
        campaign.id(),
        campaign.total_disbursed(),
        campaign.total_raised()
    );
    let released: u128 = campaign
        .milestones()
        .iter()
        .filter(|m| m.status == MilestoneStatus::Released)
        .map(|m| m.amount)
        .sum();
    assert_eq!(
        released,
        campaign.total_disbursed(),
        "INV-3 violated: released milestones {} != disbursed {}",
        released,
        campaign.total_disbursed()
    );
}

/// INV-4: status and funding flag agree.
pub fn assert_status_consistent(campaign: &Campaign) {
    match campaign.status() {
        CampaignStatus::Active | CampaignStatus::Failed => assert!(
            !campaign.is_funded(),
            "INV-4 violated: campaign {} is {:?} but funded",
            campaign.id(),
            campaign.status()
        ),
        CampaignStatus::Funded | CampaignStatus::Completed => assert!(
            campaign.is_funded(),
            "INV-4 violated: campaign {} is {:?} but not funded",
            campaign.id(),
            campaign.status()
        ),
    }
}

/// INV-5: refunds never exceed undisbursed escrow.
pub fn assert_refunds_bounded(campaign: &Campaign) {
    assert!(
        campaign.total_refunded() <= campaign.escrow_balance(),
        "INV-5 violated: campaign {} refunded {} > escrow {}",
        campaign.id(),
        campaign.total_refunded(),
        campaign.escrow_balance()
    );
}

/// INV-6: total raised never decreases.
pub fn assert_raised_monotonic(before: u128, after: u128) {
    assert!(
        after >= before,
        "INV-6 violated: total raised decreased from {} to {}",
        before,
        after
    );
}

/// INV-7: milestones only move Pending -> Completed -> Released.
pub fn assert_valid_milestone_transition(from: MilestoneStatus, to: MilestoneStatus) {
    let valid = from == to
        || matches!(
            (from, to),
            (MilestoneStatus::Pending, MilestoneStatus::Completed)
                | (MilestoneStatus::Completed, MilestoneStatus::Released)
        );
    assert!(
        valid,
        "INV-7 violated: invalid milestone transition from {:?} to {:?}",
        from, to
    );
}

/// INV-8: shares reconstruct the distributed total exactly.
pub fn assert_distribution_exact(total: u128, shares: &RevenueShares) {
    assert_eq!(
        shares.total(),
        total,
        "INV-8 violated: {:?} does not add up to {}",
        shares,
        total
    );
}

/// INV-9: available vesting stays within the unclaimed pool.
pub fn assert_vesting_bounded(pool: &VestingPool, now: Timestamp) {
    let available = pool.available(now);
    assert!(
        available <= pool.total_vested() - pool.total_claimed(),
        "INV-9 violated: available {} exceeds unclaimed {}",
        available,
        pool.total_vested() - pool.total_claimed()
    );
}

/// Run every stateless campaign invariant.
pub fn assert_all_campaign_invariants(campaign: &Campaign) {
    assert_token_conservation(campaign);
    assert_raised_matches_positions(campaign);
    assert_disbursement_bounded(campaign);
    assert_status_consistent(campaign);
    assert_refunds_bounded(campaign);
}
