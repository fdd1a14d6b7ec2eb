//! # Revenue Distributor
//!
//! Basis-point split of an amount across platform, creator and investors.
//!
//! ## Rounding
//!
//! ```text
//! platform = floor(total * platform_bps / 10000)
//! creator  = floor(total * creator_bps  / 10000)
//! investor = total - platform - creator
//! ```
//!
//! The investor share absorbs all truncation so the three shares always add
//! up to `total`. Inside the investor share each holder gets
//! `floor(share * balance / circulating)` and the leftover goes to the
//! first holder in identity order.
//!
//! The same split is applied to milestone releases, where the investor
//! bucket is paid to the creator as working capital.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::math::{mul_div_floor, mul_div_u64};
use crate::rbac::require_manager;
use crate::types::{Amount, Campaign, CampaignStatus, Identity, Timestamp};

/// 100% in basis points.
pub const BPS_DENOMINATOR: u32 = 10_000;

/// A validated percentage triple summing to exactly [`BPS_DENOMINATOR`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueSplit {
    platform_bps: u32,
    creator_bps: u32,
    investor_bps: u32,
}

impl RevenueSplit {
    pub fn configure(platform_bps: u32, creator_bps: u32, investor_bps: u32) -> Result<Self> {
        let sum = platform_bps as u64 + creator_bps as u64 + investor_bps as u64;
        if sum != BPS_DENOMINATOR as u64 {
            return Err(Error::InvalidPercentages(sum));
        }
        Ok(Self {
            platform_bps,
            creator_bps,
            investor_bps,
        })
    }

    /// Build a split where investors receive whatever platform and creator
    /// leave over. Fails when the two fixed shares exceed 100%.
    pub fn with_investor_remainder(platform_bps: u32, creator_bps: u32) -> Result<Self> {
        let fixed = platform_bps as u64 + creator_bps as u64;
        if fixed > BPS_DENOMINATOR as u64 {
            return Err(Error::InvalidPercentages(fixed));
        }
        Self::configure(platform_bps, creator_bps, BPS_DENOMINATOR - fixed as u32)
    }

    pub fn platform_bps(&self) -> u32 {
        self.platform_bps
    }

    pub fn creator_bps(&self) -> u32 {
        self.creator_bps
    }

    pub fn investor_bps(&self) -> u32 {
        self.investor_bps
    }

    pub fn distribute(&self, total: Amount) -> RevenueShares {
        let platform = mul_div_u64(total, self.platform_bps as u64, BPS_DENOMINATOR as u64);
        let creator = mul_div_u64(total, self.creator_bps as u64, BPS_DENOMINATOR as u64);
        RevenueShares {
            platform,
            creator,
            investor: total - platform - creator,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueShares {
    pub platform: Amount,
    pub creator: Amount,
    pub investor: Amount,
}

impl RevenueShares {
    pub fn total(&self) -> Amount {
        self.platform + self.creator + self.investor
    }
}

/// Result of distributing revenue for one campaign.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueDistribution {
    pub shares: RevenueShares,
    /// Investor share broken down per token holder.
    pub investor_allocations: BTreeMap<Identity, Amount>,
    /// Creator share plus any investor share with no holder to receive it.
    pub creator_total: Amount,
}

/// Split `share` across `holdings` in proportion to balance.
///
/// Zero balances are ignored. Returns an empty map when nobody holds tokens.
pub fn allocate_to_holders(
    share: Amount,
    holdings: &BTreeMap<Identity, Amount>,
) -> Result<BTreeMap<Identity, Amount>> {
    let circulating = holdings
        .values()
        .try_fold(0u128, |acc, b| acc.checked_add(*b))
        .ok_or(Error::Overflow)?;
    if circulating == 0 {
        return Ok(BTreeMap::new());
    }

    let mut allocations = BTreeMap::new();
    let mut assigned: Amount = 0;
    for (holder, balance) in holdings.iter().filter(|(_, b)| **b > 0) {
        let portion = mul_div_floor(share, *balance, circulating).ok_or(Error::Overflow)?;
        assigned += portion;
        allocations.insert(holder.clone(), portion);
    }

    let remainder = share - assigned;
    if remainder > 0 {
        if let Some(first) = allocations.values_mut().next() {
            *first += remainder;
        }
    }
    Ok(allocations)
}

impl Campaign {
    /// Split `amount` of revenue with this campaign's percentages and break
    /// the investor share down by current token holdings.
    ///
    /// With no investor holding tokens the creator holds the whole supply, so
    /// the investor share is folded into `creator_total`.
    pub(crate) fn distribute_revenue(
        &self,
        caller: &Identity,
        amount: Amount,
        now: Timestamp,
    ) -> Result<RevenueDistribution> {
        require_manager(self, caller)?;
        if amount == 0 {
            return Err(Error::InvalidAmount("revenue must be greater than zero"));
        }
        if self.effective_status(now) == CampaignStatus::Failed {
            return Err(Error::InvalidState("failed campaigns do not distribute revenue"));
        }
        let shares = self.config.split.distribute(amount);
        let investor_allocations = allocate_to_holders(shares.investor, &self.investor_holdings())?;
        let creator_total = if investor_allocations.is_empty() {
            shares.creator + shares.investor
        } else {
            shares.creator
        };
        Ok(RevenueDistribution {
            shares,
            investor_allocations,
            creator_total,
        })
    }
}
