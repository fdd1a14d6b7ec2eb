//! # Vesting
//!
//! Cliff + linear release of the creator's share of released milestone funds.
//!
//! The pool starts its clock on the first contribution (`cliff_start`). Every
//! later contribution joins the same schedule, so funds added after the cliff
//! are immediately vested in proportion to the time already elapsed.
//!
//! ```text
//! vested(t) = 0                                          t <  cliff_end
//!           = total_vested * (t - cliff_end) / duration  cliff_end <= t < cliff_end + duration
//!           = total_vested                               otherwise
//! available(t) = vested(t) - total_claimed
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{Error, Result};
use crate::math::mul_div_u64;
use crate::rbac::require_creator;
use crate::types::{Amount, Campaign, Identity, Timestamp};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VestingPool {
    cliff_duration: u64,
    vesting_duration: u64,
    cliff_start: Option<Timestamp>,
    total_vested: Amount,
    total_claimed: Amount,
    last_claim_at: Option<Timestamp>,
}

impl VestingPool {
    pub fn new(cliff_duration: u64, vesting_duration: u64) -> Self {
        Self {
            cliff_duration,
            vesting_duration,
            cliff_start: None,
            total_vested: 0,
            total_claimed: 0,
            last_claim_at: None,
        }
    }

    pub fn cliff_duration(&self) -> u64 {
        self.cliff_duration
    }

    pub fn vesting_duration(&self) -> u64 {
        self.vesting_duration
    }

    pub fn cliff_start(&self) -> Option<Timestamp> {
        self.cliff_start
    }

    /// End of the cliff, or `None` before the first contribution.
    pub fn cliff_end(&self) -> Option<Timestamp> {
        self.cliff_start
            .map(|start| start.saturating_add(self.cliff_duration))
    }

    pub fn total_vested(&self) -> Amount {
        self.total_vested
    }

    pub fn total_claimed(&self) -> Amount {
        self.total_claimed
    }

    /// Add `amount` to the pool. The first contribution starts the cliff.
    pub fn add(&mut self, amount: Amount, now: Timestamp) -> Result<()> {
        let total_vested = self
            .total_vested
            .checked_add(amount)
            .ok_or(Error::Overflow)?;
        self.total_vested = total_vested;
        if self.cliff_start.is_none() {
            self.cliff_start = Some(now);
        }
        debug!(amount, total_vested, "vesting pool topped up");
        Ok(())
    }

    /// Cumulative amount vested at `now`, claimed or not.
    pub fn vested_amount(&self, now: Timestamp) -> Amount {
        let Some(cliff_end) = self.cliff_end() else {
            return 0;
        };
        if now < cliff_end {
            return 0;
        }
        let elapsed = now - cliff_end;
        if self.vesting_duration == 0 || elapsed >= self.vesting_duration {
            return self.total_vested;
        }
        mul_div_u64(self.total_vested, elapsed, self.vesting_duration)
    }

    /// Vested but unclaimed amount at `now`. Never fails.
    pub fn available(&self, now: Timestamp) -> Amount {
        self.vested_amount(now).saturating_sub(self.total_claimed)
    }

    /// Claim everything available at `now`.
    ///
    /// Fails with `NothingToClaim` when nothing is available, except right
    /// after a successful claim at the same instant, which yields `Ok(0)`.
    pub fn claim(&mut self, now: Timestamp) -> Result<Amount> {
        let available = self.available(now);
        if available == 0 {
            if self.last_claim_at == Some(now) {
                return Ok(0);
            }
            return Err(Error::NothingToClaim);
        }
        self.total_claimed += available;
        self.last_claim_at = Some(now);
        Ok(available)
    }
}

impl Campaign {
    /// Claim the creator's vested funds at `now`.
    pub(crate) fn claim_vested(&mut self, caller: &Identity, now: Timestamp) -> Result<Amount> {
        require_creator(self, caller)?;
        self.vesting.claim(now)
    }
}
