//! # RBAC: per-campaign capabilities
//!
//! Two capabilities exist on every campaign:
//!
//! ```text
//! Creator
//!     └── Operator (zero or more, granted by the creator)
//! ```
//!
//! | Operation                                  | Creator | Operator |
//! |--------------------------------------------|---------|----------|
//! | `grant_operator` / `revoke_operator`       | yes     | no       |
//! | `add_milestone` / `complete_milestone`     | yes     | yes      |
//! | `release_milestone_funds`                  | yes     | yes      |
//! | `distribute_revenue`                       | yes     | yes      |
//! | `claim_vested` / `complete_campaign`       | yes     | no       |
//!
//! The caller identity is trusted as already authenticated; checks only
//! compare it against the stored creator and operator set.

use crate::errors::{Error, Result};
use crate::types::{Campaign, Identity};

/// Assert that `caller` is the campaign creator.
pub(crate) fn require_creator(campaign: &Campaign, caller: &Identity) -> Result<()> {
    if caller == campaign.creator() {
        return Ok(());
    }
    Err(Error::NotAuthorized {
        caller: caller.clone(),
    })
}

/// Assert that `caller` is the creator or one of its operators.
pub(crate) fn require_manager(campaign: &Campaign, caller: &Identity) -> Result<()> {
    if caller == campaign.creator() || campaign.is_operator(caller) {
        return Ok(());
    }
    Err(Error::NotAuthorized {
        caller: caller.clone(),
    })
}

impl Campaign {
    /// Grant the operator capability. Returns `false` if `operator` already
    /// held it.
    pub(crate) fn grant_operator(&mut self, caller: &Identity, operator: &Identity) -> Result<bool> {
        require_creator(self, caller)?;
        if operator == self.creator() {
            return Err(Error::InvalidState("creator cannot be its own operator"));
        }
        Ok(self.operators.insert(operator.clone()))
    }

    /// Revoke the operator capability. Revoking a non-operator is a no-op
    /// returning `false`.
    pub(crate) fn revoke_operator(&mut self, caller: &Identity, operator: &Identity) -> Result<bool> {
        require_creator(self, caller)?;
        Ok(self.operators.remove(operator))
    }
}
