//! Proof-of-burn bookkeeping.
//!
//! Burning destroys tokens and bumps a per-account counter that external
//! consumers read. It never touches rank, emitted supply or staking state.

use tracing::info;

use xen_core::constants::XEN_MIN_BURN;
use xen_core::error::{BurnError, XenError};
use xen_core::traits::{RewardCalculator, TokenLedger};
use xen_core::types::{AccountId, BurnReceipt};

use crate::context::Context;

pub fn burn<T, R>(
    ctx: &mut Context<'_, T, R>,
    account: &AccountId,
    amount: u128,
) -> Result<BurnReceipt, XenError>
where
    T: TokenLedger + ?Sized,
    R: RewardCalculator + ?Sized,
{
    if amount <= XEN_MIN_BURN {
        return Err(BurnError::AmountTooSmall {
            amount,
            min: XEN_MIN_BURN,
        }
        .into());
    }
    let have = ctx.token.balance_of(account)?;
    if have < amount {
        return Err(BurnError::InsufficientBalance { have, need: amount }.into());
    }

    ctx.burn_from(account, amount)?;
    let total_burned = ctx.dashboard.record_burn(account, amount);
    info!(%account, amount, total_burned, "burn: recorded");

    Ok(BurnReceipt {
        account: *account,
        amount,
        total_burned,
    })
}
