//! Rank claims and mint settlement.
//!
//! One claim per account: `NoClaim -> Open -> Settled`. A settled record is
//! kept as a tombstone (term zeroed) so it can never be settled twice; the
//! next `claim_rank` replaces it with an independent successor.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use xen_core::constants::{MAX_MINT_SUPPLY, MAX_PENALTY_PCT, MIN_TERM, SECONDS_IN_DAY};
use xen_core::error::{MintError, XenError};
use xen_core::traits::{RewardCalculator, TokenLedger};
use xen_core::types::{AccountId, ClaimStatus, MintClaim, MintSettlement, RankClaim};

use crate::context::Context;
use crate::dashboard::Dashboard;
use crate::stake::{self, StakeLedger};

/// Check a mint term against the current cap and return it in seconds.
pub fn validate_term(term_days: u64, max_secs: u64) -> Result<u64, MintError> {
    let Some(term_secs) = term_days.checked_mul(SECONDS_IN_DAY) else {
        return Err(MintError::TermTooLong {
            term_secs: u64::MAX,
            max_secs,
        });
    };
    if term_secs <= MIN_TERM {
        return Err(MintError::TermTooShort {
            term_secs,
            min_secs: MIN_TERM,
        });
    }
    if term_secs > max_secs {
        return Err(MintError::TermTooLong {
            term_secs,
            max_secs,
        });
    }
    Ok(term_secs)
}

/// A matured claim's reward, computed but not yet applied.
struct PendingSettlement {
    reward: u128,
    penalty_pct: u64,
}

fn reward_for<R>(
    dashboard: &Dashboard,
    rewards: &R,
    claim: &MintClaim,
    now: u64,
) -> Result<PendingSettlement, XenError>
where
    R: RewardCalculator + ?Sized,
{
    let penalty_pct = rewards.withdrawal_penalty(claim.seconds_late(now));
    let reward = rewards.net_mint_reward(
        dashboard.global_rank(),
        claim.rank,
        claim.term,
        now,
        claim.maturity_ts,
        claim.amplifier,
        claim.eaa_rate,
    )?;
    Ok(PendingSettlement {
        reward,
        penalty_pct,
    })
}

/// Per-account rank claims.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MintClaimLedger {
    claims: BTreeMap<AccountId, MintClaim>,
}

impl MintClaimLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from stored claims. Owners are expected to be unique; see
    /// [`EngineState::check_consistency`](crate::state::EngineState::check_consistency).
    pub fn from_claims(claims: impl IntoIterator<Item = MintClaim>) -> Self {
        Self {
            claims: claims.into_iter().map(|c| (c.owner, c)).collect(),
        }
    }

    /// The account's latest claim record, open or settled.
    pub fn get(&self, account: &AccountId) -> Option<&MintClaim> {
        self.claims.get(account)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MintClaim> {
        self.claims.values()
    }

    pub fn open_count(&self) -> usize {
        self.claims.values().filter(|c| c.is_open()).count()
    }

    fn open_claim(&self, account: &AccountId) -> Result<&MintClaim, MintError> {
        self.claims
            .get(account)
            .filter(|c| c.is_open())
            .ok_or_else(|| MintError::NoOpenClaim(account.to_string()))
    }

    /// Open a rank claim for `term_days`, snapshotting the amplifier and EAA
    /// rate in force now.
    pub fn claim_rank<T, R>(
        &mut self,
        ctx: &mut Context<'_, T, R>,
        account: &AccountId,
        term_days: u64,
    ) -> Result<RankClaim, XenError>
    where
        T: TokenLedger + ?Sized,
        R: RewardCalculator + ?Sized,
    {
        let global_rank = ctx.dashboard.global_rank();
        let term_secs = validate_term(term_days, ctx.rewards.max_term(global_rank))?;
        if self.claims.get(account).is_some_and(MintClaim::is_open) {
            return Err(MintError::ClaimAlreadyOpen(account.to_string()).into());
        }
        let supply = ctx.dashboard.total_supply();
        if supply >= MAX_MINT_SUPPLY {
            return Err(MintError::SupplyExhausted {
                supply,
                max: MAX_MINT_SUPPLY,
            }
            .into());
        }

        let amplifier = ctx
            .rewards
            .reward_amplifier(ctx.dashboard.elapsed(ctx.now), ctx.ledger_supply());
        let eaa_rate = ctx.rewards.eaa_rate(global_rank);
        let rank = ctx.dashboard.open_minter(ctx.config.rank_snapshot);
        let maturity_ts = ctx.now.saturating_add(term_secs);

        self.claims.insert(
            *account,
            MintClaim {
                owner: *account,
                term: term_days,
                maturity_ts,
                rank,
                amplifier,
                eaa_rate,
                status: ClaimStatus::Open,
            },
        );
        info!(%account, rank, term = term_days, amplifier, eaa_rate, maturity_ts, "mint: rank claimed");

        Ok(RankClaim {
            account: *account,
            rank,
            term: term_days,
            maturity_ts,
            amplifier,
            eaa_rate,
        })
    }

    /// What settling the account's open claim at `now` would pay.
    ///
    /// Unlike settlement this does not require maturity.
    pub fn quote<R>(
        &self,
        dashboard: &Dashboard,
        rewards: &R,
        account: &AccountId,
        now: u64,
    ) -> Result<u128, XenError>
    where
        R: RewardCalculator + ?Sized,
    {
        let claim = self.open_claim(account)?;
        Ok(reward_for(dashboard, rewards, claim, now)?.reward)
    }

    /// Validate that `account` holds a matured open claim and compute its
    /// reward. Mutates nothing.
    fn prepare<T, R>(
        &self,
        ctx: &Context<'_, T, R>,
        account: &AccountId,
    ) -> Result<PendingSettlement, XenError>
    where
        T: TokenLedger + ?Sized,
        R: RewardCalculator + ?Sized,
    {
        let claim = self.open_claim(account)?;
        if !claim.is_matured(ctx.now) {
            return Err(MintError::NotMatured {
                now: ctx.now,
                maturity_ts: claim.maturity_ts,
            }
            .into());
        }
        let pending = reward_for(&*ctx.dashboard, ctx.rewards, claim, ctx.now)?;
        debug!(
            %account,
            reward = pending.reward,
            penalty_pct = pending.penalty_pct,
            late_secs = claim.seconds_late(ctx.now),
            "mint: reward computed"
        );
        if pending.penalty_pct >= MAX_PENALTY_PCT {
            warn!(%account, late_secs = claim.seconds_late(ctx.now), "mint: settling with maximum late penalty");
        }
        Ok(pending)
    }

    /// Mark the claim settled and release its minter slot.
    fn close<T, R>(&mut self, ctx: &mut Context<'_, T, R>, account: &AccountId)
    where
        T: TokenLedger + ?Sized,
        R: RewardCalculator + ?Sized,
    {
        if let Some(claim) = self.claims.get_mut(account) {
            claim.status = ClaimStatus::Settled;
            claim.term = 0;
        }
        ctx.dashboard.close_minter();
    }

    /// Settle a matured claim, minting the reward to the account and the
    /// protocol reserve to the treasury.
    pub fn claim_mint_reward<T, R>(
        &mut self,
        ctx: &mut Context<'_, T, R>,
        account: &AccountId,
    ) -> Result<MintSettlement, XenError>
    where
        T: TokenLedger + ?Sized,
        R: RewardCalculator + ?Sized,
    {
        let PendingSettlement {
            reward,
            penalty_pct,
        } = self.prepare(ctx, account)?;
        let reserve = ctx.config.reserve_for(reward);
        let treasury = ctx.config.treasury;
        ctx.ensure_recipients(&[(*account, reward), (treasury, reserve)])?;

        self.close(ctx, account);
        ctx.dashboard.record_supply(reward.saturating_add(reserve));
        ctx.mint_to(account, reward)?;
        ctx.mint_to(&treasury, reserve)?;
        info!(%account, reward, reserve, penalty_pct, "mint: reward claimed");

        Ok(MintSettlement {
            account: *account,
            reward,
            own: reward,
            staked: 0,
            reserve,
            penalty_pct,
            stake: None,
        })
    }

    /// Settle a matured claim, locking `pct` percent of the reward into a
    /// new stake for `term_days` and minting the rest.
    ///
    /// The staked share is never minted. The reserve is still computed on
    /// the full reward.
    pub fn claim_mint_reward_stake<T, R>(
        &mut self,
        ctx: &mut Context<'_, T, R>,
        stakes: &mut StakeLedger,
        account: &AccountId,
        pct: u8,
        term_days: u64,
    ) -> Result<MintSettlement, XenError>
    where
        T: TokenLedger + ?Sized,
        R: RewardCalculator + ?Sized,
    {
        if pct > 100 {
            return Err(MintError::PercentOutOfRange(pct).into());
        }
        let PendingSettlement {
            reward,
            penalty_pct,
        } = self.prepare(ctx, account)?;
        let term_secs = stake::validate_term(term_days)?;
        let staked = reward * pct as u128 / 100;
        let own = reward - staked;
        if staked > 0 {
            stakes.ensure_can_open(account)?;
        }
        let reserve = ctx.config.reserve_for(reward);
        let treasury = ctx.config.treasury;
        ctx.ensure_recipients(&[(*account, own), (treasury, reserve)])?;

        self.close(ctx, account);
        ctx.dashboard.record_supply(own.saturating_add(reserve));
        let stake = (staked > 0)
            .then(|| stakes.open_position(ctx, account, staked, term_days, term_secs));
        ctx.mint_to(account, own)?;
        ctx.mint_to(&treasury, reserve)?;
        info!(%account, reward, own, staked, reserve, penalty_pct, "mint: reward claimed and staked");

        Ok(MintSettlement {
            account: *account,
            reward,
            own,
            staked,
            reserve,
            penalty_pct,
            stake,
        })
    }
}
