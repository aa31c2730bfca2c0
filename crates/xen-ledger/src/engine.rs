//! The engine facade.
//!
//! [`XenEngine`] owns the dashboard, both per-account ledgers and the mint
//! authority, and borrows the host's token ledger and clock. Each entry
//! operation reads the clock once, builds a [`Context`] and delegates to
//! the ledger that owns the transition.

use tracing::info;

use xen_core::authority::TokenAuthority;
use xen_core::error::XenError;
use xen_core::traits::{Clock, RewardCalculator, TokenLedger};
use xen_core::types::{
    AccountId, BurnReceipt, MintClaim, MintSettlement, RankClaim, StakeClaim, StakeOpened,
    StakeWithdrawal,
};
use xen_reward::RewardEngine;

use crate::burn;
use crate::config::EngineConfig;
use crate::context::Context;
use crate::dashboard::Dashboard;
use crate::mint::MintClaimLedger;
use crate::stake::StakeLedger;
use crate::state::EngineState;

pub struct XenEngine<T: TokenLedger, C: Clock, R: RewardCalculator = RewardEngine> {
    config: EngineConfig,
    dashboard: Dashboard,
    mints: MintClaimLedger,
    stakes: StakeLedger,
    token: T,
    authority: TokenAuthority,
    clock: C,
    rewards: R,
}

impl<T: TokenLedger, C: Clock> XenEngine<T, C, RewardEngine> {
    /// Initialize a new engine: register the token, take the mint/burn
    /// capabilities and start the dashboard at the clock's current time.
    ///
    /// Fails if `token` was already initialized.
    pub fn genesis(config: EngineConfig, token: T, clock: C) -> Result<Self, XenError> {
        Self::genesis_with_rewards(config, token, clock, RewardEngine::new())
    }

    /// Rebuild an engine from a snapshot.
    ///
    /// `authority` must be the one acquired on `token` at genesis.
    pub fn restore(
        state: EngineState,
        token: T,
        authority: TokenAuthority,
        clock: C,
    ) -> Result<Self, XenError> {
        Self::restore_with_rewards(state, token, authority, clock, RewardEngine::new())
    }
}

impl<T: TokenLedger, C: Clock, R: RewardCalculator> XenEngine<T, C, R> {
    pub fn genesis_with_rewards(
        config: EngineConfig,
        mut token: T,
        clock: C,
        rewards: R,
    ) -> Result<Self, XenError> {
        config.validate()?;
        let authority = TokenAuthority::acquire(&mut token, &config.token)?;
        let genesis_ts = clock.now_seconds();
        info!(genesis_ts, treasury = %config.treasury, symbol = %config.token.symbol, "engine: genesis");
        Ok(Self {
            config,
            dashboard: Dashboard::new(genesis_ts),
            mints: MintClaimLedger::new(),
            stakes: StakeLedger::new(),
            token,
            authority,
            clock,
            rewards,
        })
    }

    pub fn restore_with_rewards(
        state: EngineState,
        token: T,
        authority: TokenAuthority,
        clock: C,
        rewards: R,
    ) -> Result<Self, XenError> {
        state.config.validate()?;
        state.check_consistency()?;
        let EngineState {
            config,
            dashboard,
            mints,
            stakes,
        } = state;
        info!(
            global_rank = dashboard.global_rank(),
            claims = mints.len(),
            positions = stakes.len(),
            "engine: restored from snapshot"
        );
        Ok(Self {
            config,
            dashboard,
            mints: MintClaimLedger::from_claims(mints),
            stakes: StakeLedger::from_positions(stakes),
            token,
            authority,
            clock,
            rewards,
        })
    }

    /// Split-borrow the engine into a fresh operation context and the two
    /// per-account ledgers.
    fn parts(&mut self) -> (Context<'_, T, R>, &mut MintClaimLedger, &mut StakeLedger) {
        let now = self.clock.now_seconds();
        let ctx = Context {
            dashboard: &mut self.dashboard,
            token: &mut self.token,
            authority: &self.authority,
            rewards: &self.rewards,
            config: &self.config,
            now,
        };
        (ctx, &mut self.mints, &mut self.stakes)
    }

    // --- entry operations ---

    pub fn claim_rank(&mut self, account: &AccountId, term_days: u64) -> Result<RankClaim, XenError> {
        let (mut ctx, mints, _) = self.parts();
        mints.claim_rank(&mut ctx, account, term_days)
    }

    pub fn claim_mint_reward(&mut self, account: &AccountId) -> Result<MintSettlement, XenError> {
        let (mut ctx, mints, _) = self.parts();
        mints.claim_mint_reward(&mut ctx, account)
    }

    pub fn claim_mint_reward_stake(
        &mut self,
        account: &AccountId,
        pct: u8,
        term_days: u64,
    ) -> Result<MintSettlement, XenError> {
        let (mut ctx, mints, stakes) = self.parts();
        mints.claim_mint_reward_stake(&mut ctx, stakes, account, pct, term_days)
    }

    pub fn stake(
        &mut self,
        account: &AccountId,
        amount: u128,
        term_days: u64,
    ) -> Result<StakeOpened, XenError> {
        let (mut ctx, _, stakes) = self.parts();
        stakes.stake(&mut ctx, account, amount, term_days)
    }

    pub fn withdraw(&mut self, account: &AccountId) -> Result<StakeWithdrawal, XenError> {
        let (mut ctx, _, stakes) = self.parts();
        stakes.withdraw(&mut ctx, account)
    }

    pub fn burn(&mut self, account: &AccountId, amount: u128) -> Result<BurnReceipt, XenError> {
        let (mut ctx, _, _) = self.parts();
        burn::burn(&mut ctx, account, amount)
    }

    // --- views ---

    pub fn now(&self) -> u64 {
        self.clock.now_seconds()
    }

    /// Amplifier a claim opened now would snapshot.
    pub fn current_amplifier(&self) -> u64 {
        let supply = self.token.total_minted_supply().unwrap_or(0);
        self.rewards
            .reward_amplifier(self.dashboard.elapsed(self.now()), supply)
    }

    /// EAA rate a claim opened now would snapshot.
    pub fn current_eaa_rate(&self) -> u64 {
        self.rewards.eaa_rate(self.dashboard.global_rank())
    }

    /// APY a stake opened now would lock in.
    pub fn current_apy(&self) -> u64 {
        self.rewards.apy(self.now(), self.dashboard.genesis_ts())
    }

    /// Longest mint term accepted now, in seconds.
    pub fn current_max_term(&self) -> u64 {
        self.rewards.max_term(self.dashboard.global_rank())
    }

    /// Reward `claim_mint_reward` would pay now, ignoring maturity.
    pub fn quote_mint_reward(&self, account: &AccountId) -> Result<u128, XenError> {
        self.mints
            .quote(&self.dashboard, &self.rewards, account, self.now())
    }

    pub fn user_mint(&self, account: &AccountId) -> Option<&MintClaim> {
        self.mints.get(account)
    }

    pub fn user_stake(&self, account: &AccountId) -> Option<&StakeClaim> {
        self.stakes.get(account)
    }

    pub fn user_burns(&self, account: &AccountId) -> u128 {
        self.dashboard.user_burns(account)
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn token(&self) -> &T {
        &self.token
    }

    /// Host access to the token ledger, e.g. for transfers the engine does
    /// not model.
    pub fn token_mut(&mut self) -> &mut T {
        &mut self.token
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Copy out everything the engine owns.
    pub fn snapshot(&self) -> EngineState {
        EngineState {
            config: self.config.clone(),
            dashboard: self.dashboard.clone(),
            mints: self.mints.iter().cloned().collect(),
            stakes: self.stakes.iter().cloned().collect(),
        }
    }

    /// Tear down into the token ledger and authority, e.g. to restore a
    /// snapshot over the same ledger.
    pub fn into_parts(self) -> (T, TokenAuthority, C) {
        (self.token, self.authority, self.clock)
    }
}
