//! Account identities, per-account records, and operation receipts.
//!
//! All token amounts are in base units (1 XEN = 10^8 units).
//! Timestamps are Unix seconds supplied by the host clock.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{SECONDS_IN_DAY, TOKEN_DECIMALS, TOKEN_NAME, TOKEN_SYMBOL};

/// A 32-byte account identity.
///
/// The engine never interprets the bytes; they only key the per-account
/// records and are handed to the token ledger unchanged. Serializes as a
/// hex string.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
    bincode::Encode, bincode::Decode,
)]
#[serde(into = "String", try_from = "String")]
pub struct AccountId(pub [u8; 32]);

impl AccountId {
    /// The all-zero account. Default protocol treasury.
    pub const ZERO: Self = Self([0u8; 32]);

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Deterministic identity derived from a human-readable label (BLAKE3).
    ///
    /// # Examples
    ///
    /// ```
    /// use xen_core::types::AccountId;
    /// assert_eq!(AccountId::from_label("alice"), AccountId::from_label("alice"));
    /// assert_ne!(AccountId::from_label("alice"), AccountId::from_label("bob"));
    /// ```
    pub fn from_label(label: &str) -> Self {
        Self(*blake3::hash(label.as_bytes()).as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for AccountId {
    type Err = hex::FromHexError;

    /// Parse 64 hex characters, with or without a `0x` prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for AccountId {
    type Error = hex::FromHexError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<[u8; 32]> for AccountId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// Metadata registered with the token ledger at initialization.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, bincode::Encode, bincode::Decode)]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl Default for TokenInfo {
    fn default() -> Self {
        Self {
            name: TOKEN_NAME.to_string(),
            symbol: TOKEN_SYMBOL.to_string(),
            decimals: TOKEN_DECIMALS,
        }
    }
}

/// Lifecycle of a mint claim.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, bincode::Encode, bincode::Decode,
)]
pub enum ClaimStatus {
    Open,
    /// Terminal. The record stays behind as a tombstone until the next
    /// `claim_rank` replaces it.
    Settled,
}

/// An account's rank claim, snapshotting the reward parameters in force
/// when it was opened.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, bincode::Encode, bincode::Decode)]
pub struct MintClaim {
    pub owner: AccountId,
    /// Requested term in days. Reset to 0 on settlement.
    pub term: u64,
    pub maturity_ts: u64,
    pub rank: u64,
    pub amplifier: u64,
    /// Per-mille EAA bonus.
    pub eaa_rate: u64,
    pub status: ClaimStatus,
}

impl MintClaim {
    pub fn is_open(&self) -> bool {
        self.status == ClaimStatus::Open
    }

    pub fn is_matured(&self, now: u64) -> bool {
        now >= self.maturity_ts
    }

    /// Seconds past maturity at `now`; zero before maturity.
    pub fn seconds_late(&self, now: u64) -> u64 {
        now.saturating_sub(self.maturity_ts)
    }

    pub fn term_secs(&self) -> u64 {
        self.term.saturating_mul(SECONDS_IN_DAY)
    }
}

/// An account's staking position. `amount == 0` means withdrawn.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, bincode::Encode, bincode::Decode)]
pub struct StakeClaim {
    pub owner: AccountId,
    /// Lock length in days.
    pub term: u64,
    pub maturity_ts: u64,
    pub amount: u128,
    /// APY in hundredths of a percent, fixed at open time.
    pub apy: u64,
}

impl StakeClaim {
    pub fn is_open(&self) -> bool {
        self.amount > 0
    }

    pub fn is_matured(&self, now: u64) -> bool {
        now >= self.maturity_ts
    }
}

// ---------------------------------------------------------------------------
// Receipts
// ---------------------------------------------------------------------------

/// Result of a successful `claim_rank`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RankClaim {
    pub account: AccountId,
    pub rank: u64,
    pub term: u64,
    pub maturity_ts: u64,
    pub amplifier: u64,
    pub eaa_rate: u64,
}

/// Result of settling a mint claim, with or without a follow-on stake.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct MintSettlement {
    pub account: AccountId,
    /// Net reward after the late-settlement penalty.
    pub reward: u128,
    /// Portion minted to the account.
    pub own: u128,
    /// Portion locked into a new stake (0 for a plain settlement).
    pub staked: u128,
    /// Protocol reserve minted to the treasury.
    pub reserve: u128,
    pub penalty_pct: u64,
    pub stake: Option<StakeOpened>,
}

/// Result of opening a stake position.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct StakeOpened {
    pub account: AccountId,
    pub amount: u128,
    pub term: u64,
    pub maturity_ts: u64,
    pub apy: u64,
}

/// Result of withdrawing a stake position.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct StakeWithdrawal {
    pub account: AccountId,
    pub principal: u128,
    /// Yield on top of principal; 0 for an early withdrawal.
    pub yield_amount: u128,
    /// `principal + yield_amount`, minted back to the account.
    pub payout: u128,
    pub matured: bool,
}

/// Result of a proof-of-burn.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct BurnReceipt {
    pub account: AccountId,
    pub amount: u128,
    /// Cumulative burns recorded for the account after this one.
    pub total_burned: u128,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claim(maturity_ts: u64) -> MintClaim {
        MintClaim {
            owner: AccountId::from_label("a"),
            term: 10,
            maturity_ts,
            rank: 0,
            amplifier: 3_000,
            eaa_rate: 100,
            status: ClaimStatus::Open,
        }
    }

    #[test]
    fn account_hex_roundtrip() {
        let id = AccountId::from_label("treasury");
        let parsed: AccountId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        let prefixed: AccountId = format!("0x{id}").parse().unwrap();
        assert_eq!(prefixed, id);
    }

    #[test]
    fn account_parse_rejects_short_input() {
        assert!("abcd".parse::<AccountId>().is_err());
    }

    #[test]
    fn zero_account() {
        assert!(AccountId::ZERO.is_zero());
        assert!(!AccountId::from_label("x").is_zero());
        assert_eq!(AccountId::default(), AccountId::ZERO);
    }

    #[test]
    fn maturity_is_inclusive() {
        let c = claim(100);
        assert!(!c.is_matured(99));
        assert!(c.is_matured(100));
        assert_eq!(c.seconds_late(99), 0);
        assert_eq!(c.seconds_late(150), 50);
    }

    #[test]
    fn term_secs_from_days() {
        assert_eq!(claim(0).term_secs(), 10 * SECONDS_IN_DAY);
    }

    #[test]
    fn stake_open_tracks_amount() {
        let mut s = StakeClaim {
            owner: AccountId::ZERO,
            term: 1,
            maturity_ts: 10,
            amount: 5,
            apy: 2_000,
        };
        assert!(s.is_open());
        s.amount = 0;
        assert!(!s.is_open());
    }

    #[test]
    fn account_serializes_as_hex_string() {
        let id = AccountId::from_label("a");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
        let back: AccountId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn records_serialize_to_json() {
        let json = serde_json::to_string(&claim(1)).unwrap();
        let back: MintClaim = serde_json::from_str(&json).unwrap();
        assert_eq!(back, claim(1));
    }

    #[test]
    fn default_token_info() {
        let info = TokenInfo::default();
        assert_eq!(info.symbol, "XEN");
        assert_eq!(info.decimals, 8);
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(256))]

            #[test]
            fn account_text_and_json_roundtrip(bytes in any::<[u8; 32]>()) {
                let id = AccountId::from_bytes(bytes);
                let text = id.to_string();
                prop_assert_eq!(text.len(), 64);
                prop_assert_eq!(text.parse::<AccountId>().unwrap(), id);
                prop_assert_eq!(format!("0x{text}").parse::<AccountId>().unwrap(), id);
                let json = serde_json::to_string(&id).unwrap();
                prop_assert_eq!(serde_json::from_str::<AccountId>(&json).unwrap(), id);
            }

            #[test]
            fn lateness_starts_at_maturity(maturity in any::<u64>(), now in any::<u64>()) {
                let c = MintClaim { maturity_ts: maturity, ..claim(0) };
                prop_assert_eq!(c.is_matured(now), now >= maturity);
                prop_assert_eq!(c.seconds_late(now) > 0, now > maturity);
                prop_assert!(c.seconds_late(now) <= now);
            }
        }
    }
}
