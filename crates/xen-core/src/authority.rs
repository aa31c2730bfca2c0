//! Mint and burn capabilities.
//!
//! Only a holder of [`MintCapability`] can inflate supply and only a holder
//! of [`BurnCapability`] can deflate it. Neither type is `Clone` or
//! constructible outside this module; the single way to obtain them is
//! [`TokenAuthority::acquire`], which succeeds once per ledger because the
//! ledger refuses a second token initialization.

use crate::error::LedgerError;
use crate::traits::TokenLedger;
use crate::types::TokenInfo;

/// Proof of the right to mint. Passed by reference to [`TokenLedger::mint`].
#[derive(Debug)]
pub struct MintCapability {
    _sealed: (),
}

/// Proof of the right to burn. Passed by reference to [`TokenLedger::burn_from`].
#[derive(Debug)]
pub struct BurnCapability {
    _sealed: (),
}

/// The pair of capabilities held by the engine for the process lifetime.
#[derive(Debug)]
pub struct TokenAuthority {
    mint: MintCapability,
    burn: BurnCapability,
}

impl TokenAuthority {
    /// Register the token type on `ledger` and take its capabilities.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::AlreadyInitialized`] if the token type was already
    ///   registered, i.e. someone else already holds the capabilities.
    pub fn acquire<L: TokenLedger + ?Sized>(
        ledger: &mut L,
        info: &TokenInfo,
    ) -> Result<Self, LedgerError> {
        ledger.initialize(info)?;
        Ok(Self {
            mint: MintCapability { _sealed: () },
            burn: BurnCapability { _sealed: () },
        })
    }

    pub fn mint_cap(&self) -> &MintCapability {
        &self.mint
    }

    pub fn burn_cap(&self) -> &BurnCapability {
        &self.burn
    }
}
