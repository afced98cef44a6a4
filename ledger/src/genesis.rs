//! Initial token distributions.
//!
//! The staking token launches with a fixed pre-mint to a set of genesis
//! holders; the reference currency launches empty and is faucet-minted by its
//! owner.

use diva_types::{Address, DIVA_UNIT};
use serde::{Deserialize, Serialize};

/// Pre-mint per genesis holder of the staking token: 100 000 000 DIVA.
pub const DIVA_GENESIS_ALLOCATION: u128 = 100_000_000 * DIVA_UNIT;

/// Ledger address of the staking token.
pub const DIVA_TOKEN_ADDRESS: &str = "diva_divatoken";

/// Ledger address of the reference currency.
pub const MOCK_USDC_ADDRESS: &str = "diva_mockusdc";

/// Token metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// How a ledger starts out.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisConfig {
    pub metadata: TokenMetadata,
    pub ledger_address: Address,
    pub chain_id: u64,
    /// Accounts credited at genesis, with their amounts.
    pub allocations: Vec<(Address, u128)>,
    /// Accounts allowed to mint after genesis.
    pub minters: Vec<Address>,
}

impl GenesisConfig {
    /// The staking token: "DivaToken"/"DIVA", 18 decimals, each holder pre-minted
    /// [`DIVA_GENESIS_ALLOCATION`].
    pub fn diva_token(chain_id: u64, holders: &[Address]) -> Self {
        Self {
            metadata: TokenMetadata {
                name: "DivaToken".to_string(),
                symbol: "DIVA".to_string(),
                decimals: 18,
            },
            ledger_address: Address::new(DIVA_TOKEN_ADDRESS),
            chain_id,
            allocations: holders
                .iter()
                .map(|h| (h.clone(), DIVA_GENESIS_ALLOCATION))
                .collect(),
            minters: Vec::new(),
        }
    }

    /// The reference currency: "MockUSDC"/"MUSDC", 6 decimals, no supply,
    /// `owner` may mint.
    pub fn mock_usdc(chain_id: u64, owner: &Address) -> Self {
        Self {
            metadata: TokenMetadata {
                name: "MockUSDC".to_string(),
                symbol: "MUSDC".to_string(),
                decimals: 6,
            },
            ledger_address: Address::new(MOCK_USDC_ADDRESS),
            chain_id,
            allocations: Vec::new(),
            minters: vec![owner.clone()],
        }
    }
}
