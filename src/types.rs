//! Common types, protocol constants and amount arithmetic for the Batch Sender SDK

use alloy_primitives::{address, Address, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use thiserror::Error;

/// Chain id of Base Mainnet (`0x2105`)
pub const BASE_MAINNET_CHAIN_ID: u64 = 0x2105;

/// Chain id of Base Sepolia (`0x14A34`)
pub const BASE_SEPOLIA_CHAIN_ID: u64 = 0x14A34;

/// Destination of every service fee transfer
pub const SERVICE_FEE_COLLECTOR: Address = address!("75F387d2351785174f20474308C71E578feFCFF6");

/// Gas units charged per native transfer, used for the service fee formula
pub const GAS_PER_TRANSFER: u64 = 21_000;

/// Decimal exponent of the native currency (1 ETH = 10^18 wei)
pub const NATIVE_DECIMALS: u32 = 18;

const WEI_PER_ETHER: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// Networks a batch may be submitted on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Network {
    #[default]
    BaseMainnet,
    BaseSepolia,
}

impl Network {
    /// All accepted networks, production first
    pub const ALL: [Network; 2] = [Network::BaseMainnet, Network::BaseSepolia];

    pub fn chain_id(&self) -> u64 {
        match self {
            Network::BaseMainnet => BASE_MAINNET_CHAIN_ID,
            Network::BaseSepolia => BASE_SEPOLIA_CHAIN_ID,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Network::BaseMainnet => "Base Mainnet",
            Network::BaseSepolia => "Base Sepolia",
        }
    }

    pub fn is_testnet(&self) -> bool {
        matches!(self, Network::BaseSepolia)
    }

    /// Map a chain id onto an accepted network, if it is one
    pub fn from_chain_id(chain_id: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|n| n.chain_id() == chain_id)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Human-readable name for any chain id
pub fn network_name(chain_id: u64) -> &'static str {
    Network::from_chain_id(chain_id)
        .map(|n| n.name())
        .unwrap_or("Unknown Network")
}

/// Why a textual amount could not be turned into wei
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountParseError {
    #[error("amount is empty")]
    Empty,
    #[error("amount is not a decimal number")]
    Malformed,
    #[error("amount has more than {NATIVE_DECIMALS} decimal places")]
    TooPrecise,
    #[error("amount is negative")]
    Negative,
    #[error("amount does not fit in 256 bits of wei")]
    TooLarge,
}

/// A quantity of the native currency in its smallest unit (wei).
///
/// All arithmetic is integer arithmetic on `U256`. Decimal text is parsed
/// exactly: a value with more fractional digits than the currency has is
/// rejected rather than rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Amount(U256);

impl Amount {
    pub const ZERO: Amount = Amount(U256::ZERO);

    pub const fn from_wei(wei: U256) -> Self {
        Amount(wei)
    }

    pub fn wei(&self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Parse a display-unit decimal such as `"0.1"` or `"12"` into wei
    ///
    /// # Example
    /// ```
    /// use batch_sender_sdk::types::Amount;
    /// use alloy_primitives::U256;
    ///
    /// let amount = Amount::parse_ether("0.1").unwrap();
    /// assert_eq!(amount.wei(), U256::from(100_000_000_000_000_000u64));
    /// ```
    pub fn parse_ether(text: &str) -> std::result::Result<Self, AmountParseError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AmountParseError::Empty);
        }

        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));
        let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if !is_digits(whole) || !is_digits(frac) || (whole.is_empty() && frac.is_empty()) {
            return Err(AmountParseError::Malformed);
        }

        let frac = frac.trim_end_matches('0');
        if frac.len() > NATIVE_DECIMALS as usize {
            return Err(AmountParseError::TooPrecise);
        }

        let scale = U256::from(10u64).pow(U256::from(NATIVE_DECIMALS as usize - frac.len()));
        let whole = parse_digits(whole)?;
        let frac = parse_digits(frac)?;
        if negative && !(whole.is_zero() && frac.is_zero()) {
            return Err(AmountParseError::Negative);
        }

        whole
            .checked_mul(WEI_PER_ETHER)
            .and_then(|w| w.checked_add(frac * scale))
            .map(Amount)
            .ok_or(AmountParseError::TooLarge)
    }

    /// Shortest exact decimal representation in display units
    pub fn to_ether_string(&self) -> String {
        let (whole, frac) = self.split();
        if frac.is_zero() {
            return whole.to_string();
        }
        let frac = format!("{:0>width$}", frac.to_string(), width = NATIVE_DECIMALS as usize);
        format!("{}.{}", whole, frac.trim_end_matches('0'))
    }

    /// Display-unit string with a fixed number of decimal places, truncated
    pub fn format_ether(&self, places: usize) -> String {
        let places = places.min(NATIVE_DECIMALS as usize);
        let (whole, frac) = self.split();
        if places == 0 {
            return whole.to_string();
        }
        let frac = format!("{:0>width$}", frac.to_string(), width = NATIVE_DECIMALS as usize);
        format!("{}.{}", whole, &frac[..places])
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    pub fn saturating_add(self, other: Amount) -> Amount {
        Amount(self.0.saturating_add(other.0))
    }

    fn split(&self) -> (U256, U256) {
        (self.0 / WEI_PER_ETHER, self.0 % WEI_PER_ETHER)
    }
}

/// Unsigned decimal digits into `U256`; an empty string is zero
fn parse_digits(digits: &str) -> std::result::Result<U256, AmountParseError> {
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 10).map_err(|_| AmountParseError::TooLarge)
}

impl From<U256> for Amount {
    fn from(wei: U256) -> Self {
        Amount(wei)
    }
}

impl From<u64> for Amount {
    fn from(wei: u64) -> Self {
        Amount(U256::from(wei))
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        self.saturating_add(rhs)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::ZERO, Amount::saturating_add)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ETH", self.to_ether_string())
    }
}

/// Display helpers
pub mod utils {
    use alloy_primitives::Address;

    /// Keep the first `keep_start` and last `keep_end` characters, replacing the middle with '…'.
    pub fn redact_middle(input: &str, keep_start: usize, keep_end: usize) -> String {
        if input.len() <= keep_start + keep_end + 1 {
            return input.to_string();
        }
        let start = &input[..keep_start];
        let end = &input[input.len() - keep_end..];
        format!("{start}…{end}")
    }

    /// Shortened checksummed address for logs and status lines (e.g. `0x75F3…CFF6`)
    pub fn short_address(address: &Address) -> String {
        redact_middle(&address.to_checksum(None), 6, 4)
    }
}
