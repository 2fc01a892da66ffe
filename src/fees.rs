//! Service fee calculation
//!
//! The service fee charged for a batch is the price of one plain transfer's
//! gas at the current network gas price, once per recipient:
//!
//! fee = gas_price × 21000 × transfer_count
//!
//! The formula is the advertised fee, not an estimate of gas actually used,
//! and it is applied with integer arithmetic on `U256` throughout.

use crate::error::Result;
use crate::session::WalletSession;
use crate::types::{Amount, GAS_PER_TRANSFER};
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// Calculate the aggregate service fee
///
/// # Arguments
/// * `unit_gas_price` - Network gas price in wei per gas unit
/// * `gas_per_transfer` - Gas units charged per transfer (normally [`GAS_PER_TRANSFER`])
/// * `transfer_count` - Number of transfers in the batch
///
/// # Example
/// ```
/// use batch_sender_sdk::fees::compute_fee;
/// use batch_sender_sdk::types::{Amount, GAS_PER_TRANSFER};
///
/// let fee = compute_fee(Amount::from(1_000_000_000u64), GAS_PER_TRANSFER, 3);
/// assert_eq!(fee, Amount::from(63_000_000_000_000u64));
/// ```
pub fn compute_fee(unit_gas_price: Amount, gas_per_transfer: u64, transfer_count: usize) -> Amount {
    let fee = unit_gas_price
        .wei()
        .saturating_mul(U256::from(gas_per_transfer))
        .saturating_mul(U256::from(transfer_count as u64));
    Amount::from_wei(fee)
}

/// A priced service fee for a given batch size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeQuote {
    pub gas_price: Amount,
    pub gas_per_transfer: u64,
    pub transfer_count: usize,
    pub total: Amount,
}

impl FeeQuote {
    pub fn new(gas_price: Amount, transfer_count: usize) -> Self {
        Self {
            gas_price,
            gas_per_transfer: GAS_PER_TRANSFER,
            transfer_count,
            total: compute_fee(gas_price, GAS_PER_TRANSFER, transfer_count),
        }
    }
}

/// Ask the session for the current gas price and quote the fee for `transfer_count` transfers
pub async fn quote_fee<S>(session: &S, transfer_count: usize) -> Result<FeeQuote>
where
    S: WalletSession + ?Sized,
{
    let price = session.gas_price().await?;
    tracing::debug!("Quoted gas price {} wei for {} transfers", price.wei(), transfer_count);
    Ok(FeeQuote::new(price, transfer_count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::session::MockWalletSession;

    #[test]
    fn test_compute_fee_formula() {
        let price = Amount::from(2_000_000_000u64); // 2 gwei
        assert_eq!(
            compute_fee(price, GAS_PER_TRANSFER, 1),
            Amount::from(42_000_000_000_000u64)
        );
        assert_eq!(compute_fee(price, GAS_PER_TRANSFER, 0), Amount::ZERO);
    }

    #[test]
    fn test_compute_fee_is_linear_in_count() {
        let price = Amount::from(1_234_567u64);
        let one = compute_fee(price, GAS_PER_TRANSFER, 1);
        assert_eq!(compute_fee(price, GAS_PER_TRANSFER, 2), one + one);
        assert_eq!(
            compute_fee(price, GAS_PER_TRANSFER, 10).wei(),
            one.wei() * U256::from(10u64)
        );
    }

    #[test]
    fn test_compute_fee_beyond_f64_precision() {
        // 2^60 wei per gas; the product needs well over 53 bits
        let price = Amount::from(1u64 << 60);
        let fee = compute_fee(price, GAS_PER_TRANSFER, 7);
        let expected = U256::from(1u64 << 60) * U256::from(21_000u64) * U256::from(7u64);
        assert_eq!(fee.wei(), expected);
    }

    #[test]
    fn test_compute_fee_saturates() {
        let fee = compute_fee(Amount::from_wei(U256::MAX), GAS_PER_TRANSFER, 2);
        assert_eq!(fee.wei(), U256::MAX);
    }

    #[tokio::test]
    async fn test_quote_fee_uses_session_price() {
        let mut session = MockWalletSession::new();
        session
            .expect_gas_price()
            .times(1)
            .returning(|| Ok(Amount::from(100u64)));

        let quote = quote_fee(&session, 4).await.unwrap();
        assert_eq!(quote.gas_price, Amount::from(100u64));
        assert_eq!(quote.total, Amount::from(100u64 * 21_000 * 4));
        assert_eq!(quote.transfer_count, 4);
    }

    #[tokio::test]
    async fn test_quote_fee_propagates_errors() {
        let mut session = MockWalletSession::new();
        session
            .expect_gas_price()
            .returning(|| Err(Error::Rpc("method not supported".to_string())));

        assert!(matches!(quote_fee(&session, 1).await, Err(Error::Rpc(_))));
    }
}
