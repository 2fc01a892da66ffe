//! JSON-RPC wire types for the wallet session methods the SDK uses

use crate::error::{Error, Result};
use crate::types::Amount;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize, Serializer};

/// `eth_sendTransaction`
pub const METHOD_SEND_TRANSACTION: &str = "eth_sendTransaction";
/// `eth_gasPrice`
pub const METHOD_GAS_PRICE: &str = "eth_gasPrice";
/// `eth_chainId`
pub const METHOD_CHAIN_ID: &str = "eth_chainId";
/// `eth_accounts`
pub const METHOD_ACCOUNTS: &str = "eth_accounts";

/// RPC request structure
#[derive(Debug, Serialize)]
pub(crate) struct RpcRequest {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    pub params: serde_json::Value,
}

/// RPC response structure
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub(crate) struct RpcResponse<T> {
    pub jsonrpc: String,
    pub id: u64,
    pub result: Option<T>,
    pub error: Option<RpcError>,
}

/// RPC error structure
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub(crate) struct RpcError {
    pub code: i32,
    pub message: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

/// Parameters of a native-value `eth_sendTransaction` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SendTransactionRequest {
    #[serde(serialize_with = "checksummed")]
    pub from: Address,
    #[serde(serialize_with = "checksummed")]
    pub to: Address,
    #[serde(serialize_with = "quantity")]
    pub value: U256,
}

impl SendTransactionRequest {
    /// A value-only transfer with no calldata
    pub fn transfer(from: Address, to: Address, amount: Amount) -> Self {
        Self {
            from,
            to,
            value: amount.wei(),
        }
    }
}

/// Result of `eth_gasPrice`: a hex-encoded wei-per-gas quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct GasPriceResponse(pub U256);

impl TryFrom<String> for GasPriceResponse {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        parse_quantity(&value).map(GasPriceResponse)
    }
}

impl From<GasPriceResponse> for Amount {
    fn from(price: GasPriceResponse) -> Self {
        Amount::from_wei(price.0)
    }
}

/// Parse a `0x`-prefixed hex quantity
pub fn parse_quantity(value: &str) -> Result<U256> {
    let digits = value
        .trim()
        .strip_prefix("0x")
        .ok_or_else(|| Error::Rpc(format!("Quantity is not 0x-prefixed: {}", value)))?;
    if digits.is_empty() {
        return Err(Error::Rpc("Empty quantity".to_string()));
    }
    U256::from_str_radix(digits, 16)
        .map_err(|e| Error::Rpc(format!("Invalid quantity {}: {}", value, e)))
}

/// Parse a hex chain id as returned by `eth_chainId`
pub fn parse_chain_id(value: &str) -> Result<u64> {
    let quantity = parse_quantity(value)?;
    u64::try_from(quantity).map_err(|_| Error::Rpc(format!("Chain id out of range: {}", value)))
}

fn quantity<S: Serializer>(value: &U256, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("0x{:x}", value))
}

fn checksummed<S: Serializer>(address: &Address, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&address.to_checksum(None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::parse_address;

    #[test]
    fn test_send_transaction_request_wire_format() {
        let from = parse_address("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").unwrap();
        let to = parse_address("0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359").unwrap();
        let request = SendTransactionRequest::transfer(from, to, Amount::parse_ether("1").unwrap());

        let json = serde_json::to_value(request).unwrap();
        assert_eq!(json["from"], "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
        assert_eq!(json["to"], "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359");
        assert_eq!(json["value"], "0xde0b6b3a7640000");
    }

    #[test]
    fn test_zero_value_quantity() {
        let request = SendTransactionRequest {
            from: Address::ZERO,
            to: Address::ZERO,
            value: U256::ZERO,
        };
        let json = serde_json::to_value(request).unwrap();
        assert_eq!(json["value"], "0x0");
    }

    #[test]
    fn test_gas_price_response() {
        let price: GasPriceResponse = serde_json::from_str("\"0x3b9aca00\"").unwrap();
        assert_eq!(Amount::from(price), Amount::from(1_000_000_000u64));

        assert!(serde_json::from_str::<GasPriceResponse>("\"1000\"").is_err());
        assert!(serde_json::from_str::<GasPriceResponse>("\"0xzz\"").is_err());
        assert!(serde_json::from_str::<GasPriceResponse>("42").is_err());
    }

    #[test]
    fn test_parse_chain_id() {
        assert_eq!(parse_chain_id("0x2105").unwrap(), 8453);
        assert_eq!(parse_chain_id("0x14A34").unwrap(), 84532);
        assert!(parse_chain_id("0x").is_err());
        assert!(parse_chain_id("8453").is_err());
    }
}
