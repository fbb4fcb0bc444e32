//! Wire types shared by every RPC namespace.
//!
//! All types follow Ethereum JSON-RPC conventions with hex string serialization.

use primitive_types::U256 as PrimitiveU256;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

// Re-export primitive types for convenience
pub use primitive_types::{H160 as Address, H256 as Hash};

/// U256 wrapper with hex string serialization for JSON-RPC compatibility.
///
/// Serializes as `"0x..."` hex string, deserializes from hex string, decimal
/// string, or number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct U256(pub PrimitiveU256);

impl U256 {
    pub const ZERO: U256 = U256(PrimitiveU256::zero());
    pub const ONE: U256 = U256(PrimitiveU256::one());
    pub const MAX: U256 = U256(PrimitiveU256::MAX);

    #[inline]
    pub fn from_dec_str(s: &str) -> Result<Self, &'static str> {
        PrimitiveU256::from_dec_str(s)
            .map(U256)
            .map_err(|_| "invalid decimal string")
    }

    /// `n` whole tokens at the conventional 18-decimal scale.
    #[inline]
    pub fn ether(n: u64) -> Self {
        U256(PrimitiveU256::from(n) * PrimitiveU256::exp10(18))
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0.as_u64()
    }

    #[inline]
    pub fn into_inner(self) -> PrimitiveU256 {
        self.0
    }

    #[inline]
    pub fn saturating_add(self, other: Self) -> Self {
        U256(self.0.saturating_add(other.0))
    }

    #[inline]
    pub fn saturating_sub(self, other: Self) -> Self {
        U256(self.0.saturating_sub(other.0))
    }

    #[inline]
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(U256)
    }

    /// Big-endian 32-byte representation, as laid out in ABI words.
    #[inline]
    pub fn to_be_bytes(self) -> [u8; 32] {
        let mut buf = [0u8; 32];
        self.0.to_big_endian(&mut buf);
        buf
    }

    #[inline]
    pub fn from_be_slice(slice: &[u8]) -> Self {
        U256(PrimitiveU256::from_big_endian(slice))
    }
}

impl From<u64> for U256 {
    fn from(v: u64) -> Self {
        U256(PrimitiveU256::from(v))
    }
}

impl From<u128> for U256 {
    fn from(v: u128) -> Self {
        U256(PrimitiveU256::from(v))
    }
}

impl From<PrimitiveU256> for U256 {
    fn from(v: PrimitiveU256) -> Self {
        U256(v)
    }
}

impl From<U256> for PrimitiveU256 {
    fn from(v: U256) -> Self {
        v.0
    }
}

impl Add for U256 {
    type Output = U256;

    fn add(self, rhs: Self) -> Self {
        U256(self.0 + rhs.0)
    }
}

impl Sub for U256 {
    type Output = U256;

    fn sub(self, rhs: Self) -> Self {
        U256(self.0 - rhs.0)
    }
}

impl fmt::Display for U256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

impl Serialize for U256 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Always serialize as hex string with 0x prefix
        serializer.serialize_str(&format!("0x{:x}", self.0))
    }
}

impl<'de> Deserialize<'de> for U256 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct U256Visitor;

        impl<'de> de::Visitor<'de> for U256Visitor {
            type Value = U256;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a hex string starting with 0x or a number")
            }

            fn visit_str<E>(self, value: &str) -> Result<U256, E>
            where
                E: de::Error,
            {
                if let Some(hex_str) = value
                    .strip_prefix("0x")
                    .or_else(|| value.strip_prefix("0X"))
                {
                    PrimitiveU256::from_str(hex_str)
                        .map(U256)
                        .map_err(|_| de::Error::custom("invalid hex string for U256"))
                } else {
                    PrimitiveU256::from_dec_str(value)
                        .map(U256)
                        .map_err(|_| de::Error::custom("invalid decimal string for U256"))
                }
            }

            fn visit_u64<E>(self, value: u64) -> Result<U256, E>
            where
                E: de::Error,
            {
                Ok(U256::from(value))
            }

            fn visit_u128<E>(self, value: u128) -> Result<U256, E>
            where
                E: de::Error,
            {
                Ok(U256::from(value))
            }
        }

        deserializer.deserialize_any(U256Visitor)
    }
}

/// Bytes wrapper with hex serialization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bytes(pub Vec<u8>);

impl Bytes {
    pub fn new() -> Self {
        Bytes(Vec::new())
    }

    pub fn from_slice(slice: &[u8]) -> Self {
        Bytes(slice.to_vec())
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(v: Vec<u8>) -> Self {
        Bytes(v)
    }
}

impl From<&[u8]> for Bytes {
    fn from(v: &[u8]) -> Self {
        Bytes(v.to_vec())
    }
}

impl AsRef<[u8]> for Bytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

impl Serialize for Bytes {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("0x{}", hex::encode(&self.0)))
    }
}

impl<'de> Deserialize<'de> for Bytes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let s = s.strip_prefix("0x").unwrap_or(&s);
        hex::decode(s)
            .map(Bytes)
            .map_err(|_| de::Error::custom("invalid hex bytes"))
    }
}

/// Block tags for JSON-RPC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockTag {
    #[default]
    Latest,
    Earliest,
    Pending,
}

impl BlockTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockTag::Latest => "latest",
            BlockTag::Earliest => "earliest",
            BlockTag::Pending => "pending",
        }
    }
}

impl Serialize for BlockTag {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BlockTag {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.to_lowercase().as_str() {
            "latest" => Ok(BlockTag::Latest),
            "earliest" => Ok(BlockTag::Earliest),
            "pending" => Ok(BlockTag::Pending),
            _ => Err(de::Error::custom("invalid block tag")),
        }
    }
}

/// Transaction call object for eth_call and eth_sendTransaction.
///
/// `to` is absent for contract creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Bytes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<U256>,
}

impl CallRequest {
    /// Read-only call against `to`.
    pub fn read(to: Address, data: Vec<u8>) -> Self {
        Self {
            to: Some(to),
            data: Some(Bytes(data)),
            ..Default::default()
        }
    }

    /// State-changing call from `from` against `to`.
    pub fn write(from: Address, to: Address, data: Vec<u8>) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
            data: Some(Bytes(data)),
            ..Default::default()
        }
    }

    /// Contract creation carrying `init_code` from `from`.
    pub fn create(from: Address, init_code: Vec<u8>) -> Self {
        Self {
            from: Some(from),
            data: Some(Bytes(init_code)),
            ..Default::default()
        }
    }
}

/// The subset of the transaction receipt the migration driver reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: Hash,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<U256>,
    /// Set for contract-creation transactions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<Address>,
    /// 1 = success, 0 = reverted (post-Byzantium).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_used: Option<U256>,
}

impl TransactionReceipt {
    pub fn succeeded(&self) -> bool {
        match self.status {
            Some(status) => !status.is_zero(),
            // Pre-Byzantium receipts carry no status; treat inclusion as success
            None => true,
        }
    }
}
