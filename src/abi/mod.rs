//! Minimal Solidity ABI codec.
//!
//! Covers exactly the call surface of the migration: static `address`,
//! `uint256`, `bool` parameters, dynamic `string` and `bytes` (needed by the
//! Compound-style timelock), and decoding of static return words and
//! `Error(string)` revert payloads. Not a general ABI implementation.

use crate::domain::error::Error;
use crate::domain::types::{Address, U256};
use sha3::{Digest, Keccak256};

/// ABI word size
const WORD: usize = 32;

/// `Error(string)` selector, prepended to revert reason payloads by solc.
pub const ERROR_STRING_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

/// First 4 bytes of keccak-256 of the canonical signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = Keccak256::digest(signature.as_bytes());
    let mut sel = [0u8; 4];
    sel.copy_from_slice(&hash[..4]);
    sel
}

/// A value to be ABI-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Address(Address),
    Uint(U256),
    Bool(bool),
    Bytes(Vec<u8>),
    String(String),
}

impl Token {
    fn is_dynamic(&self) -> bool {
        matches!(self, Token::Bytes(_) | Token::String(_))
    }

    /// 32-byte head word for a static token.
    fn head_word(&self) -> [u8; 32] {
        let mut word = [0u8; WORD];
        match self {
            Token::Address(addr) => word[12..].copy_from_slice(addr.as_bytes()),
            Token::Uint(value) => word = value.to_be_bytes(),
            Token::Bool(flag) => word[31] = u8::from(*flag),
            Token::Bytes(_) | Token::String(_) => unreachable!("dynamic token has no head word"),
        }
        word
    }

    /// Length-prefixed, right-padded tail for a dynamic token.
    fn tail(&self) -> Vec<u8> {
        let payload = match self {
            Token::Bytes(bytes) => bytes.as_slice(),
            Token::String(string) => string.as_bytes(),
            _ => return Vec::new(),
        };
        let padded_len = payload.len().div_ceil(WORD) * WORD;
        let mut tail = Vec::with_capacity(WORD + padded_len);
        tail.extend_from_slice(&U256::from(payload.len() as u64).to_be_bytes());
        tail.extend_from_slice(payload);
        tail.resize(WORD + padded_len, 0);
        tail
    }
}

/// Standard head/tail encoding of a parameter tuple.
pub fn encode(tokens: &[Token]) -> Vec<u8> {
    let head_len = tokens.len() * WORD;
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for token in tokens {
        if token.is_dynamic() {
            let offset = U256::from((head_len + tail.len()) as u64);
            head.extend_from_slice(&offset.to_be_bytes());
            tail.extend_from_slice(&token.tail());
        } else {
            head.extend_from_slice(&token.head_word());
        }
    }

    head.extend_from_slice(&tail);
    head
}

/// Selector-prefixed calldata for `signature` applied to `tokens`.
pub fn encode_call(signature: &str, tokens: &[Token]) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + tokens.len() * WORD);
    data.extend_from_slice(&selector(signature));
    data.extend_from_slice(&encode(tokens));
    data
}

/// Decode a single uint256 return word.
pub fn decode_uint(data: &[u8]) -> Result<U256, Error> {
    let word = return_word(data)?;
    Ok(U256::from_be_slice(word))
}

/// Decode a single bool return word.
///
/// solc emits 0 or 1; a word with nonzero upper bytes is malformed.
pub fn decode_bool(data: &[u8]) -> Result<bool, Error> {
    let word = return_word(data)?;
    if word[..31].iter().any(|&b| b != 0) {
        return Err(Error::Abi("malformed bool word".into()));
    }
    Ok(word[31] != 0)
}

/// Decode a single address return word.
pub fn decode_address(data: &[u8]) -> Result<Address, Error> {
    let word = return_word(data)?;
    if word[..12].iter().any(|&b| b != 0) {
        return Err(Error::Abi("malformed address word".into()));
    }
    Ok(Address::from_slice(&word[12..]))
}

fn return_word(data: &[u8]) -> Result<&[u8], Error> {
    data.get(..WORD)
        .ok_or_else(|| Error::Abi(format!("return data too short: {} bytes", data.len())))
}

/// Extract the human-readable reason from an `Error(string)` revert payload.
///
/// Returns `None` for empty reverts, custom errors, and panics.
pub fn decode_revert_reason(data: &[u8]) -> Option<String> {
    let body = data.strip_prefix(ERROR_STRING_SELECTOR.as_slice())?;
    let offset = word_to_usize(body.get(..WORD)?)?;
    let len = word_to_usize(body.get(offset..offset + WORD)?)?;
    let payload = body.get(offset + WORD..offset.checked_add(WORD + len)?)?;
    String::from_utf8(payload.to_vec()).ok()
}

/// Word to usize without the panic `U256::as_u64` carries on overflow.
fn word_to_usize(word: &[u8]) -> Option<usize> {
    let value = U256::from_be_slice(word);
    if value > U256::from(u32::MAX as u64) {
        return None;
    }
    Some(value.as_u64() as usize)
}

/// Build an `Error(string)` payload. Test doubles use this to simulate
/// node-side reverts with reasons.
pub fn encode_error_string(reason: &str) -> Vec<u8> {
    let mut data = ERROR_STRING_SELECTOR.to_vec();
    data.extend_from_slice(&encode(&[Token::String(reason.to_string())]));
    data
}

/// Contract address for a CREATE deployment.
///
/// Address = keccak256(rlp([sender, nonce]))[12..], per Yellow Paper section 7.
/// Fallback for dev nodes whose receipts omit `contractAddress`.
#[must_use]
pub fn compute_contract_address(sender: Address, nonce: u64) -> Address {
    let mut content = Vec::with_capacity(32);

    // RLP address (20 bytes, 0x80 + 20 = 0x94)
    content.push(0x94);
    content.extend_from_slice(sender.as_bytes());

    // RLP nonce
    if nonce == 0 {
        content.push(0x80);
    } else if nonce < 128 {
        content.push(nonce as u8);
    } else {
        let bytes = nonce.to_be_bytes();
        let start = bytes.iter().position(|&b| b != 0).unwrap_or(7);
        content.push(0x80 + (bytes.len() - start) as u8);
        content.extend_from_slice(&bytes[start..]);
    }

    // List header; content is always < 56 bytes here
    let mut rlp_data = Vec::with_capacity(content.len() + 1);
    rlp_data.push(0xc0 + content.len() as u8);
    rlp_data.extend_from_slice(&content);

    let hash = Keccak256::digest(&rlp_data);
    Address::from_slice(&hash[12..32])
}
