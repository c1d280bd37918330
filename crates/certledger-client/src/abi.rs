//! ABI encoding for the certificate registry contract.
//!
//! The contract exposes three functions:
//!
//! ```text
//! verify(bytes32 _certificateHash) view returns (bool)
//! registerCertificate(bytes32 _certificateHash, string _metadata)
//! getCertificateInfo(bytes32 _certificateHash) view
//!     returns (address registrar, uint256 timestamp, string metadata, bool exists)
//! ```
//!
//! Only the handful of shapes these need are implemented: static words,
//! one dynamic string, and the `Error(string)` revert payload.

use certledger_core::{digest, Address, CertificateDigest, LedgerRecord};

use crate::error::{LedgerError, Result};

/// Solidity signature of the existence check.
pub const VERIFY_SIGNATURE: &str = "verify(bytes32)";

/// Solidity signature of the registration write.
pub const REGISTER_SIGNATURE: &str = "registerCertificate(bytes32,string)";

/// Solidity signature of the record lookup.
pub const INFO_SIGNATURE: &str = "getCertificateInfo(bytes32)";

/// Name of the write function, as shown to humans registering by hand.
pub const REGISTER_FUNCTION: &str = "registerCertificate";

/// Parameters of the write function, in order.
pub const REGISTER_PARAMS: &str = "bytes32 _certificateHash, string _metadata";

/// Selector of the standard `Error(string)` revert payload.
pub const ERROR_STRING_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

const WORD: usize = 32;

/// First four bytes of Keccak256 of a function signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = digest(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&hash.as_bytes()[..4]);
    out
}

/// Encode a call to a function taking a single `bytes32`.
pub fn encode_digest_call(signature: &str, digest: &CertificateDigest) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + WORD);
    out.extend_from_slice(&selector(signature));
    out.extend_from_slice(digest.as_bytes());
    out
}

/// Encode `registerCertificate(digest, metadata)`.
pub fn encode_register(digest: &CertificateDigest, metadata: &str) -> Vec<u8> {
    let bytes = metadata.as_bytes();
    let padded = bytes.len().div_ceil(WORD) * WORD;

    let mut out = Vec::with_capacity(4 + 3 * WORD + padded);
    out.extend_from_slice(&selector(REGISTER_SIGNATURE));
    out.extend_from_slice(digest.as_bytes());
    out.extend_from_slice(&uint_word(2 * WORD as u64));
    out.extend_from_slice(&uint_word(bytes.len() as u64));
    out.extend_from_slice(bytes);
    out.resize(4 + 3 * WORD + padded, 0);
    out
}

/// Decode a single `bool` return value.
pub fn decode_bool(data: &[u8]) -> Result<bool> {
    let w = word(data, 0)?;
    if w[..WORD - 1].iter().any(|b| *b != 0) || w[WORD - 1] > 1 {
        return Err(invalid("bool word out of range"));
    }
    Ok(w[WORD - 1] == 1)
}

/// Decode the `getCertificateInfo` return tuple.
pub fn decode_certificate_info(data: &[u8]) -> Result<LedgerRecord> {
    let registrar_word = word(data, 0)?;
    let mut registrar = [0u8; 20];
    registrar.copy_from_slice(&registrar_word[12..]);

    let timestamp = word_to_u64(word(data, 1)?)?;
    let offset = word_to_usize(word(data, 2)?)?;
    let metadata = decode_string(data, offset)?;
    let exists = decode_bool(word(data, 3)?)?;

    Ok(LedgerRecord {
        registrar: Address::from_bytes(registrar),
        timestamp,
        metadata,
        exists,
    })
}

/// Extract the reason from an `Error(string)` revert payload.
pub fn decode_revert_reason(data: &[u8]) -> Option<String> {
    let body = data.strip_prefix(&ERROR_STRING_SELECTOR[..])?;
    let offset = word_to_usize(word(body, 0).ok()?).ok()?;
    decode_string(body, offset).ok()
}

/// `0x`-prefixed hex for JSON-RPC `data` fields.
pub fn to_hex_data(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parse a JSON-RPC `data`/`result` hex string.
pub fn from_hex_data(s: &str) -> Result<Vec<u8>> {
    let body = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(body).map_err(|e| invalid(&format!("bad hex data: {e}")))
}

/// Parse a JSON-RPC quantity such as `0x1b4`.
pub fn parse_quantity(s: &str) -> Result<u64> {
    let body = s
        .strip_prefix("0x")
        .ok_or_else(|| invalid(&format!("quantity without 0x prefix: {s}")))?;
    u64::from_str_radix(body, 16).map_err(|e| invalid(&format!("bad quantity {s}: {e}")))
}

fn decode_string(data: &[u8], offset: usize) -> Result<String> {
    let start = offset
        .checked_add(WORD)
        .ok_or_else(|| invalid("string offset out of bounds"))?;
    let len_word = data
        .get(offset..start)
        .ok_or_else(|| invalid("string offset out of bounds"))?;
    let len = word_to_usize(len_word)?;
    let end = start
        .checked_add(len)
        .ok_or_else(|| invalid("string length out of bounds"))?;
    let bytes = data
        .get(start..end)
        .ok_or_else(|| invalid("string body out of bounds"))?;
    Ok(String::from_utf8_lossy(bytes).into_owned())
}

fn word(data: &[u8], index: usize) -> Result<&[u8]> {
    data.get(index * WORD..(index + 1) * WORD)
        .ok_or_else(|| invalid(&format!("missing word {index}")))
}

fn word_to_u64(w: &[u8]) -> Result<u64> {
    if w[..WORD - 8].iter().any(|b| *b != 0) {
        return Err(invalid("integer does not fit in 64 bits"));
    }
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&w[WORD - 8..]);
    Ok(u64::from_be_bytes(buf))
}

fn word_to_usize(w: &[u8]) -> Result<usize> {
    usize::try_from(word_to_u64(w)?).map_err(|_| invalid("offset does not fit in usize"))
}

fn uint_word(value: u64) -> [u8; WORD] {
    let mut out = [0u8; WORD];
    out[WORD - 8..].copy_from_slice(&value.to_be_bytes());
    out
}

fn invalid(msg: &str) -> LedgerError {
    LedgerError::InvalidResponse(msg.to_string())
}

/// Encode a `getCertificateInfo` return tuple. Used by test ledgers.
pub fn encode_certificate_info(record: &LedgerRecord) -> Vec<u8> {
    let bytes = record.metadata.as_bytes();
    let padded = bytes.len().div_ceil(WORD) * WORD;

    let mut out = Vec::with_capacity(5 * WORD + padded);
    let mut registrar = [0u8; WORD];
    registrar[12..].copy_from_slice(record.registrar.as_bytes());
    out.extend_from_slice(&registrar);
    out.extend_from_slice(&uint_word(record.timestamp));
    out.extend_from_slice(&uint_word(4 * WORD as u64));
    out.extend_from_slice(&uint_word(record.exists as u64));
    out.extend_from_slice(&uint_word(bytes.len() as u64));
    out.extend_from_slice(bytes);
    out.resize(5 * WORD + padded, 0);
    out
}

/// Encode an `Error(string)` revert payload. Used by test ledgers.
pub fn encode_revert_reason(reason: &str) -> Vec<u8> {
    let bytes = reason.as_bytes();
    let padded = bytes.len().div_ceil(WORD) * WORD;

    let mut out = Vec::with_capacity(4 + 2 * WORD + padded);
    out.extend_from_slice(&ERROR_STRING_SELECTOR);
    out.extend_from_slice(&uint_word(WORD as u64));
    out.extend_from_slice(&uint_word(bytes.len() as u64));
    out.extend_from_slice(bytes);
    out.resize(4 + 2 * WORD + padded, 0);
    out
}
