//! Minimal ABI encode/decode for the handful of fixed contract views and
//! calls this service touches. The shapes are stable (`uint32` argument,
//! `address`/`uint16`/`address[]` returns), so hand-rolled words beat a
//! full codegen dependency here.

use crate::foundation::CovaultError;
use alloy_primitives::{keccak256, Address, Bytes, B256, U256};

const WORD: usize = 32;

pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

pub fn encode_call_no_args(signature: &str) -> Bytes {
    Bytes::from(selector(signature).to_vec())
}

pub fn encode_call_u32(signature: &str, value: u32) -> Bytes {
    let mut data = Vec::with_capacity(4 + WORD);
    data.extend_from_slice(&selector(signature));
    data.extend_from_slice(&B256::from(U256::from(value)).0);
    Bytes::from(data)
}

/// `execute(address,uint256,bytes)` calldata for a single inner call.
pub fn encode_execute_call(target: Address, value: U256, inner: &[u8]) -> Bytes {
    let mut data = Vec::with_capacity(4 + WORD * 4 + inner.len());
    data.extend_from_slice(&selector("execute(address,uint256,bytes)"));
    data.extend_from_slice(B256::left_padding_from(target.as_slice()).as_slice());
    data.extend_from_slice(&B256::from(value).0);
    // Dynamic `bytes`: offset to the tail, then length + right-padded content.
    data.extend_from_slice(&B256::from(U256::from(WORD * 3)).0);
    data.extend_from_slice(&B256::from(U256::from(inner.len())).0);
    data.extend_from_slice(inner);
    let partial = inner.len() % WORD;
    if partial != 0 {
        data.extend(std::iter::repeat(0u8).take(WORD - partial));
    }
    Bytes::from(data)
}

fn word_at(data: &[u8], index: usize) -> Result<&[u8], CovaultError> {
    let start = index * WORD;
    data.get(start..start + WORD)
        .ok_or_else(|| CovaultError::EncodingError(format!("return data too short: {} bytes, need word {}", data.len(), index)))
}

pub fn decode_uint(data: &[u8]) -> Result<U256, CovaultError> {
    Ok(U256::from_be_slice(word_at(data, 0)?))
}

pub fn decode_u16(data: &[u8]) -> Result<u16, CovaultError> {
    let value = decode_uint(data)?;
    u16::try_from(value).map_err(|_| CovaultError::EncodingError(format!("uint16 out of range: {value}")))
}

pub fn decode_address(data: &[u8]) -> Result<Address, CovaultError> {
    let word = word_at(data, 0)?;
    if word[..12].iter().any(|b| *b != 0) {
        return Err(CovaultError::EncodingError("address word has non-zero padding".to_string()));
    }
    Ok(Address::from_slice(&word[12..]))
}

pub fn decode_address_array(data: &[u8]) -> Result<Vec<Address>, CovaultError> {
    let offset = usize::try_from(decode_uint(data)?)
        .map_err(|_| CovaultError::EncodingError("array offset out of range".to_string()))?;
    let tail = data
        .get(offset..)
        .ok_or_else(|| CovaultError::EncodingError(format!("array offset {offset} beyond {} bytes", data.len())))?;
    let len = usize::try_from(decode_uint(tail)?)
        .map_err(|_| CovaultError::EncodingError("array length out of range".to_string()))?;
    let mut out = Vec::with_capacity(len);
    for i in 0..len {
        let word = word_at(tail, 1 + i)?;
        out.push(Address::from_slice(&word[12..]));
    }
    Ok(out)
}
