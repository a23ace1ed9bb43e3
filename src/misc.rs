// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

/* misc utilities that do not really belong in any module */

use crate::error::Result;
use crate::pkcs11::*;

use zeroize::Zeroize;

/// Securely zeroizes a memory buffer
pub fn zeromem(mem: &mut [u8]) {
    mem.zeroize();
}

/// Converts a CK_ULONG received from a caller into a usize, any value that
/// can't be represented is a bad argument
pub fn ulong_to_usize(val: CK_ULONG) -> Result<usize> {
    match usize::try_from(val) {
        Ok(v) => Ok(v),
        Err(_) => Err(CKR_ARGUMENTS_BAD)?,
    }
}

/// Converts a length into a CK_ULONG
pub fn usize_to_ulong(val: usize) -> Result<CK_ULONG> {
    Ok(CK_ULONG::try_from(val)?)
}

/// Returns a copy of the buffer where each byte is the XOR of the
/// corresponding bytes of the inputs, the result is as long as the shortest
/// input
pub fn xor_bytes(a: &[u8], b: &[u8]) -> Vec<u8> {
    a.iter().zip(b.iter()).map(|(x, y)| x ^ y).collect()
}
