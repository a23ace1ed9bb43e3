// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! Raw AES and Camellia block encryption in ECB and CBC modes, without
//! padding

use crate::error::{Error, Result};
use crate::pkcs11::*;

use cbc::cipher::KeyIvInit;
use ecb::cipher::block_padding::NoPadding;
use ecb::cipher::{BlockEncryptMut, KeyInit};

/// AES and Camellia share the same block size
pub const BLOCK_SIZE: usize = 16;

fn key_error(key_type: CK_KEY_TYPE, len: usize) -> Error {
    Error::ck_rv_with_errmsg(
        CKR_KEY_SIZE_RANGE,
        format!("invalid key length {} for key type {:#x}", len, key_type),
    )
}

fn check_data(data: &[u8]) -> Result<()> {
    if data.len() % BLOCK_SIZE != 0 {
        return Err(Error::ck_rv_with_errmsg(
            CKR_DATA_LEN_RANGE,
            format!("data length {} is not a multiple of the block size", data.len()),
        ));
    }
    Ok(())
}

macro_rules! encrypt_in_place {
    ($mode:ty; $init:expr; $buf:expr) => {{
        let enc: $mode = match $init {
            Ok(e) => e,
            Err(_) => return Err(CKR_KEY_SIZE_RANGE)?,
        };
        let len = $buf.len();
        if enc.encrypt_padded_mut::<NoPadding>($buf, len).is_err() {
            return Err(CKR_DATA_LEN_RANGE)?;
        }
    }};
}

/// Encrypts `data`, a multiple of the block size, in ECB mode
pub fn ecb_encrypt(key_type: CK_KEY_TYPE, key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    check_data(data)?;
    let mut buf = data.to_vec();
    let b = buf.as_mut_slice();
    match (key_type, key.len()) {
        (CKK_AES, 16) => encrypt_in_place!(
            ecb::Encryptor<aes::Aes128>;
            ecb::Encryptor::<aes::Aes128>::new_from_slice(key); b),
        (CKK_AES, 24) => encrypt_in_place!(
            ecb::Encryptor<aes::Aes192>;
            ecb::Encryptor::<aes::Aes192>::new_from_slice(key); b),
        (CKK_AES, 32) => encrypt_in_place!(
            ecb::Encryptor<aes::Aes256>;
            ecb::Encryptor::<aes::Aes256>::new_from_slice(key); b),
        (CKK_CAMELLIA, 16) => encrypt_in_place!(
            ecb::Encryptor<camellia::Camellia128>;
            ecb::Encryptor::<camellia::Camellia128>::new_from_slice(key); b),
        (CKK_CAMELLIA, 24) => encrypt_in_place!(
            ecb::Encryptor<camellia::Camellia192>;
            ecb::Encryptor::<camellia::Camellia192>::new_from_slice(key); b),
        (CKK_CAMELLIA, 32) => encrypt_in_place!(
            ecb::Encryptor<camellia::Camellia256>;
            ecb::Encryptor::<camellia::Camellia256>::new_from_slice(key); b),
        (CKK_AES | CKK_CAMELLIA, len) => return Err(key_error(key_type, len)),
        _ => return Err(CKR_KEY_TYPE_INCONSISTENT)?,
    }
    Ok(buf)
}

/// Encrypts `data`, a multiple of the block size, in CBC mode
pub fn cbc_encrypt(
    key_type: CK_KEY_TYPE,
    key: &[u8],
    iv: &[u8],
    data: &[u8],
) -> Result<Vec<u8>> {
    check_data(data)?;
    if iv.len() != BLOCK_SIZE {
        return Err(Error::ck_rv_with_errmsg(
            CKR_MECHANISM_PARAM_INVALID,
            format!("invalid IV length {}", iv.len()),
        ));
    }
    let mut buf = data.to_vec();
    let b = buf.as_mut_slice();
    match (key_type, key.len()) {
        (CKK_AES, 16) => encrypt_in_place!(
            cbc::Encryptor<aes::Aes128>;
            cbc::Encryptor::<aes::Aes128>::new_from_slices(key, iv); b),
        (CKK_AES, 24) => encrypt_in_place!(
            cbc::Encryptor<aes::Aes192>;
            cbc::Encryptor::<aes::Aes192>::new_from_slices(key, iv); b),
        (CKK_AES, 32) => encrypt_in_place!(
            cbc::Encryptor<aes::Aes256>;
            cbc::Encryptor::<aes::Aes256>::new_from_slices(key, iv); b),
        (CKK_CAMELLIA, 16) => encrypt_in_place!(
            cbc::Encryptor<camellia::Camellia128>;
            cbc::Encryptor::<camellia::Camellia128>::new_from_slices(key, iv); b),
        (CKK_CAMELLIA, 24) => encrypt_in_place!(
            cbc::Encryptor<camellia::Camellia192>;
            cbc::Encryptor::<camellia::Camellia192>::new_from_slices(key, iv); b),
        (CKK_CAMELLIA, 32) => encrypt_in_place!(
            cbc::Encryptor<camellia::Camellia256>;
            cbc::Encryptor::<camellia::Camellia256>::new_from_slices(key, iv); b),
        (CKK_AES | CKK_CAMELLIA, len) => return Err(key_error(key_type, len)),
        _ => return Err(CKR_KEY_TYPE_INCONSISTENT)?,
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aes_ecb_fips197() {
        /* FIPS-197 Appendix C.1 */
        let key = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        let pt = hex::decode("00112233445566778899aabbccddeeff").unwrap();
        let ct = ecb_encrypt(CKK_AES, &key, &pt).unwrap();
        assert_eq!(ct, hex::decode("69c4e0d86a7b0430d8cdb78070b4c55a").unwrap());
    }

    #[test]
    fn cbc_checks() {
        let key = [0u8; 16];
        let err = cbc_encrypt(CKK_CAMELLIA, &key, &[0u8; 16], &[0u8; 17])
            .unwrap_err();
        assert_eq!(err.rv(), CKR_DATA_LEN_RANGE);
        let err = cbc_encrypt(CKK_AES, &key, &[0u8; 8], &[0u8; 16])
            .unwrap_err();
        assert_eq!(err.rv(), CKR_MECHANISM_PARAM_INVALID);
        let out = cbc_encrypt(CKK_CAMELLIA, &key, &[0u8; 16], &[0u8; 32])
            .unwrap();
        assert_eq!(out.len(), 32);
    }
}
