// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! Typed mechanism parameters and their wire decoding.
//!
//! Parameter blobs are `bincode` encodings with fixed width little
//! endian integers, `u64` length prefixes and a one byte `Option` tag.
//! Any decoding failure, including trailing bytes after the structure,
//! is reported as `CKR_MECHANISM_PARAM_INVALID` with the decoder error
//! attached as origin.

use crate::error::Result;
use crate::pkcs11::*;

use bincode::Options;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Upper bound on the size of a parameter blob
const MAX_PARAMS_SIZE: u64 = 1 << 20;

fn wire_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .reject_trailing_bytes()
        .with_limit(MAX_PARAMS_SIZE)
}

/// Common decoding/encoding interface of all parameter structures
pub trait MechanismParams: Serialize + DeserializeOwned + Sized {
    /// Decodes the parameter structure from its wire form
    fn decode(blob: &[u8]) -> Result<Self> {
        Ok(wire_options().deserialize::<Self>(blob)?)
    }

    /// Decodes parameters that the mechanism allows to omit, an empty
    /// blob means no parameters
    fn decode_optional(blob: &[u8]) -> Result<Option<Self>> {
        if blob.is_empty() {
            return Ok(None);
        }
        Ok(Some(Self::decode(blob)?))
    }

    /// Encodes the parameter structure in its wire form
    fn encode(&self) -> Result<Vec<u8>> {
        Ok(wire_options().serialize(self)?)
    }
}

/// CK_MAC_GENERAL_PARAMS: the requested MAC length in bytes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CkMacGeneralParams(pub CK_ULONG);

impl MechanismParams for CkMacGeneralParams {}

/// CK_RSA_PKCS_OAEP_PARAMS
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CkRsaPkcsOaepParams {
    pub hash_alg: CK_MECHANISM_TYPE,
    pub mgf: CK_RSA_PKCS_MGF_TYPE,
    pub source: CK_RSA_PKCS_OAEP_SOURCE_TYPE,
    pub source_data: Option<Vec<u8>>,
}

impl MechanismParams for CkRsaPkcsOaepParams {}

/// CK_RSA_PKCS_PSS_PARAMS
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CkRsaPkcsPssParams {
    pub hash_alg: CK_MECHANISM_TYPE,
    pub mgf: CK_RSA_PKCS_MGF_TYPE,
    pub s_len: CK_ULONG,
}

impl MechanismParams for CkRsaPkcsPssParams {}

/// CK_ECDH1_DERIVE_PARAMS
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CkEcdh1DeriveParams {
    pub kdf: CK_EC_KDF_TYPE,
    pub shared_data: Option<Vec<u8>>,
    pub public_data: Option<Vec<u8>>,
}

impl MechanismParams for CkEcdh1DeriveParams {}

/// CK_HKDF_PARAMS
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CkHkdfParams {
    pub extract: bool,
    pub expand: bool,
    pub prf_hash_mechanism: CK_MECHANISM_TYPE,
    pub salt_type: CK_ULONG,
    pub salt: Option<Vec<u8>>,
    pub salt_key: CK_OBJECT_HANDLE,
    pub info: Option<Vec<u8>>,
}

impl MechanismParams for CkHkdfParams {}

/// CK_SIGN_ADDITIONAL_CONTEXT
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CkSignAdditionalContext {
    pub hedge_variant: CK_HEDGE_TYPE,
    pub context: Option<Vec<u8>>,
}

impl MechanismParams for CkSignAdditionalContext {}

/// CK_HASH_SIGN_ADDITIONAL_CONTEXT
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CkHashSignAdditionalContext {
    pub hedge_variant: CK_HEDGE_TYPE,
    pub context: Option<Vec<u8>>,
    pub hash: CK_MECHANISM_TYPE,
}

impl MechanismParams for CkHashSignAdditionalContext {}

/// CK_EDDSA_PARAMS
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CkEddsaParams {
    pub ph_flag: bool,
    pub context: Option<Vec<u8>>,
}

impl MechanismParams for CkEddsaParams {}

/// CK_KEY_DERIVATION_STRING_DATA
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CkKeyDerivationStringData(pub Vec<u8>);

impl MechanismParams for CkKeyDerivationStringData {}

/// A bare CK_OBJECT_HANDLE parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CkObjectHandleParam(pub CK_OBJECT_HANDLE);

impl MechanismParams for CkObjectHandleParam {}

/// CK_EXTRACT_PARAMS: the bit index to start extraction from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CkExtractParams(pub CK_ULONG);

impl MechanismParams for CkExtractParams {}

/// CK_{AES,CAMELLIA}_CBC_ENCRYPT_DATA_PARAMS
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CkCbcEncryptDataParams {
    pub iv: Vec<u8>,
    pub data: Vec<u8>,
}

impl MechanismParams for CkCbcEncryptDataParams {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_layout() {
        let p = CkMacGeneralParams(16);
        assert_eq!(p.encode().unwrap(), hex::decode("1000000000000000").unwrap());

        let p = CkEddsaParams {
            ph_flag: true,
            context: Some(vec![0xaa, 0xbb]),
        };
        assert_eq!(
            p.encode().unwrap(),
            hex::decode("01010200000000000000aabb").unwrap()
        );
    }

    #[test]
    fn rejects_malformed() {
        let blob = CkMacGeneralParams(16).encode().unwrap();

        /* trailing byte */
        let mut long = blob.clone();
        long.push(0);
        let err = CkMacGeneralParams::decode(&long).unwrap_err();
        assert_eq!(err.rv(), CKR_MECHANISM_PARAM_INVALID);

        /* truncated */
        let err = CkMacGeneralParams::decode(&blob[..4]).unwrap_err();
        assert_eq!(err.rv(), CKR_MECHANISM_PARAM_INVALID);

        /* length prefix larger than the data */
        let err = CkKeyDerivationStringData::decode(
            &hex::decode("ff00000000000000aa").unwrap(),
        )
        .unwrap_err();
        assert_eq!(err.rv(), CKR_MECHANISM_PARAM_INVALID);
    }

    #[test]
    fn optional_params() {
        assert_eq!(CkEddsaParams::decode_optional(&[]).unwrap(), None);
        let p = CkSignAdditionalContext {
            hedge_variant: CKH_DETERMINISTIC_REQUIRED,
            context: None,
        };
        let blob = p.encode().unwrap();
        assert_eq!(
            CkSignAdditionalContext::decode_optional(&blob).unwrap(),
            Some(p)
        );
    }
}
