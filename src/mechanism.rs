// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! This module defines the mechanism registry and the operation
//! interfaces the factories hand out.
//!
//! Every algorithm family registers one or more [Mechanism] objects in
//! a [Mechanisms] map. A mechanism knows how to build the bound
//! operations it supports, the default implementations of the trait
//! methods reject the request with `CKR_MECHANISM_INVALID`.

use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::attribute::Attribute;
use crate::capability::RandomSource;
use crate::config::HedgePreference;
use crate::error::{Error, Result};
use crate::object::{Object, ObjectStore};
use crate::pkcs11::*;

use bimap::hash::BiHashMap;
use once_cell::sync::Lazy;

/// A mechanism identifier with its opaque parameter blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MechanismValue {
    mechanism: CK_MECHANISM_TYPE,
    params: Vec<u8>,
}

impl MechanismValue {
    pub fn new(mechanism: CK_MECHANISM_TYPE, params: Vec<u8>) -> MechanismValue {
        MechanismValue {
            mechanism: mechanism,
            params: params,
        }
    }

    /// A mechanism without parameters
    pub fn bare(mechanism: CK_MECHANISM_TYPE) -> MechanismValue {
        MechanismValue::new(mechanism, Vec::new())
    }

    pub fn mechanism(&self) -> CK_MECHANISM_TYPE {
        self.mechanism
    }

    pub fn params(&self) -> &[u8] {
        &self.params
    }
}

/// A registered mechanism
pub trait Mechanism: Debug + Send + Sync {
    /// Returns a reference to the mechanism info
    fn info(&self) -> &CK_MECHANISM_INFO;

    /// Builds an encapsulator for keys of type `key_type`
    fn encapsulator(
        &self,
        _: &MechanismValue,
        _: CK_KEY_TYPE,
    ) -> Result<Box<dyn Encapsulator>> {
        Err(CKR_MECHANISM_INVALID)?
    }

    /// Builds a signer binder
    fn wrapper_signer(
        &self,
        _: &MechanismValue,
        _: HedgePreference,
    ) -> Result<Box<dyn WrapperSigner>> {
        Err(CKR_MECHANISM_INVALID)?
    }

    /// Builds a key derivation generator, key handles embedded in the
    /// parameters are resolved through `store`
    fn derive_generator(
        &self,
        _: &MechanismValue,
        _: &dyn ObjectStore,
    ) -> Result<Box<dyn DeriveKeyGenerator>> {
        Err(CKR_MECHANISM_INVALID)?
    }
}

/// The registry of available mechanisms
#[derive(Debug, Default)]
pub struct Mechanisms {
    tree: BTreeMap<CK_MECHANISM_TYPE, &'static Box<dyn Mechanism>>,
}

impl Mechanisms {
    pub fn new() -> Mechanisms {
        Mechanisms {
            tree: BTreeMap::new(),
        }
    }

    pub fn add_mechanism(
        &mut self,
        typ: CK_MECHANISM_TYPE,
        info: &'static Box<dyn Mechanism>,
    ) {
        self.tree.insert(typ, info);
    }

    /// Drops every mechanism not listed in `allowed`
    pub fn retain(&mut self, allowed: &[CK_MECHANISM_TYPE]) {
        self.tree.retain(|k, _| allowed.contains(k));
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn list(&self) -> Vec<CK_MECHANISM_TYPE> {
        self.tree.keys().cloned().collect()
    }

    pub fn info(&self, typ: CK_MECHANISM_TYPE) -> Option<&CK_MECHANISM_INFO> {
        self.tree.get(&typ).map(|m| m.info())
    }

    pub fn get(&self, typ: CK_MECHANISM_TYPE) -> Result<&'static Box<dyn Mechanism>> {
        match self.tree.get(&typ) {
            Some(m) => Ok(*m),
            None => Err(Error::ck_rv_with_errmsg(
                CKR_MECHANISM_INVALID,
                format!("mechanism {} is not available", mech_type_to_name(typ)),
            )),
        }
    }
}

/// A KEM style operation producing a secret key object
pub trait Encapsulator: Debug + Send {
    fn mechanism(&self) -> CK_MECHANISM_TYPE;

    /// Records the output template of the secret key
    fn init(&mut self, template: &[Attribute]) -> Result<()>;

    /// Returns the size of the encapsulated data without performing the
    /// operation
    fn encapsulated_data_len(&self, key: &Object) -> Result<usize>;

    /// Returns the new secret key and the encapsulated data to send to
    /// the owner of the private key
    fn encapsulate(
        &mut self,
        key: &Object,
        rng: &mut dyn RandomSource,
    ) -> Result<(Object, Vec<u8>)>;

    /// Recovers the secret key from the encapsulated data
    fn decapsulate(&mut self, key: &Object, data: &[u8]) -> Result<Object>;
}

/// A multi part signature or MAC operation
///
/// Signers live for a single operation and may borrow the caller's
/// random source, so they are not required to be `Send`.
pub trait Signer {
    fn mechanism(&self) -> CK_MECHANISM_TYPE;
    fn update(&mut self, data: &[u8]) -> Result<()>;
    fn generate_signature(&mut self) -> Result<Vec<u8>>;
    /// Returns false when the signature does not match
    fn verify_signature(&mut self, signature: &[u8]) -> Result<bool>;
    fn signature_len(&self) -> usize;
}

/// A signing operation and whether the key demands a fresh login before
/// every signature (`CKA_ALWAYS_AUTHENTICATE`)
pub struct AuthenticatedSigner<'a> {
    pub signer: Box<dyn Signer + 'a>,
    pub always_authenticate: bool,
}

impl Debug for AuthenticatedSigner<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedSigner")
            .field("mechanism", &self.signer.mechanism())
            .field("always_authenticate", &self.always_authenticate)
            .finish()
    }
}

/// Binds a signature mechanism to a key
pub trait WrapperSigner: Debug + Send + Sync {
    fn mechanism(&self) -> CK_MECHANISM_TYPE;

    /// Returns a signer bound to a key that must allow `CKA_SIGN`
    fn into_signing_signer<'a>(
        self: Box<Self>,
        key: &Object,
        rng: &'a mut dyn RandomSource,
    ) -> Result<AuthenticatedSigner<'a>>;

    /// Returns a verifier bound to a key that must allow `CKA_VERIFY`
    fn into_validation_signer(
        self: Box<Self>,
        key: &Object,
    ) -> Result<Box<dyn Signer>>;
}

/// A key derivation operation
pub trait DeriveKeyGenerator: Debug + Send {
    fn mechanism(&self) -> CK_MECHANISM_TYPE;

    /// Records the output template of the derived key
    fn init(&mut self, template: &[Attribute]) -> Result<()>;

    /// Derives a new secret key from `base`
    fn generate(&mut self, base: &Object) -> Result<Object>;
}

/// Helper macro that builds the bidirectional map of mechanism names
macro_rules! mech_names {
    ($($name:ident),* $(,)?) => {
        static MECH_NAMES: Lazy<BiHashMap<CK_MECHANISM_TYPE, &'static str>> =
            Lazy::new(|| {
                let mut map = BiHashMap::new();
                $(map.insert($name, stringify!($name));)*
                map
            });
    };
}

mech_names!(
    CKM_RSA_PKCS_KEY_PAIR_GEN,
    CKM_RSA_PKCS,
    CKM_RSA_9796,
    CKM_RSA_X_509,
    CKM_MD2_RSA_PKCS,
    CKM_MD5_RSA_PKCS,
    CKM_SHA1_RSA_PKCS,
    CKM_RIPEMD128_RSA_PKCS,
    CKM_RIPEMD160_RSA_PKCS,
    CKM_RSA_PKCS_OAEP,
    CKM_RSA_X9_31,
    CKM_SHA1_RSA_X9_31,
    CKM_RSA_PKCS_PSS,
    CKM_SHA1_RSA_PKCS_PSS,
    CKM_ML_KEM_KEY_PAIR_GEN,
    CKM_ML_KEM,
    CKM_ML_DSA_KEY_PAIR_GEN,
    CKM_ML_DSA,
    CKM_HASH_ML_DSA,
    CKM_HASH_ML_DSA_SHA224,
    CKM_HASH_ML_DSA_SHA256,
    CKM_HASH_ML_DSA_SHA384,
    CKM_HASH_ML_DSA_SHA512,
    CKM_HASH_ML_DSA_SHA3_224,
    CKM_HASH_ML_DSA_SHA3_256,
    CKM_HASH_ML_DSA_SHA3_384,
    CKM_HASH_ML_DSA_SHA3_512,
    CKM_HASH_ML_DSA_SHAKE128,
    CKM_HASH_ML_DSA_SHAKE256,
    CKM_SLH_DSA_KEY_PAIR_GEN,
    CKM_SLH_DSA,
    CKM_HASH_SLH_DSA,
    CKM_HASH_SLH_DSA_SHA224,
    CKM_HASH_SLH_DSA_SHA256,
    CKM_HASH_SLH_DSA_SHA384,
    CKM_HASH_SLH_DSA_SHA512,
    CKM_HASH_SLH_DSA_SHA3_224,
    CKM_HASH_SLH_DSA_SHA3_256,
    CKM_HASH_SLH_DSA_SHA3_384,
    CKM_HASH_SLH_DSA_SHA3_512,
    CKM_HASH_SLH_DSA_SHAKE128,
    CKM_HASH_SLH_DSA_SHAKE256,
    CKM_SHA256_RSA_PKCS,
    CKM_SHA384_RSA_PKCS,
    CKM_SHA512_RSA_PKCS,
    CKM_SHA256_RSA_PKCS_PSS,
    CKM_SHA384_RSA_PKCS_PSS,
    CKM_SHA512_RSA_PKCS_PSS,
    CKM_SHA224_RSA_PKCS,
    CKM_SHA224_RSA_PKCS_PSS,
    CKM_SHA512_224,
    CKM_SHA512_224_HMAC,
    CKM_SHA512_224_HMAC_GENERAL,
    CKM_SHA512_224_KEY_DERIVATION,
    CKM_SHA512_256,
    CKM_SHA512_256_HMAC,
    CKM_SHA512_256_HMAC_GENERAL,
    CKM_SHA512_256_KEY_DERIVATION,
    CKM_SHA3_256_RSA_PKCS,
    CKM_SHA3_384_RSA_PKCS,
    CKM_SHA3_512_RSA_PKCS,
    CKM_SHA3_256_RSA_PKCS_PSS,
    CKM_SHA3_384_RSA_PKCS_PSS,
    CKM_SHA3_512_RSA_PKCS_PSS,
    CKM_SHA3_224_RSA_PKCS,
    CKM_SHA3_224_RSA_PKCS_PSS,
    CKM_MD2,
    CKM_MD2_HMAC,
    CKM_MD2_HMAC_GENERAL,
    CKM_MD5,
    CKM_MD5_HMAC,
    CKM_MD5_HMAC_GENERAL,
    CKM_SHA_1,
    CKM_SHA_1_HMAC,
    CKM_SHA_1_HMAC_GENERAL,
    CKM_RIPEMD128,
    CKM_RIPEMD128_HMAC,
    CKM_RIPEMD128_HMAC_GENERAL,
    CKM_RIPEMD160,
    CKM_RIPEMD160_HMAC,
    CKM_RIPEMD160_HMAC_GENERAL,
    CKM_SHA256,
    CKM_SHA256_HMAC,
    CKM_SHA256_HMAC_GENERAL,
    CKM_SHA224,
    CKM_SHA224_HMAC,
    CKM_SHA224_HMAC_GENERAL,
    CKM_SHA384,
    CKM_SHA384_HMAC,
    CKM_SHA384_HMAC_GENERAL,
    CKM_SHA512,
    CKM_SHA512_HMAC,
    CKM_SHA512_HMAC_GENERAL,
    CKM_SHA3_256,
    CKM_SHA3_256_HMAC,
    CKM_SHA3_256_HMAC_GENERAL,
    CKM_SHA3_224,
    CKM_SHA3_224_HMAC,
    CKM_SHA3_224_HMAC_GENERAL,
    CKM_SHA3_384,
    CKM_SHA3_384_HMAC,
    CKM_SHA3_384_HMAC_GENERAL,
    CKM_SHA3_512,
    CKM_SHA3_512_HMAC,
    CKM_SHA3_512_HMAC_GENERAL,
    CKM_CONCATENATE_BASE_AND_KEY,
    CKM_CONCATENATE_BASE_AND_DATA,
    CKM_CONCATENATE_DATA_AND_BASE,
    CKM_XOR_BASE_AND_DATA,
    CKM_EXTRACT_KEY_FROM_KEY,
    CKM_MD5_KEY_DERIVATION,
    CKM_MD2_KEY_DERIVATION,
    CKM_SHA1_KEY_DERIVATION,
    CKM_SHA256_KEY_DERIVATION,
    CKM_SHA384_KEY_DERIVATION,
    CKM_SHA512_KEY_DERIVATION,
    CKM_SHA224_KEY_DERIVATION,
    CKM_SHA3_256_KEY_DERIVATION,
    CKM_SHA3_224_KEY_DERIVATION,
    CKM_SHA3_384_KEY_DERIVATION,
    CKM_SHA3_512_KEY_DERIVATION,
    CKM_SHAKE_128_KEY_DERIVATION,
    CKM_SHAKE_256_KEY_DERIVATION,
    CKM_CAMELLIA_KEY_GEN,
    CKM_CAMELLIA_ECB,
    CKM_CAMELLIA_CBC,
    CKM_CAMELLIA_MAC,
    CKM_CAMELLIA_MAC_GENERAL,
    CKM_CAMELLIA_ECB_ENCRYPT_DATA,
    CKM_CAMELLIA_CBC_ENCRYPT_DATA,
    CKM_EC_KEY_PAIR_GEN,
    CKM_ECDSA,
    CKM_ECDSA_SHA1,
    CKM_ECDSA_SHA224,
    CKM_ECDSA_SHA256,
    CKM_ECDSA_SHA384,
    CKM_ECDSA_SHA512,
    CKM_ECDSA_SHA3_224,
    CKM_ECDSA_SHA3_256,
    CKM_ECDSA_SHA3_384,
    CKM_ECDSA_SHA3_512,
    CKM_ECDH1_DERIVE,
    CKM_ECDH1_COFACTOR_DERIVE,
    CKM_EC_EDWARDS_KEY_PAIR_GEN,
    CKM_EC_MONTGOMERY_KEY_PAIR_GEN,
    CKM_EDDSA,
    CKM_AES_KEY_GEN,
    CKM_AES_ECB,
    CKM_AES_CBC,
    CKM_AES_CMAC_GENERAL,
    CKM_AES_CMAC,
    CKM_AES_ECB_ENCRYPT_DATA,
    CKM_AES_CBC_ENCRYPT_DATA,
    CKM_GOSTR3411,
    CKM_GOSTR3411_HMAC,
    CKM_POLY1305_KEY_GEN,
    CKM_POLY1305,
    CKM_BLAKE2B_160,
    CKM_BLAKE2B_160_HMAC,
    CKM_BLAKE2B_160_HMAC_GENERAL,
    CKM_BLAKE2B_160_KEY_DERIVE,
    CKM_BLAKE2B_256,
    CKM_BLAKE2B_256_HMAC,
    CKM_BLAKE2B_256_HMAC_GENERAL,
    CKM_BLAKE2B_256_KEY_DERIVE,
    CKM_BLAKE2B_384,
    CKM_BLAKE2B_384_HMAC,
    CKM_BLAKE2B_384_HMAC_GENERAL,
    CKM_BLAKE2B_384_KEY_DERIVE,
    CKM_BLAKE2B_512,
    CKM_BLAKE2B_512_HMAC,
    CKM_BLAKE2B_512_HMAC_GENERAL,
    CKM_BLAKE2B_512_KEY_DERIVE,
    CKM_HKDF_DERIVE,
    CKM_HKDF_DATA,
    CKM_HKDF_KEY_GEN,
);

/// Returns the symbolic name of a mechanism
pub fn mech_type_to_name(mech: CK_MECHANISM_TYPE) -> &'static str {
    match MECH_NAMES.get_by_left(&mech) {
        Some(name) => *name,
        None => "CKM_VENDOR_DEFINED",
    }
}

/// Returns the mechanism identified by its symbolic name
pub fn name_to_mech_type(name: &str) -> Result<CK_MECHANISM_TYPE> {
    match MECH_NAMES.get_by_right(name) {
        Some(mech) => Ok(*mech),
        None => Err(Error::not_found(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mechanism_names() {
        assert_eq!(mech_type_to_name(CKM_ML_KEM), "CKM_ML_KEM");
        assert_eq!(name_to_mech_type("CKM_EDDSA").unwrap(), CKM_EDDSA);
        assert_eq!(mech_type_to_name(0x8000_1234), "CKM_VENDOR_DEFINED");
        assert!(name_to_mech_type("CKM_BOGUS").is_err());
    }
}
