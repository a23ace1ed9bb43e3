// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! This module implements the typed views over key [Object]s.
//!
//! The concrete type of a key is resolved from its class, key type and,
//! for the elliptic curve families, from its `CKA_EC_PARAMS`. Views are
//! only ever built through checked accessors so that an operation bound
//! to a key family can never see a key of another family.

use std::fmt;

use crate::attribute::{attr_name, Attribute};
use crate::ec::{self, Curve};
use crate::error::{Error, Result};
use crate::mechanism::mech_type_to_name;
use crate::misc::{ulong_to_usize, usize_to_ulong, zeromem};
use crate::native::cipher;
use crate::native::digest::DigestAlg;
use crate::object::Object;
use crate::pkcs11::*;

use log::{error, info};

/* See FIPS-203, 8. Parameter Sets */
pub const ML_KEM_512_EK_SIZE: usize = 800;
pub const ML_KEM_512_DK_SIZE: usize = 1632;
pub const ML_KEM_512_CT_SIZE: usize = 768;
pub const ML_KEM_768_EK_SIZE: usize = 1184;
pub const ML_KEM_768_DK_SIZE: usize = 2400;
pub const ML_KEM_768_CT_SIZE: usize = 1088;
pub const ML_KEM_1024_EK_SIZE: usize = 1568;
pub const ML_KEM_1024_DK_SIZE: usize = 3168;
pub const ML_KEM_1024_CT_SIZE: usize = 1568;
pub const ML_KEM_SHARED_SECRET_SIZE: usize = 32;

/* See FIPS-204, 4. Parameter Sets */
pub const ML_DSA_44_PK_SIZE: usize = 1312;
pub const ML_DSA_44_SK_SIZE: usize = 2560;
pub const ML_DSA_44_SIG_SIZE: usize = 2420;
pub const ML_DSA_65_PK_SIZE: usize = 1952;
pub const ML_DSA_65_SK_SIZE: usize = 4032;
pub const ML_DSA_65_SIG_SIZE: usize = 3309;
pub const ML_DSA_87_PK_SIZE: usize = 2592;
pub const ML_DSA_87_SK_SIZE: usize = 4896;
pub const ML_DSA_87_SIG_SIZE: usize = 4627;

/// Sizes of the ML-KEM material for a parameter set as
/// (encapsulation key, decapsulation key, ciphertext)
pub fn mlkem_sizes(param_set: CK_ML_KEM_PARAMETER_SET_TYPE) -> Option<(usize, usize, usize)> {
    match param_set {
        CKP_ML_KEM_512 => {
            Some((ML_KEM_512_EK_SIZE, ML_KEM_512_DK_SIZE, ML_KEM_512_CT_SIZE))
        }
        CKP_ML_KEM_768 => {
            Some((ML_KEM_768_EK_SIZE, ML_KEM_768_DK_SIZE, ML_KEM_768_CT_SIZE))
        }
        CKP_ML_KEM_1024 => Some((
            ML_KEM_1024_EK_SIZE,
            ML_KEM_1024_DK_SIZE,
            ML_KEM_1024_CT_SIZE,
        )),
        _ => None,
    }
}

/// Sizes of the ML-DSA material for a parameter set as
/// (public key, private key, signature)
pub fn mldsa_sizes(param_set: CK_ML_DSA_PARAMETER_SET_TYPE) -> Option<(usize, usize, usize)> {
    match param_set {
        CKP_ML_DSA_44 => {
            Some((ML_DSA_44_PK_SIZE, ML_DSA_44_SK_SIZE, ML_DSA_44_SIG_SIZE))
        }
        CKP_ML_DSA_65 => {
            Some((ML_DSA_65_PK_SIZE, ML_DSA_65_SK_SIZE, ML_DSA_65_SIG_SIZE))
        }
        CKP_ML_DSA_87 => {
            Some((ML_DSA_87_PK_SIZE, ML_DSA_87_SK_SIZE, ML_DSA_87_SIG_SIZE))
        }
        _ => None,
    }
}

/// Sizes of the SLH-DSA material for a parameter set as
/// (public key, private key, signature)
///
/// See FIPS-205, 11. Parameter Sets: pk is 2n and sk is 4n bytes
pub fn slhdsa_sizes(param_set: CK_SLH_DSA_PARAMETER_SET_TYPE) -> Option<(usize, usize, usize)> {
    let (n, sig) = match param_set {
        CKP_SLH_DSA_SHA2_128S | CKP_SLH_DSA_SHAKE_128S => (16, 7856),
        CKP_SLH_DSA_SHA2_128F | CKP_SLH_DSA_SHAKE_128F => (16, 17088),
        CKP_SLH_DSA_SHA2_192S | CKP_SLH_DSA_SHAKE_192S => (24, 16224),
        CKP_SLH_DSA_SHA2_192F | CKP_SLH_DSA_SHAKE_192F => (24, 35664),
        CKP_SLH_DSA_SHA2_256S | CKP_SLH_DSA_SHAKE_256S => (32, 29792),
        CKP_SLH_DSA_SHA2_256F | CKP_SLH_DSA_SHAKE_256F => (32, 49856),
        _ => return None,
    };
    Some((2 * n, 4 * n, sig))
}

/// Returns true for the key types that can back a secret key object
pub fn is_secret_key_type(key_type: CK_KEY_TYPE) -> bool {
    matches!(
        key_type,
        CKK_GENERIC_SECRET
            | CKK_AES
            | CKK_CAMELLIA
            | CKK_DES
            | CKK_DES2
            | CKK_DES3
            | CKK_CHACHA20
            | CKK_SALSA20
            | CKK_POLY1305
            | CKK_HKDF
            | CKK_MD5_HMAC
            | CKK_SHA_1_HMAC
            | CKK_RIPEMD128_HMAC
            | CKK_RIPEMD160_HMAC
            | CKK_SHA224_HMAC
            | CKK_SHA256_HMAC
            | CKK_SHA384_HMAC
            | CKK_SHA512_HMAC
            | CKK_SHA3_224_HMAC
            | CKK_SHA3_256_HMAC
            | CKK_SHA3_384_HMAC
            | CKK_SHA3_512_HMAC
            | CKK_BLAKE2B_160_HMAC
            | CKK_BLAKE2B_256_HMAC
            | CKK_BLAKE2B_384_HMAC
            | CKK_BLAKE2B_512_HMAC
    )
}

/// The exact secret length a key type imposes, if any
pub fn secret_required_len(key_type: CK_KEY_TYPE) -> Option<usize> {
    match key_type {
        CKK_DES => Some(8),
        CKK_DES2 => Some(16),
        CKK_DES3 => Some(24),
        CKK_CHACHA20 | CKK_SALSA20 | CKK_POLY1305 => Some(32),
        _ => None,
    }
}

/// The minimum secret length a key type accepts
pub fn secret_min_len(key_type: CK_KEY_TYPE) -> usize {
    match key_type {
        CKK_AES | CKK_CAMELLIA => 16,
        _ => match secret_required_len(key_type) {
            Some(len) => len,
            None => 1,
        },
    }
}

fn secret_len_valid(key_type: CK_KEY_TYPE, len: usize) -> bool {
    match key_type {
        CKK_AES | CKK_CAMELLIA => matches!(len, 16 | 24 | 32),
        _ => match secret_required_len(key_type) {
            Some(req) => len == req,
            None => len > 0,
        },
    }
}

/// The closed set of concrete key types understood by the mechanisms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    RsaPublic,
    RsaPrivate,
    EcPublic(Curve),
    EcPrivate(Curve),
    EdwardsPublic(Curve),
    EdwardsPrivate(Curve),
    MontgomeryPublic(Curve),
    MontgomeryPrivate(Curve),
    MlKemPublic,
    MlKemPrivate,
    MlDsaPublic,
    MlDsaPrivate,
    SlhDsaPublic,
    SlhDsaPrivate,
    Secret(CK_KEY_TYPE),
}

impl KeyKind {
    /// Resolves the concrete kind of a key object
    ///
    /// Objects that are not keys of a supported type return
    /// `CKR_KEY_HANDLE_INVALID`.
    pub fn of(obj: &Object) -> Result<KeyKind> {
        let key_type = match obj.get_attr_as_ulong(CKA_KEY_TYPE) {
            Ok(k) => k,
            Err(_) => {
                return Err(Error::ck_rv_with_errmsg(
                    CKR_KEY_HANDLE_INVALID,
                    format!("object of class {} is not a key", obj.get_class()),
                ))
            }
        };
        let public = match obj.get_class() {
            CKO_PUBLIC_KEY => true,
            CKO_PRIVATE_KEY => false,
            CKO_SECRET_KEY => {
                if is_secret_key_type(key_type) {
                    return Ok(KeyKind::Secret(key_type));
                }
                return Err(Error::ck_rv_with_errmsg(
                    CKR_KEY_HANDLE_INVALID,
                    format!("unsupported secret key type {:#x}", key_type),
                ));
            }
            class => {
                return Err(Error::ck_rv_with_errmsg(
                    CKR_KEY_HANDLE_INVALID,
                    format!("unsupported object class {:#x}", class),
                ))
            }
        };
        let kind = match key_type {
            CKK_RSA => {
                if public {
                    KeyKind::RsaPublic
                } else {
                    KeyKind::RsaPrivate
                }
            }
            CKK_EC | CKK_EC_EDWARDS | CKK_EC_MONTGOMERY => {
                let curve = curve_of(obj, key_type)?;
                match (key_type, public) {
                    (CKK_EC, true) => KeyKind::EcPublic(curve),
                    (CKK_EC, false) => KeyKind::EcPrivate(curve),
                    (CKK_EC_EDWARDS, true) => KeyKind::EdwardsPublic(curve),
                    (CKK_EC_EDWARDS, false) => KeyKind::EdwardsPrivate(curve),
                    (_, true) => KeyKind::MontgomeryPublic(curve),
                    (_, false) => KeyKind::MontgomeryPrivate(curve),
                }
            }
            CKK_ML_KEM => {
                if public {
                    KeyKind::MlKemPublic
                } else {
                    KeyKind::MlKemPrivate
                }
            }
            CKK_ML_DSA => {
                if public {
                    KeyKind::MlDsaPublic
                } else {
                    KeyKind::MlDsaPrivate
                }
            }
            CKK_SLH_DSA => {
                if public {
                    KeyKind::SlhDsaPublic
                } else {
                    KeyKind::SlhDsaPrivate
                }
            }
            _ => {
                return Err(Error::ck_rv_with_errmsg(
                    CKR_KEY_HANDLE_INVALID,
                    format!("unsupported key type {:#x}", key_type),
                ))
            }
        };
        Ok(kind)
    }

    /// The curve of elliptic curve keys
    pub fn curve(&self) -> Option<Curve> {
        match self {
            KeyKind::EcPublic(c)
            | KeyKind::EcPrivate(c)
            | KeyKind::EdwardsPublic(c)
            | KeyKind::EdwardsPrivate(c)
            | KeyKind::MontgomeryPublic(c)
            | KeyKind::MontgomeryPrivate(c) => Some(*c),
            _ => None,
        }
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyKind::RsaPublic => write!(f, "RSA public key"),
            KeyKind::RsaPrivate => write!(f, "RSA private key"),
            KeyKind::EcPublic(c) => write!(f, "EC public key ({:?})", c),
            KeyKind::EcPrivate(c) => write!(f, "EC private key ({:?})", c),
            KeyKind::EdwardsPublic(c) => {
                write!(f, "Edwards public key ({:?})", c)
            }
            KeyKind::EdwardsPrivate(c) => {
                write!(f, "Edwards private key ({:?})", c)
            }
            KeyKind::MontgomeryPublic(c) => {
                write!(f, "Montgomery public key ({:?})", c)
            }
            KeyKind::MontgomeryPrivate(c) => {
                write!(f, "Montgomery private key ({:?})", c)
            }
            KeyKind::MlKemPublic => write!(f, "ML-KEM public key"),
            KeyKind::MlKemPrivate => write!(f, "ML-KEM private key"),
            KeyKind::MlDsaPublic => write!(f, "ML-DSA public key"),
            KeyKind::MlDsaPrivate => write!(f, "ML-DSA private key"),
            KeyKind::SlhDsaPublic => write!(f, "SLH-DSA public key"),
            KeyKind::SlhDsaPrivate => write!(f, "SLH-DSA private key"),
            KeyKind::Secret(kt) => write!(f, "secret key (type {:#x})", kt),
        }
    }
}

/// Resolves the curve of an EC family key and checks it belongs to the
/// family declared by the key type
fn curve_of(obj: &Object, key_type: CK_KEY_TYPE) -> Result<Curve> {
    let params = match obj.get_attr_as_bytes(CKA_EC_PARAMS) {
        Ok(p) => p,
        Err(_) => {
            return Err(Error::ck_rv_with_errmsg(
                CKR_ATTRIBUTE_VALUE_INVALID,
                format!("{} is missing", attr_name(CKA_EC_PARAMS)),
            ))
        }
    };
    let curve = Curve::from_ec_params(params)?;
    if curve.key_type() != key_type {
        return Err(Error::ck_rv_with_errmsg(
            CKR_ATTRIBUTE_VALUE_INVALID,
            format!("curve {:?} does not match key type {:#x}", curve, key_type),
        ));
    }
    Ok(curve)
}

/// Error returned when a view is requested over the wrong kind of key
fn wrong_kind(expected: &str, found: KeyKind) -> Error {
    Error::ck_rv_with_errmsg(
        CKR_KEY_HANDLE_INVALID,
        format!("expected {}, got {}", expected, found),
    )
}

fn required_bytes(obj: &Object, attr: CK_ATTRIBUTE_TYPE) -> Result<Vec<u8>> {
    match obj.get_attr_as_bytes(attr) {
        Ok(v) if !v.is_empty() => Ok(v.clone()),
        _ => Err(Error::ck_rv_with_errmsg(
            CKR_ATTRIBUTE_VALUE_INVALID,
            format!("{} is missing or empty", attr_name(attr)),
        )),
    }
}

fn required_ulong(obj: &Object, attr: CK_ATTRIBUTE_TYPE) -> Result<CK_ULONG> {
    match obj.get_attr_as_ulong(attr) {
        Ok(v) => Ok(v),
        Err(_) => Err(Error::ck_rv_with_errmsg(
            CKR_ATTRIBUTE_VALUE_INVALID,
            format!("{} is missing", attr_name(attr)),
        )),
    }
}

/// Creates a bare key object of the given class and type
fn new_key_object(class: CK_OBJECT_CLASS, key_type: CK_KEY_TYPE) -> Result<Object> {
    let mut obj = Object::new(class);
    obj.set_attr(Attribute::from_ulong(CKA_KEY_TYPE, key_type))?;
    obj.generate_unique();
    Ok(obj)
}

/// Strips leading zeros from a big endian integer
fn trimmed(data: &[u8]) -> &[u8] {
    match data.iter().position(|b| *b != 0) {
        Some(idx) => &data[idx..],
        None => &data[data.len()..],
    }
}

/// RSA public key components as big endian integers
#[derive(Debug, Clone)]
pub struct RsaPublicKey {
    pub modulus: Vec<u8>,
    pub public_exponent: Vec<u8>,
}

impl RsaPublicKey {
    pub fn from_object(obj: &Object) -> Result<RsaPublicKey> {
        match KeyKind::of(obj)? {
            KeyKind::RsaPublic => (),
            k => return Err(wrong_kind("RSA public key", k)),
        }
        Ok(RsaPublicKey {
            modulus: required_bytes(obj, CKA_MODULUS)?,
            public_exponent: required_bytes(obj, CKA_PUBLIC_EXPONENT)?,
        })
    }

    pub fn to_object(&self) -> Result<Object> {
        let mut obj = new_key_object(CKO_PUBLIC_KEY, CKK_RSA)?;
        obj.set_attr(Attribute::from_bytes(CKA_MODULUS, self.modulus.clone()))?;
        obj.set_attr(Attribute::from_bytes(
            CKA_PUBLIC_EXPONENT,
            self.public_exponent.clone(),
        ))?;
        obj.set_attr(Attribute::from_ulong(
            CKA_MODULUS_BITS,
            usize_to_ulong(self.modulus_len() * 8)?,
        ))?;
        Ok(obj)
    }

    /// Length of the modulus in bytes
    pub fn modulus_len(&self) -> usize {
        trimmed(&self.modulus).len()
    }
}

/// RSA private key components as big endian integers
///
/// The primes are optional, the engine recovers them from the
/// exponents when they are not available.
#[derive(Debug, Clone)]
pub struct RsaPrivateKey {
    pub modulus: Vec<u8>,
    pub public_exponent: Vec<u8>,
    pub private_exponent: Vec<u8>,
    pub prime_1: Option<Vec<u8>>,
    pub prime_2: Option<Vec<u8>>,
}

impl Drop for RsaPrivateKey {
    fn drop(&mut self) {
        zeromem(&mut self.private_exponent);
        if let Some(p) = &mut self.prime_1 {
            zeromem(p);
        }
        if let Some(q) = &mut self.prime_2 {
            zeromem(q);
        }
    }
}

impl RsaPrivateKey {
    pub fn from_object(obj: &Object) -> Result<RsaPrivateKey> {
        match KeyKind::of(obj)? {
            KeyKind::RsaPrivate => (),
            k => return Err(wrong_kind("RSA private key", k)),
        }
        let optional = |attr| match obj.get_attr_as_bytes(attr) {
            Ok(v) if !v.is_empty() => Some(v.clone()),
            _ => None,
        };
        Ok(RsaPrivateKey {
            modulus: required_bytes(obj, CKA_MODULUS)?,
            public_exponent: required_bytes(obj, CKA_PUBLIC_EXPONENT)?,
            private_exponent: required_bytes(obj, CKA_PRIVATE_EXPONENT)?,
            prime_1: optional(CKA_PRIME_1),
            prime_2: optional(CKA_PRIME_2),
        })
    }

    pub fn to_object(&self) -> Result<Object> {
        let mut obj = new_key_object(CKO_PRIVATE_KEY, CKK_RSA)?;
        obj.set_attr(Attribute::from_bytes(CKA_MODULUS, self.modulus.clone()))?;
        obj.set_attr(Attribute::from_bytes(
            CKA_PUBLIC_EXPONENT,
            self.public_exponent.clone(),
        ))?;
        obj.set_attr(Attribute::from_bytes(
            CKA_PRIVATE_EXPONENT,
            self.private_exponent.clone(),
        ))?;
        if let Some(p) = &self.prime_1 {
            obj.set_attr(Attribute::from_bytes(CKA_PRIME_1, p.clone()))?;
        }
        if let Some(q) = &self.prime_2 {
            obj.set_attr(Attribute::from_bytes(CKA_PRIME_2, q.clone()))?;
        }
        Ok(obj)
    }

    /// Length of the modulus in bytes
    pub fn modulus_len(&self) -> usize {
        trimmed(&self.modulus).len()
    }
}

/// An elliptic curve public key of any of the EC families, the point is
/// kept in its raw form
#[derive(Debug, Clone)]
pub struct EcPublicKey {
    pub curve: Curve,
    pub point: Vec<u8>,
}

impl EcPublicKey {
    /// Builds the view from a public key of the family identified by
    /// `key_type` (one of CKK_EC, CKK_EC_EDWARDS, CKK_EC_MONTGOMERY)
    pub fn from_object(obj: &Object, key_type: CK_KEY_TYPE) -> Result<EcPublicKey> {
        let kind = KeyKind::of(obj)?;
        let curve = match kind {
            KeyKind::EcPublic(c)
            | KeyKind::EdwardsPublic(c)
            | KeyKind::MontgomeryPublic(c)
                if c.key_type() == key_type =>
            {
                c
            }
            k => {
                return Err(wrong_kind(
                    &format!("public key of type {:#x}", key_type),
                    k,
                ))
            }
        };
        let point = match ec::decode_point(curve, &required_bytes(obj, CKA_EC_POINT)?) {
            Ok(p) => p,
            Err(_) => {
                return Err(Error::ck_rv_with_errmsg(
                    CKR_ATTRIBUTE_VALUE_INVALID,
                    format!("malformed {}", attr_name(CKA_EC_POINT)),
                ))
            }
        };
        Ok(EcPublicKey {
            curve: curve,
            point: point,
        })
    }

    pub fn to_object(&self) -> Result<Object> {
        let mut obj = new_key_object(CKO_PUBLIC_KEY, self.curve.key_type())?;
        obj.set_attr(Attribute::from_bytes(
            CKA_EC_PARAMS,
            self.curve.ec_params()?,
        ))?;
        obj.set_attr(Attribute::from_bytes(
            CKA_EC_POINT,
            ec::point_to_attr(self.curve, &self.point)?,
        ))?;
        Ok(obj)
    }
}

/// An elliptic curve private key of any of the EC families
#[derive(Debug, Clone)]
pub struct EcPrivateKey {
    pub curve: Curve,
    pub value: Vec<u8>,
}

impl Drop for EcPrivateKey {
    fn drop(&mut self) {
        zeromem(&mut self.value);
    }
}

impl EcPrivateKey {
    /// Builds the view from a private key of the family identified by
    /// `key_type`. Scalars shorter than the curve size are left padded.
    pub fn from_object(obj: &Object, key_type: CK_KEY_TYPE) -> Result<EcPrivateKey> {
        let kind = KeyKind::of(obj)?;
        let curve = match kind {
            KeyKind::EcPrivate(c)
            | KeyKind::EdwardsPrivate(c)
            | KeyKind::MontgomeryPrivate(c)
                if c.key_type() == key_type =>
            {
                c
            }
            k => {
                return Err(wrong_kind(
                    &format!("private key of type {:#x}", key_type),
                    k,
                ))
            }
        };
        let mut raw = required_bytes(obj, CKA_VALUE)?;
        let size = curve.key_size();
        if raw.len() > size {
            zeromem(&mut raw);
            return Err(Error::ck_rv_with_errmsg(
                CKR_ATTRIBUTE_VALUE_INVALID,
                format!("private value too long for curve {:?}", curve),
            ));
        }
        let mut value = vec![0u8; size - raw.len()];
        value.extend_from_slice(&raw);
        zeromem(&mut raw);
        Ok(EcPrivateKey {
            curve: curve,
            value: value,
        })
    }

    pub fn to_object(&self) -> Result<Object> {
        let mut obj = new_key_object(CKO_PRIVATE_KEY, self.curve.key_type())?;
        obj.set_attr(Attribute::from_bytes(
            CKA_EC_PARAMS,
            self.curve.ec_params()?,
        ))?;
        obj.set_attr(Attribute::from_bytes(CKA_VALUE, self.value.clone()))?;
        Ok(obj)
    }
}

/// Helper macro that generates the views of the post-quantum key
/// types, which all carry a parameter set and a raw value
macro_rules! pqc_key_view {
    ($name:ident; $class:expr; $ktype:expr; $kind:ident; $desc:expr) => {
        #[doc = concat!("A ", $desc, " with its parameter set and raw encoding")]
        #[derive(Debug, Clone)]
        pub struct $name {
            pub parameter_set: CK_ULONG,
            pub value: Vec<u8>,
        }

        impl Drop for $name {
            fn drop(&mut self) {
                zeromem(&mut self.value);
            }
        }

        impl $name {
            pub fn from_object(obj: &Object) -> Result<$name> {
                match KeyKind::of(obj)? {
                    KeyKind::$kind => (),
                    k => return Err(wrong_kind($desc, k)),
                }
                Ok($name {
                    parameter_set: required_ulong(obj, CKA_PARAMETER_SET)?,
                    value: required_bytes(obj, CKA_VALUE)?,
                })
            }

            pub fn to_object(&self) -> Result<Object> {
                let mut obj = new_key_object($class, $ktype)?;
                obj.set_attr(Attribute::from_ulong(
                    CKA_PARAMETER_SET,
                    self.parameter_set,
                ))?;
                obj.set_attr(Attribute::from_bytes(
                    CKA_VALUE,
                    self.value.clone(),
                ))?;
                Ok(obj)
            }
        }
    };
}

pqc_key_view!(MlKemPublicKey; CKO_PUBLIC_KEY; CKK_ML_KEM; MlKemPublic; "ML-KEM public key");
pqc_key_view!(MlKemPrivateKey; CKO_PRIVATE_KEY; CKK_ML_KEM; MlKemPrivate; "ML-KEM private key");
pqc_key_view!(MlDsaPublicKey; CKO_PUBLIC_KEY; CKK_ML_DSA; MlDsaPublic; "ML-DSA public key");
pqc_key_view!(MlDsaPrivateKey; CKO_PRIVATE_KEY; CKK_ML_DSA; MlDsaPrivate; "ML-DSA private key");
pqc_key_view!(SlhDsaPublicKey; CKO_PUBLIC_KEY; CKK_SLH_DSA; SlhDsaPublic; "SLH-DSA public key");
pqc_key_view!(SlhDsaPrivateKey; CKO_PRIVATE_KEY; CKK_SLH_DSA; SlhDsaPrivate; "SLH-DSA private key");

/// A secret key and its raw value
#[derive(Debug, Clone)]
pub struct SecretKey {
    pub key_type: CK_KEY_TYPE,
    pub value: Vec<u8>,
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        zeromem(&mut self.value);
    }
}

impl SecretKey {
    pub fn from_object(obj: &Object) -> Result<SecretKey> {
        let key_type = match KeyKind::of(obj)? {
            KeyKind::Secret(kt) => kt,
            k => return Err(wrong_kind("secret key", k)),
        };
        Ok(SecretKey {
            key_type: key_type,
            value: required_bytes(obj, CKA_VALUE)?,
        })
    }

    /// Same as [SecretKey::from_object] but restricts the accepted key
    /// types to the `allowed` list
    pub fn from_object_of_types(obj: &Object, allowed: &[CK_KEY_TYPE]) -> Result<SecretKey> {
        let key = SecretKey::from_object(obj)?;
        if !allowed.contains(&key.key_type) {
            return Err(wrong_kind(
                &format!("secret key of types {:x?}", allowed),
                KeyKind::Secret(key.key_type),
            ));
        }
        Ok(key)
    }
}

/// Resolves the kind of `key` and checks that it is one the mechanism
/// accepts and that the usage flag `op` is set on it
pub fn bind_key<F>(
    mech: CK_MECHANISM_TYPE,
    key: &Object,
    op: CK_ATTRIBUTE_TYPE,
    expected: &str,
    accept: F,
) -> Result<KeyKind>
where
    F: Fn(KeyKind) -> bool,
{
    let kind = KeyKind::of(key)?;
    if !accept(kind) {
        error!(
            "{} required key of type {}, got {}",
            mech_type_to_name(mech),
            expected,
            kind
        );
        return Err(Error::ck_rv_with_errmsg(
            CKR_KEY_HANDLE_INVALID,
            format!(
                "mechanism {} required key of type {}",
                mech_type_to_name(mech),
                expected
            ),
        ));
    }
    if let Err(e) = key.check_permission(op) {
        error!("{}: {}", mech_type_to_name(mech), e);
        return Err(e);
    }
    Ok(kind)
}

fn invalid(msg: String) -> Error {
    Error::ck_rv_with_errmsg(CKR_ATTRIBUTE_VALUE_INVALID, msg)
}

/// Checks the attributes of a key object are present and consistent
/// with its type, any violation is reported as
/// `CKR_ATTRIBUTE_VALUE_INVALID`
pub fn validate(obj: &Object) -> Result<()> {
    let kind = match KeyKind::of(obj) {
        Ok(k) => k,
        Err(e) => return Err(Error::ck_rv_from_error(CKR_ATTRIBUTE_VALUE_INVALID, e)),
    };
    match kind {
        KeyKind::RsaPublic => {
            RsaPublicKey::from_object(obj)?;
        }
        KeyKind::RsaPrivate => {
            RsaPrivateKey::from_object(obj)?;
        }
        KeyKind::EcPublic(_)
        | KeyKind::EdwardsPublic(_)
        | KeyKind::MontgomeryPublic(_) => {
            let curve = kind.curve().ok_or(CKR_GENERAL_ERROR)?;
            EcPublicKey::from_object(obj, curve.key_type())?;
        }
        KeyKind::EcPrivate(_)
        | KeyKind::EdwardsPrivate(_)
        | KeyKind::MontgomeryPrivate(_) => {
            let curve = kind.curve().ok_or(CKR_GENERAL_ERROR)?;
            EcPrivateKey::from_object(obj, curve.key_type())?;
        }
        KeyKind::MlKemPublic | KeyKind::MlKemPrivate => {
            let ps = required_ulong(obj, CKA_PARAMETER_SET)?;
            let (ek, dk, _) = mlkem_sizes(ps).ok_or_else(|| {
                invalid(format!("invalid ML-KEM parameter set {}", ps))
            })?;
            let len = required_bytes(obj, CKA_VALUE)?.len();
            let expected = if kind == KeyKind::MlKemPublic { ek } else { dk };
            if len != expected {
                return Err(invalid(format!(
                    "ML-KEM key length {} does not match parameter set {}",
                    len, ps
                )));
            }
        }
        KeyKind::MlDsaPublic | KeyKind::MlDsaPrivate => {
            let ps = required_ulong(obj, CKA_PARAMETER_SET)?;
            let (pk, sk, _) = mldsa_sizes(ps).ok_or_else(|| {
                invalid(format!("invalid ML-DSA parameter set {}", ps))
            })?;
            let len = required_bytes(obj, CKA_VALUE)?.len();
            let expected = if kind == KeyKind::MlDsaPublic { pk } else { sk };
            if len != expected {
                return Err(invalid(format!(
                    "ML-DSA key length {} does not match parameter set {}",
                    len, ps
                )));
            }
        }
        KeyKind::SlhDsaPublic | KeyKind::SlhDsaPrivate => {
            let ps = required_ulong(obj, CKA_PARAMETER_SET)?;
            let (pk, sk, _) = slhdsa_sizes(ps).ok_or_else(|| {
                invalid(format!("invalid SLH-DSA parameter set {}", ps))
            })?;
            let len = required_bytes(obj, CKA_VALUE)?.len();
            let expected = if kind == KeyKind::SlhDsaPublic { pk } else { sk };
            if len != expected {
                return Err(invalid(format!(
                    "SLH-DSA key length {} does not match parameter set {}",
                    len, ps
                )));
            }
        }
        KeyKind::Secret(kt) => {
            let len = match obj.get_attr_as_bytes(CKA_VALUE) {
                Ok(v) => v.len(),
                Err(_) => 0,
            };
            if !secret_len_valid(kt, len) {
                return Err(invalid(format!(
                    "invalid secret length {} for key type {:#x}",
                    len, kt
                )));
            }
        }
    }
    Ok(())
}

/// Computes the `CKA_CHECK_VALUE` of a secret
fn check_value(key_type: CK_KEY_TYPE, value: &[u8]) -> Result<Vec<u8>> {
    let mut kcv = match (key_type, value.len()) {
        (CKK_AES | CKK_CAMELLIA, 16 | 24 | 32) => {
            cipher::ecb_encrypt(key_type, value, &[0u8; cipher::BLOCK_SIZE])?
        }
        _ => DigestAlg::Sha1.digest(value),
    };
    kcv.truncate(3);
    Ok(kcv)
}

/// Recomputes the attributes derived from the secret value of a secret
/// key: `CKA_VALUE_LEN` and `CKA_CHECK_VALUE`
pub fn recompute_attributes(obj: &mut Object) -> Result<()> {
    let key_type = obj.get_attr_as_ulong(CKA_KEY_TYPE)?;
    let (len, kcv) = {
        let value = obj.get_attr_as_bytes(CKA_VALUE)?;
        (value.len(), check_value(key_type, value)?)
    };
    obj.set_attr(Attribute::from_ulong(CKA_VALUE_LEN, usize_to_ulong(len)?))?;
    obj.set_attr(Attribute::from_bytes(CKA_CHECK_VALUE, kcv))?;
    Ok(())
}

/// Attributes that identify the object, never copied as overrides
const FIXED_SECRET_ATTRIBUTES: [CK_ATTRIBUTE_TYPE; 2] =
    [CKA_CLASS, CKA_KEY_TYPE];

/// Attributes computed from the secret, ignored in templates
const COMPUTED_SECRET_ATTRIBUTES: [CK_ATTRIBUTE_TYPE; 3] =
    [CKA_VALUE_LEN, CKA_CHECK_VALUE, CKA_UNIQUE_ID];

/// Defaults applied to every new secret key before the template
const SECRET_KEY_DEFAULTS: [(CK_ATTRIBUTE_TYPE, bool); 17] = [
    (CKA_TOKEN, false),
    (CKA_PRIVATE, true),
    (CKA_MODIFIABLE, true),
    (CKA_COPYABLE, true),
    (CKA_DESTROYABLE, true),
    (CKA_SENSITIVE, false),
    (CKA_EXTRACTABLE, true),
    (CKA_LOCAL, false),
    (CKA_DERIVE, false),
    (CKA_ENCRYPT, false),
    (CKA_DECRYPT, false),
    (CKA_SIGN, false),
    (CKA_VERIFY, false),
    (CKA_WRAP, false),
    (CKA_UNWRAP, false),
    (CKA_ENCAPSULATE, false),
    (CKA_DECAPSULATE, false),
];

/// Builds new secret key objects out of a caller template and freshly
/// computed key material
#[derive(Debug, Clone)]
pub struct SecretKeyBuilder {
    key_type: CK_KEY_TYPE,
    requested_len: Option<usize>,
    overrides: Vec<Attribute>,
}

impl SecretKeyBuilder {
    /// Parses the output template of an operation
    ///
    /// The key type defaults to `CKK_GENERIC_SECRET`. A template that
    /// names another class, an unsupported key type, a value, or a
    /// length the key type can't have is `CKR_TEMPLATE_INCONSISTENT`.
    pub fn from_template(template: &[Attribute]) -> Result<SecretKeyBuilder> {
        let mut key_type = CKK_GENERIC_SECRET;
        let mut requested_len = None;
        for attr in template {
            if let Err(e) = attr.check_type() {
                return Err(Error::ck_rv_from_error(CKR_TEMPLATE_INCONSISTENT, e));
            }
            match attr.get_type() {
                CKA_CLASS => {
                    if attr.to_ulong()? != CKO_SECRET_KEY {
                        return Err(Error::ck_rv_with_errmsg(
                            CKR_TEMPLATE_INCONSISTENT,
                            "the output key must be a secret key".to_string(),
                        ));
                    }
                }
                CKA_KEY_TYPE => key_type = attr.to_ulong()?,
                CKA_VALUE => {
                    return Err(Error::ck_rv_with_errmsg(
                        CKR_TEMPLATE_INCONSISTENT,
                        "CKA_VALUE can't be provided in the template".to_string(),
                    ))
                }
                CKA_VALUE_LEN => {
                    requested_len = Some(ulong_to_usize(attr.to_ulong()?)?)
                }
                _ => (),
            }
        }
        let overrides = template
            .iter()
            .filter(|a| {
                let t = a.get_type();
                !FIXED_SECRET_ATTRIBUTES.contains(&t)
                    && !COMPUTED_SECRET_ATTRIBUTES.contains(&t)
            })
            .cloned()
            .collect::<Vec<Attribute>>();
        if !is_secret_key_type(key_type) {
            return Err(Error::ck_rv_with_errmsg(
                CKR_TEMPLATE_INCONSISTENT,
                format!("key type {:#x} is not a secret key type", key_type),
            ));
        }
        if let (Some(required), Some(requested)) =
            (secret_required_len(key_type), requested_len)
        {
            if required != requested {
                return Err(Error::ck_rv_with_errmsg(
                    CKR_TEMPLATE_INCONSISTENT,
                    format!(
                        "CKA_VALUE_LEN {} conflicts with key type length {}",
                        requested, required
                    ),
                ));
            }
        }
        Ok(SecretKeyBuilder {
            key_type: key_type,
            requested_len: requested_len,
            overrides: overrides,
        })
    }

    /// The key type of the secret being built
    pub fn key_type(&self) -> CK_KEY_TYPE {
        self.key_type
    }

    /// The `CKA_VALUE_LEN` requested in the template, if any
    pub fn requested_len(&self) -> Option<usize> {
        self.requested_len
    }

    /// The length the secret must have: fixed by the key type or else
    /// requested by the template
    pub fn required_len(&self) -> Option<usize> {
        match secret_required_len(self.key_type) {
            Some(len) => Some(len),
            None => self.requested_len,
        }
    }

    /// The minimum length accepted for the key type
    pub fn min_len(&self) -> usize {
        secret_min_len(self.key_type)
    }

    /// The smallest secret an operation must produce to satisfy this
    /// template
    pub fn minimal_secret_len(&self) -> usize {
        match self.required_len() {
            Some(len) => len,
            None => self.min_len(),
        }
    }

    /// Adjusts a produced secret to the required length
    ///
    /// Longer secrets are truncated keeping the leading bytes, shorter
    /// ones fail with `CKR_KEY_SIZE_RANGE`.
    pub fn reconcile(&self, mut secret: Vec<u8>) -> Result<Vec<u8>> {
        match self.required_len() {
            Some(required) => {
                if secret.len() > required {
                    info!(
                        "Secret truncated from {} to {} bytes for key type {:#x}",
                        secret.len(),
                        required,
                        self.key_type
                    );
                    zeromem(&mut secret[required..]);
                    secret.truncate(required);
                } else if secret.len() < required {
                    let len = secret.len();
                    zeromem(&mut secret);
                    return Err(Error::ck_rv_with_errmsg(
                        CKR_KEY_SIZE_RANGE,
                        format!(
                            "secret of {} bytes is shorter than the required {}",
                            len, required
                        ),
                    ));
                }
            }
            None => {
                if secret.len() < self.min_len() {
                    let len = secret.len();
                    zeromem(&mut secret);
                    return Err(Error::ck_rv_with_errmsg(
                        CKR_KEY_SIZE_RANGE,
                        format!(
                            "secret of {} bytes is shorter than the minimum {}",
                            len,
                            self.min_len()
                        ),
                    ));
                }
            }
        }
        Ok(secret)
    }

    /// Builds the secret key object holding the reconciled `secret`
    pub fn build(&self, secret: Vec<u8>) -> Result<Object> {
        let value = self.reconcile(secret)?;
        let mut obj = Object::new(CKO_SECRET_KEY);
        obj.set_attr(Attribute::from_ulong(CKA_KEY_TYPE, self.key_type))?;
        for (attr, val) in SECRET_KEY_DEFAULTS {
            obj.set_attr(Attribute::from_bool(attr, val))?;
        }
        for attr in &self.overrides {
            obj.set_attr(attr.clone())?;
        }
        obj.set_attr(Attribute::from_bytes(CKA_VALUE, value))?;
        obj.generate_unique();
        let sensitive = obj.is_sensitive();
        let extractable = obj.is_extractable();
        obj.set_attr(Attribute::from_bool(CKA_ALWAYS_SENSITIVE, sensitive))?;
        obj.set_attr(Attribute::from_bool(CKA_NEVER_EXTRACTABLE, !extractable))?;
        recompute_attributes(&mut obj)?;
        Ok(obj)
    }
}
