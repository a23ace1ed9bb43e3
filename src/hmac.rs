// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! This module implements the PKCS#11 HMAC mechanisms, both the full
//! length ones and the `_GENERAL` variants that truncate the output to
//! the length given in the mechanism parameters.

use std::fmt::Debug;

use crate::capability::RandomSource;
use crate::config::HedgePreference;
use crate::error::Result;
use crate::mechanism::{
    mech_type_to_name, AuthenticatedSigner, Mechanism, MechanismValue,
    Mechanisms, Signer, WrapperSigner,
};
use crate::native::digest::DigestAlg;
use crate::native::mac::hmac_engine;
use crate::object::key::{bind_key, SecretKey};
use crate::object::{KeyKind, Object};
use crate::pkcs11::*;
use crate::sign::{mac_general_len, MacSigner};

use log::trace;
use once_cell::sync::Lazy;

/// One row per digest: the plain and general mechanisms, the digest
/// and the dedicated HMAC key type, if PKCS#11 defines one
struct HmacFamily {
    plain: CK_MECHANISM_TYPE,
    general: Option<CK_MECHANISM_TYPE>,
    digest: DigestAlg,
    key_type: Option<CK_KEY_TYPE>,
}

macro_rules! hmac_family {
    ($plain:expr, $general:expr, $digest:expr, $kt:expr) => {
        HmacFamily {
            plain: $plain,
            general: $general,
            digest: $digest,
            key_type: $kt,
        }
    };
}

const HMAC_FAMILIES: [HmacFamily; 20] = [
    hmac_family!(CKM_MD2_HMAC, Some(CKM_MD2_HMAC_GENERAL), DigestAlg::Md2, None),
    hmac_family!(
        CKM_MD5_HMAC,
        Some(CKM_MD5_HMAC_GENERAL),
        DigestAlg::Md5,
        Some(CKK_MD5_HMAC)
    ),
    hmac_family!(
        CKM_SHA_1_HMAC,
        Some(CKM_SHA_1_HMAC_GENERAL),
        DigestAlg::Sha1,
        Some(CKK_SHA_1_HMAC)
    ),
    hmac_family!(
        CKM_RIPEMD128_HMAC,
        Some(CKM_RIPEMD128_HMAC_GENERAL),
        DigestAlg::Ripemd128,
        Some(CKK_RIPEMD128_HMAC)
    ),
    hmac_family!(
        CKM_RIPEMD160_HMAC,
        Some(CKM_RIPEMD160_HMAC_GENERAL),
        DigestAlg::Ripemd160,
        Some(CKK_RIPEMD160_HMAC)
    ),
    hmac_family!(
        CKM_SHA224_HMAC,
        Some(CKM_SHA224_HMAC_GENERAL),
        DigestAlg::Sha224,
        Some(CKK_SHA224_HMAC)
    ),
    hmac_family!(
        CKM_SHA256_HMAC,
        Some(CKM_SHA256_HMAC_GENERAL),
        DigestAlg::Sha256,
        Some(CKK_SHA256_HMAC)
    ),
    hmac_family!(
        CKM_SHA384_HMAC,
        Some(CKM_SHA384_HMAC_GENERAL),
        DigestAlg::Sha384,
        Some(CKK_SHA384_HMAC)
    ),
    hmac_family!(
        CKM_SHA512_HMAC,
        Some(CKM_SHA512_HMAC_GENERAL),
        DigestAlg::Sha512,
        Some(CKK_SHA512_HMAC)
    ),
    hmac_family!(
        CKM_SHA512_224_HMAC,
        Some(CKM_SHA512_224_HMAC_GENERAL),
        DigestAlg::Sha512_224,
        None
    ),
    hmac_family!(
        CKM_SHA512_256_HMAC,
        Some(CKM_SHA512_256_HMAC_GENERAL),
        DigestAlg::Sha512_256,
        None
    ),
    hmac_family!(
        CKM_SHA3_224_HMAC,
        Some(CKM_SHA3_224_HMAC_GENERAL),
        DigestAlg::Sha3_224,
        Some(CKK_SHA3_224_HMAC)
    ),
    hmac_family!(
        CKM_SHA3_256_HMAC,
        Some(CKM_SHA3_256_HMAC_GENERAL),
        DigestAlg::Sha3_256,
        Some(CKK_SHA3_256_HMAC)
    ),
    hmac_family!(
        CKM_SHA3_384_HMAC,
        Some(CKM_SHA3_384_HMAC_GENERAL),
        DigestAlg::Sha3_384,
        Some(CKK_SHA3_384_HMAC)
    ),
    hmac_family!(
        CKM_SHA3_512_HMAC,
        Some(CKM_SHA3_512_HMAC_GENERAL),
        DigestAlg::Sha3_512,
        Some(CKK_SHA3_512_HMAC)
    ),
    hmac_family!(
        CKM_BLAKE2B_160_HMAC,
        Some(CKM_BLAKE2B_160_HMAC_GENERAL),
        DigestAlg::Blake2b160,
        Some(CKK_BLAKE2B_160_HMAC)
    ),
    hmac_family!(
        CKM_BLAKE2B_256_HMAC,
        Some(CKM_BLAKE2B_256_HMAC_GENERAL),
        DigestAlg::Blake2b256,
        Some(CKK_BLAKE2B_256_HMAC)
    ),
    hmac_family!(
        CKM_BLAKE2B_384_HMAC,
        Some(CKM_BLAKE2B_384_HMAC_GENERAL),
        DigestAlg::Blake2b384,
        Some(CKK_BLAKE2B_384_HMAC)
    ),
    hmac_family!(
        CKM_BLAKE2B_512_HMAC,
        Some(CKM_BLAKE2B_512_HMAC_GENERAL),
        DigestAlg::Blake2b512,
        Some(CKK_BLAKE2B_512_HMAC)
    ),
    hmac_family!(CKM_GOSTR3411_HMAC, None, DigestAlg::Gost94, None),
];

/// Object that holds Mechanisms for HMAC
static HMAC_MECH: Lazy<Box<dyn Mechanism>> = Lazy::new(|| {
    Box::new(HmacMechanism {
        info: CK_MECHANISM_INFO {
            ulMinKeySize: 1,
            ulMaxKeySize: 1024,
            flags: CKF_SIGN | CKF_VERIFY,
        },
    })
});

/// Registers all HMAC mechanisms
pub fn register(mechs: &mut Mechanisms) {
    for family in &HMAC_FAMILIES {
        mechs.add_mechanism(family.plain, &(*HMAC_MECH));
        if let Some(general) = family.general {
            mechs.add_mechanism(general, &(*HMAC_MECH));
        }
    }
}

#[derive(Debug)]
struct HmacMechanism {
    info: CK_MECHANISM_INFO,
}

impl Mechanism for HmacMechanism {
    fn info(&self) -> &CK_MECHANISM_INFO {
        &self.info
    }

    fn wrapper_signer(
        &self,
        mech: &MechanismValue,
        _: HedgePreference,
    ) -> Result<Box<dyn WrapperSigner>> {
        if self.info.flags & CKF_SIGN != CKF_SIGN {
            return Err(CKR_MECHANISM_INVALID)?;
        }
        let ckm = mech.mechanism();
        let family = match HMAC_FAMILIES
            .iter()
            .find(|f| f.plain == ckm || f.general == Some(ckm))
        {
            Some(f) => f,
            None => return Err(CKR_MECHANISM_INVALID)?,
        };
        let outlen = mac_general_len(mech, family.general == Some(ckm))?;
        let mut key_types = vec![CKK_GENERIC_SECRET];
        if let Some(kt) = family.key_type {
            key_types.push(kt);
        }
        trace!("{} with output length {:?}", mech_type_to_name(ckm), outlen);
        Ok(Box::new(HmacWrapperSigner {
            mechanism: ckm,
            digest: family.digest,
            key_types: key_types,
            outlen: outlen,
        }))
    }
}

#[derive(Debug)]
struct HmacWrapperSigner {
    mechanism: CK_MECHANISM_TYPE,
    digest: DigestAlg,
    key_types: Vec<CK_KEY_TYPE>,
    outlen: Option<usize>,
}

impl HmacWrapperSigner {
    fn signer(&self, key: &Object, op: CK_ATTRIBUTE_TYPE) -> Result<MacSigner> {
        bind_key(self.mechanism, key, op, "HMAC secret key", |k| match k {
            KeyKind::Secret(kt) => self.key_types.contains(&kt),
            _ => false,
        })?;
        let secret = SecretKey::from_object_of_types(key, &self.key_types)?;
        let mac = hmac_engine(self.digest, &secret.value)?;
        MacSigner::new(self.mechanism, mac, self.outlen)
    }
}

impl WrapperSigner for HmacWrapperSigner {
    fn mechanism(&self) -> CK_MECHANISM_TYPE {
        self.mechanism
    }

    fn into_signing_signer<'a>(
        self: Box<Self>,
        key: &Object,
        _: &'a mut dyn RandomSource,
    ) -> Result<AuthenticatedSigner<'a>> {
        let signer = self.signer(key, CKA_SIGN)?;
        Ok(AuthenticatedSigner {
            signer: Box::new(signer),
            always_authenticate: false,
        })
    }

    fn into_validation_signer(
        self: Box<Self>,
        key: &Object,
    ) -> Result<Box<dyn Signer>> {
        Ok(Box::new(self.signer(key, CKA_VERIFY)?))
    }
}
