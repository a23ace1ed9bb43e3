// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! This module implements the digest based key derivation mechanisms:
//! the new secret is the digest of the base key's value.

use std::fmt::Debug;

use crate::attribute::Attribute;
use crate::derive::DeriveBase;
use crate::error::Result;
use crate::mechanism::{
    DeriveKeyGenerator, Mechanism, MechanismValue, Mechanisms,
};
use crate::native::digest::DigestAlg;
use crate::object::{Object, ObjectStore};
use crate::pkcs11::*;

use log::trace;
use once_cell::sync::Lazy;
use zeroize::Zeroizing;

const DIGEST_DERIVE: [(CK_MECHANISM_TYPE, DigestAlg); 19] = [
    (CKM_MD2_KEY_DERIVATION, DigestAlg::Md2),
    (CKM_MD5_KEY_DERIVATION, DigestAlg::Md5),
    (CKM_SHA1_KEY_DERIVATION, DigestAlg::Sha1),
    (CKM_SHA224_KEY_DERIVATION, DigestAlg::Sha224),
    (CKM_SHA256_KEY_DERIVATION, DigestAlg::Sha256),
    (CKM_SHA384_KEY_DERIVATION, DigestAlg::Sha384),
    (CKM_SHA512_KEY_DERIVATION, DigestAlg::Sha512),
    (CKM_SHA512_224_KEY_DERIVATION, DigestAlg::Sha512_224),
    (CKM_SHA512_256_KEY_DERIVATION, DigestAlg::Sha512_256),
    (CKM_SHA3_224_KEY_DERIVATION, DigestAlg::Sha3_224),
    (CKM_SHA3_256_KEY_DERIVATION, DigestAlg::Sha3_256),
    (CKM_SHA3_384_KEY_DERIVATION, DigestAlg::Sha3_384),
    (CKM_SHA3_512_KEY_DERIVATION, DigestAlg::Sha3_512),
    (CKM_SHAKE_128_KEY_DERIVATION, DigestAlg::Shake128),
    (CKM_SHAKE_256_KEY_DERIVATION, DigestAlg::Shake256),
    (CKM_BLAKE2B_160_KEY_DERIVE, DigestAlg::Blake2b160),
    (CKM_BLAKE2B_256_KEY_DERIVE, DigestAlg::Blake2b256),
    (CKM_BLAKE2B_384_KEY_DERIVE, DigestAlg::Blake2b384),
    (CKM_BLAKE2B_512_KEY_DERIVE, DigestAlg::Blake2b512),
];

/// Object that holds Mechanisms for digest derivation
static DIGEST_DERIVE_MECH: Lazy<Box<dyn Mechanism>> = Lazy::new(|| {
    Box::new(DigestDeriveMechanism {
        info: CK_MECHANISM_INFO {
            ulMinKeySize: 0,
            ulMaxKeySize: 0,
            flags: CKF_DERIVE,
        },
    })
});

/// Registers all digest derivation mechanisms
pub fn register(mechs: &mut Mechanisms) {
    for (ckm, _) in &DIGEST_DERIVE {
        mechs.add_mechanism(*ckm, &(*DIGEST_DERIVE_MECH));
    }
}

#[derive(Debug)]
struct DigestDeriveMechanism {
    info: CK_MECHANISM_INFO,
}

impl Mechanism for DigestDeriveMechanism {
    fn info(&self) -> &CK_MECHANISM_INFO {
        &self.info
    }

    fn derive_generator(
        &self,
        mech: &MechanismValue,
        _: &dyn ObjectStore,
    ) -> Result<Box<dyn DeriveKeyGenerator>> {
        if self.info.flags & CKF_DERIVE != CKF_DERIVE {
            return Err(CKR_MECHANISM_INVALID)?;
        }
        let alg = match DIGEST_DERIVE
            .iter()
            .find(|(m, _)| *m == mech.mechanism())
        {
            Some((_, alg)) => *alg,
            None => return Err(CKR_MECHANISM_INVALID)?,
        };
        if !mech.params().is_empty() {
            return Err(CKR_MECHANISM_PARAM_INVALID)?;
        }
        Ok(Box::new(DigestDerive {
            base: DeriveBase::new(mech.mechanism()),
            alg: alg,
        }))
    }
}

#[derive(Debug)]
struct DigestDerive {
    base: DeriveBase,
    alg: DigestAlg,
}

impl DeriveKeyGenerator for DigestDerive {
    fn mechanism(&self) -> CK_MECHANISM_TYPE {
        self.base.mechanism()
    }

    fn init(&mut self, template: &[Attribute]) -> Result<()> {
        self.base.init(template)
    }

    fn generate(&mut self, base: &Object) -> Result<Object> {
        let secret = self.base.base_secret(base)?;
        trace!(
            "Deriving {:?} over a key of {} bytes",
            self.alg,
            secret.value.len()
        );
        let value = Zeroizing::new(self.alg.digest(&secret.value));
        self.base.derived_key(base, value)
    }
}
