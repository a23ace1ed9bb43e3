// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! This module implements the PKCS#11 ECDSA mechanisms over the NIST
//! prime curves.
//!
//! `CKM_ECDSA` signs the data as given, which must be a precomputed
//! hash, the hash bound variants digest the message first. Signatures
//! use the fixed size `r || s` encoding.

use std::fmt::Debug;

use crate::capability::RandomSource;
use crate::config::HedgePreference;
use crate::error::Result;
use crate::mechanism::{
    AuthenticatedSigner, Mechanism, MechanismValue, Mechanisms, Signer,
    WrapperSigner,
};
use crate::native::digest::DigestAlg;
use crate::native::ecc::EcdsaEngine;
use crate::object::key::{bind_key, EcPrivateKey, EcPublicKey};
use crate::object::{KeyKind, Object};
use crate::pkcs11::*;
use crate::sign::{authenticated, EngineSigner};

use once_cell::sync::Lazy;

const MIN_EC_SIZE_BITS: CK_ULONG = 256;
const MAX_EC_SIZE_BITS: CK_ULONG = 521;

/// ECDSA mechanisms bound to a digest
const ECDSA_HASHED: [(CK_MECHANISM_TYPE, DigestAlg); 9] = [
    (CKM_ECDSA_SHA1, DigestAlg::Sha1),
    (CKM_ECDSA_SHA224, DigestAlg::Sha224),
    (CKM_ECDSA_SHA256, DigestAlg::Sha256),
    (CKM_ECDSA_SHA384, DigestAlg::Sha384),
    (CKM_ECDSA_SHA512, DigestAlg::Sha512),
    (CKM_ECDSA_SHA3_224, DigestAlg::Sha3_224),
    (CKM_ECDSA_SHA3_256, DigestAlg::Sha3_256),
    (CKM_ECDSA_SHA3_384, DigestAlg::Sha3_384),
    (CKM_ECDSA_SHA3_512, DigestAlg::Sha3_512),
];

/// Object that holds Mechanisms for ECDSA
static ECDSA_MECH: Lazy<Box<dyn Mechanism>> = Lazy::new(|| {
    Box::new(EcdsaMechanism {
        info: CK_MECHANISM_INFO {
            ulMinKeySize: MIN_EC_SIZE_BITS,
            ulMaxKeySize: MAX_EC_SIZE_BITS,
            flags: CKF_SIGN | CKF_VERIFY,
        },
    })
});

/// Registers all ECDSA mechanisms
pub fn register(mechs: &mut Mechanisms) {
    mechs.add_mechanism(CKM_ECDSA, &(*ECDSA_MECH));
    for (ckm, _) in &ECDSA_HASHED {
        mechs.add_mechanism(*ckm, &(*ECDSA_MECH));
    }
}

#[derive(Debug)]
struct EcdsaMechanism {
    info: CK_MECHANISM_INFO,
}

impl Mechanism for EcdsaMechanism {
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
        let digest = match mech.mechanism() {
            CKM_ECDSA => None,
            ckm => match ECDSA_HASHED.iter().find(|(m, _)| *m == ckm) {
                Some((_, alg)) => Some(*alg),
                None => return Err(CKR_MECHANISM_INVALID)?,
            },
        };
        if !mech.params().is_empty() {
            return Err(CKR_MECHANISM_PARAM_INVALID)?;
        }
        Ok(Box::new(EcdsaWrapperSigner {
            mechanism: mech.mechanism(),
            digest: digest,
        }))
    }
}

#[derive(Debug)]
struct EcdsaWrapperSigner {
    mechanism: CK_MECHANISM_TYPE,
    digest: Option<DigestAlg>,
}

impl WrapperSigner for EcdsaWrapperSigner {
    fn mechanism(&self) -> CK_MECHANISM_TYPE {
        self.mechanism
    }

    fn into_signing_signer<'a>(
        self: Box<Self>,
        key: &Object,
        rng: &'a mut dyn RandomSource,
    ) -> Result<AuthenticatedSigner<'a>> {
        bind_key(self.mechanism, key, CKA_SIGN, "EC private key", |k| {
            matches!(k, KeyKind::EcPrivate(_))
        })?;
        let privkey = EcPrivateKey::from_object(key, CKK_EC)?;
        let engine = EcdsaEngine::signing(privkey.curve, &privkey.value)?;
        let signer = EngineSigner::signing(
            self.mechanism,
            Box::new(engine),
            self.digest.map(|d| d.engine()),
            rng,
        );
        Ok(authenticated(key, Box::new(signer)))
    }

    fn into_validation_signer(
        self: Box<Self>,
        key: &Object,
    ) -> Result<Box<dyn Signer>> {
        bind_key(self.mechanism, key, CKA_VERIFY, "EC public key", |k| {
            matches!(k, KeyKind::EcPublic(_))
        })?;
        let pubkey = EcPublicKey::from_object(key, CKK_EC)?;
        let engine = EcdsaEngine::verifying(pubkey.curve, &pubkey.point)?;
        Ok(Box::new(EngineSigner::verifying(
            self.mechanism,
            Box::new(engine),
            self.digest.map(|d| d.engine()),
        )))
    }
}
