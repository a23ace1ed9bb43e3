// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! This module implements the PKCS#11 SLH-DSA signature mechanisms as
//! specified in [FIPS 205](https://doi.org/10.6028/NIST.FIPS.205):
//! _Stateless Hash-Based Digital Signature Standard_, for all twelve
//! parameter sets.

use std::fmt::Debug;

use crate::capability::RandomSource;
use crate::config::HedgePreference;
use crate::error::Result;
use crate::mechanism::{
    mech_type_to_name, AuthenticatedSigner, Mechanism, MechanismValue,
    Mechanisms, Signer, WrapperSigner,
};
use crate::native::slhdsa::SlhDsaEngine;
use crate::native::PrehashAlg;
use crate::object::key::{bind_key, SlhDsaPrivateKey, SlhDsaPublicKey};
use crate::object::{KeyKind, Object};
use crate::pkcs11::*;
use crate::sign::{authenticated, EngineSigner, PqcSignOptions};

use log::debug;
use once_cell::sync::Lazy;

/// HashSLH-DSA mechanisms with the pre-hash fixed by the mechanism
const SLHDSA_FIXED_HASH: [(CK_MECHANISM_TYPE, PrehashAlg); 10] = [
    (CKM_HASH_SLH_DSA_SHA224, PrehashAlg::Sha224),
    (CKM_HASH_SLH_DSA_SHA256, PrehashAlg::Sha256),
    (CKM_HASH_SLH_DSA_SHA384, PrehashAlg::Sha384),
    (CKM_HASH_SLH_DSA_SHA512, PrehashAlg::Sha512),
    (CKM_HASH_SLH_DSA_SHA3_224, PrehashAlg::Sha3_224),
    (CKM_HASH_SLH_DSA_SHA3_256, PrehashAlg::Sha3_256),
    (CKM_HASH_SLH_DSA_SHA3_384, PrehashAlg::Sha3_384),
    (CKM_HASH_SLH_DSA_SHA3_512, PrehashAlg::Sha3_512),
    (CKM_HASH_SLH_DSA_SHAKE128, PrehashAlg::Shake128),
    (CKM_HASH_SLH_DSA_SHAKE256, PrehashAlg::Shake256),
];

/// Object that holds Mechanisms for SLH-DSA
static SLHDSA_MECH: Lazy<Box<dyn Mechanism>> = Lazy::new(|| {
    Box::new(SlhDsaMechanism {
        info: CK_MECHANISM_INFO {
            ulMinKeySize: 32,
            ulMaxKeySize: 64,
            flags: CKF_SIGN | CKF_VERIFY,
        },
    })
});

/// Registers all SLH-DSA signature mechanisms
pub fn register(mechs: &mut Mechanisms) {
    for ckm in &[CKM_SLH_DSA, CKM_HASH_SLH_DSA] {
        mechs.add_mechanism(*ckm, &(*SLHDSA_MECH));
    }
    for (ckm, _) in &SLHDSA_FIXED_HASH {
        mechs.add_mechanism(*ckm, &(*SLHDSA_MECH));
    }
}

#[derive(Debug)]
struct SlhDsaMechanism {
    info: CK_MECHANISM_INFO,
}

impl Mechanism for SlhDsaMechanism {
    fn info(&self) -> &CK_MECHANISM_INFO {
        &self.info
    }

    fn wrapper_signer(
        &self,
        mech: &MechanismValue,
        hedge: HedgePreference,
    ) -> Result<Box<dyn WrapperSigner>> {
        if self.info.flags & CKF_SIGN != CKF_SIGN {
            return Err(CKR_MECHANISM_INVALID)?;
        }
        let ckm = mech.mechanism();
        let fixed = SLHDSA_FIXED_HASH
            .iter()
            .find(|(m, _)| *m == ckm)
            .map(|(_, ph)| *ph);
        let options = match (ckm, fixed) {
            (CKM_SLH_DSA, _) => {
                PqcSignOptions::from_params(mech, hedge, false, None)?
            }
            (CKM_HASH_SLH_DSA, _) => {
                PqcSignOptions::from_params(mech, hedge, true, None)?
            }
            (_, Some(ph)) => {
                PqcSignOptions::from_params(mech, hedge, false, Some(ph))?
            }
            _ => return Err(CKR_MECHANISM_INVALID)?,
        };
        debug!("{}: {:?}", mech_type_to_name(ckm), options);
        Ok(Box::new(SlhDsaWrapperSigner {
            mechanism: ckm,
            options: options,
        }))
    }
}

#[derive(Debug)]
struct SlhDsaWrapperSigner {
    mechanism: CK_MECHANISM_TYPE,
    options: PqcSignOptions,
}

impl SlhDsaWrapperSigner {
    fn engine(
        &self,
        param_set: CK_SLH_DSA_PARAMETER_SET_TYPE,
        key: &[u8],
        private: bool,
    ) -> Result<SlhDsaEngine> {
        let mut engine = SlhDsaEngine::new(param_set, key, private)?;
        engine.configure(
            self.options.deterministic,
            self.options.context.clone(),
            self.options.prehash,
        );
        Ok(engine)
    }
}

impl WrapperSigner for SlhDsaWrapperSigner {
    fn mechanism(&self) -> CK_MECHANISM_TYPE {
        self.mechanism
    }

    fn into_signing_signer<'a>(
        self: Box<Self>,
        key: &Object,
        rng: &'a mut dyn RandomSource,
    ) -> Result<AuthenticatedSigner<'a>> {
        bind_key(self.mechanism, key, CKA_SIGN, "SLH-DSA private key", |k| {
            k == KeyKind::SlhDsaPrivate
        })?;
        let privkey = SlhDsaPrivateKey::from_object(key)?;
        let engine = self.engine(privkey.parameter_set, &privkey.value, true)?;
        let signer =
            EngineSigner::signing(self.mechanism, Box::new(engine), None, rng);
        Ok(authenticated(key, Box::new(signer)))
    }

    fn into_validation_signer(
        self: Box<Self>,
        key: &Object,
    ) -> Result<Box<dyn Signer>> {
        bind_key(self.mechanism, key, CKA_VERIFY, "SLH-DSA public key", |k| {
            k == KeyKind::SlhDsaPublic
        })?;
        let pubkey = SlhDsaPublicKey::from_object(key)?;
        let engine = self.engine(pubkey.parameter_set, &pubkey.value, false)?;
        Ok(Box::new(EngineSigner::verifying(
            self.mechanism,
            Box::new(engine),
            None,
        )))
    }
}
