// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! This module implements the PKCS#11 ML-DSA signature mechanisms as
//! specified in [FIPS 204](https://doi.org/10.6028/NIST.FIPS.204):
//! _Module-Lattice-Based Digital Signature Standard_.
//!
//! Three forms are provided: pure ML-DSA, HashML-DSA with the pre-hash
//! named in the parameters, and HashML-DSA with the pre-hash fixed by
//! the mechanism.

use std::fmt::Debug;

use crate::capability::RandomSource;
use crate::config::HedgePreference;
use crate::error::Result;
use crate::mechanism::{
    mech_type_to_name, AuthenticatedSigner, Mechanism, MechanismValue,
    Mechanisms, Signer, WrapperSigner,
};
use crate::native::mldsa::MlDsaEngine;
use crate::native::PrehashAlg;
use crate::object::key::{bind_key, MlDsaPrivateKey, MlDsaPublicKey};
use crate::object::{KeyKind, Object};
use crate::pkcs11::*;
use crate::sign::{authenticated, EngineSigner, PqcSignOptions};

use log::debug;
use once_cell::sync::Lazy;

/// HashML-DSA mechanisms with the pre-hash fixed by the mechanism
const MLDSA_FIXED_HASH: [(CK_MECHANISM_TYPE, PrehashAlg); 10] = [
    (CKM_HASH_ML_DSA_SHA224, PrehashAlg::Sha224),
    (CKM_HASH_ML_DSA_SHA256, PrehashAlg::Sha256),
    (CKM_HASH_ML_DSA_SHA384, PrehashAlg::Sha384),
    (CKM_HASH_ML_DSA_SHA512, PrehashAlg::Sha512),
    (CKM_HASH_ML_DSA_SHA3_224, PrehashAlg::Sha3_224),
    (CKM_HASH_ML_DSA_SHA3_256, PrehashAlg::Sha3_256),
    (CKM_HASH_ML_DSA_SHA3_384, PrehashAlg::Sha3_384),
    (CKM_HASH_ML_DSA_SHA3_512, PrehashAlg::Sha3_512),
    (CKM_HASH_ML_DSA_SHAKE128, PrehashAlg::Shake128),
    (CKM_HASH_ML_DSA_SHAKE256, PrehashAlg::Shake256),
];

/// Object that holds Mechanisms for ML-DSA
static MLDSA_MECH: Lazy<Box<dyn Mechanism>> = Lazy::new(|| {
    Box::new(MlDsaMechanism {
        info: CK_MECHANISM_INFO {
            ulMinKeySize: 1312,
            ulMaxKeySize: 2592,
            flags: CKF_SIGN | CKF_VERIFY,
        },
    })
});

/// Registers all ML-DSA signature mechanisms
pub fn register(mechs: &mut Mechanisms) {
    mechs.add_mechanism(CKM_ML_DSA, &(*MLDSA_MECH));
    mechs.add_mechanism(CKM_HASH_ML_DSA, &(*MLDSA_MECH));
    for (ckm, _) in &MLDSA_FIXED_HASH {
        mechs.add_mechanism(*ckm, &(*MLDSA_MECH));
    }
}

#[derive(Debug)]
struct MlDsaMechanism {
    info: CK_MECHANISM_INFO,
}

impl Mechanism for MlDsaMechanism {
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
        let options = match mech.mechanism() {
            CKM_ML_DSA => PqcSignOptions::from_params(mech, hedge, false, None)?,
            CKM_HASH_ML_DSA => {
                PqcSignOptions::from_params(mech, hedge, true, None)?
            }
            ckm => match MLDSA_FIXED_HASH.iter().find(|(m, _)| *m == ckm) {
                Some((_, ph)) => {
                    PqcSignOptions::from_params(mech, hedge, false, Some(*ph))?
                }
                None => return Err(CKR_MECHANISM_INVALID)?,
            },
        };
        debug!("{}: {:?}", mech_type_to_name(mech.mechanism()), options);
        Ok(Box::new(MlDsaWrapperSigner {
            mechanism: mech.mechanism(),
            options: options,
        }))
    }
}

#[derive(Debug)]
struct MlDsaWrapperSigner {
    mechanism: CK_MECHANISM_TYPE,
    options: PqcSignOptions,
}

impl MlDsaWrapperSigner {
    fn engine(
        &self,
        param_set: CK_ML_DSA_PARAMETER_SET_TYPE,
        key: &[u8],
        private: bool,
    ) -> Result<MlDsaEngine> {
        let mut engine = MlDsaEngine::new(param_set, key, private)?;
        engine.configure(
            self.options.deterministic,
            self.options.context.clone(),
            self.options.prehash,
        );
        Ok(engine)
    }
}

impl WrapperSigner for MlDsaWrapperSigner {
    fn mechanism(&self) -> CK_MECHANISM_TYPE {
        self.mechanism
    }

    fn into_signing_signer<'a>(
        self: Box<Self>,
        key: &Object,
        rng: &'a mut dyn RandomSource,
    ) -> Result<AuthenticatedSigner<'a>> {
        bind_key(self.mechanism, key, CKA_SIGN, "ML-DSA private key", |k| {
            k == KeyKind::MlDsaPrivate
        })?;
        let privkey = MlDsaPrivateKey::from_object(key)?;
        let engine = self.engine(privkey.parameter_set, &privkey.value, true)?;
        let signer =
            EngineSigner::signing(self.mechanism, Box::new(engine), None, rng);
        Ok(authenticated(key, Box::new(signer)))
    }

    fn into_validation_signer(
        self: Box<Self>,
        key: &Object,
    ) -> Result<Box<dyn Signer>> {
        bind_key(self.mechanism, key, CKA_VERIFY, "ML-DSA public key", |k| {
            k == KeyKind::MlDsaPublic
        })?;
        let pubkey = MlDsaPublicKey::from_object(key)?;
        let engine = self.engine(pubkey.parameter_set, &pubkey.value, false)?;
        Ok(Box::new(EngineSigner::verifying(
            self.mechanism,
            Box::new(engine),
            None,
        )))
    }
}
