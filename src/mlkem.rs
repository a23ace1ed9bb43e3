// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! This module implements the PKCS#11 ML-KEM mechanism, the post-quantum
//! Key Encapsulation Mechanism specified in
//! [FIPS 203](https://doi.org/10.6028/NIST.FIPS.203).
//!
//! The shared secret produced by the KEM is returned as a new secret key
//! object, the ciphertext is the encapsulated data.

use std::fmt::Debug;

use crate::attribute::Attribute;
use crate::capability::{KemEngine, RandomSource};
use crate::encapsulate::EncapsulatorBase;
use crate::error::Result;
use crate::mechanism::{Encapsulator, Mechanism, MechanismValue, Mechanisms};
use crate::native::mlkem::MlKemEngine;
use crate::object::key::{mlkem_sizes, MlKemPrivateKey, MlKemPublicKey};
use crate::object::{KeyKind, Object};
use crate::pkcs11::*;

use log::{error, trace};
use once_cell::sync::Lazy;
use zeroize::Zeroizing;

/// Object that holds the ML-KEM mechanism
static MLKEM_MECH: Lazy<Box<dyn Mechanism>> = Lazy::new(|| {
    Box::new(MlKemMechanism {
        info: CK_MECHANISM_INFO {
            ulMinKeySize: 800,
            ulMaxKeySize: 1568,
            flags: CKF_ENCAPSULATE | CKF_DECAPSULATE,
        },
    })
});

/// Registers the ML-KEM mechanism
pub fn register(mechs: &mut Mechanisms) {
    mechs.add_mechanism(CKM_ML_KEM, &(*MLKEM_MECH));
}

#[derive(Debug)]
struct MlKemMechanism {
    info: CK_MECHANISM_INFO,
}

impl Mechanism for MlKemMechanism {
    fn info(&self) -> &CK_MECHANISM_INFO {
        &self.info
    }

    fn encapsulator(
        &self,
        mech: &MechanismValue,
        key_type: CK_KEY_TYPE,
    ) -> Result<Box<dyn Encapsulator>> {
        if self.info.flags & CKF_ENCAPSULATE != CKF_ENCAPSULATE {
            return Err(CKR_MECHANISM_INVALID)?;
        }
        if key_type != CKK_ML_KEM {
            error!("CKM_ML_KEM can't be used with key type {:#x}", key_type);
            return Err(CKR_KEY_HANDLE_INVALID)?;
        }
        if !mech.params().is_empty() {
            return Err(CKR_MECHANISM_PARAM_INVALID)?;
        }
        Ok(Box::new(MlKemEncapsulator {
            base: EncapsulatorBase::new(CKM_ML_KEM),
        }))
    }
}

/// ML-KEM encapsulation and decapsulation
#[derive(Debug)]
struct MlKemEncapsulator {
    base: EncapsulatorBase,
}

impl MlKemEncapsulator {
    fn public_key(&self, key: &Object) -> Result<MlKemPublicKey> {
        self.base.check_public(key, "ML-KEM public key", |k| {
            k == KeyKind::MlKemPublic
        })?;
        MlKemPublicKey::from_object(key)
    }
}

impl Encapsulator for MlKemEncapsulator {
    fn mechanism(&self) -> CK_MECHANISM_TYPE {
        self.base.mechanism()
    }

    fn init(&mut self, template: &[Attribute]) -> Result<()> {
        self.base.init(template)
    }

    fn encapsulated_data_len(&self, key: &Object) -> Result<usize> {
        let pubkey = self.public_key(key)?;
        match mlkem_sizes(pubkey.parameter_set) {
            Some((_, _, ct_len)) => Ok(ct_len),
            None => Err(CKR_KEY_HANDLE_INVALID)?,
        }
    }

    fn encapsulate(
        &mut self,
        key: &Object,
        rng: &mut dyn RandomSource,
    ) -> Result<(Object, Vec<u8>)> {
        let pubkey = self.public_key(key)?;
        trace!("ML-KEM encapsulation, parameter set {}", pubkey.parameter_set);
        /* fail before running the KEM on an uninitialized operation */
        self.base.builder()?;
        let engine = MlKemEngine::new(pubkey.parameter_set, &pubkey.value)?;
        let (secret, ct) = engine.encapsulate(rng)?;
        let obj = self.base.secret_key(Zeroizing::new(secret))?;
        Ok((obj, ct))
    }

    fn decapsulate(&mut self, key: &Object, data: &[u8]) -> Result<Object> {
        self.base.check_private(key, "ML-KEM private key", |k| {
            k == KeyKind::MlKemPrivate
        })?;
        let privkey = MlKemPrivateKey::from_object(key)?;
        trace!("ML-KEM decapsulation, parameter set {}", privkey.parameter_set);
        self.base.builder()?;
        let engine = MlKemEngine::new(privkey.parameter_set, &privkey.value)?;
        let secret = Zeroizing::new(engine.decapsulate(data)?);
        self.base.secret_key(secret)
    }
}
