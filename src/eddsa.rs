// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! This module implements the PKCS#11 EdDSA mechanism for Ed25519 keys.
//!
//! The optional `CK_EDDSA_PARAMS` select Ed25519ph with an optional
//! context, no parameters mean pure Ed25519.

use std::fmt::Debug;

use crate::capability::RandomSource;
use crate::config::HedgePreference;
use crate::ec::Curve;
use crate::error::{Error, Result};
use crate::mechanism::{
    AuthenticatedSigner, Mechanism, MechanismValue, Mechanisms, Signer,
    WrapperSigner,
};
use crate::native::eddsa::EddsaEngine;
use crate::object::key::{bind_key, EcPrivateKey, EcPublicKey};
use crate::object::{KeyKind, Object};
use crate::params::{CkEddsaParams, MechanismParams};
use crate::pkcs11::*;
use crate::sign::{authenticated, check_context, EngineSigner};

use log::error;
use once_cell::sync::Lazy;

/// Object that holds the EdDSA mechanism
static EDDSA_MECH: Lazy<Box<dyn Mechanism>> = Lazy::new(|| {
    Box::new(EddsaMechanism {
        info: CK_MECHANISM_INFO {
            ulMinKeySize: 256,
            ulMaxKeySize: 256,
            flags: CKF_SIGN | CKF_VERIFY,
        },
    })
});

/// Registers the EdDSA mechanism
pub fn register(mechs: &mut Mechanisms) {
    mechs.add_mechanism(CKM_EDDSA, &(*EDDSA_MECH));
}

#[derive(Debug)]
struct EddsaMechanism {
    info: CK_MECHANISM_INFO,
}

impl Mechanism for EddsaMechanism {
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
        let (prehash, context) = match CkEddsaParams::decode_optional(
            mech.params(),
        )? {
            None => (false, None),
            Some(p) => {
                let ctx = check_context(p.context)?;
                if !p.ph_flag && !ctx.is_empty() {
                    error!("Ed25519ctx is not supported");
                    return Err(Error::ck_rv_with_errmsg(
                        CKR_MECHANISM_PARAM_INVALID,
                        "a context requires the prehash flag".to_string(),
                    ));
                }
                (p.ph_flag, if ctx.is_empty() { None } else { Some(ctx) })
            }
        };
        Ok(Box::new(EddsaWrapperSigner {
            prehash: prehash,
            context: context,
        }))
    }
}

/// Rejects the Edwards curves without an engine
fn check_curve(curve: Curve) -> Result<()> {
    match curve {
        Curve::Ed25519 => Ok(()),
        c => {
            error!("EdDSA over {:?} is not supported", c);
            Err(Error::ck_rv_with_errmsg(
                CKR_CURVE_NOT_SUPPORTED,
                format!("curve {:?} is not supported", c),
            ))
        }
    }
}

#[derive(Debug)]
struct EddsaWrapperSigner {
    prehash: bool,
    context: Option<Vec<u8>>,
}

impl WrapperSigner for EddsaWrapperSigner {
    fn mechanism(&self) -> CK_MECHANISM_TYPE {
        CKM_EDDSA
    }

    fn into_signing_signer<'a>(
        self: Box<Self>,
        key: &Object,
        rng: &'a mut dyn RandomSource,
    ) -> Result<AuthenticatedSigner<'a>> {
        bind_key(CKM_EDDSA, key, CKA_SIGN, "EC Edwards private key", |k| {
            matches!(k, KeyKind::EdwardsPrivate(_))
        })?;
        let privkey = EcPrivateKey::from_object(key, CKK_EC_EDWARDS)?;
        check_curve(privkey.curve)?;
        let engine =
            EddsaEngine::signing(&privkey.value, self.prehash, self.context)?;
        let signer =
            EngineSigner::signing(CKM_EDDSA, Box::new(engine), None, rng);
        Ok(authenticated(key, Box::new(signer)))
    }

    fn into_validation_signer(
        self: Box<Self>,
        key: &Object,
    ) -> Result<Box<dyn Signer>> {
        bind_key(CKM_EDDSA, key, CKA_VERIFY, "EC Edwards public key", |k| {
            matches!(k, KeyKind::EdwardsPublic(_))
        })?;
        let pubkey = EcPublicKey::from_object(key, CKK_EC_EDWARDS)?;
        check_curve(pubkey.curve)?;
        let engine =
            EddsaEngine::verifying(&pubkey.point, self.prehash, self.context)?;
        Ok(Box::new(EngineSigner::verifying(
            CKM_EDDSA,
            Box::new(engine),
            None,
        )))
    }
}
