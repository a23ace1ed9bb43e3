// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! The `CKM_POLY1305` one-time authenticator ([RFC 8439]).
//!
//! [RFC 8439]: https://www.rfc-editor.org/rfc/rfc8439

use std::fmt::Debug;

use crate::capability::RandomSource;
use crate::config::HedgePreference;
use crate::error::Result;
use crate::mechanism::{
    AuthenticatedSigner, Mechanism, MechanismValue, Mechanisms, Signer,
    WrapperSigner,
};
use crate::native::mac::poly1305_engine;
use crate::object::key::{bind_key, SecretKey};
use crate::object::{KeyKind, Object};
use crate::pkcs11::*;
use crate::sign::MacSigner;

use once_cell::sync::Lazy;

static POLY1305_MECH: Lazy<Box<dyn Mechanism>> = Lazy::new(|| {
    Box::new(Poly1305Mechanism {
        info: CK_MECHANISM_INFO {
            ulMinKeySize: 32,
            ulMaxKeySize: 32,
            flags: CKF_SIGN | CKF_VERIFY,
        },
    })
});

pub fn register(mechs: &mut Mechanisms) {
    mechs.add_mechanism(CKM_POLY1305, &(*POLY1305_MECH));
}

#[derive(Debug)]
struct Poly1305Mechanism {
    info: CK_MECHANISM_INFO,
}

impl Mechanism for Poly1305Mechanism {
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
        if !mech.params().is_empty() {
            return Err(CKR_MECHANISM_PARAM_INVALID)?;
        }
        Ok(Box::new(Poly1305WrapperSigner {}))
    }
}

#[derive(Debug)]
struct Poly1305WrapperSigner {}

fn poly1305_signer(key: &Object, op: CK_ATTRIBUTE_TYPE) -> Result<MacSigner> {
    bind_key(CKM_POLY1305, key, op, "Poly1305 key", |k| {
        k == KeyKind::Secret(CKK_POLY1305)
    })?;
    let secret = SecretKey::from_object_of_types(key, &[CKK_POLY1305])?;
    MacSigner::new(CKM_POLY1305, poly1305_engine(&secret.value)?, None)
}

impl WrapperSigner for Poly1305WrapperSigner {
    fn mechanism(&self) -> CK_MECHANISM_TYPE {
        CKM_POLY1305
    }

    fn into_signing_signer<'a>(
        self: Box<Self>,
        key: &Object,
        _: &'a mut dyn RandomSource,
    ) -> Result<AuthenticatedSigner<'a>> {
        Ok(AuthenticatedSigner {
            signer: Box::new(poly1305_signer(key, CKA_SIGN)?),
            always_authenticate: false,
        })
    }

    fn into_validation_signer(
        self: Box<Self>,
        key: &Object,
    ) -> Result<Box<dyn Signer>> {
        Ok(Box::new(poly1305_signer(key, CKA_VERIFY)?))
    }
}
