// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! This module implements CMAC ([NIST SP 800-38B]) over AES and
//! Camellia, as `CKM_AES_CMAC` and `CKM_CAMELLIA_MAC` plus their
//! `_GENERAL` variants.
//!
//! [NIST SP 800-38B]: https://doi.org/10.6028/NIST.SP.800-38B

use std::fmt::Debug;

use crate::capability::RandomSource;
use crate::config::HedgePreference;
use crate::error::Result;
use crate::mechanism::{
    AuthenticatedSigner, Mechanism, MechanismValue, Mechanisms, Signer,
    WrapperSigner,
};
use crate::native::mac::cmac_engine;
use crate::object::key::{bind_key, SecretKey};
use crate::object::{KeyKind, Object};
use crate::pkcs11::*;
use crate::sign::{mac_general_len, MacSigner};

use once_cell::sync::Lazy;

/// Object that holds Mechanisms for CMAC
static CMAC_MECH: Lazy<Box<dyn Mechanism>> = Lazy::new(|| {
    Box::new(CmacMechanism {
        info: CK_MECHANISM_INFO {
            ulMinKeySize: 16,
            ulMaxKeySize: 32,
            flags: CKF_SIGN | CKF_VERIFY,
        },
    })
});

/// Registers the CMAC mechanisms
pub fn register(mechs: &mut Mechanisms) {
    for ckm in &[
        CKM_AES_CMAC,
        CKM_AES_CMAC_GENERAL,
        CKM_CAMELLIA_MAC,
        CKM_CAMELLIA_MAC_GENERAL,
    ] {
        mechs.add_mechanism(*ckm, &(*CMAC_MECH));
    }
}

#[derive(Debug)]
struct CmacMechanism {
    info: CK_MECHANISM_INFO,
}

impl Mechanism for CmacMechanism {
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
        let (key_type, general) = match mech.mechanism() {
            CKM_AES_CMAC => (CKK_AES, false),
            CKM_AES_CMAC_GENERAL => (CKK_AES, true),
            CKM_CAMELLIA_MAC => (CKK_CAMELLIA, false),
            CKM_CAMELLIA_MAC_GENERAL => (CKK_CAMELLIA, true),
            _ => return Err(CKR_MECHANISM_INVALID)?,
        };
        Ok(Box::new(CmacWrapperSigner {
            mechanism: mech.mechanism(),
            key_type: key_type,
            outlen: mac_general_len(mech, general)?,
        }))
    }
}

#[derive(Debug)]
struct CmacWrapperSigner {
    mechanism: CK_MECHANISM_TYPE,
    key_type: CK_KEY_TYPE,
    outlen: Option<usize>,
}

impl CmacWrapperSigner {
    fn signer(&self, key: &Object, op: CK_ATTRIBUTE_TYPE) -> Result<MacSigner> {
        let expected = if self.key_type == CKK_AES {
            "AES key"
        } else {
            "Camellia key"
        };
        bind_key(self.mechanism, key, op, expected, |k| {
            k == KeyKind::Secret(self.key_type)
        })?;
        let secret = SecretKey::from_object_of_types(key, &[self.key_type])?;
        let mac = cmac_engine(self.key_type, &secret.value)?;
        MacSigner::new(self.mechanism, mac, self.outlen)
    }
}

impl WrapperSigner for CmacWrapperSigner {
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
