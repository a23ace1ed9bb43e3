// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! This module implements the AES and Camellia `*_ENCRYPT_DATA` key
//! derivations, where the new secret is the caller data encrypted
//! under the base key in ECB or CBC mode without padding.

use std::fmt::Debug;

use crate::attribute::Attribute;
use crate::derive::DeriveBase;
use crate::error::{Error, Result};
use crate::mechanism::{
    mech_type_to_name, DeriveKeyGenerator, Mechanism, MechanismValue,
    Mechanisms,
};
use crate::native::cipher::{cbc_encrypt, ecb_encrypt, BLOCK_SIZE};
use crate::object::key::SecretKey;
use crate::object::{KeyKind, Object, ObjectStore};
use crate::params::{
    CkCbcEncryptDataParams, CkKeyDerivationStringData, MechanismParams,
};
use crate::pkcs11::*;

use log::error;
use once_cell::sync::Lazy;
use zeroize::Zeroizing;

/// Object that holds Mechanisms for the encrypt data derivations
static ENCRYPT_DATA_MECH: Lazy<Box<dyn Mechanism>> = Lazy::new(|| {
    Box::new(EncryptDataMechanism {
        info: CK_MECHANISM_INFO {
            ulMinKeySize: 16,
            ulMaxKeySize: 32,
            flags: CKF_DERIVE,
        },
    })
});

/// Registers the AES and Camellia encrypt data derivations
pub fn register(mechs: &mut Mechanisms) {
    for ckm in &[
        CKM_AES_ECB_ENCRYPT_DATA,
        CKM_AES_CBC_ENCRYPT_DATA,
        CKM_CAMELLIA_ECB_ENCRYPT_DATA,
        CKM_CAMELLIA_CBC_ENCRYPT_DATA,
    ] {
        mechs.add_mechanism(*ckm, &(*ENCRYPT_DATA_MECH));
    }
}

fn param_error(mech: CK_MECHANISM_TYPE, msg: String) -> Error {
    error!("{}: {}", mech_type_to_name(mech), msg);
    Error::ck_rv_with_errmsg(CKR_MECHANISM_PARAM_INVALID, msg)
}

#[derive(Debug)]
struct EncryptDataMechanism {
    info: CK_MECHANISM_INFO,
}

impl Mechanism for EncryptDataMechanism {
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
        let ckm = mech.mechanism();
        let (key_type, iv, data) = match ckm {
            CKM_AES_ECB_ENCRYPT_DATA | CKM_CAMELLIA_ECB_ENCRYPT_DATA => {
                let p = CkKeyDerivationStringData::decode(mech.params())?;
                (key_type_of(ckm), None, p.0)
            }
            CKM_AES_CBC_ENCRYPT_DATA | CKM_CAMELLIA_CBC_ENCRYPT_DATA => {
                let p = CkCbcEncryptDataParams::decode(mech.params())?;
                if p.iv.len() != BLOCK_SIZE {
                    return Err(param_error(
                        ckm,
                        format!("the IV must be {} bytes", BLOCK_SIZE),
                    ));
                }
                (key_type_of(ckm), Some(p.iv), p.data)
            }
            _ => return Err(CKR_MECHANISM_INVALID)?,
        };
        if data.is_empty() || data.len() % BLOCK_SIZE != 0 {
            return Err(param_error(
                ckm,
                format!(
                    "data length {} is not a multiple of {}",
                    data.len(),
                    BLOCK_SIZE
                ),
            ));
        }
        Ok(Box::new(EncryptDataDerive {
            base: DeriveBase::new(ckm),
            key_type: key_type,
            iv: iv,
            data: Zeroizing::new(data),
        }))
    }
}

fn key_type_of(mech: CK_MECHANISM_TYPE) -> CK_KEY_TYPE {
    match mech {
        CKM_CAMELLIA_ECB_ENCRYPT_DATA | CKM_CAMELLIA_CBC_ENCRYPT_DATA => {
            CKK_CAMELLIA
        }
        _ => CKK_AES,
    }
}

#[derive(Debug)]
struct EncryptDataDerive {
    base: DeriveBase,
    key_type: CK_KEY_TYPE,
    iv: Option<Vec<u8>>,
    data: Zeroizing<Vec<u8>>,
}

impl DeriveKeyGenerator for EncryptDataDerive {
    fn mechanism(&self) -> CK_MECHANISM_TYPE {
        self.base.mechanism()
    }

    fn init(&mut self, template: &[Attribute]) -> Result<()> {
        self.base.init(template)
    }

    fn generate(&mut self, base: &Object) -> Result<Object> {
        let key_type = self.key_type;
        self.base
            .check_base(base, |k| k == KeyKind::Secret(key_type))?;
        let key = SecretKey::from_object_of_types(base, &[key_type])?;
        let result = match &self.iv {
            None => ecb_encrypt(key_type, &key.value, &self.data),
            Some(iv) => cbc_encrypt(key_type, &key.value, iv, &self.data),
        };
        let secret = match result {
            Ok(s) => Zeroizing::new(s),
            Err(e) if e.rv() == CKR_DATA_LEN_RANGE => {
                return Err(Error::ck_rv_from_error(
                    CKR_MECHANISM_PARAM_INVALID,
                    e,
                ))
            }
            Err(e) => return Err(e),
        };
        self.base.derived_key(base, secret)
    }
}
