// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! This module implements the "simple" key derivation mechanisms that
//! combine the base key with caller data or with another key:
//! concatenation, XOR and bit extraction.

use std::fmt::Debug;

use crate::attribute::Attribute;
use crate::derive::DeriveBase;
use crate::error::{Error, Result};
use crate::mechanism::{
    mech_type_to_name, DeriveKeyGenerator, Mechanism, MechanismValue,
    Mechanisms,
};
use crate::misc::{ulong_to_usize, xor_bytes};
use crate::object::key::SecretKey;
use crate::object::{KeyKind, Object, ObjectStore};
use crate::params::{
    CkExtractParams, CkKeyDerivationStringData, CkObjectHandleParam,
    MechanismParams,
};
use crate::pkcs11::*;

use log::{debug, error};
use once_cell::sync::Lazy;
use zeroize::Zeroizing;

/// Object that holds Mechanisms for the simple KDFs
static SIMPLE_KDF_MECH: Lazy<Box<dyn Mechanism>> = Lazy::new(|| {
    Box::new(SimpleKdfMechanism {
        info: CK_MECHANISM_INFO {
            ulMinKeySize: 0,
            ulMaxKeySize: 0,
            flags: CKF_DERIVE,
        },
    })
});

/// Registers all the simple KDF mechanisms
pub fn register(mechs: &mut Mechanisms) {
    for ckm in &[
        CKM_CONCATENATE_BASE_AND_KEY,
        CKM_CONCATENATE_BASE_AND_DATA,
        CKM_CONCATENATE_DATA_AND_BASE,
        CKM_XOR_BASE_AND_DATA,
        CKM_EXTRACT_KEY_FROM_KEY,
    ] {
        mechs.add_mechanism(*ckm, &(*SIMPLE_KDF_MECH));
    }
}

fn param_invalid(mech: CK_MECHANISM_TYPE, msg: &str) -> Error {
    error!("{}: {}", mech_type_to_name(mech), msg);
    Error::ck_rv_with_errmsg(CKR_MECHANISM_PARAM_INVALID, msg.to_string())
}

/// The other key of a concatenation, resolved when the generator is
/// created
#[derive(Debug)]
struct OtherKey {
    value: Zeroizing<Vec<u8>>,
    always_sensitive: bool,
    never_extractable: bool,
}

impl OtherKey {
    fn resolve(
        mech: CK_MECHANISM_TYPE,
        handle: CK_OBJECT_HANDLE,
        store: &dyn ObjectStore,
    ) -> Result<OtherKey> {
        let obj = match store.find_object_by_handle(handle) {
            Ok(o) => o,
            Err(e) => {
                error!("{}: key {} not found: {}", mech_type_to_name(mech), handle, e);
                return Err(Error::ck_rv_from_error(CKR_MECHANISM_PARAM_INVALID, e));
            }
        };
        if !matches!(KeyKind::of(&obj), Ok(KeyKind::Secret(_))) {
            return Err(param_invalid(mech, "the other key must be a secret key"));
        }
        if obj.check_permission(CKA_DERIVE).is_err() {
            return Err(param_invalid(mech, "the other key does not allow derivation"));
        }
        let key = SecretKey::from_object(&obj)?;
        Ok(OtherKey {
            value: Zeroizing::new(key.value.clone()),
            always_sensitive: obj.is_always_sensitive(),
            never_extractable: obj.is_never_extractable(),
        })
    }
}

#[derive(Debug)]
enum Operation {
    BaseAndKey(OtherKey),
    BaseAndData(Vec<u8>),
    DataAndBase(Vec<u8>),
    XorData(Vec<u8>),
    Extract(usize),
}

#[derive(Debug)]
struct SimpleKdfMechanism {
    info: CK_MECHANISM_INFO,
}

impl SimpleKdfMechanism {
    fn string_data(mech: &MechanismValue) -> Result<Vec<u8>> {
        let data = CkKeyDerivationStringData::decode(mech.params())?;
        if data.0.is_empty() {
            return Err(param_invalid(mech.mechanism(), "the data is empty"));
        }
        Ok(data.0)
    }
}

impl Mechanism for SimpleKdfMechanism {
    fn info(&self) -> &CK_MECHANISM_INFO {
        &self.info
    }

    fn derive_generator(
        &self,
        mech: &MechanismValue,
        store: &dyn ObjectStore,
    ) -> Result<Box<dyn DeriveKeyGenerator>> {
        if self.info.flags & CKF_DERIVE != CKF_DERIVE {
            return Err(CKR_MECHANISM_INVALID)?;
        }
        let ckm = mech.mechanism();
        let op = match ckm {
            CKM_CONCATENATE_BASE_AND_KEY => {
                let handle = CkObjectHandleParam::decode(mech.params())?;
                Operation::BaseAndKey(OtherKey::resolve(ckm, handle.0, store)?)
            }
            CKM_CONCATENATE_BASE_AND_DATA => {
                Operation::BaseAndData(SimpleKdfMechanism::string_data(mech)?)
            }
            CKM_CONCATENATE_DATA_AND_BASE => {
                Operation::DataAndBase(SimpleKdfMechanism::string_data(mech)?)
            }
            CKM_XOR_BASE_AND_DATA => {
                Operation::XorData(SimpleKdfMechanism::string_data(mech)?)
            }
            CKM_EXTRACT_KEY_FROM_KEY => {
                let index = CkExtractParams::decode(mech.params())?;
                Operation::Extract(ulong_to_usize(index.0)?)
            }
            _ => return Err(CKR_MECHANISM_INVALID)?,
        };
        Ok(Box::new(SimpleKdf {
            base: DeriveBase::new(ckm),
            op: op,
        }))
    }
}

/// Copies `len` bytes out of `key` starting at bit `index`, counting
/// from the most significant bit of the first byte and wrapping around
/// at the end of the key
fn extract_bits(key: &[u8], index: usize, len: usize) -> Zeroizing<Vec<u8>> {
    let nbits = key.len() * 8;
    let mut out = Zeroizing::new(vec![0u8; len]);
    for i in 0..(len * 8) {
        let src = (index + i) % nbits;
        let bit = (key[src / 8] >> (7 - (src % 8))) & 1;
        out[i / 8] |= bit << (7 - (i % 8));
    }
    out
}

#[derive(Debug)]
struct SimpleKdf {
    base: DeriveBase,
    op: Operation,
}

impl DeriveKeyGenerator for SimpleKdf {
    fn mechanism(&self) -> CK_MECHANISM_TYPE {
        self.base.mechanism()
    }

    fn init(&mut self, template: &[Attribute]) -> Result<()> {
        self.base.init(template)
    }

    fn generate(&mut self, base: &Object) -> Result<Object> {
        let key = self.base.base_secret(base)?;
        let secret = match &self.op {
            Operation::BaseAndKey(other) => {
                let mut v = Zeroizing::new(key.value.clone());
                v.extend_from_slice(&other.value);
                v
            }
            Operation::BaseAndData(data) => {
                let mut v = Zeroizing::new(key.value.clone());
                v.extend_from_slice(data);
                v
            }
            Operation::DataAndBase(data) => {
                let mut v = Zeroizing::new(data.clone());
                v.extend_from_slice(&key.value);
                v
            }
            Operation::XorData(data) => {
                Zeroizing::new(xor_bytes(&key.value, data))
            }
            Operation::Extract(index) => {
                let nbits = key.value.len() * 8;
                if *index >= nbits {
                    return Err(param_invalid(
                        self.base.mechanism(),
                        &format!("bit index {} exceeds the key size", index),
                    ));
                }
                let len = self.base.builder()?.minimal_secret_len();
                debug!("Extracting {} bytes from bit {}", len, index);
                extract_bits(&key.value, *index, len)
            }
        };
        let mut obj = self.base.derived_key(base, secret)?;
        if let Operation::BaseAndKey(other) = &self.op {
            if !other.always_sensitive {
                obj.set_attr(Attribute::from_bool(CKA_ALWAYS_SENSITIVE, false))?;
            }
            if !other.never_extractable {
                obj.set_attr(Attribute::from_bool(
                    CKA_NEVER_EXTRACTABLE,
                    false,
                ))?;
            }
        }
        Ok(obj)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_wraps_around() {
        /* 0x329F84A9 from bit 21 */
        let key = hex::decode("329f84a9").unwrap();
        assert_eq!(extract_bits(&key, 21, 1).as_slice(), &[0x95]);
        /* starting at the last bit wraps to the first */
        let out = extract_bits(&key, 31, 2);
        assert_eq!(out.as_slice(), &[0x99, 0x4f]);
    }
}
