// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! This module implements `CKM_HKDF_DERIVE` ([RFC 5869]) over the SHA-1,
//! SHA-2 and SHA-3 families.
//!
//! The mechanism can run the extract step, the expand step or both.
//! When only expanding, the base key is used as the pseudorandom key.
//!
//! [RFC 5869]: https://www.rfc-editor.org/rfc/rfc5869

use std::fmt::Debug;

use crate::attribute::Attribute;
use crate::derive::DeriveBase;
use crate::error::{Error, Result};
use crate::mechanism::{
    mech_type_to_name, DeriveKeyGenerator, Mechanism, MechanismValue,
    Mechanisms,
};
use crate::object::key::SecretKey;
use crate::object::{Object, ObjectStore};
use crate::params::{CkHkdfParams, MechanismParams};
use crate::pkcs11::*;

use digest::core_api::BlockSizeUser;
use digest::Digest;
use hkdf::SimpleHkdf;
use log::{debug, error};
use once_cell::sync::Lazy;
use zeroize::Zeroizing;

/// Object that holds the HKDF mechanism
static HKDF_MECH: Lazy<Box<dyn Mechanism>> = Lazy::new(|| {
    Box::new(HkdfMechanism {
        info: CK_MECHANISM_INFO {
            ulMinKeySize: 1,
            ulMaxKeySize: 0xffffffff,
            flags: CKF_DERIVE,
        },
    })
});

/// Registers the HKDF derive mechanism
pub fn register(mechs: &mut Mechanisms) {
    mechs.add_mechanism(CKM_HKDF_DERIVE, &(*HKDF_MECH));
}

fn param_error(msg: String) -> Error {
    error!("{}: {}", mech_type_to_name(CKM_HKDF_DERIVE), msg);
    Error::ck_rv_with_errmsg(CKR_MECHANISM_PARAM_INVALID, msg)
}

/// The hash functions usable as the HKDF PRF
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HkdfPrf {
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Sha3_224,
    Sha3_256,
    Sha3_384,
    Sha3_512,
}

impl HkdfPrf {
    fn from_mechanism(mech: CK_MECHANISM_TYPE) -> Result<HkdfPrf> {
        Ok(match mech {
            CKM_SHA_1 => HkdfPrf::Sha1,
            CKM_SHA224 => HkdfPrf::Sha224,
            CKM_SHA256 => HkdfPrf::Sha256,
            CKM_SHA384 => HkdfPrf::Sha384,
            CKM_SHA512 => HkdfPrf::Sha512,
            CKM_SHA3_224 => HkdfPrf::Sha3_224,
            CKM_SHA3_256 => HkdfPrf::Sha3_256,
            CKM_SHA3_384 => HkdfPrf::Sha3_384,
            CKM_SHA3_512 => HkdfPrf::Sha3_512,
            m => {
                return Err(param_error(format!(
                    "unsupported PRF hash {}",
                    mech_type_to_name(m)
                )))
            }
        })
    }
}

/// Runs the requested HKDF steps with the hash `D`
fn run_hkdf<D>(
    extract: bool,
    expand: bool,
    salt: Option<&[u8]>,
    ikm: &[u8],
    info: &[u8],
    len: usize,
) -> Result<Vec<u8>>
where
    D: Digest + BlockSizeUser + Clone,
{
    let hk = if extract {
        let (prk, hk) = SimpleHkdf::<D>::extract(salt, ikm);
        if !expand {
            return Ok(prk.to_vec());
        }
        hk
    } else {
        match SimpleHkdf::<D>::from_prk(ikm) {
            Ok(hk) => hk,
            Err(e) => {
                return Err(Error::ck_rv_with_errmsg(
                    CKR_KEY_SIZE_RANGE,
                    format!("base key unusable as PRK: {}", e),
                ))
            }
        }
    };
    let mut okm = vec![0u8; len];
    if let Err(e) = hk.expand(info, &mut okm) {
        return Err(Error::ck_rv_with_errmsg(
            CKR_KEY_SIZE_RANGE,
            format!("output of {} bytes: {}", len, e),
        ));
    }
    Ok(okm)
}

#[derive(Debug)]
struct HkdfMechanism {
    info: CK_MECHANISM_INFO,
}

impl HkdfMechanism {
    /// Resolves the salt source, only used when extracting
    fn salt(
        params: &CkHkdfParams,
        store: &dyn ObjectStore,
    ) -> Result<Option<Zeroizing<Vec<u8>>>> {
        match params.salt_type {
            CKF_HKDF_SALT_NULL => Ok(None),
            CKF_HKDF_SALT_DATA => match &params.salt {
                Some(s) if !s.is_empty() => Ok(Some(Zeroizing::new(s.clone()))),
                _ => Err(param_error("salt data is missing".to_string())),
            },
            CKF_HKDF_SALT_KEY => {
                let obj = match store.find_object_by_handle(params.salt_key) {
                    Ok(o) => o,
                    Err(e) => {
                        error!("salt key {} not found: {}", params.salt_key, e);
                        return Err(Error::ck_rv_from_error(
                            CKR_MECHANISM_PARAM_INVALID,
                            e,
                        ));
                    }
                };
                match SecretKey::from_object(&obj) {
                    Ok(k) => Ok(Some(Zeroizing::new(k.value.clone()))),
                    Err(e) => Err(Error::ck_rv_from_error(
                        CKR_MECHANISM_PARAM_INVALID,
                        e,
                    )),
                }
            }
            t => Err(param_error(format!("invalid salt type {:#x}", t))),
        }
    }
}

impl Mechanism for HkdfMechanism {
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
        if mech.mechanism() != CKM_HKDF_DERIVE {
            return Err(CKR_MECHANISM_INVALID)?;
        }
        let params = CkHkdfParams::decode(mech.params())?;
        if !params.extract && !params.expand {
            return Err(param_error(
                "one of extract or expand must be requested".to_string(),
            ));
        }
        let prf = HkdfPrf::from_mechanism(params.prf_hash_mechanism)?;
        let salt = if params.extract {
            HkdfMechanism::salt(&params, store)?
        } else {
            None
        };
        Ok(Box::new(HkdfDerive {
            base: DeriveBase::new(CKM_HKDF_DERIVE),
            prf: prf,
            extract: params.extract,
            expand: params.expand,
            salt: salt,
            info: params.info.unwrap_or_default(),
        }))
    }
}

#[derive(Debug)]
struct HkdfDerive {
    base: DeriveBase,
    prf: HkdfPrf,
    extract: bool,
    expand: bool,
    salt: Option<Zeroizing<Vec<u8>>>,
    info: Vec<u8>,
}

impl DeriveKeyGenerator for HkdfDerive {
    fn mechanism(&self) -> CK_MECHANISM_TYPE {
        CKM_HKDF_DERIVE
    }

    fn init(&mut self, template: &[Attribute]) -> Result<()> {
        self.base.init(template)
    }

    fn generate(&mut self, base: &Object) -> Result<Object> {
        let ikm = self.base.base_secret(base)?;
        let len = self.base.builder()?.minimal_secret_len();
        let salt = self.salt.as_ref().map(|s| s.as_slice());
        debug!(
            "HKDF {:?} extract={} expand={} length={}",
            self.prf, self.extract, self.expand, len
        );
        let (x, e, v, i) = (self.extract, self.expand, &ikm.value, &self.info);
        let okm = match self.prf {
            HkdfPrf::Sha1 => run_hkdf::<sha1::Sha1>(x, e, salt, v, i, len),
            HkdfPrf::Sha224 => run_hkdf::<sha2::Sha224>(x, e, salt, v, i, len),
            HkdfPrf::Sha256 => run_hkdf::<sha2::Sha256>(x, e, salt, v, i, len),
            HkdfPrf::Sha384 => run_hkdf::<sha2::Sha384>(x, e, salt, v, i, len),
            HkdfPrf::Sha512 => run_hkdf::<sha2::Sha512>(x, e, salt, v, i, len),
            HkdfPrf::Sha3_224 => {
                run_hkdf::<sha3::Sha3_224>(x, e, salt, v, i, len)
            }
            HkdfPrf::Sha3_256 => {
                run_hkdf::<sha3::Sha3_256>(x, e, salt, v, i, len)
            }
            HkdfPrf::Sha3_384 => {
                run_hkdf::<sha3::Sha3_384>(x, e, salt, v, i, len)
            }
            HkdfPrf::Sha3_512 => {
                run_hkdf::<sha3::Sha3_512>(x, e, salt, v, i, len)
            }
        }?;
        self.base.derived_key(base, Zeroizing::new(okm))
    }
}
