// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! This module implements the PKCS#11 RSA mechanisms: PKCS#1 v1.5 and
//! OAEP secret transport through the encapsulation interface, and the
//! PKCS#1 v1.5, PSS, X9.31 and ISO/IEC 9796-1 signatures.

use std::fmt::Debug;

use crate::attribute::Attribute;
use crate::capability::{random_bytes, CipherEngine, RandomSource};
use crate::config::HedgePreference;
use crate::encapsulate::EncapsulatorBase;
use crate::error::{Error, Result};
use crate::mechanism::{
    mech_type_to_name, AuthenticatedSigner, Encapsulator, Mechanism,
    MechanismValue, Mechanisms, Signer, WrapperSigner,
};
use crate::misc::ulong_to_usize;
use crate::native::digest::DigestAlg;
use crate::native::rsa::{RsaCipher, RsaKey, RsaPadding, RsaScheme, RsaSignature};
use crate::object::key::{bind_key, RsaPrivateKey, RsaPublicKey};
use crate::object::{KeyKind, Object};
use crate::params::{CkRsaPkcsOaepParams, CkRsaPkcsPssParams, MechanismParams};
use crate::pkcs11::*;
use crate::sign::{authenticated, EngineSigner};

use log::{debug, error, trace};
use once_cell::sync::Lazy;
use zeroize::Zeroizing;

const MIN_RSA_SIZE_BITS: CK_ULONG = 1024;
const MAX_RSA_SIZE_BITS: CK_ULONG = 16384;

/// PKCS#1 v1.5 signatures bound to a digest
const RSA_PKCS_HASHED: [(CK_MECHANISM_TYPE, DigestAlg); 13] = [
    (CKM_MD2_RSA_PKCS, DigestAlg::Md2),
    (CKM_MD5_RSA_PKCS, DigestAlg::Md5),
    (CKM_RIPEMD128_RSA_PKCS, DigestAlg::Ripemd128),
    (CKM_RIPEMD160_RSA_PKCS, DigestAlg::Ripemd160),
    (CKM_SHA1_RSA_PKCS, DigestAlg::Sha1),
    (CKM_SHA224_RSA_PKCS, DigestAlg::Sha224),
    (CKM_SHA256_RSA_PKCS, DigestAlg::Sha256),
    (CKM_SHA384_RSA_PKCS, DigestAlg::Sha384),
    (CKM_SHA512_RSA_PKCS, DigestAlg::Sha512),
    (CKM_SHA3_224_RSA_PKCS, DigestAlg::Sha3_224),
    (CKM_SHA3_256_RSA_PKCS, DigestAlg::Sha3_256),
    (CKM_SHA3_384_RSA_PKCS, DigestAlg::Sha3_384),
    (CKM_SHA3_512_RSA_PKCS, DigestAlg::Sha3_512),
];

/// PSS signatures bound to a digest
const RSA_PSS_HASHED: [(CK_MECHANISM_TYPE, DigestAlg); 9] = [
    (CKM_SHA1_RSA_PKCS_PSS, DigestAlg::Sha1),
    (CKM_SHA224_RSA_PKCS_PSS, DigestAlg::Sha224),
    (CKM_SHA256_RSA_PKCS_PSS, DigestAlg::Sha256),
    (CKM_SHA384_RSA_PKCS_PSS, DigestAlg::Sha384),
    (CKM_SHA512_RSA_PKCS_PSS, DigestAlg::Sha512),
    (CKM_SHA3_224_RSA_PKCS_PSS, DigestAlg::Sha3_224),
    (CKM_SHA3_256_RSA_PKCS_PSS, DigestAlg::Sha3_256),
    (CKM_SHA3_384_RSA_PKCS_PSS, DigestAlg::Sha3_384),
    (CKM_SHA3_512_RSA_PKCS_PSS, DigestAlg::Sha3_512),
];

fn bound_digest(
    table: &[(CK_MECHANISM_TYPE, DigestAlg)],
    mech: CK_MECHANISM_TYPE,
) -> Option<DigestAlg> {
    table.iter().find(|(m, _)| *m == mech).map(|(_, alg)| *alg)
}

fn new_mechanism(flags: CK_FLAGS) -> Box<dyn Mechanism> {
    Box::new(RsaMechanism {
        info: CK_MECHANISM_INFO {
            ulMinKeySize: MIN_RSA_SIZE_BITS,
            ulMaxKeySize: MAX_RSA_SIZE_BITS,
            flags: flags,
        },
    })
}

/// Object that holds Mechanisms for RSA
static RSA_MECHS: Lazy<[Box<dyn Mechanism>; 3]> = Lazy::new(|| {
    [
        new_mechanism(
            CKF_ENCAPSULATE | CKF_DECAPSULATE | CKF_SIGN | CKF_VERIFY,
        ),
        new_mechanism(CKF_ENCAPSULATE | CKF_DECAPSULATE),
        new_mechanism(CKF_SIGN | CKF_VERIFY),
    ]
});

/// Registers all RSA mechanisms
pub fn register(mechs: &mut Mechanisms) {
    mechs.add_mechanism(CKM_RSA_PKCS, &(*RSA_MECHS)[0]);
    mechs.add_mechanism(CKM_RSA_PKCS_OAEP, &(*RSA_MECHS)[1]);
    for ckm in &[CKM_RSA_PKCS_PSS, CKM_SHA1_RSA_X9_31, CKM_RSA_9796] {
        mechs.add_mechanism(*ckm, &(*RSA_MECHS)[2]);
    }
    for (ckm, _) in RSA_PKCS_HASHED.iter().chain(RSA_PSS_HASHED.iter()) {
        mechs.add_mechanism(*ckm, &(*RSA_MECHS)[2]);
    }
}

fn param_error(msg: String) -> Error {
    error!("{}", msg);
    Error::ck_rv_with_errmsg(CKR_MECHANISM_PARAM_INVALID, msg)
}

#[derive(Debug)]
struct RsaMechanism {
    info: CK_MECHANISM_INFO,
}

impl RsaMechanism {
    fn oaep_padding(mech: &MechanismValue) -> Result<RsaPadding> {
        let params = CkRsaPkcsOaepParams::decode(mech.params())?;
        trace!(
            "OAEP params: hash {}, mgf {:#x}, source {:#x}",
            mech_type_to_name(params.hash_alg),
            params.mgf,
            params.source
        );
        let hash = DigestAlg::from_mechanism(params.hash_alg)?;
        let mgf = DigestAlg::from_mgf(params.mgf)?;
        let label = match params.source_data {
            Some(data) if !data.is_empty() => {
                if params.source != CKZ_DATA_SPECIFIED {
                    return Err(param_error(format!(
                        "invalid OAEP source {:#x}",
                        params.source
                    )));
                }
                Some(data)
            }
            _ => None,
        };
        Ok(RsaPadding::Oaep {
            hash: hash,
            mgf: mgf,
            label: label,
        })
    }

    /// PSS parameters, `bound` is the digest fixed by the mechanism
    fn pss_scheme(
        mech: &MechanismValue,
        bound: Option<DigestAlg>,
    ) -> Result<RsaScheme> {
        let params = CkRsaPkcsPssParams::decode(mech.params())?;
        let hash = DigestAlg::from_mechanism(params.hash_alg)?;
        if let Some(alg) = bound {
            if alg != hash {
                return Err(param_error(format!(
                    "{} requires a matching hash, got {}",
                    mech_type_to_name(mech.mechanism()),
                    mech_type_to_name(params.hash_alg)
                )));
            }
        }
        let mgf = DigestAlg::from_mgf(params.mgf)?;
        Ok(RsaScheme::Pss {
            hash: hash,
            mgf: mgf,
            salt_len: ulong_to_usize(params.s_len)?,
        })
    }
}

impl Mechanism for RsaMechanism {
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
        if key_type != CKK_RSA {
            error!(
                "{} can't be used with key type {:#x}",
                mech_type_to_name(mech.mechanism()),
                key_type
            );
            return Err(CKR_KEY_HANDLE_INVALID)?;
        }
        let padding = match mech.mechanism() {
            CKM_RSA_PKCS => RsaPadding::Pkcs1v15,
            CKM_RSA_PKCS_OAEP => RsaMechanism::oaep_padding(mech)?,
            _ => return Err(CKR_MECHANISM_INVALID)?,
        };
        Ok(Box::new(RsaEncapsulator {
            base: EncapsulatorBase::new(mech.mechanism()),
            padding: padding,
        }))
    }

    fn wrapper_signer(
        &self,
        mech: &MechanismValue,
        _: HedgePreference,
    ) -> Result<Box<dyn WrapperSigner>> {
        if self.info.flags & CKF_SIGN != CKF_SIGN {
            return Err(CKR_MECHANISM_INVALID)?;
        }
        let ckm = mech.mechanism();
        let (scheme, digest) = match ckm {
            CKM_RSA_PKCS => (RsaScheme::Pkcs1v15(None), None),
            CKM_RSA_9796 => (RsaScheme::Iso9796, None),
            CKM_SHA1_RSA_X9_31 => (RsaScheme::X931, Some(DigestAlg::Sha1)),
            CKM_RSA_PKCS_PSS => (RsaMechanism::pss_scheme(mech, None)?, None),
            _ => {
                if let Some(alg) = bound_digest(&RSA_PKCS_HASHED, ckm) {
                    (RsaScheme::Pkcs1v15(Some(alg)), Some(alg))
                } else if let Some(alg) = bound_digest(&RSA_PSS_HASHED, ckm) {
                    (RsaMechanism::pss_scheme(mech, Some(alg))?, Some(alg))
                } else {
                    return Err(CKR_MECHANISM_INVALID)?;
                }
            }
        };
        debug!("{} uses {:?}", mech_type_to_name(ckm), scheme);
        Ok(Box::new(RsaWrapperSigner {
            mechanism: ckm,
            scheme: scheme,
            digest: digest,
        }))
    }
}

/// RSA secret transport: a random secret is encrypted to the public key
#[derive(Debug)]
struct RsaEncapsulator {
    base: EncapsulatorBase,
    padding: RsaPadding,
}

impl RsaEncapsulator {
    fn public_key(&self, key: &Object) -> Result<RsaPublicKey> {
        self.base
            .check_public(key, "RSA public key", |k| k == KeyKind::RsaPublic)?;
        RsaPublicKey::from_object(key)
    }
}

impl Encapsulator for RsaEncapsulator {
    fn mechanism(&self) -> CK_MECHANISM_TYPE {
        self.base.mechanism()
    }

    fn init(&mut self, template: &[Attribute]) -> Result<()> {
        self.base.init(template)
    }

    fn encapsulated_data_len(&self, key: &Object) -> Result<usize> {
        Ok(self.public_key(key)?.modulus_len())
    }

    fn encapsulate(
        &mut self,
        key: &Object,
        rng: &mut dyn RandomSource,
    ) -> Result<(Object, Vec<u8>)> {
        let pubkey = self.public_key(key)?;
        let cipher = RsaCipher::new(
            RsaKey::from_public(&pubkey)?,
            self.padding.clone(),
        );
        let len = self.base.minimal_secret_len()?;
        if len > cipher.max_data_len() {
            error!(
                "A secret of {} bytes can't be transported, the limit is {}",
                len,
                cipher.max_data_len()
            );
            return Err(CKR_KEY_SIZE_RANGE)?;
        }
        let secret = Zeroizing::new(random_bytes(rng, len)?);
        let data = cipher.encrypt(&secret, rng)?;
        let obj = self.base.secret_key(secret)?;
        Ok((obj, data))
    }

    fn decapsulate(&mut self, key: &Object, data: &[u8]) -> Result<Object> {
        self.base
            .check_private(key, "RSA private key", |k| k == KeyKind::RsaPrivate)?;
        let privkey = RsaPrivateKey::from_object(key)?;
        let cipher = RsaCipher::new(
            RsaKey::from_private(&privkey)?,
            self.padding.clone(),
        );
        self.base.builder()?;
        let secret = Zeroizing::new(cipher.decrypt(data)?);
        self.base.secret_key(secret)
    }
}

/// Binds an RSA signature scheme to a key
#[derive(Debug)]
struct RsaWrapperSigner {
    mechanism: CK_MECHANISM_TYPE,
    scheme: RsaScheme,
    /// digest computed over the message for the hash bound mechanisms
    digest: Option<DigestAlg>,
}

impl WrapperSigner for RsaWrapperSigner {
    fn mechanism(&self) -> CK_MECHANISM_TYPE {
        self.mechanism
    }

    fn into_signing_signer<'a>(
        self: Box<Self>,
        key: &Object,
        rng: &'a mut dyn RandomSource,
    ) -> Result<AuthenticatedSigner<'a>> {
        bind_key(self.mechanism, key, CKA_SIGN, "RSA private key", |k| {
            k == KeyKind::RsaPrivate
        })?;
        let privkey = RsaPrivateKey::from_object(key)?;
        let engine = RsaSignature::new(RsaKey::from_private(&privkey)?, self.scheme);
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
        bind_key(self.mechanism, key, CKA_VERIFY, "RSA public key", |k| {
            k == KeyKind::RsaPublic
        })?;
        let pubkey = RsaPublicKey::from_object(key)?;
        let engine = RsaSignature::new(RsaKey::from_public(&pubkey)?, self.scheme);
        Ok(Box::new(EngineSigner::verifying(
            self.mechanism,
            Box::new(engine),
            self.digest.map(|d| d.engine()),
        )))
    }
}
