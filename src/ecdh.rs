// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! This module implements the PKCS#11 ECDH mechanisms.
//!
//! `CKM_ECDH1_DERIVE` and `CKM_ECDH1_COFACTOR_DERIVE` are usable in two
//! ways: as KEMs, where a fresh ephemeral key pair is generated and its
//! public point becomes the encapsulated data, and as classic key
//! derivations, where the peer's public point is given in the mechanism
//! parameters. Both share the agreement/KDF adapter.
//!
//! The encapsulated point uses the `CKA_EC_POINT` encoding of the key
//! family: a DER OCTET STRING for `CKK_EC`, the raw u-coordinate for
//! `CKK_EC_MONTGOMERY`.

use std::fmt::Debug;

use crate::agreement::{AgreementKdf, KdfAgreement};
use crate::attribute::Attribute;
use crate::capability::{Agreement, RandomSource};
use crate::derive::DeriveBase;
use crate::ec::{self, Curve};
use crate::encapsulate::EncapsulatorBase;
use crate::error::{Error, Result};
use crate::mechanism::{
    mech_type_to_name, DeriveKeyGenerator, Encapsulator, Mechanism,
    MechanismValue, Mechanisms,
};
use crate::native::{ecc, montgomery};
use crate::object::key::{EcPrivateKey, EcPublicKey};
use crate::object::{KeyKind, Object, ObjectStore};
use crate::params::{CkEcdh1DeriveParams, MechanismParams};
use crate::pkcs11::*;

use log::{error, info, trace};
use once_cell::sync::Lazy;
use zeroize::Zeroizing;

/// Object that holds the ECDH mechanisms
static ECDH_MECH: Lazy<Box<dyn Mechanism>> = Lazy::new(|| {
    Box::new(EcdhMechanism {
        info: CK_MECHANISM_INFO {
            ulMinKeySize: 256,
            ulMaxKeySize: 521,
            flags: CKF_DERIVE | CKF_ENCAPSULATE | CKF_DECAPSULATE,
        },
    })
});

/// Registers the ECDH mechanisms
pub fn register(mechs: &mut Mechanisms) {
    for ckm in &[CKM_ECDH1_DERIVE, CKM_ECDH1_COFACTOR_DERIVE] {
        mechs.add_mechanism(*ckm, &(*ECDH_MECH));
    }
}

/// The curve family an ECDH operation runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Prime,
    Montgomery,
}

impl Family {
    fn key_type(&self) -> CK_KEY_TYPE {
        match self {
            Family::Prime => CKK_EC,
            Family::Montgomery => CKK_EC_MONTGOMERY,
        }
    }

    fn public_kind(&self, kind: KeyKind) -> bool {
        match self {
            Family::Prime => matches!(kind, KeyKind::EcPublic(_)),
            Family::Montgomery => matches!(kind, KeyKind::MontgomeryPublic(_)),
        }
    }

    fn private_kind(&self, kind: KeyKind) -> bool {
        match self {
            Family::Prime => matches!(kind, KeyKind::EcPrivate(_)),
            Family::Montgomery => {
                matches!(kind, KeyKind::MontgomeryPrivate(_))
            }
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Family::Prime => "EC",
            Family::Montgomery => "EC Montgomery",
        }
    }

    fn agreement(&self, curve: Curve, value: &[u8]) -> Result<Box<dyn Agreement>> {
        Ok(match self {
            Family::Prime => Box::new(ecc::EcdhAgreement::new(curve, value)?),
            Family::Montgomery => {
                Box::new(montgomery::MontgomeryAgreement::new(curve, value)?)
            }
        })
    }

    /// Size of the ephemeral point in the encapsulated data, encoded
    /// the way `CKA_EC_POINT` stores it for the family
    fn encapsulated_len(&self, curve: Curve) -> usize {
        match self {
            Family::Prime => curve.der_point_size(),
            Family::Montgomery => curve.point_size(),
        }
    }

    fn ephemeral_key(
        &self,
        curve: Curve,
        rng: &mut dyn RandomSource,
    ) -> Result<(Zeroizing<Vec<u8>>, Vec<u8>)> {
        match self {
            Family::Prime => ecc::ephemeral_key(curve, rng),
            Family::Montgomery => montgomery::ephemeral_key(curve, rng),
        }
    }
}

#[derive(Debug)]
struct EcdhMechanism {
    info: CK_MECHANISM_INFO,
}

impl EcdhMechanism {
    fn decode_params(mech: &MechanismValue) -> Result<CkEcdh1DeriveParams> {
        let params = CkEcdh1DeriveParams::decode(mech.params())?;
        /* fail at creation time on an unknown KDF */
        AgreementKdf::from_ckd(params.kdf)?;
        Ok(params)
    }
}

impl Mechanism for EcdhMechanism {
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
        let params = EcdhMechanism::decode_params(mech)?;
        let family = match (mech.mechanism(), key_type) {
            (CKM_ECDH1_DERIVE, CKK_EC_MONTGOMERY) => Family::Montgomery,
            (CKM_ECDH1_DERIVE | CKM_ECDH1_COFACTOR_DERIVE, CKK_EC) => {
                Family::Prime
            }
            (m, kt) => {
                error!(
                    "Invalid key type {:#x} for mechanism {}",
                    kt,
                    mech_type_to_name(m)
                );
                return Err(Error::ck_rv_with_errmsg(
                    CKR_KEY_HANDLE_INVALID,
                    format!(
                        "invalid key type {:#x} for mechanism {}",
                        kt,
                        mech_type_to_name(m)
                    ),
                ));
            }
        };
        trace!(
            "Creating {} encapsulator for {}",
            family.name(),
            mech_type_to_name(mech.mechanism())
        );
        Ok(Box::new(EcdhEncapsulator {
            base: EncapsulatorBase::new(mech.mechanism()),
            family: family,
            params: params,
        }))
    }

    fn derive_generator(
        &self,
        mech: &MechanismValue,
        _: &dyn ObjectStore,
    ) -> Result<Box<dyn DeriveKeyGenerator>> {
        if self.info.flags & CKF_DERIVE != CKF_DERIVE {
            return Err(CKR_MECHANISM_INVALID)?;
        }
        let params = EcdhMechanism::decode_params(mech)?;
        let public_data = match &params.public_data {
            Some(p) if !p.is_empty() => p.clone(),
            _ => {
                return Err(Error::ck_rv_with_errmsg(
                    CKR_MECHANISM_PARAM_INVALID,
                    "the peer public key is required".to_string(),
                ))
            }
        };
        Ok(Box::new(EcdhDerive {
            base: DeriveBase::new(mech.mechanism()),
            kdf: params.kdf,
            shared_data: params.shared_data,
            public_data: public_data,
        }))
    }
}

/// ECDH used as a KEM
#[derive(Debug)]
struct EcdhEncapsulator {
    base: EncapsulatorBase,
    family: Family,
    params: CkEcdh1DeriveParams,
}

impl EcdhEncapsulator {
    /// The public data travels in the encapsulated data, the parameter
    /// must be left empty
    fn check_params(&self) -> Result<()> {
        match &self.params.public_data {
            Some(p) if !p.is_empty() => {
                error!(
                    "{} used for encapsulation with public data",
                    mech_type_to_name(self.base.mechanism())
                );
                Err(Error::ck_rv_with_errmsg(
                    CKR_MECHANISM_PARAM_INVALID,
                    format!(
                        "public data must be empty when {} is used for encapsulation",
                        mech_type_to_name(self.base.mechanism())
                    ),
                ))
            }
            _ => Ok(()),
        }
    }

    fn public_key(&self, key: &Object) -> Result<EcPublicKey> {
        let family = self.family;
        self.base.check_public(
            key,
            &format!("{} public key", family.name()),
            |k| family.public_kind(k),
        )?;
        EcPublicKey::from_object(key, family.key_type())
    }

    fn kdf_agreement(&self, curve: Curve, value: &[u8]) -> Result<KdfAgreement> {
        KdfAgreement::new(
            self.family.agreement(curve, value)?,
            self.params.kdf,
            self.params.shared_data.clone(),
        )
    }
}

impl Encapsulator for EcdhEncapsulator {
    fn mechanism(&self) -> CK_MECHANISM_TYPE {
        self.base.mechanism()
    }

    fn init(&mut self, template: &[Attribute]) -> Result<()> {
        self.base.init(template)
    }

    fn encapsulated_data_len(&self, key: &Object) -> Result<usize> {
        let pubkey = self.public_key(key)?;
        Ok(self.family.encapsulated_len(pubkey.curve))
    }

    fn encapsulate(
        &mut self,
        key: &Object,
        rng: &mut dyn RandomSource,
    ) -> Result<(Object, Vec<u8>)> {
        self.check_params()?;
        let pubkey = self.public_key(key)?;
        let min_len = self.base.minimal_secret_len()?;
        let (value, point) = self.family.ephemeral_key(pubkey.curve, rng)?;
        info!("Generated ephemeral key pair on curve {:?}", pubkey.curve);
        let agreement = self.kdf_agreement(pubkey.curve, &value)?;
        let secret = agreement.agree(&pubkey.point, min_len)?;
        let obj = self.base.secret_key(secret)?;
        Ok((obj, ec::point_to_attr(pubkey.curve, &point)?))
    }

    fn decapsulate(&mut self, key: &Object, data: &[u8]) -> Result<Object> {
        self.check_params()?;
        let family = self.family;
        self.base.check_private(
            key,
            &format!("{} private key", family.name()),
            |k| family.private_kind(k),
        )?;
        let privkey = EcPrivateKey::from_object(key, family.key_type())?;
        let peer = match ec::decode_point(privkey.curve, data) {
            Ok(p) => p,
            Err(e) => {
                error!("Invalid ephemeral public key in the encapsulated data");
                return Err(Error::ck_rv_from_error(CKR_ARGUMENTS_BAD, e));
            }
        };
        let min_len = self.base.minimal_secret_len()?;
        let agreement = self.kdf_agreement(privkey.curve, &privkey.value)?;
        let secret = agreement.agree(&peer, min_len)?;
        self.base.secret_key(secret)
    }
}

/// ECDH derivation with the peer's public key from the parameters
#[derive(Debug)]
struct EcdhDerive {
    base: DeriveBase,
    kdf: CK_EC_KDF_TYPE,
    shared_data: Option<Vec<u8>>,
    public_data: Vec<u8>,
}

impl DeriveKeyGenerator for EcdhDerive {
    fn mechanism(&self) -> CK_MECHANISM_TYPE {
        self.base.mechanism()
    }

    fn init(&mut self, template: &[Attribute]) -> Result<()> {
        self.base.init(template)
    }

    fn generate(&mut self, base: &Object) -> Result<Object> {
        let cofactor = self.base.mechanism() == CKM_ECDH1_COFACTOR_DERIVE;
        let kind = self.base.check_base(base, |k| match k {
            KeyKind::EcPrivate(_) => true,
            KeyKind::MontgomeryPrivate(_) => !cofactor,
            _ => false,
        })?;
        let family = match kind {
            KeyKind::MontgomeryPrivate(_) => Family::Montgomery,
            _ => Family::Prime,
        };
        let privkey = EcPrivateKey::from_object(base, family.key_type())?;
        let peer = match ec::decode_point(privkey.curve, &self.public_data) {
            Ok(p) => p,
            Err(e) => {
                error!("Invalid peer public key for curve {:?}", privkey.curve);
                return Err(Error::ck_rv_from_error(
                    CKR_MECHANISM_PARAM_INVALID,
                    e,
                ));
            }
        };
        let min_len = self.base.builder()?.minimal_secret_len();
        let agreement = KdfAgreement::new(
            family.agreement(privkey.curve, &privkey.value)?,
            self.kdf,
            self.shared_data.clone(),
        )?;
        let secret = agreement.agree(&peer, min_len)?;
        self.base.derived_key(base, secret)
    }
}
