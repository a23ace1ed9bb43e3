// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! The three factories that turn a [MechanismValue] into a bound
//! operation.
//!
//! Factories are built once from the [Config] and shared between
//! requests, each call returns a fresh single use operation object.

use std::sync::Arc;

use crate::config::{Config, HedgePreference};
use crate::enabled::register_all;
use crate::error::{Error, Result};
use crate::mechanism::{
    mech_type_to_name, DeriveKeyGenerator, Encapsulator, Mechanism,
    Mechanisms, MechanismValue, WrapperSigner,
};
use crate::object::{Object, ObjectStore};
use crate::pkcs11::*;

use log::{debug, error, trace};

/// Builds the mechanism registry allowed by the configuration
pub fn build_registry(config: &Config) -> Result<Mechanisms> {
    let mut mechs = Mechanisms::new();
    register_all(&mut mechs);
    if let Some(allowed) = config.allowed_mechanisms()? {
        mechs.retain(&allowed);
    }
    debug!("{} mechanisms registered", mechs.len());
    Ok(mechs)
}

/// Looks a mechanism up and checks it supports the operation `flag`
fn lookup(
    mechs: &Mechanisms,
    mech: &MechanismValue,
    flag: CK_FLAGS,
) -> Result<&'static Box<dyn Mechanism>> {
    let m = match mechs.get(mech.mechanism()) {
        Ok(m) => m,
        Err(e) => {
            error!("{}", e);
            return Err(e);
        }
    };
    if m.info().flags & flag != flag {
        error!(
            "{} does not support operation {:#x}",
            mech_type_to_name(mech.mechanism()),
            flag
        );
        return Err(Error::ck_rv_with_errmsg(
            CKR_MECHANISM_INVALID,
            format!(
                "mechanism {} does not support this operation",
                mech_type_to_name(mech.mechanism())
            ),
        ));
    }
    Ok(m)
}

/// Logs the errors returned by the mechanism constructors
fn logged<T>(mech: &MechanismValue, res: Result<T>) -> Result<T> {
    if let Err(e) = &res {
        error!("{}: {}", mech_type_to_name(mech.mechanism()), e);
    }
    res
}

/// Builds encapsulators for the KEM capable mechanisms
#[derive(Debug, Clone)]
pub struct EncapsulatorFactory {
    mechanisms: Arc<Mechanisms>,
}

impl EncapsulatorFactory {
    pub fn new(config: &Config) -> Result<EncapsulatorFactory> {
        Ok(EncapsulatorFactory::with_mechanisms(Arc::new(build_registry(
            config,
        )?)))
    }

    pub fn with_mechanisms(mechanisms: Arc<Mechanisms>) -> EncapsulatorFactory {
        EncapsulatorFactory {
            mechanisms: mechanisms,
        }
    }

    /// Returns an encapsulator for `mech` bound to the type of `key`,
    /// the key that will be used to encapsulate or decapsulate
    pub fn create(
        &self,
        mech: &MechanismValue,
        key: &Object,
    ) -> Result<Box<dyn Encapsulator>> {
        trace!(
            "EncapsulatorFactory::create({})",
            mech_type_to_name(mech.mechanism())
        );
        let m = lookup(&self.mechanisms, mech, CKF_ENCAPSULATE)?;
        let key_type = match key.get_attr_as_ulong(CKA_KEY_TYPE) {
            Ok(kt) => kt,
            Err(_) => {
                error!("Encapsulation key without a key type");
                return Err(CKR_KEY_HANDLE_INVALID)?;
            }
        };
        logged(mech, m.encapsulator(mech, key_type))
    }
}

/// Builds signers for the signature and MAC mechanisms
#[derive(Debug, Clone)]
pub struct WrapperSignerFactory {
    mechanisms: Arc<Mechanisms>,
    hedge: HedgePreference,
}

impl WrapperSignerFactory {
    pub fn new(config: &Config) -> Result<WrapperSignerFactory> {
        Ok(WrapperSignerFactory::with_mechanisms(
            Arc::new(build_registry(config)?),
            config.hedge_preferred,
        ))
    }

    pub fn with_mechanisms(
        mechanisms: Arc<Mechanisms>,
        hedge: HedgePreference,
    ) -> WrapperSignerFactory {
        WrapperSignerFactory {
            mechanisms: mechanisms,
            hedge: hedge,
        }
    }

    pub fn create(&self, mech: &MechanismValue) -> Result<Box<dyn WrapperSigner>> {
        trace!(
            "WrapperSignerFactory::create({})",
            mech_type_to_name(mech.mechanism())
        );
        let m = lookup(&self.mechanisms, mech, CKF_SIGN)?;
        logged(mech, m.wrapper_signer(mech, self.hedge))
    }
}

/// Builds key derivation generators
#[derive(Debug, Clone)]
pub struct DeriveKeyGeneratorFactory {
    mechanisms: Arc<Mechanisms>,
}

impl DeriveKeyGeneratorFactory {
    pub fn new(config: &Config) -> Result<DeriveKeyGeneratorFactory> {
        Ok(DeriveKeyGeneratorFactory::with_mechanisms(Arc::new(
            build_registry(config)?,
        )))
    }

    pub fn with_mechanisms(
        mechanisms: Arc<Mechanisms>,
    ) -> DeriveKeyGeneratorFactory {
        DeriveKeyGeneratorFactory {
            mechanisms: mechanisms,
        }
    }

    /// Returns a generator for `mech`, object handles found in the
    /// parameters are resolved through `store`
    pub fn create(
        &self,
        mech: &MechanismValue,
        store: &dyn ObjectStore,
    ) -> Result<Box<dyn DeriveKeyGenerator>> {
        trace!(
            "DeriveKeyGeneratorFactory::create({})",
            mech_type_to_name(mech.mechanism())
        );
        let m = lookup(&self.mechanisms, mech, CKF_DERIVE)?;
        logged(mech, m.derive_generator(mech, store))
    }
}
