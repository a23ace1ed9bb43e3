// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! State and checks shared by all the encapsulators.
//!
//! An encapsulator records the output template, verifies the key it is
//! handed and turns the raw shared secret into a secret key object.

use crate::attribute::Attribute;
use crate::error::Result;
use crate::mechanism::mech_type_to_name;
use crate::object::key::{bind_key, recompute_attributes};
use crate::object::{KeyKind, Object, SecretKeyBuilder};
use crate::pkcs11::*;

use log::{debug, trace};
use zeroize::Zeroizing;

/// Attributes forced on every encapsulated secret: the secret left the
/// token in encapsulated form so it is never sensitive nor local
const ENCAPSULATED_SECRET_FLAGS: [(CK_ATTRIBUTE_TYPE, bool); 4] = [
    (CKA_SENSITIVE, false),
    (CKA_ALWAYS_SENSITIVE, false),
    (CKA_NEVER_EXTRACTABLE, false),
    (CKA_LOCAL, false),
];

/// The part of an encapsulator that does not depend on the algorithm
#[derive(Debug, Clone)]
pub struct EncapsulatorBase {
    mechanism: CK_MECHANISM_TYPE,
    builder: Option<SecretKeyBuilder>,
}

impl EncapsulatorBase {
    pub fn new(mechanism: CK_MECHANISM_TYPE) -> EncapsulatorBase {
        EncapsulatorBase {
            mechanism: mechanism,
            builder: None,
        }
    }

    pub fn mechanism(&self) -> CK_MECHANISM_TYPE {
        self.mechanism
    }

    /// Parses the output template of the shared secret
    pub fn init(&mut self, template: &[Attribute]) -> Result<()> {
        trace!(
            "Encapsulator {} init with {} attributes",
            mech_type_to_name(self.mechanism),
            template.len()
        );
        self.builder = Some(SecretKeyBuilder::from_template(template)?);
        Ok(())
    }

    pub fn builder(&self) -> Result<&SecretKeyBuilder> {
        match &self.builder {
            Some(b) => Ok(b),
            None => Err(CKR_OPERATION_NOT_INITIALIZED)?,
        }
    }

    /// Length the shared secret must at least have
    pub fn minimal_secret_len(&self) -> Result<usize> {
        Ok(self.builder()?.minimal_secret_len())
    }

    /// Checks the public key used to encapsulate
    pub fn check_public<F>(
        &self,
        key: &Object,
        expected: &str,
        accept: F,
    ) -> Result<KeyKind>
    where
        F: Fn(KeyKind) -> bool,
    {
        bind_key(self.mechanism, key, CKA_ENCAPSULATE, expected, accept)
    }

    /// Checks the private key used to decapsulate
    pub fn check_private<F>(
        &self,
        key: &Object,
        expected: &str,
        accept: F,
    ) -> Result<KeyKind>
    where
        F: Fn(KeyKind) -> bool,
    {
        bind_key(self.mechanism, key, CKA_DECAPSULATE, expected, accept)
    }

    /// Builds the secret key object holding `secret`
    pub fn secret_key(&self, mut secret: Zeroizing<Vec<u8>>) -> Result<Object> {
        let mut obj = self.builder()?.build(std::mem::take(&mut *secret))?;
        for (attr, val) in ENCAPSULATED_SECRET_FLAGS {
            obj.set_attr(Attribute::from_bool(attr, val))?;
        }
        recompute_attributes(&mut obj)?;
        debug!(
            "{} produced a secret key of {} bytes",
            mech_type_to_name(self.mechanism),
            obj.get_attr_as_ulong(CKA_VALUE_LEN)?
        );
        Ok(obj)
    }
}
