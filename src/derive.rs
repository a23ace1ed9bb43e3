// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! State and checks shared by the key derivation generators

use crate::attribute::Attribute;
use crate::error::{Error, Result};
use crate::mechanism::mech_type_to_name;
use crate::object::key::{recompute_attributes, validate, SecretKey};
use crate::object::{KeyKind, Object, SecretKeyBuilder};
use crate::pkcs11::*;

use log::{debug, error, trace};
use zeroize::Zeroizing;

/// The part of a generator that does not depend on the algorithm
#[derive(Debug, Clone)]
pub struct DeriveBase {
    mechanism: CK_MECHANISM_TYPE,
    builder: Option<SecretKeyBuilder>,
}

impl DeriveBase {
    pub fn new(mechanism: CK_MECHANISM_TYPE) -> DeriveBase {
        DeriveBase {
            mechanism: mechanism,
            builder: None,
        }
    }

    pub fn mechanism(&self) -> CK_MECHANISM_TYPE {
        self.mechanism
    }

    pub fn init(&mut self, template: &[Attribute]) -> Result<()> {
        trace!(
            "Derive {} init with {} attributes",
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

    /// Checks the base key is of a kind the mechanism derives from and
    /// allows derivation
    pub fn check_base<F>(&self, base: &Object, accept: F) -> Result<KeyKind>
    where
        F: Fn(KeyKind) -> bool,
    {
        let kind = match KeyKind::of(base) {
            Ok(k) if accept(k) => k,
            Ok(k) => {
                error!(
                    "{} can't derive from a {}",
                    mech_type_to_name(self.mechanism),
                    k
                );
                return Err(Error::ck_rv_with_errmsg(
                    CKR_KEY_TYPE_INCONSISTENT,
                    format!(
                        "{} can't derive from a {}",
                        mech_type_to_name(self.mechanism),
                        k
                    ),
                ));
            }
            Err(e) => {
                error!("{}: {}", mech_type_to_name(self.mechanism), e);
                return Err(Error::ck_rv_from_error(CKR_KEY_TYPE_INCONSISTENT, e));
            }
        };
        base.check_permission(CKA_DERIVE)?;
        Ok(kind)
    }

    /// Returns the secret value of a base key that must be a secret key
    pub fn base_secret(&self, base: &Object) -> Result<SecretKey> {
        self.check_base(base, |k| matches!(k, KeyKind::Secret(_)))?;
        SecretKey::from_object(base)
    }

    /// Builds the derived key object from `secret`
    pub fn derived_key(
        &self,
        base: &Object,
        mut secret: Zeroizing<Vec<u8>>,
    ) -> Result<Object> {
        let mut obj = self.builder()?.build(std::mem::take(&mut *secret))?;
        obj.set_attr(Attribute::from_bool(CKA_LOCAL, false))?;
        let always_sensitive =
            base.is_always_sensitive() && obj.is_always_sensitive();
        let never_extractable =
            base.is_never_extractable() && obj.is_never_extractable();
        obj.set_attr(Attribute::from_bool(
            CKA_ALWAYS_SENSITIVE,
            always_sensitive,
        ))?;
        obj.set_attr(Attribute::from_bool(
            CKA_NEVER_EXTRACTABLE,
            never_extractable,
        ))?;
        recompute_attributes(&mut obj)?;
        validate(&obj)?;
        debug!(
            "{} derived a key of {} bytes",
            mech_type_to_name(self.mechanism),
            obj.get_attr_as_ulong(CKA_VALUE_LEN)?
        );
        Ok(obj)
    }
}
