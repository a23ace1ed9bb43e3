// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! This module defines the representation of PKCS#11 key objects
//! ([Object]), the typed key views built on top of it ([key]) and the
//! storage collaborator interface ([store]).

use std::fmt::Debug;

use crate::attribute::{attr_name, AttrType, Attribute};
use crate::error::{Error, Result};
use crate::pkcs11::*;

use uuid::Uuid;

pub mod key;
pub mod store;

pub use key::{KeyKind, SecretKeyBuilder};
pub use store::{MemoryStore, ObjectStore};

/// Helper macro that generates methods to check specific boolean
/// attributes on objects
macro_rules! create_bool_checker {
    (make $name:ident; from $id:expr; def $def:expr) => {
        #[doc = concat!("Returns the value of [", stringify!($id), "] as a boolean")]
        #[allow(dead_code)]
        pub fn $name(&self) -> bool {
            for a in &self.attributes {
                if a.get_type() == $id {
                    return a.to_bool().unwrap_or($def);
                }
            }
            $def
        }
    };
}

/// Helper macro that generates methods to retrieve attributes
/// values of a specific type from objects
macro_rules! attr_as_type {
    (make $name:ident; with $r:ty; $atype:ident; via $conv:ident) => {
        #[doc = concat!("Returns the value of the attribute as a `", stringify!($r), "`")]
        pub fn $name(&self, t: CK_ULONG) -> Result<$r> {
            for attr in &self.attributes {
                if attr.get_type() == t {
                    if attr.get_attrtype() != AttrType::$atype {
                        return Err(CKR_ATTRIBUTE_TYPE_INVALID)?;
                    }
                    return attr.$conv();
                }
            }
            Err(Error::not_found(t.to_string()))
        }
    };
}

/// This is a generic container for all PKCS#11 key objects.
///
/// Objects holding private or secret material are zeroized when dropped.
#[derive(Debug, Clone)]
pub struct Object {
    /// The object handle value
    ///
    /// Is CK_INVALID_HANDLE until the object is stored
    handle: CK_OBJECT_HANDLE,
    /// All objects have a class so we keep it here in order to access it
    /// directly in some internal functions
    class: CK_OBJECT_CLASS,
    /// The object attributes as vector of [Attribute] values
    attributes: Vec<Attribute>,
    /// Flag to indicate if the object needs to be zeroized when it is
    /// drop()ed.
    zeroize: bool,
}

impl Drop for Object {
    fn drop(&mut self) {
        if self.zeroize {
            for a in self.attributes.iter_mut() {
                a.zeroize()
            }
        }
    }
}

impl Object {
    /// Creates a new empty Object
    pub fn new(class: CK_OBJECT_CLASS) -> Object {
        Object {
            handle: CK_INVALID_HANDLE,
            class: class,
            attributes: vec![Attribute::from_ulong(CKA_CLASS, class)],
            zeroize: matches!(class, CKO_PRIVATE_KEY | CKO_SECRET_KEY),
        }
    }

    /// Creates an Object from a full list of attributes, the class is taken
    /// from the `CKA_CLASS` attribute which must be present
    pub fn from_attributes(attrs: &[Attribute]) -> Result<Object> {
        let class = match attrs.iter().find(|a| a.get_type() == CKA_CLASS) {
            Some(a) => a.to_ulong()?,
            None => return Err(CKR_TEMPLATE_INCONSISTENT)?,
        };
        let mut obj = Object::new(class);
        for a in attrs {
            a.check_type()?;
            obj.set_attr(a.clone())?;
        }
        Ok(obj)
    }

    /// Generates the internal per object unique id
    /// This is generally called at object creation or import
    pub fn generate_unique(&mut self) {
        if !self
            .attributes
            .iter()
            .any(|r| r.get_type() == CKA_UNIQUE_ID)
        {
            let uuid = Uuid::new_v4().to_string();
            self.attributes
                .push(Attribute::from_string(CKA_UNIQUE_ID, uuid));
        }
    }

    /// Set the handle assigned by the object store
    pub fn set_handle(&mut self, h: CK_OBJECT_HANDLE) {
        self.handle = h
    }

    /// Gets the object's handle
    pub fn get_handle(&self) -> CK_OBJECT_HANDLE {
        self.handle
    }

    /// Gets the object's class
    pub fn get_class(&self) -> CK_OBJECT_CLASS {
        self.class
    }

    create_bool_checker! {make is_local; from CKA_LOCAL; def false}
    create_bool_checker! {make is_always_sensitive; from CKA_ALWAYS_SENSITIVE; def false}
    create_bool_checker! {make is_never_extractable; from CKA_NEVER_EXTRACTABLE; def false}
    create_bool_checker! {make always_auth; from CKA_ALWAYS_AUTHENTICATE; def false}

    /// Report if the object is sensitive with a sensible default
    pub fn is_sensitive(&self) -> bool {
        match self.class {
            CKO_PRIVATE_KEY | CKO_SECRET_KEY => {
                for a in &self.attributes {
                    if a.get_type() == CKA_SENSITIVE {
                        return a.to_bool().unwrap_or(true);
                    }
                }
                true
            }
            _ => false,
        }
    }

    /// Report is the object is extractable with a sensible default
    pub fn is_extractable(&self) -> bool {
        match self.class {
            CKO_PRIVATE_KEY | CKO_SECRET_KEY => {
                for a in &self.attributes {
                    if a.get_type() == CKA_EXTRACTABLE {
                        return a.to_bool().unwrap_or(false);
                    }
                }
                false
            }
            _ => true,
        }
    }

    /// Get an attribute from the object by attribute id
    pub fn get_attr(&self, ck_type: CK_ULONG) -> Option<&Attribute> {
        self.attributes.iter().find(|r| r.get_type() == ck_type)
    }

    /// Sets or Replaces an attribute on the object
    pub fn set_attr(&mut self, a: Attribute) -> Result<()> {
        let atype = a.get_type();
        if atype == CKA_CLASS {
            self.class = a.to_ulong()?;
            self.zeroize |=
                matches!(self.class, CKO_PRIVATE_KEY | CKO_SECRET_KEY);
        }
        match self.attributes.iter().position(|r| r.get_type() == atype) {
            Some(idx) => self.attributes[idx] = a,
            None => self.attributes.push(a),
        }
        Ok(())
    }

    /// Gets a reference to the internal vector of object attributes
    pub fn get_attributes(&self) -> &Vec<Attribute> {
        &self.attributes
    }

    attr_as_type! {make get_attr_as_bool; with bool; BoolType; via to_bool}
    attr_as_type! {make get_attr_as_ulong; with CK_ULONG; NumType; via to_ulong}
    attr_as_type! {make get_attr_as_string; with String; StringType; via to_string}
    attr_as_type! {make get_attr_as_bytes; with &Vec<u8>; BytesType; via to_bytes}

    /// Checks that the usage flag `op` is set to true on the object
    pub fn check_permission(&self, op: CK_ATTRIBUTE_TYPE) -> Result<()> {
        if self.get_attr_as_bool(op).unwrap_or(false) {
            return Ok(());
        }
        Err(Error::ck_rv_with_errmsg(
            CKR_KEY_FUNCTION_NOT_PERMITTED,
            format!("{} is not set on the key", attr_name(op)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_attributes() {
        let obj = Object::from_attributes(&[
            Attribute::from_ulong(CKA_CLASS, CKO_SECRET_KEY),
            Attribute::from_ulong(CKA_KEY_TYPE, CKK_AES),
            Attribute::from_bool(CKA_SIGN, true),
        ])
        .unwrap();
        assert_eq!(obj.get_class(), CKO_SECRET_KEY);
        assert_eq!(obj.get_attributes().len(), 3);
        assert!(obj.get_attr(CKA_SIGN).is_some());
        assert!(obj.check_permission(CKA_SIGN).is_ok());
        assert_eq!(
            obj.check_permission(CKA_VERIFY).unwrap_err().rv(),
            CKR_KEY_FUNCTION_NOT_PERMITTED
        );
        /* secrets default to sensitive and not extractable */
        assert!(obj.is_sensitive());
        assert!(!obj.is_extractable());

        let err = Object::from_attributes(&[Attribute::from_ulong(
            CKA_KEY_TYPE,
            CKK_AES,
        )])
        .unwrap_err();
        assert_eq!(err.rv(), CKR_TEMPLATE_INCONSISTENT);

        /* values must have the registered type */
        let err = Object::from_attributes(&[
            Attribute::from_ulong(CKA_CLASS, CKO_SECRET_KEY),
            Attribute::from_ulong(CKA_SIGN, 1),
        ])
        .unwrap_err();
        assert_eq!(err.rv(), CKR_ATTRIBUTE_VALUE_INVALID);
    }
}
