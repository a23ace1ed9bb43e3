// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! The object storage collaborator.
//!
//! Mechanisms only ever need to resolve handles embedded in parameters
//! (the other key of a concatenation, the salt key of HKDF) and callers
//! need somewhere to put the keys the mechanisms produce.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{Error, Result};
use crate::object::Object;
use crate::pkcs11::*;

/// Storage interface consulted by the mechanisms
pub trait ObjectStore: Send + Sync {
    /// Returns a copy of the object associated to `handle`
    ///
    /// Unknown handles return `CKR_OBJECT_HANDLE_INVALID`
    fn find_object_by_handle(&self, handle: CK_OBJECT_HANDLE) -> Result<Object>;

    /// Stores a new object and returns the handle assigned to it
    fn store_object(&self, obj: Object) -> Result<CK_OBJECT_HANDLE>;
}

#[derive(Debug)]
struct Inner {
    next_handle: CK_OBJECT_HANDLE,
    objects: HashMap<CK_OBJECT_HANDLE, Object>,
}

/// A volatile, in memory object store
#[derive(Debug)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        MemoryStore::new()
    }
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore {
            inner: RwLock::new(Inner {
                next_handle: 1,
                objects: HashMap::new(),
            }),
        }
    }

    /// Number of objects currently stored
    pub fn len(&self) -> usize {
        match self.inner.read() {
            Ok(inner) => inner.objects.len(),
            Err(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ObjectStore for MemoryStore {
    fn find_object_by_handle(&self, handle: CK_OBJECT_HANDLE) -> Result<Object> {
        let inner = match self.inner.read() {
            Ok(i) => i,
            Err(_) => return Err(CKR_GENERAL_ERROR)?,
        };
        match inner.objects.get(&handle) {
            Some(obj) => Ok(obj.clone()),
            None => Err(Error::ck_rv_with_errmsg(
                CKR_OBJECT_HANDLE_INVALID,
                format!("no object with handle {}", handle),
            )),
        }
    }

    fn store_object(&self, mut obj: Object) -> Result<CK_OBJECT_HANDLE> {
        let mut inner = match self.inner.write() {
            Ok(i) => i,
            Err(_) => return Err(CKR_GENERAL_ERROR)?,
        };
        let handle = inner.next_handle;
        inner.next_handle += 1;
        obj.set_handle(handle);
        inner.objects.insert(handle, obj);
        Ok(handle)
    }
}
