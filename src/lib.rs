// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! Mechanism dispatch core of a PKCS#11 software token.
//!
//! The crate turns a PKCS#11 mechanism identifier plus its serialized
//! parameters into a bound operation over a key object:
//!
//! - [factory::EncapsulatorFactory] builds KEM style encapsulators
//! - [factory::WrapperSignerFactory] builds signature and MAC signers
//! - [factory::DeriveKeyGeneratorFactory] builds key derivation generators
//!
//! Key objects are attribute containers ([object::Object]) and every
//! operation that produces a secret returns a fully populated secret key
//! object ready to be stored by the caller.

pub use pkcs11;

pub mod attribute;
pub mod capability;
pub mod config;
pub mod error;
pub mod factory;
pub mod mechanism;
pub mod object;
pub mod params;

mod agreement;
mod derive;
mod ec;
mod enabled;
mod encapsulate;
mod kasn1;
mod misc;
mod native;
mod sign;

#[cfg(feature = "log")]
mod log;

#[cfg(feature = "cmac")]
mod cmac;

#[cfg(feature = "ecdsa")]
mod ecc;

#[cfg(feature = "ecdh")]
mod ecdh;

#[cfg(feature = "eddsa")]
mod eddsa;

#[cfg(feature = "simplekdf")]
mod encdata;

#[cfg(feature = "hash")]
mod hash;

#[cfg(feature = "hkdf")]
mod hkdf;

#[cfg(feature = "hmac")]
mod hmac;

#[cfg(feature = "mldsa")]
mod mldsa;

#[cfg(feature = "mlkem")]
mod mlkem;

#[cfg(feature = "poly1305")]
mod poly1305;

#[cfg(feature = "rsa")]
mod rsa;

#[cfg(feature = "simplekdf")]
mod simplekdf;

#[cfg(feature = "slhdsa")]
mod slhdsa;

pub use capability::RandomSource;
pub use config::Config;
pub use error::{Error, ErrorKind, Result};
pub use factory::{
    DeriveKeyGeneratorFactory, EncapsulatorFactory, WrapperSignerFactory,
};
pub use mechanism::{
    AuthenticatedSigner, DeriveKeyGenerator, Encapsulator, Mechanisms,
    MechanismValue, Signer, WrapperSigner,
};
pub use object::{MemoryStore, Object, ObjectStore};

#[cfg(test)]
mod tests;
