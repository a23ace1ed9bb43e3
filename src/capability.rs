// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! Capability interfaces of the primitive layer.
//!
//! Mechanisms never touch a cryptographic engine directly, they go
//! through these traits. The engines themselves live in the `native`
//! module.

use std::fmt::Debug;

use crate::error::Result;
use crate::map_err;
use crate::pkcs11::*;

use rand_core::{CryptoRng, RngCore};

/// A source of random bytes, supplied by the caller for each operation
pub trait RandomSource {
    /// Fills `buf` with random bytes
    fn next_bytes(&mut self, buf: &mut [u8]) -> Result<()>;
}

impl<R: RngCore + CryptoRng> RandomSource for R {
    fn next_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        map_err!(self.try_fill_bytes(buf), CKR_FUNCTION_FAILED)
    }
}

/// Adapter that lets the engines draw from a [RandomSource]
pub struct SourceRng<'a>(pub &'a mut dyn RandomSource);

impl RngCore for SourceRng<'_> {
    fn next_u32(&mut self) -> u32 {
        rand_core::impls::next_u32_via_fill(self)
    }

    fn next_u64(&mut self) -> u64 {
        rand_core::impls::next_u64_via_fill(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        /* Like OsRng, a failing source is not recoverable here */
        if let Err(e) = self.0.next_bytes(dest) {
            panic!("random source failure: {}", e);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand_core::Error> {
        match self.0.next_bytes(dest) {
            Ok(()) => Ok(()),
            Err(e) => Err(rand_core::Error::new(e)),
        }
    }
}

impl CryptoRng for SourceRng<'_> {}

/// Returns `len` random bytes drawn from `rng`
pub fn random_bytes(rng: &mut dyn RandomSource, len: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    rng.next_bytes(&mut buf)?;
    Ok(buf)
}

/// A running message digest
pub trait DigestEngine: Send {
    fn update(&mut self, data: &[u8]);
    fn finalize(self: Box<Self>) -> Vec<u8>;
    fn output_len(&self) -> usize;
}

/// A running message authentication code
pub trait MacEngine: Send {
    fn update(&mut self, data: &[u8]) -> Result<()>;
    /// Returns the full length tag
    fn finalize(&mut self) -> Result<Vec<u8>>;
    fn output_len(&self) -> usize;
}

/// Raw Diffie-Hellman style agreement with a private key
pub trait Agreement: Debug + Send {
    /// Computes the raw shared value with the peer's public key
    fn agree(&self, peer: &[u8]) -> Result<Vec<u8>>;
}

/// One shot signature primitive over a complete message or digest
pub trait SignatureEngine: Debug + Send {
    fn sign(&self, data: &[u8], rng: &mut dyn RandomSource) -> Result<Vec<u8>>;
    fn verify(&self, data: &[u8], signature: &[u8]) -> Result<bool>;
    fn signature_len(&self) -> usize;
}

/// Asymmetric encryption primitive
pub trait CipherEngine: Debug + Send {
    fn encrypt(&self, data: &[u8], rng: &mut dyn RandomSource) -> Result<Vec<u8>>;
    fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>>;
    /// Length of the ciphertexts produced
    fn ciphertext_len(&self) -> usize;
}

/// Key encapsulation primitive
pub trait KemEngine: Debug + Send {
    /// Returns (shared secret, ciphertext)
    fn encapsulate(&self, rng: &mut dyn RandomSource) -> Result<(Vec<u8>, Vec<u8>)>;
    fn decapsulate(&self, ciphertext: &[u8]) -> Result<Vec<u8>>;
    fn ciphertext_len(&self) -> usize;
}
