// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! Message digests

use crate::capability::DigestEngine;
use crate::error::{Error, Result};
use crate::kasn1::oid::*;
use crate::pkcs11::*;

use blake2::Blake2b;
use digest::consts::{U20, U32, U48, U64};
use digest::{DynDigest, ExtendableOutput, Update, XofReader};

/// The digest algorithms known to the mechanisms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlg {
    Md2,
    Md5,
    Sha1,
    Ripemd128,
    Ripemd160,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Sha512_224,
    Sha512_256,
    Sha3_224,
    Sha3_256,
    Sha3_384,
    Sha3_512,
    Shake128,
    Shake256,
    Blake2b160,
    Blake2b256,
    Blake2b384,
    Blake2b512,
    Gost94,
}

impl DigestAlg {
    /// Maps a digest mechanism (as found in mechanism parameters) to the
    /// algorithm, unknown digests are `CKR_MECHANISM_PARAM_INVALID`
    pub fn from_mechanism(mech: CK_MECHANISM_TYPE) -> Result<DigestAlg> {
        Ok(match mech {
            CKM_MD2 => DigestAlg::Md2,
            CKM_MD5 => DigestAlg::Md5,
            CKM_SHA_1 => DigestAlg::Sha1,
            CKM_RIPEMD128 => DigestAlg::Ripemd128,
            CKM_RIPEMD160 => DigestAlg::Ripemd160,
            CKM_SHA224 => DigestAlg::Sha224,
            CKM_SHA256 => DigestAlg::Sha256,
            CKM_SHA384 => DigestAlg::Sha384,
            CKM_SHA512 => DigestAlg::Sha512,
            CKM_SHA512_224 => DigestAlg::Sha512_224,
            CKM_SHA512_256 => DigestAlg::Sha512_256,
            CKM_SHA3_224 => DigestAlg::Sha3_224,
            CKM_SHA3_256 => DigestAlg::Sha3_256,
            CKM_SHA3_384 => DigestAlg::Sha3_384,
            CKM_SHA3_512 => DigestAlg::Sha3_512,
            CKM_BLAKE2B_160 => DigestAlg::Blake2b160,
            CKM_BLAKE2B_256 => DigestAlg::Blake2b256,
            CKM_BLAKE2B_384 => DigestAlg::Blake2b384,
            CKM_BLAKE2B_512 => DigestAlg::Blake2b512,
            CKM_GOSTR3411 => DigestAlg::Gost94,
            _ => {
                return Err(Error::ck_rv_with_errmsg(
                    CKR_MECHANISM_PARAM_INVALID,
                    format!("unsupported digest mechanism {:#x}", mech),
                ))
            }
        })
    }

    /// Maps an MGF1 generator to its digest
    pub fn from_mgf(mgf: CK_RSA_PKCS_MGF_TYPE) -> Result<DigestAlg> {
        Ok(match mgf {
            CKG_MGF1_SHA1 => DigestAlg::Sha1,
            CKG_MGF1_SHA224 => DigestAlg::Sha224,
            CKG_MGF1_SHA256 => DigestAlg::Sha256,
            CKG_MGF1_SHA384 => DigestAlg::Sha384,
            CKG_MGF1_SHA512 => DigestAlg::Sha512,
            CKG_MGF1_SHA3_224 => DigestAlg::Sha3_224,
            CKG_MGF1_SHA3_256 => DigestAlg::Sha3_256,
            CKG_MGF1_SHA3_384 => DigestAlg::Sha3_384,
            CKG_MGF1_SHA3_512 => DigestAlg::Sha3_512,
            _ => {
                return Err(Error::ck_rv_with_errmsg(
                    CKR_MECHANISM_PARAM_INVALID,
                    format!("unsupported MGF {:#x}", mgf),
                ))
            }
        })
    }

    /// Size of the digest output in bytes, the XOFs produce the
    /// output size of their security strength
    pub fn output_len(&self) -> usize {
        match self {
            DigestAlg::Md2 | DigestAlg::Md5 | DigestAlg::Ripemd128 => 16,
            DigestAlg::Sha1 | DigestAlg::Ripemd160 | DigestAlg::Blake2b160 => {
                20
            }
            DigestAlg::Sha224 | DigestAlg::Sha512_224 | DigestAlg::Sha3_224 => {
                28
            }
            DigestAlg::Sha256
            | DigestAlg::Sha512_256
            | DigestAlg::Sha3_256
            | DigestAlg::Shake128
            | DigestAlg::Blake2b256
            | DigestAlg::Gost94 => 32,
            DigestAlg::Sha384 | DigestAlg::Sha3_384 | DigestAlg::Blake2b384 => {
                48
            }
            DigestAlg::Sha512
            | DigestAlg::Sha3_512
            | DigestAlg::Shake256
            | DigestAlg::Blake2b512 => 64,
        }
    }

    /// The algorithm OID used in DigestInfo structures
    pub fn oid(&self) -> Option<asn1::ObjectIdentifier> {
        match self {
            DigestAlg::Md2 => Some(MD2_OID),
            DigestAlg::Md5 => Some(MD5_OID),
            DigestAlg::Sha1 => Some(SHA1_OID),
            DigestAlg::Ripemd128 => Some(RIPEMD128_OID),
            DigestAlg::Ripemd160 => Some(RIPEMD160_OID),
            DigestAlg::Sha224 => Some(SHA224_OID),
            DigestAlg::Sha256 => Some(SHA256_OID),
            DigestAlg::Sha384 => Some(SHA384_OID),
            DigestAlg::Sha512 => Some(SHA512_OID),
            DigestAlg::Sha512_224 => Some(SHA512_224_OID),
            DigestAlg::Sha512_256 => Some(SHA512_256_OID),
            DigestAlg::Sha3_224 => Some(SHA3_224_OID),
            DigestAlg::Sha3_256 => Some(SHA3_256_OID),
            DigestAlg::Sha3_384 => Some(SHA3_384_OID),
            DigestAlg::Sha3_512 => Some(SHA3_512_OID),
            DigestAlg::Shake128 => Some(SHAKE128_OID),
            DigestAlg::Shake256 => Some(SHAKE256_OID),
            _ => None,
        }
    }

    /// Returns the fixed output digest behind the object safe
    /// [DynDigest] interface, None for the XOFs
    pub fn dyn_digest(&self) -> Option<Box<dyn DynDigest + Send + Sync>> {
        Some(match self {
            DigestAlg::Md2 => Box::new(md2::Md2::default()),
            DigestAlg::Md5 => Box::new(md5::Md5::default()),
            DigestAlg::Sha1 => Box::new(sha1::Sha1::default()),
            DigestAlg::Ripemd128 => Box::new(ripemd::Ripemd128::default()),
            DigestAlg::Ripemd160 => Box::new(ripemd::Ripemd160::default()),
            DigestAlg::Sha224 => Box::new(sha2::Sha224::default()),
            DigestAlg::Sha256 => Box::new(sha2::Sha256::default()),
            DigestAlg::Sha384 => Box::new(sha2::Sha384::default()),
            DigestAlg::Sha512 => Box::new(sha2::Sha512::default()),
            DigestAlg::Sha512_224 => Box::new(sha2::Sha512_224::default()),
            DigestAlg::Sha512_256 => Box::new(sha2::Sha512_256::default()),
            DigestAlg::Sha3_224 => Box::new(sha3::Sha3_224::default()),
            DigestAlg::Sha3_256 => Box::new(sha3::Sha3_256::default()),
            DigestAlg::Sha3_384 => Box::new(sha3::Sha3_384::default()),
            DigestAlg::Sha3_512 => Box::new(sha3::Sha3_512::default()),
            DigestAlg::Blake2b160 => Box::new(Blake2b::<U20>::default()),
            DigestAlg::Blake2b256 => Box::new(Blake2b::<U32>::default()),
            DigestAlg::Blake2b384 => Box::new(Blake2b::<U48>::default()),
            DigestAlg::Blake2b512 => Box::new(Blake2b::<U64>::default()),
            DigestAlg::Gost94 => Box::new(gost94::Gost94CryptoPro::default()),
            DigestAlg::Shake128 | DigestAlg::Shake256 => return None,
        })
    }

    /// Returns a new running digest
    pub fn engine(&self) -> Box<dyn DigestEngine> {
        if let Some(d) = self.dyn_digest() {
            return Box::new(DynEngine(d));
        }
        if *self == DigestAlg::Shake128 {
            Box::new(XofEngine {
                hasher: sha3::Shake128::default(),
                outlen: self.output_len(),
            })
        } else {
            Box::new(XofEngine {
                hasher: sha3::Shake256::default(),
                outlen: self.output_len(),
            })
        }
    }

    /// One shot digest of `data`
    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        let mut engine = self.engine();
        engine.update(data);
        engine.finalize()
    }
}

/// Fixed output digests through the object safe [DynDigest] interface
struct DynEngine(Box<dyn DynDigest + Send + Sync>);

impl DigestEngine for DynEngine {
    fn update(&mut self, data: &[u8]) {
        DynDigest::update(&mut *self.0, data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        self.0.finalize().into_vec()
    }

    fn output_len(&self) -> usize {
        self.0.output_size()
    }
}

/// Extendable output functions truncated to a fixed length
struct XofEngine<X> {
    hasher: X,
    outlen: usize,
}

impl<X> DigestEngine for XofEngine<X>
where
    X: Update + ExtendableOutput + Send,
{
    fn update(&mut self, data: &[u8]) {
        Update::update(&mut self.hasher, data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        let XofEngine { hasher, outlen } = *self;
        let mut out = vec![0u8; outlen];
        hasher.finalize_xof().read(&mut out);
        out
    }

    fn output_len(&self) -> usize {
        self.outlen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_lengths() {
        for alg in [
            DigestAlg::Md2,
            DigestAlg::Md5,
            DigestAlg::Sha1,
            DigestAlg::Ripemd128,
            DigestAlg::Ripemd160,
            DigestAlg::Sha224,
            DigestAlg::Sha256,
            DigestAlg::Sha384,
            DigestAlg::Sha512,
            DigestAlg::Sha512_224,
            DigestAlg::Sha512_256,
            DigestAlg::Sha3_224,
            DigestAlg::Sha3_256,
            DigestAlg::Sha3_384,
            DigestAlg::Sha3_512,
            DigestAlg::Shake128,
            DigestAlg::Shake256,
            DigestAlg::Blake2b160,
            DigestAlg::Blake2b256,
            DigestAlg::Blake2b384,
            DigestAlg::Blake2b512,
            DigestAlg::Gost94,
        ] {
            assert_eq!(alg.digest(b"abc").len(), alg.output_len());
            assert_eq!(alg.engine().output_len(), alg.output_len());
        }
    }

    #[test]
    fn sha256_abc() {
        assert_eq!(
            DigestAlg::Sha256.digest(b"abc"),
            hex::decode(
                "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
            )
            .unwrap()
        );
    }
}
