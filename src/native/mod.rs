// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! This module provides the native Rust implementations of the
//! cryptographic primitives behind the capability interfaces

pub mod cipher;
pub mod digest;
pub mod mac;

#[cfg(any(feature = "ecdsa", feature = "ecdh"))]
pub mod ecc;
#[cfg(feature = "eddsa")]
pub mod eddsa;
#[cfg(feature = "mldsa")]
pub mod mldsa;
#[cfg(feature = "mlkem")]
pub mod mlkem;
#[cfg(feature = "ec_montgomery")]
pub mod montgomery;
#[cfg(feature = "rsa")]
pub mod rsa;
#[cfg(feature = "slhdsa")]
pub mod slhdsa;

#[cfg(any(feature = "mldsa", feature = "slhdsa"))]
use crate::error::{Error, Result};
#[cfg(any(feature = "mldsa", feature = "slhdsa"))]
use crate::native::digest::DigestAlg;
#[cfg(any(feature = "mldsa", feature = "slhdsa"))]
use crate::pkcs11::*;

/// The pre-hash functions the HashML-DSA and HashSLH-DSA engines can
/// apply to the message
#[cfg(any(feature = "mldsa", feature = "slhdsa"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrehashAlg {
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Sha3_224,
    Sha3_256,
    Sha3_384,
    Sha3_512,
    Shake128,
    Shake256,
}

#[cfg(any(feature = "mldsa", feature = "slhdsa"))]
impl PrehashAlg {
    /// Maps the digest mechanism named in the parameters of the generic
    /// HASH_* mechanisms. There are no digest mechanisms for the SHAKE
    /// functions, they are only reachable through the fixed hash
    /// mechanisms.
    pub fn from_mechanism(mech: CK_MECHANISM_TYPE) -> Result<PrehashAlg> {
        Ok(match mech {
            CKM_SHA224 => PrehashAlg::Sha224,
            CKM_SHA256 => PrehashAlg::Sha256,
            CKM_SHA384 => PrehashAlg::Sha384,
            CKM_SHA512 => PrehashAlg::Sha512,
            CKM_SHA3_224 => PrehashAlg::Sha3_224,
            CKM_SHA3_256 => PrehashAlg::Sha3_256,
            CKM_SHA3_384 => PrehashAlg::Sha3_384,
            CKM_SHA3_512 => PrehashAlg::Sha3_512,
            _ => {
                return Err(Error::ck_rv_with_errmsg(
                    CKR_MECHANISM_PARAM_INVALID,
                    format!("pre-hash {:#x} is not supported", mech),
                ))
            }
        })
    }

    fn digest_alg(&self) -> DigestAlg {
        match self {
            PrehashAlg::Sha224 => DigestAlg::Sha224,
            PrehashAlg::Sha256 => DigestAlg::Sha256,
            PrehashAlg::Sha384 => DigestAlg::Sha384,
            PrehashAlg::Sha512 => DigestAlg::Sha512,
            PrehashAlg::Sha3_224 => DigestAlg::Sha3_224,
            PrehashAlg::Sha3_256 => DigestAlg::Sha3_256,
            PrehashAlg::Sha3_384 => DigestAlg::Sha3_384,
            PrehashAlg::Sha3_512 => DigestAlg::Sha3_512,
            PrehashAlg::Shake128 => DigestAlg::Shake128,
            PrehashAlg::Shake256 => DigestAlg::Shake256,
        }
    }

    /// Builds the HashML-DSA / HashSLH-DSA formatted message
    /// `1 || len(ctx) || ctx || OID || PH(M)`
    ///
    /// SHAKE128 and SHAKE256 produce 256 and 512 bits respectively.
    pub fn formatted_message(&self, ctx: &[u8], msg: &[u8]) -> Result<Vec<u8>> {
        let alg = self.digest_alg();
        let ctx_len = match u8::try_from(ctx.len()) {
            Ok(l) => l,
            Err(_) => return Err(CKR_MECHANISM_PARAM_INVALID)?,
        };
        let oid = match alg.oid() {
            Some(o) => asn1::write_single(&o)?,
            None => {
                return Err(Error::invariant(format!(
                    "{:?} has no algorithm identifier",
                    alg
                )))
            }
        };
        let phm = alg.digest(msg);
        let mut mp = Vec::with_capacity(2 + ctx.len() + oid.len() + phm.len());
        mp.push(1u8);
        mp.push(ctx_len);
        mp.extend_from_slice(ctx);
        mp.extend_from_slice(&oid);
        mp.extend_from_slice(&phm);
        Ok(mp)
    }
}

#[cfg(all(test, any(feature = "mldsa", feature = "slhdsa")))]
mod tests {
    use super::*;

    #[test]
    fn formatted_message_layout() {
        let mp = PrehashAlg::Sha384.formatted_message(b"ctx", b"abc").unwrap();
        assert_eq!(&mp[..5], &[1u8, 3, b'c', b't', b'x']);
        assert_eq!(
            &mp[5..16],
            &[0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x02]
        );
        assert_eq!(mp.len(), 16 + 48);

        let mp = PrehashAlg::Shake256.formatted_message(&[], b"abc").unwrap();
        assert_eq!(mp[12], 0x0c);
        assert_eq!(mp.len(), 13 + 64);

        assert_eq!(
            PrehashAlg::Shake128
                .formatted_message(&[0u8; 256], b"abc")
                .err()
                .unwrap()
                .rv(),
            CKR_MECHANISM_PARAM_INVALID
        );
        assert_eq!(
            PrehashAlg::from_mechanism(CKM_SHA3_256).unwrap(),
            PrehashAlg::Sha3_256
        );
        assert!(PrehashAlg::from_mechanism(CKM_SHA_1).is_err());
    }
}
