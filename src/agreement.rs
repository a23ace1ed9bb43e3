// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! Key agreement with optional KDF post-processing.
//!
//! The ECDH encapsulators and the ECDH derivations share this adapter:
//! the raw shared value computed by an [Agreement] is either used as is
//! (`CKD_NULL`) or expanded with the ISO-18033-2 KDF1 construction
//! `H(Z || I2OSP(counter, 4) || sharedData)`, counter starting at 0.

use crate::capability::Agreement;
use crate::error::{Error, Result};
use crate::misc::zeromem;
use crate::native::digest::DigestAlg;
use crate::pkcs11::*;

use log::{debug, error};
use zeroize::Zeroizing;

/// The KDF applied to the raw shared value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgreementKdf {
    Null,
    Kdf1(DigestAlg),
}

impl AgreementKdf {
    /// Maps a `CKD_*` identifier, unknown ones are
    /// `CKR_MECHANISM_PARAM_INVALID`
    pub fn from_ckd(kdf: CK_EC_KDF_TYPE) -> Result<AgreementKdf> {
        Ok(match kdf {
            CKD_NULL => AgreementKdf::Null,
            CKD_SHA1_KDF => AgreementKdf::Kdf1(DigestAlg::Sha1),
            CKD_SHA224_KDF => AgreementKdf::Kdf1(DigestAlg::Sha224),
            CKD_SHA256_KDF => AgreementKdf::Kdf1(DigestAlg::Sha256),
            CKD_SHA384_KDF => AgreementKdf::Kdf1(DigestAlg::Sha384),
            CKD_SHA512_KDF => AgreementKdf::Kdf1(DigestAlg::Sha512),
            CKD_SHA3_224_KDF => AgreementKdf::Kdf1(DigestAlg::Sha3_224),
            CKD_SHA3_256_KDF => AgreementKdf::Kdf1(DigestAlg::Sha3_256),
            CKD_SHA3_384_KDF => AgreementKdf::Kdf1(DigestAlg::Sha3_384),
            CKD_SHA3_512_KDF => AgreementKdf::Kdf1(DigestAlg::Sha3_512),
            CKD_BLAKE2B_160_KDF => AgreementKdf::Kdf1(DigestAlg::Blake2b160),
            CKD_BLAKE2B_256_KDF => AgreementKdf::Kdf1(DigestAlg::Blake2b256),
            CKD_BLAKE2B_384_KDF => AgreementKdf::Kdf1(DigestAlg::Blake2b384),
            CKD_BLAKE2B_512_KDF => AgreementKdf::Kdf1(DigestAlg::Blake2b512),
            _ => {
                error!("Unsupported KDF {:#x}", kdf);
                return Err(Error::ck_rv_with_errmsg(
                    CKR_MECHANISM_PARAM_INVALID,
                    format!("kdf {:#x} is not supported or invalid", kdf),
                ));
            }
        })
    }
}

/// KDF1 over `z`, `len` bytes of output. Without a length exactly one
/// digest output is produced.
pub fn kdf1(
    alg: DigestAlg,
    z: &[u8],
    shared_data: &[u8],
    len: Option<usize>,
) -> Result<Vec<u8>> {
    let hlen = alg.output_len();
    let outlen = len.unwrap_or(hlen);
    let rounds = outlen.div_ceil(hlen);
    let mut out = Vec::with_capacity(rounds * hlen);
    for counter in 0..rounds {
        let counter = u32::try_from(counter)?;
        let mut engine = alg.engine();
        engine.update(z);
        engine.update(&counter.to_be_bytes());
        engine.update(shared_data);
        out.extend_from_slice(&engine.finalize());
    }
    zeromem(&mut out[outlen..]);
    out.truncate(outlen);
    Ok(out)
}

/// A raw agreement primitive combined with the KDF requested in the
/// mechanism parameters
#[derive(Debug)]
pub struct KdfAgreement {
    agreement: Box<dyn Agreement>,
    kdf: AgreementKdf,
    shared_data: Vec<u8>,
}

impl KdfAgreement {
    pub fn new(
        agreement: Box<dyn Agreement>,
        kdf: CK_EC_KDF_TYPE,
        shared_data: Option<Vec<u8>>,
    ) -> Result<KdfAgreement> {
        let kdf = AgreementKdf::from_ckd(kdf)?;
        debug!("Agreement KDF {:?}", kdf);
        Ok(KdfAgreement {
            agreement: agreement,
            kdf: kdf,
            shared_data: shared_data.unwrap_or_default(),
        })
    }

    /// The smallest output the KDF produces for a requested secret
    /// length: KDF1 always produces at least one digest
    fn output_len(&self, min_len: usize) -> Option<usize> {
        match self.kdf {
            AgreementKdf::Null => None,
            AgreementKdf::Kdf1(alg) => Some(min_len.max(alg.output_len())),
        }
    }

    /// Computes the shared secret with `peer`, `min_len` is the minimal
    /// length of the secret key that will hold it
    pub fn agree(
        &self,
        peer: &[u8],
        min_len: usize,
    ) -> Result<Zeroizing<Vec<u8>>> {
        let z = Zeroizing::new(self.agreement.agree(peer)?);
        match self.kdf {
            AgreementKdf::Null => Ok(z),
            AgreementKdf::Kdf1(alg) => Ok(Zeroizing::new(kdf1(
                alg,
                &z,
                &self.shared_data,
                self.output_len(min_len),
            )?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct FixedAgreement(Vec<u8>);

    impl Agreement for FixedAgreement {
        fn agree(&self, _: &[u8]) -> Result<Vec<u8>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn kdf1_rounds() {
        let z = [0x11u8; 32];
        let one = kdf1(DigestAlg::Sha256, &z, b"info", None).unwrap();
        let mut data = z.to_vec();
        data.extend_from_slice(&[0, 0, 0, 0]);
        data.extend_from_slice(b"info");
        assert_eq!(one, DigestAlg::Sha256.digest(&data));

        let long = kdf1(DigestAlg::Sha256, &z, b"info", Some(40)).unwrap();
        assert_eq!(long.len(), 40);
        assert_eq!(&long[..32], one.as_slice());
        data[35] = 1;
        assert_eq!(&long[32..], &DigestAlg::Sha256.digest(&data)[..8]);
    }

    #[test]
    fn kdf_selection() {
        let raw = vec![0x42u8; 24];
        let null = KdfAgreement::new(
            Box::new(FixedAgreement(raw.clone())),
            CKD_NULL,
            None,
        )
        .unwrap();
        assert_eq!(null.agree(&[], 16).unwrap().as_slice(), raw.as_slice());

        let sha = KdfAgreement::new(
            Box::new(FixedAgreement(raw.clone())),
            CKD_SHA1_KDF,
            None,
        )
        .unwrap();
        /* clamped to at least one digest */
        assert_eq!(sha.agree(&[], 16).unwrap().len(), 20);
        assert_eq!(sha.agree(&[], 32).unwrap().len(), 32);

        let err = KdfAgreement::new(Box::new(FixedAgreement(raw)), 0x99, None)
            .unwrap_err();
        assert_eq!(err.rv(), CKR_MECHANISM_PARAM_INVALID);
    }
}
