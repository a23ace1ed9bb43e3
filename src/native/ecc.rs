// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! ECDSA and ECDH over the NIST prime curves

use crate::capability::{Agreement, RandomSource, SignatureEngine, SourceRng};
use crate::ec::Curve;
use crate::error::{Error, Result};
use crate::pkcs11::*;

use ecdsa::signature::hazmat::{PrehashVerifier, RandomizedPrehashSigner};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use zeroize::Zeroizing;

fn unsupported(curve: Curve) -> Error {
    Error::ck_rv_with_errmsg(
        CKR_CURVE_NOT_SUPPORTED,
        format!("curve {:?} is not a NIST prime curve", curve),
    )
}

/// Left pads a short prehash to the size of the field, longer ones are
/// truncated by the signature primitive itself
fn pad_prehash(hash: &[u8], size: usize) -> Vec<u8> {
    if hash.len() >= size {
        return hash.to_vec();
    }
    let mut padded = vec![0u8; size - hash.len()];
    padded.extend_from_slice(hash);
    padded
}

macro_rules! ecdsa_sign {
    ($curve:ty; $value:expr; $hash:expr; $rng:expr) => {{
        ecdsa_sign!(ecdsa::SigningKey::<$curve>, $curve; $value; $hash; $rng)
    }};
    ($sk:ty, $curve:ty; $value:expr; $hash:expr; $rng:expr) => {{
        let sk = match <$sk>::from_slice($value) {
            Ok(k) => k,
            Err(_) => return Err(CKR_KEY_HANDLE_INVALID)?,
        };
        let sig: ecdsa::Signature<$curve> = match sk
            .sign_prehash_with_rng(&mut SourceRng($rng), $hash)
        {
            Ok(s) => s,
            Err(e) => return Err(Error::ck_rv_from_error(CKR_FUNCTION_FAILED, e)),
        };
        sig.to_bytes().to_vec()
    }};
}

macro_rules! ecdsa_verify {
    ($curve:ty; $point:expr; $hash:expr; $sig:expr) => {{
        let vk = match ecdsa::VerifyingKey::<$curve>::from_sec1_bytes($point) {
            Ok(k) => k,
            Err(_) => return Err(CKR_KEY_HANDLE_INVALID)?,
        };
        match ecdsa::Signature::<$curve>::from_slice($sig) {
            Ok(s) => vk.verify_prehash($hash, &s).is_ok(),
            Err(_) => false,
        }
    }};
}

/// ECDSA over a precomputed hash, signatures are the fixed size `r || s`
/// concatenation
#[derive(Debug)]
pub struct EcdsaEngine {
    curve: Curve,
    /// Private scalar, only present on signing engines
    value: Option<Zeroizing<Vec<u8>>>,
    /// Public point, only present on verification engines
    point: Option<Vec<u8>>,
}

impl EcdsaEngine {
    pub fn signing(curve: Curve, value: &[u8]) -> Result<EcdsaEngine> {
        EcdsaEngine::check_curve(curve)?;
        Ok(EcdsaEngine {
            curve: curve,
            value: Some(Zeroizing::new(value.to_vec())),
            point: None,
        })
    }

    pub fn verifying(curve: Curve, point: &[u8]) -> Result<EcdsaEngine> {
        EcdsaEngine::check_curve(curve)?;
        Ok(EcdsaEngine {
            curve: curve,
            value: None,
            point: Some(point.to_vec()),
        })
    }

    fn check_curve(curve: Curve) -> Result<()> {
        match curve {
            Curve::P256 | Curve::P384 | Curve::P521 => Ok(()),
            _ => Err(unsupported(curve)),
        }
    }
}

impl SignatureEngine for EcdsaEngine {
    fn sign(&self, data: &[u8], rng: &mut dyn RandomSource) -> Result<Vec<u8>> {
        let value = match &self.value {
            Some(v) => v.as_slice(),
            None => {
                return Err(Error::invariant(
                    "ECDSA signature requested without a private key"
                        .to_string(),
                ))
            }
        };
        let hash = pad_prehash(data, self.curve.key_size());
        Ok(match self.curve {
            Curve::P256 => ecdsa_sign!(p256::NistP256; value; &hash; rng),
            Curve::P384 => ecdsa_sign!(p384::NistP384; value; &hash; rng),
            Curve::P521 => ecdsa_sign!(p521::ecdsa::SigningKey, p521::NistP521; value; &hash; rng),
            c => return Err(unsupported(c)),
        })
    }

    fn verify(&self, data: &[u8], signature: &[u8]) -> Result<bool> {
        let point = match &self.point {
            Some(p) => p.as_slice(),
            None => {
                return Err(Error::invariant(
                    "ECDSA verification requested without a public key"
                        .to_string(),
                ))
            }
        };
        if signature.len() != self.signature_len() {
            return Err(CKR_SIGNATURE_LEN_RANGE)?;
        }
        let hash = pad_prehash(data, self.curve.key_size());
        Ok(match self.curve {
            Curve::P256 => ecdsa_verify!(p256::NistP256; point; &hash; signature),
            Curve::P384 => ecdsa_verify!(p384::NistP384; point; &hash; signature),
            Curve::P521 => ecdsa_verify!(p521::NistP521; point; &hash; signature),
            c => return Err(unsupported(c)),
        })
    }

    fn signature_len(&self) -> usize {
        2 * self.curve.key_size()
    }
}

macro_rules! ecdh_agree {
    ($krate:ident; $value:expr; $peer:expr) => {{
        let sk = match $krate::SecretKey::from_slice($value) {
            Ok(k) => k,
            Err(_) => return Err(CKR_KEY_HANDLE_INVALID)?,
        };
        let pk = match $krate::PublicKey::from_sec1_bytes($peer) {
            Ok(k) => k,
            Err(_) => {
                return Err(Error::ck_rv_with_errmsg(
                    CKR_ARGUMENTS_BAD,
                    "invalid peer public point".to_string(),
                ))
            }
        };
        let shared =
            $krate::ecdh::diffie_hellman(sk.to_nonzero_scalar(), pk.as_affine());
        shared.raw_secret_bytes().to_vec()
    }};
}

/// ECDH over the NIST prime curves, the shared value is the x
/// coordinate of the shared point. All supported curves have a cofactor
/// of 1, so the cofactor variant computes the same value.
#[derive(Debug)]
pub struct EcdhAgreement {
    curve: Curve,
    value: Zeroizing<Vec<u8>>,
}

impl EcdhAgreement {
    pub fn new(curve: Curve, value: &[u8]) -> Result<EcdhAgreement> {
        EcdsaEngine::check_curve(curve)?;
        Ok(EcdhAgreement {
            curve: curve,
            value: Zeroizing::new(value.to_vec()),
        })
    }
}

impl Agreement for EcdhAgreement {
    fn agree(&self, peer: &[u8]) -> Result<Vec<u8>> {
        let value = self.value.as_slice();
        Ok(match self.curve {
            Curve::P256 => ecdh_agree!(p256; value; peer),
            Curve::P384 => ecdh_agree!(p384; value; peer),
            Curve::P521 => ecdh_agree!(p521; value; peer),
            c => return Err(unsupported(c)),
        })
    }
}

macro_rules! ecdh_ephemeral {
    ($krate:ident; $rng:expr) => {{
        let sk = $krate::SecretKey::random(&mut SourceRng($rng));
        let point = sk.public_key().to_encoded_point(false).as_bytes().to_vec();
        (sk.to_bytes().to_vec(), point)
    }};
}

/// Generates an ephemeral key pair, returns the private scalar and the
/// uncompressed public point
pub fn ephemeral_key(
    curve: Curve,
    rng: &mut dyn RandomSource,
) -> Result<(Zeroizing<Vec<u8>>, Vec<u8>)> {
    let (value, point) = match curve {
        Curve::P256 => ecdh_ephemeral!(p256; rng),
        Curve::P384 => ecdh_ephemeral!(p384; rng),
        Curve::P521 => ecdh_ephemeral!(p521; rng),
        c => return Err(unsupported(c)),
    };
    Ok((Zeroizing::new(value), point))
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn ecdsa_p384_roundtrip() {
        let mut rng = StdRng::seed_from_u64(7);
        let (value, point) = ephemeral_key(Curve::P384, &mut rng).unwrap();
        let signer = EcdsaEngine::signing(Curve::P384, &value).unwrap();
        let verifier = EcdsaEngine::verifying(Curve::P384, &point).unwrap();
        let hash = [0x5au8; 48];
        let sig = signer.sign(&hash, &mut rng).unwrap();
        assert_eq!(sig.len(), 96);
        assert!(verifier.verify(&hash, &sig).unwrap());
        assert!(!verifier.verify(&[0xa5u8; 48], &sig).unwrap());
        /* a short hash is left padded */
        let sig = signer.sign(&[1u8; 20], &mut rng).unwrap();
        assert!(verifier.verify(&[1u8; 20], &sig).unwrap());
    }

    #[test]
    fn ecdh_p256_agreement() {
        let mut rng = StdRng::seed_from_u64(8);
        let (a, a_pub) = ephemeral_key(Curve::P256, &mut rng).unwrap();
        let (b, b_pub) = ephemeral_key(Curve::P256, &mut rng).unwrap();
        let z1 = EcdhAgreement::new(Curve::P256, &a).unwrap().agree(&b_pub).unwrap();
        let z2 = EcdhAgreement::new(Curve::P256, &b).unwrap().agree(&a_pub).unwrap();
        assert_eq!(z1, z2);
        assert_eq!(z1.len(), 32);
        let err = EcdhAgreement::new(Curve::P256, &a)
            .unwrap()
            .agree(&[4u8; 65])
            .unwrap_err();
        assert_eq!(err.rv(), CKR_ARGUMENTS_BAD);
        assert!(EcdhAgreement::new(Curve::X25519, &a).is_err());
    }
}
