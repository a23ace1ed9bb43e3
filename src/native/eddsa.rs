// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! Ed25519 and Ed25519ph signatures

use crate::capability::{RandomSource, SignatureEngine};
use crate::error::{Error, Result};
use crate::pkcs11::*;

use ed25519_dalek::{Signer, Verifier};
use sha2::{Digest, Sha512};

pub const ED25519_KEY_LEN: usize = 32;
pub const ED25519_SIG_LEN: usize = 64;

enum Ed25519Key {
    Signing(ed25519_dalek::SigningKey),
    Verifying(ed25519_dalek::VerifyingKey),
}

/// Ed25519 over the complete message. In prehash mode the message is
/// hashed with SHA-512 and signed as Ed25519ph with an optional context.
pub struct EddsaEngine {
    key: Ed25519Key,
    prehash: bool,
    context: Option<Vec<u8>>,
}

impl std::fmt::Debug for EddsaEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EddsaEngine")
            .field("prehash", &self.prehash)
            .field("context", &self.context)
            .finish()
    }
}

fn key_bytes(data: &[u8]) -> Result<[u8; ED25519_KEY_LEN]> {
    match data.try_into() {
        Ok(k) => Ok(k),
        Err(_) => Err(Error::ck_rv_with_errmsg(
            CKR_KEY_HANDLE_INVALID,
            format!("Ed25519 keys are {} bytes long", ED25519_KEY_LEN),
        )),
    }
}

impl EddsaEngine {
    pub fn signing(
        value: &[u8],
        prehash: bool,
        context: Option<Vec<u8>>,
    ) -> Result<EddsaEngine> {
        let key = ed25519_dalek::SigningKey::from_bytes(&key_bytes(value)?);
        Ok(EddsaEngine {
            key: Ed25519Key::Signing(key),
            prehash: prehash,
            context: context,
        })
    }

    pub fn verifying(
        point: &[u8],
        prehash: bool,
        context: Option<Vec<u8>>,
    ) -> Result<EddsaEngine> {
        let key = match ed25519_dalek::VerifyingKey::from_bytes(&key_bytes(point)?)
        {
            Ok(k) => k,
            Err(_) => return Err(CKR_KEY_HANDLE_INVALID)?,
        };
        Ok(EddsaEngine {
            key: Ed25519Key::Verifying(key),
            prehash: prehash,
            context: context,
        })
    }

    fn prehashed(data: &[u8]) -> Sha512 {
        let mut h = Sha512::new();
        h.update(data);
        h
    }
}

impl SignatureEngine for EddsaEngine {
    fn sign(&self, data: &[u8], _: &mut dyn RandomSource) -> Result<Vec<u8>> {
        let key = match &self.key {
            Ed25519Key::Signing(k) => k,
            Ed25519Key::Verifying(_) => {
                return Err(Error::invariant(
                    "EdDSA signature requested without a private key"
                        .to_string(),
                ))
            }
        };
        let sig = if self.prehash {
            map_sig(key.sign_prehashed(
                EddsaEngine::prehashed(data),
                self.context.as_deref(),
            ))?
        } else {
            key.sign(data)
        };
        Ok(sig.to_bytes().to_vec())
    }

    fn verify(&self, data: &[u8], signature: &[u8]) -> Result<bool> {
        let key = match &self.key {
            Ed25519Key::Signing(k) => k.verifying_key(),
            Ed25519Key::Verifying(k) => *k,
        };
        if signature.len() != ED25519_SIG_LEN {
            return Err(CKR_SIGNATURE_LEN_RANGE)?;
        }
        let sig = match ed25519_dalek::Signature::from_slice(signature) {
            Ok(s) => s,
            Err(_) => return Ok(false),
        };
        Ok(if self.prehash {
            key.verify_prehashed(
                EddsaEngine::prehashed(data),
                self.context.as_deref(),
                &sig,
            )
            .is_ok()
        } else {
            key.verify(data, &sig).is_ok()
        })
    }

    fn signature_len(&self) -> usize {
        ED25519_SIG_LEN
    }
}

fn map_sig(
    res: std::result::Result<ed25519_dalek::Signature, ed25519_dalek::SignatureError>,
) -> Result<ed25519_dalek::Signature> {
    match res {
        Ok(s) => Ok(s),
        Err(e) => Err(Error::ck_rv_from_error(CKR_FUNCTION_FAILED, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn ed25519_rfc8032() {
        /* RFC 8032, 7.1 TEST 1 */
        let sk = hex::decode(
            "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60",
        )
        .unwrap();
        let pk = hex::decode(
            "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a",
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let sig = EddsaEngine::signing(&sk, false, None)
            .unwrap()
            .sign(b"", &mut rng)
            .unwrap();
        assert_eq!(
            sig,
            hex::decode(
                "e5564300c360ac729086e2cc806e828a84877f1eb8e5d974d873e06522490155\
                 5fb8821590a33bacc61e39701cf9b46bd25bf5f0595bbe24655141438e7a100b"
            )
            .unwrap()
        );
        let verifier = EddsaEngine::verifying(&pk, false, None).unwrap();
        assert!(verifier.verify(b"", &sig).unwrap());
        assert!(!verifier.verify(b"x", &sig).unwrap());
    }

    #[test]
    fn ed25519ph_context() {
        let mut rng = StdRng::seed_from_u64(2);
        let sk = [7u8; 32];
        let signer =
            EddsaEngine::signing(&sk, true, Some(b"ctx".to_vec())).unwrap();
        let sig = signer.sign(b"message", &mut rng).unwrap();
        assert!(signer.verify(b"message", &sig).unwrap());
        let other = EddsaEngine::signing(&sk, true, None).unwrap();
        assert!(!other.verify(b"message", &sig).unwrap());
    }
}
