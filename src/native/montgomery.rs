// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! X25519 and X448 key agreement

use crate::capability::{random_bytes, Agreement, RandomSource};
use crate::ec::Curve;
use crate::error::{Error, Result};
use crate::pkcs11::*;

use zeroize::Zeroizing;

const X25519_LEN: usize = 32;
const X448_LEN: usize = 56;

fn unsupported(curve: Curve) -> Error {
    Error::ck_rv_with_errmsg(
        CKR_CURVE_NOT_SUPPORTED,
        format!("curve {:?} is not a Montgomery curve", curve),
    )
}

fn bad_peer() -> Error {
    Error::ck_rv_with_errmsg(
        CKR_ARGUMENTS_BAD,
        "invalid peer public key".to_string(),
    )
}

/// Raw Diffie-Hellman on the Montgomery curves, the shared value is the
/// u-coordinate
#[derive(Debug)]
pub struct MontgomeryAgreement {
    curve: Curve,
    value: Zeroizing<Vec<u8>>,
}

impl MontgomeryAgreement {
    pub fn new(curve: Curve, value: &[u8]) -> Result<MontgomeryAgreement> {
        let len = match curve {
            Curve::X25519 => X25519_LEN,
            Curve::X448 => X448_LEN,
            c => return Err(unsupported(c)),
        };
        if value.len() != len {
            return Err(Error::ck_rv_with_errmsg(
                CKR_KEY_HANDLE_INVALID,
                format!("invalid private key length for {:?}", curve),
            ));
        }
        Ok(MontgomeryAgreement {
            curve: curve,
            value: Zeroizing::new(value.to_vec()),
        })
    }
}

impl Agreement for MontgomeryAgreement {
    fn agree(&self, peer: &[u8]) -> Result<Vec<u8>> {
        match self.curve {
            Curve::X25519 => {
                let sk: [u8; X25519_LEN] = self.value.as_slice().try_into()?;
                let pk: [u8; X25519_LEN] = match peer.try_into() {
                    Ok(p) => p,
                    Err(_) => return Err(bad_peer()),
                };
                let secret = x25519_dalek::StaticSecret::from(sk);
                let shared =
                    secret.diffie_hellman(&x25519_dalek::PublicKey::from(pk));
                if !shared.was_contributory() {
                    return Err(bad_peer());
                }
                Ok(shared.as_bytes().to_vec())
            }
            Curve::X448 => {
                let secret = match x448::Secret::from_bytes(&self.value) {
                    Some(s) => s,
                    None => return Err(CKR_KEY_HANDLE_INVALID)?,
                };
                let pk = match x448::PublicKey::from_bytes(peer) {
                    Some(p) => p,
                    None => return Err(bad_peer()),
                };
                match secret.as_diffie_hellman(&pk) {
                    Some(shared) => Ok(shared.as_bytes().to_vec()),
                    None => Err(bad_peer()),
                }
            }
            c => Err(unsupported(c)),
        }
    }
}

/// Generates an ephemeral key pair, returns the private scalar and the
/// public u-coordinate
pub fn ephemeral_key(
    curve: Curve,
    rng: &mut dyn RandomSource,
) -> Result<(Zeroizing<Vec<u8>>, Vec<u8>)> {
    match curve {
        Curve::X25519 => {
            let value = Zeroizing::new(random_bytes(rng, X25519_LEN)?);
            let sk: [u8; X25519_LEN] = value.as_slice().try_into()?;
            let secret = x25519_dalek::StaticSecret::from(sk);
            let public = x25519_dalek::PublicKey::from(&secret);
            Ok((value, public.as_bytes().to_vec()))
        }
        Curve::X448 => {
            let value = Zeroizing::new(random_bytes(rng, X448_LEN)?);
            let secret = match x448::Secret::from_bytes(&value) {
                Some(s) => s,
                None => return Err(CKR_FUNCTION_FAILED)?,
            };
            let public = x448::PublicKey::from(&secret);
            Ok((value, public.as_bytes().to_vec()))
        }
        c => Err(unsupported(c)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn x25519_rfc7748() {
        /* RFC 7748, 6.1 */
        let alice = hex::decode(
            "77076d0a7318a57d3c16c17251b26645df4c2f87ebc0992ab177fba51db92c2a",
        )
        .unwrap();
        let bob_pub = hex::decode(
            "de9edb7d7b7dc1b4d35b61c2ece435373f8343c85b78674dadfc7e146f882b4f",
        )
        .unwrap();
        let z = MontgomeryAgreement::new(Curve::X25519, &alice)
            .unwrap()
            .agree(&bob_pub)
            .unwrap();
        assert_eq!(
            z,
            hex::decode(
                "4a5d9d5ba4ce2de1728e3bf480350f25e07e21c947d19e3376f09b3c1e161742"
            )
            .unwrap()
        );
        let err = MontgomeryAgreement::new(Curve::X25519, &alice)
            .unwrap()
            .agree(&bob_pub[..31])
            .unwrap_err();
        assert_eq!(err.rv(), CKR_ARGUMENTS_BAD);
    }
}
