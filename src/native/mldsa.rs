// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! ML-DSA (FIPS 204) signatures over the [fips204] crate.
//!
//! The crate implements the external interface of FIPS 204, it builds
//! the formatted message from the message, the context and, for
//! HashML-DSA, the pre-hash choice.

use crate::capability::{RandomSource, SignatureEngine, SourceRng};
use crate::error::{Error, Result};
use crate::native::PrehashAlg;
use crate::object::key::mldsa_sizes;
use crate::pkcs11::*;

use fips204::traits::{SerDes, Signer, Verifier};
use fips204::{ml_dsa_44, ml_dsa_65, ml_dsa_87};
use rand_core::{CryptoRng, CryptoRngCore, RngCore};
use zeroize::Zeroizing;

/// The deterministic variant of ML-DSA uses an all zero `rnd`
struct ZeroRng;

impl RngCore for ZeroRng {
    fn next_u32(&mut self) -> u32 {
        0
    }

    fn next_u64(&mut self) -> u64 {
        0
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        dest.fill(0);
    }

    fn try_fill_bytes(
        &mut self,
        dest: &mut [u8],
    ) -> std::result::Result<(), rand_core::Error> {
        dest.fill(0);
        Ok(())
    }
}

impl CryptoRng for ZeroRng {}

fn engine_error(e: &'static str) -> Error {
    Error::ck_rv_with_errmsg(CKR_FUNCTION_FAILED, e.to_string())
}

/* HashML-DSA runs Sign_internal over the formatted message, the crate
 * only knows three of the pre-hash functions */
macro_rules! mldsa_sign {
    ($alg:ident; $self:expr; $msg:expr; $rng:expr) => {{
        let sk = $alg::PrivateKey::try_from_bytes($self.key.as_slice().try_into()?)
            .map_err(|e| Error::ck_rv_with_errmsg(CKR_KEY_HANDLE_INVALID, e.to_string()))?;
        let ctx = $self.context.as_slice();
        let sig = match $self.prehash {
            Some(p) => {
                let mp = p.formatted_message(ctx, $msg)?;
                let mut rnd = [0u8; 32];
                $rng.try_fill_bytes(&mut rnd)
                    .map_err(|_| engine_error("random generator failed"))?;
                $alg::_internal_sign(&sk, &mp, &[], rnd)
            }
            None => sk.try_sign_with_rng(&mut $rng, $msg, ctx),
        };
        sig.map_err(engine_error)?.to_vec()
    }};
}

macro_rules! mldsa_verify {
    ($alg:ident; $self:expr; $msg:expr; $sig:expr) => {{
        let pk = $alg::PublicKey::try_from_bytes($self.key.as_slice().try_into()?)
            .map_err(|e| Error::ck_rv_with_errmsg(CKR_KEY_HANDLE_INVALID, e.to_string()))?;
        let sig: [u8; $alg::SIG_LEN] = $sig.try_into()?;
        let ctx = $self.context.as_slice();
        match $self.prehash {
            Some(p) => {
                let mp = p.formatted_message(ctx, $msg)?;
                $alg::_internal_verify(&pk, &mp, &sig, &[])
            }
            None => pk.verify($msg, &sig, ctx),
        }
    }};
}

/// ML-DSA bound to a private (signing) or a public (verification) key
#[derive(Debug)]
pub struct MlDsaEngine {
    param_set: CK_ML_DSA_PARAMETER_SET_TYPE,
    key: Zeroizing<Vec<u8>>,
    private: bool,
    deterministic: bool,
    context: Vec<u8>,
    prehash: Option<PrehashAlg>,
    sig_len: usize,
}

impl MlDsaEngine {
    pub fn new(
        param_set: CK_ML_DSA_PARAMETER_SET_TYPE,
        key: &[u8],
        private: bool,
    ) -> Result<MlDsaEngine> {
        let (_, _, sig_len) = match mldsa_sizes(param_set) {
            Some(s) => s,
            None => {
                return Err(Error::ck_rv_with_errmsg(
                    CKR_KEY_HANDLE_INVALID,
                    format!("invalid ML-DSA parameter set {}", param_set),
                ))
            }
        };
        Ok(MlDsaEngine {
            param_set: param_set,
            key: Zeroizing::new(key.to_vec()),
            private: private,
            deterministic: false,
            context: Vec::new(),
            prehash: None,
            sig_len: sig_len,
        })
    }

    /// Selects the signing mode, the domain separation context and the
    /// pre-hash of HashML-DSA
    pub fn configure(
        &mut self,
        deterministic: bool,
        context: Vec<u8>,
        prehash: Option<PrehashAlg>,
    ) {
        self.deterministic = deterministic;
        self.context = context;
        self.prehash = prehash;
    }
}

impl SignatureEngine for MlDsaEngine {
    #[allow(deprecated)]
    fn sign(&self, data: &[u8], rng: &mut dyn RandomSource) -> Result<Vec<u8>> {
        if !self.private {
            return Err(Error::invariant(
                "ML-DSA signature requested without a private key".to_string(),
            ));
        }
        let mut zero = ZeroRng;
        let mut srng = SourceRng(rng);
        let mut rng: &mut dyn CryptoRngCore = if self.deterministic {
            &mut zero
        } else {
            &mut srng
        };
        Ok(match self.param_set {
            CKP_ML_DSA_44 => mldsa_sign!(ml_dsa_44; self; data; rng),
            CKP_ML_DSA_65 => mldsa_sign!(ml_dsa_65; self; data; rng),
            CKP_ML_DSA_87 => mldsa_sign!(ml_dsa_87; self; data; rng),
            _ => return Err(CKR_KEY_HANDLE_INVALID)?,
        })
    }

    #[allow(deprecated)]
    fn verify(&self, data: &[u8], signature: &[u8]) -> Result<bool> {
        if self.private {
            return Err(Error::invariant(
                "ML-DSA verification requested without a public key"
                    .to_string(),
            ));
        }
        if signature.len() != self.sig_len {
            return Err(CKR_SIGNATURE_LEN_RANGE)?;
        }
        Ok(match self.param_set {
            CKP_ML_DSA_44 => mldsa_verify!(ml_dsa_44; self; data; signature),
            CKP_ML_DSA_65 => mldsa_verify!(ml_dsa_65; self; data; signature),
            CKP_ML_DSA_87 => mldsa_verify!(ml_dsa_87; self; data; signature),
            _ => return Err(CKR_KEY_HANDLE_INVALID)?,
        })
    }

    fn signature_len(&self) -> usize {
        self.sig_len
    }
}
