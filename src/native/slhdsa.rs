// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! SLH-DSA (FIPS 205) signatures over the [fips205] crate

use crate::capability::{RandomSource, SignatureEngine, SourceRng};
use crate::error::{Error, Result};
use crate::native::PrehashAlg;
use crate::object::key::slhdsa_sizes;
use crate::pkcs11::*;

use fips205::traits::{SerDes, Signer, Verifier};
use fips205::{
    slh_dsa_sha2_128f, slh_dsa_sha2_128s, slh_dsa_sha2_192f, slh_dsa_sha2_192s,
    slh_dsa_sha2_256f, slh_dsa_sha2_256s, slh_dsa_shake_128f,
    slh_dsa_shake_128s, slh_dsa_shake_192f, slh_dsa_shake_192s,
    slh_dsa_shake_256f, slh_dsa_shake_256s,
};
use zeroize::Zeroizing;

fn key_error(e: &'static str) -> Error {
    Error::ck_rv_with_errmsg(CKR_KEY_HANDLE_INVALID, e.to_string())
}

/* HashSLH-DSA signs the formatted message with slh_sign_internal, the
 * crate only knows four of the pre-hash functions */
macro_rules! slhdsa_sign {
    ($alg:ident; $self:expr; $msg:expr; $rng:expr) => {{
        let bytes: Zeroizing<[u8; $alg::SK_LEN]> =
            Zeroizing::new($self.key.as_slice().try_into()?);
        let sk = $alg::PrivateKey::try_from_bytes(&bytes).map_err(key_error)?;
        let ctx = $self.context.as_slice();
        let hedged = !$self.deterministic;
        let sig = match $self.prehash {
            Some(p) => {
                let mp = p.formatted_message(ctx, $msg)?;
                sk._test_only_raw_sign($rng, &mp, hedged)
            }
            None => sk.try_sign_with_rng($rng, $msg, ctx, hedged),
        };
        match sig {
            Ok(s) => s.to_vec(),
            Err(e) => {
                return Err(Error::ck_rv_with_errmsg(
                    CKR_FUNCTION_FAILED,
                    e.to_string(),
                ))
            }
        }
    }};
}

macro_rules! slhdsa_verify {
    ($alg:ident; $self:expr; $msg:expr; $sig:expr) => {{
        let bytes: [u8; $alg::PK_LEN] = $self.key.as_slice().try_into()?;
        let pk = $alg::PublicKey::try_from_bytes(&bytes).map_err(key_error)?;
        let sig: [u8; $alg::SIG_LEN] = $sig.try_into()?;
        let ctx = $self.context.as_slice();
        match $self.prehash {
            Some(p) => {
                let mp = p.formatted_message(ctx, $msg)?;
                pk._test_only_raw_verify(&mp, &sig).map_err(key_error)?
            }
            None => pk.verify($msg, &sig, ctx),
        }
    }};
}

/// Dispatches a macro over the twelve parameter sets
macro_rules! by_param_set {
    ($mac:ident; $set:expr; $($arg:expr),*) => {
        match $set {
            CKP_SLH_DSA_SHA2_128S => $mac!(slh_dsa_sha2_128s; $($arg);*),
            CKP_SLH_DSA_SHAKE_128S => $mac!(slh_dsa_shake_128s; $($arg);*),
            CKP_SLH_DSA_SHA2_128F => $mac!(slh_dsa_sha2_128f; $($arg);*),
            CKP_SLH_DSA_SHAKE_128F => $mac!(slh_dsa_shake_128f; $($arg);*),
            CKP_SLH_DSA_SHA2_192S => $mac!(slh_dsa_sha2_192s; $($arg);*),
            CKP_SLH_DSA_SHAKE_192S => $mac!(slh_dsa_shake_192s; $($arg);*),
            CKP_SLH_DSA_SHA2_192F => $mac!(slh_dsa_sha2_192f; $($arg);*),
            CKP_SLH_DSA_SHAKE_192F => $mac!(slh_dsa_shake_192f; $($arg);*),
            CKP_SLH_DSA_SHA2_256S => $mac!(slh_dsa_sha2_256s; $($arg);*),
            CKP_SLH_DSA_SHAKE_256S => $mac!(slh_dsa_shake_256s; $($arg);*),
            CKP_SLH_DSA_SHA2_256F => $mac!(slh_dsa_sha2_256f; $($arg);*),
            CKP_SLH_DSA_SHAKE_256F => $mac!(slh_dsa_shake_256f; $($arg);*),
            _ => return Err(CKR_KEY_HANDLE_INVALID)?,
        }
    };
}

/// SLH-DSA bound to a private (signing) or a public (verification) key
#[derive(Debug)]
pub struct SlhDsaEngine {
    param_set: CK_SLH_DSA_PARAMETER_SET_TYPE,
    key: Zeroizing<Vec<u8>>,
    private: bool,
    deterministic: bool,
    context: Vec<u8>,
    prehash: Option<PrehashAlg>,
    sig_len: usize,
}

impl SlhDsaEngine {
    pub fn new(
        param_set: CK_SLH_DSA_PARAMETER_SET_TYPE,
        key: &[u8],
        private: bool,
    ) -> Result<SlhDsaEngine> {
        let (_, _, sig_len) = match slhdsa_sizes(param_set) {
            Some(s) => s,
            None => {
                return Err(Error::ck_rv_with_errmsg(
                    CKR_KEY_HANDLE_INVALID,
                    format!("invalid SLH-DSA parameter set {}", param_set),
                ))
            }
        };
        Ok(SlhDsaEngine {
            param_set: param_set,
            key: Zeroizing::new(key.to_vec()),
            private: private,
            deterministic: false,
            context: Vec::new(),
            prehash: None,
            sig_len: sig_len,
        })
    }

    /// Deterministic signing replaces the random `opt_rand` with the
    /// public seed
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

impl SignatureEngine for SlhDsaEngine {
    #[allow(deprecated)]
    fn sign(&self, data: &[u8], rng: &mut dyn RandomSource) -> Result<Vec<u8>> {
        if !self.private {
            return Err(Error::invariant(
                "SLH-DSA signature requested without a private key"
                    .to_string(),
            ));
        }
        let mut srng = SourceRng(rng);
        Ok(by_param_set!(slhdsa_sign; self.param_set; self, data, &mut srng))
    }

    #[allow(deprecated)]
    fn verify(&self, data: &[u8], signature: &[u8]) -> Result<bool> {
        if self.private {
            return Err(Error::invariant(
                "SLH-DSA verification requested without a public key"
                    .to_string(),
            ));
        }
        if signature.len() != self.sig_len {
            return Err(CKR_SIGNATURE_LEN_RANGE)?;
        }
        Ok(by_param_set!(slhdsa_verify; self.param_set; self, data, signature))
    }

    fn signature_len(&self) -> usize {
        self.sig_len
    }
}
