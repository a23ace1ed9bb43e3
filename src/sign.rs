// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! Building blocks shared by the signature and MAC mechanisms: key
//! binding checks, hedge and context resolution, and the two generic
//! [Signer] implementations over the capability engines.

use crate::capability::{DigestEngine, MacEngine, RandomSource, SignatureEngine};
use crate::config::HedgePreference;
use crate::error::{Error, Result};
use crate::mechanism::{mech_type_to_name, AuthenticatedSigner, Signer};
#[cfg(any(
    feature = "cmac",
    feature = "hmac",
    feature = "mldsa",
    feature = "slhdsa"
))]
use crate::mechanism::MechanismValue;
#[cfg(any(feature = "cmac", feature = "hmac"))]
use crate::misc::ulong_to_usize;
#[cfg(any(feature = "mldsa", feature = "slhdsa"))]
use crate::native::PrehashAlg;
use crate::object::Object;
#[cfg(any(feature = "cmac", feature = "hmac"))]
use crate::params::CkMacGeneralParams;
#[cfg(any(feature = "mldsa", feature = "slhdsa"))]
use crate::params::{CkHashSignAdditionalContext, CkSignAdditionalContext};
#[cfg(any(
    feature = "cmac",
    feature = "hmac",
    feature = "mldsa",
    feature = "slhdsa"
))]
use crate::params::MechanismParams;
use crate::pkcs11::*;

use constant_time_eq::constant_time_eq;
use log::{error, trace, warn};

/// Longest domain separation context accepted by the PQC signatures
pub const MAX_CONTEXT_LEN: usize = 255;

/// Returns true when the signature must be deterministic
pub fn resolve_hedge(
    hedge: CK_HEDGE_TYPE,
    preferred: HedgePreference,
) -> Result<bool> {
    match hedge {
        CKH_DETERMINISTIC_REQUIRED => Ok(true),
        CKH_HEDGE_REQUIRED => Ok(false),
        CKH_HEDGE_PREFERRED => {
            Ok(preferred == HedgePreference::Deterministic)
        }
        _ => {
            error!("Invalid hedge variant {:#x}", hedge);
            Err(Error::ck_rv_with_errmsg(
                CKR_MECHANISM_PARAM_INVALID,
                format!("invalid hedge variant {:#x}", hedge),
            ))
        }
    }
}

/// Checks the length of a signature context
pub fn check_context(context: Option<Vec<u8>>) -> Result<Vec<u8>> {
    let ctx = context.unwrap_or_default();
    if ctx.len() > MAX_CONTEXT_LEN {
        error!("Context of {} bytes is too long", ctx.len());
        return Err(Error::ck_rv_with_errmsg(
            CKR_MECHANISM_PARAM_INVALID,
            format!("context must be at most {} bytes", MAX_CONTEXT_LEN),
        ));
    }
    Ok(ctx)
}

/// Wraps a signer for a private key, honoring
/// `CKA_ALWAYS_AUTHENTICATE`
pub fn authenticated<'a>(
    key: &Object,
    signer: Box<dyn Signer + 'a>,
) -> AuthenticatedSigner<'a> {
    let always_authenticate =
        key.get_class() == CKO_PRIVATE_KEY && key.always_auth();
    AuthenticatedSigner {
        signer: signer,
        always_authenticate: always_authenticate,
    }
}

/// Feeds a [SignatureEngine] with the complete message, or with its
/// digest when the mechanism binds a hash function
pub struct EngineSigner<'a> {
    mechanism: CK_MECHANISM_TYPE,
    engine: Box<dyn SignatureEngine>,
    digest: Option<Box<dyn DigestEngine>>,
    data: Vec<u8>,
    rng: Option<&'a mut dyn RandomSource>,
    finalized: bool,
}

impl<'a> EngineSigner<'a> {
    /// Signing operation, `digest` is the running hash of hash bound
    /// mechanisms
    pub fn signing(
        mechanism: CK_MECHANISM_TYPE,
        engine: Box<dyn SignatureEngine>,
        digest: Option<Box<dyn DigestEngine>>,
        rng: &'a mut dyn RandomSource,
    ) -> EngineSigner<'a> {
        EngineSigner {
            mechanism: mechanism,
            engine: engine,
            digest: digest,
            data: Vec::new(),
            rng: Some(rng),
            finalized: false,
        }
    }

    /// Verification operation
    pub fn verifying(
        mechanism: CK_MECHANISM_TYPE,
        engine: Box<dyn SignatureEngine>,
        digest: Option<Box<dyn DigestEngine>>,
    ) -> EngineSigner<'static> {
        EngineSigner {
            mechanism: mechanism,
            engine: engine,
            digest: digest,
            data: Vec::new(),
            rng: None,
            finalized: false,
        }
    }

    /// Returns the data to hand to the engine: the digest for hash
    /// bound mechanisms, the accumulated message otherwise
    fn message(&mut self) -> Result<Vec<u8>> {
        if self.finalized {
            return Err(CKR_OPERATION_NOT_INITIALIZED)?;
        }
        self.finalized = true;
        Ok(match self.digest.take() {
            Some(d) => d.finalize(),
            None => std::mem::take(&mut self.data),
        })
    }
}

impl Signer for EngineSigner<'_> {
    fn mechanism(&self) -> CK_MECHANISM_TYPE {
        self.mechanism
    }

    fn update(&mut self, data: &[u8]) -> Result<()> {
        if self.finalized {
            return Err(CKR_OPERATION_NOT_INITIALIZED)?;
        }
        match &mut self.digest {
            Some(d) => d.update(data),
            None => self.data.extend_from_slice(data),
        }
        Ok(())
    }

    fn generate_signature(&mut self) -> Result<Vec<u8>> {
        trace!("Signing with {}", mech_type_to_name(self.mechanism));
        let msg = self.message()?;
        let rng = match self.rng.as_mut() {
            Some(r) => r,
            None => {
                return Err(Error::invariant(
                    "signature requested on a verification operation"
                        .to_string(),
                ))
            }
        };
        self.engine.sign(&msg, &mut **rng)
    }

    fn verify_signature(&mut self, signature: &[u8]) -> Result<bool> {
        trace!("Verifying with {}", mech_type_to_name(self.mechanism));
        let msg = self.message()?;
        self.engine.verify(&msg, signature)
    }

    fn signature_len(&self) -> usize {
        self.engine.signature_len()
    }
}

/// A MAC used as a signature, optionally truncated to `outlen` bytes
pub struct MacSigner {
    mechanism: CK_MECHANISM_TYPE,
    mac: Box<dyn MacEngine>,
    outlen: usize,
}

impl MacSigner {
    pub fn new(
        mechanism: CK_MECHANISM_TYPE,
        mac: Box<dyn MacEngine>,
        outlen: Option<usize>,
    ) -> Result<MacSigner> {
        let full = mac.output_len();
        let outlen = match outlen {
            None => full,
            Some(len) => {
                if len > full {
                    error!(
                        "{}: requested length {} exceeds {}",
                        mech_type_to_name(mechanism),
                        len,
                        full
                    );
                    return Err(Error::ck_rv_with_errmsg(
                        CKR_MECHANISM_PARAM_INVALID,
                        format!("MAC length must be at most {}", full),
                    ));
                }
                if len == 0 {
                    warn!(
                        "{}: the requested MAC length is 0",
                        mech_type_to_name(mechanism)
                    );
                }
                len
            }
        };
        Ok(MacSigner {
            mechanism: mechanism,
            mac: mac,
            outlen: outlen,
        })
    }
}

impl Signer for MacSigner {
    fn mechanism(&self) -> CK_MECHANISM_TYPE {
        self.mechanism
    }

    fn update(&mut self, data: &[u8]) -> Result<()> {
        self.mac.update(data)
    }

    fn generate_signature(&mut self) -> Result<Vec<u8>> {
        let mut tag = self.mac.finalize()?;
        tag.truncate(self.outlen);
        Ok(tag)
    }

    fn verify_signature(&mut self, signature: &[u8]) -> Result<bool> {
        if signature.len() != self.outlen {
            return Err(CKR_SIGNATURE_LEN_RANGE)?;
        }
        let tag = self.generate_signature()?;
        Ok(constant_time_eq(&tag, signature))
    }

    fn signature_len(&self) -> usize {
        self.outlen
    }
}

/// Decodes the output length of a MAC mechanism: `_GENERAL` variants
/// carry it in a `CK_MAC_GENERAL_PARAMS`, the others take no parameter
#[cfg(any(feature = "cmac", feature = "hmac"))]
pub fn mac_general_len(
    mech: &MechanismValue,
    general: bool,
) -> Result<Option<usize>> {
    if !general {
        if !mech.params().is_empty() {
            return Err(CKR_MECHANISM_PARAM_INVALID)?;
        }
        return Ok(None);
    }
    let len = CkMacGeneralParams::decode(mech.params())?;
    Ok(Some(ulong_to_usize(len.0)?))
}

/// Signing options shared by the ML-DSA and SLH-DSA mechanisms
#[cfg(any(feature = "mldsa", feature = "slhdsa"))]
#[derive(Debug, Clone)]
pub struct PqcSignOptions {
    pub deterministic: bool,
    pub context: Vec<u8>,
    pub prehash: Option<PrehashAlg>,
}

#[cfg(any(feature = "mldsa", feature = "slhdsa"))]
impl PqcSignOptions {
    /// Decodes the parameters of the three mechanism forms: the pure
    /// form, the generic HASH_* form (`generic`) that names the pre-hash
    /// in its parameters, and the forms with the pre-hash `fixed` by the
    /// mechanism itself
    pub fn from_params(
        mech: &MechanismValue,
        preferred: HedgePreference,
        generic: bool,
        fixed: Option<PrehashAlg>,
    ) -> Result<PqcSignOptions> {
        if generic {
            let p = CkHashSignAdditionalContext::decode(mech.params())?;
            return Ok(PqcSignOptions {
                deterministic: resolve_hedge(p.hedge_variant, preferred)?,
                context: check_context(p.context)?,
                prehash: Some(PrehashAlg::from_mechanism(p.hash)?),
            });
        }
        let (hedge, context) =
            match CkSignAdditionalContext::decode_optional(mech.params())? {
                Some(p) => (p.hedge_variant, p.context),
                None => (CKH_HEDGE_PREFERRED, None),
            };
        Ok(PqcSignOptions {
            deterministic: resolve_hedge(hedge, preferred)?,
            context: check_context(context)?,
            prehash: fixed,
        })
    }
}
