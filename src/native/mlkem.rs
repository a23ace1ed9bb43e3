// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! ML-KEM (FIPS 203) encapsulation over the [fips203] crate

use crate::capability::{KemEngine, RandomSource, SourceRng};
use crate::error::{Error, Result};
use crate::object::key::mlkem_sizes;
use crate::pkcs11::*;

use fips203::traits::{Decaps, Encaps, SerDes};
use fips203::{ml_kem_1024, ml_kem_512, ml_kem_768};
use zeroize::Zeroizing;

fn engine_error(e: &'static str) -> Error {
    Error::ck_rv_with_errmsg(CKR_FUNCTION_FAILED, e.to_string())
}

fn key_error(e: &'static str) -> Error {
    Error::ck_rv_with_errmsg(CKR_KEY_HANDLE_INVALID, e.to_string())
}

macro_rules! encaps {
    ($alg:ident; $ek:expr; $rng:expr) => {{
        let ek = $alg::EncapsKey::try_from_bytes($ek.try_into()?)
            .map_err(key_error)?;
        let (ssk, ct) = ek
            .try_encaps_with_rng(&mut SourceRng($rng))
            .map_err(engine_error)?;
        (ssk.into_bytes().to_vec(), ct.into_bytes().to_vec())
    }};
}

macro_rules! decaps {
    ($alg:ident; $dk:expr; $ct:expr) => {{
        let dk = $alg::DecapsKey::try_from_bytes($dk.try_into()?)
            .map_err(key_error)?;
        let ct = $alg::CipherText::try_from_bytes($ct.try_into()?)
            .map_err(engine_error)?;
        dk.try_decaps(&ct).map_err(engine_error)?.into_bytes().to_vec()
    }};
}

/// ML-KEM bound to an encapsulation or a decapsulation key
#[derive(Debug)]
pub struct MlKemEngine {
    param_set: CK_ML_KEM_PARAMETER_SET_TYPE,
    key: Zeroizing<Vec<u8>>,
    ct_len: usize,
}

impl MlKemEngine {
    /// `key` is the encapsulation key when encapsulating and the
    /// decapsulation key when decapsulating
    pub fn new(
        param_set: CK_ML_KEM_PARAMETER_SET_TYPE,
        key: &[u8],
    ) -> Result<MlKemEngine> {
        let (_, _, ct_len) = match mlkem_sizes(param_set) {
            Some(s) => s,
            None => {
                return Err(Error::ck_rv_with_errmsg(
                    CKR_KEY_HANDLE_INVALID,
                    format!("invalid ML-KEM parameter set {}", param_set),
                ))
            }
        };
        Ok(MlKemEngine {
            param_set: param_set,
            key: Zeroizing::new(key.to_vec()),
            ct_len: ct_len,
        })
    }
}

impl KemEngine for MlKemEngine {
    fn encapsulate(
        &self,
        rng: &mut dyn RandomSource,
    ) -> Result<(Vec<u8>, Vec<u8>)> {
        let ek = self.key.as_slice();
        Ok(match self.param_set {
            CKP_ML_KEM_512 => encaps!(ml_kem_512; ek; rng),
            CKP_ML_KEM_768 => encaps!(ml_kem_768; ek; rng),
            CKP_ML_KEM_1024 => encaps!(ml_kem_1024; ek; rng),
            _ => return Err(CKR_KEY_HANDLE_INVALID)?,
        })
    }

    fn decapsulate(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        if ciphertext.len() != self.ct_len {
            return Err(Error::ck_rv_with_errmsg(
                CKR_ENCRYPTED_DATA_LEN_RANGE,
                format!(
                    "ciphertext length {} differs from the expected {}",
                    ciphertext.len(),
                    self.ct_len
                ),
            ));
        }
        let dk = self.key.as_slice();
        Ok(match self.param_set {
            CKP_ML_KEM_512 => decaps!(ml_kem_512; dk; ciphertext),
            CKP_ML_KEM_768 => decaps!(ml_kem_768; dk; ciphertext),
            CKP_ML_KEM_1024 => decaps!(ml_kem_1024; dk; ciphertext),
            _ => return Err(CKR_KEY_HANDLE_INVALID)?,
        })
    }

    fn ciphertext_len(&self) -> usize {
        self.ct_len
    }
}
