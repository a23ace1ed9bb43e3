// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! Message authentication codes: HMAC over any fixed output digest,
//! CMAC over AES and Camellia, and Poly1305

use crate::capability::MacEngine;
use crate::error::{Error, Result};
use crate::native::digest::DigestAlg;
use crate::pkcs11::*;

use blake2::Blake2b;
use digest::consts::{U20, U32, U48, U64};
use hmac::{Mac, SimpleHmac};
use poly1305::universal_hash::KeyInit;
use poly1305::Poly1305;
use zeroize::Zeroizing;

/// Tag size of CMAC over a 128 bit block cipher
pub const CMAC_LEN: usize = 16;

/// Poly1305 key and tag sizes
pub const POLY1305_KEY_LEN: usize = 32;
pub const POLY1305_TAG_LEN: usize = 16;

/// Any RustCrypto [Mac], consumed on finalization
struct MacOperation<M> {
    mac: Option<M>,
    outlen: usize,
}

impl<M: Mac + Send + 'static> MacOperation<M> {
    fn boxed(mac: M, outlen: usize) -> Box<dyn MacEngine> {
        Box::new(MacOperation {
            mac: Some(mac),
            outlen: outlen,
        })
    }
}

impl<M: Mac + Send> MacEngine for MacOperation<M> {
    fn update(&mut self, data: &[u8]) -> Result<()> {
        match &mut self.mac {
            Some(mac) => {
                Mac::update(mac, data);
                Ok(())
            }
            None => Err(CKR_OPERATION_NOT_INITIALIZED)?,
        }
    }

    fn finalize(&mut self) -> Result<Vec<u8>> {
        match self.mac.take() {
            Some(mac) => Ok(mac.finalize().into_bytes().to_vec()),
            None => Err(CKR_OPERATION_NOT_INITIALIZED)?,
        }
    }

    fn output_len(&self) -> usize {
        self.outlen
    }
}

macro_rules! new_mac {
    ($mac:ty; $key:expr; $outlen:expr) => {
        match <$mac as Mac>::new_from_slice($key) {
            Ok(m) => Ok(MacOperation::boxed(m, $outlen)),
            Err(_) => Err(Error::ck_rv(CKR_KEY_SIZE_RANGE)),
        }
    };
}

/// Returns an HMAC engine keyed with `key` over the digest `alg`
pub fn hmac_engine(alg: DigestAlg, key: &[u8]) -> Result<Box<dyn MacEngine>> {
    let outlen = alg.output_len();
    match alg {
        DigestAlg::Md2 => new_mac!(SimpleHmac<md2::Md2>; key; outlen),
        DigestAlg::Md5 => new_mac!(SimpleHmac<md5::Md5>; key; outlen),
        DigestAlg::Sha1 => new_mac!(SimpleHmac<sha1::Sha1>; key; outlen),
        DigestAlg::Ripemd128 => {
            new_mac!(SimpleHmac<ripemd::Ripemd128>; key; outlen)
        }
        DigestAlg::Ripemd160 => {
            new_mac!(SimpleHmac<ripemd::Ripemd160>; key; outlen)
        }
        DigestAlg::Sha224 => new_mac!(SimpleHmac<sha2::Sha224>; key; outlen),
        DigestAlg::Sha256 => new_mac!(SimpleHmac<sha2::Sha256>; key; outlen),
        DigestAlg::Sha384 => new_mac!(SimpleHmac<sha2::Sha384>; key; outlen),
        DigestAlg::Sha512 => new_mac!(SimpleHmac<sha2::Sha512>; key; outlen),
        DigestAlg::Sha512_224 => {
            new_mac!(SimpleHmac<sha2::Sha512_224>; key; outlen)
        }
        DigestAlg::Sha512_256 => {
            new_mac!(SimpleHmac<sha2::Sha512_256>; key; outlen)
        }
        DigestAlg::Sha3_224 => new_mac!(SimpleHmac<sha3::Sha3_224>; key; outlen),
        DigestAlg::Sha3_256 => new_mac!(SimpleHmac<sha3::Sha3_256>; key; outlen),
        DigestAlg::Sha3_384 => new_mac!(SimpleHmac<sha3::Sha3_384>; key; outlen),
        DigestAlg::Sha3_512 => new_mac!(SimpleHmac<sha3::Sha3_512>; key; outlen),
        DigestAlg::Blake2b160 => {
            new_mac!(SimpleHmac<Blake2b<U20>>; key; outlen)
        }
        DigestAlg::Blake2b256 => {
            new_mac!(SimpleHmac<Blake2b<U32>>; key; outlen)
        }
        DigestAlg::Blake2b384 => {
            new_mac!(SimpleHmac<Blake2b<U48>>; key; outlen)
        }
        DigestAlg::Blake2b512 => {
            new_mac!(SimpleHmac<Blake2b<U64>>; key; outlen)
        }
        DigestAlg::Gost94 => {
            new_mac!(SimpleHmac<gost94::Gost94CryptoPro>; key; outlen)
        }
        DigestAlg::Shake128 | DigestAlg::Shake256 => Err(Error::invariant(
            format!("no HMAC construction over {:?}", alg),
        )),
    }
}

/// Returns a CMAC engine over the block cipher selected by the key type
/// and the key length
pub fn cmac_engine(
    key_type: CK_KEY_TYPE,
    key: &[u8],
) -> Result<Box<dyn MacEngine>> {
    match (key_type, key.len()) {
        (CKK_AES, 16) => new_mac!(cmac::Cmac<aes::Aes128>; key; CMAC_LEN),
        (CKK_AES, 24) => new_mac!(cmac::Cmac<aes::Aes192>; key; CMAC_LEN),
        (CKK_AES, 32) => new_mac!(cmac::Cmac<aes::Aes256>; key; CMAC_LEN),
        (CKK_CAMELLIA, 16) => {
            new_mac!(cmac::Cmac<camellia::Camellia128>; key; CMAC_LEN)
        }
        (CKK_CAMELLIA, 24) => {
            new_mac!(cmac::Cmac<camellia::Camellia192>; key; CMAC_LEN)
        }
        (CKK_CAMELLIA, 32) => {
            new_mac!(cmac::Cmac<camellia::Camellia256>; key; CMAC_LEN)
        }
        (CKK_AES | CKK_CAMELLIA, _) => Err(CKR_KEY_SIZE_RANGE)?,
        _ => Err(CKR_KEY_TYPE_INCONSISTENT)?,
    }
}

/// Poly1305 is a one-time authenticator, the input is buffered and the
/// tag computed at once
struct Poly1305Operation {
    key: Zeroizing<Vec<u8>>,
    data: Option<Vec<u8>>,
}

impl MacEngine for Poly1305Operation {
    fn update(&mut self, data: &[u8]) -> Result<()> {
        match &mut self.data {
            Some(buf) => {
                buf.extend_from_slice(data);
                Ok(())
            }
            None => Err(CKR_OPERATION_NOT_INITIALIZED)?,
        }
    }

    fn finalize(&mut self) -> Result<Vec<u8>> {
        let data = match self.data.take() {
            Some(d) => d,
            None => return Err(CKR_OPERATION_NOT_INITIALIZED)?,
        };
        let mac = Poly1305::new(poly1305::Key::from_slice(self.key.as_slice()));
        Ok(mac.compute_unpadded(&data).to_vec())
    }

    fn output_len(&self) -> usize {
        POLY1305_TAG_LEN
    }
}

/// Returns a Poly1305 engine, the key must be 32 bytes long
pub fn poly1305_engine(key: &[u8]) -> Result<Box<dyn MacEngine>> {
    if key.len() != POLY1305_KEY_LEN {
        return Err(Error::ck_rv_with_errmsg(
            CKR_KEY_SIZE_RANGE,
            format!("Poly1305 keys are {} bytes long", POLY1305_KEY_LEN),
        ));
    }
    Ok(Box::new(Poly1305Operation {
        key: Zeroizing::new(key.to_vec()),
        data: Some(Vec::new()),
    }))
}
