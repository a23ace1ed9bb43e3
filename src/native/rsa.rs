// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! RSA signature and encryption primitives over the [rsa] crate.
//!
//! PKCS#1 v1.5 uses the crate padding schemes. PSS and OAEP are built
//! here so the MGF1 digest and the label can be chosen freely, and are
//! applied with the raw RSA operations of the `hazmat` module together
//! with the X9.31 and ISO/IEC 9796-1 encodings.

use std::fmt;

use crate::capability::{CipherEngine, RandomSource, SignatureEngine, SourceRng};
use crate::error::{Error, Result};
use crate::kasn1;
use crate::native::digest::DigestAlg;
use crate::object::key;
use crate::pkcs11::*;

use rsa::hazmat::{rsa_decrypt_and_check, rsa_encrypt};
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, Pkcs1v15Encrypt, Pkcs1v15Sign};

use constant_time_eq::constant_time_eq;

/// X9.31 trailer for SHA-1
const X931_TRAILER_SHA1: [u8; 2] = [0x33, 0xCC];

/// ISO/IEC 9796-1 shadow (permutation) table
const ISO9796_SHADOWS: [u8; 16] = [
    0xe, 0x3, 0x5, 0x8, 0x9, 0x4, 0x2, 0xf, 0x0, 0xd, 0xb, 0x6, 0x7, 0xa, 0xc,
    0x1,
];

/// MGF1 mask generation (RFC 8017 B.2.1)
fn mgf1(alg: DigestAlg, seed: &[u8], len: usize) -> Vec<u8> {
    let mut mask = Vec::with_capacity(len + alg.output_len());
    let mut counter = 0u32;
    while mask.len() < len {
        let mut engine = alg.engine();
        engine.update(seed);
        engine.update(&counter.to_be_bytes());
        mask.extend_from_slice(&engine.finalize());
        counter += 1;
    }
    mask.truncate(len);
    mask
}

fn xor_in_place(data: &mut [u8], mask: &[u8]) {
    for (d, m) in data.iter_mut().zip(mask.iter()) {
        *d ^= m;
    }
}

/// The RSA key material as needed by the engines
pub enum RsaKey {
    Public(rsa::RsaPublicKey),
    Private(rsa::RsaPrivateKey),
}

impl fmt::Debug for RsaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RsaKey::Public(k) => write!(f, "RsaKey::Public({} bits)", k.n().bits()),
            RsaKey::Private(k) => {
                write!(f, "RsaKey::Private({} bits)", k.n().bits())
            }
        }
    }
}

fn key_error(e: rsa::Error) -> Error {
    Error::ck_rv_from_error(CKR_ATTRIBUTE_VALUE_INVALID, e)
}

impl RsaKey {
    pub fn from_public(view: &key::RsaPublicKey) -> Result<RsaKey> {
        let key = rsa::RsaPublicKey::new(
            BigUint::from_bytes_be(&view.modulus),
            BigUint::from_bytes_be(&view.public_exponent),
        )
        .map_err(key_error)?;
        Ok(RsaKey::Public(key))
    }

    pub fn from_private(view: &key::RsaPrivateKey) -> Result<RsaKey> {
        let primes = match (&view.prime_1, &view.prime_2) {
            (Some(p), Some(q)) => {
                vec![BigUint::from_bytes_be(p), BigUint::from_bytes_be(q)]
            }
            /* recovered from the exponents */
            _ => Vec::new(),
        };
        let key = rsa::RsaPrivateKey::from_components(
            BigUint::from_bytes_be(&view.modulus),
            BigUint::from_bytes_be(&view.public_exponent),
            BigUint::from_bytes_be(&view.private_exponent),
            primes,
        )
        .map_err(key_error)?;
        Ok(RsaKey::Private(key))
    }

    fn public(&self) -> rsa::RsaPublicKey {
        match self {
            RsaKey::Public(k) => k.clone(),
            RsaKey::Private(k) => k.to_public_key(),
        }
    }

    fn private(&self) -> Result<&rsa::RsaPrivateKey> {
        match self {
            RsaKey::Private(k) => Ok(k),
            RsaKey::Public(_) => Err(Error::invariant(
                "private operation requested on a public key".to_string(),
            )),
        }
    }

    fn n(&self) -> &BigUint {
        match self {
            RsaKey::Public(k) => k.n(),
            RsaKey::Private(k) => k.n(),
        }
    }

    /// Modulus length in bytes
    pub fn size(&self) -> usize {
        match self {
            RsaKey::Public(k) => k.size(),
            RsaKey::Private(k) => k.size(),
        }
    }

    fn bits(&self) -> usize {
        self.n().bits()
    }
}

/// Left pads a big endian integer to `len` bytes
fn to_fixed_bytes(val: &BigUint, len: usize) -> Result<Vec<u8>> {
    let bytes = val.to_bytes_be();
    if bytes.len() > len {
        return Err(Error::invariant("integer larger than the modulus".to_string()));
    }
    let mut out = vec![0u8; len - bytes.len()];
    out.extend_from_slice(&bytes);
    Ok(out)
}

/// The signature schemes supported by [RsaSignature]
#[derive(Debug, Clone)]
pub enum RsaScheme {
    /// PKCS#1 v1.5, the data is wrapped in a DigestInfo when a digest
    /// is given, otherwise it is signed as is
    Pkcs1v15(Option<DigestAlg>),
    /// PSS, the MGF1 digest may differ from the content digest
    Pss {
        hash: DigestAlg,
        mgf: DigestAlg,
        salt_len: usize,
    },
    /// ANSI X9.31 over a SHA-1 digest
    X931,
    /// ISO/IEC 9796-1 with message recovery
    Iso9796,
}

/// RSA signatures, `data` is the digest for the hashed schemes and the
/// message itself for raw PKCS#1 v1.5 and ISO/IEC 9796-1
#[derive(Debug)]
pub struct RsaSignature {
    key: RsaKey,
    scheme: RsaScheme,
}

impl RsaSignature {
    pub fn new(key: RsaKey, scheme: RsaScheme) -> RsaSignature {
        RsaSignature {
            key: key,
            scheme: scheme,
        }
    }

    /// M' digest of EMSA-PSS
    fn pss_digest(hash: DigestAlg, m_hash: &[u8], salt: &[u8]) -> Vec<u8> {
        let mut engine = hash.engine();
        engine.update(&[0u8; 8]);
        engine.update(m_hash);
        engine.update(salt);
        engine.finalize()
    }

    /// EMSA-PSS encoding (RFC 8017 9.1.1) of the digest `m_hash`
    fn pss_encode(
        &self,
        hash: DigestAlg,
        mgf: DigestAlg,
        salt_len: usize,
        m_hash: &[u8],
        rng: &mut dyn RandomSource,
    ) -> Result<Vec<u8>> {
        let h_len = hash.output_len();
        let em_bits = self.key.bits() - 1;
        let em_len = (em_bits + 7) / 8;
        if em_len < h_len + salt_len + 2 {
            return Err(CKR_KEY_SIZE_RANGE)?;
        }
        let mut salt = vec![0u8; salt_len];
        rng.next_bytes(&mut salt)?;
        let h = RsaSignature::pss_digest(hash, m_hash, &salt);

        let db_len = em_len - h_len - 1;
        let mut em = vec![0u8; em_len];
        em[db_len - salt_len - 1] = 0x01;
        em[db_len - salt_len..db_len].copy_from_slice(&salt);
        xor_in_place(&mut em[..db_len], &mgf1(mgf, &h, db_len));
        em[0] &= 0xffu8 >> (8 * em_len - em_bits);
        em[db_len..em_len - 1].copy_from_slice(&h);
        em[em_len - 1] = 0xbc;
        Ok(em)
    }

    /// EMSA-PSS verification (RFC 8017 9.1.2) of the encoded message
    fn pss_check(
        &self,
        hash: DigestAlg,
        mgf: DigestAlg,
        salt_len: usize,
        m_hash: &[u8],
        em: &[u8],
    ) -> bool {
        let h_len = hash.output_len();
        let em_bits = self.key.bits() - 1;
        let em_len = em.len();
        if em_len < h_len + salt_len + 2 || em[em_len - 1] != 0xbc {
            return false;
        }
        let top_mask = 0xffu8 >> (8 * em_len - em_bits);
        if em[0] & !top_mask != 0 {
            return false;
        }
        let db_len = em_len - h_len - 1;
        let h = &em[db_len..em_len - 1];
        let mut db = em[..db_len].to_vec();
        xor_in_place(&mut db, &mgf1(mgf, h, db_len));
        db[0] &= top_mask;
        let ps_len = db_len - salt_len - 1;
        if db[..ps_len].iter().any(|b| *b != 0) || db[ps_len] != 0x01 {
            return false;
        }
        let expected = RsaSignature::pss_digest(hash, m_hash, &db[ps_len + 1..]);
        constant_time_eq(h, &expected)
    }

    fn digest_info(alg: DigestAlg, data: &[u8]) -> Result<Vec<u8>> {
        if data.len() != alg.output_len() {
            return Err(CKR_DATA_LEN_RANGE)?;
        }
        match alg.oid() {
            Some(oid) => kasn1::encode_digest_info(&oid, data),
            None => Err(CKR_MECHANISM_INVALID)?,
        }
    }

    /// ANSI X9.31 block: `6B BB .. BB BA || H || trailer`
    fn x931_block(&self, digest: &[u8]) -> Result<Vec<u8>> {
        let len = (self.key.bits() + 7) / 8;
        if digest.len() + 4 > len {
            return Err(CKR_DATA_LEN_RANGE)?;
        }
        let delta = len - digest.len() - 2;
        let mut block = vec![0xbbu8; len];
        block[0] = 0x6b;
        block[delta - 1] = 0xba;
        block[delta..len - 2].copy_from_slice(digest);
        block[len - 2..].copy_from_slice(&X931_TRAILER_SHA1);
        Ok(block)
    }

    /// ISO/IEC 9796-1 message recovery encoding, without padding bits
    fn iso9796_block(&self, msg: &[u8]) -> Result<BigUint> {
        let bits = self.key.bits();
        let len = (bits + 7) / 8;
        let t = (bits + 13) / 16;
        let z = msg.len();
        if z == 0 || z > t {
            return Err(CKR_DATA_LEN_RANGE)?;
        }
        let mut block = vec![0u8; len];
        /* repeat the message to fill the t least significant bytes */
        let mut i = 0;
        while i < t {
            if i > t - z {
                block[len - t..len - i].copy_from_slice(&msg[z - (t - i)..]);
            } else {
                block[len - (i + z)..len - i].copy_from_slice(msg);
            }
            i += z;
        }
        /* interleave shadowed and plain bytes */
        let src = block[len - t..].to_vec();
        for (k, val) in src.iter().enumerate() {
            let pos = len as isize - 2 * t as isize + 2 * k as isize;
            let shadow = (ISO9796_SHADOWS[usize::from(val >> 4)] << 4)
                | ISO9796_SHADOWS[usize::from(val & 0x0f)];
            if pos >= 0 {
                block[pos as usize] = shadow;
            }
            block[(pos + 1) as usize] = *val;
        }
        /* mark the message length, padding bits count is 0 */
        block[len - 2 * z] ^= 1;
        block[len - 1] = (block[len - 1] << 4) | 0x06;
        let max_bit = 8 - (bits - 1) % 8;
        let offset = if max_bit != 8 {
            block[0] &= 0xffu8 >> max_bit;
            block[0] |= 0x80u8 >> max_bit;
            0
        } else {
            block[0] = 0;
            block[1] |= 0x80;
            1
        };
        Ok(BigUint::from_bytes_be(&block[offset..]))
    }

    /// Raw private key operation returning min(s, n - s)
    fn sign_raw(
        &self,
        m: &BigUint,
        rng: &mut dyn RandomSource,
        minimize: bool,
    ) -> Result<Vec<u8>> {
        let key = self.key.private()?;
        let mut srng = SourceRng(rng);
        let mut s = rsa_decrypt_and_check(key, Some(&mut srng), m)?;
        if minimize {
            let alt = key.n() - &s;
            if alt < s {
                s = alt;
            }
        }
        to_fixed_bytes(&s, self.key.size())
    }

    /// Raw public key operation, None when the signature is out of range
    fn open_raw(&self, signature: &[u8]) -> Result<Option<BigUint>> {
        let s = BigUint::from_bytes_be(signature);
        if &s >= self.key.n() {
            return Ok(None);
        }
        Ok(Some(rsa_encrypt(&self.key.public(), &s)?))
    }

    /// Checks the raw public key operation recovers `expected` or its
    /// complement
    fn verify_raw(&self, expected: &BigUint, signature: &[u8]) -> Result<bool> {
        let m = match self.open_raw(signature)? {
            Some(m) => m,
            None => return Ok(false),
        };
        let alt = self.key.n() - &m;
        Ok(&m == expected || &alt == expected)
    }
}

impl SignatureEngine for RsaSignature {
    fn sign(&self, data: &[u8], rng: &mut dyn RandomSource) -> Result<Vec<u8>> {
        let key = self.key.private()?;
        let k = self.key.size();
        match &self.scheme {
            RsaScheme::Pkcs1v15(alg) => {
                let em = match alg {
                    Some(a) => RsaSignature::digest_info(*a, data)?,
                    None => data.to_vec(),
                };
                if em.len() + 11 > k {
                    return Err(CKR_DATA_LEN_RANGE)?;
                }
                Ok(key.sign_with_rng(
                    &mut SourceRng(rng),
                    Pkcs1v15Sign::new_unprefixed(),
                    &em,
                )?)
            }
            RsaScheme::Pss {
                hash,
                mgf,
                salt_len,
            } => {
                if data.len() != hash.output_len() {
                    return Err(CKR_DATA_LEN_RANGE)?;
                }
                let em = self.pss_encode(*hash, *mgf, *salt_len, data, rng)?;
                self.sign_raw(&BigUint::from_bytes_be(&em), rng, false)
            }
            RsaScheme::X931 => {
                let block = self.x931_block(data)?;
                self.sign_raw(&BigUint::from_bytes_be(&block), rng, true)
            }
            RsaScheme::Iso9796 => {
                let block = self.iso9796_block(data)?;
                self.sign_raw(&block, rng, false)
            }
        }
    }

    fn verify(&self, data: &[u8], signature: &[u8]) -> Result<bool> {
        if signature.len() != self.key.size() {
            return Err(CKR_SIGNATURE_LEN_RANGE)?;
        }
        match &self.scheme {
            RsaScheme::Pkcs1v15(alg) => {
                let em = match alg {
                    Some(a) => RsaSignature::digest_info(*a, data)?,
                    None => data.to_vec(),
                };
                Ok(self
                    .key
                    .public()
                    .verify(Pkcs1v15Sign::new_unprefixed(), &em, signature)
                    .is_ok())
            }
            RsaScheme::Pss {
                hash,
                mgf,
                salt_len,
            } => {
                if data.len() != hash.output_len() {
                    return Err(CKR_DATA_LEN_RANGE)?;
                }
                let m = match self.open_raw(signature)? {
                    Some(m) => m,
                    None => return Ok(false),
                };
                let em_len = (self.key.bits() + 6) / 8;
                let em = match to_fixed_bytes(&m, em_len) {
                    Ok(em) => em,
                    Err(_) => return Ok(false),
                };
                Ok(self.pss_check(*hash, *mgf, *salt_len, data, &em))
            }
            RsaScheme::X931 => {
                let block = self.x931_block(data)?;
                self.verify_raw(&BigUint::from_bytes_be(&block), signature)
            }
            RsaScheme::Iso9796 => {
                let block = self.iso9796_block(data)?;
                self.verify_raw(&block, signature)
            }
        }
    }

    fn signature_len(&self) -> usize {
        self.key.size()
    }
}

/// The encryption paddings supported by [RsaCipher]
#[derive(Debug, Clone)]
pub enum RsaPadding {
    Pkcs1v15,
    Oaep {
        hash: DigestAlg,
        mgf: DigestAlg,
        label: Option<Vec<u8>>,
    },
}

/// RSA encryption, used to transport random secrets
#[derive(Debug)]
pub struct RsaCipher {
    key: RsaKey,
    padding: RsaPadding,
}

impl RsaCipher {
    pub fn new(key: RsaKey, padding: RsaPadding) -> RsaCipher {
        RsaCipher {
            key: key,
            padding: padding,
        }
    }

    /// EME-OAEP encoding (RFC 8017 7.1.1)
    fn oaep_encode(
        &self,
        hash: DigestAlg,
        mgf: DigestAlg,
        label: &[u8],
        msg: &[u8],
        rng: &mut dyn RandomSource,
    ) -> Result<Vec<u8>> {
        let k = self.key.size();
        let h_len = hash.output_len();
        let db_len = k - h_len - 1;
        let mut em = vec![0u8; k];
        {
            let (seed, db) = em[1..].split_at_mut(h_len);
            db[..h_len].copy_from_slice(&hash.digest(label));
            db[db_len - msg.len() - 1] = 0x01;
            db[db_len - msg.len()..].copy_from_slice(msg);
            rng.next_bytes(seed)?;
            xor_in_place(db, &mgf1(mgf, seed, db_len));
            xor_in_place(seed, &mgf1(mgf, db, h_len));
        }
        Ok(em)
    }

    /// EME-OAEP decoding (RFC 8017 7.1.2), None on any padding error
    fn oaep_decode(
        hash: DigestAlg,
        mgf: DigestAlg,
        label: &[u8],
        mut em: Vec<u8>,
    ) -> Option<Vec<u8>> {
        let h_len = hash.output_len();
        if em.len() < 2 * h_len + 2 {
            return None;
        }
        let db_len = em.len() - h_len - 1;
        let lead = em[0];
        let (seed, db) = em[1..].split_at_mut(h_len);
        xor_in_place(seed, &mgf1(mgf, db, h_len));
        xor_in_place(db, &mgf1(mgf, seed, db_len));
        let l_hash_ok = constant_time_eq(&db[..h_len], &hash.digest(label));
        let sep = db[h_len..].iter().position(|b| *b != 0).map(|p| p + h_len);
        match sep {
            Some(i) if lead == 0 && l_hash_ok && db[i] == 0x01 => {
                Some(db[i + 1..].to_vec())
            }
            _ => None,
        }
    }

    /// Largest plaintext the padding can carry
    pub fn max_data_len(&self) -> usize {
        let k = self.key.size();
        let overhead = match &self.padding {
            RsaPadding::Pkcs1v15 => 11,
            RsaPadding::Oaep { hash, .. } => 2 * hash.output_len() + 2,
        };
        k.saturating_sub(overhead)
    }
}

impl CipherEngine for RsaCipher {
    fn encrypt(&self, data: &[u8], rng: &mut dyn RandomSource) -> Result<Vec<u8>> {
        if data.len() > self.max_data_len() {
            return Err(CKR_DATA_LEN_RANGE)?;
        }
        let key = self.key.public();
        match &self.padding {
            RsaPadding::Pkcs1v15 => {
                Ok(key.encrypt(&mut SourceRng(rng), Pkcs1v15Encrypt, data)?)
            }
            RsaPadding::Oaep { hash, mgf, label } => {
                let label = label.as_deref().unwrap_or(&[]);
                let em = self.oaep_encode(*hash, *mgf, label, data, rng)?;
                let c = rsa_encrypt(&key, &BigUint::from_bytes_be(&em))?;
                to_fixed_bytes(&c, self.key.size())
            }
        }
    }

    fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>> {
        if data.len() > self.key.size() {
            return Err(CKR_ENCRYPTED_DATA_LEN_RANGE)?;
        }
        let key = self.key.private()?;
        match &self.padding {
            RsaPadding::Pkcs1v15 => match key.decrypt(Pkcs1v15Encrypt, data) {
                Ok(pt) => Ok(pt),
                Err(e) => {
                    Err(Error::ck_rv_from_error(CKR_ENCRYPTED_DATA_INVALID, e))
                }
            },
            RsaPadding::Oaep { hash, mgf, label } => {
                let c = BigUint::from_bytes_be(data);
                let m = match rsa_decrypt_and_check(
                    key,
                    None::<&mut SourceRng<'_>>,
                    &c,
                ) {
                    Ok(m) => m,
                    Err(e) => {
                        return Err(Error::ck_rv_from_error(
                            CKR_ENCRYPTED_DATA_INVALID,
                            e,
                        ))
                    }
                };
                let em = to_fixed_bytes(&m, self.key.size())?;
                let label = label.as_deref().unwrap_or(&[]);
                match RsaCipher::oaep_decode(*hash, *mgf, label, em) {
                    Some(pt) => Ok(pt),
                    None => Err(CKR_ENCRYPTED_DATA_INVALID)?,
                }
            }
        }
    }

    fn ciphertext_len(&self) -> usize {
        self.key.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn test_key(rng: &mut StdRng) -> rsa::RsaPrivateKey {
        rsa::RsaPrivateKey::new(rng, 1024).unwrap()
    }

    #[test]
    fn oaep_matches_rsa_crate() {
        let mut rng = StdRng::seed_from_u64(11);
        let key = test_key(&mut rng);
        let public = key.to_public_key();
        let cipher = RsaCipher::new(
            RsaKey::Private(key.clone()),
            RsaPadding::Oaep {
                hash: DigestAlg::Sha256,
                mgf: DigestAlg::Sha1,
                label: Some(b"label".to_vec()),
            },
        );
        let scheme = || rsa::Oaep {
            digest: Box::new(sha2::Sha256::default()),
            mgf_digest: Box::new(sha1::Sha1::default()),
            label: Some("label".to_string()),
        };

        let ct = cipher.encrypt(b"transported", &mut rng).unwrap();
        assert_eq!(ct.len(), 128);
        assert_eq!(key.decrypt(scheme(), &ct).unwrap(), b"transported");

        let ct = public.encrypt(&mut rng, scheme(), b"transported").unwrap();
        assert_eq!(cipher.decrypt(&ct).unwrap(), b"transported");

        let mut bad = ct.clone();
        bad[5] ^= 0x01;
        assert_eq!(
            cipher.decrypt(&bad).unwrap_err().rv(),
            CKR_ENCRYPTED_DATA_INVALID
        );

        assert_eq!(
            cipher.encrypt(&[0u8; 63], &mut rng).unwrap_err().rv(),
            CKR_DATA_LEN_RANGE
        );
        cipher.encrypt(&[0u8; 62], &mut rng).unwrap();
    }

    #[test]
    fn pss_matches_rsa_crate() {
        let mut rng = StdRng::seed_from_u64(12);
        let key = test_key(&mut rng);
        let public = key.to_public_key();
        let digest = DigestAlg::Sha256.digest(b"message");
        let signer = RsaSignature::new(
            RsaKey::Private(key.clone()),
            RsaScheme::Pss {
                hash: DigestAlg::Sha256,
                mgf: DigestAlg::Sha256,
                salt_len: 32,
            },
        );

        let sig = signer.sign(&digest, &mut rng).unwrap();
        let pss = || rsa::Pss::new_with_salt::<sha2::Sha256>(32);
        assert!(public.verify(pss(), &digest, &sig).is_ok());

        let sig = key.sign_with_rng(&mut rng, pss(), &digest).unwrap();
        assert!(signer.verify(&digest, &sig).unwrap());

        /* a different MGF1 digest changes the mask */
        let other = RsaSignature::new(
            RsaKey::Public(public.clone()),
            RsaScheme::Pss {
                hash: DigestAlg::Sha256,
                mgf: DigestAlg::Sha384,
                salt_len: 32,
            },
        );
        assert!(!other.verify(&digest, &sig).unwrap());
        let sig = other_signer(&key).sign(&digest, &mut rng).unwrap();
        assert!(other.verify(&digest, &sig).unwrap());
        assert!(public.verify(pss(), &digest, &sig).is_err());
    }

    fn other_signer(key: &rsa::RsaPrivateKey) -> RsaSignature {
        RsaSignature::new(
            RsaKey::Private(key.clone()),
            RsaScheme::Pss {
                hash: DigestAlg::Sha256,
                mgf: DigestAlg::Sha384,
                salt_len: 32,
            },
        )
    }
}
