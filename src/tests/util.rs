// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

use crate::tests::*;

use std::sync::Arc;

use crate::factory::build_registry;

use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::SeedableRng;

macro_rules! ret_or_panic {
    ($ret:expr) => {
        match $ret {
            Ok(r) => r,
            Err(e) => panic!("{e}"),
        }
    };
}

macro_rules! rv_or_panic {
    ($ret:expr) => {
        match $ret {
            Ok(_) => panic!("operation unexpectedly succeeded"),
            Err(e) => e.rv(),
        }
    };
}

/// A reproducible random source, tests never depend on the actual bytes
pub fn test_rng() -> StdRng {
    StdRng::seed_from_u64(0x5eed_1234)
}

pub fn encapsulators() -> EncapsulatorFactory {
    ret_or_panic!(EncapsulatorFactory::new(&Config::new()))
}

pub fn signers() -> WrapperSignerFactory {
    ret_or_panic!(WrapperSignerFactory::new(&Config::new()))
}

pub fn signers_with_hedge(hedge: HedgePreference) -> WrapperSignerFactory {
    let mechs = ret_or_panic!(build_registry(&Config::new()));
    WrapperSignerFactory::with_mechanisms(Arc::new(mechs), hedge)
}

pub fn derivers() -> DeriveKeyGeneratorFactory {
    ret_or_panic!(DeriveKeyGeneratorFactory::new(&Config::new()))
}

/// Sets the usage flags in `ops` on the key
pub fn allow(obj: &mut Object, ops: &[CK_ATTRIBUTE_TYPE]) {
    for op in ops {
        obj.set_attr(Attribute::from_bool(*op, true)).unwrap();
    }
}

pub fn secret_key(
    key_type: CK_KEY_TYPE,
    value: &[u8],
    ops: &[CK_ATTRIBUTE_TYPE],
) -> Object {
    let mut obj = Object::new(CKO_SECRET_KEY);
    obj.set_attr(Attribute::from_ulong(CKA_KEY_TYPE, key_type))
        .unwrap();
    obj.set_attr(Attribute::from_bytes(CKA_VALUE, value.to_vec()))
        .unwrap();
    obj.set_attr(Attribute::from_ulong(CKA_VALUE_LEN, value.len() as CK_ULONG))
        .unwrap();
    allow(&mut obj, ops);
    obj
}

pub fn secret_template(
    key_type: CK_KEY_TYPE,
    len: Option<usize>,
) -> Vec<Attribute> {
    let mut template = vec![
        Attribute::from_ulong(CKA_CLASS, CKO_SECRET_KEY),
        Attribute::from_ulong(CKA_KEY_TYPE, key_type),
    ];
    if let Some(l) = len {
        template.push(Attribute::from_ulong(CKA_VALUE_LEN, l as CK_ULONG));
    }
    template
}

pub fn value_of(obj: &Object) -> Vec<u8> {
    obj.get_attr_as_bytes(CKA_VALUE).unwrap().clone()
}

/// Signs `data` in one shot and checks the signature with the public key
pub fn sign_and_verify(
    factory: &WrapperSignerFactory,
    mech: &MechanismValue,
    private: &Object,
    public: &Object,
    data: &[u8],
) -> Vec<u8> {
    let mut rng = test_rng();
    let wrapper = ret_or_panic!(factory.create(mech));
    let mut signing = ret_or_panic!(wrapper.into_signing_signer(private, &mut rng));
    ret_or_panic!(signing.signer.update(data));
    let signature = ret_or_panic!(signing.signer.generate_signature());
    assert_eq!(signature.len(), signing.signer.signature_len());

    assert!(verify(factory, mech, public, data, &signature));
    signature
}

pub fn verify(
    factory: &WrapperSignerFactory,
    mech: &MechanismValue,
    public: &Object,
    data: &[u8],
    signature: &[u8],
) -> bool {
    let wrapper = ret_or_panic!(factory.create(mech));
    let mut verifier = ret_or_panic!(wrapper.into_validation_signer(public));
    ret_or_panic!(verifier.update(data));
    ret_or_panic!(verifier.verify_signature(signature))
}

/// A P-256 key pair as (private, public) key objects
pub fn p256_key_pair(rng: &mut StdRng) -> (Object, Object) {
    use p256::elliptic_curve::sec1::ToEncodedPoint;

    let sk = p256::SecretKey::random(rng);
    let point = sk.public_key().to_encoded_point(false);
    let private = EcPrivateKey {
        curve: crate::ec::Curve::P256,
        value: sk.to_bytes().to_vec(),
    };
    let public = EcPublicKey {
        curve: crate::ec::Curve::P256,
        point: point.as_bytes().to_vec(),
    };
    (private.to_object().unwrap(), public.to_object().unwrap())
}

pub fn x25519_key_pair(rng: &mut StdRng) -> (Object, Object) {
    let sk = x25519_dalek::StaticSecret::random_from_rng(&mut *rng);
    let pk = x25519_dalek::PublicKey::from(&sk);
    let private = EcPrivateKey {
        curve: crate::ec::Curve::X25519,
        value: sk.to_bytes().to_vec(),
    };
    let public = EcPublicKey {
        curve: crate::ec::Curve::X25519,
        point: pk.as_bytes().to_vec(),
    };
    (private.to_object().unwrap(), public.to_object().unwrap())
}

pub fn rsa_key_pair(rng: &mut StdRng) -> (Object, Object) {
    use ::rsa::traits::{PrivateKeyParts, PublicKeyParts};

    let key = ::rsa::RsaPrivateKey::new(rng, 2048).unwrap();
    let primes = key.primes();
    let private = RsaPrivateKey {
        modulus: key.n().to_bytes_be(),
        public_exponent: key.e().to_bytes_be(),
        private_exponent: key.d().to_bytes_be(),
        prime_1: Some(primes[0].to_bytes_be()),
        prime_2: Some(primes[1].to_bytes_be()),
    };
    let public = RsaPublicKey {
        modulus: key.n().to_bytes_be(),
        public_exponent: key.e().to_bytes_be(),
    };
    (private.to_object().unwrap(), public.to_object().unwrap())
}

/// RSA key generation is slow, the tests share a single pair
pub static RSA_KEYS: Lazy<(Object, Object)> =
    Lazy::new(|| rsa_key_pair(&mut test_rng()));

/// A copy of the shared RSA pair with the requested usage flags
pub fn rsa_keys(ops: &[CK_ATTRIBUTE_TYPE]) -> (Object, Object) {
    let (mut private, mut public) = RSA_KEYS.clone();
    allow(&mut private, ops);
    allow(&mut public, ops);
    (private, public)
}
