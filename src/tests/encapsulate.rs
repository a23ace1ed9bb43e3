// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

use crate::tests::*;

use serial_test::parallel;

/// Encapsulates to `public` and checks `private` recovers the same secret
fn round_trip(
    mech: &MechanismValue,
    private: &Object,
    public: &Object,
    template: &[Attribute],
) -> (Object, Vec<u8>) {
    let factory = encapsulators();
    let mut rng = test_rng();

    let mut encapsulator = ret_or_panic!(factory.create(mech, public));
    ret_or_panic!(encapsulator.init(template));
    let expected_len = ret_or_panic!(encapsulator.encapsulated_data_len(public));
    let (secret, data) = ret_or_panic!(encapsulator.encapsulate(public, &mut rng));
    assert_eq!(data.len(), expected_len);

    let mut decapsulator = ret_or_panic!(factory.create(mech, private));
    ret_or_panic!(decapsulator.init(template));
    let recovered = ret_or_panic!(decapsulator.decapsulate(private, &data));
    assert_eq!(value_of(&secret), value_of(&recovered));

    /* secrets produced by a KEM are never marked as local or sensitive */
    assert!(!secret.is_local());
    assert!(!secret.is_always_sensitive());
    assert!(!recovered.is_never_extractable());
    (secret, data)
}

fn mlkem_768_keys(rng: &mut rand::rngs::StdRng) -> (Object, Object) {
    use fips203::traits::{KeyGen, SerDes};

    let (ek, dk) = fips203::ml_kem_768::KG::try_keygen_with_rng(rng).unwrap();
    let mut public = MlKemPublicKey {
        parameter_set: CKP_ML_KEM_768,
        value: ek.into_bytes().to_vec(),
    }
    .to_object()
    .unwrap();
    let mut private = MlKemPrivateKey {
        parameter_set: CKP_ML_KEM_768,
        value: dk.into_bytes().to_vec(),
    }
    .to_object()
    .unwrap();
    allow(&mut public, &[CKA_ENCAPSULATE]);
    allow(&mut private, &[CKA_DECAPSULATE]);
    (private, public)
}

#[test]
#[parallel]
fn test_mlkem_encapsulation() {
    let mut rng = test_rng();
    let (private, public) = mlkem_768_keys(&mut rng);
    let mech = MechanismValue::bare(CKM_ML_KEM);

    let template = secret_template(CKK_GENERIC_SECRET, None);
    let (secret, data) = round_trip(&mech, &private, &public, &template);
    assert_eq!(value_of(&secret).len(), ML_KEM_SHARED_SECRET_SIZE);
    assert_eq!(data.len(), ML_KEM_768_CT_SIZE);

    /* the shared secret is truncated to fit the template */
    let template = secret_template(CKK_AES, Some(16));
    let (secret, _) = round_trip(&mech, &private, &public, &template);
    assert_eq!(value_of(&secret).len(), 16);
    assert_eq!(secret.get_attr_as_ulong(CKA_KEY_TYPE).unwrap(), CKK_AES);

    let template = secret_template(CKK_GENERIC_SECRET, Some(64));
    let factory = encapsulators();
    let mut encapsulator = ret_or_panic!(factory.create(&mech, &public));
    ret_or_panic!(encapsulator.init(&template));
    assert_eq!(
        rv_or_panic!(encapsulator.encapsulate(&public, &mut rng)),
        CKR_KEY_SIZE_RANGE
    );
}

#[test]
#[parallel]
fn test_mlkem_errors() {
    let mut rng = test_rng();
    let (private, public) = mlkem_768_keys(&mut rng);
    let factory = encapsulators();
    let mech = MechanismValue::bare(CKM_ML_KEM);
    let template = secret_template(CKK_GENERIC_SECRET, None);

    /* operations need a template first */
    let mut encapsulator = ret_or_panic!(factory.create(&mech, &public));
    assert_eq!(
        rv_or_panic!(encapsulator.encapsulate(&public, &mut rng)),
        CKR_OPERATION_NOT_INITIALIZED
    );

    /* a private key can't encapsulate */
    ret_or_panic!(encapsulator.init(&template));
    assert_eq!(
        rv_or_panic!(encapsulator.encapsulate(&private, &mut rng)),
        CKR_KEY_HANDLE_INVALID
    );

    /* ciphertexts of the wrong size */
    let mut decapsulator = ret_or_panic!(factory.create(&mech, &private));
    ret_or_panic!(decapsulator.init(&template));
    assert_eq!(
        rv_or_panic!(decapsulator.decapsulate(&private, &[0u8; 1087])),
        CKR_ENCRYPTED_DATA_LEN_RANGE
    );

    /* usage flags */
    let mut locked = public.clone();
    locked.set_attr(Attribute::from_bool(CKA_ENCAPSULATE, false))
        .unwrap();
    let mut encapsulator = ret_or_panic!(factory.create(&mech, &locked));
    ret_or_panic!(encapsulator.init(&template));
    assert_eq!(
        rv_or_panic!(encapsulator.encapsulate(&locked, &mut rng)),
        CKR_KEY_FUNCTION_NOT_PERMITTED
    );

    /* ML-KEM takes no parameters */
    let mech = MechanismValue::new(CKM_ML_KEM, vec![0u8; 4]);
    assert_eq!(
        rv_or_panic!(factory.create(&mech, &public)),
        CKR_MECHANISM_PARAM_INVALID
    );

    /* the key type selects the mechanism implementation */
    let (_, rsa_public) = rsa_keys(&[CKA_ENCAPSULATE]);
    let mech = MechanismValue::bare(CKM_ML_KEM);
    assert_eq!(
        rv_or_panic!(factory.create(&mech, &rsa_public)),
        CKR_KEY_HANDLE_INVALID
    );
}

#[test]
#[parallel]
fn test_rsa_encapsulation() {
    let (private, public) = rsa_keys(&[CKA_ENCAPSULATE, CKA_DECAPSULATE]);
    let template = secret_template(CKK_AES, Some(32));

    let oaep = CkRsaPkcsOaepParams {
        hash_alg: CKM_SHA256,
        mgf: CKG_MGF1_SHA256,
        source: CKZ_DATA_SPECIFIED,
        source_data: None,
    };
    let mech = MechanismValue::new(CKM_RSA_PKCS_OAEP, oaep.encode().unwrap());
    let (secret, data) = round_trip(&mech, &private, &public, &template);
    assert_eq!(value_of(&secret).len(), 32);
    assert_eq!(data.len(), 256);

    /* labels are opaque bytes, distinct MGF1 digest */
    let labelled = CkRsaPkcsOaepParams {
        hash_alg: CKM_SHA256,
        mgf: CKG_MGF1_SHA1,
        source: CKZ_DATA_SPECIFIED,
        source_data: Some(vec![0xff, 0xfe, 0x00]),
    };
    let mech = MechanismValue::new(CKM_RSA_PKCS_OAEP, labelled.encode().unwrap());
    let (_, data) = round_trip(&mech, &private, &public, &template);

    let relabelled = CkRsaPkcsOaepParams {
        source_data: Some(vec![0xff, 0xfe, 0x01]),
        ..labelled
    };
    let mech =
        MechanismValue::new(CKM_RSA_PKCS_OAEP, relabelled.encode().unwrap());
    let mut decapsulator = ret_or_panic!(encapsulators().create(&mech, &private));
    ret_or_panic!(decapsulator.init(&template));
    assert_eq!(
        rv_or_panic!(decapsulator.decapsulate(&private, &data)),
        CKR_ENCRYPTED_DATA_INVALID
    );

    let mech = MechanismValue::bare(CKM_RSA_PKCS);
    round_trip(&mech, &private, &public, &template);

    /* a secret that does not fit in the modulus */
    let template = secret_template(CKK_GENERIC_SECRET, Some(300));
    let factory = encapsulators();
    let mut encapsulator = ret_or_panic!(factory.create(&mech, &public));
    ret_or_panic!(encapsulator.init(&template));
    let mut rng = test_rng();
    assert_eq!(
        rv_or_panic!(encapsulator.encapsulate(&public, &mut rng)),
        CKR_KEY_SIZE_RANGE
    );

    /* signature only mechanisms can't encapsulate */
    let mech = MechanismValue::bare(CKM_SHA256_RSA_PKCS);
    assert_eq!(
        rv_or_panic!(factory.create(&mech, &public)),
        CKR_MECHANISM_INVALID
    );

    let oaep = CkRsaPkcsOaepParams {
        hash_alg: CKM_SHA256,
        mgf: 0x4242,
        source: CKZ_DATA_SPECIFIED,
        source_data: None,
    };
    let mech = MechanismValue::new(CKM_RSA_PKCS_OAEP, oaep.encode().unwrap());
    assert_eq!(
        rv_or_panic!(factory.create(&mech, &public)),
        CKR_MECHANISM_PARAM_INVALID
    );
}

fn ecdh_params(
    kdf: CK_EC_KDF_TYPE,
    shared_data: Option<Vec<u8>>,
    public_data: Option<Vec<u8>>,
) -> Vec<u8> {
    CkEcdh1DeriveParams {
        kdf: kdf,
        shared_data: shared_data,
        public_data: public_data,
    }
    .encode()
    .unwrap()
}

#[test]
#[parallel]
fn test_ecdh_encapsulation() {
    let mut rng = test_rng();
    let (mut private, mut public) = p256_key_pair(&mut rng);
    allow(&mut private, &[CKA_DECAPSULATE]);
    allow(&mut public, &[CKA_ENCAPSULATE]);

    let mech = MechanismValue::new(
        CKM_ECDH1_DERIVE,
        ecdh_params(CKD_SHA256_KDF, Some(b"context".to_vec()), None),
    );
    let template = secret_template(CKK_AES, Some(16));
    let (secret, data) = round_trip(&mech, &private, &public, &template);
    assert_eq!(value_of(&secret).len(), 16);
    /* the ephemeral point, DER encoded */
    assert_eq!(data.len(), 67);
    assert_eq!(data[0], 0x04);
    assert_eq!(data[2], 0x04);

    /* the raw shared value */
    let mech = MechanismValue::new(
        CKM_ECDH1_COFACTOR_DERIVE,
        ecdh_params(CKD_NULL, None, None),
    );
    let template = secret_template(CKK_GENERIC_SECRET, None);
    let (secret, _) = round_trip(&mech, &private, &public, &template);
    assert_eq!(value_of(&secret).len(), 32);

    let factory = encapsulators();
    let mut decapsulator = ret_or_panic!(factory.create(&mech, &private));
    ret_or_panic!(decapsulator.init(&template));
    assert_eq!(
        rv_or_panic!(decapsulator.decapsulate(&private, &[0x04, 0x01, 0x02])),
        CKR_ARGUMENTS_BAD
    );

    /* the peer point travels in the encapsulated data only */
    let point = EcPublicKey::from_object(&public, CKK_EC).unwrap().point.clone();
    let mech = MechanismValue::new(
        CKM_ECDH1_DERIVE,
        ecdh_params(CKD_NULL, None, Some(point)),
    );
    let mut encapsulator = ret_or_panic!(factory.create(&mech, &public));
    ret_or_panic!(encapsulator.init(&template));
    assert_eq!(
        rv_or_panic!(encapsulator.encapsulate(&public, &mut rng)),
        CKR_MECHANISM_PARAM_INVALID
    );

    let mech = MechanismValue::new(
        CKM_ECDH1_DERIVE,
        ecdh_params(0x4242, None, None),
    );
    assert_eq!(
        rv_or_panic!(factory.create(&mech, &public)),
        CKR_MECHANISM_PARAM_INVALID
    );
}

#[test]
#[parallel]
fn test_x25519_encapsulation() {
    let mut rng = test_rng();
    let (mut private, mut public) = x25519_key_pair(&mut rng);
    allow(&mut private, &[CKA_DECAPSULATE]);
    allow(&mut public, &[CKA_ENCAPSULATE]);
    let template = secret_template(CKK_GENERIC_SECRET, Some(32));

    let mech = MechanismValue::new(
        CKM_ECDH1_DERIVE,
        ecdh_params(CKD_NULL, None, None),
    );
    let (secret, data) = round_trip(&mech, &private, &public, &template);
    assert_eq!(value_of(&secret).len(), 32);
    /* the raw ephemeral u-coordinate, like CKA_EC_POINT */
    assert_eq!(data.len(), 32);
    let ephemeral = x25519_dalek::PublicKey::from(
        <[u8; 32]>::try_from(data.as_slice()).unwrap(),
    );
    let sk = x25519_dalek::StaticSecret::from(
        <[u8; 32]>::try_from(value_of(&private).as_slice()).unwrap(),
    );
    assert_eq!(
        sk.diffie_hellman(&ephemeral).as_bytes().to_vec(),
        value_of(&secret)
    );

    /* a DER wrapped point is still accepted */
    let factory = encapsulators();
    let mut decapsulator = ret_or_panic!(factory.create(&mech, &private));
    ret_or_panic!(decapsulator.init(&template));
    let mut wrapped = vec![0x04, 0x20];
    wrapped.extend_from_slice(&data);
    let recovered = ret_or_panic!(decapsulator.decapsulate(&private, &wrapped));
    assert_eq!(value_of(&recovered), value_of(&secret));
    let mut decapsulator = ret_or_panic!(factory.create(&mech, &private));
    ret_or_panic!(decapsulator.init(&template));
    assert_eq!(
        rv_or_panic!(decapsulator.decapsulate(&private, &[0x04, 0x01, 0x02])),
        CKR_ARGUMENTS_BAD
    );

    let mech = MechanismValue::new(
        CKM_ECDH1_DERIVE,
        ecdh_params(CKD_SHA512_KDF, None, None),
    );
    let template = secret_template(CKK_GENERIC_SECRET, Some(64));
    let (secret, _) = round_trip(&mech, &private, &public, &template);
    assert_eq!(value_of(&secret).len(), 64);

    /* the cofactor variant is not defined for Montgomery keys */
    let mech = MechanismValue::new(
        CKM_ECDH1_COFACTOR_DERIVE,
        ecdh_params(CKD_NULL, None, None),
    );
    assert_eq!(
        rv_or_panic!(encapsulators().create(&mech, &public)),
        CKR_KEY_HANDLE_INVALID
    );
}
