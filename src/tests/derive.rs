// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

use crate::tests::*;

use serial_test::parallel;

fn derive(
    mech: &MechanismValue,
    store: &MemoryStore,
    base: &Object,
    template: &[Attribute],
) -> Result<Object> {
    let mut generator = derivers().create(mech, store)?;
    generator.init(template)?;
    generator.generate(base)
}

fn string_data(mech: CK_MECHANISM_TYPE, data: &[u8]) -> MechanismValue {
    MechanismValue::new(
        mech,
        CkKeyDerivationStringData(data.to_vec()).encode().unwrap(),
    )
}

#[test]
#[parallel]
fn test_digest_derive() {
    let store = MemoryStore::new();
    let base = secret_key(CKK_GENERIC_SECRET, b"abc", &[CKA_DERIVE]);
    let mech = MechanismValue::bare(CKM_SHA256_KEY_DERIVATION);
    let sha256_abc = hex::decode(
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad",
    )
    .unwrap();

    let template = secret_template(CKK_GENERIC_SECRET, None);
    let key = ret_or_panic!(derive(&mech, &store, &base, &template));
    assert_eq!(value_of(&key), sha256_abc);
    assert_eq!(key.get_attr_as_ulong(CKA_VALUE_LEN).unwrap(), 32);
    assert_eq!(key.get_attr_as_bool(CKA_LOCAL).unwrap(), false);

    /* the leading bytes are kept when the template asks for less */
    let template = secret_template(CKK_AES, Some(16));
    let key = ret_or_panic!(derive(&mech, &store, &base, &template));
    assert_eq!(value_of(&key), &sha256_abc[..16]);
    assert_eq!(key.get_attr_as_ulong(CKA_KEY_TYPE).unwrap(), CKK_AES);

    /* but the digest can't be stretched */
    let template = secret_template(CKK_GENERIC_SECRET, Some(48));
    assert_eq!(
        rv_or_panic!(derive(&mech, &store, &base, &template)),
        CKR_KEY_SIZE_RANGE
    );

    let mech = MechanismValue::bare(CKM_SHA512_KEY_DERIVATION);
    let template = secret_template(CKK_GENERIC_SECRET, Some(48));
    let key = ret_or_panic!(derive(&mech, &store, &base, &template));
    assert_eq!(value_of(&key).len(), 48);

    /* the digest derivations take no parameters */
    let mech = MechanismValue::new(CKM_SHA256_KEY_DERIVATION, vec![1]);
    assert_eq!(
        rv_or_panic!(derivers().create(&mech, &store)),
        CKR_MECHANISM_PARAM_INVALID
    );
}

#[test]
#[parallel]
fn test_derive_base_checks() {
    let store = MemoryStore::new();
    let mech = MechanismValue::bare(CKM_SHA256_KEY_DERIVATION);
    let template = secret_template(CKK_GENERIC_SECRET, None);

    let base = secret_key(CKK_GENERIC_SECRET, b"abc", &[CKA_SIGN]);
    assert_eq!(
        rv_or_panic!(derive(&mech, &store, &base, &template)),
        CKR_KEY_FUNCTION_NOT_PERMITTED
    );

    let mut rng = test_rng();
    let (_, mut public) = p256_key_pair(&mut rng);
    allow(&mut public, &[CKA_DERIVE]);
    assert_eq!(
        rv_or_panic!(derive(&mech, &store, &public, &template)),
        CKR_KEY_TYPE_INCONSISTENT
    );

    /* generating before init */
    let base = secret_key(CKK_GENERIC_SECRET, b"abc", &[CKA_DERIVE]);
    let mut generator = ret_or_panic!(derivers().create(&mech, &store));
    assert_eq!(
        rv_or_panic!(generator.generate(&base)),
        CKR_OPERATION_NOT_INITIALIZED
    );

    /* the template must describe a secret key */
    let template = vec![Attribute::from_ulong(CKA_CLASS, CKO_PRIVATE_KEY)];
    let mut generator = ret_or_panic!(derivers().create(&mech, &store));
    assert_eq!(
        rv_or_panic!(generator.init(&template)),
        CKR_TEMPLATE_INCONSISTENT
    );
}

#[test]
#[parallel]
fn test_derive_sensitivity() {
    let store = MemoryStore::new();
    let mech = MechanismValue::bare(CKM_SHA256_KEY_DERIVATION);
    let mut template = secret_template(CKK_AES, None);
    template.push(Attribute::from_bool(CKA_SENSITIVE, true));
    template.push(Attribute::from_bool(CKA_EXTRACTABLE, false));

    let mut base = secret_key(CKK_GENERIC_SECRET, b"abc", &[CKA_DERIVE]);
    base.set_attr(Attribute::from_bool(CKA_ALWAYS_SENSITIVE, true))
        .unwrap();
    base.set_attr(Attribute::from_bool(CKA_NEVER_EXTRACTABLE, true))
        .unwrap();
    let key = ret_or_panic!(derive(&mech, &store, &base, &template));
    assert!(key.is_sensitive());
    assert!(key.is_always_sensitive());
    assert!(key.is_never_extractable());

    /* a base that was ever exposed taints the derived key */
    base.set_attr(Attribute::from_bool(CKA_ALWAYS_SENSITIVE, false))
        .unwrap();
    let key = ret_or_panic!(derive(&mech, &store, &base, &template));
    assert!(key.is_sensitive());
    assert!(!key.is_always_sensitive());
    assert!(key.is_never_extractable());
}

#[test]
#[parallel]
fn test_concatenate_derive() {
    let store = MemoryStore::new();
    let base = secret_key(CKK_GENERIC_SECRET, &[0x01, 0x02], &[CKA_DERIVE]);
    let template = secret_template(CKK_GENERIC_SECRET, None);

    let mech = string_data(CKM_CONCATENATE_BASE_AND_DATA, &[0x03, 0x04]);
    let key = ret_or_panic!(derive(&mech, &store, &base, &template));
    assert_eq!(value_of(&key), [0x01, 0x02, 0x03, 0x04]);

    let mech = string_data(CKM_CONCATENATE_DATA_AND_BASE, &[0x03, 0x04]);
    let key = ret_or_panic!(derive(&mech, &store, &base, &template));
    assert_eq!(value_of(&key), [0x03, 0x04, 0x01, 0x02]);

    /* the output length can be restricted */
    let template = secret_template(CKK_GENERIC_SECRET, Some(3));
    let key = ret_or_panic!(derive(&mech, &store, &base, &template));
    assert_eq!(value_of(&key), [0x03, 0x04, 0x01]);

    let mech = string_data(CKM_CONCATENATE_BASE_AND_DATA, &[]);
    assert_eq!(
        rv_or_panic!(derivers().create(&mech, &store)),
        CKR_MECHANISM_PARAM_INVALID
    );
}

#[test]
#[parallel]
fn test_concatenate_base_and_key() {
    let store = MemoryStore::new();
    let template = secret_template(CKK_GENERIC_SECRET, None);
    let mut base = secret_key(CKK_GENERIC_SECRET, &[0xaa; 4], &[CKA_DERIVE]);
    base.set_attr(Attribute::from_bool(CKA_ALWAYS_SENSITIVE, true))
        .unwrap();
    base.set_attr(Attribute::from_bool(CKA_NEVER_EXTRACTABLE, true))
        .unwrap();

    let other = secret_key(CKK_GENERIC_SECRET, &[0xbb; 3], &[CKA_DERIVE]);
    let handle = ret_or_panic!(store.store_object(other));
    let mech = MechanismValue::new(
        CKM_CONCATENATE_BASE_AND_KEY,
        CkObjectHandleParam(handle).encode().unwrap(),
    );
    let mut sensitive = template.clone();
    sensitive.push(Attribute::from_bool(CKA_SENSITIVE, true));
    sensitive.push(Attribute::from_bool(CKA_EXTRACTABLE, false));
    let key = ret_or_panic!(derive(&mech, &store, &base, &sensitive));
    assert_eq!(
        value_of(&key),
        [0xaa, 0xaa, 0xaa, 0xaa, 0xbb, 0xbb, 0xbb]
    );
    /* the other key was never sensitive */
    assert!(!key.is_always_sensitive());
    assert!(!key.is_never_extractable());

    /* the other key must allow derivation */
    let other = secret_key(CKK_GENERIC_SECRET, &[0xbb; 3], &[CKA_SIGN]);
    let handle = ret_or_panic!(store.store_object(other));
    let mech = MechanismValue::new(
        CKM_CONCATENATE_BASE_AND_KEY,
        CkObjectHandleParam(handle).encode().unwrap(),
    );
    assert_eq!(
        rv_or_panic!(derivers().create(&mech, &store)),
        CKR_MECHANISM_PARAM_INVALID
    );

    let mech = MechanismValue::new(
        CKM_CONCATENATE_BASE_AND_KEY,
        CkObjectHandleParam(handle + 100).encode().unwrap(),
    );
    assert_eq!(
        rv_or_panic!(derivers().create(&mech, &store)),
        CKR_MECHANISM_PARAM_INVALID
    );
}

#[test]
#[parallel]
fn test_xor_and_extract_derive() {
    let store = MemoryStore::new();
    let template = secret_template(CKK_GENERIC_SECRET, None);

    let base = secret_key(CKK_GENERIC_SECRET, &[0x0f, 0x0f, 0x0f], &[CKA_DERIVE]);
    let mech = string_data(CKM_XOR_BASE_AND_DATA, &[0xf0, 0xf1]);
    let key = ret_or_panic!(derive(&mech, &store, &base, &template));
    assert_eq!(value_of(&key), [0xff, 0xfe]);

    let base = secret_key(
        CKK_GENERIC_SECRET,
        &hex::decode("329f84a9").unwrap(),
        &[CKA_DERIVE],
    );
    let mech = MechanismValue::new(
        CKM_EXTRACT_KEY_FROM_KEY,
        CkExtractParams(21).encode().unwrap(),
    );
    let key = ret_or_panic!(derive(&mech, &store, &base, &template));
    assert_eq!(value_of(&key), [0x95]);

    let template = secret_template(CKK_GENERIC_SECRET, Some(2));
    let key = ret_or_panic!(derive(&mech, &store, &base, &template));
    assert_eq!(value_of(&key), [0x95, 0x26]);

    let mech = MechanismValue::new(
        CKM_EXTRACT_KEY_FROM_KEY,
        CkExtractParams(32).encode().unwrap(),
    );
    assert_eq!(
        rv_or_panic!(derive(&mech, &store, &base, &template)),
        CKR_MECHANISM_PARAM_INVALID
    );
}

fn hkdf_params(extract: bool, expand: bool) -> CkHkdfParams {
    CkHkdfParams {
        extract: extract,
        expand: expand,
        prf_hash_mechanism: CKM_SHA256,
        salt_type: CKF_HKDF_SALT_DATA,
        salt: Some(hex::decode("000102030405060708090a0b0c").unwrap()),
        salt_key: CK_INVALID_HANDLE,
        info: Some(hex::decode("f0f1f2f3f4f5f6f7f8f9").unwrap()),
    }
}

fn hkdf_mech(params: &CkHkdfParams) -> MechanismValue {
    MechanismValue::new(CKM_HKDF_DERIVE, params.encode().unwrap())
}

const HKDF_PRK: &str =
    "077709362c2e32df0ddc3f0dc47bba6390b6c73bb50f9c3122ec844ad7c2b3e5";
const HKDF_OKM: &str = "3cb25f25faacd57a90434f64d0362f2a2d2d0a90cf1a5a4c5db0\
                        2d56ecc4c5bf34007208d5b887185865";

#[test]
#[parallel]
fn test_hkdf_rfc5869() {
    let store = MemoryStore::new();
    let base = secret_key(CKK_GENERIC_SECRET, &[0x0b; 22], &[CKA_DERIVE]);
    let template = secret_template(CKK_GENERIC_SECRET, Some(42));

    /* RFC 5869, test case 1 */
    let mech = hkdf_mech(&hkdf_params(true, true));
    let key = ret_or_panic!(derive(&mech, &store, &base, &template));
    assert_eq!(value_of(&key), hex::decode(HKDF_OKM).unwrap());

    /* extract only returns the PRK */
    let mech = hkdf_mech(&hkdf_params(true, false));
    let prk = ret_or_panic!(derive(
        &mech,
        &store,
        &base,
        &secret_template(CKK_HKDF, None)
    ));
    assert_eq!(value_of(&prk), hex::decode(HKDF_PRK).unwrap());

    /* and expanding it yields the OKM */
    let mut prk_base = secret_key(CKK_HKDF, &value_of(&prk), &[]);
    allow(&mut prk_base, &[CKA_DERIVE]);
    let mech = hkdf_mech(&hkdf_params(false, true));
    let key = ret_or_panic!(derive(&mech, &store, &prk_base, &template));
    assert_eq!(value_of(&key), hex::decode(HKDF_OKM).unwrap());

    /* the salt can come from a key */
    let salt = secret_key(
        CKK_GENERIC_SECRET,
        &hex::decode("000102030405060708090a0b0c").unwrap(),
        &[],
    );
    let mut params = hkdf_params(true, true);
    params.salt_type = CKF_HKDF_SALT_KEY;
    params.salt = None;
    params.salt_key = ret_or_panic!(store.store_object(salt));
    let key = ret_or_panic!(derive(&hkdf_mech(&params), &store, &base, &template));
    assert_eq!(value_of(&key), hex::decode(HKDF_OKM).unwrap());
}

#[test]
#[parallel]
fn test_hkdf_errors() {
    let store = MemoryStore::new();
    let factory = derivers();

    let mech = hkdf_mech(&hkdf_params(false, false));
    assert_eq!(
        rv_or_panic!(factory.create(&mech, &store)),
        CKR_MECHANISM_PARAM_INVALID
    );

    let mut params = hkdf_params(true, true);
    params.prf_hash_mechanism = CKM_MD5;
    assert_eq!(
        rv_or_panic!(factory.create(&hkdf_mech(&params), &store)),
        CKR_MECHANISM_PARAM_INVALID
    );

    let mut params = hkdf_params(true, true);
    params.salt = Some(Vec::new());
    assert_eq!(
        rv_or_panic!(factory.create(&hkdf_mech(&params), &store)),
        CKR_MECHANISM_PARAM_INVALID
    );

    let mut params = hkdf_params(true, true);
    params.salt_type = CKF_HKDF_SALT_KEY;
    params.salt_key = 4242;
    assert_eq!(
        rv_or_panic!(factory.create(&hkdf_mech(&params), &store)),
        CKR_MECHANISM_PARAM_INVALID
    );

    let mut params = hkdf_params(true, true);
    params.salt_type = 0x80;
    assert_eq!(
        rv_or_panic!(factory.create(&hkdf_mech(&params), &store)),
        CKR_MECHANISM_PARAM_INVALID
    );

    /* the salt is ignored when not extracting */
    let mut params = hkdf_params(false, true);
    params.salt_type = CKF_HKDF_SALT_KEY;
    params.salt_key = 4242;
    let mech = hkdf_mech(&params);
    ret_or_panic!(factory.create(&mech, &store));

    /* expand can produce at most 255 blocks */
    let base = secret_key(CKK_GENERIC_SECRET, &[0x0b; 32], &[CKA_DERIVE]);
    let template = secret_template(CKK_GENERIC_SECRET, Some(255 * 32 + 1));
    assert_eq!(
        rv_or_panic!(derive(&mech, &store, &base, &template)),
        CKR_KEY_SIZE_RANGE
    );

    /* only secret keys are usable */
    let (mut private, _) = rsa_keys(&[]);
    allow(&mut private, &[CKA_DERIVE]);
    let template = secret_template(CKK_GENERIC_SECRET, Some(32));
    assert_eq!(
        rv_or_panic!(derive(&mech, &store, &private, &template)),
        CKR_KEY_TYPE_INCONSISTENT
    );
}

#[test]
#[parallel]
fn test_hkdf_any_secret_base() {
    let store = MemoryStore::new();
    let template = secret_template(CKK_GENERIC_SECRET, Some(42));
    let mech = hkdf_mech(&hkdf_params(true, true));

    /* the key type of the input key material doesn't matter */
    let generic = secret_key(CKK_GENERIC_SECRET, &[0x0b; 32], &[CKA_DERIVE]);
    let expected = value_of(&ret_or_panic!(derive(&mech, &store, &generic, &template)));
    for key_type in [CKK_AES, CKK_SHA256_HMAC, CKK_CAMELLIA] {
        let base = secret_key(key_type, &[0x0b; 32], &[CKA_DERIVE]);
        let key = ret_or_panic!(derive(&mech, &store, &base, &template));
        assert_eq!(value_of(&key), expected, "{key_type:#x}");
    }
}

#[test]
#[parallel]
fn test_encrypt_data_derive() {
    let store = MemoryStore::new();
    let base = secret_key(
        CKK_AES,
        &hex::decode("000102030405060708090a0b0c0d0e0f").unwrap(),
        &[CKA_DERIVE],
    );
    let template = secret_template(CKK_GENERIC_SECRET, None);
    let block = hex::decode("00112233445566778899aabbccddeeff").unwrap();
    /* FIPS 197, appendix C.1 */
    let expected = hex::decode("69c4e0d86a7b0430d8cdb78070b4c55a").unwrap();

    let mech = string_data(CKM_AES_ECB_ENCRYPT_DATA, &block);
    let key = ret_or_panic!(derive(&mech, &store, &base, &template));
    assert_eq!(value_of(&key), expected);

    /* a zero IV makes the first CBC block identical to ECB */
    let cbc = |iv: Vec<u8>, data: Vec<u8>| {
        MechanismValue::new(
            CKM_AES_CBC_ENCRYPT_DATA,
            CkCbcEncryptDataParams { iv: iv, data: data }.encode().unwrap(),
        )
    };
    let mut data = block.clone();
    data.extend_from_slice(&block);
    let key = ret_or_panic!(derive(
        &cbc(vec![0u8; 16], data),
        &store,
        &base,
        &template
    ));
    let value = value_of(&key);
    assert_eq!(value.len(), 32);
    assert_eq!(&value[..16], expected);
    assert_ne!(&value[16..], expected);

    let factory = derivers();
    assert_eq!(
        rv_or_panic!(factory.create(&cbc(vec![0u8; 16], vec![0u8; 17]), &store)),
        CKR_MECHANISM_PARAM_INVALID
    );
    assert_eq!(
        rv_or_panic!(factory.create(&cbc(vec![0u8; 8], vec![0u8; 16]), &store)),
        CKR_MECHANISM_PARAM_INVALID
    );
    let mech = string_data(CKM_AES_ECB_ENCRYPT_DATA, &block[..15]);
    assert_eq!(
        rv_or_panic!(factory.create(&mech, &store)),
        CKR_MECHANISM_PARAM_INVALID
    );

    /* the key type must match the cipher */
    let mech = string_data(CKM_CAMELLIA_ECB_ENCRYPT_DATA, &block);
    assert_eq!(
        rv_or_panic!(derive(&mech, &store, &base, &template)),
        CKR_KEY_TYPE_INCONSISTENT
    );
}

fn ecdh_mech(
    mech: CK_MECHANISM_TYPE,
    kdf: CK_EC_KDF_TYPE,
    peer: &Object,
    key_type: CK_KEY_TYPE,
) -> MechanismValue {
    let point = EcPublicKey::from_object(peer, key_type).unwrap().point.clone();
    MechanismValue::new(
        mech,
        CkEcdh1DeriveParams {
            kdf: kdf,
            shared_data: None,
            public_data: Some(point),
        }
        .encode()
        .unwrap(),
    )
}

#[test]
#[parallel]
fn test_ecdh_derive() {
    let store = MemoryStore::new();
    let mut rng = test_rng();
    let (mut priv_a, pub_a) = p256_key_pair(&mut rng);
    let (mut priv_b, pub_b) = p256_key_pair(&mut rng);
    allow(&mut priv_a, &[CKA_DERIVE]);
    allow(&mut priv_b, &[CKA_DERIVE]);
    let template = secret_template(CKK_GENERIC_SECRET, None);

    let mech_a = ecdh_mech(CKM_ECDH1_DERIVE, CKD_NULL, &pub_b, CKK_EC);
    let mech_b = ecdh_mech(CKM_ECDH1_DERIVE, CKD_NULL, &pub_a, CKK_EC);
    let z_a = ret_or_panic!(derive(&mech_a, &store, &priv_a, &template));
    let z_b = ret_or_panic!(derive(&mech_b, &store, &priv_b, &template));
    assert_eq!(value_of(&z_a).len(), 32);
    assert_eq!(value_of(&z_a), value_of(&z_b));

    /* cofactor is 1 on the prime curves */
    let mech = ecdh_mech(CKM_ECDH1_COFACTOR_DERIVE, CKD_NULL, &pub_b, CKK_EC);
    let z = ret_or_panic!(derive(&mech, &store, &priv_a, &template));
    assert_eq!(value_of(&z), value_of(&z_a));

    let aes = secret_template(CKK_AES, Some(16));
    let mech_a = ecdh_mech(CKM_ECDH1_DERIVE, CKD_SHA256_KDF, &pub_b, CKK_EC);
    let mech_b = ecdh_mech(CKM_ECDH1_DERIVE, CKD_SHA256_KDF, &pub_a, CKK_EC);
    let k_a = ret_or_panic!(derive(&mech_a, &store, &priv_a, &aes));
    let k_b = ret_or_panic!(derive(&mech_b, &store, &priv_b, &aes));
    assert_eq!(value_of(&k_a).len(), 16);
    assert_eq!(value_of(&k_a), value_of(&k_b));
    assert_ne!(value_of(&k_a), &value_of(&z_a)[..16]);

    let factory = derivers();
    let params = CkEcdh1DeriveParams {
        kdf: CKD_NULL,
        shared_data: None,
        public_data: None,
    };
    let mech = MechanismValue::new(CKM_ECDH1_DERIVE, params.encode().unwrap());
    assert_eq!(
        rv_or_panic!(factory.create(&mech, &store)),
        CKR_MECHANISM_PARAM_INVALID
    );

    let params = CkEcdh1DeriveParams {
        kdf: 0x4242,
        shared_data: None,
        public_data: Some(vec![4u8; 65]),
    };
    let mech = MechanismValue::new(CKM_ECDH1_DERIVE, params.encode().unwrap());
    assert_eq!(
        rv_or_panic!(factory.create(&mech, &store)),
        CKR_MECHANISM_PARAM_INVALID
    );
}

#[test]
#[parallel]
fn test_x25519_derive() {
    let store = MemoryStore::new();
    let mut rng = test_rng();
    let (mut priv_a, pub_a) = x25519_key_pair(&mut rng);
    let (mut priv_b, pub_b) = x25519_key_pair(&mut rng);
    allow(&mut priv_a, &[CKA_DERIVE]);
    allow(&mut priv_b, &[CKA_DERIVE]);
    let template = secret_template(CKK_GENERIC_SECRET, Some(32));

    let mech_a =
        ecdh_mech(CKM_ECDH1_DERIVE, CKD_NULL, &pub_b, CKK_EC_MONTGOMERY);
    let mech_b =
        ecdh_mech(CKM_ECDH1_DERIVE, CKD_NULL, &pub_a, CKK_EC_MONTGOMERY);
    let z_a = ret_or_panic!(derive(&mech_a, &store, &priv_a, &template));
    let z_b = ret_or_panic!(derive(&mech_b, &store, &priv_b, &template));
    assert_eq!(value_of(&z_a), value_of(&z_b));

    /* the cofactor variant is only defined for the prime curves */
    let mech = ecdh_mech(
        CKM_ECDH1_COFACTOR_DERIVE,
        CKD_NULL,
        &pub_b,
        CKK_EC_MONTGOMERY,
    );
    assert_eq!(
        rv_or_panic!(derive(&mech, &store, &priv_a, &template)),
        CKR_KEY_TYPE_INCONSISTENT
    );
}
