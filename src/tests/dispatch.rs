// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

use crate::tests::*;

use crate::factory::build_registry;
use crate::mechanism::mech_type_to_name;

use serial_test::parallel;

#[test]
#[parallel]
fn test_unknown_mechanisms() {
    let mech = MechanismValue::bare(0x8000_1234);
    let store = MemoryStore::new();

    let key = secret_key(CKK_GENERIC_SECRET, &[0u8; 16], &[]);
    assert_eq!(
        rv_or_panic!(encapsulators().create(&mech, &key)),
        CKR_MECHANISM_INVALID
    );
    assert_eq!(rv_or_panic!(signers().create(&mech)), CKR_MECHANISM_INVALID);
    assert_eq!(
        rv_or_panic!(derivers().create(&mech, &store)),
        CKR_MECHANISM_INVALID
    );

    /* the data variant of HKDF is not a derivation */
    let mech = MechanismValue::bare(CKM_HKDF_DATA);
    assert_eq!(
        rv_or_panic!(derivers().create(&mech, &store)),
        CKR_MECHANISM_INVALID
    );
}

#[test]
#[parallel]
fn test_operation_flags() {
    let store = MemoryStore::new();
    let key = secret_key(CKK_GENERIC_SECRET, &[0u8; 16], &[]);

    /* a MAC can neither derive nor encapsulate */
    let mech = MechanismValue::bare(CKM_SHA256_HMAC);
    assert_eq!(
        rv_or_panic!(derivers().create(&mech, &store)),
        CKR_MECHANISM_INVALID
    );
    assert_eq!(
        rv_or_panic!(encapsulators().create(&mech, &key)),
        CKR_MECHANISM_INVALID
    );

    /* a derivation can't sign */
    let mech = MechanismValue::bare(CKM_SHA256_KEY_DERIVATION);
    assert_eq!(rv_or_panic!(signers().create(&mech)), CKR_MECHANISM_INVALID);

    /* a KEM can't sign nor derive */
    let mech = MechanismValue::bare(CKM_ML_KEM);
    assert_eq!(rv_or_panic!(signers().create(&mech)), CKR_MECHANISM_INVALID);
    assert_eq!(
        rv_or_panic!(derivers().create(&mech, &store)),
        CKR_MECHANISM_INVALID
    );

    /* signatures can't be used as KEMs */
    let mech = MechanismValue::bare(CKM_ML_DSA);
    assert_eq!(
        rv_or_panic!(encapsulators().create(&mech, &key)),
        CKR_MECHANISM_INVALID
    );
}

#[test]
#[parallel]
fn test_encapsulator_key_type() {
    /* the key type selects the implementation, it must be present */
    let mut key = Object::new(CKO_PUBLIC_KEY);
    allow(&mut key, &[CKA_ENCAPSULATE]);
    let mech = MechanismValue::bare(CKM_ML_KEM);
    assert_eq!(
        rv_or_panic!(encapsulators().create(&mech, &key)),
        CKR_KEY_HANDLE_INVALID
    );
}

#[test]
#[parallel]
fn test_registry_contents() {
    let mechs = ret_or_panic!(build_registry(&Config::new()));
    for ckm in [
        CKM_ML_KEM,
        CKM_RSA_PKCS,
        CKM_RSA_PKCS_OAEP,
        CKM_ECDH1_DERIVE,
        CKM_ECDH1_COFACTOR_DERIVE,
        CKM_ECDSA_SHA256,
        CKM_EDDSA,
        CKM_ML_DSA,
        CKM_SLH_DSA,
        CKM_SHA256_HMAC,
        CKM_AES_CMAC,
        CKM_POLY1305,
        CKM_HKDF_DERIVE,
        CKM_SHA256_KEY_DERIVATION,
        CKM_CONCATENATE_BASE_AND_KEY,
        CKM_AES_ECB_ENCRYPT_DATA,
    ] {
        assert!(mechs.info(ckm).is_some(), "{} missing", mech_type_to_name(ckm));
    }

    let info = mechs.info(CKM_ML_KEM).unwrap();
    assert_eq!(info.flags, CKF_ENCAPSULATE | CKF_DECAPSULATE);
    let info = mechs.info(CKM_RSA_PKCS).unwrap();
    assert_eq!(
        info.flags,
        CKF_ENCAPSULATE | CKF_DECAPSULATE | CKF_SIGN | CKF_VERIFY
    );
    assert!(mechs.info(CKM_HKDF_DATA).is_none());
}

#[test]
#[parallel]
fn test_restricted_registry() {
    let conf = ret_or_panic!(Config::from_toml(
        r#"mechanisms = ["CKM_ML_KEM", "CKM_SHA256_HMAC"]"#
    ));
    let mechs = ret_or_panic!(build_registry(&conf));
    assert_eq!(mechs.list(), vec![CKM_ML_KEM, CKM_SHA256_HMAC]);

    let signers = ret_or_panic!(WrapperSignerFactory::new(&conf));
    ret_or_panic!(signers.create(&MechanismValue::bare(CKM_SHA256_HMAC)));
    assert_eq!(
        rv_or_panic!(signers.create(&MechanismValue::bare(CKM_SHA512_HMAC))),
        CKR_MECHANISM_INVALID
    );

    let (_, public) = rsa_keys(&[CKA_ENCAPSULATE]);
    let encapsulators = ret_or_panic!(EncapsulatorFactory::new(&conf));
    assert_eq!(
        rv_or_panic!(encapsulators.create(&MechanismValue::bare(CKM_RSA_PKCS), &public)),
        CKR_MECHANISM_INVALID
    );

    let derivers = ret_or_panic!(DeriveKeyGeneratorFactory::new(&conf));
    let store = MemoryStore::new();
    assert_eq!(
        rv_or_panic!(derivers.create(
            &MechanismValue::bare(CKM_SHA256_KEY_DERIVATION),
            &store
        )),
        CKR_MECHANISM_INVALID
    );
}

#[test]
#[parallel]
fn test_configured_hedge() {
    let conf = ret_or_panic!(Config::from_toml(
        r#"hedge_preferred = "deterministic""#
    ));
    let factory = ret_or_panic!(WrapperSignerFactory::new(&conf));

    /* HMAC is always deterministic, the configuration must not break it */
    let key = secret_key(CKK_GENERIC_SECRET, b"key", &[CKA_SIGN, CKA_VERIFY]);
    let mech = MechanismValue::bare(CKM_SHA256_HMAC);
    let mut rng = test_rng();
    let wrapper = ret_or_panic!(factory.create(&mech));
    let mut signing = ret_or_panic!(wrapper.into_signing_signer(&key, &mut rng));
    ret_or_panic!(signing.signer.update(b"data"));
    let tag = ret_or_panic!(signing.signer.generate_signature());
    assert!(verify(&factory, &mech, &key, b"data", &tag));
}
