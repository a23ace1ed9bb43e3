// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

use crate::tests::*;

use serial_test::parallel;

const HMAC_KEY: &[u8] = b"Jefe";
const HMAC_DATA: &[u8] = b"what do ya want for nothing?";
const HMAC_SHA256_TAG: &str =
    "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843";

fn mac(
    factory: &WrapperSignerFactory,
    mech: &MechanismValue,
    key: &Object,
    parts: &[&[u8]],
) -> Vec<u8> {
    let mut rng = test_rng();
    let wrapper = ret_or_panic!(factory.create(mech));
    let mut signing = ret_or_panic!(wrapper.into_signing_signer(key, &mut rng));
    assert!(!signing.always_authenticate);
    for part in parts {
        ret_or_panic!(signing.signer.update(part));
    }
    ret_or_panic!(signing.signer.generate_signature())
}

#[test]
#[parallel]
fn test_hmac_rfc4231() {
    let factory = signers();
    let key = secret_key(CKK_GENERIC_SECRET, HMAC_KEY, &[CKA_SIGN, CKA_VERIFY]);

    /* RFC 4231, test case 2 */
    let sha256 = MechanismValue::bare(CKM_SHA256_HMAC);
    let tag = mac(&factory, &sha256, &key, &[HMAC_DATA]);
    assert_eq!(tag, hex::decode(HMAC_SHA256_TAG).unwrap());

    let sha512 = MechanismValue::bare(CKM_SHA512_HMAC);
    let tag = mac(&factory, &sha512, &key, &[HMAC_DATA]);
    assert_eq!(
        tag,
        hex::decode(
            "164b7a7bfcf819e2e395fbe73b56e0a387bd64222e831fd610270cd7ea250554\
             9758bf75c05a994a6d034f65f8f0e6fdcaeab1a34d4a6b4b636e070a38bce737"
        )
        .unwrap()
    );

    /* multi part produces the same tag */
    let tag = mac(&factory, &sha256, &key, &[&HMAC_DATA[..9], &HMAC_DATA[9..]]);
    assert_eq!(tag, hex::decode(HMAC_SHA256_TAG).unwrap());

    assert!(verify(&factory, &sha256, &key, HMAC_DATA, &tag));

    let mut bad = tag.clone();
    bad[0] ^= 0x01;
    assert!(!verify(&factory, &sha256, &key, HMAC_DATA, &bad));
}

#[test]
#[parallel]
fn test_hmac_key_types() {
    let factory = signers();
    let mech = MechanismValue::bare(CKM_SHA256_HMAC);

    /* the family key type is accepted as well as generic secrets */
    let key = secret_key(CKK_SHA256_HMAC, HMAC_KEY, &[CKA_SIGN]);
    let tag = mac(&factory, &mech, &key, &[HMAC_DATA]);
    assert_eq!(tag, hex::decode(HMAC_SHA256_TAG).unwrap());

    let key = secret_key(CKK_SHA512_HMAC, HMAC_KEY, &[CKA_SIGN]);
    let wrapper = ret_or_panic!(factory.create(&mech));
    let mut rng = test_rng();
    assert_eq!(
        rv_or_panic!(wrapper.into_signing_signer(&key, &mut rng)),
        CKR_KEY_HANDLE_INVALID
    );

    /* the key must allow signing */
    let key = secret_key(CKK_GENERIC_SECRET, HMAC_KEY, &[CKA_VERIFY]);
    let wrapper = ret_or_panic!(factory.create(&mech));
    assert_eq!(
        rv_or_panic!(wrapper.into_signing_signer(&key, &mut rng)),
        CKR_KEY_FUNCTION_NOT_PERMITTED
    );

    /* and verification */
    let key = secret_key(CKK_GENERIC_SECRET, HMAC_KEY, &[CKA_SIGN]);
    let wrapper = ret_or_panic!(factory.create(&mech));
    assert_eq!(
        rv_or_panic!(wrapper.into_validation_signer(&key)),
        CKR_KEY_FUNCTION_NOT_PERMITTED
    );
}

#[test]
#[parallel]
fn test_hmac_general() {
    let factory = signers();
    let key = secret_key(CKK_GENERIC_SECRET, HMAC_KEY, &[CKA_SIGN, CKA_VERIFY]);
    let full = hex::decode(HMAC_SHA256_TAG).unwrap();

    let mech = MechanismValue::new(
        CKM_SHA256_HMAC_GENERAL,
        CkMacGeneralParams(16).encode().unwrap(),
    );
    let tag = mac(&factory, &mech, &key, &[HMAC_DATA]);
    assert_eq!(tag, &full[..16]);
    assert!(verify(&factory, &mech, &key, HMAC_DATA, &tag));

    /* a full length tag does not verify a truncated MAC */
    let wrapper = ret_or_panic!(factory.create(&mech));
    let mut verifier = ret_or_panic!(wrapper.into_validation_signer(&key));
    ret_or_panic!(verifier.update(HMAC_DATA));
    assert_eq!(
        rv_or_panic!(verifier.verify_signature(&full)),
        CKR_SIGNATURE_LEN_RANGE
    );

    /* a zero length is allowed and produces an empty MAC */
    let mech = MechanismValue::new(
        CKM_SHA256_HMAC_GENERAL,
        CkMacGeneralParams(0).encode().unwrap(),
    );
    let tag = mac(&factory, &mech, &key, &[HMAC_DATA]);
    assert!(tag.is_empty());

    /* longer than the digest */
    let mech = MechanismValue::new(
        CKM_SHA256_HMAC_GENERAL,
        CkMacGeneralParams(33).encode().unwrap(),
    );
    let wrapper = ret_or_panic!(factory.create(&mech));
    let mut rng = test_rng();
    assert_eq!(
        rv_or_panic!(wrapper.into_signing_signer(&key, &mut rng)),
        CKR_MECHANISM_PARAM_INVALID
    );

    /* missing parameters */
    let mech = MechanismValue::bare(CKM_SHA256_HMAC_GENERAL);
    assert_eq!(rv_or_panic!(factory.create(&mech)), CKR_MECHANISM_PARAM_INVALID);

    /* the plain variant takes no parameters */
    let mech = MechanismValue::new(
        CKM_SHA256_HMAC,
        CkMacGeneralParams(16).encode().unwrap(),
    );
    assert_eq!(rv_or_panic!(factory.create(&mech)), CKR_MECHANISM_PARAM_INVALID);
}

#[test]
#[parallel]
fn test_aes_cmac_rfc4493() {
    let factory = signers();
    let key = secret_key(
        CKK_AES,
        &hex::decode("2b7e151628aed2a6abf7158809cf4f3c").unwrap(),
        &[CKA_SIGN, CKA_VERIFY],
    );
    let mech = MechanismValue::bare(CKM_AES_CMAC);

    let tag = mac(&factory, &mech, &key, &[]);
    assert_eq!(tag, hex::decode("bb1d6929e95937287fa37d129b756746").unwrap());

    let msg = hex::decode("6bc1bee22e409f96e93d7e117393172a").unwrap();
    let tag = mac(&factory, &mech, &key, &[msg.as_slice()]);
    assert_eq!(tag, hex::decode("070a16b46b4d4144f79bdd9dd04a287c").unwrap());
    assert!(verify(&factory, &mech, &key, &msg, &tag));

    let mech = MechanismValue::new(
        CKM_AES_CMAC_GENERAL,
        CkMacGeneralParams(8).encode().unwrap(),
    );
    let short = mac(&factory, &mech, &key, &[msg.as_slice()]);
    assert_eq!(short, &tag[..8]);
    assert!(verify(&factory, &mech, &key, &msg, &short));

    let mech = MechanismValue::new(
        CKM_AES_CMAC_GENERAL,
        CkMacGeneralParams(17).encode().unwrap(),
    );
    let wrapper = ret_or_panic!(factory.create(&mech));
    let mut rng = test_rng();
    assert_eq!(
        rv_or_panic!(wrapper.into_signing_signer(&key, &mut rng)),
        CKR_MECHANISM_PARAM_INVALID
    );
}

#[test]
#[parallel]
fn test_cmac_keys() {
    let factory = signers();
    let mut rng = test_rng();

    let mech = MechanismValue::bare(CKM_AES_CMAC);
    let key = secret_key(CKK_AES, &[0x11; 15], &[CKA_SIGN]);
    let wrapper = ret_or_panic!(factory.create(&mech));
    assert_eq!(
        rv_or_panic!(wrapper.into_signing_signer(&key, &mut rng)),
        CKR_KEY_SIZE_RANGE
    );

    let key = secret_key(CKK_CAMELLIA, &[0x11; 16], &[CKA_SIGN]);
    let wrapper = ret_or_panic!(factory.create(&mech));
    assert_eq!(
        rv_or_panic!(wrapper.into_signing_signer(&key, &mut rng)),
        CKR_KEY_HANDLE_INVALID
    );

    /* the same key works with the Camellia MAC */
    let mech = MechanismValue::bare(CKM_CAMELLIA_MAC);
    let mut key = secret_key(CKK_CAMELLIA, &[0x11; 16], &[CKA_SIGN]);
    allow(&mut key, &[CKA_VERIFY]);
    let tag = mac(&factory, &mech, &key, &[b"camellia".as_slice()]);
    assert_eq!(tag.len(), 16);
    assert!(verify(&factory, &mech, &key, b"camellia", &tag));
}

#[test]
#[parallel]
fn test_poly1305_rfc8439() {
    let factory = signers();
    let key = secret_key(
        CKK_POLY1305,
        &hex::decode(
            "85d6be7857556d337f4452fe42d506a80103808afb0db2fd4abff6af4149f51b",
        )
        .unwrap(),
        &[CKA_SIGN, CKA_VERIFY],
    );
    let mech = MechanismValue::bare(CKM_POLY1305);
    let msg = b"Cryptographic Forum Research Group";

    let tag = mac(&factory, &mech, &key, &[&msg[..10], &msg[10..]]);
    assert_eq!(tag, hex::decode("a8061dc1305136c6c22b8baf0c0127a9").unwrap());
    assert!(verify(&factory, &mech, &key, msg, &tag));

    /* only POLY1305 keys are accepted */
    let other = secret_key(CKK_GENERIC_SECRET, &[0x55; 32], &[CKA_SIGN]);
    let wrapper = ret_or_panic!(factory.create(&mech));
    let mut rng = test_rng();
    assert_eq!(
        rv_or_panic!(wrapper.into_signing_signer(&other, &mut rng)),
        CKR_KEY_HANDLE_INVALID
    );

    let mech = MechanismValue::new(CKM_POLY1305, vec![0u8; 8]);
    assert_eq!(rv_or_panic!(factory.create(&mech)), CKR_MECHANISM_PARAM_INVALID);
}
