// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! PKCS#11 scalar types and constants
//!
//! Only the subset of the Cryptoki 3.2 definitions used by the mechanism
//! core is provided. Names and values follow `pkcs11t.h`.

#![allow(non_camel_case_types)]

pub type CK_BYTE = u8;
pub type CK_BBOOL = CK_BYTE;
pub type CK_ULONG = u64;
pub type CK_FLAGS = CK_ULONG;
pub type CK_RV = CK_ULONG;
pub type CK_OBJECT_HANDLE = CK_ULONG;
pub type CK_OBJECT_CLASS = CK_ULONG;
pub type CK_KEY_TYPE = CK_ULONG;
pub type CK_ATTRIBUTE_TYPE = CK_ULONG;
pub type CK_MECHANISM_TYPE = CK_ULONG;
pub type CK_EC_KDF_TYPE = CK_ULONG;
pub type CK_RSA_PKCS_MGF_TYPE = CK_ULONG;
pub type CK_RSA_PKCS_OAEP_SOURCE_TYPE = CK_ULONG;
pub type CK_HEDGE_TYPE = CK_ULONG;
pub type CK_ML_KEM_PARAMETER_SET_TYPE = CK_ULONG;
pub type CK_ML_DSA_PARAMETER_SET_TYPE = CK_ULONG;
pub type CK_SLH_DSA_PARAMETER_SET_TYPE = CK_ULONG;

pub const CK_TRUE: CK_BBOOL = 1;
pub const CK_FALSE: CK_BBOOL = 0;
pub const CK_UNAVAILABLE_INFORMATION: CK_ULONG = !0;
pub const CK_EFFECTIVELY_INFINITE: CK_ULONG = 0;
pub const CK_INVALID_HANDLE: CK_OBJECT_HANDLE = 0;

/// Mechanism information as returned by C_GetMechanismInfo
#[allow(non_snake_case)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct CK_MECHANISM_INFO {
    pub ulMinKeySize: CK_ULONG,
    pub ulMaxKeySize: CK_ULONG,
    pub flags: CK_FLAGS,
}

/* Return values */
pub const CKR_OK: CK_RV = 0x00000000;
pub const CKR_CANCEL: CK_RV = 0x00000001;
pub const CKR_HOST_MEMORY: CK_RV = 0x00000002;
pub const CKR_GENERAL_ERROR: CK_RV = 0x00000005;
pub const CKR_FUNCTION_FAILED: CK_RV = 0x00000006;
pub const CKR_ARGUMENTS_BAD: CK_RV = 0x00000007;
pub const CKR_ATTRIBUTE_READ_ONLY: CK_RV = 0x00000010;
pub const CKR_ATTRIBUTE_SENSITIVE: CK_RV = 0x00000011;
pub const CKR_ATTRIBUTE_TYPE_INVALID: CK_RV = 0x00000012;
pub const CKR_ATTRIBUTE_VALUE_INVALID: CK_RV = 0x00000013;
pub const CKR_DATA_INVALID: CK_RV = 0x00000020;
pub const CKR_DATA_LEN_RANGE: CK_RV = 0x00000021;
pub const CKR_DEVICE_ERROR: CK_RV = 0x00000030;
pub const CKR_ENCRYPTED_DATA_INVALID: CK_RV = 0x00000040;
pub const CKR_ENCRYPTED_DATA_LEN_RANGE: CK_RV = 0x00000041;
pub const CKR_FUNCTION_NOT_SUPPORTED: CK_RV = 0x00000054;
pub const CKR_KEY_HANDLE_INVALID: CK_RV = 0x00000060;
pub const CKR_KEY_SIZE_RANGE: CK_RV = 0x00000062;
pub const CKR_KEY_TYPE_INCONSISTENT: CK_RV = 0x00000063;
pub const CKR_KEY_FUNCTION_NOT_PERMITTED: CK_RV = 0x00000068;
pub const CKR_KEY_UNEXTRACTABLE: CK_RV = 0x0000006A;
pub const CKR_MECHANISM_INVALID: CK_RV = 0x00000070;
pub const CKR_MECHANISM_PARAM_INVALID: CK_RV = 0x00000071;
pub const CKR_OBJECT_HANDLE_INVALID: CK_RV = 0x00000082;
pub const CKR_OPERATION_ACTIVE: CK_RV = 0x00000090;
pub const CKR_OPERATION_NOT_INITIALIZED: CK_RV = 0x00000091;
pub const CKR_SIGNATURE_INVALID: CK_RV = 0x000000C0;
pub const CKR_SIGNATURE_LEN_RANGE: CK_RV = 0x000000C1;
pub const CKR_TEMPLATE_INCOMPLETE: CK_RV = 0x000000D0;
pub const CKR_TEMPLATE_INCONSISTENT: CK_RV = 0x000000D1;
pub const CKR_RANDOM_NO_RNG: CK_RV = 0x00000121;
pub const CKR_DOMAIN_PARAMS_INVALID: CK_RV = 0x00000130;
pub const CKR_CURVE_NOT_SUPPORTED: CK_RV = 0x00000140;
pub const CKR_BUFFER_TOO_SMALL: CK_RV = 0x00000150;

/* Object classes */
pub const CKO_DATA: CK_OBJECT_CLASS = 0x00000000;
pub const CKO_CERTIFICATE: CK_OBJECT_CLASS = 0x00000001;
pub const CKO_PUBLIC_KEY: CK_OBJECT_CLASS = 0x00000002;
pub const CKO_PRIVATE_KEY: CK_OBJECT_CLASS = 0x00000003;
pub const CKO_SECRET_KEY: CK_OBJECT_CLASS = 0x00000004;

/* Key types */
pub const CKK_RSA: CK_KEY_TYPE = 0x00000000;
pub const CKK_DSA: CK_KEY_TYPE = 0x00000001;
pub const CKK_DH: CK_KEY_TYPE = 0x00000002;
pub const CKK_EC: CK_KEY_TYPE = 0x00000003;
pub const CKK_GENERIC_SECRET: CK_KEY_TYPE = 0x00000010;
pub const CKK_DES: CK_KEY_TYPE = 0x00000013;
pub const CKK_DES2: CK_KEY_TYPE = 0x00000014;
pub const CKK_DES3: CK_KEY_TYPE = 0x00000015;
pub const CKK_AES: CK_KEY_TYPE = 0x0000001F;
pub const CKK_CAMELLIA: CK_KEY_TYPE = 0x00000025;
pub const CKK_MD5_HMAC: CK_KEY_TYPE = 0x00000027;
pub const CKK_SHA_1_HMAC: CK_KEY_TYPE = 0x00000028;
pub const CKK_RIPEMD128_HMAC: CK_KEY_TYPE = 0x00000029;
pub const CKK_RIPEMD160_HMAC: CK_KEY_TYPE = 0x0000002A;
pub const CKK_SHA256_HMAC: CK_KEY_TYPE = 0x0000002B;
pub const CKK_SHA384_HMAC: CK_KEY_TYPE = 0x0000002C;
pub const CKK_SHA512_HMAC: CK_KEY_TYPE = 0x0000002D;
pub const CKK_SHA224_HMAC: CK_KEY_TYPE = 0x0000002E;
pub const CKK_GOSTR3411: CK_KEY_TYPE = 0x00000031;
pub const CKK_CHACHA20: CK_KEY_TYPE = 0x00000033;
pub const CKK_POLY1305: CK_KEY_TYPE = 0x00000034;
pub const CKK_SHA3_224_HMAC: CK_KEY_TYPE = 0x00000036;
pub const CKK_SHA3_256_HMAC: CK_KEY_TYPE = 0x00000037;
pub const CKK_SHA3_384_HMAC: CK_KEY_TYPE = 0x00000038;
pub const CKK_SHA3_512_HMAC: CK_KEY_TYPE = 0x00000039;
pub const CKK_BLAKE2B_160_HMAC: CK_KEY_TYPE = 0x0000003A;
pub const CKK_BLAKE2B_256_HMAC: CK_KEY_TYPE = 0x0000003B;
pub const CKK_BLAKE2B_384_HMAC: CK_KEY_TYPE = 0x0000003C;
pub const CKK_BLAKE2B_512_HMAC: CK_KEY_TYPE = 0x0000003D;
pub const CKK_SALSA20: CK_KEY_TYPE = 0x0000003E;
pub const CKK_EC_EDWARDS: CK_KEY_TYPE = 0x00000040;
pub const CKK_EC_MONTGOMERY: CK_KEY_TYPE = 0x00000041;
pub const CKK_HKDF: CK_KEY_TYPE = 0x00000042;
pub const CKK_SHA512_224_HMAC: CK_KEY_TYPE = 0x00000043;
pub const CKK_SHA512_256_HMAC: CK_KEY_TYPE = 0x00000044;
pub const CKK_SHA512_T_HMAC: CK_KEY_TYPE = 0x00000045;
pub const CKK_ML_KEM: CK_KEY_TYPE = 0x00000049;
pub const CKK_ML_DSA: CK_KEY_TYPE = 0x0000004A;
pub const CKK_SLH_DSA: CK_KEY_TYPE = 0x0000004B;

/* Attributes */
pub const CKA_CLASS: CK_ATTRIBUTE_TYPE = 0x00000000;
pub const CKA_TOKEN: CK_ATTRIBUTE_TYPE = 0x00000001;
pub const CKA_PRIVATE: CK_ATTRIBUTE_TYPE = 0x00000002;
pub const CKA_LABEL: CK_ATTRIBUTE_TYPE = 0x00000003;
pub const CKA_UNIQUE_ID: CK_ATTRIBUTE_TYPE = 0x00000004;
pub const CKA_APPLICATION: CK_ATTRIBUTE_TYPE = 0x00000010;
pub const CKA_VALUE: CK_ATTRIBUTE_TYPE = 0x00000011;
pub const CKA_CHECK_VALUE: CK_ATTRIBUTE_TYPE = 0x00000090;
pub const CKA_KEY_TYPE: CK_ATTRIBUTE_TYPE = 0x00000100;
pub const CKA_SUBJECT: CK_ATTRIBUTE_TYPE = 0x00000101;
pub const CKA_ID: CK_ATTRIBUTE_TYPE = 0x00000102;
pub const CKA_SENSITIVE: CK_ATTRIBUTE_TYPE = 0x00000103;
pub const CKA_ENCRYPT: CK_ATTRIBUTE_TYPE = 0x00000104;
pub const CKA_DECRYPT: CK_ATTRIBUTE_TYPE = 0x00000105;
pub const CKA_WRAP: CK_ATTRIBUTE_TYPE = 0x00000106;
pub const CKA_UNWRAP: CK_ATTRIBUTE_TYPE = 0x00000107;
pub const CKA_SIGN: CK_ATTRIBUTE_TYPE = 0x00000108;
pub const CKA_SIGN_RECOVER: CK_ATTRIBUTE_TYPE = 0x00000109;
pub const CKA_VERIFY: CK_ATTRIBUTE_TYPE = 0x0000010A;
pub const CKA_VERIFY_RECOVER: CK_ATTRIBUTE_TYPE = 0x0000010B;
pub const CKA_DERIVE: CK_ATTRIBUTE_TYPE = 0x0000010C;
pub const CKA_START_DATE: CK_ATTRIBUTE_TYPE = 0x00000110;
pub const CKA_END_DATE: CK_ATTRIBUTE_TYPE = 0x00000111;
pub const CKA_MODULUS: CK_ATTRIBUTE_TYPE = 0x00000120;
pub const CKA_MODULUS_BITS: CK_ATTRIBUTE_TYPE = 0x00000121;
pub const CKA_PUBLIC_EXPONENT: CK_ATTRIBUTE_TYPE = 0x00000122;
pub const CKA_PRIVATE_EXPONENT: CK_ATTRIBUTE_TYPE = 0x00000123;
pub const CKA_PRIME_1: CK_ATTRIBUTE_TYPE = 0x00000124;
pub const CKA_PRIME_2: CK_ATTRIBUTE_TYPE = 0x00000125;
pub const CKA_EXPONENT_1: CK_ATTRIBUTE_TYPE = 0x00000126;
pub const CKA_EXPONENT_2: CK_ATTRIBUTE_TYPE = 0x00000127;
pub const CKA_COEFFICIENT: CK_ATTRIBUTE_TYPE = 0x00000128;
pub const CKA_VALUE_LEN: CK_ATTRIBUTE_TYPE = 0x00000161;
pub const CKA_EXTRACTABLE: CK_ATTRIBUTE_TYPE = 0x00000162;
pub const CKA_LOCAL: CK_ATTRIBUTE_TYPE = 0x00000163;
pub const CKA_NEVER_EXTRACTABLE: CK_ATTRIBUTE_TYPE = 0x00000164;
pub const CKA_ALWAYS_SENSITIVE: CK_ATTRIBUTE_TYPE = 0x00000165;
pub const CKA_KEY_GEN_MECHANISM: CK_ATTRIBUTE_TYPE = 0x00000166;
pub const CKA_MODIFIABLE: CK_ATTRIBUTE_TYPE = 0x00000170;
pub const CKA_COPYABLE: CK_ATTRIBUTE_TYPE = 0x00000171;
pub const CKA_DESTROYABLE: CK_ATTRIBUTE_TYPE = 0x00000172;
pub const CKA_EC_PARAMS: CK_ATTRIBUTE_TYPE = 0x00000180;
pub const CKA_EC_POINT: CK_ATTRIBUTE_TYPE = 0x00000181;
pub const CKA_ALWAYS_AUTHENTICATE: CK_ATTRIBUTE_TYPE = 0x00000202;
pub const CKA_WRAP_WITH_TRUSTED: CK_ATTRIBUTE_TYPE = 0x00000210;
pub const CKA_PARAMETER_SET: CK_ATTRIBUTE_TYPE = 0x0000061D;
pub const CKA_ENCAPSULATE: CK_ATTRIBUTE_TYPE = 0x00000633;
pub const CKA_DECAPSULATE: CK_ATTRIBUTE_TYPE = 0x00000634;

/* Mechanisms */
pub const CKM_RSA_PKCS_KEY_PAIR_GEN: CK_MECHANISM_TYPE = 0x00000000;
pub const CKM_RSA_PKCS: CK_MECHANISM_TYPE = 0x00000001;
pub const CKM_RSA_9796: CK_MECHANISM_TYPE = 0x00000002;
pub const CKM_RSA_X_509: CK_MECHANISM_TYPE = 0x00000003;
pub const CKM_MD2_RSA_PKCS: CK_MECHANISM_TYPE = 0x00000004;
pub const CKM_MD5_RSA_PKCS: CK_MECHANISM_TYPE = 0x00000005;
pub const CKM_SHA1_RSA_PKCS: CK_MECHANISM_TYPE = 0x00000006;
pub const CKM_RIPEMD128_RSA_PKCS: CK_MECHANISM_TYPE = 0x00000007;
pub const CKM_RIPEMD160_RSA_PKCS: CK_MECHANISM_TYPE = 0x00000008;
pub const CKM_RSA_PKCS_OAEP: CK_MECHANISM_TYPE = 0x00000009;
pub const CKM_RSA_X9_31: CK_MECHANISM_TYPE = 0x0000000B;
pub const CKM_SHA1_RSA_X9_31: CK_MECHANISM_TYPE = 0x0000000C;
pub const CKM_RSA_PKCS_PSS: CK_MECHANISM_TYPE = 0x0000000D;
pub const CKM_SHA1_RSA_PKCS_PSS: CK_MECHANISM_TYPE = 0x0000000E;
pub const CKM_ML_KEM_KEY_PAIR_GEN: CK_MECHANISM_TYPE = 0x0000000F;
pub const CKM_ML_KEM: CK_MECHANISM_TYPE = 0x00000017;
pub const CKM_ML_DSA_KEY_PAIR_GEN: CK_MECHANISM_TYPE = 0x0000001C;
pub const CKM_ML_DSA: CK_MECHANISM_TYPE = 0x0000001D;
pub const CKM_HASH_ML_DSA: CK_MECHANISM_TYPE = 0x0000001F;
pub const CKM_HASH_ML_DSA_SHA224: CK_MECHANISM_TYPE = 0x00000023;
pub const CKM_HASH_ML_DSA_SHA256: CK_MECHANISM_TYPE = 0x00000024;
pub const CKM_HASH_ML_DSA_SHA384: CK_MECHANISM_TYPE = 0x00000025;
pub const CKM_HASH_ML_DSA_SHA512: CK_MECHANISM_TYPE = 0x00000026;
pub const CKM_HASH_ML_DSA_SHA3_224: CK_MECHANISM_TYPE = 0x00000027;
pub const CKM_HASH_ML_DSA_SHA3_256: CK_MECHANISM_TYPE = 0x00000028;
pub const CKM_HASH_ML_DSA_SHA3_384: CK_MECHANISM_TYPE = 0x00000029;
pub const CKM_HASH_ML_DSA_SHA3_512: CK_MECHANISM_TYPE = 0x0000002A;
pub const CKM_HASH_ML_DSA_SHAKE128: CK_MECHANISM_TYPE = 0x0000002B;
pub const CKM_HASH_ML_DSA_SHAKE256: CK_MECHANISM_TYPE = 0x0000002C;
pub const CKM_SLH_DSA_KEY_PAIR_GEN: CK_MECHANISM_TYPE = 0x0000002D;
pub const CKM_SLH_DSA: CK_MECHANISM_TYPE = 0x0000002E;
pub const CKM_HASH_SLH_DSA: CK_MECHANISM_TYPE = 0x00000034;
pub const CKM_HASH_SLH_DSA_SHA224: CK_MECHANISM_TYPE = 0x00000036;
pub const CKM_HASH_SLH_DSA_SHA256: CK_MECHANISM_TYPE = 0x00000037;
pub const CKM_HASH_SLH_DSA_SHA384: CK_MECHANISM_TYPE = 0x00000038;
pub const CKM_HASH_SLH_DSA_SHA512: CK_MECHANISM_TYPE = 0x00000039;
pub const CKM_HASH_SLH_DSA_SHA3_224: CK_MECHANISM_TYPE = 0x0000003A;
pub const CKM_HASH_SLH_DSA_SHA3_256: CK_MECHANISM_TYPE = 0x0000003B;
pub const CKM_HASH_SLH_DSA_SHA3_384: CK_MECHANISM_TYPE = 0x0000003C;
pub const CKM_HASH_SLH_DSA_SHA3_512: CK_MECHANISM_TYPE = 0x0000003D;
pub const CKM_HASH_SLH_DSA_SHAKE128: CK_MECHANISM_TYPE = 0x0000003E;
pub const CKM_HASH_SLH_DSA_SHAKE256: CK_MECHANISM_TYPE = 0x0000003F;
pub const CKM_SHA256_RSA_PKCS: CK_MECHANISM_TYPE = 0x00000040;
pub const CKM_SHA384_RSA_PKCS: CK_MECHANISM_TYPE = 0x00000041;
pub const CKM_SHA512_RSA_PKCS: CK_MECHANISM_TYPE = 0x00000042;
pub const CKM_SHA256_RSA_PKCS_PSS: CK_MECHANISM_TYPE = 0x00000043;
pub const CKM_SHA384_RSA_PKCS_PSS: CK_MECHANISM_TYPE = 0x00000044;
pub const CKM_SHA512_RSA_PKCS_PSS: CK_MECHANISM_TYPE = 0x00000045;
pub const CKM_SHA224_RSA_PKCS: CK_MECHANISM_TYPE = 0x00000046;
pub const CKM_SHA224_RSA_PKCS_PSS: CK_MECHANISM_TYPE = 0x00000047;
pub const CKM_SHA512_224: CK_MECHANISM_TYPE = 0x00000048;
pub const CKM_SHA512_224_HMAC: CK_MECHANISM_TYPE = 0x00000049;
pub const CKM_SHA512_224_HMAC_GENERAL: CK_MECHANISM_TYPE = 0x0000004A;
pub const CKM_SHA512_224_KEY_DERIVATION: CK_MECHANISM_TYPE = 0x0000004B;
pub const CKM_SHA512_256: CK_MECHANISM_TYPE = 0x0000004C;
pub const CKM_SHA512_256_HMAC: CK_MECHANISM_TYPE = 0x0000004D;
pub const CKM_SHA512_256_HMAC_GENERAL: CK_MECHANISM_TYPE = 0x0000004E;
pub const CKM_SHA512_256_KEY_DERIVATION: CK_MECHANISM_TYPE = 0x0000004F;
pub const CKM_SHA3_256_RSA_PKCS: CK_MECHANISM_TYPE = 0x00000060;
pub const CKM_SHA3_384_RSA_PKCS: CK_MECHANISM_TYPE = 0x00000061;
pub const CKM_SHA3_512_RSA_PKCS: CK_MECHANISM_TYPE = 0x00000062;
pub const CKM_SHA3_256_RSA_PKCS_PSS: CK_MECHANISM_TYPE = 0x00000063;
pub const CKM_SHA3_384_RSA_PKCS_PSS: CK_MECHANISM_TYPE = 0x00000064;
pub const CKM_SHA3_512_RSA_PKCS_PSS: CK_MECHANISM_TYPE = 0x00000065;
pub const CKM_SHA3_224_RSA_PKCS: CK_MECHANISM_TYPE = 0x00000066;
pub const CKM_SHA3_224_RSA_PKCS_PSS: CK_MECHANISM_TYPE = 0x00000067;
pub const CKM_MD2: CK_MECHANISM_TYPE = 0x00000200;
pub const CKM_MD2_HMAC: CK_MECHANISM_TYPE = 0x00000201;
pub const CKM_MD2_HMAC_GENERAL: CK_MECHANISM_TYPE = 0x00000202;
pub const CKM_MD5: CK_MECHANISM_TYPE = 0x00000210;
pub const CKM_MD5_HMAC: CK_MECHANISM_TYPE = 0x00000211;
pub const CKM_MD5_HMAC_GENERAL: CK_MECHANISM_TYPE = 0x00000212;
pub const CKM_SHA_1: CK_MECHANISM_TYPE = 0x00000220;
pub const CKM_SHA_1_HMAC: CK_MECHANISM_TYPE = 0x00000221;
pub const CKM_SHA_1_HMAC_GENERAL: CK_MECHANISM_TYPE = 0x00000222;
pub const CKM_RIPEMD128: CK_MECHANISM_TYPE = 0x00000230;
pub const CKM_RIPEMD128_HMAC: CK_MECHANISM_TYPE = 0x00000231;
pub const CKM_RIPEMD128_HMAC_GENERAL: CK_MECHANISM_TYPE = 0x00000232;
pub const CKM_RIPEMD160: CK_MECHANISM_TYPE = 0x00000240;
pub const CKM_RIPEMD160_HMAC: CK_MECHANISM_TYPE = 0x00000241;
pub const CKM_RIPEMD160_HMAC_GENERAL: CK_MECHANISM_TYPE = 0x00000242;
pub const CKM_SHA256: CK_MECHANISM_TYPE = 0x00000250;
pub const CKM_SHA256_HMAC: CK_MECHANISM_TYPE = 0x00000251;
pub const CKM_SHA256_HMAC_GENERAL: CK_MECHANISM_TYPE = 0x00000252;
pub const CKM_SHA224: CK_MECHANISM_TYPE = 0x00000255;
pub const CKM_SHA224_HMAC: CK_MECHANISM_TYPE = 0x00000256;
pub const CKM_SHA224_HMAC_GENERAL: CK_MECHANISM_TYPE = 0x00000257;
pub const CKM_SHA384: CK_MECHANISM_TYPE = 0x00000260;
pub const CKM_SHA384_HMAC: CK_MECHANISM_TYPE = 0x00000261;
pub const CKM_SHA384_HMAC_GENERAL: CK_MECHANISM_TYPE = 0x00000262;
pub const CKM_SHA512: CK_MECHANISM_TYPE = 0x00000270;
pub const CKM_SHA512_HMAC: CK_MECHANISM_TYPE = 0x00000271;
pub const CKM_SHA512_HMAC_GENERAL: CK_MECHANISM_TYPE = 0x00000272;
pub const CKM_SHA3_256: CK_MECHANISM_TYPE = 0x000002B0;
pub const CKM_SHA3_256_HMAC: CK_MECHANISM_TYPE = 0x000002B1;
pub const CKM_SHA3_256_HMAC_GENERAL: CK_MECHANISM_TYPE = 0x000002B2;
pub const CKM_SHA3_224: CK_MECHANISM_TYPE = 0x000002B5;
pub const CKM_SHA3_224_HMAC: CK_MECHANISM_TYPE = 0x000002B6;
pub const CKM_SHA3_224_HMAC_GENERAL: CK_MECHANISM_TYPE = 0x000002B7;
pub const CKM_SHA3_384: CK_MECHANISM_TYPE = 0x000002C0;
pub const CKM_SHA3_384_HMAC: CK_MECHANISM_TYPE = 0x000002C1;
pub const CKM_SHA3_384_HMAC_GENERAL: CK_MECHANISM_TYPE = 0x000002C2;
pub const CKM_SHA3_512: CK_MECHANISM_TYPE = 0x000002D0;
pub const CKM_SHA3_512_HMAC: CK_MECHANISM_TYPE = 0x000002D1;
pub const CKM_SHA3_512_HMAC_GENERAL: CK_MECHANISM_TYPE = 0x000002D2;
pub const CKM_CONCATENATE_BASE_AND_KEY: CK_MECHANISM_TYPE = 0x00000360;
pub const CKM_CONCATENATE_BASE_AND_DATA: CK_MECHANISM_TYPE = 0x00000362;
pub const CKM_CONCATENATE_DATA_AND_BASE: CK_MECHANISM_TYPE = 0x00000363;
pub const CKM_XOR_BASE_AND_DATA: CK_MECHANISM_TYPE = 0x00000364;
pub const CKM_EXTRACT_KEY_FROM_KEY: CK_MECHANISM_TYPE = 0x00000365;
pub const CKM_MD5_KEY_DERIVATION: CK_MECHANISM_TYPE = 0x00000390;
pub const CKM_MD2_KEY_DERIVATION: CK_MECHANISM_TYPE = 0x00000391;
pub const CKM_SHA1_KEY_DERIVATION: CK_MECHANISM_TYPE = 0x00000392;
pub const CKM_SHA256_KEY_DERIVATION: CK_MECHANISM_TYPE = 0x00000393;
pub const CKM_SHA384_KEY_DERIVATION: CK_MECHANISM_TYPE = 0x00000394;
pub const CKM_SHA512_KEY_DERIVATION: CK_MECHANISM_TYPE = 0x00000395;
pub const CKM_SHA224_KEY_DERIVATION: CK_MECHANISM_TYPE = 0x00000396;
pub const CKM_SHA3_256_KEY_DERIVATION: CK_MECHANISM_TYPE = 0x00000397;
pub const CKM_SHA3_224_KEY_DERIVATION: CK_MECHANISM_TYPE = 0x00000398;
pub const CKM_SHA3_384_KEY_DERIVATION: CK_MECHANISM_TYPE = 0x00000399;
pub const CKM_SHA3_512_KEY_DERIVATION: CK_MECHANISM_TYPE = 0x0000039A;
pub const CKM_SHAKE_128_KEY_DERIVATION: CK_MECHANISM_TYPE = 0x0000039B;
pub const CKM_SHAKE_256_KEY_DERIVATION: CK_MECHANISM_TYPE = 0x0000039C;
pub const CKM_CAMELLIA_KEY_GEN: CK_MECHANISM_TYPE = 0x00000550;
pub const CKM_CAMELLIA_ECB: CK_MECHANISM_TYPE = 0x00000551;
pub const CKM_CAMELLIA_CBC: CK_MECHANISM_TYPE = 0x00000552;
pub const CKM_CAMELLIA_MAC: CK_MECHANISM_TYPE = 0x00000553;
pub const CKM_CAMELLIA_MAC_GENERAL: CK_MECHANISM_TYPE = 0x00000554;
pub const CKM_CAMELLIA_ECB_ENCRYPT_DATA: CK_MECHANISM_TYPE = 0x00000556;
pub const CKM_CAMELLIA_CBC_ENCRYPT_DATA: CK_MECHANISM_TYPE = 0x00000557;
pub const CKM_EC_KEY_PAIR_GEN: CK_MECHANISM_TYPE = 0x00001040;
pub const CKM_ECDSA: CK_MECHANISM_TYPE = 0x00001041;
pub const CKM_ECDSA_SHA1: CK_MECHANISM_TYPE = 0x00001042;
pub const CKM_ECDSA_SHA224: CK_MECHANISM_TYPE = 0x00001043;
pub const CKM_ECDSA_SHA256: CK_MECHANISM_TYPE = 0x00001044;
pub const CKM_ECDSA_SHA384: CK_MECHANISM_TYPE = 0x00001045;
pub const CKM_ECDSA_SHA512: CK_MECHANISM_TYPE = 0x00001046;
pub const CKM_ECDSA_SHA3_224: CK_MECHANISM_TYPE = 0x00001047;
pub const CKM_ECDSA_SHA3_256: CK_MECHANISM_TYPE = 0x00001048;
pub const CKM_ECDSA_SHA3_384: CK_MECHANISM_TYPE = 0x00001049;
pub const CKM_ECDSA_SHA3_512: CK_MECHANISM_TYPE = 0x0000104A;
pub const CKM_ECDH1_DERIVE: CK_MECHANISM_TYPE = 0x00001050;
pub const CKM_ECDH1_COFACTOR_DERIVE: CK_MECHANISM_TYPE = 0x00001051;
pub const CKM_EC_EDWARDS_KEY_PAIR_GEN: CK_MECHANISM_TYPE = 0x00001055;
pub const CKM_EC_MONTGOMERY_KEY_PAIR_GEN: CK_MECHANISM_TYPE = 0x00001056;
pub const CKM_EDDSA: CK_MECHANISM_TYPE = 0x00001057;
pub const CKM_AES_KEY_GEN: CK_MECHANISM_TYPE = 0x00001080;
pub const CKM_AES_ECB: CK_MECHANISM_TYPE = 0x00001081;
pub const CKM_AES_CBC: CK_MECHANISM_TYPE = 0x00001082;
pub const CKM_AES_CMAC_GENERAL: CK_MECHANISM_TYPE = 0x00001089;
pub const CKM_AES_CMAC: CK_MECHANISM_TYPE = 0x0000108A;
pub const CKM_AES_ECB_ENCRYPT_DATA: CK_MECHANISM_TYPE = 0x00001104;
pub const CKM_AES_CBC_ENCRYPT_DATA: CK_MECHANISM_TYPE = 0x00001105;
pub const CKM_GOSTR3411: CK_MECHANISM_TYPE = 0x00001210;
pub const CKM_GOSTR3411_HMAC: CK_MECHANISM_TYPE = 0x00001211;
pub const CKM_POLY1305_KEY_GEN: CK_MECHANISM_TYPE = 0x00001227;
pub const CKM_POLY1305: CK_MECHANISM_TYPE = 0x00001228;
pub const CKM_BLAKE2B_160: CK_MECHANISM_TYPE = 0x0000400C;
pub const CKM_BLAKE2B_160_HMAC: CK_MECHANISM_TYPE = 0x0000400D;
pub const CKM_BLAKE2B_160_HMAC_GENERAL: CK_MECHANISM_TYPE = 0x0000400E;
pub const CKM_BLAKE2B_160_KEY_DERIVE: CK_MECHANISM_TYPE = 0x0000400F;
pub const CKM_BLAKE2B_256: CK_MECHANISM_TYPE = 0x00004011;
pub const CKM_BLAKE2B_256_HMAC: CK_MECHANISM_TYPE = 0x00004012;
pub const CKM_BLAKE2B_256_HMAC_GENERAL: CK_MECHANISM_TYPE = 0x00004013;
pub const CKM_BLAKE2B_256_KEY_DERIVE: CK_MECHANISM_TYPE = 0x00004014;
pub const CKM_BLAKE2B_384: CK_MECHANISM_TYPE = 0x00004016;
pub const CKM_BLAKE2B_384_HMAC: CK_MECHANISM_TYPE = 0x00004017;
pub const CKM_BLAKE2B_384_HMAC_GENERAL: CK_MECHANISM_TYPE = 0x00004018;
pub const CKM_BLAKE2B_384_KEY_DERIVE: CK_MECHANISM_TYPE = 0x00004019;
pub const CKM_BLAKE2B_512: CK_MECHANISM_TYPE = 0x0000401B;
pub const CKM_BLAKE2B_512_HMAC: CK_MECHANISM_TYPE = 0x0000401C;
pub const CKM_BLAKE2B_512_HMAC_GENERAL: CK_MECHANISM_TYPE = 0x0000401D;
pub const CKM_BLAKE2B_512_KEY_DERIVE: CK_MECHANISM_TYPE = 0x0000401E;
pub const CKM_HKDF_DERIVE: CK_MECHANISM_TYPE = 0x0000402A;
pub const CKM_HKDF_DATA: CK_MECHANISM_TYPE = 0x0000402B;
pub const CKM_HKDF_KEY_GEN: CK_MECHANISM_TYPE = 0x0000402C;

/* Mechanism info flags */
pub const CKF_HW: CK_FLAGS = 0x00000001;
pub const CKF_ENCRYPT: CK_FLAGS = 0x00000100;
pub const CKF_DECRYPT: CK_FLAGS = 0x00000200;
pub const CKF_DIGEST: CK_FLAGS = 0x00000400;
pub const CKF_SIGN: CK_FLAGS = 0x00000800;
pub const CKF_SIGN_RECOVER: CK_FLAGS = 0x00001000;
pub const CKF_VERIFY: CK_FLAGS = 0x00002000;
pub const CKF_VERIFY_RECOVER: CK_FLAGS = 0x00004000;
pub const CKF_GENERATE: CK_FLAGS = 0x00008000;
pub const CKF_GENERATE_KEY_PAIR: CK_FLAGS = 0x00010000;
pub const CKF_WRAP: CK_FLAGS = 0x00020000;
pub const CKF_UNWRAP: CK_FLAGS = 0x00040000;
pub const CKF_DERIVE: CK_FLAGS = 0x00080000;
pub const CKF_ENCAPSULATE: CK_FLAGS = 0x10000000;
pub const CKF_DECAPSULATE: CK_FLAGS = 0x20000000;

/* HKDF salt types */
pub const CKF_HKDF_SALT_NULL: CK_FLAGS = 0x00000001;
pub const CKF_HKDF_SALT_DATA: CK_FLAGS = 0x00000002;
pub const CKF_HKDF_SALT_KEY: CK_FLAGS = 0x00000004;

/* EC key derivation functions */
pub const CKD_NULL: CK_EC_KDF_TYPE = 0x00000001;
pub const CKD_SHA1_KDF: CK_EC_KDF_TYPE = 0x00000002;
pub const CKD_SHA224_KDF: CK_EC_KDF_TYPE = 0x00000005;
pub const CKD_SHA256_KDF: CK_EC_KDF_TYPE = 0x00000006;
pub const CKD_SHA384_KDF: CK_EC_KDF_TYPE = 0x00000007;
pub const CKD_SHA512_KDF: CK_EC_KDF_TYPE = 0x00000008;
pub const CKD_SHA3_224_KDF: CK_EC_KDF_TYPE = 0x0000000A;
pub const CKD_SHA3_256_KDF: CK_EC_KDF_TYPE = 0x0000000B;
pub const CKD_SHA3_384_KDF: CK_EC_KDF_TYPE = 0x0000000C;
pub const CKD_SHA3_512_KDF: CK_EC_KDF_TYPE = 0x0000000D;
pub const CKD_BLAKE2B_160_KDF: CK_EC_KDF_TYPE = 0x00000017;
pub const CKD_BLAKE2B_256_KDF: CK_EC_KDF_TYPE = 0x00000018;
pub const CKD_BLAKE2B_384_KDF: CK_EC_KDF_TYPE = 0x00000019;
pub const CKD_BLAKE2B_512_KDF: CK_EC_KDF_TYPE = 0x0000001A;

/* RSA MGF1 functions */
pub const CKG_MGF1_SHA1: CK_RSA_PKCS_MGF_TYPE = 0x00000001;
pub const CKG_MGF1_SHA256: CK_RSA_PKCS_MGF_TYPE = 0x00000002;
pub const CKG_MGF1_SHA384: CK_RSA_PKCS_MGF_TYPE = 0x00000003;
pub const CKG_MGF1_SHA512: CK_RSA_PKCS_MGF_TYPE = 0x00000004;
pub const CKG_MGF1_SHA224: CK_RSA_PKCS_MGF_TYPE = 0x00000005;
pub const CKG_MGF1_SHA3_224: CK_RSA_PKCS_MGF_TYPE = 0x00000006;
pub const CKG_MGF1_SHA3_256: CK_RSA_PKCS_MGF_TYPE = 0x00000007;
pub const CKG_MGF1_SHA3_384: CK_RSA_PKCS_MGF_TYPE = 0x00000008;
pub const CKG_MGF1_SHA3_512: CK_RSA_PKCS_MGF_TYPE = 0x00000009;

/* OAEP encoding parameter source */
pub const CKZ_DATA_SPECIFIED: CK_RSA_PKCS_OAEP_SOURCE_TYPE = 0x00000001;

/* Hedge variants for PQC signatures */
pub const CKH_HEDGE_PREFERRED: CK_HEDGE_TYPE = 0x00000000;
pub const CKH_HEDGE_REQUIRED: CK_HEDGE_TYPE = 0x00000001;
pub const CKH_DETERMINISTIC_REQUIRED: CK_HEDGE_TYPE = 0x00000002;

/* ML-KEM parameter sets */
pub const CKP_ML_KEM_512: CK_ML_KEM_PARAMETER_SET_TYPE = 0x00000001;
pub const CKP_ML_KEM_768: CK_ML_KEM_PARAMETER_SET_TYPE = 0x00000002;
pub const CKP_ML_KEM_1024: CK_ML_KEM_PARAMETER_SET_TYPE = 0x00000003;

/* ML-DSA parameter sets */
pub const CKP_ML_DSA_44: CK_ML_DSA_PARAMETER_SET_TYPE = 0x00000001;
pub const CKP_ML_DSA_65: CK_ML_DSA_PARAMETER_SET_TYPE = 0x00000002;
pub const CKP_ML_DSA_87: CK_ML_DSA_PARAMETER_SET_TYPE = 0x00000003;

/* SLH-DSA parameter sets */
pub const CKP_SLH_DSA_SHA2_128S: CK_SLH_DSA_PARAMETER_SET_TYPE = 0x00000001;
pub const CKP_SLH_DSA_SHAKE_128S: CK_SLH_DSA_PARAMETER_SET_TYPE = 0x00000002;
pub const CKP_SLH_DSA_SHA2_128F: CK_SLH_DSA_PARAMETER_SET_TYPE = 0x00000003;
pub const CKP_SLH_DSA_SHAKE_128F: CK_SLH_DSA_PARAMETER_SET_TYPE = 0x00000004;
pub const CKP_SLH_DSA_SHA2_192S: CK_SLH_DSA_PARAMETER_SET_TYPE = 0x00000005;
pub const CKP_SLH_DSA_SHAKE_192S: CK_SLH_DSA_PARAMETER_SET_TYPE = 0x00000006;
pub const CKP_SLH_DSA_SHA2_192F: CK_SLH_DSA_PARAMETER_SET_TYPE = 0x00000007;
pub const CKP_SLH_DSA_SHAKE_192F: CK_SLH_DSA_PARAMETER_SET_TYPE = 0x00000008;
pub const CKP_SLH_DSA_SHA2_256S: CK_SLH_DSA_PARAMETER_SET_TYPE = 0x00000009;
pub const CKP_SLH_DSA_SHAKE_256S: CK_SLH_DSA_PARAMETER_SET_TYPE = 0x0000000A;
pub const CKP_SLH_DSA_SHA2_256F: CK_SLH_DSA_PARAMETER_SET_TYPE = 0x0000000B;
pub const CKP_SLH_DSA_SHAKE_256F: CK_SLH_DSA_PARAMETER_SET_TYPE = 0x0000000C;
