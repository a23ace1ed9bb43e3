// Copyright 2025 Simo Sorce, Jakub Jelen
// See LICENSE.txt file for terms

//! This module provides the curve catalog shared by the EC, Edwards and
//! Montgomery key families, and the helpers to move points between their
//! raw and DER encoded forms.

use crate::error::Result;
use crate::kasn1::oid::*;
use crate::kasn1::{decode_octet_string, encode_octet_string, ECParameters};
use crate::pkcs11::*;

/* Bit sizes for curves */
pub const BITS_SECP256R1: usize = 256;
pub const BITS_SECP384R1: usize = 384;
pub const BITS_SECP521R1: usize = 521;
pub const BITS_ED25519: usize = 256;
pub const BITS_ED448: usize = 456;
pub const BITS_X25519: usize = 256;
pub const BITS_X448: usize = 448;

const EC_POINT_BYTES_SECP256R1: usize = 2 * ((BITS_SECP256R1 + 7) / 8) + 1;
const EC_POINT_BYTES_SECP384R1: usize = 2 * ((BITS_SECP384R1 + 7) / 8) + 1;
const EC_POINT_BYTES_SECP521R1: usize = 2 * ((BITS_SECP521R1 + 7) / 8) + 1;
const EC_POINT_BYTES_ED25519: usize = (BITS_ED25519 + 7) / 8;
const EC_POINT_BYTES_ED448: usize = (BITS_ED448 + 7) / 8;
const EC_POINT_BYTES_X25519: usize = (BITS_X25519 + 7) / 8;
const EC_POINT_BYTES_X448: usize = (BITS_X448 + 7) / 8;

/* Curve names as used in CurveName PrinableString */
pub const PRIME256V1: &str = "prime256v1";
pub const SECP384R1: &str = "secp384r1";
pub const SECP521R1: &str = "secp521r1";
pub const EDWARDS25519: &str = "edwards25519";
pub const EDWARDS448: &str = "edwards448";
pub const CURVE25519: &str = "curve25519";
pub const CURVE448: &str = "curve448";

/// The curves known to the key object model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Curve {
    P256,
    P384,
    P521,
    Ed25519,
    Ed448,
    X25519,
    X448,
}

impl Curve {
    /// Maps a curve OID to a curve
    pub fn from_oid(oid: &asn1::ObjectIdentifier) -> Result<Curve> {
        match oid {
            &EC_SECP256R1 => Ok(Curve::P256),
            &EC_SECP384R1 => Ok(Curve::P384),
            &EC_SECP521R1 => Ok(Curve::P521),
            &ED25519_OID => Ok(Curve::Ed25519),
            &ED448_OID => Ok(Curve::Ed448),
            &X25519_OID => Ok(Curve::X25519),
            &X448_OID => Ok(Curve::X448),
            _ => Err(CKR_CURVE_NOT_SUPPORTED)?,
        }
    }

    /// Maps a standard curve name to a curve
    pub fn from_name(name: &str) -> Result<Curve> {
        match name {
            PRIME256V1 => Ok(Curve::P256),
            SECP384R1 => Ok(Curve::P384),
            SECP521R1 => Ok(Curve::P521),
            EDWARDS25519 => Ok(Curve::Ed25519),
            EDWARDS448 => Ok(Curve::Ed448),
            CURVE25519 => Ok(Curve::X25519),
            CURVE448 => Ok(Curve::X448),
            _ => Err(CKR_CURVE_NOT_SUPPORTED)?,
        }
    }

    /// Parses the DER encoded content of a `CKA_EC_PARAMS` attribute
    pub fn from_ec_params(params: &[u8]) -> Result<Curve> {
        match asn1::parse_single::<ECParameters>(params)? {
            ECParameters::OId(oid) => Curve::from_oid(&oid),
            ECParameters::CurveName(c) => Curve::from_name(c.as_str()),
            ECParameters::ImplicitlyCA(_) => Err(CKR_CURVE_NOT_SUPPORTED)?,
        }
    }

    /// Returns the OID identifying the curve
    pub fn oid(&self) -> asn1::ObjectIdentifier {
        match self {
            Curve::P256 => EC_SECP256R1,
            Curve::P384 => EC_SECP384R1,
            Curve::P521 => EC_SECP521R1,
            Curve::Ed25519 => ED25519_OID,
            Curve::Ed448 => ED448_OID,
            Curve::X25519 => X25519_OID,
            Curve::X448 => X448_OID,
        }
    }

    /// Returns the DER encoding of the curve suitable for `CKA_EC_PARAMS`
    pub fn ec_params(&self) -> Result<Vec<u8>> {
        Ok(asn1::write_single(&ECParameters::OId(self.oid()))?)
    }

    /// The PKCS#11 key type of keys defined over this curve
    pub fn key_type(&self) -> CK_KEY_TYPE {
        match self {
            Curve::P256 | Curve::P384 | Curve::P521 => CKK_EC,
            Curve::Ed25519 | Curve::Ed448 => CKK_EC_EDWARDS,
            Curve::X25519 | Curve::X448 => CKK_EC_MONTGOMERY,
        }
    }

    /// Size of the curve in bits
    pub fn bits(&self) -> usize {
        match self {
            Curve::P256 => BITS_SECP256R1,
            Curve::P384 => BITS_SECP384R1,
            Curve::P521 => BITS_SECP521R1,
            Curve::Ed25519 => BITS_ED25519,
            Curve::Ed448 => BITS_ED448,
            Curve::X25519 => BITS_X25519,
            Curve::X448 => BITS_X448,
        }
    }

    /// Size in bytes of private scalars
    pub fn key_size(&self) -> usize {
        match self {
            Curve::X448 => EC_POINT_BYTES_X448,
            _ => (self.bits() + 7) / 8,
        }
    }

    /// Size in bytes of the raw public point, uncompressed for
    /// Weierstrass curves
    pub fn point_size(&self) -> usize {
        match self {
            Curve::P256 => EC_POINT_BYTES_SECP256R1,
            Curve::P384 => EC_POINT_BYTES_SECP384R1,
            Curve::P521 => EC_POINT_BYTES_SECP521R1,
            Curve::Ed25519 => EC_POINT_BYTES_ED25519,
            Curve::Ed448 => EC_POINT_BYTES_ED448,
            Curve::X25519 => EC_POINT_BYTES_X25519,
            Curve::X448 => EC_POINT_BYTES_X448,
        }
    }

    /// Size in bytes of the DER OCTET STRING holding a public point
    pub fn der_point_size(&self) -> usize {
        let len = self.point_size();
        match len {
            0..=127 => len + 2,
            128..=255 => len + 3,
            _ => len + 4,
        }
    }
}

/// Returns the raw point from either its raw or its DER OCTET STRING
/// encoding, checking the size matches the curve
pub fn decode_point(curve: Curve, data: &[u8]) -> Result<Vec<u8>> {
    let size = curve.point_size();
    if data.len() == size {
        match curve.key_type() {
            CKK_EC => {
                /* only uncompressed points are accepted */
                if data[0] == 0x04 {
                    return Ok(data.to_vec());
                }
            }
            _ => return Ok(data.to_vec()),
        }
    }
    let raw = match decode_octet_string(data) {
        Ok(r) => r,
        Err(_) => return Err(CKR_ARGUMENTS_BAD)?,
    };
    if raw.len() != size {
        return Err(CKR_ARGUMENTS_BAD)?;
    }
    Ok(raw)
}

/// Returns the DER OCTET STRING encoding of a raw point
pub fn encode_point(point: &[u8]) -> Result<Vec<u8>> {
    encode_octet_string(point)
}

/// Returns the encoding used to store the point in `CKA_EC_POINT`.
/// CKK_EC points are DER encoded, the others are stored raw
pub fn point_to_attr(curve: Curve, point: &[u8]) -> Result<Vec<u8>> {
    match curve.key_type() {
        CKK_EC => encode_point(point),
        _ => Ok(point.to_vec()),
    }
}
