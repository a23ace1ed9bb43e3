// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! This module provides helpers to (de)serialize the few ASN.1 structures
//! the mechanism core deals with, using DER (Distinguished Encoding Rules)
//! through the [asn1] crate.

use crate::error::Result;

pub mod oid;

/// Defined in ANSI X9.62
///
/// This structure has been modified to remove the CHOICE of explicit
/// parameters
#[derive(asn1::Asn1Read, asn1::Asn1Write)]
pub enum ECParameters<'a> {
    /// Aka as namedCurve, is an oid that identifies the curve
    OId(asn1::ObjectIdentifier),

    /// Aka implicitCurve, indicates that the parameters are defined out
    /// of band
    ///
    /// Should never be used
    ImplicitlyCA(asn1::Null),

    /// Identifies the curve via its standard printable name
    CurveName(asn1::PrintableString<'a>),
}

/// The algorithm identifier used inside a [DigestInfo]
#[derive(asn1::Asn1Read, asn1::Asn1Write)]
pub struct DigestAlgorithmIdentifier {
    pub algorithm: asn1::ObjectIdentifier,
    pub parameters: Option<asn1::Null>,
}

/// PKCS#1 DigestInfo, defined in
/// [RFC 8017](https://www.rfc-editor.org/rfc/rfc8017#section-9.2)
#[derive(asn1::Asn1Read, asn1::Asn1Write)]
pub struct DigestInfo<'a> {
    pub digest_algorithm: DigestAlgorithmIdentifier,
    pub digest: &'a [u8],
}

/// Encodes a digest value in a DER DigestInfo structure
pub fn encode_digest_info(
    algorithm: &asn1::ObjectIdentifier,
    digest: &[u8],
) -> Result<Vec<u8>> {
    let info = DigestInfo {
        digest_algorithm: DigestAlgorithmIdentifier {
            algorithm: algorithm.clone(),
            parameters: Some(()),
        },
        digest: digest,
    };
    Ok(asn1::write_single(&info)?)
}

/// Encodes a byte buffer as a DER OCTET STRING
pub fn encode_octet_string(data: &[u8]) -> Result<Vec<u8>> {
    Ok(asn1::write_single(&data)?)
}

/// Decodes a DER OCTET STRING returning the contained bytes
pub fn decode_octet_string(der: &[u8]) -> Result<Vec<u8>> {
    let octet = asn1::parse_single::<&[u8]>(der)?;
    Ok(octet.to_vec())
}
