// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! Error type shared by every layer of the mechanism core.
//!
//! Every failure carries a PKCS#11 return code ([CK_RV]). Lower level
//! failures (parameter decoding, ASN.1 parsing, primitive engines) are
//! retained as the `origin` of the error so they can be logged.

use std::error;
use std::fmt;

use crate::pkcs11::*;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// The error returned by all core operations
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    origin: Option<Box<dyn error::Error + Send + Sync>>,
    errmsg: Option<String>,
    ckrv: CK_RV,
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[non_exhaustive]
pub enum ErrorKind {
    /* A Cryptoki-style error, see ckrv Error field */
    CkError,
    /* The attribute was not found, see errmsg */
    AttributeNotFound,
    /* Other error, see origin */
    Nested,
}

impl Error {
    pub fn ck_rv(ckrv: CK_RV) -> Error {
        Error {
            kind: ErrorKind::CkError,
            origin: None,
            errmsg: None,
            ckrv: ckrv,
        }
    }

    pub fn ck_rv_from_error<E>(ckrv: CK_RV, error: E) -> Error
    where
        E: Into<Box<dyn error::Error + Send + Sync>>,
    {
        Error {
            kind: ErrorKind::CkError,
            origin: Some(error.into()),
            errmsg: None,
            ckrv: ckrv,
        }
    }

    pub fn ck_rv_with_errmsg(ckrv: CK_RV, errmsg: String) -> Error {
        Error {
            kind: ErrorKind::CkError,
            origin: None,
            errmsg: Some(errmsg),
            ckrv: ckrv,
        }
    }

    pub fn not_found(errmsg: String) -> Error {
        Error {
            kind: ErrorKind::AttributeNotFound,
            origin: None,
            errmsg: Some(errmsg),
            ckrv: CKR_GENERAL_ERROR,
        }
    }

    pub fn other_error<E>(error: E) -> Error
    where
        E: Into<Box<dyn error::Error + Send + Sync>>,
    {
        Error {
            kind: ErrorKind::Nested,
            origin: Some(error.into()),
            errmsg: None,
            ckrv: CKR_GENERAL_ERROR,
        }
    }

    /// Reports an internal invariant violation.
    ///
    /// These are programming errors, they abort the current operation
    /// with `CKR_GENERAL_ERROR` and are always logged.
    pub fn invariant(errmsg: String) -> Error {
        log::error!("invariant violation: {}", errmsg);
        Error::ck_rv_with_errmsg(CKR_GENERAL_ERROR, errmsg)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn rv(&self) -> CK_RV {
        self.ckrv
    }
}

macro_rules! rv_names {
    ($rv:expr; $($name:ident),* $(,)?) => {
        match $rv {
            $($name => stringify!($name),)*
            _ => "CKR_VENDOR_DEFINED",
        }
    };
}

/// Maps a return code to its symbolic name
pub fn rv_to_name(rv: CK_RV) -> &'static str {
    rv_names!(rv;
        CKR_OK,
        CKR_GENERAL_ERROR,
        CKR_FUNCTION_FAILED,
        CKR_ARGUMENTS_BAD,
        CKR_ATTRIBUTE_TYPE_INVALID,
        CKR_ATTRIBUTE_VALUE_INVALID,
        CKR_DATA_INVALID,
        CKR_DATA_LEN_RANGE,
        CKR_ENCRYPTED_DATA_INVALID,
        CKR_ENCRYPTED_DATA_LEN_RANGE,
        CKR_KEY_HANDLE_INVALID,
        CKR_KEY_SIZE_RANGE,
        CKR_KEY_TYPE_INCONSISTENT,
        CKR_KEY_FUNCTION_NOT_PERMITTED,
        CKR_MECHANISM_INVALID,
        CKR_MECHANISM_PARAM_INVALID,
        CKR_OBJECT_HANDLE_INVALID,
        CKR_OPERATION_NOT_INITIALIZED,
        CKR_SIGNATURE_INVALID,
        CKR_SIGNATURE_LEN_RANGE,
        CKR_TEMPLATE_INCONSISTENT,
        CKR_CURVE_NOT_SUPPORTED,
    )
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            ErrorKind::CkError => {
                if let Some(ref e) = self.errmsg {
                    write!(f, "{}: {}", rv_to_name(self.ckrv), e)
                } else if let Some(ref o) = self.origin {
                    write!(f, "{}: {}", rv_to_name(self.ckrv), o)
                } else {
                    write!(f, "{}", rv_to_name(self.ckrv))
                }
            }
            ErrorKind::AttributeNotFound => match self.errmsg {
                Some(ref e) => write!(f, "attribute not found: {}", e),
                None => write!(f, "attribute not found"),
            },
            ErrorKind::Nested => match self.origin {
                Some(ref o) => o.fmt(f),
                None => write!(f, "{}", rv_to_name(self.ckrv)),
            },
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self.origin {
            Some(ref o) => Some(o.as_ref()),
            None => None,
        }
    }
}

impl From<CK_RV> for Error {
    fn from(ckrv: CK_RV) -> Error {
        Error::ck_rv(ckrv)
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Error {
        Error::other_error(error)
    }
}

impl From<std::num::TryFromIntError> for Error {
    fn from(error: std::num::TryFromIntError) -> Error {
        Error::other_error(error)
    }
}

impl From<std::array::TryFromSliceError> for Error {
    fn from(error: std::array::TryFromSliceError) -> Error {
        Error::other_error(error)
    }
}

impl From<bincode::Error> for Error {
    fn from(error: bincode::Error) -> Error {
        Error::ck_rv_from_error(CKR_MECHANISM_PARAM_INVALID, error)
    }
}

impl From<asn1::ParseError> for Error {
    fn from(error: asn1::ParseError) -> Error {
        Error::ck_rv_with_errmsg(
            CKR_ATTRIBUTE_VALUE_INVALID,
            format!("ASN.1 parse error: {}", error),
        )
    }
}

impl From<asn1::WriteError> for Error {
    fn from(_: asn1::WriteError) -> Error {
        Error::invariant("ASN.1 encoding failed".to_string())
    }
}

#[cfg(feature = "rsa")]
impl From<rsa::Error> for Error {
    fn from(error: rsa::Error) -> Error {
        Error::other_error(error)
    }
}

/// Maps the error of a foreign `Result` to the given return code,
/// keeping the original error as origin
#[macro_export]
macro_rules! map_err {
    ($map:expr, $err:expr) => {{
        $map.map_err(|e| $crate::error::Error::ck_rv_from_error($err, e))
    }};
}
