// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

use crate::mechanism::Mechanisms;

#[cfg(feature = "cmac")]
use crate::cmac;

#[cfg(feature = "ecdsa")]
use crate::ecc;

#[cfg(feature = "ecdh")]
use crate::ecdh;

#[cfg(feature = "eddsa")]
use crate::eddsa;

#[cfg(feature = "simplekdf")]
use crate::encdata;

#[cfg(feature = "hash")]
use crate::hash;

#[cfg(feature = "hkdf")]
use crate::hkdf;

#[cfg(feature = "hmac")]
use crate::hmac;

#[cfg(feature = "mldsa")]
use crate::mldsa;

#[cfg(feature = "mlkem")]
use crate::mlkem;

#[cfg(feature = "poly1305")]
use crate::poly1305;

#[cfg(feature = "rsa")]
use crate::rsa;

#[cfg(feature = "simplekdf")]
use crate::simplekdf;

#[cfg(feature = "slhdsa")]
use crate::slhdsa;

/// Registers the mechanisms of every enabled algorithm family
pub fn register_all(mechs: &mut Mechanisms) {
    #[cfg(feature = "cmac")]
    cmac::register(mechs);

    #[cfg(feature = "ecdsa")]
    ecc::register(mechs);

    #[cfg(feature = "ecdh")]
    ecdh::register(mechs);

    #[cfg(feature = "eddsa")]
    eddsa::register(mechs);

    #[cfg(feature = "simplekdf")]
    encdata::register(mechs);

    #[cfg(feature = "hash")]
    hash::register(mechs);

    #[cfg(feature = "hkdf")]
    hkdf::register(mechs);

    #[cfg(feature = "hmac")]
    hmac::register(mechs);

    #[cfg(feature = "mldsa")]
    mldsa::register(mechs);

    #[cfg(feature = "mlkem")]
    mlkem::register(mechs);

    #[cfg(feature = "poly1305")]
    poly1305::register(mechs);

    #[cfg(feature = "rsa")]
    rsa::register(mechs);

    #[cfg(feature = "simplekdf")]
    simplekdf::register(mechs);

    #[cfg(feature = "slhdsa")]
    slhdsa::register(mechs);
}
