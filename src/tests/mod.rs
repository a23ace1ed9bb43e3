// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

use super::*;
use hex;

pub use crate::attribute::Attribute;
pub use crate::config::HedgePreference;
pub use crate::object::key::*;
pub use crate::params::*;
pub use crate::pkcs11::*;

#[macro_use]
mod util;
use util::*;

mod derive;
mod dispatch;
mod encapsulate;
mod macs;
