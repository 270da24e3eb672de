//!
//! Utilities
//!
//!
use crate::errors::{Error, Result};

pub(crate) mod consts {
    //!
    //! Define constants
    //!

    // Note that TAU is 2*PI
    // see https://doc.rust-lang.org/std/f64/consts/constant.TAU.html
    pub(crate) use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

    // Was defined in proj4js for preventing divergence
    // of Mollweide algorithm
    pub(crate) const EPS_10: f64 = 1.0e-10;

    // Other value of epsilon used
    pub(crate) const EPS_12: f64 = 1.0e-12;

    // Other value of epsilon used
    pub(crate) const EPS_7: f64 = 1.0e-7;

    // Threshold below which an ellipsoid is considered a sphere
    pub(crate) const EPSLN: f64 = 1.0e-10;

    // XXX float has excessive precision
    //pub const SEC_TO_RAD: f64 = 4.84813681109535993589914102357e-6;
    pub(crate) const SEC_TO_RAD: f64 = 4.848_136_811_095_36e-6;
}

// Redefinition of mathematical functions
//
// Some of these functions have been redefined for various reasons.
//
// Note that proj redefines ln1p (i.e ln(1+x)), while rust relies on the
// platform native (libm) implementation; we stick to the native
// implementation of `ln_1p` here.
//
// The same goes for hypot: we stick to the native implementation.

//  ----------
//  asinh
//  ---------
//
// rust's stdlib defines asinh as (self.abs() + ((self*self)+1.0).sqrt()).ln().copysign(self),
// which can overflow for very large |x|. We use hypot instead, which handles that case.
#[inline]
pub fn asinh(x: f64) -> f64 {
    (x.abs() + 1.0f64.hypot(x)).ln().copysign(x)
}

mod aasincos;
mod adjlon;
mod auth;
mod gauss;
mod mlfn;
mod msfn;
mod phi2;
mod qsfn;
mod tsfn;

pub(crate) use aasincos::{aacos, aasin, aatan2, asqrt};
pub(crate) use adjlon::adjlon;
pub(crate) use auth::{authlat, authset};
pub(crate) use gauss::{gauss, gauss_ini, inv_gauss, Gauss};
pub(crate) use mlfn::{enfn, inv_mlfn, mlfn, Enfn};
pub(crate) use msfn::msfn;
pub(crate) use phi2::phi2;
pub(crate) use qsfn::qsfn;
pub(crate) use tsfn::tsfn;
