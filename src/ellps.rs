//!
//! Derived values for ellipsoids
//!
//! A complete ellipsoid definition comprises a size (primary) and a shape (secondary)
//! parameter.
//!
//! Size parameters supported are:
//!     R, defining the radius of a spherical planet
//!     a, defining the semimajor axis of an ellipsoidal planet
//!
//! Shape parameters supported are:
//!     rf, the reverse flattening of the ellipsoid
//!     f,  the flattening of the ellipsoid
//!     es, the eccentricity squared
//!     e,  the eccentricity
//!     b,  the semiminor axis
//!
//! The ellps=xxx parameter provides both size and shape for a number of built in
//! ellipsoid definitions.
//!
//! The ellipsoid definition may be augmented with the `R_A` spherification
//! flag, which replaces the ellipsoid with a sphere of the same surface
//! area (`a' = a(1 - es(1/6 + es(17/360 + es*67/3024)))`, `es` cleared to 0).
//!

use crate::ellipsoids::{EllipsoidDefn, FlatteningParam};
use crate::errors::{Error, Result};
use crate::math::consts::EPSLN;
use crate::parameters::ParamList;

// Series coefficients for the authalic (equal-area) sphere radius.
const SIXTH: f64 = 1. / 6.;
const RA4: f64 = 17. / 360.;
const RA6: f64 = 67. / 3024.;

#[derive(Default, Debug, Clone)]
pub(crate) struct PJConsts {
    // The linear parameters
    pub a: f64,  // semimajor axis (radius if eccentricity==0)
    pub b: f64,  // semiminor axis
    pub ra: f64, // 1/a
    pub rb: f64, // 1/b

    // The eccentricities
    pub e: f64,       // first  eccentricity
    pub es: f64,      // first  eccentricity squared
    pub one_es: f64,  // 1 - es
    pub rone_es: f64, // 1/one_es
    pub ep2: f64,     // second eccentricity squared, es/one_es

    // The flattenings
    pub f: f64,  // first  flattening
    pub rf: f64, // 1/f

    // Set when the `R_A` authalic-sphere flag replaced the ellipsoid.
    pub r_a: bool,
}

/// A shape parameter, by order of precedence
#[allow(non_camel_case_types)]
enum ShapeParameter {
    SP_rf(f64),
    SP_f(f64),
    SP_es(f64),
    SP_e(f64),
    SP_b(f64),
}

use ShapeParameter::*;

impl PJConsts {
    fn _sphere(mut self, radius: f64) -> Self {
        self.a = radius;
        self.b = self.a;
        self.rf = f64::INFINITY;
        self.ra = 1. / self.a;
        self.rb = self.ra;
        self.one_es = 1.;
        self.rone_es = 1.;
        self.ep2 = 0.;
        self
    }

    /// Create sphere parameters
    pub fn sphere(radius: f64) -> Result<Self> {
        if !(radius.is_normal() && radius > 0.) {
            return Err(Error::InvalidParameterValue("Invalid radius"));
        }
        Ok(Self::default()._sphere(radius))
    }

    /// Calculate parameters given a and a shape parameter.
    ///
    /// Precedence of shape parameters is "rf", "f", "es", "e", "b"
    fn calc_ellipsoid_params(&mut self, sp: ShapeParameter, r_a: bool) -> Result<()> {
        if self.a <= 0. {
            return Err(Error::InvalidParameterValue("Invalid major axis"));
        }

        let a = self.a;

        match sp {
            SP_rf(rf) => {
                if !(rf >= 0. && rf > 1.) {
                    return Err(Error::InvalidParameterValue("Invalid inverse flattening"));
                }
                let f = 1. / rf;
                self.f = f;
                self.rf = rf;
                self.es = 2. * f - f * f;
                self.e = self.es.sqrt();
                self.b = (1.0 - f) * a;
            }
            SP_f(f) => {
                if !(f >= 0. && f < 1.) {
                    return Err(Error::InvalidParameterValue("Invalid flattening"));
                }
                self.f = f;
                self.es = 2. * f - f * f;
                self.e = self.es.sqrt();
                self.b = (1.0 - f) * a;
                if f > 0. {
                    self.rf = 1. / f;
                }
            }
            SP_es(es) => {
                if !(es >= 0. && es < 1.) {
                    return Err(Error::InvalidParameterValue("Invalid eccentricity"));
                }
                self.es = es;
                self.e = es.sqrt();
                self.f = 1. - self.e.asin().cos();
                self.b = (1.0 - self.f) * a;
                if self.f > 0. {
                    self.rf = 1. / self.f;
                }
            }
            SP_e(e) => {
                if !(e >= 0. && e < 1.) {
                    return Err(Error::InvalidParameterValue("Invalid eccentricity"));
                }
                self.es = e * e;
                self.e = e;
                self.f = 1. - self.e.asin().cos();
                self.b = (1.0 - self.f) * a;
                if self.f > 0. {
                    self.rf = 1. / self.f;
                }
            }
            SP_b(b) => {
                if !(b >= 0. && b < a) {
                    return Err(Error::InvalidParameterValue("Invalid minor axis"));
                }
                let a2 = a * a;
                let b2 = b * b;
                self.b = b;
                self.es = (a2 - b2) / a2;
                self.e = self.es.sqrt();
                self.f = (a - b) / b;
                if self.f > 0. {
                    self.rf = 1. / self.f;
                }
            }
        }

        if (a - self.b).abs() < EPSLN {
            self.b = a;
            self.es = 0.;
            self.e = 0.;
            self.f = 0.;
            self.rf = f64::INFINITY;
        }

        if r_a {
            let es = self.es;
            self.a *= 1. - es * (SIXTH + es * (RA4 + es * RA6));
            self.b = self.a;
            self.es = 0.;
            self.e = 0.;
            self.f = 0.;
            self.rf = f64::INFINITY;
            self.r_a = true;
        }

        self.ra = 1. / self.a;
        self.rb = 1. / self.b;
        self.one_es = 1. - self.es;
        self.rone_es = 1. / self.one_es;
        self.ep2 = self.es / self.one_es;

        Ok(())
    }

    /// Build ellipsoid parameters from a named ellipsoid definition, letting
    /// any of `a`, `rf`, `f`, `es`, `e` or `b` present in `params` override the
    /// definition's own values.
    pub fn try_from_ellipsoid_with_params(
        defn: &EllipsoidDefn,
        params: &ParamList,
        r_a: bool,
    ) -> Result<Self> {
        let mut ellps = Self {
            a: params.try_value::<f64>("a")?.unwrap_or(defn.a),
            ..Self::default()
        };

        let sp = if let Some(rf) = params.try_value::<f64>("rf")? {
            SP_rf(rf)
        } else if let Some(f) = params.try_value::<f64>("f")? {
            SP_f(f)
        } else if let Some(es) = params.try_value::<f64>("es")? {
            SP_es(es)
        } else if let Some(e) = params.try_value::<f64>("e")? {
            SP_e(e)
        } else if let Some(b) = params.try_value::<f64>("b")? {
            SP_b(b)
        } else {
            match defn.rf_or_b {
                FlatteningParam::InvFlat(rf) => SP_rf(rf),
                FlatteningParam::MinorAxis(b) => SP_b(b),
            }
        };

        ellps.calc_ellipsoid_params(sp, r_a)?;
        Ok(ellps)
    }

    /// Return true if this ellipsoid is in fact a sphere.
    pub fn is_sphere(&self) -> bool {
        self.es == 0.
    }

    /// Return true if this ellipsoid is a true ellipsoid (not a sphere).
    pub fn is_ellipsoid(&self) -> bool {
        self.es != 0.
    }
}

/// Public alias: an ellipsoid is fully described by its derived [`PJConsts`].
pub(crate) type Ellipsoid = PJConsts;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ellipsoids::constants::{SPHERE, WGS84};
    use crate::projstring::parse;

    #[test]
    fn ellps_wgs84_params() {
        let params = parse("+a=6378137").unwrap();
        let e = Ellipsoid::try_from_ellipsoid_with_params(&WGS84, &params, false).unwrap();
        assert!((e.a - 6_378_137.).abs() < 1e-6);
        assert!((e.rf - 298.257_223_563).abs() < 1e-6);
        assert!(!e.is_sphere());
    }

    #[test]
    fn ellps_sphere_collapse() {
        let params = parse("+a=6370997").unwrap();
        let e = Ellipsoid::try_from_ellipsoid_with_params(&SPHERE, &params, false).unwrap();
        assert!(e.is_sphere());
        assert_eq!(e.b, e.a);
    }

    #[test]
    fn ellps_explicit_sphere() {
        let e = Ellipsoid::sphere(6_370_997.).unwrap();
        assert!(e.is_sphere());
    }

    #[test]
    fn ellps_invalid_radius() {
        assert!(Ellipsoid::sphere(-1.).is_err());
    }

    #[test]
    fn ellps_authalic_sphere() {
        let params = parse("+a=6378137").unwrap();
        let e = Ellipsoid::try_from_ellipsoid_with_params(&WGS84, &params, true).unwrap();
        assert!(e.is_sphere());
        assert!(e.r_a);
        // authalic radius sits strictly between b and a for an oblate ellipsoid
        assert!(e.a < 6_378_137. && e.a > 6_356_752.);
    }
}
