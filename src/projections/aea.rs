//!
//! Albers Equal Area, and the Lambert Equal-Area Conic (`leac`) variant
//! where the second standard parallel is pinned to a pole.
//!
use crate::errors::{Error, Result};
use crate::math::consts::{EPS_10, FRAC_PI_2};
use crate::math::{msfn, qsfn};
use crate::parameters::ParamList;
use crate::proj::ProjData;

super::projection! { aea, leac }

const TOL7: f64 = 1e-7;
const N_ITER: usize = 15;
const TOL: f64 = 1e-10;

fn phi1_(qs: f64, te: f64, one_es: f64) -> f64 {
    let mut phi = (0.5 * qs).asin();
    if te < EPS_10 {
        return phi;
    }
    for _ in 0..N_ITER {
        let sinphi = phi.sin();
        let cosphi = phi.cos();
        let con = te * sinphi;
        let dphi = 0.5 * cosphi * cosphi / (1. - con * con)
            * (qs / one_es - sinphi / (1. - con * con)
                + 0.5 / te * ((1. - con) / (1. + con)).ln());
        phi += dphi;
        if dphi.abs() < TOL {
            break;
        }
    }
    phi
}

#[derive(Debug)]
pub(crate) struct Projection {
    n: f64,
    n2: f64,
    c: f64,
    ec: f64,
    dd: f64,
    rho0: f64,
    e: f64,
    one_es: f64,
    is_sphere: bool,
}

impl Projection {
    fn setup(p: &mut ProjData, phi1: f64, phi2: f64) -> Result<Self> {
        if (phi1 + phi2).abs() < EPS_10 {
            return Err(Error::ProjErrConicLatEqual);
        }
        let secant = (phi1 - phi2).abs() >= EPS_10;
        let sinphi = phi1.sin();
        let cosphi = phi1.cos();
        let mut n = sinphi;
        let e = p.ellps.e;
        let is_sphere = p.ellps.is_sphere();
        let one_es = p.ellps.one_es;

        let (n2, c, dd, rho0, ec);
        if !is_sphere {
            let m1 = msfn(sinphi, cosphi, p.ellps.es);
            let ml1 = qsfn(sinphi, e, one_es);
            if secant {
                let sinphi2 = phi2.sin();
                let cosphi2 = phi2.cos();
                let m2 = msfn(sinphi2, cosphi2, p.ellps.es);
                let ml2 = qsfn(sinphi2, e, one_es);
                n = (m1 * m1 - m2 * m2) / (ml2 - ml1);
            }
            c = m1 * m1 + n * ml1;
            dd = 1. / n;
            rho0 = dd * (c - n * qsfn(p.phi0.sin(), e, one_es)).max(0.).sqrt();
            ec = 1. - 0.5 * one_es * ((1. - e) / (1. + e)).ln() / e;
            n2 = 0.;
        } else {
            if secant {
                n = 0.5 * (n + phi2.sin());
            }
            n2 = n + n;
            c = cosphi * cosphi + n2 * sinphi;
            dd = 1. / n;
            rho0 = dd * (c - n2 * p.phi0.sin()).max(0.).sqrt();
            ec = 0.;
        }

        Ok(Self {
            n,
            n2,
            c,
            ec,
            dd,
            rho0,
            e,
            one_es,
            is_sphere,
        })
    }

    pub fn aea(p: &mut ProjData, params: &ParamList) -> Result<Self> {
        let phi1 = params.try_angular_value("lat_1")?.unwrap_or(p.phi0);
        let phi2 = params.try_angular_value("lat_2")?.unwrap_or(phi1);
        Self::setup(p, phi1, phi2)
    }

    pub fn leac(p: &mut ProjData, params: &ParamList) -> Result<Self> {
        let phi1 = params.try_angular_value("lat_1")?.unwrap_or(p.phi0);
        let phi2 = if params.check_option("south")? {
            -FRAC_PI_2
        } else {
            FRAC_PI_2
        };
        Self::setup(p, phi1, phi2)
    }

    pub fn forward(&self, lam: f64, phi: f64, z: f64) -> Result<(f64, f64, f64)> {
        let rho2 = if self.is_sphere {
            self.c - self.n2 * phi.sin()
        } else {
            self.c - self.n * qsfn(phi.sin(), self.e, self.one_es)
        };
        if rho2 < 0. {
            return Err(Error::ToleranceConditionError);
        }
        let rho = self.dd * rho2.sqrt();
        let angle = self.n * lam;
        Ok((rho * angle.sin(), self.rho0 - rho * angle.cos(), z))
    }

    pub fn inverse(&self, x: f64, y: f64, z: f64) -> Result<(f64, f64, f64)> {
        let yy = self.rho0 - y;
        let mut rho = x.hypot(yy);
        let (x, yy) = if rho != 0. {
            if self.n < 0. {
                rho = -rho;
                (-x, -yy)
            } else {
                (x, yy)
            }
        } else {
            (x, yy)
        };

        if rho == 0. {
            return Ok((0., if self.n > 0. { FRAC_PI_2 } else { -FRAC_PI_2 }, z));
        }

        let con = rho / self.dd;
        let phi = if !self.is_sphere {
            let v = (self.c - con * con) / self.n;
            if (self.ec - v.abs()).abs() > TOL7 {
                phi1_(v, self.e, self.one_es)
            } else if v < 0. {
                -FRAC_PI_2
            } else {
                FRAC_PI_2
            }
        } else {
            let v = (self.c - con * con) / self.n2;
            if v.abs() <= 1. {
                v.asin()
            } else if v < 0. {
                -FRAC_PI_2
            } else {
                FRAC_PI_2
            }
        };
        let lam = x.atan2(yy) / self.n;
        Ok((lam, phi, z))
    }

    pub const fn has_inverse() -> bool {
        true
    }

    pub const fn has_forward() -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proj::Proj;

    #[test]
    fn proj_aea_roundtrip() {
        let p = Proj::from_proj_string(
            "+proj=aea +lat_1=29.5 +lat_2=45.5 +lat_0=23 +lon_0=-96 +ellps=GRS80",
        )
        .unwrap();
        let (x, y, _) = p.forward(-0.2, 0.6, 0.).unwrap();
        let (lam, phi, _) = p.inverse(x, y, 0.).unwrap();
        assert!((lam - -0.2).abs() < 1e-8);
        assert!((phi - 0.6).abs() < 1e-8);
    }
}
