//!
//! Mercator, and the spherical "web mercator" variant used by web map
//! tiling schemes (`+proj=webmerc`, always spherical regardless of the
//! CRS's own ellipsoid).
//!
use crate::errors::{Error, Result};
use crate::math::consts::{EPS_10, FRAC_PI_2};
use crate::math::{phi2, tsfn};
use crate::parameters::ParamList;
use crate::proj::ProjData;

super::projection! { merc, webmerc }

#[derive(Debug)]
pub(crate) struct Projection {
    e: f64,
    k0: f64,
    is_sphere: bool,
}

impl Projection {
    pub fn merc(p: &mut ProjData, params: &ParamList) -> Result<Self> {
        if let Some(ts) = params.try_angular_value("lat_ts")? {
            let ts = ts.abs();
            if ts >= FRAC_PI_2 {
                return Err(Error::InvalidParameterValue("lat_ts out of range"));
            }
            if !p.ellps.is_sphere() {
                let con = p.ellps.e * ts.sin();
                p.k0 = ts.cos() / (1. - con * con).sqrt();
            } else {
                p.k0 = ts.cos();
            }
        }
        Ok(Self {
            e: p.ellps.e,
            k0: p.k0,
            is_sphere: p.ellps.is_sphere(),
        })
    }

    pub fn webmerc(p: &mut ProjData, _params: &ParamList) -> Result<Self> {
        // Web mercator is always computed on the sphere, whatever the
        // declared ellipsoid: radius is taken to be the semimajor axis.
        Ok(Self {
            e: 0.,
            k0: p.k0,
            is_sphere: true,
        })
    }

    pub fn forward(&self, lam: f64, phi: f64, z: f64) -> Result<(f64, f64, f64)> {
        if (phi.abs() - FRAC_PI_2).abs() <= EPS_10 {
            return Err(Error::ToleranceConditionError);
        }
        let y = if self.is_sphere {
            self.k0 * (FRAC_PI_2 * 0.5 + phi * 0.5).tan().ln()
        } else {
            -self.k0 * tsfn(phi, phi.sin(), self.e).ln()
        };
        Ok((self.k0 * lam, y, z))
    }

    pub fn inverse(&self, x: f64, y: f64, z: f64) -> Result<(f64, f64, f64)> {
        let phi = if self.is_sphere {
            FRAC_PI_2 - 2. * (-y / self.k0).exp().atan()
        } else {
            phi2((-y / self.k0).exp(), self.e)?
        };
        Ok((x / self.k0, phi, z))
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
    fn proj_merc_roundtrip() {
        let p = Proj::from_proj_string("+proj=merc +ellps=WGS84").unwrap();
        let (x, y, _) = p.forward(0.1, 0.5, 0.).unwrap();
        let (lam, phi, _) = p.inverse(x, y, 0.).unwrap();
        assert!((lam - 0.1).abs() < 1e-9);
        assert!((phi - 0.5).abs() < 1e-9);
    }
}
