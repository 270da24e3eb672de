//!
//! Equidistant Conic
//!
//! ref: <https://proj.org/operations/projections/eqdc.html>
//!
//! eqdc: "Equidistant Conic" "\n\tConic, Sph&Ell\n\tlat_1= lat_2=";
//!
use crate::errors::{Error, Result};
use crate::math::consts::{EPS_10, FRAC_PI_2};
use crate::math::{enfn, inv_mlfn, mlfn, msfn, Enfn};
use crate::parameters::ParamList;
use crate::proj::ProjData;

super::projection! { eqdc }

#[derive(Debug)]
pub(crate) struct Projection {
    n: f64,
    rho0: f64,
    c: f64,
    es: f64,
    en: Enfn,
    is_sphere: bool,
}

impl Projection {
    pub fn eqdc(p: &mut ProjData, params: &ParamList) -> Result<Self> {
        let phi0 = p.phi0;
        let phi1 = params.try_angular_value("lat_1")?.unwrap_or(phi0);
        let phi2 = params.try_angular_value("lat_2")?.unwrap_or(phi1);

        if (phi1 + phi2).abs() < EPS_10 {
            return Err(Error::ProjErrConicLatEqual);
        }

        let es = p.ellps.es;
        let is_sphere = p.ellps.is_sphere();
        let en = enfn(es);
        let secant = (phi1 - phi2).abs() >= EPS_10;

        let sinphi = phi1.sin();
        let cosphi = phi1.cos();
        let mut n = sinphi;

        let (c, rho0);
        if is_sphere {
            if secant {
                n = 0.5 * (n + phi2.sin());
            }
            c = cosphi / n + phi1;
            rho0 = c - phi0;
        } else {
            let m1 = msfn(sinphi, cosphi, es);
            let ml1 = mlfn(phi1, sinphi, cosphi, en);
            if secant {
                let sinphi2 = phi2.sin();
                let cosphi2 = phi2.cos();
                let m2 = msfn(sinphi2, cosphi2, es);
                let ml2 = mlfn(phi2, sinphi2, cosphi2, en);
                n = (m1 - m2) / (ml2 - ml1);
            }
            c = ml1 + m1 / n;
            rho0 = c - mlfn(phi0, phi0.sin(), phi0.cos(), en);
        }

        Ok(Self {
            n,
            rho0,
            c,
            es,
            en,
            is_sphere,
        })
    }

    pub fn forward(&self, lam: f64, phi: f64, z: f64) -> Result<(f64, f64, f64)> {
        let rho = self.c
            - if self.is_sphere {
                phi
            } else {
                mlfn(phi, phi.sin(), phi.cos(), self.en)
            };
        let angle = self.n * lam;
        Ok((rho * angle.sin(), self.rho0 - rho * angle.cos(), z))
    }

    pub fn inverse(&self, x: f64, y: f64, z: f64) -> Result<(f64, f64, f64)> {
        let mut yy = self.rho0 - y;
        let mut rho = x.hypot(yy);
        let (x, yy) = if rho != 0. {
            if self.n < 0. {
                rho = -rho;
                (-x, -yy)
            } else {
                (x, yy)
            }
        } else {
            yy = 0.;
            (x, yy)
        };

        if rho == 0. {
            return Ok((0., if self.n > 0. { FRAC_PI_2 } else { -FRAC_PI_2 }, z));
        }

        let phi = self.c - rho;
        let phi = if self.is_sphere {
            phi
        } else {
            inv_mlfn(phi, self.es, self.en)?
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
    fn proj_eqdc_roundtrip() {
        let p = Proj::from_proj_string(
            "+proj=eqdc +lat_1=29.5 +lat_2=45.5 +lat_0=23 +lon_0=-96 +ellps=GRS80",
        )
        .unwrap();
        let (x, y, _) = p.forward(-0.1, 0.6, 0.).unwrap();
        assert!((x - -522434.862577455).abs() < 1e-4);
        assert!((y - 1276851.2244915867).abs() < 1e-4);
        let (lam, phi, _) = p.inverse(x, y, 0.).unwrap();
        assert!((lam - -0.1).abs() < 1e-8);
        assert!((phi - 0.6).abs() < 1e-8);
    }

    #[test]
    fn proj_eqdc_equal_parallels_rejected() {
        let r =
            Proj::from_proj_string("+proj=eqdc +lat_1=10 +lat_2=-10 +lat_0=0 +lon_0=0 +ellps=WGS84");
        assert!(matches!(r.unwrap_err(), Error::ProjErrConicLatEqual));
    }

    #[test]
    fn proj_eqdc_sphere_roundtrip() {
        let p = Proj::from_proj_string("+proj=eqdc +lat_1=33 +lat_2=45 +a=6400000").unwrap();
        let (x, y, _) = p.forward(0.2, 0.5, 0.).unwrap();
        let (lam, phi, _) = p.inverse(x, y, 0.).unwrap();
        assert!((lam - 0.2).abs() < 1e-8);
        assert!((phi - 0.5).abs() < 1e-8);
    }
}
