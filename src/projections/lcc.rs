//!
//! Lambert Conformal Conic, one or two standard parallels.
//!
use crate::errors::{Error, Result};
use crate::math::consts::{EPS_10, FRAC_PI_2, FRAC_PI_4};
use crate::math::{msfn, phi2, tsfn};
use crate::parameters::ParamList;
use crate::proj::ProjData;

super::projection! { lcc }

#[derive(Debug)]
pub(crate) struct Projection {
    phi0: f64,
    n: f64,
    rho0: f64,
    c: f64,
    e: f64,
    is_sphere: bool,
}

impl Projection {
    pub fn lcc(p: &mut ProjData, params: &ParamList) -> Result<Self> {
        let phi0 = p.phi0;
        let phi1 = params.try_angular_value("lat_1")?.unwrap_or(phi0);
        let phi2_ = params.try_angular_value("lat_2")?.unwrap_or(phi1);

        if (phi1 + phi2_).abs() < EPS_10 {
            return Err(Error::ProjErrConicLatEqual);
        }

        let e = p.ellps.e;
        let is_sphere = p.ellps.is_sphere();

        let (n, c, rho0);
        if is_sphere {
            let (sin1, cos1) = phi1.sin_cos();
            if (phi1 - phi2_).abs() >= EPS_10 {
                n = (cos1 / phi2_.cos()).ln()
                    / ((FRAC_PI_4 + phi2_ * 0.5).tan() / (FRAC_PI_4 + phi1 * 0.5).tan()).ln();
            } else {
                n = sin1;
            }
            c = cos1 * (FRAC_PI_4 + phi1 * 0.5).tan().powf(n) / n;
            rho0 = if (phi0.abs() - FRAC_PI_2).abs() < EPS_10 {
                0.
            } else {
                c / (FRAC_PI_4 + phi0 * 0.5).tan().powf(n)
            };
        } else {
            let sin1 = phi1.sin();
            let m1 = msfn(sin1, phi1.cos(), e * e);
            let ml1 = tsfn(phi1, sin1, e);

            if (phi1 - phi2_).abs() >= EPS_10 {
                let sin2 = phi2_.sin();
                let m2 = msfn(sin2, phi2_.cos(), e * e);
                let ml2 = tsfn(phi2_, sin2, e);
                n = (m1 / m2).ln() / (ml1 / ml2).ln();
            } else {
                n = sin1;
            }
            c = m1 * ml1.powf(-n) / n;
            rho0 = if (phi0.abs() - FRAC_PI_2).abs() < EPS_10 {
                0.
            } else {
                c * tsfn(phi0, phi0.sin(), e).powf(n)
            };
        }

        Ok(Self {
            phi0,
            n,
            rho0,
            c,
            e,
            is_sphere,
        })
    }

    pub fn forward(&self, lam: f64, phi: f64, z: f64) -> Result<(f64, f64, f64)> {
        if (phi.abs() - FRAC_PI_2).abs() < EPS_10 && phi * self.n <= 0. {
            return Err(Error::ToleranceConditionError);
        }
        let rho = if self.is_sphere {
            if (phi.abs() - FRAC_PI_2).abs() < EPS_10 {
                0.
            } else {
                self.c / (FRAC_PI_4 + phi * 0.5).tan().powf(self.n)
            }
        } else if (phi.abs() - FRAC_PI_2).abs() < EPS_10 {
            0.
        } else {
            self.c * tsfn(phi, phi.sin(), self.e).powf(self.n)
        };
        let angle = self.n * lam;
        let x = rho * angle.sin();
        let y = self.rho0 - rho * angle.cos();
        Ok((x, y, z))
    }

    pub fn inverse(&self, x: f64, y: f64, z: f64) -> Result<(f64, f64, f64)> {
        let dy = self.rho0 - y;
        let mut rho = x.hypot(dy) * self.n.signum();
        let lam = if rho != 0. {
            (self.n.signum() * x).atan2(self.n.signum() * dy) / self.n
        } else {
            0.
        };
        rho /= self.c;

        let phi = if self.is_sphere {
            FRAC_PI_2 - 2. * rho.powf(1. / self.n).atan()
        } else {
            phi2(rho.powf(1. / self.n), self.e)?
        };
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
    fn proj_lcc_roundtrip() {
        let p = Proj::from_proj_string(
            "+proj=lcc +lat_1=33 +lat_2=45 +lat_0=39 +lon_0=-96 +ellps=GRS80",
        )
        .unwrap();
        let (x, y, _) = p.forward(-0.1, 0.7, 0.).unwrap();
        let (lam, phi, _) = p.inverse(x, y, 0.).unwrap();
        assert!((lam - -0.1).abs() < 1e-8);
        assert!((phi - 0.7).abs() < 1e-8);
    }

    #[test]
    fn proj_lcc_equal_parallels_rejected() {
        let r = Proj::from_proj_string("+proj=lcc +lat_1=10 +lat_2=-10 +lat_0=0 +lon_0=0 +ellps=WGS84");
        assert!(matches!(r.unwrap_err(), Error::ProjErrConicLatEqual));
    }
}
