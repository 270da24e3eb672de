//!
//! Sinusoidal (Sanson-Flamsteed)
//!
//! ref: <https://proj.org/operations/projections/sinu.html>
//!
//! sinu: "Sinusoidal (Sanson-Flamsteed)" "\n\tPCyl, Sph&Ell";
//!
use crate::errors::{Error, Result};
use crate::math::consts::{EPS_10, FRAC_PI_2};
use crate::math::{enfn, inv_mlfn, mlfn, Enfn};
use crate::parameters::ParamList;
use crate::proj::ProjData;

super::projection! { sinu }

#[derive(Debug)]
pub(crate) struct Projection {
    es: f64,
    en: Enfn,
    is_sphere: bool,
}

impl Projection {
    pub fn sinu(p: &mut ProjData, _: &ParamList) -> Result<Self> {
        let es = p.ellps.es;
        Ok(Self {
            es,
            en: enfn(es),
            is_sphere: p.ellps.is_sphere(),
        })
    }

    pub fn forward(&self, lam: f64, phi: f64, z: f64) -> Result<(f64, f64, f64)> {
        if self.is_sphere {
            Ok((lam * phi.cos(), phi, z))
        } else {
            let s = phi.sin();
            let c = phi.cos();
            let y = mlfn(phi, s, c, self.en);
            let x = lam * c / (1. - self.es * s * s).sqrt();
            Ok((x, y, z))
        }
    }

    pub fn inverse(&self, x: f64, y: f64, z: f64) -> Result<(f64, f64, f64)> {
        if self.is_sphere {
            let phi = y;
            let c = phi.cos();
            if c.abs() < EPS_10 {
                Ok((0., phi, z))
            } else {
                Ok((x / c, phi, z))
            }
        } else {
            let phi = inv_mlfn(y, self.es, self.en)?;
            let s = phi.sin().abs();
            let lam = if s < 1. {
                let c = phi.cos();
                x * (1. - self.es * s * s).sqrt() / c
            } else {
                0.
            };
            if phi.abs() >= FRAC_PI_2 {
                Ok((0., phi, z))
            } else {
                Ok((lam, phi, z))
            }
        }
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
    use crate::math::consts::EPS_10;
    use crate::proj::Proj;

    // Geographic inputs are given in degrees, matching how these vectors
    // were originally checked against the PROJ CLI.
    fn check(p: &Proj, inputs: &[((f64, f64, f64), (f64, f64, f64))]) {
        for &((lam_deg, phi_deg, z), (ex, ey, ez)) in inputs {
            let (x, y, z) = p
                .forward(lam_deg.to_radians(), phi_deg.to_radians(), z)
                .unwrap();
            assert!((x - ex).abs() < EPS_10);
            assert!((y - ey).abs() < EPS_10);
            assert!((z - ez).abs() < EPS_10);
            let (rlam, rphi, _) = p.inverse(ex, ey, ez).unwrap();
            assert!((rlam.to_degrees() - lam_deg).abs() < 1e-7);
            assert!((rphi.to_degrees() - phi_deg).abs() < 1e-7);
        }
    }

    #[test]
    fn proj_sinu_sphere() {
        let p = Proj::from_proj_string("+proj=sinu +a=6400000").unwrap();
        let inputs = [
            ((2., 1., 0.), (223368.11902663152, 111701.07212763709, 0.)),
            ((2., -1., 0.), (223368.11902663152, -111701.07212763709, 0.)),
        ];
        check(&p, &inputs);
    }

    #[test]
    fn proj_sinu_ellps() {
        let p = Proj::from_proj_string("+proj=sinu +ellps=GRS80").unwrap();
        let (x, y, _) = p.forward(0.5, 0.7, 0.).unwrap();
        let (lam, phi, _) = p.inverse(x, y, 0.).unwrap();
        assert!((lam - 0.5).abs() < 1e-8);
        assert!((phi - 0.7).abs() < 1e-8);
    }
}
