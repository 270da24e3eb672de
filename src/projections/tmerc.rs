//!
//! Transverse Mercator.
//!
//! Dispatches between two engines: [`estmerc`] (Evenden/Snyder short
//! series, used for spherical ellipsoids, `+approx`, or
//! `+algo=evenden_snyder`) and [`etmerc`] (Poder/Engsager exact series,
//! the default for ellipsoidal CRSs and the engine behind `utm`).
//!
use crate::errors::{Error, Result};
use crate::parameters::ParamList;
use crate::proj::ProjData;
use crate::projections::{estmerc, etmerc};

super::projection! { tmerc }

#[derive(Debug)]
pub(crate) enum Projection {
    Exact(etmerc::Projection),
    Approx(estmerc::Projection),
}

use Projection::*;

impl Projection {
    const ALG_PARAM: &str = "algo";

    pub fn tmerc(p: &mut ProjData, params: &ParamList) -> Result<Self> {
        if p.ellps.is_sphere() || params.check_option("approx")? {
            Ok(Approx(estmerc::Projection::estmerc(p, params)?))
        } else {
            match params.try_value::<&str>(Self::ALG_PARAM)? {
                Some("evenden_snyder") => Ok(Approx(estmerc::Projection::estmerc(p, params)?)),
                Some("poder_engsager") | None => {
                    Ok(Exact(etmerc::Projection::etmerc(p, params)?))
                }
                Some(_) => Err(Error::InvalidParameterValue("algo")),
            }
        }
    }

    pub fn forward(&self, lam: f64, phi: f64, z: f64) -> Result<(f64, f64, f64)> {
        match self {
            Exact(p) => p.forward(lam, phi, z),
            Approx(p) => p.forward(lam, phi, z),
        }
    }

    pub fn inverse(&self, x: f64, y: f64, z: f64) -> Result<(f64, f64, f64)> {
        match self {
            Exact(p) => p.inverse(x, y, z),
            Approx(p) => p.inverse(x, y, z),
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
    use super::*;
    use crate::proj::Proj;

    #[test]
    fn proj_tmerc_roundtrip() {
        let p = Proj::from_proj_string("+proj=tmerc +lon_0=9 +ellps=WGS84").unwrap();
        let (x, y, _) = p.forward(0.02, 0.7, 0.).unwrap();
        let (lam, phi, _) = p.inverse(x, y, 0.).unwrap();
        assert!((lam - 0.02).abs() < 1e-8);
        assert!((phi - 0.7).abs() < 1e-8);
    }

    #[test]
    fn proj_tmerc_sphere_roundtrip() {
        let p = Proj::from_proj_string("+proj=tmerc +lon_0=9 +R=6400000").unwrap();
        let (x, y, _) = p.forward(0.02, 0.5, 0.).unwrap();
        let (lam, phi, _) = p.inverse(x, y, 0.).unwrap();
        assert!((lam - 0.02).abs() < 1e-8);
        assert!((phi - 0.5).abs() < 1e-8);
    }

    #[test]
    fn proj_tmerc_invalid_algo_rejected() {
        let r = Proj::from_proj_string("+proj=tmerc +lon_0=9 +ellps=WGS84 +algo=bogus");
        assert!(r.is_err());
    }
}
