//!
//! Stub projection for lat/long coordinates: no reprojection occurs, but
//! `proj=longlat` still needs to behave like a projection for the driver
//! (axis handling, datum shift) to apply uniformly.
//!
use crate::errors::Result;
use crate::parameters::ParamList;
use crate::proj::ProjData;

super::projection! { latlong, longlat }

#[derive(Debug)]
pub(crate) struct Projection {}

impl Projection {
    pub fn latlong(p: &mut ProjData, _params: &ParamList) -> Result<Self> {
        p.is_latlong = true;
        Ok(Self {})
    }

    pub fn longlat(p: &mut ProjData, params: &ParamList) -> Result<Self> {
        Self::latlong(p, params)
    }

    #[inline(always)]
    pub fn forward(&self, lam: f64, phi: f64, z: f64) -> Result<(f64, f64, f64)> {
        Ok((lam, phi, z))
    }

    #[inline(always)]
    pub fn inverse(&self, x: f64, y: f64, z: f64) -> Result<(f64, f64, f64)> {
        Ok((x, y, z))
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
    fn proj_longlat_is_latlong() {
        let p = Proj::from_proj_string("+proj=longlat +datum=WGS84").unwrap();
        assert!(p.is_latlong());
    }
}
