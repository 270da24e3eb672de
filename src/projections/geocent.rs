//!
//! Geocentric (earth-centered, earth-fixed) cartesian passthrough.
//!
//! The actual geodetic <-> geocentric conversion happens in the transform
//! driver, keyed off `ProjData::is_geocent`; this projection's forward and
//! inverse are identity so it composes with the dispatch table uniformly.
//!
use crate::errors::Result;
use crate::parameters::ParamList;
use crate::proj::ProjData;

super::projection! { geocent, cart }

#[derive(Debug)]
pub(crate) struct Projection {}

impl Projection {
    pub fn geocent(p: &mut ProjData, _params: &ParamList) -> Result<Self> {
        p.is_geocent = true;
        Ok(Self {})
    }

    pub fn cart(p: &mut ProjData, params: &ParamList) -> Result<Self> {
        Self::geocent(p, params)
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
