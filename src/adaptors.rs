//!
//! Implementations of [`Transform`] for common point representations,
//! plus convenience wrappers around [`transform`].
//!
use crate::errors::Result;
use crate::proj::Proj;
use crate::transform::{transform, Transform};

impl Transform for (f64, f64, f64) {
    fn transform_coordinates<F>(&mut self, mut f: F) -> Result<()>
    where
        F: FnMut(f64, f64, f64) -> Result<(f64, f64, f64)>,
    {
        (self.0, self.1, self.2) = f(self.0, self.1, self.2)?;
        Ok(())
    }
}

impl Transform for [(f64, f64, f64)] {
    fn transform_coordinates<F>(&mut self, mut f: F) -> Result<()>
    where
        F: FnMut(f64, f64, f64) -> Result<(f64, f64, f64)>,
    {
        self.iter_mut().try_for_each(|(x, y, z)| {
            (*x, *y, *z) = f(*x, *y, *z)?;
            Ok(())
        })
    }
}

/// Transform a 3-tuple point from `src` to `dst`.
pub fn transform_point_3d(src: &Proj, dst: &Proj, pt: (f64, f64, f64)) -> Result<(f64, f64, f64)> {
    let mut pt_out = pt;
    transform(src, dst, &mut pt_out)?;
    Ok(pt_out)
}

/// Transform a 2-tuple point (z is set to 0 and dropped on output).
#[inline(always)]
pub fn transform_point_2d(src: &Proj, dst: &Proj, pt: (f64, f64)) -> Result<(f64, f64)> {
    transform_point_3d(src, dst, (pt.0, pt.1, 0.)).map(|(x, y, _)| (x, y))
}

/// Transform `x`, `y`, `z` values.
#[inline(always)]
pub fn transform_xyz(src: &Proj, dst: &Proj, x: f64, y: f64, z: f64) -> Result<(f64, f64, f64)> {
    transform_point_3d(src, dst, (x, y, z))
}

/// Transform `x`, `y` values (`z` is set to 0).
#[inline(always)]
pub fn transform_xy(src: &Proj, dst: &Proj, x: f64, y: f64) -> Result<(f64, f64)> {
    transform_xyz(src, dst, x, y, 0.).map(|(x, y, _)| (x, y))
}

/// Transform an array of 3-tuple points in place.
#[inline(always)]
pub fn transform_point_array(src: &Proj, dst: &Proj, pts: &mut [(f64, f64, f64)]) -> Result<()> {
    transform(src, dst, pts)
}

/// A bound `(src, dst)` pair: pure sugar over [`transform`] for callers
/// who run many points through the same pair of CRSs.
pub struct Converter<'a> {
    src: &'a Proj,
    dst: &'a Proj,
}

/// Bind `src`/`dst` into a [`Converter`].
pub fn converter<'a>(src: &'a Proj, dst: &'a Proj) -> Converter<'a> {
    Converter { src, dst }
}

impl<'a> Converter<'a> {
    /// Transform `pt` from `src` to `dst`.
    pub fn forward(&self, pt: (f64, f64, f64)) -> Result<(f64, f64, f64)> {
        transform_point_3d(self.src, self.dst, pt)
    }

    /// Transform `pt` from `dst` back to `src`.
    pub fn inverse(&self, pt: (f64, f64, f64)) -> Result<(f64, f64, f64)> {
        transform_point_3d(self.dst, self.src, pt)
    }
}

#[cfg(feature = "geo-types")]
impl Transform for geo_types::Point<f64> {
    fn transform_coordinates<F>(&mut self, mut f: F) -> Result<()>
    where
        F: FnMut(f64, f64, f64) -> Result<(f64, f64, f64)>,
    {
        let (x, y, _) = f(self.x(), self.y(), 0.)?;
        self.set_x(x);
        self.set_y(y);
        Ok(())
    }
}

#[cfg(feature = "geo-types")]
impl From<geo_types::Coord<f64>> for crate::point::Point {
    fn from(c: geo_types::Coord<f64>) -> Self {
        crate::point::Point::new_xy(c.x, c.y)
    }
}

#[cfg(feature = "geo-types")]
impl From<crate::point::Point> for geo_types::Coord<f64> {
    fn from(p: crate::point::Point) -> Self {
        geo_types::Coord { x: p.x, y: p.y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_xy_longlat_to_merc() {
        let src = Proj::from_proj_string("+proj=longlat +ellps=WGS84").unwrap();
        let dst = Proj::from_proj_string("+proj=merc +ellps=WGS84").unwrap();
        let (x, y) = transform_xy(&src, &dst, 0., 0.).unwrap();
        assert!(x.abs() < 1e-6);
        assert!(y.abs() < 1e-6);
    }

    #[test]
    fn converter_forward_inverse() {
        let src = Proj::from_proj_string("+proj=longlat +ellps=WGS84").unwrap();
        let dst = Proj::from_proj_string("+proj=merc +ellps=WGS84").unwrap();
        let c = converter(&src, &dst);
        let lam = 2.0_f64.to_radians();
        let phi = 45.0_f64.to_radians();
        let (x, y, _) = c.forward((lam, phi, 0.)).unwrap();
        let (lam2, phi2, _) = c.inverse((x, y, 0.)).unwrap();
        assert!((lam2 - lam).abs() < 1e-9);
        assert!((phi2 - phi).abs() < 1e-9);
    }

    #[test]
    fn transform_point_array_in_place() {
        let src = Proj::from_proj_string("+proj=longlat +ellps=WGS84").unwrap();
        let dst = Proj::from_proj_string("+proj=merc +ellps=WGS84").unwrap();
        let mut pts = [(0., 0., 0.), (1.0_f64.to_radians(), 0., 0.)];
        transform_point_array(&src, &dst, &mut pts).unwrap();
        assert!(pts[0].0.abs() < 1e-6);
        assert!(pts[1].0 > 0.);
    }
}
