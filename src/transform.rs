//!
//! Overall coordinate system to coordinate system transformations,
//! including reprojection and datum shifting.
//!
use crate::datum::Datum;
use crate::errors::{Error, Result};
use crate::geocent::{geocentric_to_geodetic, geodetic_to_geocentric};
use crate::proj::{Axis, Proj};

///
/// Transform trait
///
/// This allows transform to be agnostic of the coordinate's
/// implementation details (useful for collections of coordinates).
///
/// The closure returns an error if processing of the coordinate fails.
/// If the closure returns an error, the whole processing stops; whether
/// to stop or continue on error for a collection is left to the
/// `Transform` implementation.
///
/// Single point transform example:
///
/// ```rust
/// use geocrs::transform::{transform, Transform};
/// use geocrs::proj::Proj;
///
/// let src = Proj::from_proj_string("+proj=longlat +ellps=WGS84").unwrap();
/// let dst = Proj::from_proj_string("+proj=merc +ellps=WGS84").unwrap();
///
/// let mut pt = (2.0_f64.to_radians(), 1.0_f64.to_radians(), 0.0);
/// transform(&src, &dst, &mut pt).unwrap();
/// ```
///
pub trait Transform {
    fn transform_coordinates<F>(&mut self, f: F) -> Result<()>
    where
        F: FnMut(f64, f64, f64) -> Result<(f64, f64, f64)>;
}

/// Select transformation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Inverse,
}

use Direction::*;

/// Wrap a per-point step so a NaN in any input coordinate short-circuits
/// to an all-NaN output instead of running the step (and instead of
/// failing the whole batch): a malformed point never aborts processing
/// of its neighbours.
fn guard_nan<F>(mut f: F) -> impl FnMut(f64, f64, f64) -> Result<(f64, f64, f64)>
where
    F: FnMut(f64, f64, f64) -> Result<(f64, f64, f64)>,
{
    move |x, y, z| {
        if x.is_nan() || y.is_nan() || z.is_nan() {
            Ok((f64::NAN, f64::NAN, f64::NAN))
        } else {
            f(x, y, z)
        }
    }
}

/// Transform points from the CRS `src` to the CRS `dst`.
///
/// Sequences axis normalisation, geodetic/geocentric conversion, the
/// source's own inverse projection, prime-meridian and vertical-unit
/// adjustment, the datum shift, and the destination's own forward
/// projection, then undoes axis normalisation on the way out. A NaN in
/// any input coordinate yields an all-NaN output point for that
/// coordinate: it is not treated as an error.
pub fn transform<P>(src: &Proj, dst: &Proj, points: &mut P) -> Result<()>
where
    P: Transform + ?Sized,
{
    if !src.has_inverse() {
        return Err(Error::NoInverseProjectionDefined);
    }
    if !dst.has_forward() {
        return Err(Error::NoForwardProjectionDefined);
    }

    adjust_axes(src, Inverse, points)?;
    geographic_to_cartesian(src, Inverse, points)?;
    points.transform_coordinates(guard_nan(|x, y, z| src.inverse(x, y, z)))?;
    prime_meridian(src, Inverse, points)?;
    height_unit(src, Inverse, points)?;

    datum_transform(src, dst, points)?;

    height_unit(dst, Forward, points)?;
    prime_meridian(dst, Forward, points)?;
    geographic_to_cartesian(dst, Forward, points)?;
    points.transform_coordinates(guard_nan(|lam, phi, z| dst.forward(lam, phi, z)))?;
    adjust_axes(dst, Forward, points)?;

    Ok(())
}

// ---------------------------------
// Datum transformation
// ---------------------------------
fn datum_transform<P>(src: &Proj, dst: &Proj, points: &mut P) -> Result<()>
where
    P: Transform + ?Sized,
{
    let src_datum = src.datum();
    let dst_datum = dst.datum();

    // As of PROJ 4.6.0 behavior: prevent datum transformation if either
    // side has no datum, or both sides are equivalent.
    if src_datum.no_datum() || dst_datum.no_datum() || src_datum.is_identical_to(dst_datum) {
        return Ok(());
    }

    points.transform_coordinates(guard_nan(|x, y, z| {
        Datum::transform(src_datum, dst_datum, x, y, z)
    }))
}

// ---------------------------------
// Geodetic <-> geocentric ("cartesian")
// ---------------------------------
fn geographic_to_cartesian<P>(p: &Proj, dir: Direction, points: &mut P) -> Result<()>
where
    P: Transform + ?Sized,
{
    if !p.is_geocent() {
        return Ok(());
    }

    let ellps = p.ellps();
    let (a, b, es) = (ellps.a, ellps.b, ellps.es);
    let fac = p.data().to_meter;

    if fac != 1.0 {
        match dir {
            Forward => points.transform_coordinates(guard_nan(|x, y, z| {
                geodetic_to_geocentric(x, y, z, a, es).map(|(x, y, z)| (x * fac, y * fac, z * fac))
            })),
            Inverse => points.transform_coordinates(guard_nan(|x, y, z| {
                geocentric_to_geodetic(x * fac, y * fac, z * fac, a, es, b)
            })),
        }
    } else {
        match dir {
            Forward => points
                .transform_coordinates(guard_nan(|x, y, z| geodetic_to_geocentric(x, y, z, a, es))),
            Inverse => points.transform_coordinates(guard_nan(|x, y, z| {
                geocentric_to_geodetic(x, y, z, a, es, b)
            })),
        }
    }
}

// --------------------------
// Prime meridian adjustment
// --------------------------
fn prime_meridian<P>(p: &Proj, dir: Direction, points: &mut P) -> Result<()>
where
    P: Transform + ?Sized,
{
    let mut pm = p.data().from_greenwich;
    if pm == 0. || p.is_geocent() || p.is_latlong() {
        Ok(())
    } else {
        if dir == Forward {
            pm = -pm;
        }
        points.transform_coordinates(|x, y, z| Ok((x + pm, y, z)))
    }
}

// ---------------------
// Axis
// ---------------------
fn adjust_axes<P>(p: &Proj, dir: Direction, points: &mut P) -> Result<()>
where
    P: Transform + ?Sized,
{
    if !p.normalized_axis() {
        match dir {
            Forward => denormalize_axis(p.axis(), points),
            Inverse => normalize_axis(p.axis(), points),
        }
    } else {
        Ok(())
    }
}

fn normalize_axis<P: Transform + ?Sized>(axis: &Axis, points: &mut P) -> Result<()> {
    points.transform_coordinates(|x, y, z| {
        let (mut x_out, mut y_out, mut z_out) = (x, y, z);
        axis.iter().enumerate().for_each(|(i, axe)| {
            let value = match i {
                1 => x,
                2 => y,
                _ => z,
            };
            match axe {
                b'e' => x_out = value,
                b'w' => x_out = -value,
                b'n' => y_out = value,
                b's' => y_out = -value,
                b'u' => z_out = value,
                b'd' => z_out = -value,
                // unreachable: `ProjData::axis` only ever stores one of
                // the six bytes above.
                _ => unreachable!(),
            }
        });
        Ok((x_out, y_out, z_out))
    })
}

fn denormalize_axis<P: Transform + ?Sized>(axis: &Axis, points: &mut P) -> Result<()> {
    points.transform_coordinates(|x, y, z| {
        let (mut x_out, mut y_out, mut z_out) = (x, y, z);
        axis.iter().enumerate().for_each(|(i, axe)| {
            let value = match axe {
                b'e' => x,
                b'w' => -x,
                b'n' => y,
                b's' => -y,
                b'u' => z,
                b'd' => -z,
                _ => unreachable!(),
            };
            match i {
                1 => x_out = value,
                2 => y_out = value,
                _ => z_out = value,
            }
        });
        Ok((x_out, y_out, z_out))
    })
}

// ---------------------
// Vertical scale factor
// ---------------------
fn height_unit<P>(p: &Proj, dir: Direction, points: &mut P) -> Result<()>
where
    P: Transform + ?Sized,
{
    let fac = if dir == Forward {
        1. / p.data().vto_meter
    } else {
        p.data().vto_meter
    };

    if fac != 1.0 {
        points.transform_coordinates(|x, y, z| Ok((x, y, z * fac)))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::consts::EPS_10;

    #[test]
    fn transform_longlat_identity() {
        let src = Proj::from_proj_string("+proj=longlat +ellps=WGS84").unwrap();
        let dst = Proj::from_proj_string("+proj=longlat +ellps=WGS84").unwrap();

        let mut pt = (2.0_f64.to_radians(), 1.0_f64.to_radians(), 0.);
        transform(&src, &dst, &mut pt).unwrap();
        assert!((pt.0 - 2.0_f64.to_radians()).abs() < EPS_10);
        assert!((pt.1 - 1.0_f64.to_radians()).abs() < EPS_10);
    }

    #[test]
    fn transform_longlat_to_merc_roundtrip() {
        let src = Proj::from_proj_string("+proj=longlat +ellps=WGS84").unwrap();
        let dst = Proj::from_proj_string("+proj=merc +ellps=WGS84").unwrap();

        let lam = 2.0_f64.to_radians();
        let phi = 45.0_f64.to_radians();
        let mut pt = (lam, phi, 0.);
        transform(&src, &dst, &mut pt).unwrap();

        transform(&dst, &src, &mut pt).unwrap();
        assert!((pt.0 - lam).abs() < 1e-9);
        assert!((pt.1 - phi).abs() < 1e-9);
    }

    #[test]
    fn transform_array() {
        let src = Proj::from_proj_string("+proj=longlat +ellps=WGS84").unwrap();
        let dst = Proj::from_proj_string("+proj=merc +ellps=WGS84").unwrap();

        let mut pts = [
            (2.0_f64.to_radians(), 1.0_f64.to_radians(), 0.),
            (-3.0_f64.to_radians(), 40.0_f64.to_radians(), 0.),
        ];
        transform(&src, &dst, &mut pts[..]).unwrap();
        assert!(pts[0].0 > 0.);
        assert!(pts[1].0 < 0.);
    }

    #[test]
    fn transform_wgs84_datum_still_shifts_against_real_datum() {
        // `+datum=WGS84` resolves to a zero-parameter Helmert, not the
        // absent-datum case: a real towgs84 shift on the other side must
        // still be applied rather than skipped.
        let src = Proj::from_proj_string("+proj=longlat +datum=WGS84").unwrap();
        let dst = Proj::from_proj_string(
            "+proj=longlat +ellps=WGS84 +towgs84=100,100,100,0,0,0,0",
        )
        .unwrap();

        let lam = 2.0_f64.to_radians();
        let phi = 45.0_f64.to_radians();
        let mut pt = (lam, phi, 0.);
        transform(&src, &dst, &mut pt).unwrap();
        assert!((pt.0 - lam).abs() > 1e-7 || (pt.1 - phi).abs() > 1e-7);
    }

    #[test]
    fn transform_nan_short_circuits_to_nan_output() {
        let src = Proj::from_proj_string("+proj=longlat +ellps=WGS84").unwrap();
        let dst = Proj::from_proj_string("+proj=merc +ellps=WGS84").unwrap();

        let mut pt = (f64::NAN, 1.0_f64.to_radians(), 0.);
        transform(&src, &dst, &mut pt).unwrap();
        assert!(pt.0.is_nan());
        assert!(pt.1.is_nan());
    }
}
