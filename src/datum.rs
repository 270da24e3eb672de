//!
//! Datum shift: identity, 3/7-parameter Helmert, and grid-shift, pivoting
//! through geodetic/geocentric conversion.
//!
//! Unlike the generic-over-grid-type design this crate's pattern was drawn
//! from, grids here are resolved once at [`Datum::new`] time against an
//! injected [`GridProvider`](crate::nadgrids::GridProvider) rather than
//! threaded through a type parameter: the provider is an external
//! collaborator, not part of the datum's type.
use crate::datum_params::DatumParams;
use crate::ellps::Ellipsoid;
use crate::errors::Result;
use crate::geocent::{geocentric_to_geodetic, geodetic_to_geocentric};
use crate::nadgrids::{GridProvider, NadGrids};
use crate::transform::Direction;

#[derive(Debug)]
enum Kind {
    NoDatum,
    Wgs84,
    ToWGS84_3(f64, f64, f64),
    ToWGS84_7(f64, f64, f64, f64, f64, f64, f64),
    NadGrids(NadGrids),
}

/// Holds everything needed to pivot a point from/to WGS84 geocentric space.
#[derive(Debug)]
pub struct Datum {
    kind: Kind,
    a: f64,
    b: f64,
    es: f64,
}

const SRS_WGS84_SEMIMAJOR: f64 = 6378137.0;
const SRS_WGS84_SEMIMINOR: f64 = 6356752.314;
const SRS_WGS84_ES: f64 = 0.0066943799901413165;

impl Datum {
    /// Build a datum from its classified parameters, resolving any
    /// nadgrids list against `provider`.
    pub fn new(ellps: &Ellipsoid, params: &DatumParams, provider: &dyn GridProvider) -> Result<Self> {
        let kind = match params {
            DatumParams::NoDatum => Kind::NoDatum,
            DatumParams::Wgs84 => Kind::Wgs84,
            DatumParams::ToWGS84_3(dx, dy, dz) => Kind::ToWGS84_3(*dx, *dy, *dz),
            DatumParams::ToWGS84_7(dx, dy, dz, rx, ry, rz, s) => {
                Kind::ToWGS84_7(*dx, *dy, *dz, *rx, *ry, *rz, *s)
            }
            DatumParams::NadGrids(names) => {
                Kind::NadGrids(NadGrids::new_grid_transform(names, provider)?)
            }
        };

        // When a grid shift is in effect, the grid nodes give shifts directly
        // to/from WGS84 geographic coordinates: the pivot ellipsoid is WGS84
        // itself, regardless of the CRS's own ellipsoid.
        let (a, b, es) = if matches!(kind, Kind::NadGrids(_)) {
            (SRS_WGS84_SEMIMAJOR, SRS_WGS84_SEMIMINOR, SRS_WGS84_ES)
        } else {
            (ellps.a, ellps.b, ellps.es)
        };

        Ok(Self { kind, a, b, es })
    }

    pub fn use_nadgrids(&self) -> bool {
        matches!(self.kind, Kind::NadGrids(_))
    }

    pub fn no_datum(&self) -> bool {
        matches!(self.kind, Kind::NoDatum)
    }

    /// Convert a geodetic point in this datum to WGS84 geocentric space.
    fn towgs84(&self, lam: f64, phi: f64, z: f64) -> Result<(f64, f64, f64)> {
        match &self.kind {
            Kind::NoDatum | Kind::Wgs84 => geodetic_to_geocentric(lam, phi, z, self.a, self.es),
            Kind::ToWGS84_3(dx, dy, dz) => geodetic_to_geocentric(lam, phi, z, self.a, self.es)
                .map(|(x, y, z)| (x + dx, y + dy, z + dz)),
            Kind::ToWGS84_7(dx, dy, dz, rx, ry, rz, s) => {
                geodetic_to_geocentric(lam, phi, z, self.a, self.es).map(|(x, y, z)| {
                    (
                        dx + s * (x - rz * y + ry * z),
                        dy + s * (rz * x + y - rx * z),
                        dz + s * (-ry * x + rx * y + z),
                    )
                })
            }
            Kind::NadGrids(grids) => grids
                .apply_shift(Direction::Forward, lam, phi, z)
                .and_then(|(lam, phi, z)| geodetic_to_geocentric(lam, phi, z, self.a, self.es)),
        }
    }

    /// Convert a WGS84 geocentric point to a geodetic point in this datum.
    fn fromwgs84(&self, x: f64, y: f64, z: f64) -> Result<(f64, f64, f64)> {
        match &self.kind {
            Kind::NoDatum | Kind::Wgs84 => geocentric_to_geodetic(x, y, z, self.a, self.es, self.b),
            Kind::ToWGS84_3(dx, dy, dz) => {
                geocentric_to_geodetic(x - dx, y - dy, z - dz, self.a, self.es, self.b)
            }
            Kind::ToWGS84_7(dx, dy, dz, rx, ry, rz, s) => {
                let (x, y, z) = ((x - dx) / s, (y - dy) / s, (z - dz) / s);
                geocentric_to_geodetic(
                    x + rz * y - ry * z,
                    -rz * x + y + rx * z,
                    ry * x - rx * y + z,
                    self.a,
                    self.es,
                    self.b,
                )
            }
            Kind::NadGrids(grids) => geocentric_to_geodetic(x, y, z, self.a, self.es, self.b)
                .and_then(|(lam, phi, z)| grids.apply_shift(Direction::Inverse, lam, phi, z)),
        }
    }

    /// Whether `self` and `other` are equivalent enough that shifting
    /// between them can be skipped entirely.
    pub fn is_identical_to(&self, other: &Self) -> bool {
        // 5e-11 tolerance on es so GRS80 and WGS84 compare equal.
        self.a == other.a
            && (self.es - other.es).abs() < 0.000000000050
            && match (&self.kind, &other.kind) {
                (Kind::NoDatum, Kind::NoDatum) => true,
                (Kind::Wgs84, Kind::Wgs84) => true,
                (Kind::ToWGS84_3(a, b, c), Kind::ToWGS84_3(d, e, f)) => {
                    a == d && b == e && c == f
                }
                (Kind::ToWGS84_7(a0, b0, c0, d0, e0, f0, g0), Kind::ToWGS84_7(a1, b1, c1, d1, e1, f1, g1)) => {
                    a0 == a1 && b0 == b1 && c0 == c1 && d0 == d1 && e0 == e1 && f0 == f1 && g0 == g1
                }
                (Kind::NadGrids(_), Kind::NadGrids(_)) => true,
                _ => false,
            }
    }

    /// Pivot a point from `src`'s datum to `dst`'s datum via geocentric
    /// WGS84 space.
    pub fn transform(src: &Datum, dst: &Datum, lam: f64, phi: f64, z: f64) -> Result<(f64, f64, f64)> {
        src.towgs84(lam, phi, z)
            .and_then(|(x, y, z)| dst.fromwgs84(x, y, z))
    }
}
