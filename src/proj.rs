//!
//! The canonical CRS parameter record and the `Proj` handle bound to an
//! initialised projection.
//!
use crate::datum::Datum;
use crate::datum_params::DatumParams;
use crate::datums::{self, DatumDefn};
use crate::ellps::Ellipsoid;
use crate::errors::{Error, Result};
use crate::math::{
    adjlon,
    consts::{EPS_12, FRAC_PI_2},
};
use crate::nadgrids::{GridProvider, MemoryGridProvider};
use crate::parameters::ParamList;
use crate::projections::{find_projection, ProjDelegate};
use crate::{ellipsoids, prime_meridians, projstring, units};

pub type Axis = [u8; 3];

const NORMALIZED_AXIS: Axis = [b'e', b'n', b'u'];

/// Everything the projection engine and the transform driver need about
/// one side (source or destination) of a transform.
///
/// Numeric setup fields (`lam0`, `phi0`, `k0`, `x0`, `y0`) are mutable
/// during `init`: a projection's own `init` routine is free to override
/// the caller-supplied defaults (UTM derives `lam0`/`k0`/`x0`/`y0` from
/// the zone, UPS fixes `k0`/`x0`/`y0`, etc).
#[derive(Debug)]
pub struct ProjData {
    pub(crate) ellps: Ellipsoid,
    pub(crate) datum: Datum,
    pub(crate) axis: Axis,
    pub(crate) to_meter: f64,
    pub(crate) vto_meter: f64,
    pub(crate) from_greenwich: f64,
    pub(crate) is_geocent: bool,
    pub(crate) is_latlong: bool,
    pub(crate) geoc: bool,
    pub(crate) over: bool,
    pub(crate) lam0: f64,
    pub(crate) phi0: f64,
    pub(crate) x0: f64,
    pub(crate) y0: f64,
    pub(crate) k0: f64,
}

impl ProjData {
    // ----------------
    // Datum definition
    // ----------------
    fn datum_defn<'a>(params: &'a ParamList) -> Result<Option<&'a DatumDefn>> {
        params
            .get("datum")
            .map(|p| match datums::find_datum(p.try_into()?) {
                Some(v) => Ok(Some(v)),
                None => Err(Error::InvalidDatum),
            })
            .unwrap_or(Ok(None))
    }

    // --------------
    // Prime meridian
    // --------------
    fn prime_meridian(params: &ParamList) -> Result<f64> {
        params
            .get("pm")
            .map(
                |p| match prime_meridians::find_prime_meridian(p.try_into()?) {
                    Some(v) => Ok(v),
                    None => f64::try_from(p),
                },
            )
            .unwrap_or(Ok(0.))
    }

    // -----------------
    // Datum parameters
    // ----------------
    fn datum_params(params: &ParamList, defn: Option<&DatumDefn>) -> Result<DatumParams> {
        // Precedence order is 'nadgrids', 'towgs84', 'datum'
        if let Some(p) = params.get("nadgrids") {
            DatumParams::from_nadgrids_str(p.try_into()?)
        } else if let Some(p) = params.get("towgs84") {
            DatumParams::from_towgs84_str(p.try_into()?)
        } else if let Some(defn) = defn {
            DatumParams::try_from(defn)
        } else {
            Ok(DatumParams::NoDatum)
        }
    }

    // -----------------
    // Ellipsoid
    // ----------------
    fn ellipsoid(params: &ParamList, datum_def: Option<&DatumDefn>) -> Result<Ellipsoid> {
        if let Some(radius) = params.get("R") {
            Ellipsoid::sphere(radius.try_into()?)
        } else {
            let r_a = params.check_option("R_A")?;
            if let Some(p) = params.get("ellps") {
                match ellipsoids::find_ellipsoid(p.try_into()?) {
                    Some(defn) => Ellipsoid::try_from_ellipsoid_with_params(defn, params, r_a),
                    None => Err(Error::InvalidEllipsoid),
                }
            } else if let Some(defn) = datum_def {
                Ellipsoid::try_from_ellipsoid_with_params(defn.ellps, params, r_a)
            } else {
                Ellipsoid::try_from_ellipsoid_with_params(&ellipsoids::constants::WGS84, params, r_a)
            }
        }
    }

    // -----------------
    // Axis
    // ----------------
    fn axis(params: &ParamList) -> Result<Axis> {
        if let Some(p) = params.get("axis") {
            let axis_arg: &str = p.try_into()?;
            if axis_arg.len() != 3 {
                Err(Error::InvalidAxis)
            } else {
                let mut axis = [0u8, 0u8, 0u8];
                let ew = axis_arg.find(['e', 'w']).ok_or(Error::InvalidAxis)?;
                let ns = axis_arg.find(['n', 's']).ok_or(Error::InvalidAxis)?;
                let ud = axis_arg.find(['u', 'd']).ok_or(Error::InvalidAxis)?;
                axis[ew] = axis_arg.as_bytes()[ew];
                axis[ns] = axis_arg.as_bytes()[ns];
                axis[ud] = axis_arg.as_bytes()[ud];
                Ok(axis)
            }
        } else {
            Ok(NORMALIZED_AXIS)
        }
    }

    pub fn normalized_axis(&self) -> bool {
        self.axis == NORMALIZED_AXIS
    }

    // -----------------
    // Units
    // ----------------
    fn units(params: &ParamList) -> Result<f64> {
        if let Some(p) = params.get("to_meter") {
            f64::try_from(p)
        } else if let Some(p) = params.get("units") {
            let name: &str = p.try_into()?;
            units::find_units(name)
                .map(|u| u.to_meter)
                .ok_or_else(|| Error::InvalidParameterValue("Unknown unit name"))
        } else {
            Ok(1.)
        }
    }

    fn vunits(params: &ParamList) -> Result<f64> {
        if let Some(p) = params.get("vto_meter") {
            f64::try_from(p)
        } else if let Some(p) = params.get("vunits") {
            let name: &str = p.try_into()?;
            units::find_units(name)
                .map(|u| u.to_meter)
                .ok_or_else(|| Error::InvalidParameterValue("Unknown unit name"))
        } else {
            Ok(1.)
        }
    }

    fn k0(params: &ParamList) -> Result<f64> {
        if let Some(k) = params.try_value::<f64>("k_0")? {
            Ok(k)
        } else if let Some(k) = params.try_value::<f64>("k")? {
            Ok(k)
        } else {
            Ok(1.)
        }
    }

    fn long0(params: &ParamList) -> Result<f64> {
        if let Some(v) = params.try_angular_value("long_0")? {
            Ok(v)
        } else {
            params.try_angular_value("lon_0").map(|v| v.unwrap_or(0.))
        }
    }

    /// Build a `ProjData` from a parsed parameter list, resolving any
    /// nadgrids against `provider`. Does not yet dispatch to a projection
    /// `init`; see [`Proj::init`].
    fn from_params(params: &ParamList, provider: &dyn GridProvider) -> Result<Self> {
        let datum_defn = Self::datum_defn(params)?;
        let datum_params = Self::datum_params(params, datum_defn)?;
        let ellps = Self::ellipsoid(params, datum_defn)?;
        let datum = Datum::new(&ellps, &datum_params, provider)?;
        let from_greenwich = Self::prime_meridian(params)?;
        let axis = Self::axis(params)?;
        let to_meter = Self::units(params)?;
        let vto_meter = Self::vunits(params)?;
        let k0 = Self::k0(params)?;
        let lam0 = Self::long0(params)?;
        let phi0 = params.try_angular_value("lat_0")?.unwrap_or(0.);
        let x0 = params.try_value::<f64>("x_0")?.unwrap_or(0.);
        let y0 = params.try_value::<f64>("y_0")?.unwrap_or(0.);
        let over = params.check_option("over")?;
        let geoc = params.check_option("geoc")? && !ellps.is_sphere();

        Ok(Self {
            ellps,
            datum,
            axis,
            to_meter,
            vto_meter,
            from_greenwich,
            is_geocent: false,
            is_latlong: false,
            geoc,
            over,
            lam0,
            phi0,
            x0,
            y0,
            k0,
        })
    }

    pub fn ellps(&self) -> &Ellipsoid {
        &self.ellps
    }

    pub fn datum(&self) -> &Datum {
        &self.datum
    }
}

/// A fully initialised coordinate reference system: parameter record plus
/// the dispatched projection implementation bound to it.
#[derive(Debug)]
pub struct Proj {
    pub(crate) data: ProjData,
    delegate: ProjDelegate,
    name: &'static str,
}

impl Proj {
    /// Parse and initialise a CRS from a PROJ string, with no grid
    /// provider: a `+nadgrids=` parameter naming a mandatory grid fails.
    pub fn from_proj_string(s: &str) -> Result<Self> {
        Self::from_proj_string_with_provider(s, &MemoryGridProvider::empty())
    }

    /// Parse and initialise a CRS from a PROJ string, resolving any
    /// `+nadgrids=` list against `provider`.
    pub fn from_proj_string_with_provider(s: &str, provider: &dyn GridProvider) -> Result<Self> {
        Self::init(projstring::parse(s)?, provider)
    }

    /// Parse and initialise a CRS from WKT1 or WKT2 text.
    pub fn from_wkt(s: &str) -> Result<Self> {
        Self::from_proj_string(&crate::wkt::to_proj_string(s)?)
    }

    /// Parse and initialise a CRS from a PROJJSON document.
    pub fn from_projjson(s: &str) -> Result<Self> {
        Self::from_proj_string(&crate::projjson::to_proj_string(s)?)
    }

    /// Parse and initialise a CRS from a definition of any supported
    /// textual format, detected from its first non-whitespace character:
    /// `+` is a PROJ string, `{` is PROJJSON, anything else is WKT.
    pub fn from_definition(s: &str) -> Result<Self> {
        Self::from_proj_string(&crate::registry::to_proj_string(s)?)
    }

    /// Build a CRS from an already-parsed parameter list.
    pub fn init(params: ParamList, provider: &dyn GridProvider) -> Result<Self> {
        let name: &str = params
            .get("proj")
            .ok_or(Error::MissingProjectionError)?
            .try_into()?;

        let init = find_projection(name).ok_or(Error::ProjectionNotFound)?;

        let mut data = ProjData::from_params(&params, provider)?;
        let delegate = init.init(&mut data, &params)?;

        Ok(Self {
            data,
            delegate,
            name: init.name(),
        })
    }

    pub fn projname(&self) -> &'static str {
        self.name
    }

    pub fn data(&self) -> &ProjData {
        &self.data
    }

    pub fn ellps(&self) -> &Ellipsoid {
        &self.data.ellps
    }

    pub fn datum(&self) -> &Datum {
        &self.data.datum
    }

    pub fn axis(&self) -> &Axis {
        &self.data.axis
    }

    pub fn normalized_axis(&self) -> bool {
        self.data.normalized_axis()
    }

    pub fn is_latlong(&self) -> bool {
        self.data.is_latlong
    }

    pub fn is_geocent(&self) -> bool {
        self.data.is_geocent
    }

    pub fn has_inverse(&self) -> bool {
        self.delegate.has_inverse()
    }

    pub fn has_forward(&self) -> bool {
        self.delegate.has_forward()
    }

    /// Single-CRS inverse projection: cartesian/projected coordinates in
    /// this CRS's own units back to geographic (lam, phi, z) in radians.
    ///
    /// Mirrors the classic `pj_inv` wrapper: the projection's own
    /// delegate works on a normalized (a=1) ellipsoid, so the false
    /// easting/northing, unit and `lam0` adjustments applied here are
    /// kept out of every individual projection module.
    pub(crate) fn inverse(&self, x: f64, y: f64, z: f64) -> Result<(f64, f64, f64)> {
        let p = &self.data;
        if (p.is_latlong && !p.geoc) || p.is_geocent {
            return self.delegate.inverse(x, y, z);
        }
        if x.is_nan() || y.is_nan() {
            return Err(Error::NanCoordinateValue);
        }
        let (mut lam, mut phi, z) = self.delegate.inverse(
            (x * p.to_meter - p.x0) * p.ellps.ra,
            (y * p.to_meter - p.y0) * p.ellps.ra,
            z,
        )?;
        lam += p.lam0;
        if !p.over {
            lam = adjlon(lam);
        }
        if p.geoc && (phi.abs() - FRAC_PI_2).abs() > EPS_12 {
            phi = (p.ellps.one_es * phi.tan()).atan();
        }
        Ok((lam, phi, z))
    }

    /// Single-CRS forward projection: geographic (lam, phi, z) in radians
    /// to this CRS's cartesian/projected coordinates in its own units.
    pub(crate) fn forward(&self, lam: f64, phi: f64, z: f64) -> Result<(f64, f64, f64)> {
        let p = &self.data;
        if (p.is_latlong && !p.geoc) || p.is_geocent {
            return self.delegate.forward(lam, phi, z);
        }
        if lam.is_nan() || phi.is_nan() {
            return Err(Error::NanCoordinateValue);
        }
        let t = phi.abs() - FRAC_PI_2;
        if t > EPS_12 || lam.abs() > 10. {
            return Err(Error::CoordinateOutOfRange);
        }
        let lam = if !p.over {
            adjlon(lam - p.lam0)
        } else {
            lam - p.lam0
        };
        let phi = if t.abs() <= EPS_12 {
            if phi < 0. {
                -FRAC_PI_2
            } else {
                FRAC_PI_2
            }
        } else if p.geoc {
            (p.ellps.rone_es * phi.tan()).atan()
        } else {
            phi
        };
        let (x, y, z) = self.delegate.forward(lam, phi, z)?;
        let fr_meter = 1. / p.to_meter;
        Ok((
            fr_meter * (p.ellps.a * x + p.x0),
            fr_meter * (p.ellps.a * y + p.y0),
            z,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TESTMERC: &str = "+proj=merc +lon_0=5.937 +lat_ts=45.027 +ellps=sphere";
    const INVALID_ELLPS: &str = "+proj=merc +lon_0=5.937 +lat_ts=45.027 +ellps=foo";

    #[test]
    fn proj_test_merc() {
        Proj::from_proj_string(TESTMERC).unwrap();
    }

    #[test]
    fn proj_invalid_ellps_param() {
        let p = Proj::from_proj_string(INVALID_ELLPS);
        assert!(matches!(p.unwrap_err(), Error::InvalidEllipsoid));
    }

    #[test]
    fn proj_unknown_projection() {
        let p = Proj::from_proj_string("+proj=bogus +ellps=WGS84");
        assert!(matches!(p.unwrap_err(), Error::ProjectionNotFound));
    }

    #[test]
    fn proj_from_definition_detects_format() {
        let from_proj = Proj::from_definition("+proj=longlat +ellps=WGS84").unwrap();
        assert!(from_proj.is_latlong());

        let from_wkt = Proj::from_definition(
            r#"GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563]],UNIT["degree",0.0174532925199433]]"#,
        )
        .unwrap();
        assert!(from_wkt.is_latlong());

        let from_json = Proj::from_definition(
            r#"{"type":"GeographicCRS","name":"WGS 84","datum":{"type":"GeodeticReferenceFrame","name":"World Geodetic System 1984","ellipsoid":{"name":"WGS 84","semi_major_axis":6378137,"inverse_flattening":298.257223563}}}"#,
        )
        .unwrap();
        assert!(from_json.is_latlong());
    }
}
