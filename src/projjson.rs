//!
//! PROJJSON front-end.
//!
//! Mirrors [`crate::wkt`]'s canonicalisation: walk the JSON tree and
//! render an equivalent PROJ string, fed through the existing
//! [`crate::projstring`] parser.
//!
use serde_json::Value;

use crate::errors::{Error, Result};

const PARAM_RENAME: &[(&str, &str)] = &[
    ("latitude_of_origin", "lat_0"),
    ("latitude_of_natural_origin", "lat_0"),
    ("latitude_of_center", "lat_0"),
    ("latitude_of_projection_centre", "lat_0"),
    ("latitude_of_false_origin", "lat_0"),
    ("central_meridian", "lon_0"),
    ("longitude_of_origin", "lon_0"),
    ("longitude_of_natural_origin", "lon_0"),
    ("longitude_of_center", "lon_0"),
    ("longitude_of_projection_centre", "lon_0"),
    ("longitude_of_false_origin", "lon_0"),
    ("standard_parallel_1", "lat_1"),
    ("latitude_of_1st_standard_parallel", "lat_1"),
    ("standard_parallel_2", "lat_2"),
    ("latitude_of_2nd_standard_parallel", "lat_2"),
    ("scale_factor", "k_0"),
    ("scale_factor_at_natural_origin", "k_0"),
    ("scale_factor_on_initial_line", "k_0"),
    ("false_easting", "x_0"),
    ("easting_at_false_origin", "x_0"),
    ("easting_at_projection_centre", "x_0"),
    ("false_northing", "y_0"),
    ("northing_at_false_origin", "y_0"),
    ("northing_at_projection_centre", "y_0"),
    ("azimuth", "alpha"),
    ("azimuth_of_initial_line", "alpha"),
    ("rectified_grid_angle", "gamma"),
    ("angle_from_rectified_to_skew_grid", "gamma"),
];

const PROJECTION_RENAME: &[(&str, &str)] = &[
    ("transverse_mercator", "tmerc"),
    ("mercator", "merc"),
    ("mercator_1sp", "merc"),
    ("mercator_2sp", "merc"),
    ("popular_visualisation_pseudo_mercator", "webmerc"),
    ("lambert_conformal_conic_1sp", "lcc"),
    ("lambert_conformal_conic_2sp", "lcc"),
    ("albers_conic_equal_area", "aea"),
    ("albers_equal_area", "aea"),
    ("polar_stereographic", "stere"),
    ("oblique_mercator", "omerc"),
    ("hotine_oblique_mercator", "omerc"),
    ("hotine_oblique_mercator_azimuth_center", "omerc"),
    ("lambert_azimuthal_equal_area", "laea"),
    ("equidistant_conic", "eqdc"),
    ("sinusoidal", "sinu"),
    ("mollweide", "moll"),
];

const DATUM_RENAME: &[(&str, &str)] = &[
    ("world_geodetic_system_1984", "WGS84"),
    ("wgs_1984", "WGS84"),
    ("north_american_datum_1983", "NAD83"),
    ("north_american_datum_1927", "NAD27"),
    ("new_zealand_geodetic_datum_1949", "nzgd49"),
    ("greek_geodetic_reference_system_1987", "GGRS87"),
];

fn normalize_key(s: &str) -> String {
    s.trim()
        .to_ascii_lowercase()
        .replace(' ', "_")
        .trim_matches('_')
        .to_string()
}

fn lookup<'a>(table: &'a [(&str, &str)], key: &str) -> Option<&'a str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

fn obj<'a>(v: &'a Value, key: &str) -> Option<&'a Value> {
    v.get(key)
}

fn as_str<'a>(v: &'a Value) -> Option<&'a str> {
    v.as_str()
}

fn as_f64(v: &Value) -> Option<f64> {
    v.as_f64()
}

/// Render the `ellipsoid` node of a `datum`/`geodetic_reference_frame`.
fn render_ellipsoid(ellipsoid: &Value, out: &mut Vec<String>) -> Result<()> {
    let a = obj(ellipsoid, "semi_major_axis")
        .and_then(as_f64)
        .ok_or_else(|| Error::ProjJsonFieldError("ellipsoid.semi_major_axis"))?;
    out.push(format!("+a={a}"));
    if let Some(rf) = obj(ellipsoid, "inverse_flattening").and_then(as_f64) {
        out.push(format!("+rf={rf}"));
    } else if let Some(b) = obj(ellipsoid, "semi_minor_axis").and_then(as_f64) {
        out.push(format!("+b={b}"));
    }
    Ok(())
}

fn render_datum(datum: &Value, out: &mut Vec<String>) -> Result<()> {
    if let Some(name) = obj(datum, "name").and_then(as_str) {
        if let Some(id) = lookup(DATUM_RENAME, &normalize_key(name)) {
            out.push(format!("+datum={id}"));
        }
    }
    if let Some(ellipsoid) = obj(datum, "ellipsoid") {
        render_ellipsoid(ellipsoid, out)?;
    }
    if let Some(pm) = obj(datum, "prime_meridian") {
        if let Some(lon) = obj(pm, "longitude").and_then(as_f64) {
            if lon != 0. {
                out.push(format!("+pm={lon}"));
            }
        }
    }
    Ok(())
}

/// A `geographic_crs`/`base_crs` node: datum (or datum_ensemble) plus unit.
fn render_geographic_crs(node: &Value, out: &mut Vec<String>) -> Result<f64> {
    out.push("+proj=longlat".to_string());
    let datum = obj(node, "datum")
        .or_else(|| obj(node, "datum_ensemble"))
        .ok_or_else(|| Error::ProjJsonFieldError("geographic_crs.datum"))?;
    render_datum(datum, out)?;

    let angular_factor = obj(node, "coordinate_system")
        .and_then(|cs| obj(cs, "axis"))
        .and_then(|axes| axes.as_array())
        .and_then(|axes| axes.first())
        .and_then(|axis| obj(axis, "unit"))
        .and_then(angular_unit_factor)
        .unwrap_or(std::f64::consts::PI / 180.);
    Ok(angular_factor)
}

fn angular_unit_factor(unit: &Value) -> Option<f64> {
    match unit {
        Value::String(s) if s == "degree" => Some(std::f64::consts::PI / 180.),
        Value::String(s) if s == "radian" => Some(1.),
        Value::Object(_) => obj(unit, "conversion_factor").and_then(as_f64),
        _ => None,
    }
}

fn linear_unit_to_meter(unit: &Value) -> Option<f64> {
    match unit {
        Value::String(s) if s == "metre" || s == "meter" => Some(1.),
        Value::Object(_) => obj(unit, "conversion_factor").and_then(as_f64),
        _ => None,
    }
}

fn axis_letter(direction: &str) -> Option<u8> {
    match direction {
        "east" => Some(b'e'),
        "west" => Some(b'w'),
        "north" => Some(b'n'),
        "south" => Some(b's'),
        "up" => Some(b'u'),
        "down" => Some(b'd'),
        _ => None,
    }
}

fn axis_order(cs: &Value) -> Option<String> {
    let axes = obj(cs, "axis")?.as_array()?;
    if axes.len() < 2 {
        return None;
    }
    let mut letters = Vec::new();
    for axis in axes {
        let dir = obj(axis, "direction").and_then(as_str)?;
        letters.push(axis_letter(dir)?);
    }
    while letters.len() < 3 {
        letters.push(b'u');
    }
    String::from_utf8(letters).ok()
}

fn render_projected_crs(root: &Value, out: &mut Vec<String>) -> Result<()> {
    let base = obj(root, "base_crs").ok_or_else(|| Error::ProjJsonFieldError("projected_crs.base_crs"))?;
    let angular_factor = render_geographic_crs(base, out)?;
    // Strip the `+proj=longlat` emitted for the base CRS; the projected
    // conversion replaces it below.
    out.retain(|p| p != "+proj=longlat");

    let conversion = obj(root, "conversion")
        .ok_or_else(|| Error::ProjJsonFieldError("projected_crs.conversion"))?;
    let method_name = obj(conversion, "method")
        .and_then(|m| obj(m, "name"))
        .and_then(as_str)
        .ok_or_else(|| Error::ProjJsonFieldError("conversion.method.name"))?;
    let proj_name = lookup(PROJECTION_RENAME, &normalize_key(method_name))
        .ok_or_else(|| Error::UnrecognizedFormat)?;
    out.insert(0, format!("+proj={proj_name}"));

    if let Some(params) = obj(conversion, "parameters").and_then(|p| p.as_array()) {
        for param in params {
            let name = obj(param, "name")
                .and_then(as_str)
                .ok_or_else(|| Error::ProjJsonFieldError("parameter.name"))?;
            let value = obj(param, "value")
                .and_then(as_f64)
                .ok_or_else(|| Error::ProjJsonFieldError("parameter.value"))?;
            let key = lookup(PARAM_RENAME, &normalize_key(name))
                .ok_or_else(|| Error::UnrecognizedFormat)?;
            let unit_factor = obj(param, "unit").and_then(angular_unit_factor);
            let value = match key {
                "lat_0" | "lon_0" | "lat_1" | "lat_2" | "alpha" | "gamma" => {
                    (value * unit_factor.unwrap_or(angular_factor)).to_degrees()
                }
                _ => value,
            };
            out.push(format!("+{key}={value}"));
        }
    }

    if let Some(cs) = obj(root, "coordinate_system") {
        if let Some(axes) = obj(cs, "axis").and_then(|a| a.as_array()) {
            if let Some(unit) = axes.first().and_then(|a| obj(a, "unit")) {
                if let Some(to_meter) = linear_unit_to_meter(unit) {
                    if (to_meter - 1.).abs() > 1e-12 {
                        out.push(format!("+to_meter={to_meter}"));
                    }
                }
            }
        }
        if let Some(axis) = axis_order(cs) {
            out.push(format!("+axis={axis}"));
        }
    }

    Ok(())
}

/// Convert a PROJJSON document to an equivalent PROJ string.
pub fn to_proj_string(text: &str) -> Result<String> {
    let root: Value = serde_json::from_str(text)?;
    let ty = obj(&root, "type").and_then(as_str).unwrap_or("");

    let mut out = Vec::new();
    match ty {
        "GeographicCRS" => {
            render_geographic_crs(&root, &mut out)?;
        }
        "ProjectedCRS" => {
            render_projected_crs(&root, &mut out)?;
        }
        _ => return Err(Error::UnrecognizedFormat),
    }
    Ok(out.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proj::Proj;

    #[test]
    fn projjson_geographic_crs() {
        let json = r#"{
            "type": "GeographicCRS",
            "name": "WGS 84",
            "datum": {
                "type": "GeodeticReferenceFrame",
                "name": "World Geodetic System 1984",
                "ellipsoid": { "name": "WGS 84", "semi_major_axis": 6378137, "inverse_flattening": 298.257223563 }
            },
            "coordinate_system": {
                "subtype": "ellipsoidal",
                "axis": [
                    { "name": "Geodetic latitude", "abbreviation": "Lat", "direction": "north", "unit": "degree" },
                    { "name": "Geodetic longitude", "abbreviation": "Lon", "direction": "east", "unit": "degree" }
                ]
            }
        }"#;
        let s = to_proj_string(json).unwrap();
        assert!(s.contains("+proj=longlat"));
        assert!(s.contains("+a=6378137"));
        assert!(s.contains("+datum=WGS84"));
        let p = Proj::from_proj_string(&s).unwrap();
        assert!(p.is_latlong());
    }

    #[test]
    fn projjson_projected_crs_utm() {
        let json = r#"{
            "type": "ProjectedCRS",
            "name": "WGS 84 / UTM zone 31N",
            "base_crs": {
                "type": "GeographicCRS",
                "name": "WGS 84",
                "datum": {
                    "type": "GeodeticReferenceFrame",
                    "name": "World Geodetic System 1984",
                    "ellipsoid": { "name": "WGS 84", "semi_major_axis": 6378137, "inverse_flattening": 298.257223563 }
                }
            },
            "conversion": {
                "name": "UTM zone 31N",
                "method": { "name": "Transverse Mercator" },
                "parameters": [
                    { "name": "Latitude of natural origin", "value": 0, "unit": "degree" },
                    { "name": "Longitude of natural origin", "value": 3, "unit": "degree" },
                    { "name": "Scale factor at natural origin", "value": 0.9996, "unit": "unity" },
                    { "name": "False easting", "value": 500000, "unit": "metre" },
                    { "name": "False northing", "value": 0, "unit": "metre" }
                ]
            },
            "coordinate_system": {
                "subtype": "Cartesian",
                "axis": [
                    { "name": "Easting", "abbreviation": "E", "direction": "east", "unit": "metre" },
                    { "name": "Northing", "abbreviation": "N", "direction": "north", "unit": "metre" }
                ]
            }
        }"#;
        let s = to_proj_string(json).unwrap();
        assert!(s.contains("+proj=tmerc"));
        assert!(s.contains("+lon_0=3"));
        let p = Proj::from_proj_string(&s).unwrap();
        let (x, y, _) = p.forward(3.0_f64.to_radians(), 50.0_f64.to_radians(), 0.).unwrap();
        assert!(x > 0. && y > 0.);
    }
}
