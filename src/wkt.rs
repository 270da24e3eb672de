//!
//! WKT1 / WKT2 front-end.
//!
//! A generic keyword-and-bracket tokeniser builds a tree from the
//! input text; a canonicalisation pass then walks that tree and
//! re-renders it as a PROJ string, which is handed to the existing
//! [`crate::projstring`] parser. This keeps a single parameter-record
//! builder in the crate instead of a second one duplicated per
//! front-end.
//!
use crate::errors::{Error, Result};

#[derive(Debug, Clone)]
enum Value {
    Str(String),
    Num(f64),
    Node(Node),
}

#[derive(Debug, Clone)]
struct Node {
    keyword: String,
    args: Vec<Value>,
}

impl Node {
    fn child(&self, keyword: &str) -> Option<&Node> {
        self.args.iter().find_map(|v| match v {
            Value::Node(n) if n.keyword.eq_ignore_ascii_case(keyword) => Some(n),
            _ => None,
        })
    }

    fn children<'a>(&'a self, keyword: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.args.iter().filter_map(move |v| match v {
            Value::Node(n) if n.keyword.eq_ignore_ascii_case(keyword) => Some(n),
            _ => None,
        })
    }

    fn str_arg(&self, i: usize) -> Option<&str> {
        match self.args.get(i) {
            Some(Value::Str(s)) => Some(s),
            _ => None,
        }
    }

    fn num_arg(&self, i: usize) -> Option<f64> {
        match self.args.get(i) {
            Some(Value::Num(n)) => Some(*n),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------
// Tokeniser / parser
// ---------------------------------------------------------------

struct Parser<'a> {
    s: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(s: &'a str) -> Self {
        Self {
            s: s.as_bytes(),
            pos: 0,
        }
    }

    fn skip_ws(&mut self) {
        while self.pos < self.s.len() && self.s[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.s.get(self.pos).copied()
    }

    fn parse_node(&mut self) -> Result<Node> {
        self.skip_ws();
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == b'_')
        {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(Error::WktParseError("expected a keyword".into()));
        }
        let keyword = std::str::from_utf8(&self.s[start..self.pos])
            .map_err(|_| Error::WktParseError("invalid utf8".into()))?
            .to_string();

        self.skip_ws();
        let mut args = Vec::new();
        if matches!(self.peek(), Some(b'[') | Some(b'(')) {
            let close = if self.peek() == Some(b'[') { b']' } else { b')' };
            self.pos += 1;
            loop {
                self.skip_ws();
                if self.peek() == Some(close) {
                    self.pos += 1;
                    break;
                }
                args.push(self.parse_value()?);
                self.skip_ws();
                match self.peek() {
                    Some(b',') => {
                        self.pos += 1;
                    }
                    Some(c) if c == close => {
                        self.pos += 1;
                        break;
                    }
                    _ => return Err(Error::WktParseError("expected ',' or closing bracket".into())),
                }
            }
        }
        Ok(Node { keyword, args })
    }

    fn parse_value(&mut self) -> Result<Value> {
        self.skip_ws();
        match self.peek() {
            Some(b'"') => {
                self.pos += 1;
                let start = self.pos;
                while self.peek().is_some_and(|c| c != b'"') {
                    self.pos += 1;
                }
                let s = std::str::from_utf8(&self.s[start..self.pos])
                    .map_err(|_| Error::WktParseError("invalid utf8".into()))?
                    .to_string();
                self.pos += 1;
                Ok(Value::Str(s))
            }
            Some(c) if c == b'-' || c == b'.' || c.is_ascii_digit() => {
                let start = self.pos;
                self.pos += 1;
                while self
                    .peek()
                    .is_some_and(|c| c.is_ascii_digit() || c == b'.' || c == b'e' || c == b'E' || c == b'-' || c == b'+')
                {
                    self.pos += 1;
                }
                let text = std::str::from_utf8(&self.s[start..self.pos]).unwrap();
                text.parse::<f64>()
                    .map(Value::Num)
                    .map_err(|_| Error::WktParseError(format!("invalid number: {text}")))
            }
            Some(_) => self.parse_node().map(Value::Node),
            None => Err(Error::WktParseError("unexpected end of input".into())),
        }
    }
}

fn parse(text: &str) -> Result<Node> {
    let mut p = Parser::new(text);
    let node = p.parse_node()?;
    p.skip_ws();
    Ok(node)
}

// ---------------------------------------------------------------
// Canonicalisation: WKT tree -> PROJ string
// ---------------------------------------------------------------

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

// A handful of the full WKT DATUM names, normalised to the teacher's
// static proj4 datum table (`src/datums.rs`).
const DATUM_RENAME: &[(&str, &str)] = &[
    ("world_geodetic_system_1984", "WGS84"),
    ("wgs_1984", "WGS84"),
    ("north_american_datum_1983", "NAD83"),
    ("north_american_datum_1927", "NAD27"),
    ("new_zealand_geodetic_datum_1949", "nzgd49"),
    ("greek_geodetic_reference_system_1987", "GGRS87"),
    ("oslike_datum_1936", "OSGB36"),
    ("ordnance_survey_of_great_britain_1936", "OSGB36"),
];

fn normalize_key(s: &str) -> String {
    s.trim()
        .to_ascii_lowercase()
        .replace(' ', "_")
        .trim_matches('_')
        .to_string()
}

fn lookup<'a>(table: &'a [(&str, &str)], key: &str) -> Option<&'a str> {
    table
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
}

/// Ellipsoid `a`/`rf` extracted from a `SPHEROID`/`ELLIPSOID` node.
fn spheroid_params(node: &Node) -> Result<(f64, f64)> {
    let a = node
        .num_arg(1)
        .ok_or_else(|| Error::WktParseError("SPHEROID missing semi-major axis".into()))?;
    let rf = node
        .num_arg(2)
        .ok_or_else(|| Error::WktParseError("SPHEROID missing inverse flattening".into()))?;
    Ok((a, rf))
}

/// Angular unit (radians per unit) from a `UNIT` node, default degrees.
fn angular_unit_factor(node: &Node) -> f64 {
    node.child("UNIT")
        .and_then(|u| u.num_arg(1))
        .unwrap_or(std::f64::consts::PI / 180.)
}

fn linear_unit_to_meter(node: &Node) -> Option<f64> {
    node.child("UNIT").and_then(|u| u.num_arg(1))
}

fn push_param(out: &mut Vec<String>, key: &str, value: f64) {
    out.push(format!("+{key}={value}"));
}

fn canonicalize_geogcs(geogcs: &Node, out: &mut Vec<String>) -> Result<()> {
    out.push("+proj=longlat".to_string());
    if let Some(datum) = geogcs.child("DATUM") {
        let name = datum
            .str_arg(0)
            .ok_or_else(|| Error::WktParseError("DATUM missing name".into()))?;
        if let Some(id) = lookup(DATUM_RENAME, &normalize_key(name)) {
            out.push(format!("+datum={id}"));
        }
        if let Some(spheroid) = datum.child("SPHEROID") {
            let (a, rf) = spheroid_params(spheroid)?;
            out.push(format!("+a={a}"));
            out.push(format!("+rf={rf}"));
        }
        if let Some(towgs84) = datum.child("TOWGS84") {
            let values: Vec<String> = (0..towgs84.args.len())
                .filter_map(|i| towgs84.num_arg(i))
                .map(|v| v.to_string())
                .collect();
            if !values.is_empty() {
                out.push(format!("+towgs84={}", values.join(",")));
            }
        }
    }
    if let Some(primem) = geogcs.child("PRIMEM") {
        if let Some(lon) = primem.num_arg(1) {
            if lon != 0. {
                out.push(format!("+pm={lon}"));
            }
        }
    }
    Ok(())
}

/// Walk a `PROJCS`/`PROJCRS` (or bare `GEOGCS`/`GEOGCRS`/`LOCAL_CS`) tree
/// and render it as a PROJ string.
fn canonicalize(root: &Node) -> Result<String> {
    let keyword = root.keyword.to_ascii_uppercase();
    let mut out = Vec::new();

    match keyword.as_str() {
        "GEOGCS" | "GEOGCRS" => {
            canonicalize_geogcs(root, &mut out)?;
        }
        "LOCAL_CS" => {
            out.push("+proj=identity".to_string());
        }
        "PROJCS" | "PROJCRS" => {
            let geogcs = root
                .child("GEOGCS")
                .or_else(|| root.child("BASEGEOGCRS"))
                .ok_or_else(|| Error::WktParseError("PROJCS missing GEOGCS".into()))?;

            let angular_factor = angular_unit_factor(geogcs);

            let method_name = root
                .child("PROJECTION")
                .and_then(|n| n.str_arg(0))
                .or_else(|| root.child("CONVERSION").and_then(|n| n.child("METHOD")).and_then(|n| n.str_arg(0)))
                .ok_or_else(|| Error::WktParseError("PROJCS missing PROJECTION".into()))?;
            let proj_name = lookup(PROJECTION_RENAME, &normalize_key(method_name)).ok_or_else(|| {
                Error::WktParseError(format!("unsupported projection method: {method_name}"))
            })?;
            out.push(format!("+proj={proj_name}"));

            // Nested GEOGCS parameters (ellipsoid/datum/prime meridian).
            let mut geo_params = Vec::new();
            canonicalize_geogcs(geogcs, &mut geo_params)?;
            out.extend(geo_params.into_iter().filter(|p| !p.starts_with("+proj=")));

            let param_nodes = root
                .children("PARAMETER")
                .chain(
                    root.child("CONVERSION")
                        .into_iter()
                        .flat_map(|c| c.children("PARAMETER")),
                );
            for param in param_nodes {
                let name = param
                    .str_arg(0)
                    .ok_or_else(|| Error::WktParseError("PARAMETER missing name".into()))?;
                let value = param
                    .num_arg(1)
                    .ok_or_else(|| Error::WktParseError("PARAMETER missing value".into()))?;
                let key = lookup(PARAM_RENAME, &normalize_key(name)).ok_or_else(|| {
                    Error::WktParseError(format!("unsupported projection parameter: {name}"))
                })?;
                let value = match key {
                    "lat_0" | "lon_0" | "lat_1" | "lat_2" | "alpha" | "gamma" => {
                        (value * angular_factor).to_degrees()
                    }
                    _ => value,
                };
                push_param(&mut out, key, value);
            }

            if let Some(to_meter) = linear_unit_to_meter(root) {
                if (to_meter - 1.).abs() > 1e-12 {
                    out.push(format!("+to_meter={to_meter}"));
                }
            }

            let axis = axis_order(root);
            if let Some(axis) = axis {
                out.push(format!("+axis={axis}"));
            }
        }
        other => {
            return Err(Error::WktParseError(format!("unsupported root node: {other}")));
        }
    }

    Ok(out.join(" "))
}

fn axis_direction_letter(dir: &str) -> Option<u8> {
    match dir.to_ascii_uppercase().as_str() {
        "EAST" => Some(b'e'),
        "WEST" => Some(b'w'),
        "NORTH" => Some(b'n'),
        "SOUTH" => Some(b's'),
        "UP" => Some(b'u'),
        "DOWN" => Some(b'd'),
        _ => None,
    }
}

/// The direction token in `AXIS["name",EAST]` parses as a bare,
/// argument-less node (`EAST`), not a quoted string; it is always the
/// second argument, after the quoted axis name.
fn direction_word(axis: &Node) -> Option<&str> {
    match axis.args.get(1) {
        Some(Value::Node(n)) if n.args.is_empty() => Some(n.keyword.as_str()),
        Some(Value::Str(s)) => Some(s.as_str()),
        _ => None,
    }
}

fn axis_order(node: &Node) -> Option<String> {
    let axes: Vec<&Node> = node.children("AXIS").collect();
    if axes.len() < 2 {
        return None;
    }
    let mut letters = Vec::new();
    for axis in &axes {
        let dir = direction_word(axis)?;
        letters.push(axis_direction_letter(dir)?);
    }
    while letters.len() < 3 {
        letters.push(b'u');
    }
    String::from_utf8(letters).ok()
}

/// Convert WKT1/WKT2 text to an equivalent PROJ string.
pub fn to_proj_string(text: &str) -> Result<String> {
    let root = parse(text)?;
    canonicalize(&root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proj::Proj;

    #[test]
    fn wkt_geogcs_longlat() {
        let wkt = r#"GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563]],PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433]]"#;
        let s = to_proj_string(wkt).unwrap();
        assert!(s.contains("+proj=longlat"));
        assert!(s.contains("+a=6378137"));
        let p = Proj::from_proj_string(&s).unwrap();
        assert!(p.is_latlong());
    }

    #[test]
    fn wkt_projcs_utm() {
        let wkt = concat!(
            r#"PROJCS["NAD83 / UTM zone 10N","#,
            r#"GEOGCS["NAD83",DATUM["North_American_Datum_1983","#,
            r#"SPHEROID["GRS 1980",6378137,298.257222101]],"#,
            r#"PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433]],"#,
            r#"PROJECTION["Transverse_Mercator"],"#,
            r#"PARAMETER["latitude_of_origin",0],"#,
            r#"PARAMETER["central_meridian",-123],"#,
            r#"PARAMETER["scale_factor",0.9996],"#,
            r#"PARAMETER["false_easting",500000],"#,
            r#"PARAMETER["false_northing",0],"#,
            r#"UNIT["metre",1]]"#,
        );
        let s = to_proj_string(wkt).unwrap();
        assert!(s.contains("+proj=tmerc"));
        assert!(s.contains("+lon_0=-123"));
        assert!(s.contains("+k_0=0.9996"));
        let p = Proj::from_proj_string(&s).unwrap();
        let (x, y, _) = p.forward(-123.0_f64.to_radians(), 49.0_f64.to_radians(), 0.).unwrap();
        assert!(x > 0. && y > 0.);
    }
}
