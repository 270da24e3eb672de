//!
//! Cross-module integration tests exercising the public API end to end:
//! datum-shift transforms, null-datum transforms, and format-detecting
//! constructors.
//!
use approx::assert_abs_diff_eq;
use geocrs::adaptors::{converter, transform_xy};
use geocrs::proj::Proj;
use geocrs::transform;

#[test]
fn transform_with_datum_shift() {
    // EPSG:3006 - Sweden coordinate reference system
    let sweref99tm = concat!(
        "+proj=utm +zone=33 +ellps=GRS80 ",
        "+towgs84=0,0,0,0,0,0,0 +units=m +no_defs"
    );
    // EPSG:3021 - Sweden coordinate reference system
    let rt90 = concat!(
        "+proj=tmerc +lon_0=15.808277777799999 +lat_0=0.0 +k=1.0 ",
        "+x_0=1500000.0 +y_0=0.0 +ellps=bessel ",
        "+units=m +towgs84=414.1,41.3,603.1,-0.855,2.141,-7.023,0 ",
        "+no_defs"
    );

    let from = Proj::from_proj_string(sweref99tm).unwrap();
    let to = Proj::from_proj_string(rt90).unwrap();

    let mut inp = (319180., 6399862., 0.);
    transform::transform(&from, &to, &mut inp).unwrap();
    assert_abs_diff_eq!(inp.0, 1271137.92755580, epsilon = 1.0e-6);
    assert_abs_diff_eq!(inp.1, 6404230.29136189, epsilon = 1.0e-6);
}

#[test]
fn transform_null_datum() {
    // EPSG:2154
    let epsg2154 = concat!(
        "+proj=lcc +lat_0=46.5 +lon_0=3 +lat_1=49 +lat_2=44 ",
        "+x_0=700000 +y_0=6600000 +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 ",
        "+units=m +no_defs"
    );
    // EPSG:3857
    let epsg3857 = concat!(
        "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 ",
        "+units=m +nadgrids=@null +wktext +no_defs",
    );

    let from = Proj::from_proj_string(epsg2154).unwrap();
    let to = Proj::from_proj_string(epsg3857).unwrap();

    let mut inp = (489353.59, 6587552.2, 0.);
    transform::transform(&from, &to, &mut inp).unwrap();
    assert_abs_diff_eq!(inp.0, 28943.07106250, epsilon = 1.0e-6);
    assert_abs_diff_eq!(inp.1, 5837421.86618963, epsilon = 1.0e-6);
}

#[test]
fn longlat_alias_parses() {
    let wgs84 = concat!(
        "+title=WGS 84 (long/lat) +proj=longlat +ellps=WGS84 ",
        "+datum=WGS84 +units=degrees",
    );
    assert!(Proj::from_proj_string(wgs84).is_ok());
}

#[test]
fn wkt_and_projjson_agree_with_proj_string() {
    let from_proj = Proj::from_definition("+proj=longlat +ellps=WGS84").unwrap();
    let from_wkt = Proj::from_wkt(
        r#"GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563]],UNIT["degree",0.0174532925199433]]"#,
    )
    .unwrap();
    let from_json = Proj::from_projjson(
        r#"{"type":"GeographicCRS","name":"WGS 84","datum":{"type":"GeodeticReferenceFrame","name":"World Geodetic System 1984","ellipsoid":{"name":"WGS 84","semi_major_axis":6378137,"inverse_flattening":298.257223563}}}"#,
    )
    .unwrap();

    assert!(from_proj.is_latlong() && from_wkt.is_latlong() && from_json.is_latlong());
}

#[test]
fn registry_round_trip_through_converter() {
    use geocrs::registry::Registry;

    let reg = Registry::new();
    let wgs84 = reg.get("EPSG:4326").unwrap();
    let utm31n = reg.get("EPSG:32631").unwrap();

    let c = converter(&wgs84, &utm31n);
    let (x, y, _) = c
        .forward((3.0_f64.to_radians(), 50.0_f64.to_radians(), 0.))
        .unwrap();
    assert!(x > 0. && y > 0.);

    let (lam, phi, _) = c.inverse((x, y, 0.)).unwrap();
    assert_abs_diff_eq!(lam, 3.0_f64.to_radians(), epsilon = 1.0e-9);
    assert_abs_diff_eq!(phi, 50.0_f64.to_radians(), epsilon = 1.0e-9);
}

#[test]
fn mgrs_forward_and_inverse_round_trip() {
    use geocrs::mgrs::{forward, inverse};

    let s = forward(16.41450, 48.24949, 5).unwrap();
    assert_eq!(s, "33UXP0500444997");

    let (lon, lat) = inverse(&s).unwrap();
    assert_abs_diff_eq!(lon, 16.41450, epsilon = 1.0e-3);
    assert_abs_diff_eq!(lat, 48.24949, epsilon = 1.0e-3);
}

#[test]
fn transform_xy_smoke() {
    let src = Proj::from_proj_string("+proj=longlat +ellps=WGS84").unwrap();
    let dst = Proj::from_proj_string("+proj=merc +ellps=WGS84").unwrap();
    let (x, y) = transform_xy(&src, &dst, 0., 0.).unwrap();
    assert_abs_diff_eq!(x, 0., epsilon = 1.0e-6);
    assert_abs_diff_eq!(y, 0., epsilon = 1.0e-6);
}
