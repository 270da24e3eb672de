//!
//! Handle datum parameters
//!
use crate::constants::SEC_TO_RAD;
use crate::datums::DatumParamDefn;
use crate::errors::{Error, Result};

/// Datum parameters, classified per the rule in the CRS parameter derivation:
/// nadgrids take precedence, then a 7-element towgs84 list, then a 3-element
/// list, then an explicit datum code, defaulting to no datum shift at all.
#[derive(Clone, Debug, PartialEq)]
pub enum DatumParams {
    /// No datum information supplied at all; licenses skipping the
    /// datum-shift pivot entirely.
    NoDatum,
    /// Datum code explicitly resolves to WGS84 (zero-parameter Helmert):
    /// still a real datum, still pivots through geocentric space.
    Wgs84,
    ToWGS84_3(f64, f64, f64),
    ToWGS84_7(f64, f64, f64, f64, f64, f64, f64),
    NadGrids(String),
}

impl Default for DatumParams {
    fn default() -> Self {
        DatumParams::NoDatum
    }
}

impl DatumParams {
    /// Create parameters from a 'towgs84'-like string.
    ///
    /// Translations are expected in meters; rotations (present only in the
    /// 7-parameter form) are expected in arc-seconds and are converted to
    /// radians here. The scale term is expected in parts-per-million and is
    /// converted to the `1 + s/1e6` factor used by the Bursa-Wolf formula.
    pub fn from_towgs84_str(towgs84: &str) -> Result<Self> {
        let mut i = towgs84.split(',');

        #[inline]
        fn parse(v: Option<&str>) -> Result<f64> {
            v.unwrap()
                .trim()
                .parse::<f64>()
                .map_err(|_| Error::InvalidToWGS84String)
        }

        match towgs84.split(',').count() {
            3 => Ok(DatumParams::ToWGS84_3(
                parse(i.next())?,
                parse(i.next())?,
                parse(i.next())?,
            )),
            7 => {
                let dx = parse(i.next())?;
                let dy = parse(i.next())?;
                let dz = parse(i.next())?;
                let rx = parse(i.next())? * SEC_TO_RAD;
                let ry = parse(i.next())? * SEC_TO_RAD;
                let rz = parse(i.next())? * SEC_TO_RAD;
                let s = parse(i.next())? / 1_000_000.0 + 1.;
                Ok(DatumParams::ToWGS84_7(dx, dy, dz, rx, ry, rz, s))
            }
            _ => Err(Error::InvalidToWGS84String),
        }
    }

    pub fn from_nadgrids_str(nadgrids: &str) -> Result<Self> {
        Ok(DatumParams::NadGrids(nadgrids.to_string()))
    }

    /// Return true if all translation/rotation/scale components are zero,
    /// i.e. this is equivalent to an identity (WGS84) shift.
    pub fn is_identity(&self) -> bool {
        match self {
            DatumParams::NoDatum => true,
            DatumParams::Wgs84 => true,
            DatumParams::ToWGS84_3(dx, dy, dz) => *dx == 0. && *dy == 0. && *dz == 0.,
            DatumParams::ToWGS84_7(dx, dy, dz, rx, ry, rz, s) => {
                *dx == 0.
                    && *dy == 0.
                    && *dz == 0.
                    && *rx == 0.
                    && *ry == 0.
                    && *rz == 0.
                    && *s == 1.
            }
            DatumParams::NadGrids(_) => false,
        }
    }
}

// Convert from the static datum parameters definition
impl TryFrom<&DatumParamDefn> for DatumParams {
    type Error = Error;

    fn try_from(defn: &DatumParamDefn) -> Result<Self> {
        match defn {
            DatumParamDefn::ToWGS84_0 => Ok(Self::Wgs84),
            DatumParamDefn::ToWGS84_3(dx, dy, dz) => Ok(Self::ToWGS84_3(*dx, *dy, *dz)),
            DatumParamDefn::ToWGS84_7(dx, dy, dz, rx, ry, rz, s) => Ok(Self::ToWGS84_7(
                *dx,
                *dy,
                *dz,
                *rx * SEC_TO_RAD,
                *ry * SEC_TO_RAD,
                *rz * SEC_TO_RAD,
                *s / 1_000_000.0 + 1.,
            )),
            DatumParamDefn::NadGrids(s) => Self::from_nadgrids_str(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datum_params_towgs84_3() {
        let p = DatumParams::from_towgs84_str("1.0,2.0,3.0").unwrap();
        assert_eq!(p, DatumParams::ToWGS84_3(1.0, 2.0, 3.0));
    }

    #[test]
    fn datum_params_towgs84_7_scales_rotations_only() {
        let p = DatumParams::from_towgs84_str("1,2,3,4,5,6,7").unwrap();
        match p {
            DatumParams::ToWGS84_7(dx, dy, dz, rx, ry, rz, s) => {
                assert_eq!((dx, dy, dz), (1., 2., 3.));
                assert!((rx - 4. * SEC_TO_RAD).abs() < 1e-18);
                assert!((ry - 5. * SEC_TO_RAD).abs() < 1e-18);
                assert!((rz - 6. * SEC_TO_RAD).abs() < 1e-18);
                assert!((s - (1. + 7. / 1_000_000.0)).abs() < 1e-15);
            }
            _ => panic!("expected ToWGS84_7"),
        }
    }

    #[test]
    fn datum_params_invalid_count() {
        assert!(DatumParams::from_towgs84_str("1,2").is_err());
    }

    #[test]
    fn datum_params_identity() {
        assert!(DatumParams::NoDatum.is_identity());
        assert!(DatumParams::Wgs84.is_identity());
        assert!(DatumParams::ToWGS84_3(0., 0., 0.).is_identity());
        assert!(!DatumParams::ToWGS84_3(1., 0., 0.).is_identity());
    }

    #[test]
    fn datum_params_towgs84_0_is_wgs84_not_nodatum() {
        let p = DatumParams::try_from(&DatumParamDefn::ToWGS84_0).unwrap();
        assert_eq!(p, DatumParams::Wgs84);
        assert_ne!(p, DatumParams::NoDatum);
    }
}
