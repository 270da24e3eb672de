//!
//! Transverse Mercator, exact (Poder/Engsager) engine, and the UTM wrapper
//! built on top of it.
//!
//! `+proj=utm` is this engine with `lam0`/`k0`/`x0`/`y0` derived from the
//! zone. `+proj=tmerc` dispatches to this engine too unless the ellipsoid
//! is a sphere or `approx`/`algo=evenden_snyder` asks for the short series
//! in [`super::estmerc`].
//!
use crate::errors::{Error, Result};
use crate::parameters::ParamList;
use crate::proj::ProjData;

super::projection! { etmerc, utm }

const PROJ_ETMERC_ORDER: usize = 6;

fn gatg(coeffs: &[f64; PROJ_ETMERC_ORDER], b: f64) -> f64 {
    let cos_2b = 2. * (2. * b).cos();
    let mut h1 = coeffs[5];
    let mut h2 = 0.0_f64;
    let mut h = 0.0_f64;
    for k in (0..5).rev() {
        h = -h2 + cos_2b * h1 + coeffs[k];
        h2 = h1;
        h1 = h;
    }
    b + h * (2. * b).sin()
}

fn clens(coeffs: &[f64; PROJ_ETMERC_ORDER], arg: f64) -> f64 {
    let r = 2. * arg.cos();
    let mut hr1 = 0.0_f64;
    let mut hr = coeffs[5];
    for k in (0..5).rev() {
        let hr2 = hr1;
        hr1 = hr;
        hr = -hr2 + r * hr1 + coeffs[k];
    }
    arg.sin() * hr
}

/// Complex-argument Clenshaw summation: returns (real, imag) of
/// `sum coeffs[k] * sin(2*(k+1)*(zr + i*zi))`.
fn clens_cplx(coeffs: &[f64; PROJ_ETMERC_ORDER], zr: f64, zi: f64) -> (f64, f64) {
    let sin_r = zr.sin();
    let cos_r = zr.cos();
    let sinh_i = zi.sinh();
    let cosh_i = zi.cosh();

    let r = 2. * cos_r * cosh_i;
    let i = -2. * sin_r * sinh_i;

    let mut hr1 = 0.0_f64;
    let mut hi1 = 0.0_f64;
    let mut hr = coeffs[5];
    let mut hi = 0.0_f64;
    for k in (0..5).rev() {
        let hr2 = hr1;
        let hi2 = hi1;
        hr1 = hr;
        hi1 = hi;
        hr = -hr2 + r * hr1 - i * hi1 + coeffs[k];
        hi = -hi2 + i * hr1 + r * hi1;
    }

    let r2 = sin_r * cosh_i;
    let i2 = cos_r * sinh_i;
    (r2 * hr - i2 * hi, r2 * hi + i2 * hr)
}

#[derive(Debug)]
pub(crate) struct Projection {
    qn: f64,
    zb: f64,
    cgb: [f64; PROJ_ETMERC_ORDER],
    cbg: [f64; PROJ_ETMERC_ORDER],
    utg: [f64; PROJ_ETMERC_ORDER],
    gtu: [f64; PROJ_ETMERC_ORDER],
}

impl Projection {
    fn init(es: f64, k0: f64, phi0: f64) -> Result<Self> {
        let f = es / (1. + (1. - es).sqrt());
        let n = f / (2. - f);
        let mut np = n;

        let mut cgb = [0.0_f64; 6];
        let mut cbg = [0.0_f64; 6];

        cgb[0] = n * (2. + n * (-2. / 3. + n * (-2. + n * (116. / 45. + n * (26. / 45. + n * (-2854. / 675.))))));
        cbg[0] = n * (-2. + n * (2. / 3. + n * (4. / 3. + n * (-82. / 45. + n * (32. / 45. + n * (4642. / 4725.))))));
        np *= n;
        cgb[1] = np * (7. / 3. + n * (-8. / 5. + n * (-227. / 45. + n * (2704. / 315. + n * (2323. / 945.)))));
        cbg[1] = np * (5. / 3. + n * (-16. / 15. + n * (-13. / 9. + n * (904. / 315. + n * (-1522. / 945.)))));
        np *= n;
        cgb[2] = np * (56. / 15. + n * (-136. / 35. + n * (-1262. / 105. + n * (73814. / 2835.))));
        cbg[2] = np * (-26. / 15. + n * (34. / 21. + n * (8. / 5. + n * (-12686. / 2835.))));
        np *= n;
        cgb[3] = np * (4279. / 630. + n * (-332. / 35. + n * (-399572. / 14175.)));
        cbg[3] = np * (1237. / 630. + n * (-12. / 5. + n * (-24832. / 14175.)));
        np *= n;
        cgb[4] = np * (4174. / 315. + n * (-144838. / 6237.));
        cbg[4] = np * (-734. / 315. + n * (109598. / 31185.));
        np *= n;
        cgb[5] = np * (601676. / 22275.);
        cbg[5] = np * (444337. / 155925.);

        let np2 = n * n;
        let qn = k0 / (1. + n) * (1. + np2 * (1. / 4. + np2 * (1. / 64. + np2 / 256.)));

        let mut utg = [0.0_f64; 6];
        let mut gtu = [0.0_f64; 6];

        utg[0] = n * (-0.5 + n * (2. / 3. + n * (-37. / 96. + n * (1. / 360. + n * (81. / 512. + n * (-96199. / 604800.))))));
        gtu[0] = n * (0.5 + n * (-2. / 3. + n * (5. / 16. + n * (41. / 180. + n * (-127. / 288. + n * (7891. / 37800.))))));
        let mut np = n * n;
        utg[1] = np * (-1. / 48. + n * (-1. / 15. + n * (437. / 1440. + n * (-46. / 105. + n * (1118711. / 3870720.)))));
        gtu[1] = np * (13. / 48. + n * (-3. / 5. + n * (557. / 1440. + n * (281. / 630. + n * (-1983433. / 1935360.)))));
        np *= n;
        utg[2] = np * (-17. / 480. + n * (37. / 840. + n * (209. / 4480. + n * (-5569. / 90720.))));
        gtu[2] = np * (61. / 240. + n * (-103. / 140. + n * (15061. / 26880. + n * (167603. / 181440.))));
        np *= n;
        utg[3] = np * (-4397. / 161280. + n * (11. / 504. + n * (830251. / 7257600.)));
        gtu[3] = np * (49561. / 161280. + n * (-179. / 168. + n * (6601661. / 7257600.)));
        np *= n;
        utg[4] = np * (-4583. / 161280. + n * (108847. / 3991680.));
        gtu[4] = np * (34729. / 80640. + n * (-3418889. / 1995840.));
        np *= n;
        utg[5] = np * (-20648693. / 638668800.);
        gtu[5] = np * (212378941. / 319334400.);

        let z = gatg(&cbg, phi0);
        let zb = -qn * (z + clens(&gtu, 2. * z));

        Ok(Self {
            qn,
            zb,
            cgb,
            cbg,
            utg,
            gtu,
        })
    }

    pub fn etmerc(p: &mut ProjData, _params: &ParamList) -> Result<Self> {
        Self::init(p.ellps.es, p.k0, p.phi0)
    }

    pub fn utm(p: &mut ProjData, params: &ParamList) -> Result<Self> {
        if p.ellps.es == 0. {
            return Err(Error::InvalidParameterValue("utm requires an ellipsoid"));
        }
        let zone = if let Some(z) = params.try_value::<i32>("zone")? {
            if !(1..=60).contains(&z) {
                return Err(Error::InvalidUtmZone);
            }
            z
        } else {
            let lam0_deg = p.lam0.to_degrees();
            (((lam0_deg + 180.) / 6.).floor() as i32 + 1).clamp(1, 60)
        };
        p.lam0 = (zone as f64 * 6. - 183.).to_radians();
        p.k0 = 0.9996;
        p.x0 = 500_000.;
        p.y0 = if params.check_option("south")? {
            10_000_000.
        } else {
            0.
        };
        p.phi0 = 0.;
        Self::init(p.ellps.es, p.k0, p.phi0)
    }

    pub fn forward(&self, lam: f64, phi: f64, z: f64) -> Result<(f64, f64, f64)> {
        let cn0 = gatg(&self.cbg, phi);
        let (sin_cn, cos_cn) = cn0.sin_cos();
        let (sin_ce, cos_ce) = lam.sin_cos();

        let cn = (sin_cn).atan2(cos_ce * cos_cn);
        let ce = (sin_ce * cos_cn).atan2(sin_cn.hypot(cos_cn * cos_ce));

        let ce = crate::math::asinh(ce.tan());
        let (dcn, dce) = clens_cplx(&self.gtu, 2. * cn, 2. * ce);
        let cn = cn + dcn;
        let ce = ce + dce;

        if ce.abs() <= 2.623_395_162_778 {
            Ok((self.qn * ce, self.qn * cn + self.zb, z))
        } else {
            Err(Error::CoordTransOutsideProjectionDomain)
        }
    }

    pub fn inverse(&self, x: f64, y: f64, z: f64) -> Result<(f64, f64, f64)> {
        let mut cn = (y - self.zb) / self.qn;
        let mut ce = x / self.qn;

        if ce.abs() > 2.623_395_162_778 {
            return Err(Error::CoordTransOutsideProjectionDomain);
        }

        let (dcn, dce) = clens_cplx(&self.utg, 2. * cn, 2. * ce);
        cn += dcn;
        ce += dce;
        let ce = ce.sinh().atan();

        let (sin_ce, cos_ce) = ce.sin_cos();
        let (sin_cn, cos_cn) = cn.sin_cos();

        let lam = sin_ce.atan2(cos_ce * cos_cn);
        let cn = (sin_cn * cos_ce).atan2(sin_ce.hypot(cos_ce * cos_cn));

        let phi = gatg(&self.cgb, cn);
        Ok((lam, phi, z))
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
    fn proj_utm_roundtrip() {
        let p = Proj::from_proj_string("+proj=utm +zone=31 +ellps=WGS84").unwrap();
        let (x, y, _) = p.forward(0.05, 0.8, 0.).unwrap();
        let (lam, phi, _) = p.inverse(x, y, 0.).unwrap();
        assert!((lam - 0.05).abs() < 1e-8);
        assert!((phi - 0.8).abs() < 1e-8);
    }

    #[test]
    fn proj_etmerc_roundtrip() {
        let p = Proj::from_proj_string("+proj=etmerc +lon_0=9 +ellps=WGS84").unwrap();
        let (x, y, _) = p.forward(0.02, 0.7, 0.).unwrap();
        let (lam, phi, _) = p.inverse(x, y, 0.).unwrap();
        assert!((lam - 0.02).abs() < 1e-8);
        assert!((phi - 0.7).abs() < 1e-8);
    }
}
