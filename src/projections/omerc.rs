//!
//! Hotine Oblique Mercator, azimuthal (`alpha`/`gamma`) form.
//!
//! ref: <https://proj.org/operations/projections/omerc.html>
//!
//! omerc: "Hotine Oblique Mercator" "\n\tCyl, Sph&Ell\n\tlonc= alpha= [gamma=] [no_uoff]";
//!
//! Follows IOGP Publication 373-7-2, Geomatics Guidance Note 7 part 2,
//! restricted to the single-point (azimuth at center) case; the
//! two-point (`lon_1`/`lat_1`/`lon_2`/`lat_2`) variant is not
//! implemented.
//!
use crate::errors::{Error, Result};
use crate::math::consts::{FRAC_PI_2, FRAC_PI_4};
use crate::parameters::ParamList;
use crate::proj::ProjData;

super::projection! { omerc }

#[derive(Debug)]
pub(crate) struct Projection {
    e: f64,
    es: f64,
    aa: f64,
    b: f64,
    h: f64,
    s0: f64,
    c0: f64,
    sc: f64,
    cc: f64,
    offset: f64,
    no_uoff: bool,
}

impl Projection {
    pub fn omerc(p: &mut ProjData, params: &ParamList) -> Result<Self> {
        let latc = p.phi0;
        let lonc = params.try_angular_value("lonc")?.unwrap_or(p.lam0);
        let alpha = params
            .try_angular_value("alpha")?
            .ok_or(Error::InvalidParameterValue("alpha"))?;
        let gamma_c = params.try_angular_value("gamma")?.unwrap_or(alpha);
        let no_uoff = params.check_option("no_uoff")?;

        let es = p.ellps.es;
        let e = p.ellps.e;
        let esp = es / (1. - es);

        let (s, c) = latc.sin_cos();
        let b = (1. + c.powi(4) * esp).sqrt();
        let aa = b * p.k0 * (1. - es).sqrt() / (1. - es * s * s);
        let t0 = (FRAC_PI_4 - latc * 0.5).tan() / ((1. - e * s) / (1. + e * s)).powf(e * 0.5);
        let d = b * (1. - es).sqrt() / (c * (1. - es * s * s).sqrt());
        let dd = if d < 1. { 0. } else { (d * d - 1.).sqrt() };
        let f = d + dd * latc.signum();
        let h = f * t0.powf(b);
        let g = (f - 1. / f) * 0.5;
        let gamma_0 = (alpha.sin() / d).asin();
        let lambda_0 = lonc - (g * gamma_0.tan()).asin() / b;

        let ninety = (alpha.to_degrees() - 90.).abs() < 1e-9;
        let uc = if ninety {
            aa * (lonc - lambda_0)
        } else {
            (aa / b) * dd.atan2(alpha.cos()) * latc.signum()
        };
        let offset = if no_uoff { 0. } else { uc.copysign(latc) };

        p.lam0 = lambda_0;

        let (s0, c0) = gamma_0.sin_cos();
        let (sc, cc) = gamma_c.sin_cos();

        Ok(Self {
            e,
            es,
            aa,
            b,
            h,
            s0,
            c0,
            sc,
            cc,
            offset,
            no_uoff,
        })
    }

    pub fn forward(&self, lam: f64, phi: f64, z: f64) -> Result<(f64, f64, f64)> {
        let slat = phi.sin();
        let t = (FRAC_PI_4 - phi * 0.5).tan()
            / ((1. - self.e * slat) / (1. + self.e * slat)).powf(self.e * 0.5);
        let q = self.h / t.powf(self.b);
        let s = (q - 1. / q) * 0.5;
        let tt = (q + 1. / q) * 0.5;
        let v = (self.b * lam).sin();
        let uu = (s * self.s0 - v * self.c0) / tt;
        let vv = self.aa * ((1. - uu) / (1. + uu)).ln() / (2. * self.b);
        let cblon = (self.b * lam).cos();
        let mut u = self.aa * (s * self.c0 + v * self.s0).atan2(cblon) / self.b;
        if !self.no_uoff {
            u -= self.offset;
        }
        let x = vv * self.cc + u * self.sc;
        let y = u * self.cc - vv * self.sc;
        Ok((x, y, z))
    }

    pub fn inverse(&self, x: f64, y: f64, z: f64) -> Result<(f64, f64, f64)> {
        let v = x * self.cc - y * self.sc;
        let mut u = y * self.cc + x * self.sc;
        if !self.no_uoff {
            u += self.offset;
        }

        let q = (-self.b * v / self.aa).exp();
        let s = (q - 1. / q) * 0.5;
        let tt = (q + 1. / q) * 0.5;
        let vv = (self.b * u / self.aa).sin();
        let uu = (vv * self.c0 + s * self.s0) / tt;
        let t = (self.h / ((1. + uu) / (1. - uu)).sqrt()).powf(1. / self.b);

        let chi = FRAC_PI_2 - 2. * t.atan();
        let es = self.es;
        let f = [
            0.5 + es * (5. / 24. + es * (1. / 12. + es * 13. / 360.)),
            es * (7. / 48. + es * (29. / 240. + es * 811. / 11520.)),
            es * es * (7. / 120. + es * 81. / 1120.),
            es * es * es * 4279. / 161280.,
        ];
        let sn = [
            (2. * chi).sin(),
            (4. * chi).sin(),
            (6. * chi).sin(),
            (8. * chi).sin(),
        ];
        let phi = chi + es * (f[0] * sn[0] + f[1] * sn[1] + f[2] * sn[2] + f[3] * sn[3]);
        let lam = -(s * self.c0 - vv * self.s0).atan2((self.b * u / self.aa).cos()) / self.b;
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
    use crate::math::consts::EPS_10;
    use crate::proj::Proj;

    #[test]
    fn proj_omerc_hotine_b() {
        let p = Proj::from_proj_string(
            "+proj=omerc +lat_0=4 +lonc=115 +alpha=53.31582047222222 \
             +gamma=53.13010236111111 +k_0=0.99984 +x_0=590476.87 +y_0=442857.65 \
             +a=6377298.556 +rf=300.8017",
        )
        .unwrap();

        let (x, y, _) = p
            .forward(115.8055054444_f64.to_radians(), 5.3872535833_f64.to_radians(), 0.)
            .unwrap();
        assert!((x - 679245.7281740266).abs() < 1e-3);
        assert!((y - 596562.7774687681).abs() < 1e-3);

        let (lam, phi, _) = p.inverse(x, y, 0.).unwrap();
        assert!((lam.to_degrees() - 115.8055054444).abs() < EPS_10);
        assert!((phi.to_degrees() - 5.3872535833).abs() < EPS_10);
    }

    #[test]
    fn proj_omerc_requires_alpha() {
        let r = Proj::from_proj_string("+proj=omerc +lat_0=4 +lonc=115 +ellps=GRS80");
        assert!(matches!(
            r.unwrap_err(),
            Error::InvalidParameterValue("alpha")
        ));
    }
}
