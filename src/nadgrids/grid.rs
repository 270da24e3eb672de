//!
//! Grid subgrid table and bilinear interpolation/grid-shift application
//!
use crate::errors::{Error, Result};
use crate::math::{adjlon, consts::PI};
use crate::transform::Direction;

/// A longitude/latitude pair, in radians. Used both for grid origins and
/// for node shift values.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lp {
    pub lam: f64,
    pub phi: f64,
}

/// One NTv2 subgrid: a rectangular, regularly spaced node matrix of
/// longitude/latitude shifts, all in radians.
#[derive(Debug)]
pub struct Subgrid {
    /// Lower-left corner of the grid
    pub ll: Lp,
    /// Node spacing
    pub del: Lp,
    /// Node matrix extent (number of columns, number of rows)
    pub lim: Lp,
    pub epsilon: f64,
    /// Node shift values, row-major, longitude-major within a row
    pub cvs: Box<[Lp]>,
}

/// A loaded grid file: a flat list of subgrids. When several subgrids
/// contain a point, the last match in the list wins -- NTv2 files list
/// parent grids first and children (which take precedence) after.
#[derive(Debug, Default)]
pub struct GridFile {
    pub subgrids: Vec<Subgrid>,
}

impl Subgrid {
    /// Return true if `(lam, phi)` falls within this subgrid's extent.
    pub fn matches(&self, lam: f64, phi: f64) -> bool {
        !(self.ll.phi - self.epsilon > phi
            || self.ll.lam - self.epsilon > lam
            || self.ll.phi + (self.lim.phi - 1.) * self.del.phi + self.epsilon < phi
            || self.ll.lam + (self.lim.lam - 1.) * self.del.lam + self.epsilon < lam)
    }

    pub fn nad_cvt(&self, dir: Direction, lam: f64, phi: f64, z: f64) -> Result<(f64, f64, f64)> {
        match dir {
            Direction::Forward => self.nad_cvt_forward(lam, phi, z),
            Direction::Inverse => self.nad_cvt_inverse(lam, phi, z),
        }
    }

    fn nad_cvt_forward(&self, lam: f64, phi: f64, z: f64) -> Result<(f64, f64, f64)> {
        let (t_lam, t_phi) = self.nad_intr(adjlon(lam - self.ll.lam - PI) + PI, phi - self.ll.phi)?;
        Ok((lam - t_lam, phi + t_phi, z))
    }

    /// Iterative (Newton) inverse shift: converges when the residual drops
    /// below 1e-12 rad, within at most 10 iterations.
    fn nad_cvt_inverse(&self, lam: f64, phi: f64, z: f64) -> Result<(f64, f64, f64)> {
        const MAX_ITER: usize = 10;
        const TOL: f64 = 1.0e-12;

        let (tb_lam, tb_phi) = (adjlon(lam - self.ll.lam - PI) + PI, phi - self.ll.phi);
        let (mut t_lam, mut t_phi) = self.nad_intr(tb_lam, tb_phi)?;

        t_lam = tb_lam + t_lam;
        t_phi = tb_phi - t_phi;

        let mut converged = false;
        for _ in 0..MAX_ITER {
            let (del_lam, del_phi) = self.nad_intr(t_lam, t_phi)?;
            let (diff_lam, diff_phi) = (t_lam - del_lam - tb_lam, t_phi + del_phi - tb_phi);

            if diff_lam.abs() <= TOL && diff_phi.abs() <= TOL {
                converged = true;
                break;
            }
            t_lam -= diff_lam;
            t_phi -= diff_phi;
        }

        if !converged {
            return Err(Error::InverseGridShiftConvError);
        }

        Ok((adjlon(t_lam + self.ll.lam), t_phi + self.ll.phi, z))
    }

    fn nad_intr(&self, lam: f64, phi: f64) -> Result<(f64, f64)> {
        let (t_lam, t_phi) = (lam / self.del.lam, phi / self.del.phi);

        fn check_lim(t: f64, lim: f64) -> Result<(f64, f64)> {
            let mut i = t.floor();
            let mut f = t - i;
            if i < 0. {
                if i == -1. && f > 0.99999999999 {
                    i += 1.;
                    f = 0.;
                } else {
                    return Err(Error::PointOutsideNadShiftArea);
                }
            } else {
                match i + 1. {
                    n if n == lim && f < 1.0e-11 => {
                        i -= 1.;
                        f = 1.;
                    }
                    n if n > lim => return Err(Error::PointOutsideNadShiftArea),
                    _ => (),
                }
            }
            Ok((i, f))
        }

        let (i_lam, f_lam) = check_lim(t_lam, self.lim.lam)?;
        let (i_phi, f_phi) = check_lim(t_phi, self.lim.phi)?;

        let mut index = (i_phi * self.lim.lam + i_lam) as usize;
        let f00 = &self.cvs[index];
        let f10 = &self.cvs[index + 1];
        index += self.lim.lam as usize;
        let f01 = &self.cvs[index];
        let f11 = &self.cvs[index + 1];

        let m00 = (1. - f_lam) * (1. - f_phi);
        let m01 = (1. - f_lam) * f_phi;
        let m10 = f_lam * (1. - f_phi);
        let m11 = f_lam * f_phi;

        Ok((
            m00 * f00.lam + m10 * f10.lam + m01 * f01.lam + m11 * f11.lam,
            m00 * f00.phi + m10 * f10.phi + m01 * f01.phi + m11 * f11.phi,
        ))
    }
}

impl GridFile {
    /// Find the subgrid covering `(lam, phi)`, preferring the last match
    /// (child grids listed after their parent take precedence).
    pub fn find_subgrid(&self, lam: f64, phi: f64) -> Option<&Subgrid> {
        self.subgrids.iter().rev().find(|g| g.matches(lam, phi))
    }

    pub fn apply_shift(&self, dir: Direction, lam: f64, phi: f64, z: f64) -> Result<(f64, f64, f64)> {
        self.find_subgrid(lam, phi)
            .ok_or(Error::PointOutsideNadShiftArea)?
            .nad_cvt(dir, lam, phi, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_grid() -> Subgrid {
        // 2x2 node grid, one degree spacing, zero shift everywhere
        Subgrid {
            ll: Lp { lam: 0., phi: 0. },
            del: Lp {
                lam: 1f64.to_radians(),
                phi: 1f64.to_radians(),
            },
            lim: Lp { lam: 2., phi: 2. },
            epsilon: 1e-12,
            cvs: vec![Lp::default(); 4].into_boxed_slice(),
        }
    }

    #[test]
    fn zero_shift_grid_is_identity() {
        let g = flat_grid();
        let lam = 0.5f64.to_radians();
        let phi = 0.5f64.to_radians();
        let (olam, ophi, _) = g.nad_cvt(Direction::Forward, lam, phi, 0.).unwrap();
        assert!((olam - lam).abs() < 1e-15);
        assert!((ophi - phi).abs() < 1e-15);
    }

    #[test]
    fn forward_then_inverse_round_trip() {
        let g = flat_grid();
        let lam = 0.3f64.to_radians();
        let phi = 0.6f64.to_radians();
        let (flam, fphi, _) = g.nad_cvt(Direction::Forward, lam, phi, 0.).unwrap();
        let (ilam, iphi, _) = g.nad_cvt(Direction::Inverse, flam, fphi, 0.).unwrap();
        assert!((ilam - lam).abs() < 1e-9);
        assert!((iphi - phi).abs() < 1e-9);
    }

    #[test]
    fn outside_extent_is_error() {
        let g = flat_grid();
        assert!(g.nad_cvt(Direction::Forward, 10f64.to_radians(), 10f64.to_radians(), 0.)
            .is_err());
    }
}
