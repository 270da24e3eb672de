//!
//! NTv2 binary grid-shift file decoder
//!
use crate::constants::SEC_TO_RAD;
use crate::errors::{Error, Result};
use crate::nadgrids::grid::{GridFile, Lp, Subgrid};

const HEADER_SIZE: usize = 11 * 16;
const RECORD_SIZE: usize = 16;

struct Cursor<'a> {
    buf: &'a [u8],
    big_endian: bool,
}

impl<'a> Cursor<'a> {
    fn field_i32(&self, record: usize) -> Result<i32> {
        let off = record * RECORD_SIZE + 8;
        let bytes: [u8; 4] = self
            .buf
            .get(off..off + 4)
            .ok_or(Error::InvalidNtv2GridFormat("truncated header"))?
            .try_into()
            .unwrap();
        Ok(if self.big_endian {
            i32::from_be_bytes(bytes)
        } else {
            i32::from_le_bytes(bytes)
        })
    }

    fn field_f64(&self, record: usize) -> Result<f64> {
        let off = record * RECORD_SIZE + 8;
        let bytes: [u8; 8] = self
            .buf
            .get(off..off + 8)
            .ok_or(Error::InvalidNtv2GridFormat("truncated header"))?
            .try_into()
            .unwrap();
        Ok(if self.big_endian {
            f64::from_be_bytes(bytes)
        } else {
            f64::from_le_bytes(bytes)
        })
    }

    fn label(&self, record: usize) -> Result<&str> {
        let off = record * RECORD_SIZE;
        let bytes = self
            .buf
            .get(off..off + 8)
            .ok_or(Error::InvalidNtv2GridFormat("truncated header"))?;
        std::str::from_utf8(bytes)
            .map(|s| s.trim_end())
            .map_err(|_| Error::InvalidNtv2GridFormat("non utf8 label"))
    }
}

fn read_node(buf: &[u8], big_endian: bool) -> Result<Lp> {
    let bytes: [u8; 4] = buf[0..4].try_into().unwrap();
    let lat_shift = if big_endian {
        f32::from_be_bytes(bytes)
    } else {
        f32::from_le_bytes(bytes)
    };
    let bytes: [u8; 4] = buf[4..8].try_into().unwrap();
    let lon_shift = if big_endian {
        f32::from_be_bytes(bytes)
    } else {
        f32::from_le_bytes(bytes)
    };
    Ok(Lp {
        lam: SEC_TO_RAD * lon_shift as f64,
        phi: SEC_TO_RAD * lat_shift as f64,
    })
}

/// Decode an in-memory NTv2 grid-shift file.
///
/// Endianness is auto-detected from the `NUM_OREC` field at byte 8 of the
/// overview header: big-endian if read as 11, little-endian otherwise.
pub fn decode_ntv2(bytes: &[u8]) -> Result<GridFile> {
    if bytes.len() < HEADER_SIZE {
        return Err(Error::InvalidNtv2GridFormat("file too short"));
    }

    let big_endian = {
        let probe: [u8; 4] = bytes[8..12].try_into().unwrap();
        i32::from_be_bytes(probe) == 11
    };

    let overview = Cursor {
        buf: &bytes[..HEADER_SIZE],
        big_endian,
    };
    let nsubgrids = overview.field_i32(2)? as usize;

    let mut subgrids = Vec::with_capacity(nsubgrids);
    let mut offset = HEADER_SIZE;

    for _ in 0..nsubgrids {
        if bytes.len() < offset + HEADER_SIZE {
            return Err(Error::InvalidNtv2GridFormat("truncated subgrid header"));
        }
        let head = Cursor {
            buf: &bytes[offset..offset + HEADER_SIZE],
            big_endian,
        };
        if head.label(0)? != "SUB_NAME" {
            return Err(Error::InvalidNtv2GridFormat("invalid subgrid header"));
        }

        let mut ll = Lp {
            lam: -head.field_f64(7)?, // W_LONG
            phi: head.field_f64(4)?,  // S_LAT
        };
        let ur = Lp {
            lam: -head.field_f64(6)?, // E_LONG
            phi: head.field_f64(5)?,  // N_LAT
        };
        let mut del = Lp {
            lam: head.field_f64(9)?, // longitude interval
            phi: head.field_f64(8)?, // latitude interval
        };

        let lim = Lp {
            lam: (((ur.lam - ll.lam).abs() / del.lam + 0.5) + 1.).floor(),
            phi: (((ur.phi - ll.phi).abs() / del.phi + 0.5) + 1.).floor(),
        };

        ll.lam *= SEC_TO_RAD;
        ll.phi *= SEC_TO_RAD;
        del.lam *= SEC_TO_RAD;
        del.phi *= SEC_TO_RAD;

        let gs_count = head.field_i32(10)? as usize;
        let nrows = lim.phi as usize;
        let rowsize = lim.lam as usize;
        if gs_count != nrows * rowsize {
            return Err(Error::InvalidNtv2GridFormat("node count does not match extent"));
        }

        offset += HEADER_SIZE;
        let data_bytes = gs_count * RECORD_SIZE;
        if bytes.len() < offset + data_bytes {
            return Err(Error::InvalidNtv2GridFormat("truncated node data"));
        }

        let mut cvs: Vec<Lp> = (0..gs_count)
            .map(|i| read_node(&bytes[offset + i * RECORD_SIZE..], big_endian))
            .collect::<Result<_>>()?;

        // NTv2 stores rows west to east; proj stores them in reverse.
        for i in 0..nrows {
            let off = i * rowsize;
            cvs[off..(off + rowsize)].reverse();
        }

        let epsilon = (del.lam.abs() + del.phi.abs()) / 10_000.;

        subgrids.push(Subgrid {
            ll,
            del,
            lim,
            epsilon,
            cvs: cvs.into_boxed_slice(),
        });

        offset += data_bytes;
    }

    Ok(GridFile { subgrids })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_record_str(buf: &mut Vec<u8>, label: &str, value: &str) {
        let mut l = [0u8; 8];
        l[..label.len()].copy_from_slice(label.as_bytes());
        buf.extend_from_slice(&l);
        let mut v = [0u8; 8];
        v[..value.len().min(8)].copy_from_slice(&value.as_bytes()[..value.len().min(8)]);
        buf.extend_from_slice(&v);
    }

    fn write_record_i32(buf: &mut Vec<u8>, label: &str, value: i32) {
        let mut l = [0u8; 8];
        l[..label.len()].copy_from_slice(label.as_bytes());
        buf.extend_from_slice(&l);
        buf.extend_from_slice(&value.to_le_bytes());
        buf.extend_from_slice(&[0u8; 4]);
    }

    fn write_record_f64(buf: &mut Vec<u8>, label: &str, value: f64) {
        let mut l = [0u8; 8];
        l[..label.len()].copy_from_slice(label.as_bytes());
        buf.extend_from_slice(&l);
        buf.extend_from_slice(&value.to_le_bytes());
    }

    #[test]
    fn decode_single_2x2_subgrid() {
        let mut buf = Vec::new();
        // overview header, little endian: NUM_OREC != 11 in BE reading
        write_record_i32(&mut buf, "NUM_OREC", 11);
        write_record_i32(&mut buf, "NUM_SREC", 11);
        write_record_i32(&mut buf, "NUM_FILE", 1);
        write_record_str(&mut buf, "GS_TYPE", "SECONDS");
        write_record_str(&mut buf, "VERSION", "NTv2.0");
        write_record_str(&mut buf, "SYSTEM_F", "NAD27");
        write_record_str(&mut buf, "SYSTEM_T", "NAD83");
        write_record_f64(&mut buf, "MAJOR_F", 6378206.4);
        write_record_f64(&mut buf, "MINOR_F", 6356583.8);
        write_record_f64(&mut buf, "MAJOR_T", 6378137.0);
        write_record_f64(&mut buf, "MINOR_T", 6356752.314);
        assert_eq!(buf.len(), HEADER_SIZE);

        // subgrid header
        write_record_str(&mut buf, "SUB_NAME", "TEST");
        write_record_str(&mut buf, "PARENT", "NONE");
        write_record_str(&mut buf, "CREATED", "");
        write_record_str(&mut buf, "UPDATED", "");
        write_record_f64(&mut buf, "S_LAT", 0.0);
        write_record_f64(&mut buf, "N_LAT", 3600.0);
        write_record_f64(&mut buf, "E_LONG", -3600.0);
        write_record_f64(&mut buf, "W_LONG", 0.0);
        write_record_f64(&mut buf, "LAT_INC", 3600.0);
        write_record_f64(&mut buf, "LONG_INC", 3600.0);
        write_record_i32(&mut buf, "GS_COUNT", 4);
        assert_eq!(buf.len(), 2 * HEADER_SIZE);

        for _ in 0..4 {
            buf.extend_from_slice(&0f32.to_le_bytes());
            buf.extend_from_slice(&0f32.to_le_bytes());
            buf.extend_from_slice(&[0u8; 8]);
        }

        let grid = decode_ntv2(&buf).unwrap();
        assert_eq!(grid.subgrids.len(), 1);
        assert_eq!(grid.subgrids[0].cvs.len(), 4);
    }
}
