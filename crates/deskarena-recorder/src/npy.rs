//! A minimal NPY writer for flat `float64` vectors, byte-compatible with
//! `numpy.save` for the 1-D case the recorder actually needs (§4.6.1). Not
//! a general NPY implementation -- no multi-dimensional shapes, no other
//! dtypes. Pulling in a full `ndarray`/numpy-format dependency for this one
//! code path isn't worth it.

use crate::error::Result;
use std::io::Write;
use std::path::Path;

const MAGIC: &[u8] = b"\x93NUMPY";

/// Writes `data` as a 1-D little-endian `float64` NPY file.
pub fn write_vector(path: &Path, data: &[f64]) -> Result<()> {
    let header = format!(
        "{{'descr': '<f8', 'fortran_order': False, 'shape': ({},), }}",
        data.len()
    );

    // Header length must make (MAGIC + version + len-field + header + '\n')
    // a multiple of 64 bytes, per the NPY format spec.
    let prefix_len = MAGIC.len() + 2 + 2;
    let mut padded = header.into_bytes();
    padded.push(b'\n');
    let total = prefix_len + padded.len();
    let remainder = total % 64;
    if remainder != 0 {
        let pad = 64 - remainder;
        padded.truncate(padded.len() - 1);
        padded.extend(std::iter::repeat(b' ').take(pad));
        padded.push(b'\n');
    }

    let mut file = std::fs::File::create(path)?;
    file.write_all(MAGIC)?;
    file.write_all(&[1u8, 0u8])?; // version 1.0
    file.write_all(&(padded.len() as u16).to_le_bytes())?;
    file.write_all(&padded)?;
    for value in data {
        file.write_all(&value.to_le_bytes())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn header_is_64_byte_aligned() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vec.npy");
        write_vector(&path, &[1.0, 2.0, 3.5]).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        let header_len = u16::from_le_bytes([bytes[8], bytes[9]]) as usize;
        assert_eq!((10 + header_len) % 64, 0);
    }

    #[test]
    fn magic_and_payload_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vec.npy");
        write_vector(&path, &[1.0, 2.0]).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[0..6], MAGIC);
        let tail = &bytes[bytes.len() - 16..];
        let a = f64::from_le_bytes(tail[0..8].try_into().unwrap());
        let b = f64::from_le_bytes(tail[8..16].try_into().unwrap());
        assert_eq!((a, b), (1.0, 2.0));
    }
}
