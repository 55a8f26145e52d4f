//! One-dimensional `f64` arrays in the NPY format (as written by `numpy.save`).
//!
//! Writes version 1.0 with a `<f8` C-order header padded to 64 bytes. Reads
//! versions 1.x, 2.x and 3.x as long as the array is `<f8`, C order, and 1-D
//! (or a 0-d scalar, returned as one element).

use anyhow::Result;

use crate::errors::SuperPathError;
use crate::path::SuperPath;

const MAGIC: &[u8] = b"\x93NUMPY";
const ALIGN: usize = 64;

fn malformed(path: &SuperPath, reason: impl Into<String>) -> anyhow::Error {
    SuperPathError::MalformedArray {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
    .into()
}

fn encode(values: &[f64]) -> Vec<u8> {
    let mut header = format!(
        "{{'descr': '<f8', 'fortran_order': False, 'shape': ({},), }}",
        values.len()
    );
    // magic(6) + version(2) + header_len(2) + header + '\n'
    let unpadded = MAGIC.len() + 2 + 2 + header.len() + 1;
    let padding = (ALIGN - unpadded % ALIGN) % ALIGN;
    header.push_str(&" ".repeat(padding));
    header.push('\n');

    let mut out = Vec::with_capacity(unpadded + padding + values.len() * 8);
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&[1, 0]);
    out.extend_from_slice(&(header.len() as u16).to_le_bytes());
    out.extend_from_slice(header.as_bytes());
    for v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

/// Value of `key` in the header dict, as raw text up to the next top-level comma.
fn header_field<'h>(header: &'h str, key: &str) -> Option<&'h str> {
    let start = header.find(&format!("'{key}'"))? + key.len() + 2;
    let rest = header[start..].trim_start().strip_prefix(':')?.trim_start();
    if rest.starts_with('(') {
        let end = rest.find(')')?;
        return Some(&rest[..=end]);
    }
    let end = rest.find([',', '}']).unwrap_or(rest.len());
    Some(rest[..end].trim())
}

fn parse_len(shape: &str) -> Option<usize> {
    let inner = shape.strip_prefix('(')?.strip_suffix(')')?;
    let dims: Vec<&str> = inner.split(',').map(str::trim).filter(|d| !d.is_empty()).collect();
    match dims.as_slice() {
        [] => Some(1),
        [n] => n.parse().ok(),
        _ => None,
    }
}

fn decode(path: &SuperPath, bytes: &[u8]) -> Result<Vec<f64>> {
    if !bytes.starts_with(MAGIC) || bytes.len() < MAGIC.len() + 4 {
        return Err(malformed(path, "missing NPY magic"));
    }
    let major = bytes[MAGIC.len()];
    let (header_len, header_start) = match major {
        1 => {
            let raw = [bytes[8], bytes[9]];
            (u16::from_le_bytes(raw) as usize, 10)
        }
        2 | 3 => {
            if bytes.len() < 12 {
                return Err(malformed(path, "truncated header"));
            }
            let raw = [bytes[8], bytes[9], bytes[10], bytes[11]];
            (u32::from_le_bytes(raw) as usize, 12)
        }
        v => return Err(malformed(path, format!("unsupported version {v}"))),
    };
    let data_start = header_start + header_len;
    let header = bytes
        .get(header_start..data_start)
        .and_then(|h| std::str::from_utf8(h).ok())
        .ok_or_else(|| malformed(path, "truncated header"))?;

    let descr = header_field(header, "descr").ok_or_else(|| malformed(path, "no descr"))?;
    if descr.trim_matches(['\'', '"']) != "<f8" {
        return Err(malformed(path, format!("dtype {descr} is not <f8")));
    }
    if header_field(header, "fortran_order") != Some("False") {
        return Err(malformed(path, "fortran order is not supported"));
    }
    let shape = header_field(header, "shape").ok_or_else(|| malformed(path, "no shape"))?;
    let len = parse_len(shape).ok_or_else(|| malformed(path, format!("shape {shape} is not 1-D")))?;

    let expected = len
        .checked_mul(8)
        .ok_or_else(|| malformed(path, format!("shape {shape} is too large")))?;
    let data = &bytes[data_start..];
    if data.len() != expected {
        return Err(malformed(
            path,
            format!("expected {expected} data bytes, found {}", data.len()),
        ));
    }
    Ok(data
        .chunks_exact(8)
        .map(|c| f64::from_le_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
        .collect())
}

impl SuperPath {
    /// Load a 1-D `f64` array. A missing file is an empty array.
    pub fn array(&self) -> Result<Vec<f64>> {
        let bytes = self.byte_content()?;
        if bytes.is_empty() {
            return Ok(Vec::new());
        }
        decode(self, &bytes)
    }

    pub fn set_array(&self, values: &[f64]) -> Result<()> {
        self.set_byte_content(encode(values))
    }
}
