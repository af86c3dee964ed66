//! Numeric interpretation of attribute lines
//!
//! Values are taken from the *end* of a line, so the leading keyword may be
//! any length. Extra leading values (such as a `w` component) are ignored.

use crate::error::{ObjError, Result};

fn last_tokens<const N: usize>(line: &str) -> Result<[&str; N]> {
    let tokens: Vec<&str> = line.split_whitespace().skip(1).collect();
    if tokens.len() < N {
        return Err(ObjError::MissingTokens {
            expected: N,
            line: line.to_string(),
        });
    }

    let mut out = [""; N];
    out.copy_from_slice(&tokens[tokens.len() - N..]);
    Ok(out)
}

fn parse_float(token: &str, line: &str) -> Result<f32> {
    token.parse::<f32>().map_err(|_| ObjError::InvalidNumber {
        token: token.to_string(),
        line: line.to_string(),
    })
}

/// Parse the last three values of a `v` or `vn` line
pub fn parse_vec3(line: &str) -> Result<[f32; 3]> {
    let [x, y, z] = last_tokens::<3>(line)?;
    Ok([
        parse_float(x, line)?,
        parse_float(y, line)?,
        parse_float(z, line)?,
    ])
}

/// Parse the last two values of a `vt` line
pub fn parse_vec2(line: &str) -> Result<[f32; 2]> {
    let [u, v] = last_tokens::<2>(line)?;
    Ok([parse_float(u, line)?, parse_float(v, line)?])
}

/// Parse a triangle's position indices, converted to zero-based
///
/// Each corner may be `p`, `p/t`, `p//n` or `p/t/n`; only `p` is used.
/// Relative (negative) indices are not supported.
pub fn parse_face(line: &str) -> Result<[u32; 3]> {
    let corners = last_tokens::<3>(line)?;
    let mut out = [0u32; 3];
    for (slot, corner) in out.iter_mut().zip(corners) {
        let position = corner.split('/').next().unwrap_or(corner);
        *slot = position
            .parse::<u32>()
            .ok()
            .and_then(|i| i.checked_sub(1))
            .ok_or_else(|| ObjError::InvalidFaceIndex {
                token: corner.to_string(),
                line: line.to_string(),
            })?;
    }
    Ok(out)
}

/// Whether any value on the line uses an exponent with explicit `+`
///
/// Exporters emit these for very large or small coordinates; the packer
/// rejects such files up front.
pub fn has_positive_exponent(line: &str) -> bool {
    line.contains("e+")
}
