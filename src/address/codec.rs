//! Node key and binary address encoding.
//!
//! Keys are the canonical `[a b c d ...]` text of a label and index the
//! network map. Binary addresses are fixed-width bitstrings used for display:
//!
//! ```text
//! <N-1 in V bits> ( <vertex-1 in V bits> <segment in S bits> )*
//! ```
//!
//! where `V = ceil(log2 N)` and `S` is the segment field width (2 bits by
//! default, 1 bit in the compact layout).

use serde::{Deserialize, Serialize};

use super::label::{Label, Pair, SegmentType};
use crate::error::FractalError;

/// Width of the per-pair segment field in binary addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentWidth {
    /// One bit per segment. Cannot represent tile-B segments.
    Compact,
    /// Two bits per segment.
    #[default]
    Wide,
}

impl SegmentWidth {
    pub fn bits(self) -> u32 {
        match self {
            SegmentWidth::Compact => 1,
            SegmentWidth::Wide => 2,
        }
    }
}

/// Canonical lookup key of a label.
pub fn to_key(label: &Label) -> String {
    label.to_string()
}

/// Parse a key or free-form label text into a label.
///
/// Accepts `"[4 0 3 2 4 0]"`, `"4 0 3 2 4 0"` and comma separated variants.
///
/// # Errors
/// Returns `FractalError::InvalidLabel` for empty input, an odd number of
/// integers, non-numeric tokens, vertex 0 or an unknown segment type.
pub fn parse_label(input: &str) -> Result<Label, FractalError> {
    let trimmed = input.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(trimmed);

    let values = inner
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<u32>()
                .map_err(|_| FractalError::invalid_label(input, format!("'{}' is not an integer", token)))
        })
        .collect::<Result<Vec<u32>, _>>()?;

    if values.is_empty() {
        return Err(FractalError::invalid_label(input, "label is empty"));
    }
    if values.len() % 2 != 0 {
        return Err(FractalError::invalid_label(
            input,
            format!("expected (vertex, segment) pairs, got {} integers", values.len()),
        ));
    }

    let mut pairs = Vec::with_capacity(values.len() / 2);
    for chunk in values.chunks_exact(2) {
        let vertex = u16::try_from(chunk[0])
            .ok()
            .filter(|&v| v >= 1)
            .ok_or_else(|| FractalError::invalid_label(input, format!("vertex {} out of range", chunk[0])))?;
        let segment = u8::try_from(chunk[1])
            .ok()
            .and_then(SegmentType::from_u8)
            .ok_or_else(|| FractalError::invalid_label(input, format!("unknown segment type {}", chunk[1])))?;
        pairs.push(Pair::new(vertex, segment));
    }

    Ok(Label::from_pairs(pairs))
}

impl Label {
    /// Inverse of [`to_key`].
    pub fn from_key(key: &str) -> Result<Label, FractalError> {
        parse_label(key)
    }
}

/// Bits needed for a vertex index: `ceil(log2 N)`.
pub fn vertex_bits(vertices: u16) -> u32 {
    if vertices <= 1 {
        0
    } else {
        u16::BITS - (vertices - 1).leading_zeros()
    }
}

/// Binary address with the default (wide) segment field.
pub fn to_binary(label: &Label, vertices: u16) -> Result<String, FractalError> {
    to_binary_with(label, vertices, SegmentWidth::default())
}

/// Binary address of `label` in a network of `vertices` simplex vertices.
///
/// # Errors
/// `FractalError::Encoding` when a vertex index lies outside `1..=vertices`
/// or a segment type does not fit the chosen width.
pub fn to_binary_with(label: &Label, vertices: u16, width: SegmentWidth) -> Result<String, FractalError> {
    let v_bits = vertex_bits(vertices);
    let s_bits = width.bits();
    let mut out = String::with_capacity((v_bits + (v_bits + s_bits) * label.level() as u32) as usize);

    push_bits(&mut out, u32::from(vertices.saturating_sub(1)), v_bits, "dimension")?;
    for pair in label.pairs() {
        let index = u32::from(pair.vertex)
            .checked_sub(1)
            .ok_or(FractalError::Encoding {
                field: "vertex",
                value: 0,
                bits: v_bits,
            })?;
        if pair.vertex > vertices {
            return Err(FractalError::Encoding {
                field: "vertex",
                value: u32::from(pair.vertex),
                bits: v_bits,
            });
        }
        push_bits(&mut out, index, v_bits, "vertex")?;
        push_bits(&mut out, u32::from(pair.segment.as_u8()), s_bits, "segment")?;
    }

    Ok(out)
}

fn push_bits(out: &mut String, value: u32, bits: u32, field: &'static str) -> Result<(), FractalError> {
    if bits < u32::BITS && value >> bits != 0 {
        return Err(FractalError::Encoding { field, value, bits });
    }
    if bits > 0 {
        out.push_str(&format!("{:0width$b}", value, width = bits as usize));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_bits() {
        assert_eq!(vertex_bits(2), 1);
        assert_eq!(vertex_bits(3), 2);
        assert_eq!(vertex_bits(4), 2);
        assert_eq!(vertex_bits(5), 3);
        assert_eq!(vertex_bits(8), 3);
        assert_eq!(vertex_bits(9), 4);
    }

    #[test]
    fn test_parse_label_formats() {
        let expected = parse_label("[4 0 3 2 4 0]").unwrap();
        assert_eq!(parse_label("4 0 3 2 4 0").unwrap(), expected);
        assert_eq!(parse_label(" 4,0, 3,2 ,4,0 ").unwrap(), expected);
        assert_eq!(to_key(&expected), "[4 0 3 2 4 0]");
        assert_eq!(Label::from_key(&to_key(&expected)).unwrap(), expected);
    }

    #[test]
    fn test_parse_label_rejects_malformed() {
        assert!(matches!(parse_label(""), Err(FractalError::InvalidLabel { .. })));
        assert!(matches!(parse_label("[]"), Err(FractalError::InvalidLabel { .. })));
        assert!(matches!(parse_label("1 0 2"), Err(FractalError::InvalidLabel { .. })));
        assert!(matches!(parse_label("1 x"), Err(FractalError::InvalidLabel { .. })));
        assert!(matches!(parse_label("0 0"), Err(FractalError::InvalidLabel { .. })));
        assert!(matches!(parse_label("1 3"), Err(FractalError::InvalidLabel { .. })));
    }

    #[test]
    fn test_binary_tetrahedron() {
        // N = 4: prefix "11", pair (1,0) -> "00" + "00", pair (3,1) -> "10" + "01"
        let label = parse_label("1 0 3 1").unwrap();
        assert_eq!(to_binary(&label, 4).unwrap(), "11".to_string() + "0000" + "1001");
        assert_eq!(
            to_binary_with(&label, 4, SegmentWidth::Compact).unwrap(),
            "11".to_string() + "000" + "101"
        );
    }

    #[test]
    fn test_compact_width_rejects_tile_b() {
        let label = parse_label("1 0 2 2 1 0").unwrap();
        let err = to_binary_with(&label, 3, SegmentWidth::Compact).unwrap_err();
        assert_eq!(
            err,
            FractalError::Encoding {
                field: "segment",
                value: 2,
                bits: 1
            }
        );
        assert!(to_binary(&label, 3).is_ok());
    }

    #[test]
    fn test_binary_rejects_vertex_out_of_range() {
        let label = parse_label("5 0").unwrap();
        assert!(matches!(
            to_binary(&label, 4),
            Err(FractalError::Encoding { field: "vertex", .. })
        ));
    }

    #[test]
    fn test_binary_width_is_fixed_per_level() {
        let a = to_binary(&parse_label("1 0 1 0").unwrap(), 5).unwrap();
        let b = to_binary(&parse_label("5 0 4 0").unwrap(), 5).unwrap();
        assert_eq!(a.len(), b.len());
        assert_eq!(a.len(), 3 + 2 * (3 + 2));
    }
}
