use std::sync::LazyLock;

use regex::Regex;

use crate::error::SceneError;

/// Signed decimal with optional fraction and exponent.
static NUMBER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?")
        .expect("number pattern is a valid regex")
});

/// Resolved pool indices of one face corner: position, texcoord, normal.
pub type FaceVertex = (usize, Option<usize>, Option<usize>);

/// Which streams a face references. Fixed by the first reference group of
/// the face and required of every other group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceStyle {
    Position,
    PositionUv,
    PositionNormal,
    PositionUvNormal,
}

impl FaceStyle {
    pub fn of(token: &str) -> Option<FaceStyle> {
        match token.matches('/').count() {
            0 => Some(FaceStyle::Position),
            1 => Some(FaceStyle::PositionUv),
            2 if token.contains("//") => Some(FaceStyle::PositionNormal),
            2 => Some(FaceStyle::PositionUvNormal),
            _ => None,
        }
    }

    fn has_uv(self) -> bool {
        matches!(self, FaceStyle::PositionUv | FaceStyle::PositionUvNormal)
    }

    fn has_normal(self) -> bool {
        matches!(self, FaceStyle::PositionNormal | FaceStyle::PositionUvNormal)
    }
}

pub fn parse_f32_component(raw: &str, line_number: usize, label: &str) -> Result<f32, SceneError> {
    raw.parse::<f32>().map_err(|error| {
        SceneError::malformed(line_number, format!("invalid {} '{}': {}", label, raw, error))
    })
}

/// Pulls the first `N` signed decimals out of `raw`; extra values are ignored.
pub fn scan_floats<const N: usize>(
    raw: &str,
    line_number: usize,
    label: &str,
) -> Result<[f32; N], SceneError> {
    let mut values = [0.0; N];
    let mut found = 0;

    for token in NUMBER_PATTERN.find_iter(raw).take(N) {
        values[found] = parse_f32_component(token.as_str(), line_number, label)?;
        found += 1;
    }

    if found < N {
        return Err(SceneError::malformed(
            line_number,
            format!("{} requires {} components, found {}", label, N, found),
        ));
    }

    Ok(values)
}

pub fn parse_face_vertex(
    token: &str,
    style: FaceStyle,
    line_number: usize,
    positions_len: usize,
    texcoords_len: usize,
    normals_len: usize,
) -> Result<FaceVertex, SceneError> {
    if FaceStyle::of(token) != Some(style) {
        return Err(SceneError::malformed(
            line_number,
            format!(
                "face reference '{}' does not match the face's {:?} style",
                token, style
            ),
        ));
    }

    let fields: Vec<&str> = token.split('/').collect();
    let position_index = resolve_reference(fields[0], positions_len, line_number, "position")?;

    let texcoord_index = if style.has_uv() {
        Some(resolve_reference(fields[1], texcoords_len, line_number, "texcoord")?)
    } else {
        None
    };

    let normal_index = if style.has_normal() {
        Some(resolve_reference(fields[2], normals_len, line_number, "normal")?)
    } else {
        None
    };

    Ok((position_index, texcoord_index, normal_index))
}

/// Maps an OBJ reference onto a zero-based slot in a pool of `pool_len`
/// entries. Positive references count from 1, negative ones back from the
/// newest entry.
fn resolve_reference(
    raw: &str,
    pool_len: usize,
    line_number: usize,
    pool: &str,
) -> Result<usize, SceneError> {
    if raw.is_empty() {
        return Err(SceneError::malformed(
            line_number,
            format!("face corner has an empty {} slot", pool),
        ));
    }

    let reference: isize = raw.parse().map_err(|_| {
        SceneError::malformed(line_number, format!("'{}' is not a {} reference", raw, pool))
    })?;

    let slot = match reference {
        0 => None,
        r if r > 0 => Some(r.unsigned_abs() - 1),
        r => pool_len.checked_sub(r.unsigned_abs()),
    };

    slot.filter(|&slot| slot < pool_len).ok_or_else(|| {
        SceneError::malformed(
            line_number,
            format!(
                "{} reference {} does not name one of the {} {} entries read so far",
                pool, raw, pool_len, pool
            ),
        )
    })
}

/// The single argument after `keyword`, e.g. the name in `usemtl <name>`.
pub fn required_argument<'a>(
    rest: &'a str,
    keyword: &str,
    line_number: usize,
) -> Result<&'a str, SceneError> {
    match rest.trim() {
        "" => Err(SceneError::malformed(
            line_number,
            format!("{} needs an argument", keyword),
        )),
        argument => Ok(argument),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_floats_handles_signs_fractions_and_exponents() {
        let [a, b, c] = scan_floats::<3>("-1.5 +2 3e-2", 1, "vertex").unwrap();
        assert_eq!(a, -1.5);
        assert_eq!(b, 2.0);
        assert_eq!(c, 0.03);

        let [d] = scan_floats::<1>(" -.25", 1, "value").unwrap();
        assert_eq!(d, -0.25);
    }

    #[test]
    fn scan_floats_reports_missing_components() {
        let err = scan_floats::<3>("1.0 2.0", 7, "vertex").unwrap_err();
        assert!(matches!(err, SceneError::MalformedInput { line: 7, .. }));
    }

    #[test]
    fn face_style_follows_slash_layout() {
        assert_eq!(FaceStyle::of("3"), Some(FaceStyle::Position));
        assert_eq!(FaceStyle::of("3/1"), Some(FaceStyle::PositionUv));
        assert_eq!(FaceStyle::of("3//2"), Some(FaceStyle::PositionNormal));
        assert_eq!(FaceStyle::of("3/1/2"), Some(FaceStyle::PositionUvNormal));
        assert_eq!(FaceStyle::of("3/1/2/4"), None);
    }

    #[test]
    fn negative_indices_count_back_from_the_pool_end() {
        let vertex = parse_face_vertex("-1//-2", FaceStyle::PositionNormal, 1, 4, 0, 2).unwrap();
        assert_eq!(vertex, (3, None, Some(0)));
    }

    #[test]
    fn zero_and_out_of_range_indices_are_rejected() {
        assert!(parse_face_vertex("0", FaceStyle::Position, 1, 3, 0, 0).is_err());
        assert!(parse_face_vertex("4", FaceStyle::Position, 1, 3, 0, 0).is_err());
        assert!(parse_face_vertex("1/", FaceStyle::PositionUv, 1, 3, 1, 0).is_err());
    }

    #[test]
    fn required_argument_trims_and_rejects_blanks() {
        assert_eq!(required_argument("  red ", "usemtl", 1).unwrap(), "red");
        assert!(matches!(
            required_argument(" ", "usemtl", 9),
            Err(SceneError::MalformedInput { line: 9, .. })
        ));
    }

    #[test]
    fn reference_errors_carry_line_and_pool() {
        let error = parse_face_vertex("2/5", FaceStyle::PositionUv, 12, 3, 4, 0).unwrap_err();
        match error {
            SceneError::MalformedInput { line, message } => {
                assert_eq!(line, 12);
                assert!(message.contains("texcoord reference 5"));
            }
            other => panic!("unexpected error {other:?}"),
        }

        // -4 reaches past the start of a 3-entry pool
        assert!(parse_face_vertex("-4", FaceStyle::Position, 1, 3, 0, 0).is_err());
        assert_eq!(parse_face_vertex("-3", FaceStyle::Position, 1, 3, 0, 0).unwrap().0, 0);
    }
}
