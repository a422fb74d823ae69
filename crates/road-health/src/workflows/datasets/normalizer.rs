const SEGMENT_MARKER: &str = "SEG-";

/// Canonical join key for a road identifier from either dataset.
///
/// Identifiers such as `MA-RD-SEG-0042` and `MA-NH 361-SEG-0042` embed the
/// same segment sequence number behind different route prefixes; both map to
/// `"42"`. Identifiers without a `SEG-<digits>` token fall back to the trimmed
/// input, so joins degrade to exact matching.
pub fn normalize_road_id(raw: &str) -> String {
    let trimmed = raw.trim();
    match segment_sequence(trimmed) {
        Some(sequence) => sequence.to_string(),
        None => trimmed.to_string(),
    }
}

/// Digits following the last segment marker, with leading zeros removed.
fn segment_sequence(value: &str) -> Option<&str> {
    let upper = value.to_ascii_uppercase();
    let start = upper.rfind(SEGMENT_MARKER)? + SEGMENT_MARKER.len();
    let tail = &value[start..];
    let digits_len = tail.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    let digits = tail[..digits_len].trim_start_matches('0');
    Some(if digits.is_empty() { "0" } else { digits })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn differing_route_prefixes_share_a_key() {
        assert_eq!(normalize_road_id("MA-RD-SEG-0042"), "42");
        assert_eq!(normalize_road_id("MA-NH 361-SEG-0042"), "42");
        assert_eq!(normalize_road_id("  ma-6-seg-0001 "), "1");
    }

    #[test]
    fn identifiers_without_a_sequence_fall_back_to_trimmed_input() {
        assert_eq!(normalize_road_id("  ROAD-ALPHA "), "ROAD-ALPHA");
        assert_eq!(normalize_road_id("MA-SEG-"), "MA-SEG-");
        assert_eq!(normalize_road_id(""), "");
    }

    #[test]
    fn all_zero_sequence_normalizes_to_zero() {
        assert_eq!(normalize_road_id("MA-6-SEG-0000"), "0");
    }

    #[test]
    fn sequences_longer_than_any_integer_type_stay_intact() {
        assert_eq!(
            normalize_road_id("X-SEG-000123456789012345678901234567890"),
            "123456789012345678901234567890"
        );
    }

    #[test]
    fn normalization_is_idempotent() {
        for raw in [
            "MA-RD-SEG-0042",
            "MA-NH 361-SEG-0042",
            " plain-id ",
            "SEG-7-SEG-0009x",
            "",
            "MA-6-SEG-0000",
        ] {
            let once = normalize_road_id(raw);
            assert_eq!(normalize_road_id(&once), once, "input {raw:?}");
        }
    }
}
