//! Human-readable rendering of engine telemetry

use shakmaty::Color;

use crate::uci::ScoreKind;

/// Renders a count with a magnitude suffix: `999`, `1.1k`, `3.1M`, `1.8B`.
///
/// Rounds half away from zero at the tenths place. Text that is not an
/// unsigned decimal is returned unchanged.
pub fn number_with_units(value: &str) -> String {
    let number: u128 = match value.trim().parse() {
        Ok(n) => n,
        Err(_) => return value.to_string(),
    };

    match number {
        n if n < 1_000 => n.to_string(),
        n if n < 1_000_000 => scaled(n, 1_000, "k"),
        n if n < 1_000_000_000 => scaled(n, 1_000_000, "M"),
        n => scaled(n, 1_000_000_000, "B"),
    }
}

fn scaled(number: u128, unit: u128, suffix: &str) -> String {
    let tenths = (number / unit) * 10 + ((number % unit) * 10 + unit / 2) / unit;
    format!("{}.{}{}", tenths / 10, tenths % 10, suffix)
}

/// Milliseconds as seconds: `4572` -> `4.572s`, `1000` -> `1s`.
///
/// Works on the decimal text, so values past `u64` keep every digit.
pub fn time_with_units(value: &str) -> String {
    match shift_decimal(value.trim(), 3) {
        Some(seconds) => format!("{}s", seconds),
        None => value.to_string(),
    }
}

/// Permille as a percentage: `456` -> `45.6%`
pub fn hashfull_percentage(value: &str) -> String {
    match shift_decimal(value.trim(), 1) {
        Some(percent) => format!("{}%", percent),
        None => value.to_string(),
    }
}

/// Divides an unsigned decimal by `10^places`, dropping trailing zeros
fn shift_decimal(digits: &str, places: usize) -> Option<String> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let padded = format!("{:0>width$}", digits, width = places + 1);
    let (whole, fraction) = padded.split_at(padded.len() - places);
    let whole = match whole.trim_start_matches('0') {
        "" => "0",
        w => w,
    };

    match fraction.trim_end_matches('0') {
        "" => Some(whole.to_string()),
        f => Some(format!("{}.{}", whole, f)),
    }
}

/// Converts an engine score (relative to the side to move) into a
/// white-relative evaluation string such as `+1.23`, `-0.20` or `#-3`.
///
/// A value that does not fit an `i64` is returned unchanged.
pub fn evaluation(side_to_move: Color, kind: ScoreKind, value: &str) -> String {
    let mut value: i64 = match value.trim().parse() {
        Ok(v) => v,
        Err(_) => return value.to_string(),
    };

    if side_to_move == Color::Black {
        value = value.saturating_neg();
    }

    match kind {
        ScoreKind::Mate => format!("#{}", value),
        ScoreKind::Cp => {
            let sign = match value {
                v if v > 0 => "+",
                v if v < 0 => "-",
                _ => "",
            };
            let abs = value.unsigned_abs();
            format!("{}{}.{:02}", sign, abs / 100, abs % 100)
        }
    }
}

/// Side to move from the second field of a FEN, white if missing
pub fn side_to_move(fen: &str) -> Color {
    match fen.split_whitespace().nth(1) {
        Some("b") => Color::Black,
        _ => Color::White,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_with_units() {
        assert_eq!(number_with_units("100"), "100");
        assert_eq!(number_with_units("1090"), "1.1k");
        assert_eq!(number_with_units("800403"), "800.4k");
        assert_eq!(number_with_units("3123456"), "3.1M");
        assert_eq!(number_with_units("1789123456"), "1.8B");
        assert_eq!(number_with_units("21219470"), "21.2M");
    }

    #[test]
    fn test_number_with_units_boundaries() {
        assert_eq!(number_with_units("0"), "0");
        assert_eq!(number_with_units("999"), "999");
        assert_eq!(number_with_units("1000"), "1.0k");
        assert_eq!(number_with_units("999999"), "1000.0k");
        assert_eq!(number_with_units("1000000"), "1.0M");
        assert_eq!(number_with_units("1000000000"), "1.0B");
    }

    #[test]
    fn test_number_with_units_rounds_half_up() {
        assert_eq!(number_with_units("1250"), "1.3k");
        assert_eq!(number_with_units("1249"), "1.2k");
        assert_eq!(number_with_units("2350000"), "2.4M");
    }

    #[test]
    fn test_number_with_units_non_numeric() {
        assert_eq!(number_with_units("lots"), "lots");
    }

    #[test]
    fn test_time_with_units() {
        assert_eq!(time_with_units("123"), "0.123s");
        assert_eq!(time_with_units("1234"), "1.234s");
        assert_eq!(time_with_units("12345"), "12.345s");
        assert_eq!(time_with_units("1000"), "1s");
        assert_eq!(time_with_units("0"), "0s");
        assert_eq!(time_with_units("250"), "0.25s");
        assert_eq!(time_with_units("60010"), "60.01s");
    }

    #[test]
    fn test_time_with_units_beyond_u64() {
        assert_eq!(
            time_with_units("123456789012345678901234"),
            "123456789012345678901.234s"
        );
        assert_eq!(time_with_units("soon"), "soon");
        assert_eq!(time_with_units("-5"), "-5");
    }

    #[test]
    fn test_hashfull_percentage() {
        assert_eq!(hashfull_percentage("0"), "0%");
        assert_eq!(hashfull_percentage("100"), "10%");
        assert_eq!(hashfull_percentage("1000"), "100%");
        assert_eq!(hashfull_percentage("456"), "45.6%");
        assert_eq!(hashfull_percentage("5"), "0.5%");
        assert_eq!(hashfull_percentage("full"), "full");
    }

    #[test]
    fn test_evaluation() {
        let cases = [
            (Color::White, ScoreKind::Cp, "123", "+1.23"),
            (Color::White, ScoreKind::Cp, "-123", "-1.23"),
            (Color::White, ScoreKind::Mate, "1", "#1"),
            (Color::White, ScoreKind::Mate, "-1", "#-1"),
            (Color::Black, ScoreKind::Cp, "123", "-1.23"),
            (Color::Black, ScoreKind::Cp, "-123", "+1.23"),
            (Color::Black, ScoreKind::Mate, "1", "#-1"),
            (Color::Black, ScoreKind::Mate, "-1", "#1"),
        ];

        for (side, kind, value, expected) in cases {
            assert_eq!(evaluation(side, kind, value), expected, "{:?} {} {}", side, kind, value);
        }
    }

    #[test]
    fn test_evaluation_small_and_zero() {
        assert_eq!(evaluation(Color::White, ScoreKind::Cp, "0"), "0.00");
        assert_eq!(evaluation(Color::Black, ScoreKind::Cp, "0"), "0.00");
        assert_eq!(evaluation(Color::White, ScoreKind::Cp, "-5"), "-0.05");
        assert_eq!(evaluation(Color::White, ScoreKind::Cp, "209"), "+2.09");
    }

    #[test]
    fn test_evaluation_out_of_range_is_unchanged() {
        let huge = "99999999999999999999";
        assert_eq!(evaluation(Color::White, ScoreKind::Cp, huge), huge);
        assert_eq!(evaluation(Color::Black, ScoreKind::Mate, "x"), "x");
    }

    #[test]
    fn test_side_to_move() {
        assert_eq!(
            side_to_move("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"),
            Color::Black
        );
        assert_eq!(
            side_to_move("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
            Color::White
        );
        assert_eq!(side_to_move(""), Color::White);
    }
}
