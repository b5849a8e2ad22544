//! Position reconstruction from a starting FEN plus UCI moves

use shakmaty::fen::Fen;
use shakmaty::uci::UciMove;
use shakmaty::variant::{Variant, VariantPosition};
use shakmaty::{CastlingMode, EnPassantMode, Position};

use crate::error::{Error, Result};

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Maps a Lichess variant key to the rules used to replay moves
pub fn variant_from_name(name: &str) -> Result<Variant> {
    match name {
        "" | "chess" | "standard" | "chess960" | "fromPosition" => Ok(Variant::Chess),
        "crazyhouse" => Ok(Variant::Crazyhouse),
        "antichess" => Ok(Variant::Antichess),
        "atomic" => Ok(Variant::Atomic),
        "horde" => Ok(Variant::Horde),
        "kingofthehill" => Ok(Variant::KingOfTheHill),
        "racingkings" => Ok(Variant::RacingKings),
        "3check" | "threecheck" => Ok(Variant::ThreeCheck),
        other => Err(Error::UnsupportedVariant(other.to_string())),
    }
}

/// Replays `moves` on top of `initial_fen` and returns the resulting FEN.
///
/// * no starting FEN -> the standard starting position
/// * no moves -> `initial_fen`, untouched
///
/// Every call replays from scratch, so the result always matches the move
/// list it was given.
///
/// # Example
/// ```
/// use engine_bridge_core::position::{reconstruct_fen, STARTING_FEN};
///
/// let moves = vec!["e2e4".to_string(), "e7e5".to_string()];
/// let fen = reconstruct_fen(Some(STARTING_FEN), &moves, "chess").unwrap();
/// assert_eq!(fen, "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2");
/// ```
pub fn reconstruct_fen(
    initial_fen: Option<&str>,
    moves: &[String],
    variant: &str,
) -> Result<String> {
    let initial_fen = match initial_fen {
        Some(fen) if !fen.trim().is_empty() => fen,
        _ => return Ok(STARTING_FEN.to_string()),
    };

    if moves.is_empty() {
        return Ok(initial_fen.to_string());
    }

    let mut position = setup_position(initial_fen, variant)?;

    for (index, uci) in moves.iter().enumerate() {
        let parsed: UciMove = uci.parse().map_err(|e| Error::IllegalMove {
            index,
            uci: uci.clone(),
            reason: format!("{}", e),
        })?;

        let m = parsed.to_move(&position).map_err(|e| Error::IllegalMove {
            index,
            uci: uci.clone(),
            reason: format!("{}", e),
        })?;

        position = position.play(m).map_err(|_| Error::IllegalMove {
            index,
            uci: uci.clone(),
            reason: "move is not legal in this position".to_string(),
        })?;
    }

    Ok(Fen::from_position(&position, EnPassantMode::Legal).to_string())
}

fn setup_position(fen: &str, variant: &str) -> Result<VariantPosition> {
    let variant = variant_from_name(variant)?;

    let parsed: Fen = fen
        .parse()
        .map_err(|e| Error::InvalidPosition(format!("{}: {}", fen, e)))?;
    let setup = parsed.into_setup();

    // Chess960 starting squares only validate in Chess960 mode
    VariantPosition::from_setup(variant, setup.clone(), CastlingMode::Standard)
        .or_else(|_| VariantPosition::from_setup(variant, setup, CastlingMode::Chess960))
        .map_err(|_| {
            Error::InvalidPosition(format!("{} is not a legal {:?} position", fen, variant))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moves(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_reconstruct_open_game() {
        let fen = reconstruct_fen(Some(STARTING_FEN), &moves(&["e2e4", "e7e5"]), "chess").unwrap();
        assert_eq!(fen, "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2");
    }

    #[test]
    fn test_castling_king_onto_rook() {
        let italian = moves(&["e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "g8f6"]);
        let expected = "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQ1RK1 b kq - 5 4";

        for castle in ["e1h1", "e1g1"] {
            let mut line = italian.clone();
            line.push(castle.to_string());
            let fen = reconstruct_fen(Some(STARTING_FEN), &line, "chess").unwrap();
            assert_eq!(fen, expected, "castling as {}", castle);
        }
    }

    #[test]
    fn test_chess960_start_falls_back_to_chess960_castling() {
        let fen = reconstruct_fen(
            Some("r1k4r/pppppppp/8/8/8/8/PPPPPPPP/RK5R w HAha - 0 1"),
            &moves(&["b1h1"]),
            "chess960",
        )
        .unwrap();
        assert_eq!(fen, "r1k4r/pppppppp/8/8/8/8/PPPPPPPP/R4RK1 b kq - 1 1");
    }

    #[test]
    fn test_missing_fen_is_starting_position() {
        assert_eq!(reconstruct_fen(None, &[], "chess").unwrap(), STARTING_FEN);
        assert_eq!(reconstruct_fen(Some(""), &moves(&["e2e4"]), "chess").unwrap(), STARTING_FEN);
    }

    #[test]
    fn test_no_moves_returns_input_unchanged() {
        let fen = "8/8/8/4k3/8/8/8/4K3 w - - 12 40";
        assert_eq!(reconstruct_fen(Some(fen), &[], "chess").unwrap(), fen);
    }

    #[test]
    fn test_reconstruct_is_deterministic() {
        let list = moves(&["d2d4", "g8f6", "c2c4", "e7e6"]);
        let first = reconstruct_fen(Some(STARTING_FEN), &list, "chess").unwrap();
        let second = reconstruct_fen(Some(STARTING_FEN), &list, "chess").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_black_to_move_after_one_move() {
        let fen = reconstruct_fen(Some(STARTING_FEN), &moves(&["g1f3"]), "chess").unwrap();
        assert_eq!(fen, "rnbqkbnr/pppppppp/8/8/8/5N2/PPPPPPPP/RNBQKB1R b KQkq - 1 1");
    }

    #[test]
    fn test_invalid_fen() {
        let result = reconstruct_fen(Some("not a fen"), &moves(&["e2e4"]), "chess");
        assert!(matches!(result, Err(Error::InvalidPosition(_))));
    }

    #[test]
    fn test_illegal_move_reports_index() {
        let result = reconstruct_fen(Some(STARTING_FEN), &moves(&["e2e4", "e2e4"]), "chess");
        match result {
            Err(Error::IllegalMove { index, uci, .. }) => {
                assert_eq!(index, 1);
                assert_eq!(uci, "e2e4");
            }
            other => panic!("expected illegal move, got {:?}", other),
        }
    }

    #[test]
    fn test_garbage_move_token() {
        let result = reconstruct_fen(Some(STARTING_FEN), &moves(&["zz99"]), "chess");
        assert!(matches!(result, Err(Error::IllegalMove { index: 0, .. })));
    }

    #[test]
    fn test_unknown_variant() {
        let result = reconstruct_fen(Some(STARTING_FEN), &moves(&["e2e4"]), "shogi");
        assert!(matches!(result, Err(Error::UnsupportedVariant(_))));
    }

    #[test]
    fn test_antichess_capture_is_forced() {
        // After 1. e3 b5, white must capture with the bishop in antichess
        let start = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w - - 0 1";
        let ok = reconstruct_fen(Some(start), &moves(&["e2e3", "b7b5", "f1b5"]), "antichess");
        assert!(ok.is_ok());

        let refused = reconstruct_fen(Some(start), &moves(&["e2e3", "b7b5", "a2a3"]), "antichess");
        assert!(matches!(refused, Err(Error::IllegalMove { index: 2, .. })));
    }

    #[test]
    fn test_variant_names() {
        assert_eq!(variant_from_name("chess").unwrap(), Variant::Chess);
        assert_eq!(variant_from_name("3check").unwrap(), Variant::ThreeCheck);
        assert_eq!(variant_from_name("kingofthehill").unwrap(), Variant::KingOfTheHill);
    }
}
