//! Tokenizer for UCI `info` and `bestmove` lines

use super::details::{Score, ScoreBound, ScoreKind, UciDetails};

/// Parses one line of engine output into the fields it carries.
///
/// Lines that carry nothing we display (`uciok`, `readyok`, `id name ...`)
/// produce an empty record rather than an error.
///
/// # Example
/// ```
/// use engine_bridge_core::uci::parse_line;
///
/// let details = parse_line("info depth 12 nodes 5000 pv e2e4 e7e5");
/// assert_eq!(details.depth.as_deref(), Some("12"));
/// assert_eq!(details.pv, Some(vec!["e2e4".to_string(), "e7e5".to_string()]));
/// ```
pub fn parse_line(line: &str) -> UciDetails {
    let parts: Vec<&str> = line.split_whitespace().collect();

    match parts.first() {
        Some(&"bestmove") => parse_bestmove(&parts),
        _ => parse_info(&parts),
    }
}

/// Parse: "bestmove e2e4 ponder e7e5"
///
/// `bestmove (none)` is what engines print when there is no legal move; it
/// leaves the field absent.
fn parse_bestmove(parts: &[&str]) -> UciDetails {
    let mut details = UciDetails::default();

    details.bestmove = parts.get(1).filter(|m| is_move_token(m)).map(|s| s.to_string());

    if let Some(pos) = parts.iter().skip(2).position(|p| *p == "ponder") {
        details.ponder = parts.get(pos + 3).map(|s| s.to_string());
    }

    details
}

fn parse_info(parts: &[&str]) -> UciDetails {
    let mut details = UciDetails::default();
    let mut i = 0;

    while i < parts.len() {
        i += match parts[i] {
            "depth" => take_number(&mut details.depth, parts, i),
            "seldepth" => take_number(&mut details.seldepth, parts, i),
            "multipv" => take_number(&mut details.multipv, parts, i),
            "nodes" => take_number(&mut details.nodes, parts, i),
            "nps" => take_number(&mut details.nps, parts, i),
            "hashfull" => take_number(&mut details.hashfull, parts, i),
            "tbhits" => take_number(&mut details.tbhits, parts, i),
            "time" => take_number(&mut details.time, parts, i),
            "currmovenumber" => take_number(&mut details.currmovenumber, parts, i),
            "currmove" => take_move(&mut details.currmove, parts, i),
            "score" => take_score(&mut details.score, parts, i),
            "pv" => {
                // Everything after "pv" is the principal variation
                let pv: Vec<String> = parts[i + 1..].iter().map(|s| s.to_string()).collect();
                if details.pv.is_none() && !pv.is_empty() {
                    details.pv = Some(pv);
                }
                break;
            }
            // Free text up to the end of the line
            "string" => break,
            _ => 1,
        };
    }

    details
}

/// Stores the unsigned decimal following `parts[i]`, returning how many
/// tokens were consumed.
fn take_number(slot: &mut Option<String>, parts: &[&str], i: usize) -> usize {
    match parts.get(i + 1) {
        Some(token) if is_unsigned(token) => {
            if slot.is_none() {
                *slot = Some(token.to_string());
            }
            2
        }
        _ => 1,
    }
}

fn take_move(slot: &mut Option<String>, parts: &[&str], i: usize) -> usize {
    match parts.get(i + 1) {
        Some(token) if !is_keyword(token) => {
            if slot.is_none() {
                *slot = Some(token.to_string());
            }
            2
        }
        _ => 1,
    }
}

/// Parse: "score cp 20", "score mate -3", "score cp -119 lowerbound"
fn take_score(slot: &mut Option<Score>, parts: &[&str], i: usize) -> usize {
    let kind = parts.get(i + 1).and_then(|t| ScoreKind::from_token(t));
    let value = parts.get(i + 2).filter(|t| is_signed(t));

    let (kind, value) = match (kind, value) {
        (Some(kind), Some(value)) => (kind, value.to_string()),
        _ => return 1,
    };

    let bound = parts.get(i + 3).and_then(|t| ScoreBound::from_token(t));

    if slot.is_none() {
        *slot = Some(Score { kind, value, bound });
    }

    if bound.is_some() {
        4
    } else {
        3
    }
}

/// Word characters only, so placeholders like `(none)` are rejected
fn is_move_token(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

fn is_unsigned(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

fn is_signed(token: &str) -> bool {
    is_unsigned(token.strip_prefix('-').unwrap_or(token))
}

fn is_keyword(token: &str) -> bool {
    matches!(
        token,
        "depth"
            | "seldepth"
            | "multipv"
            | "score"
            | "nodes"
            | "nps"
            | "hashfull"
            | "tbhits"
            | "time"
            | "pv"
            | "currmove"
            | "currmovenumber"
            | "string"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(moves: &[&str]) -> Option<Vec<String>> {
        Some(moves.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_parse_bestmove_with_ponder() {
        let details = parse_line("bestmove b4c5 ponder b6c7");

        assert_eq!(
            details,
            UciDetails {
                bestmove: Some("b4c5".into()),
                ponder: Some("b6c7".into()),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_parse_bestmove_without_ponder() {
        let details = parse_line("bestmove e2e4");
        assert_eq!(details.bestmove.as_deref(), Some("e2e4"));
        assert_eq!(details.ponder, None);
    }

    #[test]
    fn test_parse_bestmove_none() {
        let details = parse_line("bestmove (none)");
        assert_eq!(details.bestmove, None);
        assert!(details.is_empty());

        let details = parse_line("bestmove (none) ponder e7e5");
        assert_eq!(details.bestmove, None);
        assert_eq!(details.ponder.as_deref(), Some("e7e5"));
    }

    #[test]
    fn test_parse_currmove_line() {
        let details = parse_line("info depth 30 currmove b1d2 currmovenumber 4");

        assert_eq!(
            details,
            UciDetails {
                depth: Some("30".into()),
                currmove: Some("b1d2".into()),
                currmovenumber: Some("4".into()),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_parse_full_info_line() {
        let details = parse_line(
            "info depth 26 seldepth 36 multipv 1 score cp 209 nodes 21219470 nps 4641178 hashfull 1000 tbhits 0 time 4572 pv d1b3 d8e7",
        );

        assert_eq!(
            details,
            UciDetails {
                depth: Some("26".into()),
                seldepth: Some("36".into()),
                multipv: Some("1".into()),
                score: Some(Score {
                    kind: ScoreKind::Cp,
                    value: "209".into(),
                    bound: None,
                }),
                nodes: Some("21219470".into()),
                nps: Some("4641178".into()),
                hashfull: Some("1000".into()),
                tbhits: Some("0".into()),
                time: Some("4572".into()),
                pv: strings(&["d1b3", "d8e7"]),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_parse_negative_score() {
        let details = parse_line(
            "info depth 30 seldepth 39 multipv 1 score cp -20 nodes 12336105 nps 4630670 hashfull 981 tbhits 0 time 2664 pv b8c6 f1b5 g8f6",
        );

        let score = details.score.unwrap();
        assert_eq!(score.kind, ScoreKind::Cp);
        assert_eq!(score.value, "-20");
        assert_eq!(details.hashfull.as_deref(), Some("981"));
        assert_eq!(details.pv, strings(&["b8c6", "f1b5", "g8f6"]));
    }

    #[test]
    fn test_parse_score_bound() {
        let details = parse_line(
            "info depth 28 seldepth 36 multipv 1 score cp -119 lowerbound nodes 27756518 nps 4392549 hashfull 1000 tbhits 0 time 6319 pv b1c3",
        );

        assert_eq!(
            details.score,
            Some(Score {
                kind: ScoreKind::Cp,
                value: "-119".into(),
                bound: Some(ScoreBound::Lower),
            })
        );
        assert_eq!(details.nodes.as_deref(), Some("27756518"));
        assert_eq!(details.pv, strings(&["b1c3"]));
    }

    #[test]
    fn test_parse_mate_score() {
        let details = parse_line("info depth 40 score mate -3 upperbound pv h7h8");
        let score = details.score.unwrap();
        assert_eq!(score.kind, ScoreKind::Mate);
        assert_eq!(score.value, "-3");
        assert_eq!(score.bound, Some(ScoreBound::Upper));
    }

    #[test]
    fn test_seldepth_alone_does_not_set_depth() {
        let details = parse_line("info seldepth 36");
        assert_eq!(details.depth, None);
        assert_eq!(details.seldepth.as_deref(), Some("36"));
    }

    #[test]
    fn test_fields_in_any_order() {
        let details = parse_line("info nps 100 time 5 depth 3 nodes 500");
        assert_eq!(details.depth.as_deref(), Some("3"));
        assert_eq!(details.nodes.as_deref(), Some("500"));
        assert_eq!(details.nps.as_deref(), Some("100"));
        assert_eq!(details.time.as_deref(), Some("5"));
    }

    #[test]
    fn test_missing_value_does_not_swallow_next_field() {
        let details = parse_line("info depth nodes 42");
        assert_eq!(details.depth, None);
        assert_eq!(details.nodes.as_deref(), Some("42"));
    }

    #[test]
    fn test_huge_node_count_is_kept_verbatim() {
        let details = parse_line("info nodes 123456789012345678901234567890");
        assert_eq!(
            details.nodes.as_deref(),
            Some("123456789012345678901234567890")
        );
    }

    #[test]
    fn test_info_string_is_ignored() {
        let details = parse_line("info string NNUE evaluation using nn.nnue enabled depth 5");
        assert!(details.is_empty());
    }

    #[test]
    fn test_unknown_lines_are_empty() {
        assert!(parse_line("uciok").is_empty());
        assert!(parse_line("readyok").is_empty());
        assert!(parse_line("id name Stockfish 16").is_empty());
        assert!(parse_line("").is_empty());
    }

    #[test]
    fn test_empty_pv_is_absent() {
        let details = parse_line("info depth 1 pv");
        assert_eq!(details.depth.as_deref(), Some("1"));
        assert_eq!(details.pv, None);
    }
}
