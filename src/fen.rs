//! Forsyth-Edwards Notation for a board read square by square.
//!
//! Only the piece placement is derived from the image. Castling rights, en
//! passant target and move counters are not observable from a single frame and
//! are written as `- - 0 1`. No legality checks are made.

use std::collections::BTreeMap;
use std::fmt;

use crate::grid::{BOARD_SIZE, SQUARE_COUNT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    White,
    Black,
}

impl Side {
    fn letter(self) -> char {
        match self {
            Side::White => 'w',
            Side::Black => 'b',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub side: Side,
    pub kind: PieceKind,
}

impl Piece {
    pub fn new(side: Side, kind: PieceKind) -> Self {
        Self { side, kind }
    }

    /// Parse a FEN letter: uppercase is white, lowercase is black
    pub fn from_fen_char(c: char) -> Option<Self> {
        let kind = match c.to_ascii_lowercase() {
            'k' => PieceKind::King,
            'q' => PieceKind::Queen,
            'r' => PieceKind::Rook,
            'b' => PieceKind::Bishop,
            'n' => PieceKind::Knight,
            'p' => PieceKind::Pawn,
            _ => return None,
        };
        let side = if c.is_ascii_uppercase() {
            Side::White
        } else {
            Side::Black
        };
        Some(Self::new(side, kind))
    }

    pub fn fen_char(&self) -> char {
        let c = match self.kind {
            PieceKind::King => 'k',
            PieceKind::Queen => 'q',
            PieceKind::Rook => 'r',
            PieceKind::Bishop => 'b',
            PieceKind::Knight => 'n',
            PieceKind::Pawn => 'p',
        };
        match self.side {
            Side::White => c.to_ascii_uppercase(),
            Side::Black => c,
        }
    }
}

/// Encode square index (1 = a8 .. 64 = h1) to piece as a FEN placement field.
///
/// Indices outside 1..=64 are ignored.
pub fn placement_to_fen(pieces: &BTreeMap<usize, Piece>) -> String {
    let mut placement = String::new();
    let mut empty = 0;

    for index in 1..=SQUARE_COUNT {
        match pieces.get(&index) {
            Some(piece) => {
                if empty > 0 {
                    placement.push_str(&empty.to_string());
                    empty = 0;
                }
                placement.push(piece.fen_char());
            }
            None => empty += 1,
        }

        if index % BOARD_SIZE == 0 {
            if empty > 0 {
                placement.push_str(&empty.to_string());
                empty = 0;
            }
            if index < SQUARE_COUNT {
                placement.push('/');
            }
        }
    }

    placement
}

/// A full FEN record built from an observed placement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fen {
    pub placement: String,
    pub side_to_move: Side,
}

impl Fen {
    pub fn new(pieces: &BTreeMap<usize, Piece>, side_to_move: Side) -> Self {
        Self {
            placement: placement_to_fen(pieces),
            side_to_move,
        }
    }

    /// Lichess analysis board link for this position
    pub fn analysis_url(&self) -> String {
        format!(
            "https://lichess.org/analysis/standard/{}%20{}",
            self.placement,
            self.side_to_move.letter()
        )
    }
}

impl fmt::Display for Fen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} - - 0 1", self.placement, self.side_to_move.letter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn starting_position() -> BTreeMap<usize, Piece> {
        let back = "rnbqkbnr";
        let mut pieces = BTreeMap::new();
        for (i, c) in back.chars().enumerate() {
            pieces.insert(i + 1, Piece::from_fen_char(c).unwrap());
            pieces.insert(i + 9, Piece::new(Side::Black, PieceKind::Pawn));
            pieces.insert(i + 49, Piece::new(Side::White, PieceKind::Pawn));
            pieces.insert(i + 57, Piece::from_fen_char(c.to_ascii_uppercase()).unwrap());
        }
        pieces
    }

    #[test]
    fn test_empty_board() {
        assert_eq!(placement_to_fen(&BTreeMap::new()), "8/8/8/8/8/8/8/8");
    }

    #[test]
    fn test_starting_position() {
        let fen = Fen::new(&starting_position(), Side::White);
        assert_eq!(
            fen.to_string(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w - - 0 1"
        );
    }

    #[test]
    fn test_runs_split_by_pieces() {
        let mut pieces = BTreeMap::new();
        pieces.insert(3, Piece::new(Side::Black, PieceKind::King));
        pieces.insert(36, Piece::new(Side::White, PieceKind::Queen));
        pieces.insert(64, Piece::new(Side::White, PieceKind::King));
        pieces.insert(65, Piece::new(Side::White, PieceKind::Rook));

        let fen = Fen::new(&pieces, Side::Black);
        assert_eq!(fen.placement, "2k5/8/8/8/3Q4/8/8/7K");
        assert_eq!(fen.to_string(), "2k5/8/8/8/3Q4/8/8/7K b - - 0 1");
        assert_eq!(
            fen.analysis_url(),
            "https://lichess.org/analysis/standard/2k5/8/8/8/3Q4/8/8/7K%20b"
        );
    }

    #[test]
    fn test_piece_letters() {
        assert_eq!(Piece::from_fen_char('N').unwrap().fen_char(), 'N');
        assert_eq!(
            Piece::from_fen_char('q'),
            Some(Piece::new(Side::Black, PieceKind::Queen))
        );
        assert_eq!(Piece::from_fen_char('x'), None);
    }
}
