//! Square contents (Piece)
//!
//! A square is stored as one byte so a whole board is a plain `[Piece; 64]`
//! that can be hashed and compared directly:
//!
//! ```text
//! bit 7     presence (1 = occupied)
//! bit 6     color    (0 = white, 1 = black)
//! bits 5..3 kind     (1 pawn, 2 rook, 3 knight, 4 bishop, 5 queen, 6 king)
//! bit 2     flag     (king/rook: has moved, pawn: just advanced two squares)
//! ```
//!
//! The same byte is used by the persisted position record.

use super::Color;

/// Piece kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PieceKind {
    Pawn = 1,
    Rook = 2,
    Knight = 3,
    Bishop = 4,
    Queen = 5,
    King = 6,
}

impl PieceKind {
    /// All kinds in encoding order
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Rook,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Queen,
        PieceKind::King,
    ];

    /// Kinds a pawn may promote to, strongest first
    pub const PROMOTIONS: [PieceKind; 4] =
        [PieceKind::Queen, PieceKind::Rook, PieceKind::Bishop, PieceKind::Knight];

    #[inline]
    pub const fn from_bits(bits: u8) -> Option<PieceKind> {
        match bits {
            1 => Some(PieceKind::Pawn),
            2 => Some(PieceKind::Rook),
            3 => Some(PieceKind::Knight),
            4 => Some(PieceKind::Bishop),
            5 => Some(PieceKind::Queen),
            6 => Some(PieceKind::King),
            _ => None,
        }
    }

    /// Material value in pawns
    #[inline]
    pub const fn material(self) -> i32 {
        match self {
            PieceKind::Pawn => 1,
            PieceKind::Knight | PieceKind::Bishop => 3,
            PieceKind::Rook => 5,
            PieceKind::Queen => 9,
            PieceKind::King => 0,
        }
    }

    /// Lowercase letter used by FEN and move notation
    #[inline]
    pub const fn letter(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Rook => 'r',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }

    pub fn from_letter(c: char) -> Option<PieceKind> {
        match c.to_ascii_lowercase() {
            'p' => Some(PieceKind::Pawn),
            'r' => Some(PieceKind::Rook),
            'n' => Some(PieceKind::Knight),
            'b' => Some(PieceKind::Bishop),
            'q' => Some(PieceKind::Queen),
            'k' => Some(PieceKind::King),
            _ => None,
        }
    }
}

/// Contents of one square
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Piece(u8);

impl Piece {
    pub const PRESENCE_BIT: u8 = 0b1000_0000;
    pub const COLOR_BIT: u8 = 0b0100_0000;
    pub const KIND_MASK: u8 = 0b0011_1000;
    pub const KIND_SHIFT: u8 = 3;
    pub const FLAG_BIT: u8 = 0b0000_0100;

    /// Empty square
    pub const EMPTY: Piece = Piece(0);

    /// Occupied square with the flag cleared
    #[inline]
    pub const fn new(color: Color, kind: PieceKind) -> Piece {
        let color_bit = match color {
            Color::White => 0,
            Color::Black => Self::COLOR_BIT,
        };
        Piece(Self::PRESENCE_BIT | color_bit | ((kind as u8) << Self::KIND_SHIFT))
    }

    /// Decode a persisted byte, rejecting anything the encoder never produces
    pub const fn from_byte(byte: u8) -> Option<Piece> {
        if byte == 0 {
            return Some(Piece::EMPTY);
        }
        if byte & Self::PRESENCE_BIT == 0 || byte & 0b11 != 0 {
            return None;
        }
        let kind = match PieceKind::from_bits((byte & Self::KIND_MASK) >> Self::KIND_SHIFT) {
            Some(kind) => kind,
            None => return None,
        };
        if byte & Self::FLAG_BIT != 0
            && !matches!(kind, PieceKind::Pawn | PieceKind::Rook | PieceKind::King)
        {
            return None;
        }
        Some(Piece(byte))
    }

    #[inline]
    pub const fn byte(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 & Self::PRESENCE_BIT == 0
    }

    #[inline]
    pub const fn is_present(self) -> bool {
        !self.is_empty()
    }

    /// Color of an occupied square (`None` when empty)
    #[inline]
    pub const fn color(self) -> Option<Color> {
        if self.is_empty() {
            None
        } else if self.0 & Self::COLOR_BIT == 0 {
            Some(Color::White)
        } else {
            Some(Color::Black)
        }
    }

    #[inline]
    pub const fn kind(self) -> Option<PieceKind> {
        if self.is_empty() {
            None
        } else {
            PieceKind::from_bits((self.0 & Self::KIND_MASK) >> Self::KIND_SHIFT)
        }
    }

    /// True when the square holds a piece of `color` and `kind`, ignoring the flag
    #[inline]
    pub fn is(self, color: Color, kind: PieceKind) -> bool {
        self.without_flag() == Piece::new(color, kind)
    }

    #[inline]
    pub fn belongs_to(self, color: Color) -> bool {
        self.color() == Some(color)
    }

    #[inline]
    pub const fn flag(self) -> bool {
        self.0 & Self::FLAG_BIT != 0
    }

    #[inline]
    pub const fn with_flag(self) -> Piece {
        Piece(self.0 | Self::FLAG_BIT)
    }

    #[inline]
    pub const fn without_flag(self) -> Piece {
        Piece(self.0 & !Self::FLAG_BIT)
    }

    /// King or rook that still carries castling rights
    #[inline]
    pub fn is_unmoved(self, color: Color, kind: PieceKind) -> bool {
        self == Piece::new(color, kind)
    }

    /// FEN letter, uppercase for white
    pub fn letter(self) -> Option<char> {
        let kind = self.kind()?;
        Some(match self.color()? {
            Color::White => kind.letter().to_ascii_uppercase(),
            Color::Black => kind.letter(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piece_encoding_matches_layout() {
        let p = Piece::new(Color::Black, PieceKind::Queen);
        assert_eq!(p.byte(), 0b1110_1000);
        assert_eq!(p.color(), Some(Color::Black));
        assert_eq!(p.kind(), Some(PieceKind::Queen));
        assert!(!p.flag());
    }

    #[test]
    fn test_flag_does_not_change_identity() {
        let rook = Piece::new(Color::White, PieceKind::Rook);
        let moved = rook.with_flag();
        assert!(moved.flag());
        assert!(moved.is(Color::White, PieceKind::Rook));
        assert!(!moved.is_unmoved(Color::White, PieceKind::Rook));
        assert_eq!(moved.without_flag(), rook);
    }

    #[test]
    fn test_from_byte_validation() {
        assert_eq!(Piece::from_byte(0), Some(Piece::EMPTY));
        assert_eq!(
            Piece::from_byte(Piece::new(Color::White, PieceKind::King).with_flag().byte()),
            Some(Piece::new(Color::White, PieceKind::King).with_flag())
        );
        // presence bit missing
        assert_eq!(Piece::from_byte(0b0000_1000), None);
        // kind 7 does not exist
        assert_eq!(Piece::from_byte(0b1011_1000), None);
        // knights never carry the flag
        assert_eq!(Piece::from_byte(Piece::new(Color::White, PieceKind::Knight).byte() | 0b100), None);
        // low bits are reserved
        assert_eq!(Piece::from_byte(Piece::new(Color::White, PieceKind::Pawn).byte() | 0b1), None);
    }

    #[test]
    fn test_letters() {
        assert_eq!(Piece::new(Color::White, PieceKind::Knight).letter(), Some('N'));
        assert_eq!(Piece::new(Color::Black, PieceKind::Knight).letter(), Some('n'));
        assert_eq!(Piece::EMPTY.letter(), None);
        assert_eq!(PieceKind::from_letter('Q'), Some(PieceKind::Queen));
    }
}
