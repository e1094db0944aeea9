//! Piece classification from a cell's connection pattern.
//!
//! Orientation counts 90° clockwise turns from each piece's reference image:
//! endpoint opens North, straight runs North–South, curve joins North and
//! West, junction is closed to the South.

use serde::{Deserialize, Serialize};

use crate::types::Connections;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceType {
    Endpoint,
    Straight,
    Curved,
    Junction,
}

impl PieceType {
    /// Number of distinct orientations (rotational symmetry period).
    pub fn period(self) -> u8 {
        match self {
            PieceType::Straight => 2,
            _ => 4,
        }
    }
}

/// Piece type plus the orientation that reproduces the carved connections.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Classification {
    pub piece: PieceType,
    pub orientation: u8,
}

const fn entry(piece: PieceType, orientation: u8) -> Option<Classification> {
    Some(Classification { piece, orientation })
}

/// Look up the piece for a connection pattern.
///
/// Returns `None` for the empty and the four-way pattern, neither of which
/// carving can leave behind.
pub fn classify(connections: Connections) -> Option<Classification> {
    use PieceType::*;
    match connections.as_array() {
        [true, false, false, false] => entry(Endpoint, 0),
        [false, true, false, false] => entry(Endpoint, 1),
        [false, false, true, false] => entry(Endpoint, 2),
        [false, false, false, true] => entry(Endpoint, 3),
        [true, false, true, false] => entry(Straight, 0),
        [false, true, false, true] => entry(Straight, 1),
        [true, false, false, true] => entry(Curved, 0),
        [true, true, false, false] => entry(Curved, 1),
        [false, true, true, false] => entry(Curved, 2),
        [false, false, true, true] => entry(Curved, 3),
        [true, true, false, true] => entry(Junction, 0),
        [true, true, true, false] => entry(Junction, 1),
        [false, true, true, true] => entry(Junction, 2),
        [true, false, true, true] => entry(Junction, 3),
        [false, false, false, false] | [true, true, true, true] => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_patterns() -> impl Iterator<Item = Connections> {
        (0u8..16).map(|bits| {
            Connections::new(bits & 1 != 0, bits & 2 != 0, bits & 4 != 0, bits & 8 != 0)
        })
    }

    /// Rotate a pattern one quarter turn clockwise.
    fn rotate_cw(c: Connections) -> Connections {
        let [n, e, s, w] = c.as_array();
        Connections::new(w, n, e, s)
    }

    #[test]
    fn test_total_over_reachable_patterns() {
        for pattern in all_patterns() {
            let degree = pattern.degree();
            match classify(pattern) {
                Some(_) => assert!((1..=3).contains(&degree), "{:?}", pattern),
                None => assert!(degree == 0 || degree == 4, "{:?}", pattern),
            }
        }
        assert_eq!(all_patterns().filter_map(classify).count(), 14);
    }

    #[test]
    fn test_piece_types_by_shape() {
        let count = |piece: PieceType| all_patterns().filter_map(classify).filter(|c| c.piece == piece).count();
        assert_eq!(count(PieceType::Endpoint), 4);
        assert_eq!(count(PieceType::Straight), 2);
        assert_eq!(count(PieceType::Curved), 4);
        assert_eq!(count(PieceType::Junction), 4);
    }

    #[test]
    fn test_orientation_is_clockwise_turns_from_reference() {
        let references = [
            (PieceType::Endpoint, Connections::new(true, false, false, false)),
            (PieceType::Straight, Connections::new(true, false, true, false)),
            (PieceType::Curved, Connections::new(true, false, false, true)),
            (PieceType::Junction, Connections::new(true, true, false, true)),
        ];
        for (piece, reference) in references {
            let mut pattern = reference;
            for turns in 0..piece.period() {
                let found = classify(pattern).unwrap();
                assert_eq!(found.piece, piece);
                assert_eq!(found.orientation, turns, "{:?} after {} turns", piece, turns);
                pattern = rotate_cw(pattern);
            }
            // A full period brings the reference image back
            assert_eq!(pattern, reference);
        }
    }

    #[test]
    fn test_orientation_within_period() {
        for c in all_patterns().filter_map(classify) {
            assert!(c.orientation < c.piece.period());
        }
    }
}
