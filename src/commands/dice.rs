//! Dice roll and coin flip.

use tracing::instrument;

/// Result of a coin flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Coin {
    /// Heads.
    Heads,
    /// Tails.
    Tails,
}

/// Rolls a die with the given number of sides (1-based result).
///
/// Zero-sided dice are treated as the conventional six sides.
#[instrument]
pub fn roll(sides: u32) -> u32 {
    let sides = if sides == 0 { 6 } else { sides };
    fastrand::u32(1..=sides)
}

/// Flips a coin.
#[instrument]
pub fn flip() -> Coin {
    if fastrand::bool() {
        Coin::Heads
    } else {
        Coin::Tails
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roll_stays_in_range() {
        for _ in 0..100 {
            let value = roll(6);
            assert!((1..=6).contains(&value));
        }
    }

    #[test]
    fn zero_sides_defaults_to_six() {
        for _ in 0..100 {
            assert!((1..=6).contains(&roll(0)));
        }
    }

    #[test]
    fn one_sided_die_is_deterministic() {
        assert_eq!(roll(1), 1);
    }
}
