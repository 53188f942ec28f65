//! Elo rating math.
//!
//! Pure functions, no state and no randomness: identical inputs always
//! produce identical outputs.

/// Minimum displayed odds, regardless of how lopsided the ratings are.
pub const MIN_ODDS: f64 = 1.1;

/// Probability that the fighter rated `rating_a` beats `rating_b`.
pub fn expected_score(rating_a: i32, rating_b: i32) -> f64 {
    1.0 / (1.0 + 10f64.powf(f64::from(rating_b - rating_a) / 400.0))
}

/// New ratings after a match.
///
/// `outcome` is 1.0 if A won, 0.0 if B won, 0.5 for a draw.
pub fn update_ratings(rating_a: i32, rating_b: i32, outcome: f64, k_factor: f64) -> (i32, i32) {
    let expected_a = expected_score(rating_a, rating_b);
    let expected_b = expected_score(rating_b, rating_a);

    let new_a = f64::from(rating_a) + k_factor * (outcome - expected_a);
    let new_b = f64::from(rating_b) + k_factor * ((1.0 - outcome) - expected_b);

    (new_a.round() as i32, new_b.round() as i32)
}

/// Pre-fight odds per side: the inverse win probability, rounded to two
/// decimals and floored at [`MIN_ODDS`].
pub fn fight_odds(rating_a: i32, rating_b: i32) -> [f64; 2] {
    let win_a = expected_score(rating_a, rating_b);
    [
        round2(1.0 / win_a).max(MIN_ODDS),
        round2(1.0 / (1.0 - win_a)).max(MIN_ODDS),
    ]
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_ratings_split_expectation() {
        assert!((expected_score(1000, 1000) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn winner_gains_what_symmetry_predicts() {
        let (a, b) = update_ratings(1000, 1000, 1.0, 32.0);
        assert_eq!((a, b), (1016, 984));
    }

    #[test]
    fn draw_moves_ratings_toward_each_other() {
        let (a, b) = update_ratings(1200, 1000, 0.5, 32.0);
        assert!(a < 1200);
        assert!(b > 1000);
        // Total rating is conserved up to rounding.
        assert!(((a + b) - 2200).abs() <= 1);
    }

    #[test]
    fn antisymmetric_under_side_swap() {
        let k = 32.0;
        for (ra, rb) in [(1000, 1000), (1200, 900), (800, 1450), (2000, 1000)] {
            for outcome in [0.0, 0.5, 1.0] {
                let (a1, b1) = update_ratings(ra, rb, outcome, k);
                let (b2, a2) = update_ratings(rb, ra, 1.0 - outcome, k);
                assert_eq!((a1, b1), (a2, b2), "ra={ra} rb={rb} outcome={outcome}");
            }
        }
    }

    #[test]
    fn deterministic() {
        assert_eq!(
            update_ratings(1337, 1204, 1.0, 32.0),
            update_ratings(1337, 1204, 1.0, 32.0)
        );
    }

    #[test]
    fn even_fight_pays_double() {
        assert_eq!(fight_odds(1000, 1000), [2.0, 2.0]);
    }

    #[test]
    fn heavy_favorite_is_floored() {
        let odds = fight_odds(2000, 1000);
        assert_eq!(odds[0], MIN_ODDS);
        assert!(odds[1] > 2.0);
    }

    #[test]
    fn odds_are_rounded_to_cents() {
        for side in fight_odds(1100, 1000) {
            assert!((side * 100.0 - (side * 100.0).round()).abs() < 1e-9);
        }
    }
}
