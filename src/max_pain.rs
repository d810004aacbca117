//! Max pain: the settlement strike that minimizes what option sellers owe.

use crate::aggregation::StrikeOiMap;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::collections::BTreeSet;

/// Result of [`solve`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaxPain {
    /// Strike with the smallest aggregate payout, `None` without strikes.
    pub price: Option<Decimal>,
    /// Aggregate intrinsic payout at `price`.
    pub loss: f64,
}

impl MaxPain {
    /// Result for an expiry without any strike.
    pub const EMPTY: MaxPain = MaxPain {
        price: None,
        loss: 0.0,
    };
}

/// Intrinsic payout owed by option sellers if the underlying settles at
/// `settlement`:
///
/// ```text
/// Σ max(0, S - K) · call[K]  +  Σ max(0, K - S) · put[K]
/// ```
#[must_use]
pub fn loss_at(call_by_strike: &StrikeOiMap, put_by_strike: &StrikeOiMap, settlement: Decimal) -> f64 {
    let calls: f64 = call_by_strike
        .iter()
        .map(|(strike, oi)| intrinsic(settlement - *strike) * oi)
        .sum();
    let puts: f64 = put_by_strike
        .iter()
        .map(|(strike, oi)| intrinsic(*strike - settlement) * oi)
        .sum();
    calls + puts
}

/// Evaluates every strike present in either map as a settlement price and
/// returns the one with the smallest loss. On a tie the lower strike wins.
#[must_use]
pub fn solve(call_by_strike: &StrikeOiMap, put_by_strike: &StrikeOiMap) -> MaxPain {
    let strikes: BTreeSet<Decimal> = call_by_strike
        .keys()
        .chain(put_by_strike.keys())
        .copied()
        .collect();

    let mut best = MaxPain::EMPTY;
    let mut best_loss = f64::INFINITY;

    for strike in strikes {
        let loss = loss_at(call_by_strike, put_by_strike, strike);
        // strict: the first (lowest) strike keeps a tie
        if loss < best_loss {
            best_loss = loss;
            best = MaxPain {
                price: Some(strike),
                loss,
            };
        }
    }

    best
}

fn intrinsic(moneyness: Decimal) -> f64 {
    if moneyness > Decimal::ZERO {
        moneyness.to_f64().unwrap_or(0.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn map(entries: &[(Decimal, f64)]) -> StrikeOiMap {
        entries.iter().copied().collect()
    }

    /// Small deterministic generator so the exhaustive checks are reproducible.
    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self, bound: u64) -> u64 {
            self.0 = self
                .0
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            (self.0 >> 33) % bound
        }
    }

    #[test]
    fn test_empty_input() {
        let result = solve(&StrikeOiMap::new(), &StrikeOiMap::new());
        assert_eq!(result, MaxPain::EMPTY);
        assert_eq!(result.price, None);
        assert_eq!(result.loss, 0.0);
    }

    #[test]
    fn test_single_strike() {
        let result = solve(&map(&[(dec!(50000), 4.0)]), &StrikeOiMap::new());
        assert_eq!(result.price, Some(dec!(50000)));
        assert_eq!(result.loss, 0.0);
    }

    #[test]
    fn test_three_instrument_scenario() {
        let calls = map(&[(dec!(60000), 10.0), (dec!(70000), 3.0)]);
        let puts = map(&[(dec!(60000), 5.0)]);

        // S = 60000: calls pay nothing, the 60000 put is at the money.
        assert_eq!(loss_at(&calls, &puts, dec!(60000)), 0.0);
        // S = 70000: 10 calls are 10000 in the money.
        assert_eq!(loss_at(&calls, &puts, dec!(70000)), 100_000.0);

        let result = solve(&calls, &puts);
        assert_eq!(result.price, Some(dec!(60000)));
        assert_eq!(result.loss, 0.0);
    }

    #[test]
    fn test_balanced_book_settles_in_the_middle() {
        let calls = map(&[(dec!(90), 10.0), (dec!(100), 10.0), (dec!(110), 10.0)]);
        let puts = map(&[(dec!(90), 10.0), (dec!(100), 10.0), (dec!(110), 10.0)]);

        // loss(90) = puts 100 & 110: 10*10 + 20*10 = 300
        // loss(100) = call 90: 100 + put 110: 100 = 200
        // loss(110) = calls 90 & 100: 200 + 100 = 300
        assert_eq!(loss_at(&calls, &puts, dec!(90)), 300.0);
        assert_eq!(loss_at(&calls, &puts, dec!(110)), 300.0);

        let result = solve(&calls, &puts);
        assert_eq!(result.price, Some(dec!(100)));
        assert_eq!(result.loss, 200.0);
    }

    #[test]
    fn test_tie_goes_to_lower_strike() {
        let calls = map(&[(dec!(100), 1.0)]);
        let puts = map(&[(dec!(200), 1.0)]);

        assert_eq!(loss_at(&calls, &puts, dec!(100)), 100.0);
        assert_eq!(loss_at(&calls, &puts, dec!(200)), 100.0);
        assert_eq!(solve(&calls, &puts).price, Some(dec!(100)));
    }

    #[test]
    fn test_only_puts_settles_at_highest_strike() {
        let puts = map(&[(dec!(1000), 2.0), (dec!(1500), 1.0), (dec!(2000), 3.0)]);

        let result = solve(&StrikeOiMap::new(), &puts);
        assert_eq!(result.price, Some(dec!(2000)));
        assert_eq!(result.loss, 0.0);
    }

    #[test]
    fn test_fractional_strikes() {
        let calls = map(&[(dec!(2512.5), 1.0)]);
        let puts = map(&[(dec!(2500), 1.0)]);

        assert_eq!(loss_at(&calls, &puts, dec!(2512.5)), 12.5);
        assert_eq!(loss_at(&calls, &puts, dec!(2500)), 0.0);
        assert_eq!(solve(&calls, &puts).price, Some(dec!(2500)));
    }

    #[test]
    fn test_matches_brute_force() {
        let mut rng = Lcg(7);

        for _ in 0..200 {
            let mut calls = StrikeOiMap::new();
            let mut puts = StrikeOiMap::new();
            for _ in 0..rng.next(12) {
                let strike = Decimal::from(rng.next(40) * 500 + 10_000);
                calls.insert(strike, rng.next(50) as f64);
            }
            for _ in 0..rng.next(12) {
                let strike = Decimal::from(rng.next(40) * 500 + 10_000);
                puts.insert(strike, rng.next(50) as f64);
            }

            let result = solve(&calls, &puts);
            let strikes: BTreeSet<Decimal> = calls.keys().chain(puts.keys()).copied().collect();

            let Some(price) = result.price else {
                assert!(strikes.is_empty());
                continue;
            };
            assert!(strikes.contains(&price));
            assert_eq!(result.loss, loss_at(&calls, &puts, price));

            for strike in &strikes {
                let loss = loss_at(&calls, &puts, *strike);
                assert!(result.loss <= loss);
                if loss == result.loss {
                    assert!(price <= *strike, "tie must keep the lower strike");
                }
            }
        }
    }
}
