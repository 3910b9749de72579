//! FSRS (Free Spaced Repetition Scheduler) algorithm, version 6.
//!
//! Memory research based DSR model:
//! - Difficulty (D): Card difficulty 1-10
//! - Stability (S): Days until retention drops to target
//! - Retrievability (R): Probability of recall
//!
//! Stability and difficulty are rounded to two decimals after every step so
//! the values written into documents stay short and stable.

use super::{SchedulingResult, SpacedRepetitionAlgorithm};
use crate::types::{CardMeta, CardState, Rating, Settings, ALGORITHM};
use chrono::{DateTime, Duration, Utc};

const MS_PER_DAY: f64 = 86_400_000.0;

/// Smallest stability written after a lapse or same-day review.
const MIN_STABILITY: f64 = 0.01;

/// FSRS-6 default parameters (21 weights).
pub const DEFAULT_WEIGHTS: [f64; 21] = [
    0.212, 1.2931, 2.3065, 8.2956, // w[0-3]: initial stability for Again, Hard, Good, Easy
    6.4133, // w[4]: initial difficulty base
    0.8334, // w[5]: initial difficulty modifier
    3.0194, // w[6]: difficulty delta
    0.001,  // w[7]: mean reversion weight
    1.8722, // w[8]: stability exp base
    0.1666, // w[9]: stability decay
    0.796,  // w[10]: retrievability effect
    1.4835, // w[11]: forget stability base
    0.0614, // w[12]: difficulty on forget
    0.2629, // w[13]: stability on forget
    1.6483, // w[14]: retrievability on forget
    0.6014, // w[15]: hard penalty
    1.8729, // w[16]: easy bonus
    0.5425, // w[17]: short-term rating effect
    0.0912, // w[18]: short-term rating offset
    0.0658, // w[19]: short-term stability decay
    0.1542, // w[20]: forgetting curve decay
];

/// FSRS algorithm with configurable parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Fsrs {
    pub request_retention: f64,
    pub maximum_interval: u32,
    pub w: [f64; 21],
}

impl Default for Fsrs {
    fn default() -> Self {
        Self {
            request_retention: 0.9,
            maximum_interval: 36500,
            w: DEFAULT_WEIGHTS,
        }
    }
}

impl SpacedRepetitionAlgorithm for Fsrs {
    fn name(&self) -> &'static str {
        ALGORITHM
    }

    fn schedule(
        &self,
        previous: Option<&CardState>,
        rating: Rating,
        now: DateTime<Utc>,
    ) -> SchedulingResult {
        let (stability, difficulty) = match previous {
            None => (self.initial_stability(rating), self.initial_difficulty(rating)),
            Some(state) => self.schedule_subsequent_review(state, rating, now),
        };

        let interval_days = self.interval_from_stability(stability);
        let next_due = now
            .checked_add_signed(Duration::days(i64::from(interval_days)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let reviews = previous.map_or(0, |state| state.reviews) + 1;
        let lapses = previous.map_or(0, |state| state.lapses) + u32::from(rating == Rating::Again);

        SchedulingResult {
            meta: CardMeta::new(now, next_due, stability, difficulty, rating, reviews, lapses),
            interval_days,
            next_due,
        }
    }
}

impl Fsrs {
    /// Scheduler using the retention and interval cap from `settings`.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            request_retention: settings.request_retention,
            maximum_interval: settings.maximum_interval,
            ..Self::default()
        }
    }

    fn decay(&self) -> f64 {
        -self.w[20]
    }

    /// Chosen so that retrievability is 0.9 when elapsed days equal stability.
    fn factor(&self) -> f64 {
        0.9_f64.powf(1.0 / self.decay()) - 1.0
    }

    /// S0(G) = w[G-1]
    fn initial_stability(&self, rating: Rating) -> f64 {
        let index = usize::from(rating.to_value() - 1);
        round2(self.w[index].max(0.1))
    }

    /// D0(G) = w[4] - e^(w[5] * (G - 1)) + 1
    fn initial_difficulty(&self, rating: Rating) -> f64 {
        let g = f64::from(rating.to_value());
        let d0 = self.w[4] - (self.w[5] * (g - 1.0)).exp() + 1.0;
        round2(d0.clamp(1.0, 10.0))
    }

    /// Linear damping toward 10, then mean reversion toward D0(Easy).
    fn next_difficulty(&self, current_d: f64, rating: Rating) -> f64 {
        let g = f64::from(rating.to_value());
        let delta = -self.w[6] * (g - 3.0);
        let damped = current_d + delta * (10.0 - current_d) / 9.0;
        let reverted = self.w[7] * self.initial_difficulty(Rating::Easy) + (1.0 - self.w[7]) * damped;
        round2(reverted.clamp(1.0, 10.0))
    }

    /// R = (1 + FACTOR * t / S)^DECAY
    fn retrievability(&self, elapsed_days: f64, stability: f64) -> f64 {
        (1.0 + self.factor() * elapsed_days / stability).powf(self.decay())
    }

    /// S' = S * (1 + e^w[8] * (11 - D) * S^-w[9] * (e^((1-R) * w[10]) - 1) * penalty * bonus)
    fn next_stability_recall(
        &self,
        stability: f64,
        difficulty: f64,
        retrievability: f64,
        rating: Rating,
    ) -> f64 {
        let hard_penalty = if rating == Rating::Hard { self.w[15] } else { 1.0 };
        let easy_bonus = if rating == Rating::Easy { self.w[16] } else { 1.0 };

        let growth = self.w[8].exp()
            * (11.0 - difficulty)
            * stability.powf(-self.w[9])
            * (((1.0 - retrievability) * self.w[10]).exp() - 1.0)
            * hard_penalty
            * easy_bonus;

        round2(stability * (1.0 + growth))
    }

    /// S' = w[11] * D^-w[12] * ((S+1)^w[13] - 1) * e^((1-R) * w[14]),
    /// never above S / e^(w[17] * w[18]).
    fn next_stability_forget(&self, stability: f64, difficulty: f64, retrievability: f64) -> f64 {
        let ceiling = stability / (self.w[17] * self.w[18]).exp();
        let new_s = self.w[11]
            * difficulty.powf(-self.w[12])
            * ((stability + 1.0).powf(self.w[13]) - 1.0)
            * ((1.0 - retrievability) * self.w[14]).exp();
        round2(new_s.min(ceiling)).max(MIN_STABILITY)
    }

    /// Same-day review: S' = S * e^(w[17] * (G - 3 + w[18])) * S^-w[19].
    fn next_stability_short_term(&self, stability: f64, rating: Rating) -> f64 {
        let g = f64::from(rating.to_value());
        let mut sinc = (self.w[17] * (g - 3.0 + self.w[18])).exp() * stability.powf(-self.w[19]);
        if rating.to_value() >= 3 {
            sinc = sinc.max(1.0);
        }
        round2(stability * sinc).max(MIN_STABILITY)
    }

    /// I = S / FACTOR * (R^(1/DECAY) - 1), rounded and clamped to
    /// [1, maximum_interval], with the cap itself never above `Settings::MAX_INTERVAL`.
    fn interval_from_stability(&self, stability: f64) -> u32 {
        let raw = stability / self.factor()
            * (self.request_retention.powf(1.0 / self.decay()) - 1.0);
        let maximum = f64::from(self.maximum_interval.clamp(1, Settings::MAX_INTERVAL));
        let rounded = raw.round();
        if rounded.is_nan() {
            return 1;
        }
        rounded.clamp(1.0, maximum) as u32
    }

    /// Days since the last review, never negative.
    fn elapsed_days(state: &CardState, now: DateTime<Utc>) -> f64 {
        let elapsed_ms = now.signed_duration_since(state.last_review).num_milliseconds() as f64;
        (elapsed_ms / MS_PER_DAY).max(0.0)
    }

    /// Returns (stability, difficulty) for a card with memory state.
    fn schedule_subsequent_review(
        &self,
        state: &CardState,
        rating: Rating,
        now: DateTime<Utc>,
    ) -> (f64, f64) {
        let elapsed = Self::elapsed_days(state, now);
        let new_d = self.next_difficulty(state.d, rating);

        let new_s = if elapsed < 1.0 {
            self.next_stability_short_term(state.s, rating)
        } else {
            let r = self.retrievability(elapsed, state.s);
            if rating == Rating::Again {
                self.next_stability_forget(state.s, state.d, r)
            } else {
                self.next_stability_recall(state.s, state.d, r, rating)
            }
        };

        (new_s, new_d)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn reviewed(s: f64, d: f64, days_ago: i64) -> CardState {
        CardState {
            s,
            d,
            last_review: now() - Duration::days(days_ago),
            reviews: 4,
            lapses: 1,
        }
    }

    #[test]
    fn new_card_first_review_good() {
        let fsrs = Fsrs::default();
        let result = fsrs.schedule(None, Rating::Good, now());

        assert_eq!(result.meta.d, fsrs.initial_difficulty(Rating::Good));
        assert_eq!(result.meta.s, 2.31);
        assert_eq!(result.meta.reviews, 1);
        assert_eq!(result.meta.lapses, 0);
        assert_eq!(result.meta.rating, Rating::Good);
        assert_eq!(result.interval_days, 2);
        assert_eq!(result.next_due, now() + Duration::days(2));
        assert_eq!(result.meta.reviewed_at(), Some(now()));
        assert_eq!(result.meta.due_at(), Some(result.next_due));
    }

    #[test]
    fn new_card_first_review_again() {
        let fsrs = Fsrs::default();
        let result = fsrs.schedule(None, Rating::Again, now());

        assert_eq!(result.meta.s, 0.21);
        assert_eq!(result.interval_days, 1);
        assert_eq!(result.meta.lapses, 1);
        assert_eq!(result.meta.reviews, 1);
    }

    #[test]
    fn initial_values_follow_rating() {
        let fsrs = Fsrs::default();
        let s: Vec<f64> = Rating::ALL.iter().map(|&r| fsrs.initial_stability(r)).collect();
        let d: Vec<f64> = Rating::ALL.iter().map(|&r| fsrs.initial_difficulty(r)).collect();

        assert!(s.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(d.windows(2).all(|pair| pair[0] > pair[1]));
        assert!(d.iter().all(|&value| (1.0..=10.0).contains(&value)));
    }

    #[test]
    fn retrievability_is_target_when_elapsed_equals_stability() {
        let fsrs = Fsrs::default();
        assert!((fsrs.retrievability(0.0, 10.0) - 1.0).abs() < 1e-9);
        assert!((fsrs.retrievability(10.0, 10.0) - 0.9).abs() < 1e-9);
        assert!(fsrs.retrievability(30.0, 10.0) < 0.9);
    }

    #[test]
    fn interval_equals_stability_at_default_retention() {
        let fsrs = Fsrs::default();
        assert_eq!(fsrs.interval_from_stability(12.4), 12);
        assert_eq!(fsrs.interval_from_stability(0.3), 1);
    }

    #[test]
    fn higher_retention_shortens_intervals() {
        let strict = Fsrs { request_retention: 0.95, ..Fsrs::default() };
        let relaxed = Fsrs { request_retention: 0.8, ..Fsrs::default() };
        assert!(strict.interval_from_stability(30.0) < 30);
        assert!(relaxed.interval_from_stability(30.0) > 30);
    }

    #[test]
    fn interval_respects_maximum() {
        let fsrs = Fsrs { maximum_interval: 365, ..Fsrs::default() };
        let state = reviewed(5000.0, 3.0, 4000);
        let result = fsrs.schedule(Some(&state), Rating::Easy, now());
        assert_eq!(result.interval_days, 365);
    }

    #[test]
    fn intervals_stay_within_bounds() {
        let fsrs = Fsrs { maximum_interval: 1000, ..Fsrs::default() };
        for s in [0.01, 0.1, 1.0, 7.5, 60.0, 900.0, 40_000.0] {
            for d in [1.0, 4.2, 10.0] {
                for days_ago in [0, 1, 3, 30, 400] {
                    let state = reviewed(s, d, days_ago);
                    for rating in Rating::ALL {
                        let interval = fsrs.schedule(Some(&state), rating, now()).interval_days;
                        assert!((1..=1000).contains(&interval), "s={s} d={d} rating={rating}");
                    }
                }
            }
        }
    }

    #[test]
    fn name_matches_marker_tag() {
        let fsrs = Fsrs::default();
        let result = fsrs.schedule(None, Rating::Hard, now());
        assert_eq!(fsrs.name(), ALGORITHM);
        assert_eq!(result.meta.algo, fsrs.name());
    }

    #[test]
    fn oversized_interval_cap_is_clamped() {
        let fsrs = Fsrs { maximum_interval: 1_000_000_000, ..Fsrs::default() };
        let state = reviewed(5e8, 5.0, 10);
        let result = fsrs.schedule(Some(&state), Rating::Good, now());
        assert_eq!(result.interval_days, Settings::MAX_INTERVAL);
        assert_eq!(result.next_due, now() + Duration::days(i64::from(Settings::MAX_INTERVAL)));
        assert!(result.meta.due_at().is_some());
    }

    #[test]
    fn repeated_same_day_lapses_keep_stability_positive() {
        let fsrs = Fsrs::default();
        let mut state = CardState {
            last_review: now() - Duration::minutes(10),
            ..reviewed(0.05, 9.0, 0)
        };
        for _ in 0..6 {
            let result = fsrs.schedule(Some(&state), Rating::Again, now());
            assert!(result.meta.s >= 0.01);
            assert!(result.meta.is_well_formed());
            state = CardState {
                s: result.meta.s,
                d: result.meta.d,
                ..state
            };
        }
        assert_eq!(state.s, 0.01);
        assert_eq!(fsrs.next_stability_forget(0.01, 10.0, 0.0), 0.01);
    }

    #[test]
    fn again_never_beats_easy_after_a_day() {
        let fsrs = Fsrs::default();
        for s in [0.2, 1.0, 3.5, 20.0, 300.0] {
            for d in [1.0, 5.5, 10.0] {
                for days_ago in [1, 2, 10, 100] {
                    let state = reviewed(s, d, days_ago);
                    let again = fsrs.schedule(Some(&state), Rating::Again, now());
                    let easy = fsrs.schedule(Some(&state), Rating::Easy, now());
                    assert!(again.meta.s <= easy.meta.s, "s={s} d={d} days={days_ago}");
                }
            }
        }
    }

    #[test]
    fn lapse_stability_is_capped() {
        let fsrs = Fsrs::default();
        let state = reviewed(10.0, 5.0, 30);
        let result = fsrs.schedule(Some(&state), Rating::Again, now());
        let ceiling = 10.0 / (fsrs.w[17] * fsrs.w[18]).exp();
        assert!(result.meta.s <= round2(ceiling));
        assert!(result.meta.s < 10.0);
        assert_eq!(result.meta.lapses, 2);
        assert_eq!(result.meta.reviews, 5);
    }

    #[test]
    fn hard_penalty_and_easy_bonus() {
        let fsrs = Fsrs::default();
        let state = reviewed(10.0, 5.0, 10);

        let hard = fsrs.schedule(Some(&state), Rating::Hard, now()).meta.s;
        let good = fsrs.schedule(Some(&state), Rating::Good, now()).meta.s;
        let easy = fsrs.schedule(Some(&state), Rating::Easy, now()).meta.s;

        assert!(hard > 10.0);
        assert!(hard < good);
        assert!(good < easy);
    }

    #[test]
    fn same_day_review_uses_short_term_stability() {
        let fsrs = Fsrs::default();
        let state = CardState {
            last_review: now() - Duration::hours(2),
            ..reviewed(3.0, 5.0, 0)
        };

        let good = fsrs.schedule(Some(&state), Rating::Good, now());
        assert!(good.meta.s >= 3.0);
        assert_eq!(good.meta.s, fsrs.next_stability_short_term(3.0, Rating::Good));

        let again = fsrs.schedule(Some(&state), Rating::Again, now());
        assert!(again.meta.s < 3.0);
    }

    #[test]
    fn review_dated_in_the_future_counts_as_same_day() {
        let fsrs = Fsrs::default();
        let state = CardState {
            last_review: now() + Duration::days(3),
            ..reviewed(3.0, 5.0, 0)
        };
        let result = fsrs.schedule(Some(&state), Rating::Good, now());
        assert_eq!(result.meta.s, fsrs.next_stability_short_term(3.0, Rating::Good));
    }

    #[test]
    fn difficulty_moves_with_rating() {
        let fsrs = Fsrs::default();
        let state = reviewed(5.0, 5.0, 5);

        assert!(fsrs.schedule(Some(&state), Rating::Again, now()).meta.d > 5.0);
        assert!(fsrs.schedule(Some(&state), Rating::Easy, now()).meta.d < 5.0);
    }

    #[test]
    fn difficulty_clamped_to_bounds() {
        let fsrs = Fsrs::default();

        let hardest = reviewed(5.0, 10.0, 5);
        assert!(fsrs.schedule(Some(&hardest), Rating::Again, now()).meta.d <= 10.0);

        let easiest = reviewed(5.0, 1.0, 5);
        assert_eq!(fsrs.schedule(Some(&easiest), Rating::Easy, now()).meta.d, 1.0);
    }

    #[test]
    fn good_good_again_counts_one_lapse() {
        let fsrs = Fsrs::default();
        let first = fsrs.schedule(None, Rating::Good, now());

        let later = now() + Duration::days(3);
        let second = fsrs.schedule(first.meta.to_state().as_ref(), Rating::Good, later);

        let much_later = later + Duration::days(10);
        let third = fsrs.schedule(second.meta.to_state().as_ref(), Rating::Again, much_later);

        assert_eq!(third.meta.reviews, 3);
        assert_eq!(third.meta.lapses, 1);
        assert_eq!(third.meta.rating, Rating::Again);
    }

    #[test]
    fn preview_matches_schedule() {
        let fsrs = Fsrs::default();
        let state = reviewed(8.0, 6.0, 9);
        let preview = fsrs.preview(Some(&state), now());

        for rating in Rating::ALL {
            assert_eq!(
                preview.get(rating),
                fsrs.schedule(Some(&state), rating, now()).interval_days
            );
        }
        assert!(preview.again <= preview.hard);
        assert!(preview.hard <= preview.good);
        assert!(preview.good <= preview.easy);
    }

    #[test]
    fn preview_for_new_card() {
        let preview = Fsrs::default().preview(None, now());
        assert_eq!(preview.again, 1);
        assert_eq!(preview.hard, 1);
        assert_eq!(preview.good, 2);
        assert_eq!(preview.easy, 8);
    }

    #[test]
    fn from_settings_copies_limits() {
        let settings = Settings {
            request_retention: 0.85,
            maximum_interval: 180,
            daily_limit: 5,
        };
        let fsrs = Fsrs::from_settings(&settings);
        assert_eq!(fsrs.request_retention, 0.85);
        assert_eq!(fsrs.maximum_interval, 180);
        assert_eq!(fsrs.w, DEFAULT_WEIGHTS);
    }
}
