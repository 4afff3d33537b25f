use chrono::{DateTime, Local, NaiveDate, Utc};

/// Calendar day of a stored timestamp in the server's local time zone.
pub fn local_day(at: DateTime<Utc>) -> NaiveDate {
    at.with_timezone(&Local).date_naive()
}

/// Number of consecutive days, counting back from `today`, with at least one
/// check-in.
///
/// `days` must be ordered newest first. A streak may begin today or
/// yesterday. Repeated days are skipped without counting, days after `today`
/// are ignored, and the first missed day ends the walk.
pub fn streak_days<I>(days: I, today: NaiveDate) -> u32
where
    I: IntoIterator<Item = NaiveDate>,
{
    let mut streak: u32 = 0;
    let mut last: Option<NaiveDate> = None;

    for day in days {
        if day > today || last == Some(day) {
            continue;
        }
        let gap = match last {
            Some(prev) => (prev - day).num_days(),
            None => (today - day).num_days().max(1),
        };
        if gap != 1 {
            break;
        }
        streak += 1;
        last = Some(day);
    }

    streak
}

/// Mean mood score rounded to one decimal place; zero when there are no
/// scores.
pub fn average_mood(scores: &[i64]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    // Scores are not range-checked, so widen before adding.
    let sum: i128 = scores.iter().map(|&s| i128::from(s)).sum();
    let mean = sum as f64 / scores.len() as f64;
    (mean * 10.0).round() / 10.0
}

/// Aggregates reported by the mood stats endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct MoodSummary {
    pub total_entries: usize,
    pub streak_days: u32,
    pub average_mood: f64,
}

impl MoodSummary {
    /// `window_scores` covers the requested window only; the streak is walked
    /// over `all_days`, the full history, newest first.
    pub fn compute<I>(window_scores: &[i64], all_days: I, today: NaiveDate) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        Self {
            total_entries: window_scores.len(),
            streak_days: streak_days(all_days, today),
            average_mood: average_mood(window_scores),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn days_ago(offsets: &[i64]) -> Vec<NaiveDate> {
        offsets.iter().map(|d| today() - Duration::days(*d)).collect()
    }

    #[test]
    fn empty_history_has_no_streak() {
        assert_eq!(streak_days(Vec::new(), today()), 0);
    }

    #[test]
    fn consecutive_days_count() {
        assert_eq!(streak_days(days_ago(&[0, 1, 2]), today()), 3);
    }

    #[test]
    fn single_gap_stops_counting() {
        assert_eq!(streak_days(days_ago(&[0, 2]), today()), 1);
        // later days do not resume the streak
        assert_eq!(streak_days(days_ago(&[0, 1, 3, 4, 5]), today()), 2);
    }

    #[test]
    fn same_day_entries_count_once() {
        assert_eq!(streak_days(days_ago(&[0, 0]), today()), 1);
        assert_eq!(streak_days(days_ago(&[0, 0, 0, 0]), today()), 1);
    }

    #[test]
    fn duplicates_inside_a_run_are_tolerated() {
        assert_eq!(streak_days(days_ago(&[0, 0, 1, 1, 1, 2]), today()), 3);
    }

    #[test]
    fn future_days_are_ignored() {
        assert_eq!(streak_days(days_ago(&[-1, 0, 1]), today()), 2);
    }

    #[test]
    fn streak_may_start_yesterday() {
        assert_eq!(streak_days(days_ago(&[1, 2, 3]), today()), 3);
    }

    #[test]
    fn stale_history_has_no_streak() {
        assert_eq!(streak_days(days_ago(&[2, 3]), today()), 0);
    }

    #[test]
    fn averages() {
        assert_eq!(average_mood(&[4, 6, 8]), 6.0);
        assert_eq!(average_mood(&[]), 0.0);
        assert_eq!(average_mood(&[7, 8, 8]), 7.7);
        assert_eq!(average_mood(&[1, 2]), 1.5);
    }

    #[test]
    fn extreme_scores_do_not_overflow() {
        assert_eq!(average_mood(&[i64::MAX, 1]), 2f64.powi(62));
        assert_eq!(average_mood(&[i64::MAX, i64::MIN, 1]), 0.0);
    }

    #[test]
    fn summary_uses_window_for_average_and_history_for_streak() {
        let summary = MoodSummary::compute(&[5, 7], days_ago(&[0, 1, 2, 3]), today());
        assert_eq!(
            summary,
            MoodSummary {
                total_entries: 2,
                streak_days: 4,
                average_mood: 6.0,
            }
        );
    }
}
