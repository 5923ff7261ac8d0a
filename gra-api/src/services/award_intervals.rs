//! Award interval computation
//!
//! Pure functions turning winning movies into the producers with the
//! shortest and longest gaps between consecutive wins:
//!
//! 1. [`producer_win_years`] groups win years by producer
//! 2. [`calculate_intervals`] pairs adjacent years per producer
//! 3. [`min_intervals`] / [`max_intervals`] keep every entry tied at the extreme
//!
//! Years are paired in the order they are given. The store hands winners over
//! sorted by year, so the sequences arrive chronological; these functions do
//! not re-sort and will report a negative interval for out-of-order input.

use gra_common::db::WinningMovie;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Gap between two consecutive wins by the same producer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardInterval {
    pub producer: String,
    pub interval: i64,
    pub previous_win: i64,
    pub following_win: i64,
}

/// Producers tied at the minimum and maximum interval
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardIntervalResult {
    pub min: Vec<AwardInterval>,
    pub max: Vec<AwardInterval>,
}

/// Win years per producer, in first-seen producer order
///
/// A `Vec` of pairs rather than a map so iteration order is stable and
/// follows the retrieval order of the movies.
pub type ProducerWinYears = Vec<(String, Vec<i64>)>;

/// Group the years of winning movies by credited producer
///
/// Each movie adds one entry per credited producer; a producer credited on
/// no winning movie does not appear.
pub fn producer_win_years(movies: &[WinningMovie]) -> ProducerWinYears {
    let mut wins: ProducerWinYears = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for movie in movies {
        for producer in &movie.producers {
            match index.get(producer.as_str()) {
                Some(&slot) => wins[slot].1.push(movie.year),
                None => {
                    index.insert(producer.as_str(), wins.len());
                    wins.push((producer.clone(), vec![movie.year]));
                }
            }
        }
    }

    wins
}

/// Pair every two adjacent win years of each producer
///
/// Producers with fewer than two wins contribute nothing; `k` wins yield
/// `k - 1` intervals.
pub fn calculate_intervals(wins: &ProducerWinYears) -> Vec<AwardInterval> {
    wins.iter()
        .filter(|(_, years)| years.len() > 1)
        .flat_map(|(producer, years)| {
            years.windows(2).map(move |pair| AwardInterval {
                producer: producer.clone(),
                interval: pair[1] - pair[0],
                previous_win: pair[0],
                following_win: pair[1],
            })
        })
        .collect()
}

/// Every interval equal to the smallest one, in input order
pub fn min_intervals(intervals: &[AwardInterval]) -> Vec<AwardInterval> {
    match intervals.iter().map(|i| i.interval).min() {
        Some(min) => intervals.iter().filter(|i| i.interval == min).cloned().collect(),
        None => Vec::new(),
    }
}

/// Every interval equal to the largest one, in input order
pub fn max_intervals(intervals: &[AwardInterval]) -> Vec<AwardInterval> {
    match intervals.iter().map(|i| i.interval).max() {
        Some(max) => intervals.iter().filter(|i| i.interval == max).cloned().collect(),
        None => Vec::new(),
    }
}

/// Run the whole computation over a snapshot of winning movies
pub fn compute_award_intervals(movies: &[WinningMovie]) -> AwardIntervalResult {
    let wins = producer_win_years(movies);
    let intervals = calculate_intervals(&wins);

    AwardIntervalResult {
        min: min_intervals(&intervals),
        max: max_intervals(&intervals),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn winner(year: i64, producers: &[&str]) -> WinningMovie {
        WinningMovie {
            title: format!("Winner {} {}", year, producers.join("/")),
            year,
            producers: producers.iter().map(|p| p.to_string()).collect(),
        }
    }

    fn interval(producer: &str, previous_win: i64, following_win: i64) -> AwardInterval {
        AwardInterval {
            producer: producer.to_string(),
            interval: following_win - previous_win,
            previous_win,
            following_win,
        }
    }

    #[test]
    fn test_producer_win_years_groups_in_retrieval_order() {
        let movies = vec![
            winner(1990, &["B", "A"]),
            winner(1991, &[]),
            winner(1995, &["A"]),
            winner(2001, &["C", "B"]),
        ];

        let wins = producer_win_years(&movies);

        assert_eq!(
            wins,
            vec![
                ("B".to_string(), vec![1990, 2001]),
                ("A".to_string(), vec![1990, 1995]),
                ("C".to_string(), vec![2001]),
            ]
        );
    }

    #[test]
    fn test_win_count_matches_crediting_movies() {
        let movies = vec![
            winner(1980, &["Allan Carr"]),
            winner(1984, &["Allan Carr", "Bo Derek"]),
            winner(1990, &["Bo Derek"]),
            winner(1991, &["Allan Carr"]),
        ];

        let wins = producer_win_years(&movies);

        for (producer, years) in &wins {
            let crediting = movies
                .iter()
                .filter(|m| m.producers.contains(producer))
                .count();
            assert_eq!(years.len(), crediting, "producer {}", producer);
        }
        assert_eq!(wins.len(), 2);
    }

    #[test]
    fn test_calculate_intervals_counts() {
        let wins: ProducerWinYears = vec![
            ("A".to_string(), vec![2000, 2005, 2010, 2011]),
            ("B".to_string(), vec![2018]),
            ("C".to_string(), vec![1999, 2003]),
        ];

        let intervals = calculate_intervals(&wins);

        assert_eq!(intervals.iter().filter(|i| i.producer == "A").count(), 3);
        assert_eq!(intervals.iter().filter(|i| i.producer == "B").count(), 0);
        assert_eq!(intervals.iter().filter(|i| i.producer == "C").count(), 1);
        assert_eq!(intervals[2], interval("A", 2010, 2011));
        assert_eq!(intervals[3], interval("C", 1999, 2003));
    }

    #[test]
    fn test_intervals_keep_given_order() {
        // Out-of-order input is paired positionally, not re-sorted
        let wins: ProducerWinYears = vec![("A".to_string(), vec![2010, 2000])];

        let intervals = calculate_intervals(&wins);

        assert_eq!(intervals, vec![interval("A", 2010, 2000)]);
        assert_eq!(intervals[0].interval, -10);
    }

    #[test]
    fn test_duplicate_years_give_zero_interval() {
        let wins: ProducerWinYears = vec![("A".to_string(), vec![1990, 1990, 1993])];

        let intervals = calculate_intervals(&wins);

        assert_eq!(min_intervals(&intervals), vec![interval("A", 1990, 1990)]);
        assert_eq!(max_intervals(&intervals), vec![interval("A", 1990, 1993)]);
    }

    #[test]
    fn test_min_max_keep_all_ties() {
        let intervals = vec![
            interval("A", 2000, 2001),
            interval("B", 1990, 2003),
            interval("C", 2010, 2011),
            interval("D", 1970, 1983),
            interval("E", 1980, 1985),
        ];

        assert_eq!(
            min_intervals(&intervals),
            vec![interval("A", 2000, 2001), interval("C", 2010, 2011)]
        );
        assert_eq!(
            max_intervals(&intervals),
            vec![interval("B", 1990, 2003), interval("D", 1970, 1983)]
        );
    }

    #[test]
    fn test_min_max_of_single_interval_are_the_same_entry() {
        let intervals = vec![interval("A", 2000, 2004)];

        assert_eq!(min_intervals(&intervals), intervals);
        assert_eq!(max_intervals(&intervals), intervals);
    }

    #[test]
    fn test_min_max_of_empty_list() {
        assert!(min_intervals(&[]).is_empty());
        assert!(max_intervals(&[]).is_empty());
    }

    #[test]
    fn test_two_producers_scenario() {
        let movies = vec![
            winner(2000, &["A"]),
            winner(2005, &["A"]),
            winner(2010, &["A"]),
            winner(2018, &["B"]),
            winner(2020, &["B"]),
        ];

        let result = compute_award_intervals(&movies);

        assert_eq!(result.min, vec![interval("B", 2018, 2020)]);
        assert_eq!(
            result.max,
            vec![interval("A", 2000, 2005), interval("A", 2005, 2010)]
        );
    }

    #[test]
    fn test_no_winners_gives_empty_result() {
        assert_eq!(compute_award_intervals(&[]), AwardIntervalResult::default());
    }

    #[test]
    fn test_single_win_gives_empty_result() {
        let result = compute_award_intervals(&[winner(1999, &["Solo"])]);

        assert!(result.min.is_empty());
        assert!(result.max.is_empty());
    }

    #[test]
    fn test_serializes_with_camel_case_keys() {
        let result = compute_award_intervals(&[winner(2000, &["A"]), winner(2003, &["A"])]);
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(
            json["min"][0],
            serde_json::json!({
                "producer": "A",
                "interval": 3,
                "previousWin": 2000,
                "followingWin": 2003
            })
        );
    }
}
