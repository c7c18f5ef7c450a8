//! Move selection strategies for automated sides.

use async_trait::async_trait;
use derive_more::Display;
use derive_new::new;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use strictly_reversi::{AvailableCandidate, Candidates};
use tracing::{debug, instrument};

/// Picks one candidate from a non-empty set.
///
/// Selectors see only the candidates, never the board. They run inside a
/// background task that may be aborted at any await point.
#[async_trait]
pub trait CoordinateSelector: Send + Sync {
    /// Chooses the move to play.
    async fn select(&self, candidates: Candidates) -> AvailableCandidate;

    /// Returns the selector's display name.
    fn name(&self) -> &str;
}

/// Waits out an artificial thinking delay.
async fn think(think_time: Duration) {
    if !think_time.is_zero() {
        tokio::time::sleep(think_time).await;
    }
}

/// Always plays the smallest coordinate in row-major order.
#[derive(Debug, Clone, Default, new)]
pub struct FirstCandidateSelector {
    think_time: Duration,
}

#[async_trait]
impl CoordinateSelector for FirstCandidateSelector {
    #[instrument(skip(self, candidates), fields(count = candidates.len()))]
    async fn select(&self, candidates: Candidates) -> AvailableCandidate {
        think(self.think_time).await;
        let choice = candidates.first().clone();
        debug!(coordinate = %choice.coordinate(), "First candidate selected");
        choice
    }

    fn name(&self) -> &str {
        "first"
    }
}

/// Plays the move flipping the most disks, earliest coordinate on ties.
#[derive(Debug, Clone, Default, new)]
pub struct GreedySelector {
    think_time: Duration,
}

#[async_trait]
impl CoordinateSelector for GreedySelector {
    #[instrument(skip(self, candidates), fields(count = candidates.len()))]
    async fn select(&self, candidates: Candidates) -> AvailableCandidate {
        think(self.think_time).await;
        let mut choice = candidates.first();
        for candidate in candidates.iter() {
            if candidate.flip_count() > choice.flip_count() {
                choice = candidate;
            }
        }
        debug!(
            coordinate = %choice.coordinate(),
            flips = choice.flip_count(),
            "Greedy candidate selected"
        );
        choice.clone()
    }

    fn name(&self) -> &str {
        "greedy"
    }
}

/// Plays a uniformly random candidate.
#[derive(Debug, Clone, Default, new)]
pub struct RandomSelector {
    think_time: Duration,
}

#[async_trait]
impl CoordinateSelector for RandomSelector {
    #[instrument(skip(self, candidates), fields(count = candidates.len()))]
    async fn select(&self, candidates: Candidates) -> AvailableCandidate {
        think(self.think_time).await;
        let index = rand::thread_rng().gen_range(0..candidates.len());
        let choice = candidates.as_slice()[index].clone();
        debug!(coordinate = %choice.coordinate(), "Random candidate selected");
        choice
    }

    fn name(&self) -> &str {
        "random"
    }
}

/// Named selector choice for configuration files and the command line.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Display,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SelectorKind {
    /// [`FirstCandidateSelector`].
    #[display("first")]
    First,
    /// [`GreedySelector`].
    #[default]
    #[display("greedy")]
    Greedy,
    /// [`RandomSelector`].
    #[display("random")]
    Random,
}

impl SelectorKind {
    /// Builds the selector, delaying each choice by `think_time`.
    #[instrument]
    pub fn build(self, think_time: Duration) -> Arc<dyn CoordinateSelector> {
        match self {
            SelectorKind::First => Arc::new(FirstCandidateSelector::new(think_time)),
            SelectorKind::Greedy => Arc::new(GreedySelector::new(think_time)),
            SelectorKind::Random => Arc::new(RandomSelector::new(think_time)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strictly_reversi::{Board, Coordinate, Turn};

    fn at(s: &str) -> Coordinate {
        s.parse().unwrap()
    }

    fn candidates(board: &Board, turn: Turn) -> Candidates {
        Candidates::try_from(board.available_candidates(turn)).unwrap()
    }

    #[tokio::test]
    async fn test_first_selector_picks_smallest_coordinate() {
        let selector = FirstCandidateSelector::default();
        let choice = selector
            .select(candidates(&Board::initial(), Turn::First))
            .await;
        assert_eq!(choice.coordinate(), at("d3"));
    }

    #[tokio::test]
    async fn test_greedy_selector_prefers_more_flips() {
        // c1 and c3 flip one disk each, d2 flips two.
        let board: Board = "xo....../xoo...../......../......../......../......../......../........"
            .parse()
            .unwrap();
        let selector = GreedySelector::default();
        let choice = selector.select(candidates(&board, Turn::First)).await;
        assert_eq!(choice.coordinate(), at("d2"));
        assert_eq!(choice.flip_count(), 2);
    }

    #[tokio::test]
    async fn test_random_selector_returns_a_candidate() {
        let set = candidates(&Board::initial(), Turn::First);
        let selector = RandomSelector::default();
        for _ in 0..16 {
            let choice = selector.select(set.clone()).await;
            assert!(set.get(choice.coordinate()).is_some());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_think_time_delays_selection() {
        let selector = SelectorKind::First.build(Duration::from_secs(2));
        let set = candidates(&Board::initial(), Turn::First);
        let started = tokio::time::Instant::now();
        selector.select(set).await;
        assert!(started.elapsed() >= Duration::from_secs(2));
    }

    #[test]
    fn test_selector_kind_names() {
        assert_eq!(SelectorKind::Random.to_string(), "random");
        assert_eq!(SelectorKind::default(), SelectorKind::Greedy);
    }
}
