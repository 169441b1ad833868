//! Rewards and trajectories of past episodes.
use anyhow::{bail, Result};
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Per-step values of one episode.
///
/// The three sequences always have the same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EpisodeRecord {
    rewards: Vec<f32>,
    target_trajectory: Vec<[f32; 2]>,
    robot_trajectory: Vec<[f32; 2]>,
}

impl EpisodeRecord {
    /// Constructs an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructs a record from parallel sequences.
    pub fn from_parts(
        rewards: Vec<f32>,
        target_trajectory: Vec<[f32; 2]>,
        robot_trajectory: Vec<[f32; 2]>,
    ) -> Result<Self> {
        if rewards.len() != target_trajectory.len() || rewards.len() != robot_trajectory.len() {
            bail!(
                "episode sequences differ in length: {} rewards, {} target points, {} robot points",
                rewards.len(),
                target_trajectory.len(),
                robot_trajectory.len()
            );
        }
        Ok(Self {
            rewards,
            target_trajectory,
            robot_trajectory,
        })
    }

    /// Appends the values of one step. Positions are ground-plane `[x, z]`.
    pub fn push(&mut self, reward: f32, target: [f32; 2], robot: [f32; 2]) {
        self.rewards.push(reward);
        self.target_trajectory.push(target);
        self.robot_trajectory.push(robot);
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    /// Returns `true` if no step was recorded.
    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }

    /// Rewards of each step.
    pub fn rewards(&self) -> &[f32] {
        &self.rewards
    }

    /// Target positions of each step.
    pub fn target_trajectory(&self) -> &[[f32; 2]] {
        &self.target_trajectory
    }

    /// Robot positions of each step.
    pub fn robot_trajectory(&self) -> &[[f32; 2]] {
        &self.robot_trajectory
    }

    /// Sum of the rewards.
    pub fn total_reward(&self) -> f32 {
        self.rewards.iter().sum()
    }
}

/// One row of the CSV export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRow {
    /// Episode index.
    pub episode: usize,

    /// Step index within the episode.
    pub step: usize,

    /// Reward of the step.
    pub reward: f32,

    /// Target position, lateral axis.
    pub target_x: f32,

    /// Target position, depth axis.
    pub target_z: f32,

    /// Robot position, lateral axis.
    pub robot_x: f32,

    /// Robot position, depth axis.
    pub robot_z: f32,
}

/// Statistics of the episode returns.
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySummary {
    /// Return of each episode.
    pub returns: Vec<f32>,

    /// Mean return.
    pub mean: f32,

    /// Maximum return.
    pub max: f32,

    /// Minimum return.
    pub min: f32,

    /// Population standard deviation of the returns.
    pub std: f32,
}

/// Append-only collection of completed episodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    episodes: Vec<EpisodeRecord>,
}

impl History {
    /// Constructs an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an episode.
    pub fn record_episode(&mut self, episode: EpisodeRecord) {
        self.episodes.push(episode);
    }

    /// Iterates over the episodes in the order they were recorded.
    pub fn iter_episodes(&self) -> impl Iterator<Item = &EpisodeRecord> {
        self.episodes.iter()
    }

    /// Reward sequences of all episodes.
    pub fn rewards(&self) -> impl Iterator<Item = &[f32]> {
        self.episodes.iter().map(|e| e.rewards())
    }

    /// Target trajectories of all episodes.
    pub fn target_trajectories(&self) -> impl Iterator<Item = &[[f32; 2]]> {
        self.episodes.iter().map(|e| e.target_trajectory())
    }

    /// Robot trajectories of all episodes.
    pub fn robot_trajectories(&self) -> impl Iterator<Item = &[[f32; 2]]> {
        self.episodes.iter().map(|e| e.robot_trajectory())
    }

    /// Number of episodes.
    pub fn len(&self) -> usize {
        self.episodes.len()
    }

    /// Returns `true` if no episode was recorded.
    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }

    /// Statistics of the episode returns, `None` if the history is empty.
    pub fn summary(&self) -> Option<HistorySummary> {
        if self.episodes.is_empty() {
            return None;
        }
        let returns: Vec<f32> = self.episodes.iter().map(|e| e.total_reward()).collect();
        let n = returns.len() as f32;
        let mean = returns.iter().sum::<f32>() / n;
        let var = returns.iter().map(|r| (r - mean).powi(2)).sum::<f32>() / n;
        let max = returns.iter().copied().fold(f32::MIN, f32::max);
        let min = returns.iter().copied().fold(f32::MAX, f32::min);

        Some(HistorySummary {
            returns,
            mean,
            max,
            min,
            std: var.sqrt(),
        })
    }

    /// Flattens the history into CSV rows.
    pub fn rows(&self) -> Vec<HistoryRow> {
        let mut rows = Vec::new();
        for (episode, e) in self.episodes.iter().enumerate() {
            for step in 0..e.len() {
                rows.push(HistoryRow {
                    episode,
                    step,
                    reward: e.rewards[step],
                    target_x: e.target_trajectory[step][0],
                    target_z: e.target_trajectory[step][1],
                    robot_x: e.robot_trajectory[step][0],
                    robot_z: e.robot_trajectory[step][1],
                });
            }
        }
        rows
    }

    /// Writes the history as CSV, one row per step.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut wtr = WriterBuilder::new().has_headers(true).from_path(path)?;
        for row in self.rows() {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Reads a history written by [`History::write_csv`].
    ///
    /// Rows must be grouped by episode with consecutive step indices.
    pub fn read_csv(path: impl AsRef<Path>) -> Result<Self> {
        let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
        let mut history = History::new();
        let mut current = EpisodeRecord::new();
        let mut current_ix = None;

        for row in rdr.deserialize() {
            let row: HistoryRow = row?;
            if current_ix != Some(row.episode) {
                if !current.is_empty() {
                    history.record_episode(std::mem::take(&mut current));
                }
                current_ix = Some(row.episode);
            }
            if row.step != current.len() {
                bail!(
                    "unexpected step {} in episode {}, expected {}",
                    row.step,
                    row.episode,
                    current.len()
                );
            }
            current.push(
                row.reward,
                [row.target_x, row.target_z],
                [row.robot_x, row.robot_z],
            );
        }
        if !current.is_empty() {
            history.record_episode(current);
        }

        Ok(history)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempdir::TempDir;

    fn episode(rewards: &[f32]) -> EpisodeRecord {
        let mut e = EpisodeRecord::new();
        for (i, r) in rewards.iter().enumerate() {
            e.push(*r, [i as f32, -(i as f32)], [0.5 * i as f32, 2.0]);
        }
        e
    }

    #[test]
    fn test_summary() {
        let mut history = History::new();
        assert!(history.summary().is_none());

        history.record_episode(episode(&[1.0, 2.0, 3.0]));
        history.record_episode(episode(&[-2.0, 0.0]));
        history.record_episode(episode(&[4.0]));

        let s = history.summary().unwrap();
        assert_eq!(s.returns, vec![6.0, -2.0, 4.0]);
        assert!((s.mean - 8.0 / 3.0).abs() < 1e-5);
        assert_eq!(s.max, 6.0);
        assert_eq!(s.min, -2.0);
        assert!((s.std - (312.0f32 / 27.0).sqrt()).abs() < 1e-4);
    }

    #[test]
    fn test_from_parts_checks_lengths() {
        assert!(EpisodeRecord::from_parts(vec![1.0], vec![[0.0, 0.0]], vec![]).is_err());
        let e = EpisodeRecord::from_parts(vec![1.0], vec![[0.0, 1.0]], vec![[2.0, 3.0]]).unwrap();
        assert_eq!(e.len(), 1);
    }

    #[test]
    fn test_csv_round_trip() -> Result<()> {
        let mut history = History::new();
        history.record_episode(episode(&[1.0, -100.0, 2.5]));
        history.record_episode(episode(&[0.25]));

        let dir = TempDir::new("robobo_history")?;
        let path = dir.path().join("history.csv");
        history.write_csv(&path)?;
        let history_ = History::read_csv(&path)?;

        assert_eq!(history, history_);
        assert_eq!(history_.rows().len(), 4);
        Ok(())
    }
}
