//! Session reports: storage and text rendering

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use versus_core::{Battle, ItemId, Progress, RankingSession, SessionConfig, SessionStatus, Standing};

use crate::runner::RunSummary;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to access report file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode or decode report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Complete results of one ranking session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    /// Name/description of the run
    pub name: String,
    pub config: SessionConfig,
    pub status: SessionStatus,
    pub progress: Progress,
    pub standings: Vec<Standing>,
    /// Battle history in submission order
    pub battles: Vec<Battle>,
    pub summary: RunSummary,
    /// True preference order, when the judge knows one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<Vec<ItemId>>,
}

impl SessionReport {
    pub fn new(name: &str, session: &RankingSession, summary: RunSummary) -> Self {
        Self {
            name: name.to_string(),
            config: session.config().clone(),
            status: session.status(),
            progress: session.progress(),
            standings: session.leaderboard(),
            battles: session.battles().to_vec(),
            summary,
            reference: None,
        }
    }

    pub fn with_reference(mut self, reference: Vec<ItemId>) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Share of item pairs the standings order the same way as the reference.
    ///
    /// `None` without a reference or with fewer than two ranked items.
    pub fn agreement(&self) -> Option<f64> {
        let reference = self.reference.as_ref()?;
        let rank_of = |id: &ItemId| reference.iter().position(|r| r == id);
        let ranked: Vec<usize> = self
            .standings
            .iter()
            .filter_map(|standing| rank_of(&standing.id))
            .collect();

        let mut agreeing = 0usize;
        let mut total = 0usize;
        for (i, a) in ranked.iter().enumerate() {
            for b in &ranked[i + 1..] {
                total += 1;
                if a < b {
                    agreeing += 1;
                }
            }
        }

        if total == 0 {
            None
        } else {
            Some(agreeing as f64 / total as f64)
        }
    }

    /// Save report to JSON file
    pub fn save(&self, path: &Path) -> Result<(), ReportError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load report from JSON file
    pub fn load(path: &Path) -> Result<Self, ReportError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Leaderboard table only
    pub fn leaderboard_table(&self) -> String {
        let mut table = String::new();
        table.push_str(&format!(
            "{:>4} {:<30} {:>8} {:>5} {:>5}\n",
            "#", "Item", "Elo", "W", "L"
        ));
        table.push_str(&"-".repeat(56));
        table.push('\n');
        for standing in &self.standings {
            table.push_str(&format!(
                "{:>4} {:<30} {:>8.1} {:>5} {:>5}\n",
                standing.rank, standing.id, standing.rating, standing.wins, standing.losses
            ));
        }
        table
    }

    /// Generate a text report
    pub fn generate_report(&self) -> String {
        let mut report = String::new();
        report.push_str(&format!("=== Ranking: {} ===\n\n", self.name));
        report.push_str(&format!(
            "Policy: {}{}, K-factor: {:?}, scope: {}\n",
            self.config.policy,
            self.config
                .limit
                .map(|limit| format!(" (limit {})", limit))
                .unwrap_or_default(),
            self.config.k_factor,
            self.config.elo_scope
        ));
        report.push_str(&format!(
            "Status: {}, battles: {}, skips: {}, stopped: {:?}\n",
            self.status, self.summary.battles, self.summary.skips, self.summary.stop
        ));
        match (self.progress.target_battles, self.progress.completion_percent) {
            (Some(target), Some(percent)) => report.push_str(&format!(
                "Progress: {}/{} ({:.1}%)\n",
                self.progress.completed_battles, target, percent
            )),
            (Some(target), None) => report.push_str(&format!(
                "Progress: {}/{}\n",
                self.progress.completed_battles, target
            )),
            (None, _) => report.push_str(&format!(
                "Progress: {} battles, no target\n",
                self.progress.completed_battles
            )),
        }
        if let Some(agreement) = self.agreement() {
            report.push_str(&format!(
                "Agreement with reference order: {:.1}%\n",
                agreement * 100.0
            ));
        }

        report.push('\n');
        report.push_str(&self.leaderboard_table());
        report
    }

    /// Print report to stdout
    pub fn print_report(&self) {
        println!("{}", self.generate_report());
    }
}
