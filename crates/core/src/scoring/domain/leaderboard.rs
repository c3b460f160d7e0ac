use crate::scoring::domain::score_result::format_score;

#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: f64,
    pub image_url: String,
}

impl LeaderboardEntry {
    pub fn score_label(&self) -> String {
        format!("Score: {}", format_score(self.score))
    }
}

/// Ranked list as delivered by the service. Rank is implied by position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn new(entries: Vec<LeaderboardEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(rank, entry)` pairs with ranks starting at 1.
    pub fn ranked(&self) -> impl Iterator<Item = (usize, &LeaderboardEntry)> {
        self.entries.iter().enumerate().map(|(i, e)| (i + 1, e))
    }

    /// `"1. Alice"` style heading for the entry at `rank`.
    pub fn heading(rank: usize, entry: &LeaderboardEntry) -> String {
        format!("{rank}. {}", entry.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, score: f64) -> LeaderboardEntry {
        LeaderboardEntry {
            name: name.into(),
            score,
            image_url: format!("https://cdn.example.com/{name}.jpg"),
        }
    }

    #[test]
    fn test_ranked_preserves_service_order() {
        // Deliberately not sorted by score: the service owns ranking.
        let board = Leaderboard::new(vec![entry("Bo", 70.0), entry("Al", 95.0), entry("Cy", 80.0)]);
        let ranked: Vec<_> = board.ranked().map(|(r, e)| (r, e.name.as_str())).collect();
        assert_eq!(ranked, vec![(1, "Bo"), (2, "Al"), (3, "Cy")]);
    }

    #[test]
    fn test_empty_board() {
        let board = Leaderboard::default();
        assert!(board.is_empty());
        assert_eq!(board.len(), 0);
        assert_eq!(board.ranked().count(), 0);
    }

    #[test]
    fn test_labels() {
        let e = entry("Alice", 88.0);
        assert_eq!(Leaderboard::heading(1, &e), "1. Alice");
        assert_eq!(e.score_label(), "Score: 88");
    }
}
