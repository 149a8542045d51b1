use common::GameId;

/// Builds document paths, scoped under one application id so several
/// deployments can share a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentKeys {
    app_id: String,
}

impl DocumentKeys {
    pub fn new(app_id: impl Into<String>) -> Self {
        Self { app_id: app_id.into() }
    }

    // === User Keys ===

    /// Private progress document for one user
    pub fn user_progress(&self, user_id: &str) -> String {
        format!("artifacts/{}/users/{}", self.app_id, user_id)
    }

    // === Leaderboard Keys ===

    fn leaderboards_root(&self) -> String {
        format!("artifacts/{}/public/data/leaderboards", self.app_id)
    }

    pub fn game_leaderboard(&self, game: GameId) -> String {
        format!("{}/{}", self.leaderboards_root(), game.as_str())
    }

    pub fn global_leaderboard(&self) -> String {
        format!("{}/global", self.leaderboards_root())
    }
}
