use serde::{Deserialize, Serialize};

/// A tactics puzzle as the trainer works with it.
///
/// Immutable once fetched. The wire shape the UI consumes is [`PuzzlePayload`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Puzzle {
    pub id: String,
    /// Starting position in FEN.
    pub fen: String,
    /// Expected moves in UCI notation, in order.
    pub solution: Vec<String>,
    pub rating: u32,
    pub themes: Vec<String>,
    /// Side the solver plays, when the source reports it.
    pub color: Option<String>,
    pub game: Option<GameInfo>,
}

impl Puzzle {
    /// A puzzle without a position or a solution cannot be played.
    pub fn is_playable(&self) -> bool {
        !self.id.trim().is_empty() && !self.fen.trim().is_empty() && !self.solution.is_empty()
    }

    pub fn has_theme(&self, theme: &str) -> bool {
        self.themes.iter().any(|t| t.eq_ignore_ascii_case(theme))
    }

    pub fn to_payload(&self) -> PuzzlePayload {
        PuzzlePayload {
            puzzle: PuzzleBody {
                id: self.id.clone(),
                fen: self.fen.clone(),
                rating: self.rating,
                themes: self.themes.clone(),
                solution: self.solution.clone(),
                color: self.color.clone(),
            },
            game: self.game.clone(),
        }
    }
}

/// `{ puzzle: {...}, game?: {...} }` as exchanged with the proxy and the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PuzzlePayload {
    pub puzzle: PuzzleBody,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game: Option<GameInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PuzzleBody {
    pub id: String,
    #[serde(default)]
    pub fen: String,
    #[serde(default)]
    pub rating: u32,
    #[serde(default)]
    pub themes: Vec<String>,
    #[serde(default)]
    pub solution: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl From<PuzzlePayload> for Puzzle {
    fn from(payload: PuzzlePayload) -> Self {
        let PuzzlePayload { puzzle, game } = payload;
        Self {
            id: puzzle.id,
            fen: puzzle.fen,
            solution: puzzle.solution,
            rating: puzzle.rating,
            themes: puzzle.themes,
            color: puzzle.color,
            game,
        }
    }
}

/// Originating game metadata.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GameInfo {
    #[serde(default)]
    pub players: Vec<PlayerInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clock: Option<String>,
    #[serde(default)]
    pub rated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perf: Option<PerfInfo>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PerfInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default)]
    pub name: String,
}

/// Where a served puzzle came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PuzzleOrigin {
    Live,
    Offline,
}

impl PuzzleOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            PuzzleOrigin::Live => "live",
            PuzzleOrigin::Offline => "offline",
        }
    }
}

/// What the caller asked for. Also used as the metrics label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PuzzleRequest {
    ById(String),
    ByTheme(String),
    ByRating(u32),
    Next,
    Daily,
}

impl PuzzleRequest {
    pub fn operation(&self) -> &'static str {
        match self {
            PuzzleRequest::ById(_) => "by_id",
            PuzzleRequest::ByTheme(_) => "by_theme",
            PuzzleRequest::ByRating(_) => "by_rating",
            PuzzleRequest::Next => "next",
            PuzzleRequest::Daily => "daily",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FetchedPuzzle {
    pub puzzle: Puzzle,
    pub origin: PuzzleOrigin,
}
