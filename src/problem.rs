use serde::{Deserialize, Serialize};

/// Which problem-page family a snapshot came from. Selects the extraction
/// ruleset and the wording used when introducing the problem to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    LeetCode,
    TakeUForward,
}

impl Platform {
    /// Loose detection from a URL or local fixture path.
    pub fn detect(url: &str) -> Option<Self> {
        let lowered = url.to_lowercase();
        if lowered.contains("leetcode") {
            Some(Self::LeetCode)
        } else if lowered.contains("takeuforward") {
            Some(Self::TakeUForward)
        } else {
            None
        }
    }

    /// Strict check that a live URL points at an actual problem page rather
    /// than a listing or landing page.
    pub fn is_problem_url(url: &str) -> bool {
        url.contains("leetcode.com/problems/")
            || url.contains("takeuforward.org/plus/dsa/problems/")
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::LeetCode => "LeetCode",
            Self::TakeUForward => "TakeUForward (TUF+)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    #[default]
    Unknown,
}

impl Difficulty {
    /// Case-insensitive containment match over a difficulty-flavored label,
    /// first match wins.
    pub fn from_label(label: &str) -> Self {
        let lowered = label.to_lowercase();
        if lowered.contains("easy") {
            Self::Easy
        } else if lowered.contains("medium") {
            Self::Medium
        } else if lowered.contains("hard") {
            Self::Hard
        } else {
            Self::Unknown
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
            Self::Unknown => "Unknown",
        }
    }
}

/// Normalized snapshot of a practice problem. Immutable once extracted except
/// for the code fields, which are refreshed together via
/// [`ProblemModel::apply_code_refresh`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemModel {
    pub platform: Platform,
    pub title: String,
    pub difficulty: Difficulty,
    pub description: String,
    pub examples: Vec<String>,
    pub constraints: Option<String>,
    pub tags: Vec<String>,
    pub user_code: Option<String>,
    pub language: String,
}

impl ProblemModel {
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "Unknown Problem"
        } else {
            &self.title
        }
    }

    /// Merge a fresh code capture. `user_code` and `language` always move
    /// together; every other field is left untouched.
    pub fn apply_code_refresh(&mut self, capture: CodeCapture) {
        self.user_code = capture.user_code;
        self.language = capture.language;
    }
}

/// Result of the code+language extraction branch, either from the initial
/// extraction or a mid-session re-read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeCapture {
    pub user_code: Option<String>,
    pub language: String,
}

/// Raw material handed over by the page host: the page markup plus, when the
/// host can script the page, the contents of any structured editor models.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPageSnapshot {
    pub url: String,
    pub html: String,
    pub editor_models: Vec<EditorModelSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorModelSnapshot {
    pub contents: String,
    pub language: Option<String>,
}
