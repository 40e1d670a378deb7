use thiserror::Error;

/// Reasons a gameplay transform refuses to run. Each variant renders as a
/// message fit to show the player; the state is left exactly as it was.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameError {
    /// Action needs a school and the player has not joined one yet.
    #[error("join or create a school first")]
    NoSchool,

    #[error("you already belong to a school")]
    AlreadyInSchool,

    #[error("school not found: {0}")]
    SchoolNotFound(String),

    #[error("classroom not found: {0}")]
    ClassroomNotFound(String),

    #[error("desk not found: {0}")]
    DeskNotFound(String),

    /// Tagging is for rival schools; cleaning is for your own.
    #[error("{0}")]
    WrongSchool(&'static str),

    #[error("that desk is already tagged")]
    DeskOccupied,

    #[error("there is no tag on that desk")]
    NoTag,

    #[error("you can't clean over your own tag")]
    OwnTag,

    #[error("nothing hidden in this desk")]
    NoTreasure,

    #[error("this desk was searched recently, try again in {0}s")]
    SearchCooldown(i64),

    #[error("too tired, wait {0:.0}s")]
    Fatigued(f64),

    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: u64, available: u64 },

    #[error("backpack full ({0} slots)")]
    BackpackFull(usize),

    #[error("backpack already at max level")]
    BackpackMaxed,

    #[error("unknown item: {0}")]
    UnknownItem(String),

    #[error("you don't have a {0}")]
    MissingItem(String),

    #[error("{0} can't be used that way")]
    WrongItemKind(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Admin-only override rejected.
    #[error("invalid setting: {0}")]
    InvalidSetting(String),

    /// The store task has stopped; nothing was applied.
    #[error("session is closed")]
    SessionClosed,
}

impl From<crate::validation::TextError> for GameError {
    fn from(e: crate::validation::TextError) -> Self {
        GameError::InvalidInput(e.to_string())
    }
}
