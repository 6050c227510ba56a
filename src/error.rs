use thiserror::Error;

/// Errors raised while constructing or normalizing a [`crate::puzzle::Puzzle`].
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("role `{0}` is not registered on any turn order")]
    UnregisteredRole(String),
    #[error("category counts {0:?} cannot be satisfied with {1} players")]
    RoleCountsImpossible(crate::roles::CategoryBounds, usize),
    #[error("a night death was recorded on night 1, which is not possible")]
    NightOneDeath,
    #[error("info claimed by seat {seat} mentions role `{role}`, which is not on the script")]
    UnregisteredInfoRole { seat: usize, role: String },
    #[error("seat {0} has no claim but `player_zero_is_you` requires one")]
    MissingPlayerZeroClaim(usize),
    #[error("duplicate token `{0}` in the hidden role pool is not allowed for this puzzle")]
    DuplicateToken(String),
    #[error("puzzle has no players")]
    NoPlayers,
}

/// Errors raised while exploring the world tree or solving a puzzle.
#[derive(Debug, Error)]
pub enum SolveError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("reached an ability this catalog deliberately leaves unimplemented: {0}")]
    NotImplemented(&'static str),
    #[error("solve was cancelled")]
    Cancelled,
    #[error("a worker thread panicked: {0}")]
    Worker(String),
}

pub type Result<T> = std::result::Result<T, SolveError>;
