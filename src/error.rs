/// A string that names no direction.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognized direction {0:?} (expected up/down/left/right or w/a/s/d)")]
pub struct ParseMoveError(pub String);

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("search depth {depth} exceeds the maximum of {max}")]
    DepthTooLarge { depth: u64, max: u64 },
    #[error("unknown search strategy {0:?} (expected expectimax or alphabeta)")]
    UnknownStrategy(String),
}
