use thiserror::Error;

#[derive(Debug, Error)]
pub enum RankingError {
    #[error("invalid attribute sample #{index}: {reason}")]
    InvalidSample { index: usize, reason: String },
}

pub type RankingResult<T> = Result<T, RankingError>;
