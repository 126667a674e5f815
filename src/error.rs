use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrostError
{
    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),

    #[error("drawing surface unavailable ({width}x{height})")]
    SurfaceUnavailable
    {
        width: f64,
        height: f64,
    },

    #[error("unknown game '{0}'. Run `frostplay list` to see the catalog.")]
    UnknownGame(String),

    #[error("'{0}' has no terminal build. Only games listed by `frostplay list --playable` run here.")]
    NotPlayable(String),

    #[error("invalid selection '{0}'")]
    InvalidSelection(String),

    #[error("failed to start logger: {0}")]
    Logger(String),
}

pub type Result<T> = std::result::Result<T, FrostError>;
