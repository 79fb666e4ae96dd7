pub mod backend;
pub mod codec;
pub mod config;
pub mod control;
pub mod ws;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Backend(#[from] backend::BackendError),

    #[error(transparent)]
    Codec(#[from] codec::CodecError),

    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Control(#[from] control::ControlError),

    #[error(transparent)]
    Ws(#[from] ws::WsError),
}
