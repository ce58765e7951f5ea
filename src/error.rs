use thiserror::Error;

use crate::dispatcher::EventError;
use crate::model::ModelError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Event error: {0}")]
    Event(#[from] EventError),
    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}

pub type UtsuriResult<T> = Result<T, Error>;
