use std::sync::Arc;

use crate::integration;
use crate::integration::storage::StorageClient;

pub mod model;
pub mod service;

pub type Result<T> = std::result::Result<T, Error>;
pub type Storage = Arc<dyn StorageClient + Send + Sync>;

pub const MAX_PER_MESSAGE: usize = 5;
pub const MAX_SIZE_BYTES: u64 = 10 * 1024 * 1024;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("file of {0} bytes exceeds the {MAX_SIZE_BYTES} byte limit")]
    TooLarge(u64),
    #[error("{0} attachments exceed the limit of {MAX_PER_MESSAGE} per message")]
    TooMany(usize),

    #[error(transparent)]
    _Integration(#[from] integration::Error),
    #[error(transparent)]
    _Io(#[from] std::io::Error),
}
