use crate::{packed::PackedMapError, NgramOrder};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LmError {
    #[error("Packed table error")]
    Table(#[from] PackedMapError),
    #[error("{order} id {id} exceeds the {order} capacity {capacity}")]
    CapacityExceeded {
        order: NgramOrder,
        id: u32,
        capacity: usize,
    },
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("Config format error: {0}")]
    ConfigFormat(String),
}
