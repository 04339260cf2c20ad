use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{name} must be finite and non-negative, got {value}")]
    InvalidCost { name: &'static str, value: f32 },

    #[error("empty_bonus must lie in [0, 1], got {0}")]
    InvalidEmptyBonus(f32),

    #[error("todo_capacity must be at least 1")]
    InvalidTodoCapacity,

    #[error("max depth {max_depth} does not fit into a todo stack of {capacity} entries")]
    MaxDepthExceedsStack { max_depth: u32, capacity: usize },

    #[error("Serialization error: {0}")]
    SerializationError(Box<dyn std::error::Error + Send + Sync>),

    #[error("Deserialization error: {0}")]
    DeserializationError(Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, Error>;
