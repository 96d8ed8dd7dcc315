//! Model types and the persistence collaborator.

mod models;
mod storage;

pub use models::*;
pub use storage::*;
