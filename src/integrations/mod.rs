//! External service integrations.

pub mod sources {
    pub use crate::sources::*;
}
