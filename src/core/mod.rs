// Domain-layer modules and shared errors/models
pub mod cnpj {
    pub use crate::cnpj::*;
}

pub mod normalizer {
    pub use crate::normalizer::*;
}

pub mod resolver {
    pub use crate::resolver::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod errors {
    pub use crate::errors::*;
}
