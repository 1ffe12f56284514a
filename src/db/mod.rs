pub mod entities;
pub mod repositories;
pub mod validation;

pub use entities::*;
