pub mod accounts;
pub mod favorites;

pub use accounts::{AccountService, Credentials, Identity, LoginSession};
pub use favorites::{FavoriteOutcome, FavoriteService};
