use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::config::Config;
use crate::db::repositories::{ArtistRepository, SongRepository};
use crate::services::{AccountService, FavoriteService};

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    pub fn artists(&self) -> ArtistRepository {
        ArtistRepository::new(self.db.clone())
    }

    pub fn songs(&self) -> SongRepository {
        SongRepository::new(self.db.clone())
    }

    pub fn favorites(&self) -> FavoriteService {
        FavoriteService::new(self.db.clone())
    }

    pub fn accounts(&self) -> AccountService {
        AccountService::new(
            self.db.clone(),
            self.config.session_ttl_hours,
            self.config.bcrypt_cost,
        )
    }
}
