//! Test utilities for Tunr
//!
//! Provides helpers for creating isolated test environments with:
//! - In-memory SQLite databases (one per test)
//! - AppState factories
//! - Test data generators

use chrono::Utc;
use migration::MigratorTrait;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};

use crate::{
    config::Config,
    db::entities::{artist, favorite, song, user},
    services::{Credentials, Identity},
    state::AppState,
};

/// Password given to every user made by [`create_test_user`]
pub const TEST_PASSWORD: &str = "correct horse battery";

/// Lowest cost bcrypt accepts; keeps hashing fast in tests
pub const TEST_BCRYPT_COST: u32 = 4;

/// Setup an in-memory SQLite database with all migrations applied
///
/// Each call creates a fresh, isolated database perfect for parallel testing
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// Create a test configuration with sensible defaults
pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        server_host: "127.0.0.1".to_string(),
        server_port: 3000,
        session_ttl_hours: 24,
        bcrypt_cost: TEST_BCRYPT_COST,
        static_dir: "static".to_string(),
    }
}

/// Create a complete test AppState with an isolated database
pub async fn setup_test_app_state() -> AppState {
    AppState::new(setup_test_db().await, test_config())
}

// ============================================================================
// Test Data Factories
// ============================================================================

/// Create a test artist in the database
pub async fn create_test_artist(
    db: &DatabaseConnection,
    name: &str,
    nationality: &str,
) -> artist::Model {
    let now = Utc::now().into();
    let artist = artist::ActiveModel {
        name: Set(name.to_string()),
        nationality: Set(nationality.to_string()),
        photo_url: Set(String::new()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    artist.insert(db).await.expect("Failed to insert test artist")
}

/// Create a test song in the database
pub async fn create_test_song(
    db: &DatabaseConnection,
    artist_id: i32,
    title: &str,
) -> song::Model {
    let now = Utc::now().into();
    let song = song::ActiveModel {
        artist_id: Set(artist_id),
        title: Set(title.to_string()),
        album: Set(String::new()),
        preview_url: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    song.insert(db).await.expect("Failed to insert test song")
}

/// Create a test user whose password is [`TEST_PASSWORD`]
pub async fn create_test_user(db: &DatabaseConnection, username: &str) -> user::Model {
    let password_hash =
        bcrypt::hash(TEST_PASSWORD, TEST_BCRYPT_COST).expect("Failed to hash test password");
    let user = user::ActiveModel {
        username: Set(username.to_string()),
        password_hash: Set(password_hash),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    };

    user.insert(db).await.expect("Failed to insert test user")
}

/// Create a favorite row directly, bypassing the favoriting service
pub async fn create_test_favorite(
    db: &DatabaseConnection,
    user_id: i32,
    song_id: i32,
) -> favorite::Model {
    let favorite = favorite::ActiveModel {
        user_id: Set(user_id),
        song_id: Set(song_id),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    };

    favorite.insert(db).await.expect("Failed to insert test favorite")
}

/// Create a user and an identity for them
pub async fn create_test_identity(db: &DatabaseConnection, username: &str) -> Identity {
    Identity::User(create_test_user(db, username).await)
}

/// Create a user and log them in, returning the user and their session token
pub async fn login_test_user(state: &AppState, username: &str) -> (user::Model, String) {
    create_test_user(&state.db, username).await;
    let session = state
        .accounts()
        .login(&Credentials {
            username: username.to_string(),
            password: TEST_PASSWORD.to_string(),
        })
        .await
        .expect("Failed to log in test user");

    (session.user, session.token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::EntityTrait;

    #[tokio::test]
    async fn test_setup_test_db() {
        let db = setup_test_db().await;
        // Verify we can query the database (it has tables from migrations)
        let artists = artist::Entity::find().all(&db).await.unwrap();
        assert_eq!(artists.len(), 0);
    }

    #[tokio::test]
    async fn test_create_test_artist() {
        let db = setup_test_db().await;
        let artist = create_test_artist(&db, "Kanye West", "USA").await;

        assert_eq!(artist.name, "Kanye West");
        assert_eq!(artist.nationality, "USA");
    }

    #[tokio::test]
    async fn test_create_test_song() {
        let db = setup_test_db().await;
        let artist = create_test_artist(&db, "Kanye West", "USA").await;
        let song = create_test_song(&db, artist.id, "Ultralight Beam").await;

        assert_eq!(song.title, "Ultralight Beam");
        assert_eq!(song.artist_id, artist.id);
    }

    #[tokio::test]
    async fn test_create_test_user_password() {
        let db = setup_test_db().await;
        let user = create_test_user(&db, "ye").await;

        assert_eq!(user.username, "ye");
        assert!(bcrypt::verify(TEST_PASSWORD, &user.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_parallel_databases() {
        // Run two database setups in parallel - they should not interfere
        let (db1, db2) = tokio::join!(setup_test_db(), setup_test_db());

        let artist1 = create_test_artist(&db1, "Artist 1", "").await;
        let artist2 = create_test_artist(&db2, "Artist 2", "").await;

        // Both should be ID 1 (separate databases)
        assert_eq!(artist1.id, 1);
        assert_eq!(artist2.id, 1);

        let db1_artists = artist::Entity::find().all(&db1).await.unwrap();
        let db2_artists = artist::Entity::find().all(&db2).await.unwrap();

        assert_eq!(db1_artists.len(), 1);
        assert_eq!(db2_artists.len(), 1);
        assert_eq!(db1_artists[0].name, "Artist 1");
        assert_eq!(db2_artists[0].name, "Artist 2");
    }
}
