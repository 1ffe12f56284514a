pub mod artist;
pub mod favorite;
pub mod session;
pub mod song;
pub mod user;

pub use artist::Entity as Artist;
pub use favorite::Entity as Favorite;
pub use session::Entity as Session;
pub use song::Entity as Song;
pub use user::Entity as User;
