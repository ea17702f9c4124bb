//! Screen modules for the TUI

pub mod admin;
pub mod details;
pub mod login;
pub mod photos;
pub mod wishes;

pub use admin::AdminScreen;
pub use details::DetailsScreen;
pub use login::{LoginMode, LoginScreen};
pub use photos::PhotosScreen;
pub use wishes::WishesScreen;
