pub mod models;
pub mod operation;
pub mod procedures;
pub mod store;

pub use models::{ActivityPreference, UserProfile};
pub use operation::Operation;
pub use store::{NewProfile, ProfileChanges, ProfileStore, StoreError};
