pub mod activities;
mod extract;
pub mod profiles;
mod response;

pub use extract::AppJson;
pub use response::ApiResponse;
