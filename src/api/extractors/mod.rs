//! Request extractors that reject with `AppError`.

mod json;
mod user_id;

pub use json::JsonBody;
pub use user_id::UserId;
