pub mod comment;
pub mod conversation;
pub mod follow;
pub mod like;
pub mod message;
pub mod post;
pub mod share;
pub mod user;

pub use user::UserSummary;
