pub mod control;
pub mod feed;

pub use control::{MaxSpam, RerollResponse, StartGiveaway, StatusResponse, SuccessResponse};
pub use feed::{ChatLine, FeedMessage};
