// Core types shared by the store, the services and the HTTP layer

pub mod strong_types;

pub use strong_types::{MediaId, TweetId, UserId};
