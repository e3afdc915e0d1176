// Strong Types - newtype ids for every stored entity
// Keeps a user id from being passed where a tweet id is expected

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub fn new(id: i64) -> Self {
                Self(id)
            }

            /// Raw value, used when binding query parameters
            pub fn value(self) -> i64 {
                self.0
            }

            /// Surrogate keys start at 1
            pub fn is_valid(self) -> bool {
                self.0 > 0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(
    /// Primary key of a row in `users`
    UserId
);
define_id!(
    /// Primary key of a row in `tweets`
    TweetId
);
define_id!(
    /// Primary key of a row in `medias`
    MediaId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_operations() {
        let id = UserId::new(123);
        assert_eq!(id.value(), 123);
        assert!(id.is_valid());
        assert!(!TweetId::new(0).is_valid());
        assert_eq!(MediaId::from(7).to_string(), "7");
    }

    #[test]
    fn test_ids_serialize_as_plain_integers() {
        assert_eq!(serde_json::to_string(&TweetId::new(42)).unwrap(), "42");
        let id: UserId = serde_json::from_str("5").unwrap();
        assert_eq!(id, UserId::new(5));
    }
}
