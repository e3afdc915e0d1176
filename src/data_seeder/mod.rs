// Demo data: a "test" account following a handful of other users.
// Skipped entirely when the "test" API key already exists.

use tracing::info;

use crate::{app_state::AppState, error::AppResult};

pub const DEMO_API_KEY: &str = "test";

struct DemoUser {
    name: &'static str,
    api_key: &'static str,
    password: &'static str,
    followed_by_demo: bool,
}

const fn demo(
    name: &'static str,
    api_key: &'static str,
    password: &'static str,
    followed_by_demo: bool,
) -> DemoUser {
    DemoUser {
        name,
        api_key,
        password,
        followed_by_demo,
    }
}

const DEMO_USERS: &[DemoUser] = &[
    demo("Тестовый пользователь", DEMO_API_KEY, "testpass", false),
    demo("Александр", "xsan", "passalex", true),
    demo("Алексей", "lexy", "passalexey", true),
    demo("Евгений", "gaw", "passevg", true),
    demo("Александра", "yoyo", "passalexandra", true),
    demo("Евгения", "woppy", "passevgys", false),
    demo("Дарья", "toradora", "passdaria", false),
    demo("Иван", "ivolga", "passivano", false),
];

/// Returns `true` if data was inserted, `false` if it was already present
pub async fn seed_demo_data(state: &AppState) -> AppResult<bool> {
    if state.store.get_user_by_api_key(DEMO_API_KEY).await?.is_some() {
        info!("Demo user already exists, skipping seed");
        return Ok(false);
    }

    let mut demo_id = None;
    let mut followed = Vec::new();
    for demo in DEMO_USERS {
        let user = state
            .identity
            .register(demo.name, demo.password, demo.api_key)
            .await?;
        if demo.api_key == DEMO_API_KEY {
            demo_id = Some(user.id);
        } else if demo.followed_by_demo {
            followed.push(user.id);
        }
    }

    if let Some(demo_id) = demo_id {
        for target in followed {
            state.social.follow(demo_id, target).await?;
        }
    }

    info!("Seeded {} demo users", DEMO_USERS.len());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{LocalBlobStore, SqliteDatabase};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let store = Arc::new(SqliteDatabase::new_in_memory().await.unwrap());
        let blobs = Arc::new(LocalBlobStore::new(std::env::temp_dir(), "/media_files"));
        let state = AppState::from_parts(store, blobs);

        assert!(seed_demo_data(&state).await.unwrap());
        assert!(!seed_demo_data(&state).await.unwrap());

        let demo = state.identity.resolve(DEMO_API_KEY).await.unwrap();
        let profile = state.feed.user_profile(demo.id).await.unwrap();
        let names: Vec<&str> = profile
            .following
            .iter()
            .map(|u| u.name.as_str())
            .collect();
        assert_eq!(names, vec!["Александр", "Алексей", "Евгений", "Александра"]);
        assert!(profile.followers.is_empty());
    }
}
