//! Shared helpers for integration tests.
//!
//! Each integration test file compiles common/ as its own module, so not
//! every helper is used in every file.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use herald_listener::Handler;
use herald_router::{ChatClient, Router, StaticPrefixProvider};
use herald_types::{
    permissions::{ResolvedPermissions, REQUIRED_TO_ACT},
    ChannelId, DispatchEvent, GuildId, PermissionView, RouterConfig, UserId,
};

/// Bot id used across the integration tests (a plain 18-digit snowflake).
pub const BOT_ID: &str = "123456789012345678";

/// Client that always grants the required permissions and knows its id.
pub struct PermissiveClient;

#[async_trait]
impl ChatClient for PermissiveClient {
    fn bot_id(&self) -> Option<UserId> {
        Some(UserId::new(BOT_ID))
    }

    async fn own_permissions(
        &self,
        _guild: &GuildId,
        _channel: &ChannelId,
    ) -> Option<Box<dyn PermissionView + Send>> {
        Some(Box::new(ResolvedPermissions::uniform(REQUIRED_TO_ACT)))
    }
}

/// Build a router over a permissive client and the given config.
pub fn test_router(
    config: RouterConfig,
    bus: Arc<herald_listener::EventBus>,
) -> Arc<Router<StaticPrefixProvider>> {
    let provider = StaticPrefixProvider::from_config(&config).expect("test regex should compile");
    Arc::new(Router::new(Arc::new(PermissiveClient), provider, bus))
}

/// Handler that appends every received event to `into`.
pub fn collector(into: Arc<Mutex<Vec<DispatchEvent>>>) -> Handler {
    Arc::new(move |event| {
        let into = Arc::clone(&into);
        Box::pin(async move {
            into.lock().expect("collector lock").push(event);
            Ok(())
        })
    })
}
