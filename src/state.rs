/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - tokens: TokenCodec, whitelist: Whitelist, auth: TokenService, users: UserDirectory
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 * - startup 後は read-only
 */
use std::sync::Arc;

use crate::services::auth::{TokenCodec, TokenService, Whitelist};
use crate::services::users::UserDirectory;

#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenCodec>,
    pub whitelist: Arc<Whitelist>,
    pub auth: Arc<TokenService>,
    pub users: Arc<dyn UserDirectory>,
}

impl AppState {
    pub fn new(
        tokens: Arc<TokenCodec>,
        whitelist: Arc<Whitelist>,
        auth: Arc<TokenService>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            tokens,
            whitelist,
            auth,
            users,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("tokens", &self.tokens)
            .field("whitelist", &self.whitelist)
            .finish_non_exhaustive()
    }
}
