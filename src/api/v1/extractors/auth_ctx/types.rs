/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - middleware が検証して request extensions に格納し、handler はこの型だけを受け取る
 */
use std::ops::Deref;

use crate::services::auth::Claims;

/// Claims of the caller. Extraction fails with 401 when nothing was attached.
#[derive(Debug, Clone)]
pub struct Identity(pub Claims);

impl Deref for Identity {
    type Target = Claims;

    fn deref(&self) -> &Claims {
        &self.0
    }
}

/// Claims when the caller sent a valid access token, `None` otherwise.
#[derive(Debug, Clone)]
pub struct OptionalIdentity(pub Option<Claims>);
