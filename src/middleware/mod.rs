/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth: optional identity / enforcement / role guard
 * - http, cors, security_headers: Router 全体に掛ける cross-cutting layer
 */
pub mod auth;
pub mod bearer_auth;
pub mod cors;
pub mod http;
pub mod security_headers;
