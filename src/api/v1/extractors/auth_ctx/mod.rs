/*!
 * Authentication context extractor
 *
 * Responsibility:
 * - middleware が extensions に載せた Claims を handler に提供する
 * - 読み出しは services::auth::context 経由のみ (token は再検証しない)
 * - HTTP / axum 依存は core に閉じ込め、型定義は types に分離する
 *
 * Public API:
 * - Identity
 * - OptionalIdentity
 */

mod core;
mod types;

pub use types::{Identity, OptionalIdentity};
