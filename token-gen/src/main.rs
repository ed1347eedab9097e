use std::sync::Arc;

use clap::{Parser, ValueEnum};
use jobbly_auth::services::auth::jwt::{
    DEFAULT_ACCESS_TTL_SECONDS, DEFAULT_ISSUER, DEFAULT_REFRESH_TTL_SECONDS,
};
use jobbly_auth::services::auth::{
    FixedClock, IdentityFields, Role, TokenCodec, TokenKind, TokenTtl,
};
use uuid::Uuid;

/// Mint (or inspect) HS256 session tokens for local testing.
///
/// Tokens are signed exactly like the server signs them:
/// - same claim layout (sub, email, full_name, phone_number, role, token_type, iss, iat, nbf, exp)
/// - access and refresh share one `iat`
#[derive(Parser, Debug)]
#[command(name = "token-gen", version, about)]
struct Args {
    /// Signing secret; must match the server's JWT_SECRET
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    secret: String,

    /// Issuer (iss); must match the server's AUTH_ISSUER
    #[arg(long, env = "AUTH_ISSUER", default_value = DEFAULT_ISSUER)]
    issuer: String,

    /// Subject (user id). Default: random UUID v4 (simple form).
    #[arg(long)]
    subject: Option<String>,

    #[arg(long, default_value = "dev@example.com")]
    email: String,

    #[arg(long, default_value = "Local Developer")]
    name: String,

    #[arg(long, default_value = "")]
    phone: String,

    #[arg(long, value_enum, default_value_t = RoleArg::User)]
    role: RoleArg,

    #[arg(long, default_value_t = DEFAULT_ACCESS_TTL_SECONDS)]
    access_ttl: u64,

    #[arg(long, default_value_t = DEFAULT_REFRESH_TTL_SECONDS)]
    refresh_ttl: u64,

    /// Override iat (unix seconds). Default: now.
    #[arg(long)]
    iat: Option<i64>,

    /// Validate this token instead of minting, and print its claims
    #[arg(long, value_name = "TOKEN")]
    inspect: Option<String>,

    /// Expected kind for --inspect
    #[arg(long, value_enum, default_value_t = KindArg::Access)]
    kind: KindArg,

    /// Print only the access token (no extra lines)
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RoleArg {
    Admin,
    User,
}

impl From<RoleArg> for Role {
    fn from(r: RoleArg) -> Self {
        match r {
            RoleArg::Admin => Role::Admin,
            RoleArg::User => Role::User,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindArg {
    Access,
    Refresh,
}

impl From<KindArg> for TokenKind {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::Access => TokenKind::Access,
            KindArg::Refresh => TokenKind::Refresh,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let ttl = TokenTtl {
        access_seconds: args.access_ttl,
        refresh_seconds: args.refresh_ttl,
    };
    let codec = TokenCodec::new(&args.secret, args.issuer.clone(), ttl)?;
    let codec = match args.iat {
        Some(iat) => codec.with_clock(Arc::new(FixedClock(iat))),
        None => codec,
    };

    if let Some(token) = args.inspect.as_deref() {
        let claims = codec.validate(token, args.kind.into())?;
        println!("{}", serde_json::to_string_pretty(&claims)?);
        return Ok(());
    }

    let fields = IdentityFields {
        subject: args
            .subject
            .unwrap_or_else(|| Uuid::new_v4().simple().to_string()),
        email: args.email,
        display_name: args.name,
        phone: args.phone,
        role: args.role.into(),
    };
    let pair = codec.new_token_pair(&fields)?;

    if args.quiet {
        println!("{}", pair.access_token);
        return Ok(());
    }

    println!("access_token: {}", pair.access_token);
    println!("refresh_token: {}", pair.refresh_token);
    println!("sub: {}", fields.subject);
    println!("role: {}", fields.role);
    println!("Authorization: Bearer {}", pair.access_token);

    Ok(())
}
