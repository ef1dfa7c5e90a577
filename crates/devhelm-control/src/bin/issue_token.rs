// Issue an app-user access token
//
// Usage: cargo run --bin issue-token -- --email dev@example.com --team "Acme"
//
// Ensures the team and user exist, then prints a JWT for the user. The login
// UI is not part of this service, so this is how operators bootstrap access.
// Uses the same AUTH_JWT_SECRET and DATABASE_URL as the server.

use anyhow::{bail, Context, Result};
use clap::Parser;
use devhelm_control::auth::{AuthConfig, JwtService};
use devhelm_storage::{CreateTeamRow, CreateUserRow, StorageBackend};

#[derive(Parser)]
#[command(name = "issue-token")]
#[command(about = "Ensure a team and user exist and print an access token")]
struct Args {
    /// User email
    #[arg(long)]
    email: String,

    /// Display name for a newly created user (defaults to the email)
    #[arg(long)]
    name: Option<String>,

    /// Team to create for a user without one
    #[arg(long, default_value = "Default")]
    team: String,

    /// PostgreSQL URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let Some(url) = args.database_url.as_deref() else {
        bail!("DATABASE_URL is required: tokens for the in-memory backend would name a user no server knows");
    };
    let db = StorageBackend::postgres(url)
        .await
        .context("Failed to connect to database")?;

    let user = match db.get_user_by_email(&args.email).await? {
        Some(user) if user.team_id.is_some() => user,
        Some(user) => bail!("user {} exists but belongs to no team", user.email),
        None => {
            let team = db.create_team(CreateTeamRow { name: args.team }).await?;
            db.create_user(CreateUserRow {
                name: args.name.unwrap_or_else(|| args.email.clone()),
                email: args.email.clone(),
                team_id: Some(team.id),
            })
            .await?
        }
    };

    if std::env::var("AUTH_JWT_SECRET").map_or(true, |s| s.is_empty()) {
        bail!("AUTH_JWT_SECRET is required: a random secret would not match the server's");
    }
    let auth_config = AuthConfig::from_env();
    let jwt = JwtService::new(auth_config.jwt);
    let token = jwt.generate_access_token(user.id, &user.email)?;

    eprintln!(
        "user {} (team {}), token valid for {}s",
        user.id,
        user.team_id.map(|t| t.to_string()).unwrap_or_default(),
        jwt.access_token_lifetime_secs()
    );
    println!("{}", token);
    Ok(())
}
