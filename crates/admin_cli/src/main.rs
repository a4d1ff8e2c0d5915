use std::error::Error;

use chrono::Duration;
use clap::{Args, Parser, Subcommand};
use engine::{Engine, NewUser};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "famfin_admin")]
#[command(about = "Admin utilities for famfin (bootstrap users, issue sessions)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./famfin.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Session(Session),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
    /// Defaults to the username.
    #[arg(long)]
    display_name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    /// Grant the `admin` role.
    #[arg(long)]
    admin: bool,
}

#[derive(Args, Debug)]
struct Session {
    #[command(subcommand)]
    command: SessionCommand,
}

#[derive(Subcommand, Debug)]
enum SessionCommand {
    /// Mint a bearer token and print it.
    Issue(SessionIssueArgs),
    Revoke(SessionRevokeArgs),
}

#[derive(Args, Debug)]
struct SessionIssueArgs {
    #[arg(long)]
    username: String,
    #[arg(long, default_value_t = 30)]
    ttl_days: i64,
}

#[derive(Args, Debug)]
struct SessionRevokeArgs {
    #[arg(long)]
    token: String,
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let user = engine
                .bootstrap_user(NewUser {
                    display_name: args.display_name.unwrap_or_default(),
                    username: args.username,
                    email: args.email,
                    admin: args.admin,
                })
                .await?;
            println!(
                "created user: {} ({})",
                user.username,
                user.role.as_deref().unwrap_or("no role")
            );
        }
        Command::Session(Session {
            command: SessionCommand::Issue(args),
        }) => {
            let ttl = Duration::try_days(args.ttl_days).ok_or("ttl out of range")?;
            let token = engine.issue_session(&args.username, ttl).await?;
            println!("{token}");
        }
        Command::Session(Session {
            command: SessionCommand::Revoke(args),
        }) => {
            engine.revoke_session(&args.token).await?;
            println!("session revoked");
        }
    }

    Ok(())
}
