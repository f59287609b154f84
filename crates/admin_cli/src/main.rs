use std::error::Error;

use clap::{Args, Parser, Subcommand};
use engine::{Engine, RoleFilter, SessionListQuery};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "settleup_admin")]
#[command(about = "Admin utilities for Settleup (schema and host accounts)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./settleup.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply pending migrations and exit.
    Migrate,
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
    name: String,
    #[arg(long)]
    email: Option<String>,
}

#[derive(Args, Debug)]
struct Session {
    #[command(subcommand)]
    command: SessionCommand,
}

#[derive(Subcommand, Debug)]
enum SessionCommand {
    List(SessionListArgs),
}

#[derive(Args, Debug)]
struct SessionListArgs {
    /// Account whose sessions are listed.
    #[arg(long)]
    user: Uuid,
    #[arg(long, default_value = "all")]
    role: String,
    #[arg(long, default_value_t = 1)]
    page: u64,
    #[arg(long, default_value_t = 20)]
    limit: u64,
}

fn parse_role(raw: &str) -> Result<RoleFilter, String> {
    match raw {
        "host" => Ok(RoleFilter::Host),
        "player" => Ok(RoleFilter::Player),
        "all" => Ok(RoleFilter::All),
        other => Err(format!("unsupported role: {other}")),
    }
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

    match cli.command {
        Command::Migrate => {
            println!("database is up to date");
        }
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let engine = Engine::builder().database(db).build().await?;
            let (user, player) = engine
                .create_user(&args.name, args.email.as_deref())
                .await?;
            println!("created user: {} ({}), player {}", user.name, user.id, player.id);
        }
        Command::Session(Session {
            command: SessionCommand::List(args),
        }) => {
            let role = match parse_role(&args.role) {
                Ok(v) => v,
                Err(err) => {
                    eprintln!("{err}");
                    std::process::exit(2);
                }
            };

            let engine = Engine::builder().database(db).build().await?;
            let page = engine
                .list_sessions(
                    args.user,
                    SessionListQuery::default()
                        .role(role)
                        .page(args.page, args.limit),
                )
                .await?;
            for item in &page.items {
                println!(
                    "{}  {:<16} {:<32} payers={} verified={}",
                    item.session.id,
                    item.session.status,
                    item.session.name,
                    item.payer_count,
                    item.verified_count,
                );
            }
            println!(
                "page {}/{} ({} sessions)",
                page.page,
                page.total_pages(),
                page.total_items
            );
        }
    }

    Ok(())
}
