use anyhow::Context;
use clap::{Parser, Subcommand};

use recipe_api_rust::database::{tokens, users, DatabaseManager};

#[derive(Parser)]
#[command(name = "recipectl")]
#[command(about = "Recipe API admin CLI")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Create a superuser account (is_staff and is_superuser set)")]
    CreateSuperuser {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },

    #[command(about = "Run pending database migrations")]
    Migrate,

    #[command(about = "Delete expired auth tokens")]
    PurgeTokens,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let pool = DatabaseManager::pool()
        .await
        .context("failed to connect to database")?;

    match cli.command {
        Commands::CreateSuperuser { email, password } => {
            let user = users::create_superuser(&pool, &email, &password)
                .await
                .context("failed to create superuser")?;
            println!("Created superuser {} ({})", user.email, user.id);
        }
        Commands::Migrate => {
            sqlx::migrate!()
                .run(&pool)
                .await
                .context("migration failed")?;
            println!("Migrations applied");
        }
        Commands::PurgeTokens => {
            let purged = tokens::purge_expired(&pool)
                .await
                .context("failed to purge tokens")?;
            println!("Purged {} expired tokens", purged);
        }
    }

    Ok(())
}
