use clap::{Parser, Subcommand};
use flavorpal_api::{
    config::AppConfig,
    db::{create_orm_conn, known_migrations, revert_migrations, run_migrations},
};

#[derive(Parser)]
#[command(name = "migrate", about = "Apply or revert database migrations")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Apply every pending migration (default)
    Up,
    /// Revert migrations newer than `target`; 0 reverts everything
    Down {
        #[arg(long, default_value_t = 0)]
        target: i64,
    },
    /// Print the embedded migrations
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Some(Command::List) = cli.command {
        for (version, description) in known_migrations() {
            println!("{version}  {description}");
        }
        return Ok(());
    }

    let config = AppConfig::from_env()?;
    let orm = create_orm_conn(&config.database_url).await?;

    match cli.command.unwrap_or(Command::Up) {
        Command::Up => {
            run_migrations(&orm).await?;
            println!("Migrations applied");
        }
        Command::Down { target } => {
            revert_migrations(&orm, target).await?;
            println!("Migrations reverted to {target}");
        }
        Command::List => {}
    }
    Ok(())
}
