//! stockroom CLI - account administration for the stockroom inventory manager
//!
//! Creates, lists and deletes accounts, tries admin logins, clears lockouts
//! and checks the database against the PostgreSQL store named by
//! `DATABASE_URL`.

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use stockroom_auth::observability::{self, ObservabilityConfig};
use stockroom_auth::{
    create_pool, health_check, AccountManager, AuthConfig, AuthResult, Authenticator,
    BcryptHasher, DatabaseConfig, NewUser, PgUserStore, Role,
};

mod error;
mod output;

use error::{CliError, Result};

/// stockroom - account administration
#[derive(Parser)]
#[command(name = "stockroom")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    CreateUser {
        /// Login name
        username: String,

        /// Initial password
        #[arg(long, env = "STOCKROOM_PASSWORD", hide_env_values = true)]
        password: String,

        /// First name
        #[arg(long, default_value = "")]
        first_name: String,

        /// Last name
        #[arg(long, default_value = "")]
        last_name: String,

        /// Contact email
        #[arg(long)]
        email: Option<String>,

        /// Role: admin, manager, employee
        #[arg(long, default_value = "employee")]
        role: String,
    },

    /// Attempt an admin login
    Login {
        /// Login name
        username: String,

        /// Password to check
        #[arg(long, env = "STOCKROOM_PASSWORD", hide_env_values = true)]
        password: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List all accounts
    ListUsers {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete an account
    DeleteUser {
        /// Account id
        id: i64,
    },

    /// Clear the failed-attempt counter and lockout of an account
    Unlock {
        /// Login name
        username: String,
    },

    /// Check database connectivity
    Health,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = run(cli).await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    observability::init(&ObservabilityConfig::from_env())?;

    let db_config = DatabaseConfig::from_env()?;
    let pool = create_pool(&db_config).await?;

    if let Commands::Health = cli.command {
        let status = health_check(&pool).await?;
        output::print_health(&status);
        return Ok(());
    }

    let auth_config = AuthConfig::from_env()?;
    let store = Arc::new(PgUserStore::new(pool));
    let hasher = Arc::new(BcryptHasher::new(auth_config.bcrypt_cost));

    match cli.command {
        Commands::CreateUser {
            username,
            password,
            first_name,
            last_name,
            email,
            role,
        } => {
            let role: Role = role.parse()?;
            let accounts = AccountManager::new(store, hasher);
            let id = accounts
                .create_user(NewUser {
                    username,
                    password,
                    first_name,
                    last_name,
                    email,
                    role,
                })
                .await?;
            let profile = accounts.get_profile(id).await?;
            output::success("Account created");
            output::print_profile(&profile);
        }

        Commands::Login {
            username,
            password,
            json,
        } => {
            let auth = Authenticator::new(store, hasher, &auth_config);
            let result = auth.login(&username, &password).await;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            }

            match result {
                AuthResult::Success(identity) => {
                    if !json {
                        output::print_identity(&identity);
                    }
                }
                AuthResult::Failure(failure) => {
                    return Err(CliError::LoginRejected(failure.reason()));
                }
            }
        }

        Commands::ListUsers { json } => {
            let profiles = AccountManager::new(store, hasher).list_profiles().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&profiles)?);
            } else {
                output::print_profiles(&profiles);
            }
        }

        Commands::DeleteUser { id } => {
            AccountManager::new(store, hasher).delete_user(id).await?;
            output::success(&format!("Account {} deleted", id));
        }

        Commands::Unlock { username } => {
            AccountManager::new(store, hasher)
                .unlock_account(&username)
                .await?;
            output::success(&format!("Account {} unlocked", username));
        }

        Commands::Health => {}
    }

    Ok(())
}
