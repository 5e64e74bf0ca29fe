// SPDX-License-Identifier: AGPL-3.0
// ResourceMap CLI - Headless frontend over resourcemap-core

use clap::{Parser, Subcommand, ValueEnum};
use resourcemap_core::{
    boot, AppError, ChangePasswordForm, Choice, ClientSettings, DonationCategory,
    FileKeyValueStore, ListingBackend, ListingFilter, RegisterForm, RequestCategory, Role, Route,
    SessionManager, SessionStatus, SettingsStore, Shell, Urgency,
};
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "resourcemap", version, about = "ResourceMap donation marketplace client")]
struct Cli {
    /// Override the API base URL for this run
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Load listings from the API instead of the built-in sample data
    #[arg(long, global = true)]
    remote: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    Donor,
    NgoMember,
    Admin,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Donor => Role::Donor,
            RoleArg::NgoMember => Role::NgoMember,
            RoleArg::Admin => Role::Admin,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Check whether the stored session is still valid
    Status,
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
        #[arg(long, value_enum, default_value = "donor")]
        role: RoleArg,
        #[arg(long)]
        organization_id: Option<i64>,
    },
    Logout,
    /// Show the current profile
    Whoami,
    /// Check that the API is reachable
    Ping,
    ChangePassword {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
        #[arg(long)]
        confirm: String,
    },
    /// Permanently delete the account
    DeleteAccount {
        #[arg(long)]
        password: String,
        /// Confirm the irreversible deletion
        #[arg(long)]
        yes: bool,
    },
    /// List donations
    Donations {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "all")]
        category: Choice<DonationCategory>,
    },
    /// List aid requests
    Requests {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "all")]
        category: Choice<RequestCategory>,
        #[arg(long, default_value = "all")]
        urgency: Choice<Urgency>,
    },
    /// Home screen counters
    Summary,
    /// Show or change the persisted client settings
    Settings {
        /// API base URL
        #[arg(long)]
        base_url: Option<String>,
        /// Request timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
        #[arg(long)]
        notifications: Option<bool>,
        #[arg(long)]
        dark_mode: Option<bool>,
    },
}

fn load_settings(api_url: Option<String>) -> ClientSettings {
    let mut settings = match SettingsStore::new() {
        Ok(store) => store.get(),
        Err(e) => {
            tracing::warn!("Failed to open settings, using defaults: {}", e);
            ClientSettings::default()
        }
    };

    if let Some(url) = api_url {
        settings.api_base_url = url;
    }
    settings
}

fn configure(
    base_url: Option<String>,
    timeout_ms: Option<u64>,
    notifications: Option<bool>,
    dark_mode: Option<bool>,
) -> Result<(), AppError> {
    let store = SettingsStore::new()?;

    if base_url.is_some() || timeout_ms.is_some() {
        let mut settings = store.get();
        if let Some(url) = base_url {
            settings.api_base_url = url;
        }
        if let Some(ms) = timeout_ms {
            settings.request_timeout_ms = ms;
        }
        store.update(settings)?;
    }
    if let Some(enabled) = notifications {
        store.set_notifications_enabled(enabled)?;
    }
    if let Some(enabled) = dark_mode {
        store.set_dark_mode(enabled)?;
    }

    println!("{}", serde_json::to_string_pretty(&store.get())?);
    Ok(())
}

async fn signed_in_shell(
    session: Arc<SessionManager>,
    backend: ListingBackend,
) -> Result<Shell, AppError> {
    match boot(session, backend).await {
        Route::SignedIn(shell) => {
            shell.refresh().await?;
            Ok(shell)
        }
        Route::SignedOut => Err(AppError::Auth(
            "Not signed in; run `resourcemap login` first".to_string(),
        )),
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    match cli.command {
        Command::Settings {
            base_url,
            timeout_ms,
            notifications,
            dark_mode,
        } => configure(base_url, timeout_ms, notifications, dark_mode),
        command => {
            let backend = if cli.remote {
                ListingBackend::Remote
            } else {
                ListingBackend::Fixtures
            };
            run_session(command, load_settings(cli.api_url), backend).await
        }
    }
}

async fn run_session(
    command: Command,
    settings: ClientSettings,
    backend: ListingBackend,
) -> Result<(), AppError> {
    let storage = Arc::new(FileKeyValueStore::new()?);
    let session = Arc::new(SessionManager::new(&settings, storage)?);

    match command {
        Command::Status => match session.restore().await {
            SessionStatus::Authenticated(active) => match active.user {
                Some(user) => println!("Signed in as {} <{}>", user.name, user.email),
                None => println!("Signed in"),
            },
            SessionStatus::Unauthenticated => println!("Signed out"),
        },
        Command::Login { email, password } => {
            let auth = session.login(&email, &password).await?;
            println!("Welcome, {} ({})", auth.user.name, auth.user.role.label());
        }
        Command::Register {
            name,
            email,
            phone,
            password,
            confirm_password,
            role,
            organization_id,
        } => {
            let form = RegisterForm {
                name,
                email,
                phone,
                password,
                confirm_password,
                role: role.into(),
                organization_id,
            };
            let auth = session.register(&form).await?;
            println!("Account created for {}", auth.user.email);
        }
        Command::Logout => {
            session.logout().await;
            println!("Signed out");
        }
        Command::Whoami => match session.load_profile().await {
            Some(user) => println!(
                "{}",
                serde_json::to_string_pretty(&user).map_err(AppError::from)?
            ),
            None => println!("No profile available"),
        },
        Command::Ping => {
            if session.test_connection().await {
                println!("API reachable at {}", settings.api_base_url);
            } else {
                return Err(AppError::Network(format!(
                    "API unreachable at {}",
                    settings.api_base_url
                )));
            }
        }
        Command::ChangePassword {
            current,
            new,
            confirm,
        } => {
            let form = ChangePasswordForm {
                current_password: current,
                new_password: new,
                confirm_password: confirm,
            };
            session.change_password(&form).await?;
            println!("Password changed");
        }
        Command::DeleteAccount { password, yes } => {
            if !yes {
                return Err(AppError::Validation(
                    "Account deletion is irreversible; pass --yes to confirm".to_string(),
                ));
            }
            session.delete_account(&password).await?;
            println!("Account deleted");
        }
        Command::Donations { search, category } => {
            let shell = signed_in_shell(session, backend).await?;
            let filter = ListingFilter {
                text: search,
                category,
                ..ListingFilter::default()
            };
            for donation in shell.donations.filter(&filter) {
                println!(
                    "{}  [{}] {} x{} - {} ({}, {})",
                    donation.id,
                    donation.status.label(),
                    donation.title,
                    donation.quantity,
                    donation.location,
                    donation.category.label(),
                    donation.donor_name
                );
            }
        }
        Command::Requests {
            search,
            category,
            urgency,
        } => {
            let shell = signed_in_shell(session, backend).await?;
            let filter = ListingFilter {
                text: search,
                category,
                urgency,
            };
            for request in shell.requests.filter(&filter) {
                println!(
                    "{}  [{}] {} x{} - {} (urgência {}, {} / {})",
                    request.id,
                    request.status.label(),
                    request.title,
                    request.quantity,
                    request.location,
                    request.urgency.label(),
                    request.organization,
                    request.contact_info
                );
            }
        }
        Command::Summary => {
            let shell = signed_in_shell(session, backend).await?;
            let overview = shell.overview();
            println!("Doações ativas:  {}", overview.active_donations);
            println!("Necessidades:    {}", overview.open_requests);
            println!("ONGs parceiras:  {}", overview.partner_organizations);
            println!("Matches feitos:  {}", overview.matches);
        }
        Command::Settings { .. } => {
            return Err(AppError::InvalidConfig(
                "settings are managed without a session".to_string(),
            ))
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "resourcemap_cli=info,resourcemap_core=info".into()),
        )
        .init();

    tracing::debug!("Starting ResourceMap CLI v{}", env!("CARGO_PKG_VERSION"));

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
