//! MentorIA CLI
//!
//! Command-line client for the MentorIA study-mentoring backend: sign in,
//! manage mentors and their learning resources, and inspect routing.

mod view;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use mentoria_api::{
    ClientError, Credentials, EntityId, FileTokenStore, MentorUpdate, NewMentor, Registration,
    UploadFile,
};
use mentoria_store::{selectors, AuthStatus, Config, Store};
use tracing_subscriber::EnvFilter;

/// `MentorIA` - study with subject-scoped mentors
///
/// Signs in to the backend, manages mentors and the resources they study
/// from, and resolves app routes against the current session.
#[derive(Parser, Debug)]
#[command(name = "mentoria")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (default: mentoria.json in current directory)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<String>,

    /// Backend base URL, overriding config and environment
    #[arg(long, value_name = "URL", global = true)]
    api_url: Option<String>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and persist the session
    Login {
        /// Account email
        #[arg(long)]
        email: String,
        /// Account password
        #[arg(long)]
        password: String,
    },
    /// Create an account and log in
    Register {
        /// Account email
        #[arg(long)]
        email: String,
        /// Account password
        #[arg(long)]
        password: String,
        /// Display name
        #[arg(long)]
        full_name: Option<String>,
    },
    /// End the session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Manage mentors
    Mentors {
        #[command(subcommand)]
        command: MentorsCommand,
    },
    /// Manage a mentor's resources
    Resources {
        #[command(subcommand)]
        command: ResourcesCommand,
    },
    /// Resolve an app path and show the page it renders
    Route {
        /// Path such as /mentors or /mentor/7
        path: String,
    },
}

#[derive(Subcommand, Debug)]
enum MentorsCommand {
    /// List mentors
    List,
    /// Create a mentor
    Create {
        /// Display name
        #[arg(long)]
        name: String,
        /// Subject the mentor specializes in
        #[arg(long)]
        expertise: String,
        /// Free-text description
        #[arg(long)]
        description: Option<String>,
        /// Avatar image URL
        #[arg(long)]
        avatar_url: Option<String>,
    },
    /// Update a mentor
    Update {
        /// Mentor id
        id: String,
        /// New display name
        #[arg(long)]
        name: Option<String>,
        /// New subject
        #[arg(long)]
        expertise: Option<String>,
        /// New description
        #[arg(long)]
        description: Option<String>,
        /// New avatar image URL
        #[arg(long)]
        avatar_url: Option<String>,
    },
    /// Delete a mentor
    Delete {
        /// Mentor id
        id: String,
    },
}

#[derive(Subcommand, Debug)]
enum ResourcesCommand {
    /// List a mentor's resources
    List {
        /// Mentor id
        mentor_id: String,
    },
    /// Upload a file
    Upload {
        /// Mentor id
        mentor_id: String,
        /// File to upload
        path: PathBuf,
    },
    /// Add a web link
    AddUrl {
        /// Mentor id
        mentor_id: String,
        /// Link to add
        url: String,
        /// Name shown for the link
        #[arg(long)]
        title: Option<String>,
    },
    /// Delete a resource
    Delete {
        /// Mentor id
        mentor_id: String,
        /// Resource id
        resource_id: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if args.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(config = ?args.config, "Config file");

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// Builds the store, restores the session, and runs one command.
async fn run(args: Args) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?
        .with_env_overrides()
        .with_api_url_override(args.api_url.clone());
    config.validate()?;

    let tokens = Arc::new(FileTokenStore::new(config.token_path()));
    let store = Store::new(config, tokens)?;

    let status = store.initialize_auth().await;
    tracing::debug!(status = %status, "Session initialized");

    match args.command {
        Command::Login { email, password } => {
            let user = store.login_user(Credentials::new(email, password)).await?;
            println!("Logged in as {}", user.display_name());
        }
        Command::Register {
            email,
            password,
            full_name,
        } => {
            let mut registration = Registration::new(email, password);
            if let Some(full_name) = full_name {
                registration = registration.with_full_name(full_name);
            }
            let user = store.register_user(registration).await?;
            store.reset_registration_success().await;
            println!("Account created. Logged in as {}", user.display_name());
        }
        Command::Logout => {
            store.logout_user().await;
            println!("Logged out");
        }
        Command::Whoami => whoami(&store, status, args.json).await?,
        Command::Mentors { command } => run_mentors(&store, command, args.json).await?,
        Command::Resources { command } => run_resources(&store, command, args.json).await?,
        Command::Route { path } => {
            if status.is_authenticated() && path.starts_with("/mentor/") {
                if let Err(e) = store.fetch_mentors().await {
                    tracing::warn!(error = %e, "Could not load mentors for the header");
                }
            }
            let resolution = store.navigate(&path).await;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&resolution)?);
            } else {
                println!("{}", view::resolution(&resolution));
            }
        }
    }
    Ok(())
}

async fn whoami(store: &Store, status: AuthStatus, json: bool) -> anyhow::Result<()> {
    if !status.is_authenticated() {
        println!("Not logged in");
        return Ok(());
    }
    // Restoration loads the user through the profile endpoint, so settings
    // are already present.
    let user = store
        .select(|s| selectors::select_user(s).cloned())
        .await
        .ok_or_else(|| anyhow::anyhow!("Session has no user"))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&user)?);
    } else {
        println!("{}", view::user(&user));
    }
    Ok(())
}

async fn run_mentors(store: &Store, command: MentorsCommand, json: bool) -> anyhow::Result<()> {
    match command {
        MentorsCommand::List => {
            store.fetch_mentors().await?;
            let mentors = store
                .select(|s| selectors::select_all_mentors(s).to_vec())
                .await;
            if json {
                println!("{}", serde_json::to_string_pretty(&mentors)?);
            } else {
                println!("{}", view::mentor_list(&mentors));
            }
        }
        MentorsCommand::Create {
            name,
            expertise,
            description,
            avatar_url,
        } => {
            let mut mentor = NewMentor::new(name, expertise);
            if let Some(description) = description {
                mentor = mentor.with_description(description);
            }
            if let Some(avatar_url) = avatar_url {
                mentor = mentor.with_avatar_url(avatar_url);
            }
            let created = store.create_mentor(mentor).await?;
            print_notifications(store).await;
            println!("{}", view::mentor_detail(&created));
        }
        MentorsCommand::Update {
            id,
            name,
            expertise,
            description,
            avatar_url,
        } => {
            let update = MentorUpdate {
                name,
                expertise,
                description,
                avatar_url,
            };
            let updated = store.update_mentor(id, update).await?;
            print_notifications(store).await;
            println!("{}", view::mentor_detail(&updated));
        }
        MentorsCommand::Delete { id } => {
            store.delete_mentor(id).await?;
            print_notifications(store).await;
        }
    }
    Ok(())
}

async fn run_resources(store: &Store, command: ResourcesCommand, json: bool) -> anyhow::Result<()> {
    match command {
        ResourcesCommand::List { mentor_id } => {
            let mentor_id = EntityId::from(mentor_id);
            load_mentor(store, &mentor_id).await?;
            store.fetch_resources_for_mentor(mentor_id.clone()).await?;
            let resources = store
                .select(|s| selectors::select_resources_for_mentor(s, &mentor_id).to_vec())
                .await;
            if json {
                println!("{}", serde_json::to_string_pretty(&resources)?);
            } else {
                println!("{}", view::resource_list(&resources));
            }
        }
        ResourcesCommand::Upload { mentor_id, path } => {
            let file = UploadFile::from_path(&path, store.config().max_upload_bytes()).await?;
            tracing::info!(path = %path.display(), size = file.size(), "Uploading");
            let resource = store.upload_resource(mentor_id, file).await?;
            print_notifications(store).await;
            println!("{}", view::resource_line(&resource));
        }
        ResourcesCommand::AddUrl {
            mentor_id,
            url,
            title,
        } => {
            let resource = store
                .upload_resource_from_url(mentor_id, &url, title.as_deref())
                .await?;
            print_notifications(store).await;
            println!("{}", view::resource_line(&resource));
        }
        ResourcesCommand::Delete {
            mentor_id,
            resource_id,
        } => {
            store.delete_resource(mentor_id, resource_id).await?;
            print_notifications(store).await;
        }
    }
    Ok(())
}

/// Loads the mentor list and checks that `mentor_id` is in it.
async fn load_mentor(store: &Store, mentor_id: &EntityId) -> anyhow::Result<()> {
    store.fetch_mentors().await?;
    let found = store
        .select(|s| selectors::select_mentor_by_id(s, mentor_id).is_some())
        .await;
    if !found {
        return Err(ClientError::mentor_not_found(mentor_id).into());
    }
    Ok(())
}

/// Prints and drains the notification queue.
async fn print_notifications(store: &Store) {
    let notifications = store
        .select(|s| selectors::select_notifications(s).to_vec())
        .await;
    for notification in &notifications {
        println!("{}", view::notification(notification));
    }
    store.clear_notifications().await;
}

/// Loads configuration from the specified path or default location.
fn load_config(config_path: Option<&str>) -> anyhow::Result<Config> {
    match config_path {
        Some(path_str) => {
            let path = Path::new(path_str);
            if !path.exists() {
                anyhow::bail!(
                    "Config file not found: '{}'\n\nSuggestion: Check the path or remove the --config flag to use defaults",
                    path.display()
                );
            }
            Config::load_from_file(path).map_err(|e| anyhow::anyhow!("{e}"))
        }
        None => Config::load().map_err(|e| anyhow::anyhow!("{e}")),
    }
}
