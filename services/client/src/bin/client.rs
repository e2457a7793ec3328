//! services/client/src/bin/client.rs
//!
//! Command-line front end. Each invocation behaves like one page visit: load the
//! persisted session, re-hydrate it if only a token survived, run one operation,
//! flush persistence and exit.

use clap::{Args, Parser, Subcommand};
use client_lib::{
    adapters::{ConsoleNotifier, FileStorage},
    config::Config,
    error::ClientError,
    session::spawn_persistence,
    ClientServices,
};
use serde::Serialize;
use std::process::ExitCode;
use std::sync::Arc;
use study_notes_core::domain::{CourseType, NoteRef, UserUpdate};
use study_notes_core::ports::CatalogApi;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "client", about = "Notes platform session client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register a new account (sign in afterwards).
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: String,
    },
    Signin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Re-fetch the profile for a stored token.
    Restore,
    /// Print the stored session.
    Status,
    CompleteProfile {
        #[arg(long)]
        college: String,
        #[arg(long)]
        semester: String,
        #[arg(long)]
        course_type: CourseType,
        #[arg(long)]
        name: Option<String>,
    },
    /// Change local profile fields without contacting the server.
    UpdateUser {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        college: Option<String>,
        #[arg(long)]
        semester: Option<String>,
        #[arg(long)]
        course_type: Option<CourseType>,
    },
    Premium,
    Logout,
    StartReading,
    ReadingTime,
    PopupShown,
    #[command(subcommand)]
    Recent(RecentCommand),
    #[command(subcommand)]
    Playlist(PlaylistCommand),
    #[command(subcommand)]
    Catalog(CatalogCommand),
}

#[derive(Args)]
struct NoteArgs {
    #[arg(long)]
    note_id: String,
    #[arg(long, default_value = "")]
    subject: String,
    #[arg(long, default_value = "")]
    domain: String,
    #[arg(long, default_value = "")]
    course_type: String,
    #[arg(long, default_value = "")]
    title: String,
}

impl From<NoteArgs> for NoteRef {
    fn from(args: NoteArgs) -> Self {
        NoteRef {
            note_id: args.note_id,
            subject: args.subject,
            domain: args.domain,
            course_type: args.course_type,
            title: args.title,
        }
    }
}

#[derive(Subcommand)]
enum RecentCommand {
    Add {
        #[command(flatten)]
        note: NoteArgs,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    Progress {
        #[arg(long)]
        note_id: String,
        #[arg(long)]
        page: u32,
    },
    List,
}

#[derive(Subcommand)]
enum PlaylistCommand {
    Create {
        #[arg(long)]
        name: String,
    },
    Delete {
        #[arg(long)]
        id: String,
    },
    Rename {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
    },
    Add {
        #[arg(long)]
        id: String,
        #[command(flatten)]
        note: NoteArgs,
    },
    Remove {
        #[arg(long)]
        id: String,
        #[arg(long)]
        note_id: String,
    },
    List,
}

#[derive(Subcommand)]
enum CatalogCommand {
    Domains,
    Subjects {
        #[arg(long)]
        domain: String,
    },
    Notes {
        #[arg(long)]
        subject: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode, ClientError> {
    let cli = Cli::parse();

    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    info!(api = %config.api_base_url, storage = %config.storage_dir.display(), "Configuration loaded.");

    // --- 2. Wire Storage, API and Context ---
    let storage = Arc::new(FileStorage::open(&config.storage_dir)?);
    let services = ClientServices::build(&config, storage, Arc::new(ConsoleNotifier))?;
    let persistence = spawn_persistence(
        &services.context,
        services.store.clone(),
        config.persist_debounce,
    );

    // --- 3. Run the Command ---
    let outcome = run(cli.command, &services).await;

    // --- 4. Flush Persistence ---
    persistence.shutdown().await;

    match outcome {
        Ok(true) => Ok(ExitCode::SUCCESS),
        Ok(false) => Ok(ExitCode::FAILURE),
        Err(e) => {
            error!(error = %e, "Command failed");
            Err(e)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), ClientError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(command: Command, services: &ClientServices) -> Result<bool, ClientError> {
    let context = &services.context;

    match command {
        Command::Signup { .. } | Command::Signin { .. } | Command::Logout => {}
        _ => {
            context.restore_session().await;
        }
    }

    let succeeded = match command {
        Command::Signup {
            email,
            password,
            name,
        } => context.sign_up(&email, &password, &name).await,
        Command::Signin { email, password } => context.sign_in(&email, &password).await,
        Command::Restore => context.restore_session().await,
        Command::Status => {
            print_json(&context.snapshot())?;
            true
        }
        Command::CompleteProfile {
            college,
            semester,
            course_type,
            name,
        } => {
            context
                .complete_user_info(&college, &semester, course_type, name.as_deref())
                .await
        }
        Command::UpdateUser {
            name,
            email,
            college,
            semester,
            course_type,
        } => context.update_user(UserUpdate {
            name,
            email,
            college,
            semester,
            course_type,
            is_premium: None,
        }),
        Command::Premium => context.upgrade_to_premium().await,
        Command::Logout => {
            context.logout();
            true
        }
        Command::StartReading => {
            context.start_reading();
            true
        }
        Command::ReadingTime => {
            println!("{:.1}", context.reading_duration());
            true
        }
        Command::PopupShown => {
            context.mark_initial_popup_shown();
            true
        }
        Command::Recent(RecentCommand::Add { note, page }) => {
            context.add_recent_note(note.into(), page);
            true
        }
        Command::Recent(RecentCommand::Progress { note_id, page }) => {
            context.update_recent_note_progress(&note_id, page)
        }
        Command::Recent(RecentCommand::List) => {
            print_json(&context.snapshot().recent_notes)?;
            true
        }
        Command::Playlist(PlaylistCommand::Create { name }) => {
            println!("{}", context.create_playlist(&name));
            true
        }
        Command::Playlist(PlaylistCommand::Delete { id }) => context.delete_playlist(&id),
        Command::Playlist(PlaylistCommand::Rename { id, name }) => {
            context.rename_playlist(&id, &name)
        }
        Command::Playlist(PlaylistCommand::Add { id, note }) => {
            context.add_note_to_playlist(&id, note.into())
        }
        Command::Playlist(PlaylistCommand::Remove { id, note_id }) => {
            context.remove_note_from_playlist(&id, &note_id)
        }
        Command::Playlist(PlaylistCommand::List) => {
            print_json(&context.snapshot().my_words_playlists)?;
            true
        }
        Command::Catalog(CatalogCommand::Domains) => {
            print_json(&services.api.list_domains().await?)?;
            true
        }
        Command::Catalog(CatalogCommand::Subjects { domain }) => {
            print_json(&services.api.list_subjects(&domain).await?)?;
            true
        }
        Command::Catalog(CatalogCommand::Notes { subject }) => {
            print_json(&services.api.list_notes(&subject).await?)?;
            true
        }
    };

    Ok(succeeded)
}
