//! Subcommands.
//!
//! [`run`] drives one [`ViewingSession`] through a single command: sign in if
//! credentials were given, load what the command needs, act, and render.

use std::io::Write;

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use rollcall_client::{Backend, ViewingSession};
use rollcall_core::{EventDraft, EventId};

use crate::{CliError, render};

/// What to do.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List events with their attendee counts
    Events,

    /// Show one event
    Show {
        /// Event id
        id: String,
    },

    /// List who is attending an event
    Attendees {
        /// Event id
        id: String,
    },

    /// Join an event
    Join {
        /// Event id
        id: String,
    },

    /// Create an event (regular accounts only)
    Create(CreateArgs),

    /// Check credentials and show who you are signed in as
    Login,

    /// Create an account. Sign in with it afterwards.
    Register {
        /// Display name
        #[arg(long)]
        name: String,
        /// Login email
        #[arg(long = "new-email")]
        email: String,
        /// Login password
        #[arg(long = "new-password")]
        password: String,
    },

    /// Sign in, then sign out again
    Logout,

    /// Print live attendance updates until interrupted
    Watch {
        /// Stop after this many updates
        #[arg(long)]
        limit: Option<usize>,
    },
}

/// Fields of a new event.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct CreateArgs {
    /// Title
    #[arg(long)]
    pub title: String,
    /// Calendar date, YYYY-MM-DD
    #[arg(long)]
    pub date: NaiveDate,
    /// Start time, HH:MM
    #[arg(long)]
    pub time: String,
    /// Venue
    #[arg(long)]
    pub location: String,
    /// Category label
    #[arg(long)]
    pub category: String,
    /// Free-form description
    #[arg(long, default_value = "")]
    pub description: String,
    /// Banner image URL
    #[arg(long, default_value = "")]
    pub image_url: String,
    /// Visible to regular accounts only
    #[arg(long)]
    pub members_only: bool,
}

impl From<&CreateArgs> for EventDraft {
    fn from(args: &CreateArgs) -> Self {
        Self {
            title: args.title.clone(),
            description: args.description.clone(),
            date: args.date,
            time: args.time.clone(),
            location: args.location.clone(),
            category: args.category.clone(),
            image_url: args.image_url.clone(),
            is_for_logged_in_only: args.members_only,
        }
    }
}

/// How to sign in before running a command.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Account email
    #[arg(long, global = true, requires = "password", conflicts_with = "guest")]
    pub email: Option<String>,

    /// Account password
    #[arg(long, global = true, env = "ROLLCALL_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Sign in with the shared guest account
    #[arg(long, global = true)]
    pub guest: bool,
}

impl Credentials {
    /// Whether a sign-in was requested.
    pub fn is_given(&self) -> bool {
        self.guest || self.email.is_some()
    }
}

impl Command {
    /// Whether the command reads the push channel.
    pub fn needs_push(&self) -> bool {
        matches!(self, Self::Watch { .. })
    }
}

/// Run `command` on `session`, writing results to `out`.
///
/// # Errors
///
/// Whatever the session reports, plus [`CliError::MissingCredentials`] for
/// `login`/`logout` without credentials.
pub async fn run<B: Backend>(
    session: &mut ViewingSession<B>,
    credentials: &Credentials,
    command: &Command,
    out: &mut impl Write,
) -> Result<(), CliError> {
    if matches!(command, Command::Login | Command::Logout) && !credentials.is_given() {
        return Err(CliError::MissingCredentials);
    }
    sign_in(session, credentials).await?;

    match command {
        Command::Events => {
            session.activate().await?;
            render::events(out, session.engine())?;
        },
        Command::Show { id } => {
            let (event, state) = session.open_event(&EventId::new(id.as_str())).await?;
            render::detail(out, &event, state)?;
        },
        Command::Attendees { id } => {
            let attendees = session.attendees(&EventId::new(id.as_str())).await;
            let names: Vec<String> = attendees.into_iter().map(|a| a.user_name).collect();
            render::attendees(out, &names)?;
        },
        Command::Join { id } => {
            let event_id = EventId::new(id.as_str());
            let count = session.join(&event_id).await?;
            writeln!(out, "joined event {event_id}, {count} attending")?;
        },
        Command::Create(args) => {
            match session.create(&EventDraft::from(args)).await? {
                Some(event) => writeln!(out, "created event {}: {}", event.id, event.title)?,
                None => writeln!(out, "event created; reload the list to see it")?,
            }
        },
        Command::Login => {
            render::session(out, session.session())?;
        },
        Command::Register { name, email, password } => {
            session.register(name, email, password).await?;
            writeln!(out, "account created for {email}; sign in with --email")?;
        },
        Command::Logout => {
            session.logout().await?;
            render::session(out, session.session())?;
        },
        Command::Watch { limit } => {
            session.activate().await?;
            watch(session, *limit, out).await?;
        },
    }

    out.flush()?;
    Ok(())
}

async fn sign_in<B: Backend>(
    session: &mut ViewingSession<B>,
    credentials: &Credentials,
) -> Result<(), CliError> {
    if credentials.guest {
        session.login_as_guest().await?;
    } else if let Some(email) = &credentials.email {
        let password = credentials.password.as_deref().unwrap_or_default();
        session.login(email, password).await?;
    }
    Ok(())
}

async fn watch<B: Backend>(
    session: &mut ViewingSession<B>,
    limit: Option<usize>,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let mut seen = 0;
    while limit.is_none_or(|limit| seen < limit) {
        let update = tokio::select! {
            update = session.next_push() => update,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(update) = update else {
            break;
        };
        render::update(out, &update, session.engine())?;
        out.flush()?;
        seen += 1;
    }
    Ok(())
}
