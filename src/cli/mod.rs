pub mod render;
pub mod shell;

use std::time::Instant;

use clap::Subcommand;
use tracing::warn;

use crate::backend::AdminResource;
use crate::error::AppError;
use crate::models::{AuthMode, ProgramId, SessionContext, SignupForm, ViewTree};
use crate::services::catalog::{NO_PROGRAMS_MESSAGE, NOT_LOGGED_IN_MESSAGE};
use crate::services::{NoticeBoard, dashboard, enrollments};
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// Sign in and remember the user id
    Login {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: String,
    },
    /// Create an account
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "user")]
        role: String,
    },
    /// Switch between the login and signup forms
    Switch,
    /// Forget the stored user id
    Logout,
    /// Show the stored user id
    Whoami,
    /// List active programs
    Programs {
        /// Reload from the backend even if programs are already loaded
        #[arg(long)]
        refresh: bool,
    },
    /// Enroll the stored user in a program
    Enroll { program_id: String },
    /// List the stored user's enrollments
    Enrollments,
    /// Admin dashboard counts
    Stats,
    /// Admin: list users
    Users,
    /// Admin: list every training program
    Trainings,
    /// Admin: list allocations
    Allocations,
    /// Admin: look up, save or delete single records
    #[command(subcommand)]
    Manage(ManageCommand),
    /// Interactive session
    Shell,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum ManageCommand {
    /// Show one record
    Show {
        #[arg(value_enum)]
        resource: AdminResource,
        id: String,
    },
    /// Create or update a record from a JSON object
    Save {
        #[arg(value_enum)]
        resource: AdminResource,
        #[arg(long)]
        json: String,
    },
    /// Delete one record
    Delete {
        #[arg(value_enum)]
        resource: AdminResource,
        id: String,
    },
}

impl Command {
    /// Whether the command belongs to the given view tree.
    pub fn allowed_in(&self, view: ViewTree) -> bool {
        match self {
            Command::Login { .. } => view == ViewTree::Login(AuthMode::Login),
            Command::Signup { .. } => view == ViewTree::Login(AuthMode::Signup),
            Command::Switch => matches!(view, ViewTree::Login(_)),
            Command::Logout | Command::Whoami => !matches!(view, ViewTree::Login(_)),
            Command::Programs { .. } | Command::Enroll { .. } | Command::Enrollments => {
                view == ViewTree::User
            }
            Command::Stats
            | Command::Users
            | Command::Trainings
            | Command::Allocations
            | Command::Manage(_) => view == ViewTree::Admin,
            Command::Shell => false,
        }
    }
}

/// View state that survives between commands of one session.
#[derive(Debug, Default)]
pub struct ViewState {
    pub session: SessionContext,
    pub mode: AuthMode,
    pub prefill_email: Option<String>,
    pub notices: NoticeBoard,
}

impl ViewState {
    pub fn view(&self) -> ViewTree {
        self.session.view(self.mode)
    }
}

pub async fn run(state: &AppState, command: Command) -> Result<(), AppError> {
    if command == Command::Shell {
        return shell::run(state).await;
    }

    let mut view = ViewState::default();
    let output = execute(state, &mut view, command, true).await?;
    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}

/// Runs one command and returns what to print. With `wait_for_refresh` the
/// background catalog reload started by a successful enrollment is awaited.
pub async fn execute(
    state: &AppState,
    view: &mut ViewState,
    command: Command,
    wait_for_refresh: bool,
) -> Result<String, AppError> {
    match command {
        Command::Login { email, password } => {
            let email = email
                .or_else(|| view.prefill_email.clone())
                .ok_or_else(|| AppError::BadRequest("--email is required".to_string()))?;
            view.session = state.auth.login(&email, &password).await?;
            view.mode = AuthMode::Login;
            view.prefill_email = None;
            Ok(match view.session.user_id() {
                Some(id) => format!("Logged in as user {}", id),
                None => "Logged in".to_string(),
            })
        }
        Command::Signup {
            name,
            email,
            phone,
            password,
            role,
        } => {
            view.mode = AuthMode::Signup;
            let form = SignupForm {
                name,
                email,
                phone,
                password,
                role,
            };
            let outcome = state.auth.signup(&form).await?;
            view.mode = AuthMode::Login;
            view.prefill_email = Some(outcome.email);
            Ok(outcome.message)
        }
        Command::Switch => {
            view.mode = view.mode.toggled();
            Ok(match view.mode {
                AuthMode::Login => "Switched to the login form".to_string(),
                AuthMode::Signup => "Switched to the signup form".to_string(),
            })
        }
        Command::Logout => {
            view.session = state.auth.logout().await?;
            view.mode = AuthMode::Login;
            Ok("Logged out".to_string())
        }
        Command::Whoami => {
            let stored = state.auth.stored_user().await?;
            let id = stored
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_else(|| "not logged in".to_string());
            Ok(match view.session.role() {
                Some(role) => format!("{} ({})", id, role.as_str()),
                None => id,
            })
        }
        Command::Programs { refresh } => {
            let user_id = match state.auth.current_user().await {
                Ok(id) => id,
                Err(AppError::NotLoggedIn) => {
                    return Err(AppError::Rejected(NOT_LOGGED_IN_MESSAGE.to_string()));
                }
                Err(e) => return Err(e),
            };

            let catalog_empty = state.programs.catalog().read().await.is_empty();
            if refresh || catalog_empty {
                let count = state.programs.load(&user_id).await?;
                if count == 0 {
                    return Ok(NO_PROGRAMS_MESSAGE.to_string());
                }
            }

            let mut out = render::active_programs(&state.programs.programs().await);
            if let Some(notice) = view.notices.visible(Instant::now()) {
                out.push_str("\n\n");
                out.push_str(&render::notice(notice));
            }
            Ok(out)
        }
        Command::Enroll { program_id } => {
            let user_id = state.auth.current_user().await?;
            let report = state
                .programs
                .enroll(&user_id, ProgramId::parse(&program_id))
                .await?;
            let out = render::notice(&report.notice);
            view.notices.post(report.notice);

            if let (true, Some(handle)) = (wait_for_refresh, report.refresh) {
                match handle.await {
                    Ok(Ok(_)) => {}
                    Ok(Err(e)) => warn!("catalog refresh failed: {}", e),
                    Err(e) => warn!("catalog refresh task failed: {}", e),
                }
            }
            Ok(out)
        }
        Command::Enrollments => {
            let user_id = state.auth.current_user().await?;
            match enrollments::fetch_enrollments(state.api.as_ref(), &user_id).await {
                Ok(rows) => Ok(render::enrollments(&user_id, &rows)),
                Err(e) => Err(AppError::Rejected(enrollments::failure_message(&e))),
            }
        }
        Command::Stats => {
            let stats = dashboard::fetch_stats(state.api.as_ref()).await?;
            Ok(render::stats(&stats))
        }
        Command::Users => {
            let users = dashboard::list_users(state.api.as_ref()).await?;
            Ok(render::users(&users))
        }
        Command::Trainings => {
            let trainings = dashboard::list_trainings(state.api.as_ref()).await?;
            Ok(render::programs(&trainings))
        }
        Command::Allocations => {
            let rows = dashboard::list_allocations(state.api.as_ref()).await?;
            Ok(render::allocations(&rows))
        }
        Command::Manage(action) => manage(state, action).await,
        Command::Shell => Ok("Already in the shell".to_string()),
    }
}

async fn manage(state: &AppState, action: ManageCommand) -> Result<String, AppError> {
    match action {
        ManageCommand::Show { resource, id } => {
            let record = dashboard::fetch_record(state.api.as_ref(), resource, &id).await?;
            Ok(render::record(&record))
        }
        ManageCommand::Save { resource, json } => {
            let record = serde_json::from_str(&json).map_err(|e| {
                AppError::BadRequest(format!("--json is not valid JSON: {}", e))
            })?;
            let saved = dashboard::save_record(state.api.as_ref(), resource, &record).await?;
            Ok(match saved {
                Some(record) => format!("Saved {}\n{}", resource, render::record(&record)),
                None => format!("Saved {}", resource),
            })
        }
        ManageCommand::Delete { resource, id } => {
            dashboard::delete_record(state.api.as_ref(), resource, &id).await?;
            Ok(format!("Deleted {} {}", resource, id.trim()))
        }
    }
}
