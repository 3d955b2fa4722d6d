use std::sync::Arc;
use std::time::Instant;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::backend::TrainingApi;
use crate::error::AppError;
use crate::models::{EnrollRequest, Program, ProgramId, ProgramStatus, UserId};
use crate::services::normalizer::normalize_programs;
use crate::services::notice::Notice;
use crate::services::reconciler::{EnrollOutcome, EnrollmentReconciler, Reconciliation};

pub const NO_PROGRAMS_MESSAGE: &str = "No programs available.";
pub const NO_ACTIVE_PROGRAMS_MESSAGE: &str = "No active programs available";
pub const NOT_LOGGED_IN_MESSAGE: &str = "User not logged in. Please log in to view programs.";

/// In-memory program list backing the user-facing views.
#[derive(Debug, Clone, Default)]
pub struct ProgramCatalog {
    programs: Vec<Program>,
}

impl ProgramCatalog {
    pub fn new(programs: Vec<Program>) -> Self {
        Self { programs }
    }

    pub fn replace(&mut self, programs: Vec<Program>) {
        self.programs = programs;
    }

    /// Looks a program up by the id as the user typed it. `7` and `"7"` are the same id.
    pub fn find(&self, raw: &str) -> Option<&Program> {
        let raw = raw.trim();
        self.programs.iter().find(|p| p.id.to_string() == raw)
    }

    /// The catalog's own id for `id`, or `id` itself when nothing matches.
    pub fn resolve(&self, id: &ProgramId) -> ProgramId {
        self.find(&id.to_string())
            .map(|p| p.id.clone())
            .unwrap_or_else(|| id.clone())
    }

    /// Returns whether any program carried this id.
    pub fn mark_enrolled(&mut self, id: &ProgramId) -> bool {
        let wanted = id.to_string();
        let mut found = false;
        for program in self
            .programs
            .iter_mut()
            .filter(|p| p.id.to_string() == wanted)
        {
            program.status = ProgramStatus::Enrolled;
            found = true;
        }
        found
    }

    pub fn all(&self) -> &[Program] {
        &self.programs
    }

    pub fn active(&self) -> impl Iterator<Item = &Program> {
        self.programs.iter().filter(|p| p.is_active())
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}

#[derive(Debug)]
pub struct EnrollReport {
    pub reconciliation: Reconciliation,
    pub notice: Notice,
    /// Background reload started after a successful enrollment.
    pub refresh: Option<JoinHandle<Result<usize, AppError>>>,
}

#[derive(Clone)]
pub struct ProgramsService {
    api: Arc<dyn TrainingApi>,
    reconciler: EnrollmentReconciler,
    catalog: Arc<RwLock<ProgramCatalog>>,
    fallback_to_all_trainings: bool,
}

impl ProgramsService {
    pub fn new(api: Arc<dyn TrainingApi>, fallback_to_all_trainings: bool) -> Self {
        Self {
            reconciler: EnrollmentReconciler::new(api.clone()),
            api,
            catalog: Arc::new(RwLock::new(ProgramCatalog::default())),
            fallback_to_all_trainings,
        }
    }

    pub fn catalog(&self) -> Arc<RwLock<ProgramCatalog>> {
        self.catalog.clone()
    }

    /// Reloads the catalog and returns how many programs it now holds.
    ///
    /// A failed per-user request counts as an empty answer. Only when every
    /// request failed is the previous catalog kept and the last error returned.
    pub async fn load(&self, user_id: &UserId) -> Result<usize, AppError> {
        let mut last_error = None;
        let mut answered = false;
        let mut programs = Vec::new();

        match self.api.available_programs(user_id).await {
            Ok(body) => {
                answered = true;
                programs = normalize_programs(Some(&body));
            }
            Err(e) => {
                warn!("available-programs request failed: {}", e);
                last_error = Some(e);
            }
        }

        if programs.is_empty() && self.fallback_to_all_trainings {
            match self.api.list_trainings().await {
                Ok(body) => {
                    answered = true;
                    programs = normalize_programs(Some(&body));
                }
                Err(e) => {
                    warn!("fallback training list request failed: {}", e);
                    last_error = Some(e);
                }
            }
        }

        if !answered {
            if let Some(err) = last_error {
                return Err(err);
            }
        }

        let count = programs.len();
        self.catalog.write().await.replace(programs);
        info!("loaded {} programs for user {}", count, user_id);
        Ok(count)
    }

    pub async fn programs(&self) -> Vec<Program> {
        self.catalog.read().await.all().to_vec()
    }

    pub async fn active_programs(&self) -> Vec<Program> {
        self.catalog.read().await.active().cloned().collect()
    }

    pub async fn enroll(
        &self,
        user_id: &UserId,
        program_id: ProgramId,
    ) -> Result<EnrollReport, AppError> {
        let program_id = self.catalog.read().await.resolve(&program_id);
        let request = EnrollRequest::new(user_id.clone(), program_id)?;
        let reconciliation = self.reconciler.reconcile(&request).await;

        if reconciliation.outcome.marks_enrolled() {
            self.catalog
                .write()
                .await
                .mark_enrolled(request.program_id());
        }

        let refresh = match reconciliation.outcome {
            EnrollOutcome::Success(_) => Some(self.spawn_refresh(user_id.clone())),
            _ => None,
        };

        Ok(EnrollReport {
            notice: Notice::for_outcome(&reconciliation.outcome, Instant::now()),
            reconciliation,
            refresh,
        })
    }

    // The reload may land before the backend commits the enrollment and
    // overwrite the local ENROLLED patch with a stale ACTIVE row.
    fn spawn_refresh(&self, user_id: UserId) -> JoinHandle<Result<usize, AppError>> {
        let service = self.clone();
        tokio::spawn(async move {
            let result = service.load(&user_id).await;
            if let Err(e) = &result {
                warn!("background catalog refresh failed: {}", e);
            }
            result
        })
    }
}
