pub mod auth;
pub mod catalog;
pub mod dashboard;
pub mod enrollments;
pub mod normalizer;
pub mod notice;
pub mod reconciler;

pub use auth::{AuthService, SignupOutcome};
pub use catalog::{EnrollReport, ProgramCatalog, ProgramsService};
pub use dashboard::{AdminRecord, DashboardStats};
pub use normalizer::{normalize_program, normalize_programs};
pub use notice::{NOTICE_TTL, Notice, NoticeBoard, NoticeKind};
pub use reconciler::{EnrollOutcome, EnrollmentReconciler, Reconciliation};
