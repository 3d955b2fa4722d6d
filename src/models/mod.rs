pub mod enrollment;
pub mod program;
pub mod session;
pub mod user;

pub use enrollment::{EnrollRequest, Enrollment};
pub use program::{Program, ProgramId, ProgramStatus};
pub use session::{AuthMode, SessionContext, ViewTree};
pub use user::{Role, SignupForm, UserId, UserSummary};
