use std::sync::Arc;

use reqwest::StatusCode;
use tracing::{debug, info, warn};

use crate::backend::dto::ApiMessage;
use crate::backend::{EnrollShape, TrainingApi};
use crate::error::AppError;
use crate::models::EnrollRequest;

pub const DEFAULT_SUCCESS_MESSAGE: &str = "Enrolled successfully";
pub const DEFAULT_FAILURE_MESSAGE: &str = "Failed to enroll";
pub const ALREADY_ENROLLED_MESSAGE: &str = "Already enrolled";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrollOutcome {
    Success(String),
    AlreadyEnrolled,
    ValidationError(String),
    /// Carries the text to show; the underlying error is only logged.
    TransportError(String),
}

impl EnrollOutcome {
    /// Outcomes after which the program counts as enrolled locally.
    pub fn marks_enrolled(&self) -> bool {
        matches!(self, EnrollOutcome::Success(_) | EnrollOutcome::AlreadyEnrolled)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub outcome: EnrollOutcome,
    /// The shape whose answer was taken as final.
    pub resolved_by: EnrollShape,
}

struct Attempt {
    shape: EnrollShape,
    is_mismatch: fn(&AppError) -> bool,
}

static CHAIN: [Attempt; 3] = [
    Attempt {
        shape: EnrollShape::Body,
        is_mismatch: is_shape_mismatch,
    },
    Attempt {
        shape: EnrollShape::Path,
        is_mismatch: is_shape_mismatch,
    },
    Attempt {
        shape: EnrollShape::LegacyAllocation,
        is_mismatch: never,
    },
];

enum Step {
    Trying(usize),
    Done(Reconciliation),
}

/// 404 and 405 mean "this variant does not exist here", not "you may not enroll".
pub fn is_shape_mismatch(err: &AppError) -> bool {
    matches!(
        err,
        AppError::Status { status, .. }
            if *status == StatusCode::NOT_FOUND || *status == StatusCode::METHOD_NOT_ALLOWED
    )
}

fn never(_: &AppError) -> bool {
    false
}

pub fn is_already_enrolled(message: &str) -> bool {
    message.trim().eq_ignore_ascii_case(ALREADY_ENROLLED_MESSAGE)
}

/// Walks the enrollment call shapes in order until one gives a definitive answer.
#[derive(Clone)]
pub struct EnrollmentReconciler {
    api: Arc<dyn TrainingApi>,
}

impl EnrollmentReconciler {
    pub fn new(api: Arc<dyn TrainingApi>) -> Self {
        Self { api }
    }

    pub async fn reconcile(&self, request: &EnrollRequest) -> Reconciliation {
        let mut step = Step::Trying(0);

        loop {
            step = match step {
                Step::Done(reconciliation) => {
                    info!(
                        "enrollment of user {} in program {} resolved by {}: {:?}",
                        request.user_id(),
                        request.program_id(),
                        reconciliation.resolved_by,
                        reconciliation.outcome
                    );
                    return reconciliation;
                }
                Step::Trying(index) => {
                    let Some(attempt) = CHAIN.get(index) else {
                        // The last attempt never reports a mismatch, so this is unreachable.
                        return Reconciliation {
                            outcome: EnrollOutcome::TransportError(
                                DEFAULT_FAILURE_MESSAGE.to_string(),
                            ),
                            resolved_by: EnrollShape::LegacyAllocation,
                        };
                    };

                    debug!("trying {} for program {}", attempt.shape, request.program_id());
                    match self.api.enroll(attempt.shape, request).await {
                        Err(err) if (attempt.is_mismatch)(&err) => {
                            debug!("{} not accepted ({}), trying next shape", attempt.shape, err);
                            Step::Trying(index + 1)
                        }
                        result => Step::Done(Reconciliation {
                            outcome: classify(result),
                            resolved_by: attempt.shape,
                        }),
                    }
                }
            };
        }
    }
}

fn classify(result: Result<ApiMessage, AppError>) -> EnrollOutcome {
    match result {
        Ok(reply) if reply.success == Some(false) => {
            let message = reply
                .message
                .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string());
            rejection(message)
        }
        Ok(reply) => EnrollOutcome::Success(
            reply
                .message
                .unwrap_or_else(|| DEFAULT_SUCCESS_MESSAGE.to_string()),
        ),
        Err(AppError::Status {
            status,
            message: Some(message),
        }) if status.is_client_error() => rejection(message),
        Err(err) => {
            warn!("enrollment failed: {}", err);
            EnrollOutcome::TransportError(
                err.backend_message()
                    .unwrap_or(DEFAULT_FAILURE_MESSAGE)
                    .to_string(),
            )
        }
    }
}

fn rejection(message: String) -> EnrollOutcome {
    if is_already_enrolled(&message) {
        EnrollOutcome::AlreadyEnrolled
    } else {
        EnrollOutcome::ValidationError(message)
    }
}
