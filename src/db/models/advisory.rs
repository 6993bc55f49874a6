use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::OffsetDateTime;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "advisory_status", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdvisoryStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
    Completed,
}

impl AdvisoryStatus {
    /// Legal edges: PENDING -> APPROVED | REJECTED | CANCELLED,
    /// APPROVED -> COMPLETED. Everything else is terminal.
    pub fn can_transition_to(self, next: AdvisoryStatus) -> bool {
        matches!(
            (self, next),
            (AdvisoryStatus::Pending, AdvisoryStatus::Approved)
                | (AdvisoryStatus::Pending, AdvisoryStatus::Rejected)
                | (AdvisoryStatus::Pending, AdvisoryStatus::Cancelled)
                | (AdvisoryStatus::Approved, AdvisoryStatus::Completed)
        )
    }

    #[allow(unused)]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            AdvisoryStatus::Rejected | AdvisoryStatus::Cancelled | AdvisoryStatus::Completed
        )
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Advisory {
    pub id: Uuid,
    pub programmer_id: Uuid,
    pub external_id: Uuid,
    pub scheduled_at: OffsetDateTime,
    pub status: AdvisoryStatus,
    pub request_comment: Option<String>,
    pub response_message: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewAdvisory {
    pub programmer_id: Uuid,
    pub scheduled_at: OffsetDateTime,
    #[validate(length(max = 2000, message = "Comment is too long"))]
    pub comment: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct AdvisoryAction {
    #[validate(length(max = 2000, message = "Message is too long"))]
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AdvisoryListParams {
    pub status: Option<AdvisoryStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl AdvisoryListParams {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(50).clamp(1, 200)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}
