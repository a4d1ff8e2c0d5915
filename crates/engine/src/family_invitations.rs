//! Family invitations and their `PENDING -> ACCEPTED | REJECTED` lifecycle.

use chrono::{DateTime, Duration, Utc};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::EngineError;

/// How long an invitation stays actionable.
pub const INVITATION_TTL_DAYS: i64 = 30;

pub(crate) fn invitation_expiry(created_at: DateTime<Utc>) -> DateTime<Utc> {
    created_at + Duration::days(INVITATION_TTL_DAYS)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl InvitationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Accepted => "ACCEPTED",
            Self::Rejected => "REJECTED",
        }
    }
}

impl TryFrom<&str> for InvitationStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "PENDING" => Ok(Self::Pending),
            "ACCEPTED" => Ok(Self::Accepted),
            "REJECTED" => Ok(Self::Rejected),
            other => Err(EngineError::InvalidInput(format!(
                "invalid invitation status: {other}"
            ))),
        }
    }
}

/// What the invitee does with a pending invitation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvitationAction {
    Accept,
    Reject,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FamilyInvitation {
    pub id: Uuid,
    pub family_id: Uuid,
    pub family_name: String,
    pub invited_user_id: String,
    pub invited_by: String,
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl FamilyInvitation {
    /// Pending and already past its deadline. Persisted status is only
    /// rewritten when someone acts on the invitation.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == InvitationStatus::Pending && self.expires_at <= now
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "family_invitations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub family_id: Uuid,
    pub invited_user_id: String,
    pub invited_by: String,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub expires_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::families::Entity",
        from = "Column::FamilyId",
        to = "super::families::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Families,
}

impl Related<super::families::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Families.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<(Model, String)> for FamilyInvitation {
    type Error = EngineError;

    fn try_from((model, family_name): (Model, String)) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            family_id: model.family_id,
            family_name,
            invited_user_id: model.invited_user_id,
            invited_by: model.invited_by,
            status: InvitationStatus::try_from(model.status.as_str())?,
            created_at: model.created_at,
            expires_at: model.expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn expiry_is_thirty_days_after_creation() {
        let created = Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap();
        assert_eq!(
            invitation_expiry(created),
            Utc.with_ymd_and_hms(2025, 1, 31, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn only_pending_invitations_expire() {
        let created = Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap();
        let mut invitation = FamilyInvitation {
            id: Uuid::new_v4(),
            family_id: Uuid::new_v4(),
            family_name: "Rossi".to_string(),
            invited_user_id: "bob".to_string(),
            invited_by: "alice".to_string(),
            status: InvitationStatus::Pending,
            created_at: created,
            expires_at: invitation_expiry(created),
        };
        let later = created + Duration::days(31);
        assert!(invitation.is_expired(later));
        assert!(!invitation.is_expired(created + Duration::days(29)));

        invitation.status = InvitationStatus::Accepted;
        assert!(!invitation.is_expired(later));
    }
}
