use chrono::Utc;
use sea_orm::{
    ActiveValue, Condition, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder,
    TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    EngineError, Family, FamilyInvitation, FamilyMember, InvitationAction, InvitationStatus,
    MemberRole, ResultEngine, families, family_invitations, family_invitations::invitation_expiry,
    family_members, users,
};

use super::{Engine, normalize_required_name, with_tx};

enum InvitationOutcome {
    Settled(FamilyInvitation),
    Expired,
}

impl Engine {
    async fn load_family(
        &self,
        db: &DatabaseTransaction,
        model: families::Model,
    ) -> ResultEngine<Family> {
        let rows = family_members::Entity::find()
            .filter(family_members::Column::FamilyId.eq(model.id))
            .order_by_asc(family_members::Column::JoinedAt)
            .find_also_related(users::Entity)
            .all(db)
            .await?;
        let members = rows
            .into_iter()
            .map(|(member, user)| {
                Ok(FamilyMember {
                    id: member.id,
                    role: member.role()?,
                    display_name: user
                        .map(|u| u.display_name)
                        .unwrap_or_else(|| member.user_id.clone()),
                    user_id: member.user_id,
                    joined_at: member.joined_at,
                })
            })
            .collect::<ResultEngine<Vec<_>>>()?;
        Ok(Family {
            id: model.id,
            name: model.name,
            created_by: model.created_by,
            created_at: model.created_at,
            members,
        })
    }

    async fn require_membership(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<family_members::Model> {
        self.family_membership(db, user_id)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("family not exists".to_string()))
    }

    async fn require_family_owner(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<family_members::Model> {
        let membership = self.require_membership(db, user_id).await?;
        if membership.role()? != MemberRole::Owner {
            return Err(EngineError::Forbidden(
                "only the family owner can do this".to_string(),
            ));
        }
        Ok(membership)
    }

    async fn family_name(&self, db: &DatabaseTransaction, family_id: Uuid) -> ResultEngine<String> {
        families::Entity::find_by_id(family_id)
            .one(db)
            .await?
            .map(|f| f.name)
            .ok_or_else(|| EngineError::KeyNotFound("family not exists".to_string()))
    }

    /// Drop a family with its invitations and membership rows.
    async fn disband(&self, db: &DatabaseTransaction, family_id: Uuid) -> ResultEngine<()> {
        family_invitations::Entity::delete_many()
            .filter(family_invitations::Column::FamilyId.eq(family_id))
            .exec(db)
            .await?;
        family_members::Entity::delete_many()
            .filter(family_members::Column::FamilyId.eq(family_id))
            .exec(db)
            .await?;
        families::Entity::delete_by_id(family_id).exec(db).await?;
        Ok(())
    }

    async fn insert_member(
        &self,
        db: &DatabaseTransaction,
        family_id: Uuid,
        user_id: &str,
        role: MemberRole,
    ) -> ResultEngine<()> {
        family_members::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            family_id: ActiveValue::Set(family_id),
            user_id: ActiveValue::Set(user_id.to_string()),
            role: ActiveValue::Set(role.as_str().to_string()),
            joined_at: ActiveValue::Set(Utc::now()),
        }
        .insert(db)
        .await?;
        Ok(())
    }

    /// Create a family with the caller as `OWNER`.
    ///
    /// A user belongs to at most one family.
    pub async fn create_family(&self, user_id: &str, name: &str) -> ResultEngine<Family> {
        let name = normalize_required_name(name, "family")?;
        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, user_id).await?;
            if self.family_membership(&db_tx, user_id).await?.is_some() {
                return Err(EngineError::ExistingKey(
                    "user already belongs to a family".to_string(),
                ));
            }

            let model = families::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                name: ActiveValue::Set(name),
                created_by: ActiveValue::Set(user_id.to_string()),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;
            self.insert_member(&db_tx, model.id, user_id, MemberRole::Owner)
                .await?;
            tracing::info!(family_id = %model.id, user_id, "family created");
            self.load_family(&db_tx, model).await
        })
    }

    /// The caller's family with its members.
    pub async fn family(&self, user_id: &str) -> ResultEngine<Family> {
        with_tx!(self, |db_tx| {
            let membership = self.require_membership(&db_tx, user_id).await?;
            let model = families::Entity::find_by_id(membership.family_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("family not exists".to_string()))?;
            self.load_family(&db_tx, model).await
        })
    }

    /// Disband the caller's family. Only a sole-member `OWNER` may do it;
    /// invitations and the membership row go with it.
    pub async fn delete_family(&self, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let membership = self.require_family_owner(&db_tx, user_id).await?;
            let family_id = membership.family_id;
            let members = family_members::Entity::find()
                .filter(family_members::Column::FamilyId.eq(family_id))
                .count(&db_tx)
                .await?;
            if members > 1 {
                return Err(EngineError::Forbidden(
                    "remove the other members before deleting the family".to_string(),
                ));
            }

            self.disband(&db_tx, family_id).await?;
            tracing::info!(%family_id, user_id, "family deleted");
            Ok(())
        })
    }

    /// Leave the caller's family. An `OWNER` with other members cannot leave;
    /// a sole-member `OWNER` leaving disbands the family.
    pub async fn leave_family(&self, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let membership = self.require_membership(&db_tx, user_id).await?;
            let family_id = membership.family_id;
            if membership.role()? == MemberRole::Owner {
                let members = family_members::Entity::find()
                    .filter(family_members::Column::FamilyId.eq(family_id))
                    .count(&db_tx)
                    .await?;
                if members > 1 {
                    return Err(EngineError::Forbidden(
                        "the owner cannot leave while other members remain".to_string(),
                    ));
                }
                self.disband(&db_tx, family_id).await?;
                tracing::info!(%family_id, user_id, "owner left, family disbanded");
            } else {
                family_members::Entity::delete_by_id(membership.id)
                    .exec(&db_tx)
                    .await?;
                tracing::info!(%family_id, user_id, "left family");
            }
            Ok(())
        })
    }

    /// Remove `member_id` from the caller's family. Authorization: family owner.
    pub async fn remove_member(&self, owner_id: &str, member_id: &str) -> ResultEngine<()> {
        if owner_id == member_id {
            return Err(EngineError::InvalidInput(
                "the owner cannot remove themselves".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            let owner = self.require_family_owner(&db_tx, owner_id).await?;
            let removed = family_members::Entity::delete_many()
                .filter(family_members::Column::FamilyId.eq(owner.family_id))
                .filter(family_members::Column::UserId.eq(member_id.to_string()))
                .exec(&db_tx)
                .await?
                .rows_affected;
            if removed == 0 {
                return Err(EngineError::KeyNotFound("member not exists".to_string()));
            }
            tracing::info!(family_id = %owner.family_id, member_id, "member removed");
            Ok(())
        })
    }

    /// Invite `invitee` to the caller's family. Authorization: family owner.
    ///
    /// A previous invitation for the same pair is replaced when it was
    /// rejected, has expired, or was accepted by someone who has since left.
    pub async fn invite(&self, owner_id: &str, invitee: &str) -> ResultEngine<FamilyInvitation> {
        let invitee = invitee.trim();
        if invitee == owner_id {
            return Err(EngineError::InvalidInput(
                "cannot invite yourself".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            let owner = self.require_family_owner(&db_tx, owner_id).await?;
            self.require_user_exists(&db_tx, invitee).await?;
            if let Some(existing) = self.family_membership(&db_tx, invitee).await? {
                let message = if existing.family_id == owner.family_id {
                    "user is already a member of this family"
                } else {
                    "user already belongs to a family"
                };
                return Err(EngineError::ExistingKey(message.to_string()));
            }

            let now = Utc::now();
            let previous = family_invitations::Entity::find()
                .filter(family_invitations::Column::FamilyId.eq(owner.family_id))
                .filter(family_invitations::Column::InvitedUserId.eq(invitee.to_string()))
                .one(&db_tx)
                .await?;
            if let Some(previous) = previous {
                let status = InvitationStatus::try_from(previous.status.as_str())?;
                if status == InvitationStatus::Pending && previous.expires_at > now {
                    return Err(EngineError::ExistingKey(
                        "a pending invitation already exists".to_string(),
                    ));
                }
                family_invitations::Entity::delete_by_id(previous.id)
                    .exec(&db_tx)
                    .await?;
            }

            let model = family_invitations::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                family_id: ActiveValue::Set(owner.family_id),
                invited_user_id: ActiveValue::Set(invitee.to_string()),
                invited_by: ActiveValue::Set(owner_id.to_string()),
                status: ActiveValue::Set(InvitationStatus::Pending.as_str().to_string()),
                created_at: ActiveValue::Set(now),
                expires_at: ActiveValue::Set(invitation_expiry(now)),
            }
            .insert(&db_tx)
            .await?;
            tracing::info!(
                family_id = %owner.family_id,
                invitee,
                invitation_id = %model.id,
                "invitation sent"
            );
            let family_name = self.family_name(&db_tx, owner.family_id).await?;
            FamilyInvitation::try_from((model, family_name))
        })
    }

    /// Invitations addressed to the caller, plus the ones the caller's family
    /// sent when the caller is its owner. Newest first.
    pub async fn invitations(&self, user_id: &str) -> ResultEngine<Vec<FamilyInvitation>> {
        with_tx!(self, |db_tx| {
            let mut condition = Condition::any()
                .add(family_invitations::Column::InvitedUserId.eq(user_id.to_string()));
            if let Some(membership) = self.family_membership(&db_tx, user_id).await?
                && membership.role()? == MemberRole::Owner
            {
                condition =
                    condition.add(family_invitations::Column::FamilyId.eq(membership.family_id));
            }
            let rows = family_invitations::Entity::find()
                .filter(condition)
                .order_by_desc(family_invitations::Column::CreatedAt)
                .find_also_related(families::Entity)
                .all(&db_tx)
                .await?;
            rows.into_iter()
                .map(|(model, family)| {
                    let name = family.map(|f| f.name).unwrap_or_default();
                    FamilyInvitation::try_from((model, name))
                })
                .collect()
        })
    }

    /// Accept or reject an invitation addressed to the caller.
    ///
    /// A pending invitation past its deadline is stored as `REJECTED` and the
    /// call fails with `InvitationExpired`. Accepting adds the caller as
    /// `MEMBER`, provided they are in no family yet.
    pub async fn respond_to_invitation(
        &self,
        invitation_id: Uuid,
        user_id: &str,
        action: InvitationAction,
    ) -> ResultEngine<FamilyInvitation> {
        let outcome = with_tx!(self, |db_tx| {
            let model = family_invitations::Entity::find_by_id(invitation_id)
                .one(&db_tx)
                .await?
                .filter(|inv| inv.invited_user_id == user_id)
                .ok_or_else(|| EngineError::KeyNotFound("invitation not exists".to_string()))?;
            let family_name = self.family_name(&db_tx, model.family_id).await?;
            let invitation = FamilyInvitation::try_from((model.clone(), family_name.clone()))?;
            if invitation.status != InvitationStatus::Pending {
                return Err(EngineError::InvalidInput(format!(
                    "invitation is already {}",
                    invitation.status.as_str().to_lowercase()
                )));
            }

            let expired = invitation.is_expired(Utc::now());
            let next_status = match (expired, action) {
                (true, _) | (false, InvitationAction::Reject) => InvitationStatus::Rejected,
                (false, InvitationAction::Accept) => InvitationStatus::Accepted,
            };
            if next_status == InvitationStatus::Accepted {
                let members = family_members::Entity::find()
                    .filter(family_members::Column::FamilyId.eq(model.family_id))
                    .count(&db_tx)
                    .await?;
                if members == 0 {
                    return Err(EngineError::KeyNotFound("family not exists".to_string()));
                }
                if self.family_membership(&db_tx, user_id).await?.is_some() {
                    return Err(EngineError::ExistingKey(
                        "user already belongs to a family".to_string(),
                    ));
                }
                self.insert_member(&db_tx, model.family_id, user_id, MemberRole::Member)
                    .await?;
            }

            let mut active: family_invitations::ActiveModel = model.into();
            active.status = ActiveValue::Set(next_status.as_str().to_string());
            let model = active.update(&db_tx).await?;
            tracing::info!(
                %invitation_id,
                user_id,
                status = next_status.as_str(),
                expired,
                "invitation answered"
            );

            if expired {
                Ok(InvitationOutcome::Expired)
            } else {
                FamilyInvitation::try_from((model, family_name)).map(InvitationOutcome::Settled)
            }
        })?;

        match outcome {
            InvitationOutcome::Settled(invitation) => Ok(invitation),
            InvitationOutcome::Expired => Err(EngineError::InvitationExpired(format!(
                "invitation {invitation_id} has expired"
            ))),
        }
    }
}
