use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, MemberRole, RecordStatus, ResultEngine, bank_accounts, cards, categories,
    family_members, goals, transactions, user_bank_accounts, user_goals, users,
};

use super::Engine;

impl Engine {
    pub(super) async fn require_user_exists(
        &self,
        db: &DatabaseTransaction,
        username: &str,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(username.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }

    pub(super) async fn family_membership(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<Option<family_members::Model>> {
        family_members::Entity::find()
            .filter(family_members::Column::UserId.eq(user_id.to_string()))
            .one(db)
            .await
            .map_err(Into::into)
    }

    /// Usernames of the other members of `user_id`'s family (empty when the
    /// user has no family).
    pub(super) async fn family_peers(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<Vec<String>> {
        let Some(membership) = self.family_membership(db, user_id).await? else {
            return Ok(Vec::new());
        };
        let rows = family_members::Entity::find()
            .filter(family_members::Column::FamilyId.eq(membership.family_id))
            .filter(family_members::Column::UserId.ne(user_id.to_string()))
            .all(db)
            .await?;
        Ok(rows.into_iter().map(|m| m.user_id).collect())
    }

    pub(super) async fn same_family(
        &self,
        db: &DatabaseTransaction,
        left: &str,
        right: &str,
    ) -> ResultEngine<bool> {
        let Some(a) = self.family_membership(db, left).await? else {
            return Ok(false);
        };
        let Some(b) = self.family_membership(db, right).await? else {
            return Ok(false);
        };
        Ok(a.family_id == b.family_id)
    }

    /// A record owned by `owner` is visible to `viewer` when they are the same
    /// user, or the record is shared and both sit in the same family.
    async fn owned_or_shared(
        &self,
        db: &DatabaseTransaction,
        owner: &str,
        is_shared: bool,
        viewer: &str,
    ) -> ResultEngine<bool> {
        if owner == viewer {
            return Ok(true);
        }
        if !is_shared {
            return Ok(false);
        }
        self.same_family(db, owner, viewer).await
    }

    pub(super) async fn account_link_role(
        &self,
        db: &DatabaseTransaction,
        account_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Option<MemberRole>> {
        let row = user_bank_accounts::Entity::find_by_id((account_id, user_id.to_string()))
            .one(db)
            .await?;
        row.as_ref()
            .map(|m| MemberRole::try_from(m.role.as_str()))
            .transpose()
    }

    pub(super) async fn require_account_read(
        &self,
        db: &DatabaseTransaction,
        account_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<bank_accounts::Model> {
        let model = bank_accounts::Entity::find_by_id(account_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("bank account not exists".to_string()))?;
        if self
            .account_link_role(db, account_id, user_id)
            .await?
            .is_some()
        {
            return Ok(model);
        }
        if self
            .owned_or_shared(db, &model.created_by, model.is_shared, user_id)
            .await?
        {
            return Ok(model);
        }
        Err(EngineError::KeyNotFound("bank account not exists".to_string()))
    }

    pub(super) async fn require_account_owner(
        &self,
        db: &DatabaseTransaction,
        account_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<bank_accounts::Model> {
        let model = self.require_account_read(db, account_id, user_id).await?;
        match self.account_link_role(db, account_id, user_id).await? {
            Some(MemberRole::Owner) => Ok(model),
            _ => Err(EngineError::Forbidden(
                "only the account owner can do this".to_string(),
            )),
        }
    }

    /// The caller must be linked to the account and the account must be
    /// active before a transaction or card may point at it.
    pub(super) async fn require_account_usable(
        &self,
        db: &DatabaseTransaction,
        account_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<bank_accounts::Model> {
        let model = bank_accounts::Entity::find_by_id(account_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("bank account not exists".to_string()))?;
        if self
            .account_link_role(db, account_id, user_id)
            .await?
            .is_none()
        {
            return Err(EngineError::KeyNotFound(
                "bank account not exists".to_string(),
            ));
        }
        if RecordStatus::try_from(model.status.as_str())? != RecordStatus::Active {
            return Err(EngineError::InvalidInput(
                "bank account is archived".to_string(),
            ));
        }
        Ok(model)
    }

    pub(super) async fn require_card_read(
        &self,
        db: &DatabaseTransaction,
        card_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<cards::Model> {
        let model = cards::Entity::find_by_id(card_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("card not exists".to_string()))?;
        if !self
            .owned_or_shared(db, &model.user_id, model.is_shared, user_id)
            .await?
        {
            return Err(EngineError::KeyNotFound("card not exists".to_string()));
        }
        Ok(model)
    }

    pub(super) async fn require_card_owner(
        &self,
        db: &DatabaseTransaction,
        card_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<cards::Model> {
        let model = self.require_card_read(db, card_id, user_id).await?;
        if model.user_id != user_id {
            return Err(EngineError::Forbidden(
                "only the card owner can do this".to_string(),
            ));
        }
        Ok(model)
    }

    pub(super) async fn require_card_usable(
        &self,
        db: &DatabaseTransaction,
        card_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<cards::Model> {
        let model = cards::Entity::find_by_id(card_id)
            .one(db)
            .await?
            .filter(|m| m.user_id == user_id)
            .ok_or_else(|| EngineError::KeyNotFound("card not exists".to_string()))?;
        if RecordStatus::try_from(model.status.as_str())? != RecordStatus::Active {
            return Err(EngineError::InvalidInput("card is archived".to_string()));
        }
        Ok(model)
    }

    pub(super) async fn require_category_visible(
        &self,
        db: &DatabaseTransaction,
        category_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<categories::Model> {
        let model = categories::Entity::find_by_id(category_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))?;
        if model.is_default {
            return Ok(model);
        }
        let Some(owner) = model.user_id.as_deref() else {
            return Err(EngineError::KeyNotFound("category not exists".to_string()));
        };
        if !self
            .owned_or_shared(db, owner, model.is_shared, user_id)
            .await?
        {
            return Err(EngineError::KeyNotFound("category not exists".to_string()));
        }
        Ok(model)
    }

    pub(super) async fn require_category_owner(
        &self,
        db: &DatabaseTransaction,
        category_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<categories::Model> {
        let model = self
            .require_category_visible(db, category_id, user_id)
            .await?;
        if model.is_default {
            return Err(EngineError::Forbidden(
                "default categories cannot be changed".to_string(),
            ));
        }
        if model.user_id.as_deref() != Some(user_id) {
            return Err(EngineError::Forbidden(
                "only the category owner can do this".to_string(),
            ));
        }
        Ok(model)
    }

    pub(super) async fn require_transaction_owner(
        &self,
        db: &DatabaseTransaction,
        transaction_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<transactions::Model> {
        transactions::Entity::find_by_id(transaction_id)
            .one(db)
            .await?
            .filter(|m| m.user_id == user_id)
            .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))
    }

    pub(super) async fn require_goal_read(
        &self,
        db: &DatabaseTransaction,
        goal_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<goals::Model> {
        let model = goals::Entity::find_by_id(goal_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("goal not exists".to_string()))?;
        let linked = user_goals::Entity::find_by_id((goal_id, user_id.to_string()))
            .one(db)
            .await?
            .is_some();
        if linked
            || self
                .owned_or_shared(db, &model.created_by, model.is_shared, user_id)
                .await?
        {
            return Ok(model);
        }
        Err(EngineError::KeyNotFound("goal not exists".to_string()))
    }

    pub(super) async fn require_goal_creator(
        &self,
        db: &DatabaseTransaction,
        goal_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<goals::Model> {
        let model = self.require_goal_read(db, goal_id, user_id).await?;
        if model.created_by != user_id {
            return Err(EngineError::Forbidden(
                "only the goal creator can do this".to_string(),
            ));
        }
        Ok(model)
    }
}
