//! Family, invitation and sharing endpoints.

use api_types::{
    Message,
    family::{
        FamilyMemberView, FamilyNew, FamilyView, InvitationAction as ApiAction, InvitationNew,
        InvitationResponse, InvitationStatus as ApiStatus, InvitationView, MemberRole as ApiRole,
        MemberSharedDataView, ShareRequest, ShareType,
    },
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{
    Family, FamilyInvitation, InvitationAction, InvitationStatus, MemberRole, ShareTarget, User,
};
use uuid::Uuid;

use crate::{ServerError, bank_accounts, cards, categories, goals, server::ServerState, transactions};

fn view(family: Family) -> FamilyView {
    FamilyView {
        id: family.id,
        name: family.name,
        created_by: family.created_by,
        created_at: family.created_at,
        members: family
            .members
            .into_iter()
            .map(|m| FamilyMemberView {
                user_id: m.user_id,
                display_name: m.display_name,
                role: match m.role {
                    MemberRole::Owner => ApiRole::Owner,
                    MemberRole::Member => ApiRole::Member,
                },
                joined_at: m.joined_at,
            })
            .collect(),
    }
}

fn invitation_view(invitation: FamilyInvitation) -> InvitationView {
    InvitationView {
        id: invitation.id,
        family_id: invitation.family_id,
        family_name: invitation.family_name,
        invited_user_id: invitation.invited_user_id,
        invited_by: invitation.invited_by,
        status: match invitation.status {
            InvitationStatus::Pending => ApiStatus::Pending,
            InvitationStatus::Accepted => ApiStatus::Accepted,
            InvitationStatus::Rejected => ApiStatus::Rejected,
        },
        created_at: invitation.created_at,
        expires_at: invitation.expires_at,
    }
}

fn share_target(kind: ShareType) -> ShareTarget {
    match kind {
        ShareType::BankAccount => ShareTarget::BankAccount,
        ShareType::Card => ShareTarget::Card,
        ShareType::Category => ShareTarget::Category,
        ShareType::Goal => ShareTarget::Goal,
        ShareType::Transaction => ShareTarget::Transaction,
    }
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<FamilyView>, ServerError> {
    let family = state.engine.family(&user.username).await?;
    Ok(Json(view(family)))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<FamilyNew>,
) -> Result<(StatusCode, Json<FamilyView>), ServerError> {
    let family = state
        .engine
        .create_family(&user.username, &payload.name)
        .await?;
    Ok((StatusCode::CREATED, Json(view(family))))
}

/// Disband the caller's family. Only allowed for a sole-member owner.
pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Message>, ServerError> {
    state.engine.delete_family(&user.username).await?;
    Ok(Json(Message::new("family deleted")))
}

pub async fn leave(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Message>, ServerError> {
    state.engine.leave_family(&user.username).await?;
    Ok(Json(Message::new("left family")))
}

pub async fn remove_member(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(username): Path<String>,
) -> Result<Json<Message>, ServerError> {
    state
        .engine
        .remove_member(&user.username, &username)
        .await?;
    Ok(Json(Message::new(format!("{username} removed"))))
}

pub async fn invitations(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<InvitationView>>, ServerError> {
    let invitations = state.engine.invitations(&user.username).await?;
    Ok(Json(invitations.into_iter().map(invitation_view).collect()))
}

pub async fn invite(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<InvitationNew>,
) -> Result<(StatusCode, Json<InvitationView>), ServerError> {
    let invitation = state
        .engine
        .invite(&user.username, &payload.username)
        .await?;
    Ok((StatusCode::CREATED, Json(invitation_view(invitation))))
}

pub async fn respond(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<InvitationResponse>,
) -> Result<Json<InvitationView>, ServerError> {
    let action = match payload.action {
        ApiAction::Accept => InvitationAction::Accept,
        ApiAction::Reject => InvitationAction::Reject,
    };
    let invitation = state
        .engine
        .respond_to_invitation(id, &user.username, action)
        .await?;
    Ok(Json(invitation_view(invitation)))
}

/// Everything `username` shares with the caller's family.
pub async fn member_data(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(username): Path<String>,
) -> Result<Json<MemberSharedDataView>, ServerError> {
    let data = state
        .engine
        .member_shared_data(&user.username, &username)
        .await?;
    Ok(Json(MemberSharedDataView {
        bank_accounts: data.bank_accounts.into_iter().map(bank_accounts::view).collect(),
        cards: data.cards.into_iter().map(cards::view).collect(),
        categories: data.categories.into_iter().map(categories::view).collect(),
        goals: data.goals.into_iter().map(goals::view).collect(),
        transactions: data.transactions.into_iter().map(transactions::view).collect(),
    }))
}

pub async fn share(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<ShareRequest>,
) -> Result<Json<Message>, ServerError> {
    state
        .engine
        .set_shared(
            &user.username,
            share_target(payload.kind),
            payload.item_id,
            payload.shared,
        )
        .await?;
    let verb = if payload.shared { "shared" } else { "unshared" };
    Ok(Json(Message::new(format!("item {verb}"))))
}
