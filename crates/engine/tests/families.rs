mod common;

use chrono::{Duration, Utc};
use sea_orm::{ConnectionTrait, Statement};

use common::{engine_with_db, family_of_alice_and_bob};
use engine::{EngineError, InvitationAction, InvitationStatus, MemberRole};

#[tokio::test]
async fn create_family_makes_the_creator_owner() {
    let (engine, _db) = engine_with_db().await;
    let family = engine.create_family("alice", "Rossi").await.unwrap();

    assert_eq!(family.name, "Rossi");
    assert_eq!(family.members.len(), 1);
    assert_eq!(family.members[0].user_id, "alice");
    assert_eq!(family.members[0].display_name, "ALICE");
    assert_eq!(family.members[0].role, MemberRole::Owner);

    let err = engine.create_family("alice", "Again").await.unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));
}

#[tokio::test]
async fn accepted_invitation_adds_a_member() {
    let (engine, _db) = engine_with_db().await;
    family_of_alice_and_bob(&engine).await;

    let family = engine.family("bob").await.unwrap();
    let bob = family
        .members
        .iter()
        .find(|m| m.user_id == "bob")
        .unwrap();
    assert_eq!(bob.role, MemberRole::Member);

    let invitations = engine.invitations("alice").await.unwrap();
    assert_eq!(invitations.len(), 1);
    assert_eq!(invitations[0].status, InvitationStatus::Accepted);
    assert_eq!(invitations[0].family_name, "Rossi");
}

#[tokio::test]
async fn only_the_owner_invites_and_pending_invites_conflict() {
    let (engine, _db) = engine_with_db().await;
    family_of_alice_and_bob(&engine).await;

    let err = engine.invite("bob", "carol").await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    engine.invite("alice", "carol").await.unwrap();
    let err = engine.invite("alice", "carol").await.unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    let err = engine.invite("alice", "bob").await.unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));
}

#[tokio::test]
async fn rejected_invitation_can_be_sent_again() {
    let (engine, _db) = engine_with_db().await;
    engine.create_family("alice", "Rossi").await.unwrap();

    let first = engine.invite("alice", "carol").await.unwrap();
    let rejected = engine
        .respond_to_invitation(first.id, "carol", InvitationAction::Reject)
        .await
        .unwrap();
    assert_eq!(rejected.status, InvitationStatus::Rejected);

    let second = engine.invite("alice", "carol").await.unwrap();
    assert_ne!(second.id, first.id);
    assert_eq!(second.status, InvitationStatus::Pending);
}

#[tokio::test]
async fn expired_invitation_is_rejected_when_acted_on() {
    let (engine, db) = engine_with_db().await;
    engine.create_family("alice", "Rossi").await.unwrap();
    let invitation = engine.invite("alice", "carol").await.unwrap();

    let long_ago = Utc::now() - Duration::days(31);
    db.execute(Statement::from_sql_and_values(
        db.get_database_backend(),
        "UPDATE family_invitations SET created_at = ?, expires_at = ? WHERE id = ?",
        vec![
            long_ago.into(),
            (long_ago + Duration::days(30)).into(),
            invitation.id.into(),
        ],
    ))
    .await
    .unwrap();

    let err = engine
        .respond_to_invitation(invitation.id, "carol", InvitationAction::Accept)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvitationExpired(_)));

    let stored = engine.invitations("carol").await.unwrap();
    assert_eq!(stored[0].status, InvitationStatus::Rejected);
    assert!(matches!(
        engine.family("carol").await,
        Err(EngineError::KeyNotFound(_))
    ));

    let err = engine
        .respond_to_invitation(invitation.id, "carol", InvitationAction::Accept)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[tokio::test]
async fn accept_fails_when_already_in_a_family() {
    let (engine, _db) = engine_with_db().await;
    engine.create_family("alice", "Rossi").await.unwrap();
    let invitation = engine.invite("alice", "carol").await.unwrap();
    engine.create_family("carol", "Bianchi").await.unwrap();

    let err = engine
        .respond_to_invitation(invitation.id, "carol", InvitationAction::Accept)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    let still_pending = engine.invitations("carol").await.unwrap();
    assert_eq!(still_pending[0].status, InvitationStatus::Pending);
}

#[tokio::test]
async fn invitation_is_answered_only_by_its_invitee() {
    let (engine, _db) = engine_with_db().await;
    engine.create_family("alice", "Rossi").await.unwrap();
    let invitation = engine.invite("alice", "carol").await.unwrap();

    let err = engine
        .respond_to_invitation(invitation.id, "bob", InvitationAction::Accept)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn owner_cannot_leave_or_disband_while_members_remain() {
    let (engine, _db) = engine_with_db().await;
    family_of_alice_and_bob(&engine).await;

    assert!(matches!(
        engine.leave_family("alice").await,
        Err(EngineError::Forbidden(_))
    ));
    assert!(matches!(
        engine.delete_family("alice").await,
        Err(EngineError::Forbidden(_))
    ));
    assert!(matches!(
        engine.delete_family("bob").await,
        Err(EngineError::Forbidden(_))
    ));

    engine.leave_family("bob").await.unwrap();
    engine.delete_family("alice").await.unwrap();
    assert!(matches!(
        engine.family("alice").await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(engine.invitations("alice").await.unwrap().is_empty());

    engine.create_family("bob", "Fresh start").await.unwrap();
}

#[tokio::test]
async fn owner_removes_a_member_who_can_then_be_reinvited() {
    let (engine, _db) = engine_with_db().await;
    family_of_alice_and_bob(&engine).await;

    assert!(matches!(
        engine.remove_member("bob", "alice").await,
        Err(EngineError::Forbidden(_))
    ));
    engine.remove_member("alice", "bob").await.unwrap();
    assert!(matches!(
        engine.remove_member("alice", "bob").await,
        Err(EngineError::KeyNotFound(_))
    ));

    let again = engine.invite("alice", "bob").await.unwrap();
    assert_eq!(again.status, InvitationStatus::Pending);
}

#[tokio::test]
async fn sole_owner_leaving_disbands_the_family() {
    let (engine, _db) = engine_with_db().await;
    engine.create_family("alice", "Rossi").await.unwrap();
    let invitation = engine.invite("alice", "bob").await.unwrap();

    engine.leave_family("alice").await.unwrap();

    let err = engine
        .respond_to_invitation(invitation.id, "bob", InvitationAction::Accept)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
    assert!(matches!(
        engine.family("alice").await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine.family("bob").await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(engine.invitations("bob").await.unwrap().is_empty());

    engine.create_family("bob", "Bianchi").await.unwrap();
    engine.create_family("alice", "Rossi again").await.unwrap();
}

#[tokio::test]
async fn invitation_into_a_memberless_family_cannot_be_accepted() {
    let (engine, db) = engine_with_db().await;
    let family = engine.create_family("alice", "Rossi").await.unwrap();
    let invitation = engine.invite("alice", "carol").await.unwrap();

    db.execute(Statement::from_sql_and_values(
        db.get_database_backend(),
        "DELETE FROM family_members WHERE family_id = ?",
        vec![family.id.into()],
    ))
    .await
    .unwrap();

    let err = engine
        .respond_to_invitation(invitation.id, "carol", InvitationAction::Accept)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
    assert!(matches!(
        engine.family("carol").await,
        Err(EngineError::KeyNotFound(_))
    ));
}
