//! Integration tests for team membership and the team endpoints.
//!
//! Requires PostgreSQL; see `common` for how to run them.

mod common;

use axum::http::{Method, StatusCode};
use common::{create_test_app, create_test_pool, create_test_user, parse_response_body, request};
use domain::models::{MemberState, UserId};
use persistence::repositories::TeamRepository;
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

// ============================================================================
// Store
// ============================================================================

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_create_team_makes_owner_an_active_member() {
    let pool = create_test_pool().await;
    let repo = TeamRepository::new(pool.clone());
    let owner = create_test_user(&pool, "Owner").await;

    let team_id = repo.create_team("Alpha", &owner).await.unwrap();

    assert!(repo.is_owner(&owner, team_id).await.unwrap());
    assert!(repo.is_member(&owner, team_id, false).await.unwrap());

    let roster = repo.fetch_roster(team_id, false).await.unwrap();
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0].color, "FF0000");
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_added_member_starts_inactive() {
    let pool = create_test_pool().await;
    let repo = TeamRepository::new(pool.clone());
    let owner = create_test_user(&pool, "Owner").await;
    let member = create_test_user(&pool, "Member").await;

    let team_id = repo.create_team("Alpha", &owner).await.unwrap();
    repo.add_member(team_id, &member).await.unwrap();

    assert!(!repo.is_member(&member, team_id, false).await.unwrap());
    assert!(repo.is_member(&member, team_id, true).await.unwrap());
    assert!(!repo.is_owner(&member, team_id).await.unwrap());

    assert_eq!(repo.fetch_roster(team_id, false).await.unwrap().len(), 1);
    assert_eq!(repo.fetch_roster(team_id, true).await.unwrap().len(), 2);

    assert!(repo
        .set_member_state(team_id, &member, MemberState::On)
        .await
        .unwrap());
    assert!(repo.is_member(&member, team_id, false).await.unwrap());
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_delete_team_removes_memberships() {
    let pool = create_test_pool().await;
    let repo = TeamRepository::new(pool.clone());
    let owner = create_test_user(&pool, "Owner").await;
    let member = create_test_user(&pool, "Member").await;

    let team_id = repo.create_team("Alpha", &owner).await.unwrap();
    repo.add_member(team_id, &member).await.unwrap();

    assert!(repo.delete_team(team_id).await.unwrap());

    assert!(!repo.is_member(&owner, team_id, true).await.unwrap());
    assert!(!repo.is_member(&member, team_id, true).await.unwrap());
    assert!(!repo.is_owner(&owner, team_id).await.unwrap());
    assert!(!repo.delete_team(team_id).await.unwrap());
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_unknown_team_has_no_owner() {
    let pool = create_test_pool().await;
    let repo = TeamRepository::new(pool.clone());
    let user = create_test_user(&pool, "Someone").await;

    assert!(!repo.is_owner(&user, Uuid::new_v4()).await.unwrap());
    assert!(!repo.is_member(&user, Uuid::new_v4(), true).await.unwrap());
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_remove_member() {
    let pool = create_test_pool().await;
    let repo = TeamRepository::new(pool.clone());
    let owner = create_test_user(&pool, "Owner").await;
    let member = create_test_user(&pool, "Member").await;

    let team_id = repo.create_team("Alpha", &owner).await.unwrap();
    repo.add_member(team_id, &member).await.unwrap();

    assert!(repo.remove_member(team_id, &member).await.unwrap());
    assert!(!repo.remove_member(team_id, &member).await.unwrap());
    assert!(!repo.is_member(&member, team_id, true).await.unwrap());
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_update_member_changes_state_and_color_together() {
    let pool = create_test_pool().await;
    let repo = TeamRepository::new(pool.clone());
    let owner = create_test_user(&pool, "Owner").await;
    let member = create_test_user(&pool, "Member").await;
    let outsider = create_test_user(&pool, "Outsider").await;

    let team_id = repo.create_team("Alpha", &owner).await.unwrap();
    repo.add_member(team_id, &member).await.unwrap();

    assert!(repo
        .update_member(team_id, &member, Some(MemberState::On), Some("00FF00"))
        .await
        .unwrap());

    let roster = repo.fetch_roster(team_id, false).await.unwrap();
    let entry = roster.iter().find(|e| e.user_id == member.as_str()).unwrap();
    assert_eq!(entry.color, "00FF00");

    // Color only; the state stays on
    assert!(repo
        .update_member(team_id, &member, None, Some("0000FF"))
        .await
        .unwrap());
    assert!(repo.is_member(&member, team_id, false).await.unwrap());

    assert!(!repo
        .update_member(team_id, &outsider, Some(MemberState::On), None)
        .await
        .unwrap());
    assert!(!repo.is_member(&outsider, team_id, true).await.unwrap());
}

// ============================================================================
// HTTP
// ============================================================================

async fn create_team_via_api(app: &axum::Router, owner: &UserId, name: &str) -> Uuid {
    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/v1/teams",
            Some(owner),
            Some(json!({ "name": name })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = parse_response_body(response).await;
    assert_eq!(body["name"], name);
    body["id"].as_str().unwrap().parse().unwrap()
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_create_team_requires_caller() {
    let pool = create_test_pool().await;
    let app = create_test_app(pool);

    let response = app
        .oneshot(request(
            Method::POST,
            "/api/v1/teams",
            None,
            Some(json!({ "name": "Alpha" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_create_team_rejects_empty_name() {
    let pool = create_test_pool().await;
    let app = create_test_app(pool.clone());
    let owner = create_test_user(&pool, "Owner").await;

    let response = app
        .oneshot(request(
            Method::POST,
            "/api/v1/teams",
            Some(&owner),
            Some(json!({ "name": "" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_roster_visible_to_members_only() {
    let pool = create_test_pool().await;
    let app = create_test_app(pool.clone());
    let owner = create_test_user(&pool, "Owner").await;
    let member = create_test_user(&pool, "Member").await;
    let outsider = create_test_user(&pool, "Outsider").await;

    let team_id = create_team_via_api(&app, &owner, "Alpha").await;

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            &format!("/api/v1/teams/{}/members", team_id),
            Some(&owner),
            Some(json!({ "user_id": member.as_str() })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Inactive members may still read the roster, but are not listed by default
    let response = app
        .clone()
        .oneshot(request(
            Method::GET,
            &format!("/api/v1/teams/{}", team_id),
            Some(&member),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["members"].as_array().unwrap().len(), 1);
    assert_eq!(body["owner_id"], owner.as_str());

    let response = app
        .clone()
        .oneshot(request(
            Method::GET,
            &format!("/api/v1/teams/{}?include_inactive=true", team_id),
            Some(&member),
            None,
        ))
        .await
        .unwrap();
    let body = parse_response_body(response).await;
    assert_eq!(body["members"].as_array().unwrap().len(), 2);

    let response = app
        .oneshot(request(
            Method::GET,
            &format!("/api/v1/teams/{}", team_id),
            Some(&outsider),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_only_owner_adds_members_and_deletes_team() {
    let pool = create_test_pool().await;
    let app = create_test_app(pool.clone());
    let owner = create_test_user(&pool, "Owner").await;
    let member = create_test_user(&pool, "Member").await;
    let other = create_test_user(&pool, "Other").await;

    let team_id = create_team_via_api(&app, &owner, "Alpha").await;
    TeamRepository::new(pool.clone())
        .add_member(team_id, &member)
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            &format!("/api/v1/teams/{}/members", team_id),
            Some(&member),
            Some(json!({ "user_id": other.as_str() })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(request(
            Method::DELETE,
            &format!("/api/v1/teams/{}", team_id),
            Some(&member),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(request(
            Method::DELETE,
            &format!("/api/v1/teams/{}", team_id),
            Some(&owner),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(request(
            Method::GET,
            &format!("/api/v1/teams/{}", team_id),
            Some(&owner),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_member_switches_self_on_and_leaves() {
    let pool = create_test_pool().await;
    let app = create_test_app(pool.clone());
    let owner = create_test_user(&pool, "Owner").await;
    let member = create_test_user(&pool, "Member").await;
    let repo = TeamRepository::new(pool.clone());

    let team_id = create_team_via_api(&app, &owner, "Alpha").await;
    repo.add_member(team_id, &member).await.unwrap();

    let response = app
        .clone()
        .oneshot(request(
            Method::PUT,
            &format!("/api/v1/teams/{}/members/{}", team_id, member),
            Some(&member),
            Some(json!({ "state": "on", "color": "00FF00" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(repo.is_member(&member, team_id, false).await.unwrap());

    let response = app
        .clone()
        .oneshot(request(
            Method::PUT,
            &format!("/api/v1/teams/{}/members/{}", team_id, member),
            Some(&member),
            Some(json!({ "color": "green" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // The owner cannot leave, the member can
    let response = app
        .clone()
        .oneshot(request(
            Method::DELETE,
            &format!("/api/v1/teams/{}/members/{}", team_id, owner),
            Some(&owner),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(request(
            Method::DELETE,
            &format!("/api/v1/teams/{}/members/{}", team_id, member),
            Some(&member),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(!repo.is_member(&member, team_id, true).await.unwrap());
}
