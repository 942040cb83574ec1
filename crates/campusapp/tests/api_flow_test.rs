use campusapp::api::{CampaignDraft, CampusApi, Credentials, FsCampusApi, ListQuery};
use campusapp::client::ApiClient;
use campusapp::error::CampusError;
use campusapp::model::{AdminRecord, GalleryCategory};
use campusapp::session::Session;
use campusapp::store::fs_backend::FsBackend;
use campusapp::store::local::LocalRepository;
use mockito::{Matcher, ServerGuard};
use serde_json::json;
use std::time::Duration;
use tempfile::TempDir;

fn open(server: &ServerGuard, dir: &TempDir) -> FsCampusApi {
    let client = ApiClient::new(&server.url(), Duration::from_secs(5), "campus-it").unwrap();
    let session = Session::init_from_storage(FsBackend::new(dir.path().to_path_buf())).unwrap();
    let admins = LocalRepository::<AdminRecord, _>::new(FsBackend::new(dir.path().to_path_buf()));
    CampusApi::new(client, session, admins)
}

fn login(api: &mut FsCampusApi, server: &mut ServerGuard) {
    server
        .mock("POST", "/api/login")
        .match_body(Matcher::PartialJson(json!({"email": "ada@school.test"})))
        .with_body(
            r#"{"success": true, "token": "tok-ada",
                "user": {"_id": "a1", "name": "Ada", "email": "ada@school.test", "role": "SUPER_ADMIN"}}"#,
        )
        .create();
    api.login(Credentials {
        email: "Ada@School.test".into(),
        password: "pw".into(),
    })
    .unwrap();
}

#[test]
fn test_login_then_requests_carry_the_token() {
    let mut server = mockito::Server::new();
    let dir = TempDir::new().unwrap();
    let mut api = open(&server, &dir);
    login(&mut api, &mut server);

    let guidance = server
        .mock("GET", "/api/guidance")
        .match_header("authorization", "Bearer tok-ada")
        .with_body(r#"{"success": true, "guidance": []}"#)
        .create();
    api.list_guidance(ListQuery::new()).unwrap();
    guidance.assert();

    // A second process picks the session up from disk.
    let reopened = open(&server, &dir);
    let who = reopened.whoami().unwrap().data.unwrap();
    assert_eq!(who.user.id, "a1");
}

#[test]
fn test_failed_login_surfaces_server_message() {
    let mut server = mockito::Server::new();
    let dir = TempDir::new().unwrap();
    server
        .mock("POST", "/api/login")
        .with_body(r#"{"success": false, "error": "Invalid credentials"}"#)
        .create();
    let mut api = open(&server, &dir);

    let err = api
        .login(Credentials {
            email: "ada@school.test".into(),
            password: "wrong".into(),
        })
        .unwrap_err();

    assert_eq!(err.user_message(), "Invalid credentials");
    assert!(!api.session().is_active());
}

#[test]
fn test_signed_in_admin_cannot_be_deleted() {
    let mut server = mockito::Server::new();
    let dir = TempDir::new().unwrap();
    let mut api = open(&server, &dir);
    login(&mut api, &mut server);

    let page = api.list_admins(ListQuery::new()).unwrap().data.unwrap();
    assert_eq!(page.total_items, 1);

    let err = api.delete_admin("a1").unwrap_err();
    assert!(matches!(err, CampusError::Refused(_)));
    let page = api.list_admins(ListQuery::new()).unwrap().data.unwrap();
    assert_eq!(page.total_items, 1);
}

#[test]
fn test_campaign_to_empty_staff_list_is_blocked() {
    let mut server = mockito::Server::new();
    let dir = TempDir::new().unwrap();
    server
        .mock("GET", "/api/staff")
        .with_body(r#"{"success": true, "staff": []}"#)
        .create();
    let post = server.mock("POST", "/api/emails").expect(0).create();
    let api = open(&server, &dir);

    let err = api
        .create_campaign(CampaignDraft {
            title: "Staff meeting".into(),
            subject: "Monday".into(),
            content: "Hall, 8am".into(),
            recipients: "staff".into(),
        })
        .unwrap_err();

    assert_eq!(err.user_message(), "No recipients found");
    post.assert();
}

#[test]
fn test_gallery_category_filter_after_search() {
    let mut server = mockito::Server::new();
    let dir = TempDir::new().unwrap();
    server
        .mock("GET", "/api/gallery")
        .with_body(
            r#"{"success": true, "galleries": [
                {"_id": "g1", "title": "Relay heats", "category": "SPORTS_DAY", "files": ["/u/1.jpg"]},
                {"_id": "g2", "title": "Relay final", "category": "ATHLETICS", "files": ["/u/2.mp4"]},
                {"_id": "g3", "title": "Choir", "category": "MUSIC_FESTIVAL", "files": []}
            ]}"#,
        )
        .create();
    let api = open(&server, &dir);

    let mut query = ListQuery::new();
    query.search = "relay".into();
    let all = api.list_gallery(query.clone()).unwrap().data.unwrap();
    query.filter.category = "sports day".parse().unwrap();
    let sports = api.list_gallery(query).unwrap().data.unwrap();

    assert_eq!(all.total_items, 2);
    assert_eq!(sports.total_items, 1);
    assert_eq!(sports.items[0].category, GalleryCategory::SportsDay);
}
