//! Integration tests for the mentor and resource flows against a mock backend.

mod mock_backend;

use std::sync::Arc;
use std::time::Duration;

use mentoria_api::{
    Credentials, EntityId, ErrorKind, MemoryTokenStore, MentorUpdate, NewMentor, ResourceStatus,
    ResourceType, UploadFile,
};
use mentoria_store::{selectors, Config, LoadingFlag, Modal, NotificationKind, Store};
use mock_backend::MockBackend;

/// Backend with one user, mentor 7 and its resource 42.
async fn seeded_backend() -> MockBackend {
    let backend = MockBackend::start().await;
    backend.seed_user("a@b.com", "secret");
    backend.seed_mentor(7, "Física", "Mecánica");
    backend.seed_resource(42, 7, "lecture.pdf");
    backend
}

async fn logged_in_store(backend: &MockBackend, config: Config) -> Store {
    let store = Store::new(
        Config {
            api_base_url: backend.base_url.clone(),
            ..config
        },
        Arc::new(MemoryTokenStore::new()),
    )
    .expect("store builds");
    store
        .login_user(Credentials::new("a@b.com", "secret"))
        .await
        .expect("login succeeds");
    store
}

#[tokio::test]
async fn test_fetch_mentors_ids_match_numbers_and_strings() {
    let backend = seeded_backend().await;
    let store = logged_in_store(&backend, Config::default()).await;

    assert!(store.fetch_mentors().await.expect("fetch succeeds"));

    let state = store.state().await;
    assert_eq!(selectors::select_all_mentors(&state).len(), 1);
    let by_number = selectors::select_mentor_by_id(&state, 7_u64).expect("found by number");
    let by_string = selectors::select_mentor_by_id(&state, "7").expect("found by string");
    assert_eq!(by_number, by_string);
    assert_eq!(by_number.expertise, "Mecánica");
    assert!(!selectors::select_mentors_loading(&state));
}

#[tokio::test]
async fn test_failed_fetch_keeps_list_and_records_error() {
    let backend = seeded_backend().await;
    let store = logged_in_store(&backend, Config::default()).await;
    store.fetch_mentors().await.expect("first fetch succeeds");

    backend.state().fail_mentors = true;
    let err = store.fetch_mentors().await.expect_err("second fetch fails");

    assert_eq!(err.status(), Some(500));
    assert_eq!(err.message(), "Database unavailable");
    let state = store.state().await;
    assert_eq!(state.mentors.mentors.len(), 1);
    assert_eq!(selectors::select_mentors_error(&state), Some(&err));
    assert!(!selectors::select_mentors_loading(&state));
    // A server error is not a session problem.
    assert!(state.auth.is_authenticated());
}

#[tokio::test]
async fn test_create_mentor_sends_default_description() {
    let backend = seeded_backend().await;
    let store = logged_in_store(&backend, Config::default()).await;
    store.fetch_mentors().await.expect("fetch succeeds");
    store.open_modal(Modal::MentorCreation).await;

    let created = store
        .create_mentor(NewMentor::new("Física", "Mecánica"))
        .await
        .expect("create succeeds");

    let sent = backend.state().mentors.last().cloned().expect("mentor stored");
    assert_eq!(sent["description"], "Your mentor specialized in Mecánica");

    let state = store.state().await;
    assert_eq!(state.mentors.mentors.len(), 2);
    let stored = selectors::select_mentor_by_id(&state, created.id.clone()).expect("appended");
    assert_eq!(stored.name, "Física");
    assert!(!selectors::select_is_modal_open(&state, Modal::MentorCreation));
    assert!(!selectors::select_loading(&state, LoadingFlag::MentorCreation));
    let notification = selectors::select_notifications(&state)
        .last()
        .expect("notification pushed");
    assert_eq!(notification.kind, NotificationKind::Success);
    assert_eq!(notification.title, "Mentor created");
}

#[tokio::test]
async fn test_update_and_delete_mentor() {
    let backend = seeded_backend().await;
    let store = logged_in_store(&backend, Config::default()).await;
    store.fetch_mentors().await.expect("fetch succeeds");
    store.fetch_resources_for_mentor("7").await.expect("resources load");
    assert!(store.set_active_mentor(Some(EntityId::from(7_u64))).await);

    let updated = store
        .update_mentor(
            "7",
            MentorUpdate {
                name: Some("Física II".to_string()),
                ..MentorUpdate::default()
            },
        )
        .await
        .expect("update succeeds");
    assert_eq!(updated.name, "Física II");

    let state = store.state().await;
    let mentor = selectors::select_mentor_by_id(&state, 7_u64).expect("still present");
    assert_eq!(mentor.name, "Física II");
    // The server copy has no resources; the local ones survive.
    assert_eq!(mentor.resources.len(), 1);

    store.delete_mentor(7_u64).await.expect("delete succeeds");
    let state = store.state().await;
    assert!(selectors::select_all_mentors(&state).is_empty());
    assert!(selectors::select_active_mentor_id(&state).is_none());
    assert!(backend.state().mentors.is_empty());
}

#[tokio::test]
async fn test_empty_mentor_update_is_rejected() {
    let backend = seeded_backend().await;
    let store = logged_in_store(&backend, Config::default()).await;

    let err = store
        .update_mentor("7", MentorUpdate::default())
        .await
        .expect_err("update fails");
    assert_eq!(err.kind(), ErrorKind::ValidationError);
}

#[tokio::test]
async fn test_upload_appends_server_resource() {
    let backend = seeded_backend().await;
    let store = logged_in_store(&backend, Config::default()).await;
    store.fetch_mentors().await.expect("fetch succeeds");
    store.fetch_resources_for_mentor(7_u64).await.expect("resources load");
    store.open_modal(Modal::ResourceUpload).await;

    let resource = store
        .upload_resource("7", UploadFile::from_bytes("notes.pdf", b"%PDF-1.4".to_vec()))
        .await
        .expect("upload succeeds");

    assert_eq!(resource.kind, ResourceType::Pdf);
    assert_eq!(resource.size_bytes, Some(8));
    let state = store.state().await;
    let resources = selectors::select_resources_for_mentor(&state, "7");
    assert_eq!(resources.len(), 2);
    assert_eq!(resources[1].id, resource.id);
    assert!(!selectors::select_is_modal_open(&state, Modal::ResourceUpload));
    assert!(!selectors::select_loading(&state, LoadingFlag::ResourceUpload));
    assert_eq!(backend.state().uploads, 1);
}

#[tokio::test]
async fn test_oversized_upload_sends_nothing() {
    let backend = seeded_backend().await;
    let config = Config {
        max_upload_mb: 1,
        ..Config::default()
    };
    let store = logged_in_store(&backend, config).await;
    store.fetch_mentors().await.expect("fetch succeeds");

    let big = vec![0_u8; 1024 * 1024 + 1];
    let err = store
        .upload_resource("7", UploadFile::from_bytes("big.pdf", big))
        .await
        .expect_err("upload fails");

    assert_eq!(err.kind(), ErrorKind::FileTooLarge);
    assert_eq!(backend.state().uploads, 0);
    let state = store.state().await;
    assert!(state.mentors.find(&EntityId::from("7")).is_some_and(|m| m.resources.is_empty()));
    let notification = selectors::select_notifications(&state)
        .last()
        .expect("notification pushed");
    assert_eq!(notification.kind, NotificationKind::Error);
}

#[tokio::test]
async fn test_link_gets_https_prefix() {
    let backend = seeded_backend().await;
    let store = logged_in_store(&backend, Config::default()).await;
    store.fetch_mentors().await.expect("fetch succeeds");

    let resource = store
        .upload_resource_from_url("7", "example.com/notes", None)
        .await
        .expect("link added");

    assert_eq!(resource.url.as_deref(), Some("https://example.com/notes"));
    assert_eq!(resource.name, "https://example.com/notes");
    assert_eq!(resource.kind, ResourceType::Url);
    assert_eq!(resource.status, ResourceStatus::Pending);
    let state = store.state().await;
    assert_eq!(selectors::select_resources_for_mentor(&state, 7_u64).len(), 1);
}

#[tokio::test]
async fn test_delete_resource_removes_it_and_notifies() {
    let backend = seeded_backend().await;
    let store = logged_in_store(&backend, Config::default()).await;
    store.fetch_mentors().await.expect("fetch succeeds");
    store.fetch_resources_for_mentor("7").await.expect("resources load");

    store
        .delete_resource(7_u64, 42_u64)
        .await
        .expect("delete succeeds");

    let state = store.state().await;
    assert!(selectors::select_resources_for_mentor(&state, "7").is_empty());
    let notification = selectors::select_notifications(&state)
        .last()
        .expect("notification pushed");
    assert_eq!(notification.kind, NotificationKind::Success);
    assert_eq!(notification.message, "lecture.pdf was removed");
    assert!(backend.state().resources.is_empty());
}

#[tokio::test]
async fn test_stale_resource_list_is_discarded() {
    let backend = seeded_backend().await;
    let store = logged_in_store(&backend, Config::default()).await;
    store.fetch_mentors().await.expect("fetch succeeds");

    // The first request answers late with the old list.
    backend
        .state()
        .resource_delays
        .push_back(Duration::from_millis(500));
    let slow = {
        let store = store.clone();
        tokio::spawn(async move { store.fetch_resources_for_mentor("7").await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    backend.seed_resource(43, 7, "summary.txt");
    let fresh = store
        .fetch_resources_for_mentor("7")
        .await
        .expect("second fetch succeeds");
    let stale = slow.await.expect("task joins").expect("first fetch succeeds");

    assert!(fresh);
    assert!(!stale);
    let state = store.state().await;
    let ids: Vec<&str> = selectors::select_resources_for_mentor(&state, "7")
        .iter()
        .map(|r| r.id.as_str())
        .collect();
    assert_eq!(ids, ["42", "43"]);
    assert!(!selectors::select_mentors_loading(&state));
}

#[tokio::test]
async fn test_concurrent_mentor_fetches_apply_once() {
    let backend = seeded_backend().await;
    let store = logged_in_store(&backend, Config::default()).await;

    let results = futures::future::join_all((0..3).map(|_| store.fetch_mentors())).await;

    let applied = results
        .into_iter()
        .map(|r| r.expect("fetch succeeds"))
        .filter(|applied| *applied)
        .count();
    assert_eq!(applied, 1);
    let state = store.state().await;
    assert_eq!(state.mentors.mentors.len(), 1);
    assert!(!selectors::select_mentors_loading(&state));
}

#[tokio::test]
async fn test_fetch_started_before_upload_keeps_uploaded_resource() {
    let backend = seeded_backend().await;
    let store = logged_in_store(&backend, Config::default()).await;
    store.fetch_mentors().await.expect("fetch succeeds");

    // The list is taken before the upload and answered after it.
    backend
        .state()
        .resource_delays
        .push_back(Duration::from_millis(400));
    let slow = {
        let store = store.clone();
        tokio::spawn(async move { store.fetch_resources_for_mentor("7").await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    let uploaded = store
        .upload_resource("7", UploadFile::from_bytes("notes.txt", b"hello".to_vec()))
        .await
        .expect("upload succeeds");
    let applied = slow.await.expect("task joins").expect("fetch succeeds");

    assert!(!applied);
    let state = store.state().await;
    let resources = selectors::select_resources_for_mentor(&state, "7");
    assert!(resources.iter().any(|r| r.id == uploaded.id));
    assert!(!selectors::select_mentors_loading(&state));
    assert!(!selectors::select_loading(&state, LoadingFlag::ResourceUpload));
}

#[tokio::test]
async fn test_fetch_started_before_create_keeps_created_mentor() {
    let backend = seeded_backend().await;
    let store = logged_in_store(&backend, Config::default()).await;
    store.fetch_mentors().await.expect("fetch succeeds");

    backend
        .state()
        .mentor_delays
        .push_back(Duration::from_millis(400));
    let slow = {
        let store = store.clone();
        tokio::spawn(async move { store.fetch_mentors().await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    let created = store
        .create_mentor(NewMentor::new("Química", "Orgánica"))
        .await
        .expect("create succeeds");
    let applied = slow.await.expect("task joins").expect("fetch succeeds");

    assert!(!applied);
    let state = store.state().await;
    assert_eq!(selectors::select_all_mentors(&state).len(), 2);
    assert!(selectors::select_mentor_by_id(&state, created.id).is_some());

    // A fetch started afterwards sees the new mentor and applies.
    assert!(store.fetch_mentors().await.expect("fetch succeeds"));
    assert_eq!(store.state().await.mentors.mentors.len(), 2);
}

#[tokio::test]
async fn test_dashboard_route_uses_loaded_mentor() {
    let backend = seeded_backend().await;
    let store = logged_in_store(&backend, Config::default()).await;
    store.fetch_mentors().await.expect("fetch succeeds");

    let resolution = store.navigate("/mentor/7").await;
    let layout = resolution.layout().expect("dashboard has a layout");
    assert_eq!(layout.header.title, "Física");
    assert_eq!(layout.header.subtitle.as_deref(), Some("Mecánica"));
    assert!(layout.show_bottom_nav);
}
