//! End-to-end workflow scenarios against the mock project service

use std::sync::Arc;
use std::time::Duration;

use promoreel_app::Orchestrator;
use promoreel_common::Error;
use promoreel_projects::{
    Project, ProjectSettings, ProjectStatus, Resolution, SettingsPatch, UploadFile,
};
use promoreel_service::mock::{GenerationOutcome, MockProjectService};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "promoreel=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

fn setup() -> (Orchestrator, MockProjectService) {
    init_tracing();
    let mock = MockProjectService::new();
    mock.behavior().set_delay_ms(20);
    (Orchestrator::new(Arc::new(mock.clone())), mock)
}

fn jpeg(name: &str) -> UploadFile {
    UploadFile::new(name, "image/jpeg", vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00])
}

/// Refresh until the current project reaches a terminal status
async fn poll_until_terminal(orch: &mut Orchestrator) -> Project {
    for _ in 0..100 {
        let project = orch.refresh_current().await.unwrap();
        if project.status.is_terminal() {
            return project;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("Project never reached a terminal status");
}

#[tokio::test]
async fn test_full_generation_workflow() {
    let (mut orch, _mock) = setup();

    // Create "Summer Sale" with duration=20, resolution=1080p
    let project = orch
        .create_project(
            "Summer Sale",
            ProjectSettings {
                duration: 20,
                logo_opacity: 0.8,
                resolution: Resolution::Hd1080,
            },
        )
        .await
        .unwrap();
    assert_eq!(project.status, ProjectStatus::Draft);
    assert!(project.images.is_empty());

    // Upload 3 images
    orch.upload_images(vec![jpeg("a.jpg"), jpeg("b.jpg"), jpeg("c.jpg")])
        .await
        .unwrap();
    let current = orch.session().current().unwrap();
    assert_eq!(current.image_count(), 3);
    assert_eq!(orch.session().previews().len(), 3);

    // Trigger generation: status moves to processing immediately
    orch.generate().await.unwrap();
    assert_eq!(
        orch.session().current().unwrap().status,
        ProjectStatus::Processing
    );

    // A subsequent refresh eventually observes the outcome
    let finished = poll_until_terminal(&mut orch).await;
    assert_eq!(finished.status, ProjectStatus::Completed);
    let video_url = finished.video_url.expect("completed project has a video_url");
    assert!(!video_url.is_empty());

    // The rendered video is a plain byte fetch
    let bytes = orch.download_video().await.unwrap();
    assert!(!bytes.is_empty());
}

#[tokio::test]
async fn test_generation_failure_workflow() {
    let (mut orch, mock) = setup();
    mock.behavior().set_outcome(GenerationOutcome::Fail);

    orch.create_project("Doomed", ProjectSettings::default())
        .await
        .unwrap();
    orch.upload_images(vec![jpeg("a.jpg")]).await.unwrap();
    orch.generate().await.unwrap();

    let finished = poll_until_terminal(&mut orch).await;
    assert_eq!(finished.status, ProjectStatus::Failed);
    assert!(finished.video_url.is_none());

    // A failed generation cannot be downloaded
    let err = orch.download_video().await.unwrap_err();
    assert!(matches!(err, Error::Precondition(_)));
}

#[tokio::test]
async fn test_generation_without_images_is_rejected() {
    let (mut orch, _mock) = setup();

    orch.create_project("Empty", ProjectSettings::default())
        .await
        .unwrap();

    let err = orch.generate().await.unwrap_err();
    assert!(matches!(err, Error::Precondition(_)));
    assert_eq!(
        orch.session().current().unwrap().status,
        ProjectStatus::Draft
    );
}

#[tokio::test]
async fn test_out_of_range_settings_leave_stored_value() {
    let (mut orch, _mock) = setup();

    orch.create_project("Ranges", ProjectSettings::default())
        .await
        .unwrap();

    let err = orch
        .update_settings(SettingsPatch {
            duration: Some(100),
            ..SettingsPatch::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(orch.session().current().unwrap().settings.duration, 30);

    // A valid patch still goes through afterwards
    orch.update_settings(SettingsPatch {
        duration: Some(45),
        resolution: Some(Resolution::Hd720),
        ..SettingsPatch::default()
    })
    .await
    .unwrap();
    let settings = orch.session().current().unwrap().settings;
    assert_eq!(settings.duration, 45);
    assert_eq!(settings.resolution, Resolution::Hd720);
    assert_eq!(settings.logo_opacity, 0.8);
}

#[tokio::test]
async fn test_select_from_history_rebuilds_previews() {
    let (mut orch, _mock) = setup();

    let first = orch
        .create_project("First", ProjectSettings::default())
        .await
        .unwrap();
    orch.upload_images(vec![jpeg("a.jpg"), jpeg("b.jpg")])
        .await
        .unwrap();

    // Creating a second project switches the current selection
    orch.create_project("Second", ProjectSettings::default())
        .await
        .unwrap();
    assert!(orch.session().previews().is_empty());

    // Reload the list from the service, then select the first project again
    orch.load_projects().await.unwrap();
    assert_eq!(orch.session().projects().len(), 2);

    let selected = orch.select_project(first.id).unwrap();
    assert_eq!(selected.name, "First");
    // Preview list matches the stored image count exactly
    assert_eq!(orch.session().previews().len(), 2);
}

#[tokio::test]
async fn test_logo_and_music_replace_semantics() {
    let (mut orch, _mock) = setup();

    orch.create_project("Branded", ProjectSettings::default())
        .await
        .unwrap();

    orch.upload_logo(UploadFile::new("logo-v1.png", "image/png", vec![1]))
        .await
        .unwrap();
    orch.upload_logo(UploadFile::new("logo-v2.png", "image/png", vec![2, 2]))
        .await
        .unwrap();
    orch.upload_music(UploadFile::new("track.mp3", "audio/mpeg", vec![3]))
        .await
        .unwrap();

    let current = orch.session().current().unwrap();
    let expected = UploadFile::new("logo-v2.png", "image/png", vec![2, 2]).to_base64();
    assert_eq!(current.logo_file.as_deref(), Some(expected.as_str()));
    assert!(current.music_file.is_some());
}

#[tokio::test]
async fn test_asset_mutation_blocked_after_generation() {
    let (mut orch, mock) = setup();
    mock.behavior().set_outcome(GenerationOutcome::Stall);

    orch.create_project("Locked", ProjectSettings::default())
        .await
        .unwrap();
    orch.upload_images(vec![jpeg("a.jpg")]).await.unwrap();
    orch.generate().await.unwrap();
    assert_eq!(
        orch.session().current().unwrap().status,
        ProjectStatus::Processing
    );

    let err = orch.upload_images(vec![jpeg("late.jpg")]).await.unwrap_err();
    assert!(matches!(err, Error::Precondition(_)));
    assert_eq!(orch.session().current().unwrap().image_count(), 1);

    // A second trigger on an already-processing project is also rejected
    let err = orch.generate().await.unwrap_err();
    assert!(matches!(err, Error::Precondition(_)));
}

#[tokio::test]
async fn test_status_is_monotonic_across_refreshes() {
    let (mut orch, _mock) = setup();

    orch.create_project("Monotonic", ProjectSettings::default())
        .await
        .unwrap();
    orch.upload_images(vec![jpeg("a.jpg")]).await.unwrap();
    orch.generate().await.unwrap();

    let mut last_rank = 0u8;
    for _ in 0..50 {
        let project = orch.refresh_current().await.unwrap();
        let rank = match project.status {
            ProjectStatus::Draft => 0,
            ProjectStatus::Processing => 1,
            ProjectStatus::Completed | ProjectStatus::Failed => 2,
            ProjectStatus::Unknown => panic!("mock never reports unknown"),
        };
        assert!(rank >= last_rank, "status moved backward");
        last_rank = rank;
        if project.status.is_terminal() {
            // video_url present iff completed
            assert_eq!(
                project.video_url.is_some(),
                project.status == ProjectStatus::Completed
            );
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("Project never reached a terminal status");
}

#[tokio::test]
async fn test_failure_on_one_project_does_not_corrupt_others() {
    let (mut orch, _mock) = setup();

    let healthy = orch
        .create_project("Healthy", ProjectSettings::default())
        .await
        .unwrap();
    orch.upload_images(vec![jpeg("a.jpg")]).await.unwrap();

    orch.create_project("Sick", ProjectSettings::default())
        .await
        .unwrap();
    // Out-of-range update fails on the second project
    let err = orch
        .update_settings(SettingsPatch {
            duration: Some(0),
            ..SettingsPatch::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    // The first project's view is untouched
    let first = orch.select_project(healthy.id).unwrap();
    assert_eq!(first.image_count(), 1);
    assert_eq!(first.status, ProjectStatus::Draft);
    assert_eq!(orch.session().previews().len(), 1);
}
