use std::{sync::Arc, time::Duration};

use ergowise_lib::{
    analysis::{self, ApiState, FixedPostureAnalyzer, InMemoryPhotoStore, PhotoStore},
    assessment::{default_catalog, AssessmentFlow, AssessmentPhase, QuestionnaireController},
    models::PostureRating,
    notify::{LogNotifier, RecordingNotifier},
    photos::{HttpTransport, PhotoFile, PhotoSubmissionClient, SubmissionError},
};
use tokio::net::TcpListener;

const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10, b'J', b'F', b'I', b'F', 0, 1];

async fn spawn_api(store: Arc<InMemoryPhotoStore>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = analysis::router(
        ApiState::new(Arc::new(FixedPostureAnalyzer::default()), store),
        1024 * 1024,
    );
    tokio::spawn(analysis::serve(listener, app));
    format!("http://{addr}")
}

async fn wait_for_stored(store: &InMemoryPhotoStore, expected: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while store.len().await.unwrap() < expected {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("uploads were not stored in time");
}

#[tokio::test]
async fn client_uploads_each_photo_and_feeds_the_assessment() {
    let store = Arc::new(InMemoryPhotoStore::unbounded());
    let base_url = spawn_api(store.clone()).await;

    let notifier = Arc::new(RecordingNotifier::new());
    let client = PhotoSubmissionClient::new(HttpTransport::new(base_url), notifier.clone());

    let files = (0..7)
        .map(|i| PhotoFile::new(format!("posture-{i}.jpg"), JPEG_MAGIC.to_vec()))
        .collect();
    let selection = client.select_files(files);
    assert_eq!(selection.files.len(), 5);
    assert_eq!(notifier.messages().len(), 1);

    let recommendation = client.submit(&selection.files).await.unwrap();
    assert_eq!(recommendation.posture_rating, PostureRating::Good);
    assert_eq!(recommendation.tips.len(), 3);
    assert!(!client.is_busy());

    wait_for_stored(&store, 5).await;
    let stored = store.list().await.unwrap();
    assert_eq!(stored.len(), 5);
    assert_eq!(stored[0].mime_type.as_deref(), Some("image/jpeg"));
    assert_eq!(stored[4].file_name.as_deref(), Some("posture-4.jpg"));

    let mut questionnaire = QuestionnaireController::new(default_catalog()).unwrap();
    for key in ["deskHeight", "chairSupport", "keyboardPosition", "lighting"] {
        questionnaire.answer(key, "Yes").unwrap();
        questionnaire.advance();
    }
    let mut flow = AssessmentFlow::new(questionnaire);
    assert!(flow.show_summary());
    assert!(flow.proceed_to_capture());
    flow.record_analysis(recommendation);
    assert!(flow.complete());
    assert_eq!(flow.phase(), AssessmentPhase::Results);
    assert_eq!(flow.report().score, 100);
}

#[tokio::test]
async fn unreachable_service_is_a_network_failure() {
    // Bind and drop to get a port nobody listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = PhotoSubmissionClient::new(
        HttpTransport::new(format!("http://{addr}")),
        Arc::new(LogNotifier),
    );
    let err = client
        .submit(&[PhotoFile::new("desk.jpg", JPEG_MAGIC.to_vec())])
        .await
        .unwrap_err();
    assert!(matches!(err, SubmissionError::Network(_)));
    assert!(!client.is_busy());
}

#[tokio::test]
async fn oversized_submission_only_uploads_the_first_five() {
    let store = Arc::new(InMemoryPhotoStore::unbounded());
    let base_url = spawn_api(store.clone()).await;
    let notifier = Arc::new(RecordingNotifier::new());
    let client = PhotoSubmissionClient::new(HttpTransport::new(base_url), notifier.clone());

    let files: Vec<PhotoFile> = (0..7)
        .map(|i| PhotoFile::new(format!("posture-{i}.jpg"), JPEG_MAGIC.to_vec()))
        .collect();
    client.submit(&files).await.unwrap();

    wait_for_stored(&store, 5).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    let stored = store.list().await.unwrap();
    assert_eq!(stored.len(), 5);
    assert_eq!(stored[4].file_name.as_deref(), Some("posture-4.jpg"));
    assert_eq!(notifier.messages().len(), 1);
}
