use harvest_core::CandidateLink;
use harvest_engine::{
    build_client, ArtifactDownloader, DownloadError, HttpSettings, PdfDownloader,
};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PDF_BYTES: &[u8] = b"%PDF-1.4 widget body";

fn downloader(dir: &TempDir) -> PdfDownloader {
    let client = build_client(&HttpSettings::default()).expect("client");
    PdfDownloader::new(client, dir.path().to_path_buf())
}

fn abstract_link(server: &MockServer, id: &str) -> CandidateLink {
    CandidateLink::from_normalized(format!("{}/abs/{id}", server.uri()))
}

#[tokio::test]
async fn downloader_requests_the_file_form_and_names_by_title() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pdf/1234"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(PDF_BYTES))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let saved = downloader(&dir)
        .download(&abstract_link(&server, "1234"), "A Study of Widgets")
        .await
        .expect("download ok");

    assert_eq!(saved, dir.path().join("A Study of Widgets.pdf"));
    assert_eq!(std::fs::read(&saved).unwrap(), PDF_BYTES);
}

#[tokio::test]
async fn failed_download_leaves_no_trace() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pdf/500"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let err = downloader(&dir)
        .download(&abstract_link(&server, "500"), "Broken Widgets")
        .await
        .unwrap_err();

    assert!(matches!(err, DownloadError::HttpStatus(500)));
    let leftovers: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert!(leftovers.is_empty(), "unexpected files: {leftovers:?}");
}

#[tokio::test]
async fn failed_rename_cleans_up_the_part_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pdf/8"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(PDF_BYTES))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    // A directory squatting on the final name makes the rename fail after
    // the body streamed successfully.
    std::fs::create_dir(dir.path().join("Blocked Widgets.pdf")).unwrap();

    let err = downloader(&dir)
        .download(&abstract_link(&server, "8"), "Blocked Widgets")
        .await
        .unwrap_err();

    assert!(matches!(err, DownloadError::Io(_)), "got {err:?}");
    assert!(!dir.path().join("Blocked Widgets.pdf.part").exists());
}

#[tokio::test]
async fn hostile_titles_are_sanitized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pdf/9"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(PDF_BYTES))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let saved = downloader(&dir)
        .download(&abstract_link(&server, "9"), "Widgets: A/B Testing?")
        .await
        .expect("download ok");

    assert_eq!(saved, dir.path().join("Widgets_ A_B Testing.pdf"));
    assert!(saved.is_file());
}

#[tokio::test]
async fn missing_artifact_dir_is_created() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pdf/7"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(PDF_BYTES))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("papers");
    let client = build_client(&HttpSettings::default()).expect("client");
    let downloader = PdfDownloader::new(client, nested.clone());

    let saved = downloader
        .download(&abstract_link(&server, "7"), "Nested Widgets")
        .await
        .expect("download ok");

    assert_eq!(saved, nested.join("Nested Widgets.pdf"));
    assert!(saved.is_file());
}
