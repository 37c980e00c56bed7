mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::{get, send, test_app, test_app_with, upload_request};
use docsort_models::{Category, ExtractionMethod};
use docsort_testsupport::{multipart_without_file, prom_parse, ScriptedTools};

#[tokio::test]
async fn text_pdf_upload_dashboard_and_view() {
    let t = test_app(ScriptedTools::new()).await;

    let (status, _, body) = send(
        &t.app,
        upload_request(
            "/upload",
            "bill.pdf",
            b"TEXT:Tax Invoice\nGST 18%\x0cTotal Amount: 1180\x0c",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<h2>Extracted Text:</h2>"));
    assert!(body.contains("<pre>Tax Invoice\nGST 18%\nTotal Amount: 1180</pre>"));
    assert!(body.contains("<p>Bill</p>"));
    assert!(body.contains("href='/dashboard'"));

    let (status, _, body) = send(&t.app, get("/dashboard")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<li>bill.pdf — <b>Bill</b> [<a href='/view/1'>View</a>]</li>"));

    let (status, _, body) = send(&t.app, get("/view/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<h2>File: bill.pdf</h2>"));
    assert!(body.contains("<h3>Category: Bill</h3>"));
    assert!(body.contains("Total Amount: 1180"));

    let stored = t.state.store.get(1).await.unwrap();
    assert_eq!(stored.extraction_method, ExtractionMethod::Embedded);
    assert!(t.state.uploads.root().join("bill.pdf").exists());
}

#[tokio::test]
async fn scanned_pdf_is_ocrd_page_by_page() {
    let tools = ScriptedTools::new();
    let t = test_app(tools.clone()).await;

    let (status, _, body) = send(
        &t.app,
        upload_request(
            "/upload",
            "notes.pdf",
            b"SCAN:Lecture 4\x0cSubject: Thermodynamics",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<p>Notes</p>"));

    let doc = t.state.store.get(1).await.unwrap();
    assert_eq!(doc.extraction_method, ExtractionMethod::Ocr);
    assert_eq!(doc.extracted_text, "Lecture 4\nSubject: Thermodynamics");
    let calls = tools.calls().await;
    let steps: Vec<_> = calls
        .iter()
        .map(|call| call.split(':').next().unwrap_or_default())
        .collect();
    assert_eq!(steps, vec!["pdf_text", "rasterize", "ocr", "ocr"]);
    assert_eq!(&calls[2..], ["ocr:page-1.png", "ocr:page-2.png"]);
}

#[tokio::test]
async fn scanned_pdf_without_ocr_is_stored_with_warning() {
    let t = test_app(ScriptedTools::without_ocr()).await;

    let (status, _, body) = send(
        &t.app,
        upload_request("/upload", "scan.pdf", b"SCAN:Certificate of Completion"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("⚠️ OCR not available in hosted version."));
    assert!(body.contains("<p>Uncategorized</p>"));

    let doc = t.state.store.get(1).await.unwrap();
    assert_eq!(doc.extraction_method, ExtractionMethod::OcrUnavailable);
    assert_eq!(doc.category, Category::Uncategorized);
}

#[tokio::test]
async fn unreadable_pdf_stores_the_error_text() {
    let t = test_app(ScriptedTools::new()).await;

    let (status, _, body) =
        send(&t.app, upload_request("/upload", "broken.pdf", b"%PDF-1.4 garbage")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("❌ Error extracting PDF: Syntax Error"));

    let doc = t.state.store.get(1).await.unwrap();
    assert_eq!(doc.extraction_method, ExtractionMethod::Failed);
    assert!(doc.extracted_text.starts_with("❌ Error extracting PDF:"));
}

#[tokio::test]
async fn image_upload_uses_ocr() {
    let t = test_app(ScriptedTools::new()).await;

    let (status, _, body) = send(
        &t.app,
        upload_request("/upload", "card.PNG", b"STUDENT IDENTITY CARD\nRoll No: 42"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<p>ID Document</p>"));
    assert!(body.contains("<pre>STUDENT IDENTITY CARD\nRoll No: 42</pre>"));
}

#[tokio::test]
async fn image_ocr_failure_reports_error_and_stores_nothing() {
    let t = test_app(ScriptedTools::new()).await;

    let (status, _, body) =
        send(&t.app, upload_request("/upload", "blurry.jpg", b"UNREADABLE bytes")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body.starts_with("❌ Error processing file: Text extraction failed:"));
    assert_eq!(t.state.store.count().await.unwrap(), 0);

    let metrics = prom_parse(&t.state.metrics.get_prometheus_metrics().await.unwrap()).unwrap();
    assert_eq!(metrics.counters.get("docsort_extraction_errors_total"), Some(&1.0));
}

#[tokio::test]
async fn missing_file_field_is_rejected() {
    let t = test_app(ScriptedTools::new()).await;
    let (content_type, body) = multipart_without_file();
    let req = Request::post("/upload")
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .unwrap();

    let (status, _, body) = send(&t.app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "No file uploaded");
}

#[tokio::test]
async fn unknown_document_is_not_found() {
    let t = test_app(ScriptedTools::new()).await;
    let (status, _, body) = send(&t.app, get("/view/99")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "❌ Document not found");

    let (status, _, body) = send(&t.app, get("/view/abc")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "❌ Document not found");
}

#[tokio::test]
async fn client_paths_are_reduced_to_base_names() {
    let t = test_app(ScriptedTools::new()).await;

    let (status, _, _) = send(
        &t.app,
        upload_request("/upload", "../../outside.png", b"Award of Merit"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(t.state.uploads.root().join("outside.png").exists());
    assert_eq!(t.state.store.get(1).await.unwrap().filename, "outside.png");

    let (status, _, body) = send(&t.app, upload_request("/upload", "..", b"x")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Invalid filename"));
}

#[tokio::test]
async fn dashboard_escapes_filenames() {
    let t = test_app(ScriptedTools::new()).await;
    send(&t.app, upload_request("/upload", "a&b<c>.png", b"hello")).await;

    let (_, _, body) = send(&t.app, get("/dashboard")).await;
    assert!(body.contains("a&amp;b&lt;c&gt;.png"));
    assert!(!body.contains("<c>"));
}

#[tokio::test]
async fn metrics_track_categories_and_ocr() {
    let t = test_app(ScriptedTools::new()).await;
    send(&t.app, upload_request("/upload", "a.pdf", b"TEXT:invoice")).await;
    send(&t.app, upload_request("/upload", "b.pdf", b"SCAN:invoice")).await;
    send(&t.app, upload_request("/upload", "c.png", b"lecture")).await;

    let (_, _, text) = send(&t.app, get("/metrics")).await;
    let metrics = prom_parse(&text).unwrap();
    assert_eq!(metrics.counters.get("docsort_documents_processed_total"), Some(&3.0));
    assert_eq!(
        metrics
            .counters
            .get(r#"docsort_documents_by_category_total{category="Bill"}"#),
        Some(&2.0)
    );
    assert_eq!(metrics.counters.get("docsort_ocr_fallbacks_total"), Some(&2.0));
    assert_eq!(
        metrics.histograms["docsort_extraction_duration_ms"].count,
        3.0
    );
}

#[tokio::test]
async fn oversized_upload_is_rejected_with_413() {
    let t = test_app_with(ScriptedTools::new(), |config| {
        config.server.max_request_body_size_mb = 1;
    })
    .await;
    let big = vec![b'a'; 2 * 1024 * 1024];

    let (status, _, body) = send(&t.app, upload_request("/upload", "big.png", &big)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body.starts_with("❌ Error processing file: Upload too large"));

    let (status, _, body) =
        send(&t.app, upload_request("/api/documents", "big.png", &big)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    let err: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(err["error_type"], "PayloadTooLarge");
    assert_eq!(t.state.store.count().await.unwrap(), 0);
}
