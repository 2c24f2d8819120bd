//! End-to-end runs of the upload pipeline against a stand-in back-office
//! endpoint served by axum on a random local port.

use axum::{http::StatusCode, routing::post, Json, Router};
use bulk_uploader::upload::{
    project_preview, validate, SchemaRegistry, SessionState, SpreadsheetDecoder,
    SubmissionGateway, UploadSession, ValidationOutcome, DEFAULT_PREVIEW_ROWS,
};
use bulk_uploader::{SubmissionError, UploadError};
use rust_xlsxwriter::Workbook;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

const PAYMENT_HEADER: [&str; 4] = ["Customer ID", "Pay Mode", "Pay Type", "Pay Amount"];

type Received = Arc<Mutex<Vec<Value>>>;

async fn spawn_backoffice(status: StatusCode) -> (String, Received) {
    let received: Received = Arc::new(Mutex::new(Vec::new()));
    let store = received.clone();

    let app = Router::new().route(
        "/api/v1/bulk-uploads",
        post(move |Json(body): Json<Value>| {
            let store = store.clone();
            async move {
                store.lock().unwrap().push(body);
                (status, Json(json!({ "batch_id": "B-1001" })))
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), received)
}

fn payments_xlsx(header: &[&str], rows: usize) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (c, label) in header.iter().enumerate() {
        sheet.write_string(0, c as u16, *label).unwrap();
    }
    for r in 1..=rows {
        for c in 0..header.len() {
            let value = match c {
                0 => format!("C-{:04}", r),
                3 => format!("{}", r * 10),
                _ => "Cash".to_string(),
            };
            sheet.write_string(r as u32, c as u16, value).unwrap();
        }
    }
    workbook.save_to_buffer().unwrap()
}

fn load(session: &mut UploadSession, bytes: Vec<u8>) {
    session
        .load_file(
            &SchemaRegistry::builtin(),
            &SpreadsheetDecoder::default(),
            "bulk_payment",
            "payments.xlsx",
            bytes,
        )
        .unwrap();
}

#[tokio::test]
async fn valid_file_is_previewed_and_submitted() {
    let (base_url, received) = spawn_backoffice(StatusCode::CREATED).await;
    let mut session = UploadSession::new();
    load(&mut session, payments_xlsx(&PAYMENT_HEADER, 3));

    let preview = session.preview(DEFAULT_PREVIEW_ROWS).unwrap();
    assert_eq!(preview.rows.len(), 3);
    assert!(!preview.truncated);

    let state = session.submit(&SubmissionGateway::new(&base_url)).await.unwrap();
    match state {
        SessionState::Success {
            upload_type,
            submitted,
            receipt,
        } => {
            assert_eq!(upload_type, "bulk_payment");
            assert_eq!(*submitted, 3);
            assert_eq!(receipt.status, 201);
            assert_eq!(receipt.body, Some(json!({ "batch_id": "B-1001" })));
        }
        other => panic!("expected success, got {:?}", other),
    }

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0]["type"], "bulk_payment");
    assert_eq!(received[0]["records"][0]["Customer ID"], "C-0001");
    assert_eq!(received[0]["records"][2]["Pay Amount"], "30");
}

#[tokio::test]
async fn missing_column_stops_before_submission() {
    let (_base_url, received) = spawn_backoffice(StatusCode::OK).await;
    let bytes = payments_xlsx(&PAYMENT_HEADER[..3], 2);

    let registry = SchemaRegistry::builtin();
    let descriptor = registry.descriptor_for("bulk_payment").unwrap();
    let sheet = SpreadsheetDecoder::default()
        .decode("payments.xlsx", bytes.clone())
        .unwrap();
    assert_eq!(
        validate(sheet.rows, descriptor),
        ValidationOutcome::Invalid(vec!["Pay Amount".to_string()])
    );

    let mut session = UploadSession::new();
    load(&mut session, bytes);
    assert_eq!(session.state().name(), "failed");
    assert!(session.error_message().unwrap().contains("Pay Amount"));
    assert!(matches!(
        session.begin_upload(),
        Err(UploadError::InvalidTransition { .. })
    ));
    assert!(received.lock().unwrap().is_empty());
}

#[tokio::test]
async fn long_file_previews_ten_but_sends_all() {
    let (base_url, received) = spawn_backoffice(StatusCode::OK).await;
    let mut session = UploadSession::new();
    load(&mut session, payments_xlsx(&PAYMENT_HEADER, 25));

    let batch = session.batch().unwrap().clone();
    let preview = project_preview(&batch.rows, DEFAULT_PREVIEW_ROWS);
    assert_eq!(preview.rows, &batch.rows[..10]);
    assert_eq!(preview.rows[9].get("Customer ID"), "C-0010");
    assert!(preview.truncated);
    assert_eq!(preview.total_rows, 25);

    session.submit(&SubmissionGateway::new(&base_url)).await.unwrap();
    let received = received.lock().unwrap();
    assert_eq!(received[0]["records"].as_array().unwrap().len(), 25);
}

#[tokio::test]
async fn rejected_submission_keeps_rows_for_another_try() {
    let (failing_url, _) = spawn_backoffice(StatusCode::INTERNAL_SERVER_ERROR).await;
    let mut session = UploadSession::new();
    load(&mut session, payments_xlsx(&PAYMENT_HEADER, 4));
    let loaded = session.batch().unwrap().clone();

    session
        .submit(&SubmissionGateway::new(&failing_url))
        .await
        .unwrap();
    assert_eq!(session.state().name(), "failed");
    assert!(session.error_message().unwrap().contains("500"));
    assert_eq!(session.batch(), Some(&loaded));

    let (working_url, received) = spawn_backoffice(StatusCode::ACCEPTED).await;
    session.retry().unwrap();
    session
        .submit(&SubmissionGateway::new(&working_url))
        .await
        .unwrap();
    assert_eq!(session.state().name(), "finished");
    assert_eq!(received.lock().unwrap()[0]["records"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn gateway_reports_status_and_body_on_rejection() {
    let (base_url, _) = spawn_backoffice(StatusCode::UNPROCESSABLE_ENTITY).await;
    let err = SubmissionGateway::new(&base_url)
        .submit("bulk_payment", &[])
        .await
        .unwrap_err();
    match err {
        SubmissionError::Rejected { status, body } => {
            assert_eq!(status, 422);
            assert!(body.contains("B-1001"));
        }
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut session = UploadSession::new();
    load(&mut session, payments_xlsx(&PAYMENT_HEADER, 1));
    session
        .submit(&SubmissionGateway::new(&format!("http://{}", addr)))
        .await
        .unwrap();

    assert!(session.can_retry());
    assert!(session
        .error_message()
        .unwrap()
        .contains("failed to send request"));
}

#[tokio::test]
async fn rejection_keeps_its_status_when_the_body_is_cut_short() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        // Drain the request before answering so the client is done writing.
        let mut request = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&request).to_lowercase();
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if request.len() >= end + 4 + length {
                    break;
                }
            }
        }

        socket
            .write_all(b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 100\r\n\r\nshort")
            .await
            .unwrap();
        socket.shutdown().await.unwrap();
    });

    let err = SubmissionGateway::new(&format!("http://{}", addr))
        .submit("bulk_payment", &[])
        .await
        .unwrap_err();
    assert!(
        matches!(err, SubmissionError::Rejected { status: 500, .. }),
        "got {:?}",
        err
    );
}
