//! End-to-end submission scenarios against a mock endpoint

use loanapp_client::{
    AppConfig, FieldName, FormModel, SubmissionError, SubmissionOutcome, SubmissionStatus,
};
use std::sync::Arc;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn form_for(endpoint: &str) -> FormModel {
    let config = AppConfig {
        endpoint_url: Some(endpoint.to_string()),
        ..AppConfig::default()
    };
    FormModel::with_rules(config.build_client().unwrap(), config.rules())
}

fn fill(form: &FormModel) {
    form.set_field("fullName", "Jane Doe");
    form.set_field("email", "jane@example.com");
    form.set_field("phone", "+1234567890");
    form.set_field("loanAmount", "5000");
    form.set_field("loanPurpose", "Car");
}

#[tokio::test]
async fn scenario_a_success_resets_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({ "id": "rec1" })))
        .expect(1)
        .mount(&server)
        .await;

    let form = form_for(&server.uri());
    fill(&form);

    assert_eq!(form.submit().await, SubmissionOutcome::Submitted);
    assert_eq!(form.status(), SubmissionStatus::Succeeded);
    assert!(form.fields().is_empty());
}

#[tokio::test]
async fn scenario_b_negative_amount_short_circuits() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let form = form_for(&server.uri());
    fill(&form);
    form.set_field("loanAmount", "-5");

    let SubmissionOutcome::Invalid(errors) = form.submit().await else {
        panic!("expected validation errors");
    };
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.get(FieldName::LoanAmount), Some("Loan amount must be greater than 0"));
    assert_eq!(form.status(), SubmissionStatus::Idle);
    assert_eq!(form.fields().loan_amount, "-5");
}

#[tokio::test]
async fn scenario_b_invalid_submit_keeps_failed_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(serde_json::json!({ "error": "duplicate record" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let form = form_for(&server.uri());
    fill(&form);
    assert!(matches!(form.submit().await, SubmissionOutcome::Failed(_)));
    assert_eq!(form.status(), SubmissionStatus::Failed("duplicate record".into()));

    form.set_field("loanAmount", "0");
    assert!(matches!(form.submit().await, SubmissionOutcome::Invalid(_)));
    assert_eq!(form.status(), SubmissionStatus::Failed("duplicate record".into()));
    assert!(!form.is_busy());
}

#[tokio::test]
async fn scenario_c_server_error_keeps_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(serde_json::json!({ "error": "duplicate record" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let form = form_for(&server.uri());
    fill(&form);
    let before = form.fields();

    let outcome = form.submit().await;
    assert_eq!(
        outcome,
        SubmissionOutcome::Failed(SubmissionError::Rejected {
            status: 500,
            message: Some("duplicate record".into()),
        })
    );
    assert_eq!(form.status(), SubmissionStatus::Failed("duplicate record".into()));
    assert_eq!(form.fields(), before);
}

#[tokio::test]
async fn scenario_d_transport_failure_uses_fallback() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let uri = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let form = form_for(&uri);
    fill(&form);

    assert!(matches!(
        form.submit().await,
        SubmissionOutcome::Failed(SubmissionError::Transport(_))
    ));
    assert_eq!(
        form.status(),
        SubmissionStatus::Failed("Failed to submit application.".into())
    );
    assert!(!form.is_busy());
}

#[tokio::test]
async fn resubmit_after_failure_reaches_endpoint_again() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let form = Arc::new(form_for(&server.uri()));
    fill(&form);

    assert!(matches!(form.submit().await, SubmissionOutcome::Failed(_)));
    assert_eq!(form.status(), SubmissionStatus::Failed("Failed to submit application.".into()));

    assert_eq!(form.submit().await, SubmissionOutcome::Submitted);
    assert_eq!(form.status(), SubmissionStatus::Succeeded);
}
