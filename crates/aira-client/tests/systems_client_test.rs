//! Contract tests for the registry client and its gateway implementation.
//!
//! ## Endpoints Tested
//!
//! | Method | Path | Test |
//! |--------|------|------|
//! | POST | `/ai-systems/` | `create_*` |
//! | GET | `/ai-systems/{id}` | `fetch_*` |
//! | PUT | `/ai-systems/{id}/assessment` | `save_*` |
//! | POST | `/ai-systems/{id}/classify` | `classify_*` |
//! | (composite) | | `controller_*` |

use aira_classifier::ClassificationError;
use aira_core::{AnswerRecord, AnswerValue, RiskTier, StepIndex, SystemId};
use aira_client::{AiraClient, ClientConfig, ClientError, CreateSystemRequest};
use aira_wizard::{
    AssessmentGateway, ClassificationMode, PersistenceError, StepController, StepOutcome, StepWrite,
    WizardError,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SYSTEM: &str = "6f1c2b8e-1d7a-4a53-9a55-2f7c3c1d9e01";

fn system_id() -> SystemId {
    SystemId::parse(SYSTEM).unwrap()
}

fn test_client(server: &MockServer, token: Option<&str>) -> AiraClient {
    let mut config = ClientConfig::new(&server.uri()).unwrap();
    if let Some(token) = token {
        config = config.with_token(token);
    }
    AiraClient::new(config).unwrap()
}

fn step(n: i64) -> StepIndex {
    StepIndex::new(n).unwrap()
}

// ── POST /ai-systems/ ───────────────────────────────────────────────

#[tokio::test]
async fn create_registers_system_with_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ai-systems/"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_partial_json(json!({"name": "Screener", "development_stage": "planning"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "ai_system": {"id": SYSTEM, "name": "Screener", "status": "draft"},
                "assessment": {"current_step": 1, "completed_steps": 0}
            },
            "message": "AI system and assessment created successfully"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server, Some("test-token"));
    let created = client
        .systems()
        .create(&CreateSystemRequest {
            name: "Screener".into(),
            description: None,
            development_stage: Some("planning".into()),
        })
        .await
        .unwrap();
    assert_eq!(created.ai_system.id, system_id());
    assert_eq!(created.ai_system.status.as_deref(), Some("draft"));
}

#[tokio::test]
async fn create_surfaces_server_error_without_retry() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ai-systems/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database unavailable"))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server, None);
    let err = client
        .systems()
        .create(&CreateSystemRequest {
            name: "Screener".into(),
            description: None,
            development_stage: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::ApiError { status: 500, .. }));
}

// ── GET /ai-systems/{id} ────────────────────────────────────────────

#[tokio::test]
async fn fetch_maps_assessment_row_to_snapshot() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/ai-systems/{SYSTEM}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "ai_system": {"id": SYSTEM, "name": "Screener"},
                "assessment": {
                    "id": "row-1",
                    "current_step": 3,
                    "completed_steps": 2,
                    "step_1_completed": true,
                    "step_2_completed": true,
                    "system_name": "Screener",
                    "target_users": "[\"employees\"]"
                },
                "classification": null
            }
        })))
        .mount(&server)
        .await;

    let client = test_client(&server, None);
    let snapshot = client.fetch(system_id()).await.unwrap();
    assert_eq!(snapshot.system_id, Some(system_id()));
    assert_eq!(snapshot.current_step, Some(step(3)));
    assert_eq!(snapshot.completed_steps.resolve().len(), 2);
    assert_eq!(snapshot.answers.len(), 2);
}

#[tokio::test]
async fn fetch_unknown_system_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/ai-systems/{SYSTEM}")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "AI system not found"})))
        .mount(&server)
        .await;

    let client = test_client(&server, None);
    assert_eq!(
        client.fetch(system_id()).await,
        Err(PersistenceError::NotFound(system_id()))
    );
}

#[tokio::test]
async fn fetch_unsuccessful_envelope_is_protocol_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/ai-systems/{SYSTEM}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "assessment table unavailable"
        })))
        .mount(&server)
        .await;

    let client = test_client(&server, None);
    assert!(matches!(
        client.fetch(system_id()).await,
        Err(PersistenceError::Protocol(msg)) if msg.contains("assessment table unavailable")
    ));
}

// ── PUT /ai-systems/{id}/assessment ─────────────────────────────────

#[tokio::test]
async fn save_sends_step_and_draft_marker() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(format!("/ai-systems/{SYSTEM}/assessment")))
        .and(body_partial_json(json!({
            "step": 2,
            "data": {"target_users": ["students"], "is_draft": true}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"updated_at": "2026-03-01T10:00:00+00:00"},
            "message": "Step 2 completed successfully"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server, None);
    let write = StepWrite {
        step: step(2),
        data: [("target_users", AnswerValue::set(["students"]))]
            .into_iter()
            .collect::<AnswerRecord>(),
        is_draft: true,
    };
    let ack = client.save(system_id(), &write).await.unwrap();
    assert_eq!(
        ack.updated_at.map(|t| t.to_iso8601()),
        Some("2026-03-01T10:00:00Z".to_string())
    );
}

#[tokio::test]
async fn save_rejection_keeps_status() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(format!("/ai-systems/{SYSTEM}/assessment")))
        .respond_with(ResponseTemplate::new(400).set_body_string("Failed to update assessment"))
        .mount(&server)
        .await;

    let client = test_client(&server, None);
    let write = StepWrite {
        step: step(1),
        data: AnswerRecord::new(),
        is_draft: false,
    };
    assert_eq!(
        client.save(system_id(), &write).await,
        Err(PersistenceError::Rejected {
            status: 400,
            message: "Failed to update assessment".into()
        })
    );
}

// ── POST /ai-systems/{id}/classify ──────────────────────────────────

#[tokio::test]
async fn classify_accepts_registry_field_names() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/ai-systems/{SYSTEM}/classify")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "risk_level": "high",
                "primary_reason": "Annex III high-risk area: employment",
                "confidence_level": "medium",
                "article_5_violation": false,
                "annex_iii_match": true,
                "created_at": "2026-03-01T10:00:00+00:00"
            }
        })))
        .mount(&server)
        .await;

    let client = test_client(&server, None);
    let remote = client.classify(system_id()).await.unwrap();
    let result = remote.validate(aira_core::Timestamp::now()).unwrap();
    assert_eq!(result.risk_tier, RiskTier::High);
    assert!(result.category_match());
    assert!(!result.prohibited_practice_violation());
}

// ── Controller over HTTP ────────────────────────────────────────────

#[tokio::test]
async fn controller_resumes_and_rejects_malformed_remote_result() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/ai-systems/{SYSTEM}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "ai_system": {"id": SYSTEM, "name": "Screener"},
                "assessment": {"current_step": 8, "completed_steps": 7}
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/ai-systems/{SYSTEM}/classify")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"risk_level": "limited", "confidence_level": "low"}
        })))
        .mount(&server)
        .await;

    let mut controller = StepController::new(test_client(&server, None), ClassificationMode::Remote);
    let session = controller.load_session(system_id()).await.unwrap();
    assert_eq!(session.current_step, step(8));
    assert!(session.missing_classification_steps().is_empty());

    let err = controller.request_classification(system_id()).await.unwrap_err();
    assert!(matches!(
        err,
        WizardError::Classification(ClassificationError::MalformedClassificationResult(_))
    ));
}

#[tokio::test]
async fn controller_does_not_advance_when_save_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/ai-systems/{SYSTEM}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "ai_system": {"id": SYSTEM, "name": "Screener"},
                "assessment": {"current_step": 1, "completed_steps": 0}
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(format!("/ai-systems/{SYSTEM}/assessment")))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let mut controller = StepController::new(test_client(&server, None), ClassificationMode::Local);
    controller.load_session(system_id()).await.unwrap();
    let raw = json!({
        "system_name": "Screener",
        "system_description": "Ranks job applicants for interview",
        "development_stage": "testing",
        "planned_deployment_timeline": "within_6_months"
    });
    let serde_json::Value::Object(raw) = raw else { unreachable!() };

    let err = controller.go_next(step(1), &raw).await.unwrap_err();
    assert!(matches!(
        err,
        WizardError::Persistence(PersistenceError::Rejected { status: 503, .. })
    ));
    let session = controller.session().unwrap();
    assert_eq!(session.current_step, step(1));
    assert!(session.completed_steps.is_empty());

    // Invalid data never reaches the registry.
    let mut bad = raw.clone();
    bad.remove("development_stage");
    let outcome = controller.go_next(step(1), &bad).await.unwrap();
    assert!(matches!(outcome, StepOutcome::Rejected(errors) if errors.contains_key("development_stage")));
}
