use assert_matches::assert_matches;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use consultation_cell::{
    AttachPrescriptionRequest, ConsultationError, ConsultationStatus, ConsultationStore,
    Medication, PrescriptionWorkflow,
};
use shared_utils::test_utils::{MockSupabaseResponses, TestConfig, TestUser};

fn furosemide() -> Medication {
    Medication {
        name: "Furosemide".to_string(),
        dosage: "40mg".to_string(),
        frequency: "once daily".to_string(),
        duration_days: Some(30),
    }
}

fn request(medications: Vec<Medication>) -> AttachPrescriptionRequest {
    AttachPrescriptionRequest {
        medications,
        notes: Some("Recheck eGFR in four weeks".to_string()),
    }
}

async fn workflow_with(server: &MockServer, row: Value) -> PrescriptionWorkflow {
    Mock::given(method("GET"))
        .and(path("/rest/v1/consultations"))
        .and(query_param("id", "eq.cons_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![row]))
        .mount(server)
        .await;

    let config = TestConfig::with_supabase_url(server.uri()).to_app_config();
    PrescriptionWorkflow::new(ConsultationStore::new(&config))
}

#[test]
fn test_request_validation() {
    assert_matches!(
        PrescriptionWorkflow::validate_request(&request(vec![])),
        Err(ConsultationError::ValidationError { .. })
    );

    let mut blank_dose = furosemide();
    blank_dose.dosage = "  ".to_string();
    assert_matches!(
        PrescriptionWorkflow::validate_request(&request(vec![blank_dose])),
        Err(ConsultationError::ValidationError { message }) if message.contains("dosage")
    );

    assert!(PrescriptionWorkflow::validate_request(&request(vec![furosemide()])).is_ok());
}

#[tokio::test]
async fn test_prescription_completes_consultation() {
    let server = MockServer::start().await;
    let doctor = TestUser::doctor("nephro@example.com");
    let workflow = workflow_with(
        &server,
        MockSupabaseResponses::consultation_with("cons_1", "sarah@example.com", json!({})),
    )
    .await;

    let stored = MockSupabaseResponses::consultation_with(
        "cons_1",
        "sarah@example.com",
        json!({
            "status": "completed",
            "prescription": {
                "id": "5f0c6b1e-8c2b-4c1e-9d3a-1b2c3d4e5f60",
                "medications": [{
                    "name": "Furosemide",
                    "dosage": "40mg",
                    "frequency": "once daily",
                    "duration_days": 30
                }],
                "notes": "Recheck eGFR in four weeks",
                "issued_by": doctor.id,
                "issued_at": "2024-12-25T10:30:00Z"
            }
        }),
    );

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/consultations"))
        .and(query_param("id", "eq.cons_1"))
        .and(body_partial_json(json!({ "status": "completed" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![stored]))
        .expect(1)
        .mount(&server)
        .await;

    let consultation = workflow
        .attach_prescription("cons_1", request(vec![furosemide()]), &doctor.to_user(), "token")
        .await
        .unwrap();

    assert_eq!(consultation.status, ConsultationStatus::Completed);
    let prescription = consultation.prescription.unwrap();
    assert_eq!(prescription.medications, vec![furosemide()]);
    assert_eq!(prescription.issued_by, doctor.id);
}

#[tokio::test]
async fn test_cancelled_consultation_rejects_prescription() {
    let server = MockServer::start().await;
    let workflow = workflow_with(
        &server,
        MockSupabaseResponses::consultation_with(
            "cons_1",
            "sarah@example.com",
            json!({ "status": "cancelled" }),
        ),
    )
    .await;

    let result = workflow
        .attach_prescription(
            "cons_1",
            request(vec![furosemide()]),
            &TestUser::doctor("nephro@example.com").to_user(),
            "token",
        )
        .await;

    assert_matches!(result, Err(ConsultationError::Cancelled));
}

#[tokio::test]
async fn test_second_prescription_is_rejected() {
    let server = MockServer::start().await;
    let workflow = workflow_with(
        &server,
        MockSupabaseResponses::consultation_with(
            "cons_1",
            "sarah@example.com",
            json!({
                "status": "completed",
                "prescription": {
                    "id": "5f0c6b1e-8c2b-4c1e-9d3a-1b2c3d4e5f60",
                    "medications": [],
                    "issued_by": "doc-1",
                    "issued_at": "2024-12-25T10:30:00Z"
                }
            }),
        ),
    )
    .await;

    let result = workflow
        .attach_prescription(
            "cons_1",
            request(vec![furosemide()]),
            &TestUser::admin("admin@example.com").to_user(),
            "token",
        )
        .await;

    assert_matches!(result, Err(ConsultationError::PrescriptionAlreadyIssued));
}

#[tokio::test]
async fn test_patient_role_is_unauthorized() {
    let config = TestConfig::default().to_app_config();
    let workflow = PrescriptionWorkflow::new(ConsultationStore::new(&config));

    let result = workflow
        .attach_prescription(
            "cons_1",
            request(vec![furosemide()]),
            &TestUser::patient("sarah@example.com").to_user(),
            "token",
        )
        .await;

    assert_matches!(result, Err(ConsultationError::Unauthorized));
}

#[tokio::test]
async fn test_prescription_write_requires_unprescribed_row() {
    let server = MockServer::start().await;
    let workflow = workflow_with(
        &server,
        MockSupabaseResponses::consultation_with("cons_1", "sarah@example.com", json!({})),
    )
    .await;

    // A concurrent prescription landed between the read and the write
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/consultations"))
        .and(query_param("id", "eq.cons_1"))
        .and(query_param("prescription", "is.null"))
        .and(query_param("status", "neq.cancelled"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Vec::<Value>::new()))
        .expect(1)
        .mount(&server)
        .await;

    let result = workflow
        .attach_prescription(
            "cons_1",
            request(vec![furosemide()]),
            &TestUser::doctor("nephro@example.com").to_user(),
            "token",
        )
        .await;

    assert_matches!(result, Err(ConsultationError::PrescriptionAlreadyIssued));
}
