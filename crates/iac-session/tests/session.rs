//! Behavioral tests for the analysis session.

mod common;

use std::sync::Arc;

use common::{
    Call, Reply, ScriptedBackend, ai_result, artifact, drive, ready_session, report,
    sample_metadata, simulation_result, upload_result,
};
use futures_util::FutureExt;
use iac_client::ClientError;
use iac_model::{KnownHashes, Metadata, RiskLevel};
use iac_session::{
    Message, Session, SessionError, SessionRuntime, Severity, Stage, StageStatus,
};
use serde_json::json;

fn known(sha256: &str, md5: &str) -> KnownHashes {
    KnownHashes::new(Some(sha256.to_string()), Some(md5.to_string()))
}

#[test]
fn upload_without_file_is_rejected() {
    let backend = Arc::new(ScriptedBackend::succeeding());
    let mut session = Session::new(Arc::clone(&backend));

    let err = session.update(Message::upload()).unwrap_err();
    assert_eq!(err, SessionError::Validation);

    let view = session.view();
    let upload = view.stage(Stage::Upload).expect("upload stage");
    assert_eq!(upload.error.as_deref(), Some("Please select a file first."));
    assert_eq!(backend.call_count(), 0);
}

#[test]
fn dependent_stages_require_a_successful_upload() {
    let backend = Arc::new(ScriptedBackend::succeeding());
    let mut session = Session::new(Arc::clone(&backend));
    session
        .update(Message::select_file(artifact("photo.jpg")))
        .expect("select");

    for message in [
        Message::run_ai_analysis(),
        Message::run_verification(),
        Message::toggle_simulation(),
        Message::run_simulation(),
    ] {
        let err = session.update(message).unwrap_err();
        assert!(matches!(err, SessionError::Precondition { .. }), "{err:?}");
    }

    let view = session.view();
    assert!(!view.ready);
    assert!(!view.actions.ai_analysis);
    assert!(!view.actions.verification);
    assert!(!view.actions.toggle_simulation);
    assert!(view.actions.upload);
    assert_eq!(backend.call_count(), 0);
}

#[test]
fn hash_matches_follow_the_backend_verdict() {
    let backend = Arc::new(ScriptedBackend::new());
    let mut result = upload_result("abc123");
    result.sha_match = Some(true);
    result.md5_match = Some(false);
    backend.push_upload(Reply::ok(result));

    let mut session = Session::new(Arc::clone(&backend));
    session
        .update(Message::KnownHashesChanged(known(" abc123 ", "zzz")))
        .expect("hashes");
    session
        .update(Message::select_file(artifact("photo.jpg")))
        .expect("select");
    let task = session.update(Message::upload()).expect("upload");
    drive(&mut session, task);

    let hashes = session.view().hashes.expect("hash panel");
    let sha = hashes.sha256_match.expect("sha indicator");
    assert!(sha.matched);
    assert_eq!(sha.severity, Severity::Success);
    let md5 = hashes.md5_match.expect("md5 indicator");
    assert!(!md5.matched);
    assert_eq!(md5.severity, Severity::Danger);
    assert!(!hashes.transfer_verified);

    assert_eq!(
        backend.calls(),
        vec![Call::Upload {
            file_name: "photo.jpg".to_string(),
            known_sha256: Some("abc123".to_string()),
            known_md5: Some("zzz".to_string()),
        }]
    );
}

#[test]
fn transfer_digest_is_checked_against_local_bytes() {
    let backend = Arc::new(ScriptedBackend::succeeding());
    let session = ready_session(backend, "photo.jpg");

    let hashes = session.view().hashes.expect("hash panel");
    assert!(hashes.transfer_verified);
    assert!(hashes.sha256_match.is_none());
    assert!(hashes.md5_match.is_none());
}

#[test]
fn flags_render_as_warnings_only() {
    let backend = Arc::new(ScriptedBackend::succeeding());
    let session = ready_session(backend, "photo.jpg");
    let view = session.view();

    assert_eq!(
        view.warnings,
        Some(vec![
            "Timestamp mismatch".to_string(),
            "GPS missing".to_string()
        ])
    );
    let metadata = view.metadata.expect("metadata panel");
    assert!(metadata.rows.iter().all(|row| row.field != "Flags"));
    assert_eq!(
        metadata
            .rows
            .iter()
            .map(|row| row.field.as_str())
            .collect::<Vec<_>>(),
        vec!["File Name", "Camera Make", "Software", "GPS Latitude"]
    );
    assert_eq!(metadata.missing_fields, vec!["GPS Latitude"]);
    assert_eq!(view.ela_asset.as_deref(), Some("/uploads/ela_photo.jpg"));
}

#[test]
fn no_flags_hides_warnings() {
    let backend = Arc::new(ScriptedBackend::new());
    let mut result = upload_result("abc123");
    result.metadata = Metadata::from_value(json!({ "Make": "Canon", "Flags": [] }))
        .expect("metadata");
    backend.push_upload(Reply::ok(result));
    let session = ready_session(backend, "photo.jpg");

    let view = session.view();
    assert!(view.is_metadata_visible());
    assert!(!view.are_warnings_visible());
}

#[test]
fn busy_stage_rejects_a_second_invocation() {
    let backend = Arc::new(ScriptedBackend::succeeding());
    let mut session = Session::new(Arc::clone(&backend));
    session
        .update(Message::select_file(artifact("photo.jpg")))
        .expect("select");

    let first = session.update(Message::upload()).expect("upload");
    assert!(!session.view().actions.upload);
    let err = session.update(Message::upload()).unwrap_err();
    assert_eq!(err, SessionError::Busy(Stage::Upload));

    drive(&mut session, first);
    assert_eq!(backend.call_count(), 1);
    assert_eq!(session.store().status(Stage::Upload), StageStatus::Succeeded);
    assert!(session.store().error(Stage::Upload).is_none());
}

#[test]
fn busy_is_scoped_per_stage() {
    let backend = Arc::new(ScriptedBackend::succeeding());
    let mut session = ready_session(Arc::clone(&backend), "photo.jpg");

    let ai = session.update(Message::run_ai_analysis()).expect("ai");
    let verification = session
        .update(Message::run_verification())
        .expect("verification");
    assert_eq!(
        session.update(Message::run_ai_analysis()).unwrap_err(),
        SessionError::Busy(Stage::AiAnalysis)
    );
    assert_eq!(session.store().pending_count(), 2);

    drive(&mut session, verification);
    drive(&mut session, ai);
    let view = session.view();
    assert!(view.is_ai_panel_visible());
    assert!(view.is_verification_panel_visible());
    assert_eq!(backend.call_count(), 3);
}

#[test]
fn new_file_clears_every_result() {
    let backend = Arc::new(ScriptedBackend::succeeding());
    let mut session = ready_session(Arc::clone(&backend), "first.jpg");
    for message in [Message::run_ai_analysis(), Message::run_verification()] {
        let task = session.update(message).expect("stage");
        drive(&mut session, task);
    }
    session.update(Message::toggle_simulation()).expect("toggle");
    let task = session.update(Message::run_simulation()).expect("simulate");
    drive(&mut session, task);
    assert!(session.view().is_simulation_results_visible());

    session
        .update(Message::select_file(artifact("second.jpg")))
        .expect("select");

    let store = session.store();
    assert!(store.upload().is_idle());
    assert!(store.ai_analysis().is_idle());
    assert!(store.verification().is_idle());
    assert!(store.simulation().run().is_idle());
    assert!(!store.simulation().is_active());
    let view = session.view();
    assert_eq!(view.file_name.as_deref(), Some("second.jpg"));
    assert!(view.hashes.is_none());
    assert!(!view.is_metadata_visible());
    assert!(!view.is_ai_panel_visible());
    assert!(!view.is_verification_panel_visible());
    assert!(!view.is_simulation_panel_visible());
    assert!(!view.is_simulation_results_visible());
    assert!(view.stages.iter().all(|stage| stage.error.is_none()));
}

#[test]
fn new_file_clears_stage_errors() {
    let backend = Arc::new(ScriptedBackend::succeeding());
    backend.push_verification(Reply::err(ClientError::Status {
        status: 500,
        body: "boom".to_string(),
    }));
    let mut session = ready_session(Arc::clone(&backend), "first.jpg");
    let task = session.update(Message::run_verification()).expect("verify");
    drive(&mut session, task);
    assert!(session.store().error(Stage::Verification).is_some());

    session
        .update(Message::select_file(artifact("second.jpg")))
        .expect("select");
    assert!(session.store().error(Stage::Verification).is_none());
}

#[test]
fn stale_upload_response_is_discarded() {
    let backend = Arc::new(ScriptedBackend::new());
    let mut stale = upload_result("aaa");
    stale.ela_filename = "ela_first.jpg".to_string();
    let mut fresh = upload_result("bbb");
    fresh.ela_filename = "ela_second.jpg".to_string();
    backend.push_upload(Reply::ok(stale));
    backend.push_upload(Reply::ok(fresh));

    let mut session = Session::new(Arc::clone(&backend));
    session
        .update(Message::select_file(artifact("first.jpg")))
        .expect("select");
    let first = session.update(Message::upload()).expect("upload");

    session
        .update(Message::select_file(artifact("second.jpg")))
        .expect("select");
    let second = session.update(Message::upload()).expect("upload");

    // Poll in issue order so each request takes its scripted reply, then
    // apply the responses in reverse.
    let mut first = first.into_futures();
    let mut second = second.into_futures();
    let first_reply = first.remove(0).now_or_never().expect("immediate");
    let second_reply = second.remove(0).now_or_never().expect("immediate");
    session.update(second_reply).expect("second");
    session.update(first_reply).expect("first");

    let view = session.view();
    assert_eq!(view.file_name.as_deref(), Some("second.jpg"));
    assert_eq!(view.ela_asset.as_deref(), Some("/uploads/ela_second.jpg"));
    assert_eq!(view.hashes.expect("hashes").sha256, "bbb");
}

#[test]
fn reupload_invalidates_dependent_results() {
    let backend = Arc::new(ScriptedBackend::succeeding());
    let mut session = ready_session(Arc::clone(&backend), "photo.jpg");
    let ai = session.update(Message::run_ai_analysis()).expect("ai");
    session.update(Message::toggle_simulation()).expect("toggle");

    let upload = session.update(Message::upload()).expect("re-upload");
    assert!(!session.store().is_ready());
    assert!(!session.store().simulation().is_active());

    drive(&mut session, ai);
    assert!(session.store().ai_analysis().is_idle());
    drive(&mut session, upload);
    assert!(session.store().is_ready());
    assert!(!session.view().is_ai_panel_visible());
}

#[test]
fn failed_upload_leaves_session_not_ready() {
    let backend = Arc::new(ScriptedBackend::new());
    let mut session = Session::new(Arc::clone(&backend));
    session
        .update(Message::select_file(artifact("photo.jpg")))
        .expect("select");
    let task = session.update(Message::upload()).expect("upload");
    drive(&mut session, task);

    let view = session.view();
    assert!(!view.ready);
    assert!(!view.is_metadata_visible());
    assert_eq!(
        view.stage(Stage::Upload).and_then(|stage| stage.error.as_deref()),
        Some("Error uploading file. Ensure the backend is running.")
    );
    assert!(view.actions.upload);
}

#[test]
fn stage_failure_does_not_touch_other_stages() {
    let backend = Arc::new(ScriptedBackend::succeeding());
    backend.push_verification(Reply::err(ClientError::Network("refused".to_string())));
    let mut session = ready_session(Arc::clone(&backend), "photo.jpg");

    let ai = session.update(Message::run_ai_analysis()).expect("ai");
    let verification = session.update(Message::run_verification()).expect("verify");
    drive(&mut session, verification);
    drive(&mut session, ai);

    let view = session.view();
    assert!(view.is_metadata_visible());
    assert!(view.is_ai_panel_visible());
    assert!(!view.is_verification_panel_visible());
    assert_eq!(
        view.stage(Stage::Verification)
            .and_then(|stage| stage.error.as_deref()),
        Some("Failed to verify authenticity.")
    );
    assert_eq!(view.failed_stages().count(), 1);

    // A retry clears the error while pending and settles to exactly one outcome.
    let retry = session.update(Message::run_verification()).expect("retry");
    assert!(session.store().error(Stage::Verification).is_none());
    drive(&mut session, retry);
    assert!(session.view().is_verification_panel_visible());
    assert!(session.store().error(Stage::Verification).is_none());
}

#[test]
fn ai_analysis_sends_current_metadata() {
    let backend = Arc::new(ScriptedBackend::succeeding());
    let mut session = ready_session(Arc::clone(&backend), "photo.jpg");
    let task = session.update(Message::run_ai_analysis()).expect("ai");
    drive(&mut session, task);

    assert_eq!(
        backend.calls().last(),
        Some(&Call::AiAnalysis {
            metadata: sample_metadata()
        })
    );
    let panel = session.view().ai_analysis.expect("ai panel");
    assert_eq!(panel.verdict, ai_result().verdict);
}

#[test]
fn verification_severity_follows_risk_level() {
    for (risk_level, severity) in [
        (RiskLevel::High, Severity::Danger),
        (RiskLevel::Medium, Severity::Warning),
        (RiskLevel::Low, Severity::Success),
    ] {
        let backend = Arc::new(ScriptedBackend::succeeding());
        backend.push_verification(Reply::ok(report(risk_level)));
        let mut session = ready_session(Arc::clone(&backend), "photo.jpg");
        let task = session.update(Message::run_verification()).expect("verify");
        drive(&mut session, task);

        let panel = session.view().verification.expect("verification panel");
        assert_eq!(panel.severity, severity);
        assert_eq!(
            backend.calls().last(),
            Some(&Call::Verification {
                file_name: "photo.jpg".to_string()
            })
        );
    }
}

#[test]
fn simulation_draft_is_an_independent_copy() {
    let backend = Arc::new(ScriptedBackend::succeeding());
    let mut session = ready_session(Arc::clone(&backend), "photo.jpg");
    session.update(Message::toggle_simulation()).expect("toggle");

    let draft = session.store().simulation().draft().expect("draft");
    assert_eq!(draft.as_metadata(), &sample_metadata());

    session
        .update(Message::edit_field("Software", "Adobe Photoshop"))
        .expect("edit");
    let draft = session.store().simulation().draft().expect("draft");
    assert_eq!(draft.field_text("Software"), "Adobe Photoshop");
    assert_eq!(session.store().metadata(), Some(&sample_metadata()));

    let panel = session.view().simulation.expect("simulation panel");
    let software = panel
        .fields
        .iter()
        .find(|field| field.key == "Software")
        .expect("software field");
    assert_eq!(software.value, "Adobe Photoshop");
    assert!(panel.fields.iter().all(|field| field.key != "Flags"));
}

#[test]
fn simulation_submits_the_full_draft() {
    let backend = Arc::new(ScriptedBackend::succeeding());
    let mut session = ready_session(Arc::clone(&backend), "photo.jpg");
    session.update(Message::toggle_simulation()).expect("toggle");
    session
        .update(Message::edit_field("Software", "GIMP"))
        .expect("edit");
    let task = session.update(Message::run_simulation()).expect("simulate");
    drive(&mut session, task);

    let Some(Call::Simulation { file_name, edits }) = backend.calls().last().cloned() else {
        panic!("expected a simulation call");
    };
    assert_eq!(file_name, "photo.jpg");
    assert_eq!(edits.get("Software"), Some(&json!("GIMP")));
    assert_eq!(edits.get("Camera Make"), Some(&json!("Canon")));

    let results = session.view().simulation_results.expect("results");
    let software = results
        .rows
        .iter()
        .find(|row| row.field == "Software")
        .expect("software row");
    assert!(software.changed);
    let make = results
        .rows
        .iter()
        .find(|row| row.field == "Camera Make")
        .expect("make row");
    assert!(!make.changed);
}

#[test]
fn simulation_edits_are_limited_to_extracted_fields() {
    let backend = Arc::new(ScriptedBackend::succeeding());
    let mut session = ready_session(Arc::clone(&backend), "photo.jpg");
    session.update(Message::toggle_simulation()).expect("toggle");

    for key in ["Flags", "Sofware"] {
        let err = session.update(Message::edit_field(key, "oops")).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Precondition {
                stage: Stage::Simulation,
                ..
            }
        ));
    }
    let draft = session.store().simulation().draft().expect("draft");
    assert_eq!(draft.as_metadata(), &sample_metadata());

    let task = session.update(Message::run_simulation()).expect("simulate");
    drive(&mut session, task);
    let Some(Call::Simulation { edits, .. }) = backend.calls().last().cloned() else {
        panic!("expected a simulation call");
    };
    assert_eq!(edits.get("Sofware"), None);
    assert_eq!(edits.flags(), sample_metadata().flags());

    let keys: Vec<String> = session
        .view()
        .simulation
        .expect("simulation panel")
        .fields
        .into_iter()
        .map(|field| field.key)
        .collect();
    assert_eq!(
        keys,
        vec!["File Name", "Camera Make", "Software", "GPS Latitude"]
    );
}

#[test]
fn simulation_banner_reflects_flags() {
    let backend = Arc::new(ScriptedBackend::succeeding());
    let mut session = ready_session(Arc::clone(&backend), "photo.jpg");
    session.update(Message::toggle_simulation()).expect("toggle");

    let task = session.update(Message::run_simulation()).expect("simulate");
    drive(&mut session, task);
    let banner = session.view().simulation_results.expect("results").banner;
    assert_eq!(banner.severity, Severity::Success);
    assert!(banner.items.is_empty());

    backend.push_simulation(Reply::ok(simulation_result(
        &sample_metadata(),
        vec!["Software field altered".to_string()],
    )));
    let task = session.update(Message::run_simulation()).expect("simulate");
    drive(&mut session, task);
    let banner = session.view().simulation_results.expect("results").banner;
    assert_eq!(banner.severity, Severity::Warning);
    assert_eq!(banner.items, vec!["Software field altered"]);
}

#[test]
fn reentering_simulation_mode_drops_results_and_in_flight_runs() {
    let backend = Arc::new(ScriptedBackend::succeeding());
    let mut session = ready_session(Arc::clone(&backend), "photo.jpg");
    session.update(Message::toggle_simulation()).expect("toggle");
    let task = session.update(Message::run_simulation()).expect("simulate");
    drive(&mut session, task);
    assert!(session.view().is_simulation_results_visible());

    let in_flight = session.update(Message::run_simulation()).expect("simulate");
    session.update(Message::toggle_simulation()).expect("exit");
    assert!(!session.view().is_simulation_panel_visible());
    assert!(!session.view().is_simulation_results_visible());
    assert!(session.store().metadata().is_some());

    session.update(Message::toggle_simulation()).expect("enter");
    drive(&mut session, in_flight);
    assert!(session.view().is_simulation_panel_visible());
    assert!(!session.view().is_simulation_results_visible());
}

#[test]
fn edits_outside_simulation_mode_are_ignored() {
    let backend = Arc::new(ScriptedBackend::succeeding());
    let mut session = ready_session(Arc::clone(&backend), "photo.jpg");
    let task = session
        .update(Message::edit_field("Software", "GIMP"))
        .expect("edit");
    assert!(task.is_empty());
    assert!(session.store().simulation().draft().is_none());

    let err = session.update(Message::run_simulation()).unwrap_err();
    assert!(matches!(
        err,
        SessionError::Precondition {
            stage: Stage::Simulation,
            ..
        }
    ));
}

#[tokio::test]
async fn runtime_applies_out_of_order_responses() {
    let backend = Arc::new(ScriptedBackend::succeeding());
    backend.push_verification(Reply::ok(report(RiskLevel::High)).after(40));
    backend.push_ai_analysis(Reply::ok(ai_result()).after(5));

    let mut runtime = SessionRuntime::new(Arc::clone(&backend));
    runtime
        .dispatch(Message::select_file(artifact("photo.jpg")))
        .expect("select");
    runtime.dispatch(Message::upload()).expect("upload");
    runtime.run_until_idle().await;
    assert!(runtime.view().ready);

    runtime.dispatch(Message::run_verification()).expect("verify");
    runtime.dispatch(Message::run_ai_analysis()).expect("ai");
    assert_eq!(runtime.in_flight(), 2);

    assert!(runtime.step().await);
    let view = runtime.view();
    assert!(view.is_ai_panel_visible());
    assert!(!view.is_verification_panel_visible());
    assert_eq!(
        view.stage(Stage::Verification).map(|stage| stage.status),
        Some(StageStatus::Pending)
    );

    runtime.run_until_idle().await;
    let view = runtime.view();
    assert!(view.is_verification_panel_visible());
    assert_eq!(runtime.in_flight(), 0);
    assert!(!runtime.step().await);
}

#[tokio::test]
async fn runtime_discards_upload_for_replaced_file() {
    let backend = Arc::new(ScriptedBackend::succeeding());
    backend.delay_upload("first.jpg", 40);
    let second = artifact("second.jpg");
    let second_sha256 = second.local_sha256().to_string();

    let mut runtime = SessionRuntime::new(Arc::clone(&backend));
    runtime
        .dispatch(Message::select_file(artifact("first.jpg")))
        .expect("select");
    runtime.dispatch(Message::upload()).expect("upload");
    runtime
        .dispatch(Message::select_file(second))
        .expect("select");
    runtime.dispatch(Message::upload()).expect("upload");
    assert_eq!(runtime.in_flight(), 2);

    // The second upload lands first; the first one arrives late and is stale.
    assert!(runtime.step().await);
    assert!(runtime.view().ready);
    runtime.run_until_idle().await;

    let view = runtime.view();
    assert_eq!(view.file_name.as_deref(), Some("second.jpg"));
    assert_eq!(view.hashes.expect("hashes").sha256, second_sha256);
    assert_eq!(backend.call_count(), 2);
}
