use super::*;
use serde_json::json;

// =============================================================
// Auth payloads
// =============================================================

#[test]
fn login_response_parses_camel_case() {
    let raw = crate::test_helpers::login_body("A1", "R1");
    let parsed: LoginResponse = serde_json::from_value(raw).unwrap();

    assert_eq!(parsed.tokens.access_token, "A1");
    assert_eq!(parsed.tokens.refresh_token, "R1");
    assert_eq!(parsed.user.full_name, "Alice Souza");
    assert_eq!(parsed.user.laboratory_id.as_deref(), Some("lab-1"));
    assert_eq!(parsed.user.roles, vec!["TECHNICIAN"]);
}

#[test]
fn user_with_null_laboratory_is_unscoped() {
    let user: User = serde_json::from_value(json!({
        "id": "u-9",
        "username": "root",
        "email": "root@lab.test",
        "fullName": "Root",
        "laboratoryId": null,
        "isGlobalAdmin": true
    }))
    .unwrap();

    assert!(user.laboratory_id.is_none());
    assert!(user.is_global_admin);
    assert!(user.roles.is_empty());
    assert!(user.permissions.is_empty());
}

#[test]
fn logout_request_omits_missing_token() {
    assert_eq!(serde_json::to_value(LogoutRequest { refresh_token: None }).unwrap(), json!({}));
    assert_eq!(
        serde_json::to_value(LogoutRequest { refresh_token: Some("R1") }).unwrap(),
        json!({ "refreshToken": "R1" })
    );
}

#[test]
fn change_password_request_uses_wire_names() {
    let body = ChangePasswordRequest { current_password: "old", new_password: "new-secret" };
    assert_eq!(
        serde_json::to_value(body).unwrap(),
        json!({ "currentPassword": "old", "newPassword": "new-secret" })
    );
}

// =============================================================
// Samples
// =============================================================

#[test]
fn sample_status_wire_names() {
    assert_eq!(serde_json::to_value(SampleStatus::InTransfer).unwrap(), json!("IN_TRANSFER"));
    assert_eq!(
        serde_json::from_value::<SampleStatus>(json!("UNDER_ANALYSIS")).unwrap(),
        SampleStatus::UnderAnalysis
    );
    for status in SampleStatus::ALL {
        assert_eq!(serde_json::to_value(status).unwrap(), json!(status.as_str()));
    }
}

#[test]
fn sample_status_parse_is_case_insensitive() {
    assert_eq!(SampleStatus::parse("stored"), Some(SampleStatus::Stored));
    assert_eq!(SampleStatus::parse(" Discarded "), Some(SampleStatus::Discarded));
    assert_eq!(SampleStatus::parse("lost"), None);
}

#[test]
fn sample_query_defaults_to_first_page() {
    let pairs = SampleQuery::default().to_pairs();
    assert_eq!(pairs, vec![("page".to_owned(), "1".to_owned()), ("limit".to_owned(), "10".to_owned())]);
}

#[test]
fn sample_query_skips_blank_search() {
    let query = SampleQuery {
        page: 3,
        search: Some("   ".into()),
        status: Some(SampleStatus::Collected),
        ..SampleQuery::default()
    };
    let pairs = query.to_pairs();
    assert!(!pairs.iter().any(|(k, _)| k == "search"));
    assert!(pairs.contains(&("status".to_owned(), "COLLECTED".to_owned())));
    assert!(pairs.contains(&("page".to_owned(), "3".to_owned())));
}

#[test]
fn move_request_omits_optional_fields() {
    let body = MoveSampleRequest { to_position_id: "p-7", reason: None, notes: Some("rack swap") };
    assert_eq!(serde_json::to_value(body).unwrap(), json!({ "toPositionId": "p-7", "notes": "rack swap" }));
}

// =============================================================
// Aggregates
// =============================================================

#[test]
fn statistics_tolerate_missing_fields() {
    let stats: LaboratoryStatistics = serde_json::from_value(json!({
        "totalSamples": 42,
        "samplesByStatus": { "STORED": 30, "COLLECTED": 12 }
    }))
    .unwrap();

    assert_eq!(stats.total_samples, 42);
    assert_eq!(stats.pending_transfers, 0);
    assert_eq!(stats.samples_by_status["STORED"], 30);
}

#[test]
fn occupancy_defaults_to_zero() {
    let occupancy: StorageOccupancy = serde_json::from_value(json!({ "occupied": 5 })).unwrap();
    assert_eq!(occupancy, StorageOccupancy { total: 0, occupied: 5, available: 0 });
}
