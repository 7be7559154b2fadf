use quizmaster_auth::{UserRole, create_access_token, verify_token};
use quizmaster_config::JwtConfig;
use uuid::Uuid;

fn get_test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test_secret_key_for_testing_purposes".to_string(),
        expires_in: 3600,
    }
}

#[test]
fn test_create_access_token_all_roles() {
    let jwt_config = get_test_jwt_config();
    let user_id = Uuid::new_v4();

    for role in [UserRole::Prof, UserRole::Eleve, UserRole::Admin] {
        let token = create_access_token(user_id, "test@example.com", role, &jwt_config).unwrap();
        let claims = verify_token(&token, &jwt_config).unwrap();
        assert_eq!(claims.role, role);
        assert_eq!(claims.user_id(), Some(user_id));
    }
}

#[test]
fn test_role_is_serialized_lowercase() {
    let jwt_config = get_test_jwt_config();
    let token =
        create_access_token(Uuid::new_v4(), "eleve@example.com", UserRole::Eleve, &jwt_config)
            .unwrap();

    let claims = verify_token(&token, &jwt_config).unwrap();
    let json = serde_json::to_value(&claims).unwrap();
    assert_eq!(json["role"], "eleve");
    assert_eq!(json["email"], "eleve@example.com");
}

#[test]
fn test_verify_token_malformed() {
    let jwt_config = get_test_jwt_config();

    for token in ["", "not.a.jwt", "a.b"] {
        let err = verify_token(token, &jwt_config).unwrap_err();
        assert_eq!(err.status.as_u16(), 401);
    }
}

#[test]
fn test_verify_token_tampered_payload() {
    let jwt_config = get_test_jwt_config();
    let token =
        create_access_token(Uuid::new_v4(), "prof@example.com", UserRole::Prof, &jwt_config)
            .unwrap();

    let other =
        create_access_token(Uuid::new_v4(), "admin@example.com", UserRole::Admin, &jwt_config)
            .unwrap();

    // Header and signature of the first token around the payload of the second
    let parts: Vec<&str> = token.split('.').collect();
    let other_parts: Vec<&str> = other.split('.').collect();
    let forged = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

    assert!(verify_token(&forged, &jwt_config).is_err());
}

#[test]
fn test_user_id_rejects_non_uuid_subject() {
    let jwt_config = get_test_jwt_config();
    let token =
        create_access_token(Uuid::new_v4(), "prof@example.com", UserRole::Prof, &jwt_config)
            .unwrap();

    let mut claims = verify_token(&token, &jwt_config).unwrap();
    claims.sub = "not-a-uuid".to_string();
    assert!(claims.user_id().is_none());
}
