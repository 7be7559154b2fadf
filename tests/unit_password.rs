use quizmaster_core::{hash_password, verify_password};

#[test]
fn test_hash_is_salted() {
    let first = hash_password("Password123").unwrap();
    let second = hash_password("Password123").unwrap();

    assert_ne!(first, second);
    assert!(verify_password("Password123", &first).unwrap());
    assert!(verify_password("Password123", &second).unwrap());
}

#[test]
fn test_hash_uses_bcrypt_format() {
    let hash = hash_password("Password123").unwrap();
    assert!(hash.starts_with("$2b$10$"));
    assert_eq!(hash.len(), 60);
}

#[test]
fn test_verify_password_is_case_sensitive() {
    let hash = hash_password("Password123").unwrap();
    assert!(!verify_password("password123", &hash).unwrap());
    assert!(!verify_password("PASSWORD123", &hash).unwrap());
}

#[test]
fn test_verify_password_unicode() {
    let password = "Mötdepässe9";
    let hash = hash_password(password).unwrap();
    assert!(verify_password(password, &hash).unwrap());
    assert!(!verify_password("Motdepasse9", &hash).unwrap());
}
