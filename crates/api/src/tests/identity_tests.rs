// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::Duration;
use zordon_hub_domain::{Department, Role};
use zordon_hub_persistence::Persistence;

use crate::{
    AuthenticationService, LoginRequest, SignupRequest, bootstrap_admin, login, logout, refresh,
    signup, whoami,
};

const LIFETIME: Duration = Duration::days(7);

fn signup_request(name: &str, email: &str, role: Option<&str>) -> SignupRequest {
    SignupRequest {
        name: String::from(name),
        email: String::from(email),
        password: String::from("power-coin"),
        role: role.map(String::from),
        department: None,
        skills: vec![String::from("zords")],
    }
}

#[test]
fn test_signup_defaults_to_ranger_and_red() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let response = signup(
        &mut persistence,
        &signup_request("Zack Taylor", " Zack@Angel.Grove ", None),
        LIFETIME,
    )
    .unwrap();

    assert_eq!(response.user.role, Role::Ranger);
    assert_eq!(response.user.department, Department::Red);
    assert_eq!(response.user.email, "zack@angel.grove");
    assert_eq!(response.user.skills, vec![String::from("zords")]);
    assert!(!response.session_token.is_empty());

    let (actor, _) =
        AuthenticationService::validate_session(&mut persistence, &response.session_token)
            .unwrap();
    assert_eq!(actor.id, response.user.user_id);
}

#[test]
fn test_signup_honours_engineer_but_never_admin() {
    let mut persistence = Persistence::new_in_memory().unwrap();

    let engineer = signup(
        &mut persistence,
        &signup_request("Billy Cranston", "billy@angel.grove", Some("engineer")),
        LIFETIME,
    )
    .unwrap();
    assert_eq!(engineer.user.role, Role::Engineer);

    let sneaky = signup(
        &mut persistence,
        &signup_request("Rita Repulsa", "rita@moon.base", Some("ADMIN")),
        LIFETIME,
    )
    .unwrap();
    assert_eq!(sneaky.user.role, Role::Ranger);
}

#[test]
fn test_signup_validation() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    signup(
        &mut persistence,
        &signup_request("Zack Taylor", "zack@angel.grove", None),
        LIFETIME,
    )
    .unwrap();

    let duplicate = signup(
        &mut persistence,
        &signup_request("Zack Again", "ZACK@angel.grove", None),
        LIFETIME,
    )
    .unwrap_err();
    assert_eq!(duplicate.kind(), "conflict");

    let bad_email = signup(
        &mut persistence,
        &signup_request("Zack Taylor", "not-an-email", None),
        LIFETIME,
    )
    .unwrap_err();
    assert_eq!(bad_email.kind(), "invalid_input");

    let mut bad_department = signup_request("Tommy Oliver", "tommy@angel.grove", None);
    bad_department.department = Some(String::from("GREEN-ISH"));
    assert_eq!(
        signup(&mut persistence, &bad_department, LIFETIME)
            .unwrap_err()
            .kind(),
        "invalid_input"
    );

    let mut no_password = signup_request("Tommy Oliver", "tommy@angel.grove", None);
    no_password.password = String::new();
    assert_eq!(
        signup(&mut persistence, &no_password, LIFETIME)
            .unwrap_err()
            .kind(),
        "invalid_input"
    );
}

#[test]
fn test_login_rotates_sessions() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let registered = signup(
        &mut persistence,
        &signup_request("Zack Taylor", "zack@angel.grove", None),
        LIFETIME,
    )
    .unwrap();

    let wrong = login(
        &mut persistence,
        &LoginRequest {
            email: String::from("zack@angel.grove"),
            password: String::from("wrong"),
        },
        LIFETIME,
    )
    .unwrap_err();
    assert_eq!(wrong.kind(), "unauthenticated");

    let logged_in = login(
        &mut persistence,
        &LoginRequest {
            email: String::from("ZACK@angel.grove"),
            password: String::from("power-coin"),
        },
        LIFETIME,
    )
    .unwrap();
    assert_ne!(logged_in.session_token, registered.session_token);
    assert!(
        AuthenticationService::validate_session(&mut persistence, &registered.session_token)
            .is_err()
    );
}

#[test]
fn test_refresh_and_logout() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let registered = signup(
        &mut persistence,
        &signup_request("Zack Taylor", "zack@angel.grove", None),
        LIFETIME,
    )
    .unwrap();

    let refreshed = refresh(&mut persistence, &registered.session_token, LIFETIME).unwrap();
    assert_ne!(refreshed.session_token, registered.session_token);
    assert_eq!(
        refresh(&mut persistence, &registered.session_token, LIFETIME)
            .unwrap_err()
            .kind(),
        "unauthenticated"
    );

    let (actor, _) =
        AuthenticationService::validate_session(&mut persistence, &refreshed.session_token)
            .unwrap();
    assert_eq!(whoami(&mut persistence, &actor).unwrap().name, "Zack Taylor");

    logout(&mut persistence, &refreshed.session_token).unwrap();
    assert!(
        AuthenticationService::validate_session(&mut persistence, &refreshed.session_token)
            .is_err()
    );
}

#[test]
fn test_login_and_logout_track_online_flag() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let registered = signup(
        &mut persistence,
        &signup_request("Billy Cranston", "billy@angel.grove", Some("ENGINEER")),
        LIFETIME,
    )
    .unwrap();
    assert!(!registered.user.is_online);

    let logged_in = login(
        &mut persistence,
        &LoginRequest {
            email: String::from("billy@angel.grove"),
            password: String::from("power-coin"),
        },
        LIFETIME,
    )
    .unwrap();
    assert!(logged_in.user.is_online);
    let user_id = logged_in.user.user_id;
    assert!(persistence.get_user(user_id).unwrap().unwrap().is_online);
    assert_eq!(persistence.dashboard_stats().unwrap().online_engineers, 1);

    logout(&mut persistence, &logged_in.session_token).unwrap();
    assert!(!persistence.get_user(user_id).unwrap().unwrap().is_online);
    assert_eq!(persistence.dashboard_stats().unwrap().online_engineers, 0);

    // An unknown token changes nothing.
    logout(&mut persistence, "session_unknown").unwrap();
}

#[test]
fn test_expired_session_is_rejected() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let registered = signup(
        &mut persistence,
        &signup_request("Zack Taylor", "zack@angel.grove", None),
        Duration::seconds(-1),
    )
    .unwrap();

    let err = AuthenticationService::validate_session(&mut persistence, &registered.session_token)
        .unwrap_err();
    assert!(err.to_string().contains("expired"));
}

#[test]
fn test_bootstrap_admin_is_idempotent() {
    let mut persistence = Persistence::new_in_memory().unwrap();

    let first = bootstrap_admin(&mut persistence, "zordon@command.center", "ay-ay-ay").unwrap();
    assert_eq!(first.role, Role::Admin);
    let second = bootstrap_admin(&mut persistence, "Zordon@Command.Center", "ignored").unwrap();
    assert_eq!(second.user_id, first.user_id);
    assert_eq!(persistence.count_users().unwrap(), 1);

    let session = login(
        &mut persistence,
        &LoginRequest {
            email: String::from("zordon@command.center"),
            password: String::from("ay-ay-ay"),
        },
        LIFETIME,
    )
    .unwrap();
    assert_eq!(session.user.role, Role::Admin);
}
