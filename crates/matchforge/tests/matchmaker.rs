//! Integration tests for the login-gated matchmaker front-end, run
//! against the loopback provider stack.

use matchforge::{
    Credentials, LoopbackHandoff, LoopbackIdentity, LoopbackSessions,
    MatchforgeError, Matchmaker, OpOutput, SessionParams, SessionQuery,
};

fn loopback_matchmaker() -> Matchmaker<LoopbackIdentity> {
    Matchmaker::<LoopbackIdentity>::builder().build(
        LoopbackIdentity,
        LoopbackSessions,
        LoopbackHandoff,
    )
}

#[tokio::test]
async fn test_operations_require_login() {
    let mm = loopback_matchmaker();
    assert!(mm.player().is_none());

    let err = mm
        .create_session(SessionParams::new("Arena-1"))
        .await
        .unwrap_err();
    assert!(matches!(err, MatchforgeError::NotLoggedIn));
    assert!(err.is_precondition());

    let err = mm.find_sessions(SessionQuery::all()).await.unwrap_err();
    assert!(matches!(err, MatchforgeError::NotLoggedIn));
}

#[tokio::test]
async fn test_login_then_create() {
    let mut mm = loopback_matchmaker();
    mm.login(0, &Credentials::account_portal()).await.unwrap();
    assert!(mm.player().is_some());

    let ticket = mm
        .create_session(SessionParams::new("Arena-1"))
        .await
        .unwrap();
    let completion = ticket.outcome().await.unwrap();
    assert!(completion.is_success());
}

#[tokio::test]
async fn test_full_flow_through_matchmaker() {
    // The host runs through its own matchmaker identity; a second
    // player issues through the raw handle.
    let mut mm = loopback_matchmaker();
    mm.login(0, &Credentials::account_portal()).await.unwrap();

    let ticket = mm
        .create_session(
            SessionParams::new("Arena-1").connect("10.0.0.1:7777"),
        )
        .await
        .unwrap();
    assert!(ticket.outcome().await.unwrap().is_success());

    let ticket = mm.find_sessions(SessionQuery::all()).await.unwrap();
    let completion = ticket.outcome().await.unwrap();
    let Ok(OpOutput::Found { result }) = completion.result else {
        panic!("expected Found");
    };
    assert_eq!(result.len(), 1);
    assert_eq!(result.first().unwrap().occupancy, 0);

    let guest = matchforge::PlayerIdentity::new("guest-1", "Guest");
    let ticket = mm
        .handle()
        .join(guest, "Arena-1".into())
        .await
        .unwrap();
    let completion = ticket.outcome().await.unwrap();
    assert_eq!(
        completion.result,
        Ok(OpOutput::Joined {
            connect: "10.0.0.1:7777".to_string()
        })
    );

    let ticket = mm.destroy_session("Arena-1".into()).await.unwrap();
    assert!(ticket.outcome().await.unwrap().is_success());

    let ticket = mm.find_sessions(SessionQuery::all()).await.unwrap();
    let completion = ticket.outcome().await.unwrap();
    let Ok(OpOutput::Found { result }) = completion.result else {
        panic!("expected Found");
    };
    assert!(result.is_empty());
}

#[tokio::test]
async fn test_relogin_replaces_identity() {
    let mut mm = loopback_matchmaker();
    let first = mm
        .login(0, &Credentials::account_portal())
        .await
        .unwrap()
        .clone();
    let second = mm
        .login(1, &Credentials::account_portal())
        .await
        .unwrap()
        .clone();

    assert_ne!(first.id, second.id);
    assert_eq!(mm.player().unwrap().id, second.id);
}
