use crate::{
    common::{test_context::TestContext, MockBankAction},
    integration_tests::helpers,
};
use blink_debit::{
    apis::consents::{ConsentDetail, ConsentStatus},
    Error,
};

#[tokio::test]
async fn decoupled_single_consent_is_authorised() {
    let ctx = TestContext::start().await;

    let res = ctx
        .client
        .create_single_consent(&helpers::single_consent_request(
            helpers::decoupled_flow(),
            "1.25",
        ))
        .await
        .unwrap();
    assert!(!res.consent_id.is_empty());
    assert_eq!(res.redirect_uri, None);

    let consent = ctx
        .client
        .await_authorised_single_consent(&res.consent_id, 30)
        .await
        .unwrap();

    assert_eq!(consent.consent_id, res.consent_id);
    assert!(matches!(
        consent.status,
        ConsentStatus::Authorised | ConsentStatus::Consumed
    ));
    assert!(matches!(
        consent.detail,
        ConsentDetail::Single(ref detail) if detail.amount.total == "1.25"
    ));
}

#[tokio::test]
async fn single_consent_response_carries_status_and_headers() {
    let ctx = TestContext::start().await;

    let res = ctx
        .client
        .create_single_consent_response(&helpers::single_consent_request(
            helpers::redirect_flow(),
            "2.50",
        ))
        .await
        .unwrap();
    assert!(res.status.is_success());
    assert!(res.data.redirect_uri.is_some());

    let res = ctx
        .client
        .get_single_consent_response(&res.data.consent_id)
        .await
        .unwrap();
    assert_eq!(res.status.as_u16(), 200);
    assert_eq!(res.data.status, ConsentStatus::AwaitingAuthorisation);
}

#[tokio::test]
async fn revoke_single_consent() {
    let ctx = TestContext::start().await;

    let res = ctx
        .client
        .create_single_consent(&helpers::single_consent_request(
            helpers::redirect_flow(),
            "1.25",
        ))
        .await
        .unwrap();

    ctx.client
        .revoke_single_consent(&res.consent_id)
        .await
        .unwrap();

    let consent = ctx
        .client
        .get_single_consent(&res.consent_id)
        .await
        .unwrap();
    assert_eq!(consent.status, ConsentStatus::Revoked);
}

#[tokio::test]
async fn invalid_amount_is_rejected_before_sending() {
    let ctx = TestContext::start().await;

    let err = ctx
        .client
        .create_single_consent(&helpers::single_consent_request(
            helpers::redirect_flow(),
            "1.255",
        ))
        .await
        .expect_err("Expected error");

    assert!(matches!(err, Error::InvalidValue(_)));
}

#[tokio::test]
async fn blank_consent_id_is_rejected() {
    let ctx = TestContext::start().await;

    let err = ctx
        .client
        .get_single_consent(" ")
        .await
        .expect_err("Expected error");

    assert!(matches!(err, Error::InvalidValue(_)));
}

#[cfg(not(feature = "acceptance-tests"))]
#[tokio::test]
async fn unknown_single_consent_is_not_found() {
    let ctx = TestContext::start().await;

    let err = ctx
        .client
        .get_single_consent("00000000-0000-0000-0000-000000000000")
        .await
        .expect_err("Expected error");

    assert!(matches!(err, Error::ResourceNotFound(_)));
}

#[cfg(not(feature = "acceptance-tests"))]
#[tokio::test]
async fn redirect_single_consent_authorised_by_customer() {
    let ctx = TestContext::start().await;

    let res = ctx
        .client
        .create_single_consent(&helpers::single_consent_request(
            helpers::redirect_flow(),
            "1.25",
        ))
        .await
        .unwrap();
    assert!(res.redirect_uri.is_some());

    ctx.complete_mock_bank_authorisation(&res.consent_id, MockBankAction::Authorise)
        .await
        .unwrap();

    let consent = ctx
        .client
        .await_authorised_single_consent(&res.consent_id, 5)
        .await
        .unwrap();
    assert_eq!(consent.status, ConsentStatus::Authorised);
}

#[cfg(not(feature = "acceptance-tests"))]
#[tokio::test]
async fn rejected_single_consent() {
    let ctx = TestContext::start().await;

    let res = ctx
        .client
        .create_single_consent(&helpers::single_consent_request(
            helpers::redirect_flow(),
            "1.25",
        ))
        .await
        .unwrap();

    ctx.complete_mock_bank_authorisation(&res.consent_id, MockBankAction::Reject)
        .await
        .unwrap();

    // Precise mode reports the rejection itself
    let err = ctx
        .client
        .await_authorised_single_consent_precise(&res.consent_id, 5)
        .await
        .expect_err("Expected error");
    assert!(matches!(err, Error::ConsentRejected(ref message) if message.contains("Rejected")));

    // Simple mode reports a timeout, caused by the rejection
    let err = ctx
        .client
        .await_authorised_single_consent(&res.consent_id, 5)
        .await
        .expect_err("Expected error");
    match err {
        Error::ConsentTimeout {
            source: Some(source),
            ..
        } => assert!(matches!(*source, Error::ConsentRejected(_))),
        e => panic!("Unexpected error: {:?}", e),
    }
}

#[cfg(not(feature = "acceptance-tests"))]
#[tokio::test]
async fn pending_single_consent_is_revoked_on_timeout() {
    let ctx = TestContext::start().await;

    let res = ctx
        .client
        .create_single_consent(&helpers::single_consent_request(
            helpers::redirect_flow(),
            "1.25",
        ))
        .await
        .unwrap();

    let err = ctx
        .client
        .await_authorised_single_consent_precise(&res.consent_id, 2)
        .await
        .expect_err("Expected error");
    assert!(matches!(err, Error::ConsentTimeout { source: None, .. }));

    let consent = ctx
        .client
        .get_single_consent(&res.consent_id)
        .await
        .unwrap();
    assert_eq!(consent.status, ConsentStatus::Revoked);
}
