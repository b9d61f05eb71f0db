use crate::{common::test_context::TestContext, integration_tests::helpers};
use blink_debit::{
    apis::{
        consents::{Amount, ConsentStatus},
        payments::PaymentStatus,
        quick_payments::{QuickPaymentRequest, QuickPaymentRequestBuilder},
    },
    Error, PollMode, PollOptions, Pollable,
};

fn quick_payment_request(flow: blink_debit::apis::consents::AuthFlowDetail) -> QuickPaymentRequest {
    QuickPaymentRequestBuilder::default()
        .flow(flow)
        .pcr(helpers::pcr())
        .amount(Amount::nzd("3.50"))
        .build()
        .unwrap()
}

#[tokio::test]
async fn decoupled_quick_payment_is_paid() {
    let ctx = TestContext::start().await;

    let res = ctx
        .client
        .create_quick_payment(&quick_payment_request(helpers::decoupled_flow()))
        .await
        .unwrap();
    assert_eq!(res.redirect_uri, None);

    let quick_payment = ctx
        .client
        .await_successful_quick_payment(&res.quick_payment_id, 30)
        .await
        .unwrap();

    assert_eq!(quick_payment.quick_payment_id, res.quick_payment_id);
    assert!(matches!(
        quick_payment.consent.status,
        ConsentStatus::Authorised | ConsentStatus::Consumed
    ));
}

#[cfg(not(feature = "acceptance-tests"))]
#[tokio::test]
async fn consumed_quick_payment_carries_its_payment() {
    let ctx = TestContext::start().await;

    let res = ctx
        .client
        .create_quick_payment(&quick_payment_request(helpers::decoupled_flow()))
        .await
        .unwrap();

    // Poll through the Pollable extension instead of the client facade
    let quick_payment = res
        .poll_until_terminal_state(&ctx.client, PollOptions::new(30), PollMode::Precise)
        .await
        .unwrap();

    assert_eq!(quick_payment.consent.status, ConsentStatus::Consumed);
    assert_eq!(quick_payment.consent.payments.len(), 1);
    assert_eq!(
        quick_payment.consent.payments[0].status,
        PaymentStatus::AcceptedSettlementCompleted
    );
}

#[tokio::test]
async fn revoke_quick_payment() {
    let ctx = TestContext::start().await;

    let res = ctx
        .client
        .create_quick_payment(&quick_payment_request(helpers::redirect_flow()))
        .await
        .unwrap();
    assert!(res.redirect_uri.is_some());

    ctx.client
        .revoke_quick_payment(&res.quick_payment_id)
        .await
        .unwrap();

    let quick_payment = ctx
        .client
        .get_quick_payment(&res.quick_payment_id)
        .await
        .unwrap();
    assert_eq!(quick_payment.consent.status, ConsentStatus::Revoked);

    let err = ctx
        .client
        .await_successful_quick_payment(&res.quick_payment_id, 5)
        .await
        .expect_err("Expected error");
    assert!(matches!(err, Error::ConsentTimeout { .. }));
}
