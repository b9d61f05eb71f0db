use crate::{common::test_context::TestContext, integration_tests::helpers};
use blink_debit::{
    apis::{
        consents::{Amount, ConsentDetail, ConsentStatus, EnduringConsentRequestBuilder, Period},
        payments::{EnduringPaymentRequest, PaymentRequestBuilder, PaymentStatus, PaymentType},
    },
    Error,
};
use chrono::{Duration, Utc};

fn enduring_consent_request() -> blink_debit::apis::consents::EnduringConsentRequest {
    let now = Utc::now();

    EnduringConsentRequestBuilder::default()
        .flow(helpers::decoupled_flow())
        .from_timestamp(now)
        .expiry_timestamp(now + Duration::days(365))
        .period(Period::Fortnightly)
        .maximum_amount_period(Amount::nzd("50.00"))
        .build()
        .unwrap()
}

#[tokio::test]
async fn enduring_consent_is_authorised_and_paid() {
    let ctx = TestContext::start().await;

    let res = ctx
        .client
        .create_enduring_consent(&enduring_consent_request())
        .await
        .unwrap();

    let consent = ctx
        .client
        .await_authorised_enduring_consent(&res.consent_id, 30)
        .await
        .unwrap();
    assert_eq!(consent.status, ConsentStatus::Authorised);
    assert!(matches!(
        consent.detail,
        ConsentDetail::Enduring(ref detail) if detail.period == Period::Fortnightly
    ));

    // Enduring consents stay authorised after a payment
    let payment = ctx
        .client
        .create_payment(
            &PaymentRequestBuilder::default()
                .consent_id(consent.consent_id.clone())
                .enduring_payment(EnduringPaymentRequest {
                    amount: Amount::nzd("10.00"),
                    pcr: helpers::pcr(),
                })
                .build()
                .unwrap(),
        )
        .await
        .unwrap();
    let payment = ctx
        .client
        .await_successful_payment(&payment.payment_id, 30)
        .await
        .unwrap();
    assert_eq!(payment.payment_type, PaymentType::Enduring);
    assert_eq!(payment.status, PaymentStatus::AcceptedSettlementCompleted);

    let consent = ctx
        .client
        .get_enduring_consent(&consent.consent_id)
        .await
        .unwrap();
    assert_eq!(consent.status, ConsentStatus::Authorised);
}

#[tokio::test]
async fn revoke_enduring_consent() {
    let ctx = TestContext::start().await;

    let res = ctx
        .client
        .create_enduring_consent(&enduring_consent_request())
        .await
        .unwrap();
    ctx.client
        .revoke_enduring_consent(&res.consent_id)
        .await
        .unwrap();

    let consent = ctx
        .client
        .get_enduring_consent(&res.consent_id)
        .await
        .unwrap();
    assert_eq!(consent.status, ConsentStatus::Revoked);

    // A revoked consent never gets authorised
    let err = ctx
        .client
        .await_authorised_enduring_consent_precise(&res.consent_id, 5)
        .await
        .expect_err("Expected error");
    assert!(matches!(err, Error::ConsentRejected(_)));
}

#[tokio::test]
async fn expiry_before_start_is_rejected() {
    let ctx = TestContext::start().await;
    let mut request = enduring_consent_request();
    request.expiry_timestamp = Some(request.from_timestamp - Duration::days(1));

    let err = ctx
        .client
        .create_enduring_consent(&request)
        .await
        .expect_err("Expected error");

    assert!(matches!(err, Error::InvalidValue(_)));
}
