use blink_debit::{
    apis::consents::{
        Amount, AuthFlowDetail, Bank, DecoupledFlow, IdentifierType, Pcr,
        SingleConsentRequestBuilder,
    },
    BlinkDebitClient,
};

async fn run() -> anyhow::Result<()> {
    // Credentials and settings are read from the BLINKPAY_* env variables
    let client = BlinkDebitClient::from_env()?;

    let request = SingleConsentRequestBuilder::default()
        .flow(AuthFlowDetail::Decoupled(DecoupledFlow {
            bank: Bank::Pnz,
            identifier_type: IdentifierType::PhoneNumber,
            identifier_value: "+64-259531933".to_string(),
            callback_url: None,
        }))
        .pcr(Pcr::new("particulars"))
        .amount(Amount::nzd("1.25"))
        .build()?;

    let res = client.create_single_consent(&request).await?;
    tracing::info!("Created new single consent: {}", res.consent_id);

    tracing::info!("Begin waiting...");

    let consent = client
        .await_authorised_single_consent(&res.consent_id, 300)
        .await?;

    tracing::info!("{:#?}", consent);

    Ok(())
}

#[tokio::main]
async fn main() {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Setting default subscriber failed");

    if let Err(e) = run().await {
        tracing::error!("Fatal error: {:?}", e);
        std::process::exit(1);
    }
}
