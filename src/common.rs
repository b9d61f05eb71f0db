// Default URLs
pub static DEFAULT_PRODUCTION_URL: &str = "https://debit.blinkpay.co.nz";
pub static DEFAULT_SANDBOX_URL: &str = "https://sandbox.debit.blinkpay.co.nz";

// Paths, relative to the debit URL
pub static API_BASE_PATH: &str = "payments/v1";
pub static TOKEN_PATH: &str = "oauth2/token";

// Header names
pub static REQUEST_ID_HEADER: &str = "request-id";
pub static CORRELATION_ID_HEADER: &str = "x-correlation-id";
pub static CUSTOMER_IP_HEADER: &str = "x-customer-ip";
pub static CUSTOMER_USER_AGENT_HEADER: &str = "x-customer-user-agent";
pub static IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

// Token validity required at hand-out time, in seconds
pub const TOKEN_EXPIRY_BUFFER_SECS: i64 = 60;
