/// Environment variable containing the DynamoDB table name
pub const ORDER_TABLE: &str = "ORDER_TABLE";
/// Environment variable containing the secondary index queried by user
pub const ORDER_INDEX: &str = "ORDER_INDEX";
/// Environment variable containing the base URL used in renewal links
pub const RENEWAL_BASE_URL: &str = "RENEWAL_BASE_URL";
/// Environment variable containing the SES sender identity
pub const EMAIL_SENDER: &str = "EMAIL_SENDER";
/// Environment variable limiting concurrent notifications per batch
pub const NOTIFY_CONCURRENCY: &str = "NOTIFY_CONCURRENCY";

pub const DEFAULT_ORDER_INDEX: &str = "index1";
pub const DEFAULT_EMAIL_SENDER: &str = "warranty@orders.example.com";
pub const DEFAULT_NOTIFY_CONCURRENCY: usize = 16;
