//! AWS transports for customer notifications: SES for email and SNS for SMS.

mod ses;
mod sns;

pub use ses::SesEmailSender;
pub use sns::SnsSmsSender;
