use chrono::{DateTime, Duration, Months, SecondsFormat, Utc};

/// Length of the warranty on a new or renewed order.
pub const WARRANTY_MONTHS: u32 = 24;
/// How long a renewal offer stays redeemable.
pub const OFFER_DAYS: i64 = 30;

/// An expiry instant and the attribute values derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expiry {
    pub expires_at: DateTime<Utc>,
}

impl Expiry {
    /// Two calendar years after `now`.
    ///
    /// A day missing from the target month is clamped to the last day of that
    /// month, so 2024-02-29 expires on 2026-02-28.
    pub fn warranty_from(now: DateTime<Utc>) -> Self {
        let expires_at: DateTime<Utc> = now
            .checked_add_months(Months::new(WARRANTY_MONTHS))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Expiry { expires_at }
    }

    /// Thirty days after `now`.
    pub fn offer_from(now: DateTime<Utc>) -> Self {
        let expires_at: DateTime<Utc> = now
            .checked_add_signed(Duration::days(OFFER_DAYS))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Expiry { expires_at }
    }

    /// Epoch seconds, as read by the table's time-to-live.
    pub fn ttl(&self) -> i64 {
        self.expires_at.timestamp()
    }

    /// Epoch milliseconds.
    pub fn warranty_expiry(&self) -> i64 {
        self.expires_at.timestamp_millis()
    }

    /// Sort key within a user's partition. RFC 3339 in UTC sorts lexically in time order.
    pub fn sort_key(&self) -> String {
        self.expires_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Date shown to customers, e.g. `Sat Feb 28 2026`.
    pub fn date_string(&self) -> String {
        self.expires_at.format("%a %b %d %Y").to_string()
    }
}

/// The four attributes rewritten together when a warranty is renewed.
///
/// `expired` of `None` is written as an explicit null, clearing the offer flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiryPatch {
    pub ttl: i64,
    pub expired: Option<bool>,
    pub warranty_expiry: i64,
    pub sk: String,
}

impl ExpiryPatch {
    /// Patch extending an order to `expiry` and clearing its expired flag.
    pub fn renewal(expiry: &Expiry) -> Self {
        ExpiryPatch {
            ttl: expiry.ttl(),
            expired: None,
            warranty_expiry: expiry.warranty_expiry(),
            sk: expiry.sort_key(),
        }
    }
}
