use model::Clock;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use store::OrderStore;

/// The HTTP-facing order operations: intake, lookup and renewal.
#[derive(Clone)]
pub struct OrderApi {
    pub(crate) store: Arc<dyn OrderStore>,
    pub(crate) clock: Arc<dyn Clock>,
    // Secondary index on (pk, sk) used to list a user's orders
    pub(crate) index_name: String,
}

impl OrderApi {
    pub fn new(store: Arc<dyn OrderStore>, clock: Arc<dyn Clock>, index_name: impl Into<String>) -> Self {
        OrderApi {
            store,
            clock,
            index_name: index_name.into(),
        }
    }
}

/// A required request field was missing or unreadable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        ValidationError(message.into())
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ValidationError {}

/// Treat absent and empty parameters alike.
pub(crate) fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}
