use async_trait::async_trait;
use model::{ExpiryPatch, Order};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use store::StoreErrorReason::{BackendFailure, BadRecord};
use store::StoreOperation::{Get, Query, Update, Write};
use store::{IndexQuery, OrderStore, StoreError, StoreOperation};

/// An order table held in process memory.
///
/// Every index is treated as the user index, keyed on any string attribute
/// of the order.
#[derive(Default, Clone)]
pub struct InMemoryOrderStore {
    orders: Arc<Mutex<HashMap<String, Order>>>,
}

impl InMemoryOrderStore {
    /// Snapshot of every stored record.
    pub fn orders(&self) -> Vec<Order> {
        match self.orders.lock() {
            Ok(guard) => guard.values().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().values().cloned().collect(),
        }
    }

    fn lock(
        &self,
        key: &str,
        operation: StoreOperation,
    ) -> Result<MutexGuard<'_, HashMap<String, Order>>, StoreError> {
        self.orders.lock().map_err(|err| {
            StoreError::new(key, operation, BackendFailure(err.to_string().into()))
        })
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn write(&self, order: Order) -> Result<Order, StoreError> {
        self.lock(&order.order_id, Write)?
            .insert(order.order_id.clone(), order.clone());

        Ok(order)
    }

    async fn update(&self, order_id: &str, patch: ExpiryPatch) -> Result<ExpiryPatch, StoreError> {
        self.lock(order_id, Update)?
            .entry(order_id.to_string())
            .and_modify(|order| order.apply(&patch))
            .or_insert_with(|| Order::from_patch(order_id, &patch));

        Ok(patch)
    }

    async fn get(&self, order_id: &str) -> Result<Option<Order>, StoreError> {
        Ok(self.lock(order_id, Get)?.get(order_id).cloned())
    }

    async fn query(&self, query: IndexQuery) -> Result<Vec<Order>, StoreError> {
        if attribute_name_unknown(&query) {
            return Err(StoreError::new(
                query.pk_value.clone(),
                Query,
                BadRecord(format!(
                    "index keys {} and {} are not order attributes",
                    query.pk_key, query.sk_key
                )),
            ));
        }

        let guard = self.lock(&query.pk_value, Query)?;
        let mut matches: Vec<(String, Order)> = Vec::new();

        for order in guard.values() {
            let Some(pk) = attribute(order, &query.pk_key) else {
                continue;
            };
            if pk != query.pk_value {
                continue;
            }

            // Records without the sort key are not projected into the index
            let Some(sk) = attribute(order, &query.sk_key) else {
                continue;
            };
            if query.sk_value.as_deref().is_some_and(|value| value != sk) {
                continue;
            }

            matches.push((sk.to_string(), order.clone()));
        }

        matches.sort_by(|(left, _), (right, _)| left.cmp(right));
        if !query.ascending {
            matches.reverse();
        }

        Ok(matches.into_iter().map(|(_, order)| order).collect())
    }
}

fn attribute<'a>(order: &'a Order, name: &str) -> Option<&'a str> {
    match name {
        "orderId" => Some(order.order_id.as_str()),
        "companyName" => Some(order.company_name.as_str()),
        "carName" => Some(order.car_name.as_str()),
        "email" => order.email.as_deref(),
        "phoneNumber" => order.phone_number.as_deref(),
        "pk" => Some(order.pk.as_str()),
        "sk" => Some(order.sk.as_str()),
        _ => None,
    }
}

fn attribute_name_unknown(query: &IndexQuery) -> bool {
    const KNOWN: [&str; 7] = ["orderId", "companyName", "carName", "email", "phoneNumber", "pk", "sk"];

    !KNOWN.contains(&query.pk_key.as_str()) || !KNOWN.contains(&query.sk_key.as_str())
}
