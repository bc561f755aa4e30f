use crate::attributes::{order_key, patch_names, patch_values, RENEWAL_UPDATE};
use async_trait::async_trait;
use aws_sdk_dynamodb::config::http::HttpResponse;
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::get_item::{GetItemError, GetItemOutput};
use aws_sdk_dynamodb::operation::put_item::{PutItemError, PutItemOutput};
use aws_sdk_dynamodb::operation::query::{QueryError, QueryOutput};
use aws_sdk_dynamodb::types::AttributeValue;
use model::{ExpiryPatch, Order};
use std::collections::HashMap;
use store::StoreErrorReason::{BackendFailure, BadRecord};
use store::StoreOperation::{Get, Query, Update, Write};
use store::{IndexQuery, OrderStore, StoreError};

mod attributes;

type Item = HashMap<String, AttributeValue>;

pub struct DynamoDbOrderStore {
    table_name: String,
    dynamodb_client: aws_sdk_dynamodb::Client,
    consistent_read: bool,
}

impl DynamoDbOrderStore {
    pub fn new(dynamodb_client: aws_sdk_dynamodb::Client, table_name: impl Into<String>) -> Self {
        DynamoDbOrderStore {
            table_name: table_name.into(),
            dynamodb_client,
            consistent_read: false,
        }
    }

    /// Use strongly consistent reads for point lookups.
    /// Index queries are always eventually consistent.
    pub fn with_consistent_read(mut self, consistent_read: bool) -> Self {
        self.consistent_read = consistent_read;
        self
    }
}

#[async_trait]
impl OrderStore for DynamoDbOrderStore {
    async fn write(&self, order: Order) -> Result<Order, StoreError> {
        let item: Item = serde_dynamo::to_item(&order).map_err(|err| {
            StoreError::new(order.order_id.clone(), Write, BadRecord(err.to_string()))
        })?;

        self.put_item(item).await.map_err(|err| {
            StoreError::new(order.order_id.clone(), Write, BackendFailure(err.into()))
        })?;

        Ok(order)
    }

    async fn update(&self, order_id: &str, patch: ExpiryPatch) -> Result<ExpiryPatch, StoreError> {
        self.dynamodb_client
            .update_item()
            .table_name(&self.table_name)
            .set_key(Some(order_key(order_id)))
            .update_expression(RENEWAL_UPDATE)
            .set_expression_attribute_names(Some(patch_names()))
            .set_expression_attribute_values(Some(patch_values(&patch)))
            .send()
            .await
            .map_err(|err| StoreError::new(order_id, Update, BackendFailure(err.into())))?;

        Ok(patch)
    }

    async fn get(&self, order_id: &str) -> Result<Option<Order>, StoreError> {
        let output: GetItemOutput = self
            .get_item(order_key(order_id))
            .await
            .map_err(|err| StoreError::new(order_id, Get, BackendFailure(err.into())))?;

        let Some(item) = output.item else {
            return Ok(None);
        };

        let order: Order = serde_dynamo::from_item(item)
            .map_err(|err| StoreError::new(order_id, Get, BadRecord(err.to_string())))?;

        Ok(Some(order))
    }

    async fn query(&self, query: IndexQuery) -> Result<Vec<Order>, StoreError> {
        let mut items: Vec<Item> = Vec::new();
        let mut start_key: Option<Item> = None;

        // Follow pagination until the partition is exhausted
        loop {
            let output: QueryOutput = self
                .query_page(&query, start_key.take())
                .await
                .map_err(|err| {
                    StoreError::new(query.pk_value.clone(), Query, BackendFailure(err.into()))
                })?;

            items.extend(output.items.unwrap_or_default());

            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        serde_dynamo::from_items(items).map_err(|err| {
            StoreError::new(query.pk_value.clone(), Query, BadRecord(err.to_string()))
        })
    }
}

impl DynamoDbOrderStore {
    async fn get_item(&self, key: Item) -> Result<GetItemOutput, SdkError<GetItemError, HttpResponse>> {
        self.dynamodb_client
            .get_item()
            .table_name(&self.table_name)
            .consistent_read(self.consistent_read)
            .set_key(Some(key))
            .send()
            .await
    }

    async fn put_item(&self, item: Item) -> Result<PutItemOutput, SdkError<PutItemError, HttpResponse>> {
        self.dynamodb_client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
    }

    async fn query_page(
        &self,
        query: &IndexQuery,
        start_key: Option<Item>,
    ) -> Result<QueryOutput, SdkError<QueryError, HttpResponse>> {
        let mut key_condition: String = "#pk = :pk".to_string();
        let mut names: HashMap<String, String> =
            HashMap::from([("#pk".to_string(), query.pk_key.clone())]);
        let mut values: Item =
            HashMap::from([(":pk".to_string(), AttributeValue::S(query.pk_value.clone()))]);

        if let Some(sk_value) = &query.sk_value {
            key_condition.push_str(" AND #sk = :sk");
            names.insert("#sk".to_string(), query.sk_key.clone());
            values.insert(":sk".to_string(), AttributeValue::S(sk_value.clone()));
        }

        self.dynamodb_client
            .query()
            .table_name(&self.table_name)
            .index_name(&query.index)
            .key_condition_expression(key_condition)
            .set_expression_attribute_names(Some(names))
            .set_expression_attribute_values(Some(values))
            .scan_index_forward(query.ascending)
            .set_exclusive_start_key(start_key)
            .send()
            .await
    }
}
