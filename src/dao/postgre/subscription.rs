use async_trait::async_trait;
use sqlx::QueryBuilder;

use super::DataBase;
use crate::{
    dao::SubscriptionStore,
    error::Error,
    model::{Filter, Patch, Subscription, Table},
};

const COLUMNS: &str =
    "user_id, endpoint, p256dh, auth, service, created_at, last_modified_at";

fn push_filter(builder: &mut QueryBuilder<'_, DataBase>, filter: &Filter) {
    builder.push(" WHERE TRUE");

    if let Some(value) = &filter.user_id {
        builder.push(" AND user_id = ").push_bind(value.to_owned());
    }

    if let Some(value) = &filter.endpoint {
        builder.push(" AND endpoint = ").push_bind(value.to_owned());
    }

    if let Some(value) = &filter.service {
        builder.push(" AND service = ").push_bind(value.to_owned());
    }

    if let Some(value) = &filter.endpoint_ne {
        builder.push(" AND endpoint <> ").push_bind(value.to_owned());
    }
}

fn select(filter: &Filter) -> QueryBuilder<'static, DataBase> {
    let mut builder =
        QueryBuilder::new(format!(r#"SELECT {} FROM "subscription""#, COLUMNS));
    push_filter(&mut builder, filter);
    builder.push(" ORDER BY created_at");
    builder
}

#[async_trait]
impl SubscriptionStore for Table<Subscription> {
    async fn find(&self, filter: &Filter) -> Result<Vec<Subscription>, Error> {
        let data = select(filter)
            .build_query_as::<Subscription>()
            .fetch_all(&self.pool)
            .await?;
        Ok(data)
    }

    async fn find_one(
        &self,
        filter: &Filter,
    ) -> Result<Option<Subscription>, Error> {
        let mut builder = select(filter);
        builder.push(" LIMIT 1");

        let data = builder
            .build_query_as::<Subscription>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(data)
    }

    async fn insert(&self, subscription: Subscription) -> Result<(), Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO "subscription" (user_id, endpoint, p256dh, auth, service, created_at, last_modified_at)
            VALUES($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&subscription.user_id)
        .bind(&subscription.endpoint)
        .bind(&subscription.keys.p256dh)
        .bind(&subscription.keys.auth)
        .bind(&subscription.service)
        .bind(subscription.created_at)
        .bind(subscription.last_modified_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(Error::DuplicateSubscription(subscription.endpoint))
            },
            Err(e) => Err(Error::SQL(e)),
        }
    }

    async fn update(
        &self,
        filter: &Filter,
        patch: &Patch,
    ) -> Result<u64, Error> {
        let Some(last_modified_at) = patch.last_modified_at else {
            return Ok(0);
        };

        let mut builder =
            QueryBuilder::new(r#"UPDATE "subscription" SET last_modified_at = "#);
        builder.push_bind(last_modified_at);
        push_filter(&mut builder, filter);

        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn remove(&self, filter: &Filter) -> Result<u64, Error> {
        let mut builder = QueryBuilder::new(r#"DELETE FROM "subscription""#);
        push_filter(&mut builder, filter);

        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn close(&self) -> Result<(), Error> {
        self.pool.close().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_renders_all_predicates() {
        let filter = Filter {
            user_id: Some(String::from("u1")),
            service: Some(String::from("push.example.com")),
            endpoint_ne: Some(String::from("https://push.example.com/b")),
            ..Filter::default()
        };

        let builder = select(&filter);

        assert_eq!(
            builder.sql(),
            r#"SELECT user_id, endpoint, p256dh, auth, service, created_at, last_modified_at FROM "subscription" WHERE TRUE AND user_id = $1 AND service = $2 AND endpoint <> $3 ORDER BY created_at"#
        );
    }

    #[test]
    fn test_empty_filter_selects_everything() {
        let builder = select(&Filter::default());

        assert!(builder.sql().ends_with("WHERE TRUE ORDER BY created_at"));
    }
}
