use crate::{
    abstract_trait::{DynTransactionRunner, UnitOfWorkTrait},
    errors::{RepositoryError, ServiceError},
};
use futures::future::BoxFuture;
use std::time::Duration;
use tracing::{error, warn};

/// Runs `work` inside one unit of work.
///
/// The unit of work is committed when `work` returns `Ok` and rolled back when
/// it returns `Err` or does not finish within `timeout`. A timeout surfaces as
/// [`RepositoryError::Timeout`].
pub async fn with_transaction<T, F>(
    runner: &DynTransactionRunner,
    timeout: Duration,
    work: F,
) -> Result<T, ServiceError>
where
    T: Send,
    F: for<'t> FnOnce(
            &'t mut (dyn UnitOfWorkTrait + 'static),
        ) -> BoxFuture<'t, Result<T, ServiceError>>
        + Send,
{
    let mut uow = tokio::time::timeout(timeout, runner.begin())
        .await
        .map_err(|_| RepositoryError::Timeout)??;

    match tokio::time::timeout(timeout, work(uow.as_mut())).await {
        Ok(Ok(value)) => {
            uow.commit().await?;
            Ok(value)
        }
        Ok(Err(err)) => {
            rollback(uow).await;
            Err(err)
        }
        Err(_) => {
            warn!("⏱️ Unit of work exceeded {}ms, rolling back", timeout.as_millis());
            rollback(uow).await;
            Err(RepositoryError::Timeout.into())
        }
    }
}

// a failed rollback is only logged; the caller gets the work error
async fn rollback(uow: Box<dyn UnitOfWorkTrait>) {
    if let Err(err) = uow.rollback().await {
        error!("❌ Rollback failed: {err:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        abstract_trait::{DynTransactionRunner, UserCommandRepositoryTrait},
        domain::{identity::Role, requests::CreateUserRecordRequest},
        repository::MemoryStore,
    };
    use std::sync::Arc;

    async fn setup() -> (MemoryStore, DynTransactionRunner, uuid::Uuid) {
        let store = MemoryStore::new();
        let product = store.seed_product("Mug", 500, "USD", 10).await;
        let runner = Arc::new(store.clone()) as DynTransactionRunner;
        (store, runner, product.id)
    }

    #[tokio::test]
    async fn commits_when_work_succeeds() {
        let (store, runner, product_id) = setup().await;

        let stock = with_transaction(&runner, Duration::from_secs(1), move |uow| {
            Box::pin(async move {
                let product = uow.decrement_stock(product_id, 3).await?;
                Ok::<_, ServiceError>(product.map(|p| p.stock))
            })
        })
        .await
        .unwrap();

        assert_eq!(stock, Some(7));
        assert_eq!(store.product(product_id).await.unwrap().stock, 7);
    }

    #[tokio::test]
    async fn rolls_back_when_work_fails() {
        let (store, runner, product_id) = setup().await;

        let result: Result<(), ServiceError> =
            with_transaction(&runner, Duration::from_secs(1), move |uow| {
                Box::pin(async move {
                    uow.decrement_stock(product_id, 3).await?;
                    Err::<(), _>(ServiceError::InvalidRequest("boom".into()))
                })
            })
            .await;

        assert!(matches!(result, Err(ServiceError::InvalidRequest(_))));
        assert_eq!(store.product(product_id).await.unwrap().stock, 10);
    }

    #[tokio::test]
    async fn rolls_back_when_work_times_out() {
        let (store, runner, product_id) = setup().await;

        let result: Result<(), ServiceError> =
            with_transaction(&runner, Duration::from_millis(50), move |uow| {
                Box::pin(async move {
                    uow.decrement_stock(product_id, 3).await?;
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok::<(), ServiceError>(())
                })
            })
            .await;

        assert!(matches!(
            result,
            Err(ServiceError::Repo(RepositoryError::Timeout))
        ));
        assert_eq!(store.product(product_id).await.unwrap().stock, 10);
    }

    #[tokio::test]
    async fn store_errors_abort_the_unit_of_work() {
        let (store, runner, product_id) = setup().await;

        // no such user, so the order insert trips the foreign key
        let result: Result<(), ServiceError> =
            with_transaction(&runner, Duration::from_secs(1), move |uow| {
                Box::pin(async move {
                    uow.decrement_stock(product_id, 1).await?;
                    uow.create_order(&crate::domain::requests::CreateOrderRecordRequest {
                        user_id: uuid::Uuid::new_v4(),
                        total_cents: 500,
                        currency: "USD".into(),
                    })
                    .await?;
                    Ok::<(), ServiceError>(())
                })
            })
            .await;

        assert!(matches!(
            result,
            Err(ServiceError::Repo(RepositoryError::ForeignKey(_)))
        ));
        assert_eq!(store.product(product_id).await.unwrap().stock, 10);
        assert_eq!(store.order_count().await, 0);

        // the store stays usable afterwards
        store
            .create_user(&CreateUserRecordRequest {
                email: "a@b.co".into(),
                password_hash: "x".into(),
                role: Role::User,
            })
            .await
            .unwrap();
    }
}
