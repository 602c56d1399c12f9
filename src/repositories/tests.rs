#[cfg(test)]
mod repository_tests {
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use uuid::Uuid;

    use crate::models::{ButcherItem, CartLine, GroceryItem, LineRequest, RepositoryError, Session};
    use crate::repositories::session_repository::*;

    fn lamb() -> ButcherItem {
        ButcherItem {
            id: "b1".to_string(),
            title: "Lamb shoulder".to_string(),
            description: None,
            price_per_kg: dec!(12.50),
            available: true,
            image: None,
        }
    }

    fn lamb_by_weight(weight_kg: Option<Decimal>) -> LineRequest {
        LineRequest::Butcher {
            item: lamb(),
            weight_kg,
        }
    }

    fn feta_by_count(quantity: Option<Decimal>) -> LineRequest {
        LineRequest::Grocery {
            item: feta(),
            quantity,
        }
    }

    fn feta() -> GroceryItem {
        GroceryItem {
            id: "g1".to_string(),
            title: "Feta".to_string(),
            description: None,
            price: dec!(4.00),
            available: true,
            image: None,
        }
    }

    mod session_repository_tests {
        use super::*;

        #[tokio::test]
        async fn test_create_and_find() {
            let repository = InMemorySessionRepository::new();
            let session = repository.create(Session::new()).await.unwrap();

            let found = repository.find(session.id).await.unwrap();
            assert_eq!(found, Some(session));
            assert_eq!(repository.count().await.unwrap(), 1);
        }

        #[tokio::test]
        async fn test_find_unknown_session() {
            let repository = InMemorySessionRepository::new();
            assert!(repository.find(Uuid::new_v4()).await.unwrap().is_none());
        }

        #[tokio::test]
        async fn test_create_duplicate_is_rejected() {
            let repository = InMemorySessionRepository::new();
            let session = repository.create(Session::new()).await.unwrap();

            let result = repository.create(session).await;
            assert!(matches!(
                result,
                Err(RepositoryError::ConstraintViolation { .. })
            ));
        }

        #[tokio::test]
        async fn test_add_line_appends_and_touches() {
            let repository = InMemorySessionRepository::new();
            let session = repository.create(Session::new()).await.unwrap();

            let (lamb_line, _) = repository
                .add_line(session.id, lamb_by_weight(Some(dec!(0.3))))
                .await
                .unwrap();
            let (feta_line, updated) = repository
                .add_line(session.id, feta_by_count(Some(dec!(3))))
                .await
                .unwrap();

            assert!(matches!(lamb_line, CartLine::Butcher(_)));
            assert_eq!(lamb_line.subtotal(), dec!(3.75));
            assert_eq!(updated.cart.lines(), &[lamb_line, feta_line][..]);
            assert_eq!(updated.cart.len(), 2);
            assert_eq!(updated.cart.compute_total(), dec!(15.75));
            assert!(updated.last_active_at >= session.last_active_at);
        }

        #[tokio::test]
        async fn test_add_line_to_missing_session() {
            let repository = InMemorySessionRepository::new();
            let result = repository
                .add_line(Uuid::new_v4(), feta_by_count(None))
                .await;
            assert!(matches!(result, Err(RepositoryError::NotFound)));
        }

        #[tokio::test]
        async fn test_clear_cart_keeps_session() {
            let repository = InMemorySessionRepository::new();
            let session = repository.create(Session::new()).await.unwrap();
            for _ in 0..2 {
                repository
                    .add_line(session.id, feta_by_count(None))
                    .await
                    .unwrap();
            }

            let dropped = repository.clear_cart(session.id).await.unwrap();

            assert_eq!(dropped, 2);
            let stored = repository.find(session.id).await.unwrap().unwrap();
            assert!(stored.cart.is_empty());
            assert_eq!(repository.count().await.unwrap(), 1);
            assert!(matches!(
                repository.clear_cart(Uuid::new_v4()).await,
                Err(RepositoryError::NotFound)
            ));
        }

        #[tokio::test]
        async fn test_update_missing_session() {
            let repository = InMemorySessionRepository::new();
            let result = repository.update(Session::new()).await;
            assert!(matches!(result, Err(RepositoryError::NotFound)));
        }

        #[tokio::test]
        async fn test_delete() {
            let repository = InMemorySessionRepository::new();
            let session = repository.create(Session::new()).await.unwrap();

            assert!(repository.delete(session.id).await.unwrap());
            assert!(!repository.delete(session.id).await.unwrap());
            assert_eq!(repository.count().await.unwrap(), 0);
        }

        #[tokio::test]
        async fn test_purge_idle_only_drops_stale_sessions() {
            let repository = InMemorySessionRepository::new();

            let mut stale = Session::new();
            stale.last_active_at = Utc::now() - Duration::hours(2);
            let stale = repository.create(stale).await.unwrap();
            let fresh = repository.create(Session::new()).await.unwrap();

            let purged = repository.purge_idle(Duration::hours(1)).await.unwrap();

            assert_eq!(purged, 1);
            assert!(repository.find(stale.id).await.unwrap().is_none());
            assert!(repository.find(fresh.id).await.unwrap().is_some());
        }

        #[tokio::test]
        async fn test_concurrent_adds_are_not_lost() {
            let repository = Arc::new(InMemorySessionRepository::new());
            let session = repository.create(Session::new()).await.unwrap();

            let mut handles = Vec::new();
            for _ in 0..20 {
                let repository = repository.clone();
                handles.push(tokio::spawn(async move {
                    repository
                        .add_line(session.id, feta_by_count(Some(dec!(1))))
                        .await
                        .unwrap();
                }));
            }
            for handle in handles {
                handle.await.unwrap();
            }

            let stored = repository.find(session.id).await.unwrap().unwrap();
            assert_eq!(stored.cart.len(), 20);
            assert_eq!(stored.cart.compute_total(), dec!(80.00));
        }
    }
}
