//! SQLite repository integration tests.

#[cfg(test)]
mod tests {
    use laundry_types::{
        CreateTransactionRequest, Customer, CustomerId, CustomerRequest, DomainError,
        LaundryRepository, LineItemRequest, Money, Payment, RepoError, Role, Service, ServiceId,
        ServiceRequest, TransactionId, TransactionStatus, UpdateTransactionRequest, User,
    };

    use crate::SqliteRepo;

    async fn setup_repo() -> SqliteRepo {
        SqliteRepo::new("sqlite::memory:").await.unwrap()
    }

    async fn add_service(repo: &SqliteRepo, name: &str, price: i64) -> Service {
        repo.create_service(ServiceRequest {
            service_name: name.to_string(),
            description: String::new(),
            unit_price: Money::new(price).unwrap(),
            unit: "kg".to_string(),
        })
        .await
        .unwrap()
    }

    async fn add_customer(repo: &SqliteRepo, name: &str) -> Customer {
        repo.create_customer(CustomerRequest {
            full_name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone_number: "0811".to_string(),
        })
        .await
        .unwrap()
    }

    fn line(service: &Service, quantity: i64) -> LineItemRequest {
        LineItemRequest {
            service_id: service.id,
            quantity,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Catalog & customers
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_create_and_get_service() {
        let repo = setup_repo().await;

        let created = add_service(&repo, "Wash", 8000).await;
        let fetched = repo.get_service(created.id).await.unwrap().unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.unit_price.amount(), 8000);
    }

    #[tokio::test]
    async fn test_get_service_not_found() {
        let repo = setup_repo().await;

        let result = repo.get_service(ServiceId::new()).await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_update_missing_service_is_not_found() {
        let repo = setup_repo().await;

        let result = repo
            .update_service(
                ServiceId::new(),
                ServiceRequest {
                    service_name: "Dry".into(),
                    description: String::new(),
                    unit_price: Money::new(1).unwrap(),
                    unit: "kg".into(),
                },
            )
            .await;

        assert!(matches!(result, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn test_customer_crud() {
        let repo = setup_repo().await;

        let customer = add_customer(&repo, "Ani").await;
        assert_eq!(repo.list_customers().await.unwrap().len(), 1);

        let updated = repo
            .update_customer(
                customer.id,
                CustomerRequest {
                    full_name: "Ani Lestari".into(),
                    email: customer.email.clone(),
                    phone_number: "0812".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.full_name, "Ani Lestari");

        assert!(repo.delete_customer(customer.id).await.unwrap());
        assert!(!repo.delete_customer(customer.id).await.unwrap());
        assert!(repo.get_customer(customer.id).await.unwrap().is_none());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transactions
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_create_transaction_snapshots_prices() {
        let repo = setup_repo().await;
        let wash = add_service(&repo, "Wash", 8000).await;
        let iron = add_service(&repo, "Iron", 5000).await;
        let customer = add_customer(&repo, "Budi").await;

        let tx = repo
            .create_transaction(CreateTransactionRequest {
                customer_id: customer.id,
                items: vec![line(&wash, 3), line(&iron, 2)],
                payment_method: Some("cash".into()),
            })
            .await
            .unwrap();

        assert_eq!(tx.total_amount.amount(), 34000);
        assert_eq!(tx.status, TransactionStatus::Pending);

        // Later catalog changes must not touch the stored snapshot
        repo.update_service(
            wash.id,
            ServiceRequest {
                service_name: "Wash".into(),
                description: String::new(),
                unit_price: Money::new(12000).unwrap(),
                unit: "kg".into(),
            },
        )
        .await
        .unwrap();

        let stored = repo.get_transaction(tx.id).await.unwrap().unwrap();
        assert_eq!(stored.items.len(), 2);
        assert_eq!(stored.items[0].service_id, wash.id);
        assert_eq!(stored.items[0].unit_price.amount(), 8000);
        assert_eq!(stored.items[0].service.service_name, "Wash");
        assert_eq!(stored.items[1].total_price.amount(), 10000);
        assert_eq!(stored.total_amount.amount(), 34000);
        assert_eq!(stored.payment_method, "cash");
        assert_eq!(stored.customer.unwrap().full_name, "Budi");
    }

    #[tokio::test]
    async fn test_unknown_service_writes_nothing() {
        let repo = setup_repo().await;
        let wash = add_service(&repo, "Wash", 8000).await;
        let customer = add_customer(&repo, "Budi").await;
        let missing = ServiceId::new();

        let result = repo
            .create_transaction(CreateTransactionRequest {
                customer_id: customer.id,
                items: vec![
                    line(&wash, 1),
                    LineItemRequest {
                        service_id: missing,
                        quantity: 1,
                    },
                ],
                payment_method: None,
            })
            .await;

        assert!(matches!(
            result,
            Err(RepoError::Domain(DomainError::ServiceNotFound(id))) if id == missing
        ));
        assert!(repo.list_transactions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_customer_is_rejected() {
        let repo = setup_repo().await;
        let wash = add_service(&repo, "Wash", 8000).await;

        let result = repo
            .create_transaction(CreateTransactionRequest {
                customer_id: CustomerId::new(),
                items: vec![line(&wash, 1)],
                payment_method: None,
            })
            .await;

        assert!(matches!(
            result,
            Err(RepoError::Domain(DomainError::CustomerNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_empty_items_are_rejected() {
        let repo = setup_repo().await;
        let customer = add_customer(&repo, "Budi").await;

        let result = repo
            .create_transaction(CreateTransactionRequest {
                customer_id: customer.id,
                items: vec![],
                payment_method: None,
            })
            .await;

        assert!(matches!(
            result,
            Err(RepoError::Domain(DomainError::EmptyTransaction))
        ));
    }

    #[tokio::test]
    async fn test_update_transaction_reprices_and_keeps_item_ids() {
        let repo = setup_repo().await;
        let wash = add_service(&repo, "Wash", 8000).await;
        let dry = add_service(&repo, "Dry", 4000).await;
        let budi = add_customer(&repo, "Budi").await;
        let siti = add_customer(&repo, "Siti").await;

        let tx = repo
            .create_transaction(CreateTransactionRequest {
                customer_id: budi.id,
                items: vec![line(&wash, 1), line(&dry, 1)],
                payment_method: None,
            })
            .await
            .unwrap();
        let first_item = tx.items[0].id;

        let updated = repo
            .update_transaction(
                tx.id,
                UpdateTransactionRequest {
                    customer_id: Some(siti.id),
                    items: vec![line(&wash, 2)],
                    payment_method: Some("qris".into()),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.items.len(), 1);
        assert_eq!(updated.items[0].id, first_item);
        assert_eq!(updated.total_amount.amount(), 16000);
        assert_eq!(updated.customer_id, siti.id);

        let stored = repo.get_transaction(tx.id).await.unwrap().unwrap();
        assert_eq!(stored.items.len(), 1);
        assert_eq!(stored.total_amount.amount(), 16000);
        assert_eq!(stored.payment_method, "qris");
        assert_eq!(stored.customer.unwrap().full_name, "Siti");
    }

    #[tokio::test]
    async fn test_update_missing_transaction() {
        let repo = setup_repo().await;
        let wash = add_service(&repo, "Wash", 8000).await;

        let result = repo
            .update_transaction(
                TransactionId::new(),
                UpdateTransactionRequest {
                    customer_id: None,
                    items: vec![line(&wash, 1)],
                    payment_method: None,
                },
            )
            .await;

        assert!(matches!(
            result,
            Err(RepoError::Domain(DomainError::TransactionNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_delete_transaction_removes_items() {
        let repo = setup_repo().await;
        let wash = add_service(&repo, "Wash", 8000).await;
        let customer = add_customer(&repo, "Budi").await;
        let tx = repo
            .create_transaction(CreateTransactionRequest {
                customer_id: customer.id,
                items: vec![line(&wash, 1)],
                payment_method: None,
            })
            .await
            .unwrap();

        assert!(repo.delete_transaction(tx.id).await.unwrap());
        assert!(!repo.delete_transaction(tx.id).await.unwrap());

        let (remaining,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM transaction_items")
            .fetch_one(repo.pool())
            .await
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn test_list_transactions_groups_items() {
        let repo = setup_repo().await;
        let wash = add_service(&repo, "Wash", 8000).await;
        let iron = add_service(&repo, "Iron", 5000).await;
        let customer = add_customer(&repo, "Budi").await;

        for items in [vec![line(&wash, 1)], vec![line(&wash, 1), line(&iron, 3)]] {
            repo.create_transaction(CreateTransactionRequest {
                customer_id: customer.id,
                items,
                payment_method: None,
            })
            .await
            .unwrap();
        }

        let listed = repo.list_transactions().await.unwrap();
        assert_eq!(listed.len(), 2);
        let item_counts: Vec<usize> = listed.iter().map(|t| t.items.len()).collect();
        assert!(item_counts.contains(&1));
        assert!(item_counts.contains(&2));
        for tx in &listed {
            let sum: i64 = tx.items.iter().map(|i| i.total_price.amount()).sum();
            assert_eq!(tx.total_amount.amount(), sum);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Payments
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_payment_status_updates_transaction() {
        let repo = setup_repo().await;
        let wash = add_service(&repo, "Wash", 8000).await;
        let customer = add_customer(&repo, "Budi").await;
        let tx = repo
            .create_transaction(CreateTransactionRequest {
                customer_id: customer.id,
                items: vec![line(&wash, 3)],
                payment_method: None,
            })
            .await
            .unwrap();

        let payment = Payment::pending(&tx, "order-1".into(), "https://pay/1".into(), None);
        repo.insert_payment(&payment).await.unwrap();

        let stored = repo.find_payment_by_order_id("order-1").await.unwrap().unwrap();
        assert_eq!(stored.gross_amount.amount(), 24000);
        assert_eq!(stored.status, "Pending");

        assert!(repo.record_payment_status("order-1", "settlement").await.unwrap());

        let stored = repo.find_payment_by_order_id("order-1").await.unwrap().unwrap();
        assert_eq!(stored.status, "settlement");
        let tx = repo.get_transaction(tx.id).await.unwrap().unwrap();
        assert_eq!(tx.status, TransactionStatus::Paid);
    }

    #[tokio::test]
    async fn test_inconclusive_status_leaves_transaction() {
        let repo = setup_repo().await;
        let wash = add_service(&repo, "Wash", 8000).await;
        let customer = add_customer(&repo, "Budi").await;
        let tx = repo
            .create_transaction(CreateTransactionRequest {
                customer_id: customer.id,
                items: vec![line(&wash, 1)],
                payment_method: None,
            })
            .await
            .unwrap();
        let payment = Payment::pending(&tx, "order-2".into(), "https://pay/2".into(), None);
        repo.insert_payment(&payment).await.unwrap();

        assert!(repo.record_payment_status("order-2", "authorize").await.unwrap());

        let tx = repo.get_transaction(tx.id).await.unwrap().unwrap();
        assert_eq!(tx.status, TransactionStatus::Pending);
    }

    #[tokio::test]
    async fn test_late_notification_for_another_attempt_keeps_paid() {
        let repo = setup_repo().await;
        let wash = add_service(&repo, "Wash", 8000).await;
        let customer = add_customer(&repo, "Budi").await;
        let tx = repo
            .create_transaction(CreateTransactionRequest {
                customer_id: customer.id,
                items: vec![line(&wash, 3)],
                payment_method: None,
            })
            .await
            .unwrap();
        for order_id in ["attempt-a", "attempt-b"] {
            let payment = Payment::pending(&tx, order_id.into(), "https://pay".into(), None);
            repo.insert_payment(&payment).await.unwrap();
        }

        assert!(repo.record_payment_status("attempt-b", "settlement").await.unwrap());
        assert!(repo.record_payment_status("attempt-a", "expire").await.unwrap());
        assert!(repo.record_payment_status("attempt-b", "pending").await.unwrap());

        let tx = repo.get_transaction(tx.id).await.unwrap().unwrap();
        assert_eq!(tx.status, TransactionStatus::Paid);

        let abandoned = repo.find_payment_by_order_id("attempt-a").await.unwrap().unwrap();
        assert_eq!(abandoned.status, "expire");
    }

    #[tokio::test]
    async fn test_unknown_order_id_is_a_miss() {
        let repo = setup_repo().await;

        assert!(!repo.record_payment_status("nope", "settlement").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_order_id_conflicts() {
        let repo = setup_repo().await;
        let wash = add_service(&repo, "Wash", 8000).await;
        let customer = add_customer(&repo, "Budi").await;
        let tx = repo
            .create_transaction(CreateTransactionRequest {
                customer_id: customer.id,
                items: vec![line(&wash, 1)],
                payment_method: None,
            })
            .await
            .unwrap();

        let first = Payment::pending(&tx, "order-3".into(), "https://pay/3".into(), None);
        repo.insert_payment(&first).await.unwrap();
        let second = Payment::pending(&tx, "order-3".into(), "https://pay/4".into(), None);

        assert!(matches!(
            repo.insert_payment(&second).await,
            Err(RepoError::Conflict(_))
        ));
        assert_eq!(repo.list_payments().await.unwrap().len(), 1);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Users
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_users() {
        let repo = setup_repo().await;
        assert_eq!(repo.count_users().await.unwrap(), 0);

        let user = User::new("admin".into(), "salt$hash".into(), Role::Admin);
        repo.create_user(&user).await.unwrap();

        let found = repo.find_user_by_username("admin").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.role, Role::Admin);
        assert_eq!(found.password_hash, "salt$hash");
        assert_eq!(repo.count_users().await.unwrap(), 1);

        let duplicate = User::new("admin".into(), "x$y".into(), Role::Staff);
        assert!(matches!(
            repo.create_user(&duplicate).await,
            Err(RepoError::Conflict(_))
        ));
        assert!(repo.find_user_by_username("ghost").await.unwrap().is_none());
    }
}
