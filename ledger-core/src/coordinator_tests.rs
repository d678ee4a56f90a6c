//! MutationCoordinator unit tests.

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal::Decimal;
    use tokio::sync::Notify;

    use ledger_types::{
        Amount, Category, Direction, DomainError, LedgerError, ListOrder, NewTransaction, OwnerId,
        RemoteError, RemoteLedgerClient, Transaction, TransactionDraft, TransactionId,
        TransactionPatch,
    };

    use crate::MutationCoordinator;

    /// A remote call as seen by the mock.
    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        List,
        Insert,
        Update(TransactionId, TransactionPatch),
        Delete(TransactionId),
    }

    /// Holds mutations until released.
    #[derive(Clone, Default)]
    pub struct Gate {
        pub entered: Arc<Notify>,
        pub release: Arc<Notify>,
    }

    /// In-memory remote that records calls and can fail or stall on demand.
    pub struct MockRemote {
        rows: Mutex<Vec<Transaction>>,
        next_id: AtomicI64,
        calls: Mutex<Vec<Call>>,
        fail_next: Mutex<Option<RemoteError>>,
        gate: Mutex<Option<Gate>>,
    }

    impl MockRemote {
        pub fn new() -> Self {
            Self::with_rows(Vec::new())
        }

        pub fn with_rows(rows: Vec<Transaction>) -> Self {
            let next_id = rows.iter().map(|tx| tx.id.get()).max().unwrap_or(0) + 1;
            Self {
                rows: Mutex::new(rows),
                next_id: AtomicI64::new(next_id),
                calls: Mutex::new(Vec::new()),
                fail_next: Mutex::new(None),
                gate: Mutex::new(None),
            }
        }

        /// The next call of any kind fails with `err`.
        pub fn fail_next(&self, err: RemoteError) {
            *self.fail_next.lock().unwrap() = Some(err);
        }

        /// Mutations wait on the returned gate until it is released.
        pub fn hold_mutations(&self) -> Gate {
            let gate = Gate::default();
            *self.gate.lock().unwrap() = Some(gate.clone());
            gate
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        pub fn mutation_count(&self) -> usize {
            self.calls()
                .iter()
                .filter(|call| !matches!(call, Call::List))
                .count()
        }

        pub fn rows(&self) -> Vec<Transaction> {
            self.rows.lock().unwrap().clone()
        }

        fn record(&self, call: Call) -> Result<(), RemoteError> {
            self.calls.lock().unwrap().push(call);
            match self.fail_next.lock().unwrap().take() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }

        async fn pass_gate(&self) {
            let gate = self.gate.lock().unwrap().clone();
            if let Some(gate) = gate {
                gate.entered.notify_one();
                gate.release.notified().await;
            }
        }
    }

    #[async_trait]
    impl RemoteLedgerClient for MockRemote {
        async fn list(
            &self,
            owner_id: &OwnerId,
            _order: ListOrder,
        ) -> Result<Vec<Transaction>, RemoteError> {
            self.record(Call::List)?;
            Ok(self
                .rows()
                .into_iter()
                .filter(|tx| &tx.owner_id == owner_id)
                .collect())
        }

        async fn insert(&self, transaction: NewTransaction) -> Result<Transaction, RemoteError> {
            self.record(Call::Insert)?;
            self.pass_gate().await;
            let id = TransactionId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
            let stored = transaction.with_id(id);
            self.rows.lock().unwrap().push(stored.clone());
            Ok(stored)
        }

        async fn update(
            &self,
            id: TransactionId,
            patch: &TransactionPatch,
        ) -> Result<(), RemoteError> {
            self.record(Call::Update(id, patch.clone()))?;
            self.pass_gate().await;
            let mut rows = self.rows.lock().unwrap();
            let row = rows
                .iter_mut()
                .find(|tx| tx.id == id)
                .ok_or(RemoteError::NotFound)?;
            *row = row.apply(patch);
            Ok(())
        }

        async fn delete(&self, id: TransactionId) -> Result<(), RemoteError> {
            self.record(Call::Delete(id))?;
            self.pass_gate().await;
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|tx| tx.id != id);
            if rows.len() == before {
                return Err(RemoteError::NotFound);
            }
            Ok(())
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Fixtures
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn owner() -> OwnerId {
        OwnerId::new("user-1")
    }

    pub fn row(id: i64, amount: &str, direction: Direction, category: Category) -> Transaction {
        Transaction {
            id: TransactionId::new(id),
            owner_id: owner(),
            name: Some(format!("row {id}")),
            reason: None,
            date: Utc.with_ymd_and_hms(2025, 6, id as u32 % 28 + 1, 9, 0, 0).unwrap(),
            direction,
            category,
            amount: Amount::parse(amount).unwrap(),
        }
    }

    pub fn draft(amount: &str) -> TransactionDraft {
        TransactionDraft {
            name: Some("Almuerzo".to_string()),
            reason: None,
            date: Some(Utc.with_ymd_and_hms(2025, 7, 1, 13, 0, 0).unwrap()),
            direction: Some(Direction::Outflow),
            category: Some(Category::Food),
            amount: amount.to_string(),
        }
    }

    pub async fn loaded(rows: Vec<Transaction>) -> MutationCoordinator<MockRemote> {
        let coordinator = MutationCoordinator::new(MockRemote::with_rows(rows), owner());
        coordinator.load().await.unwrap();
        coordinator
    }

    fn amount_patch(amount: &str) -> TransactionPatch {
        TransactionPatch {
            amount: Some(Amount::parse(amount).unwrap()),
            ..Default::default()
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Load
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_load_only_sees_owner_rows() {
        let mut foreign = row(3, "5", Direction::Inflow, Category::Other);
        foreign.owner_id = OwnerId::new("someone-else");
        let coordinator = loaded(vec![
            row(1, "10", Direction::Inflow, Category::Work),
            row(2, "5", Direction::Outflow, Category::Food),
            foreign,
        ])
        .await;

        let ids: Vec<i64> = coordinator
            .transactions()
            .await
            .iter()
            .map(|tx| tx.id.get())
            .collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(coordinator.view().balance(), Decimal::from(5));
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_cache() {
        let coordinator = loaded(vec![row(1, "10", Direction::Inflow, Category::Work)]).await;
        coordinator
            .remote()
            .fail_next(RemoteError::Transport("offline".to_string()));

        let err = coordinator.load().await.unwrap_err();

        assert!(matches!(err, LedgerError::Fetch(RemoteError::Transport(_))));
        assert_eq!(coordinator.transactions().await.len(), 1);
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Create
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_create_adds_row_and_publishes() {
        let coordinator = loaded(Vec::new()).await;
        let mut rx = coordinator.subscribe();

        let created = coordinator.create(&draft("1500.25")).await.unwrap();

        assert_eq!(created.owner_id, owner());
        assert_eq!(coordinator.get(created.id).await, Some(created.clone()));
        assert!(rx.has_changed().unwrap());
        let view = rx.borrow_and_update().clone();
        assert_eq!(view.transactions, vec![created]);
        assert_eq!(view.balance(), Decimal::new(-150025, 2));
    }

    #[tokio::test]
    async fn test_create_rejects_non_numeric_amount_without_remote_call() {
        let coordinator = loaded(Vec::new()).await;

        let err = coordinator.create(&draft("abc")).await.unwrap_err();

        assert!(matches!(err, LedgerError::Validation(_)));
        assert!(err.is_local());
        assert_eq!(coordinator.remote().mutation_count(), 0);
        assert!(coordinator.transactions().await.is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_oversized_amount_without_remote_call() {
        let coordinator = loaded(vec![row(1, "10", Direction::Inflow, Category::Work)]).await;

        let err = coordinator
            .create(&draft("79228162514264337593543950335"))
            .await
            .unwrap_err();

        assert_eq!(err, LedgerError::Validation(DomainError::AmountTooLarge));
        assert_eq!(coordinator.remote().mutation_count(), 0);
        assert_eq!(coordinator.view().balance(), Decimal::from(10));
    }

    #[tokio::test]
    async fn test_largest_amounts_still_aggregate() {
        let coordinator = loaded(Vec::new()).await;

        for _ in 0..3 {
            coordinator
                .create(&draft("999999999999999.99"))
                .await
                .unwrap();
        }

        assert_eq!(
            coordinator.view().balance(),
            -Decimal::new(99999999999999999, 2) * Decimal::from(3)
        );
    }

    #[tokio::test]
    async fn test_create_requires_category() {
        let coordinator = loaded(Vec::new()).await;
        let mut incomplete = draft("10");
        incomplete.category = None;

        let err = coordinator.create(&incomplete).await.unwrap_err();

        assert!(matches!(err, LedgerError::Validation(_)));
        assert_eq!(coordinator.remote().mutation_count(), 0);
    }

    #[tokio::test]
    async fn test_create_remote_failure_leaves_cache_unchanged() {
        let coordinator = loaded(vec![row(1, "10", Direction::Inflow, Category::Work)]).await;
        let before = coordinator.transactions().await;
        coordinator.remote().fail_next(RemoteError::Status {
            status: 503,
            message: "unavailable".to_string(),
        });

        let err = coordinator.create(&draft("10")).await.unwrap_err();

        assert!(matches!(err, LedgerError::Remote(RemoteError::Status { status: 503, .. })));
        assert_eq!(coordinator.transactions().await, before);
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Update
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found_locally() {
        let coordinator = loaded(Vec::new()).await;

        let err = coordinator
            .update(TransactionId::new(99), amount_patch("1"))
            .await
            .unwrap_err();

        assert_eq!(err, LedgerError::NotFound(TransactionId::new(99)));
        assert_eq!(coordinator.remote().mutation_count(), 0);
    }

    #[tokio::test]
    async fn test_update_sends_only_changed_fields() {
        let coordinator = loaded(vec![row(1, "100", Direction::Inflow, Category::Other)]).await;
        let patch = TransactionPatch {
            name: Some(Some("row 1".to_string())),
            category: Some(Category::Other),
            amount: Some(Amount::parse("80").unwrap()),
            ..Default::default()
        };

        let updated = coordinator.update(TransactionId::new(1), patch).await.unwrap();

        assert_eq!(updated.amount, Amount::parse("80").unwrap());
        assert_eq!(
            coordinator.remote().calls().last(),
            Some(&Call::Update(TransactionId::new(1), amount_patch("80")))
        );
        assert_eq!(coordinator.view().balance(), Decimal::from(80));
    }

    #[tokio::test]
    async fn test_update_without_changes_skips_remote() {
        let original = row(1, "100", Direction::Inflow, Category::Other);
        let coordinator = loaded(vec![original.clone()]).await;

        let unchanged = coordinator
            .update(TransactionId::new(1), amount_patch("100"))
            .await
            .unwrap();
        let empty = coordinator
            .update(TransactionId::new(1), TransactionPatch::default())
            .await
            .unwrap();

        assert_eq!(unchanged, original);
        assert_eq!(empty, original);
        assert_eq!(coordinator.remote().mutation_count(), 0);
    }

    #[tokio::test]
    async fn test_update_blank_reason_clears_column() {
        let mut original = row(1, "100", Direction::Inflow, Category::Other);
        original.reason = Some("sueldo".to_string());
        let coordinator = loaded(vec![original]).await;

        let updated = coordinator
            .update(
                TransactionId::new(1),
                TransactionPatch {
                    reason: Some(Some("  ".to_string())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.reason, None);
        assert_eq!(coordinator.remote().rows()[0].reason, None);
    }

    #[tokio::test]
    async fn test_update_date_is_cached_as_stored() {
        let coordinator = loaded(vec![row(1, "100", Direction::Inflow, Category::Other)]).await;
        let midnight = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
        let patch = TransactionPatch {
            date: Some(midnight + Duration::nanoseconds(123_456_789)),
            ..Default::default()
        };

        let updated = coordinator.update(TransactionId::new(1), patch).await.unwrap();

        assert_eq!(updated.date, midnight + Duration::milliseconds(123));
        let before = coordinator.transactions().await;
        assert_eq!(before, coordinator.remote().rows());
        coordinator.load().await.unwrap();
        assert_eq!(coordinator.transactions().await, before);
    }

    #[tokio::test]
    async fn test_update_failure_leaves_cache_identical() {
        let coordinator = loaded(vec![row(1, "100", Direction::Inflow, Category::Other)]).await;
        let before = coordinator.view();
        coordinator
            .remote()
            .fail_next(RemoteError::Transport("reset".to_string()));

        let err = coordinator
            .update(TransactionId::new(1), amount_patch("1"))
            .await
            .unwrap_err();

        assert!(matches!(err, LedgerError::Remote(_)));
        assert_eq!(*coordinator.view(), *before);
        assert!(!coordinator.is_in_flight(TransactionId::new(1)));

        // The failed attempt released its claim.
        coordinator
            .update(TransactionId::new(1), amount_patch("1"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_second_update_on_same_id_conflicts() {
        let coordinator = loaded(vec![row(1, "100", Direction::Inflow, Category::Other)]).await;
        let gate = coordinator.remote().hold_mutations();
        let id = TransactionId::new(1);

        let (first, second) = tokio::join!(coordinator.update(id, amount_patch("10")), async {
            gate.entered.notified().await;
            assert!(coordinator.is_in_flight(id));
            let second = coordinator.update(id, amount_patch("20")).await;
            gate.release.notify_one();
            second
        });

        assert_eq!(first.unwrap().amount, Amount::parse("10").unwrap());
        assert_eq!(second.unwrap_err(), LedgerError::Conflict(id));
        assert_eq!(coordinator.remote().mutation_count(), 1);
        assert!(!coordinator.is_in_flight(id));
    }

    #[tokio::test]
    async fn test_delete_during_update_conflicts() {
        let coordinator = loaded(vec![row(1, "100", Direction::Inflow, Category::Other)]).await;
        let gate = coordinator.remote().hold_mutations();
        let id = TransactionId::new(1);

        let (update, delete) = tokio::join!(coordinator.update(id, amount_patch("10")), async {
            gate.entered.notified().await;
            let delete = coordinator.delete(id).await;
            gate.release.notify_one();
            delete
        });

        assert!(update.is_ok());
        assert_eq!(delete.unwrap_err(), LedgerError::Conflict(id));
        assert_eq!(coordinator.transactions().await.len(), 1);
    }

    #[tokio::test]
    async fn test_mutations_on_different_ids_proceed() {
        let coordinator = loaded(vec![
            row(1, "100", Direction::Inflow, Category::Other),
            row(2, "40", Direction::Outflow, Category::Other),
        ])
        .await;

        let (a, b) = tokio::join!(
            coordinator.update(TransactionId::new(1), amount_patch("110")),
            coordinator.delete(TransactionId::new(2)),
        );

        a.unwrap();
        b.unwrap();
        assert_eq!(coordinator.view().balance(), Decimal::from(110));
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Delete
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_delete_removes_row() {
        let coordinator = loaded(vec![
            row(1, "100", Direction::Inflow, Category::Other),
            row(2, "40", Direction::Outflow, Category::Other),
        ])
        .await;
        assert_eq!(coordinator.view().balance(), Decimal::from(60));

        coordinator.delete(TransactionId::new(2)).await.unwrap();

        assert_eq!(coordinator.view().balance(), Decimal::from(100));
        assert_eq!(coordinator.get(TransactionId::new(2)).await, None);
    }

    #[tokio::test]
    async fn test_delete_of_uncached_id_still_reaches_remote() {
        let coordinator = loaded(Vec::new()).await;

        let err = coordinator.delete(TransactionId::new(7)).await.unwrap_err();

        assert_eq!(err, LedgerError::Remote(RemoteError::NotFound));
        assert_eq!(
            coordinator.remote().calls().last(),
            Some(&Call::Delete(TransactionId::new(7)))
        );
    }

    #[tokio::test]
    async fn test_delete_of_uncached_id_leaves_cache_alone() {
        let mut foreign = row(5, "30", Direction::Outflow, Category::Other);
        foreign.owner_id = OwnerId::new("someone-else");
        let coordinator = loaded(vec![
            row(1, "100", Direction::Inflow, Category::Other),
            foreign,
        ])
        .await;
        let before = coordinator.transactions().await;
        let rx = coordinator.subscribe();

        coordinator.delete(TransactionId::new(5)).await.unwrap();

        assert_eq!(
            coordinator.remote().calls().last(),
            Some(&Call::Delete(TransactionId::new(5)))
        );
        assert_eq!(coordinator.transactions().await, before);
        assert!(!rx.has_changed().unwrap());
        assert_eq!(coordinator.view().balance(), Decimal::from(100));
    }

    #[tokio::test]
    async fn test_delete_failure_keeps_row() {
        let coordinator = loaded(vec![row(1, "100", Direction::Inflow, Category::Other)]).await;
        coordinator
            .remote()
            .fail_next(RemoteError::Transport("timeout".to_string()));

        assert!(coordinator.delete(TransactionId::new(1)).await.is_err());
        assert_eq!(coordinator.transactions().await.len(), 1);
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Teardown
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_teardown_discards_late_result() {
        let coordinator = loaded(vec![row(1, "100", Direction::Inflow, Category::Other)]).await;
        let gate = coordinator.remote().hold_mutations();

        let (result, ()) = tokio::join!(
            coordinator.update(TransactionId::new(1), amount_patch("5")),
            async {
                gate.entered.notified().await;
                coordinator.teardown().await;
                gate.release.notify_one();
            }
        );

        assert_eq!(result.unwrap_err(), LedgerError::SessionClosed);
        assert!(coordinator.transactions().await.is_empty());
        assert!(coordinator.view().is_empty());
        assert!(coordinator.is_closed());
    }

    #[tokio::test]
    async fn test_closed_session_rejects_new_work() {
        let coordinator = loaded(Vec::new()).await;
        coordinator.teardown().await;
        let calls_before = coordinator.remote().calls().len();

        assert_eq!(coordinator.load().await.unwrap_err(), LedgerError::SessionClosed);
        assert_eq!(
            coordinator.create(&draft("1")).await.unwrap_err(),
            LedgerError::SessionClosed
        );
        assert_eq!(
            coordinator.delete(TransactionId::new(1)).await.unwrap_err(),
            LedgerError::SessionClosed
        );
        assert_eq!(coordinator.remote().calls().len(), calls_before);
    }
}
