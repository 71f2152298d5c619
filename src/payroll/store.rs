//! Persistence seam for pay periods.
//!
//! The engine does not own storage. It issues two requests to the
//! persistence collaborator: upsert a period by its `(user, range)` key, and
//! transition a period to `PAID`. The paid transition must be an atomic
//! conditional write so two concurrent confirmations cannot both succeed.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::models::{PayPeriod, PayPeriodKey};

/// Storage contract for pay periods.
pub trait PayPeriodStore: Send + Sync {
    /// Loads the period stored under `key`.
    fn get(&self, key: &PayPeriodKey) -> EngineResult<Option<PayPeriod>>;

    /// Inserts or replaces the period under its key.
    ///
    /// Must fail with [`EngineError::PeriodLocked`] when the stored period is
    /// already paid.
    fn upsert(&self, period: PayPeriod) -> EngineResult<PayPeriod>;

    /// Atomically moves the stored period to `PAID`, stamping `paid_at`.
    ///
    /// Compare-and-set on `status != PAID`: exactly one of several
    /// concurrent callers succeeds, the rest get
    /// [`EngineError::PeriodLocked`].
    fn mark_paid(&self, key: &PayPeriodKey, paid_at: DateTime<Utc>) -> EngineResult<PayPeriod>;
}

/// A process-local store backed by a mutex-guarded map.
///
/// # Example
///
/// ```
/// use workshop_engine::models::{PayPeriod, PayPeriodStatus, TimeRange};
/// use workshop_engine::payroll::{InMemoryPayPeriodStore, PayPeriodStore};
/// use chrono::Utc;
/// use rust_decimal::Decimal;
///
/// let store = InMemoryPayPeriodStore::new();
/// let mut period = PayPeriod::open("w1", TimeRange::parse("2024-03-06", "2024-03-20").unwrap(), Decimal::from(1000));
/// period.status = PayPeriodStatus::Calculated;
/// let key = period.key();
/// store.upsert(period).unwrap();
///
/// assert!(store.mark_paid(&key, Utc::now()).is_ok());
/// assert!(store.mark_paid(&key, Utc::now()).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryPayPeriodStore {
    inner: Arc<Mutex<HashMap<PayPeriodKey, PayPeriod>>>,
}

impl InMemoryPayPeriodStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored periods.
    pub fn len(&self) -> EngineResult<usize> {
        Ok(self.lock()?.len())
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> EngineResult<bool> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> EngineResult<MutexGuard<'_, HashMap<PayPeriodKey, PayPeriod>>> {
        self.inner.lock().map_err(|e| EngineError::Storage {
            message: format!("pay period store lock poisoned: {}", e),
        })
    }
}

impl PayPeriodStore for InMemoryPayPeriodStore {
    fn get(&self, key: &PayPeriodKey) -> EngineResult<Option<PayPeriod>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn upsert(&self, period: PayPeriod) -> EngineResult<PayPeriod> {
        let key = period.key();
        let mut inner = self.lock()?;
        if inner.get(&key).is_some_and(PayPeriod::is_locked) {
            return Err(key.locked_error());
        }
        inner.insert(key, period.clone());
        Ok(period)
    }

    fn mark_paid(&self, key: &PayPeriodKey, paid_at: DateTime<Utc>) -> EngineResult<PayPeriod> {
        let mut inner = self.lock()?;
        let period = inner.get_mut(key).ok_or_else(|| EngineError::PeriodNotFound {
            user_id: key.user_id.clone(),
            start: key.start,
            end: key.end,
        })?;
        period.mark_paid(paid_at)?;
        info!(
            user_id = %key.user_id,
            start = %key.start,
            end = %key.end,
            "Pay period marked as paid"
        );
        Ok(period.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PayPeriodStatus, TimeRange};
    use rust_decimal::Decimal;
    use std::thread;

    fn calculated_period(user_id: &str) -> PayPeriod {
        let mut period = PayPeriod::open(
            user_id,
            TimeRange::parse("2024-03-06", "2024-03-20").unwrap(),
            Decimal::from(50000),
        );
        period.status = PayPeriodStatus::Calculated;
        period
    }

    #[test]
    fn test_upsert_is_keyed_by_user_and_range() {
        let store = InMemoryPayPeriodStore::new();
        store.upsert(calculated_period("w1")).unwrap();
        let mut replacement = calculated_period("w1");
        replacement.base_salary = Decimal::from(60000);
        store.upsert(replacement).unwrap();
        store.upsert(calculated_period("w2")).unwrap();

        assert_eq!(store.len().unwrap(), 2);
        let stored = store.get(&calculated_period("w1").key()).unwrap().unwrap();
        assert_eq!(stored.base_salary, Decimal::from(60000));
    }

    #[test]
    fn test_upsert_over_paid_period_is_locked() {
        let store = InMemoryPayPeriodStore::new();
        let period = calculated_period("w1");
        let key = period.key();
        store.upsert(period.clone()).unwrap();
        store.mark_paid(&key, Utc::now()).unwrap();

        assert!(matches!(
            store.upsert(period),
            Err(EngineError::PeriodLocked { .. })
        ));
        assert_eq!(store.get(&key).unwrap().unwrap().status, PayPeriodStatus::Paid);
    }

    #[test]
    fn test_mark_paid_unknown_period() {
        let store = InMemoryPayPeriodStore::new();
        let key = calculated_period("ghost").key();
        assert!(matches!(
            store.mark_paid(&key, Utc::now()),
            Err(EngineError::PeriodNotFound { .. })
        ));
    }

    #[test]
    fn test_mark_paid_open_period_is_rejected() {
        let store = InMemoryPayPeriodStore::new();
        let mut period = calculated_period("w1");
        period.status = PayPeriodStatus::Open;
        let key = period.key();
        store.upsert(period).unwrap();
        assert!(matches!(
            store.mark_paid(&key, Utc::now()),
            Err(EngineError::InvalidStatusTransition { .. })
        ));
    }

    #[test]
    fn test_concurrent_mark_paid_succeeds_exactly_once() {
        let store = InMemoryPayPeriodStore::new();
        let period = calculated_period("w1");
        let key = period.key();
        store.upsert(period).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                let key = key.clone();
                thread::spawn(move || store.mark_paid(&key, Utc::now()).is_ok())
            })
            .collect();
        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(successes, 1);
    }
}
