//! Payroll persistence collaborator.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{PayrollError, PayrollResult};
use crate::models::{PayPeriod, PaymentDetails, PayrollRecord, PayrollStatus, RecordKey};

/// A status change applied by [`PayrollStore::update`].
///
/// The update only succeeds if the stored status still equals
/// `expected_status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordPatch {
    /// The status the caller read.
    pub expected_status: PayrollStatus,
    /// The new status.
    pub status: PayrollStatus,
    /// Payment details to record, if any.
    pub payment: Option<PaymentDetails>,
}

/// Narrows a record query. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    /// Only records in this status.
    #[serde(default)]
    pub status: Option<PayrollStatus>,
    /// Only records for this country.
    #[serde(default)]
    pub country: Option<String>,
    /// Only records for this pay period.
    #[serde(default)]
    pub period: Option<PayPeriod>,
    /// Only records for this employee.
    #[serde(default)]
    pub employee_id: Option<String>,
}

impl RecordFilter {
    /// Returns true if `record` passes the filter.
    pub fn matches(&self, record: &PayrollRecord) -> bool {
        self.status.is_none_or(|s| record.status == s)
            && self.country.as_deref().is_none_or(|c| record.country == c)
            && self.period.is_none_or(|p| record.period == p)
            && self.employee_id.as_deref().is_none_or(|e| record.employee_id == e)
    }
}

/// Tenant-scoped storage for payroll records.
///
/// `insert` must enforce uniqueness of [`RecordKey`] atomically and
/// `update` must apply the status change as a compare-and-set.
#[async_trait]
pub trait PayrollStore: Send + Sync {
    /// Finds the record with this key.
    async fn find_by_key(&self, key: &RecordKey) -> PayrollResult<Option<PayrollRecord>>;

    /// Inserts a new record, failing with [`PayrollError::DuplicateRecord`]
    /// if one already exists for its key.
    async fn insert(&self, record: PayrollRecord) -> PayrollResult<PayrollRecord>;

    /// Fetches a record of the tenant.
    async fn get(&self, tenant_id: &str, id: Uuid) -> PayrollResult<Option<PayrollRecord>>;

    /// Applies a status change.
    ///
    /// Fails with [`PayrollError::RecordNotFound`] for an unknown record and
    /// [`PayrollError::InvalidTransition`] when the stored status no longer
    /// equals `patch.expected_status`.
    async fn update(
        &self,
        tenant_id: &str,
        id: Uuid,
        patch: RecordPatch,
    ) -> PayrollResult<PayrollRecord>;

    /// Returns the tenant's records matching `filter`, in no particular order.
    async fn query(
        &self,
        tenant_id: &str,
        filter: &RecordFilter,
    ) -> PayrollResult<Vec<PayrollRecord>>;
}

#[derive(Debug, Default)]
struct StoreState {
    records: HashMap<Uuid, PayrollRecord>,
    keys: HashMap<RecordKey, Uuid>,
}

/// A [`PayrollStore`] held in memory.
#[derive(Debug, Default)]
pub struct InMemoryPayrollStore {
    state: RwLock<StoreState>,
}

impl InMemoryPayrollStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records across all tenants.
    pub async fn len(&self) -> usize {
        self.state.read().await.records.len()
    }

    /// Returns true if no records are stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl PayrollStore for InMemoryPayrollStore {
    async fn find_by_key(&self, key: &RecordKey) -> PayrollResult<Option<PayrollRecord>> {
        let state = self.state.read().await;
        Ok(state
            .keys
            .get(key)
            .and_then(|id| state.records.get(id))
            .cloned())
    }

    async fn insert(&self, record: PayrollRecord) -> PayrollResult<PayrollRecord> {
        let mut state = self.state.write().await;
        let key = record.key();

        if state.keys.contains_key(&key) {
            return Err(PayrollError::DuplicateRecord {
                employee_id: key.employee_id,
                country: key.country,
                month: key.period.month,
                year: key.period.year,
            });
        }

        state.keys.insert(key, record.id);
        state.records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get(&self, tenant_id: &str, id: Uuid) -> PayrollResult<Option<PayrollRecord>> {
        Ok(self
            .state
            .read()
            .await
            .records
            .get(&id)
            .filter(|r| r.tenant_id == tenant_id)
            .cloned())
    }

    async fn update(
        &self,
        tenant_id: &str,
        id: Uuid,
        patch: RecordPatch,
    ) -> PayrollResult<PayrollRecord> {
        let mut state = self.state.write().await;
        let record = state
            .records
            .get_mut(&id)
            .filter(|r| r.tenant_id == tenant_id)
            .ok_or(PayrollError::RecordNotFound { record_id: id })?;

        if record.status != patch.expected_status {
            return Err(PayrollError::InvalidTransition {
                record_id: id,
                from: record.status,
                to: patch.status,
            });
        }

        record.status = patch.status;
        if patch.payment.is_some() {
            record.payment = patch.payment;
        }
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    async fn query(
        &self,
        tenant_id: &str,
        filter: &RecordFilter,
    ) -> PayrollResult<Vec<PayrollRecord>> {
        Ok(self
            .state
            .read()
            .await
            .records
            .values()
            .filter(|r| r.tenant_id == tenant_id && filter.matches(r))
            .cloned()
            .collect())
    }
}
