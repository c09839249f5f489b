//! Transactional in-memory persistence.
//!
//! [`PayrollStore`] runs each write as an all-or-nothing transaction directly
//! against [`PayrollData`] under the write lock. Writes are journaled, and the
//! journal is replayed backwards if the closure fails or panics, so a
//! transaction costs only the rows it touches. Writers are serialized by the
//! lock, so every read-modify-write sees committed data and the
//! `(employee_id, period)` salary index cannot be raced.

mod tables;

pub use tables::PayrollData;

use parking_lot::{RwLock, RwLockWriteGuard};

use crate::error::EngineResult;

/// Shared payroll state.
#[derive(Debug, Default)]
pub struct PayrollStore {
    data: RwLock<PayrollData>,
}

/// Write access that rolls back anything not committed when dropped.
struct Transaction<'a> {
    data: RwLockWriteGuard<'a, PayrollData>,
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        self.data.rollback();
    }
}

impl PayrollStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` against committed data without blocking other readers.
    pub fn read<T>(&self, f: impl FnOnce(&PayrollData) -> T) -> T {
        let data = self.data.read();
        f(&data)
    }

    /// Runs `f` as a transaction.
    ///
    /// Changes made by `f` are discarded if it returns an error.
    pub fn transaction<T>(
        &self,
        f: impl FnOnce(&mut PayrollData) -> EngineResult<T>,
    ) -> EngineResult<T> {
        let mut tx = Transaction {
            data: self.data.write(),
        };
        let value = f(&mut *tx.data)?;
        tx.data.commit();
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::models::{Employee, EmployeeStatus};
    use rust_decimal::Decimal;
    use std::sync::Arc;

    fn employee(id: &str) -> Employee {
        Employee {
            id: id.to_string(),
            name: "Test".to_string(),
            base_salary: Some(Decimal::new(30000, 0)),
            status: EmployeeStatus::Active,
        }
    }

    #[test]
    fn test_committed_transaction_is_visible() {
        let store = PayrollStore::new();
        store
            .transaction(|data| data.insert_employee(employee("emp_001")))
            .unwrap();
        assert!(store.read(|data| data.employee("emp_001").is_ok()));
    }

    #[test]
    fn test_failed_transaction_leaves_no_partial_state() {
        let store = PayrollStore::new();
        let result: EngineResult<()> = store.transaction(|data| {
            data.insert_employee(employee("emp_001"))?;
            Err(EngineError::conflict("abort"))
        });

        assert!(result.is_err());
        assert!(store.read(|data| data.employee("emp_001").is_err()));
    }

    #[test]
    fn test_failed_transaction_keeps_earlier_commits() {
        let store = PayrollStore::new();
        store
            .transaction(|data| data.insert_employee(employee("emp_001")))
            .unwrap();

        let result: EngineResult<()> = store.transaction(|data| {
            data.employee_mut("emp_001")?.status = EmployeeStatus::Inactive;
            data.insert_employee(employee("emp_002"))?;
            data.insert_employee(employee("emp_001"))
        });

        assert!(matches!(result, Err(EngineError::Conflict { .. })));
        store.read(|data| {
            assert_eq!(data.employee("emp_001").unwrap().status, EmployeeStatus::Active);
            assert!(data.employee("emp_002").is_err());
        });
    }

    #[test]
    fn test_panicking_transaction_is_rolled_back() {
        let store = PayrollStore::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _: EngineResult<()> = store.transaction(|data| {
                data.insert_employee(employee("emp_001"))?;
                panic!("writer crashed");
            });
        }));

        assert!(result.is_err());
        assert!(store.read(|data| data.employee("emp_001").is_err()));
        store
            .transaction(|data| data.insert_employee(employee("emp_001")))
            .unwrap();
    }

    #[test]
    fn test_concurrent_transactions_serialize() {
        let store = Arc::new(PayrollStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    store.transaction(|data| {
                        let id = format!("emp_{:03}", i);
                        data.insert_employee(employee(&id))
                    })
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }
        assert_eq!(store.read(|data| data.employees().count()), 8);
    }
}
