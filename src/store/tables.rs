//! In-memory tables, their secondary indexes, and the undo journal.
//!
//! Every write goes through a method that records the row's prior state in
//! the journal. [`PayrollData::rollback`] replays the journal backwards, so a
//! failed transaction costs only the rows it touched.

use std::collections::HashMap;
use std::hash::Hash;

use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    Advance, AdvancePaymentInstallment, AttendanceRecord, AttendanceStatus, Employee, PayPeriod,
    Referral, Salary,
};

/// Calendar month as `(year, month)`.
type MonthKey = (i32, u32);

fn month_key(date: NaiveDate) -> MonthKey {
    (date.year(), date.month())
}

fn period_key(period: PayPeriod) -> MonthKey {
    (period.year(), period.month())
}

fn index_add<K: Eq + Hash>(index: &mut HashMap<K, Vec<Uuid>>, key: K, id: Uuid) {
    index.entry(key).or_default().push(id);
}

fn index_remove<K: Eq + Hash>(index: &mut HashMap<K, Vec<Uuid>>, key: &K, id: Uuid) {
    if let Some(ids) = index.get_mut(key) {
        ids.retain(|i| *i != id);
        if ids.is_empty() {
            index.remove(key);
        }
    }
}

/// Prior state of one row. `None` means the row did not exist.
#[derive(Debug)]
enum Undo {
    Employee(String, Option<Employee>),
    Salary(Uuid, Option<Salary>),
    Attendance(Uuid, Option<AttendanceRecord>),
    Advance(Uuid, Option<Advance>),
    Installment(Uuid, Option<AdvancePaymentInstallment>),
    Referral(Uuid, Option<Referral>),
}

/// All payroll tables.
///
/// Tables are private so the secondary indexes and the journal stay in step
/// with the rows. Rows handed out by the `*_mut` accessors must keep the
/// fields their indexes are keyed on.
#[derive(Debug, Default)]
pub struct PayrollData {
    employees: HashMap<String, Employee>,
    salaries: HashMap<Uuid, Salary>,
    attendance: HashMap<Uuid, AttendanceRecord>,
    advances: HashMap<Uuid, Advance>,
    installments: HashMap<Uuid, AdvancePaymentInstallment>,
    referrals: HashMap<Uuid, Referral>,
    salary_index: HashMap<(String, PayPeriod), Uuid>,
    attendance_by_month: HashMap<MonthKey, HashMap<String, Vec<Uuid>>>,
    advances_by_employee: HashMap<String, Vec<Uuid>>,
    installments_by_salary: HashMap<Uuid, Vec<Uuid>>,
    referrals_by_referrer: HashMap<String, Vec<Uuid>>,
    journal: Vec<Undo>,
}

impl PayrollData {
    /// Forgets the journal, keeping every write since the last commit.
    pub(super) fn commit(&mut self) {
        self.journal.clear();
    }

    /// Restores every row written since the last commit.
    pub(super) fn rollback(&mut self) {
        while let Some(undo) = self.journal.pop() {
            match undo {
                Undo::Employee(id, row) => {
                    self.put_employee(&id, row);
                }
                Undo::Salary(id, row) => {
                    self.put_salary(id, row);
                }
                Undo::Attendance(id, row) => {
                    self.put_attendance(id, row);
                }
                Undo::Advance(id, row) => {
                    self.put_advance(id, row);
                }
                Undo::Installment(id, row) => {
                    self.put_installment(id, row);
                }
                Undo::Referral(id, row) => {
                    self.put_referral(id, row);
                }
            }
        }
    }

    // Row replacement without journaling. Each returns the previous row.

    fn put_employee(&mut self, id: &str, row: Option<Employee>) -> Option<Employee> {
        match row {
            Some(employee) => self.employees.insert(id.to_string(), employee),
            None => self.employees.remove(id),
        }
    }

    fn put_salary(&mut self, id: Uuid, row: Option<Salary>) -> Option<Salary> {
        let previous = self.salaries.remove(&id);
        if let Some(old) = &previous {
            self.salary_index.remove(&(old.employee_id.clone(), old.period));
        }
        if let Some(salary) = row {
            self.salary_index.insert((salary.employee_id.clone(), salary.period), id);
            self.salaries.insert(id, salary);
        }
        previous
    }

    fn put_attendance(
        &mut self,
        id: Uuid,
        row: Option<AttendanceRecord>,
    ) -> Option<AttendanceRecord> {
        let previous = self.attendance.remove(&id);
        if let Some(old) = &previous {
            let key = month_key(old.date);
            if let Some(by_employee) = self.attendance_by_month.get_mut(&key) {
                index_remove(by_employee, &old.employee_id, id);
                if by_employee.is_empty() {
                    self.attendance_by_month.remove(&key);
                }
            }
        }
        if let Some(record) = row {
            let by_employee = self
                .attendance_by_month
                .entry(month_key(record.date))
                .or_default();
            index_add(by_employee, record.employee_id.clone(), id);
            self.attendance.insert(id, record);
        }
        previous
    }

    fn put_advance(&mut self, id: Uuid, row: Option<Advance>) -> Option<Advance> {
        let previous = self.advances.remove(&id);
        if let Some(old) = &previous {
            index_remove(&mut self.advances_by_employee, &old.employee_id, id);
        }
        if let Some(advance) = row {
            index_add(&mut self.advances_by_employee, advance.employee_id.clone(), id);
            self.advances.insert(id, advance);
        }
        previous
    }

    fn put_installment(
        &mut self,
        id: Uuid,
        row: Option<AdvancePaymentInstallment>,
    ) -> Option<AdvancePaymentInstallment> {
        let previous = self.installments.remove(&id);
        if let Some(old) = &previous {
            index_remove(&mut self.installments_by_salary, &old.salary_id, id);
        }
        if let Some(installment) = row {
            index_add(&mut self.installments_by_salary, installment.salary_id, id);
            self.installments.insert(id, installment);
        }
        previous
    }

    fn put_referral(&mut self, id: Uuid, row: Option<Referral>) -> Option<Referral> {
        let previous = self.referrals.remove(&id);
        if let Some(old) = &previous {
            index_remove(&mut self.referrals_by_referrer, &old.referrer_id, id);
        }
        if let Some(referral) = row {
            index_add(&mut self.referrals_by_referrer, referral.referrer_id.clone(), id);
            self.referrals.insert(id, referral);
        }
        previous
    }

    /// Looks up an employee.
    pub fn employee(&self, id: &str) -> EngineResult<&Employee> {
        self.employees
            .get(id)
            .ok_or_else(|| EngineError::not_found("employee", id))
    }

    /// Looks up an employee for update.
    pub fn employee_mut(&mut self, id: &str) -> EngineResult<&mut Employee> {
        let previous = self.employee(id)?.clone();
        self.journal.push(Undo::Employee(id.to_string(), Some(previous)));
        self.employees
            .get_mut(id)
            .ok_or_else(|| EngineError::not_found("employee", id))
    }

    /// All employees, in no particular order.
    pub fn employees(&self) -> impl Iterator<Item = &Employee> {
        self.employees.values()
    }

    /// Adds an employee, refusing an id that is already registered.
    pub fn insert_employee(&mut self, employee: Employee) -> EngineResult<()> {
        if self.employees.contains_key(&employee.id) {
            return Err(EngineError::conflict(format!(
                "employee {} already exists",
                employee.id
            )));
        }
        let id = employee.id.clone();
        let previous = self.put_employee(&id, Some(employee));
        self.journal.push(Undo::Employee(id, previous));
        Ok(())
    }

    /// Looks up a salary.
    pub fn salary(&self, id: Uuid) -> EngineResult<&Salary> {
        self.salaries
            .get(&id)
            .ok_or_else(|| EngineError::not_found("salary", id))
    }

    /// Looks up a salary for update.
    ///
    /// The employee and period of a stored salary are part of the uniqueness
    /// key and must not be changed through this reference.
    pub fn salary_mut(&mut self, id: Uuid) -> EngineResult<&mut Salary> {
        let previous = self.salary(id)?.clone();
        self.journal.push(Undo::Salary(id, Some(previous)));
        self.salaries
            .get_mut(&id)
            .ok_or_else(|| EngineError::not_found("salary", id))
    }

    /// Returns the salary for an employee and month, if one exists.
    pub fn salary_for(&self, employee_id: &str, period: PayPeriod) -> Option<&Salary> {
        self.salary_index
            .get(&(employee_id.to_string(), period))
            .and_then(|id| self.salaries.get(id))
    }

    /// Inserts a salary, enforcing one row per employee and month.
    pub fn insert_salary(&mut self, salary: Salary) -> EngineResult<Uuid> {
        let key = (salary.employee_id.clone(), salary.period);
        if self.salary_index.contains_key(&key) {
            return Err(EngineError::Duplicate {
                employee_id: salary.employee_id,
                period: salary.period,
            });
        }
        let id = salary.id;
        let previous = self.put_salary(id, Some(salary));
        self.journal.push(Undo::Salary(id, previous));
        Ok(id)
    }

    /// Removes a salary and its index entry.
    pub fn remove_salary(&mut self, id: Uuid) -> EngineResult<Salary> {
        let salary = self
            .put_salary(id, None)
            .ok_or_else(|| EngineError::not_found("salary", id))?;
        self.journal.push(Undo::Salary(id, Some(salary.clone())));
        Ok(salary)
    }

    /// Number of stored salaries.
    pub fn salary_count(&self) -> usize {
        self.salaries.len()
    }

    /// Looks up an attendance record.
    pub fn attendance_record(&self, id: Uuid) -> EngineResult<&AttendanceRecord> {
        self.attendance
            .get(&id)
            .ok_or_else(|| EngineError::not_found("attendance", id))
    }

    /// Inserts or replaces an attendance record.
    pub fn save_attendance(&mut self, record: AttendanceRecord) {
        let id = record.id;
        let previous = self.put_attendance(id, Some(record));
        self.journal.push(Undo::Attendance(id, previous));
    }

    /// Number of stored attendance records.
    pub fn attendance_count(&self) -> usize {
        self.attendance.len()
    }

    fn attendance_ids(&self, employee_id: &str, key: MonthKey) -> &[Uuid] {
        self.attendance_by_month
            .get(&key)
            .and_then(|by_employee| by_employee.get(employee_id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All attendance of one employee within a month, ordered by date.
    pub fn attendance_for(&self, employee_id: &str, period: PayPeriod) -> Vec<AttendanceRecord> {
        let mut records: Vec<AttendanceRecord> = self
            .attendance_ids(employee_id, period_key(period))
            .iter()
            .filter_map(|id| self.attendance.get(id))
            .cloned()
            .collect();
        records.sort_by_key(|r| (r.date, r.id));
        records
    }

    /// The employee's attendance records on one day.
    pub fn attendance_on(&self, employee_id: &str, date: NaiveDate) -> Vec<&AttendanceRecord> {
        self.attendance_ids(employee_id, month_key(date))
            .iter()
            .filter_map(|id| self.attendance.get(id))
            .filter(|r| r.date == date)
            .collect()
    }

    /// Groups of attendance records sharing an employee and day within a month.
    ///
    /// Rejected records never conflict, so rejecting all but one record of a
    /// group resolves it.
    pub fn attendance_conflicts(
        &self,
        period: PayPeriod,
        employee_id: Option<&str>,
    ) -> Vec<Vec<AttendanceRecord>> {
        let Some(by_employee) = self.attendance_by_month.get(&period_key(period)) else {
            return Vec::new();
        };
        let scoped: Vec<&Vec<Uuid>> = match employee_id {
            Some(id) => by_employee.get(id).into_iter().collect(),
            None => by_employee.values().collect(),
        };

        let mut conflicts: Vec<Vec<AttendanceRecord>> = Vec::new();
        for ids in scoped {
            let mut days: HashMap<NaiveDate, Vec<&AttendanceRecord>> = HashMap::new();
            for record in ids
                .iter()
                .filter_map(|id| self.attendance.get(id))
                .filter(|r| r.status != AttendanceStatus::Rejected)
            {
                days.entry(record.date).or_default().push(record);
            }
            conflicts.extend(
                days.into_values()
                    .filter(|group| group.len() > 1)
                    .map(|group| group.into_iter().cloned().collect()),
            );
        }
        for group in &mut conflicts {
            group.sort_by_key(|r| r.id);
        }
        conflicts.sort_by(|a, b| {
            (&a[0].employee_id, a[0].date).cmp(&(&b[0].employee_id, b[0].date))
        });
        conflicts
    }

    /// Looks up an advance.
    pub fn advance(&self, id: Uuid) -> EngineResult<&Advance> {
        self.advances
            .get(&id)
            .ok_or_else(|| EngineError::not_found("advance", id))
    }

    /// Looks up an advance for update.
    pub fn advance_mut(&mut self, id: Uuid) -> EngineResult<&mut Advance> {
        let previous = self.advance(id)?.clone();
        self.journal.push(Undo::Advance(id, Some(previous)));
        self.advances
            .get_mut(&id)
            .ok_or_else(|| EngineError::not_found("advance", id))
    }

    /// Inserts or replaces an advance.
    pub fn save_advance(&mut self, advance: Advance) {
        let id = advance.id;
        let previous = self.put_advance(id, Some(advance));
        self.journal.push(Undo::Advance(id, previous));
    }

    /// Number of stored advances.
    pub fn advance_count(&self) -> usize {
        self.advances.len()
    }

    /// Approved advances of an employee that can still be drawn against.
    pub fn open_advances_for(&self, employee_id: &str) -> Vec<Advance> {
        let mut advances: Vec<Advance> = self
            .advances_by_employee
            .get(employee_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.advances.get(id))
            .filter(|a| a.accepts_installments())
            .cloned()
            .collect();
        advances.sort_by_key(|a| a.id);
        advances
    }

    /// Looks up an installment.
    pub fn installment(&self, id: Uuid) -> EngineResult<&AdvancePaymentInstallment> {
        self.installments
            .get(&id)
            .ok_or_else(|| EngineError::not_found("installment", id))
    }

    /// Inserts or replaces an installment, moving it between salaries if
    /// its `salary_id` changed.
    pub fn save_installment(&mut self, installment: AdvancePaymentInstallment) {
        let id = installment.id;
        let previous = self.put_installment(id, Some(installment));
        self.journal.push(Undo::Installment(id, previous));
    }

    /// Removes an installment.
    pub fn remove_installment(&mut self, id: Uuid) -> EngineResult<AdvancePaymentInstallment> {
        let installment = self
            .put_installment(id, None)
            .ok_or_else(|| EngineError::not_found("installment", id))?;
        self.journal.push(Undo::Installment(id, Some(installment.clone())));
        Ok(installment)
    }

    /// Number of stored installments.
    pub fn installment_count(&self) -> usize {
        self.installments.len()
    }

    /// Installments linked to a salary.
    pub fn installments_for_salary(&self, salary_id: Uuid) -> Vec<AdvancePaymentInstallment> {
        let mut installments: Vec<AdvancePaymentInstallment> = self
            .installments_by_salary
            .get(&salary_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.installments.get(id))
            .cloned()
            .collect();
        installments.sort_by_key(|i| (i.advance_id, i.id));
        installments
    }

    /// Inserts or replaces a referral.
    pub fn save_referral(&mut self, referral: Referral) {
        let id = referral.id;
        let previous = self.put_referral(id, Some(referral));
        self.journal.push(Undo::Referral(id, previous));
    }

    /// All referrals, in no particular order.
    pub fn referrals(&self) -> impl Iterator<Item = &Referral> {
        self.referrals.values()
    }

    /// Referrals made by one employee.
    pub fn referrals_by(&self, referrer_id: &str) -> impl Iterator<Item = &Referral> {
        self.referrals_by_referrer
            .get(referrer_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.referrals.get(id))
    }
}
