// Loan Ledger - append-only loan history for the session
//
// A loan is opened once and returned once. Guest name and room are copied
// into the record at registration, so roster re-imports never touch history.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::error::{require_non_blank, RentalError, Result};

/// Session-scoped loan number, starting at 1
pub type LoanId = u64;

// ============================================================================
// LOAN STATUS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    /// Issued, item still with the guest
    Open,

    /// Item back at the desk (terminal)
    Returned,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Open => "Open",
            LoanStatus::Returned => "Returned",
        }
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How many Open loans one guest may hold at once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpenLoanPolicy {
    #[default]
    Unlimited,

    /// Same guest name + room may hold a single Open loan
    OnePerGuest,
}

// ============================================================================
// LOAN RECORD
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanRecord {
    pub id: LoanId,

    // Guest snapshot at registration time
    pub guest_name: String,
    pub room: String,

    pub item: String,
    /// Free-form, not checked against any inventory
    pub serial_number: String,
    pub issuing_staff: String,
    pub loan_date: NaiveDate,

    pub status: LoanStatus,
    pub returning_staff: Option<String>,
    pub return_date: Option<NaiveDate>,
}

impl LoanRecord {
    pub fn is_open(&self) -> bool {
        self.status == LoanStatus::Open
    }

    fn belongs_to(&self, guest_name: &str, room: &str) -> bool {
        self.guest_name == guest_name && self.room == room
    }
}

// ============================================================================
// LOAN LEDGER
// ============================================================================

#[derive(Debug)]
struct LedgerState {
    records: Vec<LoanRecord>,
    next_id: LoanId,
}

impl Default for LedgerState {
    fn default() -> Self {
        LedgerState {
            records: Vec::new(),
            next_id: 1,
        }
    }
}

/// Owner of every loan record
///
/// Callers only ever get clones; changes go through `register` and
/// `mark_returned`, each of which runs under a single write lock.
pub struct LoanLedger {
    state: RwLock<LedgerState>,
    policy: OpenLoanPolicy,
    clock: Arc<dyn Clock>,
}

impl LoanLedger {
    pub fn new() -> Self {
        Self::with_clock(OpenLoanPolicy::default(), Arc::new(SystemClock))
    }

    pub fn with_clock(policy: OpenLoanPolicy, clock: Arc<dyn Clock>) -> Self {
        LoanLedger {
            state: RwLock::new(LedgerState::default()),
            policy,
            clock,
        }
    }

    /// Open a new loan dated today
    ///
    /// Guest name, item, serial number and staff are required; room may be
    /// blank because rosters may lack it.
    pub fn register(
        &self,
        guest_name: &str,
        room: &str,
        item: &str,
        serial_number: &str,
        staff: &str,
    ) -> Result<LoanRecord> {
        let guest_name = require_non_blank("guest_name", guest_name)?;
        let item = require_non_blank("item", item)?;
        let serial_number = require_non_blank("serial_number", serial_number)?;
        let staff = require_non_blank("issuing_staff", staff)?;
        let room = room.trim();

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        if self.policy == OpenLoanPolicy::OnePerGuest {
            if let Some(open) = state
                .records
                .iter()
                .find(|loan| loan.is_open() && loan.belongs_to(guest_name, room))
            {
                return Err(RentalError::InvalidState {
                    loan_id: open.id,
                    message: format!(
                        "{} (room {}) already holds an open loan",
                        guest_name, room
                    ),
                });
            }
        }

        let record = LoanRecord {
            id: state.next_id,
            guest_name: guest_name.to_string(),
            room: room.to_string(),
            item: item.to_string(),
            serial_number: serial_number.to_string(),
            issuing_staff: staff.to_string(),
            loan_date: self.clock.today(),
            status: LoanStatus::Open,
            returning_staff: None,
            return_date: None,
        };
        state.next_id += 1;
        state.records.push(record.clone());

        tracing::info!(
            loan_id = record.id,
            guest = %record.guest_name,
            room = %record.room,
            item = %record.item,
            serial = %record.serial_number,
            staff = %record.issuing_staff,
            "loan registered"
        );
        Ok(record)
    }

    /// Close an Open loan; the only mutation a record ever receives
    pub fn mark_returned(&self, loan_id: LoanId, returning_staff: &str) -> Result<LoanRecord> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        let record = state
            .records
            .iter_mut()
            .find(|loan| loan.id == loan_id)
            .ok_or(RentalError::NotFound { loan_id })?;

        let returning_staff = require_non_blank("returning_staff", returning_staff)?;

        if !record.is_open() {
            return Err(RentalError::InvalidState {
                loan_id,
                message: format!(
                    "already returned by {} on {}",
                    record.returning_staff.as_deref().unwrap_or("?"),
                    record
                        .return_date
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| "?".to_string())
                ),
            });
        }

        record.status = LoanStatus::Returned;
        record.returning_staff = Some(returning_staff.to_string());
        record.return_date = Some(self.clock.today());

        tracing::info!(
            loan_id,
            item = %record.item,
            staff = returning_staff,
            "loan returned"
        );
        Ok(record.clone())
    }

    /// All loans in registration order
    pub fn list(&self) -> Vec<LoanRecord> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .records
            .clone()
    }

    pub fn get(&self, loan_id: LoanId) -> Option<LoanRecord> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.records.iter().find(|loan| loan.id == loan_id).cloned()
    }

    pub fn open_loans(&self) -> Vec<LoanRecord> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.records.iter().filter(|loan| loan.is_open()).cloned().collect()
    }

    /// Every loan (open or returned) recorded for this name + room
    pub fn loans_for_guest(&self, guest_name: &str, room: &str) -> Vec<LoanRecord> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state
            .records
            .iter()
            .filter(|loan| loan.belongs_to(guest_name.trim(), room.trim()))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.state.read().unwrap_or_else(PoisonError::into_inner).records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for LoanLedger {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    fn create_test_ledger(policy: OpenLoanPolicy) -> LoanLedger {
        let day = NaiveDate::from_ymd_opt(2024, 12, 25).unwrap();
        LoanLedger::with_clock(policy, Arc::new(FixedClock(day)))
    }

    #[test]
    fn test_register_opens_loan() {
        let ledger = create_test_ledger(OpenLoanPolicy::Unlimited);

        let loan = ledger
            .register("MINSEO KIM", "204", "우산", "S123", "Kim")
            .unwrap();

        assert_eq!(loan.id, 1);
        assert_eq!(loan.status, LoanStatus::Open);
        assert_eq!(loan.loan_date.to_string(), "2024-12-25");
        assert!(loan.returning_staff.is_none());
        assert!(loan.return_date.is_none());
        assert_eq!(ledger.list(), vec![loan]);
    }

    #[test]
    fn test_register_rejects_blank_fields() {
        let ledger = create_test_ledger(OpenLoanPolicy::Unlimited);

        for (item, serial, staff) in [("", "S1", "Kim"), ("우산", " ", "Kim"), ("우산", "S1", "")] {
            let err = ledger
                .register("MINSEO KIM", "204", item, serial, staff)
                .unwrap_err();
            assert_eq!(err.kind(), "validation");
        }
        assert!(ledger.register("", "204", "우산", "S1", "Kim").is_err());

        assert!(ledger.is_empty());
    }

    #[test]
    fn test_failed_register_does_not_consume_id() {
        let ledger = create_test_ledger(OpenLoanPolicy::Unlimited);

        assert!(ledger.register("MINSEO KIM", "204", "", "S1", "Kim").is_err());
        let loan = ledger.register("MINSEO KIM", "204", "우산", "S1", "Kim").unwrap();

        assert_eq!(loan.id, 1);
    }

    #[test]
    fn test_mark_returned() {
        let ledger = create_test_ledger(OpenLoanPolicy::Unlimited);
        let loan = ledger.register("MINSEO KIM", "204", "우산", "S123", "Kim").unwrap();

        let returned = ledger.mark_returned(loan.id, "Park").unwrap();

        assert_eq!(returned.status, LoanStatus::Returned);
        assert_eq!(returned.returning_staff.as_deref(), Some("Park"));
        assert_eq!(returned.return_date.map(|d| d.to_string()).as_deref(), Some("2024-12-25"));
        assert_eq!(ledger.get(loan.id), Some(returned));
    }

    #[test]
    fn test_second_return_is_invalid_state() {
        let ledger = create_test_ledger(OpenLoanPolicy::Unlimited);
        let loan = ledger.register("MINSEO KIM", "204", "우산", "S123", "Kim").unwrap();
        let first = ledger.mark_returned(loan.id, "Park").unwrap();

        let err = ledger.mark_returned(loan.id, "Lee").unwrap_err();

        assert_eq!(err.kind(), "invalid_state");
        assert_eq!(ledger.get(loan.id), Some(first));
    }

    #[test]
    fn test_mark_returned_unknown_id() {
        let ledger = create_test_ledger(OpenLoanPolicy::Unlimited);

        let err = ledger.mark_returned(42, "Park").unwrap_err();

        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn test_mark_returned_requires_staff() {
        let ledger = create_test_ledger(OpenLoanPolicy::Unlimited);
        let loan = ledger.register("MINSEO KIM", "204", "우산", "S123", "Kim").unwrap();

        let err = ledger.mark_returned(loan.id, "  ").unwrap_err();

        assert_eq!(err.kind(), "validation");
        assert!(ledger.get(loan.id).unwrap().is_open());
    }

    #[test]
    fn test_same_guest_may_hold_several_open_loans() {
        let ledger = create_test_ledger(OpenLoanPolicy::Unlimited);

        ledger.register("MINSEO KIM", "204", "우산", "S1", "Kim").unwrap();
        ledger.register("MINSEO KIM", "204", "우산", "S1", "Kim").unwrap();

        assert_eq!(ledger.open_loans().len(), 2);
        assert_eq!(ledger.loans_for_guest("MINSEO KIM", "204").len(), 2);
    }

    #[test]
    fn test_one_per_guest_policy() {
        let ledger = create_test_ledger(OpenLoanPolicy::OnePerGuest);
        let first = ledger.register("MINSEO KIM", "204", "우산", "S1", "Kim").unwrap();

        let err = ledger
            .register("MINSEO KIM", "204", "충전기", "C7", "Kim")
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_state");

        // Another guest is unaffected
        ledger.register("Choi Mina", "310", "충전기", "C7", "Kim").unwrap();

        // Once returned, the guest may borrow again
        ledger.mark_returned(first.id, "Park").unwrap();
        ledger.register("MINSEO KIM", "204", "충전기", "C8", "Kim").unwrap();

        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn test_concurrent_returns_exactly_one_wins() {
        let ledger = Arc::new(create_test_ledger(OpenLoanPolicy::Unlimited));
        let loan = ledger.register("MINSEO KIM", "204", "우산", "S1", "Kim").unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let ledger = Arc::clone(&ledger);
                std::thread::spawn(move || ledger.mark_returned(loan.id, &format!("staff-{}", i)))
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let wins = results.iter().filter(|r| r.is_ok()).count();
        let invalid = results
            .iter()
            .filter(|r| matches!(r, Err(RentalError::InvalidState { .. })))
            .count();

        assert_eq!(wins, 1);
        assert_eq!(invalid, 7);
    }

    #[test]
    fn test_status_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&LoanStatus::Returned).unwrap(), "\"returned\"");
        assert_eq!(
            serde_json::to_string(&OpenLoanPolicy::OnePerGuest).unwrap(),
            "\"one_per_guest\""
        );
    }
}
