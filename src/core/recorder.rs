//! Daily attendance state machine.

use crate::db::attendance::{find_record, insert_record, update_record};
use crate::db::log::ttlog;
use crate::errors::AppResult;
use crate::models::attendance::{
    AttendanceAction, AttendanceRecord, STATUS_NO_CHECKIN, present_status,
};
use crate::models::identity::Identity;
use crate::notify::{LateNotice, LateNotifier};
use crate::utils::time::format_time;
use chrono::{NaiveDateTime, NaiveTime, Timelike};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use serde::Serialize;

/// What a recorded action did to the day's record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    CreatedCheckIn { time: NaiveTime, late: bool },
    /// Check-in filled into a record that so far only held a check-out.
    CheckInAdded { time: NaiveTime, late: bool },
    AlreadyCheckedIn { existing: NaiveTime },
    CheckoutRecorded { time: NaiveTime, replaced: Option<NaiveTime> },
    CheckoutWithoutCheckIn { time: NaiveTime },
}

impl Outcome {
    pub fn is_late(&self) -> bool {
        matches!(
            self,
            Outcome::CreatedCheckIn { late: true, .. } | Outcome::CheckInAdded { late: true, .. }
        )
    }

    /// User-facing line for this outcome.
    pub fn message(&self, name: &str) -> String {
        match self {
            Outcome::CreatedCheckIn { late, .. } | Outcome::CheckInAdded { late, .. } => {
                format!("Check-In marked for {name}{}", if *late { " (Late)" } else { "" })
            }
            Outcome::AlreadyCheckedIn { existing } => {
                format!("Already checked in at {}.", format_time(*existing))
            }
            Outcome::CheckoutRecorded { time, .. } => {
                format!("Check-Out updated for {name} at {}", format_time(*time))
            }
            Outcome::CheckoutWithoutCheckIn { time } => {
                format!("Check-Out recorded for {name} at {} (no check-in today)", format_time(*time))
            }
        }
    }

    fn audit_line(&self) -> String {
        match self {
            Outcome::CreatedCheckIn { time, late } | Outcome::CheckInAdded { time, late } => {
                format!("checkin {} late={late}", format_time(*time))
            }
            Outcome::AlreadyCheckedIn { existing } => {
                format!("checkin ignored, already in at {}", format_time(*existing))
            }
            Outcome::CheckoutRecorded { time, replaced: Some(prev) } => {
                format!("checkout {} (replaced {})", format_time(*time), format_time(*prev))
            }
            Outcome::CheckoutRecorded { time, replaced: None } => {
                format!("checkout {}", format_time(*time))
            }
            Outcome::CheckoutWithoutCheckIn { time } => {
                format!("checkout {} without checkin", format_time(*time))
            }
        }
    }
}

/// Pending store write for a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    Insert(AttendanceRecord),
    Update(AttendanceRecord),
}

/// Pure transition: current record + action at `time` → write and outcome.
pub fn transition(
    existing: Option<AttendanceRecord>,
    identity: &Identity,
    action: AttendanceAction,
    now: NaiveDateTime,
    cutoff: NaiveTime,
) -> (Option<Write>, Outcome) {
    let time = now.time();

    match (existing, action) {
        (None, AttendanceAction::CheckIn) => {
            let late = time > cutoff;
            let rec = AttendanceRecord {
                id: 0,
                identity_id: identity.id,
                date: now.date(),
                name: identity.name.clone(),
                email: identity.email.clone(),
                checkin: Some(time),
                checkout: None,
                late,
                status: present_status(late).to_string(),
            };
            (Some(Write::Insert(rec)), Outcome::CreatedCheckIn { time, late })
        }

        (None, AttendanceAction::CheckOut) => {
            let rec = AttendanceRecord {
                id: 0,
                identity_id: identity.id,
                date: now.date(),
                name: identity.name.clone(),
                email: identity.email.clone(),
                checkin: None,
                checkout: Some(time),
                late: false,
                status: STATUS_NO_CHECKIN.to_string(),
            };
            (Some(Write::Insert(rec)), Outcome::CheckoutWithoutCheckIn { time })
        }

        (Some(rec), AttendanceAction::CheckIn) => match rec.checkin {
            Some(existing) => (None, Outcome::AlreadyCheckedIn { existing }),
            None => {
                let late = time > cutoff;
                let rec = AttendanceRecord {
                    checkin: Some(time),
                    late,
                    status: present_status(late).to_string(),
                    ..rec
                };
                (Some(Write::Update(rec)), Outcome::CheckInAdded { time, late })
            }
        },

        // last write wins on a repeated checkout
        (Some(rec), AttendanceAction::CheckOut) => {
            let replaced = rec.checkout;
            let rec = AttendanceRecord {
                checkout: Some(time),
                ..rec
            };
            (Some(Write::Update(rec)), Outcome::CheckoutRecorded { time, replaced })
        }
    }
}

/// Applies actions to the (identity, date) record inside one write-locked transaction.
pub struct AttendanceRecorder<'a> {
    cutoff: NaiveTime,
    notifier: &'a dyn LateNotifier,
}

impl<'a> AttendanceRecorder<'a> {
    pub fn new(cutoff: NaiveTime, notifier: &'a dyn LateNotifier) -> Self {
        Self { cutoff, notifier }
    }

    /// `now` is civil date+time in the deployment timezone; sub-second
    /// precision is dropped so the stored time and the late flag agree.
    pub fn record(
        &self,
        conn: &Connection,
        identity: &Identity,
        action: AttendanceAction,
        now: NaiveDateTime,
    ) -> AppResult<Outcome> {
        let now = now.with_nanosecond(0).unwrap_or(now);

        let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
        let existing = find_record(&tx, identity.id, now.date())?;
        let (write, outcome) = transition(existing, identity, action, now, self.cutoff);

        match &write {
            Some(Write::Insert(rec)) => {
                insert_record(&tx, rec)?;
            }
            Some(Write::Update(rec)) => {
                update_record(&tx, rec)?;
            }
            None => {}
        }
        if write.is_some() {
            let target = format!("{} {}", identity.email, now.date().format("%Y-%m-%d"));
            ttlog(&tx, action.as_str(), &target, &outcome.audit_line())?;
        }
        tx.commit()?;

        tracing::info!(identity_id = identity.id, action = action.as_str(), ?outcome, "attendance recorded");

        if outcome.is_late() {
            self.notifier.schedule(LateNotice {
                email: identity.email.clone(),
                name: identity.name.clone(),
                time: format_time(now.time()),
            });
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::attendance::load_records;
    use crate::db::migrate::run_pending_migrations;
    use crate::models::attendance::{STATUS_PRESENT, STATUS_PRESENT_LATE};
    use chrono::NaiveDate;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Captured(RefCell<Vec<LateNotice>>);

    impl LateNotifier for Captured {
        fn schedule(&self, notice: LateNotice) {
            self.0.borrow_mut().push(notice);
        }
    }

    fn alice() -> Identity {
        Identity {
            id: 1,
            name: "Alice".into(),
            email: "alice@example.com".into(),
            reference_image: Some(vec![1, 2, 3]),
            created_at: "t".into(),
        }
    }

    fn at(hms: &str) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 3)
            .unwrap()
            .and_time(NaiveTime::parse_from_str(hms, "%H:%M:%S").unwrap())
    }

    fn t(hms: &str) -> NaiveTime {
        NaiveTime::parse_from_str(hms, "%H:%M:%S").unwrap()
    }

    fn cutoff() -> NaiveTime {
        t("09:00:00")
    }

    fn conn() -> Connection {
        let c = Connection::open_in_memory().unwrap();
        run_pending_migrations(&c).unwrap();
        c
    }

    #[test]
    fn cutoff_is_exact() {
        let (_, on_time) = transition(None, &alice(), AttendanceAction::CheckIn, at("09:00:00"), cutoff());
        let (_, late) = transition(None, &alice(), AttendanceAction::CheckIn, at("09:00:01"), cutoff());
        assert_eq!(on_time, Outcome::CreatedCheckIn { time: t("09:00:00"), late: false });
        assert_eq!(late, Outcome::CreatedCheckIn { time: t("09:00:01"), late: true });
    }

    #[test]
    fn late_checkin_schedules_one_notice() {
        let c = conn();
        let notes = Captured::default();
        let recorder = AttendanceRecorder::new(cutoff(), &notes);

        let out = recorder.record(&c, &alice(), AttendanceAction::CheckIn, at("09:00:01")).unwrap();
        assert!(out.is_late());

        let rec = &load_records(&c, None, None).unwrap()[0];
        assert_eq!(rec.status, STATUS_PRESENT_LATE);
        assert!(rec.late);

        let sent = notes.0.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].email, "alice@example.com");
        assert_eq!(sent[0].time, "09:00:01");
    }

    #[test]
    fn second_checkin_is_idempotent() {
        let c = conn();
        let notes = Captured::default();
        let recorder = AttendanceRecorder::new(cutoff(), &notes);

        recorder.record(&c, &alice(), AttendanceAction::CheckIn, at("08:30:00")).unwrap();
        let again = recorder.record(&c, &alice(), AttendanceAction::CheckIn, at("10:00:00")).unwrap();

        assert_eq!(again, Outcome::AlreadyCheckedIn { existing: t("08:30:00") });
        let all = load_records(&c, None, None).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].checkin_str().as_deref(), Some("08:30:00"));
        assert!(!all[0].late);
        assert!(notes.0.borrow().is_empty());
    }

    #[test]
    fn checkout_first_creates_checkout_only_record() {
        let c = conn();
        let notes = Captured::default();
        let recorder = AttendanceRecorder::new(cutoff(), &notes);

        let out = recorder.record(&c, &alice(), AttendanceAction::CheckOut, at("17:45:00")).unwrap();
        assert_eq!(out, Outcome::CheckoutWithoutCheckIn { time: t("17:45:00") });

        let rec = &load_records(&c, None, None).unwrap()[0];
        assert_eq!(rec.checkin, None);
        assert_eq!(rec.checkout, Some(t("17:45:00")));
        assert_eq!(rec.status, "-");
        assert!(!rec.late);
    }

    #[test]
    fn checkin_after_checkout_only_fills_in() {
        let c = conn();
        let notes = Captured::default();
        let recorder = AttendanceRecorder::new(cutoff(), &notes);

        recorder.record(&c, &alice(), AttendanceAction::CheckOut, at("07:00:00")).unwrap();
        let out = recorder.record(&c, &alice(), AttendanceAction::CheckIn, at("09:10:00")).unwrap();
        assert_eq!(out, Outcome::CheckInAdded { time: t("09:10:00"), late: true });

        let all = load_records(&c, None, None).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].checkout, Some(t("07:00:00")));
        assert_eq!(all[0].status, STATUS_PRESENT_LATE);
        assert_eq!(notes.0.borrow().len(), 1);
    }

    #[test]
    fn second_checkout_overwrites_first() {
        let c = conn();
        let notes = Captured::default();
        let recorder = AttendanceRecorder::new(cutoff(), &notes);

        recorder.record(&c, &alice(), AttendanceAction::CheckIn, at("08:00:00")).unwrap();
        recorder.record(&c, &alice(), AttendanceAction::CheckOut, at("17:00:00")).unwrap();
        let out = recorder.record(&c, &alice(), AttendanceAction::CheckOut, at("18:30:00")).unwrap();

        assert_eq!(
            out,
            Outcome::CheckoutRecorded { time: t("18:30:00"), replaced: Some(t("17:00:00")) }
        );
        let rec = &load_records(&c, None, None).unwrap()[0];
        assert_eq!(rec.checkout, Some(t("18:30:00")));
    }

    #[test]
    fn checkin_after_full_day_is_still_already_checked_in() {
        let c = conn();
        let notes = Captured::default();
        let recorder = AttendanceRecorder::new(cutoff(), &notes);

        recorder.record(&c, &alice(), AttendanceAction::CheckIn, at("08:00:00")).unwrap();
        recorder.record(&c, &alice(), AttendanceAction::CheckOut, at("17:00:00")).unwrap();
        let out = recorder.record(&c, &alice(), AttendanceAction::CheckIn, at("19:00:00")).unwrap();
        assert_eq!(out, Outcome::AlreadyCheckedIn { existing: t("08:00:00") });
    }

    #[test]
    fn alice_full_day() {
        let c = conn();
        let notes = Captured::default();
        let recorder = AttendanceRecorder::new(cutoff(), &notes);

        recorder.record(&c, &alice(), AttendanceAction::CheckIn, at("08:59:59")).unwrap();
        let rec = &load_records(&c, None, None).unwrap()[0];
        assert_eq!(rec.checkin_str().as_deref(), Some("08:59:59"));
        assert!(!rec.late);
        assert_eq!(rec.status, STATUS_PRESENT);

        let out = recorder.record(&c, &alice(), AttendanceAction::CheckOut, at("18:00:00")).unwrap();
        assert_eq!(out, Outcome::CheckoutRecorded { time: t("18:00:00"), replaced: None });

        let rec = &load_records(&c, None, None).unwrap()[0];
        assert_eq!(rec.checkin_str().as_deref(), Some("08:59:59"));
        assert_eq!(rec.checkout_str().as_deref(), Some("18:00:00"));
        assert!(!rec.late);
        assert_eq!(rec.status, STATUS_PRESENT);
        assert!(notes.0.borrow().is_empty());
    }

    #[test]
    fn sub_second_clock_does_not_cross_cutoff() {
        let c = conn();
        let notes = Captured::default();
        let recorder = AttendanceRecorder::new(cutoff(), &notes);
        let now = at("09:00:00") + chrono::Duration::milliseconds(500);

        let out = recorder.record(&c, &alice(), AttendanceAction::CheckIn, now).unwrap();
        assert_eq!(out, Outcome::CreatedCheckIn { time: t("09:00:00"), late: false });
    }

    #[test]
    fn each_day_gets_its_own_record() {
        let c = conn();
        let notes = Captured::default();
        let recorder = AttendanceRecorder::new(cutoff(), &notes);

        recorder.record(&c, &alice(), AttendanceAction::CheckIn, at("08:00:00")).unwrap();
        let next_day = at("08:00:00") + chrono::Duration::days(1);
        let out = recorder.record(&c, &alice(), AttendanceAction::CheckIn, next_day).unwrap();

        assert!(matches!(out, Outcome::CreatedCheckIn { .. }));
        assert_eq!(load_records(&c, None, None).unwrap().len(), 2);
    }
}
