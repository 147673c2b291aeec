use crate::auth::AuthGate;
use crate::core::recorder::{AttendanceRecorder, Outcome};
use crate::db::identities::load_identities;
use crate::errors::{AppError, AppResult};
use crate::faces::{Candidate, FaceMatchScanner, LivePhoto, MatchOutcome};
use crate::models::attendance::AttendanceAction;
use crate::models::identity::Identity;
use chrono::NaiveDateTime;
use rusqlite::Connection;
use serde::Serialize;

/// Result of one attendance request.
#[derive(Debug, Clone, Serialize)]
pub struct AttendReport {
    pub identity: Identity,
    pub distance: f64,
    pub outcome: Outcome,
}

impl AttendReport {
    pub fn message(&self) -> String {
        self.outcome.message(&self.identity.name)
    }
}

/// Front door for attendance: session → photo → match → record.
pub struct AttendanceDesk<'a> {
    gate: AuthGate<'a>,
    scanner: FaceMatchScanner<'a>,
    recorder: AttendanceRecorder<'a>,
}

impl<'a> AttendanceDesk<'a> {
    pub fn new(
        gate: AuthGate<'a>,
        scanner: FaceMatchScanner<'a>,
        recorder: AttendanceRecorder<'a>,
    ) -> Self {
        Self {
            gate,
            scanner,
            recorder,
        }
    }

    /// Any logged-in role may mark attendance. Nothing is written unless a
    /// registered face is verified.
    pub fn handle(
        &self,
        conn: &Connection,
        token: Option<&str>,
        photo: &LivePhoto,
        action: AttendanceAction,
        now: NaiveDateTime,
    ) -> AppResult<AttendReport> {
        let caller = self.gate.authorize(token, None)?;
        self.scanner.validate(photo)?;

        let identities = load_identities(conn)?;
        tracing::debug!(
            operator = %caller.email,
            candidates = identities.len(),
            "scanning registered identities"
        );

        let outcome = self.scanner.find_match(
            photo,
            identities.iter().map(|i| Candidate {
                identity_id: i.id,
                reference: i.reference_image.as_deref(),
            }),
        )?;

        let MatchOutcome::Matched {
            identity_id,
            distance,
        } = outcome
        else {
            tracing::info!(operator = %caller.email, "face not recognized");
            return Err(AppError::NoMatch);
        };

        let identity = identities
            .into_iter()
            .find(|i| i.id == identity_id)
            .ok_or_else(|| AppError::NotFound(format!("identity {identity_id}")))?;

        let outcome = self.recorder.record(conn, &identity, action, now)?;

        Ok(AttendReport {
            identity: Identity {
                reference_image: None,
                ..identity
            },
            distance,
            outcome,
        })
    }
}
