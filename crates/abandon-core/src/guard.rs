//! Pre-validation checks on submissions.
//!
//! A [`SubmissionGuard`] runs before proof-of-work validation and can reject
//! a submission outright. This is where signature verification plugs in;
//! the server ships [`AcceptAll`] and [`TimestampWindow`].

use std::fmt;

use crate::engine::{VaccineSubmission, VirusSubmission};

/// A submission as seen by a guard.
#[derive(Debug, Clone, Copy)]
pub enum Submission<'a> {
    /// A virus creation request.
    Virus(&'a VirusSubmission),
    /// A vaccine request.
    Vaccine(&'a VaccineSubmission),
}

impl Submission<'_> {
    /// Submitter identity.
    pub fn creator(&self) -> &str {
        match self {
            Self::Virus(s) => &s.creator,
            Self::Vaccine(s) => &s.creator,
        }
    }

    /// Client timestamp that was hashed.
    pub const fn timestamp(&self) -> i64 {
        match self {
            Self::Virus(s) => s.timestamp,
            Self::Vaccine(s) => s.timestamp,
        }
    }

    /// Optional signature supplied with the request.
    pub fn signature(&self) -> Option<&str> {
        match self {
            Self::Virus(s) => s.signature.as_deref(),
            Self::Vaccine(s) => s.signature.as_deref(),
        }
    }
}

/// Accepts or rejects a submission before any hashing happens.
pub trait SubmissionGuard: Send + Sync + fmt::Debug {
    /// Return `Err(reason)` to reject. `now` is server time in unix seconds.
    fn check(&self, submission: Submission<'_>, now: i64) -> Result<(), String>;
}

/// Lets every submission through.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl SubmissionGuard for AcceptAll {
    fn check(&self, _submission: Submission<'_>, _now: i64) -> Result<(), String> {
        Ok(())
    }
}

/// Rejects client timestamps too far from server time.
#[derive(Debug, Clone, Copy)]
pub struct TimestampWindow {
    tolerance_secs: u64,
}

impl TimestampWindow {
    /// Allow timestamps within `tolerance_secs` either side of now.
    pub const fn new(tolerance_secs: u64) -> Self {
        Self { tolerance_secs }
    }
}

impl SubmissionGuard for TimestampWindow {
    fn check(&self, submission: Submission<'_>, now: i64) -> Result<(), String> {
        let drift = now.abs_diff(submission.timestamp());
        if drift > self.tolerance_secs {
            return Err(format!(
                "Timestamp outside allowed window ({} seconds)",
                self.tolerance_secs
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    fn virus_at(timestamp: i64) -> VirusSubmission {
        VirusSubmission {
            creator: "0xA".into(),
            timestamp,
            nonce: 0,
            difficulty: 3,
            memo: None,
            signature: None,
        }
    }

    #[test]
    fn accept_all_accepts() {
        let sub = virus_at(0);
        assert!(AcceptAll.check(Submission::Virus(&sub), 1_000_000).is_ok());
    }

    #[test]
    fn window_is_symmetric_and_inclusive() {
        let guard = TimestampWindow::new(3600);
        let now = 1_738_454_400;
        for ts in [now, now - 3600, now + 3600] {
            let sub = virus_at(ts);
            assert!(guard.check(Submission::Virus(&sub), now).is_ok());
        }
        for ts in [now - 3601, now + 3601, 0] {
            let sub = virus_at(ts);
            let err = guard.check(Submission::Virus(&sub), now).unwrap_err();
            assert!(err.contains("3600"));
        }
    }

    #[test]
    fn accessors_cover_vaccines() {
        let sub = VaccineSubmission {
            creator: "0xB".into(),
            target: "000a".into(),
            timestamp: 5,
            nonce: 1,
            signature: Some("0xsig".into()),
        };
        let view = Submission::Vaccine(&sub);
        assert_eq!(view.creator(), "0xB");
        assert_eq!(view.timestamp(), 5);
        assert_eq!(view.signature(), Some("0xsig"));
    }
}
