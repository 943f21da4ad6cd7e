//! Election phases.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The phase of an election.
///
/// Phases only move forward, one step at a time:
/// ```text
/// Registration -> Commit -> Reveal -> Ended
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Owner registers eligible voters.
    Registration,
    /// Eligible voters submit sealed commitments.
    Commit,
    /// Voters open their commitments; openings are tallied.
    Reveal,
    /// Terminal. Results and winner are final.
    Ended,
}

impl Phase {
    pub const ALL: [Phase; 4] = [
        Phase::Registration,
        Phase::Commit,
        Phase::Reveal,
        Phase::Ended,
    ];

    /// The phase that follows this one, if any.
    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::Registration => Some(Phase::Commit),
            Phase::Commit => Some(Phase::Reveal),
            Phase::Reveal => Some(Phase::Ended),
            Phase::Ended => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }

    pub fn name(self) -> &'static str {
        match self {
            Phase::Registration => "Registration",
            Phase::Commit => "Commit",
            Phase::Reveal => "Reveal",
            Phase::Ended => "Ended",
        }
    }

    /// Fail with [`Error::WrongPhase`] unless `self` is `required`.
    pub fn ensure(self, required: Phase) -> Result<(), Error> {
        if self == required {
            Ok(())
        } else {
            Err(Error::WrongPhase {
                required,
                actual: self,
            })
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Phase {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Phase::ALL
            .into_iter()
            .find(|phase| phase.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownPhase(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_order() {
        assert_eq!(Phase::Registration.next(), Some(Phase::Commit));
        assert_eq!(Phase::Commit.next(), Some(Phase::Reveal));
        assert_eq!(Phase::Reveal.next(), Some(Phase::Ended));
        assert_eq!(Phase::Ended.next(), None);
        assert!(Phase::Ended.is_terminal());

        for pair in Phase::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert_eq!(pair[0].next(), Some(pair[1]));
        }
    }

    #[test]
    fn ensure_reports_both_phases() {
        assert!(Phase::Commit.ensure(Phase::Commit).is_ok());
        assert_eq!(
            Phase::Reveal.ensure(Phase::Commit),
            Err(Error::WrongPhase {
                required: Phase::Commit,
                actual: Phase::Reveal
            })
        );
    }

    #[test]
    fn names() {
        assert_eq!(Phase::Registration.to_string(), "Registration");
        assert_eq!("reveal".parse::<Phase>().unwrap(), Phase::Reveal);
        assert_eq!(" Ended ".parse::<Phase>().unwrap(), Phase::Ended);
        assert!(matches!(
            "voting".parse::<Phase>(),
            Err(Error::UnknownPhase(_))
        ));
    }
}
