//! Analysis session
//!
//! One user's upload → analyze → result flow as an explicit state machine:
//!
//! ```text
//! Idle ──upload──▶ Uploaded ──begin_analysis──▶ Analyzing ──complete──▶ ResultReady
//!   ▲                  ▲                                       │
//!   │                  └──────────── begin_analysis ◀── Failed ◀┘
//!   └──────────── reset / not-a-plant ─────────────────────────┘
//! ```
//!
//! `begin_analysis` is only allowed from `Uploaded` or `Failed`, so at most
//! one analysis is in flight per session.

use crate::diagnosis::Diagnosis;
use crate::error::{Error, Result, UserFriendlyError};
use crate::image::EncodedImage;
use chrono::{DateTime, Utc};
use tracing::debug;

/// Session state
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Nothing uploaded
    Idle {
        /// Message from the last rejected image, if any
        notice: Option<String>,
    },
    /// Image selected, not yet analyzed
    Uploaded {
        /// The image
        image: EncodedImage,
    },
    /// Analysis in flight
    Analyzing {
        /// The image
        image: EncodedImage,
        /// When the analysis started
        started_at: DateTime<Utc>,
    },
    /// Diagnosis available
    ResultReady {
        /// The image
        image: EncodedImage,
        /// The diagnosis
        diagnosis: Diagnosis,
        /// When the analysis finished
        completed_at: DateTime<Utc>,
    },
    /// Analysis failed; the image is kept for another attempt
    Failed {
        /// The image
        image: EncodedImage,
        /// User-facing failure message
        message: String,
    },
}

impl SessionState {
    /// State name
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle { .. } => "idle",
            Self::Uploaded { .. } => "uploaded",
            Self::Analyzing { .. } => "analyzing",
            Self::ResultReady { .. } => "result ready",
            Self::Failed { .. } => "failed",
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::Idle { notice: None }
    }
}

/// State machine driving one analysis flow
#[derive(Debug, Default)]
pub struct AnalysisSession {
    state: SessionState,
}

impl AnalysisSession {
    /// Start idle
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Current diagnosis, if one is ready
    #[must_use]
    pub fn diagnosis(&self) -> Option<&Diagnosis> {
        match self.state {
            SessionState::ResultReady { ref diagnosis, .. } => Some(diagnosis),
            _ => None,
        }
    }

    /// Whether an analysis is in flight
    #[must_use]
    pub fn is_analyzing(&self) -> bool {
        matches!(self.state, SessionState::Analyzing { .. })
    }

    /// Select a new image, discarding any previous result
    pub fn upload(&mut self, image: EncodedImage) -> Result<()> {
        if self.is_analyzing() {
            return Err(self.invalid("upload"));
        }
        self.transition(SessionState::Uploaded { image });
        Ok(())
    }

    /// Mark the analysis as started and return the image to send
    pub fn begin_analysis(&mut self) -> Result<EncodedImage> {
        let image = match self.state {
            SessionState::Uploaded { ref image } | SessionState::Failed { ref image, .. } => {
                image.clone()
            }
            _ => return Err(self.invalid("start an analysis")),
        };
        self.transition(SessionState::Analyzing {
            image: image.clone(),
            started_at: Utc::now(),
        });
        Ok(image)
    }

    /// Record the outcome of the in-flight analysis.
    ///
    /// A not-a-plant rejection returns the session to `Idle` with the
    /// rejection message as its notice; other errors move it to `Failed`.
    pub fn complete(&mut self, outcome: Result<Diagnosis>) -> Result<&SessionState> {
        let image = match std::mem::take(&mut self.state) {
            SessionState::Analyzing { image, .. } => image,
            other => {
                self.state = other;
                return Err(self.invalid("complete an analysis"));
            }
        };

        let next = match outcome {
            Ok(diagnosis) => SessionState::ResultReady {
                image,
                diagnosis,
                completed_at: Utc::now(),
            },
            Err(Error::NotAPlant(message)) => SessionState::Idle {
                notice: Some(message),
            },
            Err(e) => SessionState::Failed {
                image,
                message: e.user_message(),
            },
        };
        self.transition(next);
        Ok(&self.state)
    }

    /// Return to `Idle`, discarding image and result
    pub fn reset(&mut self) {
        self.transition(SessionState::default());
    }

    fn transition(&mut self, next: SessionState) {
        debug!(from = self.state.name(), to = next.name(), "Session transition");
        self.state = next;
    }

    fn invalid(&self, action: &'static str) -> Error {
        Error::InvalidTransition {
            state: self.state.name(),
            action,
        }
    }
}
