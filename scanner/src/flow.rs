//! Decode-and-submit state machine.
//!
//! ```text
//!   mount ──► Scanning ──decode──► Submitting ──complete──► Success | Error
//!                ▲                                              │
//!                └──────────────────── scan_again ──────────────┘
//! ```
//!
//! Only `Scanning` accepts decodes, which is what keeps a burst of frames
//! showing the same code from producing more than one submission. The camera
//! is held while scanning or submitting and released on entering a terminal
//! state or when the flow is dropped. A submission that is given up before
//! its answer arrives (see [`ScanFlow::abandon`]) ends in `Error`.

use crate::api::{ApiError, FALLBACK_ERROR_MESSAGE, JemaatSummary, KehadiranApi, ScanRequest};
use crate::camera::{Camera, CameraError, CameraLease};

/// Shown when a code is decoded before a jemaat has been picked.
pub const NO_IDENTITY_MESSAGE: &str = "Pilih jemaat terlebih dahulu";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanState {
    Scanning,
    Submitting,
    Success { message: String },
    Error { message: String },
}

impl ScanState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ScanState::Success { .. } | ScanState::Error { .. })
    }
}

/// An accepted decode waiting for the server's answer.
///
/// Hand it back to [`ScanFlow::complete`] together with the result, or to
/// [`ScanFlow::abandon`] if no result is coming.
#[derive(Debug)]
#[must_use = "the flow stays in Submitting until the ticket is completed or abandoned"]
pub struct PendingScan {
    attempt: u64,
    pub request: ScanRequest,
}

pub struct ScanFlow<C: Camera> {
    lease: CameraLease<C>,
    identity: Option<JemaatSummary>,
    state: ScanState,
    attempt: u64,
}

impl<C: Camera> ScanFlow<C> {
    /// Starts the camera and begins scanning on behalf of `identity`.
    pub fn mount(camera: C, identity: Option<JemaatSummary>) -> Result<Self, CameraError> {
        let lease = CameraLease::acquire(camera)?;
        Ok(Self {
            lease,
            identity,
            state: ScanState::Scanning,
            attempt: 0,
        })
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    pub fn identity(&self) -> Option<&JemaatSummary> {
        self.identity.as_ref()
    }

    pub fn camera_held(&self) -> bool {
        self.lease.is_held()
    }

    /// Feeds one decoded frame.
    ///
    /// Returns a ticket when the decode starts a submission. Blank payloads are
    /// decoder noise and are ignored, as is everything outside `Scanning`.
    /// Without a selected jemaat the flow fails locally and no ticket is issued.
    pub fn on_decode(&mut self, payload: &str) -> Option<PendingScan> {
        if self.state != ScanState::Scanning {
            return None;
        }

        if payload.trim().is_empty() {
            return None;
        }

        let Some(jemaat) = self.identity.as_ref() else {
            self.finish(ScanState::Error {
                message: NO_IDENTITY_MESSAGE.to_string(),
            });
            return None;
        };

        self.attempt += 1;
        self.state = ScanState::Submitting;
        Some(PendingScan {
            attempt: self.attempt,
            request: ScanRequest {
                kode_qr: payload.to_string(),
                jemaat_id: jemaat.id.clone(),
            },
        })
    }

    /// Applies the server's answer for `ticket`.
    ///
    /// Returns `false` and changes nothing if the ticket is stale.
    pub fn complete(&mut self, ticket: PendingScan, result: Result<String, ApiError>) -> bool {
        if ticket.attempt != self.attempt || self.state != ScanState::Submitting {
            tracing::debug!(attempt = ticket.attempt, "discarding stale scan result");
            return false;
        }

        let next = match result {
            Ok(message) => ScanState::Success { message },
            Err(e) => {
                tracing::info!(error = %e, "scan failed");
                ScanState::Error {
                    message: e.user_message(),
                }
            }
        };
        self.finish(next);
        true
    }

    /// Gives up on `ticket` without an answer from the server.
    ///
    /// The flow moves to `Error` with the generic failure message and the
    /// camera is released. Stale tickets are ignored like in [`complete`].
    ///
    /// [`complete`]: ScanFlow::complete
    pub fn abandon(&mut self, ticket: PendingScan) -> bool {
        if ticket.attempt != self.attempt || self.state != ScanState::Submitting {
            return false;
        }
        tracing::warn!(attempt = ticket.attempt, "scan submission abandoned");
        self.finish(ScanState::Error {
            message: FALLBACK_ERROR_MESSAGE.to_string(),
        });
        true
    }

    /// Decode, submit and complete in one go.
    ///
    /// Returns whether a submission was made. If the returned future is
    /// dropped while the request is in flight the attempt is abandoned.
    pub async fn handle_decode<A>(&mut self, api: &A, payload: &str) -> bool
    where
        A: KehadiranApi + ?Sized,
    {
        let Some(ticket) = self.on_decode(payload) else {
            return false;
        };
        let request = ticket.request.clone();
        let mut guard = InFlight {
            flow: self,
            ticket: Some(ticket),
        };
        let result = api.submit_scan(&request).await;
        if let Some(ticket) = guard.ticket.take() {
            guard.flow.complete(ticket, result);
        }
        true
    }

    /// Re-arms the scanner from a terminal state.
    ///
    /// Returns `Ok(false)` when not in a terminal state. If the camera cannot
    /// be restarted the flow stays where it was.
    pub fn scan_again(&mut self) -> Result<bool, CameraError> {
        if !self.state.is_terminal() {
            return Ok(false);
        }
        self.lease.reacquire()?;
        self.state = ScanState::Scanning;
        Ok(true)
    }

    fn finish(&mut self, state: ScanState) {
        self.lease.release();
        self.state = state;
    }
}

/// Abandons the attempt if `handle_decode` is cancelled mid-request.
struct InFlight<'a, C: Camera> {
    flow: &'a mut ScanFlow<C>,
    ticket: Option<PendingScan>,
}

impl<C: Camera> Drop for InFlight<'_, C> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            self.flow.abandon(ticket);
        }
    }
}
