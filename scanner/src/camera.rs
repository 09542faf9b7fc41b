//! Camera ownership for the scanner.
//!
//! The device is held only while the flow is in the scanning state. Release is
//! best-effort: failures are logged and swallowed so that tearing the scanner
//! down can never fail.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CameraError {
    #[error("camera unavailable: {0}")]
    Unavailable(String),
    #[error("camera release failed: {0}")]
    Release(String),
}

/// A frame source that can be started and cleared.
pub trait Camera {
    fn start(&mut self) -> Result<(), CameraError>;
    fn clear(&mut self) -> Result<(), CameraError>;
}

impl<C: Camera + ?Sized> Camera for Box<C> {
    fn start(&mut self) -> Result<(), CameraError> {
        (**self).start()
    }

    fn clear(&mut self) -> Result<(), CameraError> {
        (**self).clear()
    }
}

/// Owns a [`Camera`] and remembers whether it is currently started.
///
/// `release` is idempotent per acquisition and runs on drop.
pub struct CameraLease<C: Camera> {
    camera: C,
    held: bool,
}

impl<C: Camera> CameraLease<C> {
    /// Starts `camera` and wraps it.
    pub fn acquire(mut camera: C) -> Result<Self, CameraError> {
        camera.start()?;
        Ok(Self { camera, held: true })
    }

    /// Starts the camera again after a release. No-op while held.
    pub fn reacquire(&mut self) -> Result<(), CameraError> {
        if self.held {
            return Ok(());
        }
        self.camera.start()?;
        self.held = true;
        Ok(())
    }

    pub fn release(&mut self) {
        if !self.held {
            return;
        }
        self.held = false;
        if let Err(e) = self.camera.clear() {
            tracing::warn!(error = %e, "failed to release camera");
        }
    }

    pub fn is_held(&self) -> bool {
        self.held
    }
}

impl<C: Camera> Drop for CameraLease<C> {
    fn drop(&mut self) {
        self.release();
    }
}
