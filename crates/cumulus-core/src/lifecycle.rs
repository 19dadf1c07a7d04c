//! Renderer lifecycle.

use serde::{Deserialize, Serialize};

use crate::error::{CumulusError, Result};

/// Where a volume renderer is in its life.
///
/// Stages only move forward. `Rendering` may repeat once per frame, and
/// `Disposed` can be reached from anywhere but never left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Stage {
    #[default]
    Uninitialized,
    FieldGenerated,
    TextureUploaded,
    Rendering,
    Disposed,
}

impl Stage {
    /// Whether `self -> next` is allowed.
    #[must_use]
    pub fn can_advance_to(self, next: Stage) -> bool {
        use Stage::{Disposed, FieldGenerated, Rendering, TextureUploaded, Uninitialized};
        matches!(
            (self, next),
            (Uninitialized, FieldGenerated)
                | (FieldGenerated, TextureUploaded)
                | (TextureUploaded | Rendering, Rendering)
        ) || (next == Disposed && self != Disposed)
    }

    /// Moves to `next`, or fails without changing anything.
    pub fn advance(&mut self, next: Stage) -> Result<()> {
        if !self.can_advance_to(next) {
            return Err(CumulusError::InvalidTransition {
                from: *self,
                to: next,
            });
        }
        log::debug!("lifecycle {:?} -> {:?}", *self, next);
        *self = next;
        Ok(())
    }

    /// Whether GPU resources exist in this stage.
    #[must_use]
    pub fn has_gpu_resources(self) -> bool {
        matches!(self, Stage::TextureUploaded | Stage::Rendering)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_path() {
        let mut stage = Stage::default();
        stage.advance(Stage::FieldGenerated).unwrap();
        stage.advance(Stage::TextureUploaded).unwrap();
        stage.advance(Stage::Rendering).unwrap();
        stage.advance(Stage::Rendering).unwrap();
        stage.advance(Stage::Disposed).unwrap();
        assert_eq!(stage, Stage::Disposed);
    }

    #[test]
    fn test_no_skipping() {
        let mut stage = Stage::Uninitialized;
        assert!(stage.advance(Stage::TextureUploaded).is_err());
        assert!(stage.advance(Stage::Rendering).is_err());
        assert_eq!(stage, Stage::Uninitialized);
    }

    #[test]
    fn test_no_backward() {
        let mut stage = Stage::Rendering;
        let err = stage.advance(Stage::FieldGenerated).unwrap_err();
        assert!(matches!(
            err,
            CumulusError::InvalidTransition {
                from: Stage::Rendering,
                to: Stage::FieldGenerated
            }
        ));
    }

    #[test]
    fn test_disposed_is_terminal() {
        for start in [
            Stage::Uninitialized,
            Stage::FieldGenerated,
            Stage::TextureUploaded,
            Stage::Rendering,
        ] {
            let mut stage = start;
            stage.advance(Stage::Disposed).unwrap();
            for next in [
                Stage::Uninitialized,
                Stage::FieldGenerated,
                Stage::TextureUploaded,
                Stage::Rendering,
                Stage::Disposed,
            ] {
                assert!(!stage.can_advance_to(next));
            }
        }
    }

    #[test]
    fn test_gpu_resources() {
        assert!(!Stage::FieldGenerated.has_gpu_resources());
        assert!(Stage::TextureUploaded.has_gpu_resources());
        assert!(Stage::Rendering.has_gpu_resources());
        assert!(!Stage::Disposed.has_gpu_resources());
    }
}
