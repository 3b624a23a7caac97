//! Surface reticle
//!
//! Visualizes the current best surface estimate. The reticle is ticked once
//! per render frame; while testing it runs the [`HitTest`] and either moves
//! to the new pose or hides for that frame. It never shows a stale pose.
//!
//! The last successful pose stays readable after the marker hides, so the
//! scene can freeze it as the anchor of a placed model.

use crate::hit_test::{HitTest, HitTestResult};
use crate::platform::XrFrame;
use pip_core::{EventBus, EventStream, Pose, Quat, Vec3};

/// Found/lost transitions of the hit state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReticleEvent {
    /// A surface is under the reticle again
    Found(Pose),
    /// The surface was lost
    Lost,
}

/// What a frame tick did to the marker
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReticleUpdate {
    /// Testing is off; nothing changed
    Idle,
    /// No hit this frame; marker hidden
    Hidden,
    /// Hit this frame; marker shown at the pose
    Moved(Pose),
}

#[derive(Debug)]
pub struct Reticle {
    hit_test: HitTest,
    testing: bool,
    visible: bool,
    pose: Option<Pose>,
    last_hit: Option<HitTestResult>,
    events: EventBus<ReticleEvent>,
}

impl Reticle {
    #[must_use]
    pub fn new(hit_test: HitTest) -> Self {
        Self {
            hit_test,
            testing: false,
            visible: false,
            pose: None,
            last_hit: None,
            events: EventBus::default(),
        }
    }

    /// The hit tester driving this reticle
    #[inline]
    #[must_use]
    pub fn hit_test(&self) -> &HitTest {
        &self.hit_test
    }

    #[must_use]
    pub fn subscribe(&self) -> EventStream<ReticleEvent> {
        self.events.subscribe()
    }

    /// Enable per-frame testing; the marker appears with the next hit
    pub fn show(&mut self) {
        if !self.testing {
            tracing::trace!("reticle testing enabled");
        }
        self.testing = true;
    }

    /// Disable testing and hide the marker
    pub fn hide(&mut self) {
        if self.testing {
            tracing::trace!("reticle testing disabled");
        }
        self.testing = false;
        self.set_hit(None);
    }

    /// Advance one render frame
    pub fn tick(&mut self, frame: &dyn XrFrame) -> ReticleUpdate {
        if !self.testing {
            return ReticleUpdate::Idle;
        }

        match self.hit_test.perform_hit_test(frame) {
            Some(hit) => {
                self.pose = Some(hit.pose);
                self.set_hit(Some(hit));
                ReticleUpdate::Moved(hit.pose)
            }
            None => {
                self.set_hit(None);
                ReticleUpdate::Hidden
            }
        }
    }

    fn set_hit(&mut self, hit: Option<HitTestResult>) {
        match (self.last_hit.is_some(), hit) {
            (false, Some(h)) => {
                self.events.emit(ReticleEvent::Found(h.pose));
            }
            (true, None) => {
                self.events.emit(ReticleEvent::Lost);
            }
            _ => {}
        }
        self.visible = hit.is_some();
        self.last_hit = hit;
    }

    #[inline]
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[inline]
    #[must_use]
    pub fn is_testing(&self) -> bool {
        self.testing
    }

    /// Last successfully detected pose
    #[inline]
    #[must_use]
    pub fn pose(&self) -> Option<Pose> {
        self.pose
    }

    #[must_use]
    pub fn position(&self) -> Option<Vec3> {
        self.pose.map(|p| p.position)
    }

    #[must_use]
    pub fn rotation(&self) -> Option<Quat> {
        self.pose.map(|p| p.orientation)
    }

    /// Hit of the most recent tick, if it found a surface
    #[inline]
    #[must_use]
    pub fn last_hit(&self) -> Option<&HitTestResult> {
        self.last_hit.as_ref()
    }
}
