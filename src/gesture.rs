//! Hand and face landmark interpretation.
//!
//! Landmarks arrive in normalized image coordinates (`0.0..=1.0`, origin top
//! left, camera not mirrored). Detectors are stateless apart from the pinch
//! edge trigger, so they can be fed any frame rate.

pub const PINCH_THRESHOLD: f64 = 0.05;
pub const SMILE_THRESHOLD: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Landmark) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// The two fingertips a hand tracker reports.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandFrame {
    pub index_tip: Landmark,
    pub thumb_tip: Landmark,
}

/// Mouth corners from a face mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceFrame {
    pub mouth_left: Landmark,
    pub mouth_right: Landmark,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    /// Pointer position, mirrored so moving the hand right moves the pointer right.
    PointerMove { x: f64, y: f64 },
    PinchClick,
    Smile,
}

/// Fires once per open to closed transition.
#[derive(Debug, Clone)]
pub struct PinchDetector {
    threshold: f64,
    pinching: bool,
}

impl Default for PinchDetector {
    fn default() -> Self {
        Self::new(PINCH_THRESHOLD)
    }
}

impl PinchDetector {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            pinching: false,
        }
    }

    pub fn update(&mut self, frame: &HandFrame) -> bool {
        let closed = frame.index_tip.distance(&frame.thumb_tip) < self.threshold;
        let fired = closed && !self.pinching;
        self.pinching = closed;
        fired
    }

    pub fn is_pinching(&self) -> bool {
        self.pinching
    }

    pub fn reset(&mut self) {
        self.pinching = false;
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SmileDetector {
    threshold: f64,
}

impl Default for SmileDetector {
    fn default() -> Self {
        Self::new(SMILE_THRESHOLD)
    }
}

impl SmileDetector {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn is_smiling(&self, frame: &FaceFrame) -> bool {
        frame.mouth_left.distance(&frame.mouth_right) > self.threshold
    }

    pub fn process(&self, frame: &FaceFrame) -> Option<GestureEvent> {
        self.is_smiling(frame).then_some(GestureEvent::Smile)
    }
}

/// Turns hand frames into pointer movement and clicks.
#[derive(Debug, Clone, Default)]
pub struct HandTracker {
    pinch: PinchDetector,
}

impl HandTracker {
    pub fn new(pinch: PinchDetector) -> Self {
        Self { pinch }
    }

    pub fn process(&mut self, frame: &HandFrame) -> Vec<GestureEvent> {
        let x = (1.0 - frame.index_tip.x).clamp(0.0, 1.0);
        let y = frame.index_tip.y.clamp(0.0, 1.0);
        let mut events = vec![GestureEvent::PointerMove { x, y }];
        if self.pinch.update(frame) {
            events.push(GestureEvent::PinchClick);
        }
        events
    }

    /// Forget the pinch state, e.g. when the hand leaves the frame.
    pub fn hand_lost(&mut self) {
        self.pinch.reset();
    }
}
