//! Pointer hit-testing for gesture and mouse clicks.

use rand::Rng;
use tracing::debug;

use crate::controller::{Answer, GameController};
use crate::error::GameError;
use crate::gesture::GestureEvent;
use crate::session::{ItemKind, Phase};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClickTarget {
    Option(usize),
    StartWave,
    BuyHint,
    BuyFreeze,
    UseFreeze,
    UseHint,
}

/// Axis-aligned rectangle in normalized screen units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Region {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A cell rectangle of a `cols` x `rows` screen, normalized.
    pub fn from_cells(col: u16, row: u16, width: u16, height: u16, cols: u16, rows: u16) -> Self {
        let cols = cols.max(1) as f64;
        let rows = rows.max(1) as f64;
        Self::new(
            col as f64 / cols,
            row as f64 / rows,
            width as f64 / cols,
            height as f64 / rows,
        )
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// Clickable regions registered by the presenter on each draw.
#[derive(Debug, Clone, Default)]
pub struct HitMap {
    regions: Vec<(Region, ClickTarget)>,
    pointer: Option<(f64, f64)>,
}

impl HitMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.regions.clear();
    }

    pub fn register(&mut self, region: Region, target: ClickTarget) {
        self.regions.push((region, target));
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn move_pointer(&mut self, x: f64, y: f64) {
        self.pointer = Some((x.clamp(0.0, 1.0), y.clamp(0.0, 1.0)));
    }

    pub fn pointer(&self) -> Option<(f64, f64)> {
        self.pointer
    }

    /// Topmost target under a point. Later registrations win.
    pub fn hit(&self, x: f64, y: f64) -> Option<ClickTarget> {
        self.regions
            .iter()
            .rev()
            .find(|(region, _)| region.contains(x, y))
            .map(|(_, target)| *target)
    }

    /// Target under the last known pointer position.
    pub fn click(&self) -> Option<ClickTarget> {
        let (x, y) = self.pointer?;
        self.hit(x, y)
    }
}

impl ClickTarget {
    /// Whether the controller can act on this target right now.
    pub fn applicable<R: Rng>(&self, controller: &GameController<R>) -> bool {
        let phase = controller.session().phase;
        match self {
            ClickTarget::Option(_) | ClickTarget::UseFreeze | ClickTarget::UseHint => {
                controller.is_accepting_answers()
            }
            ClickTarget::StartWave => matches!(phase, Phase::Idle | Phase::Hub),
            ClickTarget::BuyHint | ClickTarget::BuyFreeze => phase != Phase::WaveActive,
        }
    }

    /// Turn a click into a controller operation. `None` when the click was dropped.
    pub fn apply<R: Rng>(
        self,
        controller: &mut GameController<R>,
    ) -> Option<Result<(), GameError>> {
        if !self.applicable(controller) {
            debug!(target = ?self, "click dropped");
            return None;
        }
        let result = match self {
            ClickTarget::Option(i) => controller.answer(Answer::Option(i)).map(|_| ()),
            ClickTarget::StartWave => controller.start_wave(),
            ClickTarget::BuyHint => controller.buy_item(ItemKind::Hint).map(|_| ()),
            ClickTarget::BuyFreeze => controller.buy_item(ItemKind::Freeze).map(|_| ()),
            ClickTarget::UseFreeze => controller.use_freeze().map(|_| ()),
            ClickTarget::UseHint => controller.activate_hint_scan(),
        };
        Some(result)
    }
}

/// Route one gesture to the controller: moves steer the pointer, a pinch
/// clicks whatever is under it, a smile unlocks a pending hint.
/// `None` when nothing was asked of the controller.
pub fn dispatch<R: Rng>(
    event: GestureEvent,
    hits: &mut HitMap,
    controller: &mut GameController<R>,
) -> Option<Result<(), GameError>> {
    match event {
        GestureEvent::PointerMove { x, y } => {
            hits.move_pointer(x, y);
            None
        }
        GestureEvent::PinchClick => {
            let target = hits.click()?;
            target.apply(controller)
        }
        GestureEvent::Smile => Some(controller.unlock_hint_gesture().map(|_| ())),
    }
}
