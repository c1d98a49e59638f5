use crate::domain::models::{EventDraft, ItemKind, TaskDraft};
use crate::domain::store::StoreState;
use crate::infrastructure::config::PopoverDimensions;

const ANCHOR_GAP: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Screen rectangle in CSS pixels, origin at the viewport's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left && point.x <= self.right() && point.y >= self.top && point.y <= self.bottom()
    }
}

/// Top-left corner for a popover of `size` next to `anchor`.
///
/// Prefers the space above the anchor and flips below when that would cross
/// the top margin. Horizontally it is centered on the anchor and clamped into
/// the viewport.
pub fn place_popover(anchor: Rect, size: Size, viewport: Size, margin: f64) -> Point {
    let mut top = anchor.top - size.height - ANCHOR_GAP;
    if top < margin {
        top = anchor.bottom() + ANCHOR_GAP;
    }

    let centered = anchor.left + anchor.width / 2.0 - size.width / 2.0;
    let max_left = (viewport.width - size.width - margin).max(margin);
    let left = centered.clamp(margin, max_left);

    Point { x: left, y: top }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopoverItem {
    Event(EventDraft),
    Task(TaskDraft),
}

impl PopoverItem {
    pub fn kind(&self) -> ItemKind {
        match self {
            Self::Event(_) => ItemKind::Event,
            Self::Task(_) => ItemKind::Task,
        }
    }

    pub fn is_new(&self) -> bool {
        match self {
            Self::Event(draft) => draft.id.is_none(),
            Self::Task(draft) => draft.id.is_none(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PopoverState {
    Idle,
    Open { item: PopoverItem, position: Point },
    Submitting { item: PopoverItem, position: Point },
}

/// One pending edit. Each grid interaction owns its own session.
#[derive(Debug, Clone)]
pub struct PopoverSession {
    dimensions: PopoverDimensions,
    viewport: Size,
    state: PopoverState,
}

impl PopoverSession {
    pub fn new(dimensions: PopoverDimensions, viewport: Size) -> Self {
        Self {
            dimensions,
            viewport,
            state: PopoverState::Idle,
        }
    }

    pub fn state(&self) -> &PopoverState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, PopoverState::Idle)
    }

    pub fn resize_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    /// Opens a blank draft of `kind` for the clicked day cell.
    pub fn open_for_date(&mut self, date: &str, kind: ItemKind, anchor: Rect) -> &PopoverState {
        let item = match kind {
            ItemKind::Event => PopoverItem::Event(EventDraft::for_date(date)),
            ItemKind::Task => PopoverItem::Task(TaskDraft::for_date(date)),
        };
        self.open(item, anchor)
    }

    /// Opens the stored item under the pointer. Returns `None` when the id is
    /// not in the store, leaving the session unchanged.
    pub fn open_for_item(
        &mut self,
        state: &StoreState,
        kind: ItemKind,
        id: &str,
        anchor: Rect,
    ) -> Option<&PopoverState> {
        let item = match kind {
            ItemKind::Event => PopoverItem::Event(EventDraft::from_event(state.event(id)?)),
            ItemKind::Task => PopoverItem::Task(TaskDraft::from_task(state.task(id)?)),
        };
        Some(self.open(item, anchor))
    }

    /// Replaces the draft while the form is being edited.
    pub fn edit(&mut self, item: PopoverItem) -> bool {
        match &mut self.state {
            PopoverState::Open { item: current, .. } if current.kind() == item.kind() => {
                *current = item;
                true
            }
            _ => false,
        }
    }

    /// Moves `Open` to `Submitting` and hands back the draft to send.
    pub fn begin_submit(&mut self) -> Option<PopoverItem> {
        let PopoverState::Open { item, position } = &self.state else {
            return None;
        };
        let item = item.clone();
        self.state = PopoverState::Submitting {
            item: item.clone(),
            position: *position,
        };
        Some(item)
    }

    /// Ends a submission. On failure the form reopens with the same draft.
    pub fn finish(&mut self, succeeded: bool) {
        let state = std::mem::replace(&mut self.state, PopoverState::Idle);
        if let PopoverState::Submitting { item, position } = state {
            if !succeeded {
                self.state = PopoverState::Open { item, position };
            }
        }
    }

    pub fn cancel(&mut self) {
        if matches!(self.state, PopoverState::Open { .. }) {
            self.state = PopoverState::Idle;
        }
    }

    /// Closes the popover when the pointer lands outside it. Returns whether it closed.
    pub fn pointer_down(&mut self, point: Point) -> bool {
        let PopoverState::Open { position, .. } = &self.state else {
            return false;
        };
        let bounds = Rect::new(
            position.x,
            position.y,
            self.dimensions.width,
            self.dimensions.height,
        );
        if bounds.contains(point) {
            return false;
        }
        self.state = PopoverState::Idle;
        true
    }

    fn open(&mut self, item: PopoverItem, anchor: Rect) -> &PopoverState {
        let position = place_popover(
            anchor,
            Size {
                width: self.dimensions.width,
                height: self.dimensions.height,
            },
            self.viewport,
            self.dimensions.margin,
        );
        self.state = PopoverState::Open { item, position };
        &self.state
    }
}
