use std::collections::BTreeSet;
use std::mem;

use serde::Serialize;

use crate::camera::{Camera, Point};
use crate::consts::{
    CARD_HEIGHT, CARD_WIDTH, DRAG_THRESHOLD_PX, LAYOUT_GAP, MAX_ZOOM, MIN_ZOOM, NUDGE_STEP, POSITION_DEBOUNCE_MS,
    ZOOM_STEP,
};
use crate::debounce::PendingWrites;
use crate::doc::{BoardSnapshot, DocStore, GroupId, Idea, IdeaId, PartialIdea, PositionUpdate};
use crate::hit::{self, CardSize, Rect};
use crate::input::{Button, DragOrigin, InputState, Key, Modifiers, UiState, WheelDelta};
use crate::layout;

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Tunables for the engine. Defaults come from [`crate::consts`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Zoom multiplier per wheel notch.
    pub zoom_step: f64,
    /// Pointer travel (screen px) that turns a press into a drag.
    pub drag_threshold_px: f64,
    /// Quiet period before a moved card is persisted.
    pub debounce_ms: f64,
    pub card: CardSize,
    /// Spacing between organized cards, in world units.
    pub layout_gap: f64,
    /// Arrow-key nudge distance in world units.
    pub nudge_step: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            zoom_step: ZOOM_STEP,
            drag_threshold_px: DRAG_THRESHOLD_PX,
            debounce_ms: POSITION_DEBOUNCE_MS,
            card: CardSize { width: CARD_WIDTH, height: CARD_HEIGHT },
            layout_gap: LAYOUT_GAP,
            nudge_step: NUDGE_STEP,
        }
    }
}

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Card positions or overlays changed; redraw.
    RenderNeeded,
    /// Pan or zoom changed.
    CameraChanged { pan_x: f64, pan_y: f64, zoom: f64 },
    /// The selection set changed. Carries the full new set.
    SelectionChanged { ids: Vec<IdeaId> },
    /// A card was pressed and released without dragging.
    Clicked { id: IdeaId },
    /// A press turned into a drag of these cards, primary first.
    DragStarted { ids: Vec<IdeaId> },
    /// A dragged card came to rest.
    DragEnded { id: IdeaId, x: f64, y: f64 },
    /// A marquee finished; `ids` are the cards it touched.
    RectSelectionCompleted { ids: Vec<IdeaId> },
    /// Write these positions to the data layer as one batch.
    PersistPositions { updates: Vec<PositionUpdate> },
    /// The user asked to delete these cards. The host confirms and calls
    /// [`EngineCore::apply_delete`].
    DeleteRequested { ids: Vec<IdeaId> },
}

/// Core engine state: document, camera, selection, gesture, and pending writes.
///
/// Every handler takes the host's clock as `now_ms` and returns the actions
/// the host should carry out. Nothing here blocks or spawns.
pub struct EngineCore {
    pub doc: DocStore,
    pub camera: Camera,
    pub ui: UiState,
    pub input: InputState,
    pub config: EngineConfig,
    pub pending: PendingWrites,
    pub viewport_width: f64,
    pub viewport_height: f64,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::with_config(EngineConfig::default())
    }
}

fn push_render(actions: &mut Vec<Action>) {
    if !actions.contains(&Action::RenderNeeded) {
        actions.push(Action::RenderNeeded);
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            doc: DocStore::new(),
            camera: Camera::default(),
            ui: UiState::default(),
            input: InputState::default(),
            pending: PendingWrites::new(config.debounce_ms),
            config,
            viewport_width: 0.0,
            viewport_height: 0.0,
        }
    }

    // --- Data inputs ---

    /// Hydrate the document from a data-layer snapshot.
    ///
    /// Positions still waiting to be written win over the snapshot so a
    /// refresh never snaps a just-moved card back. Selection and pending
    /// writes for ideas that no longer exist are dropped.
    pub fn load_snapshot(&mut self, snapshot: BoardSnapshot) {
        self.doc.load_snapshot(snapshot);
        let doc = &self.doc;
        self.pending.retain(|id| doc.get(id).is_some());
        self.ui.selected.retain(|id| doc.get(id).is_some());
        let ids: Vec<IdeaId> = self.doc.ids().to_vec();
        for id in ids {
            if let Some((x, y)) = self.pending.peek(&id) {
                self.doc.set_position(&id, Point::new(x, y));
            }
        }
        self.input = InputState::Idle;
        self.ui.marquee = None;
    }

    /// Apply a data-layer broadcast: idea created.
    pub fn apply_create(&mut self, idea: Idea) {
        self.doc.insert(idea);
    }

    /// Apply a data-layer broadcast: idea fields changed. An explicit
    /// position is already stored, so any write still waiting for the card
    /// is dropped rather than sent over it.
    pub fn apply_update(&mut self, id: &IdeaId, fields: &PartialIdea) -> bool {
        if fields.x.is_some() || fields.y.is_some() {
            self.pending.cancel(id);
        }
        self.doc.apply_partial(id, fields)
    }

    /// Apply a data-layer broadcast: idea deleted.
    pub fn apply_delete(&mut self, id: &IdeaId) {
        self.doc.remove(id);
        self.pending.cancel(id);
        self.ui.selected.remove(id);
        if self.gesture_involves(id) {
            self.input = InputState::Idle;
        }
    }

    /// Apply a data-layer broadcast: group deleted. Its ideas become ungrouped.
    pub fn apply_group_delete(&mut self, id: &GroupId) -> Vec<IdeaId> {
        self.doc.remove_group(id)
    }

    fn gesture_involves(&self, id: &IdeaId) -> bool {
        match &self.input {
            InputState::Pending { origins, .. } | InputState::DraggingMulti { origins, .. } => {
                origins.iter().any(|o| o.id == *id)
            }
            InputState::DraggingSingle { card, .. } => card.id == *id,
            _ => false,
        }
    }

    // --- Viewport ---

    /// Update viewport dimensions in CSS pixels.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport_width = width.max(0.0);
        self.viewport_height = height.max(0.0);
    }

    fn viewport_center(&self) -> Point {
        Point::new(self.viewport_width * 0.5, self.viewport_height * 0.5)
    }

    fn camera_changed(&self) -> Action {
        Action::CameraChanged { pan_x: self.camera.pan_x, pan_y: self.camera.pan_y, zoom: self.camera.zoom }
    }

    /// Set the zoom while keeping the world point at the viewport centre fixed.
    pub fn zoom_to(&mut self, zoom: f64) -> Vec<Action> {
        let center = self.viewport_center();
        if self.camera.zoom_at(center, zoom, self.config.min_zoom, self.config.max_zoom) {
            vec![self.camera_changed(), Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }

    /// Pan so `world` sits at the viewport centre.
    pub fn center_on(&mut self, world: Point) -> Vec<Action> {
        let center = self.viewport_center();
        self.camera.align(world, center);
        vec![self.camera_changed(), Action::RenderNeeded]
    }

    /// Back to zoom 1 with the world origin at the top-left corner.
    pub fn reset_view(&mut self) -> Vec<Action> {
        self.camera = Camera::default();
        vec![self.camera_changed(), Action::RenderNeeded]
    }

    // --- Selection ---

    fn selection_changed(&self) -> Action {
        Action::SelectionChanged { ids: self.selection() }
    }

    /// Replace the selection. Unknown ids are ignored.
    pub fn set_selection(&mut self, ids: &[IdeaId]) -> Vec<Action> {
        let doc = &self.doc;
        let next: BTreeSet<IdeaId> = ids.iter().copied().filter(|id| doc.get(id).is_some()).collect();
        if next == self.ui.selected {
            return Vec::new();
        }
        self.ui.selected = next;
        vec![self.selection_changed(), Action::RenderNeeded]
    }

    /// Select every card.
    pub fn select_all(&mut self) -> Vec<Action> {
        let ids = self.doc.ids().to_vec();
        self.set_selection(&ids)
    }

    /// Deselect everything.
    pub fn clear_selection(&mut self) -> Vec<Action> {
        self.set_selection(&[])
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen: Point, button: Button, modifiers: Modifiers, now_ms: f64) -> Vec<Action> {
        if !matches!(self.input, InputState::Idle) {
            // A previous gesture never saw its pointer-up; settle it first.
            let mut actions = self.cancel_gesture(now_ms);
            actions.extend(self.on_pointer_down(screen, button, modifiers, now_ms));
            return actions;
        }

        match button {
            Button::Secondary => Vec::new(),
            Button::Middle => {
                self.input = InputState::Panning { start_screen: screen, last_screen: screen, moved: false };
                Vec::new()
            }
            Button::Primary => self.primary_down(screen, modifiers),
        }
    }

    fn primary_down(&mut self, screen: Point, modifiers: Modifiers) -> Vec<Action> {
        let hit = hit::hit_test(screen, &self.doc, self.config.card, &self.camera);

        let Some(id) = hit else {
            if modifiers.selecting() {
                self.input = InputState::RectSelecting { start_screen: screen, current_screen: screen, additive: modifiers.shift };
                self.ui.marquee = Some(Rect::from_corners(screen, screen));
                return vec![Action::RenderNeeded];
            }
            self.input = InputState::Panning { start_screen: screen, last_screen: screen, moved: false };
            return Vec::new();
        };

        if modifiers.selecting() {
            if !self.ui.selected.remove(&id) {
                self.ui.selected.insert(id);
            }
            return vec![self.selection_changed(), Action::RenderNeeded];
        }

        let mut actions = Vec::new();
        if !self.ui.selected.contains(&id) {
            self.ui.selected.clear();
            self.ui.selected.insert(id);
            actions.push(self.selection_changed());
            actions.push(Action::RenderNeeded);
        }

        self.input = InputState::Pending {
            id,
            start_screen: screen,
            start_world: self.camera.screen_to_world(screen),
            origins: self.drag_origins(id),
        };
        actions
    }

    /// Starting positions of every card that moves with `primary`, primary first.
    fn drag_origins(&self, primary: IdeaId) -> Vec<DragOrigin> {
        let mut origins = Vec::new();
        if let Some(origin) = self.doc.position(&primary) {
            origins.push(DragOrigin { id: primary, origin });
        }
        for id in &self.ui.selected {
            if *id == primary {
                continue;
            }
            if let Some(origin) = self.doc.position(id) {
                origins.push(DragOrigin { id: *id, origin });
            }
        }
        origins
    }

    pub fn on_pointer_move(&mut self, screen: Point, _modifiers: Modifiers, now_ms: f64) -> Vec<Action> {
        let mut actions = Vec::new();
        let state = mem::take(&mut self.input);

        self.input = match state {
            InputState::Idle => InputState::Idle,
            InputState::Pending { id, start_screen, start_world, origins } => {
                if start_screen.distance(screen) <= self.config.drag_threshold_px {
                    InputState::Pending { id, start_screen, start_world, origins }
                } else {
                    actions.push(Action::DragStarted { ids: origins.iter().map(|o| o.id).collect() });
                    if self.drag_to(&origins, start_world, screen, now_ms) {
                        push_render(&mut actions);
                    }
                    match origins.as_slice() {
                        [card] => InputState::DraggingSingle { start_world, card: *card },
                        _ => InputState::DraggingMulti { start_world, origins },
                    }
                }
            }
            InputState::DraggingSingle { start_world, card } => {
                if self.drag_to(&[card], start_world, screen, now_ms) {
                    push_render(&mut actions);
                }
                InputState::DraggingSingle { start_world, card }
            }
            InputState::DraggingMulti { start_world, origins } => {
                if self.drag_to(&origins, start_world, screen, now_ms) {
                    push_render(&mut actions);
                }
                InputState::DraggingMulti { start_world, origins }
            }
            InputState::RectSelecting { start_screen, additive, .. } => {
                self.ui.marquee = Some(Rect::from_corners(start_screen, screen));
                push_render(&mut actions);
                InputState::RectSelecting { start_screen, current_screen: screen, additive }
            }
            InputState::Panning { start_screen, last_screen, moved } => {
                let moved = moved || start_screen.distance(screen) > self.config.drag_threshold_px;
                let (dx, dy) = (screen.x - last_screen.x, screen.y - last_screen.y);
                if dx.abs() > f64::EPSILON || dy.abs() > f64::EPSILON {
                    self.camera.pan_by(dx, dy);
                    actions.push(self.camera_changed());
                    push_render(&mut actions);
                }
                InputState::Panning { start_screen, last_screen: screen, moved }
            }
            pinching @ InputState::Pinching { .. } => pinching,
        };

        actions
    }

    /// Place every card at its origin plus the pointer's world-space travel.
    /// Returns `true` if anything moved.
    fn drag_to(&mut self, origins: &[DragOrigin], start_world: Point, screen: Point, now_ms: f64) -> bool {
        let current = self.camera.screen_to_world(screen);
        let (dx, dy) = (current.x - start_world.x, current.y - start_world.y);
        let mut moved = false;
        for card in origins {
            let target = Point::new(card.origin.x + dx, card.origin.y + dy);
            if self.doc.position(&card.id).is_some_and(|p| p != target) {
                self.doc.set_position(&card.id, target);
                self.pending.schedule(card.id, target.x, target.y, now_ms);
                moved = true;
            }
        }
        moved
    }

    pub fn on_pointer_up(&mut self, screen: Point, button: Button, modifiers: Modifiers, now_ms: f64) -> Vec<Action> {
        let mut actions = self.on_pointer_move(screen, modifiers, now_ms);
        let state = mem::take(&mut self.input);

        match state {
            InputState::Idle => {}
            InputState::Pending { id, .. } => actions.push(Action::Clicked { id }),
            InputState::DraggingSingle { card, .. } => actions.extend(self.end_drag(&[card])),
            InputState::DraggingMulti { origins, .. } => actions.extend(self.end_drag(&origins)),
            InputState::RectSelecting { start_screen, additive, .. } => {
                let marquee = Rect::from_corners(start_screen, screen);
                let hits = hit::ideas_in_rect(&marquee, &self.doc, self.config.card, &self.camera);
                if !additive {
                    self.ui.selected.clear();
                }
                self.ui.selected.extend(hits.iter().copied());
                self.ui.marquee = None;
                actions.push(Action::RectSelectionCompleted { ids: hits });
                actions.push(self.selection_changed());
                push_render(&mut actions);
            }
            InputState::Panning { moved, .. } => {
                if !moved && button == Button::Primary && !self.ui.selected.is_empty() {
                    self.ui.selected.clear();
                    actions.push(self.selection_changed());
                    push_render(&mut actions);
                }
            }
            pinching @ InputState::Pinching { .. } => self.input = pinching,
        }

        actions
    }

    /// Report final positions and write every dragged card now as one batch.
    fn end_drag(&mut self, origins: &[DragOrigin]) -> Vec<Action> {
        let mut actions = Vec::new();
        for card in origins {
            if let Some(pos) = self.doc.position(&card.id) {
                actions.push(Action::DragEnded { id: card.id, x: pos.x, y: pos.y });
            }
        }
        let ids: Vec<IdeaId> = origins.iter().map(|o| o.id).collect();
        let updates = self.pending.take_ids(&ids);
        if !updates.is_empty() {
            actions.push(Action::PersistPositions { updates });
        }
        push_render(&mut actions);
        actions
    }

    /// Abort whatever gesture is active. A cancelled drag puts cards back
    /// where they started and queues those positions, superseding the
    /// writes the drag scheduled.
    pub fn cancel_gesture(&mut self, now_ms: f64) -> Vec<Action> {
        let state = mem::take(&mut self.input);
        let origins = match state {
            InputState::DraggingSingle { card, .. } => vec![card],
            InputState::DraggingMulti { origins, .. } => origins,
            InputState::RectSelecting { .. } => {
                self.ui.marquee = None;
                return vec![Action::RenderNeeded];
            }
            _ => return Vec::new(),
        };

        let mut actions = Vec::new();
        for card in &origins {
            if self.doc.set_position(&card.id, card.origin) {
                self.pending.schedule(card.id, card.origin.x, card.origin.y, now_ms);
                actions.push(Action::DragEnded { id: card.id, x: card.origin.x, y: card.origin.y });
            }
        }
        push_render(&mut actions);
        actions
    }

    pub fn on_wheel(&mut self, screen: Point, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        if !modifiers.command() && delta.dx.abs() > f64::EPSILON {
            self.camera.pan_by(-delta.dx, -delta.dy);
            return vec![self.camera_changed(), Action::RenderNeeded];
        }

        let factor = if delta.dy < 0.0 {
            self.config.zoom_step
        } else if delta.dy > 0.0 {
            1.0 / self.config.zoom_step
        } else {
            return Vec::new();
        };

        if self.camera.zoom_by(screen, factor, self.config.min_zoom, self.config.max_zoom) {
            vec![self.camera_changed(), Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }

    // --- Touch ---

    /// A finger touched down. `touches` holds every finger currently on the canvas.
    pub fn on_touch_start(&mut self, touches: &[Point], now_ms: f64) -> Vec<Action> {
        match touches {
            [] => Vec::new(),
            [single] => self.on_pointer_down(*single, Button::Primary, Modifiers::default(), now_ms),
            [a, b, ..] => {
                let state = mem::take(&mut self.input);
                let actions = match state {
                    InputState::DraggingSingle { card, .. } => self.end_drag(&[card]),
                    InputState::DraggingMulti { origins, .. } => self.end_drag(&origins),
                    InputState::RectSelecting { .. } => {
                        self.ui.marquee = None;
                        vec![Action::RenderNeeded]
                    }
                    _ => Vec::new(),
                };
                self.input = InputState::Pinching { last_distance: a.distance(*b), last_center: a.midpoint(*b) };
                actions
            }
        }
    }

    /// Fingers moved. Two fingers pinch-zoom around their midpoint and pan
    /// with it; one finger behaves like the primary pointer.
    pub fn on_touch_move(&mut self, touches: &[Point], now_ms: f64) -> Vec<Action> {
        if let InputState::Pinching { last_distance, last_center } = self.input {
            let [a, b, ..] = touches else {
                return Vec::new();
            };
            let distance = a.distance(*b);
            let center = a.midpoint(*b);
            let mut changed = false;
            if last_distance > f64::EPSILON && distance > f64::EPSILON {
                changed |= self.camera.zoom_by(
                    last_center,
                    distance / last_distance,
                    self.config.min_zoom,
                    self.config.max_zoom,
                );
            }
            let (dx, dy) = (center.x - last_center.x, center.y - last_center.y);
            if dx.abs() > f64::EPSILON || dy.abs() > f64::EPSILON {
                self.camera.pan_by(dx, dy);
                changed = true;
            }
            self.input = InputState::Pinching { last_distance: distance, last_center: center };
            return if changed { vec![self.camera_changed(), Action::RenderNeeded] } else { Vec::new() };
        }

        match touches.first() {
            Some(single) => self.on_pointer_move(*single, Modifiers::default(), now_ms),
            None => Vec::new(),
        }
    }

    /// A finger lifted at `ended`; `remaining` fingers are still down.
    pub fn on_touch_end(&mut self, ended: Point, remaining: usize, now_ms: f64) -> Vec<Action> {
        if matches!(self.input, InputState::Pinching { .. }) {
            if remaining < 2 {
                self.input = InputState::Idle;
            }
            return Vec::new();
        }
        if remaining == 0 {
            return self.on_pointer_up(ended, Button::Primary, Modifiers::default(), now_ms);
        }
        Vec::new()
    }

    // --- Keyboard ---

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers, now_ms: f64) -> Vec<Action> {
        match key.0.as_str() {
            "Escape" => {
                if matches!(self.input, InputState::Idle) {
                    self.clear_selection()
                } else {
                    self.cancel_gesture(now_ms)
                }
            }
            "Delete" | "Backspace" => {
                if self.ui.selected.is_empty() || !matches!(self.input, InputState::Idle) {
                    Vec::new()
                } else {
                    vec![Action::DeleteRequested { ids: self.selection() }]
                }
            }
            "a" | "A" if modifiers.command() => self.select_all(),
            "ArrowLeft" => self.nudge(-1.0, 0.0, modifiers, now_ms),
            "ArrowRight" => self.nudge(1.0, 0.0, modifiers, now_ms),
            "ArrowUp" => self.nudge(0.0, -1.0, modifiers, now_ms),
            "ArrowDown" => self.nudge(0.0, 1.0, modifiers, now_ms),
            _ => Vec::new(),
        }
    }

    /// Move the selection by one nudge step (ten with shift). Writes go
    /// through the debounce slots and come out of [`EngineCore::tick`].
    fn nudge(&mut self, dir_x: f64, dir_y: f64, modifiers: Modifiers, now_ms: f64) -> Vec<Action> {
        if !matches!(self.input, InputState::Idle) || self.ui.selected.is_empty() {
            return Vec::new();
        }
        let step = if modifiers.shift { self.config.nudge_step * 10.0 } else { self.config.nudge_step };
        let ids: Vec<IdeaId> = self.ui.selected.iter().copied().collect();
        for id in ids {
            if let Some(pos) = self.doc.position(&id) {
                let target = Point::new(pos.x + dir_x * step, pos.y + dir_y * step);
                self.doc.set_position(&id, target);
                self.pending.schedule(id, target.x, target.y, now_ms);
            }
        }
        vec![Action::RenderNeeded]
    }

    // --- Persistence ---

    /// Emit every write whose quiet period has elapsed, as one batch.
    pub fn tick(&mut self, now_ms: f64) -> Vec<Action> {
        if self.pending.is_empty() {
            return Vec::new();
        }
        let updates = self.pending.take_due(now_ms);
        if updates.is_empty() {
            Vec::new()
        } else {
            vec![Action::PersistPositions { updates }]
        }
    }

    /// Emit every pending write now, regardless of deadlines.
    pub fn flush_pending(&mut self) -> Vec<Action> {
        let updates = self.pending.take_all();
        if updates.is_empty() {
            Vec::new()
        } else {
            vec![Action::PersistPositions { updates }]
        }
    }

    /// When the host should next call [`EngineCore::tick`].
    #[must_use]
    pub fn next_due_ms(&self) -> Option<f64> {
        self.pending.next_due_ms()
    }

    // --- Organize ---

    /// Lay cards out by group and persist the new positions immediately.
    pub fn organize(&mut self, now_ms: f64) -> Vec<Action> {
        if !matches!(self.input, InputState::Idle) {
            return Vec::new();
        }
        let placed = layout::organize(&self.doc, self.config.card, self.config.layout_gap);
        if placed.is_empty() {
            return Vec::new();
        }
        for update in &placed {
            self.doc.set_position(&update.id, Point::new(update.x, update.y));
            self.pending.schedule(update.id, update.x, update.y, now_ms);
        }
        let ids: Vec<IdeaId> = placed.iter().map(|u| u.id).collect();
        let updates = self.pending.take_ids(&ids);
        vec![Action::PersistPositions { updates }, Action::RenderNeeded]
    }

    // --- Queries ---

    /// Ids of the selected cards, in id order.
    #[must_use]
    pub fn selection(&self) -> Vec<IdeaId> {
        self.ui.selected.iter().copied().collect()
    }

    #[must_use]
    pub fn is_selected(&self, id: &IdeaId) -> bool {
        self.ui.selected.contains(id)
    }

    /// The current camera state.
    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    /// Look up an idea by ID.
    #[must_use]
    pub fn object(&self, id: &IdeaId) -> Option<&Idea> {
        self.doc.get(id)
    }

    /// Current marquee in screen space, while rectangle-selecting.
    #[must_use]
    pub fn marquee(&self) -> Option<Rect> {
        self.ui.marquee
    }
}
