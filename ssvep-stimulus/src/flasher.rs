use crate::checkerboard::Checkerboard;
use crate::error::StimulusError;
use crate::screen::Screen;
use crate::stimulus::Stimulus;
use ssvep_core::{Canvas, TriggerCode};
use ssvep_timing::{PeriodicToggle, ToggleDiagnostics};
use ssvep_vsync::TriggerRecord;

/// Pattern-reversal checkerboard centred on the screen
#[derive(Debug, Clone)]
pub struct CheckerboardFlasher {
    screen: Screen,
    board: Checkerboard,
    origin: (f32, f32),
    toggle: PeriodicToggle,
    ready: bool,
}

impl CheckerboardFlasher {
    pub fn new(screen: Screen, board: Checkerboard, flash_rate: f64) -> Result<Self, StimulusError> {
        Ok(Self {
            origin: board.centered_at(0.0, 0.0),
            toggle: PeriodicToggle::binary(flash_rate)?,
            screen,
            board,
            ready: false,
        })
    }

    pub fn is_inverted(&self) -> bool {
        self.toggle.index() == 1
    }

    pub fn toggle(&self) -> &PeriodicToggle {
        &self.toggle
    }
}

impl Stimulus for CheckerboardFlasher {
    fn start_epoch(&mut self, t: f64, code: TriggerCode) {
        self.screen.start_epoch(t, code);
        self.toggle.start(t);
        self.ready = true;
    }

    fn update(&mut self, t: f64, dt: f64) {
        self.screen.update(t, dt);
        let flipped = self.toggle.update(t);
        self.ready = flipped || self.screen.ready_to_render();
    }

    fn ready_to_render(&self) -> bool {
        self.ready
    }

    fn render(&self, canvas: &mut dyn Canvas) {
        self.screen.render_background(canvas);
        self.board.render(canvas, self.origin, self.is_inverted());
        self.screen.render_overlay(canvas);
    }

    fn abandon(&mut self) {
        self.screen.abandon();
    }

    fn completed_trigger(&self) -> Option<TriggerRecord> {
        self.screen.completed_trigger()
    }

    fn diagnostics(&self, t: f64) -> Vec<ToggleDiagnostics> {
        vec![self.toggle.diagnostics("board", t)]
    }
}

#[derive(Debug, Clone)]
struct BoardSlot {
    label: String,
    board: Checkerboard,
    origin: (f32, f32),
    toggle: PeriodicToggle,
}

/// Several reversal boards, each on its own frequency.
///
/// Every board keeps a private toggle; a toggle on any of them triggers a
/// redraw of all of them.
#[derive(Debug, Clone)]
pub struct MultiBoardFlasher {
    screen: Screen,
    slots: Vec<BoardSlot>,
    ready: bool,
}

impl MultiBoardFlasher {
    pub fn new(
        screen: Screen,
        boards: Vec<(String, Checkerboard, (f32, f32), f64)>,
    ) -> Result<Self, StimulusError> {
        let slots = boards
            .into_iter()
            .map(|(label, board, origin, rate)| {
                Ok(BoardSlot {
                    label,
                    board,
                    origin,
                    toggle: PeriodicToggle::binary(rate)?,
                })
            })
            .collect::<Result<Vec<_>, StimulusError>>()?;
        Ok(Self {
            screen,
            slots,
            ready: false,
        })
    }

    /// Left and right boards, centred at `∓0.5 * screen_right`
    pub fn dual(
        screen: Screen,
        board: Checkerboard,
        right_edge: f32,
        rate_left: f64,
        rate_right: f64,
    ) -> Result<Self, StimulusError> {
        let offset = 0.5 * right_edge;
        Self::new(
            screen,
            vec![
                (String::from("left"), board.clone(), board.centered_at(-offset, 0.0), rate_left),
                (String::from("right"), board.clone(), board.centered_at(offset, 0.0), rate_right),
            ],
        )
    }

    /// Side boards at `∓0.7 * screen_right`, plus an optional centre board
    pub fn triple(
        screen: Screen,
        board: Checkerboard,
        right_edge: f32,
        rates: (f64, f64),
        center: Option<(Checkerboard, f64)>,
    ) -> Result<Self, StimulusError> {
        let offset = 0.7 * right_edge;
        let mut boards = vec![
            (String::from("left"), board.clone(), board.centered_at(-offset, 0.0), rates.0),
            (String::from("right"), board.clone(), board.centered_at(offset, 0.0), rates.1),
        ];
        if let Some((center_board, rate)) = center {
            let origin = center_board.centered_at(0.0, 0.0);
            boards.push((String::from("center"), center_board, origin, rate));
        }
        Self::new(screen, boards)
    }

    pub fn board_count(&self) -> usize {
        self.slots.len()
    }

    pub fn toggle(&self, index: usize) -> Option<&PeriodicToggle> {
        self.slots.get(index).map(|s| &s.toggle)
    }
}

impl Stimulus for MultiBoardFlasher {
    fn start_epoch(&mut self, t: f64, code: TriggerCode) {
        self.screen.start_epoch(t, code);
        for slot in &mut self.slots {
            slot.toggle.start(t);
        }
        self.ready = true;
    }

    fn update(&mut self, t: f64, dt: f64) {
        self.screen.update(t, dt);
        let mut any = self.screen.ready_to_render();
        for slot in &mut self.slots {
            // every toggle has to see every tick
            any |= slot.toggle.update(t);
        }
        self.ready = any;
    }

    fn ready_to_render(&self) -> bool {
        self.ready
    }

    fn render(&self, canvas: &mut dyn Canvas) {
        self.screen.render_background(canvas);
        for slot in &self.slots {
            slot.board
                .render(canvas, slot.origin, slot.toggle.index() == 1);
        }
        self.screen.render_overlay(canvas);
    }

    fn abandon(&mut self) {
        self.screen.abandon();
    }

    fn completed_trigger(&self) -> Option<TriggerRecord> {
        self.screen.completed_trigger()
    }

    fn diagnostics(&self, t: f64) -> Vec<ToggleDiagnostics> {
        self.slots
            .iter()
            .map(|s| s.toggle.diagnostics(s.label.clone(), t))
            .collect()
    }
}
