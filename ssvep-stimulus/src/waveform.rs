use crate::checkerboard::Checkerboard;
use crate::error::StimulusError;
use crate::screen::Screen;
use crate::stimulus::Stimulus;
use serde::{Deserialize, Serialize};
use ssvep_core::{Canvas, Color, PresentError, TriggerCode};
use ssvep_vsync::TriggerRecord;
use std::f64::consts::PI;

/// Contrast modulation of a board over time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Waveform {
    /// Smooth contrast sweep, gamma-compensated
    #[default]
    Sine,
    /// Hard black/white reversal
    Square,
}

impl Waveform {
    /// Check colors `(color1, color2)` at `elapsed` seconds into the epoch.
    ///
    /// `frequency` counts contrast reversals per second, i.e. half cycles of
    /// the underlying cosine.
    pub fn colors(self, frequency: f64, elapsed: f64, inv_gamma: f64) -> (Color, Color) {
        let cos_term = (frequency * PI * elapsed).cos() / 2.0;
        match self {
            Waveform::Sine => {
                let c1 = (0.5 - cos_term).max(0.0).powf(inv_gamma) as f32;
                let c2 = (0.5 + cos_term).max(0.0).powf(inv_gamma) as f32;
                (Color::gray(c1), Color::gray(c2))
            }
            Waveform::Square => {
                if -cos_term > 0.0 {
                    (Color::WHITE, Color::BLACK)
                } else {
                    (Color::BLACK, Color::WHITE)
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ContrastBoard {
    pub board: Checkerboard,
    pub origin: (f32, f32),
    pub frequency: f64,
    pub waveform: Waveform,
}

/// Boards whose check colors follow a waveform of elapsed time.
///
/// Colors change continuously, so every iteration is rendered.
#[derive(Debug, Clone)]
pub struct ContrastFlasher {
    screen: Screen,
    boards: Vec<ContrastBoard>,
    colors: Vec<(Color, Color)>,
    inv_gamma: f64,
    started_at: f64,
}

impl ContrastFlasher {
    pub fn new(
        screen: Screen,
        boards: Vec<ContrastBoard>,
        inv_gamma: f64,
    ) -> Result<Self, StimulusError> {
        if !(inv_gamma.is_finite() && inv_gamma > 0.0) {
            return Err(PresentError::invalid("inv_gamma", format!("must be positive, got {inv_gamma}")).into());
        }
        if let Some(bad) = boards
            .iter()
            .find(|b| !(b.frequency.is_finite() && b.frequency > 0.0))
        {
            return Err(ssvep_timing::TimingError::InvalidFrequency(bad.frequency).into());
        }
        let mut flasher = Self {
            colors: Vec::with_capacity(boards.len()),
            screen,
            boards,
            inv_gamma,
            started_at: 0.0,
        };
        flasher.recompute(0.0);
        Ok(flasher)
    }

    /// One centred sine-modulated board
    pub fn single(
        screen: Screen,
        board: Checkerboard,
        frequency: f64,
        inv_gamma: f64,
    ) -> Result<Self, StimulusError> {
        let origin = board.centered_at(0.0, 0.0);
        Self::new(
            screen,
            vec![ContrastBoard {
                board,
                origin,
                frequency,
                waveform: Waveform::Sine,
            }],
            inv_gamma,
        )
    }

    /// Sine boards at `∓0.7 * screen_right` and a square-wave centre board
    pub fn triple(
        screen: Screen,
        board: Checkerboard,
        right_edge: f32,
        rates: (f64, f64),
        center: Option<(Checkerboard, f64)>,
        inv_gamma: f64,
    ) -> Result<Self, StimulusError> {
        let offset = 0.7 * right_edge;
        let mut boards = vec![
            ContrastBoard {
                origin: board.centered_at(-offset, 0.0),
                board: board.clone(),
                frequency: rates.0,
                waveform: Waveform::Sine,
            },
            ContrastBoard {
                origin: board.centered_at(offset, 0.0),
                board,
                frequency: rates.1,
                waveform: Waveform::Sine,
            },
        ];
        if let Some((center_board, frequency)) = center {
            boards.push(ContrastBoard {
                origin: center_board.centered_at(0.0, 0.0),
                board: center_board,
                frequency,
                waveform: Waveform::Square,
            });
        }
        Self::new(screen, boards, inv_gamma)
    }

    pub fn colors(&self) -> &[(Color, Color)] {
        &self.colors
    }

    fn recompute(&mut self, elapsed: f64) {
        self.colors.clear();
        for b in &self.boards {
            self.colors
                .push(b.waveform.colors(b.frequency, elapsed, self.inv_gamma));
        }
    }
}

impl Stimulus for ContrastFlasher {
    fn start_epoch(&mut self, t: f64, code: TriggerCode) {
        self.screen.start_epoch(t, code);
        self.started_at = t;
        self.recompute(0.0);
    }

    fn update(&mut self, t: f64, dt: f64) {
        self.screen.update(t, dt);
        self.recompute(t - self.started_at);
    }

    fn ready_to_render(&self) -> bool {
        true
    }

    fn render(&self, canvas: &mut dyn Canvas) {
        self.screen.render_background(canvas);
        for (b, &(c1, c2)) in self.boards.iter().zip(&self.colors) {
            b.board.render_with_colors(canvas, b.origin, c1, c2);
        }
        self.screen.render_overlay(canvas);
    }

    fn abandon(&mut self) {
        self.screen.abandon();
    }

    fn completed_trigger(&self) -> Option<TriggerRecord> {
        self.screen.completed_trigger()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ssvep_core::{CommandCanvas, ScreenBounds};
    use ssvep_vsync::{SyncConfig, SyncPatch};

    fn flasher(board: Checkerboard) -> ContrastFlasher {
        let patch = SyncPatch::new(&SyncConfig::default(), ScreenBounds::default()).unwrap();
        let screen = Screen::new(Color::NEUTRAL_GRAY, patch);
        ContrastFlasher::single(screen, board, 10.0, 0.43).unwrap()
    }

    fn red_at(canvas: &CommandCanvas, x: f32, y: f32) -> f32 {
        canvas.color_at(x, y).unwrap().r
    }

    #[test]
    fn colors_follow_time_since_epoch_start() {
        let mut f = flasher(Checkerboard::new(2, 0.25).unwrap());
        assert!(f.ready_to_render());
        f.start_epoch(1.0, TriggerCode::new(3).unwrap());
        assert!(f.ready_to_render());

        let mut canvas = CommandCanvas::new(ScreenBounds::default());
        f.render(&mut canvas);
        assert_eq!(canvas.color_at(-0.1, -0.1), Some(Color::BLACK));
        assert_eq!(canvas.color_at(0.1, -0.1), Some(Color::WHITE));

        // one reversal after the epoch started, not after t = 0
        f.update(1.1, 0.1);
        assert!(f.ready_to_render());
        let mut canvas = CommandCanvas::new(ScreenBounds::default());
        f.render(&mut canvas);
        assert!((red_at(&canvas, -0.1, -0.1) - 1.0).abs() < 1e-5);
        assert!(red_at(&canvas, 0.1, -0.1) < 1e-3);

        f.update(1.15, 0.05);
        assert!(f.ready_to_render());
        let expected = 0.5f64.powf(0.43) as f32;
        assert!((f.colors()[0].0.r - expected).abs() < 1e-5);
    }

    #[test]
    fn sync_patch_is_drawn_over_the_boards() {
        // one check per quadrant of the screen, so the patch corner sits on color2
        let mut f = flasher(Checkerboard::new(2, 1.0).unwrap());
        f.start_epoch(0.0, TriggerCode::new(0b0011).unwrap());
        let mut canvas = CommandCanvas::new(ScreenBounds::default());
        f.render(&mut canvas);

        assert_eq!(canvas.color_at(0.5, -0.5), Some(Color::WHITE));
        assert_eq!(canvas.color_at(0.95, -0.95), Some(Color::WHITE)); // bit 0
        assert_eq!(canvas.color_at(0.85, -0.85), Some(Color::BLACK)); // bit 2
        assert_eq!(canvas.color_at(0.95, -0.85), Some(Color::BLACK)); // bit 3
        assert!(f.completed_trigger().is_some());
    }

    #[test]
    fn sine_starts_at_full_contrast() {
        let (c1, c2) = Waveform::Sine.colors(10.0, 0.0, 0.43);
        assert_eq!(c1, Color::BLACK);
        assert_eq!(c2, Color::WHITE);

        // one reversal later the colors have swapped
        let (c1, c2) = Waveform::Sine.colors(10.0, 0.1, 0.43);
        assert!((c1.r - 1.0).abs() < 1e-5);
        assert!(c2.r.abs() < 1e-3);
    }

    #[test]
    fn sine_midpoint_is_gamma_compensated_gray() {
        let (c1, c2) = Waveform::Sine.colors(10.0, 0.05, 0.43);
        let expected = 0.5f64.powf(0.43) as f32;
        assert!((c1.r - expected).abs() < 1e-5);
        assert!((c2.r - expected).abs() < 1e-5);
    }

    #[test]
    fn square_switches_each_half_cycle() {
        assert_eq!(
            Waveform::Square.colors(5.0, 0.0, 0.43),
            (Color::BLACK, Color::WHITE)
        );
        assert_eq!(
            Waveform::Square.colors(5.0, 0.15, 0.43),
            (Color::WHITE, Color::BLACK)
        );
        assert_eq!(
            Waveform::Square.colors(5.0, 0.45, 0.43),
            (Color::BLACK, Color::WHITE)
        );
    }
}
