use crate::cli::{RecordArgs, RecordStimulus};
use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use image::RgbaImage;
use ssvep_core::{ScreenBounds, TriggerCode};
use ssvep_render::{HeadlessDisplay, SkiaCanvas};
use ssvep_stimulus::recorder::FrameSinkError;
use ssvep_stimulus::{
    Checkerboard, CheckerboardFlasher, ContrastFlasher, MultiBoardFlasher, RecordOptions,
    Recorder, Screen, Stimulus,
};
use ssvep_vsync::SyncPatch;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

/// Renders the chosen stimulus offline and writes `frame_00000.png`,
/// `frame_00001.png`, ... plus a `report.json` into `args.out`.
pub fn record_frames(config: &Config, args: &RecordArgs) -> Result<()> {
    let bounds = ScreenBounds::from_resolution(args.width, args.height, config.display.constrain_aspect);
    let mut display = HeadlessDisplay::new(args.width, args.height, bounds)?;
    let mut stimulus = build_stimulus(config, args, bounds)?;
    let recorder = Recorder::new(RecordOptions {
        duration: args.duration,
        frame_rate: args.frame_rate,
        code: TriggerCode::new(args.code)?,
        show: false,
    })?;

    fs::create_dir_all(&args.out)
        .with_context(|| format!("creating {}", args.out.display()))?;
    let out = args.out.as_path();
    let report = recorder.record(&mut display, stimulus.as_mut(), |index, _t, canvas: &SkiaCanvas| {
        save_frame(canvas, &out.join(format!("frame_{index:05}.png")))
    })?;

    let report_path = out.join("report.json");
    let file = File::create(&report_path)
        .with_context(|| format!("creating {}", report_path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &report)?;
    info!(
        frames = report.frames,
        outcome = ?report.outcome,
        out = %out.display(),
        "frames written"
    );
    Ok(())
}

fn save_frame(canvas: &SkiaCanvas, path: &Path) -> Result<(), FrameSinkError> {
    let pixmap: &tiny_skia::Pixmap = canvas.pixmap();
    let rgba: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    let image = RgbaImage::from_raw(pixmap.width(), pixmap.height(), rgba)
        .ok_or("frame buffer does not match the image size")?;
    image.save(path)?;
    Ok(())
}

fn build_stimulus(
    config: &Config,
    args: &RecordArgs,
    bounds: ScreenBounds,
) -> Result<Box<dyn Stimulus>> {
    let session = &config.session;
    let rate = |i: usize| -> Result<f64> {
        session
            .flash_rates
            .get(i)
            .or_else(|| session.flash_rates.first())
            .copied()
            .ok_or_else(|| anyhow!("no flash rates configured"))
    };
    let default_width = match args.stimulus {
        RecordStimulus::Reversal | RecordStimulus::Contrast => session.board_width,
        RecordStimulus::Dual => 0.9 * bounds.right,
        RecordStimulus::Triple | RecordStimulus::ContrastTriple => 0.6 * bounds.right,
    };
    let board = Checkerboard::with_board_width(session.nrows, args.board_width.unwrap_or(default_width))?
        .with_colors(session.check_color1, session.check_color2)
        .with_fixation_dot(session.show_fixation_dot);
    let screen = Screen::new(session.background, SyncPatch::new(&config.sync, bounds)?);

    let stimulus: Box<dyn Stimulus> = match args.stimulus {
        RecordStimulus::Reversal => Box::new(CheckerboardFlasher::new(screen, board, rate(0)?)?),
        RecordStimulus::Dual => Box::new(MultiBoardFlasher::dual(
            screen,
            board,
            bounds.right,
            rate(0)?,
            rate(1)?,
        )?),
        RecordStimulus::Triple => {
            let center = (board.clone(), rate(2)?);
            Box::new(MultiBoardFlasher::triple(
                screen,
                board,
                bounds.right,
                (rate(0)?, rate(1)?),
                Some(center),
            )?)
        }
        RecordStimulus::Contrast => Box::new(ContrastFlasher::single(
            screen,
            board,
            rate(0)?,
            session.inv_gamma,
        )?),
        RecordStimulus::ContrastTriple => {
            let center = (board.clone(), rate(2)?);
            Box::new(ContrastFlasher::triple(
                screen,
                board,
                bounds.right,
                (rate(0)?, rate(1)?),
                Some(center),
                session.inv_gamma,
            )?)
        }
    };
    Ok(stimulus)
}
