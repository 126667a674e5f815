pub mod runner;
pub mod state;

use crate::canvas::pixel::PixelCanvas;
use crate::canvas::Canvas;
use crate::config::RunnerConfig;
use crate::error::Result;
use crate::host::{
    EventKind, EventSource, FrameRequest, Host, HostEvent, Key, Listener, TerminalEvents, Tick,
};
use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use runner::{Background, RunnerLoop};
use std::io::{self, Stdout, Write};
use std::mem;
use std::time::Duration;

struct TerminalGuard
{
    stdout: Stdout,
}

impl TerminalGuard
{
    fn enter() -> io::Result<Self>
    {
        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, Hide)?;
        Ok(Self { stdout })
    }

    fn stdout(&mut self) -> &mut Stdout
    {
        &mut self.stdout
    }
}

impl Drop for TerminalGuard
{
    fn drop(&mut self)
    {
        let _ = execute!(self.stdout, Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Flow
{
    Continue,
    Quit,
}

/// A running game bound to its host registrations. Dropping the session
/// deregisters every listener and cancels the pending frame.
struct Session<R: Rng>
{
    runner: RunnerLoop<R>,
    canvas: PixelCanvas,
    _key_down: Listener,
    _key_up: Listener,
    _resize: Listener,
    pending_frame: FrameRequest,
}

impl<R: Rng> Session<R>
{
    fn start<S: EventSource>(host: &Host<S>, canvas: PixelCanvas, runner: RunnerLoop<R>) -> Self
    {
        Self {
            runner,
            canvas,
            _key_down: host.listen(EventKind::KeyDown),
            _key_up: host.listen(EventKind::KeyUp),
            _resize: host.listen(EventKind::Resize),
            pending_frame: host.request_animation_frame(),
        }
    }

    fn handle_event(&mut self, event: HostEvent) -> Flow
    {
        match event {
            HostEvent::KeyDown { key: Key::Escape, .. } => return Flow::Quit,
            HostEvent::KeyDown {
                key: Key::Char('c'),
                ctrl: true,
            } => return Flow::Quit,
            HostEvent::KeyDown { key, .. } => self.runner.key_down(&key),
            HostEvent::KeyUp(key) => self.runner.key_up(&key),
            HostEvent::Resize { cols, rows } => {
                if cols == 0 || rows == 0 {
                    log::debug!("ignoring terminal resize to {cols}x{rows}");
                } else {
                    self.canvas.resize(cols, rows);
                    self.runner.resize(self.canvas.width(), self.canvas.height());
                }
            }
        }
        Flow::Continue
    }

    fn frame<S: EventSource>(
        &mut self,
        host: &Host<S>,
        timestamp_ms: f64,
        out: &mut impl Write,
    ) -> io::Result<()>
    {
        self.runner.frame(&mut self.canvas, timestamp_ms);
        // The fired request is stale, so dropping it leaves the new one pending.
        drop(mem::replace(&mut self.pending_frame, host.request_animation_frame()));
        self.canvas.present(out)
    }
}

fn drive<S: EventSource, R: Rng>(
    host: &mut Host<S>,
    session: &mut Session<R>,
    out: &mut impl Write,
) -> Result<()>
{
    loop {
        match host.next_tick()? {
            Tick::Event(event) => {
                if session.handle_event(event) == Flow::Quit {
                    return Ok(());
                }
            }
            Tick::Frame(timestamp_ms) => session.frame(host, timestamp_ms, out)?,
            Tick::Idle => return Ok(()),
        }
    }
}

pub fn run_with_config(config: &RunnerConfig) -> Result<()>
{
    let mut term = TerminalGuard::enter()?;
    let (cols, rows) = terminal::size()?;
    let canvas = PixelCanvas::new(cols, rows, config.scale);
    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let background = if config.gradient_background {
        Background::Gradient
    } else {
        Background::GradientString
    };
    let runner =
        RunnerLoop::new(canvas.width(), canvas.height(), rng)?.with_background(background);
    log::info!(
        "starting Frost Runner on {cols}x{rows} cells ({}x{} px)",
        canvas.width(),
        canvas.height()
    );

    let mut host = Host::new(TerminalEvents::new(), Duration::from_millis(config.frame_ms));
    let mut session = Session::start(&host, canvas, runner);
    let result = drive(&mut host, &mut session, term.stdout());
    let score = session.runner.stats().score;
    drop(session);
    log::info!("Frost Runner closed at score {score}");
    result
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::host::ScriptedEvents;
    use rand::rngs::mock::StepRng;

    fn setup(events: Vec<HostEvent>) -> (Host<ScriptedEvents>, Session<StepRng>)
    {
        let host = Host::new(ScriptedEvents::new(events), Duration::ZERO);
        let canvas = PixelCanvas::new(80, 24, 8.0);
        let rng = StepRng::new(u64::MAX, 0);
        let runner = RunnerLoop::new(canvas.width(), canvas.height(), rng).unwrap();
        let session = Session::start(&host, canvas, runner);
        (host, session)
    }

    fn key_down(key: Key) -> HostEvent
    {
        HostEvent::KeyDown { key, ctrl: false }
    }

    #[test]
    fn test_session_registers_and_releases()
    {
        let (host, session) = setup(Vec::new());
        assert_eq!(host.listener_count(), 3);
        assert!(host.frame_pending());

        drop(session);
        assert_eq!(host.listener_count(), 0);
        assert!(!host.frame_pending());
    }

    #[test]
    fn test_escape_quits_and_teardown_runs()
    {
        let (mut host, mut session) = setup(vec![
            key_down(Key::Space),
            key_down(Key::Escape),
            key_down(Key::Space),
        ]);
        let mut out = Vec::new();
        drive(&mut host, &mut session, &mut out).unwrap();
        assert!(!host.source_mut().is_empty());

        drop(session);
        assert_eq!(host.listener_count(), 0);
        assert!(!host.frame_pending());
    }

    #[test]
    fn test_ctrl_c_quits()
    {
        let (mut host, mut session) = setup(vec![HostEvent::KeyDown {
            key: Key::Char('c'),
            ctrl: true,
        }]);
        let mut out = Vec::new();
        drive(&mut host, &mut session, &mut out).unwrap();
        assert!(session.runner.is_running());
    }

    #[test]
    fn test_frames_rescheduled_and_presented()
    {
        let (host, mut session) = setup(Vec::new());
        let mut out = Vec::new();
        session.frame(&host, 0.0, &mut out).unwrap();
        session.frame(&host, 16.0, &mut out).unwrap();

        assert_eq!(session.runner.stats().score, 2);
        assert!(host.frame_pending());
        assert!(!out.is_empty());
    }

    #[test]
    fn test_resize_updates_canvas_and_runner()
    {
        let (_host, mut session) = setup(Vec::new());
        session.handle_event(HostEvent::Resize { cols: 50, rows: 20 });
        assert_eq!(session.canvas.cell_size(), (50, 20));
        assert_eq!(session.runner.viewport().width, 400.0);
        assert_eq!(session.runner.viewport().height, 320.0);

        session.handle_event(HostEvent::Resize { cols: 0, rows: 20 });
        assert_eq!(session.canvas.cell_size(), (50, 20));
        assert_eq!(session.runner.viewport().width, 400.0);
    }

    #[test]
    fn test_restart_key_routed()
    {
        let (host, mut session) = setup(Vec::new());
        let mut out = Vec::new();
        for _ in 0..5 {
            session.frame(&host, 0.0, &mut out).unwrap();
        }
        session.handle_event(key_down(Key::Char('r')));
        assert_eq!(session.runner.stats().score, 0);
    }
}
