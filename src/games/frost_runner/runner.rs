use super::state::{InputState, Obstacle, Player, RunStats, SPAWN_CHANCE, Viewport};
use crate::canvas::{Canvas, Color, TextAlign};
use crate::error::{FrostError, Result};
use crate::host::Key;
use rand::Rng;

const BACKGROUND_STYLE: &str = "linear-gradient(135deg, #1a1a2e, #16213e)";
const GRADIENT_TOP: &str = "#1a1a2e";
const GRADIENT_BOTTOM: &str = "#16213e";
const STREAK_STYLE: &str = "#00ccff20";
const GROUND_STYLE: &str = "#00ccff";
const PLAYER_STYLE: &str = "#ff6b6b";
const OBSTACLE_STYLE: &str = "#ffd93d";
const TEXT_STYLE: &str = "#ffffff";
const OVERLAY_STYLE: &str = "rgba(0, 0, 0, 0.8)";
const GRADIENT_BANDS: usize = 16;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Background
{
    /// Assigns the CSS gradient string as the fill style. Canvases reject it,
    /// so the full-surface fill reuses whatever fill style was set last.
    #[default]
    GradientString,
    /// Paints an actual top-to-bottom gradient.
    Gradient,
}

pub struct RunnerLoop<R: Rng>
{
    viewport: Viewport,
    player: Player,
    obstacles: Vec<Obstacle>,
    stats: RunStats,
    running: bool,
    input: InputState,
    background: Background,
    rng: R,
}

impl<R: Rng> RunnerLoop<R>
{
    pub fn new(width: f64, height: f64, rng: R) -> Result<Self>
    {
        let viewport =
            Viewport::new(width, height).ok_or(FrostError::SurfaceUnavailable { width, height })?;
        Ok(Self {
            viewport,
            player: Player::spawn(viewport),
            obstacles: Vec::new(),
            stats: RunStats::default(),
            running: true,
            input: InputState::default(),
            background: Background::default(),
            rng,
        })
    }

    pub fn with_background(mut self, background: Background) -> Self
    {
        self.background = background;
        self
    }

    pub fn viewport(&self) -> Viewport
    {
        self.viewport
    }

    pub fn player(&self) -> &Player
    {
        &self.player
    }

    pub fn obstacles(&self) -> &[Obstacle]
    {
        &self.obstacles
    }

    pub fn stats(&self) -> RunStats
    {
        self.stats
    }

    pub fn is_running(&self) -> bool
    {
        self.running
    }

    pub fn input(&self) -> &InputState
    {
        &self.input
    }

    /// Applies a new surface size. Degenerate sizes are ignored and the
    /// previous viewport is kept; returns whether the size was applied.
    pub fn resize(&mut self, width: f64, height: f64) -> bool
    {
        match Viewport::new(width, height) {
            Some(viewport) => {
                self.viewport = viewport;
                true
            }
            None => {
                log::debug!("ignoring resize to {width}x{height}");
                false
            }
        }
    }

    pub fn key_down(&mut self, key: &Key)
    {
        let edge = self.input.press(key);
        match key {
            Key::Space | Key::ArrowUp => {
                if edge {
                    self.player.jump();
                }
            }
            Key::Char('r') | Key::Char('R') => self.restart(),
            _ => {}
        }
    }

    pub fn key_up(&mut self, key: &Key)
    {
        self.input.release(key);
    }

    pub fn restart(&mut self)
    {
        log::info!("restarting run (previous score {})", self.stats.score);
        self.player = Player::spawn(self.viewport);
        self.obstacles.clear();
        self.stats = RunStats::default();
        self.running = true;
    }

    /// One display refresh: advance the simulation if the run is live, then
    /// draw. `timestamp_ms` only drives the decorative background streaks.
    pub fn frame(&mut self, canvas: &mut impl Canvas, timestamp_ms: f64)
    {
        if self.running {
            self.update();
        }
        self.render(canvas, timestamp_ms);
    }

    fn update(&mut self)
    {
        let viewport = self.viewport;
        self.player.step(viewport.ground_y());

        if self.rng.gen_bool(SPAWN_CHANCE) {
            log::trace!("spawning obstacle at x={}", viewport.width);
            self.obstacles.push(Obstacle::spawn(viewport));
        }

        let speed = self.stats.game_speed;
        for obstacle in &mut self.obstacles {
            obstacle.x -= speed;
        }
        self.obstacles.retain(|obstacle| !obstacle.is_off_screen());

        if self.obstacles.iter().any(|obstacle| self.player.overlaps(obstacle)) {
            self.running = false;
        }

        // The collision frame still counts toward the final score.
        self.stats.advance();
        if !self.running {
            log::info!("game over with score {}", self.stats.score);
        }
    }

    fn render(&self, canvas: &mut impl Canvas, timestamp_ms: f64)
    {
        let Viewport { width, height } = self.viewport;
        let ground_y = self.viewport.ground_y();

        self.paint_background(canvas);

        canvas.set_fill_style(STREAK_STYLE);
        for i in 0..5 {
            let offset = timestamp_ms * 0.1 + i as f64 * 200.0;
            let x = offset.rem_euclid(width + 100.0) - 100.0;
            canvas.fill_rect(x, i as f64 * 100.0, 80.0, 20.0);
        }

        canvas.set_fill_style(GROUND_STYLE);
        canvas.fill_rect(0.0, ground_y, width, 50.0);
        canvas.set_shadow_color(GROUND_STYLE);
        canvas.set_shadow_blur(20.0);
        canvas.fill_rect(0.0, ground_y, width, 5.0);
        canvas.set_shadow_blur(0.0);

        canvas.set_shadow_color(PLAYER_STYLE);
        canvas.set_shadow_blur(15.0);
        canvas.set_fill_style(PLAYER_STYLE);
        let player = &self.player;
        canvas.fill_rect(player.x, player.y, player.width, player.height);
        canvas.set_shadow_blur(0.0);

        canvas.set_shadow_color(OBSTACLE_STYLE);
        canvas.set_shadow_blur(10.0);
        canvas.set_fill_style(OBSTACLE_STYLE);
        for obstacle in &self.obstacles {
            canvas.fill_rect(obstacle.x, obstacle.y, obstacle.width, obstacle.height);
        }
        canvas.set_shadow_blur(0.0);

        canvas.set_fill_style(TEXT_STYLE);
        canvas.set_font_size(24.0);
        canvas.fill_text(&format!("Score: {}", self.stats.score), 20.0, 40.0);
        canvas.fill_text(&format!("Speed: {}x", tenths(self.stats.game_speed)), 20.0, 70.0);

        if !self.running {
            canvas.set_fill_style(OVERLAY_STYLE);
            canvas.fill_rect(0.0, 0.0, width, height);

            canvas.set_fill_style(TEXT_STYLE);
            canvas.set_font_size(48.0);
            canvas.set_text_align(TextAlign::Center);
            canvas.fill_text("Game Over!", width / 2.0, height / 2.0 - 50.0);

            canvas.set_font_size(24.0);
            canvas.fill_text(
                &format!("Final Score: {}", self.stats.score),
                width / 2.0,
                height / 2.0,
            );
            canvas.fill_text("Press R to restart", width / 2.0, height / 2.0 + 50.0);
            canvas.set_text_align(TextAlign::Left);
        }
    }

    fn paint_background(&self, canvas: &mut impl Canvas)
    {
        let Viewport { width, height } = self.viewport;
        match self.background {
            Background::GradientString => {
                canvas.set_fill_style(BACKGROUND_STYLE);
                canvas.fill_rect(0.0, 0.0, width, height);
            }
            Background::Gradient => {
                let band = height / GRADIENT_BANDS as f64;
                let (Some(top), Some(bottom)) =
                    (Color::parse(GRADIENT_TOP), Color::parse(GRADIENT_BOTTOM))
                else {
                    return;
                };
                for i in 0..GRADIENT_BANDS {
                    let t = i as f32 / (GRADIENT_BANDS - 1) as f32;
                    let color = top.lerp(bottom, t);
                    canvas.set_fill_style(&format!("rgb({}, {}, {})", color.r, color.g, color.b));
                    canvas.fill_rect(0.0, i as f64 * band, width, band);
                }
            }
        }
    }
}

/// One decimal place with halves rounded up; `{:.1}` rounds them to even.
fn tenths(value: f64) -> String
{
    format!("{:.1}", (value * 10.0).round() / 10.0)
}
