use crate::host::Key;
use std::collections::HashMap;

pub const PLAYER_X: f64 = 100.0;
pub const PLAYER_SIZE: f64 = 30.0;
pub const PLAYER_SPAWN_OFFSET: f64 = 100.0;
pub const OBSTACLE_WIDTH: f64 = 30.0;
pub const OBSTACLE_HEIGHT: f64 = 50.0;
pub const OBSTACLE_OFFSET: f64 = 80.0;
pub const GROUND_HEIGHT: f64 = 50.0;

pub const GRAVITY: f64 = 0.8;
pub const JUMP_VELOCITY: f64 = -15.0;
pub const BASE_SPEED: f64 = 2.0;
pub const SPEED_PER_FRAME: f64 = 0.001;
pub const SPAWN_CHANCE: f64 = 0.01;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport
{
    pub width: f64,
    pub height: f64,
}

impl Viewport
{
    /// `None` unless both dimensions are positive and finite.
    pub fn new(width: f64, height: f64) -> Option<Self>
    {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if valid(width) && valid(height) {
            Some(Self { width, height })
        } else {
            None
        }
    }

    pub fn ground_y(&self) -> f64
    {
        self.height - GROUND_HEIGHT
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Player
{
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub dy: f64,
    pub grounded: bool,
}

impl Player
{
    pub fn spawn(viewport: Viewport) -> Self
    {
        Self {
            x: PLAYER_X,
            y: viewport.height - PLAYER_SPAWN_OFFSET,
            width: PLAYER_SIZE,
            height: PLAYER_SIZE,
            dy: 0.0,
            grounded: false,
        }
    }

    pub fn step(&mut self, ground_y: f64)
    {
        self.dy += GRAVITY;
        self.y += self.dy;
        if self.y + self.height > ground_y {
            self.y = ground_y - self.height;
            self.dy = 0.0;
            self.grounded = true;
        }
    }

    /// Returns whether the jump happened. Airborne players cannot jump.
    pub fn jump(&mut self) -> bool
    {
        if !self.grounded {
            return false;
        }
        self.dy = JUMP_VELOCITY;
        self.grounded = false;
        true
    }

    pub fn overlaps(&self, obstacle: &Obstacle) -> bool
    {
        self.x < obstacle.x + obstacle.width
            && self.x + self.width > obstacle.x
            && self.y < obstacle.y + obstacle.height
            && self.y + self.height > obstacle.y
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Obstacle
{
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Obstacle
{
    pub fn spawn(viewport: Viewport) -> Self
    {
        Self {
            x: viewport.width,
            y: viewport.height - OBSTACLE_OFFSET,
            width: OBSTACLE_WIDTH,
            height: OBSTACLE_HEIGHT,
        }
    }

    pub fn is_off_screen(&self) -> bool
    {
        self.x <= -self.width
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunStats
{
    pub score: u64,
    pub game_speed: f64,
}

impl Default for RunStats
{
    fn default() -> Self
    {
        Self {
            score: 0,
            game_speed: BASE_SPEED,
        }
    }
}

impl RunStats
{
    pub fn speed_for(score: u64) -> f64
    {
        BASE_SPEED + score as f64 * SPEED_PER_FRAME
    }

    pub fn advance(&mut self)
    {
        self.score += 1;
        self.game_speed = Self::speed_for(self.score);
    }
}

#[derive(Default, Debug)]
pub struct InputState
{
    keys: HashMap<Key, bool>,
}

impl InputState
{
    /// Records a key down; returns `true` on a released-to-pressed edge.
    pub fn press(&mut self, key: &Key) -> bool
    {
        let was_pressed = self.is_pressed(key);
        self.keys.insert(key.clone(), true);
        !was_pressed
    }

    pub fn release(&mut self, key: &Key)
    {
        self.keys.insert(key.clone(), false);
    }

    pub fn is_pressed(&self, key: &Key) -> bool
    {
        self.keys.get(key).copied().unwrap_or(false)
    }
}
