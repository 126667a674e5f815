pub mod pixel;

/// RGBA color with straight (non-premultiplied) alpha in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color
{
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color
{
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0.0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self
    {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self
    {
        Self { r, g, b, a }
    }

    pub fn is_opaque(&self) -> bool
    {
        self.a >= 1.0
    }

    pub fn is_visible(&self) -> bool
    {
        self.a > 0.0
    }

    pub fn with_alpha(self, a: f32) -> Self
    {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Source-over composite of `self` onto an opaque `dst`.
    pub fn over(self, dst: Color) -> Color
    {
        let a = self.a.clamp(0.0, 1.0);
        Color::rgb(
            mix(dst.r, self.r, a),
            mix(dst.g, self.g, a),
            mix(dst.b, self.b, a),
        )
    }

    pub fn lerp(self, other: Color, t: f32) -> Color
    {
        let t = t.clamp(0.0, 1.0);
        Color::rgba(
            mix(self.r, other.r, t),
            mix(self.g, other.g, t),
            mix(self.b, other.b, t),
            self.a + (other.a - self.a) * t,
        )
    }

    /// Parses the CSS color forms used by the game: hex (`#rgb`, `#rgba`,
    /// `#rrggbb`, `#rrggbbaa`), `rgb()`, `rgba()` and a few keywords.
    pub fn parse(input: &str) -> Option<Color>
    {
        let value = input.trim();
        if let Some(hex) = value.strip_prefix('#') {
            return parse_hex(hex);
        }
        let lower = value.to_ascii_lowercase();
        if let Some(args) = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return parse_rgb_args(args);
        }
        match lower.as_str() {
            "black" => Some(Color::BLACK),
            "white" => Some(Color::WHITE),
            "transparent" => Some(Color::TRANSPARENT),
            _ => None,
        }
    }
}

fn mix(from: u8, to: u8, t: f32) -> u8
{
    (from as f32 + (to as f32 - from as f32) * t).round() as u8
}

fn parse_hex(hex: &str) -> Option<Color>
{
    if !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |idx: usize| u8::from_str_radix(&hex[idx..idx + 1], 16).ok().map(|v| v * 17);
    let byte = |idx: usize| u8::from_str_radix(&hex[idx..idx + 2], 16).ok();
    match hex.len() {
        3 => Some(Color::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
        4 => Some(Color::rgba(
            nibble(0)?,
            nibble(1)?,
            nibble(2)?,
            nibble(3)? as f32 / 255.0,
        )),
        6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Color::rgba(
            byte(0)?,
            byte(2)?,
            byte(4)?,
            byte(6)? as f32 / 255.0,
        )),
        _ => None,
    }
}

fn parse_rgb_args(args: &str) -> Option<Color>
{
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let channel = |part: &str| {
        part.parse::<f32>()
            .ok()
            .filter(|v| v.is_finite())
            .map(|v| v.round().clamp(0.0, 255.0) as u8)
    };
    let alpha = match parts.get(3) {
        Some(part) => part.parse::<f32>().ok().filter(|v| v.is_finite())?.clamp(0.0, 1.0),
        None => 1.0,
    };
    Some(Color::rgba(
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
        alpha,
    ))
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAlign
{
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shadow
{
    pub color: Color,
    pub blur: f64,
}

#[derive(Clone, Debug)]
pub struct DrawState
{
    pub fill: Color,
    pub shadow_color: Color,
    pub shadow_blur: f64,
    pub font_size: f64,
    pub text_align: TextAlign,
}

impl Default for DrawState
{
    fn default() -> Self
    {
        Self {
            fill: Color::BLACK,
            shadow_color: Color::TRANSPARENT,
            shadow_blur: 0.0,
            font_size: 10.0,
            text_align: TextAlign::Left,
        }
    }
}

impl DrawState
{
    pub fn set_fill_style(&mut self, style: &str)
    {
        match Color::parse(style) {
            Some(color) => self.fill = color,
            None => log::debug!("ignoring unsupported fill style '{style}'"),
        }
    }

    pub fn set_shadow_color(&mut self, style: &str)
    {
        match Color::parse(style) {
            Some(color) => self.shadow_color = color,
            None => log::debug!("ignoring unsupported shadow color '{style}'"),
        }
    }

    pub fn set_shadow_blur(&mut self, blur: f64)
    {
        if blur.is_finite() && blur >= 0.0 {
            self.shadow_blur = blur;
        }
    }

    pub fn set_font_size(&mut self, size: f64)
    {
        if size.is_finite() && size > 0.0 {
            self.font_size = size;
        }
    }

    pub fn shadow(&self) -> Option<Shadow>
    {
        if self.shadow_blur > 0.0 && self.shadow_color.is_visible() {
            Some(Shadow {
                color: self.shadow_color,
                blur: self.shadow_blur,
            })
        } else {
            None
        }
    }
}

pub trait Canvas
{
    fn width(&self) -> f64;
    fn height(&self) -> f64;

    fn state(&self) -> &DrawState;
    fn state_mut(&mut self) -> &mut DrawState;

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    /// Draws `text` with its baseline at `y`, anchored at `x` according to
    /// the current text alignment.
    fn fill_text(&mut self, text: &str, x: f64, y: f64);

    fn set_fill_style(&mut self, style: &str)
    {
        self.state_mut().set_fill_style(style);
    }

    fn set_shadow_color(&mut self, style: &str)
    {
        self.state_mut().set_shadow_color(style);
    }

    fn set_shadow_blur(&mut self, blur: f64)
    {
        self.state_mut().set_shadow_blur(blur);
    }

    fn set_font_size(&mut self, size: f64)
    {
        self.state_mut().set_font_size(size);
    }

    fn set_text_align(&mut self, align: TextAlign)
    {
        self.state_mut().text_align = align;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand
{
    FillRect
    {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Color,
        shadow: Option<Shadow>,
    },
    FillText
    {
        text: String,
        x: f64,
        y: f64,
        size: f64,
        align: TextAlign,
        color: Color,
    },
}

pub struct RecordingCanvas
{
    width: f64,
    height: f64,
    state: DrawState,
    commands: Vec<DrawCommand>,
}

impl RecordingCanvas
{
    pub fn new(width: f64, height: f64) -> Self
    {
        Self {
            width,
            height,
            state: DrawState::default(),
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand]
    {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand>
    {
        std::mem::take(&mut self.commands)
    }

    pub fn texts(&self) -> Vec<&str>
    {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::FillText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Canvas for RecordingCanvas
{
    fn width(&self) -> f64
    {
        self.width
    }

    fn height(&self) -> f64
    {
        self.height
    }

    fn state(&self) -> &DrawState
    {
        &self.state
    }

    fn state_mut(&mut self) -> &mut DrawState
    {
        &mut self.state
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64)
    {
        self.commands.push(DrawCommand::FillRect {
            x,
            y,
            width,
            height,
            color: self.state.fill,
            shadow: self.state.shadow(),
        });
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64)
    {
        self.commands.push(DrawCommand::FillText {
            text: text.to_string(),
            x,
            y,
            size: self.state.font_size,
            align: self.state.text_align,
            color: self.state.fill,
        });
    }
}
