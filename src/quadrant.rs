use crate::error::GameError;
use rand::Rng;

/// One of the four screen regions eligible for target spawning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum Quadrant {
    #[strum(serialize = "tl")]
    TopLeft,
    #[strum(serialize = "tr")]
    TopRight,
    #[strum(serialize = "bl")]
    BottomLeft,
    #[strum(serialize = "br")]
    BottomRight,
}

pub const ALL_QUADRANTS: [Quadrant; 4] = [
    Quadrant::TopLeft,
    Quadrant::TopRight,
    Quadrant::BottomLeft,
    Quadrant::BottomRight,
];

impl Quadrant {
    /// Tag used in persisted record files.
    pub fn tag(&self) -> &'static str {
        match self {
            Quadrant::TopLeft => "tl",
            Quadrant::TopRight => "tr",
            Quadrant::BottomLeft => "bl",
            Quadrant::BottomRight => "br",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Quadrant> {
        match tag {
            "tl" => Some(Quadrant::TopLeft),
            "tr" => Some(Quadrant::TopRight),
            "bl" => Some(Quadrant::BottomLeft),
            "br" => Some(Quadrant::BottomRight),
            _ => None,
        }
    }

    /// Keyboard binding that toggles this quadrant.
    pub fn toggle_key(&self) -> char {
        match self {
            Quadrant::TopLeft => 'u',
            Quadrant::TopRight => 'i',
            Quadrant::BottomLeft => 'j',
            Quadrant::BottomRight => 'k',
        }
    }

    fn index(&self) -> usize {
        match self {
            Quadrant::TopLeft => 0,
            Quadrant::TopRight => 1,
            Quadrant::BottomLeft => 2,
            Quadrant::BottomRight => 3,
        }
    }
}

/// Axis-aligned rectangle a target center may be sampled from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl SpawnBounds {
    pub fn sample(&self, rng: &mut impl Rng) -> (f64, f64) {
        (
            rng.gen_range(self.x_min..=self.x_max),
            rng.gen_range(self.y_min..=self.y_max),
        )
    }
}

/// Inset rectangle for `quadrant` such that a target of `radius` fully fits
/// on screen. `None` when the rectangle is degenerate (screen too small for
/// the configured radius); callers fall back to [`full_screen_bounds`].
pub fn spawn_bounds(quadrant: Quadrant, width: f64, height: f64, radius: f64) -> Option<SpawnBounds> {
    let mid_x = width / 2.0;
    let mid_y = height / 2.0;

    let bounds = match quadrant {
        Quadrant::TopLeft => SpawnBounds {
            x_min: radius,
            x_max: mid_x - radius,
            y_min: radius,
            y_max: mid_y - radius,
        },
        Quadrant::TopRight => SpawnBounds {
            x_min: mid_x + radius,
            x_max: width - radius,
            y_min: radius,
            y_max: mid_y - radius,
        },
        Quadrant::BottomLeft => SpawnBounds {
            x_min: radius,
            x_max: mid_x - radius,
            y_min: mid_y + radius,
            y_max: height - radius,
        },
        Quadrant::BottomRight => SpawnBounds {
            x_min: mid_x + radius,
            x_max: width - radius,
            y_min: mid_y + radius,
            y_max: height - radius,
        },
    };

    if bounds.x_min >= bounds.x_max || bounds.y_min >= bounds.y_max {
        None
    } else {
        Some(bounds)
    }
}

/// Whole-screen rectangle inset by the target radius, used as the fallback
/// when a quadrant is degenerate.
pub fn full_screen_bounds(width: f64, height: f64, radius: f64) -> Option<SpawnBounds> {
    let bounds = SpawnBounds {
        x_min: radius,
        x_max: width - radius,
        y_min: radius,
        y_max: height - radius,
    };

    if bounds.x_min >= bounds.x_max || bounds.y_min >= bounds.y_max {
        None
    } else {
        Some(bounds)
    }
}

/// Tracks which quadrants are enabled for spawning and picks one at random
/// per spawn request. Does not itself enforce non-emptiness; refusing to
/// start a round with everything disabled is the session's job.
#[derive(Clone, Debug)]
pub struct QuadrantSelector {
    enabled: [bool; 4],
}

impl Default for QuadrantSelector {
    fn default() -> Self {
        // Startup default: top half enabled, bottom half disabled
        Self {
            enabled: [true, true, false, false],
        }
    }
}

impl QuadrantSelector {
    pub fn is_enabled(&self, quadrant: Quadrant) -> bool {
        self.enabled[quadrant.index()]
    }

    pub fn toggle(&mut self, quadrant: Quadrant) -> bool {
        let flag = &mut self.enabled[quadrant.index()];
        *flag = !*flag;
        *flag
    }

    pub fn any_enabled(&self) -> bool {
        self.enabled.iter().any(|&f| f)
    }

    /// Uniform pick among the enabled quadrants.
    pub fn pick(&self, rng: &mut impl Rng) -> Result<Quadrant, GameError> {
        let available: Vec<Quadrant> = ALL_QUADRANTS
            .into_iter()
            .filter(|q| self.is_enabled(*q))
            .collect();

        if available.is_empty() {
            return Err(GameError::NoQuadrantEnabled);
        }
        Ok(available[rng.gen_range(0..available.len())])
    }
}
