//! Typewriter title reveal
//!
//! Types the title, pauses, then types the tagline. The character about to
//! land shows a scrambled glyph first, and a block cursor blinks after the
//! text.

use rand::Rng;
use rand_pcg::Pcg32;

use crate::hash_u32;
use crate::intro::layer::{Crossing, Curve, Layer, Presence, Thresholds, count_animating};
use crate::intro::timeline::Phase;
use crate::intro::tween::{AnimatedValue, Easing, Repeat};

const THRESHOLDS: Thresholds = Thresholds::new(Phase::TITLE, None);
const ENTER: Curve = Curve::new(1.0, 200.0, Easing::Linear);
const EXIT: Curve = Curve::new(0.0, 300.0, Easing::Linear);

const CHAR_INTERVAL_MS: f64 = 55.0;
/// Character slots of silence between title and tagline
const PAUSE_UNITS: usize = 4;
const CURSOR_PERIOD_MS: f64 = 1060.0;
const SCRAMBLE_STEP_MS: f64 = 40.0;
pub const SCRAMBLE_GLYPHS: &[char] = &['#', '%', '&', '@', '$', '0', '1', '7', 'X', 'Z', '/', '?'];

/// Which line the cursor or scramble glyph sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextLine {
    #[default]
    Title,
    Tagline,
}

/// Title snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TitleFrame {
    pub opacity: f32,
    pub title: String,
    pub tagline: String,
    /// Glyph flashing in the next slot
    pub scramble: Option<char>,
    pub cursor_line: TextLine,
    pub cursor_visible: bool,
    pub complete: bool,
}

#[derive(Debug, Clone)]
pub struct TypewriterLayer {
    presence: Presence,
    title: Vec<char>,
    tagline: Vec<char>,
    /// Character slots typed so far (title, pause, tagline)
    reveal: AnimatedValue,
    cursor: AnimatedValue,
    scramble_seed: u32,
    reduced_motion: bool,
}

impl TypewriterLayer {
    pub fn new(title: &str, tagline: &str, reduced_motion: bool, rng: &mut Pcg32) -> Self {
        Self {
            presence: Presence::new(THRESHOLDS, ENTER, EXIT),
            title: title.to_uppercase().chars().collect(),
            tagline: tagline.to_uppercase().chars().collect(),
            reveal: AnimatedValue::new(0.0),
            cursor: AnimatedValue::new(0.0),
            scramble_seed: rng.random(),
            reduced_motion,
        }
    }

    fn total_units(&self) -> usize {
        self.title.len() + PAUSE_UNITS + self.tagline.len()
    }

    /// How long the full reveal takes
    pub fn typing_ms(&self) -> f64 {
        self.total_units() as f64 * CHAR_INTERVAL_MS
    }

    pub fn sample(&self, now_ms: f64) -> TitleFrame {
        let opacity = self.presence.opacity(now_ms);
        if opacity <= 0.0 {
            return TitleFrame::default();
        }
        let units = self.reveal.sample(now_ms).floor().max(0.0) as usize;
        let title_len = self.title.len();
        let title_shown = units.min(title_len);
        let tagline_shown = units
            .saturating_sub(title_len + PAUSE_UNITS)
            .min(self.tagline.len());
        let complete = units >= self.total_units();

        let (cursor_line, next_char) = if units < title_len {
            (TextLine::Title, self.title.get(title_shown))
        } else if units < title_len + PAUSE_UNITS {
            (TextLine::Title, None)
        } else {
            (TextLine::Tagline, self.tagline.get(tagline_shown))
        };

        let scramble = match next_char {
            Some(c) if !self.reduced_motion && !complete && !c.is_whitespace() => {
                let bucket = (now_ms / SCRAMBLE_STEP_MS) as u32;
                let i = hash_u32(self.scramble_seed ^ bucket) as usize % SCRAMBLE_GLYPHS.len();
                Some(SCRAMBLE_GLYPHS[i])
            }
            _ => None,
        };

        // Solid while typing, blinking once done
        let cursor_visible = !complete || self.cursor.sample(now_ms) < 0.5;

        TitleFrame {
            opacity,
            title: self.title[..title_shown].iter().collect(),
            tagline: self.tagline[..tagline_shown].iter().collect(),
            scramble,
            cursor_line,
            cursor_visible,
            complete,
        }
    }
}

impl Layer for TypewriterLayer {
    fn name(&self) -> &'static str {
        "typewriter"
    }

    fn thresholds(&self) -> Thresholds {
        THRESHOLDS
    }

    fn opacity(&self, now_ms: f64) -> f32 {
        self.presence.opacity(now_ms)
    }

    fn sync(&mut self, phase: Phase, now_ms: f64) {
        if self.presence.sync(phase, now_ms) == Crossing::Entered {
            self.reveal.animate_to(
                self.total_units() as f32,
                self.typing_ms(),
                Easing::Linear,
                now_ms,
            );
            self.cursor.repeat(
                0.0,
                1.0,
                CURSOR_PERIOD_MS,
                Easing::Linear,
                Repeat::Loop,
                now_ms,
            );
        }
    }

    fn pending(&self, now_ms: f64) -> usize {
        count_animating([&self.reveal, &self.cursor], now_ms)
            + self.presence.is_animating(now_ms) as usize
    }

    fn cancel(&mut self, now_ms: f64) {
        self.presence.cancel(now_ms);
        self.reveal.cancel(now_ms);
        self.cursor.cancel(now_ms);
    }
}
