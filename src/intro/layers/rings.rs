//! Expanding rings and currency data nodes
//!
//! Five hand-authored rings expand around the logo one after another and
//! keep turning at their own speeds. Six currency nodes then pop out onto
//! an orbit around them.

use glam::Vec2;

use crate::intro::layer::{Crossing, Curve, Layer, Presence, Thresholds, count_animating};
use crate::intro::layers::glitch::LOGO_CENTER;
use crate::intro::timeline::Phase;
use crate::intro::tween::{AnimatedValue, Easing};
use crate::palette;
use crate::polar_to_cartesian;

const THRESHOLDS: Thresholds = Thresholds::new(Phase::RINGS, Some(Phase::FLARE));
const ENTER: Curve = Curve::new(1.0, 400.0, Easing::OutQuad);
const EXIT: Curve = Curve::new(0.0, 500.0, Easing::InQuad);

/// Ring radius at scale 1.0
pub const RING_BASE_RADIUS: f32 = 100.0;
const RING_THICKNESS: f32 = 2.0;
const RING_STAGGER_MS: f64 = 110.0;
const RING_EXPAND_MS: f64 = 900.0;
/// Rings keep growing by this factor while fading out
const RING_EXIT_GROWTH: f32 = 1.25;

pub const NODE_ORBIT_RADIUS: f32 = 150.0;
const NODE_DELAY_MS: f64 = 450.0;
const NODE_REVEAL_MS: f64 = 600.0;
const NODE_ORBIT_DEG_PER_SEC: f32 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeStyle {
    Solid,
    Dashed,
    Dotted,
}

/// One ring, authored by hand
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingDescriptor {
    pub stroke: StrokeStyle,
    pub color: [f32; 4],
    /// Final scale of `RING_BASE_RADIUS`
    pub end_scale: f32,
    /// Degrees per second, negative turns clockwise
    pub speed: f32,
    /// Initial rotation
    pub rotation_degrees: f32,
    pub glow: bool,
}

pub const RINGS: [RingDescriptor; 5] = [
    RingDescriptor {
        stroke: StrokeStyle::Solid,
        color: palette::CYAN,
        end_scale: 0.9,
        speed: 12.0,
        rotation_degrees: 0.0,
        glow: true,
    },
    RingDescriptor {
        stroke: StrokeStyle::Dashed,
        color: palette::MAGENTA,
        end_scale: 1.15,
        speed: -18.0,
        rotation_degrees: 30.0,
        glow: false,
    },
    RingDescriptor {
        stroke: StrokeStyle::Dotted,
        color: palette::GOLD,
        end_scale: 1.4,
        speed: 8.0,
        rotation_degrees: 75.0,
        glow: false,
    },
    RingDescriptor {
        stroke: StrokeStyle::Dashed,
        color: palette::VIOLET,
        end_scale: 1.7,
        speed: -6.0,
        rotation_degrees: 120.0,
        glow: true,
    },
    RingDescriptor {
        stroke: StrokeStyle::Solid,
        color: palette::EMERALD,
        end_scale: 2.05,
        speed: 4.0,
        rotation_degrees: 200.0,
        glow: false,
    },
];

/// A currency glyph on the node orbit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataNodeDescriptor {
    pub angle_degrees: f32,
    pub icon: char,
    pub color: [f32; 4],
}

pub const DATA_NODES: [DataNodeDescriptor; 6] = [
    DataNodeDescriptor {
        angle_degrees: 90.0,
        icon: '$',
        color: palette::EMERALD,
    },
    DataNodeDescriptor {
        angle_degrees: 150.0,
        icon: '€',
        color: palette::CYAN,
    },
    DataNodeDescriptor {
        angle_degrees: 210.0,
        icon: '£',
        color: palette::VIOLET,
    },
    DataNodeDescriptor {
        angle_degrees: 270.0,
        icon: '¥',
        color: palette::MAGENTA,
    },
    DataNodeDescriptor {
        angle_degrees: 330.0,
        icon: '₿',
        color: palette::GOLD,
    },
    DataNodeDescriptor {
        angle_degrees: 30.0,
        icon: '₹',
        color: palette::WHITE,
    },
];

#[derive(Debug, Clone, PartialEq)]
pub struct RingSprite {
    pub center: Vec2,
    pub radius: f32,
    pub thickness: f32,
    /// Radians
    pub rotation: f32,
    pub stroke: StrokeStyle,
    pub color: [f32; 4],
    pub alpha: f32,
    pub glow: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeSprite {
    pub pos: Vec2,
    pub icon: char,
    pub color: [f32; 4],
    pub alpha: f32,
    pub scale: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RingsFrame {
    pub rings: Vec<RingSprite>,
    pub nodes: Vec<NodeSprite>,
}

#[derive(Debug, Clone)]
pub struct RingsLayer {
    presence: Presence,
    /// Per-ring scale of `RING_BASE_RADIUS`
    expand: [AnimatedValue; RINGS.len()],
    nodes_reveal: AnimatedValue,
    glow_enabled: bool,
}

impl RingsLayer {
    pub fn new(glow_enabled: bool) -> Self {
        Self {
            presence: Presence::new(THRESHOLDS, ENTER, EXIT),
            expand: std::array::from_fn(|_| AnimatedValue::new(0.0)),
            nodes_reveal: AnimatedValue::new(0.0),
            glow_enabled,
        }
    }

    pub fn sample(&self, now_ms: f64) -> RingsFrame {
        let opacity = self.presence.opacity(now_ms);
        if opacity <= 0.0 {
            return RingsFrame::default();
        }
        let secs = self.presence.since_enter(now_ms).unwrap_or(0.0) as f32 / 1000.0;

        let rings = RINGS
            .iter()
            .zip(&self.expand)
            .filter_map(|(ring, expand)| {
                let scale = expand.sample(now_ms);
                (scale > 0.0).then(|| RingSprite {
                    center: LOGO_CENTER,
                    radius: RING_BASE_RADIUS * scale,
                    thickness: RING_THICKNESS,
                    rotation: (ring.rotation_degrees + ring.speed * secs).to_radians(),
                    stroke: ring.stroke,
                    color: ring.color,
                    alpha: opacity,
                    glow: ring.glow && self.glow_enabled,
                })
            })
            .collect();

        let reveal = self.nodes_reveal.sample(now_ms);
        let nodes = if reveal > 0.0 {
            DATA_NODES
                .iter()
                .map(|node| {
                    let angle = node.angle_degrees + NODE_ORBIT_DEG_PER_SEC * secs;
                    NodeSprite {
                        pos: LOGO_CENTER
                            + polar_to_cartesian(NODE_ORBIT_RADIUS * reveal, angle.to_radians()),
                        icon: node.icon,
                        color: node.color,
                        alpha: opacity * reveal.min(1.0),
                        scale: reveal,
                    }
                })
                .collect()
        } else {
            Vec::new()
        };

        RingsFrame { rings, nodes }
    }
}

impl Layer for RingsLayer {
    fn name(&self) -> &'static str {
        "rings"
    }

    fn thresholds(&self) -> Thresholds {
        THRESHOLDS
    }

    fn opacity(&self, now_ms: f64) -> f32 {
        self.presence.opacity(now_ms)
    }

    fn sync(&mut self, phase: Phase, now_ms: f64) {
        match self.presence.sync(phase, now_ms) {
            Crossing::Entered => {
                for (i, (ring, expand)) in RINGS.iter().zip(&mut self.expand).enumerate() {
                    expand.animate_to_after(
                        i as f64 * RING_STAGGER_MS,
                        ring.end_scale,
                        RING_EXPAND_MS,
                        Easing::OutBack,
                        now_ms,
                    );
                }
                self.nodes_reveal.animate_to_after(
                    NODE_DELAY_MS,
                    1.0,
                    NODE_REVEAL_MS,
                    Easing::OutCubic,
                    now_ms,
                );
            }
            Crossing::Exited => {
                for (ring, expand) in RINGS.iter().zip(&mut self.expand) {
                    expand.animate_to(
                        ring.end_scale * RING_EXIT_GROWTH,
                        EXIT.duration_ms,
                        Easing::InQuad,
                        now_ms,
                    );
                }
            }
            Crossing::None => {}
        }
    }

    fn pending(&self, now_ms: f64) -> usize {
        count_animating(self.expand.iter().chain([&self.nodes_reveal]), now_ms)
            + self.presence.is_animating(now_ms) as usize
    }

    fn cancel(&mut self, now_ms: f64) {
        self.presence.cancel(now_ms);
        for expand in &mut self.expand {
            expand.cancel(now_ms);
        }
        self.nodes_reveal.cancel(now_ms);
    }
}
