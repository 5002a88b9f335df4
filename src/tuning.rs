//! Data-driven game balance
//!
//! One engine runs all three games; a `GameConfig` picks the rules and numbers.
//! Presets reproduce the shipped games, and JSON overrides are validated before
//! a session will accept them.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::collision::PaddingTable;
use crate::sim::difficulty::{ActiveStep, DifficultyCurve, Ramp};
use crate::sim::entity::HitboxClass;
use crate::sim::hole::HoleParams;
use crate::sim::motion::SteerParams;
use crate::sim::score::ScoreRule;
use crate::sim::spawner::PlacementPolicy;

/// World bounds; the origin is the top-left corner, y grows downward
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct World {
    pub width: f32,
    pub height: f32,
}

impl World {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Which game a config drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameVariant {
    /// Tap the good downloads, avoid the viruses
    FileDrop,
    /// Fly Dood around eating clouds while dodging traffic
    CloudEater,
    /// Whack Dood as he pops out of holes
    WhackADood,
}

impl GameVariant {
    pub const ALL: [GameVariant; 3] = [
        GameVariant::FileDrop,
        GameVariant::CloudEater,
        GameVariant::WhackADood,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameVariant::FileDrop => "file-drop",
            GameVariant::CloudEater => "cloud-eater",
            GameVariant::WhackADood => "whack-a-dood",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "file-drop" | "filedrop" | "download" => Some(GameVariant::FileDrop),
            "cloud-eater" | "clouds" | "dood" => Some(GameVariant::CloudEater),
            "whack-a-dood" | "whack" => Some(GameVariant::WhackADood),
            _ => None,
        }
    }

    /// Canvas size the desktop build uses
    pub fn default_world(&self) -> World {
        match self {
            GameVariant::FileDrop => World::new(800.0, 400.0),
            GameVariant::CloudEater => World::new(600.0, 900.0),
            GameVariant::WhackADood => World::new(600.0, 900.0),
        }
    }
}

/// Falling-file game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileDropRules {
    pub file_size: Vec2,
    /// Center y of freshly spawned files (above the top edge)
    pub spawn_y: f32,
    /// Gap kept between unpadded file boxes at spawn
    pub spacing: f32,
    pub max_attempts: u32,
    pub policy: PlacementPolicy,
    /// Descent per tick is `(base_speed + rand * speed_spread) * speed_scale`
    pub base_speed: f32,
    pub speed_spread: f32,
    pub speed_scale: f32,
    /// Distance past the bottom edge before a file is dropped
    pub exit_margin: f32,
    /// Chance that a spawn comes from the virus category
    pub virus_weight: f32,
    pub benign_names: Vec<String>,
    pub virus_names: Vec<String>,
    pub initial_spawn_delay: f32,
    pub difficulty: DifficultyCurve,
}

impl Default for FileDropRules {
    fn default() -> Self {
        let names = |list: &[&str]| list.iter().map(|s| s.to_string()).collect();
        Self {
            file_size: Vec2::new(180.0, 60.0),
            spawn_y: -20.0,
            spacing: 10.0,
            max_attempts: 20,
            policy: PlacementPolicy::Strict,
            base_speed: 1.0,
            speed_spread: 0.5,
            speed_scale: 1.0,
            exit_margin: 100.0,
            virus_weight: 0.5,
            benign_names: names(&[
                "Harry Potter 7",
                "John Grisham Novel",
                "Trolley Status",
                "Dubai",
                "evanescence sound track",
                "Really good movie",
                "burger menu",
                "kroger belt catalog",
            ]),
            virus_names: names(&[
                "$_for_nigerian_prince",
                "openME!.vir",
                "virusforyou.zip",
                "Trojan.exe",
                "ILOVEYOU",
                "DEF_CLICK_HERE",
                "doom!",
                "Harry Potter 9",
            ]),
            initial_spawn_delay: 60.0,
            difficulty: DifficultyCurve::constant(60.0),
        }
    }
}

/// A horizontally bouncing obstacle (airplane, ufo)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BouncerSpec {
    pub size: Vec2,
    pub speed: f32,
    pub start_x: f32,
    /// Starting lane as a fraction of world height
    pub lane: f32,
    pub margin: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BirdSpec {
    pub count: u32,
    pub size: Vec2,
    pub speed_min: f32,
    pub speed_spread: f32,
    pub amplitude_min: f32,
    pub amplitude_spread: f32,
    pub frequency_min: f32,
    pub frequency_spread: f32,
    pub margin: f32,
    /// First bird's lane and the step between lanes, as fractions of height
    pub first_lane: f32,
    pub lane_step: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParachuteSpec {
    pub size: Vec2,
    pub speed: f32,
    pub sway_amplitude: f32,
    pub sway_frequency: f32,
    pub respawn_y: f32,
}

/// Obstacles in the flying game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleRoster {
    pub airplane: BouncerSpec,
    pub ufo: BouncerSpec,
    pub birds: BirdSpec,
    pub parachute: ParachuteSpec,
    /// Band new lanes are drawn from after a bouncer turns around
    pub relane_top: f32,
    pub relane_span: f32,
}

impl Default for ObstacleRoster {
    fn default() -> Self {
        Self {
            airplane: BouncerSpec {
                size: Vec2::new(440.0, 140.0),
                speed: 2.8,
                start_x: -250.0,
                lane: 0.12,
                margin: 250.0,
            },
            ufo: BouncerSpec {
                size: Vec2::new(396.0, 220.0),
                speed: 2.1,
                start_x: -220.0,
                lane: 0.4,
                margin: 250.0,
            },
            birds: BirdSpec {
                count: 3,
                size: Vec2::new(68.0, 54.0),
                speed_min: 2.1,
                speed_spread: 1.0,
                amplitude_min: 20.0,
                amplitude_spread: 15.0,
                frequency_min: 0.03,
                frequency_spread: 0.02,
                margin: 30.0,
                first_lane: 0.25,
                lane_step: 0.2,
            },
            parachute: ParachuteSpec {
                size: Vec2::new(280.0, 440.0),
                speed: 1.1,
                sway_amplitude: 2.0,
                sway_frequency: 0.02,
                respawn_y: -60.0,
            },
            relane_top: 0.1,
            relane_span: 0.5,
        }
    }
}

/// Cloud-eating flying game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudEaterRules {
    pub player_size: f32,
    pub player_speed: f32,
    /// Player starts this far above the bottom edge, horizontally centered
    pub player_start_offset: f32,
    pub steer: SteerParams,
    pub eat_anim_ticks: u32,
    /// Grace period at the start during which obstacles are harmless
    pub invulnerable_ticks: u32,
    /// Obstacles only hit once this much of their width is on screen
    pub min_visible_fraction: f32,
    pub cloud_size: Vec2,
    pub cloud_margin_x: f32,
    pub cloud_top: f32,
    /// Strip at the bottom kept free of clouds
    pub cloud_bottom_reserve: f32,
    pub cloud_spacing: f32,
    pub max_attempts: u32,
    pub policy: PlacementPolicy,
    pub initial_clouds: u32,
    pub total_clouds: u32,
    /// Every `replenish_every` clouds eaten, spawn `replenish_batch` more
    pub replenish_every: u32,
    pub replenish_batch: u32,
    pub float_amplitude: f32,
    pub float_frequency_min: f32,
    pub float_frequency_spread: f32,
    pub obstacles: ObstacleRoster,
}

impl Default for CloudEaterRules {
    fn default() -> Self {
        Self {
            player_size: 92.0,
            player_speed: 7.0,
            player_start_offset: 150.0,
            steer: SteerParams::default(),
            eat_anim_ticks: 15,
            invulnerable_ticks: 90,
            min_visible_fraction: 0.5,
            cloud_size: Vec2::new(168.0, 84.0),
            cloud_margin_x: 90.0,
            cloud_top: 70.0,
            cloud_bottom_reserve: 330.0,
            cloud_spacing: 200.0,
            max_attempts: 10,
            policy: PlacementPolicy::Lenient,
            initial_clouds: 6,
            total_clouds: 15,
            replenish_every: 2,
            replenish_batch: 2,
            float_amplitude: 5.0,
            float_frequency_min: 0.02,
            float_frequency_spread: 0.02,
            obstacles: ObstacleRoster::default(),
        }
    }
}

/// Whack-a-mole game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhackRules {
    pub rows: u32,
    pub cols: u32,
    /// Side margin as a fraction of width
    pub margin_x: f32,
    /// Grass band as fractions of height
    pub band_top: f32,
    pub band_bottom: f32,
    /// Full jitter range applied to each grid position
    pub jitter: Vec2,
    pub hole: HoleParams,
    pub initial_spawn_delay: f32,
    pub difficulty: DifficultyCurve,
}

impl Default for WhackRules {
    fn default() -> Self {
        Self {
            rows: 5,
            cols: 3,
            margin_x: 0.15,
            band_top: 0.36,
            band_bottom: 0.88,
            jitter: Vec2::new(30.0, 20.0),
            hole: HoleParams::default(),
            initial_spawn_delay: 20.0,
            difficulty: DifficultyCurve {
                ramp_secs: 20.0,
                spawn_delay_base: Ramp { start: 20.0, end: 10.0 },
                spawn_delay_spread: Ramp { start: 16.0, end: 10.0 },
                dwell_base: Ramp { start: 32.0, end: 16.0 },
                dwell_spread: Ramp { start: 16.0, end: 12.0 },
                initial_max_active: 2,
                active_steps: vec![
                    ActiveStep { at_secs: 10, max_active: 3 },
                    ActiveStep { at_secs: 22, max_active: 4 },
                ],
            },
        }
    }
}

/// Variant-specific rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VariantRules {
    FileDrop(FileDropRules),
    CloudEater(CloudEaterRules),
    WhackADood(WhackRules),
}

impl VariantRules {
    pub fn variant(&self) -> GameVariant {
        match self {
            VariantRules::FileDrop(_) => GameVariant::FileDrop,
            VariantRules::CloudEater(_) => GameVariant::CloudEater,
            VariantRules::WhackADood(_) => GameVariant::WhackADood,
        }
    }
}

/// Complete configuration for one game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub world: World,
    /// Countdown length in seconds
    pub duration_secs: u32,
    pub padding: PaddingTable,
    pub scoring: ScoreRule,
    pub rules: VariantRules,
}

impl GameConfig {
    /// Shipped balance for a variant
    pub fn preset(variant: GameVariant, world: World) -> Self {
        let padding = PaddingTable::default();
        match variant {
            GameVariant::FileDrop => Self {
                world,
                duration_secs: 20,
                padding,
                scoring: ScoreRule::Threshold { win_at: 10 },
                rules: VariantRules::FileDrop(FileDropRules::default()),
            },
            GameVariant::CloudEater => {
                let rules = CloudEaterRules::default();
                Self {
                    world,
                    duration_secs: 20,
                    padding,
                    scoring: ScoreRule::CollectAll {
                        total: rules.total_clouds,
                    },
                    rules: VariantRules::CloudEater(rules),
                }
            }
            GameVariant::WhackADood => Self {
                world,
                duration_secs: 30,
                padding,
                scoring: ScoreRule::Ratio,
                rules: VariantRules::WhackADood(WhackRules::default()),
            },
        }
    }

    /// Preset sized to a viewport. Phones get faster files so the descent
    /// takes the same time on a taller canvas.
    pub fn for_viewport(variant: GameVariant, width: f32, height: f32, mobile: bool) -> Self {
        let mut config = Self::preset(variant, World::new(width, height));
        if mobile {
            if let VariantRules::FileDrop(rules) = &mut config.rules {
                rules.speed_scale = (height / 400.0) * 2.5;
            }
        }
        config
    }

    pub fn variant(&self) -> GameVariant {
        self.rules.variant()
    }

    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(ConfigError::Parse)
    }

    /// Reject configs the engine cannot honor
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.world.width > 0.0 && self.world.height > 0.0) {
            return Err(ConfigError::InvalidWorld {
                width: self.world.width,
                height: self.world.height,
            });
        }
        if self.duration_secs == 0 {
            return Err(ConfigError::ZeroDuration);
        }
        for (class, value) in self.padding.entries() {
            if !(0.0..1.0).contains(&value) {
                return Err(ConfigError::Padding { class, value });
            }
        }

        match &self.rules {
            VariantRules::FileDrop(r) => {
                non_negative_size("file_size", r.file_size)?;
                non_zero("max_attempts", r.max_attempts)?;
                fraction("virus_weight", r.virus_weight)?;
                non_negative("spacing", r.spacing)?;
                non_negative("base_speed", r.base_speed)?;
                non_negative("speed_spread", r.speed_spread)?;
                non_negative("speed_scale", r.speed_scale)?;
                if r.benign_names.is_empty() {
                    return Err(ConfigError::EmptyTable { field: "benign_names" });
                }
                if r.virus_names.is_empty() {
                    return Err(ConfigError::EmptyTable { field: "virus_names" });
                }
                curve(&r.difficulty)?;
            }
            VariantRules::CloudEater(r) => {
                non_negative("player_size", r.player_size)?;
                non_negative("player_speed", r.player_speed)?;
                non_negative_size("cloud_size", r.cloud_size)?;
                non_zero("max_attempts", r.max_attempts)?;
                non_zero("replenish_every", r.replenish_every)?;
                fraction("min_visible_fraction", r.min_visible_fraction)?;
                if r.initial_clouds > r.total_clouds {
                    return Err(ConfigError::OutOfRange {
                        field: "initial_clouds",
                        value: r.initial_clouds as f32,
                    });
                }
                let roster = &r.obstacles;
                non_negative_size("airplane.size", roster.airplane.size)?;
                non_negative_size("ufo.size", roster.ufo.size)?;
                non_negative_size("birds.size", roster.birds.size)?;
                non_negative_size("parachute.size", roster.parachute.size)?;
            }
            VariantRules::WhackADood(r) => {
                non_zero("rows", r.rows)?;
                non_zero("cols", r.cols)?;
                non_negative_size("hole.sprite_size", r.hole.sprite_size)?;
                if !(r.hole.rise_speed > 0.0 && r.hole.fall_speed > 0.0 && r.hole.hit_fall_speed > 0.0) {
                    return Err(ConfigError::OutOfRange {
                        field: "hole speeds",
                        value: r.hole.rise_speed.min(r.hole.fall_speed).min(r.hole.hit_fall_speed),
                    });
                }
                curve(&r.difficulty)?;
            }
        }
        Ok(())
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, value })
    }
}

fn non_negative_size(field: &'static str, size: Vec2) -> Result<(), ConfigError> {
    if size.x >= 0.0 && size.y >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NegativeSize { field })
    }
}

fn non_zero(field: &'static str, value: u32) -> Result<(), ConfigError> {
    if value > 0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, value: 0.0 })
    }
}

fn fraction(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, value })
    }
}

fn curve(curve: &DifficultyCurve) -> Result<(), ConfigError> {
    if let Some(field) = curve.first_non_monotonic() {
        return Err(ConfigError::NonMonotonicRamp { field });
    }
    non_negative("spawn_delay_base", curve.spawn_delay_base.end)?;
    non_negative("spawn_delay_spread", curve.spawn_delay_spread.end)?;
    non_negative("dwell_base", curve.dwell_base.end)?;
    non_negative("dwell_spread", curve.dwell_spread.end)
}

/// Why a config was rejected
#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    InvalidWorld { width: f32, height: f32 },
    ZeroDuration,
    Padding { class: HitboxClass, value: f32 },
    NegativeSize { field: &'static str },
    OutOfRange { field: &'static str, value: f32 },
    NonMonotonicRamp { field: &'static str },
    EmptyTable { field: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "config parse error: {e}"),
            Self::InvalidWorld { width, height } => {
                write!(f, "world must have positive size, got {width}x{height}")
            }
            Self::ZeroDuration => write!(f, "duration_secs must be at least 1"),
            Self::Padding { class, value } => {
                write!(f, "padding for {class:?} must be in [0, 1), got {value}")
            }
            Self::NegativeSize { field } => write!(f, "{field} must not be negative"),
            Self::OutOfRange { field, value } => write!(f, "{field} out of range: {value}"),
            Self::NonMonotonicRamp { field } => {
                write!(f, "{field} must not get easier as time passes")
            }
            Self::EmptyTable { field } => write!(f, "{field} must not be empty"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_validate() {
        for variant in GameVariant::ALL {
            let config = GameConfig::preset(variant, variant.default_world());
            assert_eq!(config.variant(), variant);
            config.validate().expect("preset must be valid");
        }
    }

    #[test]
    fn test_json_round_trip_keeps_overrides() {
        let mut config = GameConfig::preset(GameVariant::WhackADood, World::new(400.0, 700.0));
        config.duration_secs = 45;
        let json = config.to_json().expect("serializes");
        let parsed = GameConfig::from_json(&json).expect("parses");
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_rejects_bad_padding() {
        let mut config = GameConfig::preset(GameVariant::CloudEater, World::new(600.0, 900.0));
        config.padding.bird = 1.0;
        let json = config.to_json().expect("serializes");
        match GameConfig::from_json(&json) {
            Err(ConfigError::Padding { class, .. }) => assert_eq!(class, HitboxClass::Bird),
            other => panic!("expected padding error, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_garbage() {
        let err = GameConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_rejects_easing_curve() {
        let mut config = GameConfig::preset(GameVariant::WhackADood, World::new(600.0, 900.0));
        if let VariantRules::WhackADood(rules) = &mut config.rules {
            rules.difficulty.spawn_delay_base = Ramp { start: 10.0, end: 30.0 };
        }
        let err = config.validate().unwrap_err();
        assert_eq!(err.to_string(), "spawn_delay_base must not get easier as time passes");
    }

    #[test]
    fn test_rejects_zero_duration_and_world() {
        let mut config = GameConfig::preset(GameVariant::FileDrop, World::new(800.0, 400.0));
        config.duration_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroDuration)));
        config.duration_secs = 20;
        config.world.width = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidWorld { .. })));
    }

    #[test]
    fn test_mobile_file_speed_scale() {
        let config = GameConfig::for_viewport(GameVariant::FileDrop, 390.0, 700.0, true);
        let VariantRules::FileDrop(rules) = &config.rules else {
            panic!("wrong variant");
        };
        assert!((rules.speed_scale - 4.375).abs() < 1e-4);

        let desktop = GameConfig::for_viewport(GameVariant::FileDrop, 800.0, 400.0, false);
        let VariantRules::FileDrop(rules) = &desktop.rules else {
            panic!("wrong variant");
        };
        assert_eq!(rules.speed_scale, 1.0);
    }

    #[test]
    fn test_variant_names() {
        for variant in GameVariant::ALL {
            assert_eq!(GameVariant::from_name(variant.as_str()), Some(variant));
        }
        assert_eq!(GameVariant::from_name("Whack"), Some(GameVariant::WhackADood));
        assert_eq!(GameVariant::from_name("pong"), None);
    }
}
