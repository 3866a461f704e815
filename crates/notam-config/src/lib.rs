use notam_engine::filter::{CorridorFilter, FilterState, SmartFilters, TimeWindowFilter};
use notam_engine::group::DEFAULT_DISTANT_THRESHOLD_NM;
use notam_engine::{GroupingMode, PriorityConfig, ReviewEngine, RuleKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// User configuration for briefing review
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub filters: FiltersConfig,

    #[serde(default)]
    pub priority: PriorityRulesConfig,

    #[serde(default)]
    pub grouping: GroupingConfig,
}

/// Defaults for the filter panel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiltersConfig {
    #[serde(default)]
    pub corridor_enabled: bool,

    #[serde(default = "default_corridor_width")]
    pub corridor_width_nm: f64,

    #[serde(default = "default_true")]
    pub hide_helicopter: bool,

    #[serde(default = "default_true")]
    pub filter_obstacles: bool,

    #[serde(default = "default_obstacle_distance")]
    pub obstacle_distance_nm: f64,

    #[serde(default = "default_true")]
    pub time_window_enabled: bool,

    #[serde(default = "default_buffer_minutes")]
    pub buffer_before_minutes: i64,

    #[serde(default = "default_buffer_minutes")]
    pub buffer_after_minutes: i64,

    #[serde(default = "default_true")]
    pub show_read: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorityRulesConfig {
    #[serde(default = "default_close_distance")]
    pub close_distance_nm: f64,

    #[serde(default = "default_obstacle_distance")]
    pub obstacle_threshold_nm: f64,

    /// Rule evaluation order; rules left out are disabled
    #[serde(default = "default_rules")]
    pub rules: Vec<RuleKind>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupingConfig {
    #[serde(default)]
    pub mode: GroupingMode,

    #[serde(default = "default_distant_threshold")]
    pub distant_threshold_nm: f64,
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            corridor_enabled: false,
            corridor_width_nm: default_corridor_width(),
            hide_helicopter: true,
            filter_obstacles: true,
            obstacle_distance_nm: default_obstacle_distance(),
            time_window_enabled: true,
            buffer_before_minutes: default_buffer_minutes(),
            buffer_after_minutes: default_buffer_minutes(),
            show_read: true,
        }
    }
}

impl Default for PriorityRulesConfig {
    fn default() -> Self {
        Self {
            close_distance_nm: default_close_distance(),
            obstacle_threshold_nm: default_obstacle_distance(),
            rules: default_rules(),
        }
    }
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            mode: GroupingMode::default(),
            distant_threshold_nm: default_distant_threshold(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_corridor_width() -> f64 {
    25.0
}

fn default_obstacle_distance() -> f64 {
    2.0
}

fn default_buffer_minutes() -> i64 {
    120
}

fn default_close_distance() -> f64 {
    10.0
}

fn default_rules() -> Vec<RuleKind> {
    RuleKind::DEFAULT_ORDER.to_vec()
}

fn default_distant_threshold() -> f64 {
    DEFAULT_DISTANT_THRESHOLD_NM
}

impl Config {
    /// Load config from default location or create default if not found
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = Config::default();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let content = toml::to_string_pretty(&config)?;
            std::fs::write(path, content)?;
            Ok(config)
        }
    }

    /// Get config file path
    pub fn config_path() -> PathBuf {
        if let Some(dirs) = directories::ProjectDirs::from("com", "notam", "notam") {
            dirs.config_dir().join("config.toml")
        } else {
            PathBuf::from("~/.notam/config.toml")
        }
    }

    /// Initial filter state for a review
    pub fn filter_state(&self) -> FilterState {
        let f = &self.filters;
        let mut state = FilterState {
            smart: SmartFilters {
                hide_helicopter: f.hide_helicopter,
                filter_obstacles: f.filter_obstacles,
                obstacle_distance_nm: f.obstacle_distance_nm,
                ..Default::default()
            },
            corridor: CorridorFilter {
                enabled: f.corridor_enabled,
                width_nm: f.corridor_width_nm,
            },
            time_window: TimeWindowFilter {
                enabled: f.time_window_enabled,
                buffer_before_minutes: f.buffer_before_minutes,
                buffer_after_minutes: f.buffer_after_minutes,
            },
            grouping: self.grouping.mode,
            ..Default::default()
        };
        state.visibility.show_read = f.show_read;
        state
    }

    pub fn priority_engine_config(&self) -> PriorityConfig {
        PriorityConfig {
            close_distance_nm: self.priority.close_distance_nm,
            obstacle_threshold_nm: self.priority.obstacle_threshold_nm,
            rules: self.priority.rules.clone(),
        }
    }

    pub fn review_engine(&self) -> ReviewEngine {
        ReviewEngine::from_config(&self.priority_engine_config())
            .with_distant_threshold(self.grouping.distant_threshold_nm)
    }
}
