use anyhow::{Result, anyhow};
use directories::UserDirs;
use log::{info, warn};
use serde::{Deserialize, Deserializer, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    io::Write,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::actions::{Action, ActionMap, Binding};
use crate::direction::is_valid_threshold;
use crate::gestures::{ClassifierConfig, SEGMENT_COUNT};
use crate::label::GestureLabel;
use crate::session::SessionConfig;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Meta {
    pub name: Option<String>,
    #[serde(default = "default_true")]
    pub show_preview: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Thresholds {
    pub min_gesture_length: f64,
    pub direction_threshold: f64,
    pub final_samples: usize,
    pub preview_samples: usize,
    pub complexity_samples: usize,
    pub complexity_step: usize,
    pub max_direction_runs: usize,
    pub loop_ratio: f64,
    pub min_loop_diagonal: f64,
    pub preview_delay_ms: u64,
    pub movement_threshold: f64,
    pub discard_linger_ms: u64,
    pub discard_min_points: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        let c = ClassifierConfig::default();
        Self {
            min_gesture_length: c.min_gesture_length,
            direction_threshold: c.direction_threshold,
            final_samples: c.sample_count,
            preview_samples: ClassifierConfig::preview().sample_count,
            complexity_samples: c.complexity_samples,
            complexity_step: c.complexity_step,
            max_direction_runs: c.max_direction_runs,
            loop_ratio: c.loop_ratio,
            min_loop_diagonal: c.min_loop_diagonal,
            preview_delay_ms: 200,
            movement_threshold: 5.0,
            discard_linger_ms: 500,
            discard_min_points: 10,
        }
    }
}

impl Thresholds {
    pub fn classifier(&self, sample_count: usize) -> ClassifierConfig {
        ClassifierConfig {
            sample_count,
            min_gesture_length: self.min_gesture_length,
            direction_threshold: self.direction_threshold,
            complexity_samples: self.complexity_samples,
            complexity_step: self.complexity_step,
            max_direction_runs: self.max_direction_runs,
            loop_ratio: self.loop_ratio,
            min_loop_diagonal: self.min_loop_diagonal,
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            final_classifier: self.classifier(self.final_samples),
            preview_classifier: self.classifier(self.preview_samples),
            preview_delay: Duration::from_millis(self.preview_delay_ms),
            movement_threshold: self.movement_threshold,
            discard_min_points: self.discard_min_points,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub meta: Meta,
    #[serde(default)]
    pub thresholds: Thresholds,

    // `left = "back"` or `left = { action = "back", description = "..." }`
    #[serde(default, deserialize_with = "deserialize_bindings")]
    pub bindings: BTreeMap<String, Binding>,
}

impl Profile {
    pub fn from_toml_str(txt: &str) -> Result<Self> {
        let profile: Profile = toml::from_str(txt)?;
        validate_profile(&profile)?;
        Ok(profile)
    }

    /// Binding keys are validated on load, so nothing is dropped here.
    pub fn action_map(&self) -> ActionMap {
        self.bindings
            .iter()
            .filter_map(|(k, b)| match k.parse::<GestureLabel>() {
                Ok(label) => Some((label, b.clone())),
                Err(e) => {
                    warn!("skipping binding '{k}': {e}");
                    None
                }
            })
            .collect()
    }

    pub fn session_config(&self) -> SessionConfig {
        self.thresholds.session_config()
    }
}

// --------- tolerant bindings deserializer ----------
fn deserialize_bindings<'de, D>(de: D) -> std::result::Result<BTreeMap<String, Binding>, D::Error>
where
    D: Deserializer<'de>,
{
    let val = toml::Value::deserialize(de)?;
    let table = match val {
        toml::Value::Table(t) => t,
        other => {
            return Err(serde::de::Error::custom(format!(
                "bindings must be a table, got {}",
                other.type_str()
            )));
        }
    };

    let mut out = BTreeMap::new();
    for (k, v) in table {
        let binding = binding_from_value(&k, v).map_err(serde::de::Error::custom)?;
        out.insert(k, binding);
    }
    Ok(out)
}

fn binding_from_value(key: &str, v: toml::Value) -> std::result::Result<Binding, String> {
    match v {
        toml::Value::String(id) => Action::from_id(id.trim())
            .map(Binding::from)
            .ok_or_else(|| format!("binding '{key}' has invalid action '{id}'")),
        toml::Value::Table(t) => toml::Value::Table(t)
            .try_into::<Binding>()
            .map_err(|e| format!("binding '{key}': {e}")),
        other => Err(format!(
            "binding '{}' must be an action id or a table, got {}",
            key,
            other.type_str()
        )),
    }
}
// ------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ConfigState {
    pub active_name: String,
    pub profile: Profile,
    pub config_dir: PathBuf,
    pub profiles_dir: PathBuf,
    pub active_ptr: PathBuf,
}

fn config_dir() -> Result<PathBuf> {
    let dirs = UserDirs::new().ok_or_else(|| anyhow!("cannot determine home directory"))?;
    Ok(dirs.home_dir().join(".config").join("strokectl"))
}

fn default_profile_text() -> &'static str {
    include_str!("../profiles/default.toml")
}

impl ConfigState {
    pub fn load_or_install_default() -> Result<Self> {
        Self::load_or_install_in(config_dir()?)
    }

    /// Same as `load_or_install_default`, rooted at `cfgdir`.
    pub fn load_or_install_in(cfgdir: PathBuf) -> Result<Self> {
        let profdir = cfgdir.join("profiles");
        fs::create_dir_all(&profdir)?;

        let def_path = profdir.join("default.toml");
        if !def_path.exists() {
            fs::write(&def_path, default_profile_text())?;
            info!("installed default profile at {}", def_path.display());
        }

        let active_ptr = cfgdir.join("active");
        if !active_ptr.exists() {
            let mut f = fs::File::create(&active_ptr)?;
            f.write_all(b"default")?;
        }

        let active_name = fs::read_to_string(&active_ptr)?.trim().to_string();
        let profile = load_profile(&profdir, &active_name)?;

        Ok(Self {
            active_name,
            profile,
            config_dir: cfgdir,
            profiles_dir: profdir,
            active_ptr,
        })
    }

    pub fn profile_path(&self) -> PathBuf {
        self.profiles_dir.join(format!("{}.toml", self.active_name))
    }

    pub fn reload(&mut self) -> Result<()> {
        self.profile = load_profile(&self.profiles_dir, &self.active_name)?;
        Ok(())
    }

    pub fn set_active(&mut self, name: &str) -> Result<()> {
        let p = self.profiles_dir.join(format!("{name}.toml"));
        if !p.exists() {
            return Err(anyhow!("profile not found: {}", p.display()));
        }
        let profile = load_profile(&self.profiles_dir, name)?;
        fs::write(&self.active_ptr, name.as_bytes())?;
        self.active_name = name.to_string();
        self.profile = profile;
        Ok(())
    }

    pub fn list_profiles(&self) -> Vec<String> {
        let mut v = Vec::new();
        if let Ok(rd) = fs::read_dir(&self.profiles_dir) {
            for e in rd.flatten() {
                let path = e.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                        v.push(stem.to_string());
                    }
                }
            }
        }
        v.sort();
        v
    }

    pub fn doctor_report(&self) -> serde_json::Value {
        let broken: Vec<serde_json::Value> = self
            .list_profiles()
            .into_iter()
            .filter_map(|name| {
                load_profile(&self.profiles_dir, &name)
                    .err()
                    .map(|e| serde_json::json!({ "profile": name, "error": e.to_string() }))
            })
            .collect();
        serde_json::json!({
            "config_dir": self.config_dir,
            "profiles_dir": self.profiles_dir,
            "active_profile": self.active_name,
            "show_preview": self.profile.meta.show_preview,
            "thresholds": self.profile.thresholds,
            "bindings": self.profile.bindings.len(),
            "broken_profiles": broken,
        })
    }
}

fn load_profile(profdir: &Path, name: &str) -> Result<Profile> {
    let path = profdir.join(format!("{name}.toml"));
    let txt = fs::read_to_string(&path)
        .map_err(|e| anyhow!("failed to read {}: {e}", path.display()))?;
    Profile::from_toml_str(&txt).map_err(|e| anyhow!("failed to parse {}: {e}", path.display()))
}

pub fn validate_profile(p: &Profile) -> Result<()> {
    let th = &p.thresholds;
    if !is_valid_threshold(th.direction_threshold) {
        return Err(anyhow!(
            "thresholds.direction_threshold must be in (0, 45] degrees"
        ));
    }
    if th.final_samples < SEGMENT_COUNT || th.preview_samples < SEGMENT_COUNT {
        return Err(anyhow!(
            "thresholds.final_samples and preview_samples must be at least {SEGMENT_COUNT}"
        ));
    }
    if th.complexity_samples == 0 {
        return Err(anyhow!("thresholds.complexity_samples must be positive"));
    }
    if th.complexity_step == 0 {
        return Err(anyhow!("thresholds.complexity_step must be positive"));
    }
    if th.max_direction_runs == 0 {
        return Err(anyhow!("thresholds.max_direction_runs must be positive"));
    }
    if !(th.min_gesture_length > 0.0) {
        return Err(anyhow!("thresholds.min_gesture_length must be positive"));
    }
    if !(th.loop_ratio > 1.0) {
        return Err(anyhow!("thresholds.loop_ratio must be greater than 1"));
    }
    if !(th.min_loop_diagonal >= 0.0) {
        return Err(anyhow!("thresholds.min_loop_diagonal must not be negative"));
    }
    if !(th.movement_threshold >= 0.0) {
        return Err(anyhow!("thresholds.movement_threshold must not be negative"));
    }

    for k in p.bindings.keys() {
        if let Err(e) = k.parse::<GestureLabel>() {
            return Err(anyhow!("binding '{}' is not a gesture: {e}", k));
        }
    }
    Ok(())
}
