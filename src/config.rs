use crate::geometry;
use crate::host::ClassName;
use crate::style::Style;
use derive_more::{AsRef, Deref, Display, From, Into};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_with::{DurationMilliSeconds, serde_as};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_EXPANSIBLE: f64 = 20.0;

/// Class prefix shared by every node the controller creates.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct Prefix(String);

crate::impl_string_newtype!(Prefix);

impl Prefix {
    /// `prefix` alone, or `prefix-suffix`.
    pub fn class(&self, suffix: Option<&str>) -> ClassName {
        match suffix {
            Some(suffix) => ClassName::new(format!("{}-{}", self.0, suffix)),
            None => ClassName::new(self.0.clone()),
        }
    }
}

impl Default for Prefix {
    fn default() -> Self {
        Self::new("balloon")
    }
}

/// Hover growth in px. `None` disables hover expansion.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "ExpansibleRepr", into = "ExpansibleRepr")]
pub struct Expansible(Option<f64>);

impl Expansible {
    pub fn new(delta: f64) -> Self {
        Self::from(ExpansibleRepr::Delta(delta))
    }

    pub fn disabled() -> Self {
        Self(None)
    }

    pub fn delta(&self) -> Option<f64> {
        self.0
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
enum ExpansibleRepr {
    Delta(f64),
    Toggle(bool),
}

impl From<ExpansibleRepr> for Expansible {
    fn from(repr: ExpansibleRepr) -> Self {
        match repr {
            ExpansibleRepr::Delta(d) if d.is_finite() && d != 0.0 => Self(Some(d)),
            ExpansibleRepr::Delta(_) | ExpansibleRepr::Toggle(false) => Self(None),
            ExpansibleRepr::Toggle(true) => Self(Some(DEFAULT_EXPANSIBLE)),
        }
    }
}

impl From<Expansible> for ExpansibleRepr {
    fn from(expansible: Expansible) -> Self {
        expansible
            .0
            .map_or(ExpansibleRepr::Toggle(false), ExpansibleRepr::Delta)
    }
}

pub type Renderer = Arc<dyn Fn(f64, usize) -> String + Send + Sync>;

/// Produces the markup shown inside a balloon.
#[derive(Clone, Default)]
pub enum ContentProvider {
    /// Rounded angle followed by a degree sign.
    #[default]
    DefaultLabel,
    /// Called with the normalized angle and the balloon index.
    CustomRenderer(Renderer),
}

impl ContentProvider {
    pub fn render(&self, angle: f64, index: usize) -> String {
        match self {
            Self::DefaultLabel => format!("{}º", geometry::round_half_up(angle) as i64),
            Self::CustomRenderer(render) => render(angle, index),
        }
    }
}

impl fmt::Debug for ContentProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DefaultLabel => f.write_str("DefaultLabel"),
            Self::CustomRenderer(_) => f.write_str("CustomRenderer(..)"),
        }
    }
}

/// Caller input for one balloon. Missing values fall back to the controller's options.
///
/// Values of the wrong type in a configuration source are read as NaN, so a malformed
/// balloon is skipped at placement instead of failing the whole configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalloonSpec {
    #[serde(
        deserialize_with = "lenient::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub angle: Option<f64>,
    #[serde(
        deserialize_with = "lenient::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub radius: Option<f64>,
    #[serde(
        deserialize_with = "lenient::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub balloon_radius: Option<f64>,
    pub css: Style,
}

impl BalloonSpec {
    pub fn at(angle: f64) -> Self {
        Self {
            angle: Some(angle),
            ..Self::default()
        }
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }

    pub fn with_balloon_radius(mut self, balloon_radius: f64) -> Self {
        self.balloon_radius = Some(balloon_radius);
        self
    }

    pub fn with_css(mut self, css: Style) -> Self {
        self.css = css;
        self
    }
}

mod lenient {
    use serde::de::IgnoredAny;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Numeric {
        Number(f64),
        Other(IgnoredAny),
    }

    pub fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        Ok(match Option::<Numeric>::deserialize(deserializer)? {
            Some(Numeric::Number(n)) => Some(n),
            Some(Numeric::Other(_)) => Some(f64::NAN),
            None => None,
        })
    }
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub autoshow: bool,
    pub balloons: Vec<BalloonSpec>,
    pub balloon_radius: f64,
    pub balloon_css: Style,
    pub center: bool,
    pub center_css: Style,
    pub prefix: Prefix,
    pub radius: f64,
    pub rotate_content: bool,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub timeout: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub fade: Duration,
    pub expansible: Expansible,
    /// Resting opacity restored when the pointer leaves a balloon.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<String>,
    #[serde(skip)]
    pub content: ContentProvider,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            autoshow: false,
            balloons: Vec::new(),
            balloon_radius: 10.0,
            balloon_css: Style::new()
                .with("background", "#3089C0")
                .with("box-shadow", "0 1px 5px rgba(0,0,0,0.25)")
                .with("color", "white")
                .with("cursor", "pointer")
                .with("font-family", "'Droid Sans',sans-serif")
                .with("font-weight", "bold")
                .with("font-size", "11px")
                .with("opacity", 0.8)
                .with("position", "relative")
                .with("text-align", "center"),
            center: false,
            center_css: Style::new()
                .with("background", "transparent")
                .with("border", "1px dashed #e8e8e8")
                .with("margin", -1)
                .with("opacity", 0.5),
            prefix: Prefix::default(),
            radius: 100.0,
            rotate_content: true,
            timeout: Duration::from_millis(500),
            fade: Duration::from_millis(600),
            expansible: Expansible::new(DEFAULT_EXPANSIBLE),
            opacity: None,
            border: None,
            content: ContentProvider::DefaultLabel,
        }
    }
}

impl Options {
    /// Layers `overrides` on top of the defaults. Nested tables merge key by key, scalars
    /// and lists replace.
    pub fn merged<S>(overrides: S) -> Result<Self, ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let s = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?)
            .add_source(overrides)
            .build()?;

        Ok(s.try_deserialize()?)
    }

    pub fn from_toml(overrides: &str) -> Result<Self, ConfigError> {
        Self::merged(config::File::from_str(overrides, config::FileFormat::Toml))
    }

    pub fn with_balloons(mut self, balloons: Vec<BalloonSpec>) -> Self {
        self.balloons = balloons;
        self
    }

    pub fn with_renderer<F>(mut self, render: F) -> Self
    where
        F: Fn(f64, usize) -> String + Send + Sync + 'static,
    {
        self.content = ContentProvider::CustomRenderer(Arc::new(render));
        self
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
}

pub fn get_config_path() -> Result<std::path::PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "balloons", "balloons").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

/// Defaults, then the user's `config.toml` if present, then `BALLOONS_*` variables.
pub fn load_config() -> Result<Options, ConfigError> {
    let config_path = get_config_path()?;

    let s = config::Config::builder()
        .add_source(config::Config::try_from(&Options::default())?)
        .add_source(config::File::from(config_path).required(false))
        .add_source(config::Environment::with_prefix("BALLOONS").try_parsing(true))
        .build()?;

    Ok(s.try_deserialize()?)
}

pub fn write_default_config() -> std::io::Result<std::path::PathBuf> {
    let path =
        get_config_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

pub const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_file_matches_defaults() {
        let from_file = Options::from_toml(DEFAULT_CONFIG).unwrap();

        assert_eq!(
            serde_json::to_value(&from_file).unwrap(),
            serde_json::to_value(Options::default()).unwrap()
        );
    }

    #[test]
    fn test_overrides_merge_nested_tables() {
        let options = Options::from_toml(
            r#"
            radius = 150
            timeout = 250

            [balloon_css]
            background = "yellow"
            "#,
        )
        .unwrap();

        assert_eq!(options.radius, 150.0);
        assert_eq!(options.timeout, Duration::from_millis(250));
        assert_eq!(options.balloon_radius, 10.0);
        assert_eq!(options.balloon_css["background"].to_string(), "yellow");
        assert_eq!(options.balloon_css["color"].to_string(), "white");
        assert_eq!(options.balloon_css.number("opacity"), Some(0.8));
    }

    #[test]
    fn test_balloon_list_is_read_in_order() {
        let options = Options::from_toml(
            r#"
            [[balloons]]
            angle = 35
            radius = 150
            balloon_radius = 50
            css = { background = "yellow" }

            [[balloons]]
            angle = "north"

            [[balloons]]
            angle = 135
            "#,
        )
        .unwrap();

        assert_eq!(options.balloons.len(), 3);
        assert_eq!(
            options.balloons[0],
            BalloonSpec::at(35.0)
                .with_radius(150.0)
                .with_balloon_radius(50.0)
                .with_css(Style::new().with("background", "yellow"))
        );
        assert!(options.balloons[1].angle.is_some_and(f64::is_nan));
        assert_eq!(options.balloons[2], BalloonSpec::at(135.0));
    }

    #[test]
    fn test_expansible_deserialization() {
        let cases = vec![
            ("20", Some(20.0)),
            ("12.5", Some(12.5)),
            ("0", None),
            ("false", None),
            ("true", Some(DEFAULT_EXPANSIBLE)),
        ];

        for (json, expected) in cases {
            let deserialized: Expansible = serde_json::from_str(json).unwrap();
            assert_eq!(deserialized.delta(), expected, "{json}");
        }
    }

    #[test]
    fn test_content_provider() {
        let options = Options::default().with_renderer(|angle, index| format!("#{index}@{angle}"));

        assert_eq!(ContentProvider::DefaultLabel.render(44.5, 0), "45º");
        assert_eq!(options.content.render(90.0, 2), "#2@90");
    }

    #[test]
    fn test_prefix_classes() {
        let prefix = Prefix::new("ring");

        assert_eq!(prefix.class(None).as_str(), "ring");
        assert_eq!(prefix.class(Some("inner")).as_str(), "ring-inner");
    }
}
