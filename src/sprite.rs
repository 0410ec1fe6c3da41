//! Sprites attached to elements, relationships and styles.
//!
//! A sprite is stored as one JSON document under [`SPRITE_PROPERTY`]. Construction
//! validates the record; loading trusts what was stored and treats anything unreadable as
//! absent.

use crate::error::{Error, Result};
use crate::model::PropertyBag;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const SPRITE_PROPERTY: &str = "c4:sprite";
pub const ICON_PROPERTY: &str = "c4:icon";

const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "svg"];

static HTTP_URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://\S+$").unwrap());
static STDLIB_REF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^<[A-Za-z0-9_\-]+(/[A-Za-z0-9_.\-]+)*>$").unwrap());

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Sprite {
    Image(ImageSprite),
    Builtin(BuiltinSprite),
    Library(LibrarySprite),
}

/// An image rendered with `img:<url>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSprite {
    url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scale: Option<f64>,
}

/// A PlantUML built-in (OpenIconic) icon such as `&folder`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuiltinSprite {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scale: Option<f64>,
}

/// A sprite defined by an included PlantUML library file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibrarySprite {
    name: String,
    path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scale: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    additional_includes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    additional_definitions: Vec<String>,
}

impl ImageSprite {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        if !HTTP_URL_RE.is_match(&url) {
            return Err(Error::InvalidImageScheme { url });
        }
        let lower = url.to_ascii_lowercase();
        let has_image_extension = lower
            .rsplit_once('.')
            .is_some_and(|(_, ext)| IMAGE_EXTENSIONS.contains(&ext));
        if !has_image_extension {
            return Err(Error::InvalidImageExtension {
                url,
                allowed: IMAGE_EXTENSIONS.join(", "),
            });
        }
        Ok(Self { url, scale: None })
    }

    pub fn with_scale(mut self, scale: f64) -> Result<Self> {
        self.scale = Some(validate_scale(scale)?);
        Ok(self)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn scale(&self) -> Option<f64> {
        self.scale
    }
}

impl BuiltinSprite {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        Ok(Self {
            name: validate_name(name.into())?,
            color: None,
            scale: None,
        })
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Result<Self> {
        self.scale = Some(validate_scale(scale)?);
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl LibrarySprite {
    /// `path` is either a stdlib reference (`<awslib/Compute/EC2>`) or an http(s) url of a
    /// `.puml` file.
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Result<Self> {
        Ok(Self {
            name: validate_name(name.into())?,
            path: validate_include(path.into())?,
            color: None,
            scale: None,
            additional_includes: Vec::new(),
            additional_definitions: Vec::new(),
        })
    }

    /// Catalog entries are trusted; the sprite name is the file stem of the url.
    pub(crate) fn from_catalog(url: &str) -> Self {
        let file = url.rsplit('/').next().unwrap_or(url);
        let name = file.strip_suffix(".puml").unwrap_or(file);
        Self {
            name: name.to_string(),
            path: url.to_string(),
            color: None,
            scale: None,
            additional_includes: Vec::new(),
            additional_definitions: Vec::new(),
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Result<Self> {
        self.scale = Some(validate_scale(scale)?);
        Ok(self)
    }

    /// Extra file the sprite depends on, e.g. a library's common definitions.
    pub fn with_include(mut self, path: impl Into<String>) -> Result<Self> {
        self.additional_includes.push(validate_include(path.into())?);
        Ok(self)
    }

    /// Extra preprocessor line emitted verbatim in the header, e.g. `!define AWSPuml ...`.
    pub fn with_definition(mut self, line: impl Into<String>) -> Self {
        self.additional_definitions.push(line.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl From<ImageSprite> for Sprite {
    fn from(sprite: ImageSprite) -> Self {
        Sprite::Image(sprite)
    }
}

impl From<BuiltinSprite> for Sprite {
    fn from(sprite: BuiltinSprite) -> Self {
        Sprite::Builtin(sprite)
    }
}

impl From<LibrarySprite> for Sprite {
    fn from(sprite: LibrarySprite) -> Self {
        Sprite::Library(sprite)
    }
}

impl Sprite {
    /// Value for a `$sprite=` / `$legendSprite=` argument.
    pub fn reference(&self) -> String {
        match self {
            Sprite::Image(image) => match image.scale {
                Some(scale) => format!("img:{}{{scale={}}}", image.url, scale),
                None => format!("img:{}", image.url),
            },
            Sprite::Builtin(builtin) => {
                let mut out = format!("&{}", builtin.name);
                push_options(&mut out, builtin.scale, builtin.color.as_deref());
                out
            }
            Sprite::Library(library) => {
                let mut out = library.name.clone();
                push_options(&mut out, library.scale, library.color.as_deref());
                out
            }
        }
    }

    /// Files that must be `!include`d for the sprite to resolve.
    pub fn includes(&self) -> Vec<&str> {
        match self {
            Sprite::Library(library) => std::iter::once(library.path.as_str())
                .chain(library.additional_includes.iter().map(String::as_str))
                .collect(),
            Sprite::Image(_) | Sprite::Builtin(_) => Vec::new(),
        }
    }

    pub fn definitions(&self) -> &[String] {
        match self {
            Sprite::Library(library) => &library.additional_definitions,
            Sprite::Image(_) | Sprite::Builtin(_) => &[],
        }
    }

    pub fn to_json(&self) -> String {
        // Every field is a string, number or list of strings, so this cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn from_json(json: &str) -> Option<Self> {
        match serde_json::from_str(json) {
            Ok(sprite) => Some(sprite),
            Err(err) => {
                tracing::warn!(error = %err, "ignoring malformed sprite record");
                None
            }
        }
    }

    pub fn store(&self, bag: &mut PropertyBag) {
        bag.insert(SPRITE_PROPERTY.to_string(), self.to_json());
    }

    pub fn load(bag: &PropertyBag) -> Option<Self> {
        bag.get(SPRITE_PROPERTY).and_then(|json| Self::from_json(json))
    }
}

fn push_options(out: &mut String, scale: Option<f64>, color: Option<&str>) {
    if let Some(scale) = scale {
        out.push_str(&format!(",scale={scale}"));
    }
    if let Some(color) = color {
        out.push_str(&format!(",color={color}"));
    }
}

fn validate_scale(scale: f64) -> Result<f64> {
    if scale.is_finite() && scale > 0.0 {
        Ok(scale)
    } else {
        Err(Error::InvalidSpriteScale { scale })
    }
}

fn validate_name(name: String) -> Result<String> {
    if name.trim().is_empty() {
        Err(Error::BlankSpriteName)
    } else {
        Ok(name)
    }
}

fn validate_include(path: String) -> Result<String> {
    let is_url = HTTP_URL_RE.is_match(&path) && path.ends_with(".puml");
    if is_url || STDLIB_REF_RE.is_match(&path) {
        Ok(path)
    } else {
        Err(Error::InvalidSpriteInclude { path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(sprite: Sprite) {
        let mut bag = PropertyBag::new();
        sprite.store(&mut bag);
        assert_eq!(Sprite::load(&bag), Some(sprite));
    }

    #[test]
    fn image_round_trip() {
        round_trip(ImageSprite::new("https://example.com/logo.png").unwrap().into());
        round_trip(
            ImageSprite::new("http://example.com/a/logo.SVG")
                .unwrap()
                .with_scale(0.4)
                .unwrap()
                .into(),
        );
    }

    #[test]
    fn builtin_round_trip() {
        round_trip(BuiltinSprite::new("folder").unwrap().into());
        round_trip(
            BuiltinSprite::new("cloud")
                .unwrap()
                .with_color("#00ff00")
                .with_scale(2.0)
                .unwrap()
                .into(),
        );
    }

    #[test]
    fn library_round_trip() {
        round_trip(
            LibrarySprite::new("EC2", "<awslib/Compute/EC2>")
                .unwrap()
                .into(),
        );
        round_trip(
            LibrarySprite::new("kafka", "https://example.com/sprites/kafka.puml")
                .unwrap()
                .with_color("red")
                .with_scale(0.5)
                .unwrap()
                .with_include("<awslib/AWSCommon>")
                .unwrap()
                .with_definition("!define AWSPuml https://example.com/dist")
                .into(),
        );
    }

    #[test]
    fn validates_construction() {
        assert!(matches!(
            ImageSprite::new("ftp://example.com/logo.png"),
            Err(Error::InvalidImageScheme { .. })
        ));
        assert!(matches!(
            ImageSprite::new("https://example.com/logo.txt"),
            Err(Error::InvalidImageExtension { .. })
        ));
        assert!(matches!(
            BuiltinSprite::new("  "),
            Err(Error::BlankSpriteName)
        ));
        assert!(matches!(
            BuiltinSprite::new("x").unwrap().with_scale(0.0),
            Err(Error::InvalidSpriteScale { .. })
        ));
        assert!(matches!(
            BuiltinSprite::new("x").unwrap().with_scale(f64::NAN),
            Err(Error::InvalidSpriteScale { .. })
        ));
        assert!(matches!(
            LibrarySprite::new("x", "awslib/Compute/EC2"),
            Err(Error::InvalidSpriteInclude { .. })
        ));
        assert!(matches!(
            LibrarySprite::new("x", "https://example.com/x.png"),
            Err(Error::InvalidSpriteInclude { .. })
        ));
    }

    #[test]
    fn references() {
        let image: Sprite = ImageSprite::new("https://example.com/logo.png")
            .unwrap()
            .with_scale(0.5)
            .unwrap()
            .into();
        assert_eq!(image.reference(), "img:https://example.com/logo.png{scale=0.5}");

        let builtin: Sprite = BuiltinSprite::new("folder")
            .unwrap()
            .with_color("red")
            .with_scale(2.0)
            .unwrap()
            .into();
        assert_eq!(builtin.reference(), "&folder,scale=2,color=red");

        let library: Sprite = LibrarySprite::new("EC2", "<awslib/Compute/EC2>")
            .unwrap()
            .with_include("<awslib/AWSCommon>")
            .unwrap()
            .into();
        assert_eq!(library.reference(), "EC2");
        assert_eq!(library.includes(), vec!["<awslib/Compute/EC2>", "<awslib/AWSCommon>"]);
    }

    #[test]
    fn catalog_sprites_take_the_file_stem() {
        let sprite = LibrarySprite::from_catalog("https://example.com/logos/kafka.puml");
        assert_eq!(sprite.name(), "kafka");
        assert_eq!(sprite.path(), "https://example.com/logos/kafka.puml");
    }

    #[test]
    fn malformed_records_load_as_absent() {
        let mut bag = PropertyBag::new();
        bag.insert(SPRITE_PROPERTY.to_string(), "{not json".to_string());
        assert_eq!(Sprite::load(&bag), None);
        bag.insert(SPRITE_PROPERTY.to_string(), r#"{"type":"unknown"}"#.to_string());
        assert_eq!(Sprite::load(&bag), None);
    }
}
