use crate::foundation::core::Rgb;
use crate::foundation::error::{FxError, FxResult};
use std::collections::BTreeMap;

/// A single parameter value.
///
/// JSON form is untagged: `true`, `12.5`, `[r, g, b]` or `"text"`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Number(f64),
    Color(Rgb),
    Text(String),
}

impl ParamValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Number(v) => Some(*v != 0.0),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Rgb> {
        match self {
            Self::Color(c) => Some(*c),
            Self::Text(s) => Rgb::from_hex(s).ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<Rgb> for ParamValue {
    fn from(v: Rgb) -> Self {
        Self::Color(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

/// Ordered parameter map; sorted keys keep serialized presets byte-stable.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ParamMap(BTreeMap<String, ParamValue>);

impl ParamMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: ParamValue) {
        self.0.insert(key.into(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn f32_or(&self, key: &str, default: f32) -> f32 {
        self.get(key)
            .and_then(ParamValue::as_f64)
            .map_or(default, |v| v as f32)
    }

    pub fn u32_or(&self, key: &str, default: u32) -> u32 {
        self.get(key)
            .and_then(ParamValue::as_f64)
            .map_or(default, |v| v.max(0.0).floor() as u32)
    }

    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(ParamValue::as_bool).unwrap_or(default)
    }

    pub fn color_or(&self, key: &str, default: Rgb) -> Rgb {
        self.get(key).and_then(ParamValue::as_color).unwrap_or(default)
    }

    pub fn str_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).and_then(ParamValue::as_str).unwrap_or(default)
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for ParamMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Value domain of a parameter, as exposed to control surfaces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParamKind {
    Number { min: f64, max: f64, step: f64 },
    Bool,
    Color,
    Choice(&'static [&'static str]),
    Text { max_len: usize },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParamDefault {
    Number(f64),
    Bool(bool),
    Color(Rgb),
    Text(&'static str),
}

impl ParamDefault {
    pub fn to_value(self) -> ParamValue {
        match self {
            Self::Number(v) => ParamValue::Number(v),
            Self::Bool(v) => ParamValue::Bool(v),
            Self::Color(c) => ParamValue::Color(c),
            Self::Text(s) => ParamValue::Text(s.to_owned()),
        }
    }
}

/// Documented range and default of one parameter key.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParamSpec {
    pub key: &'static str,
    pub kind: ParamKind,
    pub default: ParamDefault,
}

impl ParamSpec {
    pub const fn number(key: &'static str, min: f64, max: f64, step: f64, default: f64) -> Self {
        Self {
            key,
            kind: ParamKind::Number { min, max, step },
            default: ParamDefault::Number(default),
        }
    }

    pub const fn flag(key: &'static str, default: bool) -> Self {
        Self {
            key,
            kind: ParamKind::Bool,
            default: ParamDefault::Bool(default),
        }
    }

    pub const fn color(key: &'static str, default: Rgb) -> Self {
        Self {
            key,
            kind: ParamKind::Color,
            default: ParamDefault::Color(default),
        }
    }

    pub const fn choice(
        key: &'static str,
        choices: &'static [&'static str],
        default: &'static str,
    ) -> Self {
        Self {
            key,
            kind: ParamKind::Choice(choices),
            default: ParamDefault::Text(default),
        }
    }

    pub const fn text(key: &'static str, max_len: usize, default: &'static str) -> Self {
        Self {
            key,
            kind: ParamKind::Text { max_len },
            default: ParamDefault::Text(default),
        }
    }

    /// Normalize `value` into this parameter's domain.
    ///
    /// Out-of-range numbers are clamped and unknown choices fall back to the default; only a
    /// value of the wrong shape (e.g. text for a number) is an error.
    pub fn coerce(&self, value: ParamValue) -> FxResult<ParamValue> {
        let mismatch = |v: &ParamValue| {
            FxError::validation(format!(
                "parameter '{}' expects {:?}, got {v:?}",
                self.key, self.kind
            ))
        };
        match self.kind {
            ParamKind::Number { min, max, .. } => {
                let v = match &value {
                    ParamValue::Text(s) => s.trim().parse::<f64>().ok(),
                    other => other.as_f64(),
                }
                .ok_or_else(|| mismatch(&value))?;
                if !v.is_finite() {
                    return Ok(self.default.to_value());
                }
                Ok(ParamValue::Number(v.clamp(min, max)))
            }
            ParamKind::Bool => value
                .as_bool()
                .map(ParamValue::Bool)
                .ok_or_else(|| mismatch(&value)),
            ParamKind::Color => value
                .as_color()
                .map(ParamValue::Color)
                .ok_or_else(|| mismatch(&value)),
            ParamKind::Choice(choices) => {
                let s = value.as_str().ok_or_else(|| mismatch(&value))?;
                let norm = s.trim().to_ascii_lowercase();
                if choices.contains(&norm.as_str()) {
                    Ok(ParamValue::Text(norm))
                } else {
                    tracing::debug!(key = self.key, value = s, "unknown choice, using default");
                    Ok(self.default.to_value())
                }
            }
            ParamKind::Text { max_len } => {
                let s = value.as_str().ok_or_else(|| mismatch(&value))?;
                if s.len() > max_len {
                    return Err(FxError::validation(format!(
                        "parameter '{}' exceeds {max_len} bytes",
                        self.key
                    )));
                }
                Ok(ParamValue::Text(s.to_owned()))
            }
        }
    }
}

/// Intensity control: 0..1 in steps of 0.01.
pub const INTENSITY_SPEC: ParamSpec = ParamSpec::number("intensity", 0.0, 1.0, 0.01, 1.0);

/// Build the default parameter map for a spec table.
pub fn defaults(specs: &[ParamSpec]) -> ParamMap {
    specs
        .iter()
        .map(|s| (s.key, s.default.to_value()))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/effects/params.rs"]
mod tests;
