use crate::foundation::core::Rgb;
use crate::effects::params::ParamSpec;

/// Processing category of an effect kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Pixel,
    Surface,
    Particle,
    Audio,
    Landmark,
    Overlay,
    Custom,
}

/// Closed set of effect kinds. The serialized form is the stable effect id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum EffectKind {
    #[serde(rename = "grayscale")]
    Grayscale,
    #[serde(rename = "brightness")]
    Brightness,
    #[serde(rename = "colortint")]
    ColorTint,
    #[serde(rename = "neonglow")]
    NeonGlow,
    #[serde(rename = "vintage")]
    Vintage,
    #[serde(rename = "pixelate")]
    Pixelate,
    #[serde(rename = "edgedetect")]
    EdgeDetect,
    #[serde(rename = "rgbsplit")]
    RgbSplit,
    #[serde(rename = "glitch")]
    Glitch,
    #[serde(rename = "mirror")]
    Mirror,
    #[serde(rename = "filmgrain")]
    FilmGrain,
    #[serde(rename = "vignette")]
    Vignette,
    #[serde(rename = "kaleidoscope")]
    Kaleidoscope,
    #[serde(rename = "chromakey")]
    ChromaKey,
    #[serde(rename = "motionblur")]
    MotionBlur,
    #[serde(rename = "blur")]
    BackgroundBlur,
    #[serde(rename = "backgroundreplace")]
    BackgroundReplace,
    #[serde(rename = "outline")]
    Outline,
    #[serde(rename = "snow")]
    Snow,
    #[serde(rename = "rain")]
    Rain,
    #[serde(rename = "confetti")]
    Confetti,
    #[serde(rename = "fireflies")]
    Fireflies,
    #[serde(rename = "sparkles")]
    Sparkles,
    #[serde(rename = "floatinghearts")]
    FloatingHearts,
    #[serde(rename = "emojireaction")]
    EmojiReaction,
    #[serde(rename = "audiovisualizer")]
    AudioVisualizer,
    #[serde(rename = "bassreactive")]
    BassReactive,
    #[serde(rename = "voicereactive")]
    VoiceReactive,
    #[serde(rename = "armask")]
    ArMask,
    #[serde(rename = "facebeautify")]
    FaceBeautify,
    #[serde(rename = "smartblur")]
    SmartSegment,
    #[serde(rename = "textoverlay")]
    TextOverlay,
    #[serde(rename = "subtitles")]
    Subtitles,
    #[serde(rename = "lowerthird")]
    LowerThird,
    #[serde(rename = "glowingring")]
    GlowingRing,
    #[serde(rename = "spinningstars")]
    SpinningStars,
    #[serde(rename = "floatingcube")]
    FloatingCube,
    #[serde(rename = "custom")]
    Custom,
}

pub(crate) const MASK_STYLES: &[&str] = &[
    "glasses",
    "sunglasses",
    "mustache",
    "hat",
    "animeeyes",
    "dogears",
    "cat",
    "crown",
];
pub(crate) const VISUALIZER_STYLES: &[&str] = &["bars", "waveform", "circle", "spectrum"];
pub(crate) const KEY_BACKGROUNDS: &[&str] = &["blur", "color", "image", "transparent"];
pub(crate) const REPLACE_BACKGROUNDS: &[&str] = &["blur", "color", "image"];
pub(crate) const EMOJI_GLYPHS: &[&str] = &["heart", "star", "smile", "fire"];
pub(crate) const TEXT_ANIMATIONS: &[&str] = &["none", "fade", "bounce", "typewriter"];
pub(crate) const BADGE_POSITIONS: &[&str] = &["bottom-left", "bottom-right", "bottom-center"];

/// Maximum byte length of a custom channel expression.
pub const MAX_EXPR_LEN: usize = crate::expression::MAX_SOURCE_LEN;

const GRAYSCALE: &[ParamSpec] = &[];
const BRIGHTNESS: &[ParamSpec] = &[
    ParamSpec::number("brightness", -100.0, 100.0, 1.0, 0.0),
    ParamSpec::number("contrast", -1.0, 1.0, 0.01, 0.0),
];
const COLOR_TINT: &[ParamSpec] = &[ParamSpec::color("color", Rgb::new(255, 200, 150))];
const NEON_GLOW: &[ParamSpec] = &[ParamSpec::color("color", Rgb::WHITE)];
const VINTAGE: &[ParamSpec] = &[];
const PIXELATE: &[ParamSpec] = &[ParamSpec::number("blockSize", 2.0, 64.0, 1.0, 10.0)];
const EDGE_DETECT: &[ParamSpec] = &[
    ParamSpec::number("threshold", 0.0, 255.0, 1.0, 50.0),
    ParamSpec::flag("invert", false),
];
const RGB_SPLIT: &[ParamSpec] = &[
    ParamSpec::number("amount", 0.0, 50.0, 1.0, 5.0),
    ParamSpec::number("angle", 0.0, 360.0, 1.0, 0.0),
];
const GLITCH: &[ParamSpec] = &[
    ParamSpec::number("amount", 0.0, 100.0, 1.0, 20.0),
    ParamSpec::number("frequency", 0.0, 1.0, 0.01, 0.1),
];
const MIRROR: &[ParamSpec] = &[
    ParamSpec::flag("horizontal", true),
    ParamSpec::flag("vertical", false),
];
const FILM_GRAIN: &[ParamSpec] = &[ParamSpec::number("amount", 0.0, 1.0, 0.01, 0.1)];

const VIGNETTE: &[ParamSpec] = &[
    ParamSpec::number("strength", 0.0, 1.0, 0.01, 0.5),
    ParamSpec::number("size", 0.0, 0.99, 0.01, 0.7),
];
const KALEIDOSCOPE: &[ParamSpec] = &[
    ParamSpec::number("segments", 2.0, 12.0, 1.0, 6.0),
    ParamSpec::number("rotation", 0.0, 360.0, 1.0, 0.0),
    ParamSpec::number("zoom", 0.5, 3.0, 0.1, 1.0),
    ParamSpec::flag("mirror", true),
];
const CHROMA_KEY: &[ParamSpec] = &[
    ParamSpec::color("keyColor", Rgb::GREEN),
    ParamSpec::number("threshold", 0.0, 442.0, 1.0, 40.0),
    ParamSpec::number("smoothness", 0.0, 100.0, 1.0, 10.0),
    ParamSpec::choice("background", KEY_BACKGROUNDS, "blur"),
    ParamSpec::color("backgroundColor", Rgb::BLACK),
    ParamSpec::number("blurAmount", 1.0, 50.0, 1.0, 20.0),
];
const MOTION_BLUR: &[ParamSpec] = &[
    ParamSpec::number("samples", 2.0, 10.0, 1.0, 5.0),
    ParamSpec::number("strength", 0.0, 1.0, 0.01, 0.8),
];
const BACKGROUND_BLUR: &[ParamSpec] = &[
    ParamSpec::number("amount", 1.0, 50.0, 1.0, 15.0),
    ParamSpec::number("threshold", 0.0, 255.0, 1.0, 30.0),
    ParamSpec::number("expand", 0.0, 32.0, 1.0, 6.0),
    ParamSpec::number("feather", 0.0, 50.0, 1.0, 10.0),
];
const BACKGROUND_REPLACE: &[ParamSpec] = &[
    ParamSpec::choice("background", REPLACE_BACKGROUNDS, "blur"),
    ParamSpec::color("backgroundColor", Rgb::GREEN),
    ParamSpec::number("blurAmount", 1.0, 50.0, 1.0, 20.0),
    ParamSpec::number("threshold", 0.0, 255.0, 1.0, 30.0),
    ParamSpec::number("expand", 0.0, 32.0, 1.0, 6.0),
    ParamSpec::number("feather", 0.0, 50.0, 1.0, 5.0),
];
const OUTLINE: &[ParamSpec] = &[
    ParamSpec::color("color", Rgb::WHITE),
    ParamSpec::number("thickness", 1.0, 10.0, 1.0, 3.0),
    ParamSpec::number("threshold", 0.0, 255.0, 1.0, 128.0),
];

const SNOW: &[ParamSpec] = &[
    ParamSpec::number("count", 10.0, 500.0, 1.0, 100.0),
    ParamSpec::number("speed", 10.0, 200.0, 1.0, 50.0),
    ParamSpec::number("wind", -50.0, 50.0, 1.0, 0.0),
];
const RAIN: &[ParamSpec] = &[
    ParamSpec::number("count", 10.0, 300.0, 1.0, 100.0),
    ParamSpec::number("speed", 100.0, 1000.0, 10.0, 300.0),
    ParamSpec::number("angle", -45.0, 45.0, 1.0, 0.0),
];
const CONFETTI: &[ParamSpec] = &[
    ParamSpec::number("count", 10.0, 200.0, 1.0, 50.0),
    ParamSpec::number("gravity", 0.0, 500.0, 1.0, 100.0),
];
const FIREFLIES: &[ParamSpec] = &[
    ParamSpec::number("count", 5.0, 100.0, 1.0, 30.0),
    ParamSpec::number("speed", 10.0, 100.0, 1.0, 30.0),
    ParamSpec::number("glowSize", 5.0, 50.0, 1.0, 15.0),
];
const SPARKLES: &[ParamSpec] = &[
    ParamSpec::number("density", 1.0, 100.0, 1.0, 20.0),
    ParamSpec::number("size", 2.0, 20.0, 1.0, 3.0),
    ParamSpec::color("color", Rgb::WHITE),
];
const FLOATING_HEARTS: &[ParamSpec] = &[
    ParamSpec::number("count", 1.0, 100.0, 1.0, 15.0),
    ParamSpec::number("speed", 5.0, 300.0, 1.0, 40.0),
    ParamSpec::color("color", Rgb::new(255, 105, 180)),
];
const EMOJI_REACTION: &[ParamSpec] = &[
    ParamSpec::choice("emoji", EMOJI_GLYPHS, "heart"),
    ParamSpec::number("duration", 500.0, 10000.0, 100.0, 3000.0),
    ParamSpec::number("size", 10.0, 200.0, 1.0, 60.0),
];

const AUDIO_VISUALIZER: &[ParamSpec] = &[
    ParamSpec::choice("style", VISUALIZER_STYLES, "bars"),
    ParamSpec::color("color", Rgb::new(0, 255, 136)),
    ParamSpec::number("sensitivity", 0.1, 3.0, 0.1, 1.0),
    ParamSpec::number("smoothing", 0.0, 1.0, 0.01, 0.8),
];
const BASS_REACTIVE: &[ParamSpec] = &[
    ParamSpec::number("threshold", 0.0, 254.0, 1.0, 150.0),
    ParamSpec::color("color", Rgb::new(255, 0, 102)),
];
const VOICE_REACTIVE: &[ParamSpec] = &[
    ParamSpec::number("threshold", 0.0, 254.0, 1.0, 100.0),
    ParamSpec::color("highlightColor", Rgb::new(0, 255, 255)),
];

const AR_MASK: &[ParamSpec] = &[
    ParamSpec::choice("mask", MASK_STYLES, "sunglasses"),
    ParamSpec::number("scale", 0.5, 2.0, 0.05, 1.0),
    ParamSpec::color("color", Rgb::WHITE),
];
const FACE_BEAUTIFY: &[ParamSpec] = &[
    ParamSpec::number("smoothing", 0.0, 1.0, 0.01, 0.5),
    ParamSpec::number("brighten", 0.0, 1.0, 0.01, 0.2),
    ParamSpec::number("eyeEnhance", 0.0, 1.0, 0.01, 0.3),
];
const SMART_SEGMENT: &[ParamSpec] = &[
    ParamSpec::choice("background", REPLACE_BACKGROUNDS, "blur"),
    ParamSpec::color("backgroundColor", Rgb::BLACK),
    ParamSpec::number("blurAmount", 1.0, 50.0, 1.0, 15.0),
    ParamSpec::number("feather", 0.0, 50.0, 1.0, 10.0),
    ParamSpec::number("expansion", 1.0, 3.0, 0.1, 1.5),
];

const TEXT_OVERLAY: &[ParamSpec] = &[
    ParamSpec::text("text", 200, "Hello World"),
    ParamSpec::number("x", 0.0, 100.0, 1.0, 50.0),
    ParamSpec::number("y", 0.0, 100.0, 1.0, 50.0),
    ParamSpec::number("fontSize", 8.0, 200.0, 1.0, 48.0),
    ParamSpec::color("color", Rgb::WHITE),
    ParamSpec::flag("outline", true),
    ParamSpec::color("outlineColor", Rgb::BLACK),
    ParamSpec::number("outlineWidth", 0.0, 10.0, 1.0, 3.0),
    ParamSpec::choice("animation", TEXT_ANIMATIONS, "none"),
    ParamSpec::number("animationDuration", 100.0, 10000.0, 100.0, 2000.0),
    ParamSpec::flag("shadow", true),
];
const SUBTITLES: &[ParamSpec] = &[
    ParamSpec::text("text", 500, ""),
    ParamSpec::number("fontSize", 8.0, 96.0, 1.0, 32.0),
    ParamSpec::color("backgroundColor", Rgb::BLACK),
    ParamSpec::number("backgroundOpacity", 0.0, 1.0, 0.01, 0.8),
    ParamSpec::color("textColor", Rgb::WHITE),
    ParamSpec::number("maxWidth", 10.0, 100.0, 1.0, 80.0),
    ParamSpec::number("padding", 0.0, 50.0, 1.0, 15.0),
];
const LOWER_THIRD: &[ParamSpec] = &[
    ParamSpec::text("name", 100, "John Doe"),
    ParamSpec::text("title", 100, "Super Admin"),
    ParamSpec::color("backgroundColor", Rgb::new(102, 126, 234)),
    ParamSpec::number("backgroundOpacity", 0.0, 1.0, 0.01, 0.9),
    ParamSpec::color("textColor", Rgb::WHITE),
    ParamSpec::choice("position", BADGE_POSITIONS, "bottom-left"),
    ParamSpec::number("padding", 0.0, 100.0, 1.0, 20.0),
];
const GLOWING_RING: &[ParamSpec] = &[
    ParamSpec::color("color", Rgb::new(0, 255, 255)),
    ParamSpec::number("radius", 0.1, 1.0, 0.01, 0.4),
    ParamSpec::number("thickness", 1.0, 40.0, 1.0, 6.0),
    ParamSpec::number("speed", 0.0, 5.0, 0.1, 1.0),
];
const SPINNING_STARS: &[ParamSpec] = &[
    ParamSpec::number("starCount", 5.0, 200.0, 1.0, 50.0),
    ParamSpec::number("radius", 0.1, 1.0, 0.01, 0.78),
    ParamSpec::number("size", 1.0, 20.0, 1.0, 4.0),
    ParamSpec::color("color", Rgb::new(255, 255, 0)),
];
const FLOATING_CUBE: &[ParamSpec] = &[
    ParamSpec::color("color", Rgb::new(102, 126, 234)),
    ParamSpec::number("size", 0.05, 0.5, 0.01, 0.13),
    ParamSpec::number("speed", 0.0, 5.0, 0.1, 1.0),
];

const CUSTOM: &[ParamSpec] = &[
    ParamSpec::text("r", MAX_EXPR_LEN, "r"),
    ParamSpec::text("g", MAX_EXPR_LEN, "g"),
    ParamSpec::text("b", MAX_EXPR_LEN, "b"),
    ParamSpec::text("a", MAX_EXPR_LEN, "a"),
];

impl EffectKind {
    pub const ALL: [EffectKind; 38] = [
        Self::Grayscale,
        Self::Brightness,
        Self::ColorTint,
        Self::NeonGlow,
        Self::Vintage,
        Self::Pixelate,
        Self::EdgeDetect,
        Self::RgbSplit,
        Self::Glitch,
        Self::Mirror,
        Self::FilmGrain,
        Self::Vignette,
        Self::Kaleidoscope,
        Self::ChromaKey,
        Self::MotionBlur,
        Self::BackgroundBlur,
        Self::BackgroundReplace,
        Self::Outline,
        Self::Snow,
        Self::Rain,
        Self::Confetti,
        Self::Fireflies,
        Self::Sparkles,
        Self::FloatingHearts,
        Self::EmojiReaction,
        Self::AudioVisualizer,
        Self::BassReactive,
        Self::VoiceReactive,
        Self::ArMask,
        Self::FaceBeautify,
        Self::SmartSegment,
        Self::TextOverlay,
        Self::Subtitles,
        Self::LowerThird,
        Self::GlowingRing,
        Self::SpinningStars,
        Self::FloatingCube,
        Self::Custom,
    ];

    /// Stable identifier used in presets and on control surfaces.
    pub fn id(self) -> &'static str {
        match self {
            Self::Grayscale => "grayscale",
            Self::Brightness => "brightness",
            Self::ColorTint => "colortint",
            Self::NeonGlow => "neonglow",
            Self::Vintage => "vintage",
            Self::Pixelate => "pixelate",
            Self::EdgeDetect => "edgedetect",
            Self::RgbSplit => "rgbsplit",
            Self::Glitch => "glitch",
            Self::Mirror => "mirror",
            Self::FilmGrain => "filmgrain",
            Self::Vignette => "vignette",
            Self::Kaleidoscope => "kaleidoscope",
            Self::ChromaKey => "chromakey",
            Self::MotionBlur => "motionblur",
            Self::BackgroundBlur => "blur",
            Self::BackgroundReplace => "backgroundreplace",
            Self::Outline => "outline",
            Self::Snow => "snow",
            Self::Rain => "rain",
            Self::Confetti => "confetti",
            Self::Fireflies => "fireflies",
            Self::Sparkles => "sparkles",
            Self::FloatingHearts => "floatinghearts",
            Self::EmojiReaction => "emojireaction",
            Self::AudioVisualizer => "audiovisualizer",
            Self::BassReactive => "bassreactive",
            Self::VoiceReactive => "voicereactive",
            Self::ArMask => "armask",
            Self::FaceBeautify => "facebeautify",
            Self::SmartSegment => "smartblur",
            Self::TextOverlay => "textoverlay",
            Self::Subtitles => "subtitles",
            Self::LowerThird => "lowerthird",
            Self::GlowingRing => "glowingring",
            Self::SpinningStars => "spinningstars",
            Self::FloatingCube => "floatingcube",
            Self::Custom => "custom",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.id() == id)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Grayscale => "Grayscale",
            Self::Brightness => "Brightness / Contrast",
            Self::ColorTint => "Color Tint",
            Self::NeonGlow => "Neon Glow",
            Self::Vintage => "Vintage",
            Self::Pixelate => "Pixelate",
            Self::EdgeDetect => "Edge Detection",
            Self::RgbSplit => "RGB Split",
            Self::Glitch => "Glitch",
            Self::Mirror => "Mirror",
            Self::FilmGrain => "Film Grain",
            Self::Vignette => "Vignette",
            Self::Kaleidoscope => "Kaleidoscope",
            Self::ChromaKey => "Chroma Key",
            Self::MotionBlur => "Motion Blur",
            Self::BackgroundBlur => "Background Blur",
            Self::BackgroundReplace => "Background Replacement",
            Self::Outline => "Outline",
            Self::Snow => "Snow",
            Self::Rain => "Rain",
            Self::Confetti => "Confetti",
            Self::Fireflies => "Fireflies",
            Self::Sparkles => "Sparkles",
            Self::FloatingHearts => "Floating Hearts",
            Self::EmojiReaction => "Emoji Reactions",
            Self::AudioVisualizer => "Audio Visualizer",
            Self::BassReactive => "Bass Reactive",
            Self::VoiceReactive => "Voice Reactive",
            Self::ArMask => "AR Mask",
            Self::FaceBeautify => "Face Beautify",
            Self::SmartSegment => "Smart Segmentation",
            Self::TextOverlay => "Text Overlay",
            Self::Subtitles => "Subtitles",
            Self::LowerThird => "Lower Third",
            Self::GlowingRing => "Glowing Ring",
            Self::SpinningStars => "Spinning Stars",
            Self::FloatingCube => "Floating Cube",
            Self::Custom => "Custom Expression",
        }
    }

    pub fn category(self) -> Category {
        match self {
            Self::Grayscale
            | Self::Brightness
            | Self::ColorTint
            | Self::NeonGlow
            | Self::Vintage
            | Self::Pixelate
            | Self::EdgeDetect
            | Self::RgbSplit
            | Self::Glitch
            | Self::Mirror
            | Self::FilmGrain => Category::Pixel,
            Self::Vignette
            | Self::Kaleidoscope
            | Self::ChromaKey
            | Self::MotionBlur
            | Self::BackgroundBlur
            | Self::BackgroundReplace
            | Self::Outline => Category::Surface,
            Self::Snow
            | Self::Rain
            | Self::Confetti
            | Self::Fireflies
            | Self::Sparkles
            | Self::FloatingHearts
            | Self::EmojiReaction => Category::Particle,
            Self::AudioVisualizer | Self::BassReactive | Self::VoiceReactive => Category::Audio,
            Self::ArMask | Self::FaceBeautify | Self::SmartSegment => Category::Landmark,
            Self::TextOverlay
            | Self::Subtitles
            | Self::LowerThird
            | Self::GlowingRing
            | Self::SpinningStars
            | Self::FloatingCube => Category::Overlay,
            Self::Custom => Category::Custom,
        }
    }

    /// Parameter table (excluding `intensity`, which every kind carries).
    pub fn param_specs(self) -> &'static [ParamSpec] {
        match self {
            Self::Grayscale => GRAYSCALE,
            Self::Brightness => BRIGHTNESS,
            Self::ColorTint => COLOR_TINT,
            Self::NeonGlow => NEON_GLOW,
            Self::Vintage => VINTAGE,
            Self::Pixelate => PIXELATE,
            Self::EdgeDetect => EDGE_DETECT,
            Self::RgbSplit => RGB_SPLIT,
            Self::Glitch => GLITCH,
            Self::Mirror => MIRROR,
            Self::FilmGrain => FILM_GRAIN,
            Self::Vignette => VIGNETTE,
            Self::Kaleidoscope => KALEIDOSCOPE,
            Self::ChromaKey => CHROMA_KEY,
            Self::MotionBlur => MOTION_BLUR,
            Self::BackgroundBlur => BACKGROUND_BLUR,
            Self::BackgroundReplace => BACKGROUND_REPLACE,
            Self::Outline => OUTLINE,
            Self::Snow => SNOW,
            Self::Rain => RAIN,
            Self::Confetti => CONFETTI,
            Self::Fireflies => FIREFLIES,
            Self::Sparkles => SPARKLES,
            Self::FloatingHearts => FLOATING_HEARTS,
            Self::EmojiReaction => EMOJI_REACTION,
            Self::AudioVisualizer => AUDIO_VISUALIZER,
            Self::BassReactive => BASS_REACTIVE,
            Self::VoiceReactive => VOICE_REACTIVE,
            Self::ArMask => AR_MASK,
            Self::FaceBeautify => FACE_BEAUTIFY,
            Self::SmartSegment => SMART_SEGMENT,
            Self::TextOverlay => TEXT_OVERLAY,
            Self::Subtitles => SUBTITLES,
            Self::LowerThird => LOWER_THIRD,
            Self::GlowingRing => GLOWING_RING,
            Self::SpinningStars => SPINNING_STARS,
            Self::FloatingCube => FLOATING_CUBE,
            Self::Custom => CUSTOM,
        }
    }

    pub fn param_spec(self, key: &str) -> Option<&'static ParamSpec> {
        self.param_specs().iter().find(|s| s.key == key)
    }

    /// Whether the kind consumes a static background image.
    pub fn accepts_image(self) -> bool {
        matches!(
            self,
            Self::ChromaKey | Self::BackgroundReplace | Self::SmartSegment
        )
    }
}

impl std::fmt::Display for EffectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/kind.rs"]
mod tests;
