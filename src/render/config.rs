//! Render configuration: the flat option set plus its fixed lookup tables

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Container formats offered for video output, as host identifiers
pub const CONTAINER_FORMATS: &[&str] = &[
    "MPEG4", "AVI", "QUICKTIME", "DV", "H264", "XVID", "FLV", "MKV", "OGG", "WEBM",
];

/// Video codecs offered for video output, as host identifiers
pub const VIDEO_CODECS: &[&str] = &[
    "H264", "MPEG4", "MPEG2", "AV1", "VP9", "THEORA", "DNXHD", "PRORES", "FLASH", "FFV1",
];

/// Quality factor used for any tier name not in [`QualityTier`]
pub const DEFAULT_CRF: u8 = 23;

/// Render engine selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderEngine {
    #[serde(rename = "CYCLES")]
    Cycles,
    #[serde(rename = "BLENDER_EEVEE")]
    Eevee,
    #[serde(rename = "BLENDER_EEVEE_NEXT")]
    EeveeNext,
}

impl RenderEngine {
    pub const ALL: [RenderEngine; 3] = [
        RenderEngine::Cycles,
        RenderEngine::Eevee,
        RenderEngine::EeveeNext,
    ];

    pub fn host_id(self) -> &'static str {
        match self {
            RenderEngine::Cycles => "CYCLES",
            RenderEngine::Eevee => "BLENDER_EEVEE",
            RenderEngine::EeveeNext => "BLENDER_EEVEE_NEXT",
        }
    }

    pub fn from_host_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|engine| engine.host_id() == id)
    }

    /// Short name used in headers and summaries
    pub fn name(self) -> &'static str {
        match self {
            RenderEngine::Cycles => "Cycles",
            RenderEngine::Eevee => "Eevee",
            RenderEngine::EeveeNext => "Eevee Next",
        }
    }

    pub fn is_ray_traced(self) -> bool {
        matches!(self, RenderEngine::Cycles)
    }
}

impl fmt::Display for RenderEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RenderEngine::Cycles => "Cycles (ray tracing)",
            RenderEngine::Eevee => "Eevee (real-time)",
            RenderEngine::EeveeNext => "Eevee Next (latest real-time)",
        };
        f.write_str(label)
    }
}

/// Output image file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileFormat {
    #[serde(rename = "PNG")]
    Png,
    #[serde(rename = "JPEG")]
    Jpeg,
    #[serde(rename = "OPEN_EXR")]
    OpenExr,
    #[serde(rename = "TIFF")]
    Tiff,
    #[serde(rename = "FFMPEG")]
    Ffmpeg,
}

impl FileFormat {
    pub const ALL: [FileFormat; 5] = [
        FileFormat::Png,
        FileFormat::Jpeg,
        FileFormat::OpenExr,
        FileFormat::Tiff,
        FileFormat::Ffmpeg,
    ];

    pub fn host_id(self) -> &'static str {
        match self {
            FileFormat::Png => "PNG",
            FileFormat::Jpeg => "JPEG",
            FileFormat::OpenExr => "OPEN_EXR",
            FileFormat::Tiff => "TIFF",
            FileFormat::Ffmpeg => "FFMPEG",
        }
    }

    pub fn from_host_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|format| format.host_id() == id)
    }

    /// Only these formats honour a chosen color mode; the rest are written as RGB
    pub fn supports_color_mode(self) -> bool {
        matches!(self, FileFormat::Png | FileFormat::Tiff | FileFormat::OpenExr)
    }

    /// Video container output (gates the container/codec/quality questions)
    pub fn is_video(self) -> bool {
        matches!(self, FileFormat::Ffmpeg)
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileFormat::OpenExr => f.write_str("EXR"),
            other => f.write_str(other.host_id()),
        }
    }
}

/// Color channel mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorMode {
    #[serde(rename = "BW")]
    Bw,
    #[serde(rename = "RGB")]
    Rgb,
    #[serde(rename = "RGBA")]
    Rgba,
}

impl ColorMode {
    pub const ALL: [ColorMode; 3] = [ColorMode::Bw, ColorMode::Rgb, ColorMode::Rgba];

    pub fn host_id(self) -> &'static str {
        match self {
            ColorMode::Bw => "BW",
            ColorMode::Rgb => "RGB",
            ColorMode::Rgba => "RGBA",
        }
    }

    pub fn from_host_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.host_id() == id)
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.host_id())
    }
}

/// Denoiser selection for the ray-trace engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Denoiser {
    #[serde(rename = "OPENIMAGEDENOISE")]
    OpenImageDenoise,
    #[serde(rename = "OPTIX")]
    Optix,
    #[serde(rename = "NONE")]
    None,
}

impl Denoiser {
    pub const ALL: [Denoiser; 3] = [Denoiser::OpenImageDenoise, Denoiser::Optix, Denoiser::None];

    pub fn host_id(self) -> &'static str {
        match self {
            Denoiser::OpenImageDenoise => "OPENIMAGEDENOISE",
            Denoiser::Optix => "OPTIX",
            Denoiser::None => "NONE",
        }
    }

    pub fn from_host_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.host_id() == id)
    }
}

impl fmt::Display for Denoiser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Denoiser::OpenImageDenoise => "OpenImageDenoise",
            Denoiser::Optix => "OptiX",
            Denoiser::None => "Disabled",
        };
        f.write_str(label)
    }
}

/// Video quality tier; each maps to a fixed constant rate factor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityTier {
    Lossless,
    PercLossless,
    High,
    Medium,
    Low,
}

impl QualityTier {
    pub const ALL: [QualityTier; 5] = [
        QualityTier::Lossless,
        QualityTier::PercLossless,
        QualityTier::High,
        QualityTier::Medium,
        QualityTier::Low,
    ];

    pub fn host_id(self) -> &'static str {
        match self {
            QualityTier::Lossless => "LOSSLESS",
            QualityTier::PercLossless => "PERC_LOSSLESS",
            QualityTier::High => "HIGH",
            QualityTier::Medium => "MEDIUM",
            QualityTier::Low => "LOW",
        }
    }

    pub fn from_host_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tier| tier.host_id() == id)
    }

    pub fn crf(self) -> u8 {
        match self {
            QualityTier::Lossless => 0,
            QualityTier::PercLossless => 18,
            QualityTier::High => 20,
            QualityTier::Medium => 23,
            QualityTier::Low => 28,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            QualityTier::Lossless => "Lossless",
            QualityTier::PercLossless => "Near lossless",
            QualityTier::High => "High quality",
            QualityTier::Medium => "Medium quality",
            QualityTier::Low => "Low quality",
        }
    }
}

/// Constant rate factor for a tier name; unknown names get [`DEFAULT_CRF`]
pub fn quality_factor(tier: &str) -> u8 {
    QualityTier::from_host_id(tier)
        .map(QualityTier::crf)
        .unwrap_or(DEFAULT_CRF)
}

/// Complete render configuration.
///
/// Every field is always present: presets and exported files are read with
/// `#[serde(default)]`, so missing keys take the built-in default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub render_engine: RenderEngine,
    pub output_dir: PathBuf,
    pub filename_prefix: String,
    pub file_format: FileFormat,
    pub color_mode: ColorMode,
    pub start_frame: i32,
    pub end_frame: i32,
    pub resolution_x: i32,
    pub resolution_y: i32,
    pub resolution_percent: i32,
    pub samples: i32,
    pub tile_size: i32,
    pub eevee_samples: i32,
    pub denoiser: Denoiser,
    pub device_type: String,
    pub max_bounces: i32,
    pub eevee_ambient_occlusion: bool,
    pub eevee_bloom: bool,
    pub eevee_ssr: bool,
    pub eevee_volumetric: bool,
    pub noise_threshold: f64,
    pub denoising_samples: i32,
    pub ffmpeg_format: String,
    pub ffmpeg_codec: String,
    pub ffmpeg_quality: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            render_engine: RenderEngine::Cycles,
            output_dir: PathBuf::from("/workspace/out"),
            filename_prefix: "frame".to_string(),
            file_format: FileFormat::Png,
            color_mode: ColorMode::Rgb,
            start_frame: 1,
            end_frame: 10,
            resolution_x: 1920,
            resolution_y: 1080,
            resolution_percent: 100,
            samples: 64,
            tile_size: 256,
            eevee_samples: 64,
            denoiser: Denoiser::OpenImageDenoise,
            device_type: "CUDA".to_string(),
            max_bounces: 6,
            eevee_ambient_occlusion: true,
            eevee_bloom: true,
            eevee_ssr: true,
            eevee_volumetric: true,
            noise_threshold: 0.01,
            denoising_samples: 0,
            ffmpeg_format: "MPEG4".to_string(),
            ffmpeg_codec: "H264".to_string(),
            ffmpeg_quality: "MEDIUM".to_string(),
        }
    }
}

impl RenderConfig {
    /// Read a preset file; keys it leaves out keep their built-in defaults
    pub fn load_preset(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read preset file: {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse preset file: {}", path.display()))
    }

    /// Write the configuration as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write configuration: {}", path.display()))
    }

    /// Host render filepath: `<output_dir>/<prefix>_####`
    pub fn render_filepath(&self) -> String {
        self.output_dir
            .join(format!("{}_####", self.filename_prefix))
            .display()
            .to_string()
    }

    /// Color mode the host should receive for the chosen file format
    pub fn effective_color_mode(&self) -> ColorMode {
        if self.file_format.supports_color_mode() {
            self.color_mode
        } else {
            ColorMode::Rgb
        }
    }

    /// Quality factor for the configured video quality tier
    pub fn crf(&self) -> u8 {
        quality_factor(&self.ffmpeg_quality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_table_is_total() {
        assert_eq!(quality_factor("LOSSLESS"), 0);
        assert_eq!(quality_factor("PERC_LOSSLESS"), 18);
        assert_eq!(quality_factor("HIGH"), 20);
        assert_eq!(quality_factor("MEDIUM"), 23);
        assert_eq!(quality_factor("LOW"), 28);
    }

    #[test]
    fn test_unknown_quality_tier_falls_back() {
        assert_eq!(quality_factor("VERYLOW"), DEFAULT_CRF);
        assert_eq!(quality_factor(""), DEFAULT_CRF);
        assert_eq!(quality_factor("high"), DEFAULT_CRF);
    }

    #[test]
    fn test_host_ids_round_trip() {
        for engine in RenderEngine::ALL {
            assert_eq!(RenderEngine::from_host_id(engine.host_id()), Some(engine));
        }
        for format in FileFormat::ALL {
            assert_eq!(FileFormat::from_host_id(format.host_id()), Some(format));
        }
        assert_eq!(RenderEngine::from_host_id("BLENDER_WORKBENCH"), None);
        assert_eq!(FileFormat::from_host_id("EXR"), None);
    }

    #[test]
    fn test_color_mode_only_for_lossless_still_formats() {
        let mut config = RenderConfig {
            color_mode: ColorMode::Rgba,
            ..Default::default()
        };
        assert_eq!(config.effective_color_mode(), ColorMode::Rgba);

        config.file_format = FileFormat::Jpeg;
        assert_eq!(config.effective_color_mode(), ColorMode::Rgb);

        config.file_format = FileFormat::Ffmpeg;
        assert_eq!(config.effective_color_mode(), ColorMode::Rgb);
    }

    #[test]
    fn test_render_filepath_uses_frame_placeholder() {
        let config = RenderConfig::default();
        assert_eq!(config.render_filepath(), "/workspace/out/frame_####");
    }

    #[test]
    fn test_partial_preset_keeps_every_key() {
        let config: RenderConfig =
            serde_json::from_str(r#"{"render_engine": "BLENDER_EEVEE", "samples": 128}"#).unwrap();
        assert_eq!(config.render_engine, RenderEngine::Eevee);
        assert_eq!(config.samples, 128);
        assert_eq!(config.filename_prefix, "frame");
        assert_eq!(config.ffmpeg_quality, "MEDIUM");
    }

    #[test]
    fn test_display_labels() {
        assert_eq!(FileFormat::OpenExr.to_string(), "EXR");
        assert_eq!(Denoiser::None.to_string(), "Disabled");
        assert_eq!(RenderEngine::Cycles.to_string(), "Cycles (ray tracing)");
    }
}
