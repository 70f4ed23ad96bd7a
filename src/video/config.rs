//! Video assembly options and their encoder lookup tables

use std::fmt;
use std::path::PathBuf;

/// Extensions accepted as-is for the output file
pub const VIDEO_EXTENSIONS: [&str; 5] = [".mp4", ".mkv", ".avi", ".mov", ".webm"];

/// Appended when the output name has none of [`VIDEO_EXTENSIONS`]
pub const DEFAULT_EXTENSION: &str = ".mp4";

/// Make sure `filename` ends in a video container extension (case-insensitive)
pub fn ensure_extension(filename: &str) -> String {
    let lower = filename.to_lowercase();
    if VIDEO_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
        filename.to_string()
    } else {
        format!("{}{}", filename, DEFAULT_EXTENSION)
    }
}

/// Codec choice offered to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoCodec {
    H264,
    H265,
    Vp9,
    ProRes,
}

impl VideoCodec {
    pub const ALL: [VideoCodec; 4] = [
        VideoCodec::H264,
        VideoCodec::H265,
        VideoCodec::Vp9,
        VideoCodec::ProRes,
    ];

    /// Encoder codec identifier passed to `-c:v`
    pub fn encoder_id(self) -> &'static str {
        match self {
            VideoCodec::H264 => "libx264",
            VideoCodec::H265 => "libx265",
            VideoCodec::Vp9 => "libvpx-vp9",
            VideoCodec::ProRes => "prores",
        }
    }

    /// Codec-specific arguments: VP9 needs constant-quality mode, ProRes gets the HQ profile
    pub fn extra_args(self) -> &'static [&'static str] {
        match self {
            VideoCodec::Vp9 => &["-b:v", "0"],
            VideoCodec::ProRes => &["-profile:v", "3"],
            VideoCodec::H264 | VideoCodec::H265 => &[],
        }
    }
}

impl fmt::Display for VideoCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            VideoCodec::H264 => "H.264 (general purpose)",
            VideoCodec::H265 => "H.265 (efficient)",
            VideoCodec::Vp9 => "VP9 (WebM)",
            VideoCodec::ProRes => "ProRes (professional editing)",
        };
        f.write_str(label)
    }
}

/// Encoder speed preset and constant rate factor for a quality choice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderQuality {
    pub preset: &'static str,
    pub crf: u8,
}

/// Quality choice offered to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityPreset {
    VeryHigh,
    High,
    Medium,
    Low,
}

impl QualityPreset {
    pub const ALL: [QualityPreset; 4] = [
        QualityPreset::VeryHigh,
        QualityPreset::High,
        QualityPreset::Medium,
        QualityPreset::Low,
    ];

    pub fn encoder_quality(self) -> EncoderQuality {
        match self {
            QualityPreset::VeryHigh => EncoderQuality { preset: "slow", crf: 18 },
            QualityPreset::High => EncoderQuality { preset: "medium", crf: 20 },
            QualityPreset::Medium => EncoderQuality { preset: "fast", crf: 23 },
            QualityPreset::Low => EncoderQuality { preset: "ultrafast", crf: 28 },
        }
    }
}

impl fmt::Display for QualityPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            QualityPreset::VeryHigh => "Very high quality (large file)",
            QualityPreset::High => "High quality",
            QualityPreset::Medium => "Medium quality",
            QualityPreset::Low => "Low quality (small file)",
        };
        f.write_str(label)
    }
}

/// Everything needed for one encoder run
#[derive(Debug, Clone, PartialEq)]
pub struct VideoConfig {
    /// Folder holding the `*.png` sequence
    pub input_dir: PathBuf,
    pub output_file: PathBuf,
    /// Used as both input read rate and output rate
    pub frame_rate: u32,
    pub codec: VideoCodec,
    pub quality: QualityPreset,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_extension_appends_mp4() {
        assert_eq!(ensure_extension("clip"), "clip.mp4");
        assert_eq!(ensure_extension("renders/final.cut"), "renders/final.cut.mp4");
    }

    #[test]
    fn test_ensure_extension_keeps_known_extensions() {
        assert_eq!(ensure_extension("clip.mp4"), "clip.mp4");
        assert_eq!(ensure_extension("clip.webm"), "clip.webm");
        assert_eq!(ensure_extension("CLIP.MOV"), "CLIP.MOV");
    }

    #[test]
    fn test_ensure_extension_is_idempotent() {
        for name in ["clip", "clip.mkv", "a.b", "", "x.AVI"] {
            let once = ensure_extension(name);
            assert_eq!(ensure_extension(&once), once);
        }
    }

    #[test]
    fn test_quality_table() {
        assert_eq!(
            QualityPreset::VeryHigh.encoder_quality(),
            EncoderQuality { preset: "slow", crf: 18 }
        );
        assert_eq!(QualityPreset::High.encoder_quality().crf, 20);
        assert_eq!(QualityPreset::Medium.encoder_quality().preset, "fast");
        assert_eq!(QualityPreset::Low.encoder_quality().crf, 28);
    }

    #[test]
    fn test_only_vp9_and_prores_add_arguments() {
        assert_eq!(VideoCodec::Vp9.extra_args(), &["-b:v", "0"]);
        assert_eq!(VideoCodec::ProRes.extra_args(), &["-profile:v", "3"]);
        assert!(VideoCodec::H264.extra_args().is_empty());
        assert!(VideoCodec::H265.extra_args().is_empty());
    }
}
