//! New wallpaper folders built from a media file with `ffmpeg`.
//!
//! Layout of a folder:
//! ```text
//! <catalog>/<name>/config          [Info] + [DateTime] sections
//! <catalog>/<name>/<media file>    copied as-is
//! <catalog>/<name>/<name>.mp4      only when the source is not mp4
//! <catalog>/<name>/wallpaper.jpg   frame at 2s
//! ```

use std::{
    ffi::OsStr,
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
    process::Command,
};

use tracing::info;

use crate::{error::AppError, external::AssetCreator};

pub const THUMBNAIL_NAME: &str = "wallpaper.jpg";
const THUMBNAIL_OFFSET: &str = "00:00:02.000";

/// Date/time overlay drawn by the renderer on top of the wallpaper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTimeOverlay {
    pub visible: bool,
    pub parallax: bool,
    pub margin_top: i32,
    pub margin_right: i32,
    pub margin_left: i32,
    pub margin_bottom: i32,
    pub rotation_x: i32,
    pub rotation_y: i32,
    pub rotation_z: i32,
    pub position: String,
    pub alignment: String,
    pub always_on_top: bool,
    pub color: String,
    pub alpha: u32,
    pub shadow_color: String,
    pub shadow_alpha: u32,
    pub time_font: String,
    pub date_font: String,
}

impl Default for DateTimeOverlay {
    fn default() -> Self {
        Self {
            visible: false,
            parallax: false,
            margin_top: 0,
            margin_right: 0,
            margin_left: 0,
            margin_bottom: 0,
            rotation_x: 0,
            rotation_y: 0,
            rotation_z: 0,
            position: "center".to_string(),
            alignment: "center".to_string(),
            always_on_top: true,
            color: "#dd22dd22dd22".to_string(),
            alpha: 255,
            shadow_color: "#dd22dd22dd22".to_string(),
            shadow_alpha: 255,
            time_font: "Lato Light 30".to_string(),
            date_font: "Lato Light 20".to_string(),
        }
    }
}

pub const POSITIONS: &[&str] = &["center", "top", "bottom", "left", "right"];
pub const ALIGNMENTS: &[&str] = &["center", "left", "right"];

/// Text of a wallpaper folder's `config` file.
pub fn render_item_config(video_file_name: &str, overlay: &DateTimeOverlay) -> String {
    let mut out = String::with_capacity(512);
    // writing into a String cannot fail
    let _ = write!(
        out,
        "[Info]\n\
         WallpaperType=video\n\
         VideoFileName={video_file_name}\n\
         \n\
         [DateTime]\n\
         Visible={}\n\
         Parallax={}\n\
         MarginTop={}\n\
         MarginRight={}\n\
         MarginLeft={}\n\
         MarginBottom={}\n\
         RotationX={}\n\
         RotationY={}\n\
         RotationZ={}\n\
         Position={}\n\
         Alignment={}\n\
         AlwaysOnTop={}\n\
         Color={}\n\
         Alpha={}\n\
         ShadowColor={}\n\
         ShadowAlpha={}\n\
         TimeFont={}\n\
         DateFont={}\n",
        overlay.visible,
        overlay.parallax,
        overlay.margin_top,
        overlay.margin_right,
        overlay.margin_left,
        overlay.margin_bottom,
        overlay.rotation_x,
        overlay.rotation_y,
        overlay.rotation_z,
        overlay.position,
        overlay.alignment,
        overlay.always_on_top,
        overlay.color,
        overlay.alpha,
        overlay.shadow_color,
        overlay.shadow_alpha,
        overlay.time_font,
        overlay.date_font,
    );
    out
}

#[derive(Debug, Clone)]
pub struct FfmpegAssetCreator {
    catalog_root: PathBuf,
    ffmpeg: String,
}

impl FfmpegAssetCreator {
    pub fn new(catalog_root: impl Into<PathBuf>) -> Self {
        Self {
            catalog_root: catalog_root.into(),
            ffmpeg: "ffmpeg".to_string(),
        }
    }

    pub fn with_ffmpeg(mut self, program: impl Into<String>) -> Self {
        self.ffmpeg = program.into();
        self
    }

    fn run_ffmpeg(&self, args: &[&OsStr]) -> Result<(), AppError> {
        let output = Command::new(&self.ffmpeg)
            .args(args)
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    AppError::tool_missing(&self.ffmpeg, "Install ffmpeg to create wallpapers from media files.")
                } else {
                    AppError::Io(e)
                }
            })?;
        if !output.status.success() {
            return Err(AppError::external_cmd(&self.ffmpeg, &output));
        }
        Ok(())
    }
}

impl AssetCreator for FfmpegAssetCreator {
    fn create_from_media(
        &self,
        source: &Path,
        name: &str,
        overlay: &DateTimeOverlay,
    ) -> Result<PathBuf, AppError> {
        let file_name = source
            .file_name()
            .ok_or_else(|| AppError::invalid_input("media", "path has no file name"))?;
        let folder = self.catalog_root.join(name);
        if folder.exists() {
            return Err(AppError::invalid_input(
                "name",
                format!("'{name}' already exists"),
            ));
        }

        info!("Creating wallpaper '{}' from {}", name, source.display());
        fs::create_dir_all(&folder)?;
        fs::copy(source, folder.join(file_name))?;

        let is_mp4 = source
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("mp4"));
        let video_file_name = if is_mp4 {
            file_name.to_string_lossy().into_owned()
        } else {
            let mp4_name = format!("{name}.mp4");
            let target = folder.join(&mp4_name);
            info!("Transcoding {} to {}", source.display(), target.display());
            self.run_ffmpeg(&[OsStr::new("-i"), source.as_os_str(), target.as_os_str()])?;
            mp4_name
        };

        fs::write(folder.join("config"), render_item_config(&video_file_name, overlay))?;

        let thumbnail = folder.join(THUMBNAIL_NAME);
        self.run_ffmpeg(&[
            OsStr::new("-i"),
            source.as_os_str(),
            OsStr::new("-ss"),
            OsStr::new(THUMBNAIL_OFFSET),
            OsStr::new("-vframes"),
            OsStr::new("1"),
            thumbnail.as_os_str(),
        ])?;

        info!("Created wallpaper folder {}", folder.display());
        Ok(folder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_text() {
        let text = render_item_config("clip.mp4", &DateTimeOverlay::default());
        assert!(text.starts_with("[Info]\nWallpaperType=video\nVideoFileName=clip.mp4\n\n[DateTime]\n"));
        assert!(text.contains("Visible=false\n"));
        assert!(text.contains("AlwaysOnTop=true\n"));
        assert!(text.contains("Color=#dd22dd22dd22\n"));
        assert!(text.ends_with("TimeFont=Lato Light 30\nDateFont=Lato Light 20\n"));
    }

    #[cfg(unix)]
    #[test]
    fn test_create_from_mp4_skips_transcode() {
        let dir = TempDir::new().unwrap();
        let catalog = dir.path().join("catalog");
        fs::create_dir(&catalog).unwrap();
        let source = dir.path().join("clip.mp4");
        fs::write(&source, b"not really a video").unwrap();

        // `true` accepts any arguments and succeeds
        let creator = FfmpegAssetCreator::new(&catalog).with_ffmpeg("true");
        let overlay = DateTimeOverlay {
            visible: true,
            ..DateTimeOverlay::default()
        };
        let folder = creator.create_from_media(&source, "rainy-night", &overlay).unwrap();

        assert_eq!(folder, catalog.join("rainy-night"));
        assert!(folder.join("clip.mp4").exists());
        let config = fs::read_to_string(folder.join("config")).unwrap();
        assert!(config.contains("VideoFileName=clip.mp4\n"));
        assert!(config.contains("Visible=true\n"));

        // same name again is rejected
        let err = creator.create_from_media(&source, "rainy-night", &overlay).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput { .. }));
    }

    #[test]
    fn test_missing_ffmpeg_is_reported() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("clip.webm");
        fs::write(&source, b"x").unwrap();

        let creator = FfmpegAssetCreator::new(dir.path()).with_ffmpeg("definitely-not-ffmpeg-xyz");
        let err = creator
            .create_from_media(&source, "new-one", &DateTimeOverlay::default())
            .unwrap_err();
        assert!(matches!(err, AppError::ExternalToolMissing { .. }));
    }
}
