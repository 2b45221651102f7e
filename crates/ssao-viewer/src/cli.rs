//! Command line interface.

use std::path::PathBuf;

use clap::Parser;
use ssao_core::Options;

use crate::scene::SceneSource;

/// Deferred renderer with screen-space ambient occlusion.
#[derive(Debug, Parser)]
#[command(name = "ssao-viewer", version, about)]
pub struct Cli {
    /// OBJ model to place inside the box. Without one a demo scene is shown.
    pub model: Option<PathBuf>,

    /// JSON options file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Render one frame to this PNG/JPEG file instead of opening a window.
    #[arg(long, value_name = "OUT")]
    pub headless: Option<PathBuf>,

    /// Viewport width in pixels.
    #[arg(long)]
    pub width: Option<u32>,

    /// Viewport height in pixels.
    #[arg(long)]
    pub height: Option<u32>,

    /// Seed for the sample kernel and noise tile.
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Cli {
    /// Loads the options file, if any, then applies command line overrides.
    pub fn options(&self) -> crate::Result<Options> {
        let mut options = match &self.config {
            Some(path) => Options::load(path)?,
            None => Options::default(),
        };
        if let Some(width) = self.width {
            options.width = width;
        }
        if let Some(height) = self.height {
            options.height = height;
        }
        if let Some(seed) = self.seed {
            options.seed = seed;
        }
        Ok(options)
    }

    /// Where the model comes from.
    #[must_use]
    pub fn scene_source(&self) -> SceneSource {
        match &self.model {
            Some(path) => SceneSource::Obj(path.clone()),
            None => SceneSource::Demo,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_demo_window() {
        let cli = Cli::try_parse_from(["ssao-viewer"]).unwrap();
        assert_eq!(cli.scene_source(), SceneSource::Demo);
        assert!(cli.headless.is_none());
        assert_eq!(cli.options().unwrap(), Options::default());
    }

    #[test]
    fn test_overrides_apply() {
        let cli = Cli::try_parse_from([
            "ssao-viewer",
            "bunny.obj",
            "--width",
            "320",
            "--height",
            "240",
            "--seed",
            "7",
            "--headless",
            "out.png",
        ])
        .unwrap();
        assert_eq!(cli.scene_source(), SceneSource::Obj(PathBuf::from("bunny.obj")));
        assert_eq!(cli.headless, Some(PathBuf::from("out.png")));
        let options = cli.options().unwrap();
        assert_eq!((options.width, options.height, options.seed), (320, 240, 7));
    }

    #[test]
    fn test_config_file_is_loaded() {
        let path = std::env::temp_dir().join(format!("ssao_viewer_cli_options_{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "title": "From file", "width": 640 }"#).unwrap();
        let cli = Cli::try_parse_from(["ssao-viewer", "--config", path.to_str().unwrap(), "--width", "100"]).unwrap();
        let options = cli.options().unwrap();
        assert_eq!(options.title, "From file");
        assert_eq!(options.width, 100);
        assert_eq!(options.height, Options::default().height);
        let _ = std::fs::remove_file(&path);
    }
}
