use anyhow::{Result, bail};
use clap::{Parser, ValueEnum};

use stencil_outline::ScenePreset;
use stencil_outline::common::RgbaColor;

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum PresetArg {
    Classic,
    Studio,
}

impl From<PresetArg> for ScenePreset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Classic => ScenePreset::Classic,
            PresetArg::Studio => ScenePreset::Studio,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "outline-viewer")]
#[command(about = "Click a primitive to outline it", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Demo scene to load
    #[arg(short, long, value_enum, default_value_t = PresetArg::Classic)]
    pub preset: PresetArg,

    /// Outline shell scale relative to the selected object, greater than 1
    /// (overrides the preset)
    #[arg(long)]
    pub outline_scale: Option<f32>,

    /// Outline color as rrggbb hex (overrides the preset)
    #[arg(long)]
    pub outline_color: Option<String>,

    /// Window width in pixels
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Window height in pixels
    #[arg(long, default_value_t = 720)]
    pub height: u32,
}

/// Validated startup options.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerOptions {
    pub preset: ScenePreset,
    pub outline_scale: Option<f32>,
    pub outline_color: Option<RgbaColor>,
    pub width: u32,
    pub height: u32,
}

impl Cli {
    pub fn into_options(self) -> Result<ViewerOptions> {
        if let Some(scale) = self.outline_scale {
            // At or below 1 the shell sits inside the mesh and no rim shows.
            if !scale.is_finite() || scale <= 1.0 {
                bail!("--outline-scale must be greater than 1, got {}", scale);
            }
        }
        if self.width == 0 || self.height == 0 {
            bail!("window size must be non-zero, got {}x{}", self.width, self.height);
        }
        let outline_color = self
            .outline_color
            .as_deref()
            .map(str::parse::<RgbaColor>)
            .transpose()?;

        Ok(ViewerOptions {
            preset: self.preset.into(),
            outline_scale: self.outline_scale,
            outline_color,
            width: self.width,
            height: self.height,
        })
    }
}
