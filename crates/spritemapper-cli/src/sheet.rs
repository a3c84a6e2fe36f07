//! Sheet jobs: what to read, how to lay it out and where to write it.
//! `run` builds them from a YAML file; `pack`/`layout` build a single one
//! from the command line.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use spritemapper_core::config::{AlgorithmFamily, MapperConfig, SortOrder};

/// Metadata flavours the CLI can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetaFormat {
    /// One Zwoptex2 plist per page.
    Zwoptex2,
    /// One JSON file, frames keyed by name.
    JsonHash,
    /// One JSON file, pages listing their frames.
    JsonArray,
}

impl MetaFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Zwoptex2 => "plist",
            Self::JsonHash | Self::JsonArray => "json",
        }
    }
}

impl FromStr for MetaFormat {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "zwoptex2" | "plist" => Self::Zwoptex2,
            "json-hash" => Self::JsonHash,
            "json-array" | "json" => Self::JsonArray,
            other => bail!("unknown metadata format: {}", other),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaOutput {
    pub format: MetaFormat,
    /// Filename pattern, may contain `{n}` placeholders.
    pub path: String,
    /// Keep the directory part of the texture name written into the metadata.
    #[serde(default)]
    pub keep_dir: bool,
}

/// Textures plus the metadata describing them. Metadata refers to the
/// first texture.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSet {
    #[serde(default)]
    pub textures: Vec<String>,
    #[serde(default)]
    pub metas: Vec<MetaOutput>,
}

/// One sprite sheet to produce.
#[derive(Debug, Clone)]
pub struct SheetJob {
    pub base_dir: PathBuf,
    pub inputs: Vec<PathBuf>,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub cfg: MapperConfig,
    /// Output patterns are resolved against this directory.
    pub out_dir: PathBuf,
    pub outputs: Vec<OutputSet>,
}

/// Layout options as they appear in YAML. Unset fields keep the value
/// they override.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct YamlOptions {
    pub base_dir: Option<PathBuf>,
    pub algorithm: Option<String>,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    #[serde(alias = "pot")]
    pub power_of_two: Option<bool>,
    pub spacing: Option<u32>,
    pub border: Option<u32>,
    pub trim: Option<bool>,
    pub trim_threshold: Option<u8>,
    pub reserve_border: Option<bool>,
    pub landscape: Option<bool>,
    pub draw_frames: Option<bool>,
    pub sort_order: Option<String>,
    pub parallel: Option<bool>,
}

impl YamlOptions {
    /// Layers `over` on top of `self`.
    pub fn merged(mut self, over: YamlOptions) -> YamlOptions {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if over.$field.is_some() {
                    self.$field = over.$field;
                })*
            };
        }
        take!(
            base_dir,
            algorithm,
            max_width,
            max_height,
            power_of_two,
            spacing,
            border,
            trim,
            trim_threshold,
            reserve_border,
            landscape,
            draw_frames,
            sort_order,
            parallel
        );
        self
    }

    pub fn into_mapper_config(self, mut cfg: MapperConfig) -> anyhow::Result<MapperConfig> {
        if let Some(v) = self.algorithm {
            cfg.algorithms = AlgorithmFamily::parse_list(&v)?;
        }
        if let Some(v) = self.max_width {
            cfg.max_width = v;
        }
        if let Some(v) = self.max_height {
            cfg.max_height = v;
        }
        if let Some(v) = self.power_of_two {
            cfg.power_of_two = v;
        }
        if let Some(v) = self.spacing {
            cfg.spacing = v;
        }
        if let Some(v) = self.border {
            cfg.border = v;
        }
        if let Some(v) = self.trim {
            cfg.trim = v;
        }
        if let Some(v) = self.trim_threshold {
            cfg.trim_threshold = v;
        }
        if let Some(v) = self.reserve_border {
            cfg.reserve_border = v;
        }
        if let Some(v) = self.landscape {
            cfg.landscape = v;
        }
        if let Some(v) = self.draw_frames {
            cfg.draw_frames = v;
        }
        if let Some(v) = self.sort_order {
            cfg.sort_order = parse_sort_order(&v)?;
        }
        if let Some(v) = self.parallel {
            cfg.parallel = v;
        }
        Ok(cfg)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct YamlSheet {
    pub inputs: Vec<PathBuf>,
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub options: YamlOptions,
    #[serde(default)]
    pub outputs: Vec<OutputSet>,
}

/// Top-level `run` file: shared options and a list of sheets.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunFile {
    #[serde(default)]
    pub options: YamlOptions,
    #[serde(default)]
    pub sheets: Vec<YamlSheet>,
}

impl RunFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let file: RunFile = serde_yaml::from_str(&text)
            .with_context(|| format!("parse config {}", path.display()))?;
        Ok(file)
    }

    /// Resolves every sheet against the shared options. Relative base
    /// directories and output paths are taken from `root`, the directory
    /// holding the config file.
    pub fn into_jobs(self, root: &Path) -> anyhow::Result<Vec<SheetJob>> {
        let shared = self.options;
        self.sheets
            .into_iter()
            .enumerate()
            .map(|(i, sheet)| {
                if sheet.inputs.is_empty() {
                    bail!("sheet {i}: at least one input file or directory is required");
                }
                let mut opts = shared.clone().merged(sheet.options);
                let base_dir = root.join(opts.base_dir.take().unwrap_or_else(|| ".".into()));
                let cfg = opts
                    .into_mapper_config(MapperConfig::default())
                    .with_context(|| format!("sheet {i}"))?;
                Ok(SheetJob {
                    base_dir,
                    inputs: sheet.inputs,
                    include: sheet.include,
                    exclude: sheet.exclude,
                    cfg,
                    out_dir: root.to_path_buf(),
                    outputs: sheet.outputs,
                })
            })
            .collect()
    }
}

pub fn parse_sort_order(s: &str) -> anyhow::Result<SortOrder> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("unknown sort order: {}", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
options:
  max_width: 2048
  spacing: 1
  trim: true
sheets:
  - inputs: [res, some-image.png]
    include: ["**/*.png"]
    exclude: ["**/foo*.png"]
    options:
      border: 1
      spacing: 2
      algorithm: maxrects, shelf
    outputs:
      - textures: ["build/ui{n}.png"]
        metas:
          - format: zwoptex2
            path: "build/ui{n}.plist"
            keep_dir: true
          - format: json-hash
            path: build/ui.json
  - inputs: [icons]
    options:
      base_dir: art
      pot: true
"#;

    #[test]
    fn sheet_options_override_shared_ones() {
        let file: RunFile = serde_yaml::from_str(SAMPLE).unwrap();
        let jobs = file.into_jobs(Path::new("proj")).unwrap();
        assert_eq!(jobs.len(), 2);

        let ui = &jobs[0];
        assert_eq!(ui.base_dir, Path::new("proj").join("."));
        assert_eq!(ui.out_dir, Path::new("proj"));
        assert_eq!(ui.cfg.max_width, 2048);
        assert_eq!(ui.cfg.spacing, 2);
        assert_eq!(ui.cfg.border, 1);
        assert_eq!(
            ui.cfg.algorithms,
            vec![AlgorithmFamily::MaxRects, AlgorithmFamily::Shelf]
        );
        assert_eq!(ui.outputs[0].metas[0].format, MetaFormat::Zwoptex2);
        assert!(ui.outputs[0].metas[0].keep_dir);
        assert!(!ui.outputs[0].metas[1].keep_dir);

        let icons = &jobs[1];
        assert_eq!(icons.base_dir, Path::new("proj").join("art"));
        assert!(icons.cfg.power_of_two);
        assert_eq!(icons.cfg.spacing, 1);
        assert_eq!(icons.cfg.border, 0);
        assert!(icons.outputs.is_empty());
    }

    #[test]
    fn bad_values_are_reported() {
        let file: RunFile =
            serde_yaml::from_str("sheets:\n  - inputs: [a]\n    options: {algorithm: skyline}\n")
                .unwrap();
        assert!(file.into_jobs(Path::new(".")).is_err());

        let file: RunFile = serde_yaml::from_str("sheets:\n  - inputs: []\n").unwrap();
        assert!(file.into_jobs(Path::new(".")).is_err());

        assert!(serde_yaml::from_str::<RunFile>("options: {colour: red}\n").is_err());
        assert!("svg".parse::<MetaFormat>().is_err());
        assert_eq!("json".parse::<MetaFormat>().unwrap(), MetaFormat::JsonArray);
    }
}
