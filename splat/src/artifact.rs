use crate::{
    error::SplatError,
    params::SimulationParameters,
    runner::Invocation,
};
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

/// One kind of output the tool can produce for a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Kml,
    TerrainProfile,
    ElevationProfile,
    HeightProfile,
    NormalizedHeightProfile,
    PathLossProfile,
    CoverageMap,
    LossMap,
    FieldMap,
}

/// How an artifact's output-selecting flags are shaped.
#[derive(Debug, Clone, Copy)]
enum Shape {
    /// `<flag>`; the tool names the output after the sites.
    Bare,
    /// `<flag> <output>`
    Profile,
    /// `<flag> <rx height> [-erp <erp>] -o <output>`
    Map { erp: bool },
}

#[derive(Debug, Clone, Copy)]
struct Spec {
    flag: &'static str,
    raw: &'static str,
    output: &'static str,
    shape: Shape,
    /// Whether the environment record carries the ERP line.
    staged_erp: bool,
}

/// Name the tool gives the KML export, `<tx name>-to-<rx name>.kml`.
const KML_FILE: &str = "TX-to-RX.kml";

impl ArtifactKind {
    /// Every artifact, in the order a full run produces them.
    pub const ALL: [ArtifactKind; 9] = [
        Self::Kml,
        Self::TerrainProfile,
        Self::ElevationProfile,
        Self::HeightProfile,
        Self::NormalizedHeightProfile,
        Self::PathLossProfile,
        Self::CoverageMap,
        Self::LossMap,
        Self::FieldMap,
    ];

    const fn spec(self) -> Spec {
        const fn profile(flag: &'static str, file: &'static str) -> Spec {
            Spec {
                flag,
                raw: file,
                output: file,
                shape: Shape::Profile,
                staged_erp: true,
            }
        }
        const fn map(flag: &'static str, raw: &'static str, output: &'static str, erp: bool) -> Spec {
            Spec {
                flag,
                raw,
                output,
                shape: Shape::Map { erp },
                staged_erp: false,
            }
        }
        match self {
            Self::Kml => Spec {
                flag: "-kml",
                raw: KML_FILE,
                output: KML_FILE,
                shape: Shape::Bare,
                staged_erp: true,
            },
            Self::TerrainProfile => profile("-p", "terrain.png"),
            Self::ElevationProfile => profile("-e", "elevation.png"),
            Self::HeightProfile => profile("-h", "height.png"),
            Self::NormalizedHeightProfile => profile("-H", "height_normalized.png"),
            Self::PathLossProfile => profile("-l", "path_loss.png"),
            Self::CoverageMap => map("-c", "coverage.ppm", "coverage.png", false),
            Self::LossMap => map("-L", "loss.ppm", "loss.png", false),
            Self::FieldMap => map("-L", "field.ppm", "field.png", true),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Kml => "kml",
            Self::TerrainProfile => "terrain_profile",
            Self::ElevationProfile => "elevation_profile",
            Self::HeightProfile => "height_profile",
            Self::NormalizedHeightProfile => "normalized_height_profile",
            Self::PathLossProfile => "path_loss_profile",
            Self::CoverageMap => "coverage_map",
            Self::LossMap => "loss_map",
            Self::FieldMap => "field_map",
        }
    }

    /// File the tool writes, relative to the working directory.
    pub fn raw_file(self) -> &'static str {
        self.spec().raw
    }

    /// File delivered to the user, relative to the working directory.
    pub fn file_name(self) -> &'static str {
        self.spec().output
    }

    /// Whether the raw output is a pixel map needing conversion.
    pub fn needs_conversion(self) -> bool {
        matches!(self.spec().shape, Shape::Map { .. })
    }

    /// Whether the environment record should carry the ERP line while
    /// producing this artifact.
    ///
    /// The loss map must see no ERP, otherwise the tool plots field
    /// strength instead of path loss. The field map gets ERP from the
    /// command line.
    pub fn stages_erp(self) -> bool {
        self.spec().staged_erp
    }

    /// Output-selecting flags, appended after the site flags.
    pub fn args(self, params: &SimulationParameters) -> Vec<String> {
        let Spec {
            flag, raw, shape, ..
        } = self.spec();
        match shape {
            Shape::Bare => vec![flag.to_owned()],
            Shape::Profile => vec![flag.to_owned(), raw.to_owned()],
            Shape::Map { erp } => {
                let mut args = vec![flag.to_owned(), params.rx_height.to_string()];
                if erp {
                    args.push("-erp".to_owned());
                    args.push(params.erp.to_string());
                }
                args.push("-o".to_owned());
                args.push(raw.to_owned());
                args
            }
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ArtifactKind {
    type Err = SplatError;

    fn from_str(s: &str) -> Result<Self, SplatError> {
        let name = s.replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| SplatError::Param {
                field: "artifact",
                reason: format!("unknown artifact {s:?}"),
            })
    }
}

/// The outcome of one external invocation.
#[derive(Debug, Clone)]
pub struct ArtifactResult {
    pub kind: ArtifactKind,
    pub invocation: Invocation,
    /// Final deliverable, present only when the artifact was produced.
    pub output: Option<PathBuf>,
}

impl ArtifactResult {
    pub fn produced(&self) -> bool {
        self.output.is_some()
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    /// Why nothing was produced, or `None` if something was.
    pub fn failure(&self) -> Option<String> {
        if self.produced() {
            return None;
        }
        let invocation = &self.invocation;
        let reason = match (invocation.exit_code, invocation.last_message()) {
            (Some(code), Some(message)) => format!("exited with status {code}: {message}"),
            (Some(code), None) => format!("exited with status {code}"),
            (None, _) => "terminated by signal".to_owned(),
        };
        Some(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::{ArtifactKind, KML_FILE};
    use crate::{
        qth::{RX_NAME, TX_NAME},
        SimulationParameters,
    };

    #[test]
    fn test_kml_name_matches_sites() {
        assert_eq!(format!("{TX_NAME}-to-{RX_NAME}.kml"), KML_FILE);
        assert_eq!(ArtifactKind::Kml.file_name(), KML_FILE);
    }

    #[test]
    fn test_args() {
        let params = SimulationParameters {
            rx_height: 7,
            erp: 25.5,
            ..SimulationParameters::default()
        };
        assert_eq!(ArtifactKind::Kml.args(&params), ["-kml"]);
        assert_eq!(
            ArtifactKind::NormalizedHeightProfile.args(&params),
            ["-H", "height_normalized.png"]
        );
        assert_eq!(
            ArtifactKind::CoverageMap.args(&params),
            ["-c", "7", "-o", "coverage.ppm"]
        );
        assert_eq!(
            ArtifactKind::LossMap.args(&params),
            ["-L", "7", "-o", "loss.ppm"]
        );
        assert_eq!(
            ArtifactKind::FieldMap.args(&params),
            ["-L", "7", "-erp", "25.5", "-o", "field.ppm"]
        );
    }

    #[test]
    fn test_maps_convert_to_png() {
        for kind in ArtifactKind::ALL {
            if kind.needs_conversion() {
                assert!(kind.raw_file().ends_with(".ppm"));
                assert!(kind.file_name().ends_with(".png"));
                assert!(!kind.stages_erp());
            } else {
                assert_eq!(kind.raw_file(), kind.file_name());
            }
        }
    }

    #[test]
    fn test_parse_name() {
        for kind in ArtifactKind::ALL {
            assert_eq!(kind.name().parse::<ArtifactKind>().unwrap(), kind);
        }
        assert_eq!(
            "path-loss-profile".parse::<ArtifactKind>().unwrap(),
            ArtifactKind::PathLossProfile
        );
        assert!("contour".parse::<ArtifactKind>().is_err());
    }
}
