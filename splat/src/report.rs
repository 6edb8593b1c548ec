use crate::{
    artifact::{ArtifactKind, ArtifactResult},
    error::SplatError,
};
use serde::Serialize;

/// Per-artifact outcomes of a full run, in production order.
#[derive(Debug)]
pub struct RunReport {
    distance_m: f64,
    outcomes: Vec<(ArtifactKind, Result<ArtifactResult, SplatError>)>,
}

impl RunReport {
    pub(crate) fn new(distance_m: f64) -> Self {
        Self {
            distance_m,
            outcomes: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, kind: ArtifactKind, outcome: Result<ArtifactResult, SplatError>) {
        self.outcomes.push((kind, outcome));
    }

    /// Great circle distance of the simulated link (meters).
    pub fn distance_m(&self) -> f64 {
        self.distance_m
    }

    pub fn outcomes(
        &self,
    ) -> impl Iterator<Item = (ArtifactKind, &Result<ArtifactResult, SplatError>)> + '_ {
        self.outcomes.iter().map(|(kind, outcome)| (*kind, outcome))
    }

    pub fn get(&self, kind: ArtifactKind) -> Option<&Result<ArtifactResult, SplatError>> {
        self.outcomes()
            .find(|(k, _)| *k == kind)
            .map(|(_, outcome)| outcome)
    }

    /// Produced artifacts and their paths relative to the working
    /// directory.
    pub fn succeeded(&self) -> impl Iterator<Item = (ArtifactKind, &'static str)> + '_ {
        self.outcomes()
            .filter(|(_, outcome)| failure(outcome).is_none())
            .map(|(kind, _)| (kind, kind.file_name()))
    }

    /// Artifacts that were not produced, and why.
    pub fn failed(&self) -> impl Iterator<Item = (ArtifactKind, String)> + '_ {
        self.outcomes()
            .filter_map(|(kind, outcome)| failure(outcome).map(|reason| (kind, reason)))
    }

    pub fn all_failed(&self) -> bool {
        self.succeeded().next().is_none()
    }

    pub fn summary(&self) -> Summary {
        let artifacts = self
            .outcomes()
            .map(|(kind, outcome)| {
                let error = failure(outcome);
                ArtifactSummary {
                    kind,
                    path: error.is_none().then(|| kind.file_name().to_owned()),
                    exit_code: outcome
                        .as_ref()
                        .ok()
                        .and_then(|result| result.invocation.exit_code),
                    error,
                }
            })
            .collect();
        Summary {
            distance_km: self.distance_m / 1000.0,
            artifacts,
        }
    }
}

/// Serializable view of a [`RunReport`].
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub distance_km: f64,
    pub artifacts: Vec<ArtifactSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArtifactSummary {
    pub kind: ArtifactKind,
    /// Relative path of the produced file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn failure(outcome: &Result<ArtifactResult, SplatError>) -> Option<String> {
    match outcome {
        Ok(result) => result.failure(),
        Err(e) => Some(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::RunReport;
    use crate::{
        artifact::{ArtifactKind, ArtifactResult},
        runner::Invocation,
        SplatError,
    };
    use std::path::PathBuf;

    fn report() -> RunReport {
        let mut report = RunReport::new(12_500.0);
        report.push(
            ArtifactKind::Kml,
            Ok(ArtifactResult {
                kind: ArtifactKind::Kml,
                invocation: Invocation {
                    exit_code: Some(0),
                    ..Invocation::default()
                },
                output: Some(PathBuf::from("/work/TX-to-RX.kml")),
            }),
        );
        report.push(
            ArtifactKind::TerrainProfile,
            Ok(ArtifactResult {
                kind: ArtifactKind::TerrainProfile,
                invocation: Invocation {
                    exit_code: Some(1),
                    stderr: "gnuplot not found\n".into(),
                    ..Invocation::default()
                },
                output: None,
            }),
        );
        report.push(
            ArtifactKind::CoverageMap,
            Err(SplatError::MissingOutput {
                kind: ArtifactKind::CoverageMap,
                path: PathBuf::from("/work/coverage.ppm"),
            }),
        );
        report
    }

    #[test]
    fn test_succeeded_and_failed() {
        let report = report();
        let succeeded: Vec<_> = report.succeeded().collect();
        assert_eq!(succeeded, [(ArtifactKind::Kml, "TX-to-RX.kml")]);

        let failed: Vec<_> = report.failed().collect();
        assert_eq!(failed.len(), 2);
        assert_eq!(
            failed[0],
            (
                ArtifactKind::TerrainProfile,
                "exited with status 1: gnuplot not found".to_owned()
            )
        );
        assert_eq!(failed[1].0, ArtifactKind::CoverageMap);
        assert!(failed[1].1.contains("coverage.ppm"));
        assert!(!report.all_failed());
        assert!(report.get(ArtifactKind::FieldMap).is_none());
    }

    #[test]
    fn test_summary_json() {
        let json = serde_json::to_value(report().summary()).unwrap();
        assert_eq!(json["distance_km"], 12.5);
        assert_eq!(json["artifacts"][0]["kind"], "kml");
        assert_eq!(json["artifacts"][0]["path"], "TX-to-RX.kml");
        assert!(json["artifacts"][0].get("error").is_none());
        assert_eq!(json["artifacts"][1]["exit_code"], 1);
        assert!(json["artifacts"][1].get("path").is_none());
        assert!(json["artifacts"][2]["error"]
            .as_str()
            .unwrap()
            .starts_with("coverage_map exited successfully"));
    }
}
