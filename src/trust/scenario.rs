// trust/scenario.rs - Declarative Trust Scenarios

use serde::{Deserialize, Serialize};
use tracing::info;

use super::query::TrustVerdict;
use super::web::{AssertionOutcome, WebOfTrust};

/// A batch of registrations, assertions and queries
///
/// ```json
/// {
///   "entities": ["A", "B", "C"],
///   "assertions": [{ "signer": "A", "target": "B", "level": "complete" }],
///   "queries": [{ "viewer": "A", "target": "C" }]
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub entities: Vec<String>,
    pub assertions: Vec<AssertionSpec>,
    pub queries: Vec<QuerySpec>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionSpec {
    pub signer: String,
    pub target: String,
    pub level: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySpec {
    pub viewer: String,
    pub target: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct RegistrationResult {
    pub name: String,
    pub success: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct AssertionResult {
    pub signer: String,
    pub target: String,
    pub level: String,
    #[serde(flatten)]
    pub outcome: AssertionOutcome,
}

#[derive(Clone, Debug, Serialize)]
pub struct QueryResult {
    pub viewer: String,
    pub target: String,
    #[serde(flatten)]
    pub verdict: TrustVerdict,
}

/// Everything that happened while applying a scenario, in order
#[derive(Clone, Debug, Default, Serialize)]
pub struct ScenarioReport {
    pub registrations: Vec<RegistrationResult>,
    pub assertions: Vec<AssertionResult>,
    pub queries: Vec<QueryResult>,
}

impl ScenarioReport {
    /// Registrations and assertions that were rejected
    pub fn failures(&self) -> usize {
        let registrations = self.registrations.iter().filter(|r| !r.success).count();
        let assertions = self.assertions.iter().filter(|a| !a.outcome.success).count();
        registrations + assertions
    }
}

impl Scenario {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Apply registrations, then assertions, then queries
    pub fn apply(&self, web: &WebOfTrust) -> ScenarioReport {
        let registrations: Vec<_> = self
            .entities
            .iter()
            .map(|name| RegistrationResult {
                name: name.clone(),
                success: web.register_entity(name),
            })
            .collect();

        let assertions: Vec<_> = self
            .assertions
            .iter()
            .map(|assertion| AssertionResult {
                signer: assertion.signer.clone(),
                target: assertion.target.clone(),
                level: assertion.level.clone(),
                outcome: web.assert_trust(
                    &assertion.signer,
                    &assertion.target,
                    &assertion.level,
                ),
            })
            .collect();

        let queries: Vec<_> = self
            .queries
            .iter()
            .map(|query| QueryResult {
                viewer: query.viewer.clone(),
                target: query.target.clone(),
                verdict: web.check_trust(&query.viewer, &query.target),
            })
            .collect();

        let report = ScenarioReport {
            registrations,
            assertions,
            queries,
        };
        info!(
            entities = report.registrations.len(),
            assertions = report.assertions.len(),
            queries = report.queries.len(),
            failures = report.failures(),
            "Scenario applied"
        );
        report
    }
}
