//! Derived traps from a communication topology document.
//!
//! A deployment may describe which component talks to which over what
//! mechanism. Every REST link `source → target` means the target endpoint
//! should only ever be called by that source, so the endpoint itself becomes
//! a trap whose note names the expected caller:
//!
//! ```text
//! {"CommunicationConfiguration": {"connectionTechs": [
//!     {"commOption": "REST", "sourceContainer": "edge", "sourceComponent": "cam",
//!      "targetContainer": "cloud", "targetComponent": "store", "targetPort": "in"}
//! ]}}
//!     → /cloud/store/in  trap-note "Expected source: edge; Expected component: cam"
//! ```
//!
//! The document is consumed once at startup and dropped after merging.

use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

use crate::traps::schema::{ResponseSpec, TrapConfig, TrapEntry};
use crate::traps::store::read_first_existing;

/// Error type for the derived document. Absence is not an error.
#[derive(Debug, thiserror::Error)]
pub enum DerivedConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed derived configuration {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct DerivedDocument {
    #[serde(rename = "CommunicationConfiguration")]
    pub communication: CommunicationConfiguration,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommunicationConfiguration {
    #[serde(rename = "connectionTechs", default)]
    pub connection_techs: Vec<ConnectionTech>,
}

/// One link of the topology.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionTech {
    pub comm_option: String,
    #[serde(default)]
    pub source_container: Option<String>,
    #[serde(default)]
    pub source_component: Option<String>,
    #[serde(default)]
    pub target_container: Option<String>,
    #[serde(default)]
    pub target_component: Option<String>,
    #[serde(default)]
    pub target_port: Option<PortRef>,
}

/// Ports show up both as names and as numbers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PortRef {
    Name(String),
    Number(u64),
}

impl fmt::Display for PortRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortRef::Name(name) => f.write_str(name),
            PortRef::Number(n) => write!(f, "{}", n),
        }
    }
}

impl ConnectionTech {
    /// `/<targetContainer>/<targetComponent>/<targetPort>`, if all parts are present.
    pub fn trap_uri(&self) -> Option<String> {
        let container = self.target_container.as_deref()?;
        let component = self.target_component.as_deref()?;
        let port = self.target_port.as_ref()?;
        Some(format!("/{}/{}/{}", container, component, port))
    }

    pub fn trap_note(&self) -> String {
        format!(
            "Expected source: {}; Expected component: {}",
            self.source_container.as_deref().unwrap_or("None"),
            self.source_component.as_deref().unwrap_or("None"),
        )
    }
}

/// Load the first existing derived document. `Ok(None)` when there is none.
pub fn load_derived(candidates: &[PathBuf]) -> Result<Option<DerivedDocument>, DerivedConfigError> {
    let Some((path, content)) = read_first_existing(candidates)
        .map_err(|(path, source)| DerivedConfigError::Io { path, source })?
    else {
        tracing::info!("No derived configuration present, using primary traps only");
        return Ok(None);
    };

    let document = serde_json::from_str(&content)
        .map_err(|source| DerivedConfigError::Parse { path: path.clone(), source })?;
    tracing::info!(path = %path.display(), "Derived configuration loaded");
    Ok(Some(document))
}

/// Insert one trap per matching link. Returns the number of traps inserted.
///
/// A derived trap replaces a primary trap at the same URI.
pub fn merge_derived(
    config: &mut TrapConfig,
    document: DerivedDocument,
    comm_option: &str,
    empty_json_body: &str,
) -> usize {
    let mut inserted = 0;

    for link in document.communication.connection_techs {
        if link.comm_option != comm_option {
            continue;
        }
        let Some(uri) = link.trap_uri() else {
            tracing::warn!(
                comm_option = %link.comm_option,
                "Skipping derived link without a complete target"
            );
            continue;
        };

        let entry = TrapEntry {
            trap_note: Some(link.trap_note()),
            trap_response: Some(ResponseSpec::new("application/json", empty_json_body)),
            ..Default::default()
        };

        if config.traps.insert(uri.clone(), entry).is_some() {
            tracing::warn!(uri = %uri, "Derived trap replaces configured trap");
        } else {
            tracing::debug!(uri = %uri, "Derived trap added");
        }
        inserted += 1;
    }

    inserted
}
