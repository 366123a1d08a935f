use std::fmt;

use amp_store::StoreClient;
use amp_types::{DocumentId, PackageAddress, Resolution, RevisionFingerprint, RESOLVED_VIA};
use serde::Serialize;
use tracing::info;

use crate::error::{TreeError, TreeResult};
use crate::manifest::{read_manifest, read_manifest_in, PackageManifest};
use crate::subpath::resolve_subpath;

/// Cache key for a resolved package: `<root>@<heads>`.
///
/// Equal for two resolutions iff the root document's heads are equal, so it
/// changes exactly when the root document records a new change.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PackageIdentity {
    root: DocumentId,
    fingerprint: RevisionFingerprint,
}

impl PackageIdentity {
    pub fn new(root: DocumentId, fingerprint: RevisionFingerprint) -> Self {
        Self { root, fingerprint }
    }

    pub fn root(&self) -> &DocumentId {
        &self.root
    }

    pub fn fingerprint(&self) -> &RevisionFingerprint {
        &self.fingerprint
    }
}

impl fmt::Display for PackageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.root, self.fingerprint)
    }
}

/// Result of resolving a package address.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPackage {
    /// Cache identity (`<root>@<heads>`).
    pub id: String,
    pub manifest: PackageManifest,
    /// The address as resolved, subpath included.
    pub full_address: String,
    /// What the host hands back to `fetch`.
    pub resolution: Resolution,
    pub resolved_via: String,
}

impl ResolvedPackage {
    pub fn manifest_name(&self) -> &str {
        &self.manifest.name
    }

    pub fn manifest_version(&self) -> &str {
        &self.manifest.version
    }
}

/// Resolve an address to its manifest and cache identity.
///
/// The identity comes from the root document's heads. The manifest comes
/// from the folder the address names: the root, or the subpath target.
pub async fn resolve_package(client: &StoreClient, address: &PackageAddress) -> TreeResult<ResolvedPackage> {
    let root = address.root();
    let handle = client.find(root).await.map_err(|e| TreeError::from_store(e, ""))?;
    let identity = PackageIdentity::new(root.clone(), handle.heads().clone());
    let root_folder = handle.into_folder()?;

    let manifest = match address.subpath() {
        Some(subpath) => {
            let target = resolve_subpath(client, root, subpath).await?;
            read_manifest(client, &target).await?
        }
        None => read_manifest_in(client, root, &root_folder).await?,
    };

    let full_address = address.full_address();
    info!(
        address = %full_address,
        identity = %identity,
        heads = identity.fingerprint().heads().len(),
        name = %manifest.name,
        version = %manifest.version,
        "resolved package"
    );

    Ok(ResolvedPackage {
        id: identity.to_string(),
        manifest,
        resolution: Resolution::automerge(full_address.clone()),
        full_address,
        resolved_via: RESOLVED_VIA.to_string(),
    })
}
