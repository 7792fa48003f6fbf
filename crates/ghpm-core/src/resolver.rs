use ghpm_schema::Platform;
use thiserror::Error;

use crate::release::Asset;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("No asset matches any of the platforms [{}]", join(.preferences))]
    NoAssetForPlatform { preferences: Vec<Platform> },
}

fn join(platforms: &[Platform]) -> String {
    platforms
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Picks the asset to install from a release.
///
/// Preferences are tried in order and the first tier with any match wins.
/// Within a tier the first asset in input order is returned, so a release that
/// ships both `tool-linux-x64.tar.gz` and `tool-linux-x64.deb` resolves to
/// whichever the host listed first.
///
/// # Errors
///
/// Returns [`ResolveError::NoAssetForPlatform`] when no tier matches,
/// including when `assets` is empty.
pub fn select_asset<'a>(
    assets: &'a [Asset],
    preferences: &[Platform],
) -> Result<&'a Asset, ResolveError> {
    let classified: Vec<(Platform, &Asset)> = assets.iter().map(|a| (a.platform(), a)).collect();

    for preference in preferences {
        if let Some((platform, asset)) = classified
            .iter()
            .find(|(platform, _)| preference.accepts(platform))
        {
            tracing::debug!(asset = %asset.name, %platform, %preference, "selected asset");
            return Ok(*asset);
        }
    }

    Err(ResolveError::NoAssetForPlatform {
        preferences: preferences.to_vec(),
    })
}
