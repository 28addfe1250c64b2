//! Pinterest OAuth helpers.

use api_hub_server::config::PinterestConfig;
use api_hub_server::pinterest::{self, PinterestError};

/// Print the consent-page URL for `client_id`.
///
/// Honors `PINTEREST_AUTHORIZE_URL` when set.
///
/// # Errors
///
/// Returns `PinterestError::InvalidAuthorizeUrl` if the configured consent
/// page is not a valid URL.
pub fn authorize_url(client_id: &str, redirect_uri: &str) -> Result<(), PinterestError> {
    let url = pinterest::authorize_url(&PinterestConfig::from_env(), client_id, redirect_uri)?;

    #[allow(clippy::print_stdout)]
    {
        println!("{url}");
    }
    Ok(())
}
