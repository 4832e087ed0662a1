//! Shared User-Agent string for API, manifest and runtime download traffic.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://bymrefitted.com";

/// Default User-Agent for every launcher request.
#[must_use]
pub(crate) fn default_launcher_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("launcher/{version} (game-launcher; +{PROJECT_UA_URL})")
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ua_carries_crate_version_and_project_url() {
        let ua = default_launcher_user_agent();
        assert!(ua.contains(PROJECT_UA_URL), "UA must contain project URL");
        assert_eq!(
            env!("CARGO_PKG_VERSION"),
            ua.strip_prefix("launcher/")
                .and_then(|s| s.split(' ').next())
                .expect("UA has version"),
            "UA must contain crate version"
        );
    }
}
