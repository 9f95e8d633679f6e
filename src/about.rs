pub const GENTLE_PCR_DISPLAY_VERSION: &str = env!("GENTLE_PCR_DISPLAY_VERSION");
pub const GENTLE_PCR_BUILD_N: &str = env!("GENTLE_PCR_BUILD_N");

pub fn version_cli_text() -> String {
    format!(
        "GENtle PCR {}\nBuild {}\nPCR simulation, melting temperature and primer design",
        GENTLE_PCR_DISPLAY_VERSION, GENTLE_PCR_BUILD_N
    )
}

/// One-line version stamped into reports
pub fn version_short_text() -> String {
    format!("gentle-pcr {GENTLE_PCR_DISPLAY_VERSION}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_texts() {
        assert!(version_cli_text().starts_with("GENtle PCR "));
        assert!(version_cli_text().contains(GENTLE_PCR_BUILD_N));
        assert_eq!(
            version_short_text(),
            format!("gentle-pcr {}", env!("CARGO_PKG_VERSION"))
        );
    }
}
