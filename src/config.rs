use serde::Serialize;

use crate::cli::PreamblePolicy;

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct RunConfig {
    pub debug: bool,
    pub force: bool,
    pub quiet: bool,
    #[serde(serialize_with = "serialize_preamble")]
    pub preamble: PreamblePolicy,
}

impl RunConfig {
    pub fn log_directive(&self) -> &'static str {
        if self.debug {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }
}

fn serialize_preamble<S>(policy: &PreamblePolicy, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(policy.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_wins_over_quiet() {
        let config = RunConfig {
            debug: true,
            quiet: true,
            ..RunConfig::default()
        };
        assert_eq!(config.log_directive(), "debug");
    }

    #[test]
    fn quiet_lowers_to_warn() {
        let config = RunConfig {
            quiet: true,
            ..RunConfig::default()
        };
        assert_eq!(config.log_directive(), "warn");
        assert_eq!(RunConfig::default().log_directive(), "info");
    }
}
