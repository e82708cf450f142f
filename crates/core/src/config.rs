//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into core services, so request
//! handling never reads process-wide environment variables. The `*_from_env_value` helpers take
//! the raw optional value so binaries can feed them from `std::env::var(..).ok()` and tests can
//! feed them directly.

use crate::clearance::{ClearanceMode, ProphylaxisRule};
use crate::constants::{DEFAULT_CONSULT_TOKEN, DEFAULT_SECTION_MARKER};
use crate::prompt::{DraftTask, PromptPlan};
use crate::{ScribeError, ScribeResult};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct ScribeConfig {
    section_marker: String,
    consult_token: String,
    prophylaxis_rule: ProphylaxisRule,
    clearance_mode: ClearanceMode,
}

impl ScribeConfig {
    /// Create a new `ScribeConfig`.
    ///
    /// # Errors
    ///
    /// Returns `ScribeError::InvalidInput` if either literal token is blank, or if both tokens
    /// are identical (the consult split would then consume section headers).
    pub fn new(
        section_marker: String,
        consult_token: String,
        prophylaxis_rule: ProphylaxisRule,
        clearance_mode: ClearanceMode,
    ) -> ScribeResult<Self> {
        if section_marker.trim().is_empty() {
            return Err(ScribeError::InvalidInput(
                "section marker cannot be empty".into(),
            ));
        }
        if consult_token.trim().is_empty() {
            return Err(ScribeError::InvalidInput(
                "consult token cannot be empty".into(),
            ));
        }
        if section_marker == consult_token {
            return Err(ScribeError::InvalidInput(
                "section marker and consult token must differ".into(),
            ));
        }

        Ok(Self {
            section_marker,
            consult_token,
            prophylaxis_rule,
            clearance_mode,
        })
    }

    pub fn section_marker(&self) -> &str {
        &self.section_marker
    }

    pub fn consult_token(&self) -> &str {
        &self.consult_token
    }

    pub fn prophylaxis_rule(&self) -> ProphylaxisRule {
        self.prophylaxis_rule
    }

    pub fn clearance_mode(&self) -> ClearanceMode {
        self.clearance_mode
    }

    /// Builds a prompt plan using this configuration's tokens.
    ///
    /// An empty `tasks` selects every task; `rule` falls back to the configured rule.
    pub fn plan(
        &self,
        tasks: &[DraftTask],
        rule: Option<ProphylaxisRule>,
    ) -> ScribeResult<PromptPlan> {
        let tasks = if tasks.is_empty() {
            DraftTask::ALL.to_vec()
        } else {
            tasks.to_vec()
        };
        PromptPlan::new(
            tasks,
            self.section_marker.clone(),
            self.consult_token.clone(),
            rule.unwrap_or(self.prophylaxis_rule),
        )
    }
}

impl Default for ScribeConfig {
    fn default() -> Self {
        Self {
            section_marker: DEFAULT_SECTION_MARKER.into(),
            consult_token: DEFAULT_CONSULT_TOKEN.into(),
            prophylaxis_rule: ProphylaxisRule::default(),
            clearance_mode: ClearanceMode::default(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Resolve a literal token, falling back to `default` when unset or blank.
///
/// Surrounding whitespace is significant in tokens and is kept.
pub fn token_from_env_value(value: Option<String>, default: &str) -> String {
    non_blank(value).unwrap_or_else(|| default.to_string())
}

/// Raw environment values for [`scribe_config_from_env_values`].
#[derive(Debug, Default, Clone)]
pub struct ScribeEnv {
    pub section_marker: Option<String>,
    pub consult_token: Option<String>,
    pub prophylaxis_rule: Option<String>,
    pub clearance_mode: Option<String>,
}

impl ScribeEnv {
    /// Reads `SCRIBE_SECTION_MARKER`, `SCRIBE_CONSULT_TOKEN`, `SCRIBE_PROPHYLAXIS_RULE` and
    /// `SCRIBE_CLEARANCE_MODE`. Intended for binaries at startup only.
    pub fn from_process_env() -> Self {
        Self {
            section_marker: std::env::var("SCRIBE_SECTION_MARKER").ok(),
            consult_token: std::env::var("SCRIBE_CONSULT_TOKEN").ok(),
            prophylaxis_rule: std::env::var("SCRIBE_PROPHYLAXIS_RULE").ok(),
            clearance_mode: std::env::var("SCRIBE_CLEARANCE_MODE").ok(),
        }
    }
}

/// Resolve a `ScribeConfig` from raw values, applying defaults for anything unset.
///
/// # Errors
///
/// Returns `ScribeError::InvalidInput` if a rule or mode name is unknown or the tokens collide.
pub fn scribe_config_from_env_values(env: ScribeEnv) -> ScribeResult<ScribeConfig> {
    ScribeConfig::new(
        token_from_env_value(env.section_marker, DEFAULT_SECTION_MARKER),
        token_from_env_value(env.consult_token, DEFAULT_CONSULT_TOKEN),
        prophylaxis_rule_from_env_value(env.prophylaxis_rule)?,
        clearance_mode_from_env_value(env.clearance_mode)?,
    )
}

/// Parse the prophylaxis rule from an optional string value.
///
/// If `value` is `None` or blank, returns the Cockcroft-Gault rule.
pub fn prophylaxis_rule_from_env_value(value: Option<String>) -> ScribeResult<ProphylaxisRule> {
    non_blank(value)
        .map(|v| v.parse::<ProphylaxisRule>())
        .transpose()
        .map(Option::unwrap_or_default)
}

/// Parse the clearance validation mode from an optional string value.
///
/// If `value` is `None` or blank, returns permissive mode.
pub fn clearance_mode_from_env_value(value: Option<String>) -> ScribeResult<ClearanceMode> {
    non_blank(value)
        .map(|v| v.parse::<ClearanceMode>())
        .transpose()
        .map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_values_fall_back_to_defaults() {
        assert_eq!(token_from_env_value(None, "###"), "###");
        assert_eq!(token_from_env_value(Some("  ".into()), "**"), "**");
        assert_eq!(
            prophylaxis_rule_from_env_value(None).unwrap(),
            ProphylaxisRule::CockcroftGault
        );
        assert_eq!(
            clearance_mode_from_env_value(Some(String::new())).unwrap(),
            ClearanceMode::Permissive
        );
    }

    #[test]
    fn set_values_are_parsed() {
        assert_eq!(token_from_env_value(Some("@@".into()), "###"), "@@");
        assert_eq!(
            prophylaxis_rule_from_env_value(Some("creatinine-cutoff".into())).unwrap(),
            ProphylaxisRule::CreatinineCutoff
        );
        assert_eq!(
            clearance_mode_from_env_value(Some("STRICT".into())).unwrap(),
            ClearanceMode::Strict
        );
    }

    #[test]
    fn invalid_values_are_errors() {
        assert!(prophylaxis_rule_from_env_value(Some("guess".into())).is_err());
        assert!(clearance_mode_from_env_value(Some("loose".into())).is_err());
    }

    #[test]
    fn resolves_full_config_from_values() {
        let cfg = scribe_config_from_env_values(ScribeEnv {
            section_marker: Some("==".into()),
            prophylaxis_rule: Some("cutoff".into()),
            ..ScribeEnv::default()
        })
        .expect("valid config");
        assert_eq!(cfg.section_marker(), "==");
        assert_eq!(cfg.consult_token(), DEFAULT_CONSULT_TOKEN);
        assert_eq!(cfg.prophylaxis_rule(), ProphylaxisRule::CreatinineCutoff);
        assert_eq!(cfg.clearance_mode(), ClearanceMode::Permissive);

        let err = scribe_config_from_env_values(ScribeEnv {
            section_marker: Some("**".into()),
            ..ScribeEnv::default()
        })
        .expect_err("marker collides with consult token");
        assert!(matches!(err, ScribeError::InvalidInput(_)));
    }

    #[test]
    fn identical_tokens_are_rejected() {
        let err = ScribeConfig::new(
            "**".into(),
            "**".into(),
            ProphylaxisRule::default(),
            ClearanceMode::default(),
        )
        .expect_err("tokens must differ");
        assert!(matches!(err, ScribeError::InvalidInput(msg) if msg.contains("differ")));
    }

    #[test]
    fn plan_defaults_to_every_task_and_configured_rule() {
        let cfg = ScribeConfig::new(
            "@@@".into(),
            "__".into(),
            ProphylaxisRule::CreatinineCutoff,
            ClearanceMode::Strict,
        )
        .expect("valid config");

        let plan = cfg.plan(&[], None).expect("valid plan");
        assert_eq!(plan.tasks(), &DraftTask::ALL);
        assert_eq!(plan.marker(), "@@@");
        assert_eq!(plan.pair_token(), "__");
        assert_eq!(plan.prophylaxis_rule(), ProphylaxisRule::CreatinineCutoff);

        let plan = cfg
            .plan(&[DraftTask::Note], Some(ProphylaxisRule::CockcroftGault))
            .expect("valid plan");
        assert_eq!(plan.tasks(), &[DraftTask::Note]);
        assert_eq!(plan.prophylaxis_rule(), ProphylaxisRule::CockcroftGault);
    }
}
