use crate::types::HealthRes;

/// Health service used by the REST handlers.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    /// Check health without creating an instance.
    ///
    /// # Returns
    /// A `HealthRes` indicating the service is alive.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "Scribe is alive".into(),
        }
    }
}
