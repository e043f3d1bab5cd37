use crate::dto::HealthRes;

/// Health check shared by every API surface.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    /// Reports the service as healthy.
    ///
    /// The board has no external dependency whose failure makes it unhealthy: the record slot
    /// fails open and the tip collaborator falls back to a fixed sentence.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "OT board is alive".into(),
        }
    }
}
