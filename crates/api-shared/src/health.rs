use crate::dto::HealthRes;

/// Simple health service shared by the API front ends.
///
/// Reports liveness and whether a model is installed, so a load balancer can tell a running but
/// unusable process apart from a healthy one.
pub struct HealthService;

impl HealthService {
    /// Builds the health response for a process whose model is or is not ready.
    pub fn check_health(model_ready: bool) -> HealthRes {
        HealthRes {
            ok: model_ready,
            model_ready,
            message: if model_ready {
                "SymCheck is alive".into()
            } else {
                "SymCheck is alive but no model is loaded".into()
            },
        }
    }
}
