/// @apiPath: /health
/// @apiMethod: GET
/// @apiSummary: Liveness probe
/// @apiTag: health
/// @apiErrorStatusCodes: 503
pub async fn health() -> &'static str {
    "ok"
}

/// Plain helper without directives.
fn uptime() -> u64 {
    0
}
