/// @apiPath: /ping
/// @apiMethod: GET
/// @apiSummary: Ping
pub fn ping() -> &'static str {
    "pong"
}
