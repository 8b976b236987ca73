/// Liveness probe. Never touches the store.
pub async fn health_check() -> &'static str {
    "1"
}
