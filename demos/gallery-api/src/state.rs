/// Shared application state available to all route handlers via Axum's
/// `State` extractor.
pub struct AppState {
    /// The async gallery. Dispatches merges and store calls to a blocking
    /// thread pool internally.
    pub gallery: kissune_cards::AsyncCardGallery,
}
