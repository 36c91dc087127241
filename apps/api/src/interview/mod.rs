// Interview sessions: answer scoring, outcome classification, persistence.
// Embeddings come in through the `Embedder` handle in AppState.

pub mod handlers;
pub mod models;
pub mod outcome;
pub mod scoring;
pub mod session;
