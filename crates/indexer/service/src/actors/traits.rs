use async_trait::async_trait;

/// An actor-like long running task of the indexer service.
#[async_trait]
pub trait IndexerActor {
    /// The error type for the actor.
    type Error: std::fmt::Debug;

    /// Runs the actor to completion.
    async fn start(mut self) -> Result<(), Self::Error>;
}
