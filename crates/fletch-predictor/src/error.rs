use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredictorError {
    #[error("Training set has no solved records")]
    EmptyTrainingSet,
    #[error("Training diverged at epoch {epoch}")]
    NonFiniteLoss { epoch: usize },
}
