use thiserror::Error;

/// Hard stops of the analysis pipeline. Everything else degrades to defaults.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("no face detected in the submitted image")]
    NoFaceDetected,
}

impl AnalysisError {
    /// Message shown to the end user.
    pub fn user_message(&self) -> &'static str {
        match self {
            AnalysisError::NoFaceDetected => {
                "Не вдалося розпізнати обличчя. Надішліть, будь ласка, чітке фронтальне фото."
            }
        }
    }
}
