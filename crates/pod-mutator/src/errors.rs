use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("admission request does not carry an object")]
    MissingObject,

    #[error("expected a v1/Pod object, got apiVersion {api_version:?} kind {kind:?}")]
    UnexpectedType { api_version: String, kind: String },

    #[error("{0}")]
    Deserialize(#[source] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum EvaluationError {
    #[error("could not deserialize pod object: {0}")]
    Decode(#[from] DecodeError),

    #[error("rule {rule} cannot build patch value: {source}")]
    PatchValue {
        rule: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Error, Debug)]
pub enum ResponseError {
    #[error("cannot serialize JSON patch: {0}")]
    SerializePatch(#[source] serde_json::Error),
}
