use crate::evaluator::AdmissionEvaluator;

pub(crate) struct ApiServerState {
    pub(crate) evaluator: AdmissionEvaluator,
}
