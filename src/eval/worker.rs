use crate::error::EvaluationError;
use crate::eval::client::EvaluationService;
use crate::eval::wire::{EvaluationRequest, EvaluationResult};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

pub type EvaluationOutcome = Result<Vec<EvaluationResult>, EvaluationError>;

/// Handle to one evaluation running on a background thread.
pub struct PendingEvaluation {
    rx: Receiver<EvaluationOutcome>,
}

#[derive(Debug, PartialEq)]
pub enum Poll {
    Pending,
    Ready(EvaluationOutcome),
}

impl PendingEvaluation {
    /// Non-blocking check. A worker that died without answering reports
    /// `EvaluationError::WorkerLost` so the caller always gets an outcome.
    pub fn poll(&self) -> Poll {
        match self.rx.try_recv() {
            Ok(outcome) => Poll::Ready(outcome),
            Err(TryRecvError::Empty) => Poll::Pending,
            Err(TryRecvError::Disconnected) => Poll::Ready(Err(EvaluationError::WorkerLost)),
        }
    }

    pub fn wait(&self, timeout: Duration) -> Poll {
        match self.rx.recv_timeout(timeout) {
            Ok(outcome) => Poll::Ready(outcome),
            Err(mpsc::RecvTimeoutError::Timeout) => Poll::Pending,
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                Poll::Ready(Err(EvaluationError::WorkerLost))
            }
        }
    }
}

pub fn spawn_evaluation(
    service: Arc<dyn EvaluationService>,
    request: EvaluationRequest,
) -> PendingEvaluation {
    let (tx, rx) = mpsc::channel::<EvaluationOutcome>();
    let spawned = std::thread::Builder::new()
        .name("evaluation".into())
        .spawn(move || {
            let outcome = service.evaluate(&request);
            let _ = tx.send(outcome);
        });
    if let Err(err) = spawned {
        // The sender was moved into the closure and dropped with it, so the
        // receiver already reports a disconnect.
        tracing::error!("failed to spawn evaluation worker: {err}");
    }
    PendingEvaluation { rx }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    struct Echo;

    impl EvaluationService for Echo {
        fn evaluate(&self, request: &EvaluationRequest) -> EvaluationOutcome {
            Ok(vec![EvaluationResult::new(request.image.clone(), "1", false)])
        }
    }

    struct Panics;

    impl EvaluationService for Panics {
        fn evaluate(&self, _request: &EvaluationRequest) -> EvaluationOutcome {
            panic!("service blew up");
        }
    }

    fn request() -> EvaluationRequest {
        EvaluationRequest {
            image: "img".into(),
            dict_of_vars: BTreeMap::new(),
        }
    }

    #[test]
    fn worker_delivers_service_outcome() {
        let pending = spawn_evaluation(Arc::new(Echo), request());
        let Poll::Ready(outcome) = pending.wait(Duration::from_secs(5)) else {
            panic!("worker did not answer");
        };
        assert_eq!(
            outcome.expect("ok")[0],
            EvaluationResult::new("img", "1", false)
        );
    }

    #[test]
    fn panicking_worker_reports_worker_lost() {
        let pending = spawn_evaluation(Arc::new(Panics), request());
        assert_eq!(
            pending.wait(Duration::from_secs(5)),
            Poll::Ready(Err(EvaluationError::WorkerLost))
        );
    }
}
