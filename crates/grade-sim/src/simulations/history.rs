use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use super::domain::{SimulationRecord, UserId};
use super::repository::SimulationRepository;
use super::service::SimulationService;
use crate::identity::AuthenticatedUser;

/// Latest history snapshot for whoever is signed in.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryState {
    SignedOut,
    Loaded {
        user: UserId,
        records: Vec<SimulationRecord>,
    },
    Failed {
        user: UserId,
        message: String,
    },
}

impl HistoryState {
    pub fn records(&self) -> &[SimulationRecord] {
        match self {
            HistoryState::Loaded { records, .. } => records,
            _ => &[],
        }
    }
}

/// Spawns a task that reloads the history every time the signed-in user changes.
///
/// The task ends once the identity sender is dropped. Must be called inside a tokio runtime.
pub fn follow_session<R>(
    mut users: watch::Receiver<Option<AuthenticatedUser>>,
    service: Arc<SimulationService<R>>,
    limit: Option<usize>,
) -> watch::Receiver<HistoryState>
where
    R: SimulationRepository + 'static,
{
    let initial = load(&service, users.borrow_and_update().as_ref(), limit);
    let (sender, receiver) = watch::channel(initial);

    tokio::spawn(async move {
        while users.changed().await.is_ok() {
            let user = users.borrow_and_update().clone();
            let state = load(&service, user.as_ref(), limit);
            if sender.send(state).is_err() {
                debug!("history receiver dropped, stopping session follower");
                break;
            }
        }
    });

    receiver
}

fn load<R>(
    service: &SimulationService<R>,
    user: Option<&AuthenticatedUser>,
    limit: Option<usize>,
) -> HistoryState
where
    R: SimulationRepository + 'static,
{
    let Some(user) = user else {
        return HistoryState::SignedOut;
    };

    match service.history(&user.uid, limit) {
        Ok(records) => HistoryState::Loaded {
            user: user.uid.clone(),
            records,
        },
        Err(error) => {
            warn!(uid = %user.uid, %error, "history reload failed");
            HistoryState::Failed {
                user: user.uid.clone(),
                message: error.to_string(),
            }
        }
    }
}
