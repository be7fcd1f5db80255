//! Mediator - メッセージを型に対応する handler へ送る
//!
//! 型付きの `send` と、閉じた `Request` 列挙型を受け取る `dispatch` の 2 つの入口があります。

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::handlers::Handlers;
use crate::domain::PhonebookError;
use crate::typed::{Handler, Message, Request, Response};

/// Mediator dispatches a message to the handler registered for its type.
///
/// Design:
/// - The handler table is built once at startup and never mutated.
/// - Resolution is a trait bound (`Handlers: Handler<M>`), so a message
///   without a handler is a compile error rather than a runtime lookup miss.
/// - Cheap to clone; every clone shares the same table.
#[derive(Clone)]
pub struct Mediator {
    handlers: Arc<Handlers>,
}

impl Mediator {
    pub fn new(handlers: Handlers) -> Self {
        Self {
            handlers: Arc::new(handlers),
        }
    }

    /// Send one message and return its handler's result unchanged.
    pub async fn send<M>(
        &self,
        message: M,
        cancel: &CancellationToken,
    ) -> Result<M::Response, PhonebookError>
    where
        M: Message,
        Handlers: Handler<M>,
    {
        debug!(message = M::NAME, "dispatching");
        let result = Handler::<M>::handle(self.handlers.as_ref(), message, cancel).await;
        if let Err(e) = &result {
            debug!(message = M::NAME, error = %e, "handler failed");
        }
        result
    }

    /// Untyped entry point over the closed [`Request`] enum.
    pub async fn dispatch(
        &self,
        request: Request,
        cancel: &CancellationToken,
    ) -> Result<Response, PhonebookError> {
        match request {
            Request::CreateEntry(m) => self.send(m, cancel).await.map(Response::Created),
            Request::UpdateEntry(m) => self.send(m, cancel).await.map(Response::Updated),
            Request::DeleteEntry(m) => self.send(m, cancel).await.map(Response::Deleted),
            Request::GetAllEntries(m) => self.send(m, cancel).await.map(Response::Entries),
            Request::GetEntryById(m) => self.send(m, cancel).await.map(Response::Found),
            Request::GetEntryByName(m) => self.send(m, cancel).await.map(Response::Found),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EntryFields, EntryId};
    use crate::impls::InMemoryEntryStore;
    use crate::typed::{CreateEntry, GetAllEntries, GetEntryById, GetEntryByName, UpdateEntry};

    fn mediator() -> Mediator {
        Mediator::new(Handlers::new(Arc::new(InMemoryEntryStore::new())))
    }

    #[tokio::test]
    async fn send_routes_by_message_type() {
        let m = mediator();
        let cancel = CancellationToken::new();

        let created = m
            .send(CreateEntry { entry: EntryFields::new("John Doe", "123-456-7890") }, &cancel)
            .await
            .unwrap();
        let found = m.send(GetEntryById { id: created.id }, &cancel).await.unwrap();
        assert_eq!(found, Some(created));
    }

    #[tokio::test]
    async fn dispatch_wraps_results() {
        let m = mediator();
        let cancel = CancellationToken::new();

        let resp = m
            .dispatch(
                CreateEntry { entry: EntryFields::new("Jane Smith", "987-654-3210") }.into(),
                &cancel,
            )
            .await
            .unwrap();
        let Response::Created(entry) = resp else {
            panic!("expected Created, got {resp:?}");
        };

        let resp = m
            .dispatch(GetEntryByName { name: "JANE SMITH".into() }.into(), &cancel)
            .await
            .unwrap();
        assert_eq!(resp, Response::Found(Some(entry)));

        let resp = m
            .dispatch(
                UpdateEntry { id: EntryId::new(999), entry: EntryFields::new("X", "1") }.into(),
                &cancel,
            )
            .await
            .unwrap();
        assert_eq!(resp, Response::Updated(false));

        let resp = m.dispatch(GetAllEntries.into(), &cancel).await.unwrap();
        assert!(matches!(resp, Response::Entries(ref all) if all.len() == 1));
    }

    #[tokio::test]
    async fn clones_share_the_same_handlers() {
        let m = mediator();
        let other = m.clone();
        let cancel = CancellationToken::new();

        m.send(CreateEntry { entry: EntryFields::new("A", "1") }, &cancel)
            .await
            .unwrap();
        let all = other.send(GetAllEntries, &cancel).await.unwrap();
        assert_eq!(all.len(), 1);
    }
}
