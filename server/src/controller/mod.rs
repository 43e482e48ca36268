//! Create, list and delete flows for channel events.
//!
//! Each invocation runs parse → persist → present. Failures never escape a
//! flow: they are logged, shown in the channel, and returned as
//! [`Outcome::Failed`].

use std::sync::Arc;

use tracing::{info, warn};

use crate::commands::{
    parse_options, validate_create, validate_delete, CommandLine, CreateRequest, Subcommand,
};
use crate::models::{format_instant, Event};
use crate::presentation::{ChatSurface, Formatter};
use crate::repository::EventRepository;
use crate::utils::error::AppError;

pub mod clock;

pub use clock::{Clock, FixedClock, SystemClock};

#[derive(Debug)]
pub enum Outcome {
    Created(Event),
    /// Upcoming events, in store order.
    Listed(Vec<Event>),
    Deleted(String),
    Failed(AppError),
}

#[derive(Clone)]
pub struct EventController {
    repository: EventRepository,
    surface: Arc<dyn ChatSurface>,
    formatter: Arc<dyn Formatter>,
    clock: Arc<dyn Clock>,
}

impl EventController {
    pub fn new(
        repository: EventRepository,
        surface: Arc<dyn ChatSurface>,
        formatter: Arc<dyn Formatter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            surface,
            formatter,
            clock,
        }
    }

    /// Runs one line of command text, e.g. `create --title Raid --startTime 2030-01-01`.
    pub async fn handle(&self, channel: &str, author: &str, text: &str) -> Outcome {
        let line = match CommandLine::parse(text) {
            Ok(line) => line,
            Err(name) if name.is_empty() => {
                let msg = "Missing subcommand: expected create, list or delete".to_string();
                return self.reject(channel, AppError::ValidationError(vec![msg])).await;
            }
            Err(name) => {
                let msg = format!("Unknown subcommand: {}", name);
                return self.reject(channel, AppError::ValidationError(vec![msg])).await;
            }
        };

        match line.subcommand {
            Subcommand::Create => self.create(channel, author, line.args.as_slice()).await,
            Subcommand::List => self.list(channel).await,
            Subcommand::Delete => self.delete(channel, line.args.as_slice()).await,
        }
    }

    pub async fn create<S: AsRef<str>>(&self, channel: &str, author: &str, args: &[S]) -> Outcome {
        let request = match validate_create(parse_options(args)) {
            Ok(request) => request,
            Err(errors) => return self.reject(channel, AppError::ValidationError(errors)).await,
        };

        let id = match self
            .surface
            .open_artifact(channel, self.formatter.pending())
            .await
        {
            Ok(id) => id,
            Err(e) => return self.reject(channel, e.into()).await,
        };

        let event = self.build_event(id.clone(), author, request);
        info!(channel = %channel, id = %id, title = %event.title, "Creating event");

        let confirmed = match self.persist(channel, &event).await {
            Ok(confirmed) => confirmed,
            Err(err) => {
                err.log();
                if let Err(e) = self
                    .surface
                    .edit_artifact(channel, &id, self.formatter.failure(&err))
                    .await
                {
                    warn!(
                        channel = %channel,
                        id = %id,
                        error = %e,
                        "Could not show create failure"
                    );
                }
                return Outcome::Failed(err);
            }
        };

        match self
            .surface
            .edit_artifact(channel, &id, self.formatter.event(&confirmed))
            .await
        {
            Ok(()) => {
                info!(channel = %channel, id = %id, "Event active");
                Outcome::Created(confirmed)
            }
            Err(e) => {
                let err = AppError::from(e);
                err.log();
                Outcome::Failed(err)
            }
        }
    }

    /// Events that have not started yet; parameters are not accepted.
    pub async fn list(&self, channel: &str) -> Outcome {
        let events = match self.repository.list(channel).await {
            Ok(events) => events,
            Err(e) => return self.reject(channel, e.into()).await,
        };

        let now = self.clock.now();
        let upcoming: Vec<Event> = events
            .into_iter()
            .filter(|event| !event.has_started(now))
            .collect();
        info!(channel = %channel, count = upcoming.len(), "Listing events");

        let message = if upcoming.is_empty() {
            self.formatter.no_events()
        } else {
            self.formatter.events(&upcoming)
        };

        match self.surface.post(channel, message).await {
            Ok(()) => Outcome::Listed(upcoming),
            Err(e) => {
                let err = AppError::from(e);
                err.log();
                Outcome::Failed(err)
            }
        }
    }

    /// Removes an event and marks its message deleted.
    ///
    /// The record is removed before the message is edited; if the edit fails
    /// the record stays deleted.
    pub async fn delete<S: AsRef<str>>(&self, channel: &str, args: &[S]) -> Outcome {
        let request = match validate_delete(parse_options(args)) {
            Ok(request) => request,
            Err(errors) => return self.reject(channel, AppError::ValidationError(errors)).await,
        };
        let id = request.id;

        match self.surface.find_artifact(channel, &id).await {
            Ok(true) => {}
            Ok(false) => return self.reject(channel, missing(&id)).await,
            Err(e) => return self.reject(channel, e.into()).await,
        }

        // Existence only: a record that no longer decodes must stay deletable.
        match self.repository.exists(channel, &id).await {
            Ok(true) => {}
            Ok(false) => return self.reject(channel, missing(&id)).await,
            Err(e) => return self.reject(channel, e.into()).await,
        }
        if let Err(e) = self.repository.delete(channel, &id).await {
            return self.reject(channel, e.into()).await;
        }
        info!(channel = %channel, id = %id, "Event deleted");

        let presented = match self
            .surface
            .edit_artifact(channel, &id, self.formatter.deleted(&id))
            .await
        {
            Ok(()) => self.surface.clear_affordances(channel, &id).await,
            Err(e) => Err(e),
        };
        match presented {
            Ok(()) => Outcome::Deleted(id),
            Err(e) => {
                warn!(channel = %channel, id = %id, "Record deleted but message not updated");
                let err = AppError::from(e);
                err.log();
                Outcome::Failed(err)
            }
        }
    }

    fn build_event(&self, id: String, author: &str, request: CreateRequest) -> Event {
        Event {
            id,
            title: request.title,
            start_time: request.start_time,
            created_by: author.to_string(),
            created: format_instant(self.clock.now()),
            max_participants: request.max_participants,
            setup: request.setup,
        }
    }

    /// Writes the event and reads it back.
    async fn persist(&self, channel: &str, event: &Event) -> Result<Event, AppError> {
        let id = self.repository.create(channel, event).await?;
        Ok(self.repository.read(channel, &id).await?)
    }

    async fn reject(&self, channel: &str, err: AppError) -> Outcome {
        err.log();
        if let Err(e) = self.surface.post(channel, self.formatter.failure(&err)).await {
            warn!(channel = %channel, error = %e, "Could not report failure to channel");
        }
        Outcome::Failed(err)
    }
}

fn missing(id: &str) -> AppError {
    AppError::NotFound(format!("No event with id '{}' exists in this channel", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::{Message, PlainFormatter, StoredSurface};
    use crate::store::{
        self, AttributeValue, InMemoryStore, Item, KeyValueStore, StoreError, PARTITION_KEY,
        SORT_KEY,
    };
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    /// In-memory store whose named operations always fail.
    struct FailingStore {
        inner: InMemoryStore,
        failing: &'static [&'static str],
    }

    impl FailingStore {
        fn new(failing: &'static [&'static str]) -> Self {
            Self {
                inner: InMemoryStore::new(),
                failing,
            }
        }

        fn check(&self, operation: &'static str) -> store::Result<()> {
            if self.failing.contains(&operation) {
                return Err(StoreError::Backend {
                    operation,
                    message: "connection reset".to_string(),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl KeyValueStore for FailingStore {
        async fn query(&self, partition_key: &str) -> store::Result<Vec<Item>> {
            self.check("query")?;
            self.inner.query(partition_key).await
        }

        async fn get(&self, partition_key: &str, sort_key: &str) -> store::Result<Option<Item>> {
            self.check("get")?;
            self.inner.get(partition_key, sort_key).await
        }

        async fn put(&self, item: Item) -> store::Result<()> {
            self.check("put")?;
            self.inner.put(item).await
        }

        async fn delete(&self, partition_key: &str, sort_key: &str) -> store::Result<()> {
            self.check("delete")?;
            self.inner.delete(partition_key, sort_key).await
        }
    }

    struct Harness {
        events: Arc<FailingStore>,
        surface_store: Arc<InMemoryStore>,
        surface: Arc<StoredSurface>,
        controller: EventController,
    }

    impl Harness {
        async fn messages(&self, channel: &str) -> Vec<crate::presentation::PostedMessage> {
            self.surface.messages(channel).await.unwrap()
        }

        async fn create(&self, channel: &str) -> Event {
            match self
                .controller
                .create(channel, "ana", &["--title", "Raid", "--startTime", "2025-07-01"])
                .await
            {
                Outcome::Created(event) => event,
                other => panic!("unexpected outcome: {:?}", other),
            }
        }
    }

    fn controller_on(events: Arc<FailingStore>, surface: Arc<StoredSurface>) -> EventController {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        EventController::new(
            EventRepository::new(events),
            surface,
            Arc::new(PlainFormatter),
            Arc::new(FixedClock(now)),
        )
    }

    fn harness_failing(failing: &'static [&'static str]) -> Harness {
        let events = Arc::new(FailingStore::new(failing));
        let surface_store = Arc::new(InMemoryStore::new());
        let surface = Arc::new(StoredSurface::new(surface_store.clone()));
        Harness {
            controller: controller_on(events.clone(), surface.clone()),
            events,
            surface_store,
            surface,
        }
    }

    fn harness() -> Harness {
        harness_failing(&[])
    }

    #[tokio::test]
    async fn test_create_persists_and_presents() {
        let h = harness();
        let outcome = h
            .controller
            .handle(
                "C1",
                "ana",
                "create --title Raid --startTime 2025-07-01T20:00:00Z \
                 --maxParticipants 6 --setup bring snacks",
            )
            .await;

        let event = match outcome {
            Outcome::Created(event) => event,
            other => panic!("unexpected outcome: {:?}", other),
        };
        assert_eq!(event.title, "Raid");
        assert_eq!(event.created_by, "ana");
        assert_eq!(event.created, "2025-06-01T12:00:00.000Z");
        assert_eq!(event.max_participants, Some(6));
        assert_eq!(event.setup.as_deref(), Some("bring snacks"));

        let messages = h.messages("C1").await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].id, event.id);
        assert!(messages[0].content.contains("**Raid**"));
        assert!(!messages[0].affordances.is_empty());
        assert_eq!(h.events.inner.len().await, 1);
    }

    #[tokio::test]
    async fn test_create_with_bad_start_time_writes_nothing() {
        let h = harness();
        let outcome = h
            .controller
            .create("C1", "ana", &["--title", "Raid", "--startTime", "not-a-date"])
            .await;

        match outcome {
            Outcome::Failed(AppError::ValidationError(errors)) => {
                assert_eq!(
                    errors,
                    vec!["Invalid --startTime 'not-a-date': expected an ISO-8601 timestamp"]
                );
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(h.events.inner.is_empty().await);

        let messages = h.messages("C1").await;
        assert_eq!(messages.len(), 1);
        assert!(messages[0].content.contains("not-a-date"));
    }

    #[tokio::test]
    async fn test_create_write_failure_is_shown_in_the_artifact() {
        let h = harness_failing(&["put"]);
        let outcome = h
            .controller
            .create("C1", "ana", &["--title", "Raid", "--startTime", "2025-07-01"])
            .await;

        assert!(matches!(outcome, Outcome::Failed(AppError::StoreError(_))));
        assert!(h.events.inner.is_empty().await);

        let messages = h.messages("C1").await;
        assert_eq!(messages.len(), 1);
        assert!(messages[0].edited);
        assert_eq!(
            messages[0].content,
            "Error: The event store is unavailable: put failed: connection reset"
        );
        assert!(messages[0].affordances.is_empty());
    }

    #[tokio::test]
    async fn test_list_returns_only_future_events() {
        let h = harness();
        let repo = EventRepository::new(h.events.clone());
        let starts = [
            ("past", "2025-05-01T00:00:00Z"),
            ("future", "2025-08-01T00:00:00Z"),
        ];
        for (id, start) in starts {
            repo.create(
                "C1",
                &Event {
                    id: id.to_string(),
                    title: id.to_string(),
                    start_time: start.to_string(),
                    created_by: "ana".to_string(),
                    created: "2025-04-01T00:00:00.000Z".to_string(),
                    max_participants: None,
                    setup: None,
                },
            )
            .await
            .unwrap();
        }

        match h.controller.list("C1").await {
            Outcome::Listed(events) => {
                assert_eq!(events.len(), 1);
                assert_eq!(events[0].id, "future");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_list_empty_channel_is_not_an_error() {
        let h = harness();
        assert!(matches!(
            h.controller.list("C1").await,
            Outcome::Listed(events) if events.is_empty()
        ));
        let messages = h.messages("C1").await;
        assert_eq!(messages[0].content, "No upcoming events in this channel.");
    }

    #[tokio::test]
    async fn test_list_store_failure_reports_cause() {
        let h = harness_failing(&["query"]);
        let outcome = h.controller.list("C1").await;

        match outcome {
            Outcome::Failed(AppError::StoreError(StoreError::Backend { operation, .. })) => {
                assert_eq!(operation, "query");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        let messages = h.messages("C1").await;
        assert_eq!(messages.len(), 1);
        assert!(messages[0].content.contains("connection reset"));
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_not_found() {
        let h = harness();
        let outcome = h.controller.delete("C1", &["--id", "missing"]).await;
        assert!(matches!(outcome, Outcome::Failed(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_message_without_record_is_not_found() {
        let h = harness();
        let id = h
            .surface
            .open_artifact("C1", Message::text("hello"))
            .await
            .unwrap();
        let outcome = h.controller.delete("C1", &["--id", id.as_str()]).await;
        assert!(matches!(outcome, Outcome::Failed(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_marks_message_and_clears_reactions() {
        let h = harness();
        let event = h.create("C1").await;

        let outcome = h.controller.delete("C1", &["--id", event.id.as_str()]).await;
        assert!(matches!(outcome, Outcome::Deleted(ref id) if *id == event.id));
        assert!(h.events.inner.is_empty().await);

        let message = h
            .messages("C1")
            .await
            .into_iter()
            .find(|m| m.id == event.id)
            .unwrap();
        assert!(message.content.contains("was deleted"));
        assert!(message.affordances.is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_undecodable_record() {
        let h = harness();
        let id = h
            .surface
            .open_artifact("C1", Message::text("Raid"))
            .await
            .unwrap();
        let mut broken = Item::new();
        broken.insert(PARTITION_KEY.to_string(), AttributeValue::S("C1event".to_string()));
        broken.insert(SORT_KEY.to_string(), AttributeValue::S(id.clone()));
        h.events.inner.put(broken).await.unwrap();

        assert!(matches!(
            h.controller.list("C1").await,
            Outcome::Failed(AppError::MalformedRecord(_))
        ));

        let outcome = h.controller.delete("C1", &["--id", id.as_str()]).await;
        assert!(matches!(outcome, Outcome::Deleted(ref deleted) if *deleted == id));
        assert!(h.events.inner.is_empty().await);
        assert!(matches!(
            h.controller.list("C1").await,
            Outcome::Listed(events) if events.is_empty()
        ));
    }

    #[tokio::test]
    async fn test_delete_after_restart() {
        let h = harness();
        let event = h.create("C1").await;

        let restarted = controller_on(
            h.events.clone(),
            Arc::new(StoredSurface::new(h.surface_store.clone())),
        );
        let outcome = restarted.delete("C1", &["--id", event.id.as_str()]).await;
        assert!(matches!(outcome, Outcome::Deleted(ref id) if *id == event.id));
        assert!(h.events.inner.is_empty().await);
    }

    #[tokio::test]
    async fn test_delete_store_failure_leaves_state_unchanged() {
        let h = harness_failing(&["delete"]);
        let event = h.create("C1").await;

        let outcome = h.controller.delete("C1", &["--id", event.id.as_str()]).await;
        assert!(matches!(outcome, Outcome::Failed(AppError::StoreError(_))));
        assert_eq!(h.events.inner.len().await, 1);

        let messages = h.messages("C1").await;
        let artifact = messages.iter().find(|m| m.id == event.id).unwrap();
        assert!(artifact.content.contains("**Raid**"));
        assert!(!artifact.affordances.is_empty());
        assert!(messages
            .iter()
            .any(|m| m.id != event.id && m.content.contains("connection reset")));
    }

    #[tokio::test]
    async fn test_delete_is_scoped_to_channel() {
        let h = harness();
        let event = h.create("C1").await;

        let outcome = h.controller.delete("C2", &["--id", event.id.as_str()]).await;
        assert!(matches!(outcome, Outcome::Failed(AppError::NotFound(_))));
        assert!(h.events.inner.get("C1event", &event.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_read_after_write_failure_is_not_retried() {
        let h = harness_failing(&["get"]);
        let outcome = h
            .controller
            .create("C1", "ana", &["--title", "Raid", "--startTime", "2025-07-01"])
            .await;
        assert!(matches!(outcome, Outcome::Failed(AppError::StoreError(_))));
        // The write went through; only the confirming read failed.
        assert_eq!(h.events.inner.len().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_subcommand_is_rejected() {
        let h = harness();
        let outcome = h.controller.handle("C1", "ana", "event edit --id 1").await;
        match outcome {
            Outcome::Failed(AppError::ValidationError(errors)) => {
                assert_eq!(errors, vec!["Unknown subcommand: edit"]);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}
