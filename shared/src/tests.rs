#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration as StdDuration;

    use time::macros::datetime;
    use time::{Duration, OffsetDateTime};
    use uuid::Uuid;

    use crate::analytics::{summarize, EventTracker};
    use crate::device::{
        fingerprint_device, DeviceIdentityStore, FixedDeviceIdentity, LocalDeviceIdentity,
        MemoryTokenStorage, StorageError, TokenStorage, DEVICE_ID_KEY,
    };
    use crate::error::{StoreError, VoteError};
    use crate::memory::MemoryStore;
    use crate::models::*;
    use crate::polls::PollService;
    use crate::results::ResultsAggregator;
    use crate::status::PollStatus;
    use crate::store::PollStore;
    use crate::tally::{percentage, tally};
    use crate::validation::{validate_option_choice, validate_poll_request, ValidationError};
    use crate::vote::VoteService;

    /// Wraps a [`MemoryStore`] and injects backend misbehaviour.
    #[derive(Default)]
    struct FaultyStore {
        inner: MemoryStore,
        stale_precheck: bool,
        yield_after_lookup: bool,
        fail_events: bool,
        hang_reads: bool,
    }

    impl PollStore for FaultyStore {
        async fn create_poll(&self, poll: NewPoll) -> Result<(Poll, Vec<PollOption>), StoreError> {
            self.inner.create_poll(poll).await
        }

        async fn fetch_poll(&self, poll_id: Uuid) -> Result<Option<Poll>, StoreError> {
            if self.hang_reads {
                std::future::pending::<()>().await;
            }
            self.inner.fetch_poll(poll_id).await
        }

        async fn list_polls_by_creator(&self, user: UserId) -> Result<Vec<Poll>, StoreError> {
            self.inner.list_polls_by_creator(user).await
        }

        async fn delete_poll(&self, poll_id: Uuid) -> Result<bool, StoreError> {
            self.inner.delete_poll(poll_id).await
        }

        async fn fetch_options(&self, poll_id: Uuid) -> Result<Vec<PollOption>, StoreError> {
            self.inner.fetch_options(poll_id).await
        }

        async fn find_vote(&self, poll_id: Uuid, device_id: &DeviceId) -> Result<Option<Vote>, StoreError> {
            let found = self.inner.find_vote(poll_id, device_id).await?;
            if self.yield_after_lookup {
                tokio::task::yield_now().await;
            }
            if self.stale_precheck {
                return Ok(None);
            }
            Ok(found)
        }

        async fn insert_vote(&self, vote: NewVote) -> Result<Vote, StoreError> {
            self.inner.insert_vote(vote).await
        }

        async fn count_votes(&self, poll_id: Uuid) -> Result<u64, StoreError> {
            self.inner.count_votes(poll_id).await
        }

        async fn count_votes_by_option(&self, poll_id: Uuid) -> Result<HashMap<Uuid, u64>, StoreError> {
            self.inner.count_votes_by_option(poll_id).await
        }

        async fn record_event(&self, event: NewEvent) -> Result<(), StoreError> {
            if self.fail_events {
                return Err(StoreError::Unavailable("analytics table offline".into()));
            }
            self.inner.record_event(event).await
        }

        async fn fetch_events(&self, poll_id: Uuid) -> Result<Vec<AnalyticsEvent>, StoreError> {
            self.inner.fetch_events(poll_id).await
        }
    }

    struct BrokenStorage;

    impl TokenStorage for BrokenStorage {
        fn load(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("storage disabled".into()))
        }

        fn store(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("storage disabled".into()))
        }
    }

    fn owner() -> Option<UserId> {
        Some(UserId(Uuid::from_u128(7)))
    }

    fn request(options: &[&str]) -> CreatePollRequest {
        CreatePollRequest {
            title: "Favourite colour".into(),
            description: None,
            starts_at: None,
            ends_at: None,
            options: options.iter().map(|opt| opt.to_string()).collect(),
        }
    }

    fn windowed(options: &[&str], starts_in: Duration, ends_in: Duration) -> CreatePollRequest {
        let now = OffsetDateTime::now_utc();
        CreatePollRequest {
            starts_at: Some(now + starts_in),
            ends_at: Some(now + ends_in),
            ..request(options)
        }
    }

    async fn create<S: PollStore + Sync>(store: &S, request: &CreatePollRequest) -> (Poll, Vec<PollOption>) {
        let user = owner();
        PollService::new(store, &user).create_poll(request).await.unwrap()
    }

    fn option(poll_id: Uuid, label: &str, position: i32) -> PollOption {
        PollOption {
            id: Uuid::new_v4(),
            poll_id,
            label: label.into(),
            image_url: None,
            position,
        }
    }

    fn event(kind: EventKind, device: &str, at: OffsetDateTime) -> AnalyticsEvent {
        AnalyticsEvent {
            poll_id: Uuid::nil(),
            option_id: None,
            device_id: DeviceId::new(device),
            kind,
            occurred_at: at,
        }
    }

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(5, 0), 0);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(1, 200), 1);
        assert_eq!(percentage(1, 201), 0);
        assert_eq!(percentage(7, 7), 100);
    }

    #[test]
    fn test_tally_orders_by_votes_with_stable_ties() {
        let poll_id = Uuid::new_v4();
        let options = [option(poll_id, "A", 0), option(poll_id, "B", 1), option(poll_id, "C", 2)];
        let counts: HashMap<_, _> = [(options[2].id, 3), (options[1].id, 5), (options[0].id, 5)].into();

        let results = tally(poll_id, &options, &counts);
        let labels: Vec<_> = results.rows.iter().map(|row| row.label.as_str()).collect();
        assert_eq!(labels, ["A", "B", "C"]);
        assert_eq!(results.total_votes, 13);
        assert_eq!(results.rows.iter().map(|row| row.votes).sum::<u64>(), results.total_votes);
        for row in &results.rows {
            let exact = 100.0 * row.votes as f64 / results.total_votes as f64;
            assert!((row.percentage as f64 - exact).abs() <= 0.5);
        }

        let counts: HashMap<_, _> = [(options[2].id, 9)].into();
        let labels: Vec<_> = tally(poll_id, &options, &counts).rows.into_iter().map(|row| row.label).collect();
        assert_eq!(labels, ["C", "A", "B"]);
    }

    #[test]
    fn test_tally_without_votes() {
        let poll_id = Uuid::new_v4();
        let options = [option(poll_id, "Yes", 0), option(poll_id, "No", 1)];
        let results = tally(poll_id, &options, &HashMap::new());

        assert_eq!(results.total_votes, 0);
        assert!(results.rows.iter().all(|row| row.votes == 0 && row.percentage == 0));
        assert_eq!(results.rows[0].label, "Yes");
    }

    #[test]
    fn test_status_derivation() {
        let now = datetime!(2024-05-10 12:00 UTC);
        let yesterday = Some(now - Duration::days(1));
        let tomorrow = Some(now + Duration::days(1));

        assert_eq!(PollStatus::at(tomorrow, None, now), PollStatus::Upcoming);
        assert_eq!(PollStatus::at(yesterday, tomorrow, now), PollStatus::Active);
        assert_eq!(PollStatus::at(None, yesterday, now), PollStatus::Ended);
        assert_eq!(PollStatus::at(None, None, now), PollStatus::Active);
        assert_eq!(PollStatus::at(Some(now), Some(now), now), PollStatus::Active);
        assert!(!PollStatus::Upcoming.accepts_votes());
        assert_eq!("past".parse::<PollStatus>(), Ok(PollStatus::Ended));
        assert!("closed".parse::<PollStatus>().is_err());
    }

    #[test]
    fn test_poll_validation() {
        let user = UserId(Uuid::new_v4());
        let valid = validate_poll_request(&request(&[" Red ", "Blue"]), user).unwrap();
        assert_eq!(valid.options, ["Red", "Blue"]);
        assert_eq!(valid.created_by, user);

        let mut short = request(&["Red", "Blue"]);
        short.title = " ab ".into();
        assert_eq!(validate_poll_request(&short, user), Err(ValidationError::TitleTooShort));

        assert_eq!(validate_poll_request(&request(&["Red"]), user), Err(ValidationError::TooFewOptions));
        let eleven: Vec<String> = (0..11).map(|i| format!("Option {i}")).collect();
        let eleven: Vec<&str> = eleven.iter().map(String::as_str).collect();
        assert_eq!(validate_poll_request(&request(&eleven), user), Err(ValidationError::TooManyOptions));
        assert_eq!(validate_poll_request(&request(&["Red", "  "]), user), Err(ValidationError::EmptyOption));
        assert_eq!(
            validate_poll_request(&request(&["Red", "red"]), user),
            Err(ValidationError::DuplicateOption("red".into()))
        );

        let backwards = windowed(&["Red", "Blue"], Duration::days(2), Duration::days(1));
        assert_eq!(validate_poll_request(&backwards, user), Err(ValidationError::InvalidWindow));
    }

    #[test]
    fn test_option_membership() {
        let poll_id = Uuid::new_v4();
        let options = [option(poll_id, "A", 0)];
        assert!(validate_option_choice(options[0].id, &options).is_ok());
        assert_eq!(validate_option_choice(Uuid::new_v4(), &options), Err(ValidationError::UnknownOption));
    }

    #[test]
    fn test_device_identity_is_persisted() {
        let storage = MemoryTokenStorage::default();
        let identity = LocalDeviceIdentity::new(&storage, vec!["agent".into(), "en-US".into()]);

        let first = identity.get();
        assert!(first.as_str().starts_with("device_"));
        assert_eq!(identity.get(), first);
        assert_eq!(storage.load(DEVICE_ID_KEY).unwrap().as_deref(), Some(first.as_str()));

        let reopened = LocalDeviceIdentity::new(&storage, vec!["other".into()]);
        assert_eq!(reopened.get(), first);
    }

    #[test]
    fn test_device_identity_falls_back_to_session() {
        let identity = LocalDeviceIdentity::new(BrokenStorage, vec!["agent".into()]);
        let first = identity.get();
        assert_eq!(identity.get(), first);
    }

    #[test]
    fn test_fingerprint_varies_with_time() {
        let at = datetime!(2024-01-01 00:00 UTC);
        let env = ["agent", "en-US"];
        assert_eq!(fingerprint_device(&env, at), fingerprint_device(&env, at));
        assert_ne!(fingerprint_device(&env, at), fingerprint_device(&env, at + Duration::nanoseconds(1)));
    }

    #[tokio::test]
    async fn test_vote_then_results_scenario() {
        let store = MemoryStore::new();
        let (poll, options) = create(&store, &windowed(&["Red", "Blue"], -Duration::days(1), Duration::days(1))).await;
        let (red, blue) = (options[0].id, options[1].id);
        let device = FixedDeviceIdentity::new("device_d1");
        let anonymous: Option<UserId> = None;
        let votes = VoteService::new(&store, &device, &anonymous);
        let aggregator = ResultsAggregator::new(&store, &device);

        assert!(!votes.has_voted(poll.id).await.unwrap());
        let vote = votes.submit_vote(poll.id, red).await.unwrap();
        assert_eq!(vote.voter, Voter::Anonymous);
        assert!(votes.has_voted(poll.id).await.unwrap());

        let results = aggregator.get_poll_results(poll.id).await.unwrap();
        assert_eq!(results.total_votes, 1);
        assert_eq!((results.rows[0].label.as_str(), results.rows[0].votes, results.rows[0].percentage), ("Red", 1, 100));
        assert_eq!((results.rows[1].label.as_str(), results.rows[1].votes, results.rows[1].percentage), ("Blue", 0, 0));

        assert_eq!(votes.submit_vote(poll.id, blue).await, Err(VoteError::AlreadyVoted));
        assert_eq!(aggregator.get_poll_results(poll.id).await.unwrap(), results);
        assert_eq!(store.count_votes(poll.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_attributed_vote_keeps_user() {
        let store = MemoryStore::new();
        let (poll, options) = create(&store, &request(&["Yes", "No"])).await;
        let device = FixedDeviceIdentity::new("device_a");
        let user = Some(UserId(Uuid::new_v4()));

        let vote = VoteService::new(&store, &device, &user).submit_vote(poll.id, options[1].id).await.unwrap();
        assert_eq!(vote.voter.user_id(), user);
        assert_eq!(vote.device_id.as_str(), "device_a");
    }

    #[tokio::test]
    async fn test_distinct_devices_each_vote_once() {
        let store = MemoryStore::new();
        let (poll, options) = create(&store, &request(&["A", "B", "C"])).await;
        let anonymous: Option<UserId> = None;

        for (device, choice) in [("d1", 0), ("d2", 1), ("d3", 0), ("d4", 2), ("d5", 0)] {
            let device = FixedDeviceIdentity::new(device);
            VoteService::new(&store, &device, &anonymous)
                .submit_vote(poll.id, options[choice].id)
                .await
                .unwrap();
        }

        let device = FixedDeviceIdentity::new("viewer");
        let results = ResultsAggregator::new(&store, &device).get_poll_results(poll.id).await.unwrap();
        let shape: Vec<_> = results.rows.iter().map(|row| (row.label.as_str(), row.votes, row.percentage)).collect();
        assert_eq!(shape, [("A", 3, 60), ("B", 1, 20), ("C", 1, 20)]);
    }

    #[tokio::test]
    async fn test_closed_polls_reject_votes() {
        let store = MemoryStore::new();
        let anonymous: Option<UserId> = None;
        let device = FixedDeviceIdentity::new("device_d1");

        let (ended, options) = create(&store, &windowed(&["A", "B"], -Duration::days(3), -Duration::days(1))).await;
        let service = VoteService::new(&store, &device, &anonymous);
        assert_eq!(
            service.submit_vote(ended.id, options[0].id).await,
            Err(VoteError::PollNotActive(PollStatus::Ended))
        );

        let (upcoming, options) = create(&store, &windowed(&["A", "B"], Duration::days(1), Duration::days(2))).await;
        assert_eq!(
            service.submit_vote(upcoming.id, options[0].id).await,
            Err(VoteError::PollNotActive(PollStatus::Upcoming))
        );
        assert_eq!(store.count_votes(ended.id).await.unwrap() + store.count_votes(upcoming.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_poll_and_foreign_option() {
        let store = MemoryStore::new();
        let anonymous: Option<UserId> = None;
        let device = FixedDeviceIdentity::new("device_d1");
        let service = VoteService::new(&store, &device, &anonymous);

        assert_eq!(service.submit_vote(Uuid::new_v4(), Uuid::new_v4()).await, Err(VoteError::NotFound));

        let (poll, _) = create(&store, &request(&["A", "B"])).await;
        let (_, other_options) = create(&store, &request(&["C", "D"])).await;
        assert_eq!(
            service.submit_vote(poll.id, other_options[0].id).await,
            Err(VoteError::Validation(ValidationError::UnknownOption))
        );
        assert!(!service.has_voted(poll.id).await.unwrap());

        let results = ResultsAggregator::new(&store, &device);
        assert_eq!(results.get_poll_results(Uuid::new_v4()).await, Err(VoteError::NotFound));
        assert_eq!(results.get_poll_results(poll.id).await.unwrap().total_votes, 0);
    }

    #[tokio::test]
    async fn test_constraint_catches_stale_precheck() {
        let store = FaultyStore { stale_precheck: true, ..Default::default() };
        let (poll, options) = create(&store, &request(&["A", "B"])).await;
        let device = FixedDeviceIdentity::new("device_race");
        let anonymous: Option<UserId> = None;
        let service = VoteService::new(&store, &device, &anonymous);

        service.submit_vote(poll.id, options[0].id).await.unwrap();
        assert_eq!(service.submit_vote(poll.id, options[1].id).await, Err(VoteError::AlreadyVoted));
        assert_eq!(store.count_votes(poll.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_submissions_store_one_vote() {
        let store = FaultyStore { yield_after_lookup: true, ..Default::default() };
        let (poll, options) = create(&store, &request(&["A", "B"])).await;
        let device = FixedDeviceIdentity::new("device_double_click");
        let anonymous: Option<UserId> = None;
        let service = VoteService::new(&store, &device, &anonymous);

        let (first, second) = tokio::join!(
            service.submit_vote(poll.id, options[0].id),
            service.submit_vote(poll.id, options[1].id),
        );

        let outcomes = [first, second];
        assert_eq!(outcomes.iter().filter(|outcome| outcome.is_ok()).count(), 1);
        assert!(outcomes.iter().any(|outcome| outcome == &Err(VoteError::AlreadyVoted)));
        assert_eq!(store.count_votes(poll.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_analytics_failure_does_not_block_vote() {
        let store = FaultyStore { fail_events: true, ..Default::default() };
        let (poll, options) = create(&store, &request(&["A", "B"])).await;
        let device = FixedDeviceIdentity::new("device_d1");
        let anonymous: Option<UserId> = None;

        VoteService::new(&store, &device, &anonymous).submit_vote(poll.id, options[0].id).await.unwrap();
        assert_eq!(store.count_votes(poll.id).await.unwrap(), 1);
        assert!(!EventTracker::new(&store, &device).track(poll.id, EventKind::Share, None).await);
    }

    #[tokio::test]
    async fn test_hung_backend_times_out() {
        let store = FaultyStore { hang_reads: true, ..Default::default() };
        let (poll, options) = create(&store, &request(&["A", "B"])).await;
        let device = FixedDeviceIdentity::new("device_d1");
        let anonymous: Option<UserId> = None;

        let outcome = VoteService::new(&store, &device, &anonymous)
            .with_timeout(StdDuration::from_millis(50))
            .submit_vote(poll.id, options[0].id)
            .await;
        assert!(matches!(&outcome, Err(VoteError::BackendUnavailable(_))));
        assert!(outcome.unwrap_err().is_retryable());
        assert_eq!(store.count_votes(poll.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_poll_view_reports_device_state() {
        let store = MemoryStore::new();
        let (poll, options) = create(&store, &request(&["A", "B"])).await;
        let device = FixedDeviceIdentity::new("device_d1");
        let anonymous: Option<UserId> = None;
        let aggregator = ResultsAggregator::new(&store, &device);

        let before = aggregator.poll_view(poll.id).await.unwrap();
        assert_eq!(before.status, PollStatus::Active);
        assert!(!before.has_voted && !before.show_results);

        VoteService::new(&store, &device, &anonymous).submit_vote(poll.id, options[1].id).await.unwrap();
        let after = aggregator.poll_view(poll.id).await.unwrap();
        assert!(after.has_voted && after.show_results);
        assert_eq!(after.results.rows[0].option_id, options[1].id);

        assert_eq!(aggregator.poll_view(Uuid::new_v4()).await, Err(VoteError::NotFound));
    }

    #[tokio::test]
    async fn test_poll_management_requires_owner() {
        let store = MemoryStore::new();
        let anonymous: Option<UserId> = None;
        let stranger = Some(UserId(Uuid::new_v4()));
        let user = owner();

        assert_eq!(
            PollService::new(&store, &anonymous).create_poll(&request(&["A", "B"])).await,
            Err(VoteError::Unauthenticated)
        );

        let (poll, _) = create(&store, &request(&["A", "B"])).await;
        assert_eq!(PollService::new(&store, &stranger).delete_poll(poll.id).await, Err(VoteError::NotAuthorized));
        assert_eq!(PollService::new(&store, &stranger).poll_analytics(poll.id).await, Err(VoteError::NotAuthorized));

        PollService::new(&store, &user).delete_poll(poll.id).await.unwrap();
        assert_eq!(store.fetch_poll(poll.id).await.unwrap(), None);
        assert!(store.fetch_options(poll.id).await.unwrap().is_empty());
        assert_eq!(PollService::new(&store, &user).delete_poll(poll.id).await, Err(VoteError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_cascades_votes() {
        let store = MemoryStore::new();
        let (poll, options) = create(&store, &request(&["A", "B"])).await;
        let device = FixedDeviceIdentity::new("device_d1");
        let anonymous: Option<UserId> = None;
        VoteService::new(&store, &device, &anonymous).submit_vote(poll.id, options[0].id).await.unwrap();

        PollService::new(&store, &owner()).delete_poll(poll.id).await.unwrap();
        assert_eq!(store.count_votes(poll.id).await.unwrap(), 0);
        assert!(store.find_vote(poll.id, &device.0).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_dashboard_and_listing() {
        let store = MemoryStore::new();
        let user = owner();
        let anonymous: Option<UserId> = None;

        let (active, options) = create(&store, &request(&["A", "B", "C"])).await;
        create(&store, &windowed(&["A", "B"], -Duration::days(3), -Duration::days(1))).await;
        create(&store, &windowed(&["A", "B"], Duration::days(1), Duration::days(3))).await;
        for device in ["d1", "d2"] {
            let device = FixedDeviceIdentity::new(device);
            VoteService::new(&store, &device, &anonymous).submit_vote(active.id, options[0].id).await.unwrap();
        }

        let service = PollService::new(&store, &user);
        let stats = service.dashboard_stats().await.unwrap();
        assert_eq!(stats, DashboardStats { total_polls: 3, active_polls: 1, ended_polls: 1, total_votes: 2 });

        let listed = service.list_my_polls(Some(PollStatus::Active), None).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!((listed[0].poll.id, listed[0].votes, listed[0].options), (active.id, 2, 3));

        let stranger = Some(UserId(Uuid::new_v4()));
        assert!(PollService::new(&store, &stranger).list_my_polls(None, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_listing_searches_titles() {
        let store = MemoryStore::new();
        let user = owner();
        let lunch = create(&store, &CreatePollRequest { title: "Team Lunch Spot".into(), ..request(&["A", "B"]) }).await.0;
        create(&store, &CreatePollRequest { title: "Offsite dates".into(), ..request(&["A", "B"]) }).await;
        let old_lunch = CreatePollRequest {
            title: "Last week's lunch".into(),
            ..windowed(&["A", "B"], -Duration::days(3), -Duration::days(1))
        };
        create(&store, &old_lunch).await;

        let service = PollService::new(&store, &user);
        let titles = |polls: Vec<PollSummary>| {
            let mut titles: Vec<String> = polls.into_iter().map(|summary| summary.poll.title).collect();
            titles.sort();
            titles
        };

        assert_eq!(
            titles(service.list_my_polls(None, Some("LUNCH")).await.unwrap()),
            ["Last week's lunch", "Team Lunch Spot"]
        );
        let active = service.list_my_polls(Some(PollStatus::Active), Some("lunch")).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].poll.id, lunch.id);
        assert_eq!(service.list_my_polls(None, Some("  ")).await.unwrap().len(), 3);
        assert!(service.list_my_polls(None, Some("budget")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_tracked_events_feed_analytics() {
        let store = MemoryStore::new();
        let (poll, options) = create(&store, &request(&["A", "B"])).await;
        let anonymous: Option<UserId> = None;

        for name in ["d1", "d2", "d3", "d4"] {
            let device = FixedDeviceIdentity::new(name);
            assert!(EventTracker::new(&store, &device).track(poll.id, EventKind::View, None).await);
        }
        let device = FixedDeviceIdentity::new("d1");
        VoteService::new(&store, &device, &anonymous).submit_vote(poll.id, options[0].id).await.unwrap();

        let analytics = PollService::new(&store, &owner()).poll_analytics(poll.id).await.unwrap();
        assert_eq!((analytics.total_views, analytics.total_votes, analytics.unique_visitors), (4, 1, 4));
        assert_eq!(analytics.conversion_rate, 25.0);
    }

    #[test]
    fn test_summarize_groups_by_day_and_hour() {
        let events = [
            event(EventKind::View, "a", datetime!(2024-03-02 09:15 UTC)),
            event(EventKind::View, "b", datetime!(2024-03-01 23:59 UTC)),
            event(EventKind::Vote, "b", datetime!(2024-03-01 23:59 UTC)),
            event(EventKind::View, "c", datetime!(2024-03-02 00:10 UTC)),
            event(EventKind::Vote, "c", datetime!(2024-03-02 00:11 UTC)),
            event(EventKind::Share, "d", datetime!(2024-03-02 12:00 UTC)),
        ];
        let summary = summarize(&events);

        assert_eq!((summary.total_views, summary.total_votes, summary.unique_visitors), (3, 2, 4));
        assert_eq!(summary.conversion_rate, 66.7);
        assert_eq!(summary.daily_activity, vec![
            DailyActivity { date: "2024-03-01".into(), views: 1, votes: 1 },
            DailyActivity { date: "2024-03-02".into(), views: 2, votes: 1 },
        ]);
        assert_eq!(summary.hourly_distribution, vec![
            HourlyVotes { hour: "12 AM".into(), votes: 1 },
            HourlyVotes { hour: "11 PM".into(), votes: 1 },
        ]);

        let empty = summarize(&[]);
        assert_eq!(empty.conversion_rate, 0.0);
        assert!(empty.daily_activity.is_empty());
    }
}
