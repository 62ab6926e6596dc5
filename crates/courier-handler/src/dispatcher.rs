//! The dispatch loop and its lifecycle.
//!
//! [`BotHandler`] owns the registrations, the bot client and an
//! [`UpdateSource`]. [`start`](BotHandler::start) pulls updates one at a time,
//! routes each, and spawns the matched callback on its own task; routing the
//! next update never waits for a previous callback. [`stop`](BotHandler::stop)
//! signals the loop and waits until every launched callback has finished.
//!
//! ```text
//!            start()                stop()             drained
//! Stopped ───────────▶ Running ───────────▶ Stopping ──────────▶ Stopped
//!                         │  source closed                          ▲
//!                         └─────────────────────────────────────────┘
//! ```

use std::fmt;
use std::sync::Arc;

use courier_core::{BoxedBot, Update};
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{Instrument, debug, debug_span, info, trace, warn};

use crate::error::{HandlerError, HandlerResult};
use crate::group::HandlerGroup;
use crate::handler::{Handler, Registrar};
use crate::predicate::Predicate;
use crate::router::Router;
use crate::source::UpdateSource;

/// Lifecycle state of a [`BotHandler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// Not processing updates. Initial state.
    Stopped,
    /// The dispatch loop is receiving updates.
    Running,
    /// Shutdown requested; waiting for in-flight callbacks.
    Stopping,
}

/// Routes updates from a source to registered handlers.
///
/// Register handlers through [`Registrar`] while holding `&mut BotHandler`,
/// then share it (typically behind an `Arc`) to run [`start`](Self::start)
/// and [`stop`](Self::stop) from different tasks.
pub struct BotHandler {
    bot: BoxedBot,
    router: Router,
    source: tokio::sync::Mutex<Box<dyn UpdateSource>>,
    state: Mutex<LifecycleState>,
    shutdown: Mutex<CancellationToken>,
    stopped: Notify,
    tracker: TaskTracker,
}

impl BotHandler {
    /// Creates a stopped handler with no registrations.
    pub fn new(bot: BoxedBot, source: impl UpdateSource) -> Self {
        Self {
            bot,
            router: Router::new(),
            source: tokio::sync::Mutex::new(Box::new(source)),
            state: Mutex::new(LifecycleState::Stopped),
            shutdown: Mutex::new(CancellationToken::new()),
            stopped: Notify::new(),
            tracker: TaskTracker::new(),
        }
    }

    pub fn bot(&self) -> &BoxedBot {
        &self.bot
    }

    /// The registration forest, for introspection.
    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.lock()
    }

    pub fn is_running(&self) -> bool {
        self.state() == LifecycleState::Running
    }

    /// Number of callbacks launched and not yet finished.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Runs the dispatch loop until [`stop`](Self::stop) is called or the
    /// source closes.
    ///
    /// When the source closes, waits for in-flight callbacks and returns with
    /// the handler `Stopped`. When stopped through `stop`, returns as soon as
    /// the loop has released the source; `stop` does the draining.
    ///
    /// # Errors
    ///
    /// [`HandlerError::AlreadyRunning`] unless the handler is `Stopped`. No
    /// second loop is started in that case.
    pub async fn start(&self) -> HandlerResult<()> {
        let shutdown = {
            let mut state = self.state.lock();
            if *state != LifecycleState::Stopped {
                warn!(state = ?*state, "Update handler is already running");
                return Err(HandlerError::AlreadyRunning(*state));
            }
            *state = LifecycleState::Running;

            let token = CancellationToken::new();
            *self.shutdown.lock() = token.clone();
            token
        };

        info!(
            bot = self.bot.id(),
            handlers = self.router.handler_count(),
            "Update handler started"
        );

        let mut source = self.source.lock().await;
        let source_closed = loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break false,
                next = source.recv() => match next {
                    Some(update) => {
                        self.dispatch(update);
                    }
                    None => break true,
                },
            }
        };
        drop(source);

        if !source_closed {
            debug!("Dispatch loop exited on stop signal");
            return Ok(());
        }

        // A concurrent `stop` that already claimed Stopping owns the drain.
        let claimed = {
            let mut state = self.state.lock();
            let running = *state == LifecycleState::Running;
            if running {
                *state = LifecycleState::Stopping;
            }
            running
        };
        if claimed {
            info!(
                in_flight = self.in_flight(),
                "Update source closed, waiting for in-flight handlers"
            );
            self.drain().await;
            self.finish_stop();
        }

        Ok(())
    }

    /// Stops the dispatch loop and waits for every launched callback.
    ///
    /// Callbacks are never cancelled. The handler can be started again once
    /// this returns. If a drain is already under way, because the source
    /// closed or another `stop` got there first, this waits for it to finish.
    ///
    /// # Errors
    ///
    /// [`HandlerError::NotRunning`] if the handler is already `Stopped`.
    pub async fn stop(&self) -> HandlerResult<()> {
        // Registered before reading the state so a concurrent drain cannot
        // finish between the check and the wait.
        let stopped = self.stopped.notified();
        tokio::pin!(stopped);
        stopped.as_mut().enable();

        let observed = {
            let mut state = self.state.lock();
            let observed = *state;
            if observed == LifecycleState::Running {
                *state = LifecycleState::Stopping;
            }
            observed
        };

        match observed {
            LifecycleState::Stopped => {
                warn!("Update handler is not running");
                return Err(HandlerError::NotRunning(observed));
            }
            LifecycleState::Stopping => {
                debug!("Update handler is already stopping, waiting for drain");
                stopped.await;
                return Ok(());
            }
            LifecycleState::Running => {}
        }

        info!(in_flight = self.in_flight(), "Stopping update handler");
        self.shutdown.lock().cancel();

        // The loop holds the source while it runs.
        drop(self.source.lock().await);
        self.drain().await;
        self.finish_stop();
        Ok(())
    }

    /// Routes a single update and launches the matched callback.
    ///
    /// Returns whether a handler matched. Must be called from within a tokio
    /// runtime.
    pub fn dispatch(&self, update: Update) -> bool {
        let span = debug_span!(
            "dispatch",
            update_id = update.update_id,
            update_type = %update.update_type()
        );

        let Some(handler) = span.in_scope(|| self.router.route(&update)) else {
            trace!(parent: &span, "No handler matched, dropping update");
            return false;
        };

        let Some(fut) = handler.callback().invoke(Arc::clone(&self.bot), update.kind) else {
            warn!(parent: &span, "Matched handler rejected the update payload");
            return false;
        };

        debug!(parent: &span, "Handler matched, spawning callback");
        self.tracker.spawn(fut.instrument(span));
        true
    }

    async fn drain(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }

    fn finish_stop(&self) {
        *self.state.lock() = LifecycleState::Stopped;
        self.stopped.notify_waiters();
        info!("Update handler stopped");
    }
}

impl Registrar for BotHandler {
    fn register(&mut self, handler: Handler) -> &mut Self {
        self.router.register(handler);
        self
    }

    fn group(&mut self, predicates: impl IntoIterator<Item = Predicate>) -> &mut HandlerGroup {
        self.router.group(predicates)
    }
}

impl fmt::Debug for BotHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotHandler")
            .field("bot", &self.bot.id())
            .field("state", &self.state())
            .field("handlers", &self.router.handler_count())
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicates::{chat_id, command_equal, text_equal};
    use crate::source::update_channel;
    use crate::testing::{null_bot, text_message, update_of};
    use courier_core::{Message, UpdateType};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::{Notify, mpsc};
    use tokio::time::{sleep, timeout};
    use tokio_test::{assert_err, assert_ok, assert_pending};

    const WAIT: Duration = Duration::from_secs(1);

    fn report<P: Send + 'static>(
        tx: &mpsc::UnboundedSender<UpdateType>,
        update_type: UpdateType,
    ) -> impl Fn(BoxedBot, P) -> futures::future::Ready<()> + Send + Sync + 'static {
        let tx = tx.clone();
        move |_, _| {
            let _ = tx.send(update_type);
            futures::future::ready(())
        }
    }

    fn new_handler() -> (mpsc::Sender<Update>, BotHandler) {
        let (tx, rx) = update_channel(16);
        (tx, BotHandler::new(null_bot(), rx))
    }

    #[tokio::test]
    async fn test_every_kind_reaches_its_handler() {
        let (_tx, mut bh) = new_handler();
        let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();

        bh.handle_message(report(&seen_tx, UpdateType::Message), [])
            .handle_edited_message(report(&seen_tx, UpdateType::EditedMessage), [])
            .handle_channel_post(report(&seen_tx, UpdateType::ChannelPost), [])
            .handle_edited_channel_post(report(&seen_tx, UpdateType::EditedChannelPost), [])
            .handle_inline_query(report(&seen_tx, UpdateType::InlineQuery), [])
            .handle_chosen_inline_result(report(&seen_tx, UpdateType::ChosenInlineResult), [])
            .handle_callback_query(report(&seen_tx, UpdateType::CallbackQuery), [])
            .handle_shipping_query(report(&seen_tx, UpdateType::ShippingQuery), [])
            .handle_pre_checkout_query(report(&seen_tx, UpdateType::PreCheckoutQuery), [])
            .handle_poll(report(&seen_tx, UpdateType::Poll), [])
            .handle_poll_answer(report(&seen_tx, UpdateType::PollAnswer), [])
            .handle_my_chat_member_updated(report(&seen_tx, UpdateType::MyChatMember), [])
            .handle_chat_member_updated(report(&seen_tx, UpdateType::ChatMember), [])
            .handle_chat_join_request(report(&seen_tx, UpdateType::ChatJoinRequest), []);

        for (id, update_type) in UpdateType::ROUTABLE.into_iter().enumerate() {
            assert!(bh.dispatch(update_of(id as i64, update_type)));
        }

        let mut seen = HashSet::new();
        for _ in 0..UpdateType::ROUTABLE.len() {
            let update_type = timeout(WAIT, seen_rx.recv()).await.unwrap().unwrap();
            seen.insert(update_type);
        }
        let expected: HashSet<UpdateType> = UpdateType::ROUTABLE.into_iter().collect();
        assert_eq!(seen, expected);
    }

    #[tokio::test]
    async fn test_group_predicate_blocks_member() {
        let (_tx, mut bh) = new_handler();
        let (seen_tx, _seen_rx) = mpsc::unbounded_channel();
        bh.group([chat_id(1)])
            .handle_message(report(&seen_tx, UpdateType::Message), [text_equal("hi")]);

        assert!(!bh.dispatch(text_message(1, 2, "hi")));
        assert!(bh.dispatch(text_message(2, 1, "hi")));
    }

    #[tokio::test]
    async fn test_first_match_only() {
        let (_tx, mut bh) = new_handler();
        let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();
        bh.handle_message(report(&seen_tx, UpdateType::Message), [command_equal("start")])
            .handle_message(report(&seen_tx, UpdateType::EditedMessage), []);

        assert!(bh.dispatch(text_message(1, 1, "/start")));

        // `report` records on invocation, so both checks are synchronous.
        assert_eq!(seen_rx.try_recv(), Ok(UpdateType::Message));
        assert!(seen_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unmatched_updates_are_dropped() {
        let (_tx, mut bh) = new_handler();
        let (seen_tx, _seen_rx) = mpsc::unbounded_channel();
        bh.handle_message(report(&seen_tx, UpdateType::Message), []);

        assert!(!bh.dispatch(update_of(1, UpdateType::Unknown)));
        assert!(!bh.dispatch(update_of(2, UpdateType::Poll)));
        assert_eq!(bh.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_introspection_counts_kind_predicate() {
        let (_tx, mut bh) = new_handler();
        bh.handle_message(|_, _| async {}, []);

        assert_eq!(bh.router().handler_count(), 1);
        let flat = bh.router().flatten();
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].predicates.len(), 1);
    }

    #[tokio::test]
    async fn test_misuse_is_reported() {
        let (_tx, bh) = new_handler();

        assert_eq!(
            bh.stop().await,
            Err(HandlerError::NotRunning(LifecycleState::Stopped))
        );

        {
            let mut running = tokio_test::task::spawn(bh.start());
            assert_pending!(running.poll());
            assert!(bh.is_running());

            let second = bh.start().await;
            assert_eq!(
                second,
                Err(HandlerError::AlreadyRunning(LifecycleState::Running))
            );
        }

        // The first loop was dropped without stopping; stop still completes.
        assert_ok!(timeout(WAIT, bh.stop()).await.unwrap());
        assert_eq!(bh.state(), LifecycleState::Stopped);
        assert_err!(bh.stop().await);
    }

    #[tokio::test]
    async fn test_stop_waits_for_in_flight_callbacks() {
        let (tx, mut bh) = new_handler();
        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let finished = Arc::new(AtomicBool::new(false));

        bh.handle_message(
            {
                let started = Arc::clone(&started);
                let release = Arc::clone(&release);
                let finished = Arc::clone(&finished);
                move |_, _: Message| {
                    let started = Arc::clone(&started);
                    let release = Arc::clone(&release);
                    let finished = Arc::clone(&finished);
                    async move {
                        started.notify_one();
                        release.notified().await;
                        finished.store(true, Ordering::SeqCst);
                    }
                }
            },
            [],
        );

        let bh = Arc::new(bh);
        let run = tokio::spawn({
            let bh = Arc::clone(&bh);
            async move { bh.start().await }
        });

        tx.send(text_message(1, 1, "work")).await.unwrap();
        timeout(WAIT, started.notified()).await.unwrap();
        assert_eq!(bh.in_flight(), 1);

        let stop = tokio::spawn({
            let bh = Arc::clone(&bh);
            async move { bh.stop().await }
        });

        sleep(Duration::from_millis(50)).await;
        assert!(!stop.is_finished());
        assert_eq!(bh.state(), LifecycleState::Stopping);
        assert!(!finished.load(Ordering::SeqCst));

        release.notify_one();
        assert_ok!(timeout(WAIT, stop).await.unwrap().unwrap());
        assert!(finished.load(Ordering::SeqCst));
        assert_eq!(bh.state(), LifecycleState::Stopped);
        assert_eq!(bh.in_flight(), 0);

        assert_ok!(timeout(WAIT, run).await.unwrap().unwrap());
    }

    /// Registers a message callback that signals `started`, then blocks until
    /// `release` fires and records completion in `finished`.
    fn gated_message_handler(
        bh: &mut BotHandler,
        started: &Arc<Notify>,
        release: &Arc<Notify>,
        finished: &Arc<AtomicBool>,
    ) {
        let (started, release, finished) =
            (Arc::clone(started), Arc::clone(release), Arc::clone(finished));
        bh.handle_message(
            move |_, _: Message| {
                let started = Arc::clone(&started);
                let release = Arc::clone(&release);
                let finished = Arc::clone(&finished);
                async move {
                    started.notify_one();
                    release.notified().await;
                    finished.store(true, Ordering::SeqCst);
                }
            },
            [],
        );
    }

    async fn wait_for_state(bh: &BotHandler, state: LifecycleState) {
        timeout(WAIT, async {
            while bh.state() != state {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_stop_during_source_close_drain_waits() {
        let (tx, mut bh) = new_handler();
        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let finished = Arc::new(AtomicBool::new(false));
        gated_message_handler(&mut bh, &started, &release, &finished);
        let bh = Arc::new(bh);

        tx.send(text_message(1, 1, "last")).await.unwrap();
        drop(tx);

        let run = tokio::spawn({
            let bh = Arc::clone(&bh);
            async move { bh.start().await }
        });
        timeout(WAIT, started.notified()).await.unwrap();
        wait_for_state(&bh, LifecycleState::Stopping).await;

        let stop = tokio::spawn({
            let bh = Arc::clone(&bh);
            async move { bh.stop().await }
        });

        sleep(Duration::from_millis(50)).await;
        assert!(!stop.is_finished());
        assert!(!finished.load(Ordering::SeqCst));

        release.notify_one();
        assert_ok!(timeout(WAIT, stop).await.unwrap().unwrap());
        assert!(finished.load(Ordering::SeqCst));
        assert_eq!(bh.in_flight(), 0);
        assert_eq!(bh.state(), LifecycleState::Stopped);
        assert_ok!(timeout(WAIT, run).await.unwrap().unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_stops_both_wait_for_drain() {
        let (tx, mut bh) = new_handler();
        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let finished = Arc::new(AtomicBool::new(false));
        gated_message_handler(&mut bh, &started, &release, &finished);
        let bh = Arc::new(bh);

        let run = tokio::spawn({
            let bh = Arc::clone(&bh);
            async move { bh.start().await }
        });
        tx.send(text_message(1, 1, "work")).await.unwrap();
        timeout(WAIT, started.notified()).await.unwrap();

        let first = tokio::spawn({
            let bh = Arc::clone(&bh);
            async move { bh.stop().await }
        });
        wait_for_state(&bh, LifecycleState::Stopping).await;
        let second = tokio::spawn({
            let bh = Arc::clone(&bh);
            async move { bh.stop().await }
        });

        sleep(Duration::from_millis(50)).await;
        assert!(!first.is_finished());
        assert!(!second.is_finished());
        assert_eq!(bh.in_flight(), 1);

        release.notify_one();
        assert_ok!(timeout(WAIT, first).await.unwrap().unwrap());
        assert_ok!(timeout(WAIT, second).await.unwrap().unwrap());
        assert!(finished.load(Ordering::SeqCst));
        assert_eq!(bh.state(), LifecycleState::Stopped);
        assert_ok!(timeout(WAIT, run).await.unwrap().unwrap());
        drop(tx);
    }

    #[tokio::test]
    async fn test_failing_group_prefix_skips_member_predicates() {
        let (tx, mut bh) = new_handler();
        let (seen_tx, mut seen_rx) = mpsc::unbounded_channel::<String>();
        let member_checks = Arc::new(AtomicUsize::new(0));
        let counted = {
            let member_checks = Arc::clone(&member_checks);
            Predicate::new(move |_| {
                member_checks.fetch_add(1, Ordering::SeqCst);
                true
            })
        };

        bh.group([chat_id(1)]).handle_message(
            move |_, m: Message| {
                let _ = seen_tx.send(m.text().to_owned());
                async {}
            },
            [counted],
        );

        tx.send(text_message(1, 2, "blocked")).await.unwrap();
        tx.send(text_message(2, 1, "allowed")).await.unwrap();
        drop(tx);

        assert_ok!(timeout(WAIT, bh.start()).await.unwrap());
        assert_eq!(seen_rx.try_recv().as_deref(), Ok("allowed"));
        assert!(seen_rx.try_recv().is_err());
        assert_eq!(member_checks.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_restart_after_stop() {
        let (tx, mut bh) = new_handler();
        let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();
        bh.handle_message(report(&seen_tx, UpdateType::Message), []);
        let bh = Arc::new(bh);

        for round in 0..2 {
            let run = tokio::spawn({
                let bh = Arc::clone(&bh);
                async move { bh.start().await }
            });

            tx.send(text_message(round, 1, "again")).await.unwrap();
            let seen = timeout(WAIT, seen_rx.recv()).await.unwrap();
            assert_eq!(seen, Some(UpdateType::Message));

            assert_ok!(bh.stop().await);
            assert_ok!(timeout(WAIT, run).await.unwrap().unwrap());
            assert_eq!(bh.state(), LifecycleState::Stopped);
        }
    }

    #[tokio::test]
    async fn test_source_close_drains_and_stops() {
        let (tx, mut bh) = new_handler();
        let finished = Arc::new(AtomicBool::new(false));
        bh.handle_message(
            {
                let finished = Arc::clone(&finished);
                move |_, _: Message| {
                    let finished = Arc::clone(&finished);
                    async move {
                        sleep(Duration::from_millis(50)).await;
                        finished.store(true, Ordering::SeqCst);
                    }
                }
            },
            [],
        );

        tx.send(text_message(1, 1, "last")).await.unwrap();
        drop(tx);

        assert_ok!(timeout(WAIT, bh.start()).await.unwrap());
        assert!(finished.load(Ordering::SeqCst));
        assert_eq!(bh.state(), LifecycleState::Stopped);
    }

    #[tokio::test]
    async fn test_panicking_callback_does_not_block_drain() {
        let (tx, mut bh) = new_handler();
        bh.handle_message(
            |_, m: Message| async move {
                if m.text() == "boom" {
                    panic!("callback failure");
                }
            },
            [],
        );

        tx.send(text_message(1, 1, "boom")).await.unwrap();
        tx.send(text_message(2, 1, "fine")).await.unwrap();
        drop(tx);

        assert_ok!(timeout(WAIT, bh.start()).await.unwrap());
        assert_eq!(bh.in_flight(), 0);
        assert_eq!(bh.state(), LifecycleState::Stopped);
    }
}
