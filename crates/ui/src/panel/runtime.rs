//! Interprets lifecycle effects against a page, a view and a backend.

use std::sync::Arc;

use buddy_core::Clock;
use futures::future::{self, BoxFuture};
use futures::stream::{self, FuturesUnordered};
use futures::{FutureExt, Stream, StreamExt};
use services::PanelSignal;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

use crate::panel::backend::PanelBackend;
use crate::panel::config::PanelConfig;
use crate::panel::debounce::DebounceExt;
use crate::panel::lifecycle::{PanelController, PanelEffect, PanelEvent, UserAction, transition};
use crate::panel::page::PageDocument;
use crate::panel::scraper::{scrape, snapshot};
use crate::vm::PanelVm;

/// Where the panel is drawn.
pub trait PanelView: Send {
    fn mount(&mut self);
    fn unmount(&mut self);
    fn render(&mut self, vm: &PanelVm);
}

/// Input that does not come from page mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelCommand {
    User(UserAction),
    Signal(PanelSignal),
}

type InFlight = FuturesUnordered<BoxFuture<'static, PanelEvent>>;

pub struct PanelRuntime<D, V> {
    page: D,
    view: V,
    backend: Arc<dyn PanelBackend>,
    config: PanelConfig,
    clock: Clock,
    ticker: Option<Interval>,
    in_flight: InFlight,
}

impl<D: PageDocument, V: PanelView> PanelRuntime<D, V> {
    #[must_use]
    pub fn new(page: D, view: V, backend: Arc<dyn PanelBackend>, config: PanelConfig) -> Self {
        Self {
            page,
            view,
            backend,
            config,
            clock: Clock::system(),
            ticker: None,
            in_flight: FuturesUnordered::new(),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Drives the panel until `commands` ends, then returns the final controller.
    ///
    /// Each item on `mutations` marks one page mutation batch. The page is
    /// checked once at start-up and again after every quiet period.
    pub async fn run<M, C>(mut self, mutations: M, commands: C) -> PanelController
    where
        M: Stream<Item = ()> + Unpin,
        C: Stream<Item = PanelCommand> + Unpin,
    {
        let mut controller = PanelController::new(&self.config, self.clock);
        let mut settled = stream::once(future::ready(()))
            .chain(mutations)
            .debounce(self.config.debounce);
        let mut commands = commands;

        loop {
            let event = tokio::select! {
                biased;

                Some(event) = self.in_flight.next(), if !self.in_flight.is_empty() => event,
                () = next_tick(&mut self.ticker) => PanelEvent::Tick,
                Some(()) = settled.next() => match snapshot(&self.page) {
                    Some(page) => PanelEvent::Settled(page),
                    None => continue,
                },
                command = commands.next() => match command {
                    Some(PanelCommand::User(action)) => PanelEvent::User(action),
                    Some(PanelCommand::Signal(signal)) => match snapshot(&self.page) {
                        Some(page) => PanelEvent::Signal(signal, page),
                        None => continue,
                    },
                    None => break,
                },
            };
            controller = self.handle(controller, event).await;
        }

        controller
    }

    async fn handle(&mut self, controller: PanelController, event: PanelEvent) -> PanelController {
        if let PanelEvent::RecordLoaded { epoch, .. } | PanelEvent::AiAnswered { epoch, .. } = &event {
            if !controller.is_current(*epoch) {
                tracing::debug!(epoch = epoch.value(), "discarding stale reply");
            }
        }

        let (controller, effects) = transition(controller, event);
        for effect in effects {
            self.run_effect(&controller, effect).await;
        }
        controller
    }

    async fn run_effect(&mut self, controller: &PanelController, effect: PanelEffect) {
        match effect {
            PanelEffect::Mount => {
                tracing::info!(path = ?controller.memory().last_path, "panel initialized");
                self.view.mount();
            }
            PanelEffect::Unmount => {
                self.view.unmount();
                tracing::info!(phase = ?controller.phase(), "panel removed");
            }
            PanelEffect::StartTimer => {
                let period = self.config.tick;
                let mut ticker = interval_at(Instant::now() + period, period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                self.ticker = Some(ticker);
            }
            PanelEffect::StopTimer => self.ticker = None,
            PanelEffect::LoadRecord { epoch, location } => {
                let scraped = scrape(&self.page, &self.config);
                let backend = Arc::clone(&self.backend);
                self.in_flight.push(
                    async move {
                        let problem_id = location.problem_id();
                        let stored = backend.load_problem(&problem_id).await;
                        let has_credential = backend.has_credential().await;
                        PanelEvent::RecordLoaded {
                            epoch,
                            scraped,
                            stored,
                            has_credential,
                        }
                    }
                    .boxed(),
                );
            }
            PanelEffect::Persist { problem_id, record } => {
                // Awaited inline so writes land in the order they were emitted.
                let ack = self.backend.save_problem(&problem_id, record).await;
                if !ack.success {
                    tracing::warn!(%problem_id, error = ?ack.error, "saving progress failed");
                }
            }
            PanelEffect::RequestAi {
                epoch,
                target,
                intent,
                problem,
            } => {
                tracing::debug!(?target, "assistant request sent");
                let backend = Arc::clone(&self.backend);
                self.in_flight.push(
                    async move {
                        let reply = backend.ask(&intent, &problem).await;
                        PanelEvent::AiAnswered {
                            epoch,
                            target,
                            reply,
                        }
                    }
                    .boxed(),
                );
            }
            PanelEffect::Render => {
                if let Some(vm) = PanelVm::from_controller(controller) {
                    self.view.render(&vm);
                }
            }
        }
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => future::pending::<()>().await,
    }
}
