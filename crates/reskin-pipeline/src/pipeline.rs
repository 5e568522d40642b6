//! The observation pipeline: per-element state machine plus the
//! single-threaded executor that interleaves every element's work.
//!
//! ```text
//! Unseen --(not decoded)--> AwaitingDecode --(load|error)--> Evaluated
//!    \--------------------(decoded)------------------------/
//! ```
//!
//! An element becomes `Evaluated` as soon as the classifier has decided,
//! before any of the replacement awaits, so feeding it again mid-swap is
//! a no-op.

use std::cell::RefCell;

use futures::stream::{FuturesUnordered, Stream, StreamExt};
use rand::Rng;

use crate::classify::{self, Classification};
use crate::config::ReplacerConfig;
use crate::host::{Host, PageImage};
use crate::select::{CategorySelector, Selection};
use crate::swap::{FADE_DELAY_MS, SwapPlan};
use crate::transparency;
use crate::types::ImageState;

/// What happened to one element fed to [`Replacer::process`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The element was already awaiting decode or evaluated.
    AlreadySeen,
    /// The classifier turned the element down; it is left untouched.
    Ineligible(Classification),
    /// The replacement failed to preload; the element is left untouched.
    PreloadFailed(Selection),
    /// The element now shows the selection.
    Replaced(Selection),
}

enum Event<I> {
    Found(I),
    Settled(Option<Outcome>),
    Closed,
}

/// Drives classification and replacement for every image on a page.
pub struct Replacer<H, R> {
    host: H,
    config: ReplacerConfig,
    selector: RefCell<CategorySelector<R>>,
}

impl<H, R> Replacer<H, R>
where
    H: Host,
    R: Rng,
{
    pub const fn new(host: H, config: ReplacerConfig, selector: CategorySelector<R>) -> Self {
        Self {
            host,
            config,
            selector: RefCell::new(selector),
        }
    }

    pub const fn host(&self) -> &H {
        &self.host
    }

    pub const fn config(&self) -> &ReplacerConfig {
        &self.config
    }

    /// Names currently in the recency window, oldest first.
    pub fn recent(&self) -> Vec<String> {
        self.selector
            .borrow()
            .recent()
            .iter()
            .map(str::to_owned)
            .collect()
    }

    /// Feed one element through the state machine.
    ///
    /// Safe to call any number of times for the same element; only the
    /// first call while it is `Unseen` does any work.
    #[allow(clippy::future_not_send)]
    pub async fn process(&self, image: H::Image) -> Outcome {
        if image.state() != ImageState::Unseen {
            return Outcome::AlreadySeen;
        }

        if !image.is_decoded() {
            image.set_state(ImageState::AwaitingDecode);
            image.decoded().await;
        }

        self.evaluate(&image).await
    }

    /// Classify a decoded element and, if eligible, replace it.
    #[allow(clippy::future_not_send)]
    pub async fn evaluate(&self, image: &H::Image) -> Outcome {
        let snapshot = image.snapshot();
        let viewport = self.host.viewport();
        let classification = classify::classify(&snapshot, viewport, &self.config);
        image.set_state(ImageState::Evaluated);

        if !classification.is_eligible() {
            log::debug!("{}: skipped ({classification:?})", snapshot.src);
            return Outcome::Ineligible(classification);
        }
        log::debug!("{}: eligible ({classification:?})", snapshot.src);

        let transparent = transparency::has_transparency(&self.host, &snapshot).await;
        let selection = self
            .selector
            .borrow_mut()
            .select(&snapshot, viewport, transparent);
        let plan = SwapPlan::new(&snapshot, &selection, &self.config.image_folder);

        if let Err(e) = self.host.preload(&plan.src).await {
            log::warn!("{}: preload of {} failed: {e}", snapshot.src, plan.src);
            return Outcome::PreloadFailed(selection);
        }

        image.apply(&plan);
        self.host.sleep(FADE_DELAY_MS).await;
        image.set_opacity(1.0);

        log::info!("replaced {} with {}", snapshot.src, plan.src);
        Outcome::Replaced(selection)
    }

    /// Process `initial` and every element yielded by `discovered` until
    /// the stream ends and all in-flight work has settled.
    ///
    /// Elements interleave freely; the steps for one element stay in order.
    #[allow(clippy::future_not_send)]
    pub async fn run<I, S>(&self, initial: I, discovered: S)
    where
        I: IntoIterator<Item = H::Image>,
        S: Stream<Item = H::Image> + Unpin,
    {
        let mut in_flight = FuturesUnordered::new();
        for image in initial {
            in_flight.push(self.process(image));
        }
        log::debug!("initial sweep queued {} image(s)", in_flight.len());

        let mut discovered = discovered.fuse();
        loop {
            let event = futures::select! {
                found = discovered.next() => found.map_or(Event::Closed, Event::Found),
                settled = in_flight.next() => Event::Settled(settled),
                complete => break,
            };
            match event {
                Event::Found(image) => in_flight.push(self.process(image)),
                Event::Settled(Some(outcome)) => log::trace!("settled: {outcome:?}"),
                Event::Settled(None) => {}
                Event::Closed => log::debug!("discovery stream closed"),
            }
        }
    }
}
