//! Top-level application state and the controller that owns it.
//!
//! Only [`Orchestrator`] mutates [`AppState`]. Image and variation calls run as
//! background tasks that never touch the state: they report back over a channel
//! as [`Completion`]s tagged with the batch that issued them, and completions
//! from a superseded batch are dropped.

use log::{debug, error, info, warn};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

use crate::error::{ErrorKind, GenerationError};
use crate::gate::{CredentialGate, CredentialStatus};
use crate::generator::RecipeGenerator;
use crate::model::{GenerationRequest, Recipe};

/// Identifier of one user-initiated generation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct BatchId(u64);

impl BatchId {
    fn next(self) -> Self {
        BatchId(self.0 + 1)
    }
}

/// Steps shown by the progress indicator while a batch is loading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressStep {
    #[default]
    Analyzing,
    Generating,
}

impl ProgressStep {
    pub const ALL: [ProgressStep; 2] = [ProgressStep::Analyzing, ProgressStep::Generating];

    pub fn index(&self) -> usize {
        match self {
            ProgressStep::Analyzing => 0,
            ProgressStep::Generating => 1,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProgressStep::Analyzing => "جاري تحليل المكونات...",
            ProgressStep::Generating => "جاري ابتكار مجموعة من الوصفات...",
        }
    }
}

/// Where the application stands, as seen by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Credentials not checked yet
    Idle,
    /// Generation is blocked until a key is selected
    CredentialRequired,
    /// Waiting for input
    Ready,
    /// A batch is being generated
    Submitting,
    /// Recipes are displayed; images and variations may still arrive
    RecipesShown,
    /// The last batch failed
    Error,
}

/// Image state of one recipe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStatus<'a> {
    Pending,
    Ready(&'a str),
    Failed,
}

/// Variation state of one recipe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariationStatus<'a> {
    NotRequested,
    Loading,
    Ready(&'a str),
}

/// Everything the user sees, handed out read-only
#[derive(Debug, Clone, Default)]
pub struct AppState {
    batch: BatchId,
    recipes: Option<Vec<Recipe>>,
    image_urls: HashMap<String, String>,
    image_errors: HashMap<String, bool>,
    variations: HashMap<String, String>,
    loading_variations: HashMap<String, bool>,
    is_loading: bool,
    error: Option<String>,
    progress: ProgressStep,
}

impl AppState {
    pub fn batch(&self) -> BatchId {
        self.batch
    }

    pub fn recipes(&self) -> Option<&[Recipe]> {
        self.recipes.as_deref()
    }

    pub fn recipe(&self, title: &str) -> Option<&Recipe> {
        self.recipes
            .as_deref()
            .and_then(|recipes| recipes.iter().find(|r| r.title == title))
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn progress(&self) -> ProgressStep {
        self.progress
    }

    pub fn image_url(&self, title: &str) -> Option<&str> {
        self.image_urls.get(title).map(String::as_str)
    }

    pub fn is_image_error(&self, title: &str) -> bool {
        self.image_errors.get(title).copied().unwrap_or(false)
    }

    pub fn image_status(&self, title: &str) -> ImageStatus<'_> {
        match self.image_url(title) {
            Some(url) => ImageStatus::Ready(url),
            None if self.is_image_error(title) => ImageStatus::Failed,
            None => ImageStatus::Pending,
        }
    }

    pub fn variations(&self, title: &str) -> Option<&str> {
        self.variations.get(title).map(String::as_str)
    }

    pub fn is_loading_variations(&self, title: &str) -> bool {
        self.loading_variations.get(title).copied().unwrap_or(false)
    }

    pub fn variation_status(&self, title: &str) -> VariationStatus<'_> {
        if self.is_loading_variations(title) {
            VariationStatus::Loading
        } else {
            match self.variations(title) {
                Some(text) => VariationStatus::Ready(text),
                None => VariationStatus::NotRequested,
            }
        }
    }

    /// Titles present in any derived map
    pub fn derived_titles(&self) -> Vec<&str> {
        let mut titles: Vec<&str> = self
            .image_urls
            .keys()
            .chain(self.image_errors.keys())
            .chain(self.variations.keys())
            .chain(self.loading_variations.keys())
            .map(String::as_str)
            .collect();
        titles.sort_unstable();
        titles.dedup();
        titles
    }

    /// Whether every derived map is empty
    pub fn derived_is_empty(&self) -> bool {
        self.image_urls.is_empty()
            && self.image_errors.is_empty()
            && self.variations.is_empty()
            && self.loading_variations.is_empty()
    }

    /// Number of recipes whose image has neither arrived nor failed
    pub fn pending_images(&self) -> usize {
        self.recipes.as_deref().map_or(0, |recipes| {
            recipes
                .iter()
                .filter(|r| self.image_status(&r.title) == ImageStatus::Pending)
                .count()
        })
    }

    fn is_current(&self, batch: BatchId, title: &str) -> bool {
        batch == self.batch && self.recipe(title).is_some()
    }

    /// Reset everything the user sees and move to a new batch id
    fn reset(&mut self) {
        *self = AppState {
            batch: self.batch.next(),
            ..AppState::default()
        };
    }
}

/// A finished background call, tagged with the batch that issued it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Image {
        batch: BatchId,
        title: String,
        result: Result<String, GenerationError>,
    },
    Variations {
        batch: BatchId,
        title: String,
        result: Result<String, GenerationError>,
    },
}

impl Completion {
    pub fn title(&self) -> &str {
        match self {
            Completion::Image { title, .. } | Completion::Variations { title, .. } => title,
        }
    }
}

/// What happened to a completion once applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub completion: Completion,
    /// `false` when the completion belonged to a superseded batch
    pub accepted: bool,
}

/// Result of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// No ingredients: nothing was issued
    Empty,
    /// The credential gate is closed: nothing was issued
    CredentialRequired,
    /// Recipes are shown; images are on their way
    Shown(usize),
    /// The batch failed with the given error kind
    Failed(ErrorKind),
}

/// Controller owning [`AppState`] and sequencing every generation call
pub struct Orchestrator {
    state: AppState,
    generator: Arc<RecipeGenerator>,
    gate: CredentialGate,
    progress_delay: Duration,
    progress_tx: watch::Sender<Option<ProgressStep>>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    outstanding: usize,
}

impl Orchestrator {
    pub fn new(generator: RecipeGenerator, gate: CredentialGate, progress_delay: Duration) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (progress_tx, _) = watch::channel(None);
        Self {
            state: AppState::default(),
            generator: Arc::new(generator),
            gate,
            progress_delay,
            progress_tx,
            completions_tx,
            completions_rx,
            outstanding: 0,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn gate(&self) -> &CredentialGate {
        &self.gate
    }

    /// Subscribe to the progress indicator; `None` means no batch is loading
    pub fn progress_updates(&self) -> watch::Receiver<Option<ProgressStep>> {
        self.progress_tx.subscribe()
    }

    /// Background calls whose completion has not been applied yet
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    pub fn phase(&self) -> Phase {
        if self.gate.is_enabled() {
            match self.gate.status() {
                CredentialStatus::Unchecked => return Phase::Idle,
                CredentialStatus::Missing | CredentialStatus::Rejected => {
                    return Phase::CredentialRequired
                }
                CredentialStatus::Available => {}
            }
        }
        if self.state.is_loading {
            Phase::Submitting
        } else if self.state.error.is_some() {
            Phase::Error
        } else if self.state.recipes.is_some() {
            Phase::RecipesShown
        } else {
            Phase::Ready
        }
    }

    pub fn check_credential(&mut self) -> CredentialStatus {
        self.gate.check()
    }

    /// Accept a key from the selection affordance
    pub fn select_credential(&mut self, key: &str) -> CredentialStatus {
        self.gate.select(key)
    }

    fn set_progress(&mut self, step: Option<ProgressStep>) {
        self.state.progress = step.unwrap_or_default();
        self.progress_tx.send_replace(step);
    }

    /// Run one batch: progress, recipe text, then one image task per recipe
    pub async fn submit(&mut self, request: GenerationRequest) -> SubmitOutcome {
        if request.ingredients.is_empty() {
            debug!("Ignoring submission without ingredients");
            return SubmitOutcome::Empty;
        }
        if !self.gate.is_open() {
            info!("Submission blocked until a credential is selected");
            return SubmitOutcome::CredentialRequired;
        }

        self.state.reset();
        self.state.is_loading = true;
        let batch = self.state.batch;
        info!(
            "Starting batch {:?} with {} ingredients",
            batch,
            request.ingredients.len()
        );

        self.set_progress(Some(ProgressStep::Analyzing));
        if !self.progress_delay.is_zero() {
            tokio::time::sleep(self.progress_delay).await;
        }
        self.set_progress(Some(ProgressStep::Generating));

        let result = self
            .generator
            .generate_recipes(
                &request.ingredients,
                &request.dietary_restrictions,
                request.recipe_count,
            )
            .await;

        self.state.is_loading = false;
        self.set_progress(None);

        match result {
            Ok(recipes) => {
                let recipes = disambiguate_titles(recipes);
                let count = recipes.len();
                let titles: Vec<String> = recipes.iter().map(|r| r.title.clone()).collect();
                self.state.recipes = Some(recipes);
                for title in titles {
                    self.spawn_image(title);
                }
                info!("Batch {:?} shows {} recipes", batch, count);
                SubmitOutcome::Shown(count)
            }
            Err(e) => {
                error!("Batch {:?} failed: {}", batch, e);
                if e.kind() == ErrorKind::Credential {
                    self.gate.reject();
                }
                self.state.error = Some(e.to_string());
                SubmitOutcome::Failed(e.kind())
            }
        }
    }

    fn spawn_image(&mut self, title: String) {
        let generator = Arc::clone(&self.generator);
        let prompt_title = title.clone();
        self.spawn_task(
            title,
            GenerationError::ImageFailed,
            |batch, title, result| Completion::Image {
                batch,
                title,
                result,
            },
            async move { generator.try_generate_image(&prompt_title).await },
        );
    }

    /// Run `work` in the background and report its result as a completion.
    ///
    /// A task that panics still reports, with `fallback` as its error, so
    /// `outstanding` always returns to zero.
    fn spawn_task<F>(
        &mut self,
        title: String,
        fallback: GenerationError,
        completion: fn(BatchId, String, Result<String, GenerationError>) -> Completion,
        work: F,
    ) where
        F: Future<Output = Result<String, GenerationError>> + Send + 'static,
    {
        let batch = self.state.batch;
        let tx = self.completions_tx.clone();
        self.outstanding += 1;
        tokio::spawn(async move {
            let result = match tokio::spawn(work).await {
                Ok(result) => result,
                Err(e) => {
                    error!("Background call for {} did not finish: {}", title, e);
                    Err(fallback)
                }
            };
            // the receiver lives as long as the orchestrator
            let _ = tx.send(completion(batch, title, result));
        });
    }

    /// Ask for variations of one recipe of the current batch.
    ///
    /// Returns `false` when nothing was issued: unknown title, a request for
    /// that recipe is already in flight, or the credential gate is closed.
    pub fn request_variations(&mut self, title: &str) -> bool {
        let Some(recipe) = self.state.recipe(title).cloned() else {
            return false;
        };
        if self.state.is_loading_variations(title) || !self.gate.is_open() {
            return false;
        }

        self.state
            .loading_variations
            .insert(title.to_string(), true);
        self.state.variations.remove(title);

        let generator = Arc::clone(&self.generator);
        self.spawn_task(
            title.to_string(),
            GenerationError::VariationsFailed,
            |batch, title, result| Completion::Variations {
                batch,
                title,
                result,
            },
            async move { generator.generate_variations(&recipe).await },
        );
        true
    }

    /// Record the outcome of one image call; returns whether it was applied
    pub fn record_image_result(
        &mut self,
        batch: BatchId,
        title: &str,
        result: Result<String, GenerationError>,
    ) -> bool {
        if !self.state.is_current(batch, title) {
            warn!("Dropping stale image for {} from batch {:?}", title, batch);
            return false;
        }
        match result {
            Ok(url) => {
                self.state.image_errors.remove(title);
                self.state.image_urls.insert(title.to_string(), url);
            }
            Err(e) => {
                warn!("Failed to generate image for {}: {}", title, e);
                if e.kind() == ErrorKind::Credential {
                    self.gate.reject();
                }
                self.state.image_urls.remove(title);
                self.state.image_errors.insert(title.to_string(), true);
            }
        }
        true
    }

    /// Record the outcome of one variation call; returns whether it was applied
    pub fn record_variation_result(
        &mut self,
        batch: BatchId,
        title: &str,
        result: Result<String, GenerationError>,
    ) -> bool {
        if !self.state.is_current(batch, title) {
            warn!("Dropping stale variations for {} from batch {:?}", title, batch);
            return false;
        }
        self.state.loading_variations.remove(title);
        match result {
            Ok(text) => {
                self.state.variations.insert(title.to_string(), text);
            }
            Err(e) => {
                warn!("Failed to get variations for {}: {}", title, e);
                if e.kind() == ErrorKind::Credential {
                    self.gate.reject();
                }
                self.state.variations.remove(title);
            }
        }
        true
    }

    /// Apply a completion received from a background task
    pub fn apply(&mut self, completion: Completion) -> Applied {
        let accepted = match &completion {
            Completion::Image {
                batch,
                title,
                result,
            } => self.record_image_result(*batch, title, result.clone()),
            Completion::Variations {
                batch,
                title,
                result,
            } => self.record_variation_result(*batch, title, result.clone()),
        };
        Applied {
            completion,
            accepted,
        }
    }

    /// Wait for the next background completion and apply it.
    ///
    /// Never resolves while nothing is outstanding.
    pub async fn next_completion(&mut self) -> Applied {
        if self.outstanding == 0 {
            std::future::pending::<()>().await;
        }
        match self.completions_rx.recv().await {
            Some(completion) => {
                self.outstanding -= 1;
                self.apply(completion)
            }
            // the orchestrator holds a sender, so the channel never closes
            None => std::future::pending().await,
        }
    }

    /// Apply every completion that has already arrived
    pub fn poll_completions(&mut self) -> Vec<Applied> {
        let mut applied = Vec::new();
        while let Ok(completion) = self.completions_rx.try_recv() {
            self.outstanding -= 1;
            applied.push(self.apply(completion));
        }
        applied
    }

    /// Wait until every outstanding background call has completed
    pub async fn settle(&mut self) -> Vec<Applied> {
        let mut applied = Vec::new();
        while self.outstanding > 0 {
            applied.push(self.next_completion().await);
        }
        applied
    }

    /// Reset results, derived maps, loading flag, error and progress.
    ///
    /// In-flight calls keep running; their completions are dropped.
    pub fn clear(&mut self) {
        info!("Clearing results");
        self.state.reset();
        self.set_progress(None);
    }
}

/// Make titles unique within one batch by suffixing repeats with their rank
pub fn disambiguate_titles(mut recipes: Vec<Recipe>) -> Vec<Recipe> {
    let mut taken: HashSet<String> = HashSet::new();
    for recipe in &mut recipes {
        if taken.insert(recipe.title.clone()) {
            continue;
        }
        let mut rank = 2;
        while taken.contains(&format!("{} ({})", recipe.title, rank)) {
            rank += 1;
        }
        let renamed = format!("{} ({})", recipe.title, rank);
        warn!("Duplicate recipe title {:?} renamed to {:?}", recipe.title, renamed);
        taken.insert(renamed.clone());
        recipe.title = renamed;
    }
    recipes
}
