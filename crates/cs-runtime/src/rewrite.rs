//! Self-rewrite wrapper — a callable that minifies its own source on first
//! use and dispatches through the rewritten behavior from then on.
//!
//! ```text
//! Unrewritten --(first call: extract, transform, load)--> Rewritten
//! ```
//!
//! The transition happens under a mutex, so concurrent first calls wait for
//! one rewrite instead of racing. A failed rewrite leaves the state at
//! `Unrewritten` and the error goes to the caller unchanged; the original
//! body is never run as a fallback.

use cs_core::{CodeslimError, Result, SourceText, TransformedArtifact};
use cs_optimizer::{extract_definition, Pipeline};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// A materialized behavior: what a wrapped callable dispatches to.
pub type Behavior<A, R> = Arc<dyn Fn(A) -> Result<R> + Send + Sync>;

/// Turns a transformed definition into a callable behavior.
pub trait BehaviorLoader<A, R>: Send + Sync {
    fn load(&self, name: &str, artifact: &TransformedArtifact) -> anyhow::Result<Behavior<A, R>>;
}

impl<A, R, F> BehaviorLoader<A, R> for F
where
    F: Fn(&str, &TransformedArtifact) -> anyhow::Result<Behavior<A, R>> + Send + Sync,
{
    fn load(&self, name: &str, artifact: &TransformedArtifact) -> anyhow::Result<Behavior<A, R>> {
        self(name, artifact)
    }
}

/// Where a wrapped callable's own source comes from.
#[derive(Debug, Clone)]
pub enum SourceProvider {
    /// The definition text itself.
    Inline(SourceText),
    /// A named definition inside module text.
    Module { module: SourceText, name: String },
    /// A named definition inside a source file, read at rewrite time.
    File { path: PathBuf, name: String },
}

impl SourceProvider {
    pub fn extract(&self) -> Result<SourceText> {
        match self {
            Self::Inline(text) => Ok(text.clone()),
            Self::Module { module, name } => extract_definition(module, name),
            Self::File { path, name } => {
                let module = SourceText::new(std::fs::read_to_string(path)?);
                extract_definition(&module, name)
            }
        }
    }
}

enum State<A, R> {
    Unrewritten,
    Rewritten {
        behavior: Behavior<A, R>,
        source: SourceText,
    },
}

/// Wrapper factory, tagged with the module or unit it belongs to.
#[derive(Clone)]
pub struct OptimizeOnLoad {
    tag: String,
    pipeline: Arc<Pipeline>,
}

impl OptimizeOnLoad {
    pub fn new(tag: impl Into<String>) -> Self {
        Self::with_pipeline(tag, Arc::new(Pipeline::default()))
    }

    pub fn with_pipeline(tag: impl Into<String>, pipeline: Arc<Pipeline>) -> Self {
        Self {
            tag: tag.into(),
            pipeline,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Wrap the callable `name`, whose source `source` provides.
    pub fn wrap<A, R>(
        &self,
        name: impl Into<String>,
        source: SourceProvider,
        loader: impl BehaviorLoader<A, R> + 'static,
    ) -> SelfRewriting<A, R> {
        SelfRewriting {
            tag: self.tag.clone(),
            name: name.into(),
            source,
            pipeline: Arc::clone(&self.pipeline),
            loader: Box::new(loader),
            state: Mutex::new(State::Unrewritten),
            rewrites: AtomicUsize::new(0),
        }
    }
}

pub struct SelfRewriting<A, R> {
    tag: String,
    name: String,
    source: SourceProvider,
    pipeline: Arc<Pipeline>,
    loader: Box<dyn BehaviorLoader<A, R>>,
    state: Mutex<State<A, R>>,
    rewrites: AtomicUsize,
}

impl<A, R> SelfRewriting<A, R> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the callable, rewriting it first if this is the first call.
    pub fn call(&self, args: A) -> Result<R> {
        let behavior = self.behavior()?;
        behavior(args)
    }

    pub fn is_rewritten(&self) -> bool {
        matches!(*self.state.lock(), State::Rewritten { .. })
    }

    /// Number of rewrite attempts so far, successful or not.
    pub fn rewrite_count(&self) -> usize {
        self.rewrites.load(Ordering::SeqCst)
    }

    /// The minified source the callable now runs, once rewritten.
    pub fn rewritten_source(&self) -> Option<SourceText> {
        match &*self.state.lock() {
            State::Rewritten { source, .. } => Some(source.clone()),
            State::Unrewritten => None,
        }
    }

    fn behavior(&self) -> Result<Behavior<A, R>> {
        let mut state = self.state.lock();
        if let State::Rewritten { behavior, .. } = &*state {
            return Ok(Arc::clone(behavior));
        }
        let (behavior, source) = self.rewrite()?;
        *state = State::Rewritten {
            behavior: Arc::clone(&behavior),
            source,
        };
        Ok(behavior)
    }

    fn rewrite(&self) -> Result<(Behavior<A, R>, SourceText)> {
        self.rewrites.fetch_add(1, Ordering::SeqCst);
        let source = self.source.extract()?;
        debug!(tag = %self.tag, name = %self.name, bytes = source.len(), "rewriting");

        let artifact = self.pipeline.transform(&source)?;
        let behavior = self
            .loader
            .load(&self.name, &artifact)
            .map_err(CodeslimError::Load)?;
        info!(
            tag = %self.tag,
            name = %self.name,
            before = source.len(),
            after = artifact.text().len(),
            "callable rewritten"
        );
        Ok((behavior, artifact.into_text()))
    }
}
