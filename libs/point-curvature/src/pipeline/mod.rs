//! # Fitting Pipeline
//!
//! Composes fitting stages and drives them through as many passes as they
//! request.
//!
//! ## Composition
//!
//! [`PipelineBuilder`] checks, before any sample is processed, that every
//! capability a stage requires is provided by an earlier stage and that no
//! capability is provided twice. Stages then run in insertion order within
//! every pass, so a plane fit placed first publishes its plane before the
//! projected estimator reads it.
//!
//! ## Passes
//!
//! ```text
//! Idle ─init─▶ Accumulating{0} ─finalize─▶ AwaitingPass{0} ─init─▶ Accumulating{1} ─▶ ...
//!                                   │
//!                                   └────────▶ Done(result)
//! ```
//!
//! A stage whose last result was terminal sits out the following passes and
//! its result is kept. The pipeline result combines the latest result of
//! every stage.
//!
//! ## Example
//!
//! ```rust
//! use config::constants::FitConfig;
//! use glam::DVec3;
//! use point_curvature::data::Sample;
//! use point_curvature::weight::NoWeight;
//! use point_curvature::{FitResult, FittingPipeline};
//!
//! let samples: Vec<Sample> = (0..9)
//!     .map(|i| Sample::new(DVec3::new((i % 3) as f64, (i / 3) as f64, 0.0), DVec3::Z))
//!     .collect();
//!
//! let mut pipeline =
//!     FittingPipeline::projected_normal_covariance(NoWeight, FitConfig::default()).unwrap();
//! let status = pipeline.compute(samples.as_slice(), DVec3::new(1.0, 1.0, 0.0));
//!
//! assert_eq!(status, FitResult::Stable);
//! assert_eq!(pipeline.pass(), 2);
//! assert_eq!(pipeline.curvature().map(|c| c.k1()), Some(0.0));
//! ```

use std::collections::HashMap;
use std::fmt;

use config::constants::FitConfig;
use glam::DVec3;
use tracing::{debug, warn};

use crate::curvature::{CurvatureResult, NormalCovariance, ProjectedNormalCovariance};
use crate::data::{DataPoint, Dimension};
use crate::error::FittingError;
use crate::fitting::{Capability, FitContext, FitResult, FittingStage};
use crate::neighbors::NeighborSource;
use crate::plane::{CovariancePlaneFit, PlaneEstimate};
use crate::weight::WeightFunc;

// =============================================================================
// BUILDER
// =============================================================================

/// Collects stages and validates their composition.
pub struct PipelineBuilder<P: DataPoint> {
    config: FitConfig,
    stages: Vec<Box<dyn FittingStage<P>>>,
}

impl<P: DataPoint> Default for PipelineBuilder<P> {
    fn default() -> Self {
        Self::new(FitConfig::default())
    }
}

impl<P: DataPoint> PipelineBuilder<P> {
    /// Starts an empty pipeline driven with `config`.
    pub fn new(config: FitConfig) -> Self {
        Self {
            config,
            stages: Vec::new(),
        }
    }

    /// Appends a stage; stages run in insertion order.
    pub fn stage<S: FittingStage<P> + 'static>(mut self, stage: S) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Validates the composition and returns the pipeline.
    ///
    /// # Errors
    ///
    /// - [`FittingError::Config`] if the configuration is invalid
    /// - [`FittingError::Empty`] without stages
    /// - [`FittingError::MissingCapability`] if a requirement is not met by an
    ///   earlier stage
    /// - [`FittingError::DuplicateCapability`] if two stages provide the same
    ///   capability
    pub fn build(self) -> Result<FittingPipeline<P>, FittingError> {
        let () = Dimension::<P>::REQUIRE_3D;
        self.config.validate()?;
        if self.stages.is_empty() {
            return Err(FittingError::Empty);
        }

        let mut providers: HashMap<Capability, &'static str> = HashMap::new();
        for stage in &self.stages {
            for &capability in stage.requires() {
                if !providers.contains_key(&capability) {
                    return Err(FittingError::MissingCapability {
                        stage: stage.name(),
                        capability,
                    });
                }
            }
            for &capability in stage.provides() {
                if let Some(&previous) = providers.get(&capability) {
                    return Err(FittingError::DuplicateCapability {
                        stage: stage.name(),
                        previous,
                        capability,
                    });
                }
                providers.insert(capability, stage.name());
            }
        }

        let results = vec![None; self.stages.len()];
        Ok(FittingPipeline {
            config: self.config,
            stages: self.stages,
            results,
            context: FitContext::default(),
            state: PipelineState::Idle,
            passes: 0,
        })
    }
}

impl<P: DataPoint> fmt::Debug for PipelineBuilder<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("config", &self.config)
            .field("stages", &stage_names(&self.stages))
            .finish()
    }
}

fn stage_names<P: DataPoint>(stages: &[Box<dyn FittingStage<P>>]) -> Vec<&'static str> {
    stages.iter().map(|stage| stage.name()).collect()
}

// =============================================================================
// PIPELINE
// =============================================================================

/// Where the pipeline stands for the current query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineState {
    /// No query started.
    #[default]
    Idle,
    /// Between `init` and `finalize` of pass `pass` (zero based).
    Accumulating {
        /// Current pass index
        pass: u32,
    },
    /// Pass `pass` asked for another one.
    AwaitingPass {
        /// Last closed pass index
        pass: u32,
    },
    /// The query finished with this combined result.
    Done(FitResult),
}

/// Ordered stages driven together through one or more passes.
///
/// Build one with [`PipelineBuilder`] or a preset, then either drive it by
/// hand (`init`, `add_neighbor`, `finalize`) or let [`FittingPipeline::compute`]
/// loop over a [`NeighborSource`].
pub struct FittingPipeline<P: DataPoint> {
    config: FitConfig,
    stages: Vec<Box<dyn FittingStage<P>>>,
    /// Latest result of each stage for the current query.
    results: Vec<Option<FitResult>>,
    context: FitContext,
    state: PipelineState,
    passes: u32,
}

impl<P: DataPoint> FittingPipeline<P> {
    /// Covariance-of-normals estimator alone.
    pub fn normal_covariance<W>(weight: W, config: FitConfig) -> Result<Self, FittingError>
    where
        W: WeightFunc + 'static,
    {
        PipelineBuilder::new(config)
            .stage(NormalCovariance::with_config(weight, config))
            .build()
    }

    /// Covariance plane fit followed by the projected estimator.
    pub fn projected_normal_covariance<W>(
        weight: W,
        config: FitConfig,
    ) -> Result<Self, FittingError>
    where
        W: WeightFunc + Clone + 'static,
    {
        PipelineBuilder::new(config)
            .stage(CovariancePlaneFit::with_config(weight.clone(), config))
            .stage(ProjectedNormalCovariance::with_config(weight, config))
            .build()
    }

    /// Starts a pass at `eval_pos`.
    ///
    /// After `NeedOtherPass` this starts the next pass for the stages still
    /// pending. During accumulation it restarts the current pass. Otherwise,
    /// or when `eval_pos` differs from the current query, every stage is reset
    /// and a new query begins.
    pub fn init(&mut self, eval_pos: DVec3) {
        let same_query = eval_pos == self.context.eval_pos();
        let state = self.state;
        self.state = match state {
            PipelineState::AwaitingPass { pass } if same_query => {
                PipelineState::Accumulating { pass: pass + 1 }
            }
            PipelineState::Accumulating { pass } if same_query => {
                PipelineState::Accumulating { pass }
            }
            _ => {
                self.start_query(eval_pos);
                PipelineState::Accumulating { pass: 0 }
            }
        };

        for (stage, result) in self.stages.iter_mut().zip(&self.results) {
            if is_pending(*result) {
                stage.init(eval_pos);
            }
        }
    }

    /// Feeds one neighbor to every pending stage; returns whether any of them
    /// accepted it.
    ///
    /// # Panics
    ///
    /// Outside accumulation.
    pub fn add_neighbor(&mut self, point: &P) -> bool {
        self.require_accumulating();
        let mut accepted = false;
        for (stage, result) in self.stages.iter_mut().zip(&self.results) {
            if is_pending(*result) {
                accepted |= stage.add_neighbor(point);
            }
        }
        accepted
    }

    /// Closes the current pass and returns the combined result.
    ///
    /// Returns `Undefined` when a stage still asks for another pass after
    /// `max_passes`.
    ///
    /// # Panics
    ///
    /// Outside accumulation.
    pub fn finalize(&mut self) -> FitResult {
        let pass = self.require_accumulating();

        let mut combined = FitResult::Stable;
        for (stage, result) in self.stages.iter_mut().zip(self.results.iter_mut()) {
            if is_pending(*result) {
                *result = Some(stage.finalize(&mut self.context));
            }
            if let Some(result) = *result {
                combined = combined.combine(result);
            }
        }
        self.passes = pass + 1;

        if combined == FitResult::NeedOtherPass && self.passes >= self.config.max_passes {
            warn!(
                passes = self.passes,
                max_passes = self.config.max_passes,
                "pass limit reached before the fit converged"
            );
            combined = FitResult::Undefined;
        }
        debug!(pass, status = ?combined, "pipeline pass finalized");

        self.state = if combined.is_terminal() {
            PipelineState::Done(combined)
        } else {
            PipelineState::AwaitingPass { pass }
        };
        combined
    }

    /// Runs as many passes over `source` as the stages need.
    ///
    /// # Example
    ///
    /// ```rust
    /// use config::constants::FitConfig;
    /// use glam::DVec3;
    /// use point_curvature::data::Sample;
    /// use point_curvature::neighbors::RangeNeighbors;
    /// use point_curvature::weight::NoWeight;
    /// use point_curvature::{FitResult, FittingPipeline};
    ///
    /// let samples = vec![Sample::new(DVec3::ZERO, DVec3::Z); 2];
    /// let source = RangeNeighbors::new(&samples, 1.0).unwrap();
    /// let mut pipeline =
    ///     FittingPipeline::normal_covariance(NoWeight, FitConfig::default()).unwrap();
    /// assert_eq!(pipeline.compute(&source, DVec3::ZERO), FitResult::Undefined);
    /// ```
    pub fn compute<S>(&mut self, source: &S, eval_pos: DVec3) -> FitResult
    where
        S: NeighborSource<P> + ?Sized,
    {
        self.reset();
        loop {
            self.init(eval_pos);
            for point in source.begin_query(eval_pos) {
                self.add_neighbor(point);
            }
            let status = self.finalize();
            if status.is_terminal() {
                return status;
            }
        }
    }

    /// Drops the current query; the next `init` starts a new one.
    pub fn reset(&mut self) {
        self.start_query(DVec3::ZERO);
        self.state = PipelineState::Idle;
    }

    /// Driver state.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Combined result of the last finalize of the current query.
    pub fn status(&self) -> Option<FitResult> {
        match self.state {
            PipelineState::Done(result) => Some(result),
            PipelineState::AwaitingPass { .. } => Some(FitResult::NeedOtherPass),
            PipelineState::Idle | PipelineState::Accumulating { .. } => None,
        }
    }

    /// Number of passes closed for the current query.
    pub fn pass(&self) -> u32 {
        self.passes
    }

    /// Query position.
    pub fn eval_pos(&self) -> DVec3 {
        self.context.eval_pos()
    }

    /// Plane published during the current query, if any.
    pub fn plane(&self) -> Option<&PlaneEstimate> {
        self.context.plane()
    }

    /// Curvature published during the current query, if any. Check
    /// [`status`](Self::status) before trusting it.
    pub fn curvature(&self) -> Option<&CurvatureResult> {
        self.context.curvature()
    }

    /// Configuration the pipeline was built with.
    pub fn config(&self) -> &FitConfig {
        &self.config
    }

    fn start_query(&mut self, eval_pos: DVec3) {
        for stage in &mut self.stages {
            stage.reset();
        }
        self.results.iter_mut().for_each(|result| *result = None);
        self.context.reset(eval_pos);
        self.passes = 0;
    }

    fn require_accumulating(&self) -> u32 {
        match self.state {
            PipelineState::Accumulating { pass } => pass,
            state => panic!("pipeline is not accumulating ({state:?}); call init first"),
        }
    }
}

impl<P: DataPoint> fmt::Debug for FittingPipeline<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FittingPipeline")
            .field("stages", &stage_names(&self.stages))
            .field("state", &self.state)
            .field("passes", &self.passes)
            .field("context", &self.context)
            .finish()
    }
}

/// A stage takes part in a pass until it returns a terminal result.
fn is_pending(result: Option<FitResult>) -> bool {
    match result {
        Some(result) => !result.is_terminal(),
        None => true,
    }
}
