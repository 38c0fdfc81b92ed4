use rayon::prelude::*;
use serde_json::Value;

use crate::{
    animation::scheduler::{AnimationPhase, PhaseState, resolve_geometry},
    clip::model::Clip,
    element::model::{
        ElementKind, ElementVariant, EmojiProps, ImageProps, LottieProps, PlayPayload, ShapeProps,
        TextProps, VideoProps, WidgetPhase, WidgetProps,
    },
    element::tree::ElementTree,
    foundation::core::{Affine, Size, TimeRange},
    foundation::error::{StageError, StageResult},
    foundation::ids::{ElementId, NodeIdx},
    transform::placement::{Geometry, placement_affine},
    widget::registry::{ResolvedParameters, WidgetRegistry},
    widget::schema::UnknownFields,
};

/// Threading options for [`Composer::resolve_many`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolveThreading {
    /// Resolve query times on a rayon pool when `true`.
    pub parallel: bool,
    /// Optional explicit worker thread count.
    pub threads: Option<usize>,
}

impl Default for ResolveThreading {
    fn default() -> Self {
        Self {
            parallel: false,
            threads: None,
        }
    }
}

/// Options for [`Composer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComposerOpts {
    /// Handling of undeclared widget fields.
    pub unknown_fields: UnknownFields,
    /// Drop records whose effective opacity is 0.
    pub skip_transparent: bool,
    /// Threading for batch resolution.
    pub threading: ResolveThreading,
}

impl Default for ComposerOpts {
    fn default() -> Self {
        Self {
            unknown_fields: UnknownFields::Lenient,
            skip_transparent: false,
            threading: ResolveThreading::default(),
        }
    }
}

/// Resolved appear/disappear phase of a widget at the query time.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ResolvedPhase {
    /// Lifecycle phase.
    pub phase: AnimationPhase,
    /// Eased progress in `[0, 1]`.
    pub progress: f64,
    /// Validated phase parameters.
    pub params: Value,
}

/// Widget payload after parameter and phase resolution.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedWidget {
    /// Package namespace.
    pub scope: String,
    /// Widget name.
    pub widget_id: String,
    /// Parameters with defaults applied.
    pub parameters: ResolvedParameters,
    /// Entry phase, if the instance declares one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appear: Option<ResolvedPhase>,
    /// Exit phase, if the instance declares one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disappear: Option<ResolvedPhase>,
    /// Attached media control.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub play: Option<PlayPayload>,
}

/// Variant payload handed to the renderer.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DrawPayload {
    /// Text run.
    Text(TextProps),
    /// Image.
    Image(ImageProps),
    /// Video.
    Video(VideoProps),
    /// Emoji glyph.
    Emoji(EmojiProps),
    /// Vector shape.
    Shape(ShapeProps),
    /// Lottie animation.
    Lottie(LottieProps),
    /// Widget instance.
    Widget(ResolvedWidget),
}

/// One paintable element at one instant, in painter order.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawRecord {
    /// Source element.
    pub element_id: ElementId,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Variant tag.
    pub variant: ElementVariant,
    /// Element-local to stage transform, ancestors included.
    pub transform: Affine,
    /// Animated local geometry with the resolved size.
    pub properties: Geometry,
    /// Effective opacity (product over the ancestor chain).
    pub opacity: f64,
    /// Time on the element's own timeline.
    pub local_time: f64,
    /// Variant payload.
    pub payload: DrawPayload,
}

/// Stateless resolver from a clip at time `T` to a flat draw list.
#[derive(Debug)]
pub struct Composer<'r> {
    registry: &'r WidgetRegistry,
    opts: ComposerOpts,
}

#[derive(Clone, Copy)]
struct Frame {
    world: Affine,
    opacity: f64,
    reference: Size,
    time: f64,
    window_end: f64,
}

impl<'r> Composer<'r> {
    /// Composer with default options.
    pub fn new(registry: &'r WidgetRegistry) -> Self {
        Self {
            registry,
            opts: ComposerOpts::default(),
        }
    }

    /// Replace the options.
    pub fn with_opts(mut self, opts: ComposerOpts) -> Self {
        self.opts = opts;
        self
    }

    /// Options in use.
    pub fn opts(&self) -> &ComposerOpts {
        &self.opts
    }

    /// Resolve `clip` at clip time `t`.
    ///
    /// `t` must be finite and within `[0, clip.duration]`. Groups are not emitted; their visible
    /// descendants appear contiguously at the group's position.
    #[tracing::instrument(skip(self, clip), fields(clip = clip.id()))]
    pub fn resolve(&self, clip: &Clip, t: f64) -> StageResult<Vec<DrawRecord>> {
        if !t.is_finite() || t < 0.0 || t > clip.duration() {
            return Err(StageError::validation_at(
                "$.time",
                format!("must be within [0, {}], got {t}", clip.duration()),
            ));
        }

        let stage = clip.canvas().size();
        let root = Frame {
            world: Affine::IDENTITY,
            opacity: 1.0,
            reference: stage,
            time: t,
            window_end: clip.duration(),
        };
        let tree = clip.tree();
        let mut out = Vec::new();
        for &idx in tree.root_indices() {
            self.visit(tree, idx, root, stage, &mut out)?;
        }
        tracing::debug!(records = out.len(), "clip resolved");
        Ok(out)
    }

    /// Resolve several query times, in order, optionally in parallel.
    #[tracing::instrument(skip(self, clip, times), fields(clip = clip.id(), count = times.len()))]
    pub fn resolve_many(&self, clip: &Clip, times: &[f64]) -> StageResult<Vec<Vec<DrawRecord>>> {
        let threading = self.opts.threading;
        if !threading.parallel {
            return times.iter().map(|&t| self.resolve(clip, t)).collect();
        }
        let pool = build_thread_pool(threading.threads)?;
        pool.install(|| times.par_iter().map(|&t| self.resolve(clip, t)).collect())
    }

    // recursion depth is bounded by `ElementTree::MAX_DEPTH`
    fn visit(
        &self,
        tree: &ElementTree,
        idx: NodeIdx,
        parent: Frame,
        stage: Size,
        out: &mut Vec<DrawRecord>,
    ) -> StageResult<()> {
        let node = tree.node(idx);
        let el = &node.element;

        let local_t = parent.time - el.start_time();
        let window_len = match el.duration() {
            Some(d) => d,
            None => parent.window_end - el.start_time(),
        };
        let visible = local_t >= 0.0
            && match el.duration() {
                Some(d) => local_t < d,
                None => local_t <= window_len,
            };
        if !visible {
            return Ok(());
        }

        let (width, height) = el.resolved_size()?;
        let mut props = resolve_geometry(el.geometry(), el.animations(), local_t);
        props.width = width;
        props.height = height;

        let local = placement_affine(&props, (width, height), el.flags(), parent.reference);
        let world = parent.world * local;
        let opacity = parent.opacity * props.opacity;

        if self.opts.skip_transparent && opacity <= 0.0 {
            return Ok(());
        }

        let payload = match el.kind() {
            ElementKind::Text(p) => DrawPayload::Text(p.clone()),
            ElementKind::Image(p) => DrawPayload::Image(p.clone()),
            ElementKind::Video(p) => DrawPayload::Video(p.clone()),
            ElementKind::Emoji(p) => DrawPayload::Emoji(p.clone()),
            ElementKind::Shape(p) => DrawPayload::Shape(p.clone()),
            ElementKind::Lottie(p) => DrawPayload::Lottie(p.clone()),
            ElementKind::Widget(w) => {
                DrawPayload::Widget(self.resolve_widget(w, local_t, window_len)?)
            }
            ElementKind::Group => {
                let reference = match (width, height) {
                    (Some(w), Some(h)) => Size::new(w, h).unwrap_or(stage),
                    _ => stage,
                };
                let frame = Frame {
                    world,
                    opacity,
                    reference,
                    time: local_t,
                    window_end: window_len,
                };
                for &child in &node.children {
                    self.visit(tree, child, frame, stage, out)?;
                }
                return Ok(());
            }
        };

        out.push(DrawRecord {
            element_id: el.id().clone(),
            name: el.name().map(str::to_owned),
            variant: el.variant(),
            transform: world,
            properties: props,
            opacity,
            local_time: local_t,
            payload,
        });
        Ok(())
    }

    fn resolve_widget(
        &self,
        w: &WidgetProps,
        local_t: f64,
        window_end: f64,
    ) -> StageResult<ResolvedWidget> {
        let unknown = self.opts.unknown_fields;
        let parameters =
            self.registry
                .resolve_parameters(&w.scope, &w.widget_id, &w.parameters, unknown)?;

        let appear = match &w.appear {
            Some(phase) => {
                let params =
                    self.registry
                        .resolve_appear(&w.scope, &w.widget_id, &phase.params, unknown)?;
                let range = TimeRange {
                    start: 0.0,
                    end: phase.duration,
                };
                Some(phase_state(phase, range, local_t, params))
            }
            None => None,
        };
        let disappear = match &w.disappear {
            Some(phase) => {
                let params = self.registry.resolve_disappear(
                    &w.scope,
                    &w.widget_id,
                    &phase.params,
                    unknown,
                )?;
                let range = TimeRange {
                    start: (window_end - phase.duration).max(0.0),
                    end: window_end,
                };
                Some(phase_state(phase, range, local_t, params))
            }
            None => None,
        };

        Ok(ResolvedWidget {
            scope: w.scope.clone(),
            widget_id: w.widget_id.clone(),
            parameters,
            appear,
            disappear,
            play: w.play.clone(),
        })
    }
}

fn phase_state(
    phase: &WidgetPhase,
    range: TimeRange,
    t: f64,
    params: ResolvedParameters,
) -> ResolvedPhase {
    let state = PhaseState::at(range, phase.ease, t);
    ResolvedPhase {
        phase: state.phase,
        progress: state.progress,
        params: params.values,
    }
}

/// Resolve `clip` at `t` with default options.
pub fn resolve(clip: &Clip, registry: &WidgetRegistry, t: f64) -> StageResult<Vec<DrawRecord>> {
    Composer::new(registry).resolve(clip, t)
}

fn build_thread_pool(threads: Option<usize>) -> StageResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(StageError::validation(
            "resolve threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| StageError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/clip/composer.rs"]
mod tests;
