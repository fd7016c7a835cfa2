//! Per-frame pass planning.
//!
//! A frame is an ordered list of [`PassSpec`]s. Each pass names what it draws,
//! the stencil behaviour its pipelines use and how it treats the attachments
//! left by the previous pass. The planner is GPU-free so the ordering rules
//! can be tested directly.

/// How a pipeline uses the stencil aspect of the depth attachment.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum StencilMode {
    #[default]
    Disabled,
    /// Always passes and replaces the stored value with `reference`.
    Write { reference: u32 },
    /// Passes only where the stored value differs from `reference`. Never writes.
    TestNotEqual { reference: u32 },
}

impl StencilMode {
    /// The value handed to `set_stencil_reference` while this mode is active.
    pub fn reference(&self) -> u32 {
        match self {
            StencilMode::Disabled => 0,
            StencilMode::Write { reference } | StencilMode::TestNotEqual { reference } => {
                *reference
            }
        }
    }

    pub fn to_stencil_state(&self) -> wgpu::StencilState {
        match self {
            StencilMode::Disabled => wgpu::StencilState::default(),
            StencilMode::Write { .. } => {
                let face = wgpu::StencilFaceState {
                    compare: wgpu::CompareFunction::Always,
                    fail_op: wgpu::StencilOperation::Keep,
                    depth_fail_op: wgpu::StencilOperation::Keep,
                    pass_op: wgpu::StencilOperation::Replace,
                };
                wgpu::StencilState {
                    front: face,
                    back: face,
                    read_mask: 0xff,
                    write_mask: 0xff,
                }
            }
            StencilMode::TestNotEqual { .. } => {
                let face = wgpu::StencilFaceState {
                    compare: wgpu::CompareFunction::NotEqual,
                    fail_op: wgpu::StencilOperation::Keep,
                    depth_fail_op: wgpu::StencilOperation::Keep,
                    pass_op: wgpu::StencilOperation::Keep,
                };
                wgpu::StencilState {
                    front: face,
                    back: face,
                    read_mask: 0xff,
                    write_mask: 0,
                }
            }
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PassKind {
    /// Depth-only draw of the selected entity.
    DepthPrime,
    /// Enlarged back-face shell of the selected entity, writing the stencil.
    OutlineStencilWrite,
    /// Every entity, lit.
    Scene,
}

/// Clear or keep one attachment at the start of a pass.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AttachmentLoad {
    Clear,
    Load,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PassSpec {
    pub kind: PassKind,
    pub stencil: StencilMode,
    pub color: AttachmentLoad,
    pub depth: AttachmentLoad,
    pub stencil_load: AttachmentLoad,
}

impl PassSpec {
    pub fn label(&self) -> &'static str {
        match self.kind {
            PassKind::DepthPrime => "Outline Depth Prime Pass",
            PassKind::OutlineStencilWrite => "Outline Stencil Write Pass",
            PassKind::Scene => "Scene Pass",
        }
    }

    /// Whether the pass writes to the color attachment at all.
    pub fn writes_color(&self) -> bool {
        self.kind != PassKind::DepthPrime
    }
}

/// Ordered passes for one frame.
pub struct FramePlan;

impl FramePlan {
    /// The pass list for a frame, with `outline_reference` set when a
    /// selected entity should be outlined.
    ///
    /// Without an outline the frame is one scene pass that clears everything.
    /// With one, the selected entity is depth primed, its shell writes the
    /// reference into the stencil where it survives the depth test, and the
    /// scene pass then draws everywhere the stencil differs from the
    /// reference. The scene pass clears depth again so that the shell's
    /// occlusion does not leak into it.
    pub fn for_selection(outline_reference: Option<u32>) -> Vec<PassSpec> {
        let Some(reference) = outline_reference else {
            return vec![PassSpec {
                kind: PassKind::Scene,
                stencil: StencilMode::Disabled,
                color: AttachmentLoad::Clear,
                depth: AttachmentLoad::Clear,
                stencil_load: AttachmentLoad::Clear,
            }];
        };

        vec![
            PassSpec {
                kind: PassKind::DepthPrime,
                stencil: StencilMode::Disabled,
                color: AttachmentLoad::Clear,
                depth: AttachmentLoad::Clear,
                stencil_load: AttachmentLoad::Clear,
            },
            PassSpec {
                kind: PassKind::OutlineStencilWrite,
                stencil: StencilMode::Write { reference },
                color: AttachmentLoad::Load,
                depth: AttachmentLoad::Load,
                stencil_load: AttachmentLoad::Load,
            },
            PassSpec {
                kind: PassKind::Scene,
                stencil: StencilMode::TestNotEqual { reference },
                color: AttachmentLoad::Load,
                depth: AttachmentLoad::Clear,
                stencil_load: AttachmentLoad::Load,
            },
        ]
    }
}

/// The stencil mode currently in force. Every frame starts and ends in
/// [`StencilMode::Disabled`].
#[derive(Debug, Default)]
pub struct StencilTracker {
    current: StencilMode,
}

impl StencilTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> StencilMode {
        self.current
    }

    /// Runs `f` with `mode` in force and restores [`StencilMode::Disabled`]
    /// afterwards, whether `f` succeeded or not.
    pub fn with_mode<T, E>(
        &mut self,
        mode: StencilMode,
        f: impl FnOnce(StencilMode) -> Result<T, E>,
    ) -> Result<T, E> {
        self.current = mode;
        let result = f(mode);
        self.current = StencilMode::Disabled;
        result
    }
}
